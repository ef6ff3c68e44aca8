use clap::Parser;
use nalgebra::Matrix6;
use std::time::Instant;
use tracing::{info, warn};

use apex_metrics::manifold::se3::SE3;
use apex_metrics::{
    ApexMetricsError, JacobianConvention, JacobianRequest, LieGroup, SE3Metric, evaluate_batch,
    init_logger,
};

#[derive(Parser)]
#[command(name = "pose_distance")]
#[command(about = "Evaluate SE(3) pose distances and their Jacobians")]
struct Args {
    /// Differentiate w.r.t. global (left) perturbations
    #[arg(long)]
    global: bool,

    /// Use SO(3) x R3 Jacobians instead of SE(3) ones
    #[arg(long)]
    decoupled: bool,

    /// Number of random pose pairs for the batch run
    #[arg(short, long, default_value = "10000")]
    pairs: usize,
}

fn log_matrix(name: &str, matrix: &Matrix6<f64>) {
    info!("{}:", name);
    for row in matrix.row_iter() {
        info!(
            "  [{:>9.5} {:>9.5} {:>9.5} {:>9.5} {:>9.5} {:>9.5}]",
            row[0], row[1], row[2], row[3], row[4], row[5]
        );
    }
}

fn main() -> Result<(), ApexMetricsError> {
    init_logger();
    let args = Args::parse();

    let convention = JacobianConvention::new(args.global, !args.decoupled);
    let metric = SE3Metric::new(convention);
    info!(
        "Convention: global = {}, coupled = {}",
        convention.global, convention.coupled
    );

    let lhs = SE3::from_translation_euler(1.0, 0.5, -0.2, 0.1, -0.3, 0.8);
    let rhs = SE3::from_translation_euler(0.8, 0.0, 0.1, 0.0, -0.1, 0.5);
    info!("lhs: {}", lhs);
    info!("rhs: {}", rhs);

    let mut j_lhs = Matrix6::zeros();
    let mut j_rhs = Matrix6::zeros();
    let residual = metric.distance(&lhs, &rhs, Some(&mut j_lhs), Some(&mut j_rhs));
    info!("residual: {}", residual);
    log_matrix("d residual / d lhs", &j_lhs);
    log_matrix("d residual / d rhs", &j_rhs);

    let lhs_poses: Vec<f64> = (0..args.pairs)
        .flat_map(|_| SE3::random().parameters())
        .collect();
    let rhs_poses: Vec<f64> = (0..args.pairs)
        .flat_map(|_| SE3::random().parameters())
        .collect();

    let start = Instant::now();
    let batch = evaluate_batch(&metric, &lhs_poses, &rhs_poses, JacobianRequest::Both)?;
    let elapsed = start.elapsed();
    info!(
        "Batch: {} pairs in {:.3} ms ({:.1} ns/pair)",
        batch.len(),
        elapsed.as_secs_f64() * 1e3,
        elapsed.as_nanos() as f64 / batch.len().max(1) as f64
    );

    let largest = batch
        .residuals
        .chunks(SE3Metric::OUTPUT_SIZE)
        .map(|r| r.iter().map(|v| v * v).sum::<f64>().sqrt())
        .fold(0.0_f64, f64::max);
    info!("Largest residual norm: {:.6}", largest);

    // Malformed input is reported, not panicked on
    let truncated = lhs_poses.len().saturating_sub(1);
    if let Err(error) = evaluate_batch(
        &metric,
        &lhs_poses[..truncated],
        &rhs_poses[..truncated],
        JacobianRequest::None,
    ) {
        warn!("Rejected malformed batch: {}", ApexMetricsError::from(error).chain_compact());
    }

    Ok(())
}
