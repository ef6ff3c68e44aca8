//! Logging setup for applications and demos embedding apex-metrics
//!
//! The library itself only emits `tracing` events; this module installs a subscriber
//! that prints them with a bracketed, colored prefix.

use tracing::Level;

/// Initialize the tracing subscriber with the default INFO level
///
/// Default log level: INFO (overrideable via RUST_LOG environment variable)
///
/// Format: `[LEVEL YYYY-MM-DD HH:MM:SS module]` for INFO/WARN/ERROR
///         `[LEVEL YYYY-MM-DD HH:MM:SS file:line]` for DEBUG/TRACE
///
/// # Example
/// ```no_run
/// use apex_metrics::init_logger;
///
/// init_logger();
/// tracing::info!("Application started");
/// ```
///
/// # Environment Variables
/// ```bash
/// RUST_LOG=debug cargo run --example pose_distance
/// RUST_LOG=apex_metrics=trace cargo run --example pose_distance
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level
///
/// # Arguments
/// * `default_level` - The default log level (overrideable via RUST_LOG)
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logger_with_level(default_level: Level) {
    // A second initialization (tests, embedding applications) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_level(false)
        .event_format(BracketFormatter)
        .try_init();
}

/// Event formatter producing `[LEVEL timestamp location] message`
struct BracketFormatter;

impl BracketFormatter {
    fn level_label(level: &Level) -> &'static str {
        match *level {
            Level::ERROR => "\x1b[31mERROR\x1b[0m",
            Level::WARN => "\x1b[33mWARN\x1b[0m",
            Level::INFO => "\x1b[32mINFO\x1b[0m",
            Level::DEBUG => "\x1b[34mDEBUG\x1b[0m",
            Level::TRACE => "\x1b[35mTRACE\x1b[0m",
        }
    }
}

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for BracketFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = metadata.level();

        write!(
            writer,
            "[{} {} ",
            Self::level_label(level),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;

        // file:line is only useful while debugging
        match (*level >= Level::DEBUG, metadata.file()) {
            (true, Some(file)) => {
                let filename = file.rsplit('/').next().unwrap_or(file);
                write!(writer, "{}:{}", filename, metadata.line().unwrap_or(0))?;
            }
            _ => write!(writer, "{}", metadata.target())?,
        }

        write!(writer, "] ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
