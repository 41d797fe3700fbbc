// Logging initialisation.
//
// Writes structured logs to both stdout and `./logs/fleet_adapter.log`.
//
// The log level is controlled by the `RUST_LOG` environment variable
// (defaults to `info`, with HTTP plumbing crates held at `warn`).
//
// To trace every robot API request:  `RUST_LOG=info,kachaka_fleet_adapter=debug`

use tracing_appender::non_blocking;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR: &str = "./logs";
const LOG_FILE: &str = "fleet_adapter.log";

// Initialise the global tracing subscriber.
//
// The returned [`WorkerGuard`] must outlive every log call; dropping it
// early loses buffered lines.
pub fn init() -> non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(LOG_DIR, LOG_FILE);
    let (file_writer, guard) = non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,hyper=warn,hyper_util=warn,reqwest=warn,tower=warn,h2=warn")
    });

    let stdout_layer = fmt::layer().with_target(true).with_ansi(true);

    // Plain text for the file; no ANSI escapes.
    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
