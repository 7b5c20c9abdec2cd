//! Subscriber setup for the `ksharp` binary. The library crates only emit
//! events; this is the one place a subscriber gets installed.

use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;

/// Map the number of `-v` flags to a maximum level.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install a plain formatter on stderr so logs never mix with reports.
pub fn init_subscriber(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
