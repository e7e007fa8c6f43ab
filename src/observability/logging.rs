//! # Structured Logging
//!
//! Log output goes to stderr so that secrets and listings printed on stdout
//! stay pipeable. `RUST_LOG` takes precedence over the verbosity flag.
//!
//! Wire dumps enabled through `DEBUG` are written by the transport directly
//! and do not pass through this subscriber.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Default filter directive for a verbosity flag
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global fmt subscriber.
///
/// Installing twice is not an error; the first subscriber stays in place.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // Subscriber already set elsewhere (e.g. integration tests); ignore.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Create a tracing span for one command invocation.
///
/// ```rust,ignore
/// let span = command_span!("tree", path = %root);
/// ```
#[macro_export]
macro_rules! command_span {
    ($command:expr) => {
        tracing::info_span!("command", name = %$command)
    };
    ($command:expr, $($field:tt)*) => {
        tracing::info_span!("command", name = %$command, $($field)*)
    };
}
