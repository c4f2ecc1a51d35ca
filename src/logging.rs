//! Tracing setup for the binary

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directives for the server
pub const SERVER_FILTER: &str = "fairflip=info";

/// Default directives for the terminal modes, where info lines would
/// interleave with the prompt
pub const TERMINAL_FILTER: &str = "fairflip=warn";

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init(json: bool, default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Log lines go to stderr so stdout stays clean for --json output
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
