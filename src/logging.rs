use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the default log level for this crate.
pub const LOG_LEVEL_ENV: &str = "SIPCALC_LOG";

/// Initialise logging to stderr so command-line output on stdout stays clean.
///
/// `RUST_LOG` takes precedence when set; otherwise the level comes from
/// `SIPCALC_LOG`, falling back to `info`.
pub fn init_logging() -> Result<(), TryInitError> {
    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()
}

fn default_directive(level: &str) -> String {
    format!("sipcalc={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_scopes_level_to_crate() {
        assert_eq!(default_directive("debug"), "sipcalc=debug");
    }
}
