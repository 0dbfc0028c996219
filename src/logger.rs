use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber, also capturing `log` records of the core
/// crate. `RUST_LOG` overrides the default `info` level.
pub fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter = EnvFilter::try_new(rust_log).unwrap_or_else(|err| {
        eprintln!(
            "invalid {}, falling back to level '{default_level}' - {err}",
            EnvFilter::DEFAULT_ENV,
        );
        EnvFilter::new(default_level.to_string())
    });

    if let Err(err) = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .try_init()
    {
        eprintln!("failed to install the tracing subscriber - {err}");
    }
}
