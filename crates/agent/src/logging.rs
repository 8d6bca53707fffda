use carwise_core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` wins over the configured level when set. Returns `false` when a
/// subscriber was already installed, which leaves the existing one in place.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use carwise_core::config::{LogFormat, LoggingConfig};

    use super::init_logging;

    #[test]
    fn second_install_is_refused() {
        let config = LoggingConfig { level: "debug".to_string(), format: LogFormat::Json };
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
