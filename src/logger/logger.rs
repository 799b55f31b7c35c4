use crate::settings;
use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

const BOOTSTRAP_FILTER: &str = "info";

/// Operators can override `log.filter` on a running deployment without
/// editing the settings file.
pub const FILTER_OVERRIDE_ENV: &str = "RUST_LOG";

pub struct LogConfig {
    pub filter: String,
}

impl From<&settings::Log> for LogConfig {
    fn from(log: &settings::Log) -> Self {
        LogConfig {
            filter: log.filter.clone(),
        }
    }
}

impl LogConfig {
    /// The override wins when it is set and non-empty.
    pub fn effective_filter(&self, env_override: Option<&str>) -> String {
        match env_override.map(str::trim) {
            Some(directives) if !directives.is_empty() => directives.to_string(),
            _ => self.filter.clone(),
        }
    }

    pub fn build_filter(&self, env_override: Option<&str>) -> Result<EnvFilter> {
        let directives = self.effective_filter(env_override);
        EnvFilter::try_new(&directives)
            .map_err(|e| anyhow!("invalid log filter {:?}: {}", directives, e))
    }
}

/// Logs at `info` until settings are loaded, then switches to the configured filter.
pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    pub fn new_bootstrap() -> Self {
        let (filter, reload_handle) = reload::Layer::new(EnvFilter::new(BOOTSTRAP_FILTER));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();

        Self { reload_handle }
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        let env_override = std::env::var(FILTER_OVERRIDE_ENV).ok();
        let filter = config.build_filter(env_override.as_deref())?;
        let applied = filter.to_string();
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        tracing::debug!(filter = %applied, "log filter applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(filter: &str) -> LogConfig {
        LogConfig {
            filter: filter.to_string(),
        }
    }

    #[test]
    fn settings_filter_applies_without_override() {
        assert_eq!(config("lendgate=debug").effective_filter(None), "lendgate=debug");
        assert_eq!(config("lendgate=debug").effective_filter(Some("  ")), "lendgate=debug");
    }

    #[test]
    fn env_override_wins() {
        assert_eq!(config("info").effective_filter(Some("warn")), "warn");
    }

    #[test]
    fn bad_directive_is_reported() {
        let err = config("lendgate=loud").build_filter(None).unwrap_err();
        assert!(err.to_string().contains("lendgate=loud"));
    }
}
