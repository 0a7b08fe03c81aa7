//! Layered configuration (§6, plus the ambient Logging/Persistence
//! groups from `SPEC_FULL.md` §2.3), loaded via `figment` from a TOML
//! file overridden by `WARDEN_`-prefixed environment variables.

mod types;
mod validate;

use figment::providers::{Env, Format, Toml};
use figment::Figment;

pub use types::{
    ConcurrencyConfig, LoggingConfig, MemoryManagementConfig, PersistenceConfig, RagConfig,
    TimeoutStrategyConfig, WatchdogConfig, WorkerConfig,
};

use warden_domain::error::{Error, Result};

/// Top-level configuration surface, aggregating every group named in
/// `spec.md` §6 plus the ambient `Logging`/`Persistence` groups.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct AppConfig {
    /// Adaptive-timeout parameters for the LLM client.
    pub timeout_strategy: TimeoutStrategyConfig,
    /// Whether the adaptive-timeout formula is used (vs. a static value).
    pub use_adaptive_timeout: bool,
    /// Named-semaphore sizes.
    pub concurrency: ConcurrencyConfig,
    /// RSS sampling thresholds.
    pub memory_management: MemoryManagementConfig,
    /// Chunking/routing/retrieval parameters.
    pub rag: RagConfig,
    /// Watchdog thresholds.
    pub watchdog: WatchdogConfig,
    /// Worker-level job scheduling parameters.
    pub worker: WorkerConfig,
    /// Structured-logging configuration.
    pub logging: LoggingConfig,
    /// Persistence (checkpoint/chunk/report store) configuration.
    pub persistence: PersistenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_strategy: TimeoutStrategyConfig::default(),
            use_adaptive_timeout: true,
            concurrency: ConcurrencyConfig::default(),
            memory_management: MemoryManagementConfig::default(),
            rag: RagConfig::default(),
            watchdog: WatchdogConfig::default(),
            worker: WorkerConfig::default(),
            logging: LoggingConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `path` (TOML), overridden by any
    /// `WARDEN_`-prefixed environment variable, falling back to defaults
    /// for anything neither source sets.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the file is malformed or a validation
    /// rule in [`Self::validate`] fails.
    pub fn load(path: &str) -> Result<Self> {
        let figment = Figment::from(figment::providers::Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("WARDEN_").split("__"));
        let config: AppConfig = figment
            .extract()
            .map_err(|e| Error::Config(format!("failed to load configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field invariants the type system cannot express,
    /// rejecting impossible configurations at startup.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = AppConfig::default();
        assert_eq!(config.timeout_strategy.base_timeout_seconds, 60.0);
        assert_eq!(config.timeout_strategy.per_token_timeout_ms, 10.0);
        assert_eq!(config.concurrency.embedding, 4);
        assert_eq!(config.concurrency.reasoning, 2);
        assert_eq!(config.concurrency.file_read, 8);
        assert_eq!(config.rag.direct_send_threshold_bytes, 10_240);
        assert_eq!(config.rag.rag_chunk_threshold_bytes, 204_800);
        assert_eq!(config.watchdog.max_heartbeat_interval_seconds, 120);
        assert_eq!(config.worker.max_concurrent_jobs, 3);
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_inverted_timeout_bounds() {
        let mut config = AppConfig::default();
        config.timeout_strategy.min_timeout_seconds = 700.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_rag_thresholds() {
        let mut config = AppConfig::default();
        config.rag.direct_send_threshold_bytes = 999_999;
        assert!(config.validate().is_err());
    }
}
