use warden_domain::error::{Error, Result};

use super::AppConfig;

/// Rejects configurations that are structurally well-typed but logically
/// impossible, at startup rather than at first use.
pub(super) fn validate(config: &AppConfig) -> Result<()> {
    let ts = &config.timeout_strategy;
    if ts.min_timeout_seconds > ts.max_timeout_seconds {
        return Err(Error::Config(format!(
            "timeout_strategy.min_timeout_seconds ({}) exceeds max_timeout_seconds ({})",
            ts.min_timeout_seconds, ts.max_timeout_seconds
        )));
    }
    if ts.base_timeout_seconds < 0.0 || ts.per_token_timeout_ms < 0.0 {
        return Err(Error::Config("timeout_strategy values must be non-negative".into()));
    }

    let rag = &config.rag;
    if rag.direct_send_threshold_bytes > rag.rag_chunk_threshold_bytes {
        return Err(Error::Config(format!(
            "rag.direct_send_threshold_bytes ({}) exceeds rag_chunk_threshold_bytes ({})",
            rag.direct_send_threshold_bytes, rag.rag_chunk_threshold_bytes
        )));
    }
    if rag.min_chunk_tokens > rag.chunk_size_tokens {
        return Err(Error::Config("rag.min_chunk_tokens must not exceed chunk_size_tokens".into()));
    }
    if !(0.0..=1.0).contains(&rag.risk_threshold) {
        return Err(Error::Config("rag.risk_threshold must be in [0, 1]".into()));
    }

    let mm = &config.memory_management;
    if mm.warning_threshold_percent > mm.pause_threshold_percent {
        return Err(Error::Config(
            "memory_management.warning_threshold_percent must not exceed pause_threshold_percent".into(),
        ));
    }

    let wd = &config.watchdog;
    if wd.enabled && wd.max_heartbeat_interval_seconds > wd.max_project_duration_seconds {
        return Err(Error::Config(
            "watchdog.max_heartbeat_interval_seconds must not exceed max_project_duration_seconds".into(),
        ));
    }

    if config.concurrency.embedding == 0 || config.concurrency.reasoning == 0 || config.concurrency.file_read == 0 {
        return Err(Error::Config("concurrency slot counts must be at least 1".into()));
    }

    Ok(())
}
