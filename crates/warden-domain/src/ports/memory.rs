/// Sampled process-memory gauges with warn/pause thresholds (§4.9).
pub trait MemoryMonitor: Send + Sync {
    /// Current resident set size, in megabytes.
    fn current_memory_mb(&self) -> u64;

    /// `current_memory_mb / MaxWorkerMemoryMB`, as a percentage.
    fn memory_usage_percent(&self) -> f64;

    /// Whether usage is at or above `WarningThresholdPercent`.
    fn is_memory_warning(&self) -> bool;

    /// Whether usage is at or above `PauseThresholdPercent`; callers must
    /// stop starting new batches when this is true.
    fn should_pause_processing(&self) -> bool;

    /// Runs opportunistic reclamation if usage is elevated.
    fn request_gc_if_needed(&self);

    /// Forces aggressive reclamation; used immediately before pausing.
    fn force_aggressive_gc(&self);
}
