use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::ProjectId;

/// Aggregation of an analysis run's findings. At most one per project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning project.
    pub project_id: ProjectId,
    /// Overall health score in `[0, 100]`.
    pub health_score: u8,
    /// Free-form prose summary.
    pub summary: String,
    /// Bounded list of recommendations, deduplicated.
    pub recommendations: Vec<String>,
    /// Count of `Critical` findings.
    pub critical_count: u32,
    /// Count of `High` findings.
    pub high_count: u32,
    /// Count of `Medium` findings.
    pub medium_count: u32,
    /// Count of `Low` findings.
    pub low_count: u32,
    /// Count of `Info` findings.
    pub info_count: u32,
    /// Wall-clock duration of the analysis run, in seconds.
    pub duration_seconds: f64,
}

/// Maximum number of recommendations retained per report.
pub const MAX_RECOMMENDATIONS: usize = 10;

impl Report {
    /// Health-score law from §8: `max(0, 100 - min(H*10,50) - min(M*3,30) -
    /// min(L*1,20))`. `Critical` findings are folded into the `High` bucket
    /// for scoring purposes, matching the spec's three-bucket formula.
    #[must_use]
    pub fn compute_health_score(high_count: u32, medium_count: u32, low_count: u32) -> u8 {
        let high_penalty = (high_count * 10).min(50);
        let medium_penalty = (medium_count * 3).min(30);
        let low_penalty = low_count.min(20);
        let total_penalty = high_penalty + medium_penalty + low_penalty;
        100u32.saturating_sub(total_penalty).min(100) as u8
    }
}
