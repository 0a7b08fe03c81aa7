use serde::{Deserialize, Serialize};

/// Why the File Router made a particular decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionReason {
    /// File is empty; treated as a trivial direct-send placeholder.
    EmptyFile,
    /// File size is under `DirectSendThresholdBytes`.
    SmallFile,
    /// File size falls within the RAG range.
    WithinRagRange,
    /// File exceeds `RagChunkThresholdBytes` and large-file override is off.
    SkippedLargeFile,
    /// File matches an exclude rule (e.g. `node_modules`, `.git`).
    ExcludedPath,
    /// File content was detected as binary.
    BinaryDetected,
    /// Reading the file failed.
    ReadError,
    /// Decoding the file as text failed.
    EncodingError,
}

impl DecisionReason {
    /// Machine-readable tag, matching the spec's `skipped_large_file` style.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyFile => "empty_file",
            Self::SmallFile => "small_file",
            Self::WithinRagRange => "within_rag_range",
            Self::SkippedLargeFile => "skipped_large_file",
            Self::ExcludedPath => "excluded_path",
            Self::BinaryDetected => "binary_detected",
            Self::ReadError => "read_error",
            Self::EncodingError => "encoding_error",
        }
    }
}

/// Routing outcome for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileDecision {
    /// Send the file's full content directly to an analysis agent.
    DirectSend,
    /// Chunk and embed the file for retrieval-augmented analysis.
    RagChunks,
    /// Do not process the file.
    Skipped,
}

/// Per-file routing decision plus the bookkeeping the plan needs for
/// downstream chunking/indexing and risk ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRouteDecision {
    /// Path relative to the project root.
    pub file_path: String,
    /// The routing decision.
    pub decision: FileDecision,
    /// Why this decision was made.
    pub decision_reason: DecisionReason,
    /// Risk score in `[0, 1]` from the RAG-risk filter, when computed.
    pub risk_score: f64,
    /// Whether `risk_score >= RiskThreshold`.
    pub is_high_risk: bool,
    /// Tokenizer-estimated token count (0 for `Skipped`).
    pub estimated_tokens: u64,
    /// Number of chunks this file will produce, once chunked (0 until then).
    pub chunk_count: u32,
    /// Detected source language.
    pub language: String,
    /// Path to a temp file backing disk-spilled chunk content, if used.
    pub temp_file_path: Option<String>,
}

/// Rollup counters and summary statistics for an [`AnalysisPlan`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRollups {
    /// Count of files routed to `DirectSend`.
    pub direct_send_count: u64,
    /// Count of files routed to `RagChunks`.
    pub rag_chunk_count: u64,
    /// Count of files routed to `Skipped`.
    pub skipped_count: u64,
    /// Sum of `estimated_tokens` across non-skipped files.
    pub estimated_total_tokens: u64,
    /// Sum of on-disk byte sizes across all considered files.
    pub total_file_size_bytes: u64,
}

/// Per-project routing decision table, derived by the File Router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPlan {
    /// Per-file decisions: high-risk files first (sorted by descending
    /// `risk_score`, ties broken by ascending `file_path`), followed by
    /// the remaining files in their original relative order.
    pub files: Vec<FileRouteDecision>,
    /// Summary rollups.
    pub rollups: PlanRollups,
}

impl AnalysisPlan {
    /// Builds a plan from already-decided per-file entries, computing
    /// rollups and moving high-risk files to the front. Only the high-risk
    /// partition is reordered (by `(Reverse(risk_score), file_path)`, ties
    /// broken by ascending `file_path` per the spec's Open Question
    /// resolution); non-high-risk files keep their incoming relative order.
    #[must_use]
    pub fn from_decisions(files: Vec<FileRouteDecision>) -> Self {
        let mut rollups = PlanRollups::default();
        for f in &files {
            match f.decision {
                FileDecision::DirectSend => {
                    rollups.direct_send_count += 1;
                    rollups.estimated_total_tokens += f.estimated_tokens;
                }
                FileDecision::RagChunks => {
                    rollups.rag_chunk_count += 1;
                    rollups.estimated_total_tokens += f.estimated_tokens;
                }
                FileDecision::Skipped => {
                    rollups.skipped_count += 1;
                }
            }
        }

        let (mut high_risk, rest): (Vec<_>, Vec<_>) = files.into_iter().partition(|f| f.is_high_risk);
        high_risk.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.file_path.cmp(&b.file_path))
        });
        high_risk.extend(rest);

        Self { files: high_risk, rollups }
    }

    /// Files marked high-risk, in the plan's current (risk-first) order.
    pub fn high_risk_files(&self) -> impl Iterator<Item = &FileRouteDecision> {
        self.files.iter().filter(|f| f.is_high_risk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(path: &str, risk: f64, high_risk: bool) -> FileRouteDecision {
        FileRouteDecision {
            file_path: path.into(),
            decision: FileDecision::RagChunks,
            decision_reason: DecisionReason::WithinRagRange,
            risk_score: risk,
            is_high_risk: high_risk,
            estimated_tokens: 100,
            chunk_count: 0,
            language: "rust".into(),
            temp_file_path: None,
        }
    }

    #[test]
    fn ties_break_by_file_path() {
        let plan = AnalysisPlan::from_decisions(vec![
            decision("z.rs", 0.9, true),
            decision("a.rs", 0.9, true),
        ]);
        assert_eq!(plan.files[0].file_path, "a.rs");
        assert_eq!(plan.files[1].file_path, "z.rs");
    }

    #[test]
    fn high_risk_sorted_first() {
        let plan = AnalysisPlan::from_decisions(vec![
            decision("low.rs", 0.1, false),
            decision("high.rs", 0.9, true),
        ]);
        assert_eq!(plan.files[0].file_path, "high.rs");
    }

    #[test]
    fn non_high_risk_files_keep_original_relative_order() {
        let plan = AnalysisPlan::from_decisions(vec![
            decision("z.rs", 0.2, false),
            decision("critical.rs", 0.95, true),
            decision("a.rs", 0.1, false),
            decision("m.rs", 0.3, false),
        ]);
        let paths: Vec<&str> = plan.files.iter().map(|f| f.file_path.as_str()).collect();
        // high-risk file moves to the front; the rest are untouched, in
        // their original incoming order (not re-sorted by score or path)
        assert_eq!(paths, vec!["critical.rs", "z.rs", "a.rs", "m.rs"]);
    }
}
