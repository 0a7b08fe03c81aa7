//! File Router (§4.6): classifies every file under a project working
//! directory into `DirectSend` / `RagChunks` / `Skipped`, with a
//! preflight estimator that never loads full file content into memory.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use warden_domain::entities::{DecisionReason, FileDecision, FileRouteDecision};

/// An optional similarity-based risk scorer. The default implementation
/// returns `0.0` for every file, so risk ordering collapses to stable
/// `FilePath` order when no scorer is configured.
pub trait RiskScorer: Send + Sync {
    /// Computes a risk score in `[0, 1]` for `path`'s content sample.
    fn score(&self, path: &str, sample: &[u8]) -> f64;
}

/// No-op scorer; every file scores `0.0`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRiskScorer;

impl RiskScorer for NullRiskScorer {
    fn score(&self, _path: &str, _sample: &[u8]) -> f64 {
        0.0
    }
}

/// Configuration for the File Router, sourced from `Rag` configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Files under this size (bytes) route `DirectSend`.
    pub direct_send_threshold_bytes: u64,
    /// Files up to this size (bytes) route `RagChunks`; above it they are
    /// `Skipped` unless `allow_large_files` is set.
    pub rag_chunk_threshold_bytes: u64,
    /// Overrides the large-file skip cliff, routing oversized files to
    /// `RagChunks` instead.
    pub allow_large_files: bool,
    /// Glob patterns excluded from routing entirely (`node_modules`,
    /// `.git`, build output directories, etc.).
    pub exclude_globs: Vec<String>,
    /// Score at or above which a file is marked `is_high_risk`.
    pub risk_threshold: f64,
    /// Total estimated tokens at or above which the estimator sets
    /// `requires_approval`.
    pub approval_threshold_tokens: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            direct_send_threshold_bytes: 10_240,
            rag_chunk_threshold_bytes: 204_800,
            allow_large_files: false,
            exclude_globs: vec![
                "**/node_modules/**".into(),
                "**/.git/**".into(),
                "**/target/**".into(),
                "**/dist/**".into(),
                "**/build/**".into(),
            ],
            risk_threshold: 0.7,
            approval_threshold_tokens: 1_000_000,
        }
    }
}

fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        if let Ok(glob) = Glob::new(p) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().expect("empty glob set always builds"))
}

/// Known binary file extensions; content sniffing (NUL-byte detection)
/// backstops anything not caught here.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "pdf", "zip", "gz", "tar", "7z", "exe",
    "dll", "so", "dylib", "bin", "class", "jar", "wasm", "woff", "woff2", "ttf", "otf", "mp3",
    "mp4", "mov", "avi",
];

fn looks_binary(path: &str, sample: &[u8]) -> bool {
    if let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) {
        if BINARY_EXTENSIONS.iter().any(|b| b.eq_ignore_ascii_case(ext)) {
            return true;
        }
    }
    sample.iter().take(8192).any(|&b| b == 0)
}

/// Result of a preflight estimation walk (§4.6, Estimator).
#[derive(Debug, Clone, Default)]
pub struct RouterEstimate {
    /// Count of files that would route `DirectSend`.
    pub direct_send_count: u64,
    /// Count of files that would route `RagChunks`.
    pub rag_chunk_count: u64,
    /// Count of files that would route `Skipped`.
    pub skipped_count: u64,
    /// Sum of estimated tokens across non-skipped files (§9, Open
    /// Question 2: skipped files never contribute).
    pub estimated_tokens: u64,
    /// Per-extension file counts.
    pub file_type_breakdown: std::collections::BTreeMap<String, u64>,
    /// Paths that would be skipped, with their reason tag.
    pub skipped_files: Vec<(String, &'static str)>,
    /// Non-fatal warnings surfaced during the walk.
    pub warnings: Vec<String>,
    /// Set when `estimated_tokens >= approval_threshold_tokens`.
    pub requires_approval: bool,
}

/// Stateless, shareable file router.
#[derive(Debug, Clone)]
pub struct FileRouter {
    config: RouterConfig,
    exclude_set: GlobSet,
}

impl FileRouter {
    /// Builds a router from `config`.
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        let exclude_set = build_glob_set(&config.exclude_globs);
        Self { config, exclude_set }
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.exclude_set.is_match(path)
    }

    /// Pure size-based decision function (§4.6's boundary convention):
    /// the result is total and deterministic over every `u64` size.
    #[must_use]
    pub fn decide_by_size(&self, size: u64) -> (FileDecision, DecisionReason) {
        if size == 0 {
            return (FileDecision::DirectSend, DecisionReason::EmptyFile);
        }
        if size < self.config.direct_send_threshold_bytes {
            return (FileDecision::DirectSend, DecisionReason::SmallFile);
        }
        if size <= self.config.rag_chunk_threshold_bytes {
            return (FileDecision::RagChunks, DecisionReason::WithinRagRange);
        }
        if self.config.allow_large_files {
            return (FileDecision::RagChunks, DecisionReason::WithinRagRange);
        }
        (FileDecision::Skipped, DecisionReason::SkippedLargeFile)
    }

    /// Full per-file decision, incorporating exclude rules, binary
    /// detection, and (optionally) risk scoring against `scorer`.
    #[must_use]
    pub fn decide(
        &self,
        path: &str,
        size: u64,
        sample: &[u8],
        estimated_tokens: u64,
        language: &str,
        scorer: &dyn RiskScorer,
    ) -> FileRouteDecision {
        if self.is_excluded(path) {
            return FileRouteDecision {
                file_path: path.to_string(),
                decision: FileDecision::Skipped,
                decision_reason: DecisionReason::ExcludedPath,
                risk_score: 0.0,
                is_high_risk: false,
                estimated_tokens: 0,
                chunk_count: 0,
                language: language.to_string(),
                temp_file_path: None,
            };
        }
        if looks_binary(path, sample) {
            return FileRouteDecision {
                file_path: path.to_string(),
                decision: FileDecision::Skipped,
                decision_reason: DecisionReason::BinaryDetected,
                risk_score: 0.0,
                is_high_risk: false,
                estimated_tokens: 0,
                chunk_count: 0,
                language: language.to_string(),
                temp_file_path: None,
            };
        }

        let (decision, reason) = self.decide_by_size(size);
        let risk_score = if matches!(decision, FileDecision::Skipped) {
            0.0
        } else {
            scorer.score(path, sample)
        };
        let is_high_risk = risk_score >= self.config.risk_threshold;
        let tokens = if matches!(decision, FileDecision::Skipped) { 0 } else { estimated_tokens };

        FileRouteDecision {
            file_path: path.to_string(),
            decision,
            decision_reason: reason,
            risk_score,
            is_high_risk,
            estimated_tokens: tokens,
            chunk_count: 0,
            language: language.to_string(),
            temp_file_path: None,
        }
    }

    /// Preflight walk of `root`: a size-only, read-light estimate
    /// (§4.6/Glossary, "Preflight") that never loads full file content.
    /// Token counts are approximated from file size (≈4 bytes/token) since
    /// no tokenizer pass over content is performed here.
    #[must_use]
    pub fn estimate(&self, root: &Path) -> RouterEstimate {
        let mut estimate = RouterEstimate::default();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_string_lossy().to_string();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            if self.is_excluded(&relative) {
                estimate.skipped_count += 1;
                estimate.skipped_files.push((relative, DecisionReason::ExcludedPath.as_str()));
                continue;
            }

            let ext = Path::new(&relative)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("none")
                .to_string();
            *estimate.file_type_breakdown.entry(ext).or_insert(0) += 1;

            let (decision, reason) = self.decide_by_size(size);
            match decision {
                FileDecision::DirectSend => {
                    estimate.direct_send_count += 1;
                    estimate.estimated_tokens += size / 4;
                }
                FileDecision::RagChunks => {
                    estimate.rag_chunk_count += 1;
                    estimate.estimated_tokens += size / 4;
                }
                FileDecision::Skipped => {
                    estimate.skipped_count += 1;
                    estimate.skipped_files.push((relative, reason.as_str()));
                }
            }
        }
        estimate.requires_approval = estimate.estimated_tokens >= self.config.approval_threshold_tokens;
        estimate
    }
}
