use warden_domain::error::Result;
use warden_domain::ports::Tokenizer;

/// Heuristic fallback tokenizer: approximates BPE token count at roughly
/// four characters per token, with no real vocabulary. Used when no
/// accurate model is configured, or as a cheap preflight estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer {
    chars_per_token: f64,
}

impl HeuristicTokenizer {
    /// Builds the tokenizer with the spec's default ratio of four
    /// characters per token.
    #[must_use]
    pub fn new() -> Self {
        Self { chars_per_token: 4.0 }
    }
}

impl Tokenizer for HeuristicTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        ((text.chars().count() as f64) / self.chars_per_token).ceil() as usize
    }

    fn encode(&self, text: &str) -> Vec<u32> {
        text.chars().map(|c| c as u32).collect()
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        Ok(ids.iter().filter_map(|&id| char::from_u32(id)).collect())
    }

    fn truncate_to_token_limit(&self, text: &str, max: usize) -> String {
        let max_chars = (max as f64 * self.chars_per_token).floor() as usize;
        text.chars().take(max_chars).collect()
    }
}
