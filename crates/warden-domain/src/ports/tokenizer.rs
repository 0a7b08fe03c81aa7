use crate::error::Result;

/// Token counting and truncation, implemented either by an accurate
/// byte-pair-encoding model or a heuristic fallback (§4.1).
///
/// Pure and thread-safe: implementations must not hold interior state that
/// changes call-to-call results for identical input.
pub trait Tokenizer: Send + Sync {
    /// Counts the tokens `text` would encode to.
    fn count_tokens(&self, text: &str) -> usize;

    /// Encodes `text` into model-specific token ids.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Decodes token ids back into text.
    ///
    /// # Errors
    /// Returns an error if `ids` contains a value the tokenizer cannot
    /// decode.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// Truncates `text` so that `count_tokens(result) <= max`.
    fn truncate_to_token_limit(&self, text: &str, max: usize) -> String;
}
