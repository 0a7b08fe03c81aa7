//! Tokenizer (§4.1): an accurate byte-pair-encoding implementation backed
//! by `tiktoken-rs`, and a heuristic character-count fallback for when no
//! BPE vocabulary is configured.

mod heuristic;
mod tiktoken;

pub use heuristic::HeuristicTokenizer;
pub use tiktoken::TiktokenTokenizer;

#[cfg(test)]
mod tests {
    use warden_domain::ports::Tokenizer;

    use super::*;

    fn assert_truncate_respects_limit(tokenizer: &dyn Tokenizer) {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
        let truncated = tokenizer.truncate_to_token_limit(&text, 10);
        assert!(tokenizer.count_tokens(&truncated) <= 10);
    }

    #[test]
    fn heuristic_truncation_respects_limit() {
        assert_truncate_respects_limit(&HeuristicTokenizer::new());
    }

    #[test]
    fn tiktoken_truncation_respects_limit() {
        assert_truncate_respects_limit(&TiktokenTokenizer::cl100k().unwrap());
    }
}
