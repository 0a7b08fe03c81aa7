use tiktoken_rs::CoreBPE;
use warden_domain::error::{Error, Result};
use warden_domain::ports::Tokenizer;

/// Accurate byte-pair-encoding tokenizer backed by `tiktoken-rs`.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    /// Builds a tokenizer using the `cl100k_base` vocabulary (GPT-3.5/4
    /// family), the model family the LLM client defaults target.
    ///
    /// # Errors
    /// Returns an error if the vocabulary fails to load.
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| Error::Fatal(format!("failed to load cl100k_base vocabulary: {e}")))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe
            .encode_with_special_tokens(text)
            .into_iter()
            .map(|id| id as u32)
            .collect()
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let tokens: Vec<usize> = ids.iter().map(|&id| id as usize).collect();
        self.bpe
            .decode(tokens)
            .map_err(|e| Error::Fatal(format!("failed to decode token ids: {e}")))
    }

    fn truncate_to_token_limit(&self, text: &str, max: usize) -> String {
        let ids = self.bpe.encode_with_special_tokens(text);
        if ids.len() <= max {
            return text.to_string();
        }
        self.bpe.decode(ids[..max].to_vec()).unwrap_or_default()
    }
}
