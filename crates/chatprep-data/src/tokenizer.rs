//! Tokenizer integration.

use chatprep_core::{ChatPrepError, Result};
use std::path::Path;

/// Wrapper around the tokenizers library.
///
/// [`Tokenizer::encode`] and [`Tokenizer::special_token_id`] are the two
/// surfaces the template assembler consumes: plain-text tokenization without
/// special-token insertion, and single-id lookup for special-token strings.
pub struct Tokenizer {
    inner: tokenizers::Tokenizer,
}

impl Tokenizer {
    /// Load a tokenizer from a local file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| ChatPrepError::Tokenizer(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Load a tokenizer from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_bytes(bytes)
            .map_err(|e| ChatPrepError::Tokenizer(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Encode text to token IDs without inserting special tokens.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| ChatPrepError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Resolve a special-token string to its single token ID.
    ///
    /// Fails if the token is not part of the vocabulary; special tokens must
    /// never be split into pieces.
    pub fn special_token_id(&self, token: &str) -> Result<u32> {
        self.inner.token_to_id(token).ok_or_else(|| {
            ChatPrepError::Tokenizer(format!("special token {token:?} not in vocabulary"))
        })
    }

    /// Decode token IDs to text, skipping special tokens.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|e| ChatPrepError::Tokenizer(e.to_string()))
    }

    /// Get vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }

    /// Get the underlying tokenizer.
    pub fn inner(&self) -> &tokenizers::Tokenizer {
        &self.inner
    }

    /// Get pad token ID if available.
    ///
    /// Tries common pad token names, falls back to EOS token.
    pub fn pad_token_id(&self) -> Option<u32> {
        self.inner
            .token_to_id("<pad>")
            .or_else(|| self.inner.token_to_id("[PAD]"))
            .or_else(|| self.inner.token_to_id("<|pad|>"))
            .or_else(|| self.inner.token_to_id("</s>"))
            .or_else(|| self.inner.token_to_id("<|endoftext|>"))
    }
}
