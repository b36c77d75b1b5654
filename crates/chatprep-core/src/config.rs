//! Factory configuration for downstream model and tokenizer construction.
//!
//! The training and serving layers construct the actual model and tokenizer
//! objects; this crate only describes how. Each factory config is plain data
//! with every parameter named, so the calling component can reconstruct the
//! load call without any captured state.

use crate::Dtype;
use serde::{Deserialize, Serialize};

/// Architecture loaders available for this model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelLoader {
    /// Llama-family decoder operating on unpadded (packed) sequences.
    UnpaddedLlama,
    /// GPT-BigCode (StarCoder-family) decoder.
    GptBigCode,
}

/// How to construct the downstream model object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFactoryConfig {
    /// Which architecture loader to invoke.
    pub loader: ModelLoader,

    /// Weight dtype requested at load time.
    #[serde(default)]
    pub dtype: Dtype,

    /// Stream weights during load to reduce peak host memory.
    #[serde(default = "default_true")]
    pub low_cpu_mem_usage: bool,

    /// Extend the positional range to this many tokens, if set.
    #[serde(default)]
    pub extend_context_to: Option<usize>,
}

/// How to construct the downstream tokenizer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenizerFactoryConfig {
    /// Use the fast (Rust-backed) tokenizer implementation.
    #[serde(default)]
    pub use_fast: bool,

    /// Send the stored auth token when fetching from the hub.
    #[serde(default)]
    pub use_auth_token: bool,
}

fn default_true() -> bool {
    true
}
