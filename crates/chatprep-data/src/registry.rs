//! Model configuration registry.
//!
//! The registry is an explicit immutable map built once at startup and
//! passed by reference to consumers; there is no process-global lookup.
//! [`ModelRegistry::with_builtin`] loads the production configurations of
//! the OpenChat family.

use std::collections::HashMap;

use chatprep_core::{
    ChatPrepError, Dtype, ModelFactoryConfig, ModelLoader, Result, TokenizerFactoryConfig,
};

use super::conversation::MessageProps;
use super::template::{ModelConfig, RolePrefix};

/// Registry of model configurations, keyed by short name.
pub struct ModelRegistry {
    configs: HashMap<String, ModelConfig>,
}

impl ModelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in model family.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.insert("openchat_8192", openchat_8192());
        registry.insert("openchat", openchat());
        registry.insert("openchat_v2", openchat_v2());
        registry.insert("opencoder", opencoder());
        registry
    }

    /// Register a configuration under a short name.
    pub fn insert(&mut self, key: impl Into<String>, config: ModelConfig) {
        self.configs.insert(key.into(), config);
    }

    /// Look up a configuration by name.
    pub fn get(&self, name: &str) -> Result<&ModelConfig> {
        self.configs
            .get(name)
            .ok_or_else(|| ChatPrepError::UnknownModel(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.configs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered configurations.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// Role prefix keyed on answer provenance, used by the v2 configuration.
///
/// Assistant answers sourced from GPT-4 and GPT-3.5 share one base model
/// and are told apart by their prefix. Without provenance (inference) the
/// GPT-4 prefix is assumed.
pub fn provenance_prefix(role: &str, props: Option<&MessageProps>) -> Result<String> {
    match role {
        "human" => Ok("User:".to_string()),
        "gpt" => {
            let is_gpt4 = props.map_or(true, |p| p.is_gpt4);
            Ok(if is_gpt4 {
                "Assistant GPT4:".to_string()
            } else {
                "Assistant GPT3:".to_string()
            })
        }
        other => Err(ChatPrepError::UnsupportedRole(other.to_string())),
    }
}

/// Routing-group label keyed on answer provenance: 1 for GPT-4-sourced (or
/// unknown) conversations, 0 otherwise.
pub fn provenance_group(props: Option<&MessageProps>) -> u32 {
    props.map_or(1, |p| u32::from(p.is_gpt4))
}

/// OpenChat with extended 8192-token context.
#[must_use]
pub fn openchat_8192() -> ModelConfig {
    ModelConfig {
        name: "OpenChat_8192".to_string(),
        system: None,
        role_prefix: RolePrefix::table([("human", "Human: "), ("gpt", "Assistant: ")]),
        ai_role: "gpt".to_string(),
        eot_token: "<|end_of_turn|>".to_string(),
        bos_token: Some("<s>".to_string()),
        group_fn: None,
        model_max_context: Some(8192),
        model: Some(ModelFactoryConfig {
            loader: ModelLoader::UnpaddedLlama,
            dtype: Dtype::BFloat16,
            low_cpu_mem_usage: true,
            extend_context_to: Some(8192),
        }),
        tokenizer: Some(TokenizerFactoryConfig {
            use_fast: false,
            use_auth_token: true,
        }),
    }
}

/// OpenChat at the base 2048-token context.
#[must_use]
pub fn openchat() -> ModelConfig {
    ModelConfig {
        name: "OpenChat".to_string(),
        system: None,
        role_prefix: RolePrefix::table([("human", "Human: "), ("gpt", "Assistant: ")]),
        ai_role: "gpt".to_string(),
        eot_token: "<|end_of_turn|>".to_string(),
        bos_token: Some("<s>".to_string()),
        group_fn: None,
        model_max_context: Some(2048),
        model: Some(ModelFactoryConfig {
            loader: ModelLoader::UnpaddedLlama,
            dtype: Dtype::BFloat16,
            low_cpu_mem_usage: true,
            extend_context_to: None,
        }),
        tokenizer: Some(TokenizerFactoryConfig {
            use_fast: false,
            use_auth_token: true,
        }),
    }
}

/// OpenChat v2: provenance-conditioned prefixes and routing groups.
#[must_use]
pub fn openchat_v2() -> ModelConfig {
    ModelConfig {
        name: "OpenChat_v2".to_string(),
        system: None,
        role_prefix: RolePrefix::Conditional(provenance_prefix),
        ai_role: "gpt".to_string(),
        eot_token: "<|end_of_turn|>".to_string(),
        bos_token: Some("<s>".to_string()),
        group_fn: Some(provenance_group),
        model_max_context: Some(2048),
        model: Some(ModelFactoryConfig {
            loader: ModelLoader::UnpaddedLlama,
            dtype: Dtype::BFloat16,
            low_cpu_mem_usage: true,
            extend_context_to: None,
        }),
        tokenizer: Some(TokenizerFactoryConfig {
            use_fast: false,
            use_auth_token: true,
        }),
    }
}

/// OpenCoder / OpenCoderPlus: code model on the GPT-BigCode loader.
#[must_use]
pub fn opencoder() -> ModelConfig {
    ModelConfig {
        name: "OpenCoder".to_string(),
        system: None,
        role_prefix: RolePrefix::table([("human", "User:"), ("gpt", "Assistant:")]),
        ai_role: "gpt".to_string(),
        eot_token: "<|end_of_turn|>".to_string(),
        bos_token: None,
        group_fn: None,
        model_max_context: Some(8192),
        model: Some(ModelFactoryConfig {
            loader: ModelLoader::GptBigCode,
            dtype: Dtype::BFloat16,
            low_cpu_mem_usage: true,
            extend_context_to: None,
        }),
        tokenizer: Some(TokenizerFactoryConfig {
            use_fast: false,
            use_auth_token: true,
        }),
    }
}
