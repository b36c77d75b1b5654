//! Per-model prompt configuration and conversation-to-token assembly.
//!
//! A [`ModelConfig`] describes how one model of the family frames a
//! conversation: role prefixes, the end-of-turn marker, an optional BOS
//! token and system prompt, and how conversations map onto routing groups.
//! [`ModelConfig::render`] folds a conversation through that description
//! into a token sequence with a parallel loss mask.

use std::collections::HashMap;

use chatprep_core::{ChatPrepError, ModelFactoryConfig, Result, TokenizerFactoryConfig};

use super::conversation::{MessageProps, Turn};
use super::tokenizer::Tokenizer;

/// Computes a role prefix from the role name and conversation provenance.
pub type PrefixFn = fn(&str, Option<&MessageProps>) -> Result<String>;

/// Computes a routing-group label from conversation provenance.
pub type GroupFn = fn(Option<&MessageProps>) -> u32;

/// How role names map to prefix strings.
#[derive(Debug, Clone)]
pub enum RolePrefix {
    /// Fixed role → prefix table. Every role appearing in a conversation
    /// must have an entry; a miss is an [`ChatPrepError::UnknownRole`].
    Table(HashMap<String, String>),
    /// Prefix computed from the role name and conversation provenance.
    Conditional(PrefixFn),
}

impl RolePrefix {
    /// Build a fixed prefix table from (role, prefix) pairs.
    pub fn table<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Table(
            entries
                .into_iter()
                .map(|(role, prefix)| (role.into(), prefix.into()))
                .collect(),
        )
    }

    /// Resolve the prefix string for a role.
    pub fn resolve(&self, role: &str, props: Option<&MessageProps>) -> Result<String> {
        match self {
            Self::Table(table) => table
                .get(role)
                .cloned()
                .ok_or_else(|| ChatPrepError::UnknownRole(role.to_string())),
            Self::Conditional(f) => f(role, props),
        }
    }
}

/// Prompt and loading configuration for one model of the family.
///
/// Records are constructed once (see [`super::registry::ModelRegistry`])
/// and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Display name of the model.
    pub name: String,

    /// Optional system prompt emitted once before the first turn.
    pub system: Option<String>,

    /// Role → prefix mapping.
    pub role_prefix: RolePrefix,
    /// Role whose message tokens are trainable targets.
    pub ai_role: String,
    /// Special token appended after every turn's content.
    pub eot_token: String,
    /// Optional beginning-of-sequence special token.
    pub bos_token: Option<String>,

    /// Optional routing-group labeler. Without one every conversation is
    /// group 0.
    pub group_fn: Option<GroupFn>,

    /// Maximum context length; rendered sequences longer than this are
    /// truncated by the dataset loader.
    pub model_max_context: Option<usize>,
    /// How the downstream loader should construct the model. Stored and
    /// exposed only; never invoked here.
    pub model: Option<ModelFactoryConfig>,
    /// How the downstream loader should construct the tokenizer.
    pub tokenizer: Option<TokenizerFactoryConfig>,
}

/// A conversation rendered to tokens.
///
/// `tokens` and `loss_mask` are always the same length and positionally
/// aligned: `loss_mask[i]` is `true` exactly when `tokens[i]` is a training
/// target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConversation {
    /// Token ids in prompt order.
    pub tokens: Vec<u32>,
    /// Per-token trainable flag.
    pub loss_mask: Vec<bool>,
    /// Routing-group label.
    pub group: u32,
}

impl RenderedConversation {
    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the rendering produced no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens that are training targets.
    pub fn trainable_tokens(&self) -> usize {
        self.loss_mask.iter().filter(|&&m| m).count()
    }

    /// Token ids as SFT labels: masked positions become `-100` so the loss
    /// ignores them.
    pub fn labels(&self) -> Vec<i64> {
        self.tokens
            .iter()
            .zip(&self.loss_mask)
            .map(|(&id, &trainable)| if trainable { i64::from(id) } else { -100 })
            .collect()
    }

    /// Truncate tokens and mask to at most `max_len` positions.
    pub fn truncate(&mut self, max_len: usize) {
        self.tokens.truncate(max_len);
        self.loss_mask.truncate(max_len);
    }
}

impl ModelConfig {
    /// Render a conversation into tokens, a loss mask, and a group label.
    ///
    /// `tokenize` maps arbitrary text to token ids; `tokenize_special` maps
    /// one special-token string to exactly one id. Both are supplied by the
    /// caller so rendering stays independent of any tokenizer backend.
    ///
    /// The output is a single linear pass over `turns`: optional BOS, then
    /// the optional system prompt closed by the end-of-turn token, then for
    /// each turn its role prefix followed by its content and the end-of-turn
    /// token. Prefixes, BOS, and system tokens are never trainable; content
    /// tokens (including the closing end-of-turn) are trainable exactly when
    /// the turn's role equals `ai_role`.
    ///
    /// A turn without a value contributes its prefix but no content tokens,
    /// priming the model to generate from there. It is only legal in terminal
    /// position; anywhere else it is a
    /// [`ChatPrepError::CompletionNotLast`].
    pub fn render<F, S>(
        &self,
        mut tokenize: F,
        mut tokenize_special: S,
        turns: &[Turn],
        props: Option<&MessageProps>,
    ) -> Result<RenderedConversation>
    where
        F: FnMut(&str) -> Result<Vec<u32>>,
        S: FnMut(&str) -> Result<u32>,
    {
        let mut tokens = Vec::new();
        let mut loss_mask = Vec::new();

        if let Some(bos) = &self.bos_token {
            tokens.push(tokenize_special(bos)?);
            loss_mask.push(false);
        }

        if let Some(system) = &self.system {
            let ids = tokenize(system)?;
            tokens.extend_from_slice(&ids);
            tokens.push(tokenize_special(&self.eot_token)?);
            loss_mask.extend(std::iter::repeat(false).take(ids.len() + 1));
        }

        for (idx, turn) in turns.iter().enumerate() {
            let prefix = self.role_prefix.resolve(&turn.from, props)?;
            let ids = tokenize(&prefix)?;
            tokens.extend_from_slice(&ids);
            loss_mask.extend(std::iter::repeat(false).take(ids.len()));

            match &turn.value {
                Some(value) => {
                    let trainable = turn.from == self.ai_role;
                    let ids = tokenize(value)?;
                    tokens.extend_from_slice(&ids);
                    tokens.push(tokenize_special(&self.eot_token)?);
                    loss_mask.extend(std::iter::repeat(trainable).take(ids.len() + 1));
                }
                None => {
                    if idx != turns.len() - 1 {
                        return Err(ChatPrepError::CompletionNotLast {
                            index: idx,
                            total: turns.len(),
                        });
                    }
                }
            }
        }

        let group = self.group_fn.map_or(0, |f| f(props));

        Ok(RenderedConversation {
            tokens,
            loss_mask,
            group,
        })
    }

    /// Render a conversation using a [`Tokenizer`].
    ///
    /// Convenience wiring of [`ModelConfig::render`]: plain text goes through
    /// [`Tokenizer::encode`], special tokens through
    /// [`Tokenizer::special_token_id`].
    pub fn render_with_tokenizer(
        &self,
        tokenizer: &Tokenizer,
        turns: &[Turn],
        props: Option<&MessageProps>,
    ) -> Result<RenderedConversation> {
        self.render(
            |text| tokenizer.encode(text),
            |token| tokenizer.special_token_id(token),
            turns,
            props,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Byte-level mock: each byte of the text becomes one token id. Keeps
    // expected sequences easy to write down.
    fn tok(text: &str) -> Result<Vec<u32>> {
        Ok(text.bytes().map(u32::from).collect())
    }

    fn special(token: &str) -> Result<u32> {
        match token {
            "<s>" => Ok(1),
            "<eot>" => Ok(2),
            "<|end_of_turn|>" => Ok(3),
            other => panic!("unexpected special token {other}"),
        }
    }

    fn test_config() -> ModelConfig {
        ModelConfig {
            name: "Test".to_string(),
            system: None,
            role_prefix: RolePrefix::table([("human", "Human: "), ("gpt", "Assistant: ")]),
            ai_role: "gpt".to_string(),
            eot_token: "<eot>".to_string(),
            bos_token: Some("<s>".to_string()),
            group_fn: None,
            model_max_context: None,
            model: None,
            tokenizer: None,
        }
    }

    fn byte_ids(text: &str) -> Vec<u32> {
        text.bytes().map(u32::from).collect()
    }

    #[test]
    fn assembly_order_and_masks() {
        let config = test_config();
        let turns = [Turn::human("hi"), Turn::gpt("yo")];

        let rendered = config.render(tok, special, &turns, None).unwrap();

        let mut expected = vec![1];
        expected.extend(byte_ids("Human: "));
        expected.extend(byte_ids("hi"));
        expected.push(2);
        expected.extend(byte_ids("Assistant: "));
        expected.extend(byte_ids("yo"));
        expected.push(2);
        assert_eq!(rendered.tokens, expected);

        // Only "yo" plus its end-of-turn token are trainable.
        let trainable_span = byte_ids("yo").len() + 1;
        let prefix_span = rendered.tokens.len() - trainable_span;
        assert!(rendered.loss_mask[..prefix_span].iter().all(|&m| !m));
        assert!(rendered.loss_mask[prefix_span..].iter().all(|&m| m));

        assert_eq!(rendered.group, 0);
    }

    #[test]
    fn tokens_and_mask_stay_aligned() {
        let config = test_config();
        let turns = [
            Turn::human("how do I exit vim"),
            Turn::gpt(":q!"),
            Turn::human("thanks"),
            Turn::gpt("any time"),
        ];

        let rendered = config.render(tok, special, &turns, None).unwrap();
        assert_eq!(rendered.tokens.len(), rendered.loss_mask.len());
    }

    #[test]
    fn system_prompt_is_never_trainable() {
        let mut config = test_config();
        config.system = Some("Be helpful.".to_string());

        let rendered = config
            .render(tok, special, &[Turn::human("hi"), Turn::gpt("yo")], None)
            .unwrap();

        // BOS + system + eot come first, all masked out.
        let preamble = 1 + "Be helpful.".len() + 1;
        assert!(rendered.loss_mask[..preamble].iter().all(|&m| !m));
        assert_eq!(rendered.tokens[1..preamble - 1], byte_ids("Be helpful.")[..]);
        assert_eq!(rendered.tokens[preamble - 1], 2);
    }

    #[test]
    fn empty_conversation_yields_preamble_only() {
        let mut config = test_config();
        config.system = Some("sys".to_string());

        let rendered = config.render(tok, special, &[], None).unwrap();

        assert_eq!(rendered.tokens.len(), 1 + 3 + 1);
        assert!(rendered.loss_mask.iter().all(|&m| !m));
        assert_eq!(rendered.group, 0);
    }

    #[test]
    fn completion_turn_contributes_prefix_only() {
        let config = test_config();
        let turns = [Turn::human("hi"), Turn::completion("gpt")];

        let rendered = config.render(tok, special, &turns, None).unwrap();

        let mut expected = vec![1];
        expected.extend(byte_ids("Human: "));
        expected.extend(byte_ids("hi"));
        expected.push(2);
        expected.extend(byte_ids("Assistant: "));
        assert_eq!(rendered.tokens, expected);
        assert_eq!(rendered.trainable_tokens(), 0);
    }

    #[test]
    fn completion_turn_before_end_is_rejected() {
        let config = test_config();
        let turns = [Turn::completion("gpt"), Turn::human("hi")];

        let err = config.render(tok, special, &turns, None).unwrap_err();
        assert!(matches!(
            err,
            ChatPrepError::CompletionNotLast { index: 0, total: 2 }
        ));
    }

    #[test]
    fn unknown_role_fails_lookup() {
        let config = test_config();
        let turns = [Turn::new("narrator", "meanwhile...")];

        let err = config.render(tok, special, &turns, None).unwrap_err();
        assert!(matches!(err, ChatPrepError::UnknownRole(role) if role == "narrator"));
    }

    #[test]
    fn labels_mask_with_ignore_index() {
        let config = test_config();
        let rendered = config
            .render(tok, special, &[Turn::human("a"), Turn::gpt("b")], None)
            .unwrap();

        let labels = rendered.labels();
        assert_eq!(labels.len(), rendered.tokens.len());
        for ((&id, &trainable), &label) in rendered
            .tokens
            .iter()
            .zip(&rendered.loss_mask)
            .zip(&labels)
        {
            if trainable {
                assert_eq!(label, i64::from(id));
            } else {
                assert_eq!(label, -100);
            }
        }
        // The "b" span is trainable: one content byte plus the eot token.
        assert_eq!(labels.iter().filter(|&&l| l != -100).count(), 2);
    }

    #[test]
    fn truncate_keeps_alignment() {
        let config = test_config();
        let mut rendered = config
            .render(tok, special, &[Turn::human("hello"), Turn::gpt("world")], None)
            .unwrap();

        rendered.truncate(5);
        assert_eq!(rendered.tokens.len(), 5);
        assert_eq!(rendered.loss_mask.len(), 5);
    }

    #[test]
    fn group_defaults_to_zero_with_props_present() {
        let config = test_config();
        let props = MessageProps::new(true);
        let rendered = config
            .render(tok, special, &[Turn::human("hi")], Some(&props))
            .unwrap();
        assert_eq!(rendered.group, 0);
    }
}
