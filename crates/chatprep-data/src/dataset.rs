//! Conversation dataset loading and tokenization.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chatprep_core::{ChatPrepError, Result};
use serde::Deserialize;

use super::conversation::{MessageProps, Turn};
use super::template::{ModelConfig, RenderedConversation};
use super::tokenizer::Tokenizer;

/// One JSONL record: a conversation plus optional answer provenance.
#[derive(Debug, Deserialize)]
struct ConversationRecord {
    conversations: Vec<Turn>,
    #[serde(default)]
    is_gpt4: Option<bool>,
}

/// A tokenized conversation dataset.
#[derive(Debug, Clone, Default)]
pub struct TrainingDataset {
    samples: Vec<RenderedConversation>,
}

impl TrainingDataset {
    /// Create a new empty dataset.
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Create a dataset from pre-rendered samples.
    pub fn from_samples(samples: Vec<RenderedConversation>) -> Self {
        Self { samples }
    }

    /// Load and tokenize a JSONL conversation dataset.
    ///
    /// Each line holds a ShareGPT-style record:
    /// `{"conversations": [{"from": "human", "value": "..."}, ...], "is_gpt4": true}`.
    /// The optional `is_gpt4` flag becomes the conversation's
    /// [`MessageProps`]; lines without it render with no provenance.
    /// Sequences longer than the configuration's `model_max_context` are
    /// truncated.
    pub fn from_jsonl<P: AsRef<Path>>(
        path: P,
        config: &ModelConfig,
        tokenizer: &Tokenizer,
    ) -> Result<Self> {
        Self::from_jsonl_with(
            path,
            config,
            |text| tokenizer.encode(text),
            |token| tokenizer.special_token_id(token),
        )
    }

    /// Load a JSONL conversation dataset with caller-supplied tokenize
    /// functions, matching the [`ModelConfig::render`] contract.
    pub fn from_jsonl_with<P, F, S>(
        path: P,
        config: &ModelConfig,
        mut tokenize: F,
        mut tokenize_special: S,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnMut(&str) -> Result<Vec<u32>>,
        S: FnMut(&str) -> Result<u32>,
    {
        let file = File::open(path.as_ref()).map_err(|e| {
            ChatPrepError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open dataset file: {}", e),
            ))
        })?;

        let reader = BufReader::new(file);
        let mut samples = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            let record: ConversationRecord = serde_json::from_str(&line).map_err(|e| {
                ChatPrepError::InvalidData(format!("Line {}: {}", line_num + 1, e))
            })?;

            let props = record.is_gpt4.map(MessageProps::new);
            let mut rendered = config.render(
                &mut tokenize,
                &mut tokenize_special,
                &record.conversations,
                props.as_ref(),
            )?;

            if let Some(max) = config.model_max_context {
                rendered.truncate(max);
            }

            samples.push(rendered);
        }

        tracing::debug!(samples = samples.len(), "loaded conversation dataset");
        Ok(Self { samples })
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get a sample by index.
    pub fn get(&self, index: usize) -> Option<&RenderedConversation> {
        self.samples.get(index)
    }

    /// Get all samples.
    pub fn samples(&self) -> &[RenderedConversation] {
        &self.samples
    }

    /// Shuffle the dataset.
    pub fn shuffle(&mut self, seed: u64) {
        use rand::seq::SliceRandom;
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        self.samples.shuffle(&mut rng);
    }

    /// Split the dataset into train and validation sets.
    pub fn train_val_split(mut self, val_ratio: f32, seed: u64) -> (Self, Self) {
        self.shuffle(seed);
        let val_size = (self.samples.len() as f32 * val_ratio).round() as usize;
        let val_samples = self.samples.split_off(self.samples.len() - val_size);

        (
            self,
            Self {
                samples: val_samples,
            },
        )
    }
}

impl IntoIterator for TrainingDataset {
    type Item = RenderedConversation;
    type IntoIter = std::vec::IntoIter<RenderedConversation>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a TrainingDataset {
    type Item = &'a RenderedConversation;
    type IntoIter = std::slice::Iter<'a, RenderedConversation>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
