//! Batch collation for rendered conversations.

use super::template::RenderedConversation;

/// Ignore index used for padded label positions.
const IGNORE_INDEX: i64 = -100;

/// Collator that pads rendered conversations into rectangular batches.
pub struct DataCollator {
    /// Padding token ID.
    pub pad_token_id: u32,
    /// Maximum sequence length.
    pub max_length: usize,
}

impl DataCollator {
    /// Create a new data collator.
    pub fn new(pad_token_id: u32, max_length: usize) -> Self {
        Self {
            pad_token_id,
            max_length,
        }
    }

    /// Collate samples into a batch.
    ///
    /// Sequences are padded to the longest sample in the batch (capped at
    /// `max_length`); padded positions carry the pad token, a zero attention
    /// mask, and the `-100` label ignore index. Group labels pass through
    /// per sample.
    pub fn collate(&self, samples: &[RenderedConversation]) -> CollatedBatch {
        let batch_size = samples.len();
        let max_len = samples
            .iter()
            .map(|s| s.len().min(self.max_length))
            .max()
            .unwrap_or(0);

        let mut input_ids = vec![vec![self.pad_token_id; max_len]; batch_size];
        let mut labels = vec![vec![IGNORE_INDEX; max_len]; batch_size];
        let mut attention_mask = vec![vec![0u32; max_len]; batch_size];
        let mut groups = Vec::with_capacity(batch_size);

        for (i, sample) in samples.iter().enumerate() {
            let len = sample.len().min(self.max_length);
            input_ids[i][..len].copy_from_slice(&sample.tokens[..len]);
            labels[i][..len].copy_from_slice(&sample.labels()[..len]);
            attention_mask[i][..len].fill(1);
            groups.push(sample.group);
        }

        CollatedBatch {
            input_ids,
            labels,
            attention_mask,
            groups,
            batch_size,
            seq_len: max_len,
        }
    }
}

/// A collated batch ready for the model.
#[derive(Debug, Clone)]
pub struct CollatedBatch {
    /// Input token IDs [batch_size, seq_len].
    pub input_ids: Vec<Vec<u32>>,
    /// Labels with `-100` on non-trainable positions [batch_size, seq_len].
    pub labels: Vec<Vec<i64>>,
    /// Attention mask [batch_size, seq_len].
    pub attention_mask: Vec<Vec<u32>>,
    /// Per-sample routing-group labels [batch_size].
    pub groups: Vec<u32>,
    /// Batch size.
    pub batch_size: usize,
    /// Sequence length.
    pub seq_len: usize,
}
