//! Conversation preparation for the OpenChat model family.
//!
//! This crate provides:
//! - Per-model prompt configuration and the conversation-to-token assembler
//!   (token ids, loss mask, routing group)
//! - A registry of the family's production configurations
//! - Tokenizer integration
//! - JSONL conversation dataset loading
//! - Batch collation with label masking

#![warn(missing_docs)]

pub mod collator;
pub mod conversation;
pub mod dataset;
pub mod registry;
pub mod template;
pub mod tokenizer;

pub use collator::*;
pub use conversation::*;
pub use dataset::*;
pub use registry::*;
pub use template::*;
pub use tokenizer::*;
