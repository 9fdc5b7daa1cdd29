//! Language-model field extraction for receipt text.

mod client;

pub use client::{ExtractedFields, LlmClient, LlmConfig, LlmError};
