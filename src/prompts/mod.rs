//! Prompt module for LLM-based operations.
//!
//! Prompt templates live here so the request code stays free of prose.

pub mod summarize;

pub use summarize::*;
