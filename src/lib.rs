//! # biopaper
//!
//! Crossref paper search with plain-language AI summaries of abstracts.
//!
//! ## Modules
//!
//! - [`crossref`] - Search criteria, filter expression and works search
//! - [`record`] - Normalization of raw Crossref items for display
//! - [`summarizer`] - OpenAI-compatible abstract summaries
//! - [`session`] - Search orchestration producing renderable outcomes
//! - [`render`] - Terminal rendering
//! - [`server`] - Single-page web form and JSON API
//! - [`export`] - CSV export
//! - [`config`] - Endpoints, timeouts and input bounds
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use biopaper::config::SearchConfig;
//! use biopaper::crossref::{CrossrefClient, SearchCriteria};
//! use biopaper::session::Session;
//! use biopaper::summarizer::{LlmConfig, Summarizer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = Session::new(
//!         CrossrefClient::new(SearchConfig::default())?,
//!         Summarizer::new(LlmConfig::default())?,
//!         None,
//!     );
//!     let outcome = session.search(&SearchCriteria::new("RNA-seq"), 10).await;
//!     println!("{}", biopaper::render::render_outcome(&outcome));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crossref;
pub mod error;
pub mod export;
pub mod prompts;
pub mod record;
pub mod render;
pub mod server;
pub mod session;
pub mod summarizer;

pub use error::{BiopaperError, Result};
