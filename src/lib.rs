//! tubenotes - YouTube discovery, transcripts and LLM notes
//!
//! A CLI pipeline that finds videos with semantic search, queues them on a YouTube
//! playlist, stages their transcripts and metadata as JSON, and turns each staged record
//! into a markdown note with a chat-completion model.
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `auth` - Credential providers for the YouTube Data API
//! - `discovery` - Semantic video search (Exa)
//! - `youtube` - YouTube Data API v3 client
//! - `transcript` - Caption track retrieval
//! - `store` - File-based staging of video records
//! - `notes` - Summarize and roast note generation
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use tubenotes::config::{NoteMode, Settings};
//! use tubenotes::orchestrator::{Pipeline, RunPlan};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     // Drain the playlist and write summaries for everything staged
//!     let report = pipeline
//!         .run(&RunPlan {
//!             mode: NoteMode::Summarize,
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Wrote {} notes", report.notes.processed);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod notes;
pub mod openai;
pub mod orchestrator;
pub mod store;
pub mod transcript;
pub mod youtube;

pub use error::{Result, TubenotesError};
