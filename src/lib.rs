//! Notemind: personal idea journal with a background AI enrichment engine
//!
//! Raw notes go in; a language-model service turns them into tags,
//! summaries, and a rolling consolidated memory of cross-note insights and
//! time-bound reminders. The model is treated as an unreliable collaborator:
//! its output is parsed defensively, failures are contained at the smallest
//! scope, and the recurring cycle never runs more than once at a time.
//!
//! ## Architecture
//!
//! ```text
//! ProcessingScheduler ──► Processor (single-flight entry point)
//!                           ├── EnrichmentPipeline ──► LanguageModel
//!                           │        │                  + NoteRepository
//!                           └── InsightSynthesizer ──► LanguageModel
//!                                    │ merge (retention + expiry)
//!                                    ▼
//!                               MemoryStore (atomic whole-unit load/save)
//!                                    ▲
//! QueryAssistant ────────────────────┘ (read-only)
//! ```
//!
//! ## Modules
//!
//! - [`gateway`]: language-model request/response client
//! - [`parser`]: best-effort parsing of raw model output
//! - [`notes`]: note types and storage
//! - [`memory`]: consolidated memory types and durable store
//! - [`pipeline`]: enrichment, synthesis, and cycle orchestration
//! - [`scheduler`]: recurring background processing
//! - [`assistant`]: ad-hoc question answering over the memory
//! - [`config`]: configuration management

pub mod assistant;
pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod notes;
pub mod parser;
pub mod pipeline;
pub mod scheduler;

pub use config::NotemindConfig;
pub use error::{Error, Result};
