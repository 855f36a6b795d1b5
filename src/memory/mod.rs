//! Consolidated AI memory
//!
//! The memory is the durable state distilled from the note corpus: a rolling
//! meta-summary, a bounded insight list, and time-bound reminders. It is
//! distinct from the raw notes and owned exclusively by [`MemoryStore`].

pub mod store;
pub mod types;

pub use store::MemoryStore;
pub use types::{Insight, Memory, Reminder, MAX_INSIGHTS};
