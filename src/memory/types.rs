//! Memory data types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of insights retained after a merge; truncation drops the
/// oldest entries.
pub const MAX_INSIGHTS: usize = 10;

/// A synthesized cross-note observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub content: String,

    /// When the synthesis run that produced this insight merged it
    pub timestamp: DateTime<Utc>,
}

/// A time-bound follow-up suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub content: String,

    /// Due date in `YYYY-MM-DD` form
    pub due_date: String,
}

impl Reminder {
    /// Parsed due date; `None` when the stored string is not `YYYY-MM-DD`.
    pub fn due(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d").ok()
    }

    /// True when the reminder is due today or later. An unparseable due
    /// date counts as expired.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.due().map_or(false, |due| due >= today)
    }
}

/// The durable consolidated state produced by synthesis runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Completion time of the last successful processing cycle
    #[serde(default)]
    pub last_processed: Option<DateTime<Utc>>,

    /// Running abstractive summary of the whole note corpus, replaced (not
    /// appended) on each successful synthesis
    #[serde(default)]
    pub meta_summary: String,

    /// Most-recent-first, at most [`MAX_INSIGHTS`] entries after a merge
    #[serde(default)]
    pub insights: Vec<Insight>,

    /// New-first from the last merge; stale entries are pruned only at the
    /// next merge
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

impl Memory {
    /// Reminders due on `today` or later, in stored order.
    ///
    /// Pure filter: an entry that expired since the last merge simply stops
    /// appearing here, but stays in storage until the next merge drops it.
    pub fn upcoming_reminders(&self, today: NaiveDate) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.is_upcoming(today))
            .collect()
    }
}
