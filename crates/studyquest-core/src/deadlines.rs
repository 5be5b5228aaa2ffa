//! Plan deadlines and exam countdown derived from a progress record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::progress::{ProgressRecord, Settings};

/// Who set a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineSource {
    #[serde(rename = "self")]
    Student,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    pub chapter_id: String,
    pub date: NaiveDate,
    pub source: DeadlineSource,
    /// Negative once the date has passed.
    pub days_remaining: i64,
    pub open_tasks: usize,
}

impl Deadline {
    pub fn is_overdue(&self) -> bool {
        self.days_remaining < 0
    }
}

/// Parse a `YYYY-MM-DD` plan or exam date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Every target date on a plan whose chapter is not yet complete, soonest first.
pub fn deadlines(record: &ProgressRecord, today: NaiveDate) -> Vec<Deadline> {
    let mut out = Vec::new();
    for (chapter_id, plan) in &record.chapter_plans {
        if record.is_chapter_completed(chapter_id) {
            continue;
        }
        let open_tasks = plan.tasks.iter().filter(|t| !t.is_completed).count();
        let dates = [
            (plan.target_date, DeadlineSource::Student),
            (plan.parent_target_date, DeadlineSource::Parent),
        ];
        for (date, source) in dates {
            if let Some(date) = date {
                out.push(Deadline {
                    chapter_id: chapter_id.clone(),
                    date,
                    source,
                    days_remaining: (date - today).num_days(),
                    open_tasks,
                });
            }
        }
    }
    out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.chapter_id.cmp(&b.chapter_id)));
    out
}

/// Deadlines at most `days` away, overdue ones included.
pub fn due_within(record: &ProgressRecord, today: NaiveDate, days: u32) -> Vec<Deadline> {
    deadlines(record, today)
        .into_iter()
        .filter(|d| d.days_remaining <= i64::from(days))
        .collect()
}

/// Days until the exam, negative once it has passed.
pub fn exam_countdown(settings: &Settings, today: NaiveDate) -> Option<i64> {
    settings.exam_date.map(|exam| (exam - today).num_days())
}
