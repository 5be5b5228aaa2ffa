//! Parent accounts: linking to a child, setting parent target dates, and
//! reading a child's progress.
//!
//! A parent never goes through a child's [`Session`](crate::session::Session),
//! so reading a child's record does not count as a visit for their streak.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::deadlines::{deadlines, exam_countdown, Deadline};
use crate::error::{Result, ValidationError};
use crate::progress::{
    xp_into_level, xp_to_next_level, Command, Plan, PlanPatch, ProgressEngine, ProgressRecord,
};
use crate::session::build_index;
use crate::storage::{ParentLink, ProgressStore};
use crate::syllabus::{Syllabus, SyllabusIndex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProgress {
    pub subject_id: String,
    pub completed: usize,
    pub total: usize,
    /// Whole-number percentage of chapters completed.
    pub percent: u8,
}

/// Read-only snapshot of a student's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub level: u64,
    pub experience: u64,
    pub xp_into_level: u64,
    pub xp_to_next_level: u64,
    pub streak: u32,
    pub chapters_completed: usize,
    pub chapters_total: usize,
    pub subjects: Vec<SubjectProgress>,
    pub exam_in_days: Option<i64>,
    pub deadlines: Vec<Deadline>,
}

/// Build a summary of `record` against the syllabus index.
pub fn summarize(
    record: &ProgressRecord,
    index: &SyllabusIndex,
    today: NaiveDate,
) -> ProgressSummary {
    let subjects: Vec<SubjectProgress> = index
        .subjects()
        .map(|(subject_id, chapters)| {
            let total = chapters.len();
            let completed = chapters
                .iter()
                .filter(|c| record.is_chapter_completed(&c.chapter_id))
                .count();
            let percent = if total == 0 {
                0
            } else {
                (completed * 100 / total) as u8
            };
            SubjectProgress {
                subject_id: subject_id.to_string(),
                completed,
                total,
                percent,
            }
        })
        .collect();

    ProgressSummary {
        level: record.level,
        experience: record.experience,
        xp_into_level: xp_into_level(record.experience),
        xp_to_next_level: xp_to_next_level(record.experience),
        streak: record.streak,
        chapters_completed: subjects.iter().map(|s| s.completed).sum(),
        chapters_total: index.chapter_count(),
        subjects,
        exam_in_days: exam_countdown(&record.settings, today),
        deadlines: deadlines(record, today),
    }
}

pub struct ParentMonitor<'s> {
    store: &'s ProgressStore,
    syllabus: &'s Syllabus,
}

impl<'s> ParentMonitor<'s> {
    pub fn new(store: &'s ProgressStore, syllabus: &'s Syllabus) -> Self {
        Self { store, syllabus }
    }

    /// Link `parent_id` to `child_id`. Returns `false` if already linked.
    pub fn link(&self, parent_id: &str, child_id: &str) -> Result<bool> {
        if parent_id == child_id {
            return Err(ValidationError::SelfLink(parent_id.to_string()).into());
        }
        let linked = self.store.link_parent(parent_id, child_id)?;
        if linked {
            tracing::info!(parent = %parent_id, child = %child_id, "parent linked");
        }
        Ok(linked)
    }

    pub fn unlink(&self, parent_id: &str, child_id: &str) -> Result<bool> {
        Ok(self.store.unlink_parent(parent_id, child_id)?)
    }

    pub fn children(&self, parent_id: &str) -> Result<Vec<ParentLink>> {
        Ok(self.store.children_of(parent_id)?)
    }

    fn ensure_linked(&self, parent_id: &str, child_id: &str) -> Result<()> {
        if self.store.is_linked(parent_id, child_id)? {
            Ok(())
        } else {
            Err(ValidationError::NotLinked {
                parent: parent_id.to_string(),
                child: child_id.to_string(),
            }
            .into())
        }
    }

    /// Set the parent deadline on one of the child's chapter plans and return
    /// the updated plan.
    ///
    /// Only `parentTargetDate` is touched; the child's own target date and
    /// notes are left as they are. Returns `None` when the chapter is not in
    /// the child's syllabus.
    ///
    /// # Errors
    /// Returns [`ValidationError::NotLinked`] if the accounts are not linked
    /// and [`ValidationError::UnknownUser`] if the child has never started a
    /// session.
    pub fn set_parent_target_date(
        &self,
        parent_id: &str,
        child_id: &str,
        chapter_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Plan>> {
        self.ensure_linked(parent_id, child_id)?;
        let record = self
            .store
            .load(child_id)?
            .ok_or_else(|| ValidationError::UnknownUser(child_id.to_string()))?;
        let index = build_index(self.syllabus, &record, child_id);
        if index.chapter(chapter_id).is_none() {
            tracing::debug!(%chapter_id, "parent target: chapter not in syllabus");
            return Ok(None);
        }

        let transition = ProgressEngine::new(&index).apply(
            &record,
            Command::UpdateChapterPlan {
                chapter_id: chapter_id.to_string(),
                patch: PlanPatch {
                    parent_target_date: Some(date),
                    ..PlanPatch::default()
                },
            },
        );
        if transition.record != record {
            self.store.save(child_id, &transition.record)?;
            tracing::info!(
                parent = %parent_id,
                child = %child_id,
                %chapter_id,
                %date,
                "parent target date set"
            );
        }
        Ok(transition.record.plan(chapter_id).cloned())
    }

    /// Summary of a linked child's progress as of `today`.
    pub fn child_summary(
        &self,
        parent_id: &str,
        child_id: &str,
        today: NaiveDate,
    ) -> Result<ProgressSummary> {
        self.ensure_linked(parent_id, child_id)?;
        let record = self.store.load_or_default(child_id)?;
        let index = build_index(self.syllabus, &record, child_id);
        Ok(summarize(&record, &index, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadlines::DeadlineSource;
    use crate::error::CoreError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn self_link_is_rejected() {
        let store = ProgressStore::open_memory().unwrap();
        let syllabus = Syllabus::bundled();
        let monitor = ParentMonitor::new(&store, &syllabus);
        assert!(matches!(
            monitor.link("ava", "ava"),
            Err(CoreError::Validation(ValidationError::SelfLink(_)))
        ));
    }

    #[test]
    fn unlinked_parent_cannot_read_or_write() {
        let store = ProgressStore::open_memory().unwrap();
        let syllabus = Syllabus::bundled();
        let monitor = ParentMonitor::new(&store, &syllabus);

        assert!(matches!(
            monitor.child_summary("mum", "ava", today()),
            Err(CoreError::Validation(ValidationError::NotLinked { .. }))
        ));
        assert!(monitor
            .set_parent_target_date("mum", "ava", "math-polynomials", today())
            .is_err());
        assert!(store.load("ava").unwrap().is_none());
    }

    #[test]
    fn parent_target_date_leaves_child_fields_alone() {
        let store = ProgressStore::open_memory().unwrap();
        let syllabus = Syllabus::bundled();
        let own = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        let parents = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        let mut record = ProgressRecord::default();
        record.plan_mut("math-polynomials").merge(PlanPatch {
            target_date: Some(own),
            notes: Some("my notes".into()),
            ..PlanPatch::default()
        });
        store.save("ava", &record).unwrap();

        let monitor = ParentMonitor::new(&store, &syllabus);
        monitor.link("mum", "ava").unwrap();
        let updated = monitor
            .set_parent_target_date("mum", "ava", "math-polynomials", parents)
            .unwrap()
            .unwrap();
        assert_eq!(updated.parent_target_date, Some(parents));
        assert!(monitor
            .set_parent_target_date("mum", "ava", "not-a-chapter", parents)
            .unwrap()
            .is_none());

        let plan = store.load("ava").unwrap().unwrap().chapter_plans["math-polynomials"].clone();
        assert_eq!(plan.target_date, Some(own));
        assert_eq!(plan.parent_target_date, Some(parents));
        assert_eq!(plan.notes.as_deref(), Some("my notes"));

        let summary = monitor.child_summary("mum", "ava", today()).unwrap();
        assert_eq!(summary.deadlines[0].source, DeadlineSource::Parent);
        assert_eq!(summary.deadlines[0].days_remaining, 5);
    }

    #[test]
    fn target_date_for_child_without_record_writes_nothing() {
        let store = ProgressStore::open_memory().unwrap();
        let syllabus = Syllabus::bundled();
        let monitor = ParentMonitor::new(&store, &syllabus);
        monitor.link("mum", "ava").unwrap();

        let result = monitor.set_parent_target_date("mum", "ava", "math-polynomials", today());
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::UnknownUser(ref id))) if id == "ava"
        ));
        assert!(store.load("ava").unwrap().is_none());
        assert!(store.users().unwrap().is_empty());
    }

    #[test]
    fn repeating_the_same_target_date_is_a_no_op() {
        let store = ProgressStore::open_memory().unwrap();
        let syllabus = Syllabus::bundled();
        store.save("ava", &ProgressRecord::default()).unwrap();
        let monitor = ParentMonitor::new(&store, &syllabus);
        monitor.link("mum", "ava").unwrap();

        monitor
            .set_parent_target_date("mum", "ava", "math-polynomials", today())
            .unwrap();
        let first: String = store
            .conn
            .query_row("SELECT updated_at FROM progress WHERE user_id = 'ava'", [], |r| r.get(0))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        monitor
            .set_parent_target_date("mum", "ava", "math-polynomials", today())
            .unwrap();
        let second: String = store
            .conn
            .query_row("SELECT updated_at FROM progress WHERE user_id = 'ava'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn summary_counts_per_subject() {
        let store = ProgressStore::open_memory().unwrap();
        let syllabus = Syllabus::bundled();
        let index = SyllabusIndex::build(&syllabus, &[]).unwrap();

        let mut record = ProgressRecord::default();
        record.completed_chapter_ids.insert("eng-letter-writing".into());
        record.completed_chapter_ids.insert("math-statistics".into());
        record.gain(630);
        store.save("ava", &record).unwrap();

        let summary = summarize(&record, &index, today());
        assert_eq!(summary.level, 2);
        assert_eq!(summary.xp_into_level, 130);
        assert_eq!(summary.chapters_completed, 2);
        assert_eq!(summary.chapters_total, index.chapter_count());

        let english = summary
            .subjects
            .iter()
            .find(|s| s.subject_id == "english")
            .unwrap();
        assert_eq!((english.completed, english.total, english.percent), (1, 1, 100));
        let math = summary.subjects.iter().find(|s| s.subject_id == "math").unwrap();
        assert_eq!(math.percent, 33);
    }
}
