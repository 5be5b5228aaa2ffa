//! A signed-in user's working context.
//!
//! The session owns the user's progress record, runs the streak check once
//! when it starts, pushes every command through the [`ProgressEngine`], and
//! writes the record back to the store after each change.

use chrono::{DateTime, TimeZone};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::progress::{
    Command, PlanPatch, ProgressEngine, ProgressRecord, SettingsPatch, TaskType, Transition,
};
use crate::storage::ProgressStore;
use crate::syllabus::{Syllabus, SyllabusIndex};

pub struct Session<'s> {
    store: &'s ProgressStore,
    syllabus: &'s Syllabus,
    index: SyllabusIndex,
    user_id: String,
    record: ProgressRecord,
}

impl<'s> Session<'s> {
    /// Load (or create) `user_id`'s record and evaluate the daily streak.
    ///
    /// Returns the session together with the streak events.
    ///
    /// # Errors
    /// Returns an error if the record cannot be loaded or saved.
    pub fn start<Tz: TimeZone>(
        store: &'s ProgressStore,
        syllabus: &'s Syllabus,
        user_id: &str,
        now: &DateTime<Tz>,
    ) -> Result<(Self, Vec<Event>)> {
        let record = store.load_or_default(user_id)?;
        let index = build_index(syllabus, &record, user_id);
        let mut session = Self {
            store,
            syllabus,
            index,
            user_id: user_id.to_string(),
            record,
        };

        let transition = session.engine().evaluate_streak(&session.record, now);
        let events = session.commit(transition)?;
        tracing::info!(
            user = %session.user_id,
            streak = session.record.streak,
            level = session.record.level,
            "session started"
        );
        Ok((session, events))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn index(&self) -> &SyllabusIndex {
        &self.index
    }

    fn engine(&self) -> ProgressEngine<'_> {
        ProgressEngine::new(&self.index)
    }

    /// Apply any command and persist the result if it changed the record.
    pub fn apply(&mut self, command: Command) -> Result<Vec<Event>> {
        let transition = self.engine().apply(&self.record, command);
        self.commit(transition)
    }

    fn commit(&mut self, transition: Transition) -> Result<Vec<Event>> {
        if transition.record != self.record {
            self.store.save(&self.user_id, &transition.record)?;
            self.record = transition.record;
            tracing::debug!(user = %self.user_id, events = transition.events.len(), "record saved");
        }
        Ok(transition.events)
    }

    /// Complete a chapter using the syllabus reward. Unknown chapters are a no-op.
    pub fn complete_chapter(&mut self, chapter_id: &str) -> Result<Vec<Event>> {
        let Some(xp_reward) = self.index.xp_reward(chapter_id) else {
            tracing::debug!(%chapter_id, "complete: chapter not in syllabus");
            return Ok(Vec::new());
        };
        self.apply(Command::CompleteChapter {
            chapter_id: chapter_id.to_string(),
            xp_reward,
        })
    }

    pub fn uncomplete_chapter(&mut self, chapter_id: &str) -> Result<Vec<Event>> {
        let Some(xp_reward) = self.index.xp_reward(chapter_id) else {
            tracing::debug!(%chapter_id, "uncomplete: chapter not in syllabus");
            return Ok(Vec::new());
        };
        self.apply(Command::UncompleteChapter {
            chapter_id: chapter_id.to_string(),
            xp_reward,
        })
    }

    pub fn toggle_sub_topic(&mut self, sub_topic_id: &str) -> Result<Vec<Event>> {
        self.apply(Command::ToggleSubTopic {
            sub_topic_id: sub_topic_id.to_string(),
        })
    }

    pub fn reconcile_chapter(&mut self, chapter_id: &str) -> Result<Vec<Event>> {
        self.apply(Command::ReconcileChapter {
            chapter_id: chapter_id.to_string(),
        })
    }

    /// Merge settings. New custom chapters are validated against the
    /// syllabus before anything is written.
    ///
    /// # Errors
    /// Returns a validation error if the locale is blank or the custom
    /// chapters clash with existing chapter or sub-topic ids.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Vec<Event>> {
        if patch.locale.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(ValidationError::InvalidValue {
                field: "locale".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        let new_index = match &patch.custom_chapters {
            Some(custom) => Some(SyllabusIndex::build(self.syllabus, custom)?),
            None => None,
        };
        let events = self.apply(Command::UpdateSettings { patch })?;
        if let Some(index) = new_index {
            self.index = index;
        }
        Ok(events)
    }

    pub fn update_chapter_plan(
        &mut self,
        chapter_id: &str,
        patch: PlanPatch,
    ) -> Result<Vec<Event>> {
        self.apply(Command::UpdateChapterPlan {
            chapter_id: chapter_id.to_string(),
            patch,
        })
    }

    /// Append a task to a chapter's plan and return its id.
    ///
    /// Blank text is rejected here and `None` is returned.
    pub fn add_plan_task(
        &mut self,
        chapter_id: &str,
        text: &str,
        task_type: TaskType,
    ) -> Result<Option<String>> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!(%chapter_id, "add task: blank text rejected");
            return Ok(None);
        }
        let transition = self.engine().apply(
            &self.record,
            Command::AddPlanTask {
                chapter_id: chapter_id.to_string(),
                text: text.to_string(),
                task_type,
            },
        );
        let task_id = transition.added_task_id().map(str::to_string);
        self.commit(transition)?;
        Ok(task_id)
    }

    pub fn toggle_plan_task(&mut self, chapter_id: &str, task_id: &str) -> Result<Vec<Event>> {
        self.apply(Command::TogglePlanTask {
            chapter_id: chapter_id.to_string(),
            task_id: task_id.to_string(),
        })
    }

    pub fn delete_plan_task(&mut self, chapter_id: &str, task_id: &str) -> Result<Vec<Event>> {
        self.apply(Command::DeletePlanTask {
            chapter_id: chapter_id.to_string(),
            task_id: task_id.to_string(),
        })
    }
}

/// Index the syllabus plus the user's custom chapters. A record whose custom
/// chapters no longer fit the syllabus falls back to the plain syllabus.
pub(crate) fn build_index(
    syllabus: &Syllabus,
    record: &ProgressRecord,
    user_id: &str,
) -> SyllabusIndex {
    SyllabusIndex::build(syllabus, &record.settings.custom_chapters).unwrap_or_else(|e| {
        tracing::warn!(user = %user_id, "ignoring custom chapters: {e}");
        SyllabusIndex::build(syllabus, &[]).unwrap_or_default()
    })
}
