//! Progress engine: a pure state transition over a [`ProgressRecord`].
//!
//! `apply(record, command)` returns the next record plus the events the
//! change produced. Nothing here touches storage or renders anything; the
//! session layer persists the record and the UI consumes the events.
//!
//! ## Chapter completion
//!
//! ```text
//! incomplete --completeChapter / all sub-topics done--> complete
//! complete   --uncompleteChapter / a sub-topic reopened--> incomplete
//! ```
//!
//! Every command is either a full transition or a no-op. Unknown ids and
//! already-satisfied preconditions are absorbed silently.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::level::SUB_TOPIC_XP;
use super::record::{PlanPatch, PlanTask, ProgressRecord, SettingsPatch, TaskType};
use super::streak;
use crate::events::{self, Celebration, Event};
use crate::syllabus::{Chapter, SyllabusIndex};

/// A user-invocable change to a progress record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    CompleteChapter {
        chapter_id: String,
        xp_reward: u64,
    },
    UncompleteChapter {
        chapter_id: String,
        xp_reward: u64,
    },
    ToggleSubTopic {
        sub_topic_id: String,
    },
    /// Re-run the cascade rule for one chapter without changing sub-topics.
    ReconcileChapter {
        chapter_id: String,
    },
    UpdateSettings {
        patch: SettingsPatch,
    },
    UpdateChapterPlan {
        chapter_id: String,
        patch: PlanPatch,
    },
    AddPlanTask {
        chapter_id: String,
        text: String,
        task_type: TaskType,
    },
    TogglePlanTask {
        chapter_id: String,
        task_id: String,
    },
    DeletePlanTask {
        chapter_id: String,
        task_id: String,
    },
}

/// Result of applying a command: the next record and what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub record: ProgressRecord,
    pub events: Vec<Event>,
}

impl Transition {
    pub fn celebrations(&self) -> Vec<Celebration> {
        events::celebrations(&self.events)
    }

    /// Id of the task created by an `AddPlanTask` command.
    pub fn added_task_id(&self) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            Event::TaskAdded { task_id, .. } => Some(task_id.as_str()),
            _ => None,
        })
    }
}

/// Applies [`Command`]s against a syllabus index.
///
/// The index is only consulted by the sub-topic cascade; chapter rewards for
/// the explicit completion commands are supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEngine<'a> {
    index: &'a SyllabusIndex,
}

impl<'a> ProgressEngine<'a> {
    pub fn new(index: &'a SyllabusIndex) -> Self {
        Self { index }
    }

    pub fn apply(&self, record: &ProgressRecord, command: Command) -> Transition {
        let mut next = record.clone();
        let mut events = Vec::new();
        let level_before = record.level;

        match command {
            Command::CompleteChapter {
                chapter_id,
                xp_reward,
            } => complete_chapter(&mut next, &mut events, &chapter_id, xp_reward),
            Command::UncompleteChapter {
                chapter_id,
                xp_reward,
            } => uncomplete_chapter(&mut next, &mut events, &chapter_id, xp_reward),
            Command::ToggleSubTopic { sub_topic_id } => {
                self.toggle_sub_topic(&mut next, &mut events, &sub_topic_id)
            }
            Command::ReconcileChapter { chapter_id } => match self.index.chapter(&chapter_id) {
                Some(chapter) => reconcile_chapter(&mut next, &mut events, chapter),
                None => tracing::debug!(%chapter_id, "reconcile: unknown chapter"),
            },
            Command::UpdateSettings { patch } => next.settings.merge(patch),
            Command::UpdateChapterPlan { chapter_id, patch } => {
                next.plan_mut(&chapter_id).merge(patch)
            }
            Command::AddPlanTask {
                chapter_id,
                text,
                task_type,
            } => add_plan_task(&mut next, &mut events, &chapter_id, text, task_type),
            Command::TogglePlanTask {
                chapter_id,
                task_id,
            } => toggle_plan_task(&mut next, &chapter_id, &task_id),
            Command::DeletePlanTask {
                chapter_id,
                task_id,
            } => delete_plan_task(&mut next, &chapter_id, &task_id),
        }

        if next.level != level_before {
            events.push(Event::LevelChanged {
                from: level_before,
                to: next.level,
            });
        }

        Transition {
            record: next,
            events,
        }
    }

    /// Session-start streak check. See [`streak::evaluate`].
    pub fn evaluate_streak<Tz: TimeZone>(
        &self,
        record: &ProgressRecord,
        now: &DateTime<Tz>,
    ) -> Transition {
        streak::evaluate(record, now)
    }

    fn toggle_sub_topic(
        &self,
        record: &mut ProgressRecord,
        events: &mut Vec<Event>,
        sub_topic_id: &str,
    ) {
        let Some(chapter) = self.index.owning_chapter(sub_topic_id) else {
            tracing::debug!(%sub_topic_id, "toggle: sub-topic not in syllabus");
            return;
        };

        if record.completed_sub_topic_ids.remove(sub_topic_id) {
            record.lose(SUB_TOPIC_XP);
            events.push(Event::SubTopicReopened {
                sub_topic_id: sub_topic_id.to_string(),
            });
        } else {
            record.completed_sub_topic_ids.insert(sub_topic_id.to_string());
            record.gain(SUB_TOPIC_XP);
            events.push(Event::SubTopicCompleted {
                sub_topic_id: sub_topic_id.to_string(),
            });
            events.push(Event::Celebrate {
                intensity: Celebration::Minor,
            });
        }

        reconcile_chapter(record, events, chapter);
    }
}

fn complete_chapter(
    record: &mut ProgressRecord,
    events: &mut Vec<Event>,
    chapter_id: &str,
    xp_reward: u64,
) {
    if record.is_chapter_completed(chapter_id) {
        tracing::debug!(%chapter_id, "complete: already completed");
        return;
    }
    let level_before = record.level;
    record.completed_chapter_ids.insert(chapter_id.to_string());
    record.gain(xp_reward);
    events.push(Event::ChapterCompleted {
        chapter_id: chapter_id.to_string(),
        xp_reward,
    });
    let intensity = if record.level > level_before {
        Celebration::Major
    } else {
        Celebration::Minor
    };
    events.push(Event::Celebrate { intensity });
}

fn uncomplete_chapter(
    record: &mut ProgressRecord,
    events: &mut Vec<Event>,
    chapter_id: &str,
    xp_reward: u64,
) {
    if !record.completed_chapter_ids.remove(chapter_id) {
        tracing::debug!(%chapter_id, "uncomplete: not completed");
        return;
    }
    record.lose(xp_reward);
    events.push(Event::ChapterReopened {
        chapter_id: chapter_id.to_string(),
        xp_reward,
    });
}

/// Bring a chapter's completion flag in line with its sub-topics.
///
/// Chapters without sub-topics are left alone; they only move through the
/// explicit complete/uncomplete commands. Running this twice in a row is a
/// no-op the second time.
fn reconcile_chapter(record: &mut ProgressRecord, events: &mut Vec<Event>, chapter: &Chapter) {
    if !chapter.has_sub_topics() {
        return;
    }
    let all_done = chapter
        .sub_topic_ids()
        .all(|id| record.is_sub_topic_completed(id));
    let marked = record.is_chapter_completed(&chapter.chapter_id);

    match (all_done, marked) {
        (true, false) => {
            record
                .completed_chapter_ids
                .insert(chapter.chapter_id.clone());
            record.gain(chapter.xp_reward);
            events.push(Event::ChapterCompleted {
                chapter_id: chapter.chapter_id.clone(),
                xp_reward: chapter.xp_reward,
            });
            events.push(Event::Celebrate {
                intensity: Celebration::Major,
            });
        }
        (false, true) => {
            record.completed_chapter_ids.remove(&chapter.chapter_id);
            record.lose(chapter.xp_reward);
            events.push(Event::ChapterReopened {
                chapter_id: chapter.chapter_id.clone(),
                xp_reward: chapter.xp_reward,
            });
        }
        _ => {}
    }
}

fn add_plan_task(
    record: &mut ProgressRecord,
    events: &mut Vec<Event>,
    chapter_id: &str,
    text: String,
    task_type: TaskType,
) {
    let plan = record.plan_mut(chapter_id);
    let mut id = Uuid::new_v4().to_string();
    while plan.task(&id).is_some() {
        id = Uuid::new_v4().to_string();
    }
    plan.tasks.push(PlanTask {
        id: id.clone(),
        text,
        is_completed: false,
        task_type,
    });
    events.push(Event::TaskAdded {
        chapter_id: chapter_id.to_string(),
        task_id: id,
    });
}

fn toggle_plan_task(record: &mut ProgressRecord, chapter_id: &str, task_id: &str) {
    let task = record
        .chapter_plans
        .get_mut(chapter_id)
        .and_then(|plan| plan.tasks.iter_mut().find(|t| t.id == task_id));
    match task {
        Some(task) => task.is_completed = !task.is_completed,
        None => tracing::debug!(%chapter_id, %task_id, "toggle task: not found"),
    }
}

fn delete_plan_task(record: &mut ProgressRecord, chapter_id: &str, task_id: &str) {
    if let Some(plan) = record.chapter_plans.get_mut(chapter_id) {
        plan.tasks.retain(|t| t.id != task_id);
    }
}
