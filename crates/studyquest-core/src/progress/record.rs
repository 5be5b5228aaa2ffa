//! Persisted progress data: the per-user record, settings, and chapter plans.
//!
//! Field names serialize in camelCase so the stored JSON keeps the layout
//! `{ experience, level, completedChapterIds, ... }`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::level::level_for;
use crate::syllabus::Chapter;

/// One student's mastery state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub experience: u64,
    #[serde(default = "default_level")]
    pub level: u64,
    #[serde(default)]
    pub completed_chapter_ids: BTreeSet<String>,
    #[serde(default)]
    pub completed_sub_topic_ids: BTreeSet<String>,
    #[serde(default)]
    pub streak: u32,
    /// Instant of the last streak evaluation; `None` until the first session.
    #[serde(default)]
    pub last_visit_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub chapter_plans: BTreeMap<String, Plan>,
}

fn default_level() -> u64 {
    1
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            experience: 0,
            level: 1,
            completed_chapter_ids: BTreeSet::new(),
            completed_sub_topic_ids: BTreeSet::new(),
            streak: 0,
            last_visit_date: None,
            settings: Settings::default(),
            chapter_plans: BTreeMap::new(),
        }
    }
}

impl ProgressRecord {
    pub fn is_chapter_completed(&self, chapter_id: &str) -> bool {
        self.completed_chapter_ids.contains(chapter_id)
    }

    pub fn is_sub_topic_completed(&self, sub_topic_id: &str) -> bool {
        self.completed_sub_topic_ids.contains(sub_topic_id)
    }

    pub fn plan(&self, chapter_id: &str) -> Option<&Plan> {
        self.chapter_plans.get(chapter_id)
    }

    /// Add experience and re-derive the level.
    pub(crate) fn gain(&mut self, amount: u64) {
        self.experience = self.experience.saturating_add(amount);
        self.level = level_for(self.experience);
    }

    /// Subtract experience, clamped at zero, and re-derive the level.
    pub(crate) fn lose(&mut self, amount: u64) {
        self.experience = self.experience.saturating_sub(amount);
        self.level = level_for(self.experience);
    }

    /// Force the stored level back in line with experience.
    ///
    /// Records written by hand or by older builds may carry a stale level.
    pub fn normalize(&mut self) {
        self.level = level_for(self.experience);
    }

    pub(crate) fn plan_mut(&mut self, chapter_id: &str) -> &mut Plan {
        self.chapter_plans
            .entry(chapter_id.to_string())
            .or_insert_with(|| Plan::new(chapter_id))
    }
}

/// Student preferences plus custom syllabus additions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub grade: Option<u8>,
    #[serde(default)]
    pub custom_chapters: Vec<CustomChapter>,
}

fn default_locale() -> String {
    "en".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exam_date: None,
            locale: default_locale(),
            grade: None,
            custom_chapters: Vec::new(),
        }
    }
}

/// A student-authored chapter attached to an existing subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomChapter {
    pub subject_id: String,
    pub chapter: Chapter,
}

/// Partial settings update. Only fields that are `Some` are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub grade: Option<u8>,
    #[serde(default)]
    pub custom_chapters: Option<Vec<CustomChapter>>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.exam_date.is_none()
            && self.locale.is_none()
            && self.grade.is_none()
            && self.custom_chapters.is_none()
    }
}

impl Settings {
    pub(crate) fn merge(&mut self, patch: SettingsPatch) {
        if let Some(date) = patch.exam_date {
            self.exam_date = Some(date);
        }
        if let Some(locale) = patch.locale {
            self.locale = locale;
        }
        if let Some(grade) = patch.grade {
            self.grade = Some(grade);
        }
        if let Some(chapters) = patch.custom_chapters {
            self.custom_chapters = chapters;
        }
    }
}

/// A student's task list and deadlines for one chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub chapter_id: String,
    #[serde(default)]
    pub tasks: Vec<PlanTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    /// Deadline set by a linked parent account, independent of `target_date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_target_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Plan {
    pub fn new(chapter_id: &str) -> Self {
        Self {
            chapter_id: chapter_id.to_string(),
            tasks: Vec::new(),
            target_date: None,
            parent_target_date: None,
            notes: None,
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&PlanTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub(crate) fn merge(&mut self, patch: PlanPatch) {
        if let Some(date) = patch.target_date {
            self.target_date = Some(date);
        }
        if let Some(date) = patch.parent_target_date {
            self.parent_target_date = Some(date);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
    }
}

/// Partial plan update. Only fields that are `Some` are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPatch {
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub parent_target_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(rename = "type")]
    pub task_type: TaskType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Read,
    Video,
    Practice,
    Notes,
    #[default]
    Other,
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(TaskType::Read),
            "video" => Ok(TaskType::Video),
            "practice" => Ok(TaskType::Practice),
            "notes" => Ok(TaskType::Notes),
            "other" => Ok(TaskType::Other),
            _ => Err(format!(
                "unknown task type '{s}' (expected read, video, practice, notes or other)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_persisted_field_names() {
        let mut record = ProgressRecord::default();
        record.completed_chapter_ids.insert("ch1".into());
        record.plan_mut("ch1").tasks.push(PlanTask {
            id: "t1".into(),
            text: "Read section 2".into(),
            is_completed: false,
            task_type: TaskType::Read,
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["completedChapterIds"][0], "ch1");
        assert!(json["completedSubTopicIds"].as_array().unwrap().is_empty());
        assert_eq!(json["chapterPlans"]["ch1"]["chapterId"], "ch1");
        assert_eq!(json["chapterPlans"]["ch1"]["tasks"][0]["type"], "read");
        assert_eq!(json["chapterPlans"]["ch1"]["tasks"][0]["isCompleted"], false);
        assert!(json["chapterPlans"]["ch1"].get("targetDate").is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let record: ProgressRecord = serde_json::from_str(r#"{"experience": 620}"#).unwrap();
        assert_eq!(record.experience, 620);
        assert_eq!(record.level, 1);
        assert_eq!(record.settings.locale, "en");
        assert!(record.last_visit_date.is_none());
    }

    #[test]
    fn normalize_rederives_level() {
        let mut record: ProgressRecord =
            serde_json::from_str(r#"{"experience": 620, "level": 9}"#).unwrap();
        record.normalize();
        assert_eq!(record.level, 2);
    }

    #[test]
    fn lose_clamps_at_zero() {
        let mut record = ProgressRecord::default();
        record.gain(30);
        record.lose(100);
        assert_eq!(record.experience, 0);
        assert_eq!(record.level, 1);
    }

    #[test]
    fn settings_merge_only_touches_given_fields() {
        let mut settings = Settings {
            grade: Some(9),
            ..Settings::default()
        };
        settings.merge(SettingsPatch {
            locale: Some("hi".into()),
            ..SettingsPatch::default()
        });
        assert_eq!(settings.locale, "hi");
        assert_eq!(settings.grade, Some(9));
    }

    #[test]
    fn task_type_parses_case_insensitively() {
        assert_eq!("Video".parse::<TaskType>().unwrap(), TaskType::Video);
        assert!("quiz".parse::<TaskType>().is_err());
    }
}
