//! Read-only syllabus data: subjects → chapters → sub-topics.
//!
//! The syllabus is reference data supplied from outside the engine. It is
//! loaded from JSON, either a file named in the config or the bundled
//! default, and never mutated.

mod index;

pub use index::{IndexedChapter, SyllabusIndex};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

const BUNDLED_SYLLABUS: &str = include_str!("../../data/syllabus.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Syllabus {
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub subject_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub chapter_id: String,
    #[serde(default)]
    pub name: String,
    pub xp_reward: u64,
    #[serde(default)]
    pub subtopics: Vec<SubTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTopic {
    pub sub_topic_id: String,
    #[serde(default)]
    pub name: String,
}

impl Chapter {
    pub fn has_sub_topics(&self) -> bool {
        !self.subtopics.is_empty()
    }

    pub fn sub_topic_ids(&self) -> impl Iterator<Item = &str> {
        self.subtopics.iter().map(|s| s.sub_topic_id.as_str())
    }
}

impl Syllabus {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a syllabus from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid syllabus.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let syllabus = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            subjects = syllabus.subjects.len(),
            "syllabus loaded"
        );
        Ok(syllabus)
    }

    /// The small syllabus shipped with the crate, used when none is configured.
    pub fn bundled() -> Self {
        serde_json::from_str(BUNDLED_SYLLABUS).unwrap_or_else(|e| {
            tracing::warn!("bundled syllabus is invalid: {e}");
            Self {
                subjects: Vec::new(),
            }
        })
    }

    pub fn chapter_count(&self) -> usize {
        self.subjects.iter().map(|s| s.chapters.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_syllabus_parses() {
        let syllabus = Syllabus::bundled();
        assert!(!syllabus.subjects.is_empty());
        assert!(syllabus.chapter_count() >= 5);
    }

    #[test]
    fn parses_camel_case_tree() {
        let json = r#"[
            {"subjectId": "s", "chapters": [
                {"chapterId": "c", "xpReward": 40, "subtopics": [{"subTopicId": "t"}]}
            ]}
        ]"#;
        let syllabus = Syllabus::from_json_str(json).unwrap();
        let chapter = &syllabus.subjects[0].chapters[0];
        assert_eq!(chapter.xp_reward, 40);
        assert_eq!(chapter.sub_topic_ids().collect::<Vec<_>>(), vec!["t"]);
    }

    #[test]
    fn rejects_chapter_without_reward() {
        let json = r#"[{"subjectId": "s", "chapters": [{"chapterId": "c"}]}]"#;
        assert!(Syllabus::from_json_str(json).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Syllabus::load(&dir.path().join("missing.json"));
        assert!(matches!(
            result,
            Err(CoreError::Io { ref path, .. }) if path.ends_with("missing.json")
        ));
    }
}
