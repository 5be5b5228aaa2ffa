use std::collections::HashMap;

use serde::Serialize;

use super::{Chapter, Syllabus};
use crate::error::ValidationError;
use crate::progress::CustomChapter;

/// A chapter together with the subject it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedChapter {
    pub subject_id: String,
    pub chapter: Chapter,
}

/// Lookup tables built once from a syllabus.
///
/// Answers "which chapter owns this sub-topic" and "what is this chapter's
/// reward" without scanning the tree.
#[derive(Debug, Clone, Default)]
pub struct SyllabusIndex {
    chapters: HashMap<String, IndexedChapter>,
    sub_topic_owner: HashMap<String, String>,
    /// Subject ids in syllabus order, each with its chapter ids in order.
    subjects: Vec<(String, Vec<String>)>,
}

impl SyllabusIndex {
    /// Index `syllabus` plus any student-authored chapters.
    ///
    /// Custom chapters for an unknown subject open a new subject at the end.
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicateId`] when a chapter or sub-topic id
    /// appears more than once across the combined tree.
    pub fn build(syllabus: &Syllabus, custom: &[CustomChapter]) -> Result<Self, ValidationError> {
        let mut index = Self::default();
        for subject in &syllabus.subjects {
            for chapter in &subject.chapters {
                index.insert(&subject.subject_id, chapter)?;
            }
            index.subject_entry(&subject.subject_id);
        }
        for extra in custom {
            index.insert(&extra.subject_id, &extra.chapter)?;
        }
        Ok(index)
    }

    fn subject_entry(&mut self, subject_id: &str) -> &mut Vec<String> {
        let pos = match self.subjects.iter().position(|(id, _)| id == subject_id) {
            Some(pos) => pos,
            None => {
                self.subjects.push((subject_id.to_string(), Vec::new()));
                self.subjects.len() - 1
            }
        };
        &mut self.subjects[pos].1
    }

    fn insert(&mut self, subject_id: &str, chapter: &Chapter) -> Result<(), ValidationError> {
        if self.chapters.contains_key(&chapter.chapter_id) {
            return Err(ValidationError::DuplicateId {
                kind: "chapter".into(),
                id: chapter.chapter_id.clone(),
            });
        }
        for sub_topic in chapter.sub_topic_ids() {
            if self.sub_topic_owner.contains_key(sub_topic) {
                return Err(ValidationError::DuplicateId {
                    kind: "sub-topic".into(),
                    id: sub_topic.to_string(),
                });
            }
            self.sub_topic_owner
                .insert(sub_topic.to_string(), chapter.chapter_id.clone());
        }
        self.chapters.insert(
            chapter.chapter_id.clone(),
            IndexedChapter {
                subject_id: subject_id.to_string(),
                chapter: chapter.clone(),
            },
        );
        self.subject_entry(subject_id).push(chapter.chapter_id.clone());
        Ok(())
    }

    pub fn chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.get(chapter_id).map(|c| &c.chapter)
    }

    pub fn indexed_chapter(&self, chapter_id: &str) -> Option<&IndexedChapter> {
        self.chapters.get(chapter_id)
    }

    /// The chapter that owns `sub_topic_id`.
    pub fn owning_chapter(&self, sub_topic_id: &str) -> Option<&Chapter> {
        let chapter_id = self.sub_topic_owner.get(sub_topic_id)?;
        self.chapter(chapter_id)
    }

    pub fn xp_reward(&self, chapter_id: &str) -> Option<u64> {
        self.chapter(chapter_id).map(|c| c.xp_reward)
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Subject ids in order, with their chapters.
    pub fn subjects(&self) -> impl Iterator<Item = (&str, Vec<&Chapter>)> {
        self.subjects.iter().map(|(subject_id, chapter_ids)| {
            let chapters = chapter_ids
                .iter()
                .filter_map(|id| self.chapter(id))
                .collect();
            (subject_id.as_str(), chapters)
        })
    }
}
