use clap::Subcommand;
use serde::Serialize;
use studyquest_core::syllabus::IndexedChapter;

use super::Context;

#[derive(Subcommand)]
pub enum SyllabusAction {
    /// Print the active syllabus as JSON
    List,
    /// Show one chapter (custom chapters included) and the user's progress on it
    Chapter {
        /// Chapter ID
        chapter_id: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChapterOutput<'a> {
    #[serde(flatten)]
    indexed: &'a IndexedChapter,
    completed: bool,
    completed_sub_topics: Vec<&'a str>,
}

pub fn run(ctx: &Context, action: SyllabusAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SyllabusAction::List => {
            println!("{}", serde_json::to_string_pretty(&ctx.syllabus)?);
        }
        SyllabusAction::Chapter { chapter_id } => {
            let session = ctx.session()?;
            let indexed = session
                .index()
                .indexed_chapter(&chapter_id)
                .ok_or_else(|| format!("unknown chapter: {chapter_id}"))?;
            let record = session.record();
            let out = ChapterOutput {
                indexed,
                completed: record.is_chapter_completed(&chapter_id),
                completed_sub_topics: indexed
                    .chapter
                    .sub_topic_ids()
                    .filter(|id| record.is_sub_topic_completed(id))
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
