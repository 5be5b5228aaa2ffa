use chrono::NaiveDate;
use clap::Subcommand;
use studyquest_core::progress::CustomChapter;
use studyquest_core::SettingsPatch;

use super::{parse_date, Context};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the acting user's settings
    Show,
    /// Update settings; only the given fields change
    Set {
        /// Exam date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        exam_date: Option<NaiveDate>,
        /// Locale, e.g. "en" or "hi"
        #[arg(long)]
        locale: Option<String>,
        /// School grade
        #[arg(long)]
        grade: Option<u8>,
        /// JSON array of custom chapters: [{"subjectId": .., "chapter": {..}}]
        #[arg(long)]
        custom_chapters: Option<String>,
    },
}

pub fn run(ctx: &Context, action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = ctx.session()?;
    if let SettingsAction::Set {
        exam_date,
        locale,
        grade,
        custom_chapters,
    } = action
    {
        let custom_chapters = custom_chapters
            .map(|json| serde_json::from_str::<Vec<CustomChapter>>(&json))
            .transpose()?;
        let patch = SettingsPatch {
            exam_date,
            locale,
            grade,
            custom_chapters,
        };
        if patch.is_empty() {
            return Err("nothing to update".into());
        }
        session.update_settings(patch)?;
    }
    println!("{}", serde_json::to_string_pretty(&session.record().settings)?);
    Ok(())
}
