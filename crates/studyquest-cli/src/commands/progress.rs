use clap::Subcommand;
use serde::Serialize;
use studyquest_core::parent::{summarize, ProgressSummary};
use studyquest_core::progress::level_progress;
use studyquest_core::ProgressRecord;

use super::{today, Context};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Show the full progress record
    Show,
    /// Show level, streak and per-subject completion
    Summary,
    /// List every user with a stored record
    Users,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowOutput<'a> {
    user: &'a str,
    level_progress: f64,
    record: &'a ProgressRecord,
}

pub fn run(ctx: &Context, action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    if let ProgressAction::Users = action {
        println!("{}", serde_json::to_string_pretty(&ctx.store.users()?)?);
        return Ok(());
    }

    let session = ctx.session()?;
    match action {
        ProgressAction::Show => {
            let out = ShowOutput {
                user: session.user_id(),
                level_progress: level_progress(session.record().experience),
                record: session.record(),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ProgressAction::Summary => {
            let summary: ProgressSummary = summarize(session.record(), session.index(), today());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        ProgressAction::Users => {}
    }
    Ok(())
}
