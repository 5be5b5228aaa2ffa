use clap::Subcommand;

use super::{print_outcome, Context};

#[derive(Subcommand)]
pub enum ChapterAction {
    /// Mark a chapter complete and collect its reward
    Complete {
        /// Chapter ID
        chapter_id: String,
    },
    /// Reopen a completed chapter, giving back its reward
    Uncomplete {
        /// Chapter ID
        chapter_id: String,
    },
    /// Re-check a chapter against its sub-topics
    Reconcile {
        /// Chapter ID
        chapter_id: String,
    },
}

pub fn run(ctx: &Context, action: ChapterAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = ctx.session()?;
    let events = match action {
        ChapterAction::Complete { chapter_id } => session.complete_chapter(&chapter_id)?,
        ChapterAction::Uncomplete { chapter_id } => session.uncomplete_chapter(&chapter_id)?,
        ChapterAction::Reconcile { chapter_id } => session.reconcile_chapter(&chapter_id)?,
    };
    print_outcome(&session, &events)
}
