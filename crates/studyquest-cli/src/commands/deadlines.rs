use clap::Args;
use studyquest_core::deadlines::{deadlines, due_within};

use super::{today, Context};

#[derive(Args)]
pub struct DeadlinesArgs {
    /// Only show deadlines at most this many days away (overdue included)
    #[arg(long)]
    within: Option<u32>,
    /// Use the configured warning window instead of --within
    #[arg(long, conflicts_with = "within")]
    upcoming: bool,
}

pub fn run(ctx: &Context, args: DeadlinesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = ctx.session()?;
    let window = if args.upcoming {
        Some(ctx.config.deadlines.warning_days)
    } else {
        args.within
    };
    let list = match window {
        Some(days) => due_within(session.record(), today(), days),
        None => deadlines(session.record(), today()),
    };
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
