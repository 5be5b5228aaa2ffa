//! Parent account commands. The acting parent is the global `--user`.

use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;
use studyquest_core::ParentMonitor;

use super::{parse_date, today, Context};

#[derive(Subcommand)]
pub enum ParentAction {
    /// Link this account to a child
    Link {
        /// Child user ID
        child: String,
    },
    /// Remove the link to a child
    Unlink {
        /// Child user ID
        child: String,
    },
    /// List linked children
    Children,
    /// Show a linked child's progress summary
    Summary {
        /// Child user ID
        child: String,
    },
    /// Set the parent target date on a child's chapter plan
    SetTarget {
        /// Child user ID
        child: String,
        /// Chapter ID
        chapter_id: String,
        /// Target date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
}

/// Result of `parent link` / `parent unlink`: whether the link exists now,
/// and whether this command changed it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkOutput<'a> {
    parent: &'a str,
    child: &'a str,
    linked: bool,
    changed: bool,
}

pub fn run(ctx: &Context, action: ParentAction) -> Result<(), Box<dyn std::error::Error>> {
    let monitor = ParentMonitor::new(&ctx.store, &ctx.syllabus);
    let parent = ctx.user.as_str();

    let json = match action {
        ParentAction::Link { child } => {
            let changed = monitor.link(parent, &child)?;
            serde_json::to_string_pretty(&LinkOutput {
                parent,
                child: &child,
                linked: true,
                changed,
            })?
        }
        ParentAction::Unlink { child } => {
            let changed = monitor.unlink(parent, &child)?;
            serde_json::to_string_pretty(&LinkOutput {
                parent,
                child: &child,
                linked: false,
                changed,
            })?
        }
        ParentAction::Children => serde_json::to_string_pretty(&monitor.children(parent)?)?,
        ParentAction::Summary { child } => {
            serde_json::to_string_pretty(&monitor.child_summary(parent, &child, today())?)?
        }
        ParentAction::SetTarget {
            child,
            chapter_id,
            date,
        } => match monitor.set_parent_target_date(parent, &child, &chapter_id, date)? {
            Some(plan) => serde_json::to_string_pretty(&plan)?,
            None => return Err(format!("unknown chapter: {chapter_id}").into()),
        },
    };
    println!("{json}");
    Ok(())
}
