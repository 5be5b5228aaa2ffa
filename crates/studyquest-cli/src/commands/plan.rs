//! Chapter plan commands: deadlines, notes and the task list.

use chrono::NaiveDate;
use clap::Subcommand;
use studyquest_core::{Plan, PlanPatch, TaskType};

use super::{parse_date, Context};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Show a chapter's plan
    Show {
        /// Chapter ID
        chapter_id: String,
    },
    /// Set a chapter's target date or notes
    Set {
        /// Chapter ID
        chapter_id: String,
        /// Target date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        target_date: Option<NaiveDate>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Add a task to a chapter's plan
    AddTask {
        /// Chapter ID
        chapter_id: String,
        /// Task text
        text: String,
        /// Task type: read, video, practice, notes or other (default: other)
        #[arg(long = "type", default_value = "other")]
        task_type: TaskType,
    },
    /// Toggle a task between done and not done
    ToggleTask {
        /// Chapter ID
        chapter_id: String,
        /// Task ID
        task_id: String,
    },
    /// Delete a task
    DeleteTask {
        /// Chapter ID
        chapter_id: String,
        /// Task ID
        task_id: String,
    },
}

pub fn run(ctx: &Context, action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = ctx.session()?;

    let chapter_id = match action {
        PlanAction::Show { chapter_id } => chapter_id,
        PlanAction::Set {
            chapter_id,
            target_date,
            notes,
        } => {
            if target_date.is_none() && notes.is_none() {
                return Err("nothing to update: pass --target-date and/or --notes".into());
            }
            session.update_chapter_plan(
                &chapter_id,
                PlanPatch {
                    target_date,
                    notes,
                    ..PlanPatch::default()
                },
            )?;
            chapter_id
        }
        PlanAction::AddTask {
            chapter_id,
            text,
            task_type,
        } => match session.add_plan_task(&chapter_id, &text, task_type)? {
            Some(task_id) => {
                eprintln!("Task added: {task_id}");
                chapter_id
            }
            None => return Err("task text must not be empty".into()),
        },
        PlanAction::ToggleTask {
            chapter_id,
            task_id,
        } => {
            session.toggle_plan_task(&chapter_id, &task_id)?;
            chapter_id
        }
        PlanAction::DeleteTask {
            chapter_id,
            task_id,
        } => {
            session.delete_plan_task(&chapter_id, &task_id)?;
            chapter_id
        }
    };

    let plan = session
        .record()
        .plan(&chapter_id)
        .cloned()
        .unwrap_or_else(|| Plan::new(&chapter_id));
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
