use clap::Subcommand;

use super::{print_outcome, Context};

#[derive(Subcommand)]
pub enum SubTopicAction {
    /// Flip a sub-topic between done and not done
    Toggle {
        /// Sub-topic ID
        sub_topic_id: String,
    },
}

pub fn run(ctx: &Context, action: SubTopicAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = ctx.session()?;
    let events = match action {
        SubTopicAction::Toggle { sub_topic_id } => session.toggle_sub_topic(&sub_topic_id)?,
    };
    print_outcome(&session, &events)
}
