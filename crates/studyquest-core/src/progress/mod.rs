mod engine;
pub mod level;
mod record;
pub mod streak;

pub use engine::{Command, ProgressEngine, Transition};
pub use level::{
    level_for, level_progress, xp_into_level, xp_to_next_level, SUB_TOPIC_XP, XP_PER_LEVEL,
};
pub use record::{
    CustomChapter, Plan, PlanPatch, PlanTask, ProgressRecord, Settings, SettingsPatch, TaskType,
};
