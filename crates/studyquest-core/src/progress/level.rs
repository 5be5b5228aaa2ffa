//! Level arithmetic. A level is never stored on its own; it is always
//! derived from total experience.

pub const XP_PER_LEVEL: u64 = 500;

/// Fixed reward for completing a single sub-topic.
pub const SUB_TOPIC_XP: u64 = 20;

pub fn level_for(experience: u64) -> u64 {
    1 + experience / XP_PER_LEVEL
}

/// Experience earned since the start of the current level.
pub fn xp_into_level(experience: u64) -> u64 {
    experience % XP_PER_LEVEL
}

pub fn xp_to_next_level(experience: u64) -> u64 {
    XP_PER_LEVEL - xp_into_level(experience)
}

/// 0.0..1.0 progress within current level
pub fn level_progress(experience: u64) -> f64 {
    xp_into_level(experience) as f64 / XP_PER_LEVEL as f64
}
