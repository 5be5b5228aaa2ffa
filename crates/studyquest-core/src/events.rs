use serde::{Deserialize, Serialize};

/// Intensity tag for a celebration the UI may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Celebration {
    /// Level increased, or a chapter completed through its sub-topics.
    Major,
    Minor,
}

/// Every state change in the progress engine produces one or more Events.
/// The engine never renders anything; callers decide what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    Celebrate {
        intensity: Celebration,
    },
    ChapterCompleted {
        chapter_id: String,
        xp_reward: u64,
    },
    ChapterReopened {
        chapter_id: String,
        xp_reward: u64,
    },
    SubTopicCompleted {
        sub_topic_id: String,
    },
    SubTopicReopened {
        sub_topic_id: String,
    },
    LevelChanged {
        from: u64,
        to: u64,
    },
    TaskAdded {
        chapter_id: String,
        task_id: String,
    },
    StreakUpdated {
        from: u32,
        to: u32,
    },
}

impl Event {
    /// The celebration tag carried by this event, if any.
    pub fn celebration(&self) -> Option<Celebration> {
        match self {
            Event::Celebrate { intensity } => Some(*intensity),
            _ => None,
        }
    }
}

/// Collect the celebration tags from a batch of events, in emission order.
pub fn celebrations(events: &[Event]) -> Vec<Celebration> {
    events.iter().filter_map(Event::celebration).collect()
}
