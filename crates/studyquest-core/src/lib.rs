//! # StudyQuest Core Library
//!
//! Core logic for StudyQuest, a gamified self-study tracker. Students earn
//! experience by completing syllabus chapters and sub-topics, level up every
//! 500 xp, keep a daily visit streak, and plan each chapter with tasks and
//! deadlines. Parents can link to a child, set target dates, and read a
//! progress summary. All operations are available through the standalone
//! CLI binary.
//!
//! ## Architecture
//!
//! - **Progress Engine**: a pure `(record, command) -> (record, events)`
//!   transition with the sub-topic → chapter cascade rule
//! - **Syllabus**: read-only subject/chapter/sub-topic tree and its lookup index
//! - **Storage**: SQLite progress store and TOML configuration
//! - **Session**: one user's record, persisted after every change
//!
//! ## Key Components
//!
//! - [`ProgressEngine`]: Core progress state machine
//! - [`Session`]: Streak check at start, persistence after each command
//! - [`ProgressStore`]: Record and parent-link persistence
//! - [`Config`]: Application configuration management

pub mod deadlines;
pub mod error;
pub mod events;
pub mod parent;
pub mod progress;
pub mod session;
pub mod storage;
pub mod syllabus;

pub use deadlines::{Deadline, DeadlineSource};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{Celebration, Event};
pub use parent::{ParentMonitor, ProgressSummary};
pub use progress::{
    Command, Plan, PlanPatch, PlanTask, ProgressEngine, ProgressRecord, Settings, SettingsPatch,
    TaskType, Transition,
};
pub use session::Session;
pub use storage::{Config, ProgressStore};
pub use syllabus::{Syllabus, SyllabusIndex};
