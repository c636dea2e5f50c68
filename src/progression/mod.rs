//! Progression engine: points, derived levels and badges.
//!
//! - `level`: the points → level rule
//! - `profile`: the persisted learner snapshot
//! - `engine`: session-scoped owner of a snapshot that persists and
//!   publishes on every change

mod engine;
mod level;
mod profile;

pub use engine::{Persistence, ProgressionEngine, SNAPSHOT_CACHE_KEY};
pub use level::{LevelRules, DEFAULT_LEVEL_THRESHOLD};
pub use profile::{ProfileUpdate, UserProfile, WELCOME_BADGE};
