//! Gamification and localization core for a multilingual learning front-end.
//!
//! UI action → [`progression::ProgressionEngine`] mutates the learner's
//! snapshot → the engine publishes a [`relay::ProgressionEvent`] on the
//! [`relay::NotificationRelay`] → a [`celebration::CelebrationSequencer`]
//! shows a timed celebration. [`i18n`] is used independently by anything
//! that renders text.

pub mod celebration;
pub mod config;
pub mod consent;
pub mod course;
pub mod effects;
pub mod i18n;
pub mod identity;
pub mod progression;
pub mod relay;
pub mod session;
pub mod store;
