//! Decorative effects capability (confetti bursts and sound cues).
//!
//! Effects are optional: every call goes through [`play_quietly`] and
//! friends, which log failures at debug level and discard them.

use crate::relay::EventTag;
use serde::Serialize;
use tracing::{debug, info};

/// Where a burst originates, as fractions of the viewport (0.0-1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Origin {
    pub x: f32,
    pub y: f32,
}

/// Parameters of one time-bounded particle burst.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectParams {
    pub particle_count: u32,
    /// Spread angle in degrees
    pub spread: u32,
    pub origin: Origin,
    /// Hex colors, e.g. `#FFD700`
    pub colors: Vec<&'static str>,
}

impl EffectParams {
    /// Big golden burst for a level-up.
    pub fn level_up() -> Self {
        Self {
            particle_count: 150,
            spread: 90,
            origin: Origin { x: 0.5, y: 0.6 },
            colors: vec!["#FFD700", "#FFA500", "#FF6347"],
        }
    }

    /// Smaller, cooler burst for a new badge.
    pub fn new_badge() -> Self {
        Self {
            particle_count: 80,
            spread: 60,
            origin: Origin { x: 0.5, y: 0.7 },
            colors: vec!["#8A2BE2", "#4169E1", "#00CED1"],
        }
    }

    pub fn for_tag(tag: EventTag) -> Self {
        match tag {
            EventTag::LevelUp => Self::level_up(),
            EventTag::NewBadge => Self::new_badge(),
        }
    }
}

/// Sound cue accompanying a celebration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Fanfare,
    Chime,
}

impl SoundCue {
    pub fn for_tag(tag: EventTag) -> Self {
        match tag {
            EventTag::LevelUp => SoundCue::Fanfare,
            EventTag::NewBadge => SoundCue::Chime,
        }
    }
}

/// Renders decorative effects. Implementations may fail freely; callers
/// never propagate those failures.
///
/// The celebration sequencer calls these with its state lock held, so an
/// implementation must not call back into the sequencer.
pub trait EffectsProvider: Send + Sync {
    fn play(&self, params: &EffectParams) -> anyhow::Result<()>;

    /// Stop whatever is still animating.
    fn cancel(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn play_sound(&self, _cue: SoundCue) -> anyhow::Result<()> {
        Ok(())
    }
}

pub fn play_quietly(effects: &dyn EffectsProvider, params: &EffectParams) {
    if let Err(e) = effects.play(params) {
        debug!("Effect playback failed: {}", e);
    }
}

pub fn cancel_quietly(effects: &dyn EffectsProvider) {
    if let Err(e) = effects.cancel() {
        debug!("Effect cancel failed: {}", e);
    }
}

pub fn play_sound_quietly(effects: &dyn EffectsProvider, cue: SoundCue) {
    if let Err(e) = effects.play_sound(cue) {
        debug!("Sound playback failed: {}", e);
    }
}

/// Provider for headless runs: writes each effect to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEffects;

impl EffectsProvider for LoggingEffects {
    fn play(&self, params: &EffectParams) -> anyhow::Result<()> {
        info!(
            "🎉 Confetti: {} particles, spread {}°, colors {:?}",
            params.particle_count, params.spread, params.colors
        );
        Ok(())
    }

    fn play_sound(&self, cue: SoundCue) -> anyhow::Result<()> {
        info!("🔔 Sound: {:?}", cue);
        Ok(())
    }
}
