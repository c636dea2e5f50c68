//! Celebration sequencer: turns progression events into a timed banner plus
//! a decorative effect.
//!
//! States are `Idle` and `Showing(event)`. A new event always replaces the
//! one on screen (last-event-wins, no queue). Each celebration arms a
//! dismiss timer; replacing the celebration aborts that timer, and a
//! generation counter makes sure a timer that already fired for an older
//! celebration cannot dismiss the newer one.

use crate::effects::{
    cancel_quietly, play_quietly, play_sound_quietly, EffectParams, EffectsProvider, SoundCue,
};
use crate::i18n::{Language, TranslationCatalog};
use crate::relay::{EventTag, NotificationRelay, ProgressionEvent, SubscriptionId};
use anyhow::Context;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// How long each kind of celebration stays on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationConfig {
    pub level_up: Duration,
    pub new_badge: Duration,
}

impl CelebrationConfig {
    pub fn duration_for(&self, tag: EventTag) -> Duration {
        match tag {
            EventTag::LevelUp => self.level_up,
            EventTag::NewBadge => self.new_badge,
        }
    }
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            level_up: Duration::from_secs(5),
            new_badge: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CelebrationState {
    Idle,
    Showing {
        event: ProgressionEvent,
        deadline: Instant,
    },
}

/// Localized banner text for the current celebration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub title: String,
    pub message: String,
}

struct Inner {
    state: CelebrationState,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    subscriptions: Vec<(EventTag, SubscriptionId)>,
}

/// Presentation listener for progression events. Cheap to clone; clones
/// share state.
#[derive(Clone)]
pub struct CelebrationSequencer {
    inner: Arc<Mutex<Inner>>,
    effects: Arc<dyn EffectsProvider>,
    config: CelebrationConfig,
}

impl CelebrationSequencer {
    pub fn new(effects: Arc<dyn EffectsProvider>, config: CelebrationConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: CelebrationState::Idle,
                generation: 0,
                timer: None,
                subscriptions: Vec::new(),
            })),
            effects,
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to both event tags on `relay`.
    ///
    /// Pair every `attach` with a [`CelebrationSequencer::detach`] on teardown.
    pub fn attach(&self, relay: &NotificationRelay) {
        let ids: Vec<_> = EventTag::ALL
            .into_iter()
            .map(|tag| {
                let sequencer = self.clone();
                (tag, relay.subscribe(tag, move |event| sequencer.show(event)))
            })
            .collect();
        self.lock().subscriptions.extend(ids);
    }

    /// Remove every subscription made by [`CelebrationSequencer::attach`].
    pub fn detach(&self, relay: &NotificationRelay) {
        let subscriptions = std::mem::take(&mut self.lock().subscriptions);
        for (tag, id) in subscriptions {
            relay.unsubscribe(tag, id);
        }
    }

    /// Start (or replace) the celebration for `event`.
    ///
    /// Must run inside a Tokio runtime, which drives the dismiss timer.
    pub fn show(&self, event: &ProgressionEvent) -> anyhow::Result<()> {
        let runtime = Handle::try_current().context("celebration timer needs a Tokio runtime")?;
        let tag = event.tag();
        let deadline = Instant::now() + self.config.duration_for(tag);

        // Effect calls stay under the state lock so they land in the same
        // order as the transitions they belong to.
        let generation = {
            let mut inner = self.lock();
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            if matches!(inner.state, CelebrationState::Showing { .. }) {
                debug!("Replacing active celebration with {}", tag);
                cancel_quietly(self.effects.as_ref());
            }
            inner.generation += 1;
            inner.state = CelebrationState::Showing {
                event: event.clone(),
                deadline,
            };

            info!("Celebrating {:?}", event);
            play_quietly(self.effects.as_ref(), &EffectParams::for_tag(tag));
            play_sound_quietly(self.effects.as_ref(), SoundCue::for_tag(tag));
            inner.generation
        };

        let inner = Arc::clone(&self.inner);
        let effects = Arc::clone(&self.effects);
        let timer = runtime.spawn(async move {
            sleep_until(deadline).await;
            dismiss(&inner, effects.as_ref(), generation);
        });

        let mut inner = self.lock();
        if inner.generation == generation {
            inner.timer = Some(timer);
        } else {
            timer.abort();
        }
        Ok(())
    }

    pub fn state(&self) -> CelebrationState {
        self.lock().state.clone()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.lock().state, CelebrationState::Idle)
    }

    /// The event currently on screen.
    pub fn current(&self) -> Option<ProgressionEvent> {
        match &self.lock().state {
            CelebrationState::Idle => None,
            CelebrationState::Showing { event, .. } => Some(event.clone()),
        }
    }

    /// Time left before auto-dismissal.
    pub fn remaining(&self) -> Option<Duration> {
        match &self.lock().state {
            CelebrationState::Idle => None,
            CelebrationState::Showing { deadline, .. } => {
                Some(deadline.saturating_duration_since(Instant::now()))
            }
        }
    }

    /// Banner text for the current celebration in `language`.
    pub fn headline(&self, catalog: &TranslationCatalog, language: Language) -> Option<Banner> {
        let banner = match self.current()? {
            ProgressionEvent::LevelUp { new_level } => Banner {
                title: catalog.lookup(language, "gamification.level_up_title"),
                message: catalog.lookup_with(
                    language,
                    "gamification.level_up_message",
                    &[("level", new_level.to_string().as_str())],
                ),
            },
            ProgressionEvent::NewBadge { badge } => Banner {
                title: catalog.lookup(language, "gamification.new_badge_title"),
                message: catalog.lookup_with(
                    language,
                    "gamification.new_badge_message",
                    &[("badge", badge.as_str())],
                ),
            },
        };
        Some(banner)
    }
}

fn dismiss(inner: &Mutex<Inner>, effects: &dyn EffectsProvider, generation: u64) {
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    if inner.generation != generation {
        debug!("Ignoring stale dismissal (generation {})", generation);
        return;
    }
    inner.state = CelebrationState::Idle;
    inner.timer = None;
    cancel_quietly(effects);
    debug!("Celebration dismissed");
}
