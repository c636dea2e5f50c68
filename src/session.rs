//! Session lifecycle.
//!
//! A [`Session`] exists between sign-in and sign-out and owns the learner's
//! [`ProgressionEngine`]. The signed-in identity and the latest snapshot are
//! mirrored into the local cache so a restart can resume without the
//! identity provider.

use crate::identity::{AuthError, Identity, IdentityProvider};
use crate::progression::{
    LevelRules, Persistence, ProgressionEngine, UserProfile, SNAPSHOT_CACHE_KEY,
};
use crate::relay::NotificationRelay;
use crate::store::{read_json, write_json};
use std::sync::Arc;
use tracing::{info, warn};

/// Cache key holding the signed-in identity.
pub const USER_CACHE_KEY: &str = "user";

pub struct Session {
    identity: Identity,
    engine: ProgressionEngine,
}

impl Session {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ProgressionEngine {
        &mut self.engine
    }
}

pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    persistence: Persistence,
    relay: Arc<NotificationRelay>,
    rules: LevelRules,
    current: Option<Session>,
}

impl SessionManager {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        persistence: Persistence,
        relay: Arc<NotificationRelay>,
        rules: LevelRules,
    ) -> Self {
        Self {
            provider,
            persistence,
            relay,
            rules,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Session> {
        self.current.as_mut()
    }

    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<&mut Session, AuthError> {
        let identity = self.provider.sign_up(email, password, display_name)?;
        Ok(self.start(identity))
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<&mut Session, AuthError> {
        let identity = self.provider.sign_in(email, password)?;
        Ok(self.start(identity))
    }

    /// Resume the session recorded in the local cache, if any.
    pub fn restore(&mut self) -> Option<&mut Session> {
        let cache = self.persistence.cache.as_ref();
        let identity = match read_json::<Identity>(cache, USER_CACHE_KEY) {
            Ok(Some(identity)) => identity,
            Ok(None) => return None,
            Err(e) => {
                warn!("Ignoring unreadable cached identity: {}", e);
                return None;
            }
        };
        Some(self.start(identity))
    }

    /// End the session and forget the cached identity and snapshot.
    /// Returns the learner's final snapshot.
    pub fn sign_out(&mut self) -> Result<Option<UserProfile>, AuthError> {
        self.provider.sign_out()?;

        let cache = self.persistence.cache.as_ref();
        for key in [USER_CACHE_KEY, SNAPSHOT_CACHE_KEY] {
            if let Err(e) = cache.remove(key) {
                warn!("Failed to clear cached '{}': {}", key, e);
            }
        }

        let session = self.current.take();
        if let Some(session) = &session {
            info!("Signed out {}", session.identity.uid);
        }
        Ok(session.map(|session| session.engine.into_profile()))
    }

    fn start(&mut self, identity: Identity) -> &mut Session {
        if let Some(previous) = self.current.take() {
            info!("Replacing session for {}", previous.identity.uid);
        }

        let profile = self.load_profile(&identity);
        if let Err(e) = write_json(self.persistence.cache.as_ref(), USER_CACHE_KEY, &identity) {
            warn!("Failed to cache identity for {}: {}", identity.uid, e);
        }

        let engine = ProgressionEngine::new(
            profile,
            self.rules,
            Arc::clone(&self.relay),
            self.persistence.clone(),
        );
        info!(
            "Session started for {} (level {}, {} points)",
            identity.uid,
            engine.profile().level(),
            engine.profile().points()
        );

        self.current.insert(Session { identity, engine })
    }

    /// Snapshot lookup order: document store, cached snapshot for the same
    /// uid, then a fresh profile (which is saved right away).
    fn load_profile(&self, identity: &Identity) -> UserProfile {
        match self.persistence.store.load(&identity.uid) {
            Ok(Some(mut profile)) => {
                profile.normalize(&self.rules);
                if let Err(e) =
                    write_json(self.persistence.cache.as_ref(), SNAPSHOT_CACHE_KEY, &profile)
                {
                    warn!("Failed to cache snapshot for {}: {}", identity.uid, e);
                }
                return profile;
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load snapshot for {}: {}", identity.uid, e),
        }

        match read_json::<UserProfile>(self.persistence.cache.as_ref(), SNAPSHOT_CACHE_KEY) {
            Ok(Some(profile)) if profile.id() == identity.uid => {
                info!("Using cached snapshot for {}", identity.uid);
                return profile;
            }
            Ok(_) => {}
            Err(e) => warn!("Ignoring unreadable cached snapshot: {}", e),
        }

        let profile = UserProfile::fresh(
            &identity.uid,
            identity.preferred_name(),
            &identity.email,
            identity.photo_url.clone(),
        );
        self.persistence.save(&profile);
        profile
    }
}
