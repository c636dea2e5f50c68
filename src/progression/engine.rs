use crate::progression::{LevelRules, ProfileUpdate, UserProfile};
use crate::relay::{NotificationRelay, ProgressionEvent};
use crate::store::{write_json, LocalCache, SnapshotStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Cache key holding the latest snapshot.
pub const SNAPSHOT_CACHE_KEY: &str = "userProgress";

/// Where snapshots go after each mutation: the local cache first, then the
/// document store.
#[derive(Clone)]
pub struct Persistence {
    pub store: Arc<dyn SnapshotStore>,
    pub cache: Arc<dyn LocalCache>,
}

impl Persistence {
    /// Overwrite the snapshot in both places. Failures are logged; in-memory
    /// state stays authoritative.
    pub(crate) fn save(&self, profile: &UserProfile) {
        if let Err(e) = write_json(self.cache.as_ref(), SNAPSHOT_CACHE_KEY, profile) {
            warn!("Failed to cache snapshot for {}: {}", profile.id(), e);
        }
        if let Err(e) = self.store.save(profile) {
            error!("Failed to save snapshot for {}: {}", profile.id(), e);
        }
    }
}

/// Owns one learner's progress for the length of a session.
///
/// Every mutation persists the full snapshot before publishing, so
/// subscribers always observe saved state.
pub struct ProgressionEngine {
    profile: UserProfile,
    rules: LevelRules,
    relay: Arc<NotificationRelay>,
    persistence: Persistence,
}

impl ProgressionEngine {
    /// Wrap a loaded profile. The level is re-derived from points.
    pub fn new(
        mut profile: UserProfile,
        rules: LevelRules,
        relay: Arc<NotificationRelay>,
        persistence: Persistence,
    ) -> Self {
        if profile.normalize(&rules) {
            warn!("Snapshot for {} was inconsistent; normalized", profile.id());
        }
        Self {
            profile,
            rules,
            relay,
            persistence,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn rules(&self) -> LevelRules {
        self.rules
    }

    pub fn points_to_next_level(&self) -> u64 {
        self.rules.points_to_next_level(self.profile.points())
    }

    /// Add points. Publishes one `LevelUp` carrying the final level if the
    /// level rose, however many thresholds were crossed. Zero is a no-op.
    pub fn add_points(&mut self, amount: u64) -> Option<ProgressionEvent> {
        if amount == 0 {
            return None;
        }

        let previous = self.profile.add_points(amount, &self.rules);
        self.persistence.save(&self.profile);

        let level = self.profile.level();
        info!(
            "{} earned {} points ({} total, level {})",
            self.profile.id(),
            amount,
            self.profile.points(),
            level
        );

        if level <= previous {
            return None;
        }
        let event = ProgressionEvent::LevelUp { new_level: level };
        self.relay.publish(&event);
        Some(event)
    }

    /// Award a badge. Already-owned badges are a no-op: no write, no event.
    pub fn add_badge(&mut self, badge: &str) -> Option<ProgressionEvent> {
        if !self.profile.insert_badge(badge.to_string()) {
            return None;
        }
        self.persistence.save(&self.profile);
        info!("{} earned badge '{}'", self.profile.id(), badge);

        let event = ProgressionEvent::NewBadge {
            badge: badge.to_string(),
        };
        self.relay.publish(&event);
        Some(event)
    }

    /// Edit profile fields. Never publishes.
    pub fn update_user(&mut self, update: ProfileUpdate) {
        self.profile.apply(update);
        self.persistence.save(&self.profile);
    }

    pub(crate) fn into_profile(self) -> UserProfile {
        self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::EventTag;
    use crate::store::{read_json, MemoryCache, MemoryStore, StoreError};
    use proptest::prelude::*;
    use std::sync::Mutex;

    struct Harness {
        engine: ProgressionEngine,
        store: Arc<MemoryStore>,
        cache: Arc<MemoryCache>,
        events: Arc<Mutex<Vec<ProgressionEvent>>>,
    }

    fn harness(points: u64) -> Harness {
        let relay = Arc::new(NotificationRelay::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        for tag in EventTag::ALL {
            let events = Arc::clone(&events);
            relay.subscribe(tag, move |event| {
                events.lock().unwrap().push(event.clone());
                Ok(())
            });
        }

        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let profile = UserProfile::fresh("uid-1", "Ada", "ada@example.com", None)
            .with_points(points, &LevelRules::default());
        let engine = ProgressionEngine::new(
            profile,
            LevelRules::default(),
            relay,
            Persistence {
                store: store.clone(),
                cache: cache.clone(),
            },
        );

        Harness {
            engine,
            store,
            cache,
            events,
        }
    }

    // ==================== add_points Tests ====================

    #[test]
    fn test_add_points_crossing_threshold() {
        let mut h = harness(450);

        let event = h.engine.add_points(100);

        assert_eq!(event, Some(ProgressionEvent::LevelUp { new_level: 2 }));
        assert_eq!(h.engine.profile().points(), 550);
        assert_eq!(h.engine.profile().level(), 2);
        assert_eq!(*h.events.lock().unwrap(), vec![ProgressionEvent::LevelUp { new_level: 2 }]);

        let saved = h.store.load("uid-1").unwrap().unwrap();
        assert_eq!((saved.points(), saved.level()), (550, 2));
    }

    #[test]
    fn test_add_points_without_level_change() {
        let mut h = harness(0);

        assert_eq!(h.engine.add_points(100), None);
        assert!(h.events.lock().unwrap().is_empty());
        assert_eq!(h.store.write_count(), 1);
    }

    #[test]
    fn test_add_points_multiple_thresholds_single_event() {
        let mut h = harness(450);

        h.engine.add_points(1100);

        assert_eq!(h.engine.profile().level(), 4);
        assert_eq!(*h.events.lock().unwrap(), vec![ProgressionEvent::LevelUp { new_level: 4 }]);
    }

    #[test]
    fn test_add_zero_points_is_noop() {
        let mut h = harness(100);

        assert_eq!(h.engine.add_points(0), None);
        assert_eq!(h.store.write_count(), 0);
    }

    #[test]
    fn test_add_points_updates_cache() {
        let mut h = harness(0);
        h.engine.add_points(42);

        let cached: UserProfile = read_json(h.cache.as_ref(), SNAPSHOT_CACHE_KEY).unwrap().unwrap();
        assert_eq!(cached.points(), 42);
    }

    #[test]
    fn test_points_to_next_level() {
        let h = harness(450);
        assert_eq!(h.engine.points_to_next_level(), 50);
    }

    // ==================== add_badge Tests ====================

    #[test]
    fn test_add_new_badge() {
        let mut h = harness(0);

        let event = h.engine.add_badge("Explorer");

        let expected = ProgressionEvent::NewBadge {
            badge: "Explorer".to_string(),
        };
        assert_eq!(event, Some(expected.clone()));
        assert_eq!(*h.events.lock().unwrap(), vec![expected]);
        assert!(h.engine.profile().has_badge("Explorer"));
        assert_eq!(h.store.write_count(), 1);
    }

    #[test]
    fn test_add_existing_badge_is_noop() {
        let mut h = harness(0);

        assert_eq!(h.engine.add_badge("Welcome"), None);
        assert_eq!(h.engine.profile().badges(), &["Welcome".to_string()]);
        assert!(h.events.lock().unwrap().is_empty());
        assert_eq!(h.store.write_count(), 0);
    }

    #[test]
    fn test_add_badge_twice_single_event() {
        let mut h = harness(0);

        h.engine.add_badge("Explorer");
        h.engine.add_badge("Explorer");

        assert_eq!(h.events.lock().unwrap().len(), 1);
        assert_eq!(h.engine.profile().badges().len(), 2);
    }

    // ==================== update_user Tests ====================

    #[test]
    fn test_update_user_persists_without_events() {
        let mut h = harness(0);

        h.engine.update_user(ProfileUpdate {
            name: Some("Ada Lovelace".to_string()),
            ..Default::default()
        });

        assert!(h.events.lock().unwrap().is_empty());
        assert_eq!(h.store.load("uid-1").unwrap().unwrap().name(), "Ada Lovelace");
    }

    // ==================== Persistence Failure Tests ====================

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn load(&self, _id: &str) -> Result<Option<UserProfile>, StoreError> {
            Ok(None)
        }

        fn save(&self, _profile: &UserProfile) -> Result<(), StoreError> {
            Err(StoreError::InvalidId("read-only".to_string()))
        }
    }

    #[test]
    fn test_store_failure_does_not_fail_operation() {
        let relay = Arc::new(NotificationRelay::new());
        let cache = Arc::new(MemoryCache::new());
        let profile = UserProfile::fresh("uid-1", "Ada", "ada@example.com", None)
            .with_points(499, &LevelRules::default());
        let mut engine = ProgressionEngine::new(
            profile,
            LevelRules::default(),
            relay,
            Persistence {
                store: Arc::new(FailingStore),
                cache: cache.clone(),
            },
        );

        assert_eq!(engine.add_points(1), Some(ProgressionEvent::LevelUp { new_level: 2 }));
        let cached: UserProfile = read_json(cache.as_ref(), SNAPSHOT_CACHE_KEY).unwrap().unwrap();
        assert_eq!(cached.level(), 2);
    }

    #[test]
    fn test_new_normalizes_level() {
        let json = r#"{"id":"uid-1","name":"n","email":"e","level":9,"points":10,
            "badges":["Welcome"],"joinDate":"2024-01-01T00:00:00Z"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        let engine = ProgressionEngine::new(
            profile,
            LevelRules::default(),
            Arc::new(NotificationRelay::new()),
            Persistence {
                store: Arc::new(MemoryStore::new()),
                cache: Arc::new(MemoryCache::new()),
            },
        );

        assert_eq!(engine.profile().level(), 1);
    }

    #[test]
    fn test_subscriber_sees_persisted_state() {
        let relay = Arc::new(NotificationRelay::new());
        let store = Arc::new(MemoryStore::new());
        let seen = Arc::new(Mutex::new(None));

        let store_clone = store.clone();
        let seen_clone = Arc::clone(&seen);
        relay.subscribe(EventTag::LevelUp, move |_| {
            let saved = store_clone.load("uid-1")?;
            *seen_clone.lock().unwrap() = saved.map(|p| p.points());
            Ok(())
        });

        let mut engine = ProgressionEngine::new(
            UserProfile::fresh("uid-1", "Ada", "ada@example.com", None),
            LevelRules::default(),
            relay,
            Persistence {
                store,
                cache: Arc::new(MemoryCache::new()),
            },
        );
        engine.add_points(500);

        assert_eq!(*seen.lock().unwrap(), Some(500));
    }

    proptest! {
        #[test]
        fn prop_level_up_follows_threshold_crossings(
            p1 in 0u64..5_000_000,
            amount in 0u64..50_000,
        ) {
            let mut h = harness(p1);
            let p2 = p1 + amount;

            let event = h.engine.add_points(amount);

            let expected = (p2 / 500 > p1 / 500).then(|| ProgressionEvent::LevelUp {
                new_level: (p2 / 500 + 1) as u32,
            });
            prop_assert_eq!(&event, &expected);

            let published = h.events.lock().unwrap().clone();
            prop_assert!(published.len() <= 1);
            prop_assert_eq!(published.first(), expected.as_ref());
            prop_assert_eq!(h.engine.profile().points(), p2);
        }
    }
}
