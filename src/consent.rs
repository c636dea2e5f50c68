//! Storage-consent preference: unset until the learner chooses.

use crate::store::{LocalCache, StoreError};
use std::sync::Arc;
use tracing::warn;

pub const CONSENT_CACHE_KEY: &str = "cookieConsent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentState {
    #[default]
    Unset,
    Accepted,
    Declined,
}

impl ConsentState {
    fn as_str(self) -> Option<&'static str> {
        match self {
            ConsentState::Unset => None,
            ConsentState::Accepted => Some("accepted"),
            ConsentState::Declined => Some("declined"),
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "accepted" => Some(ConsentState::Accepted),
            "declined" => Some(ConsentState::Declined),
            _ => None,
        }
    }

    /// Whether the consent banner should be shown.
    pub fn needs_prompt(self) -> bool {
        self == ConsentState::Unset
    }
}

pub struct ConsentStore {
    cache: Arc<dyn LocalCache>,
}

impl ConsentStore {
    pub fn new(cache: Arc<dyn LocalCache>) -> Self {
        Self { cache }
    }

    /// Current choice. Unreadable or unrecognized values count as unset.
    pub fn read(&self) -> ConsentState {
        match self.cache.get(CONSENT_CACHE_KEY) {
            Ok(Some(raw)) => ConsentState::parse(&raw).unwrap_or_else(|| {
                warn!("Unrecognized consent value '{}'", raw);
                ConsentState::Unset
            }),
            Ok(None) => ConsentState::Unset,
            Err(e) => {
                warn!("Failed to read consent: {}", e);
                ConsentState::Unset
            }
        }
    }

    pub fn record(&self, accepted: bool) -> Result<ConsentState, StoreError> {
        let state = if accepted {
            ConsentState::Accepted
        } else {
            ConsentState::Declined
        };
        if let Some(value) = state.as_str() {
            self.cache.set(CONSENT_CACHE_KEY, value)?;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCache;

    fn store() -> (ConsentStore, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        (ConsentStore::new(cache.clone()), cache)
    }

    #[test]
    fn test_initially_unset() {
        let (consent, _) = store();
        assert_eq!(consent.read(), ConsentState::Unset);
        assert!(consent.read().needs_prompt());
    }

    #[test]
    fn test_record_accept() {
        let (consent, cache) = store();
        assert_eq!(consent.record(true).unwrap(), ConsentState::Accepted);
        assert_eq!(consent.read(), ConsentState::Accepted);
        assert_eq!(cache.get(CONSENT_CACHE_KEY).unwrap().as_deref(), Some("accepted"));
    }

    #[test]
    fn test_record_decline_overrides_accept() {
        let (consent, _) = store();
        consent.record(true).unwrap();
        consent.record(false).unwrap();

        assert_eq!(consent.read(), ConsentState::Declined);
        assert!(!consent.read().needs_prompt());
    }

    #[test]
    fn test_garbage_value_reads_unset() {
        let (consent, cache) = store();
        cache.set(CONSENT_CACHE_KEY, "maybe").unwrap();
        assert_eq!(consent.read(), ConsentState::Unset);
    }
}
