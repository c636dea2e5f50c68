//! Key-based translation lookup.
//!
//! Lookups are total: a missing `(language, key)` pair renders as the
//! sentinel `"[key]"`. Presence itself is answered from the entry table, so a
//! translation whose text happens to be bracketed is still a translation.

use crate::i18n::strings::{ENGLISH_STRINGS, FRENCH_STRINGS, SPANISH_STRINGS};
use crate::i18n::{Language, LookupMetrics};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Render the missing-key sentinel for `key`.
pub fn sentinel(key: &str) -> String {
    format!("[{}]", key)
}

/// Whether a rendered string has the sentinel shape (`[` ... `]`).
///
/// Only for callers that hold a rendered string and nothing else; the catalog
/// answers presence from its entries instead.
pub fn is_sentinel(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('[') && text.ends_with(']')
}

/// Replace `{name}` placeholders with the given values.
///
/// Unknown placeholders are left untouched.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{}}}", name), value)
    })
}

/// Translation entries, keyed by language and then by dot-notation key.
#[derive(Debug, Clone, Default)]
pub struct TranslationCatalog {
    tables: HashMap<Language, HashMap<String, String>>,
}

impl TranslationCatalog {
    /// An empty catalog (every lookup misses).
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-filled with the built-in en/es/fr tables.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (language, table) in [
            (Language::ENGLISH, ENGLISH_STRINGS),
            (Language::SPANISH, SPANISH_STRINGS),
            (Language::FRENCH, FRENCH_STRINGS),
        ] {
            for (key, value) in table {
                catalog.insert(language, key, value);
            }
        }
        catalog
    }

    /// Parse a catalog from JSON of the form `{ "en": { "key": "value" } }`.
    ///
    /// Tables for languages that are unknown or disabled are skipped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut catalog = Self::new();
        catalog.merge_json(json)?;
        Ok(catalog)
    }

    /// Merge JSON tables into this catalog, overriding existing entries.
    pub fn merge_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;

        for (code, entries) in raw {
            let language = match Language::from_code(&code) {
                Ok(language) => language,
                Err(e) => {
                    warn!("Skipping translation table: {}", e);
                    continue;
                }
            };
            for (key, value) in entries {
                self.insert(language, &key, &value);
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, language: Language, key: &str, value: &str) {
        self.tables
            .entry(language)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// The configured string, if there is one. This is the presence signal.
    pub fn get(&self, language: Language, key: &str) -> Option<&str> {
        self.tables
            .get(&language)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }

    /// Translate `key`, rendering `"[key]"` when it is missing.
    pub fn lookup(&self, language: Language, key: &str) -> String {
        match self.get(language, key) {
            Some(value) => {
                LookupMetrics::global().record_hit();
                value.to_string()
            }
            None => {
                LookupMetrics::global().record_miss();
                debug!("Missing translation for '{}' in {}", key, language);
                sentinel(key)
            }
        }
    }

    /// Translate `key`, replacing a miss with `fallback`, or with
    /// `"Missing: key"` when no fallback is given.
    pub fn lookup_safe(&self, language: Language, key: &str, fallback: Option<&str>) -> String {
        if let Some(value) = self.get(language, key) {
            LookupMetrics::global().record_hit();
            return value.to_string();
        }

        LookupMetrics::global().record_miss();
        debug!("Missing translation for '{}' in {}, using fallback", key, language);
        match fallback {
            Some(fallback) => fallback.to_string(),
            None => format!("Missing: {}", key),
        }
    }

    pub fn has_translation(&self, language: Language, key: &str) -> bool {
        self.get(language, key).is_some()
    }

    /// Translate `key` and substitute `{name}` placeholders.
    pub fn lookup_with(&self, language: Language, key: &str, args: &[(&str, &str)]) -> String {
        interpolate(&self.lookup(language, key), args)
    }

    /// Languages that have at least one entry.
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<_> = self.tables.keys().copied().collect();
        languages.sort_by_key(|language| language.code());
        languages
    }

    /// Sorted keys configured for `language`.
    pub fn keys(&self, language: Language) -> BTreeSet<&str> {
        self.tables
            .get(&language)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
