//! Catalog validation.
//!
//! Checks every enabled language table against the canonical one:
//! - keys present in the canonical table but missing elsewhere (error)
//! - keys that exist only in a translation (warning)
//! - `{placeholder}` sets that differ from the canonical string (error)
//! - values shaped like the missing-key sentinel (warning)

use crate::i18n::catalog::is_sentinel;
use crate::i18n::{Language, LanguageRegistry, TranslationCatalog};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Problems that render wrong text on screen
    pub errors: Vec<String>,

    /// Suspicious entries worth a look
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for translation catalogs.
pub struct CatalogValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl CatalogValidator {
    pub fn validate(catalog: &TranslationCatalog) -> ValidationReport {
        let mut report = ValidationReport::new();
        let canonical = Language::canonical();
        let canonical_keys = catalog.keys(canonical);

        Self::check_sentinel_values(catalog, canonical, &mut report);

        for config in LanguageRegistry::get().list_enabled() {
            if config.is_canonical {
                continue;
            }
            let language = Language::from_code_or_canonical(config.code);
            let keys = catalog.keys(language);

            for key in canonical_keys.difference(&keys) {
                report
                    .errors
                    .push(format!("{}: missing key '{}'", language, key));
            }

            for key in keys.difference(&canonical_keys) {
                report
                    .warnings
                    .push(format!("{}: key '{}' not in {}", language, key, canonical));
            }

            for key in canonical_keys.intersection(&keys) {
                let expected =
                    Self::extract_placeholders(catalog.get(canonical, key).unwrap_or(""));
                let found = Self::extract_placeholders(catalog.get(language, key).unwrap_or(""));
                if expected != found {
                    report.errors.push(format!(
                        "{}: placeholder mismatch for '{}': expected {:?}, found {:?}",
                        language, key, expected, found
                    ));
                }
            }

            Self::check_sentinel_values(catalog, language, &mut report);
        }

        report
    }

    fn check_sentinel_values(
        catalog: &TranslationCatalog,
        language: Language,
        report: &mut ValidationReport,
    ) {
        for key in catalog.keys(language) {
            if catalog.get(language, key).is_some_and(is_sentinel) {
                report.warnings.push(format!(
                    "{}: value of '{}' looks like a missing-key sentinel",
                    language, key
                ));
            }
        }
    }

    /// Extract the set of `{name}` placeholders in a string
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}
