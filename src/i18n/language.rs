//! Language type: validated handle into the registry.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A language that has been validated against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const SPANISH: Language = Language { code: "es" };
    pub const FRENCH: Language = Language { code: "fr" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Like [`Language::from_code`], but falls back to the canonical language
    /// for unknown or disabled codes. Used for user-supplied preferences.
    pub fn from_code_or_canonical(code: &str) -> Language {
        Self::from_code(code).unwrap_or_else(|_| Self::canonical())
    }

    /// The canonical (source) language.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Full metadata for this language.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// `Language` built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn flag(&self) -> &'static str {
        self.config().flag
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::canonical()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_constants_match_registry() {
        assert_eq!(Language::ENGLISH.name(), "English");
        assert_eq!(Language::SPANISH.native_name(), "Español");
        assert_eq!(Language::FRENCH.native_name(), "Français");
        assert!(Language::ENGLISH.is_canonical());
        assert!(!Language::FRENCH.is_canonical());
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_valid() {
        let language = Language::from_code("fr").expect("Should succeed");
        assert_eq!(language, Language::FRENCH);
    }

    #[test]
    fn test_from_code_unknown() {
        let result = Language::from_code("de");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_from_code_or_canonical_falls_back() {
        assert_eq!(Language::from_code_or_canonical("xx"), Language::ENGLISH);
        assert_eq!(Language::from_code_or_canonical("es"), Language::SPANISH);
    }

    // ==================== Trait Tests ====================

    #[test]
    fn test_default_is_canonical() {
        assert_eq!(Language::default(), Language::canonical());
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::SPANISH.to_string(), "es");
    }

    #[test]
    fn test_flag_accessor() {
        assert_eq!(Language::FRENCH.flag(), "🇫🇷");
    }
}
