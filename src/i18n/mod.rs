//! Internationalization (i18n): languages, string tables and lookup.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages and their metadata
//! - `language`: Validated `Language` handle
//! - `strings`: Built-in string tables
//! - `catalog`: Total key lookup with the `"[key]"` sentinel, safe lookup and interpolation
//! - `validator`: Catalog consistency checks
//! - `metrics`: Lookup/miss counters
//!
//! # Example
//!
//! ```rust,ignore
//! use learnpath::i18n::{Language, TranslationCatalog};
//!
//! let catalog = TranslationCatalog::builtin();
//! assert_eq!(catalog.lookup(Language::SPANISH, "nav.home"), "Inicio");
//! assert_eq!(catalog.lookup(Language::ENGLISH, "nope"), "[nope]");
//! ```

mod catalog;
mod language;
mod metrics;
mod registry;
mod strings;
mod validator;

pub use catalog::{interpolate, is_sentinel, sentinel, TranslationCatalog};
pub use language::Language;
pub use metrics::{LookupMetrics, MetricsReport};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use validator::{CatalogValidator, ValidationReport};
