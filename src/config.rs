use crate::celebration::CelebrationConfig;
use crate::i18n::Language;
use crate::progression::{LevelRules, DEFAULT_LEVEL_THRESHOLD};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub data_dir: PathBuf,

    // Localization
    pub default_language: Language,

    // Progression
    pub level_threshold: u64,

    // Celebrations
    pub level_up_celebration: Duration,
    pub new_badge_celebration: Duration,
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(&code).context("DEFAULT_LANGUAGE is invalid")?,
            Err(_) => Language::canonical(),
        };

        let level_threshold = parsed_or("LEVEL_THRESHOLD", DEFAULT_LEVEL_THRESHOLD);
        if level_threshold == 0 {
            anyhow::bail!("LEVEL_THRESHOLD must be greater than zero");
        }

        Ok(Self {
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            default_language,
            level_threshold,
            level_up_celebration: Duration::from_secs(parsed_or("LEVEL_UP_CELEBRATION_SECS", 5)),
            new_badge_celebration: Duration::from_secs(parsed_or("NEW_BADGE_CELEBRATION_SECS", 4)),
        })
    }

    pub fn level_rules(&self) -> LevelRules {
        LevelRules::new(self.level_threshold).unwrap_or_default()
    }

    pub fn celebration(&self) -> CelebrationConfig {
        CelebrationConfig {
            level_up: self.level_up_celebration,
            new_badge: self.new_badge_celebration,
        }
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.data_dir.join("local_cache.json")
    }
}
