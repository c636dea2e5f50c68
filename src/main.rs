//! Demo driver: signs in a learner, applies progress from the command line
//! and lets the celebrations play out in the log.
//!
//! Usage:
//!   cargo run -- --points 120 --badge Explorer
//!   cargo run -- --email ada@example.com --password hunter22 --points 600
//!
//! Optional environment variables: DATA_DIR, DEFAULT_LANGUAGE,
//! LEVEL_THRESHOLD, LEVEL_UP_CELEBRATION_SECS, NEW_BADGE_CELEBRATION_SECS.

use anyhow::{bail, Context, Result};
use learnpath::celebration::CelebrationSequencer;
use learnpath::config::Config;
use learnpath::effects::LoggingEffects;
use learnpath::i18n::{CatalogValidator, LookupMetrics, TranslationCatalog};
use learnpath::identity::LocalIdentityProvider;
use learnpath::progression::Persistence;
use learnpath::relay::NotificationRelay;
use learnpath::session::SessionManager;
use learnpath::store::{FileCache, JsonFileStore};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_EMAIL: &str = "learner@example.com";

#[derive(Debug)]
struct Args {
    /// Explicit account; skips resuming the cached session.
    email: Option<String>,
    password: String,
    points: Vec<u64>,
    badges: Vec<String>,
}

impl Args {
    /// The cached session is only resumed when no account was named.
    fn resumes_cached_session(&self) -> bool {
        self.email.is_none()
    }
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args {
        email: None,
        password: "learnpath".to_string(),
        points: Vec::new(),
        badges: Vec::new(),
    };

    let mut iter = raw.into_iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("{} needs a value", flag))?;
        match flag.as_str() {
            "--email" => args.email = Some(value),
            "--password" => args.password = value,
            "--points" => args
                .points
                .push(value.parse().context("--points expects a number")?),
            "--badge" => args.badges.push(value),
            other => bail!("Unknown argument: {}", other),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("learnpath=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let args = parse_args(std::env::args().skip(1))?;
    let language = config.default_language;

    let catalog = TranslationCatalog::builtin();
    let report = CatalogValidator::validate(&catalog);
    for warning in &report.warnings {
        warn!("Catalog: {}", warning);
    }
    if report.has_errors() {
        bail!("Translation catalog is inconsistent: {:?}", report.errors);
    }

    let persistence = Persistence {
        store: Arc::new(JsonFileStore::new(config.snapshots_dir())?),
        cache: Arc::new(FileCache::open(config.cache_file())?),
    };
    let relay = Arc::new(NotificationRelay::new());
    let sequencer = CelebrationSequencer::new(Arc::new(LoggingEffects), config.celebration());
    sequencer.attach(&relay);

    let mut sessions = SessionManager::new(
        Arc::new(LocalIdentityProvider::new()),
        persistence,
        Arc::clone(&relay),
        config.level_rules(),
    );

    // The local provider forgets accounts between runs; the cached identity
    // does not.
    let resumed = args.resumes_cached_session() && sessions.restore().is_some();
    if !resumed {
        let email = args.email.as_deref().unwrap_or(DEFAULT_EMAIL);
        sessions.sign_up(email, &args.password, None)?;
    }
    let session = sessions.current_mut().context("No active session")?;
    info!(
        "{}",
        catalog.lookup_with(
            language,
            "auth.welcome_back",
            &[("name", session.engine().profile().name())]
        )
    );

    for amount in &args.points {
        session.engine_mut().add_points(*amount);
    }
    for badge in &args.badges {
        session.engine_mut().add_badge(badge);
    }

    let profile = session.engine().profile();
    let level = profile.level().to_string();
    let points = profile.points().to_string();
    info!(
        "{} · {} · {}: {}",
        catalog.lookup_with(language, "gamification.level", &[("level", level.as_str())]),
        catalog.lookup_with(language, "gamification.points", &[("points", points.as_str())]),
        catalog.lookup(language, "gamification.badges"),
        profile.badges().join(", ")
    );

    if let Some(banner) = sequencer.headline(&catalog, language) {
        info!("{} {}", banner.title, banner.message);
    }
    if let Some(remaining) = sequencer.remaining() {
        tokio::time::sleep(remaining).await;
        tokio::task::yield_now().await;
    }

    sequencer.detach(&relay);
    info!("Lookup metrics: {:?}", LookupMetrics::global().report());
    Ok(())
}
