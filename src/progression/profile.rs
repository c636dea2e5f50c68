use crate::progression::LevelRules;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Badge every new learner starts with.
pub const WELCOME_BADGE: &str = "Welcome";

/// A learner's persisted snapshot.
///
/// `level` is stored for readers of the document, but it is always derived
/// from `points`: every constructor and mutation recomputes it, and
/// [`UserProfile::normalize`] repairs documents written by someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    id: String,
    name: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
    level: u32,
    points: u64,
    #[serde(default)]
    badges: Vec<String>,
    join_date: DateTime<Utc>,
}

/// Profile fields a learner may edit. `None` leaves a field unchanged;
/// `avatar: Some(None)` clears the avatar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
}

impl UserProfile {
    /// A brand-new learner: no points, level 1, the welcome badge.
    pub fn fresh(id: &str, name: &str, email: &str, avatar: Option<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            avatar,
            level: 1,
            points: 0,
            badges: vec![WELCOME_BADGE.to_string()],
            join_date: Utc::now(),
        }
    }

    pub fn with_points(mut self, points: u64, rules: &LevelRules) -> Self {
        self.points = points;
        self.level = rules.level_for(points);
        self
    }

    pub fn with_badges<I, S>(mut self, badges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.badges.clear();
        for badge in badges {
            self.insert_badge(badge.into());
        }
        self
    }

    pub fn with_join_date(mut self, join_date: DateTime<Utc>) -> Self {
        self.join_date = join_date;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    /// Badges in the order they were earned.
    pub fn badges(&self) -> &[String] {
        &self.badges
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.iter().any(|b| b == badge)
    }

    pub fn join_date(&self) -> DateTime<Utc> {
        self.join_date
    }

    /// Recompute the level and drop duplicate badges. Returns `true` if
    /// anything changed.
    pub fn normalize(&mut self, rules: &LevelRules) -> bool {
        let before = (self.level, self.badges.len());

        self.level = rules.level_for(self.points);
        let badges = std::mem::take(&mut self.badges);
        for badge in badges {
            self.insert_badge(badge);
        }

        before != (self.level, self.badges.len())
    }

    /// Add points (saturating). Returns the previous level.
    pub(crate) fn add_points(&mut self, amount: u64, rules: &LevelRules) -> u32 {
        let previous = self.level;
        self.points = self.points.saturating_add(amount);
        self.level = rules.level_for(self.points);
        previous
    }

    /// Returns `false` if the badge was already present.
    pub(crate) fn insert_badge(&mut self, badge: String) -> bool {
        if self.has_badge(&badge) {
            return false;
        }
        self.badges.push(badge);
        true
    }

    pub(crate) fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
    }
}
