use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::session::{GameSession, GameType};
use crate::models::user::User;
use crate::models::word::{Domain, Period};

/// Catalog entry describing one unlockable achievement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub criteria: AchievementCriteria,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub points_reward: i64,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    /// Hidden from catalog listings until earned.
    #[serde(default)]
    pub is_secret: bool,
    /// Global award counter, bumped on every grant.
    #[serde(default)]
    pub total_earned: u64,
    pub created_at: DateTime<Utc>,
}

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Learning,
    Gaming,
    Social,
    Special,
    Milestone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementCriteria {
    pub kind: CriteriaKind,
    pub value: i64,
    // Extra criteria for session-dependent achievements
    #[serde(default)]
    pub game_type: Option<GameType>,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
    #[serde(default)]
    pub consecutive: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaKind {
    Points,
    GamesPlayed,
    CorrectAnswers,
    Streak,
    Level,
    DomainMastery,
    PerfectScore,
    Speed,
    Custom,
}

impl Achievement {
    /// Pure eligibility predicate. Session-dependent criteria are false
    /// without a session; `Custom` is reserved and never matches.
    pub fn check_eligibility(&self, user: &User, session: Option<&GameSession>) -> bool {
        if !self.is_active {
            return false;
        }

        let criteria = &self.criteria;
        match criteria.kind {
            CriteriaKind::Points => user.points >= criteria.value,
            CriteriaKind::GamesPlayed => i64::from(user.total_games_played) >= criteria.value,
            CriteriaKind::CorrectAnswers => i64::from(user.correct_answers) >= criteria.value,
            CriteriaKind::Level => i64::from(user.level) >= criteria.value,
            // True streak tracking needs game history; the catalog flags
            // consecutive runs and the tally stands in for the streak.
            CriteriaKind::Streak => {
                i64::from(user.correct_answers) >= criteria.value
                    && criteria.consecutive.unwrap_or(false)
            }
            // Domain is required but performance is still measured over the
            // cumulative tally, not per domain.
            CriteriaKind::DomainMastery => {
                criteria.domain.is_some() && i64::from(user.correct_answers) >= criteria.value
            }
            CriteriaKind::PerfectScore => session.is_some_and(|s| s.is_perfect_score()),
            CriteriaKind::Speed => match (session, criteria.time_limit_seconds) {
                (Some(session), Some(limit)) => session.time_spent_seconds <= limit,
                _ => false,
            },
            CriteriaKind::Custom => false,
        }
    }
}
