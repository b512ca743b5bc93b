use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::achievement::Rarity;
use crate::models::session::{GameSession, GameType};
use crate::models::user::User;
use crate::models::word::{Domain, Period};

// Fallback effect magnitudes when the catalog entry leaves `value` at 0
const DEFAULT_POINTS_BOOST: i64 = 50;
const DEFAULT_BONUS_HINTS: i64 = 1;

/// Catalog entry describing one earnable reward and its effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: RewardKind,
    pub icon: String,
    pub points_required: i64,
    #[serde(default = "default_level_required")]
    pub level_required: u32,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub special_conditions: Option<SpecialConditions>,
    /// Points or count, depending on the effect.
    #[serde(default)]
    pub value: i64,
    #[serde(default = "default_effect")]
    pub effect: RewardEffect,
    /// Repeatable rewards re-apply on every qualifying completion;
    /// the rest are award-once per user.
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub total_earned: u64,
    pub created_at: DateTime<Utc>,
}

fn default_level_required() -> u32 {
    1
}

fn default_is_active() -> bool {
    true
}

fn default_effect() -> RewardEffect {
    RewardEffect::PointsBoost
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Badge,
    Title,
    Unlock,
    BonusPoints,
    SpecialAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardEffect {
    PointsBoost,
    UnlockContent,
    SpecialBadge,
    TitleChange,
    BonusHints,
}

/// Session-dependent gates. A `None` field does not constrain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialConditions {
    #[serde(default)]
    pub game_type: Option<GameType>,
    #[serde(default)]
    pub min_score: Option<i64>,
    #[serde(default)]
    pub perfect_score: Option<bool>,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default)]
    pub period: Option<Period>,
}

impl Reward {
    /// Basic points/level gates plus session special conditions. Without a
    /// session the session-dependent conditions pass through unchecked.
    pub fn can_user_earn(&self, user: &User, session: Option<&GameSession>) -> bool {
        if !self.is_active {
            return false;
        }

        if user.points < self.points_required || user.level < self.level_required {
            return false;
        }

        if let (Some(conditions), Some(session)) = (&self.special_conditions, session) {
            if conditions.game_type.is_some_and(|gt| session.game_type != gt) {
                return false;
            }
            if conditions.min_score.is_some_and(|min| session.score < min) {
                return false;
            }
            if conditions.perfect_score == Some(true) && !session.is_perfect_score() {
                return false;
            }
            if let Some(domain) = conditions.domain {
                if !Self::any_answered_question(session, |q| q.domain == Some(domain)) {
                    return false;
                }
            }
            if let Some(period) = conditions.period {
                if !Self::any_answered_question(session, |q| q.period == Some(period)) {
                    return false;
                }
            }
        }

        true
    }

    fn any_answered_question(
        session: &GameSession,
        predicate: impl Fn(&crate::models::session::Question) -> bool,
    ) -> bool {
        session
            .questions
            .iter()
            .any(|q| q.user_answer.is_some() && predicate(q))
    }

    /// Applies this reward's effect to the user. Points route through the
    /// progression engine; profile effects require a student.
    pub fn apply_effect(&self, user: &mut User) {
        match self.effect {
            RewardEffect::PointsBoost => {
                let delta = if self.value != 0 {
                    self.value
                } else {
                    DEFAULT_POINTS_BOOST
                };
                user.update_points(delta);
            }
            RewardEffect::SpecialBadge => {
                if let Ok(profile) = user.student_mut() {
                    if !profile.badges.iter().any(|badge| *badge == self.id) {
                        profile.badges.push(self.id.clone());
                    }
                }
            }
            RewardEffect::TitleChange => {
                if let Ok(profile) = user.student_mut() {
                    profile.title = Some(self.name.clone());
                }
            }
            RewardEffect::BonusHints => {
                let extra = if self.value != 0 {
                    self.value
                } else {
                    DEFAULT_BONUS_HINTS
                };
                if let Ok(profile) = user.student_mut() {
                    profile.bonus_hints += extra.max(0) as u32;
                }
            }
            // Content unlocking lives outside the engine
            RewardEffect::UnlockContent => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Question;

    fn reward() -> Reward {
        Reward {
            id: "r1".to_string(),
            name: "Trailblazer".to_string(),
            description: "First milestone".to_string(),
            kind: RewardKind::BonusPoints,
            icon: "medal".to_string(),
            points_required: 100,
            level_required: 2,
            rarity: Rarity::Common,
            is_active: true,
            special_conditions: None,
            value: 0,
            effect: RewardEffect::PointsBoost,
            repeatable: false,
            total_earned: 0,
            created_at: Utc::now(),
        }
    }

    fn eligible_user() -> User {
        let mut user = User::new_student("u1", "maya", "maya@example.com");
        user.update_points(150);
        user
    }

    fn completed_session(game_type: GameType, score: i64) -> GameSession {
        let question = Question {
            word_id: "w1".to_string(),
            prompt: "prompt".to_string(),
            options: Vec::new(),
            correct_answer: "answer".to_string(),
            user_answer: Some("answer".to_string()),
            is_correct: true,
            time_spent_seconds: 10,
            hints_used: 0,
            domain: Some(Domain::Trade),
            period: Some(Period::Ancient),
        };
        let mut session =
            GameSession::new("u1".to_string(), game_type, None, vec![question], None);
        session.score = score;
        session
    }

    #[test]
    fn points_and_level_gates_apply() {
        let reward = reward();
        let mut user = User::new_student("u1", "maya", "maya@example.com");
        assert!(!reward.can_user_earn(&user, None));

        user.update_points(150);
        assert!(reward.can_user_earn(&user, None));
    }

    #[test]
    fn game_type_condition_filters_sessions() {
        let mut reward = reward();
        reward.special_conditions = Some(SpecialConditions {
            game_type: Some(GameType::Mcq),
            ..Default::default()
        });

        let user = eligible_user();
        assert!(reward.can_user_earn(&user, Some(&completed_session(GameType::Mcq, 80))));
        assert!(!reward.can_user_earn(&user, Some(&completed_session(GameType::Jumbled, 80))));
    }

    #[test]
    fn min_score_condition_checks_session_score() {
        let mut reward = reward();
        reward.special_conditions = Some(SpecialConditions {
            min_score: Some(90),
            ..Default::default()
        });

        let user = eligible_user();
        assert!(!reward.can_user_earn(&user, Some(&completed_session(GameType::Mcq, 80))));
        assert!(reward.can_user_earn(&user, Some(&completed_session(GameType::Mcq, 95))));
    }

    #[test]
    fn domain_condition_needs_an_answered_matching_question() {
        let mut reward = reward();
        reward.special_conditions = Some(SpecialConditions {
            domain: Some(Domain::Trade),
            ..Default::default()
        });

        let user = eligible_user();
        let session = completed_session(GameType::Mcq, 80);
        assert!(reward.can_user_earn(&user, Some(&session)));

        let mut unanswered = completed_session(GameType::Mcq, 80);
        unanswered.questions[0].user_answer = None;
        assert!(!reward.can_user_earn(&user, Some(&unanswered)));

        let mut other_domain = completed_session(GameType::Mcq, 80);
        other_domain.questions[0].domain = Some(Domain::Food);
        assert!(!reward.can_user_earn(&user, Some(&other_domain)));
    }

    #[test]
    fn conditions_pass_through_without_a_session() {
        let mut reward = reward();
        reward.special_conditions = Some(SpecialConditions {
            game_type: Some(GameType::Mcq),
            min_score: Some(1000),
            ..Default::default()
        });
        assert!(reward.can_user_earn(&eligible_user(), None));
    }

    #[test]
    fn points_boost_defaults_to_fifty() {
        let reward = reward();
        let mut user = eligible_user();
        let before = user.points;
        reward.apply_effect(&mut user);
        assert_eq!(user.points, before + 50);
    }

    #[test]
    fn badge_effect_is_idempotent() {
        let mut reward = reward();
        reward.effect = RewardEffect::SpecialBadge;

        let mut user = eligible_user();
        reward.apply_effect(&mut user);
        reward.apply_effect(&mut user);
        assert_eq!(user.student().unwrap().badges, vec!["r1".to_string()]);
    }

    #[test]
    fn title_and_bonus_hint_effects_mutate_profile() {
        let mut user = eligible_user();

        let mut title = reward();
        title.effect = RewardEffect::TitleChange;
        title.apply_effect(&mut user);
        assert_eq!(user.student().unwrap().title.as_deref(), Some("Trailblazer"));

        let mut hints = reward();
        hints.effect = RewardEffect::BonusHints;
        hints.value = 3;
        hints.apply_effect(&mut user);
        assert_eq!(user.student().unwrap().bonus_hints, 3);

        hints.value = 0;
        hints.apply_effect(&mut user);
        assert_eq!(user.student().unwrap().bonus_hints, 4);
    }
}
