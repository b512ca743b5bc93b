use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::user::{EarnedAchievement, EarnedReward};
use crate::models::{Achievement, GameSession, Reward, RewardEffect, User};
use crate::store::DocumentStore;
use crate::utils::locks::AggregateLocks;

/// One newly granted achievement, as reported back to the player.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementAward {
    pub achievement_id: String,
    pub name: String,
    pub points_awarded: i64,
}

/// One newly granted reward.
#[derive(Debug, Clone, Serialize)]
pub struct RewardGrant {
    pub reward_id: String,
    pub name: String,
    pub effect: RewardEffect,
}

/// Grants an achievement to a student. Idempotent per user: a repeat grant
/// reports `None` and mutates nothing. Points route through the progression
/// engine; the catalog's global counter is bumped on every grant.
pub fn award_achievement(
    achievement: &mut Achievement,
    user: &mut User,
    now: DateTime<Utc>,
) -> EngineResult<Option<AchievementAward>> {
    if !user.is_student() {
        return Err(EngineError::Unauthorized);
    }
    if user.has_achievement(&achievement.id) {
        return Ok(None);
    }

    let profile = user.student_mut()?;
    profile.achievements.push(EarnedAchievement {
        achievement_id: achievement.id.clone(),
        earned_at: now,
    });
    if achievement.points_reward > 0 {
        user.update_points(achievement.points_reward);
    }
    achievement.total_earned += 1;

    Ok(Some(AchievementAward {
        achievement_id: achievement.id.clone(),
        name: achievement.name.clone(),
        points_awarded: achievement.points_reward,
    }))
}

/// Grants a reward and applies its effect. Non-repeatable rewards already
/// held by the student report `None`; repeatable rewards re-apply and get a
/// fresh earned record every time.
pub fn award_reward(
    reward: &mut Reward,
    user: &mut User,
    now: DateTime<Utc>,
) -> EngineResult<Option<RewardGrant>> {
    if !user.is_student() {
        return Err(EngineError::Unauthorized);
    }
    if !reward.repeatable && user.has_reward(&reward.id) {
        return Ok(None);
    }

    reward.apply_effect(user);
    let profile = user.student_mut()?;
    profile.rewards.push(EarnedReward {
        reward_id: reward.id.clone(),
        earned_at: now,
        is_used: false,
    });
    reward.total_earned += 1;

    Ok(Some(RewardGrant {
        reward_id: reward.id.clone(),
        name: reward.name.clone(),
        effect: reward.effect,
    }))
}

/// Evaluates the achievement catalog (in catalog order) against the user and
/// session, granting every newly eligible entry on the in-memory copies.
/// Returns the grants plus the catalog entries whose counters changed, for
/// the caller to persist.
pub fn evaluate_achievements(
    achievements: Vec<Achievement>,
    user: &mut User,
    session: Option<&GameSession>,
    now: DateTime<Utc>,
) -> EngineResult<(Vec<AchievementAward>, Vec<Achievement>)> {
    let mut awards = Vec::new();
    let mut touched = Vec::new();

    for mut achievement in achievements {
        if !achievement.check_eligibility(user, session) {
            continue;
        }
        if let Some(award) = award_achievement(&mut achievement, user, now)? {
            awards.push(award);
            touched.push(achievement);
        }
    }

    Ok((awards, touched))
}

/// Reward counterpart of [`evaluate_achievements`].
pub fn evaluate_rewards(
    rewards: Vec<Reward>,
    user: &mut User,
    session: Option<&GameSession>,
    now: DateTime<Utc>,
) -> EngineResult<(Vec<RewardGrant>, Vec<Reward>)> {
    let mut grants = Vec::new();
    let mut touched = Vec::new();

    for mut reward in rewards {
        if !reward.can_user_earn(user, session) {
            continue;
        }
        if let Some(grant) = award_reward(&mut reward, user, now)? {
            grants.push(grant);
            touched.push(reward);
        }
    }

    Ok((grants, touched))
}

/// Standalone entry points over the store, for callers outside the game
/// completion flow (profile pages, catalog screens).
pub struct EligibilityService {
    store: Arc<dyn DocumentStore>,
    locks: AggregateLocks,
}

impl EligibilityService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: AggregateLocks) -> Self {
        Self { store, locks }
    }

    /// Awards every achievement the user has newly become eligible for.
    pub async fn check_user_achievements(
        &self,
        user_id: &str,
        session: Option<&GameSession>,
    ) -> EngineResult<Vec<AchievementAward>> {
        let _user_guard = self.locks.acquire(&format!("user:{}", user_id)).await;

        let mut user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))?;

        let achievements = self.store.list_active_achievements().await?;
        let (awards, touched) = evaluate_achievements(achievements, &mut user, session, Utc::now())?;

        if !awards.is_empty() {
            self.store.update_user(&user).await?;
            for achievement in &touched {
                self.store.update_achievement(achievement).await?;
            }
            tracing::info!(
                "Awarded {} achievement(s) to user {}",
                awards.len(),
                user_id
            );
        }

        Ok(awards)
    }

    /// Active rewards the user could earn right now, in catalog order.
    pub async fn available_rewards(
        &self,
        user_id: &str,
        session: Option<&GameSession>,
    ) -> EngineResult<Vec<Reward>> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))?;

        let rewards = self.store.list_active_rewards().await?;
        Ok(rewards
            .into_iter()
            .filter(|reward| reward.can_user_earn(&user, session))
            .collect())
    }
}
