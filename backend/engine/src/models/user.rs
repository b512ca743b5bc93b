use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

// Level-up threshold: every 100 points is one level
const POINTS_PER_LEVEL: i64 = 100;

/// Account stored in the "users" collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(flatten)]
    pub role: RoleData,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    // Cumulative play statistics
    #[serde(default)]
    pub points: i64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub total_games_played: u32,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub wrong_answers: u32,
    pub created_at: DateTime<Utc>,
}

fn default_is_active() -> bool {
    true
}

fn default_level() -> u32 {
    1
}

/// Role-specific payload. Tagged union instead of discriminator inheritance:
/// the variant is the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum RoleData {
    Student(StudentProfile),
    Teacher(TeacherProfile),
    Admin(AdminProfile),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default)]
    pub achievements: Vec<EarnedAchievement>,
    #[serde(default)]
    pub rewards: Vec<EarnedReward>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bonus_hints: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub teacher_code: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub students: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub admin_level: AdminLevel,
    #[serde(default)]
    pub permissions: Vec<AdminPermission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminLevel {
    SuperAdmin,
    ContentAdmin,
    Moderator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    ManageUsers,
    ManageWords,
    ManageContent,
    ViewAnalytics,
    ManageTeachers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnedAchievement {
    pub achievement_id: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnedReward {
    pub reward_id: String,
    pub earned_at: DateTime<Utc>,
    #[serde(default)]
    pub is_used: bool,
}

impl User {
    pub fn new_student(id: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            role: RoleData::Student(StudentProfile::default()),
            is_active: true,
            points: 0,
            level: 1,
            total_games_played: 0,
            correct_answers: 0,
            wrong_answers: 0,
            created_at: Utc::now(),
        }
    }

    pub fn role_name(&self) -> &'static str {
        match self.role {
            RoleData::Student(_) => "Student",
            RoleData::Teacher(_) => "Teacher",
            RoleData::Admin(_) => "Admin",
        }
    }

    pub fn is_student(&self) -> bool {
        matches!(self.role, RoleData::Student(_))
    }

    pub fn student(&self) -> Option<&StudentProfile> {
        match &self.role {
            RoleData::Student(profile) => Some(profile),
            _ => None,
        }
    }

    /// Mutable student payload, or `Unauthorized` for other roles.
    pub fn student_mut(&mut self) -> EngineResult<&mut StudentProfile> {
        match &mut self.role {
            RoleData::Student(profile) => Ok(profile),
            _ => Err(EngineError::Unauthorized),
        }
    }

    /// Sole point-mutation entry point. Level is derived from points and
    /// never decreases.
    pub fn update_points(&mut self, delta: i64) {
        self.points += delta;

        let new_level = (self.points / POINTS_PER_LEVEL) as u32 + 1;
        if new_level > self.level {
            self.level = new_level;
        }
    }

    /// Records one finished game in the cumulative statistics.
    pub fn update_game_stats(&mut self, is_correct: bool) {
        self.total_games_played += 1;
        if is_correct {
            self.correct_answers += 1;
        } else {
            self.wrong_answers += 1;
        }
    }

    /// Lifetime answer accuracy in percent; 0 before the first game.
    pub fn accuracy_pct(&self) -> f64 {
        let answered = self.correct_answers + self.wrong_answers;
        if answered == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers) / f64::from(answered) * 100.0
    }

    pub fn has_achievement(&self, achievement_id: &str) -> bool {
        self.student()
            .map(|profile| {
                profile
                    .achievements
                    .iter()
                    .any(|earned| earned.achievement_id == achievement_id)
            })
            .unwrap_or(false)
    }

    pub fn has_reward(&self, reward_id: &str) -> bool {
        self.student()
            .map(|profile| profile.rewards.iter().any(|earned| earned.reward_id == reward_id))
            .unwrap_or(false)
    }
}
