pub mod achievement;
pub mod reward;
pub mod session;
pub mod task;
pub mod user;
pub mod word;

pub use achievement::{Achievement, AchievementCategory, AchievementCriteria, CriteriaKind, Rarity};
pub use reward::{Reward, RewardEffect, RewardKind, SpecialConditions};
pub use session::{
    GameSession, GameType, HintUse, MatchBoard, MatchToken, Question, SessionStatus,
};
pub use task::{AssignmentStatus, Task, TaskAssignment, TaskGameType, TaskStatistics};
pub use user::{
    AdminLevel, AdminPermission, AdminProfile, EarnedAchievement, EarnedReward, RoleData,
    StudentProfile, TeacherProfile, User,
};
pub use word::{Difficulty, Domain, Period, Word, WordFilter, WordStatus};
