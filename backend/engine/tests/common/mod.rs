#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use sollvault_engine::config::Config;
use sollvault_engine::models::{
    Achievement, AchievementCategory, AchievementCriteria, AdminLevel, AdminProfile,
    CriteriaKind, Difficulty, Domain, Period, Rarity, Reward, RewardEffect, RewardKind, RoleData,
    Task, TaskGameType, TeacherProfile, User, Word, WordStatus,
};
use sollvault_engine::services::answer_service::AnswerService;
use sollvault_engine::services::eligibility_service::EligibilityService;
use sollvault_engine::services::hint_service::HintService;
use sollvault_engine::services::session_service::{SessionService, StartGameRequest};
use sollvault_engine::services::task_service::TaskService;
use sollvault_engine::services::AppState;
use sollvault_engine::store::{DocumentStore, InMemoryStore};
use sollvault_engine::models::GameType;

pub fn test_state() -> AppState {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    AppState::new(Config::default(), Arc::new(InMemoryStore::new()))
}

pub fn session_service(state: &AppState) -> SessionService {
    SessionService::new(
        state.store.clone(),
        state.locks.clone(),
        state.config.clone(),
    )
}

pub fn answer_service(state: &AppState) -> AnswerService {
    AnswerService::new(state.store.clone(), state.locks.clone())
}

pub fn hint_service(state: &AppState) -> HintService {
    HintService::new(state.store.clone(), state.locks.clone())
}

pub fn eligibility_service(state: &AppState) -> EligibilityService {
    EligibilityService::new(state.store.clone(), state.locks.clone())
}

pub fn task_service(state: &AppState) -> TaskService {
    TaskService::new(state.store.clone(), state.locks.clone())
}

/// A heritage measure word with a unique meaning per index.
pub fn make_word(index: usize) -> Word {
    let domains = [
        Domain::Volume,
        Domain::Time,
        Domain::Measurement,
        Domain::Trade,
        Domain::Agriculture,
    ];
    let periods = [
        Period::Ancient,
        Period::ClassicalMedieval,
        Period::Modern,
    ];
    Word {
        id: format!("w{}", index),
        text: format!("sollam-{}", index),
        meaning_primary: format!("meaning {}", index),
        meaning_secondary: format!("secondary meaning {}", index),
        domain: domains[index % domains.len()],
        period: periods[index % periods.len()],
        modern_equivalent: format!("modern {}", index),
        status: WordStatus::Archaic,
        notes: Some(format!("used in old trade records {}", index)),
        difficulty: Difficulty::Medium,
        is_active: true,
        times_used: 0,
        correct_count: 0,
        wrong_count: 0,
        created_at: Utc::now(),
    }
}

pub async fn seed_words(state: &AppState, count: usize) {
    for index in 0..count {
        state
            .store
            .insert_word(make_word(index))
            .await
            .expect("word seed failed");
    }
}

pub async fn seed_student(state: &AppState, id: &str) -> User {
    let user = User::new_student(id, format!("student-{}", id), format!("{}@test.local", id));
    state
        .store
        .insert_user(user.clone())
        .await
        .expect("student seed failed");
    user
}

pub async fn seed_teacher(state: &AppState, id: &str) -> User {
    let user = User {
        role: RoleData::Teacher(TeacherProfile {
            teacher_code: format!("T-{}", id),
            subjects: vec!["heritage vocabulary".to_string()],
            students: Vec::new(),
        }),
        ..User::new_student(id, format!("teacher-{}", id), format!("{}@test.local", id))
    };
    state
        .store
        .insert_user(user.clone())
        .await
        .expect("teacher seed failed");
    user
}

pub async fn seed_admin(state: &AppState, id: &str) -> User {
    let user = User {
        role: RoleData::Admin(AdminProfile {
            admin_level: AdminLevel::ContentAdmin,
            permissions: Vec::new(),
        }),
        ..User::new_student(id, format!("admin-{}", id), format!("{}@test.local", id))
    };
    state
        .store
        .insert_user(user.clone())
        .await
        .expect("admin seed failed");
    user
}

pub fn start_request(game_type: GameType, word_count: u32) -> StartGameRequest {
    StartGameRequest {
        game_type,
        difficulty: None,
        word_count: Some(word_count),
        domain: None,
        period: None,
    }
}

pub fn make_achievement(id: &str, kind: CriteriaKind, value: i64) -> Achievement {
    Achievement {
        id: id.to_string(),
        name: format!("achievement-{}", id),
        description: "test achievement".to_string(),
        icon: "star".to_string(),
        category: AchievementCategory::Milestone,
        criteria: AchievementCriteria {
            kind,
            value,
            game_type: None,
            domain: None,
            period: None,
            time_limit_seconds: None,
            consecutive: None,
        },
        rarity: Rarity::Common,
        points_reward: 0,
        is_active: true,
        is_secret: false,
        total_earned: 0,
        created_at: Utc::now(),
    }
}

pub fn make_reward(id: &str, points_required: i64) -> Reward {
    Reward {
        id: id.to_string(),
        name: format!("reward-{}", id),
        description: "test reward".to_string(),
        kind: RewardKind::BonusPoints,
        icon: "medal".to_string(),
        points_required,
        level_required: 1,
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

pub fn make_task(id: &str, teacher_id: &str, due_in_hours: i64) -> Task {
    Task {
        id: id.to_string(),
        title: format!("task-{}", id),
        description: "revise the weekly word list".to_string(),
        teacher_id: teacher_id.to_string(),
        assigned_students: Vec::new(),
        game_type: TaskGameType::Mcq,
        difficulty: Difficulty::Medium,
        word_count: 10,
        domain: None,
        period: None,
        time_limit_minutes: 30,
        points_reward: 100,
        due_date: Utc::now() + Duration::hours(due_in_hours),
        is_active: true,
        instructions: None,
        total_assigned: 0,
        total_completed: 0,
        average_score: 0.0,
        created_at: Utc::now(),
    }
}
