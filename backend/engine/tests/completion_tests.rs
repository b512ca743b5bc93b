use sollvault_engine::models::{GameType, SessionStatus};
use sollvault_engine::services::answer_service::SubmitAnswerRequest;
use sollvault_engine::services::session_service::StartGameResponse;
use sollvault_engine::services::AppState;
use sollvault_engine::store::DocumentStore;
use sollvault_engine::EngineError;

mod common;

/// Answers the first `correct` questions correctly and the rest wrong,
/// spending `seconds_each` per answer.
async fn play(state: &AppState, started: &StartGameResponse, user_id: &str, correct: usize, seconds_each: u32) {
    let answers = common::answer_service(state);
    for (index, question) in started.questions.iter().enumerate() {
        let submitted = if index < correct {
            question.correct_answer.clone()
        } else {
            "definitely wrong".to_string()
        };
        answers
            .submit_answer(
                &started.session_id,
                user_id,
                &SubmitAnswerRequest {
                    question_index: index,
                    answer: submitted,
                    time_spent_seconds: seconds_each,
                },
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_completion_applies_the_score_formula() {
    let state = common::test_state();
    common::seed_words(&state, 10).await;
    let student = common::seed_student(&state, "u1").await;

    let sessions = common::session_service(&state);
    let started = sessions
        .start_session(&student.id, &common::start_request(GameType::Mcq, 5))
        .await
        .unwrap();
    play(&state, &started, &student.id, 3, 20).await;

    let completed = sessions
        .complete_game(&started.session_id, &student.id)
        .await
        .unwrap();

    // 3*10 + (300 - 100)*0.1 + (3/5)*50 = 80
    assert_eq!(completed.final_score, 80);
    assert_eq!(completed.points_earned, 80);
    assert_eq!(completed.correct_count, 3);
    assert_eq!(completed.wrong_count, 2);
    assert_eq!(completed.total_questions, 5);
    assert_eq!(completed.accuracy_pct, 60.0);

    let session = sessions
        .get_session(&started.session_id, &student.id)
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.completed_at.is_some());
}

#[tokio::test]
async fn test_completion_updates_progression_and_word_stats() {
    let state = common::test_state();
    common::seed_words(&state, 10).await;
    let student = common::seed_student(&state, "u1").await;

    let sessions = common::session_service(&state);
    let started = sessions
        .start_session(&student.id, &common::start_request(GameType::Mcq, 5))
        .await
        .unwrap();
    play(&state, &started, &student.id, 3, 20).await;

    let completed = sessions
        .complete_game(&started.session_id, &student.id)
        .await
        .unwrap();

    let user = state.store.find_user(&student.id).await.unwrap().unwrap();
    assert_eq!(user.points, 80);
    assert_eq!(user.level, 1);
    assert_eq!(user.total_games_played, 1);
    assert_eq!(completed.user_stats.total_points, 80);
    assert_eq!(completed.user_stats.total_games_played, 1);

    // Every answered question fed the word usage statistics
    let session = sessions
        .get_session(&started.session_id, &student.id)
        .await
        .unwrap();
    for question in &session.questions {
        let word = state
            .store
            .find_word(&question.word_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(word.times_used, 1);
        if question.is_correct {
            assert_eq!(word.correct_count, 1);
            assert_eq!(word.wrong_count, 0);
        } else {
            assert_eq!(word.correct_count, 0);
            assert_eq!(word.wrong_count, 1);
        }
    }
}

#[tokio::test]
async fn test_abandon_triggers_no_progression() {
    let state = common::test_state();
    common::seed_words(&state, 10).await;
    let student = common::seed_student(&state, "u1").await;

    let sessions = common::session_service(&state);
    let started = sessions
        .start_session(&student.id, &common::start_request(GameType::Mcq, 5))
        .await
        .unwrap();
    play(&state, &started, &student.id, 5, 5).await;

    sessions
        .abandon_game(&started.session_id, &student.id)
        .await
        .unwrap();

    let user = state.store.find_user(&student.id).await.unwrap().unwrap();
    assert_eq!(user.points, 0);
    assert_eq!(user.total_games_played, 0);

    // Word usage statistics are a completion effect only
    let session = sessions
        .get_session(&started.session_id, &student.id)
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::Abandoned);
    for question in &session.questions {
        let word = state
            .store
            .find_word(&question.word_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(word.times_used, 0);
    }
}

#[tokio::test]
async fn test_terminal_sessions_cannot_complete_again() {
    let state = common::test_state();
    common::seed_words(&state, 10).await;
    let student = common::seed_student(&state, "u1").await;

    let sessions = common::session_service(&state);
    let started = sessions
        .start_session(&student.id, &common::start_request(GameType::Mcq, 5))
        .await
        .unwrap();

    sessions
        .complete_game(&started.session_id, &student.id)
        .await
        .unwrap();
    let err = sessions
        .complete_game(&started.session_id, &student.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SessionNotActive));

    let err = sessions
        .abandon_game(&started.session_id, &student.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SessionNotActive));
}

#[tokio::test]
async fn test_completion_requires_the_owner() {
    let state = common::test_state();
    common::seed_words(&state, 10).await;
    let student = common::seed_student(&state, "u1").await;
    let other = common::seed_student(&state, "u2").await;

    let sessions = common::session_service(&state);
    let started = sessions
        .start_session(&student.id, &common::start_request(GameType::Mcq, 5))
        .await
        .unwrap();

    let err = sessions
        .complete_game(&started.session_id, &other.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized));
}

#[tokio::test]
async fn test_concurrent_completions_award_points_once() {
    let state = common::test_state();
    common::seed_words(&state, 10).await;
    let student = common::seed_student(&state, "u1").await;

    let sessions = common::session_service(&state);
    let started = sessions
        .start_session(&student.id, &common::start_request(GameType::Mcq, 5))
        .await
        .unwrap();
    play(&state, &started, &student.id, 5, 10).await;

    let first = common::session_service(&state);
    let second = common::session_service(&state);
    let (a, b) = tokio::join!(
        first.complete_game(&started.session_id, &student.id),
        second.complete_game(&started.session_id, &student.id),
    );

    // Exactly one writer wins; the loser observes the terminal state
    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser.unwrap_err(), EngineError::SessionNotActive));

    let user = state.store.find_user(&student.id).await.unwrap().unwrap();
    // 5*10 + (300-50)*0.1 + 50 = 125, awarded exactly once
    assert_eq!(user.points, 125);
    assert_eq!(user.total_games_played, 1);
}
