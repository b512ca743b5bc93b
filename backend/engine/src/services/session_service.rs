use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Difficulty, Domain, GameSession, GameType, MatchBoard, MatchToken, Period, Question, Word,
    WordFilter,
};
use crate::services::eligibility_service::{
    evaluate_achievements, evaluate_rewards, AchievementAward, RewardGrant,
};
use crate::store::DocumentStore;
use crate::utils::locks::AggregateLocks;

// An mcq question always offers the correct meaning plus three distractors
const MCQ_OPTION_COUNT: usize = 4;
// Distractor sampling is probabilistic; the cap bounds the draw loop when
// the pool is heavy with duplicate meanings
const MAX_DISTRACTOR_ATTEMPTS: usize = 256;

#[derive(Debug, Deserialize, Validate)]
pub struct StartGameRequest {
    pub game_type: GameType,
    pub difficulty: Option<Difficulty>,
    #[validate(range(min = 5, max = 50, message = "Word count must be between 5 and 50"))]
    pub word_count: Option<u32>,
    pub domain: Option<Domain>,
    pub period: Option<Period>,
}

#[derive(Debug, Serialize)]
pub struct StartGameResponse {
    pub session_id: String,
    pub game_type: GameType,
    pub difficulty: Option<Difficulty>,
    pub total_questions: u32,
    pub questions: Vec<Question>,
    pub match_board: Option<MatchBoard>,
    pub time_limit_seconds: u32,
}

#[derive(Debug, Serialize)]
pub struct CompleteGameResponse {
    pub final_score: i64,
    pub points_earned: i64,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub total_questions: u32,
    pub accuracy_pct: f64,
    pub new_achievements: Vec<AchievementAward>,
    pub earned_rewards: Vec<RewardGrant>,
    pub user_stats: UserStatsSummary,
}

#[derive(Debug, Serialize)]
pub struct UserStatsSummary {
    pub total_points: i64,
    pub level: u32,
    pub total_games_played: u32,
}

pub struct SessionService {
    store: Arc<dyn DocumentStore>,
    locks: AggregateLocks,
    config: Config,
}

impl SessionService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: AggregateLocks, config: Config) -> Self {
        Self {
            store,
            locks,
            config,
        }
    }

    /// Builds a new active session from a random word sample. Fails without
    /// side effects when the filtered pool cannot fill the request.
    pub async fn start_session(
        &self,
        user_id: &str,
        req: &StartGameRequest,
    ) -> EngineResult<StartGameResponse> {
        req.validate()?;

        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))?;
        if !user.is_student() {
            return Err(EngineError::Unauthorized);
        }

        let requested = req.word_count.unwrap_or(self.config.default_word_count) as usize;
        let filter = WordFilter {
            difficulty: req.difficulty,
            domain: req.domain,
            period: req.period,
            ..Default::default()
        };

        tracing::info!(
            "Starting {} session for user {}: {} words requested",
            req.game_type.as_str(),
            user_id,
            requested
        );

        let words = self.store.sample_words(&filter, requested).await?;
        if words.len() < requested {
            tracing::warn!(
                "Word pool too small for session: found {}, need {}",
                words.len(),
                requested
            );
            return Err(EngineError::InsufficientWords {
                requested,
                available: words.len(),
            });
        }

        let (questions, match_board) = match req.game_type {
            GameType::Match => Self::build_match_questions(&words),
            GameType::Mcq => (self.build_mcq_questions(&words).await?, None),
            GameType::Hints => (Self::build_hints_questions(&words), None),
            GameType::Jumbled => (Self::build_jumbled_questions(&words), None),
        };

        let session = GameSession::new(
            user_id.to_string(),
            req.game_type,
            req.difficulty,
            questions,
            match_board,
        );
        self.store.insert_session(session.clone()).await?;

        tracing::info!(
            "Session created: {} ({} questions)",
            session.id,
            session.total_questions
        );

        let time_limit_seconds = match req.game_type {
            GameType::Hints => self.config.hints_time_limit_seconds,
            _ => self.config.default_time_limit_seconds,
        };

        Ok(StartGameResponse {
            session_id: session.id,
            game_type: session.game_type,
            difficulty: session.difficulty,
            total_questions: session.total_questions,
            questions: session.questions,
            match_board: session.match_board,
            time_limit_seconds,
        })
    }

    /// Owner-checked session lookup.
    pub async fn get_session(&self, session_id: &str, user_id: &str) -> EngineResult<GameSession> {
        let session = self
            .store
            .find_session(session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
        session.ensure_owned_by(user_id)?;
        Ok(session)
    }

    /// The user's currently active session, if any.
    pub async fn get_active_session(&self, user_id: &str) -> EngineResult<Option<GameSession>> {
        Ok(self.store.find_active_session_for_user(user_id).await?)
    }

    /// Finishes a session and applies the full outcome — scoring, word usage
    /// statistics, progression, achievements and rewards — as one unit of
    /// work under the session and user locks. Nothing is persisted until the
    /// whole outcome is staged.
    pub async fn complete_game(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> EngineResult<CompleteGameResponse> {
        let _session_guard = self.locks.acquire(&format!("session:{}", session_id)).await;

        let mut session = self
            .store
            .find_session(session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
        session.ensure_owned_by(user_id)?;

        let now = Utc::now();
        session.complete(now)?;

        // Lock order: session before user, everywhere
        let _user_guard = self.locks.acquire(&format!("user:{}", user_id)).await;
        let mut user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))?;

        // Stage word usage statistics for every answered question
        let mut touched_words: Vec<Word> = Vec::new();
        for question in session
            .questions
            .iter()
            .filter(|q| q.user_answer.is_some() && !q.word_id.is_empty())
        {
            let mut word = self
                .store
                .find_word(&question.word_id)
                .await?
                .ok_or_else(|| EngineError::WordNotFound(question.word_id.clone()))?;
            word.update_usage_stats(question.is_correct);
            touched_words.push(word);
        }

        // Progression: one points award and one game-stat record per session
        user.update_points(session.points_earned);
        user.update_game_stats(true);

        // Eligibility, in catalog order
        let achievements = self.store.list_active_achievements().await?;
        let (new_achievements, touched_achievements) =
            evaluate_achievements(achievements, &mut user, Some(&session), now)?;

        let rewards = self.store.list_active_rewards().await?;
        let (earned_rewards, touched_rewards) =
            evaluate_rewards(rewards, &mut user, Some(&session), now)?;

        // Commit the staged outcome
        self.store.update_session(&session).await?;
        self.store.update_user(&user).await?;
        for word in &touched_words {
            self.store.update_word(word).await?;
        }
        for achievement in &touched_achievements {
            self.store.update_achievement(achievement).await?;
        }
        for reward in &touched_rewards {
            self.store.update_reward(reward).await?;
        }

        tracing::info!(
            "Session completed: {} score={} achievements={} rewards={}",
            session_id,
            session.score,
            new_achievements.len(),
            earned_rewards.len()
        );

        Ok(CompleteGameResponse {
            final_score: session.score,
            points_earned: session.points_earned,
            correct_count: session.correct_count,
            wrong_count: session.wrong_count,
            total_questions: session.total_questions,
            accuracy_pct: session.accuracy_pct(),
            new_achievements,
            earned_rewards,
            user_stats: UserStatsSummary {
                total_points: user.points,
                level: user.level,
                total_games_played: user.total_games_played,
            },
        })
    }

    /// Terminal transition without scoring or progression side effects.
    pub async fn abandon_game(&self, session_id: &str, user_id: &str) -> EngineResult<()> {
        let _session_guard = self.locks.acquire(&format!("session:{}", session_id)).await;

        let mut session = self
            .store
            .find_session(session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
        session.ensure_owned_by(user_id)?;
        session.abandon(Utc::now())?;
        self.store.update_session(&session).await?;

        tracing::info!("Session abandoned: {}", session_id);
        Ok(())
    }

    fn build_match_questions(words: &[Word]) -> (Vec<Question>, Option<MatchBoard>) {
        let mut rng = rand::rng();

        let mut word_items: Vec<MatchToken> = words
            .iter()
            .map(|word| MatchToken {
                word_id: word.id.clone(),
                label: word.text.clone(),
            })
            .collect();
        let mut meaning_items: Vec<MatchToken> = words
            .iter()
            .map(|word| MatchToken {
                word_id: word.id.clone(),
                label: word.meaning_primary.clone(),
            })
            .collect();
        word_items.shuffle(&mut rng);
        meaning_items.shuffle(&mut rng);

        let correct_pairs: BTreeMap<String, String> = words
            .iter()
            .map(|word| (word.id.clone(), word.meaning_primary.clone()))
            .collect();

        let board = MatchBoard {
            word_items,
            meaning_items,
            correct_pairs,
        };

        let aggregate = Question {
            word_id: String::new(),
            prompt: "Match each word with its meaning".to_string(),
            options: Vec::new(),
            correct_answer: board.canonical_answer(),
            user_answer: None,
            is_correct: false,
            time_spent_seconds: 0,
            hints_used: 0,
            domain: None,
            period: None,
        };

        (vec![aggregate], Some(board))
    }

    async fn build_mcq_questions(&self, words: &[Word]) -> EngineResult<Vec<Question>> {
        // Distractors come from the whole active pool, not the filtered
        // session subset
        let pool = self.store.find_words(&WordFilter::default(), None).await?;
        let distinct_meanings: HashSet<&str> =
            pool.iter().map(|w| w.meaning_primary.as_str()).collect();
        if distinct_meanings.len() < MCQ_OPTION_COUNT {
            return Err(EngineError::InsufficientWords {
                requested: MCQ_OPTION_COUNT,
                available: distinct_meanings.len(),
            });
        }

        let mut rng = rand::rng();
        let mut questions = Vec::with_capacity(words.len());
        for word in words {
            let mut distractors: Vec<String> = Vec::with_capacity(MCQ_OPTION_COUNT - 1);
            let mut attempts = 0;
            while distractors.len() < MCQ_OPTION_COUNT - 1 {
                attempts += 1;
                if attempts > MAX_DISTRACTOR_ATTEMPTS {
                    return Err(EngineError::InsufficientWords {
                        requested: MCQ_OPTION_COUNT,
                        available: distractors.len() + 1,
                    });
                }
                let candidate = match pool.choose(&mut rng) {
                    Some(candidate) => candidate,
                    None => break,
                };
                if candidate.id == word.id
                    || candidate.meaning_primary == word.meaning_primary
                    || distractors.iter().any(|d| *d == candidate.meaning_primary)
                {
                    continue;
                }
                distractors.push(candidate.meaning_primary.clone());
            }

            let mut options = Vec::with_capacity(MCQ_OPTION_COUNT);
            options.push(word.meaning_primary.clone());
            options.extend(distractors);
            options.shuffle(&mut rng);

            questions.push(Question {
                word_id: word.id.clone(),
                prompt: format!("What is the meaning of \"{}\"?", word.text),
                options,
                correct_answer: word.meaning_primary.clone(),
                user_answer: None,
                is_correct: false,
                time_spent_seconds: 0,
                hints_used: 0,
                domain: Some(word.domain),
                period: Some(word.period),
            });
        }

        Ok(questions)
    }

    fn build_hints_questions(words: &[Word]) -> Vec<Question> {
        words
            .iter()
            .map(|word| Question {
                word_id: word.id.clone(),
                prompt: format!(
                    "Guess the word using hints: {}",
                    word.notes.as_deref().unwrap_or("No hints available")
                ),
                options: Vec::new(),
                correct_answer: word.text.clone(),
                user_answer: None,
                is_correct: false,
                time_spent_seconds: 0,
                hints_used: 0,
                domain: Some(word.domain),
                period: Some(word.period),
            })
            .collect()
    }

    fn build_jumbled_questions(words: &[Word]) -> Vec<Question> {
        let mut rng = rand::rng();
        words
            .iter()
            .map(|word| {
                let mut letters: Vec<char> = word.text.chars().collect();
                letters.shuffle(&mut rng);
                let jumbled: String = letters.into_iter().collect();

                Question {
                    word_id: word.id.clone(),
                    prompt: format!("Unscramble this word: {}", jumbled),
                    options: Vec::new(),
                    correct_answer: word.text.clone(),
                    user_answer: None,
                    is_correct: false,
                    time_spent_seconds: 0,
                    hints_used: 0,
                    domain: Some(word.domain),
                    period: Some(word.period),
                }
            })
            .collect()
    }
}
