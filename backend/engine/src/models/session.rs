use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::word::{Difficulty, Domain, Period};

// Scoring: 10 points per correct answer, a decaying bonus for finishing
// inside the 300-second window, and up to 50 points for accuracy.
const POINTS_PER_CORRECT: f64 = 10.0;
const TIME_BONUS_WINDOW_SECONDS: f64 = 300.0;
const TIME_BONUS_RATE: f64 = 0.1;
const ACCURACY_BONUS_MAX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Match,
    Mcq,
    Hints,
    Jumbled,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Match => "match",
            GameType::Mcq => "mcq",
            GameType::Hints => "hints",
            GameType::Jumbled => "jumbled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

/// One question inside a session. For the match game the session carries a
/// single aggregate question whose answer is the canonical pairing encoding;
/// every other game type gets one question per word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub word_id: String,
    pub prompt: String,
    /// Shuffled choices, mcq only.
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub time_spent_seconds: u32,
    #[serde(default)]
    pub hints_used: u32,
    // Word tag snapshots, used by reward special-condition checks
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default)]
    pub period: Option<Period>,
}

/// Board state for the match game: both token lists shuffled independently,
/// plus the ground-truth pairing keyed by word id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchBoard {
    pub word_items: Vec<MatchToken>,
    pub meaning_items: Vec<MatchToken>,
    pub correct_pairs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchToken {
    pub word_id: String,
    pub label: String,
}

impl MatchBoard {
    /// Canonical encoding of the ground-truth pairing: `id=meaning` entries
    /// sorted by word id, joined with `;`.
    pub fn canonical_answer(&self) -> String {
        self.correct_pairs
            .iter()
            .map(|(id, meaning)| format!("{}={}", id, meaning))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Puts a submitted match pairing into canonical form so it can be compared
/// with exact string equality: pairs may arrive in any order.
pub fn canonicalize_match_answer(raw: &str) -> String {
    let mut pairs: Vec<&str> = raw
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();
    pairs.sort_unstable();
    pairs.join(";")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintUse {
    pub word_id: String,
    pub hint_text: String,
    pub used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub user_id: String,
    pub game_type: GameType,
    pub status: SessionStatus,
    pub score: i64,
    pub total_questions: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    /// Accumulated from the per-answer times reported by the client.
    pub time_spent_seconds: u32,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub match_board: Option<MatchBoard>,
    pub difficulty: Option<Difficulty>,
    pub points_earned: i64,
    #[serde(default)]
    pub hint_log: Vec<HintUse>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(
        user_id: String,
        game_type: GameType,
        difficulty: Option<Difficulty>,
        questions: Vec<Question>,
        match_board: Option<MatchBoard>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            game_type,
            status: SessionStatus::Active,
            score: 0,
            total_questions: questions.len() as u32,
            correct_count: 0,
            wrong_count: 0,
            time_spent_seconds: 0,
            questions,
            match_board,
            difficulty,
            points_earned: 0,
            hint_log: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn ensure_active(&self) -> EngineResult<()> {
        if self.status != SessionStatus::Active {
            return Err(EngineError::SessionNotActive);
        }
        Ok(())
    }

    pub fn ensure_owned_by(&self, user_id: &str) -> EngineResult<()> {
        if self.user_id != user_id {
            return Err(EngineError::Unauthorized);
        }
        Ok(())
    }

    /// Records an answer on one question. Each question takes exactly one
    /// answer; a second submission is rejected rather than re-counted.
    pub fn submit_answer(
        &mut self,
        index: usize,
        answer: &str,
        time_spent_seconds: u32,
    ) -> EngineResult<&Question> {
        self.ensure_active()?;

        let submitted = match self.game_type {
            GameType::Match => canonicalize_match_answer(answer),
            _ => answer.to_string(),
        };

        let question = self
            .questions
            .get_mut(index)
            .ok_or(EngineError::InvalidQuestionIndex(index))?;

        if question.user_answer.is_some() {
            return Err(EngineError::AnswerAlreadySubmitted(index));
        }

        question.is_correct = submitted == question.correct_answer;
        question.user_answer = Some(submitted);
        question.time_spent_seconds = time_spent_seconds;

        if question.is_correct {
            self.correct_count += 1;
        } else {
            self.wrong_count += 1;
        }
        self.time_spent_seconds += time_spent_seconds;

        Ok(&self.questions[index])
    }

    /// Hint strings already shown for a word in this session.
    pub fn hints_shown_for(&self, word_id: &str) -> Vec<&str> {
        self.hint_log
            .iter()
            .filter(|entry| entry.word_id == word_id)
            .map(|entry| entry.hint_text.as_str())
            .collect()
    }

    pub fn record_hint(
        &mut self,
        index: usize,
        hint_text: String,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.ensure_active()?;

        let question = self
            .questions
            .get_mut(index)
            .ok_or(EngineError::InvalidQuestionIndex(index))?;
        question.hints_used += 1;

        let word_id = question.word_id.clone();
        self.hint_log.push(HintUse {
            word_id,
            hint_text,
            used_at: now,
        });
        Ok(())
    }

    /// Final score: base points per correct answer plus time and accuracy
    /// bonuses, rounded to the nearest integer.
    pub fn calculate_score(&mut self) -> i64 {
        let base = f64::from(self.correct_count) * POINTS_PER_CORRECT;
        let time_bonus = (TIME_BONUS_WINDOW_SECONDS - f64::from(self.time_spent_seconds)).max(0.0)
            * TIME_BONUS_RATE;
        let accuracy_bonus =
            f64::from(self.correct_count) / f64::from(self.total_questions) * ACCURACY_BONUS_MAX;

        self.score = (base + time_bonus + accuracy_bonus).round() as i64;
        self.points_earned = self.score;
        self.score
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        self.ensure_active()?;
        self.calculate_score();
        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn abandon(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        self.ensure_active()?;
        self.status = SessionStatus::Abandoned;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn accuracy_pct(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) / f64::from(self.total_questions) * 100.0
    }

    /// A perfect session scores exactly the base points for every question.
    pub fn is_perfect_score(&self) -> bool {
        self.score == i64::from(self.total_questions) * POINTS_PER_CORRECT as i64
    }
}
