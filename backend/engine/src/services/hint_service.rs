use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::GameType;
use crate::store::DocumentStore;
use crate::utils::locks::AggregateLocks;

/// Returned in place of a hint once all four are spent. Not a fault.
pub const NO_MORE_HINTS: &str = "No more hints available";

#[derive(Debug, Serialize)]
pub struct UseHintResponse {
    pub hint: String,
    /// Every hint shown so far for this question's word, latest included.
    pub hints_shown: Vec<String>,
    pub exhausted: bool,
}

pub struct HintService {
    store: Arc<dyn DocumentStore>,
    locks: AggregateLocks,
}

impl HintService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: AggregateLocks) -> Self {
        Self { store, locks }
    }

    /// Reveals one of the word's four fixed hints, chosen uniformly among
    /// those not yet shown for the question. Exhaustion returns the sentinel
    /// without mutating the session.
    pub async fn use_hint(
        &self,
        session_id: &str,
        user_id: &str,
        question_index: usize,
    ) -> EngineResult<UseHintResponse> {
        let _session_guard = self.locks.acquire(&format!("session:{}", session_id)).await;

        let mut session = self
            .store
            .find_session(session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
        session.ensure_owned_by(user_id)?;
        session.ensure_active()?;

        if session.game_type != GameType::Hints {
            return Err(EngineError::HintsNotAvailable);
        }

        let question = session
            .questions
            .get(question_index)
            .ok_or(EngineError::InvalidQuestionIndex(question_index))?;
        let word_id = question.word_id.clone();

        let word = self
            .store
            .find_word(&word_id)
            .await?
            .ok_or_else(|| EngineError::WordNotFound(word_id.clone()))?;

        let candidates = word.hint_candidates();
        let shown: Vec<String> = session
            .hints_shown_for(&word_id)
            .into_iter()
            .map(str::to_string)
            .collect();
        let unused: Vec<&String> = candidates
            .iter()
            .filter(|candidate| !shown.iter().any(|s| s == *candidate))
            .collect();

        if unused.is_empty() {
            tracing::debug!(
                "Hints exhausted: session={} question={}",
                session_id,
                question_index
            );
            return Ok(UseHintResponse {
                hint: NO_MORE_HINTS.to_string(),
                hints_shown: shown,
                exhausted: true,
            });
        }

        let mut rng = rand::rng();
        let hint = unused[rng.random_range(0..unused.len())].clone();

        session.record_hint(question_index, hint.clone(), Utc::now())?;
        self.store.update_session(&session).await?;

        tracing::info!(
            "Hint revealed: session={} question={} ({} shown)",
            session_id,
            question_index,
            shown.len() + 1
        );

        let mut hints_shown = shown;
        hints_shown.push(hint.clone());

        Ok(UseHintResponse {
            hint,
            hints_shown,
            exhausted: false,
        })
    }
}
