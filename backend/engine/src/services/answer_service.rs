use std::sync::Arc;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{EngineError, EngineResult};
use crate::store::DocumentStore;
use crate::utils::locks::AggregateLocks;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    pub question_index: usize,
    #[validate(length(min = 1, message = "Answer must not be empty"))]
    pub answer: String,
    #[serde(default)]
    pub time_spent_seconds: u32,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub correct_answer: String,
    /// Running session score; stays 0 until completion computes it.
    pub score: i64,
    pub correct_count: u32,
    pub wrong_count: u32,
}

pub struct AnswerService {
    store: Arc<dyn DocumentStore>,
    locks: AggregateLocks,
}

impl AnswerService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: AggregateLocks) -> Self {
        Self { store, locks }
    }

    pub async fn submit_answer(
        &self,
        session_id: &str,
        user_id: &str,
        req: &SubmitAnswerRequest,
    ) -> EngineResult<SubmitAnswerResponse> {
        req.validate()?;

        let _session_guard = self.locks.acquire(&format!("session:{}", session_id)).await;

        let mut session = self
            .store
            .find_session(session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
        session.ensure_owned_by(user_id)?;

        let (is_correct, correct_answer) = {
            let question =
                session.submit_answer(req.question_index, &req.answer, req.time_spent_seconds)?;
            (question.is_correct, question.correct_answer.clone())
        };

        self.store.update_session(&session).await?;

        tracing::info!(
            "Answer recorded: session={} question={} correct={}",
            session_id,
            req.question_index,
            is_correct
        );

        Ok(SubmitAnswerResponse {
            is_correct,
            correct_answer,
            score: session.score,
            correct_count: session.correct_count,
            wrong_count: session.wrong_count,
        })
    }
}
