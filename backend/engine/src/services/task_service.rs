use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{AssignmentStatus, TaskStatistics};
use crate::store::DocumentStore;
use crate::utils::locks::AggregateLocks;

/// Who is driving an assignment transition. Teacher updates may set any
/// status on any of their students; a student may only complete their own
/// assignment, and only that path pays out the task reward.
#[derive(Debug, Clone, Copy)]
pub enum TaskActor<'a> {
    Teacher(&'a str),
    Student(&'a str),
}

#[derive(Debug, Serialize)]
pub struct SubmitTaskResponse {
    pub points_earned: i64,
    pub score: u32,
}

pub struct TaskService {
    store: Arc<dyn DocumentStore>,
    locks: AggregateLocks,
}

impl TaskService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: AggregateLocks) -> Self {
        Self { store, locks }
    }

    /// Adds assignment records for the given students. Unknown ids and
    /// non-student accounts are invalid assignees; nothing is assigned when
    /// any id fails validation. Returns the number of new assignments.
    pub async fn assign_to_students(
        &self,
        task_id: &str,
        teacher_id: &str,
        student_ids: &[String],
    ) -> EngineResult<usize> {
        let _task_guard = self.locks.acquire(&format!("task:{}", task_id)).await;

        let mut task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
        if task.teacher_id != teacher_id {
            return Err(EngineError::Unauthorized);
        }

        for student_id in student_ids {
            let user = self
                .store
                .find_user(student_id)
                .await?
                .ok_or_else(|| EngineError::UserNotFound(student_id.clone()))?;
            if !user.is_student() {
                return Err(EngineError::UserNotFound(student_id.clone()));
            }
        }

        let added = task.assign_students(student_ids, Utc::now());
        self.store.update_task(&task).await?;

        tracing::info!(
            "Assigned task {} to {} student(s) ({} new)",
            task_id,
            student_ids.len(),
            added
        );
        Ok(added)
    }

    /// Teacher-driven progress update.
    pub async fn update_student_progress(
        &self,
        task_id: &str,
        teacher_id: &str,
        student_id: &str,
        status: AssignmentStatus,
        score: Option<u32>,
        feedback: Option<String>,
    ) -> EngineResult<()> {
        self.apply_progress(
            task_id,
            TaskActor::Teacher(teacher_id),
            student_id,
            status,
            score,
            feedback,
        )
        .await?;
        Ok(())
    }

    /// Student self-service completion. Pays out the task reward through the
    /// progression engine; a second submission is rejected.
    pub async fn submit_task(
        &self,
        task_id: &str,
        student_id: &str,
        score: u32,
    ) -> EngineResult<SubmitTaskResponse> {
        let points_earned = self
            .apply_progress(
                task_id,
                TaskActor::Student(student_id),
                student_id,
                AssignmentStatus::Completed,
                Some(score),
                None,
            )
            .await?;

        Ok(SubmitTaskResponse {
            points_earned,
            score,
        })
    }

    /// The one assignment transition path, parameterized by actor.
    async fn apply_progress(
        &self,
        task_id: &str,
        actor: TaskActor<'_>,
        student_id: &str,
        status: AssignmentStatus,
        score: Option<u32>,
        feedback: Option<String>,
    ) -> EngineResult<i64> {
        let _task_guard = self.locks.acquire(&format!("task:{}", task_id)).await;

        let mut task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;

        match actor {
            TaskActor::Teacher(teacher_id) => {
                if task.teacher_id != teacher_id {
                    return Err(EngineError::Unauthorized);
                }
            }
            TaskActor::Student(actor_id) => {
                if actor_id != student_id {
                    return Err(EngineError::Unauthorized);
                }
                let assignment = task
                    .assignment(student_id)
                    .ok_or(EngineError::StudentNotAssigned)?;
                if assignment.status == AssignmentStatus::Completed {
                    return Err(EngineError::TaskAlreadyCompleted);
                }
            }
        }

        let newly_completed = task.update_progress(student_id, status, score, feedback, Utc::now())?;

        // Only self-submission pays the reward; lock order is task before user
        let points_awarded = match actor {
            TaskActor::Student(_) if newly_completed => {
                let _user_guard = self.locks.acquire(&format!("user:{}", student_id)).await;
                let mut user = self
                    .store
                    .find_user(student_id)
                    .await?
                    .ok_or_else(|| EngineError::UserNotFound(student_id.to_string()))?;
                if !user.is_student() {
                    return Err(EngineError::Unauthorized);
                }
                user.update_points(task.points_reward);

                self.store.update_task(&task).await?;
                self.store.update_user(&user).await?;
                task.points_reward
            }
            _ => {
                self.store.update_task(&task).await?;
                0
            }
        };

        tracing::info!(
            "Task progress: task={} student={} status={:?} completed={} points={}",
            task_id,
            student_id,
            status,
            newly_completed,
            points_awarded
        );

        Ok(points_awarded)
    }

    /// Lazily flips open assignments of one past-due task. Returns how many
    /// assignments changed.
    pub async fn check_overdue(&self, task_id: &str) -> EngineResult<usize> {
        let _task_guard = self.locks.acquire(&format!("task:{}", task_id)).await;

        let mut task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;

        let flipped = task.check_overdue(Utc::now());
        if flipped > 0 {
            self.store.update_task(&task).await?;
            tracing::info!("Task {} overdue sweep: {} assignment(s) flipped", task_id, flipped);
        }
        Ok(flipped)
    }

    /// Bulk overdue sweep over every active task.
    pub async fn sweep_overdue(&self) -> EngineResult<usize> {
        let tasks = self.store.list_active_tasks().await?;
        let mut total_flipped = 0;

        for listed in tasks {
            let _task_guard = self.locks.acquire(&format!("task:{}", listed.id)).await;
            // Reload under the lock; the listing snapshot may be stale
            let Some(mut task) = self.store.find_task(&listed.id).await? else {
                continue;
            };
            let flipped = task.check_overdue(Utc::now());
            if flipped > 0 {
                self.store.update_task(&task).await?;
                total_flipped += flipped;
            }
        }

        if total_flipped > 0 {
            tracing::info!("Overdue sweep flipped {} assignment(s)", total_flipped);
        }
        Ok(total_flipped)
    }

    /// Owner-only aggregate view of one task.
    pub async fn task_statistics(
        &self,
        task_id: &str,
        teacher_id: &str,
    ) -> EngineResult<TaskStatistics> {
        let task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
        if task.teacher_id != teacher_id {
            return Err(EngineError::Unauthorized);
        }
        Ok(task.statistics())
    }
}
