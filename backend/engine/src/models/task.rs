use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::word::{Difficulty, Domain, Period};

/// Teacher-issued assignment stored in the "tasks" collection. Each
/// assignment sub-record tracks one student's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub teacher_id: String,
    #[serde(default)]
    pub assigned_students: Vec<TaskAssignment>,
    pub game_type: TaskGameType,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub word_count: u32,
    /// `None` means any domain/period.
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default = "default_time_limit_minutes")]
    pub time_limit_minutes: u32,
    #[serde(default = "default_points_reward")]
    pub points_reward: i64,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub instructions: Option<String>,
    // Aggregates maintained by the tracker
    #[serde(default)]
    pub total_assigned: u32,
    #[serde(default)]
    pub total_completed: u32,
    #[serde(default)]
    pub average_score: f64,
    pub created_at: DateTime<Utc>,
}

fn default_time_limit_minutes() -> u32 {
    30
}

fn default_points_reward() -> i64 {
    100
}

fn default_is_active() -> bool {
    true
}

/// Game type for a task; `Mixed` lets the student pick per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskGameType {
    Match,
    Mcq,
    Hints,
    Jumbled,
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub student_id: String,
    pub assigned_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Completed,
    Overdue,
}

/// Point-in-time aggregate view of one task's assignments.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatistics {
    pub total: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub overdue: u32,
    pub not_started: u32,
    pub completion_rate_pct: f64,
    pub average_score: f64,
}

impl Task {
    pub fn assignment(&self, student_id: &str) -> Option<&TaskAssignment> {
        self.assigned_students
            .iter()
            .find(|assignment| assignment.student_id == student_id)
    }

    /// Appends assignment records for the given students, skipping any that
    /// are already assigned. Returns the number of new assignments.
    pub fn assign_students(&mut self, student_ids: &[String], now: DateTime<Utc>) -> usize {
        let mut added = 0;
        for student_id in student_ids {
            if self.assignment(student_id).is_some() {
                continue;
            }
            self.assigned_students.push(TaskAssignment {
                student_id: student_id.clone(),
                assigned_at: now,
                completed_at: None,
                status: AssignmentStatus::Assigned,
                score: 0,
                feedback: None,
            });
            added += 1;
        }
        self.total_assigned += added as u32;
        added
    }

    /// The single assignment state transition, shared by teacher-driven
    /// updates and student self-submission. Completion bookkeeping
    /// (timestamp, completed counter, average score) happens exactly once,
    /// on the transition into `Completed`. Returns whether that transition
    /// happened.
    pub fn update_progress(
        &mut self,
        student_id: &str,
        status: AssignmentStatus,
        score: Option<u32>,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<bool> {
        let assignment = self
            .assigned_students
            .iter_mut()
            .find(|assignment| assignment.student_id == student_id)
            .ok_or(EngineError::StudentNotAssigned)?;

        let was_completed = assignment.status == AssignmentStatus::Completed;
        assignment.status = status;
        if let Some(score) = score {
            assignment.score = score;
        }
        if let Some(feedback) = feedback {
            assignment.feedback = Some(feedback);
        }

        let newly_completed = status == AssignmentStatus::Completed && !was_completed;
        if newly_completed {
            assignment.completed_at = Some(now);
            self.total_completed += 1;
        }

        self.recompute_average_score();
        Ok(newly_completed)
    }

    fn recompute_average_score(&mut self) {
        let completed: Vec<&TaskAssignment> = self
            .assigned_students
            .iter()
            .filter(|assignment| assignment.status == AssignmentStatus::Completed)
            .collect();
        if completed.is_empty() {
            return;
        }
        let sum: u64 = completed.iter().map(|a| u64::from(a.score)).sum();
        self.average_score = sum as f64 / completed.len() as f64;
    }

    /// Flips every open assignment of a past-due task to `Overdue`.
    /// Completed and already-overdue assignments are untouched. Returns the
    /// number of assignments flipped.
    pub fn check_overdue(&mut self, now: DateTime<Utc>) -> usize {
        if self.due_date >= now {
            return 0;
        }

        let mut flipped = 0;
        for assignment in &mut self.assigned_students {
            if assignment.status == AssignmentStatus::Completed
                || assignment.status == AssignmentStatus::Overdue
            {
                continue;
            }
            assignment.status = AssignmentStatus::Overdue;
            flipped += 1;
        }
        flipped
    }

    pub fn statistics(&self) -> TaskStatistics {
        let total = self.assigned_students.len() as u32;
        let count = |status: AssignmentStatus| {
            self.assigned_students
                .iter()
                .filter(|assignment| assignment.status == status)
                .count() as u32
        };
        let completed = count(AssignmentStatus::Completed);

        TaskStatistics {
            total,
            completed,
            in_progress: count(AssignmentStatus::InProgress),
            overdue: count(AssignmentStatus::Overdue),
            not_started: count(AssignmentStatus::Assigned),
            completion_rate_pct: if total > 0 {
                f64::from(completed) / f64::from(total) * 100.0
            } else {
                0.0
            },
            average_score: self.average_score,
        }
    }
}
