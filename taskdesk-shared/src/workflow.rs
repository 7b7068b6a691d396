/// Task assignment workflow
///
/// The lifecycle of a task is a three-state machine derived entirely from
/// the `(user_id, done)` pair:
///
/// ```text
/// Unassigned (user_id NULL, done false)
///     │ assign            ▲ unassign (resets done)
///     ▼                   │
/// Assigned   (user_id set, done false)
///     │ submit (assignee only)
///     ▼
/// Submitted  (user_id set, done true)
/// ```
///
/// `user_id NULL + done true` is unreachable through these operations:
/// submit requires an assignee and unassign clears `done` together with the
/// assignee. The admin field-update path in [`crate::models::task`] bypasses
/// these checks and can produce arbitrary combinations; that escape hatch is
/// deliberately left outside this module.
///
/// Concurrent calls on the same task race at the storage layer and the last
/// write wins; no application-level locking is performed.
use sqlx::PgPool;

use crate::models::{task::Task, user::User};

/// Error type for workflow transitions
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Referenced task does not exist
    #[error("This task doesn't exist")]
    TaskNotFound,

    /// Referenced user does not exist
    #[error("This user doesn't exist")]
    UserNotFound,

    /// Caller is not the task's assignee (or the task does not exist; the
    /// two cases are deliberately indistinguishable to the caller)
    #[error("You are not assigned to this task")]
    NotAssignee,

    /// Task has already been submitted
    #[error("The task is already submitted")]
    AlreadySubmitted,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// No assignee, not done
    Unassigned,

    /// Assignee set, not done
    Assigned,

    /// Assignee set and done
    Submitted,
}

impl TaskState {
    /// Derives the state from the `(user_id, done)` pair
    ///
    /// `(None, true)` has no workflow state; it can only be produced by the
    /// admin escape hatch and is reported as `Unassigned` here, matching
    /// how unassign treats `done` as meaningless without an assignee.
    pub fn of(user_id: Option<i64>, done: bool) -> Self {
        match (user_id, done) {
            (None, _) => TaskState::Unassigned,
            (Some(_), false) => TaskState::Assigned,
            (Some(_), true) => TaskState::Submitted,
        }
    }
}

impl Task {
    /// Current lifecycle state of this task
    pub fn state(&self) -> TaskState {
        TaskState::of(self.user_id, self.done)
    }
}

/// Assigns a task to a user (admin operation)
///
/// Works from any state: assigning an already-assigned task moves it to the
/// new user, and assigning a submitted task re-opens it (`done` is reset)
/// so the new assignee can submit. Returns the assignee so the caller can
/// name them in the response message.
pub async fn assign(pool: &PgPool, task_id: i64, user_id: i64) -> Result<User, WorkflowError> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(WorkflowError::TaskNotFound)?;

    let user = User::find_by_id(pool, user_id)
        .await?
        .ok_or(WorkflowError::UserNotFound)?;

    sqlx::query("UPDATE tasks SET user_id = $2, done = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(task.id)
        .bind(user.id)
        .execute(pool)
        .await?;

    tracing::info!(task_id, user_id, "task assigned");

    Ok(user)
}

/// Clears a task's assignee (admin operation)
///
/// Always resets `done` alongside the assignee, so a submitted task that is
/// unassigned returns to `Unassigned`, never to the unreachable
/// `done-without-assignee` combination.
pub async fn unassign(pool: &PgPool, task_id: i64) -> Result<(), WorkflowError> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(WorkflowError::TaskNotFound)?;

    sqlx::query("UPDATE tasks SET user_id = NULL, done = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(task.id)
        .execute(pool)
        .await?;

    tracing::info!(task_id, "task unassigned");

    Ok(())
}

/// Submits a task (assignee operation)
///
/// Only the currently assigned user may submit. A missing task and a task
/// assigned to someone else produce the same `NotAssignee` error so callers
/// cannot enumerate other users' tasks. Once submitted, further submissions
/// are rejected and `detail` is frozen on this path; changing it again
/// requires the admin update.
pub async fn submit(
    pool: &PgPool,
    task_id: i64,
    caller: i64,
    detail: Option<String>,
) -> Result<Task, WorkflowError> {
    let task = Task::find_by_id(pool, task_id).await?;

    let task = match task {
        Some(t) if t.user_id == Some(caller) => t,
        _ => return Err(WorkflowError::NotAssignee),
    };

    if task.state() == TaskState::Submitted {
        return Err(WorkflowError::AlreadySubmitted);
    }

    let task = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks
        SET done = TRUE, detail = COALESCE($2, detail), updated_at = NOW()
        WHERE id = $1
        RETURNING id, title, description, detail, done, project_id, user_id,
                  created_at, updated_at
        "#,
    )
    .bind(task.id)
    .bind(detail)
    .fetch_one(pool)
    .await?;

    tracing::info!(task_id, user_id = caller, "task submitted");

    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_derivation() {
        assert_eq!(TaskState::of(None, false), TaskState::Unassigned);
        assert_eq!(TaskState::of(Some(5), false), TaskState::Assigned);
        assert_eq!(TaskState::of(Some(5), true), TaskState::Submitted);

        // Only the admin escape hatch can produce this pair
        assert_eq!(TaskState::of(None, true), TaskState::Unassigned);
    }

    #[test]
    fn test_task_state_accessor() {
        let base = Task {
            id: 1,
            title: "task".to_string(),
            description: None,
            detail: None,
            done: false,
            project_id: 1,
            user_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(base.state(), TaskState::Unassigned);

        let assigned = Task {
            user_id: Some(9),
            ..base.clone()
        };
        assert_eq!(assigned.state(), TaskState::Assigned);

        let submitted = Task {
            done: true,
            ..assigned
        };
        assert_eq!(submitted.state(), TaskState::Submitted);
    }

    #[test]
    fn test_error_messages_match_api_contract() {
        // These strings are part of the HTTP surface; handlers embed them
        // verbatim in error bodies.
        assert_eq!(
            WorkflowError::TaskNotFound.to_string(),
            "This task doesn't exist"
        );
        assert_eq!(
            WorkflowError::UserNotFound.to_string(),
            "This user doesn't exist"
        );
        assert_eq!(
            WorkflowError::NotAssignee.to_string(),
            "You are not assigned to this task"
        );
        assert_eq!(
            WorkflowError::AlreadySubmitted.to_string(),
            "The task is already submitted"
        );
    }

    // Transition coverage against a live database is in
    // taskdesk-api/tests/workflow_test.rs.
}
