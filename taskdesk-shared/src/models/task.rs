/// Task model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     detail TEXT,
///     done BOOLEAN NOT NULL DEFAULT FALSE,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id BIGINT REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `user_id` is the assignee; `detail` is free text the assignee supplies
/// on submission. Assignment and submission must go through
/// [`crate::workflow`], which enforces the task lifecycle. The plain
/// [`Task::update`] below is the admin escape hatch: it writes whatever
/// fields it is given and performs no transition checks.
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// A task belonging to a project, optionally assigned to a user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,

    /// Required title
    pub title: String,

    /// Optional description written by the admin
    pub description: Option<String>,

    /// Optional free text supplied by the assignee at submission
    pub detail: Option<String>,

    /// Whether the task has been submitted
    pub done: bool,

    /// The project this task belongs to
    pub project_id: i64,

    /// The assignee, if any
    pub user_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: i64,

    /// Optional initial assignee
    pub user_id: Option<i64>,
}

/// Input for the admin update path; only present fields are written
///
/// This path intentionally does not re-validate the assignment lifecycle:
/// an admin can set `done` and `user_id` to any combination, including ones
/// the workflow would never produce.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub detail: Option<String>,
    pub done: Option<bool>,
    pub project_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl Task {
    /// Inserts a new task; `done` starts false
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, project_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, detail, done, project_id, user_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, detail, done, project_id, user_id,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks, unordered and unpaginated
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, detail, done, project_id, user_id,
                   created_at, updated_at
            FROM tasks
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Admin field update; returns the updated row, or None if absent
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.detail.is_some() {
            bind_count += 1;
            query.push_str(&format!(", detail = ${}", bind_count));
        }
        if data.done.is_some() {
            bind_count += 1;
            query.push_str(&format!(", done = ${}", bind_count));
        }
        if data.project_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", project_id = ${}", bind_count));
        }
        if data.user_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", user_id = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, detail, done, project_id, user_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(detail) = data.detail {
            q = q.bind(detail);
        }
        if let Some(done) = data.done {
            q = q.bind(done);
        }
        if let Some(project_id) = data.project_id {
            q = q.bind(project_id);
        }
        if let Some(user_id) = data.user_id {
            q = q.bind(user_id);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all tasks assigned to a user
    pub async fn list_by_assignee(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, detail, done, project_id, user_id,
                   created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists a user's tasks filtered by completion state
    pub async fn list_by_assignee_done(
        pool: &PgPool,
        user_id: i64,
        done: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, detail, done, project_id, user_id,
                   created_at, updated_at
            FROM tasks
            WHERE user_id = $1 AND done = $2
            "#,
        )
        .bind(user_id)
        .bind(done)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_task_default_is_empty() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.done.is_none());
        assert!(update.user_id.is_none());
    }

    #[test]
    fn test_task_serializes_all_fields() {
        let task = Task {
            id: 3,
            title: "task 33".to_string(),
            description: Some("description".to_string()),
            detail: None,
            done: false,
            project_id: 1,
            user_id: Some(11),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["done"], false);
        assert_eq!(json["user_id"], 11);
        assert_eq!(json["detail"], serde_json::Value::Null);
    }
}
