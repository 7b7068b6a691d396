/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Projects have no owner column. A regular user "has" a project when at
/// least one task in it is assigned to them; those derived views are
/// computed with a join, never stored. Deleting a project cascades to its
/// tasks via the foreign key in the tasks migration.
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// A project grouping zero or more tasks
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,

    /// Required title
    pub title: String,

    /// Optional free-text description
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
}

/// Input for updating a project; only present fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Project {
    /// Inserts a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description)
            VALUES ($1, $2)
            RETURNING id, title, description, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects, unordered and unpaginated
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, title, description, created_at, updated_at FROM projects",
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project; returns the updated row, or None if it is absent
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, title, description, created_at, updated_at");

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project; its tasks go with it through the cascade
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the distinct projects containing at least one task assigned to
    /// the given user
    pub async fn list_for_assignee(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT DISTINCT p.id, p.title, p.description, p.created_at, p.updated_at
            FROM projects p
            JOIN tasks t ON t.project_id = p.id
            WHERE t.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Finds one of the caller's derived projects by id
    ///
    /// Returns None both when the project does not exist and when none of
    /// its tasks are assigned to the user; the HTTP layer answers 403 either
    /// way.
    pub async fn find_for_assignee(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT DISTINCT p.id, p.title, p.description, p.created_at, p.updated_at
            FROM projects p
            JOIN tasks t ON t.project_id = p.id
            WHERE p.id = $1 AND t.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_project_default_is_empty() {
        let update = UpdateProject::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
    }

    // Database-backed coverage lives in taskdesk-api/tests.
}
