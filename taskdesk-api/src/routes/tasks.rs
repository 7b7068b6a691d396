/// Task endpoints
///
/// Admins own the task CRUD plus the assignment operations; regular users
/// see only tasks assigned to them and advance them through `submit`.
/// Assignment and submission go through [`taskdesk_shared::workflow`]; the
/// admin `update` below is the one path that writes fields without
/// lifecycle checks.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use taskdesk_shared::{
    auth::middleware::CurrentUser,
    models::{
        project::Project,
        task::{CreateTask, Task, UpdateTask},
        user::User,
    },
    workflow,
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FieldErrors},
};

use super::{require, MessageResponse};

/// Create request body; `title` and `project_id` are required
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Admin update request body; every field optional, no lifecycle checks
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub detail: Option<String>,
    pub done: Option<bool>,
    pub project_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Submit request body; the whole body is optional
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    pub detail: Option<String>,
}

/// Verifies the referenced project and user exist, recording Laravel-style
/// "selected ... is invalid" errors for dangling references
async fn check_references(
    state: &AppState,
    errors: &mut FieldErrors,
    project_id: Option<i64>,
    user_id: Option<i64>,
) -> Result<(), ApiError> {
    if let Some(project_id) = project_id {
        if Project::find_by_id(&state.db, project_id).await?.is_none() {
            errors.insert(
                "project_id".to_string(),
                vec!["The selected project id is invalid.".to_string()],
            );
        }
    }

    if let Some(user_id) = user_id {
        if User::find_by_id(&state.db, user_id).await?.is_none() {
            errors.insert(
                "user_id".to_string(),
                vec!["The selected user id is invalid.".to_string()],
            );
        }
    }

    Ok(())
}

/// `POST /tasks` (admin)
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut errors = FieldErrors::new();
    let title = require(&mut errors, "title", &req.title);

    if req.project_id.is_none() {
        errors.insert(
            "project_id".to_string(),
            vec!["The project id field is required.".to_string()],
        );
    }

    check_references(&state, &mut errors, req.project_id, req.user_id).await?;

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            title: title.unwrap().to_string(),
            description: req.description,
            project_id: req.project_id.unwrap(),
            user_id: req.user_id,
        },
    )
    .await?;

    tracing::info!(task_id = task.id, project_id = task.project_id, "task created");

    Ok((StatusCode::CREATED, Json(json!({ "task": task }))))
}

/// `GET /tasks` (admin)
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let tasks = Task::list(&state.db).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

/// `GET /tasks/:id` (admin)
pub async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("This task doesn't exist".to_string()))?;

    Ok(Json(json!({ "task": task })))
}

/// `PUT /tasks/:id` (admin)
///
/// Writes whatever fields are present, including `done` and `user_id`
/// combinations the workflow would never produce. Dangling references are
/// still rejected.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let mut errors = FieldErrors::new();
    check_references(&state, &mut errors, req.project_id, req.user_id).await?;

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            detail: req.detail,
            done: req.done,
            project_id: req.project_id,
            user_id: req.user_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("This task doesn't exist".to_string()))?;

    tracing::info!(task_id = task.id, "task updated");

    Ok(Json(MessageResponse::new(
        "The task has been updated successfully",
    )))
}

/// `DELETE /tasks/:id` (admin)
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("This task doesn't exist".to_string()));
    }

    tracing::info!(task_id = id, "task deleted");

    Ok(Json(MessageResponse::new(
        "The task has been deleted successfully",
    )))
}

/// `GET /tasks/:id/assign_employee/:user_id` (admin)
///
/// Assigns the task to the user; a submitted task is re-opened for the new
/// assignee.
pub async fn assign_employee(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let assignee = workflow::assign(&state.db, id, user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "The task has been assigned to {} successfully",
            assignee.name
        ))),
    ))
}

/// `GET /tasks/:id/no_employee` (admin)
///
/// Clears the assignee and resets `done`.
pub async fn no_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    workflow::unassign(&state.db, id).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "There is no user assigned to this task now",
        )),
    ))
}

/// `POST /tasks/:id/submit`
///
/// Assignee-only. The body is optional; when present its `detail` is stored
/// with the submission.
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    body: Option<Json<SubmitRequest>>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let detail = body.and_then(|Json(req)| req.detail);

    workflow::submit(&state.db, id, user.id, detail).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "The task has been submitted successfully",
        )),
    ))
}

/// `GET /tasks/users` — all of the caller's tasks
pub async fn list_for_caller(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let tasks = Task::list_by_assignee(&state.db, user.id).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

/// `GET /tasks/submitted/users` — the caller's submitted tasks
pub async fn list_submitted(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let tasks = Task::list_by_assignee_done(&state.db, user.id, true).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

/// `GET /tasks/pending/users` — the caller's still-open tasks
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let tasks = Task::list_by_assignee_done(&state.db, user.id, false).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

/// `GET /tasks/:id/users` — one of the caller's tasks
///
/// A task assigned to someone else and a missing task both answer 403.
pub async fn get_for_caller(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let task = Task::find_by_id(&state.db, id).await?;

    match task {
        Some(t) if t.user_id == Some(user.id) => Ok(Json(json!({ "task": t }))),
        _ => Err(ApiError::Forbidden(
            "This task doesn't belong to you".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_all_fields_optional() {
        let req: CreateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.project_id.is_none());
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_create_request_parses_ids_as_numbers() {
        let req: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "task 33", "project_id": 1, "user_id": 11}"#)
                .unwrap();
        assert_eq!(req.project_id, Some(1));
        assert_eq!(req.user_id, Some(11));
    }

    #[test]
    fn test_submit_request_empty_body() {
        let req: SubmitRequest = serde_json::from_str("{}").unwrap();
        assert!(req.detail.is_none());
    }

    #[test]
    fn test_update_request_parses_done_flag() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert_eq!(req.done, Some(true));
        assert!(req.user_id.is_none());
    }
}
