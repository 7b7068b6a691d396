/// Project endpoints
///
/// Admins manage projects directly. Regular users have no project CRUD;
/// their project list is derived from task assignment, and asking for a
/// project outside that derived set is answered 403 whether or not the
/// project exists.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use taskdesk_shared::{
    auth::middleware::CurrentUser,
    models::project::{CreateProject, Project, UpdateProject},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FieldErrors},
};

use super::{require, MessageResponse};

/// Create/update request body; presence of `title` is checked per-handler
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// `POST /projects` (admin)
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut errors = FieldErrors::new();
    let title = require(&mut errors, "title", &req.title);

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let project = Project::create(
        &state.db,
        CreateProject {
            title: title.unwrap().to_string(),
            description: req.description,
        },
    )
    .await?;

    tracing::info!(project_id = project.id, "project created");

    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

/// `GET /projects` (admin)
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let projects = Project::list(&state.db).await?;
    Ok(Json(json!({ "projects": projects })))
}

/// `GET /projects/:id` (admin)
pub async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("This project doesn't exist".to_string()))?;

    Ok(Json(json!({ "project": project })))
}

/// `PUT /projects/:id` (admin)
///
/// Partial update: absent fields keep their current values.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            title: req.title,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("This project doesn't exist".to_string()))?;

    tracing::info!(project_id = project.id, "project updated");

    Ok(Json(MessageResponse::new(
        "The project has been updated successfully",
    )))
}

/// `DELETE /projects/:id` (admin)
///
/// The project's tasks are deleted with it through the cascade.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Project::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("This project doesn't exist".to_string()));
    }

    tracing::info!(project_id = id, "project deleted");

    Ok(Json(MessageResponse::new(
        "The project has been deleted successfully",
    )))
}

/// `GET /projects/users`
///
/// The caller's derived projects: every project containing at least one
/// task assigned to them.
pub async fn list_for_caller(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    let projects = Project::list_for_assignee(&state.db, user.id).await?;
    Ok(Json(json!({ "projects": projects })))
}

/// `GET /projects/:id/users`
///
/// One of the caller's derived projects. A project that exists but holds
/// none of the caller's tasks gets the same 403 as one that doesn't exist.
pub async fn get_for_caller(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let project = Project::find_for_assignee(&state.db, id, user.id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("This project doesn't belong to you".to_string()))?;

    Ok(Json(json!({ "project": project })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_request_all_fields_optional() {
        let req: ProjectRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.description.is_none());
    }

    #[test]
    fn test_project_request_parses_fields() {
        let req: ProjectRequest =
            serde_json::from_str(r#"{"title": "Website", "description": "Relaunch"}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("Website"));
        assert_eq!(req.description.as_deref(), Some("Relaunch"));
    }
}
