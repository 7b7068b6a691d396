/// Application state and router builder
///
/// # Route tree
///
/// ```text
/// /
/// ├── /health                          # public
/// ├── /auth
/// │   ├── POST   /login                # guest-only
/// │   ├── POST   /register             # guest-only
/// │   └── DELETE /logout               # authenticated
/// ├── /projects
/// │   ├── GET /users                   # authenticated (caller's projects)
/// │   ├── GET /:id/users               # authenticated (caller's project)
/// │   └── CRUD                         # admin-only
/// └── /tasks
///     ├── POST /:id/submit             # authenticated (assignee)
///     ├── GET  /users, /submitted/users, /pending/users, /:id/users
///     └── CRUD + assign_employee/no_employee   # admin-only
/// ```
///
/// # Guards
///
/// Three middleware layers implement the access control model:
///
/// - `auth_guard` resolves identity once per request (token → user row) and
///   injects [`CurrentUser`]; failures are a uniform 401.
/// - `admin_guard` runs inside `auth_guard` and answers 403 for non-admins.
/// - `guest_guard` rejects callers that present a valid token on
///   login/register, so a logged-in client must discard its token first.
use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Extension, Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskdesk_shared::auth::middleware::{authenticate, holds_valid_token, CurrentUser};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned per request via the `State` extractor
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Signing key for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Configured token lifetime
    pub fn token_ttl(&self) -> Duration {
        Duration::hours(self.config.jwt.ttl_hours)
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Guest-only: a valid token here is a 403, not a convenience
    let guest_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/register", post(routes::auth::register))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            guest_guard,
        ));

    let logout_routes = Router::new()
        .route("/logout", delete(routes::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_guard,
        ));

    let auth_routes = Router::new().merge(guest_routes).merge(logout_routes);

    // User-scoped project views: any authenticated caller, results limited
    // to their own derived projects inside the query
    let project_user_routes = Router::new()
        .route("/users", get(routes::projects::list_for_caller))
        .route("/:id/users", get(routes::projects::get_for_caller))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_guard,
        ));

    let project_admin_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create).get(routes::projects::list),
        )
        .route(
            "/:id",
            get(routes::projects::get_one)
                .put(routes::projects::update)
                .delete(routes::projects::delete),
        )
        // admin_guard reads the extension auth_guard inserts, so auth_guard
        // must be the outer layer
        .layer(axum::middleware::from_fn(admin_guard))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_guard,
        ));

    let task_user_routes = Router::new()
        .route("/:id/submit", post(routes::tasks::submit))
        .route("/users", get(routes::tasks::list_for_caller))
        .route("/submitted/users", get(routes::tasks::list_submitted))
        .route("/pending/users", get(routes::tasks::list_pending))
        .route("/:id/users", get(routes::tasks::get_for_caller))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_guard,
        ));

    let task_admin_routes = Router::new()
        .route("/", post(routes::tasks::create).get(routes::tasks::list))
        .route(
            "/:id",
            get(routes::tasks::get_one)
                .put(routes::tasks::update)
                .delete(routes::tasks::delete),
        )
        .route(
            "/:id/assign_employee/:user_id",
            get(routes::tasks::assign_employee),
        )
        .route("/:id/no_employee", get(routes::tasks::no_employee))
        .layer(axum::middleware::from_fn(admin_guard))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest(
            "/projects",
            Router::new()
                .merge(project_user_routes)
                .merge(project_admin_routes),
        )
        .nest(
            "/tasks",
            Router::new()
                .merge(task_user_routes)
                .merge(task_admin_routes),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Authentication middleware
///
/// Resolves the caller's identity once and threads it through the request
/// extensions; handlers and inner guards never look identity up again.
async fn auth_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.db, state.jwt_secret(), req.headers()).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Admin role middleware; requires `auth_guard` to have run first
async fn admin_guard(
    Extension(user): Extension<CurrentUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.is_admin {
        return Err(ApiError::Forbidden("forbidden".to_string()));
    }

    Ok(next.run(req).await)
}

/// Guest-only middleware for login/register
///
/// A caller holding a valid token is already authenticated and must log out
/// (discard the token) before re-authenticating. Invalid or absent tokens
/// fall through to the handler.
async fn guest_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if holds_valid_token(state.jwt_secret(), req.headers()) {
        return Err(ApiError::Forbidden("forbidden".to_string()));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, JwtConfig};

    // Conflicting route registrations panic when the router is built, so
    // constructing it is itself a test. connect_lazy never touches the
    // database.
    #[tokio::test]
    async fn test_router_builds() {
        let pool = PgPool::connect_lazy("postgresql://localhost/test").unwrap();
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                ttl_hours: 24,
            },
        };

        let state = AppState::new(pool, config);
        assert_eq!(state.token_ttl(), Duration::hours(24));

        let _router = build_router(state);
    }
}
