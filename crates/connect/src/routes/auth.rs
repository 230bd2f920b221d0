//! Account routes: signup, signin, signout.
//!
//! All three are JSON endpoints; the session cookie established by signin is
//! what the rest of the service authenticates against.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::db::PgUserStore;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Signin request body.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Create a credentialed account.
///
/// Returns 201 with the new user id; duplicate emails and weak passwords are
/// client errors.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let auth = AuthService::new(PgUserStore::new(state.pool().clone()));
    let user = auth
        .register(&request.email, &request.password, request.name.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account created",
            "userId": user.id,
        })),
    ))
}

/// Sign in with email and password, establishing the session.
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SigninRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(PgUserStore::new(state.pool().clone()));
    let user = auth.login(&request.email, &request.password).await?;

    let current_user = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };

    set_current_user(&session, &current_user)
        .await
        .map_err(|e| AppError::Internal(format!("failed to persist session: {e}")))?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(json!({"success": true})))
}

/// Sign out, clearing the session.
pub async fn signout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;

    clear_sentry_user();

    Ok(Json(json!({"success": true})))
}
