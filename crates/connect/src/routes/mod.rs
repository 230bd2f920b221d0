//! HTTP route handlers for the connect service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (database)
//!
//! # Auth (JSON)
//! POST /auth/signup                   - Create a credentialed account
//! POST /auth/signin                   - Sign in, establishes the session
//! POST /auth/signout                  - Sign out, clears the session
//! GET  /auth/github                   - GitHub App installation callback
//!
//! # Integrations
//! GET  /integrations/github/install   - Redirect to the GitHub App install page
//! GET  /integrations/slack/install    - Redirect to Slack's consent screen
//! GET  /integrations/slack/callback   - Slack OAuth callback (redirect-only)
//!
//! # Tokens (JSON)
//! GET  /user/tokens                   - Connection status projection
//! POST /user/tokens                   - Partial upsert of Notion credentials
//! ```

pub mod auth;
pub mod github;
pub mod slack;
pub mod tokens;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .route("/signout", post(auth::signout))
        // GitHub App installation redirect lands here
        .route("/github", get(github::link))
}

/// Create the integrations routes router.
pub fn integration_routes() -> Router<AppState> {
    Router::new()
        .route("/github/install", get(github::install))
        .route("/slack/install", get(slack::install))
        .route("/slack/callback", get(slack::callback))
}

/// Create the token routes router.
pub fn token_routes() -> Router<AppState> {
    Router::new().route("/tokens", get(tokens::read).post(tokens::write))
}

/// Create all routes for the connect service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/integrations", integration_routes())
        .nest("/user", token_routes())
}
