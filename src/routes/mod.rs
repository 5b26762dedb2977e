use axum::{Router, routing::get};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::CurrentSession,
    models::User,
    response::SeeOther,
    services::{auth_service, cart_service},
    session::{self, Flash, session_cookie},
    state::AppState,
};

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod medicines;
pub mod params;

// Build the application router without binding state; it will be provided at the top level.
pub fn create_app_router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::home))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/health", get(health::health_check))
        .nest("/auth", auth::router())
        .nest("/medicines", medicines::router())
        .nest("/cart", cart::router())
}

/// Store `flash` on the session and redirect to `to`. A new session cookie is
/// issued when the flash had to create the session.
pub(crate) async fn redirect_with_flash(
    state: &AppState,
    current: &CurrentSession,
    flash: Flash,
    to: impl Into<String>,
) -> AppResult<SeeOther> {
    let id = session::set_flash(&state.pool, current.id, &flash).await?;
    let redirect = SeeOther::to(to);
    if current.id == Some(id) {
        Ok(redirect)
    } else {
        Ok(redirect.with_cookie(session_cookie(id, state.config.session_cookie_secure)))
    }
}

/// Turn a service outcome into the flash shown on the next page.
pub(crate) fn outcome_flash<T>(result: &AppResult<T>, success: impl FnOnce(&T) -> String) -> Flash {
    match result {
        Ok(value) => Flash::success(success(value)),
        Err(err) => flash_for_error(err),
    }
}

pub(crate) fn flash_for_error(err: &AppError) -> Flash {
    if err.is_internal() {
        tracing::error!(error = ?err, "request failed");
    } else {
        tracing::debug!(error = %err, "request rejected");
    }
    Flash::error(err.user_message())
}

/// Pending flash for page views; consumed on read.
pub(crate) async fn take_flash(state: &AppState, current: &CurrentSession) -> AppResult<Option<Flash>> {
    match current.id {
        Some(id) => session::take_flash(&state.pool, id).await,
        None => Ok(None),
    }
}

/// The viewing user (if logged in) and their cart badge count.
pub(crate) async fn viewer(
    state: &AppState,
    current: &CurrentSession,
) -> AppResult<(Option<User>, i64)> {
    let Some(user_id) = current.user_id else {
        return Ok((None, 0));
    };
    let user = auth_service::find_by_id(state, user_id).await?;
    let count = cart_service::item_count(state, user_id).await?;
    Ok((user, count))
}
