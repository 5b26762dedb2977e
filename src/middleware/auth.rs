use axum::extract::FromRequestParts;
use uuid::Uuid;

use crate::{
    error::AppError,
    session::{self, session_id_from_headers},
    state::AppState,
};

/// Session attached to the request, possibly anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// A request made from a logged-in session. Rejects with a redirect to the
/// login page.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

impl AuthUser {
    pub fn session(&self) -> CurrentSession {
        CurrentSession {
            id: Some(self.session_id),
            user_id: Some(self.user_id),
        }
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(id) = session_id_from_headers(&parts.headers) else {
            return Ok(CurrentSession::default());
        };

        match session::load(&state.pool, id).await? {
            Some(record) => Ok(CurrentSession {
                id: Some(record.id),
                user_id: record.user_id,
            }),
            None => {
                tracing::debug!(session_id = %id, "unknown session cookie");
                Ok(CurrentSession::default())
            }
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentSession::from_request_parts(parts, state).await?;
        match (current.id, current.user_id) {
            (Some(session_id), Some(user_id)) => Ok(AuthUser {
                user_id,
                session_id,
            }),
            _ => Err(AppError::Unauthorized),
        }
    }
}
