//! Server-side session store.
//!
//! The `sid` cookie carries an opaque session id. The row behind it holds the
//! authenticated user id (if any) and a single pending flash message.

use axum::http::{HeaderMap, header::COOKIE};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

pub const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(FlashKind::Success),
            "error" => Some(FlashKind::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
}

pub async fn load(pool: &DbPool, id: Uuid) -> AppResult<Option<SessionRecord>> {
    let record = sqlx::query_as::<_, SessionRecord>("SELECT id, user_id FROM sessions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// Bind a fresh session to `user_id`, dropping the previous one so the id
/// issued before login is never reused.
pub async fn start(pool: &DbPool, previous: Option<Uuid>, user_id: Uuid) -> AppResult<Uuid> {
    let mut tx = pool.begin().await?;
    if let Some(previous) = previous {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(previous)
            .execute(&mut *tx)
            .await?;
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO sessions (id, user_id) VALUES ($1, $2)")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(id)
}

pub async fn destroy(pool: &DbPool, id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Store `flash` on the session, creating an anonymous session when there is
/// none (or the cookie points at a row that no longer exists). Returns the id
/// the flash was written to.
pub async fn set_flash(pool: &DbPool, id: Option<Uuid>, flash: &Flash) -> AppResult<Uuid> {
    if let Some(id) = id {
        let result = sqlx::query(
            "UPDATE sessions SET flash_kind = $2, flash_message = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(flash.kind.as_str())
        .bind(flash.message.as_str())
        .execute(pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(id);
        }
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO sessions (id, user_id, flash_kind, flash_message) VALUES ($1, NULL, $2, $3)",
    )
    .bind(id)
    .bind(flash.kind.as_str())
    .bind(flash.message.as_str())
    .execute(pool)
    .await?;
    Ok(id)
}

/// Read and clear the pending flash message.
pub async fn take_flash(pool: &DbPool, id: Uuid) -> AppResult<Option<Flash>> {
    let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
        r#"
        WITH old AS (
            SELECT id, flash_kind, flash_message FROM sessions WHERE id = $1 FOR UPDATE
        )
        UPDATE sessions s
        SET flash_kind = NULL, flash_message = NULL
        FROM old
        WHERE s.id = old.id
        RETURNING old.flash_kind, old.flash_message
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((Some(kind), Some(message))) => {
            FlashKind::parse(&kind).map(|kind| Flash { kind, message })
        }
        _ => None,
    })
}

pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
