use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::auth::{ProfileUpdate, RegisterForm},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    models::User,
    state::AppState,
};

pub async fn register(state: &AppState, form: RegisterForm) -> AppResult<User> {
    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();

    let txn = state.orm.begin().await?;

    if username_taken(&txn, &username).await? {
        return Err(AppError::bad_request(username_exists_message(&username)));
    }
    if email_taken(&txn, &email).await? {
        return Err(AppError::bad_request(email_exists_message(&email)));
    }

    let password_hash = hash_password(&form.password)?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.clone()),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        full_name: Set(form.full_name.trim().to_string()),
        phone_number: Set(blank_to_none(form.phone_number)),
        address: Set(blank_to_none(form.address)),
        city: Set(blank_to_none(form.city)),
        state: Set(blank_to_none(form.state)),
        zip_code: Set(blank_to_none(form.zip_code)),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| duplicate_user(err, &username, &email))?;

    txn.commit().await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    audit::record(
        &state.pool,
        Some(user.id),
        AuditAction::UserRegister,
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(user.into())
}

/// Check credentials. Username is tried first, then email, among active users.
pub async fn authenticate(
    state: &AppState,
    username_or_email: &str,
    password: &str,
) -> AppResult<User> {
    let ident = username_or_email.trim();
    let user = match find_active_by_username_or_email(&state.orm, ident).await? {
        Some(u) => u,
        None => return Err(AppError::bad_request(format!("User not found: {ident}"))),
    };

    if !user.is_active {
        return Err(AppError::bad_request("Account is deactivated"));
    }

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::bad_request("Invalid password"));
    }

    audit::record(
        &state.pool,
        Some(user.id),
        AuditAction::UserLogin,
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(user.into())
}

pub async fn find_by_username_or_email(
    state: &AppState,
    username_or_email: &str,
) -> AppResult<Option<User>> {
    let user = find_active_by_username_or_email(&state.orm, username_or_email.trim()).await?;
    Ok(user.map(User::from))
}

pub async fn find_by_id(state: &AppState, id: Uuid) -> AppResult<Option<User>> {
    let user = Users::find_by_id(id).one(&state.orm).await?;
    Ok(user.map(User::from))
}

pub async fn username_exists(state: &AppState, username: &str) -> AppResult<bool> {
    username_taken(&state.orm, username.trim()).await
}

pub async fn email_exists(state: &AppState, email: &str) -> AppResult<bool> {
    email_taken(&state.orm, email.trim()).await
}

pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    payload: ProfileUpdate,
) -> AppResult<User> {
    let txn = state.orm.begin().await?;
    let existing = match Users::find_by_id(user_id).one(&txn).await? {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let mut active: UserActive = existing.into();
    if let Some(full_name) = payload.full_name.filter(|n| !n.trim().is_empty()) {
        active.full_name = Set(full_name.trim().to_string());
    }
    if payload.phone_number.is_some() {
        active.phone_number = Set(blank_to_none(payload.phone_number));
    }
    if payload.address.is_some() {
        active.address = Set(blank_to_none(payload.address));
    }
    if payload.city.is_some() {
        active.city = Set(blank_to_none(payload.city));
    }
    if payload.state.is_some() {
        active.state = Set(blank_to_none(payload.state));
    }
    if payload.zip_code.is_some() {
        active.zip_code = Set(blank_to_none(payload.zip_code));
    }
    active.updated_at = Set(Utc::now().into());

    let user = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.id),
        AuditAction::UserUpdate,
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(user.into())
}

/// Soft-delete an account. Unknown ids are ignored.
pub async fn deactivate_user(state: &AppState, user_id: Uuid) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let Some(existing) = Users::find_by_id(user_id).one(&txn).await? else {
        return Ok(());
    };

    let mut active: UserActive = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user_id, "user deactivated");
    audit::record(
        &state.pool,
        Some(user_id),
        AuditAction::UserDeactivate,
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

async fn find_active_by_username_or_email<C: ConnectionTrait>(
    conn: &C,
    ident: &str,
) -> AppResult<Option<UserModel>> {
    let by_username = Users::find()
        .filter(UserCol::Username.eq(ident))
        .filter(UserCol::IsActive.eq(true))
        .one(conn)
        .await?;
    if by_username.is_some() {
        return Ok(by_username);
    }

    let by_email = Users::find()
        .filter(UserCol::Email.eq(ident))
        .filter(UserCol::IsActive.eq(true))
        .one(conn)
        .await?;
    Ok(by_email)
}

async fn username_taken<C: ConnectionTrait>(conn: &C, username: &str) -> AppResult<bool> {
    let count = Users::find()
        .filter(UserCol::Username.eq(username))
        .count(conn)
        .await?;
    Ok(count > 0)
}

async fn email_taken<C: ConnectionTrait>(conn: &C, email: &str) -> AppResult<bool> {
    let count = Users::find()
        .filter(UserCol::Email.eq(email))
        .count(conn)
        .await?;
    Ok(count > 0)
}

fn username_exists_message(username: &str) -> String {
    format!("Username already exists: {username}")
}

fn email_exists_message(email: &str) -> String {
    format!("Email already exists: {email}")
}

// A concurrent registration can slip past the existence checks and trip the
// unique index instead.
fn duplicate_user(err: DbErr, username: &str, email: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            AppError::bad_request(duplicate_message(&detail, username, email))
        }
        _ => err.into(),
    }
}

fn duplicate_message(detail: &str, username: &str, email: &str) -> String {
    if detail.contains("email") {
        email_exists_message(email)
    } else {
        username_exists_message(username)
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
