use axum::{
    Form, Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    audit::{self, AuditAction},
    dto::auth::{AuthPage, LoginForm, ProfilePage, RegisterForm},
    error::{AppError, AppResult, LOGIN_PATH},
    middleware::auth::{AuthUser, CurrentSession},
    response::{ApiResponse, SeeOther},
    routes::{flash_for_error, outcome_flash, redirect_with_flash, take_flash},
    services::auth_service,
    session::{self, Flash, session_cookie},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/profile", get(profile))
}

#[utoipa::path(
    get,
    path = "/auth/register",
    responses(
        (status = 200, description = "Registration page", body = ApiResponse<AuthPage>)
    ),
    tag = "Auth"
)]
pub async fn register_page(
    State(state): State<AppState>,
    current: CurrentSession,
) -> AppResult<Json<ApiResponse<AuthPage>>> {
    let flash = take_flash(&state, &current).await?;
    Ok(Json(ApiResponse::success("Register", AuthPage { flash }, None)))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered, redirect to login; or rejected, redirect back"),
        (status = 422, description = "Form validation failed")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(form): Form<RegisterForm>,
) -> AppResult<SeeOther> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let result = auth_service::register(&state, form).await;
    let target = if result.is_ok() {
        LOGIN_PATH
    } else {
        "/auth/register"
    };
    let flash = outcome_flash(&result, |user| {
        format!("Registration successful! Welcome {}!", user.full_name)
    });
    redirect_with_flash(&state, &current, flash, target).await
}

#[utoipa::path(
    get,
    path = "/auth/login",
    responses(
        (status = 200, description = "Login page", body = ApiResponse<AuthPage>)
    ),
    tag = "Auth"
)]
pub async fn login_page(
    State(state): State<AppState>,
    current: CurrentSession,
) -> AppResult<Json<ApiResponse<AuthPage>>> {
    let flash = take_flash(&state, &current).await?;
    Ok(Json(ApiResponse::success("Login", AuthPage { flash }, None)))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirect to dashboard; or rejected, redirect back"),
        (status = 422, description = "Form validation failed")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(form): Form<LoginForm>,
) -> AppResult<SeeOther> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let user = match auth_service::authenticate(&state, &form.username_or_email, &form.password).await {
        Ok(user) => user,
        Err(err) => {
            return redirect_with_flash(&state, &current, flash_for_error(&err), LOGIN_PATH).await;
        }
    };

    let session_id = session::start(&state.pool, current.id, user.id).await?;
    tracing::info!(user_id = %user.id, "user logged in");

    let signed_in = CurrentSession {
        id: Some(session_id),
        user_id: Some(user.id),
    };
    let flash = Flash::success(format!("Welcome back, {}!", user.full_name));
    let redirect = redirect_with_flash(&state, &signed_in, flash, "/dashboard").await?;
    Ok(redirect.with_cookie(session_cookie(
        session_id,
        state.config.session_cookie_secure,
    )))
}

#[utoipa::path(
    get,
    path = "/auth/logout",
    responses(
        (status = 303, description = "Session ended, redirect to login")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<SeeOther> {
    session::destroy(&state.pool, user.session_id).await?;
    audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::UserLogout,
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    redirect_with_flash(
        &state,
        &CurrentSession::default(),
        Flash::success("You have been logged out successfully."),
        LOGIN_PATH,
    )
    .await
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Profile of the logged-in user", body = ApiResponse<ProfilePage>),
        (status = 303, description = "Not logged in, redirect to login")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfilePage>>> {
    let profile = match auth_service::find_by_id(&state, user.user_id).await? {
        Some(u) => u,
        None => return Err(AppError::Unauthorized),
    };
    let flash = take_flash(&state, &user.session()).await?;
    Ok(Json(ApiResponse::success(
        "Profile",
        ProfilePage {
            user: profile,
            flash,
        },
        None,
    )))
}
