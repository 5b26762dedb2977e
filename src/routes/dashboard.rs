use axum::{Json, extract::State, response::Redirect};

use crate::{
    dto::auth::DashboardPage,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::take_flash,
    services::{auth_service, cart_service},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 303, description = "Redirect to the dashboard")
    ),
    tag = "Dashboard"
)]
pub async fn home() -> Redirect {
    Redirect::to("/dashboard")
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard for the logged-in user", body = ApiResponse<DashboardPage>),
        (status = 303, description = "Not logged in, redirect to login")
    ),
    security(("session_cookie" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardPage>>> {
    let Some(profile) = auth_service::find_by_id(&state, user.user_id).await? else {
        return Err(AppError::Unauthorized);
    };
    let cart_item_count = cart_service::item_count(&state, user.user_id).await?;
    let flash = take_flash(&state, &user.session()).await?;

    Ok(Json(ApiResponse::success(
        "Dashboard",
        DashboardPage {
            user: profile,
            cart_item_count,
            flash,
        },
        None,
    )))
}
