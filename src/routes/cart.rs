use axum::{
    Form, Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::cart::{CartPage, UpdateCartForm},
    error::AppResult,
    middleware::auth::{AuthUser, CurrentSession},
    response::{ApiResponse, SeeOther},
    routes::{outcome_flash, redirect_with_flash, take_flash},
    services::{auth_service, cart_service},
    state::AppState,
};

const CART_PATH: &str = "/cart";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/update/{medicine_id}", post(update_cart))
        .route("/remove/{medicine_id}", post(remove_from_cart))
        .route("/clear", post(clear_cart))
        .route("/count", get(cart_count))
        .route("/total", get(cart_total))
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart lines, total and stock warnings", body = ApiResponse<CartPage>),
        (status = 303, description = "Not logged in, redirect to login")
    ),
    security(("session_cookie" = [])),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartPage>>> {
    let items = cart_service::get_cart(&state, user.user_id).await?;
    let total_value = cart_service::total_value(&state, user.user_id).await?;
    let insufficient_stock_items = items
        .iter()
        .filter(|line| line.has_insufficient_stock())
        .cloned()
        .collect();
    let profile = auth_service::find_by_id(&state, user.user_id).await?;
    let flash = take_flash(&state, &user.session()).await?;

    let page = CartPage {
        item_count: items.len() as i64,
        items,
        total_value,
        insufficient_stock_items,
        user: profile,
        flash,
    };
    Ok(Json(ApiResponse::success("Cart", page, None)))
}

#[utoipa::path(
    post,
    path = "/cart/update/{medicine_id}",
    params(
        ("medicine_id" = Uuid, Path, description = "Medicine ID")
    ),
    request_body(content = UpdateCartForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the cart with a flash message")
    ),
    security(("session_cookie" = [])),
    tag = "Cart"
)]
pub async fn update_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(medicine_id): Path<Uuid>,
    Form(form): Form<UpdateCartForm>,
) -> AppResult<SeeOther> {
    let result = cart_service::update_quantity(&state, user.user_id, medicine_id, form.quantity).await;
    let flash = outcome_flash(&result, |_| "Cart updated successfully!".to_string());
    redirect_with_flash(&state, &user.session(), flash, CART_PATH).await
}

#[utoipa::path(
    post,
    path = "/cart/remove/{medicine_id}",
    params(
        ("medicine_id" = Uuid, Path, description = "Medicine ID")
    ),
    responses(
        (status = 303, description = "Redirect to the cart with a flash message")
    ),
    security(("session_cookie" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(medicine_id): Path<Uuid>,
) -> AppResult<SeeOther> {
    let result = cart_service::remove_from_cart(&state, user.user_id, medicine_id).await;
    let flash = outcome_flash(&result, |_| "Item removed from cart successfully!".to_string());
    redirect_with_flash(&state, &user.session(), flash, CART_PATH).await
}

#[utoipa::path(
    post,
    path = "/cart/clear",
    responses(
        (status = 303, description = "Redirect to the cart with a flash message")
    ),
    security(("session_cookie" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(State(state): State<AppState>, user: AuthUser) -> AppResult<SeeOther> {
    let result = cart_service::clear_cart(&state, user.user_id).await;
    let flash = outcome_flash(&result, |_| "Cart cleared successfully!".to_string());
    redirect_with_flash(&state, &user.session(), flash, CART_PATH).await
}

#[utoipa::path(
    get,
    path = "/cart/count",
    responses(
        (status = 200, description = "Distinct cart lines, 0 when not logged in", body = i64)
    ),
    tag = "Cart"
)]
pub async fn cart_count(
    State(state): State<AppState>,
    current: CurrentSession,
) -> AppResult<Json<i64>> {
    match current.user_id {
        Some(user_id) => Ok(Json(cart_service::item_count(&state, user_id).await?)),
        None => Ok(Json(0)),
    }
}

#[utoipa::path(
    get,
    path = "/cart/total",
    responses(
        (status = 200, description = "Cart value at current prices, 0 when not logged in", body = String)
    ),
    tag = "Cart"
)]
pub async fn cart_total(
    State(state): State<AppState>,
    current: CurrentSession,
) -> AppResult<Json<Decimal>> {
    match current.user_id {
        Some(user_id) => Ok(Json(cart_service::total_value(&state, user_id).await?)),
        None => Ok(Json(Decimal::ZERO)),
    }
}
