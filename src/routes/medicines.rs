use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::medicines::{AddToCartForm, CatalogPage, MedicineDetailPage, QuickAddForm},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, CurrentSession},
    response::{ApiResponse, SeeOther},
    routes::{outcome_flash, params::CatalogQuery, redirect_with_flash, take_flash, viewer},
    services::{cart_service, medicine_service},
    state::AppState,
};

const CATALOG_PATH: &str = "/medicines";
const ADDED_TO_CART: &str = "Medicine added to cart successfully!";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog))
        .route("/{id}", get(medicine_detail))
        .route("/{id}/add-to-cart", post(add_to_cart))
        .route("/quick-add/{id}", post(quick_add))
}

#[utoipa::path(
    get,
    path = "/medicines",
    params(
        ("search" = Option<String>, Query, description = "Substring of name, generic name or manufacturer"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("min_price" = Option<String>, Query, description = "Lower price bound, default 0"),
        ("max_price" = Option<String>, Query, description = "Upper price bound, default 999999"),
        ("prescription" = Option<String>, Query, description = "prescription | non-prescription"),
        ("sort_by" = Option<String>, Query, description = "name, generic_name, manufacturer, category, price, stock_quantity, created_at"),
        ("sort_order" = Option<String>, Query, description = "asc (default) or desc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 12")
    ),
    responses(
        (status = 200, description = "One catalog page with filter options", body = ApiResponse<CatalogPage>)
    ),
    tag = "Medicines"
)]
pub async fn catalog(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<CatalogPage>>> {
    let catalog = medicine_service::list_catalog(&state, &query).await?;
    let (user, cart_item_count) = viewer(&state, &current).await?;
    let flash = take_flash(&state, &current).await?;

    let meta = catalog.medicines.meta();
    let page = CatalogPage {
        medicines: catalog.medicines.items,
        categories: catalog.categories,
        manufacturers: catalog.manufacturers,
        cart_item_count,
        user,
        current_search: query.search,
        current_category: query.category,
        current_min_price: query.min_price,
        current_max_price: query.max_price,
        current_prescription: query.prescription,
        current_sort_by: query.sort_by,
        current_sort_order: query.sort_order,
        flash,
    };
    Ok(Json(ApiResponse::success("Medicines", page, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/medicines/{id}",
    params(
        ("id" = Uuid, Path, description = "Medicine ID")
    ),
    responses(
        (status = 200, description = "Medicine details", body = ApiResponse<MedicineDetailPage>),
        (status = 303, description = "Unknown or inactive medicine, redirect to catalog")
    ),
    tag = "Medicines"
)]
pub async fn medicine_detail(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Redirect::to(CATALOG_PATH).into_response());
    };
    let medicine = match medicine_service::get_active_medicine(&state, id).await {
        Ok(m) => m,
        Err(AppError::NotFound) => return Ok(Redirect::to(CATALOG_PATH).into_response()),
        Err(err) => return Err(err),
    };

    let (user, cart_item_count) = viewer(&state, &current).await?;
    let flash = take_flash(&state, &current).await?;

    let page = MedicineDetailPage {
        medicine,
        cart_item_count,
        user,
        flash,
    };
    Ok(Json(ApiResponse::success("Medicine", page, None)).into_response())
}

#[utoipa::path(
    post,
    path = "/medicines/{id}/add-to-cart",
    params(
        ("id" = Uuid, Path, description = "Medicine ID")
    ),
    request_body(content = AddToCartForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the medicine page with a flash message")
    ),
    security(("session_cookie" = [])),
    tag = "Medicines"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<AddToCartForm>,
) -> AppResult<SeeOther> {
    let result = cart_service::add_to_cart(&state, user.user_id, id, form.quantity).await;
    let flash = outcome_flash(&result, |_| ADDED_TO_CART.to_string());
    redirect_with_flash(&state, &user.session(), flash, format!("{CATALOG_PATH}/{id}")).await
}

#[utoipa::path(
    post,
    path = "/medicines/quick-add/{id}",
    params(
        ("id" = Uuid, Path, description = "Medicine ID")
    ),
    request_body(content = QuickAddForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to return_url with a flash message")
    ),
    security(("session_cookie" = [])),
    tag = "Medicines"
)]
pub async fn quick_add(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<QuickAddForm>,
) -> AppResult<SeeOther> {
    let result = cart_service::add_to_cart(&state, user.user_id, id, form.quantity).await;
    let flash = outcome_flash(&result, |_| ADDED_TO_CART.to_string());
    redirect_with_flash(&state, &user.session(), flash, form.redirect_target()).await
}
