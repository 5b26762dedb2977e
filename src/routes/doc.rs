use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthPage, DashboardPage, LoginForm, ProfilePage, RegisterForm},
        cart::{CartLine, CartPage, UpdateCartForm},
        medicines::{AddToCartForm, CatalogPage, MedicineDetailPage, QuickAddForm},
    },
    error::FieldError,
    models::{CartItem, Medicine, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, dashboard, health, medicines, params},
    session::{Flash, FlashKind, SESSION_COOKIE},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        dashboard::home,
        dashboard::dashboard,
        auth::register_page,
        auth::register,
        auth::login_page,
        auth::login,
        auth::logout,
        auth::profile,
        medicines::catalog,
        medicines::medicine_detail,
        medicines::add_to_cart,
        medicines::quick_add,
        cart::view_cart,
        cart::update_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::cart_count,
        cart::cart_total
    ),
    components(
        schemas(
            User,
            Medicine,
            CartItem,
            CartLine,
            Flash,
            FlashKind,
            FieldError,
            RegisterForm,
            LoginForm,
            AddToCartForm,
            QuickAddForm,
            UpdateCartForm,
            AuthPage,
            ProfilePage,
            DashboardPage,
            CatalogPage,
            MedicineDetailPage,
            CartPage,
            params::CatalogQuery,
            params::MedicineSortBy,
            params::SortOrder,
            params::PrescriptionFilter,
            Meta,
            ApiResponse<CatalogPage>,
            ApiResponse<MedicineDetailPage>,
            ApiResponse<CartPage>,
            ApiResponse<DashboardPage>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Dashboard", description = "Landing and dashboard pages"),
        (name = "Auth", description = "Registration, login and session endpoints"),
        (name = "Medicines", description = "Medicine catalog endpoints"),
        (name = "Cart", description = "Shopping cart endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
