#![allow(dead_code)]

use axum_pharmacy::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{auth::RegisterForm, medicines::NewMedicine},
    models::{Medicine, User},
    services::{auth_service, medicine_service},
    state::AppState,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Connected state with migrations applied, or `None` when no database is
/// configured in the environment.
pub async fn test_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            return Ok(None);
        }
    };

    let config = AppConfig::for_database(&database_url);
    let pool = create_pool(&database_url, config.max_connections).await?;
    let state = AppState::new(pool, config);
    run_migrations(&state.orm).await?;
    Ok(Some(state))
}

/// Short unique token so reruns against the same database never collide.
pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..10])
}

pub fn register_form(username: &str, password: &str) -> RegisterForm {
    RegisterForm {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: password.to_string(),
        confirm_password: password.to_string(),
        full_name: format!("Test {username}"),
        ..Default::default()
    }
}

pub async fn create_user(state: &AppState) -> anyhow::Result<User> {
    let username = unique("user");
    Ok(auth_service::register(state, register_form(&username, "secret123")).await?)
}

pub fn new_medicine(name: &str, category: &str, price: Decimal, stock: i32) -> NewMedicine {
    NewMedicine {
        name: name.to_string(),
        generic_name: format!("{name} generic"),
        manufacturer: "Test Labs".to_string(),
        category: category.to_string(),
        description: None,
        price,
        stock_quantity: stock,
        dosage_form: Some("Tablet".to_string()),
        strength: None,
        requires_prescription: false,
        image_url: None,
    }
}

pub async fn create_medicine(
    state: &AppState,
    category: &str,
    price: Decimal,
    stock: i32,
) -> anyhow::Result<Medicine> {
    let name = unique("Med ");
    Ok(medicine_service::create_medicine(state, new_medicine(&name, category, price, stock)).await?)
}
