use axum_pharmacy::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::auth::RegisterForm,
    seed,
    services::auth_service,
    state::AppState,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    let state = AppState::new(pool, config);
    // Ensure migrations are applied.
    run_migrations(&state.orm).await?;

    let user_id = ensure_user(&state, "demo", "demo@example.com", "demo1234").await?;
    let seeded = seed::seed_catalog_if_empty(&state).await?;

    println!("Seed completed. Demo user ID: {user_id}, medicines inserted: {seeded}");
    Ok(())
}

async fn ensure_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = auth_service::find_by_username_or_email(state, username).await? {
        println!("User {username} already exists");
        return Ok(existing.id);
    }

    let user = auth_service::register(
        state,
        RegisterForm {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: password.to_string(),
            full_name: "Demo Customer".to_string(),
            ..Default::default()
        },
    )
    .await?;

    println!("Ensured user {username} ({email})");
    Ok(user.id)
}
