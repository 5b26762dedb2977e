mod common;

use axum_pharmacy::{
    dto::auth::ProfileUpdate,
    error::AppError,
    services::auth_service,
    session::{self, Flash, FlashKind},
};

use common::{register_form, test_state, unique};

// Register, reject duplicates, authenticate by username and by email, then deactivate.
#[tokio::test]
async fn register_login_and_deactivate_flow() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let username = unique("alice");
    let user = auth_service::register(&state, register_form(&username, "secret123")).await?;
    assert_eq!(user.username, username);
    assert!(user.is_active);
    assert_ne!(user.password_hash, "secret123");
    assert!(auth_service::username_exists(&state, &username).await?);
    assert!(auth_service::email_exists(&state, &user.email).await?);

    // Same username, different email.
    let mut dup = register_form(&username, "secret123");
    dup.email = format!("{}@example.com", unique("other"));
    let err = auth_service::register(&state, dup).await.unwrap_err();
    assert_eq!(err.to_string(), format!("Username already exists: {username}"));

    // Same email, different username.
    let mut dup = register_form(&unique("bob"), "secret123");
    dup.email = user.email.clone();
    let err = auth_service::register(&state, dup).await.unwrap_err();
    assert_eq!(err.to_string(), format!("Email already exists: {}", user.email));

    let by_name = auth_service::authenticate(&state, &username, "secret123").await?;
    assert_eq!(by_name.id, user.id);
    let by_email = auth_service::authenticate(&state, &user.email, "secret123").await?;
    assert_eq!(by_email.id, user.id);

    let err = auth_service::authenticate(&state, &username, "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid password");

    let missing = unique("nobody");
    let err = auth_service::authenticate(&state, &missing, "secret123")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(err.to_string().starts_with("User not found"));

    let updated = auth_service::update_profile(
        &state,
        user.id,
        ProfileUpdate {
            city: Some("Springfield".to_string()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(updated.city.as_deref(), Some("Springfield"));
    assert_eq!(updated.full_name, user.full_name);

    auth_service::deactivate_user(&state, user.id).await?;
    assert!(
        auth_service::authenticate(&state, &username, "secret123")
            .await
            .is_err(),
        "deactivated users cannot log in"
    );
    assert!(
        auth_service::find_by_username_or_email(&state, &username)
            .await?
            .is_none()
    );

    Ok(())
}

// Anonymous flash, login rotation, flash consumed once, logout.
#[tokio::test]
async fn session_flash_and_rotation_flow() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let anonymous = session::set_flash(&state.pool, None, &Flash::error("Invalid password")).await?;
    let record = session::load(&state.pool, anonymous).await?.expect("anonymous session");
    assert!(record.user_id.is_none());

    let user = auth_service::register(&state, register_form(&unique("carol"), "secret123")).await?;
    let signed_in = session::start(&state.pool, Some(anonymous), user.id).await?;
    assert_ne!(signed_in, anonymous);
    assert!(session::load(&state.pool, anonymous).await?.is_none());

    let written = session::set_flash(&state.pool, Some(signed_in), &Flash::success("Welcome back!")).await?;
    assert_eq!(written, signed_in);

    let flash = session::take_flash(&state.pool, signed_in).await?.expect("pending flash");
    assert_eq!(flash.kind, FlashKind::Success);
    assert_eq!(flash.message, "Welcome back!");
    assert!(session::take_flash(&state.pool, signed_in).await?.is_none());

    session::destroy(&state.pool, signed_in).await?;
    assert!(session::load(&state.pool, signed_in).await?.is_none());

    Ok(())
}

// Racing registrations for one username: exactly one wins, the other gets the domain message.
#[tokio::test]
async fn concurrent_registrations_report_duplicate_username() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let username = unique("race");
    let first = register_form(&username, "secret123");
    let mut second = register_form(&username, "secret123");
    second.email = format!("{}@example.com", unique("race"));

    let (a, b) = tokio::join!(
        auth_service::register(&state, first),
        auth_service::register(&state, second),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let err = outcomes
        .into_iter()
        .find_map(Result::err)
        .expect("one registration rejected");
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(err.to_string(), format!("Username already exists: {username}"));

    Ok(())
}
