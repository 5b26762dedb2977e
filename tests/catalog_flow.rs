mod common;

use axum_pharmacy::{
    error::AppError,
    routes::params::{CatalogQuery, MedicineSortBy, PrescriptionFilter, SortOrder},
    services::medicine_service,
};
use rust_decimal::Decimal;

use common::{create_medicine, new_medicine, test_state, unique};

#[tokio::test]
async fn category_listing_pages_and_sorts() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let category = unique("Category ");
    let cheap = create_medicine(&state, &category, Decimal::new(150, 2), 5).await?;
    let mid = create_medicine(&state, &category, Decimal::new(900, 2), 5).await?;
    let dear = create_medicine(&state, &category, Decimal::new(4200, 2), 5).await?;

    let mut query = CatalogQuery {
        category: Some(category.clone()),
        sort_by: Some(MedicineSortBy::Price),
        sort_order: Some(SortOrder::Desc),
        per_page: Some(2),
        ..Default::default()
    };
    let first = medicine_service::list_medicines(&state, &query).await?;
    assert_eq!(first.total, 3);
    assert_eq!(first.page, 1);
    let ids: Vec<_> = first.items.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![dear.id, mid.id]);

    query.page = Some(2);
    let second = medicine_service::list_medicines(&state, &query).await?;
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id, cheap.id);

    // Deactivated medicines leave the catalog and cannot be viewed.
    medicine_service::deactivate_medicine(&state, mid.id).await?;
    query.page = None;
    let after = medicine_service::list_medicines(&state, &query).await?;
    assert_eq!(after.total, 2);
    assert!(matches!(
        medicine_service::get_active_medicine(&state, mid.id).await,
        Err(AppError::NotFound)
    ));
    assert!(medicine_service::find_medicine(&state, mid.id).await?.is_some());

    let catalog = medicine_service::list_catalog(&state, &query).await?;
    assert!(catalog.categories.contains(&category));
    assert!(catalog.manufacturers.iter().any(|m| m == "Test Labs"));

    Ok(())
}

#[tokio::test]
async fn search_is_case_insensitive_and_literal() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let token = unique("zq");
    let category = unique("Search ");
    let percent = medicine_service::create_medicine(
        &state,
        new_medicine(&format!("{token} 100%"), &category, Decimal::new(500, 2), 3),
    )
    .await?;
    let plain = medicine_service::create_medicine(
        &state,
        new_medicine(&format!("{token} 1000"), &category, Decimal::new(500, 2), 3),
    )
    .await?;

    let query = CatalogQuery {
        search: Some(token.to_uppercase()),
        ..Default::default()
    };
    let found = medicine_service::list_medicines(&state, &query).await?;
    let ids: Vec<_> = found.items.iter().map(|m| m.id).collect();
    assert_eq!(found.total, 2);
    assert!(ids.contains(&percent.id) && ids.contains(&plain.id));

    // `%` is matched literally.
    let query = CatalogQuery {
        search: Some(format!("{token} 100%")),
        // Ignored while a search term is present.
        category: Some("Nothing Like This".to_string()),
        ..Default::default()
    };
    let found = medicine_service::list_medicines(&state, &query).await?;
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].id, percent.id);

    // Generic name matches too.
    let query = CatalogQuery {
        search: Some(format!("{token} 1000 GENERIC")),
        ..Default::default()
    };
    let found = medicine_service::list_medicines(&state, &query).await?;
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].id, plain.id);

    Ok(())
}

#[tokio::test]
async fn price_range_and_prescription_filters() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let category = unique("Range ");
    let pricey = create_medicine(&state, &category, Decimal::new(98_765_432, 2), 2).await?;

    let query = CatalogQuery {
        min_price: Some(Decimal::new(98_765_400, 2)),
        max_price: Some(Decimal::new(98_765_500, 2)),
        per_page: Some(100),
        ..Default::default()
    };
    let found = medicine_service::list_medicines(&state, &query).await?;
    assert!(found.items.iter().any(|m| m.id == pricey.id));
    assert!(found.items.iter().all(|m| {
        m.price >= Decimal::new(98_765_400, 2) && m.price <= Decimal::new(98_765_500, 2)
    }));

    // Only an upper bound: the lower bound defaults to zero.
    let query = CatalogQuery {
        max_price: Some(Decimal::new(98_765_500, 2)),
        sort_by: Some(MedicineSortBy::Price),
        sort_order: Some(SortOrder::Desc),
        ..Default::default()
    };
    let found = medicine_service::list_medicines(&state, &query).await?;
    assert!(found.items.iter().all(|m| m.price <= Decimal::new(98_765_500, 2)));

    let mut rx = new_medicine(&unique("Rx "), &category, Decimal::new(2599, 2), 4);
    rx.requires_prescription = true;
    let rx = medicine_service::create_medicine(&state, rx).await?;

    let query = CatalogQuery {
        prescription: Some(PrescriptionFilter::Prescription),
        per_page: Some(100),
        ..Default::default()
    };
    let found = medicine_service::list_medicines(&state, &query).await?;
    assert!(found.total >= 1);
    assert!(found.items.iter().all(|m| m.requires_prescription));

    let query = CatalogQuery {
        prescription: Some(PrescriptionFilter::NonPrescription),
        per_page: Some(100),
        ..Default::default()
    };
    let found = medicine_service::list_medicines(&state, &query).await?;
    assert!(found.items.iter().all(|m| !m.requires_prescription));
    assert!(found.items.iter().all(|m| m.id != rx.id));

    Ok(())
}

#[tokio::test]
async fn create_medicine_validates_input() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let category = unique("Invalid ");
    let free = new_medicine(&unique("Free "), &category, Decimal::ZERO, 1);
    let err = medicine_service::create_medicine(&state, free).await.unwrap_err();
    assert_eq!(err.to_string(), "Price must be greater than 0");

    let negative = new_medicine(&unique("Neg "), &category, Decimal::ONE, -1);
    let err = medicine_service::create_medicine(&state, negative)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Stock quantity cannot be negative");

    let err = medicine_service::update_stock_quantity(&state, uuid::Uuid::new_v4(), -5)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}
