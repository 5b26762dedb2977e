use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::medicines::{Catalog, NewMedicine},
    entity::medicines::{ActiveModel as MedicineActive, Column, Entity as Medicines},
    error::{AppError, AppResult},
    models::Medicine,
    response::Paged,
    routes::params::{CATALOG_PAGE_SIZE, CatalogFilter, CatalogQuery, MedicineSortBy, SortOrder},
    state::AppState,
};

/// One catalog page plus the category and manufacturer option lists.
pub async fn list_catalog(state: &AppState, query: &CatalogQuery) -> AppResult<Catalog> {
    let medicines = list_medicines(state, query).await?;
    let categories = list_categories(state).await?;
    let manufacturers = list_manufacturers(state).await?;
    Ok(Catalog {
        medicines,
        categories,
        manufacturers,
    })
}

pub async fn list_medicines(state: &AppState, query: &CatalogQuery) -> AppResult<Paged<Medicine>> {
    let (page, limit, offset) = query.pagination().normalize(CATALOG_PAGE_SIZE);
    let filter = query.filter();
    tracing::debug!(?filter, page, limit, "listing medicines");

    let condition = Condition::all()
        .add(Column::IsActive.eq(true))
        .add(filter_condition(&filter));

    let sort_col = match query.sort_by.unwrap_or_default() {
        MedicineSortBy::Name => Column::Name,
        MedicineSortBy::GenericName => Column::GenericName,
        MedicineSortBy::Manufacturer => Column::Manufacturer,
        MedicineSortBy::Category => Column::Category,
        MedicineSortBy::Price => Column::Price,
        MedicineSortBy::StockQuantity => Column::StockQuantity,
        MedicineSortBy::CreatedAt => Column::CreatedAt,
    };

    let mut finder = Medicines::find().filter(condition);
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder = finder.order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Medicine::from)
        .collect();

    Ok(Paged {
        items,
        page,
        per_page: limit,
        total,
    })
}

fn filter_condition(filter: &CatalogFilter) -> Condition {
    match filter {
        CatalogFilter::Search(term) => {
            let pattern = format!("%{}%", escape_like(term));
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::GenericName).ilike(pattern.clone()))
                .add(Expr::col(Column::Manufacturer).ilike(pattern))
        }
        CatalogFilter::Category(category) => {
            Condition::all().add(Column::Category.eq(category.clone()))
        }
        CatalogFilter::PriceRange { min, max } => {
            Condition::all().add(Column::Price.between(*min, *max))
        }
        CatalogFilter::Prescription(required) => {
            Condition::all().add(Column::RequiresPrescription.eq(*required))
        }
        CatalogFilter::All => Condition::all(),
    }
}

/// Distinct categories among active medicines, sorted.
pub async fn list_categories(state: &AppState) -> AppResult<Vec<String>> {
    let categories = Medicines::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .filter(Column::IsActive.eq(true))
        .order_by_asc(Column::Category)
        .into_tuple::<String>()
        .all(&state.orm)
        .await?;
    Ok(categories)
}

/// Distinct manufacturers among active medicines, sorted.
pub async fn list_manufacturers(state: &AppState) -> AppResult<Vec<String>> {
    let manufacturers = Medicines::find()
        .select_only()
        .column(Column::Manufacturer)
        .distinct()
        .filter(Column::IsActive.eq(true))
        .order_by_asc(Column::Manufacturer)
        .into_tuple::<String>()
        .all(&state.orm)
        .await?;
    Ok(manufacturers)
}

/// Look up a medicine regardless of its active flag.
pub async fn find_medicine(state: &AppState, id: Uuid) -> AppResult<Option<Medicine>> {
    let medicine = Medicines::find_by_id(id).one(&state.orm).await?;
    Ok(medicine.map(Medicine::from))
}

/// Look up a medicine for display. Inactive medicines count as missing.
pub async fn get_active_medicine(state: &AppState, id: Uuid) -> AppResult<Medicine> {
    match find_medicine(state, id).await? {
        Some(m) if m.is_active => Ok(m),
        _ => Err(AppError::NotFound),
    }
}

pub async fn count_medicines(state: &AppState) -> AppResult<u64> {
    Ok(Medicines::find().count(&state.orm).await?)
}

pub async fn create_medicine(state: &AppState, payload: NewMedicine) -> AppResult<Medicine> {
    if payload.name.trim().is_empty()
        || payload.generic_name.trim().is_empty()
        || payload.manufacturer.trim().is_empty()
        || payload.category.trim().is_empty()
    {
        return Err(AppError::bad_request(
            "Name, generic name, manufacturer and category are required",
        ));
    }
    if payload.price <= Decimal::ZERO {
        return Err(AppError::bad_request("Price must be greater than 0"));
    }
    if payload.stock_quantity < 0 {
        return Err(AppError::bad_request("Stock quantity cannot be negative"));
    }

    let medicine = MedicineActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        generic_name: Set(payload.generic_name),
        manufacturer: Set(payload.manufacturer),
        category: Set(payload.category),
        description: Set(payload.description),
        price: Set(payload.price),
        stock_quantity: Set(payload.stock_quantity),
        dosage_form: Set(payload.dosage_form),
        strength: Set(payload.strength),
        requires_prescription: Set(payload.requires_prescription),
        is_active: Set(true),
        image_url: Set(payload.image_url),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        None,
        AuditAction::MedicineCreate,
        serde_json::json!({ "medicine_id": medicine.id }),
    )
    .await;

    Ok(medicine.into())
}

/// Soft delete. Unknown ids are ignored.
pub async fn deactivate_medicine(state: &AppState, id: Uuid) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let Some(existing) = Medicines::find_by_id(id).one(&txn).await? else {
        return Ok(());
    };

    let mut active: MedicineActive = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(medicine_id = %id, "medicine deactivated");
    audit::record(
        &state.pool,
        None,
        AuditAction::MedicineDeactivate,
        serde_json::json!({ "medicine_id": id }),
    )
    .await;

    Ok(())
}

/// Whether current stock covers `required`. Unknown medicines are never in stock.
pub async fn is_in_stock(state: &AppState, id: Uuid, required: i32) -> AppResult<bool> {
    let medicine = Medicines::find_by_id(id).one(&state.orm).await?;
    Ok(medicine.is_some_and(|m| m.stock_quantity >= required))
}

pub async fn update_stock_quantity(state: &AppState, id: Uuid, quantity: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(AppError::bad_request("Stock quantity cannot be negative"));
    }
    set_stock(state, id, |_| quantity).await
}

/// Take `quantity` units out of stock, never going below zero.
pub async fn reduce_stock_quantity(state: &AppState, id: Uuid, quantity: i32) -> AppResult<()> {
    set_stock(state, id, |current| current.saturating_sub(quantity).max(0)).await
}

async fn set_stock(state: &AppState, id: Uuid, next: impl FnOnce(i32) -> i32) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let Some(existing) = Medicines::find_by_id(id).one(&txn).await? else {
        return Ok(());
    };

    let stock = next(existing.stock_quantity);
    let mut active: MedicineActive = existing.into();
    active.stock_quantity = Set(stock);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        None,
        AuditAction::StockUpdate,
        serde_json::json!({ "medicine_id": id, "stock_quantity": stock }),
    )
    .await;

    Ok(())
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
