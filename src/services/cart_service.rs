use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::cart::CartLine,
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel},
        medicines::{Entity as Medicines, Model as MedicineModel},
    },
    error::{AppError, AppResult},
    models::{CartItem, Medicine, line_prices},
    state::AppState,
};

// Stock is only checked here, never reserved or decremented. Two concurrent
// adds for the same pair can both pass the check.

/// Add `quantity` units to the user's line for `medicine_id`, creating the line
/// if needed. Stock must cover the resulting total quantity.
pub async fn add_to_cart(
    state: &AppState,
    user_id: Uuid,
    medicine_id: Uuid,
    quantity: i32,
) -> AppResult<CartItem> {
    if quantity <= 0 {
        return Err(AppError::bad_request("Quantity must be at least 1"));
    }

    let txn = state.orm.begin().await?;

    let medicine = match Medicines::find_by_id(medicine_id).one(&txn).await? {
        Some(m) => m,
        None => return Err(AppError::bad_request("Medicine not found")),
    };
    if !medicine.is_active {
        return Err(AppError::bad_request("Medicine is not available"));
    }
    ensure_stock(&medicine, quantity)?;

    let cart_item = match find_line(&txn, user_id, medicine_id).await? {
        Some(item) => {
            let new_quantity = item
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| insufficient_stock(&medicine))?;
            ensure_stock(&medicine, new_quantity)?;
            reprice(item, &medicine, new_quantity).update(&txn).await?
        }
        None => {
            let (unit_price, total_price) = line_prices(medicine.price, quantity);
            CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                medicine_id: Set(medicine_id),
                quantity: Set(quantity),
                unit_price: Set(unit_price),
                total_price: Set(total_price),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    tracing::debug!(
        user_id = %user_id,
        medicine_id = %medicine_id,
        quantity = cart_item.quantity,
        "cart line saved"
    );
    audit::record(
        &state.pool,
        Some(user_id),
        AuditAction::CartAdd,
        serde_json::json!({ "medicine_id": medicine_id, "quantity": quantity }),
    )
    .await;

    Ok(cart_item.into())
}

/// Set the quantity of an existing line. A quantity of zero or less removes
/// the line and returns `None`.
pub async fn update_quantity(
    state: &AppState,
    user_id: Uuid,
    medicine_id: Uuid,
    new_quantity: i32,
) -> AppResult<Option<CartItem>> {
    let txn = state.orm.begin().await?;

    let item = match find_line(&txn, user_id, medicine_id).await? {
        Some(item) => item,
        None => return Err(AppError::bad_request("Cart item not found")),
    };

    if new_quantity <= 0 {
        item.delete(&txn).await?;
        txn.commit().await?;
        audit::record(
            &state.pool,
            Some(user_id),
            AuditAction::CartRemove,
            serde_json::json!({ "medicine_id": medicine_id }),
        )
        .await;
        return Ok(None);
    }

    let medicine = match Medicines::find_by_id(medicine_id).one(&txn).await? {
        Some(m) => m,
        None => return Err(AppError::bad_request("Medicine not found")),
    };
    ensure_stock(&medicine, new_quantity)?;

    let updated = reprice(item, &medicine, new_quantity).update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user_id),
        AuditAction::CartUpdate,
        serde_json::json!({ "medicine_id": medicine_id, "quantity": new_quantity }),
    )
    .await;

    Ok(Some(updated.into()))
}

/// Remove one line. Removing a line that does not exist is not an error.
pub async fn remove_from_cart(state: &AppState, user_id: Uuid, medicine_id: Uuid) -> AppResult<u64> {
    let txn = state.orm.begin().await?;
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::MedicineId.eq(medicine_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    if result.rows_affected > 0 {
        audit::record(
            &state.pool,
            Some(user_id),
            AuditAction::CartRemove,
            serde_json::json!({ "medicine_id": medicine_id }),
        )
        .await;
    }

    Ok(result.rows_affected)
}

pub async fn clear_cart(state: &AppState, user_id: Uuid) -> AppResult<u64> {
    let txn = state.orm.begin().await?;
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    if result.rows_affected > 0 {
        audit::record(
            &state.pool,
            Some(user_id),
            AuditAction::CartClear,
            serde_json::json!({ "removed": result.rows_affected }),
        )
        .await;
    }

    Ok(result.rows_affected)
}

/// All lines for the user with their medicines, priced at current prices.
pub async fn get_cart(state: &AppState, user_id: Uuid) -> AppResult<Vec<CartLine>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .find_also_related(Medicines)
        .all(&state.orm)
        .await?;

    let lines = rows
        .into_iter()
        .filter_map(|(item, medicine)| medicine.map(|m| cart_line(item, m)))
        .collect();
    Ok(lines)
}

pub async fn get_cart_item(
    state: &AppState,
    user_id: Uuid,
    medicine_id: Uuid,
) -> AppResult<Option<CartItem>> {
    let item = find_line(&state.orm, user_id, medicine_id).await?;
    Ok(item.map(CartItem::from))
}

pub async fn cart_item_exists(state: &AppState, user_id: Uuid, medicine_id: Uuid) -> AppResult<bool> {
    let count = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::MedicineId.eq(medicine_id))
        .count(&state.orm)
        .await?;
    Ok(count > 0)
}

/// Sum of quantity × current medicine price over the user's lines.
pub async fn total_value(state: &AppState, user_id: Uuid) -> AppResult<Decimal> {
    let total: (Decimal,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(ci.quantity * m.price), 0)
        FROM cart_items ci
        JOIN medicines m ON m.id = ci.medicine_id
        WHERE ci.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(total.0)
}

/// Number of distinct lines, not the summed quantity.
pub async fn item_count(state: &AppState, user_id: Uuid) -> AppResult<i64> {
    let count = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .count(&state.orm)
        .await?;
    Ok(count as i64)
}

/// Lines whose quantity now exceeds the medicine's stock.
pub async fn check_stock(state: &AppState, user_id: Uuid) -> AppResult<Vec<CartLine>> {
    let lines = get_cart(state, user_id).await?;
    Ok(lines
        .into_iter()
        .filter(CartLine::has_insufficient_stock)
        .collect())
}

async fn find_line<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    medicine_id: Uuid,
) -> AppResult<Option<CartModel>> {
    let item = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::MedicineId.eq(medicine_id))
        .one(conn)
        .await?;
    Ok(item)
}

// Largest value a NUMERIC(10, 2) line total can hold.
const MAX_LINE_TOTAL: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

fn ensure_stock(medicine: &MedicineModel, quantity: i32) -> AppResult<()> {
    if medicine.stock_quantity < quantity {
        return Err(insufficient_stock(medicine));
    }
    ensure_line_total(medicine.price, quantity)
}

fn ensure_line_total(price: Decimal, quantity: i32) -> AppResult<()> {
    let (_, total) = line_prices(price, quantity);
    if total > MAX_LINE_TOTAL {
        return Err(AppError::bad_request(format!(
            "Cart line total cannot exceed {MAX_LINE_TOTAL}"
        )));
    }
    Ok(())
}

fn insufficient_stock(medicine: &MedicineModel) -> AppError {
    AppError::bad_request(format!(
        "Insufficient stock. Available: {}",
        medicine.stock_quantity
    ))
}

fn reprice(item: CartModel, medicine: &MedicineModel, quantity: i32) -> CartActive {
    let (unit_price, total_price) = line_prices(medicine.price, quantity);
    let mut active: CartActive = item.into();
    active.quantity = Set(quantity);
    active.unit_price = Set(unit_price);
    active.total_price = Set(total_price);
    active.updated_at = Set(Utc::now().into());
    active
}

fn cart_line(item: CartModel, medicine: MedicineModel) -> CartLine {
    let (unit_price, total_price) = line_prices(medicine.price, item.quantity);
    CartLine {
        id: item.id,
        medicine: Medicine::from(medicine),
        quantity: item.quantity,
        unit_price,
        total_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_limit_matches_column_precision() {
        assert_eq!(MAX_LINE_TOTAL, Decimal::new(9_999_999_999, 2));
    }

    #[test]
    fn line_total_within_column_is_accepted() {
        assert!(ensure_line_total(Decimal::new(599, 2), 10).is_ok());
        assert!(ensure_line_total(Decimal::new(9_999_999_999, 2), 1).is_ok());
    }

    #[test]
    fn oversized_line_total_is_a_domain_error() {
        let err = ensure_line_total(Decimal::new(5_000_000_000, 2), 2).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(
            err.to_string(),
            "Cart line total cannot exceed 99999999.99"
        );
    }
}
