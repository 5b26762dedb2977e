use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

/// Actions written to `audit_logs.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    UserLogout,
    UserUpdate,
    UserDeactivate,
    CartAdd,
    CartUpdate,
    CartRemove,
    CartClear,
    MedicineCreate,
    MedicineDeactivate,
    StockUpdate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserLogin => "user_login",
            AuditAction::UserLogout => "user_logout",
            AuditAction::UserUpdate => "user_update",
            AuditAction::UserDeactivate => "user_deactivate",
            AuditAction::CartAdd => "cart_add",
            AuditAction::CartUpdate => "cart_update",
            AuditAction::CartRemove => "cart_remove",
            AuditAction::CartClear => "cart_clear",
            AuditAction::MedicineCreate => "medicine_create",
            AuditAction::MedicineDeactivate => "medicine_deactivate",
            AuditAction::StockUpdate => "stock_update",
        }
    }

    pub fn resource(&self) -> &'static str {
        match self {
            AuditAction::UserRegister
            | AuditAction::UserUpdate
            | AuditAction::UserDeactivate => "users",
            AuditAction::UserLogin | AuditAction::UserLogout => "sessions",
            AuditAction::CartAdd
            | AuditAction::CartUpdate
            | AuditAction::CartRemove
            | AuditAction::CartClear => "cart_items",
            AuditAction::MedicineCreate
            | AuditAction::MedicineDeactivate
            | AuditAction::StockUpdate => "medicines",
        }
    }
}

pub async fn log_audit(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: AuditAction,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(action.as_str())
    .bind(action.resource())
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Audit entries never fail the request that produced them.
pub async fn record(pool: &DbPool, user_id: Option<Uuid>, action: AuditAction, metadata: Value) {
    if let Err(err) = log_audit(pool, user_id, action, Some(metadata)).await {
        tracing::warn!(error = %err, action = action.as_str(), "audit log failed");
    }
}
