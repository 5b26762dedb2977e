use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::Medicine, models::User, session::Flash};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartForm {
    pub quantity: i32,
}

/// A cart line joined with its medicine, priced at the medicine's current price.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub medicine: Medicine,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

impl CartLine {
    pub fn has_insufficient_stock(&self) -> bool {
        self.quantity > self.medicine.stock_quantity
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartPage {
    pub items: Vec<CartLine>,
    #[schema(value_type = String)]
    pub total_value: Decimal,
    pub item_count: i64,
    pub insufficient_stock_items: Vec<CartLine>,
    pub user: Option<User>,
    pub flash: Option<Flash>,
}
