use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{cart_items, medicines, users};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub generic_name: String,
    pub manufacturer: String,
    pub category: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "5.99")]
    pub price: Decimal,
    pub stock_quantity: i32,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    pub requires_prescription: bool,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medicine_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unit and line price for `quantity` units at `price`.
pub fn line_prices(price: Decimal, quantity: i32) -> (Decimal, Decimal) {
    (price, price * Decimal::from(quantity))
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            full_name: model.full_name,
            phone_number: model.phone_number,
            address: model.address,
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<medicines::Model> for Medicine {
    fn from(model: medicines::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            generic_name: model.generic_name,
            manufacturer: model.manufacturer,
            category: model.category,
            description: model.description,
            price: model.price,
            stock_quantity: model.stock_quantity,
            dosage_form: model.dosage_form,
            strength: model.strength,
            requires_prescription: model.requires_prescription,
            is_active: model.is_active,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            medicine_id: model.medicine_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            total_price: model.total_price,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
