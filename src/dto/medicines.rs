use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::Medicine,
    models::User,
    routes::params::{MedicineSortBy, PrescriptionFilter, SortOrder},
    session::Flash,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewMedicine {
    pub name: String,
    pub generic_name: String,
    pub manufacturer: String,
    pub category: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub stock_quantity: i32,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    #[serde(default)]
    pub requires_prescription: bool,
    pub image_url: Option<String>,
}

/// Catalog listing plus the option lists used to build the filter controls.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub medicines: crate::response::Paged<Medicine>,
    pub categories: Vec<String>,
    pub manufacturers: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogPage {
    pub medicines: Vec<Medicine>,
    pub categories: Vec<String>,
    pub manufacturers: Vec<String>,
    pub cart_item_count: i64,
    pub user: Option<User>,
    pub current_search: Option<String>,
    pub current_category: Option<String>,
    #[schema(value_type = Option<String>)]
    pub current_min_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub current_max_price: Option<Decimal>,
    pub current_prescription: Option<PrescriptionFilter>,
    pub current_sort_by: Option<MedicineSortBy>,
    pub current_sort_order: Option<SortOrder>,
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicineDetailPage {
    pub medicine: Medicine,
    pub cart_item_count: i64,
    pub user: Option<User>,
    pub flash: Option<Flash>,
}

fn one() -> i32 {
    1
}

fn catalog_path() -> String {
    "/medicines".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartForm {
    #[serde(default = "one")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuickAddForm {
    #[serde(default = "one")]
    pub quantity: i32,
    #[serde(default = "catalog_path")]
    pub return_url: String,
}

impl QuickAddForm {
    /// Where to send the browser afterwards. Only local paths are honored.
    pub fn redirect_target(&self) -> String {
        let url = self.return_url.trim();
        if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') {
            url.to_string()
        } else {
            catalog_path()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_add(return_url: &str) -> QuickAddForm {
        QuickAddForm {
            quantity: 1,
            return_url: return_url.into(),
        }
    }

    #[test]
    fn local_return_urls_are_kept() {
        assert_eq!(
            quick_add("/medicines?category=Allergy").redirect_target(),
            "/medicines?category=Allergy"
        );
    }

    #[test]
    fn foreign_return_urls_fall_back_to_catalog() {
        assert_eq!(quick_add("https://evil.test/").redirect_target(), "/medicines");
        assert_eq!(quick_add("//evil.test/").redirect_target(), "/medicines");
        assert_eq!(quick_add("/\\evil.test").redirect_target(), "/medicines");
    }

    #[test]
    fn quantity_defaults_to_one() {
        let form: AddToCartForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.quantity, 1);
    }

    #[test]
    fn catalog_page_echoes_every_filter() {
        let page = CatalogPage {
            medicines: Vec::new(),
            categories: Vec::new(),
            manufacturers: Vec::new(),
            cart_item_count: 0,
            user: None,
            current_search: None,
            current_category: Some("Allergy".into()),
            current_min_price: None,
            current_max_price: Some(Decimal::new(1000, 2)),
            current_prescription: Some(PrescriptionFilter::NonPrescription),
            current_sort_by: Some(MedicineSortBy::Price),
            current_sort_order: Some(SortOrder::Desc),
            flash: None,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["current_prescription"], "non-prescription");
        assert_eq!(json["current_sort_by"], "price");
        assert_eq!(json["current_sort_order"], "desc");
        assert_eq!(json["current_max_price"], "10.00");
    }
}
