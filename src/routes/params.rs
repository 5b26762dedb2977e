use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, DeserializeOwned, IntoDeserializer},
};
use utoipa::ToSchema;

pub const CATALOG_PAGE_SIZE: i64 = 12;
const MAX_PRICE: i64 = 999_999;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    /// `(page, per_page, offset)` with 1-based pages and `per_page` clamped to 1..=100.
    pub fn normalize(&self, default_per_page: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

// Filter forms submit untouched inputs as `field=`; those mean "not set".
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

fn blank_as_none_variant<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            T::deserialize(raw.trim().to_string().into_deserializer()).map(Some)
        }
        _ => Ok(None),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MedicineSortBy {
    #[default]
    Name,
    GenericName,
    Manufacturer,
    Category,
    Price,
    StockQuantity,
    CreatedAt,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PrescriptionFilter {
    Prescription,
    NonPrescription,
    #[default]
    #[serde(other)]
    Any,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none_variant")]
    pub prescription: Option<PrescriptionFilter>,
    #[serde(default, deserialize_with = "blank_as_none_variant")]
    pub sort_by: Option<MedicineSortBy>,
    #[serde(default, deserialize_with = "blank_as_none_variant")]
    pub sort_order: Option<SortOrder>,
}

/// The single filter dimension honored for a catalog request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogFilter {
    Search(String),
    Category(String),
    PriceRange { min: Decimal, max: Decimal },
    Prescription(bool),
    All,
}

impl CatalogQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Resolve the filter by precedence: search, category, price range,
    /// prescription flag, then everything active.
    pub fn filter(&self) -> CatalogFilter {
        if let Some(term) = non_blank(self.search.as_deref()) {
            return CatalogFilter::Search(term.to_string());
        }
        if let Some(category) = non_blank(self.category.as_deref()) {
            return CatalogFilter::Category(category.to_string());
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            return CatalogFilter::PriceRange {
                min: self.min_price.unwrap_or(Decimal::ZERO),
                max: self.max_price.unwrap_or(Decimal::from(MAX_PRICE)),
            };
        }
        match self.prescription.unwrap_or_default() {
            PrescriptionFilter::Prescription => CatalogFilter::Prescription(true),
            PrescriptionFilter::NonPrescription => CatalogFilter::Prescription(false),
            PrescriptionFilter::Any => CatalogFilter::All,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
