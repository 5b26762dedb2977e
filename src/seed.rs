//! Starter catalog inserted when the medicines table is empty.

use rust_decimal::Decimal;

use crate::{
    dto::medicines::NewMedicine,
    error::AppResult,
    services::medicine_service,
    state::AppState,
};

// (name, generic name, manufacturer, category, description, price in cents, stock)
const CATALOG: &[(&str, &str, &str, &str, &str, i64, i32)] = &[
    ("Paracetamol 500mg", "Acetaminophen", "Johnson & Johnson", "Pain Relief", "Effective pain reliever and fever reducer. Safe for adults and children.", 599, 100),
    ("Ibuprofen 400mg", "Ibuprofen", "Pfizer", "Pain Relief", "Anti-inflammatory pain reliever for headaches, muscle pain, and inflammation.", 899, 75),
    ("Aspirin 325mg", "Acetylsalicylic Acid", "Bayer", "Pain Relief", "Pain reliever and anti-inflammatory. Also used for heart health.", 699, 50),
    ("Cold & Flu Relief", "Pseudoephedrine + Acetaminophen", "Tylenol", "Cold & Flu", "Multi-symptom relief for cold and flu symptoms including congestion and fever.", 1299, 30),
    ("Cough Syrup", "Dextromethorphan", "Robitussin", "Cold & Flu", "Effective cough suppressant for dry coughs. Alcohol-free formula.", 999, 25),
    ("Nasal Decongestant", "Oxymetazoline", "Afrin", "Cold & Flu", "Fast-acting nasal spray for congestion relief. 12-hour relief.", 799, 40),
    ("Amoxicillin 500mg", "Amoxicillin", "GlaxoSmithKline", "Antibiotics", "Broad-spectrum antibiotic for bacterial infections. Prescription required.", 2599, 20),
    ("Ciprofloxacin 500mg", "Ciprofloxacin", "Bayer", "Antibiotics", "Fluoroquinolone antibiotic for serious bacterial infections. Prescription required.", 3599, 15),
    ("Azithromycin 250mg", "Azithromycin", "Pfizer", "Antibiotics", "Macrolide antibiotic for respiratory and skin infections. Prescription required.", 2999, 18),
    ("Omeprazole 20mg", "Omeprazole", "AstraZeneca", "Digestive Health", "Proton pump inhibitor for acid reflux and stomach ulcers. Prescription required.", 1899, 35),
    ("Loperamide 2mg", "Loperamide", "Janssen", "Digestive Health", "Anti-diarrheal medication for acute and chronic diarrhea.", 699, 60),
    ("Simethicone 125mg", "Simethicone", "Johnson & Johnson", "Digestive Health", "Anti-gas medication for bloating and gas relief.", 499, 80),
    ("Atorvastatin 20mg", "Atorvastatin", "Pfizer", "Cardiovascular", "Statin medication for cholesterol management. Prescription required.", 2299, 25),
    ("Lisinopril 10mg", "Lisinopril", "Merck", "Cardiovascular", "ACE inhibitor for blood pressure management. Prescription required.", 1599, 30),
    ("Metoprolol 50mg", "Metoprolol", "AstraZeneca", "Cardiovascular", "Beta-blocker for heart conditions and blood pressure. Prescription required.", 1999, 22),
    ("Metformin 500mg", "Metformin", "Bristol Myers Squibb", "Diabetes", "First-line treatment for type 2 diabetes. Prescription required.", 1299, 40),
    ("Insulin Glargine", "Insulin Glargine", "Sanofi", "Diabetes", "Long-acting insulin for diabetes management. Prescription required.", 4599, 10),
    ("Glucose Test Strips", "Glucose Oxidase", "Roche", "Diabetes", "Blood glucose test strips for diabetes monitoring.", 2499, 50),
    ("Vitamin D3 1000IU", "Cholecalciferol", "Nature Made", "Vitamins", "Essential vitamin D supplement for bone health and immune support.", 999, 100),
    ("Vitamin C 1000mg", "Ascorbic Acid", "Nature's Bounty", "Vitamins", "High-potency vitamin C for immune system support.", 799, 120),
    ("Multivitamin", "Multiple Vitamins", "Centrum", "Vitamins", "Complete daily multivitamin for overall health and wellness.", 1199, 90),
    ("Loratadine 10mg", "Loratadine", "Bayer", "Allergy", "Non-drowsy antihistamine for seasonal allergies.", 899, 65),
    ("Cetirizine 10mg", "Cetirizine", "Johnson & Johnson", "Allergy", "24-hour allergy relief for sneezing, runny nose, and itchy eyes.", 699, 70),
    ("Diphenhydramine 25mg", "Diphenhydramine", "Benadryl", "Allergy", "Antihistamine for allergy relief and sleep aid.", 599, 85),
    ("Hydrocortisone Cream 1%", "Hydrocortisone", "Johnson & Johnson", "Skin Care", "Topical corticosteroid for skin inflammation and itching.", 799, 45),
    ("Antifungal Cream", "Clotrimazole", "Bayer", "Skin Care", "Topical antifungal treatment for athlete's foot and ringworm.", 999, 35),
    ("Sunscreen SPF 50", "Zinc Oxide + Titanium Dioxide", "Neutrogena", "Skin Care", "Broad-spectrum sunscreen for UV protection.", 1299, 25),
];

const PRESCRIPTION_CATEGORIES: &[&str] = &["Antibiotics", "Cardiovascular", "Diabetes"];
const PRESCRIPTION_NAMES: &[&str] = &["Omeprazole", "Insulin"];
const STRENGTHS: &[&str] = &[
    "500mg", "400mg", "325mg", "250mg", "20mg", "10mg", "1000IU", "1000mg", "SPF 50", "1%",
];

/// Insert the starter catalog when no medicines exist. Returns how many rows
/// were inserted.
pub async fn seed_catalog_if_empty(state: &AppState) -> AppResult<usize> {
    if medicine_service::count_medicines(state).await? > 0 {
        tracing::debug!("catalog already populated, skipping seed");
        return Ok(0);
    }

    for medicine in starter_catalog() {
        medicine_service::create_medicine(state, medicine).await?;
    }
    tracing::info!(count = CATALOG.len(), "seeded medicine catalog");
    Ok(CATALOG.len())
}

pub fn starter_catalog() -> Vec<NewMedicine> {
    CATALOG
        .iter()
        .map(
            |&(name, generic_name, manufacturer, category, description, cents, stock)| NewMedicine {
                name: name.to_string(),
                generic_name: generic_name.to_string(),
                manufacturer: manufacturer.to_string(),
                category: category.to_string(),
                description: Some(description.to_string()),
                price: Decimal::new(cents, 2),
                stock_quantity: stock,
                dosage_form: Some(dosage_form(name).to_string()),
                strength: strength(name).map(str::to_string),
                requires_prescription: requires_prescription(name, category),
                image_url: Some(image_url(name)),
            },
        )
        .collect()
}

fn dosage_form(name: &str) -> &'static str {
    if name.contains("mg") {
        "Tablet"
    } else if name.contains("Syrup") || name.contains("Cream") {
        "Topical"
    } else if name.contains("Spray") {
        "Nasal Spray"
    } else if name.contains("Strips") {
        "Test Strips"
    } else {
        "Capsule"
    }
}

fn strength(name: &str) -> Option<&'static str> {
    STRENGTHS.iter().copied().find(|s| name.contains(s))
}

fn requires_prescription(name: &str, category: &str) -> bool {
    PRESCRIPTION_CATEGORIES.contains(&category)
        || PRESCRIPTION_NAMES.iter().any(|n| name.contains(n))
}

fn image_url(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect();
    format!("/images/medicines/{slug}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_attributes_from_names() {
        assert_eq!(dosage_form("Paracetamol 500mg"), "Tablet");
        assert_eq!(dosage_form("Antifungal Cream"), "Topical");
        assert_eq!(dosage_form("Glucose Test Strips"), "Test Strips");
        assert_eq!(dosage_form("Multivitamin"), "Capsule");
        assert_eq!(strength("Vitamin D3 1000IU"), Some("1000IU"));
        assert_eq!(strength("Multivitamin"), None);
    }

    #[test]
    fn prescription_follows_category_and_name() {
        assert!(requires_prescription("Amoxicillin 500mg", "Antibiotics"));
        assert!(requires_prescription("Omeprazole 20mg", "Digestive Health"));
        assert!(!requires_prescription("Loperamide 2mg", "Digestive Health"));
    }

    #[test]
    fn image_urls_are_slugged() {
        assert_eq!(
            image_url("Cold & Flu Relief"),
            "/images/medicines/cold---flu-relief.jpg"
        );
    }

    #[test]
    fn starter_catalog_prices_are_positive() {
        let catalog = starter_catalog();
        assert_eq!(catalog.len(), 27);
        assert!(catalog.iter().all(|m| m.price > Decimal::ZERO));
    }
}
