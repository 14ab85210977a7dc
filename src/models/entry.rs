use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed meal buckets. An entry belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Morning,
    Lunch,
    Evening,
    Dinner,
}

/// A single logged consumption event.
///
/// Nutrition values are snapshotted at creation (computed from the food's
/// per-100g profile or manually overridden) and never recomputed, so later
/// store changes cannot retroactively alter history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Uuid,
    /// Calendar date the entry belongs to, derived from the creation instant.
    pub date_key: NaiveDate,
    pub meal: Meal,
    /// Non-owning back-reference to the food this entry was derived from.
    pub food_id: Uuid,
    /// Snapshot of the food's name at creation time.
    pub name: String,
    /// Actual consumed weight: unit serving weight x quantity.
    pub grams: f64,
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

/// Inputs captured when the user confirms a quantity for a resolved food.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub food_id: Uuid,
    pub name: String,
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
    pub meal: Meal,
    /// Weight in grams of one unit/serving.
    pub grams: f64,
    /// Number of units consumed.
    pub quantity: f64,
    /// Manual calorie adjustment from the confirmation dialog.
    pub calorie_override: Option<f64>,
}

impl Entry {
    /// Builds an entry from a confirmed quantity, scaling the food's
    /// per-100g values to the total consumed weight and rounding to whole
    /// units. Macros absent on the food stay absent on the entry.
    pub fn confirm(confirmation: &Confirmation, date_key: NaiveDate) -> Self {
        let total_grams = confirmation.grams * confirmation.quantity;
        let scale = |per_100g: f64| (per_100g * total_grams / 100.0).round();

        let computed = scale(confirmation.calories_per_100g.unwrap_or(0.0));

        Self {
            id: Uuid::new_v4(),
            date_key,
            meal: confirmation.meal,
            food_id: confirmation.food_id,
            name: confirmation.name.clone(),
            grams: total_grams,
            calories: confirmation.calorie_override.unwrap_or(computed),
            protein: confirmation.protein_per_100g.map(scale),
            carbs: confirmation.carbs_per_100g.map(scale),
            fat: confirmation.fat_per_100g.map(scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chole_confirmation() -> Confirmation {
        Confirmation {
            food_id: Uuid::new_v4(),
            name: "Chole".into(),
            calories_per_100g: Some(180.0),
            protein_per_100g: Some(8.0),
            carbs_per_100g: Some(20.0),
            fat_per_100g: Some(6.0),
            meal: Meal::Lunch,
            grams: 150.0,
            quantity: 1.0,
            calorie_override: None,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    // ── confirmation math ────────────────────────────────────────────────

    #[test]
    fn test_confirm_scales_and_rounds_macros() {
        let entry = Entry::confirm(&chole_confirmation(), date());
        assert_eq!(entry.grams, 150.0);
        assert_eq!(entry.calories, 270.0); // round(180 * 150 / 100)
        assert_eq!(entry.protein, Some(12.0)); // round(8 * 150 / 100)
        assert_eq!(entry.carbs, Some(30.0));
        assert_eq!(entry.fat, Some(9.0));
    }

    #[test]
    fn test_confirm_multiplies_quantity_into_grams() {
        let mut c = chole_confirmation();
        c.grams = 100.0;
        c.quantity = 2.0;
        let entry = Entry::confirm(&c, date());
        assert_eq!(entry.grams, 200.0);
        assert_eq!(entry.calories, 360.0);
    }

    #[test]
    fn test_confirm_manual_override_wins() {
        let mut c = chole_confirmation();
        c.calorie_override = Some(300.0);
        let entry = Entry::confirm(&c, date());
        assert_eq!(entry.calories, 300.0);
        // macros still computed from the profile
        assert_eq!(entry.protein, Some(12.0));
    }

    #[test]
    fn test_confirm_missing_macros_stay_absent() {
        let mut c = chole_confirmation();
        c.protein_per_100g = None;
        c.carbs_per_100g = None;
        c.fat_per_100g = None;
        let entry = Entry::confirm(&c, date());
        assert_eq!(entry.protein, None);
        assert_eq!(entry.carbs, None);
        assert_eq!(entry.fat, None);
    }

    #[test]
    fn test_confirm_missing_calories_computes_zero() {
        let mut c = chole_confirmation();
        c.calories_per_100g = None;
        let entry = Entry::confirm(&c, date());
        assert_eq!(entry.calories, 0.0);
    }

    #[test]
    fn test_confirm_assigns_fresh_ids() {
        let a = Entry::confirm(&chole_confirmation(), date());
        let b = Entry::confirm(&chole_confirmation(), date());
        assert_ne!(a.id, b.id);
    }

    // ── serialization ────────────────────────────────────────────────────

    #[test]
    fn test_meal_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Meal::Morning).unwrap(), "morning");
        assert_eq!(serde_json::to_value(Meal::Dinner).unwrap(), "dinner");
    }

    #[test]
    fn test_entry_serializes_camel_case_date_key() {
        let entry = Entry::confirm(&chole_confirmation(), date());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["dateKey"], "2026-08-06");
        assert!(json.get("foodId").is_some());
        assert!(json.get("date_key").is_none());
    }

    #[test]
    fn test_entry_omits_absent_macros() {
        let mut c = chole_confirmation();
        c.fat_per_100g = None;
        let entry = Entry::confirm(&c, date());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("fat").is_none());
        assert!(json.get("protein").is_some());
    }
}
