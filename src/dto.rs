//! # NutriLog — Request/Response DTOs
//!
//! All API contract types in one module.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Food and entry shapes are camel-cased on the wire; absent optional
//!   fields are omitted, not null
//! - Field validation is expressed via `validator` derive macros, with
//!   cross-field checks as plain impl helpers

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::ledger::{MacroTotals, MealBuckets};
use crate::models::entry::{Confirmation, Entry, Meal};
use crate::models::food::FoodRecord;

// ============================================================================
// Common
// ============================================================================

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

// ============================================================================
// Foods
// ============================================================================

/// Food shape shared by the search and ensure responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_per_100g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_per_100g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_per_100g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_per_100g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_serving_g: Option<f64>,
}

impl From<FoodRecord> for FoodResponse {
    fn from(record: FoodRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            calories_per_100g: record.calories_per_100g,
            protein_per_100g: record.protein_per_100g,
            carbs_per_100g: record.carbs_per_100g,
            fat_per_100g: record.fat_per_100g,
            default_serving_g: record.default_serving_g,
        }
    }
}

/// POST /api/foods/ensure
#[derive(Debug, Deserialize, Validate)]
pub struct EnsureFoodRequest {
    #[validate(length(max = 200, message = "Name must be under 200 characters"))]
    #[serde(default)]
    pub name: String,
}

/// Response for POST /api/foods/ensure — the resolved food, or empty when
/// resolution failed silently
#[derive(Debug, Default, Serialize)]
pub struct EnsureFoodResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food: Option<FoodResponse>,
}

/// GET /api/foods/search query params
#[derive(Debug, Deserialize)]
pub struct SearchFoodsQuery {
    pub q: Option<String>,
    /// Browse-all flag: list foods even with an empty query, at a higher cap
    #[serde(default)]
    pub all: bool,
}

/// Response for GET /api/foods/search
#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub items: Vec<FoodResponse>,
}

// ============================================================================
// Entries
// ============================================================================

/// POST /api/entries — a confirmed quantity for a resolved food. Carries
/// the food's per-100g snapshot so the entry is decoupled from later
/// store state.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub food_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,

    pub meal: Meal,

    /// Weight in grams of one unit/serving
    pub grams: f64,

    /// Number of units. Default: 1
    #[serde(default = "default_quantity")]
    pub quantity: f64,

    /// Manual calorie adjustment from the confirmation dialog
    pub calorie_override: Option<f64>,
}

fn default_quantity() -> f64 {
    1.0
}

impl CreateEntryRequest {
    /// grams and quantity must be positive finite numbers; an override,
    /// when present, must be non-negative and finite
    pub fn validate_amounts(&self) -> Result<(), String> {
        if !self.grams.is_finite() || self.grams <= 0.0 {
            return Err("grams must be a positive number".into());
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err("quantity must be a positive number".into());
        }
        if let Some(cal) = self.calorie_override {
            if !cal.is_finite() || cal < 0.0 {
                return Err("calorie override must be a non-negative number".into());
            }
        }
        Ok(())
    }

    pub fn into_confirmation(self) -> Confirmation {
        Confirmation {
            food_id: self.food_id,
            name: self.name,
            calories_per_100g: self.calories_per_100g,
            protein_per_100g: self.protein_per_100g,
            carbs_per_100g: self.carbs_per_100g,
            fat_per_100g: self.fat_per_100g,
            meal: self.meal,
            grams: self.grams,
            quantity: self.quantity,
            calorie_override: self.calorie_override,
        }
    }
}

/// GET /api/entries — entries in insertion order plus the derived views
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayResponse {
    pub entries: Vec<Entry>,
    pub by_meal: MealBuckets,
    pub totals: MacroTotals,
}
