use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored nutrition profile per 100g of a named food.
///
/// Immutable once inserted: there is no update path, and entries snapshot
/// the values they need at confirmation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodRecord {
    pub id: Uuid,
    pub name: String,
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
    pub default_serving_g: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
    pub default_serving_g: Option<f64>,
}
