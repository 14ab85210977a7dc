use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::food::{FoodRecord, NewFood};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Query contract over the food store.
///
/// Callers treat every failure as a soft miss: a lookup error degrades to
/// "no match" and an insert error abandons resolution, so an unreachable
/// store never takes down the logging workflow.
#[async_trait]
pub trait FoodStore: Send + Sync {
    /// Case-insensitive exact match on name.
    async fn find_by_name_exact(&self, name: &str) -> Result<Option<FoodRecord>, StoreError>;

    /// Case-insensitive substring match on name, ordered by name ascending.
    async fn search_by_name_substring(
        &self,
        fragment: &str,
        limit: i64,
    ) -> Result<Vec<FoodRecord>, StoreError>;

    /// Inserts a new record and returns it with its assigned id.
    async fn insert(&self, food: NewFood) -> Result<FoodRecord, StoreError>;
}

/// Postgres-backed store over the `foods` table.
pub struct PgFoodStore {
    pool: PgPool,
}

impl PgFoodStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape ILIKE metacharacters so user input matches literally.
fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl FoodStore for PgFoodStore {
    async fn find_by_name_exact(&self, name: &str) -> Result<Option<FoodRecord>, StoreError> {
        let food = sqlx::query_as::<_, FoodRecord>(
            "SELECT * FROM foods WHERE LOWER(name) = LOWER($1) LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(food)
    }

    async fn search_by_name_substring(
        &self,
        fragment: &str,
        limit: i64,
    ) -> Result<Vec<FoodRecord>, StoreError> {
        let pattern = format!("%{}%", escape_like(fragment));

        let foods = sqlx::query_as::<_, FoodRecord>(
            "SELECT * FROM foods WHERE name ILIKE $1 ORDER BY name ASC LIMIT $2",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(foods)
    }

    async fn insert(&self, food: NewFood) -> Result<FoodRecord, StoreError> {
        let inserted = sqlx::query_as::<_, FoodRecord>(
            r#"
            INSERT INTO foods (id, name, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, default_serving_g)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&food.name)
        .bind(food.calories_per_100g)
        .bind(food.protein_per_100g)
        .bind(food.carbs_per_100g)
        .bind(food.fat_per_100g)
        .bind(food.default_serving_g)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }
}
