use std::sync::Arc;

use crate::estimator::Estimator;
use crate::models::food::{FoodRecord, NewFood};
use crate::store::FoodStore;

/// Calorie value persisted when the estimator returns a missing or
/// zero-equivalent calorie figure. Tunable via `FALLBACK_CALORIES_PER_100G`.
pub const DEFAULT_CALORIES_PER_100G: f64 = 180.0;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The submitted name was blank after trimming. The only resolution
    /// failure surfaced as a genuine error; everything downstream
    /// collapses to an empty result.
    #[error("missing name")]
    MissingName,
}

/// Turns a free-text food name into a stored `FoodRecord`, creating one
/// via estimation on first sight.
///
/// "Ensure" semantics: once a name resolves successfully, later resolves
/// of the same name hit the exact-match fast path and never re-invoke the
/// estimator.
pub struct FoodResolver {
    store: Option<Arc<dyn FoodStore>>,
    estimator: Option<Arc<dyn Estimator>>,
    fallback_calories: f64,
}

impl FoodResolver {
    pub fn new(store: Option<Arc<dyn FoodStore>>, estimator: Option<Arc<dyn Estimator>>) -> Self {
        Self {
            store,
            estimator,
            fallback_calories: DEFAULT_CALORIES_PER_100G,
        }
    }

    pub fn with_fallback_calories(mut self, calories_per_100g: f64) -> Self {
        self.fallback_calories = calories_per_100g;
        self
    }

    /// Resolves a raw user-supplied name to exactly one food record.
    ///
    /// `Ok(None)` means resolution failed silently (no store match, no
    /// usable estimate, or the insert failed) — callers present a neutral
    /// empty state, not an error.
    pub async fn resolve(&self, raw_name: &str) -> Result<Option<FoodRecord>, ResolveError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(ResolveError::MissingName);
        }

        let Some(store) = &self.store else {
            return Ok(None);
        };

        match store.find_by_name_exact(name).await {
            Ok(Some(food)) => return Ok(Some(food)),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, food = name, "food lookup failed, treating as no match");
            }
        }

        let Some(estimator) = &self.estimator else {
            return Ok(None);
        };

        let estimate = match estimator.estimate(name).await {
            Ok(estimate) => estimate,
            Err(err) => {
                tracing::warn!(error = %err, food = name, "nutrition estimate failed");
                return Ok(None);
            }
        };

        let calories = if estimate.calories_per_100g > 0.0 {
            estimate.calories_per_100g
        } else {
            tracing::debug!(food = name, "estimate had no calories, applying fallback default");
            self.fallback_calories
        };

        let new_food = NewFood {
            name: name.to_string(),
            calories_per_100g: Some(calories),
            protein_per_100g: estimate.protein_per_100g,
            carbs_per_100g: estimate.carbs_per_100g,
            fat_per_100g: estimate.fat_per_100g,
            default_serving_g: None,
        };

        match store.insert(new_food).await {
            Ok(food) => Ok(Some(food)),
            Err(err) => {
                tracing::warn!(error = %err, food = name, "food insert failed");
                Ok(None)
            }
        }
    }
}
