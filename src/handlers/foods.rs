use axum::{
    extract::{Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    EnsureFoodRequest, EnsureFoodResponse, FoodResponse, SearchFoodsQuery, SearchFoodsResponse,
};
use crate::error::{AppError, AppResult};
use crate::resolver::ResolveError;
use crate::AppState;

/// Live-typing search cap.
const SEARCH_LIMIT: i64 = 20;
/// "Browse all" cap.
const BROWSE_LIMIT: i64 = 100;

pub async fn ensure_food(
    State(state): State<AppState>,
    Json(body): Json<EnsureFoodRequest>,
) -> AppResult<Json<EnsureFoodResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let food = state.resolver.resolve(&body.name).await.map_err(|err| match err {
        ResolveError::MissingName => AppError::Validation("missing name".into()),
    })?;

    Ok(Json(EnsureFoodResponse {
        food: food.map(FoodResponse::from),
    }))
}

pub async fn search_foods(
    State(state): State<AppState>,
    Query(query): Query<SearchFoodsQuery>,
) -> AppResult<Json<SearchFoodsResponse>> {
    let q = query.q.as_deref().unwrap_or("").trim();

    // No implicit full-table scan on every focus event: an empty query
    // returns nothing unless the browse-all flag asks for it.
    if q.is_empty() && !query.all {
        return Ok(Json(SearchFoodsResponse { items: vec![] }));
    }

    let limit = if query.all { BROWSE_LIMIT } else { SEARCH_LIMIT };

    let Some(store) = &state.store else {
        return Ok(Json(SearchFoodsResponse {
            items: demo_items(q, limit),
        }));
    };

    let items = match store.search_by_name_substring(q, limit).await {
        Ok(foods) => foods.into_iter().map(FoodResponse::from).collect(),
        Err(err) => {
            tracing::warn!(error = %err, query = q, "food search failed");
            vec![]
        }
    };

    Ok(Json(SearchFoodsResponse { items }))
}

/// Built-in foods served when no store is configured, so the UI stays
/// demonstrable without a database.
fn demo_items(fragment: &str, limit: i64) -> Vec<FoodResponse> {
    let needle = fragment.to_lowercase();
    demo_foods()
        .into_iter()
        .filter(|f| f.name.to_lowercase().contains(&needle))
        .take(limit as usize)
        .collect()
}

fn demo_foods() -> Vec<FoodResponse> {
    vec![
        demo_food(1, "Chole", 180.0, 150.0),
        demo_food(2, "Chole Chawal", 165.0, 300.0),
        demo_food(3, "Chole Bhature", 280.0, 250.0),
        demo_food(4, "Grilled Chicken", 165.0, 120.0),
        demo_food(5, "Paneer Tikka", 240.0, 120.0),
    ]
}

fn demo_food(n: u128, name: &str, calories_per_100g: f64, default_serving_g: f64) -> FoodResponse {
    FoodResponse {
        id: Uuid::from_u128(n),
        name: name.into(),
        calories_per_100g: Some(calories_per_100g),
        protein_per_100g: None,
        carbs_per_100g: None,
        fat_per_100g: None,
        default_serving_g: Some(default_serving_g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── demo fallback ────────────────────────────────────────────────────

    #[test]
    fn test_demo_items_filter_case_insensitively() {
        let items = demo_items("chole", SEARCH_LIMIT);
        let names: Vec<&str> = items.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Chole", "Chole Chawal", "Chole Bhature"]);
    }

    #[test]
    fn test_demo_items_empty_fragment_lists_everything() {
        assert_eq!(demo_items("", BROWSE_LIMIT).len(), demo_foods().len());
    }

    #[test]
    fn test_demo_items_respect_the_limit() {
        assert_eq!(demo_items("", 2).len(), 2);
    }

    #[test]
    fn test_demo_items_no_match_is_empty() {
        assert!(demo_items("sushi", SEARCH_LIMIT).is_empty());
    }

    #[test]
    fn test_demo_food_ids_are_stable() {
        let a = demo_foods();
        let b = demo_foods();
        assert_eq!(a[0].id, b[0].id);
    }
}
