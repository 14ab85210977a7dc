use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateEntryRequest, DayResponse, DeleteResponse};
use crate::error::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::AppState;

pub async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    body.validate_amounts().map_err(AppError::Validation)?;

    let entry = Entry::confirm(&body.into_confirmation(), Utc::now().date_naive());
    state.ledger.add(entry.clone()).await;

    Ok(Json(entry))
}

pub async fn list_entries(State(state): State<AppState>) -> AppResult<Json<DayResponse>> {
    let (entries, by_meal, totals) = state.ledger.snapshot().await;
    Ok(Json(DayResponse {
        entries,
        by_meal,
        totals,
    }))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.ledger.remove(id).await;
    if !deleted {
        tracing::debug!(entry_id = %id, "delete of unknown entry ignored");
    }
    Ok(Json(DeleteResponse { deleted, id }))
}
