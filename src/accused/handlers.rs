use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    accused::{
        dto::{AccusedInput, SearchRequest, StatsResponse},
        repo::AccusedRecord,
        seed, services,
    },
    auth::{extractors::AuthUser, role::Role},
    error::ApiError,
    photos::store::local_photo_filename,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accused", get(list_accused).post(create_accused))
        .route(
            "/accused/:id",
            get(get_accused).put(update_accused).delete(delete_accused),
        )
        .route("/search", post(search_accused))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/seed-data", post(seed_data))
}

/// Best-effort enrichment: a miss, a transport failure, or a timeout all
/// leave the record without coordinates and never fail the enclosing
/// create or update.
async fn resolve_coordinates(state: &AppState, address: &str) -> (Option<f64>, Option<f64>) {
    match state.geocoder.geocode(address).await {
        Ok(Some(coords)) => (Some(coords.latitude), Some(coords.longitude)),
        Ok(None) => {
            info!(%address, "geocoder had no match");
            (None, None)
        }
        Err(e) => {
            warn!(error = %e, "geocoding failed; storing record without coordinates");
            (None, None)
        }
    }
}

fn build_record(
    accused_id: Uuid,
    input: AccusedInput,
    coordinates: (Option<f64>, Option<f64>),
    created_at: OffsetDateTime,
    created_by: String,
) -> AccusedRecord {
    AccusedRecord {
        accused_id,
        full_name: input.full_name,
        phone_numbers: input.phone_numbers,
        address: input.address,
        fraud_amount: input.fraud_amount,
        case_id: input.case_id,
        fir_details: input.fir_details,
        police_station: input.police_station,
        tags: input.tags,
        profile_photo: input.profile_photo,
        latitude: coordinates.0,
        longitude: coordinates.1,
        manual_coordinates: input.manual_coordinates,
        created_at,
        created_by,
        updated_at: None,
        updated_by: None,
    }
}

#[instrument(skip(state, payload))]
pub async fn create_accused(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<AccusedInput>,
) -> Result<(StatusCode, Json<AccusedRecord>), ApiError> {
    identity.require(Role::Admin)?;
    services::validate(&payload)?;

    let coordinates = if services::should_geocode(None, &payload) {
        resolve_coordinates(&state, &payload.address).await
    } else {
        // Manual coordinates are stored verbatim.
        (payload.latitude, payload.longitude)
    };

    let record = build_record(
        Uuid::new_v4(),
        payload,
        coordinates,
        OffsetDateTime::now_utc(),
        identity.username.clone(),
    );
    state.accused.insert(&record).await?;

    info!(accused_id = %record.accused_id, created_by = %identity.username, "accused record created");
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state))]
pub async fn list_accused(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
) -> Result<Json<Vec<AccusedRecord>>, ApiError> {
    Ok(Json(state.accused.list().await?))
}

#[instrument(skip(state))]
pub async fn get_accused(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AccusedRecord>, ApiError> {
    let record = state
        .accused
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("Accused"))?;
    Ok(Json(record))
}

#[instrument(skip(state, payload))]
pub async fn update_accused(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccusedInput>,
) -> Result<Json<AccusedRecord>, ApiError> {
    identity.require(Role::Admin)?;
    services::validate(&payload)?;

    let old = state
        .accused
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("Accused"))?;

    let coordinates = if payload.manual_coordinates {
        (payload.latitude, payload.longitude)
    } else if services::should_geocode(Some(&old), &payload) {
        resolve_coordinates(&state, &payload.address).await
    } else {
        // Address unchanged and already resolved: carry the coordinates over.
        (old.latitude, old.longitude)
    };

    let mut record = build_record(id, payload, coordinates, old.created_at, old.created_by);
    record.updated_at = Some(OffsetDateTime::now_utc());
    record.updated_by = Some(identity.username.clone());

    if !state.accused.replace(&record).await? {
        return Err(ApiError::NotFound("Accused"));
    }

    info!(accused_id = %id, updated_by = %identity.username, "accused record updated");
    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn delete_accused(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    identity.require(Role::Superadmin)?;

    let record = state
        .accused
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("Accused"))?;

    if !state.accused.delete(id).await? {
        return Err(ApiError::NotFound("Accused"));
    }

    // Best-effort cascade: a locally stored profile photo goes with the
    // record. A missing file counts as already deleted.
    if let Some(filename) = record
        .profile_photo
        .as_deref()
        .and_then(local_photo_filename)
    {
        if let Err(e) = state.photos.delete(filename).await {
            warn!(error = %e, %filename, "failed to delete profile photo");
        }
    }

    info!(accused_id = %id, deleted_by = %identity.username, "accused record deleted");
    Ok(Json(serde_json::json!({
        "message": "Accused record deleted successfully"
    })))
}

#[instrument(skip(state, payload))]
pub async fn search_accused(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<Vec<AccusedRecord>>, ApiError> {
    let records = state.accused.list().await?;
    Ok(Json(services::run_search(records, &payload)))
}

#[instrument(skip(state))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let records = state.accused.list().await?;
    Ok(Json(services::compute_stats(&records)))
}

#[instrument(skip(state))]
pub async fn seed_data(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    identity.require(Role::Superadmin)?;

    state.accused.clear().await?;

    let samples = seed::sample_records();
    let count = samples.len();
    for input in samples {
        let coordinates = resolve_coordinates(&state, &input.address).await;
        let record = build_record(
            Uuid::new_v4(),
            input,
            coordinates,
            OffsetDateTime::now_utc(),
            "system".into(),
        );
        state.accused.insert(&record).await?;
    }

    info!(%count, seeded_by = %identity.username, "sample data seeded");
    Ok(Json(serde_json::json!({
        "message": format!("Successfully seeded {count} sample accused records")
    })))
}
