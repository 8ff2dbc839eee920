//! Rider API Handlers
//!
//! Rider profiles originate in the fleet service; this surface covers what
//! the fulfillment core itself needs: profile mirroring and the presence
//! flags the dispatch probe reads. A rider coming online triggers a backlog
//! sweep so waiting orders reach the fresh courier immediately.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::auth::CurrentActor;
use crate::core::AppState;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ActorRole, GeoPoint, RiderProfile, VehicleType};

/// Upsert request body (admin only)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRiderRequest {
    pub name: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// PUT /riders/{id}
pub async fn upsert(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<UpsertRiderRequest>,
) -> AppResult<Json<RiderProfile>> {
    if actor.role != ActorRole::Admin {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            "only admins may register riders",
        ));
    }

    // Preserve existing flags on re-registration
    let existing = state.storage.get_rider(&id)?;
    let rider = RiderProfile {
        id: id.clone(),
        name: payload.name,
        phone: payload.phone,
        vehicle_type: payload.vehicle_type,
        online: existing.as_ref().map(|r| r.online).unwrap_or(false),
        available: existing.as_ref().map(|r| r.available).unwrap_or(true),
        location: payload.location.or(existing.and_then(|r| r.location)),
        updated_at: shared::util::now_millis(),
    };
    state.storage.upsert_rider(&rider)?;
    Ok(Json(rider))
}

/// Presence report body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRequest {
    pub online: bool,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// PATCH /riders/{id}/presence - rider self-report (or admin override)
///
/// Coming online kicks off a backlog sweep on the background path: orders
/// that found no courier earlier get re-offered right away.
pub async fn update_presence(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<PresenceRequest>,
) -> AppResult<Json<RiderProfile>> {
    let self_report = actor.role == ActorRole::Rider && actor.id == id;
    if !self_report && actor.role != ActorRole::Admin {
        return Err(AppError::permission_denied(
            "riders may only report their own presence",
        ));
    }

    state
        .storage
        .set_rider_online(&id, payload.online, payload.location)?;
    let rider = state
        .storage
        .get_rider(&id)?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::RiderNotFound, format!("rider {} not found", id))
        })?;

    if payload.online {
        let dispatcher = state.dispatcher.clone();
        tokio::spawn(async move {
            dispatcher.sweep_backlog().await;
        });
    }

    Ok(Json(rider))
}
