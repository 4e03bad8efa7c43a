use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{ApiJson, AppResult},
    middleware::rate_limit::check_rate_limit,
    models::{
        auth::AdminUser,
        reservation::{CreateReservationRequest, Reservation, UpdateReservationRequest},
    },
    services::reservations::ReservationService,
    AppState,
};

pub async fn list_reservations(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<Reservation>>> {
    ReservationService::list(&state.db).await.map(Json)
}

pub async fn create_reservation(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(body): ApiJson<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    ReservationService::create(&state.db, &body)
        .await
        .map(|reservation| (StatusCode::CREATED, Json(reservation)))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    ReservationService::get(&state.db, id).await.map(Json)
}

pub async fn replace_reservation(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<CreateReservationRequest>,
) -> AppResult<Json<Reservation>> {
    ReservationService::replace(&state.db, id, &body).await.map(Json)
}

pub async fn update_reservation(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateReservationRequest>,
) -> AppResult<Json<Reservation>> {
    ReservationService::update(&state.db, id, &body).await.map(Json)
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    ReservationService::delete(&state.db, id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

/// POST /bookings/: public booking form. Always stored as pending.
pub async fn submit_booking(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    // Rate limit: 5 bookings per hour per email
    let rate_key = format!("rate:booking:{}", body.email.trim().to_lowercase());
    check_rate_limit(state.redis.as_ref(), &rate_key, 5, 3600).await?;

    ReservationService::submit_booking(&state.db, body)
        .await
        .map(|reservation| (StatusCode::CREATED, Json(reservation)))
}
