use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{ApiJson, AppResult},
    models::{
        auth::AdminUser,
        schedule::{ExceptionalSchedule, ScheduleRequest},
    },
    services::schedules::ScheduleService,
    AppState,
};

pub async fn list_schedules(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<ExceptionalSchedule>>> {
    ScheduleService::list(&state.db).await.map(Json)
}

pub async fn create_schedule(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(body): ApiJson<ScheduleRequest>,
) -> AppResult<(StatusCode, Json<ExceptionalSchedule>)> {
    ScheduleService::create(&state.db, &body)
        .await
        .map(|schedule| (StatusCode::CREATED, Json(schedule)))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ExceptionalSchedule>> {
    ScheduleService::get(&state.db, id).await.map(Json)
}

pub async fn replace_schedule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<ScheduleRequest>,
) -> AppResult<Json<ExceptionalSchedule>> {
    ScheduleService::replace(&state.db, id, &body).await.map(Json)
}

pub async fn update_schedule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<ScheduleRequest>,
) -> AppResult<Json<ExceptionalSchedule>> {
    ScheduleService::update(&state.db, id, body).await.map(Json)
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    ScheduleService::delete(&state.db, id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
