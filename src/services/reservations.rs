use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{
        CreateReservationRequest, Reservation, ReservationStatus, UpdateReservationRequest,
    },
};

const COLUMNS: &str = "id, name, email, phone, date, time, party_size, status, created_at";

pub struct ReservationService;

impl ReservationService {
    /// Most recent bookings first.
    pub async fn list(pool: &PgPool) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {COLUMNS} FROM reservations ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(pool)
        .await?;
        Ok(reservations)
    }

    pub async fn get(pool: &PgPool, id: i64) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn create(pool: &PgPool, req: &CreateReservationRequest) -> AppResult<Reservation> {
        req.validate()?;
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "INSERT INTO reservations (name, email, phone, date, time, party_size, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(req.name.trim())
        .bind(req.email.trim())
        .bind(&req.phone)
        .bind(req.date)
        .bind(req.time)
        .bind(req.party_size)
        .bind(req.status.as_str())
        .fetch_one(pool)
        .await?;
        tracing::info!(id = reservation.id, date = %reservation.date, "Reservation created");
        Ok(reservation)
    }

    /// Public booking: always lands as pending, whatever the caller sent.
    pub async fn submit_booking(
        pool: &PgPool,
        mut req: CreateReservationRequest,
    ) -> AppResult<Reservation> {
        req.status = ReservationStatus::Pending;
        Self::create(pool, &req).await
    }

    /// Full replacement (PUT).
    pub async fn replace(
        pool: &PgPool,
        id: i64,
        req: &CreateReservationRequest,
    ) -> AppResult<Reservation> {
        req.validate()?;
        sqlx::query_as::<_, Reservation>(&format!(
            "UPDATE reservations
             SET name = $1, email = $2, phone = $3, date = $4, time = $5,
                 party_size = $6, status = $7
             WHERE id = $8
             RETURNING {COLUMNS}"
        ))
        .bind(req.name.trim())
        .bind(req.email.trim())
        .bind(&req.phone)
        .bind(req.date)
        .bind(req.time)
        .bind(req.party_size)
        .bind(req.status.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// Partial update (PATCH). Status transitions are unrestricted.
    ///
    /// `phone` is the only nullable column: a `null` in the body clears it.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        req: &UpdateReservationRequest,
    ) -> AppResult<Reservation> {
        req.validate()?;
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "UPDATE reservations
             SET name = COALESCE($1, name),
                 email = COALESCE($2, email),
                 phone = CASE WHEN $3 THEN $4 ELSE phone END,
                 date = COALESCE($5, date),
                 time = COALESCE($6, time),
                 party_size = COALESCE($7, party_size),
                 status = COALESCE($8, status)
             WHERE id = $9
             RETURNING {COLUMNS}"
        ))
        .bind(req.name.as_deref().map(str::trim))
        .bind(req.email.as_deref().map(str::trim))
        .bind(req.phone.is_some())
        .bind(req.phone.as_ref().and_then(|p| p.as_deref()))
        .bind(req.date)
        .bind(req.time)
        .bind(req.party_size)
        .bind(req.status.map(|s| s.as_str()))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;
        tracing::info!(id, status = %reservation.status, "Reservation updated");
        Ok(reservation)
    }

    pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(id, "Reservation deleted");
        Ok(())
    }
}
