use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::schedule::{ExceptionalSchedule, NewSchedule, ScheduleRequest},
    services::schedule_rules,
};

const COLUMNS: &str = "id, schedule_type, start_date, end_date, moment, created_at";

pub struct ScheduleService;

impl ScheduleService {
    pub async fn list(pool: &PgPool) -> AppResult<Vec<ExceptionalSchedule>> {
        let schedules = sqlx::query_as::<_, ExceptionalSchedule>(&format!(
            "SELECT {COLUMNS} FROM exceptional_schedules ORDER BY start_date, id"
        ))
        .fetch_all(pool)
        .await?;
        Ok(schedules)
    }

    pub async fn get(pool: &PgPool, id: i64) -> AppResult<ExceptionalSchedule> {
        sqlx::query_as::<_, ExceptionalSchedule>(&format!(
            "SELECT {COLUMNS} FROM exceptional_schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn create(pool: &PgPool, req: &ScheduleRequest) -> AppResult<ExceptionalSchedule> {
        let schedule = schedule_rules::validate(req)?;

        let mut tx = pool.begin().await?;
        Self::ensure_no_overlap(&mut tx, &schedule, None).await?;
        let created = sqlx::query_as::<_, ExceptionalSchedule>(&format!(
            "INSERT INTO exceptional_schedules (schedule_type, start_date, end_date, moment)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(schedule.schedule_type.as_str())
        .bind(schedule.start_date)
        .bind(schedule.end_date)
        .bind(schedule.moment.as_str())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(
            id = created.id,
            schedule_type = %created.schedule_type,
            start_date = %created.start_date,
            "Exceptional schedule created"
        );
        Ok(created)
    }

    /// Full replacement (PUT).
    pub async fn replace(
        pool: &PgPool,
        id: i64,
        req: &ScheduleRequest,
    ) -> AppResult<ExceptionalSchedule> {
        // 404 takes precedence over validation errors.
        Self::get(pool, id).await?;
        let schedule = schedule_rules::validate(req)?;
        Self::write(pool, id, &schedule).await
    }

    /// Partial update (PATCH): missing fields come from the stored record.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        req: ScheduleRequest,
    ) -> AppResult<ExceptionalSchedule> {
        let existing = Self::get(pool, id).await?;
        let schedule = schedule_rules::validate(&req.merged_with(&existing))?;
        Self::write(pool, id, &schedule).await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM exceptional_schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(id, "Exceptional schedule deleted");
        Ok(())
    }

    async fn write(pool: &PgPool, id: i64, schedule: &NewSchedule) -> AppResult<ExceptionalSchedule> {
        let mut tx = pool.begin().await?;
        Self::ensure_no_overlap(&mut tx, schedule, Some(id)).await?;
        let updated = sqlx::query_as::<_, ExceptionalSchedule>(&format!(
            "UPDATE exceptional_schedules
             SET schedule_type = $1, start_date = $2, end_date = $3, moment = $4
             WHERE id = $5
             RETURNING {COLUMNS}"
        ))
        .bind(schedule.schedule_type.as_str())
        .bind(schedule.start_date)
        .bind(schedule.end_date)
        .bind(schedule.moment.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;
        tx.commit().await?;

        tracing::info!(id, "Exceptional schedule updated");
        Ok(updated)
    }

    /// Reject the write if any other stored range shares at least one day
    /// with it. Entries without an end date count as one-day ranges.
    ///
    /// The exclusion constraint on the table still guards concurrent writers
    /// that pass this check at the same time.
    async fn ensure_no_overlap(
        tx: &mut Transaction<'_, Postgres>,
        schedule: &NewSchedule,
        exclude_id: Option<i64>,
    ) -> AppResult<()> {
        if Self::overlaps(tx, schedule.start_date, schedule.effective_end(), exclude_id).await? {
            return Err(schedule_rules::overlap_error());
        }
        Ok(())
    }

    async fn overlaps(
        tx: &mut Transaction<'_, Postgres>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM exceptional_schedules
                 WHERE start_date <= $1
                   AND COALESCE(end_date, start_date) >= $2
                   AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(end_date)
        .bind(start_date)
        .bind(exclude_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(exists)
    }
}
