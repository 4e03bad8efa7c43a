use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Any value can be set by an admin at any time; there is no workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Accepted => "accepted",
            ReservationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i32,
    /// Stored as TEXT, one of pending / accepted / rejected.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Body for POST /reservations/, PUT /reservations/{id}/ and POST /bookings/.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservationRequest {
    #[validate(length(min = 1, max = 100, message = "Le nom doit contenir entre 1 et 100 caractères."))]
    pub name: String,
    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,
    #[validate(length(max = 20, message = "Le téléphone ne peut pas dépasser 20 caractères."))]
    pub phone: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[validate(range(min = 1, message = "Le nombre de couverts doit être au moins 1."))]
    pub party_size: i32,
    #[serde(default)]
    pub status: ReservationStatus,
}

/// Body for PATCH /reservations/{id}/.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateReservationRequest {
    #[validate(length(min = 1, max = 100, message = "Le nom doit contenir entre 1 et 100 caractères."))]
    pub name: Option<String>,
    #[validate(email(message = "Adresse email invalide."))]
    pub email: Option<String>,
    /// Absent keeps the stored phone, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 20, message = "Le téléphone ne peut pas dépasser 20 caractères."))]
    pub phone: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    #[validate(range(min = 1, message = "Le nombre de couverts doit être au moins 1."))]
    pub party_size: Option<i32>,
    pub status: Option<ReservationStatus>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
