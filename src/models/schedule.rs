use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Whether the restaurant exceptionally opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Open,
    Closed,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Open => "open",
            ScheduleType::Closed => "closed",
        }
    }
}

impl std::str::FromStr for ScheduleType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ScheduleType::Open),
            "closed" => Ok(ScheduleType::Closed),
            _ => Err(anyhow::anyhow!("Unknown schedule type: {s}")),
        }
    }
}

/// Portion of the day affected by a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Moment {
    FullDay,
    Lunch,
    Dinner,
}

impl Moment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Moment::FullDay => "full_day",
            Moment::Lunch => "lunch",
            Moment::Dinner => "dinner",
        }
    }
}

impl std::str::FromStr for Moment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_day" => Ok(Moment::FullDay),
            "lunch" => Ok(Moment::Lunch),
            "dinner" => Ok(Moment::Dinner),
            _ => Err(anyhow::anyhow!("Unknown moment: {s}")),
        }
    }
}

/// Write-only flag telling how start/end dates must be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    Single,
    Range,
}

impl std::str::FromStr for ScheduleMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(ScheduleMode::Single),
            "range" => Ok(ScheduleMode::Range),
            _ => Err(anyhow::anyhow!("Unknown schedule mode: {s}")),
        }
    }
}

/// DB row. Type and moment are TEXT columns guarded by CHECK constraints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExceptionalSchedule {
    pub id: i64,
    #[serde(rename = "type")]
    pub schedule_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub moment: String,
    pub created_at: DateTime<Utc>,
}

/// Body for POST/PUT/PATCH /schedules/.
///
/// Choices are kept as raw strings so that unknown values surface as
/// field-tagged validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleRequest {
    #[serde(rename = "type")]
    pub schedule_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub moment: Option<String>,
    pub mode: Option<String>,
}

impl ScheduleRequest {
    /// Fill the fields missing from a partial update with the stored ones.
    ///
    /// `mode` is never inherited. In single mode the stored end date is
    /// dropped, so switching a range back to a single day works.
    pub fn merged_with(self, existing: &ExceptionalSchedule) -> ScheduleRequest {
        let end_date = match self.mode.as_deref() {
            Some("range") => self.end_date.or(existing.end_date),
            _ => self.end_date,
        };
        ScheduleRequest {
            schedule_type: self
                .schedule_type
                .or_else(|| Some(existing.schedule_type.clone())),
            start_date: self.start_date.or(Some(existing.start_date)),
            end_date,
            moment: self.moment.or_else(|| Some(existing.moment.clone())),
            mode: self.mode,
        }
    }
}

/// A schedule write that passed every structural and weekday rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub schedule_type: ScheduleType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub moment: Moment,
}

impl NewSchedule {
    /// Last day covered, inclusive. A single-day entry ends where it starts.
    pub fn effective_end(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }
}
