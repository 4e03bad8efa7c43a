//! Rules every exceptional-schedule write must satisfy before it reaches the
//! store. Everything here is pure; the overlap lookup lives in
//! [`ScheduleService`](super::schedules::ScheduleService) and runs last.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::{
    error::{AppError, AppResult},
    models::schedule::{Moment, NewSchedule, ScheduleMode, ScheduleRequest, ScheduleType},
};

pub const OVERLAP_MESSAGE: &str =
    "Cette période chevauche une ouverture ou une fermeture exceptionnelle existante.";

pub fn overlap_error() -> AppError {
    AppError::validation("detail", OVERLAP_MESSAGE)
}

/// Check structure, mode and weekday rules, in that order, and return the
/// schedule to persist. The first failing rule wins.
pub fn validate(req: &ScheduleRequest) -> AppResult<NewSchedule> {
    let mode: ScheduleMode = req
        .mode
        .as_deref()
        .ok_or_else(|| AppError::validation("mode", "Le mode est requis ('single' ou 'range')."))?
        .parse()
        .map_err(|_| AppError::validation("mode", "Mode invalide. Doit être 'single' ou 'range'."))?;

    let raw_type = req
        .schedule_type
        .as_deref()
        .ok_or_else(|| AppError::validation("type", "Le type est requis."))?;

    let start_date = req
        .start_date
        .ok_or_else(|| AppError::validation("start_date", "La date de début est requise."))?;

    let requested_moment = req
        .moment
        .as_deref()
        .map(|m| {
            m.parse::<Moment>().map_err(|_| {
                AppError::validation(
                    "moment",
                    "Moment invalide. Doit être 'full_day', 'lunch' ou 'dinner'.",
                )
            })
        })
        .transpose()?;

    let (end_date, moment) = match mode {
        ScheduleMode::Single => {
            if req.end_date.is_some() {
                return Err(AppError::validation(
                    "end_date",
                    "La date de fin ne doit pas être spécifiée pour une date précise.",
                ));
            }
            let moment = requested_moment.ok_or_else(|| {
                AppError::validation(
                    "moment",
                    "Le moment (midi, soir, journée entière) est requis pour une date précise.",
                )
            })?;
            (None, moment)
        }
        ScheduleMode::Range => {
            let end_date = req.end_date.ok_or_else(|| {
                AppError::validation("end_date", "La date de fin est requise pour une période.")
            })?;
            if end_date < start_date {
                return Err(AppError::validation(
                    "end_date",
                    "La date de fin ne peut pas être antérieure à la date de début.",
                ));
            }
            // Periods always cover whole days.
            (Some(end_date), Moment::FullDay)
        }
    };

    let schedule_type: ScheduleType = raw_type.parse().map_err(|_| {
        AppError::validation("type", "Type invalide. Doit être 'open' ou 'closed'.")
    })?;
    check_weekday(schedule_type, start_date)?;

    Ok(NewSchedule {
        schedule_type,
        start_date,
        end_date,
        moment,
    })
}

/// The restaurant normally closes Sunday and Monday: exceptional openings
/// start on one of those days, exceptional closings on any other.
fn check_weekday(schedule_type: ScheduleType, start_date: NaiveDate) -> AppResult<()> {
    let usually_closed = matches!(start_date.weekday(), Weekday::Sun | Weekday::Mon);
    match schedule_type {
        ScheduleType::Open if !usually_closed => Err(AppError::validation(
            "start_date",
            "Une ouverture exceptionnelle doit être un dimanche ou un lundi.",
        )),
        ScheduleType::Closed if usually_closed => Err(AppError::validation(
            "start_date",
            "Une fermeture exceptionnelle doit être un jour de semaine (mardi à samedi).",
        )),
        _ => Ok(()),
    }
}
