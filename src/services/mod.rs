pub mod auth;
pub mod cron;
pub mod email;
pub mod password_reset;
pub mod reservations;
pub mod schedule_rules;
pub mod schedules;
