pub mod auth;
pub mod password_reset;
pub mod reservation;
pub mod schedule;
pub mod user;
