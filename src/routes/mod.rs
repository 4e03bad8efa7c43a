pub mod auth;
pub mod health;
pub mod password_reset;
pub mod reservations;
pub mod schedules;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{middleware::auth::JwtSecret, AppState};

/// Build the full application router: every route plus the JWT secret
/// extension, request tracing and CORS.
pub fn router(state: AppState) -> Router {
    let jwt_secret = JwtSecret(state.config.jwt_secret.clone());

    let origins: Vec<HeaderValue> = state
        .config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::list(origins));

    Router::new()
        .route("/", get(health::api_root))
        .route("/health", get(health::health_check))
        // Auth
        .route("/login/", post(auth::login))
        .route("/token/refresh/", post(auth::refresh_token))
        .route("/check-admin/", get(auth::check_admin))
        // Password reset
        .route("/password-reset/", post(password_reset::request_reset))
        .route("/password-reset/{user_id}/{token}/", post(password_reset::confirm_reset))
        // Exceptional schedules
        .route(
            "/schedules/",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route(
            "/schedules/{id}/",
            get(schedules::get_schedule)
                .put(schedules::replace_schedule)
                .patch(schedules::update_schedule)
                .delete(schedules::delete_schedule),
        )
        // Reservations
        .route(
            "/reservations/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservations/{id}/",
            get(reservations::get_reservation)
                .put(reservations::replace_reservation)
                .patch(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .route("/bookings/", post(reservations::submit_booking))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
