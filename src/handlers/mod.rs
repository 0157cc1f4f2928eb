pub mod bookings;
pub mod contact;
pub mod health;
pub mod services;
pub mod shell;
pub mod theme;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The JSON API, with every other path answered by the offline shell.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/bookings/:id/complete",
            post(bookings::complete_booking),
        )
        .route("/api/bookings/:id", delete(bookings::delete_booking))
        .route(
            "/api/services",
            get(services::list_services).post(services::add_service),
        )
        .route("/api/services/:id", delete(services::remove_service))
        .route("/api/theme", get(theme::get_theme).post(theme::set_theme))
        .route("/api/theme/toggle", post(theme::toggle_theme))
        .route("/api/contact", get(contact::contact))
        .fallback(shell::serve)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
