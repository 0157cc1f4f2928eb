use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, BookingFilter, NewBooking};
use crate::services::handoff;
use crate::state::AppState;

/// A booking as the dashboard lists it, with its WhatsApp chat link.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub chat_link: String,
}

impl From<Booking> for BookingView {
    fn from(booking: Booking) -> Self {
        let chat_link = handoff::chat_link(&booking.phone);
        Self { booking, chat_link }
    }
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let filter = query
        .status
        .as_deref()
        .map(BookingFilter::parse)
        .unwrap_or(BookingFilter::All);

    let bookings = state.store()?.bookings(filter);
    Ok(Json(bookings.into_iter().map(BookingView::from).collect()))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewBooking>,
) -> Result<(StatusCode, Json<BookingView>), AppError> {
    let booking = state.store()?.create_booking(input)?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

// POST /api/bookings/:id/complete
#[derive(Serialize)]
pub struct CompleteResponse {
    /// Whether this call moved the booking to completed.
    completed: bool,
    booking: Option<BookingView>,
}

/// Unknown ids and already-completed bookings are no-ops.
pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CompleteResponse>, AppError> {
    let mut store = state.store()?;
    let completed = store.complete_booking(&id)?;
    Ok(Json(CompleteResponse {
        completed,
        booking: store.booking(&id).cloned().map(BookingView::from),
    }))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.store()?.delete_booking(&id)?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
