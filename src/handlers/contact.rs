use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::services::handoff::{self, BOOK_NOW_GREETING};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    phone: String,
    book_now_link: String,
}

pub async fn contact(State(state): State<Arc<AppState>>) -> Json<ContactResponse> {
    let phone = &state.config.business_phone;
    Json(ContactResponse {
        phone: phone.clone(),
        book_now_link: handoff::book_now_link(phone, BOOK_NOW_GREETING),
    })
}
