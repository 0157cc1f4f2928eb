use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{NewService, Service};
use crate::state::AppState;

/// A service plus the text the dashboard copies to share it.
#[derive(Serialize)]
pub struct ServiceView {
    #[serde(flatten)]
    pub service: Service,
    pub summary: String,
}

impl From<Service> for ServiceView {
    fn from(service: Service) -> Self {
        let summary = service.summary();
        Self { service, summary }
    }
}

// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceView>>, AppError> {
    let services = state.store()?.services().to_vec();
    Ok(Json(services.into_iter().map(ServiceView::from).collect()))
}

// POST /api/services
pub async fn add_service(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewService>,
) -> Result<(StatusCode, Json<ServiceView>), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::Invalid("Service name is required".to_string()));
    }
    let service = state.store()?.add_service(input)?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

// DELETE /api/services/:id
pub async fn remove_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = state.store()?.remove_service(&id)?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}
