use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Palette, Theme};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ThemeResponse {
    theme: Theme,
    palette: Palette,
}

impl From<Theme> for ThemeResponse {
    fn from(theme: Theme) -> Self {
        Self {
            theme,
            palette: theme.palette(),
        }
    }
}

#[derive(Deserialize)]
pub struct SetThemeRequest {
    pub theme: String,
}

// GET /api/theme
pub async fn get_theme(State(state): State<Arc<AppState>>) -> Result<Json<ThemeResponse>, AppError> {
    Ok(Json(state.store()?.theme().into()))
}

// POST /api/theme
pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetThemeRequest>,
) -> Result<Json<ThemeResponse>, AppError> {
    let theme = Theme::parse(&req.theme)
        .ok_or_else(|| AppError::Invalid(format!("Unknown theme: {}", req.theme)))?;
    Ok(Json(state.store()?.set_theme(theme)?.into()))
}

// POST /api/theme/toggle
pub async fn toggle_theme(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ThemeResponse>, AppError> {
    Ok(Json(state.store()?.toggle_theme()?.into()))
}
