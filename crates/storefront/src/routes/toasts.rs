//! Toast route handlers.

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::session::{Toast, ToastId, ToastKind, ToastOptions};
use crate::state::AppState;

/// New toast request. `duration` is in milliseconds.
#[derive(Debug, Deserialize)]
pub struct NewToast {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<ToastKind>,
    pub duration: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: ToastId,
}

/// Toasts currently on screen, oldest first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<Toast>> {
    Json(state.toasts().visible())
}

#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewToast>,
) -> (StatusCode, Json<Created>) {
    let options = ToastOptions {
        kind: req.kind,
        duration: req.duration.map(Duration::from_millis),
    };
    let id = state.toasts().push(req.message, options);
    (StatusCode::CREATED, Json(Created { id }))
}

#[instrument(skip(state))]
pub async fn dismiss(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode> {
    if state.toasts().dismiss(ToastId::new(id)) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("toast {id}")))
    }
}
