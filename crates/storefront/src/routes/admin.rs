//! Catalog administration handlers.
//!
//! Forms are validated in full before the data service is contacted.

use axum::{Json, extract::State, http::StatusCode};
use legora_core::catalog::{CategoryForm, ProductForm};
use legora_core::{CategoryId, ProductId};
use serde::Serialize;
use tracing::{info, instrument};

use crate::backend::CatalogBackend;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedProduct {
    pub id: ProductId,
    pub stock: u32,
}

#[derive(Debug, Serialize)]
pub struct CreatedCategory {
    pub id: CategoryId,
    pub slug: String,
}

#[instrument(skip(state, form))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<CreatedProduct>)> {
    let draft = form.validate()?;
    let id = state.backend().create_product(&draft).await?;
    info!(product = %id, sizes = draft.sizes.len(), "product created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedProduct {
            id,
            stock: draft.total_stock(),
        }),
    ))
}

#[instrument(skip(state, form))]
pub async fn create_category(
    State(state): State<AppState>,
    Json(form): Json<CategoryForm>,
) -> Result<(StatusCode, Json<CreatedCategory>)> {
    let draft = form.validate()?;
    let id = state.backend().create_category(&draft).await?;
    info!(category = %id, slug = %draft.slug, "category created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedCategory {
            id,
            slug: draft.slug,
        }),
    ))
}
