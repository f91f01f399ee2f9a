use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::{error::ApiError, params::CreateParams, renderer::QrRenderer, web_pages};

#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<QrRenderer>,
}

impl AppState {
    pub fn new(renderer: QrRenderer) -> Self {
        Self {
            renderer: Arc::new(renderer),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(web_pages::index_page))
        .route("/create", get(create_qrcode))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn create_qrcode(
    State(state): State<AppState>,
    query: Result<Query<CreateParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let request = params.validate()?;
    let png = state
        .renderer
        .render(&request)
        .await
        .map_err(ApiError::generation)?;
    tracing::info!(
        border = request.border,
        box_size = request.box_size,
        with_logo = request.logo.is_some(),
        bytes = png.len(),
        "qr code generated"
    );
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
