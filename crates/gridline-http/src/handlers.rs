//! HTTP endpoint handlers

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use serde::Serialize;

use gridline_interchange::{ExportBody, ExportFormat};
use gridline_services::{RawParams, TableResponse};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn list_tables(State(state): State<AppState>) -> Json<TablesResponse> {
    Json(TablesResponse {
        tables: state.tables().names().into_iter().map(String::from).collect(),
    })
}

/// Render one page of a table
pub async fn render_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<RawParams>,
) -> Result<Json<TableResponse>, AppError> {
    let table = state.tables().get(&name)?;
    let response = state.service().render(table.as_ref(), &params).await?;
    Ok(Json(response))
}

/// Download a table export as an attachment
pub async fn export_table(
    State(state): State<AppState>,
    Path((name, format)): Path<(String, String)>,
    Query(params): Query<RawParams>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse()?;
    let table = state.tables().get(&name)?;
    let payload = state.exports().export(table.as_ref(), &params, format).await?;

    let body = match payload.body {
        ExportBody::Bytes(bytes) => Body::from(bytes),
        ExportBody::Stream(stream) => {
            let table = name.clone();
            // Headers are already sent; a failure can only truncate the body
            Body::from_stream(stream.inspect_err(move |e| {
                tracing::error!(table = %table, error = %e, "export stream aborted");
            }))
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", payload.filename);
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(payload.content_type),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::BadRequest(format!("invalid export filename: {}", e)))?,
    );
    Ok(response)
}
