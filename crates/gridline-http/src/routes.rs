use axum::Router;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/tables", get(handlers::list_tables))
        .route("/tables/{name}", get(handlers::render_table))
        .route("/tables/{name}/export/{format}", get(handlers::export_table))
        .with_state(state)
}
