//! Preview server: the built output directory plus the search and stats API.

mod api;
mod middleware;
mod public;

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::stats::StatsService;

#[derive(Clone)]
pub struct ServerState {
    pub output_dir: Arc<PathBuf>,
    pub stats: Arc<StatsService>,
    pub max_results: usize,
}

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/api/search", get(api::search))
        .route("/api/stats/{kind}/{slug}", get(api::stats))
        .route("/api/stats/{kind}/{slug}/{counter}", post(api::increment_stats))
        .fallback(public::serve_output)
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::log_responses))
}

#[cfg(test)]
mod tests;
