use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::ServerState;
use crate::{
    application::{
        error::{AppError, HttpError},
        search::{SearchData, search as run_search},
        site::SEARCH_DATA_FILE,
    },
    domain::types::{ContentKind, StatCounter},
    infra::error::InfraError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    q: String,
    limit: Option<usize>,
}

pub async fn search(State(state): State<ServerState>, Query(query): Query<SearchQuery>) -> Response {
    let limit = query
        .limit
        .unwrap_or(state.max_results)
        .clamp(1, state.max_results);

    match load_search_data(&state).await {
        Ok(data) => Json(run_search(&data, &query.q, limit)).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn load_search_data(state: &ServerState) -> Result<SearchData, AppError> {
    let path = state.output_dir.join(SEARCH_DATA_FILE);
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::unavailable(
                "search index has not been built; run `inkpress build` first",
            ));
        }
        Err(err) => return Err(InfraError::path(path.display(), err).into()),
    };
    serde_json::from_str(&contents)
        .map_err(|err| AppError::unexpected(format!("invalid {SEARCH_DATA_FILE}: {err}")))
}

pub async fn stats(
    State(state): State<ServerState>,
    Path((kind, slug)): Path<(String, String)>,
) -> Response {
    let result = async {
        let kind: ContentKind = kind.parse()?;
        state.stats.get(kind, &slug).await
    }
    .await;
    respond(result, StatusCode::OK)
}

pub async fn increment_stats(
    State(state): State<ServerState>,
    Path((kind, slug, counter)): Path<(String, String, String)>,
) -> Response {
    let result = async {
        let kind: ContentKind = kind.parse()?;
        let counter: StatCounter = counter.parse()?;
        state.stats.increment(kind, &slug, counter).await
    }
    .await;
    respond(result, StatusCode::OK)
}

fn respond<T: serde::Serialize>(result: Result<T, AppError>, status: StatusCode) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}
