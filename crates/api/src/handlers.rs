//! Route handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use kba_core::AppError;
use kba_knowledge::{SearchQuery, SearchResult};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// `GET /api/search`
pub async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Query(params) = params?;

    let mut query = SearchQuery::new(params.query);
    if let Some(category) = params.category {
        query = query.with_category(category);
    }
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }

    let store = state.store.clone();
    let results = tokio::task::spawn_blocking(move || store.search(&query)).await??;

    Ok(Json(SearchResponse { results }))
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub context_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub used_article_ids: Vec<i64>,
}

/// `POST /api/ask`
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<AskResponse>> {
    let Json(request) = body?;

    if request.context_ids.is_empty() {
        return Err(AppError::Validation("context_ids is required".to_string()).into());
    }
    if request.question.trim().is_empty() {
        return Err(AppError::Validation("question is required".to_string()).into());
    }

    // Fails fast on a missing credential, before any storage or provider work
    let generator = state.answer_generator()?;

    let store = state.store.clone();
    let ids = request.context_ids.clone();
    let articles = tokio::task::spawn_blocking(move || store.fetch_contexts(&ids)).await??;

    if articles.is_empty() {
        return Err(AppError::NotFound(format!(
            "None of the requested articles exist: {:?}",
            request.context_ids
        ))
        .into());
    }

    let answer = generator.generate(&request.question, &articles).await?;

    Ok(Json(AskResponse {
        answer: answer.text,
        used_article_ids: answer.used_article_ids,
    }))
}
