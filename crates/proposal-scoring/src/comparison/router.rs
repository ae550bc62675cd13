use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ProposalIndicatorMap;
use super::scoring::WeightConfig;
use super::service::{ComparisonService, ComparisonServiceError, ProposalDocument};

/// Router builder exposing extraction, matching, and scoring endpoints.
pub fn comparison_router(service: Arc<ComparisonService>) -> Router {
    Router::new()
        .route("/api/v1/indicators", get(indicators_handler))
        .route("/api/v1/extract", post(extract_handler))
        .route("/api/v1/match", post(match_handler))
        .route("/api/v1/score", post(score_handler))
        .route("/api/v1/compare", post(compare_handler))
        .route("/api/v1/sheets", post(sheet_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchRequest {
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    proposals: Vec<ProposalIndicatorMap>,
    #[serde(default)]
    indicators: Option<Vec<String>>,
    #[serde(default)]
    weights: WeightConfig,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareRequest {
    documents: Vec<ProposalDocument>,
    #[serde(default)]
    indicators: Option<Vec<String>>,
    #[serde(default)]
    weights: WeightConfig,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SheetRequest {
    csv: String,
    #[serde(default)]
    indicators: Option<Vec<String>>,
    #[serde(default)]
    weights: WeightConfig,
}

pub(crate) async fn indicators_handler(State(service): State<Arc<ComparisonService>>) -> Response {
    (StatusCode::OK, axum::Json(service.registry().to_document())).into_response()
}

pub(crate) async fn extract_handler(
    State(service): State<Arc<ComparisonService>>,
    axum::Json(document): axum::Json<ProposalDocument>,
) -> Response {
    let map = service.extract(&document);
    (StatusCode::OK, axum::Json(map)).into_response()
}

pub(crate) async fn match_handler(
    State(service): State<Arc<ComparisonService>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response {
    let payload = json!({
        "matches": service.match_labels(&request.labels),
        "batch": service.match_batch(&request.labels),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn score_handler(
    State(service): State<Arc<ComparisonService>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response {
    match service.score(
        &request.proposals,
        request.indicators.as_deref(),
        &request.weights,
    ) {
        Ok(board) => {
            let payload = json!({
                "ranking": board.ranking(),
                "cells": board.cells,
                "aggregates": board.aggregates,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn compare_handler(
    State(service): State<Arc<ComparisonService>>,
    axum::Json(request): axum::Json<CompareRequest>,
) -> Response {
    match service.compare(
        &request.documents,
        request.indicators.as_deref(),
        &request.weights,
    ) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sheet_handler(
    State(service): State<Arc<ComparisonService>>,
    axum::Json(request): axum::Json<SheetRequest>,
) -> Response {
    let sheet = match service.import_sheet(request.csv.as_bytes()) {
        Ok(sheet) => sheet,
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.report(
        sheet.proposals,
        request.indicators.as_deref(),
        &request.weights,
    ) {
        Ok(report) => {
            let payload = json!({
                "report": report,
                "unresolved_labels": sheet.unresolved_labels,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: ComparisonServiceError) -> Response {
    let status = match error {
        ComparisonServiceError::Registry(_) => StatusCode::BAD_REQUEST,
        ComparisonServiceError::Scoring(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
