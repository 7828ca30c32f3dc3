//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::snapshot::normalize_code;
use crate::core::{CrossRateError, QueryError, RateQuery, RefreshError, RefreshService};

/// Application state shared across handlers.
pub struct AppState {
    pub refresh: Arc<RefreshService>,
    pub query: RateQuery,
}

/// Query failures rendered as JSON error bodies.
pub struct ApiError(pub QueryError);

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            QueryError::NoData => StatusCode::NOT_FOUND,
            QueryError::CrossRate(CrossRateError::CurrencyNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            QueryError::CrossRate(_) => StatusCode::BAD_REQUEST,
            QueryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CrossRateParams {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct CrossRateResponse {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Fetch the latest rates now and store them.
#[tracing::instrument(skip(state))]
pub async fn update_exchange_rates(State(state): State<Arc<AppState>>) -> Response {
    match state.refresh.refresh().await {
        Ok(_) => (StatusCode::OK, "Exchange rates updated.").into_response(),
        Err(RefreshError::NotAvailable) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch exchange rates from the API.",
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("An error occurred: {e}"),
        )
            .into_response(),
    }
}

/// Return the stored snapshot.
#[tracing::instrument(skip(state))]
pub async fn latest_exchange_rates(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.query.latest().await?;
    Ok(Json(snapshot))
}

/// Compute a cross rate from the stored snapshot.
#[tracing::instrument(skip(state))]
pub async fn cross_rate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CrossRateParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rate = state.query.cross_rate(&params.from, &params.to).await?;
    Ok(Json(CrossRateResponse {
        from: normalize_code(&params.from),
        to: normalize_code(&params.to),
        rate,
    }))
}
