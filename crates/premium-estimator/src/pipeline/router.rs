use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::applicant::REQUIRED_KEYS;
use super::error::{PredictionError, ValidationError};
use super::model::PremiumModel;
use super::service::{DerivedSummary, PredictionOutcome, PredictionService};

/// Body of every `/predict` response, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Vec<String>>,
}

impl PredictionResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            prediction: None,
            derived: None,
            error: Some(error.into()),
            expected: None,
        }
    }
}

impl From<PredictionOutcome> for PredictionResponse {
    fn from(outcome: PredictionOutcome) -> Self {
        Self {
            success: true,
            prediction: Some(outcome.prediction),
            derived: Some(outcome.derived),
            error: None,
            expected: None,
        }
    }
}

impl From<&PredictionError> for PredictionResponse {
    fn from(err: &PredictionError) -> Self {
        let mut response = Self::failure(err.public_message());
        if let PredictionError::Validation(ValidationError::MissingKeys { .. }) = err {
            response.expected = Some(required_keys());
        }
        response
    }
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            warn!(error = %self, "rejected prediction request");
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self, "prediction failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(PredictionResponse::from(&self))).into_response()
    }
}

/// Router exposing the scoring endpoint and its discovery routes.
pub fn prediction_router<M>(service: Arc<PredictionService<M>>) -> Router
where
    M: PremiumModel + 'static,
{
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler::<M>))
        .route("/predict", post(predict_handler::<M>))
        .with_state(service)
}

pub(crate) async fn index_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Insurance Premium Prediction API",
        "required_keys": REQUIRED_KEYS,
    }))
}

pub(crate) async fn health_handler<M>(
    State(service): State<Arc<PredictionService<M>>>,
) -> Json<Value>
where
    M: PremiumModel + 'static,
{
    let bundle = service.bundle();
    Json(json!({
        "status": "healthy",
        "model_version": bundle.model_version(),
        "scaler_version": bundle.scaler_version(),
        "loaded_at": bundle.loaded_at(),
        "model_columns": bundle.schema().columns(),
        "cont_features": bundle.scaler().features(),
    }))
}

pub(crate) async fn predict_handler<M>(
    State(service): State<Arc<PredictionService<M>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    M: PremiumModel + 'static,
{
    let result = payload
        .map_err(|rejection| PredictionError::from(body_rejection(rejection)))
        .and_then(|Json(body)| service.predict_json(&body));

    match result {
        Ok(outcome) => (StatusCode::OK, Json(PredictionResponse::from(outcome))).into_response(),
        Err(err) => err.into_response(),
    }
}

fn body_rejection(rejection: JsonRejection) -> ValidationError {
    let detail = rejection.body_text();
    match rejection {
        JsonRejection::MissingJsonContentType(_) => ValidationError::UnsupportedContentType(detail),
        _ => ValidationError::MalformedBody(detail),
    }
}

fn required_keys() -> Vec<String> {
    REQUIRED_KEYS.iter().map(|key| key.to_string()).collect()
}
