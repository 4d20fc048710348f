use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::pipeline::router::{predict_handler, prediction_router};
use crate::pipeline::schema::TRAINED_COLUMNS;

fn predict_request(body: impl Into<Body>) -> Request<Body> {
    Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn predict_route_returns_prediction_and_derived_features() {
    let router = prediction_router(Arc::new(linear_service()));

    let response = router
        .oneshot(predict_request(
            serde_json::to_vec(&reference_payload()).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["prediction"].as_f64().is_some_and(f64::is_finite));
    assert_eq!(body["derived"]["BMI"], json!(24.22));
    assert_eq!(body["derived"]["BMI_Category_Normal"], json!(1));
    assert_eq!(body["derived"]["Age_Group_30-39"], json!(1));
    assert_eq!(body["derived"]["Age_Group_60+"], json!(0));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn predict_route_lists_expected_keys_when_some_are_missing() {
    let router = prediction_router(Arc::new(linear_service()));
    let payload = json!({ "Age": 30, "Height": 170 });

    let response = router
        .oneshot(predict_request(serde_json::to_vec(&payload).unwrap()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(false));
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Missing keys: Diabetes"));
    assert!(!message.contains("Age,"));
    assert_eq!(body["expected"].as_array().map(Vec::len), Some(10));
    assert!(body.get("prediction").is_none());
}

#[tokio::test]
async fn predict_route_rejects_non_json_bodies() {
    let router = prediction_router(Arc::new(linear_service()));

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("age=30"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Content-Type: application/json"));
}

#[tokio::test]
async fn predict_route_reports_truncated_json_as_invalid_body() {
    let router = prediction_router(Arc::new(linear_service()));

    let response = router
        .oneshot(predict_request(r#"{"Age": 30,"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("request body is not valid JSON"));
    assert!(!message.contains("Content-Type"));
}

#[tokio::test]
async fn predict_route_rejects_array_payloads() {
    let router = prediction_router(Arc::new(linear_service()));

    let response = router
        .oneshot(predict_request("[1, 2, 3]"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], json!("request body must be a JSON object"));
}

#[tokio::test]
async fn predict_route_hides_inference_details() {
    let router = prediction_router(service_with(BrokenModel));

    let response = router
        .oneshot(predict_request(
            serde_json::to_vec(&reference_payload()).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(false));
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("NaN"));
    assert!(body.get("expected").is_none());
}

#[tokio::test]
async fn predict_handler_returns_bad_request_for_string_flag() {
    let mut payload = reference_payload();
    payload["Diabetes"] = json!("maybe");

    let response = predict_handler::<crate::pipeline::FittedModel>(
        State(Arc::new(linear_service())),
        Ok(axum::Json(payload)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_route_reports_versions_and_columns() {
    let router = prediction_router(Arc::new(linear_service()));

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["model_version"], json!("test-linear"));
    assert_eq!(body["scaler_version"], json!("test-scaler"));
    assert_eq!(body["model_columns"], json!(TRAINED_COLUMNS));
    assert_eq!(body["cont_features"], json!(["Age", "Height", "Weight", "BMI"]));
}

#[tokio::test]
async fn index_route_describes_required_keys() {
    let router = prediction_router(Arc::new(linear_service()));

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json_body(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["required_keys"].as_array().map(Vec::len), Some(10));
}
