use premium_estimator::error::AppError;
use premium_estimator::pipeline::{PredictionResponse, RawApplicant};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub(crate) enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("scoring API error: status={status}, body={body}")]
    Api { status: u16, body: String },

    #[error("API Error: {0}")]
    Rejected(String),

    #[error("scoring API returned invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ClientError> for AppError {
    fn from(value: ClientError) -> Self {
        AppError::Remote(Box::new(value))
    }
}

/// Posts applicants to a running `/predict` endpoint.
#[derive(Clone)]
pub(crate) struct RemoteScorer {
    endpoint: String,
    client: Client,
}

impl RemoteScorer {
    pub(crate) fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Accepts either the service root or the full `/predict` URL.
    fn predict_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        if base.ends_with("/predict") {
            base.to_string()
        } else {
            format!("{base}/predict")
        }
    }

    pub(crate) async fn predict(&self, applicant: &RawApplicant) -> Result<f64, ClientError> {
        let res = self
            .client
            .post(self.predict_url())
            .json(&applicant.to_payload())
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        interpret_response(status, &body)
    }
}

fn interpret_response(status: u16, body: &str) -> Result<f64, ClientError> {
    let parsed: PredictionResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !(200..300).contains(&status) => {
            return Err(ClientError::Api {
                status,
                body: body.to_string(),
            })
        }
        Err(err) => return Err(ClientError::InvalidResponse(err.to_string())),
    };

    if !parsed.success {
        return Err(ClientError::Rejected(
            parsed
                .error
                .unwrap_or_else(|| format!("request failed with status code {status}")),
        ));
    }

    parsed
        .prediction
        .ok_or_else(|| ClientError::InvalidResponse("success response without prediction".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(endpoint: &str) -> RemoteScorer {
        RemoteScorer::new(endpoint, DEFAULT_TIMEOUT).expect("client builds")
    }

    #[test]
    fn predict_url_appends_path_once() {
        assert_eq!(
            scorer("http://127.0.0.1:3000").predict_url(),
            "http://127.0.0.1:3000/predict"
        );
        assert_eq!(
            scorer("http://127.0.0.1:3000/").predict_url(),
            "http://127.0.0.1:3000/predict"
        );
        assert_eq!(
            scorer("https://premium.example.com/predict").predict_url(),
            "https://premium.example.com/predict"
        );
    }

    #[test]
    fn successful_body_yields_prediction() {
        let body = concat!(
            r#"{"success":true,"prediction":23514.5,"derived":{"BMI":24.22,"#,
            r#""BMI_Category_Normal":1,"BMI_Category_Overweight":0,"BMI_Category_Obese":0,"#,
            r#""Age_Group_30-39":1,"Age_Group_40-49":0,"Age_Group_50-59":0,"Age_Group_60+":0}}"#
        );
        assert_eq!(interpret_response(200, body).expect("prediction"), 23514.5);
    }

    #[test]
    fn rejected_body_surfaces_the_api_error() {
        let body = r#"{"success":false,"error":"Missing keys: Age","expected":["Age"]}"#;
        match interpret_response(400, body) {
            Err(ClientError::Rejected(message)) => assert_eq!(message, "Missing keys: Age"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn non_json_error_keeps_status_and_body() {
        match interpret_response(502, "Bad Gateway") {
            Err(ClientError::Api { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn success_without_prediction_is_invalid() {
        let err = interpret_response(200, r#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
