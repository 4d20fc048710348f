use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Value};

use crate::pipeline::applicant::RawApplicant;
use crate::pipeline::artifacts::ArtifactBundle;
use crate::pipeline::error::InferenceError;
use crate::pipeline::model::{FittedModel, LinearModel, PremiumModel, RegressionModel};
use crate::pipeline::scaler::StandardScaler;
use crate::pipeline::schema::{FeatureSchema, CONTINUOUS_FEATURES, TRAINED_COLUMNS};
use crate::pipeline::service::PredictionService;

pub(super) fn applicant(age: u32, height_cm: f64, weight_kg: f64) -> RawApplicant {
    RawApplicant {
        age,
        diabetes: false,
        blood_pressure_problems: false,
        any_transplants: false,
        any_chronic_diseases: false,
        height_cm,
        weight_kg,
        known_allergies: false,
        history_of_cancer_in_family: false,
        major_surgeries: 0,
    }
}

/// Fixed reference input: age 30, 170 cm, 70 kg, no conditions.
pub(super) fn reference_payload() -> Value {
    json!({
        "Age": 30,
        "Diabetes": 0,
        "Blood_Pressure_Problems": 0,
        "Any_Transplants": 0,
        "Any_Chronic_Diseases": 0,
        "Height": 170,
        "Weight": 70,
        "Known_Allergies": 0,
        "History_of_Cancer_in_Family": 0,
        "Number_of_Major_Surgeries": 0,
    })
}

pub(super) fn scaler() -> StandardScaler {
    StandardScaler::new(
        CONTINUOUS_FEATURES.iter().map(|name| name.to_string()).collect(),
        vec![42.0, 168.0, 77.0, 27.5],
        vec![14.0, 10.0, 14.0, 5.0],
    )
    .expect("valid scaler")
}

/// Linear model whose coefficients are the column index plus one.
pub(super) fn indexed_linear_model() -> FittedModel {
    let coefficients = (1..=TRAINED_COLUMNS.len()).map(|i| i as f64).collect();
    FittedModel::new(
        RegressionModel::Linear(LinearModel {
            intercept: 20_000.0,
            coefficients,
        }),
        TRAINED_COLUMNS.len(),
    )
    .expect("valid linear model")
}

pub(super) fn linear_bundle() -> ArtifactBundle<FittedModel> {
    ArtifactBundle::assemble(
        FeatureSchema::trained(),
        scaler(),
        indexed_linear_model(),
        "test-linear",
        "test-scaler",
    )
    .expect("bundle assembles")
}

pub(super) fn linear_service() -> PredictionService<FittedModel> {
    PredictionService::new(linear_bundle())
}

/// Stand-in model that remembers every row it was asked to score.
#[derive(Default)]
pub(super) struct RecordingModel {
    pub(super) rows: Mutex<Vec<Vec<f64>>>,
}

impl PremiumModel for RecordingModel {
    fn input_width(&self) -> usize {
        TRAINED_COLUMNS.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let mut guard = self.rows.lock().expect("rows mutex poisoned");
        guard.push(features.to_vec());
        Ok(features.iter().sum())
    }
}

/// Model that returns a non-finite prediction, for exercising the 5xx path.
pub(super) struct BrokenModel;

impl PremiumModel for BrokenModel {
    fn input_width(&self) -> usize {
        TRAINED_COLUMNS.len()
    }

    fn predict(&self, _features: &[f64]) -> Result<f64, InferenceError> {
        Ok(f64::NAN)
    }
}

pub(super) fn service_with<M: PremiumModel + 'static>(model: M) -> Arc<PredictionService<M>> {
    let bundle = ArtifactBundle::assemble(
        FeatureSchema::trained(),
        scaler(),
        model,
        "test-model",
        "test-scaler",
    )
    .expect("bundle assembles");
    Arc::new(PredictionService::new(bundle))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
