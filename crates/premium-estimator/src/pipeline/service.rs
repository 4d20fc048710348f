use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::applicant::RawApplicant;
use super::artifacts::ArtifactBundle;
use super::error::PredictionError;
use super::features::{AgeGroup, BmiCategory, DerivedFeatureSet};
use super::model::{infer, FittedModel, PremiumModel};

/// Runs derive → align → scale → infer against one frozen artifact bundle.
pub struct PredictionService<M = FittedModel> {
    bundle: Arc<ArtifactBundle<M>>,
}

impl<M> PredictionService<M>
where
    M: PremiumModel + 'static,
{
    pub fn new(bundle: ArtifactBundle<M>) -> Self {
        Self {
            bundle: Arc::new(bundle),
        }
    }

    pub fn bundle(&self) -> &ArtifactBundle<M> {
        &self.bundle
    }

    /// Score a raw request payload.
    pub fn predict_json(&self, payload: &Value) -> Result<PredictionOutcome, PredictionError> {
        let applicant = RawApplicant::from_json(payload)?;
        self.predict(&applicant)
    }

    pub fn predict(&self, applicant: &RawApplicant) -> Result<PredictionOutcome, PredictionError> {
        let derived = DerivedFeatureSet::derive(applicant)?;
        let prediction = self.score(&derived)?;
        Ok(PredictionOutcome {
            prediction,
            derived: DerivedSummary::from(&derived),
        })
    }

    /// Align, scale and evaluate an already derived feature set.
    pub fn score(&self, derived: &DerivedFeatureSet) -> Result<f64, PredictionError> {
        let bundle = &self.bundle;
        let aligned = derived.align(bundle.schema());
        let scaled = bundle.scaler().transform(aligned)?;
        let prediction = infer(bundle.model(), &scaled)?;

        debug!(
            bmi = derived.bmi,
            bmi_category = ?derived.bmi_category,
            age_group = ?derived.age_group,
            prediction,
            "scored applicant"
        );
        Ok(prediction)
    }
}

/// Successful prediction plus the derived features returned for transparency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub prediction: f64,
    pub derived: DerivedSummary,
}

/// Derived features echoed back to callers, keyed by training column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSummary {
    /// Rounded to two decimals.
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "BMI_Category_Normal")]
    pub bmi_normal: u8,
    #[serde(rename = "BMI_Category_Overweight")]
    pub bmi_overweight: u8,
    #[serde(rename = "BMI_Category_Obese")]
    pub bmi_obese: u8,
    #[serde(rename = "Age_Group_30-39")]
    pub age_30_39: u8,
    #[serde(rename = "Age_Group_40-49")]
    pub age_40_49: u8,
    #[serde(rename = "Age_Group_50-59")]
    pub age_50_59: u8,
    #[serde(rename = "Age_Group_60+")]
    pub age_60_plus: u8,
}

impl From<&DerivedFeatureSet> for DerivedSummary {
    fn from(derived: &DerivedFeatureSet) -> Self {
        Self {
            bmi: (derived.bmi * 100.0).round() / 100.0,
            bmi_normal: derived.bmi_indicator(BmiCategory::Normal),
            bmi_overweight: derived.bmi_indicator(BmiCategory::Overweight),
            bmi_obese: derived.bmi_indicator(BmiCategory::Obese),
            age_30_39: derived.age_indicator(AgeGroup::Thirties),
            age_40_49: derived.age_indicator(AgeGroup::Forties),
            age_50_59: derived.age_indicator(AgeGroup::Fifties),
            age_60_plus: derived.age_indicator(AgeGroup::SixtyPlus),
        }
    }
}
