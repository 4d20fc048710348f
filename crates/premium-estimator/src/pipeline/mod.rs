//! Premium scoring pipeline.
//!
//! A request flows through four stages, each a plain function of its input and the
//! artifacts frozen at startup:
//!
//! 1. [`DerivedFeatureSet::derive`] computes BMI and the BMI/age one-hot buckets.
//! 2. [`align`] lays the features out in the model's training column order.
//! 3. [`StandardScaler::transform`] standardizes the continuous columns.
//! 4. [`infer`] evaluates the fitted model and unwraps the premium.
//!
//! [`PredictionService`] strings the stages together and [`prediction_router`]
//! exposes it over HTTP.

pub mod align;
pub mod applicant;
pub mod artifacts;
pub mod error;
pub mod export;
pub mod features;
pub mod model;
pub mod router;
pub mod scaler;
pub mod schema;
pub mod service;

#[cfg(test)]
mod tests;

pub use align::{align, AlignedFeatureVector};
pub use applicant::{RawApplicant, REQUIRED_KEYS};
pub use artifacts::{ArtifactBundle, ArtifactError, ModelArtifact, ScalerArtifact};
pub use error::{InferenceError, PredictionError, SchemaError, ValidationError};
pub use export::write_csv;
pub use features::{AgeGroup, BmiCategory, DerivedFeatureSet};
pub use model::{
    infer, Aggregation, FittedModel, LinearModel, PremiumModel, RegressionModel, RegressionTree,
    TreeEnsemble,
};
pub use router::{prediction_router, PredictionResponse};
pub use scaler::{ScaledFeatureVector, StandardScaler};
pub use schema::{FeatureSchema, CONTINUOUS_FEATURES, TRAINED_COLUMNS};
pub use service::{DerivedSummary, PredictionOutcome, PredictionService};
