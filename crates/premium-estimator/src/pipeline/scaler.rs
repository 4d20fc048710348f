use std::collections::HashSet;
use std::sync::Arc;

use super::align::AlignedFeatureVector;
use super::error::SchemaError;
use super::schema::FeatureSchema;

/// Fitted standardization for the continuous features: `(v - mean) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    features: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(
        features: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    ) -> Result<Self, SchemaError> {
        let expected = features.len();
        if mean.len() != expected {
            return Err(SchemaError::ScalerShape {
                parameter: "mean",
                expected,
                actual: mean.len(),
            });
        }
        if scale.len() != expected {
            return Err(SchemaError::ScalerShape {
                parameter: "scale",
                expected,
                actual: scale.len(),
            });
        }

        for (feature, value) in features.iter().zip(&scale) {
            if !value.is_finite() || *value <= 0.0 {
                return Err(SchemaError::InvalidScale {
                    feature: feature.clone(),
                    value: *value,
                });
            }
        }
        if let Some((feature, _)) = features.iter().zip(&mean).find(|(_, m)| !m.is_finite()) {
            return Err(SchemaError::InvalidMean(feature.clone()));
        }

        Ok(Self {
            features,
            mean,
            scale,
        })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Confirm this scaler covers exactly the schema's continuous subset.
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<(), SchemaError> {
        let ours: HashSet<&str> = self.features.iter().map(String::as_str).collect();
        let theirs: HashSet<&str> = schema.continuous().iter().map(String::as_str).collect();
        if ours != theirs || ours.len() != self.features.len() {
            return Err(SchemaError::ScalerFeatureMismatch {
                scaler: self.features.clone(),
                schema: schema.continuous().to_vec(),
            });
        }

        match self
            .features
            .iter()
            .find(|feature| schema.position(feature).is_none())
        {
            Some(missing) => Err(SchemaError::MissingContinuousFeature(missing.clone())),
            None => Ok(()),
        }
    }

    /// Standardize the continuous columns in place; all other columns pass through.
    pub fn transform(
        &self,
        aligned: AlignedFeatureVector,
    ) -> Result<ScaledFeatureVector, SchemaError> {
        let mut positions = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            let index = aligned
                .position(feature)
                .ok_or_else(|| SchemaError::MissingContinuousFeature(feature.clone()))?;
            positions.push(index);
        }

        let (columns, mut values) = aligned.into_parts();
        for ((index, mean), scale) in positions.into_iter().zip(&self.mean).zip(&self.scale) {
            if let Some(slot) = values.get_mut(index) {
                *slot = (*slot - mean) / scale;
            }
        }

        Ok(ScaledFeatureVector { columns, values })
    }
}

/// Aligned vector with continuous columns standardized. This is the model input.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatureVector {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl ScaledFeatureVector {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index).copied())
    }
}
