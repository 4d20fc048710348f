use std::collections::HashSet;
use std::sync::Arc;

use super::error::SchemaError;

/// Column order of the trained premium model.
pub const TRAINED_COLUMNS: [&str; 18] = [
    "Age",
    "Diabetes",
    "Blood_Pressure_Problems",
    "Any_Transplants",
    "Any_Chronic_Diseases",
    "Height",
    "Weight",
    "Known_Allergies",
    "History_of_Cancer_in_Family",
    "Number_of_Major_Surgeries",
    "BMI",
    "BMI_Category_Normal",
    "BMI_Category_Overweight",
    "BMI_Category_Obese",
    "Age_Group_30-39",
    "Age_Group_40-49",
    "Age_Group_50-59",
    "Age_Group_60+",
];

/// Columns standardized before inference.
pub const CONTINUOUS_FEATURES: [&str; 4] = ["Age", "Height", "Weight", "BMI"];

/// Ordered column descriptor the model was trained against, plus the subset that gets scaled.
///
/// Built once at startup from the model artifact and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
    continuous: Arc<[String]>,
}

impl FeatureSchema {
    pub fn new<C, S>(columns: C, continuous: S) -> Result<Self, SchemaError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        ensure_unique(&columns)?;

        let continuous: Vec<String> = continuous.into_iter().map(Into::into).collect();
        ensure_unique(&continuous)?;
        if let Some(unknown) = continuous.iter().find(|name| !columns.contains(name)) {
            return Err(SchemaError::UnknownContinuousFeature(unknown.clone()));
        }

        Ok(Self {
            columns: columns.into(),
            continuous: continuous.into(),
        })
    }

    /// Schema of the shipped model: 18 columns, 4 of them continuous.
    pub fn trained() -> Self {
        Self {
            columns: TRAINED_COLUMNS.iter().map(|name| name.to_string()).collect(),
            continuous: CONTINUOUS_FEATURES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn continuous(&self) -> &[String] {
        &self.continuous
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub(crate) fn shared_columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }
}

fn ensure_unique(names: &[String]) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::DuplicateColumn(name.clone()));
        }
    }
    Ok(())
}
