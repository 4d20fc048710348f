use std::collections::HashMap;
use std::sync::Arc;

use super::features::DerivedFeatureSet;
use super::schema::FeatureSchema;

/// Feature values laid out in the schema's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFeatureVector {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl AlignedFeatureVector {
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
        self.position(column)
            .and_then(|index| self.values.get(index).copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub(crate) fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub(crate) fn into_parts(self) -> (Arc<[String]>, Vec<f64>) {
        (self.columns, self.values)
    }
}

/// Lay named feature values out in schema order.
///
/// Schema columns with no matching input are zero-filled. Inputs the schema does
/// not list are dropped. When a name repeats, the last value wins.
pub fn align<'a, I>(features: I, schema: &FeatureSchema) -> AlignedFeatureVector
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let lookup: HashMap<&str, f64> = features.into_iter().collect();
    let values = schema
        .columns()
        .iter()
        .map(|column| lookup.get(column.as_str()).copied().unwrap_or(0.0))
        .collect();

    AlignedFeatureVector {
        columns: schema.shared_columns(),
        values,
    }
}

impl DerivedFeatureSet {
    pub fn align(&self, schema: &FeatureSchema) -> AlignedFeatureVector {
        align(self.named_values(), schema)
    }
}
