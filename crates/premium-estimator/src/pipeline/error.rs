/// Rejected input: missing keys, malformed values or impossible measurements.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("request must be JSON with header Content-Type: application/json ({0})")]
    UnsupportedContentType(String),
    #[error("request body is not valid JSON ({0})")]
    MalformedBody(String),
    #[error("Missing keys: {}", .missing.join(", "))]
    MissingKeys { missing: Vec<&'static str> },
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("{field} must be strictly positive, got {value}")]
    NonPositiveMeasurement { field: &'static str, value: f64 },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Disagreement between the model columns, the continuous subset and the fitted scaler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("feature schema has no columns")]
    Empty,
    #[error("column {0} appears more than once")]
    DuplicateColumn(String),
    #[error("continuous feature {0} is not a model column")]
    UnknownContinuousFeature(String),
    #[error("continuous feature {0} is missing from the aligned vector")]
    MissingContinuousFeature(String),
    #[error("scaler covers {scaler:?} but the schema scales {schema:?}")]
    ScalerFeatureMismatch {
        scaler: Vec<String>,
        schema: Vec<String>,
    },
    #[error("scaler parameter '{parameter}' has {actual} entries, expected {expected}")]
    ScalerShape {
        parameter: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("scaler standard deviation for {feature} must be finite and positive, got {value}")]
    InvalidScale { feature: String, value: f64 },
    #[error("scaler mean for {0} must be finite")]
    InvalidMean(String),
    #[error("model expects {model} inputs but the schema lists {schema} columns")]
    ModelWidth { model: usize, schema: usize },
    #[error("tree {tree} is malformed at node {node}: {reason}")]
    MalformedTree {
        tree: usize,
        node: usize,
        reason: &'static str,
    },
    #[error("tree ensemble contains no trees")]
    EmptyEnsemble,
}

/// Failure while evaluating the fitted model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("model expects {expected} features, received {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("model produced a non-finite prediction ({0})")]
    NonFinite(f64),
    #[error("tree {tree} walked outside its node table")]
    TreeTraversal { tree: usize },
}

/// Error surfaced by a single scoring request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("configuration error: {0}")]
    Config(#[from] SchemaError),
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),
}

impl PredictionError {
    /// Whether the caller can fix the request by changing its input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictionError::Validation(_))
    }

    /// Message safe to hand back to callers. Server-side failures stay generic.
    pub fn public_message(&self) -> String {
        match self {
            PredictionError::Validation(err) => err.to_string(),
            PredictionError::Config(_) => {
                "prediction unavailable: model configuration error".to_string()
            }
            PredictionError::Inference(_) => "prediction failed during model inference".to_string(),
        }
    }
}
