use serde::{Deserialize, Serialize};

use super::error::{InferenceError, SchemaError};
use super::scaler::ScaledFeatureVector;

/// A fitted regression model evaluated on one prepared feature row.
pub trait PremiumModel: Send + Sync {
    /// Number of inputs the model was fitted on.
    fn input_width(&self) -> usize;

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;
}

/// Run the model on a scaled vector and unwrap the scalar premium.
pub fn infer<M>(model: &M, input: &ScaledFeatureVector) -> Result<f64, InferenceError>
where
    M: PremiumModel + ?Sized,
{
    let expected = model.input_width();
    if input.len() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: input.len(),
        });
    }

    let prediction = model.predict(input.values())?;
    if prediction.is_finite() {
        Ok(prediction)
    } else {
        Err(InferenceError::NonFinite(prediction))
    }
}

/// Model families the artifact loader understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl RegressionModel {
    /// Structural checks run once at load time against the schema width.
    pub fn validate(&self, width: usize) -> Result<(), SchemaError> {
        match self {
            RegressionModel::Linear(model) => {
                if model.coefficients.len() == width {
                    Ok(())
                } else {
                    Err(SchemaError::ModelWidth {
                        model: model.coefficients.len(),
                        schema: width,
                    })
                }
            }
            RegressionModel::TreeEnsemble(ensemble) => ensemble.validate(width),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RegressionModel::Linear(_) => "linear",
            RegressionModel::TreeEnsemble(_) => "tree_ensemble",
        }
    }
}

/// Width-aware wrapper so tree ensembles, which do not record their width, can
/// still reject misshapen input.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    width: usize,
    model: RegressionModel,
}

impl FittedModel {
    pub fn new(model: RegressionModel, width: usize) -> Result<Self, SchemaError> {
        model.validate(width)?;
        Ok(Self { width, model })
    }

    pub fn model(&self) -> &RegressionModel {
        &self.model
    }
}

impl PremiumModel for FittedModel {
    fn input_width(&self) -> usize {
        self.width
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.width {
            return Err(InferenceError::ShapeMismatch {
                expected: self.width,
                actual: features.len(),
            });
        }

        match &self.model {
            RegressionModel::Linear(model) => Ok(model.evaluate(features)),
            RegressionModel::TreeEnsemble(ensemble) => ensemble.evaluate(features),
        }
    }
}

/// `intercept + sum(coefficient_i * x_i)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    fn evaluate(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (coef, value)| acc + coef * value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Average of tree outputs (random forest).
    Mean,
    /// `base_score + learning_rate * sum` (gradient boosting).
    Sum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

fn default_learning_rate() -> f64 {
    1.0
}

impl TreeEnsemble {
    fn validate(&self, width: usize) -> Result<(), SchemaError> {
        if self.trees.is_empty() {
            return Err(SchemaError::EmptyEnsemble);
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(index, tree)| tree.validate(index, width))
    }

    fn evaluate(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let mut total = 0.0;
        for (index, tree) in self.trees.iter().enumerate() {
            total += tree.evaluate(index, features)?;
        }

        Ok(match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => self.base_score + self.learning_rate * total,
        })
    }
}

/// Flat node table in the layout scikit-learn exports: a node is a leaf when
/// both children are `-1`; otherwise go left when `x[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

const LEAF: i64 = -1;

impl RegressionTree {
    fn node_count(&self) -> usize {
        self.value.len()
    }

    fn validate(&self, tree: usize, width: usize) -> Result<(), SchemaError> {
        let nodes = self.node_count();
        let malformed = |node: usize, reason: &'static str| SchemaError::MalformedTree {
            tree,
            node,
            reason,
        };

        if nodes == 0 {
            return Err(malformed(0, "tree has no nodes"));
        }
        if self.children_left.len() != nodes
            || self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
        {
            return Err(malformed(0, "node arrays differ in length"));
        }

        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                if !self.value[node].is_finite() {
                    return Err(malformed(node, "leaf value is not finite"));
                }
                continue;
            }

            // Children always sit after their parent, which rules out cycles.
            let in_range = |child: i64| child > node as i64 && (child as usize) < nodes;
            if !in_range(left) || !in_range(right) {
                return Err(malformed(node, "child index out of range"));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= width {
                return Err(malformed(node, "split feature out of range"));
            }
        }

        Ok(())
    }

    fn evaluate(&self, tree: usize, features: &[f64]) -> Result<f64, InferenceError> {
        let mut node = 0usize;
        // A validated tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.node_count() {
            let left = *self
                .children_left
                .get(node)
                .ok_or(InferenceError::TreeTraversal { tree })?;
            let right = *self
                .children_right
                .get(node)
                .ok_or(InferenceError::TreeTraversal { tree })?;

            if left == LEAF && right == LEAF {
                return self
                    .value
                    .get(node)
                    .copied()
                    .ok_or(InferenceError::TreeTraversal { tree });
            }

            let split = self
                .feature
                .get(node)
                .and_then(|feature| usize::try_from(*feature).ok())
                .and_then(|feature| features.get(feature))
                .ok_or(InferenceError::TreeTraversal { tree })?;
            let threshold = self
                .threshold
                .get(node)
                .ok_or(InferenceError::TreeTraversal { tree })?;

            let next = if split <= threshold { left } else { right };
            node = usize::try_from(next).map_err(|_| InferenceError::TreeTraversal { tree })?;
        }

        Err(InferenceError::TreeTraversal { tree })
    }
}
