use crate::ui::types::choices::UIChoice;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

const DEFAULT_K: usize = 3;
fn default_k() -> usize {
    DEFAULT_K
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct KnnParams {
    #[serde(default = "default_k")]
    #[schemars(
        title = "Neighbors (k)",
        description = "Votes are tallied among this many nearest stored examples",
        range(min = 1),
        default = "default_k"
    )]
    pub k: usize,

    #[serde(default)]
    #[schemars(
        title = "Dimension",
        description = "Expected feature-vector length; empty = inferred from the first example (a hand pose is 21 landmarks x 3 coordinates = 63)"
    )]
    pub dimension: Option<usize>,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            dimension: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(LearnerKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum LearnerChoice {
    #[strum_discriminants(strum(
        message = "k-Nearest Neighbors",
        detailed_message = "Predicts the majority note among the k closest stored poses."
    ))]
    Knn(KnnParams),
}

impl UIChoice for LearnerChoice {
    type Kind = LearnerKind;

    fn schema() -> Schema {
        schema_for!(LearnerChoice)
    }

    fn prompt_label() -> &'static str {
        "Choose a learner:"
    }

    fn default_params(kind: Self::Kind) -> Value {
        match kind {
            LearnerKind::Knn => serde_json::to_value(KnnParams::default()).unwrap(),
        }
    }
}
