mod learner_choice;
mod schema;
mod source_choice;
mod task_choice;

pub use learner_choice::{KnnParams, LearnerChoice, LearnerKind};
pub use schema::{FieldKind, FieldSpec, field_specs};
pub use source_choice::{JitterParams, RecordedParams, SourceChoice, SourceKind};
pub use task_choice::{DumpFormat, SessionParams, TaskChoice, TaskKind};

use crate::ui::cli::drivers::PromptDriver;
use anyhow::Result;
use schemars::Schema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::str::FromStr;
use strum::{EnumMessage, IntoEnumIterator};

/// A user-facing configuration choice: a tagged enum whose variants carry
/// schema-annotated parameter structs. The wizard renders the kind menu from
/// strum messages and the parameter prompts from the JSON schema.
pub trait UIChoice: Serialize + DeserializeOwned + Sized {
    type Kind: Copy + Into<&'static str> + FromStr + EnumMessage + IntoEnumIterator;

    fn schema() -> Schema;

    fn prompt_label() -> &'static str;

    fn prompt_help() -> Option<&'static str> {
        None
    }

    fn default_params(kind: Self::Kind) -> Value;

    /// Nested choices prompted after this one's own fields.
    fn subprompts<D: PromptDriver>(
        _driver: &D,
        _kind: Self::Kind,
    ) -> Result<Option<Map<String, Value>>> {
        Ok(None)
    }

    fn from_parts(kind: Self::Kind, params: Value) -> Result<Self> {
        let key: &'static str = kind.into();
        let tagged = json!({ "type": key, "params": params });
        Ok(serde_json::from_value(tagged)?)
    }
}
