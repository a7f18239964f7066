use crate::trace::TraceFormat;
use crate::ui::cli::wizard::prompt_choice;
use crate::ui::types::choices::{LearnerChoice, SourceChoice, UIChoice};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DumpFormat {
    Csv,
    Tsv,
    Json,
}

impl Default for DumpFormat {
    fn default() -> Self {
        DumpFormat::Csv
    }
}

impl From<DumpFormat> for TraceFormat {
    fn from(value: DumpFormat) -> Self {
        match value {
            DumpFormat::Csv => TraceFormat::Csv,
            DumpFormat::Tsv => TraceFormat::Tsv,
            DumpFormat::Json => TraceFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionParams {
    #[schemars(skip)]
    pub learner: LearnerChoice,
    #[schemars(skip)]
    pub source: SourceChoice,

    #[serde(default)]
    #[schemars(
        with = "String",
        title = "Training File",
        description = "Labeled pose recording used to seed the classifier (blank = start empty)",
        extend(
            "format" = "path",
            "x-file" = true,
            "x-must-exist" = true,
            "x-extensions" = ["jsonl"]
        )
    )]
    pub training_file: Option<PathBuf>,

    #[schemars(
        title = "Poll Interval (ms)",
        description = "Delay between pose samples"
    )]
    pub poll_interval_ms: u64,

    #[serde(default)]
    #[schemars(
        title = "Max Frames",
        description = "Stop after this many frames (None = unlimited)"
    )]
    pub max_frames: Option<u64>,

    #[serde(default)]
    #[schemars(
        title = "Max Seconds",
        description = "Stop after this many seconds (None = unlimited)"
    )]
    pub max_seconds: Option<u64>,

    #[schemars(
        title = "Sample Frequency",
        description = "Record a snapshot every N frames",
        range(min = 1)
    )]
    pub sample_frequency: u64,

    #[serde(default)]
    #[schemars(
        with = "String",
        title = "Dump file",
        description = "If set, write all snapshots at the end to this file",
        extend("format" = "path", "x-file" = true, "x-must-exist" = false)
    )]
    pub dump_file: Option<PathBuf>,

    #[serde(default)]
    #[schemars(title = "Dump format", description = "csv / tsv / json (default: csv)")]
    pub dump_format: DumpFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(TaskKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum TaskChoice {
    #[strum_discriminants(strum(
        message = "Live Solfège",
        detailed_message = "Seed the classifier from a recording, then map each tracked pose to a note tone."
    ))]
    LiveSolfege(SessionParams),
}

impl UIChoice for TaskChoice {
    type Kind = TaskKind;

    fn schema() -> Schema {
        schema_for!(TaskChoice)
    }

    fn prompt_label() -> &'static str {
        "Choose a task:"
    }

    fn default_params(kind: Self::Kind) -> Value {
        match kind {
            TaskKind::LiveSolfege => json!({
                "training_file": null,
                "poll_interval_ms": 200,
                "max_frames": null,
                "max_seconds": null,
                "sample_frequency": 1,
                "dump_file": null,
                "dump_format": "csv"
            }),
        }
    }

    fn subprompts<D: crate::ui::cli::drivers::PromptDriver>(
        driver: &D,
        kind: Self::Kind,
    ) -> anyhow::Result<Option<Map<String, Value>>> {
        match kind {
            TaskKind::LiveSolfege => {
                let learner = prompt_choice::<LearnerChoice, _>(driver)?;
                let source = prompt_choice::<SourceChoice, _>(driver)?;

                let mut extra = Map::new();
                extra.insert("learner".into(), serde_json::to_value(learner)?);
                extra.insert("source".into(), serde_json::to_value(source)?);
                Ok(Some(extra))
            }
        }
    }

    fn from_parts(kind: Self::Kind, params: Value) -> anyhow::Result<Self> {
        match kind {
            TaskKind::LiveSolfege => {
                let p: SessionParams = serde_json::from_value(params)?;
                Ok(TaskChoice::LiveSolfege(p))
            }
        }
    }
}
