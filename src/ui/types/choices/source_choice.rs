use crate::ui::types::choices::UIChoice;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

const DEFAULT_SEED: u64 = 42;
fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_amplitude() -> f64 {
    0.02
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct RecordedParams {
    #[schemars(
        with = "String",
        title = "Recording Path",
        description = "Path to a .jsonl pose recording",
        extend(
            "format" = "path",
            "x-file" = true,
            "x-must-exist" = true,
            "x-extensions" = ["jsonl"]
        )
    )]
    pub path: PathBuf,

    #[serde(default)]
    #[schemars(
        title = "Repeat",
        description = "Restart from the top when the recording runs out?"
    )]
    pub repeat: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JitterParams {
    #[schemars(
        with = "String",
        title = "Base Recording",
        description = "Recording whose poses are replayed with jitter",
        extend(
            "format" = "path",
            "x-file" = true,
            "x-must-exist" = true,
            "x-extensions" = ["jsonl"]
        )
    )]
    pub base_file: PathBuf,

    #[serde(default = "default_amplitude")]
    #[schemars(
        title = "Amplitude",
        description = "Uniform per-coordinate jitter bound",
        range(min = 0.0),
        default = "default_amplitude"
    )]
    pub amplitude: f64,

    #[serde(default)]
    #[schemars(
        title = "Max Frames",
        description = "Upper bound on generated frames; empty = endless"
    )]
    pub max_frames: Option<u64>,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for JitterParams {
    fn default() -> Self {
        Self {
            base_file: PathBuf::new(),
            amplitude: default_amplitude(),
            max_frames: None,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(SourceKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum SourceChoice {
    #[strum_discriminants(strum(
        message = "Recorded Poses",
        detailed_message = "Replays a JSON-lines pose recording in order."
    ))]
    RecordedPoses(RecordedParams),

    #[strum_discriminants(strum(
        message = "Jitter Generator",
        detailed_message = "Synthesizes noisy variants of base poses, seeded."
    ))]
    JitterGenerator(JitterParams),
}

impl UIChoice for SourceChoice {
    type Kind = SourceKind;

    fn schema() -> Schema {
        schema_for!(SourceChoice)
    }

    fn prompt_label() -> &'static str {
        "Choose a pose source:"
    }

    fn default_params(kind: Self::Kind) -> Value {
        match kind {
            SourceKind::RecordedPoses => serde_json::to_value(RecordedParams::default()).unwrap(),
            SourceKind::JitterGenerator => serde_json::to_value(JitterParams::default()).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumMessage;

    #[test]
    fn serde_roundtrip_recorded() {
        let p0 = RecordedParams {
            path: PathBuf::from("poses/train.jsonl"),
            repeat: true,
        };
        let json = serde_json::to_string(&p0).unwrap();
        let p1: RecordedParams = serde_json::from_str(&json).unwrap();
        assert_eq!(p0.path, p1.path);
        assert_eq!(p0.repeat, p1.repeat);
    }

    #[test]
    fn serde_roundtrip_jitter() {
        let p0 = JitterParams {
            base_file: PathBuf::from("poses/base.jsonl"),
            amplitude: 0.1,
            max_frames: Some(50),
            seed: 7,
        };
        let json = serde_json::to_string(&p0).unwrap();
        let p1: JitterParams = serde_json::from_str(&json).unwrap();
        assert_eq!(p0.base_file, p1.base_file);
        assert_eq!(p0.amplitude, p1.amplitude);
        assert_eq!(p0.max_frames, p1.max_frames);
        assert_eq!(p0.seed, p1.seed);
    }

    #[test]
    fn default_params_match_struct_defaults() {
        let jitter: JitterParams = serde_json::from_value(
            <SourceChoice as UIChoice>::default_params(SourceKind::JitterGenerator),
        )
        .unwrap();
        assert_eq!(jitter.amplitude, 0.02);
        assert_eq!(jitter.seed, DEFAULT_SEED);
        assert_eq!(jitter.max_frames, None);

        let recorded: RecordedParams = serde_json::from_value(
            <SourceChoice as UIChoice>::default_params(SourceKind::RecordedPoses),
        )
        .unwrap();
        assert!(!recorded.repeat);
    }

    #[test]
    fn tagged_enum_serialization() {
        let v = serde_json::to_value(SourceChoice::RecordedPoses(RecordedParams::default()))
            .unwrap();
        assert_eq!(v.get("type").and_then(Value::as_str), Some("recorded-poses"));

        let v = serde_json::to_value(SourceChoice::JitterGenerator(JitterParams::default()))
            .unwrap();
        assert_eq!(
            v.get("type").and_then(Value::as_str),
            Some("jitter-generator")
        );
    }

    #[test]
    fn from_parts_rebuilds_enum() {
        let params = serde_json::to_value(JitterParams::default()).unwrap();
        let choice =
            <SourceChoice as UIChoice>::from_parts(SourceKind::JitterGenerator, params).unwrap();
        matches!(choice, SourceChoice::JitterGenerator(_));
    }

    #[test]
    fn path_schema_has_vendor_extensions() {
        let schema = serde_json::to_value(schema_for!(RecordedParams)).unwrap();
        let props = schema.get("properties").cloned().unwrap_or_default();
        let path = props.get("path").and_then(Value::as_object).unwrap();

        assert_eq!(path.get("type").and_then(Value::as_str), Some("string"));
        assert_eq!(path.get("format").and_then(Value::as_str), Some("path"));
        assert_eq!(path.get("x-file").and_then(Value::as_bool), Some(true));
        let exts = path.get("x-extensions").and_then(Value::as_array).unwrap();
        assert!(exts.iter().any(|v| v.as_str() == Some("jsonl")));
    }

    #[test]
    fn kind_messages_exist() {
        assert_eq!(SourceKind::RecordedPoses.get_message(), Some("Recorded Poses"));
        assert_eq!(
            SourceKind::JitterGenerator.get_message(),
            Some("Jitter Generator")
        );
        assert!(SourceKind::JitterGenerator.get_detailed_message().is_some());
    }

    #[test]
    fn prompt_label_is_expected() {
        assert_eq!(
            <SourceChoice as UIChoice>::prompt_label(),
            "Choose a pose source:"
        );
    }
}
