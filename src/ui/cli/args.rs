use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueHint};
use serde_json::Value;

use crate::ui::types::choices::{
    DumpFormat, LearnerChoice, SessionParams, SourceChoice, TaskChoice, TaskKind, UIChoice,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Interactive and scripted runner for solfa sessions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a session without the interactive wizard
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Task to execute (e.g. live-solfege)
    #[arg(long, default_value = "live-solfege", value_name = "TASK")]
    pub task: String,

    /// Learner to use (e.g. knn)
    #[arg(long, default_value = "knn", value_name = "LEARNER")]
    pub learner: String,

    /// Pose source to poll (e.g. recorded-poses, jitter-generator)
    #[arg(long, value_name = "SOURCE")]
    pub source: String,

    /// Labeled recording used to seed the classifier (omit to start empty)
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub training_file: Option<PathBuf>,

    /// Delay between pose samples, in milliseconds
    #[arg(long, default_value_t = 200, value_name = "MS")]
    pub poll_interval_ms: u64,

    /// Stop after this many frames (omit for unlimited)
    #[arg(long, value_name = "N")]
    pub max_frames: Option<u64>,

    /// Stop after this many seconds (omit for unlimited)
    #[arg(long, value_name = "SECONDS")]
    pub max_seconds: Option<u64>,

    /// Record a snapshot every N frames
    #[arg(
        long,
        default_value_t = 1,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub sample_frequency: u64,

    /// File to dump the prediction trace after completion
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub dump_file: Option<PathBuf>,

    /// Format for the dump file (csv, tsv, json)
    #[arg(long, value_name = "FORMAT")]
    pub dump_format: Option<String>,

    /// Override learner parameters (key=value)
    #[arg(long = "learner-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub learner_params: Vec<KeyValue>,

    /// Override source parameters (key=value)
    #[arg(long = "source-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub source_params: Vec<KeyValue>,
}

#[derive(Clone, Debug)]
pub struct KeyValue {
    key: String,
    value: Value,
}

impl RunArgs {
    pub fn into_task_choice(self) -> Result<TaskChoice> {
        let task_kind = parse_kind::<TaskKind>(&self.task)
            .with_context(|| format!("invalid task '{}'", self.task))?;

        match task_kind {
            TaskKind::LiveSolfege => self.into_session_choice(),
        }
    }

    fn into_session_choice(self) -> Result<TaskChoice> {
        let learner = build_choice::<LearnerChoice>(&self.learner, &self.learner_params)
            .with_context(|| format!("invalid learner '{}'", self.learner))?;
        let source = build_choice::<SourceChoice>(&self.source, &self.source_params)
            .with_context(|| format!("invalid source '{}'", self.source))?;

        let dump_format = match self.dump_format {
            Some(fmt) => {
                parse_dump_format(&fmt).with_context(|| format!("invalid dump format '{fmt}'"))?
            }
            None => DumpFormat::default(),
        };

        Ok(TaskChoice::LiveSolfege(SessionParams {
            learner,
            source,
            training_file: self.training_file,
            poll_interval_ms: self.poll_interval_ms,
            max_frames: self.max_frames,
            max_seconds: self.max_seconds,
            sample_frequency: self.sample_frequency,
            dump_file: self.dump_file,
            dump_format,
        }))
    }
}

fn build_choice<C>(kind_input: &str, overrides: &[KeyValue]) -> Result<C>
where
    C: UIChoice,
    <C::Kind as FromStr>::Err: std::fmt::Display,
{
    let kind = parse_kind::<C::Kind>(kind_input)?;
    let mut params = C::default_params(kind);
    apply_overrides(&mut params, overrides)?;
    C::from_parts(kind, params)
}

fn parse_kind<T>(raw: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    for candidate in candidate_spellings(raw) {
        if let Ok(parsed) = candidate.parse::<T>() {
            return Ok(parsed);
        }
    }
    Err(anyhow!("could not parse value '{raw}'"))
}

fn candidate_spellings(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut out = vec![
        trimmed.to_string(),
        trimmed.to_lowercase(),
        trimmed.to_lowercase().replace('_', "-"),
    ];
    out.sort();
    out.dedup();
    out
}

fn parse_dump_format(input: &str) -> Result<DumpFormat> {
    match input.trim().to_lowercase().as_str() {
        "csv" => Ok(DumpFormat::Csv),
        "tsv" => Ok(DumpFormat::Tsv),
        "json" => Ok(DumpFormat::Json),
        other => Err(anyhow!("unknown format '{other}'")),
    }
}

fn apply_overrides(target: &mut Value, overrides: &[KeyValue]) -> Result<()> {
    for kv in overrides {
        let Some(obj) = target.as_object_mut() else {
            bail!("parameters are not an object");
        };
        obj.insert(kv.key.clone(), kv.value.clone());
    }
    Ok(())
}

fn parse_key_value(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }

    let value = value.trim();
    // Bare words that aren't valid JSON are taken as strings.
    let parsed = if value.is_empty() {
        Value::String(String::new())
    } else {
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
    };

    Ok(KeyValue {
        key: key.to_string(),
        value: parsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::types::choices::{LearnerChoice, SourceChoice};

    fn run_args(source: &str) -> RunArgs {
        RunArgs {
            task: "live-solfege".into(),
            learner: "knn".into(),
            source: source.into(),
            training_file: None,
            poll_interval_ms: 200,
            max_frames: None,
            max_seconds: None,
            sample_frequency: 1,
            dump_file: None,
            dump_format: None,
            learner_params: Vec::new(),
            source_params: Vec::new(),
        }
    }

    #[test]
    fn builds_task_choice_with_overrides() {
        let mut args = run_args("recorded-poses");
        args.learner_params = vec![parse_key_value("k=5").unwrap()];
        args.source_params = vec![
            parse_key_value("path=poses/train.jsonl").unwrap(),
            parse_key_value("repeat=true").unwrap(),
        ];
        args.max_frames = Some(100);

        let TaskChoice::LiveSolfege(p) = args.into_task_choice().unwrap();
        assert_eq!(p.max_frames, Some(100));

        match p.learner {
            LearnerChoice::Knn(knn) => assert_eq!(knn.k, 5),
        }
        match p.source {
            SourceChoice::RecordedPoses(rec) => {
                assert_eq!(rec.path.to_str(), Some("poses/train.jsonl"));
                assert!(rec.repeat);
            }
            other => panic!("unexpected source: {other:?}"),
        }
    }

    #[test]
    fn spellings_are_normalized() {
        let mut args = run_args("Jitter_Generator");
        args.source_params = vec![parse_key_value("base_file=poses/base.jsonl").unwrap()];

        let TaskChoice::LiveSolfege(p) = args.into_task_choice().unwrap();
        assert!(matches!(p.source, SourceChoice::JitterGenerator(_)));
    }

    #[test]
    fn invalid_learner_is_reported() {
        let mut args = run_args("recorded-poses");
        args.learner = "decision-tree".into();
        let err = args.into_task_choice().err().unwrap();
        assert!(err.to_string().contains("invalid learner"), "was: {err}");
    }

    #[test]
    fn invalid_dump_format_is_reported() {
        let mut args = run_args("recorded-poses");
        args.dump_format = Some("yaml".into());
        let err = args.into_task_choice().err().unwrap();
        assert!(err.to_string().contains("invalid dump format"), "was: {err}");
    }

    #[test]
    fn key_value_parsing_handles_json_and_bare_strings() {
        let kv = parse_key_value("k=5").unwrap();
        assert_eq!(kv.key, "k");
        assert_eq!(kv.value, Value::from(5));

        let kv = parse_key_value("repeat=true").unwrap();
        assert_eq!(kv.value, Value::Bool(true));

        let kv = parse_key_value("path=poses/base.jsonl").unwrap();
        assert_eq!(kv.value, Value::String("poses/base.jsonl".into()));

        assert!(parse_key_value("no-equals").is_err());
        assert!(parse_key_value("=5").is_err());
    }
}
