use anyhow::{Context, Result};
use inquire::Select;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::path::Path;
use strum::{EnumMessage, IntoEnumIterator};

use crate::ui::cli::drivers::PromptDriver;
use crate::ui::types::choices::{FieldKind, FieldSpec, UIChoice, field_specs};

const DIM_ITALIC: &str = "\x1b[2m\x1b[3m";
const RESET: &str = "\x1b[0m";

struct KindItem<K> {
    kind: K,
    text: String,
}

impl<K> Display for KindItem<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn kind_items<K>() -> Vec<KindItem<K>>
where
    K: Copy + Into<&'static str> + EnumMessage + IntoEnumIterator,
{
    K::iter()
        .map(|k| {
            let label = k.get_message().unwrap_or_else(|| k.into());
            let desc = k.get_detailed_message().unwrap_or("");
            let text = if desc.is_empty() {
                label.to_string()
            } else {
                format!("{label}  {DIM_ITALIC}{desc}{RESET}")
            };
            KindItem { kind: k, text }
        })
        .collect()
}

/// Interactive construction of one choice: pick the kind, prompt its schema
/// fields, then recurse into any nested choices.
pub fn prompt_choice<C: UIChoice, D: PromptDriver>(driver: &D) -> Result<C> {
    let items = kind_items::<C::Kind>();
    let mut select = Select::new(C::prompt_label(), items);
    if let Some(help) = C::prompt_help() {
        select = select.with_help_message(help);
    }
    let choice_kind: C::Kind = select.prompt()?.kind;

    let key: &'static str = choice_kind.into();
    let schema = C::schema();
    let specs = field_specs(&schema, key)?;
    let defaults = C::default_params(choice_kind);

    let mut params = Map::new();
    for spec in &specs {
        if let Some(value) = prompt_field(driver, spec, &defaults)? {
            params.insert(spec.name.clone(), value);
        }
    }

    if let Some(extra) = C::subprompts(driver, choice_kind)? {
        params.extend(extra);
    }

    C::from_parts(choice_kind, Value::Object(params))
}

fn prompt_field<D: PromptDriver>(
    driver: &D,
    spec: &FieldSpec,
    defaults: &Value,
) -> Result<Option<Value>> {
    let init = spec
        .default
        .clone()
        .or_else(|| defaults.get(&spec.name).cloned());
    let help = spec.description.as_deref().unwrap_or("");

    // Optional numerics take a blank answer as "none".
    if !spec.required
        && matches!(spec.kind, FieldKind::Integer | FieldKind::Number)
        && matches!(init, None | Some(Value::Null))
    {
        let answer = driver.ask_string(
            &spec.title,
            &format!("{help}\n(leave blank for none)"),
            "",
        )?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        let value = match spec.kind {
            FieldKind::Integer => Value::from(
                answer
                    .parse::<u64>()
                    .with_context(|| format!("invalid integer for {}", spec.title))?,
            ),
            FieldKind::Number => Value::from(
                answer
                    .parse::<f64>()
                    .with_context(|| format!("invalid number for {}", spec.title))?,
            ),
            _ => unreachable!(),
        };
        return Ok(Some(value));
    }

    let value = match spec.kind {
        FieldKind::Boolean => {
            let def = init.and_then(|v| v.as_bool()).unwrap_or(false);
            Value::Bool(driver.ask_bool(&spec.title, help, def)?)
        }

        FieldKind::Integer => {
            let def = init.and_then(|v| v.as_u64()).unwrap_or(0);
            Value::from(driver.ask_u64(
                &spec.title,
                help,
                def,
                spec.min.map(|x| x as u64),
                spec.max.map(|x| x as u64),
            )?)
        }

        FieldKind::Number => {
            let def = init.and_then(|v| v.as_f64()).unwrap_or(0.0);
            Value::from(driver.ask_f64(&spec.title, help, def, spec.min, spec.max)?)
        }

        FieldKind::String => {
            // Enumerated strings become a menu.
            if let Some(options) = &spec.allowed {
                let start = init
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .and_then(|cur| options.iter().position(|o| o == cur))
                    .unwrap_or(0);
                let selected = Select::new(&spec.title, options.clone())
                    .with_help_message(help)
                    .with_starting_cursor(start)
                    .prompt()?;
                Value::String(selected)
            } else {
                let def = init
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                let answer = if is_recording_path(&spec.name) {
                    prompt_path_until_ok(driver, spec, &def)?
                } else {
                    driver.ask_string(&spec.title, help, &def)?
                };
                let answer = answer.trim().to_string();
                if answer.is_empty() && !spec.required {
                    return Ok(None);
                }
                Value::String(answer)
            }
        }
    };

    Ok(Some(value))
}

fn is_recording_path(name: &str) -> bool {
    matches!(name, "path" | "base_file" | "training_file")
}

fn prompt_path_until_ok<D: PromptDriver>(
    driver: &D,
    spec: &FieldSpec,
    default: &str,
) -> Result<String> {
    let help = spec
        .description
        .as_deref()
        .unwrap_or("Please type a valid .jsonl recording path");
    loop {
        let answer = driver.ask_string(&spec.title, help, default)?;
        let trimmed = answer.trim();
        if trimmed.is_empty() && !spec.required {
            return Ok(String::new());
        }
        match validate_recording_path(trimmed) {
            Ok(()) => return Ok(trimmed.to_string()),
            Err(msg) => eprintln!("✗ {}", msg),
        }
    }
}

fn validate_recording_path(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Path cannot be empty".into());
    }
    let p = Path::new(input);
    if !p.exists() {
        return Err(format!("Path does not exist: {}", p.display()));
    }
    if !p.is_file() {
        return Err("Expected a file path, not a directory".into());
    }
    match p.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("jsonl") => Ok(()),
        _ => Err("Expected a .jsonl file".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::{is_recording_path, validate_recording_path};
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn recording_path_fields_are_recognized() {
        assert!(is_recording_path("path"));
        assert!(is_recording_path("base_file"));
        assert!(is_recording_path("training_file"));
        assert!(!is_recording_path("dump_file"));
    }

    #[test]
    fn missing_path_is_rejected() {
        assert!(validate_recording_path("").is_err());
        assert!(validate_recording_path("/definitely/not/there.jsonl").is_err());
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempdir().unwrap();
        let msg = validate_recording_path(dir.path().to_str().unwrap()).unwrap_err();
        assert!(msg.contains("not a directory") || msg.contains("file path"), "was: {msg}");
    }

    #[test]
    fn wrong_extension_is_rejected() {
        let file = NamedTempFile::with_suffix(".json").unwrap();
        assert!(validate_recording_path(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn jsonl_file_is_accepted() {
        let mut file = NamedTempFile::with_suffix(".jsonl").unwrap();
        writeln!(file, "{{}}").unwrap();
        assert!(validate_recording_path(file.path().to_str().unwrap()).is_ok());
    }
}
