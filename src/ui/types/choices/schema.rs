use anyhow::{Context, Result, anyhow, bail};
use schemars::Schema;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
}

/// One promptable parameter, lifted out of a choice's JSON schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allowed: Option<Vec<String>>,
}

/// Extracts the parameter fields of the tagged-enum branch whose `type`
/// discriminant equals `kind_key`.
pub fn field_specs(root: &Schema, kind_key: &str) -> Result<Vec<FieldSpec>> {
    let root_obj = root.as_object().context("root schema is not an object")?;

    let branches = root_obj
        .get("oneOf")
        .or_else(|| root_obj.get("anyOf"))
        .and_then(Value::as_array)
        .context("schema has no oneOf/anyOf branches")?;

    for branch in branches {
        let Some(props) = branch.get("properties").and_then(Value::as_object) else {
            continue;
        };
        if !tag_matches(props, kind_key) {
            continue;
        }

        let Some(params) = props.get("params").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };
        let Some(params) = deref(root_obj, params) else {
            return Ok(Vec::new());
        };
        let Some(fields) = params.get("properties").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };

        let required: Vec<&str> = params
            .get("required")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut specs = Vec::new();
        for (name, field_schema) in fields {
            let Some(mut field) = field_schema.as_object() else {
                continue;
            };
            if field.get("$ref").is_some() {
                field = deref(root_obj, field)
                    .ok_or_else(|| anyhow!("unresolved $ref for field '{name}'"))?;
            }

            // Anything without a promptable primitive type is skipped; the
            // caller is expected to fill those via subprompts.
            let Some(kind) = field_kind(field.get("type")) else {
                continue;
            };

            specs.push(FieldSpec {
                name: name.clone(),
                title: field
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(name)
                    .to_string(),
                description: field
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                required: required.contains(&name.as_str()),
                kind,
                default: field.get("default").cloned(),
                min: field.get("minimum").and_then(Value::as_f64),
                max: field.get("maximum").and_then(Value::as_f64),
                allowed: field.get("enum").and_then(Value::as_array).map(|a| {
                    a.iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                }),
            });
        }
        return Ok(specs);
    }

    bail!("no schema branch for type={kind_key}")
}

fn tag_matches(props: &Map<String, Value>, kind_key: &str) -> bool {
    let Some(tag) = props.get("type").and_then(Value::as_object) else {
        return false;
    };
    if tag.get("const").and_then(Value::as_str) == Some(kind_key) {
        return true;
    }
    matches!(
        tag.get("enum").and_then(Value::as_array),
        Some(arr) if arr.len() == 1 && arr[0].as_str() == Some(kind_key)
    )
}

/// Follows a local `#/...` reference against the root object; non-references
/// resolve to themselves.
fn deref<'a>(
    root: &'a Map<String, Value>,
    obj: &'a Map<String, Value>,
) -> Option<&'a Map<String, Value>> {
    let Some(Value::String(reference)) = obj.get("$ref") else {
        return Some(obj);
    };
    let mut current = root;
    for segment in reference.strip_prefix("#/")?.split('/') {
        current = current.get(segment)?.as_object()?;
    }
    Some(current)
}

fn field_kind(ty: Option<&Value>) -> Option<FieldKind> {
    fn single(s: &str) -> Option<FieldKind> {
        match s {
            "string" => Some(FieldKind::String),
            "integer" => Some(FieldKind::Integer),
            "number" => Some(FieldKind::Number),
            "boolean" => Some(FieldKind::Boolean),
            _ => None,
        }
    }

    match ty {
        Some(Value::String(s)) => single(s),
        // Unions like ["integer", "null"] come from Option<T> fields.
        Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).find_map(single),
        _ => None,
    }
}
