//! Operation contracts: typed input/output shapes for generation calls and tools.
//!
//! A [`Shape`] is an ordered set of named fields with kinds and constraints.
//! Shapes validate `serde_json::Value`s and render themselves as JSON Schema so
//! the same declaration drives validation, model instructions, and tool
//! parameter advertisement.

mod invocation;

pub use invocation::*;

use serde_json::{json, Map, Value};

use crate::error::{ContractStage, ContractViolation};

/// Kind and constraints of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// String with a minimum length in characters, measured after trimming.
    Text { min_len: usize },
    /// Any JSON number within optional bounds.
    Number { min: Option<f64>, max: Option<f64> },
    /// Integral JSON number within optional bounds.
    Integer { min: Option<i64>, max: Option<i64> },
    /// JSON boolean.
    Boolean,
    /// String restricted to a fixed enumeration.
    OneOf(&'static [&'static str]),
    /// Array of non-empty strings.
    TextList { min_items: usize },
    /// Array of JSON objects.
    Records,
    /// A JSON object of any structure.
    Object,
}

/// A named field in a [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    /// Optional fields may be absent or `null`.
    pub required: bool,
}

/// Ordered set of named fields describing a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    fields: Vec<FieldSpec>,
}

impl Shape {
    /// Create an empty shape (accepts any object).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field.
    pub fn required(
        mut self,
        name: &'static str,
        description: &'static str,
        kind: FieldKind,
    ) -> Self {
        self.fields.push(FieldSpec {
            name,
            description,
            kind,
            required: true,
        });
        self
    }

    /// Add an optional field.
    pub fn optional(
        mut self,
        name: &'static str,
        description: &'static str,
        kind: FieldKind,
    ) -> Self {
        self.fields.push(FieldSpec {
            name,
            description,
            kind,
            required: false,
        });
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate `value` against this shape.
    ///
    /// Fields are checked in declaration order and the first violation is
    /// returned. Extra fields not declared by the shape are ignored.
    pub fn validate(
        &self,
        operation: &str,
        stage: ContractStage,
        value: &Value,
    ) -> Result<(), ContractViolation> {
        let violation = |field: &str, reason: String| ContractViolation {
            operation: operation.to_string(),
            stage,
            field: field.to_string(),
            reason,
        };

        let object = value.as_object().ok_or_else(|| {
            violation(
                "$",
                format!("expected object, got {}", json_type_name(value)),
            )
        })?;

        for spec in &self.fields {
            match object.get(spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        return Err(violation(spec.name, "is required".to_string()));
                    }
                }
                Some(field_value) => {
                    check_kind(&spec.kind, field_value)
                        .map_err(|reason| violation(spec.name, reason))?;
                }
            }
        }

        Ok(())
    }

    /// Render as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for spec in &self.fields {
            let mut property = kind_schema(&spec.kind);
            if !spec.description.is_empty() {
                property["description"] = json!(spec.description);
            }
            properties.insert(spec.name.to_string(), property);
            if spec.required {
                required.push(json!(spec.name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn check_kind(kind: &FieldKind, value: &Value) -> Result<(), String> {
    match kind {
        FieldKind::Text { min_len } => {
            let text = value
                .as_str()
                .ok_or_else(|| format!("expected string, got {}", json_type_name(value)))?;
            let len = text.trim().chars().count();
            if len < *min_len {
                return Err(format!(
                    "must be at least {} characters (got {})",
                    min_len, len
                ));
            }
            Ok(())
        }
        FieldKind::Number { min, max } => {
            let number = value
                .as_f64()
                .ok_or_else(|| format!("expected number, got {}", json_type_name(value)))?;
            if let Some(min) = min {
                if number < *min {
                    return Err(format!("must be at least {}", min));
                }
            }
            if let Some(max) = max {
                if number > *max {
                    return Err(format!("must be at most {}", max));
                }
            }
            Ok(())
        }
        FieldKind::Integer { min, max } => {
            let number = value
                .as_i64()
                .ok_or_else(|| format!("expected integer, got {}", json_type_name(value)))?;
            if let Some(min) = min {
                if number < *min {
                    return Err(format!("must be at least {}", min));
                }
            }
            if let Some(max) = max {
                if number > *max {
                    return Err(format!("must be at most {}", max));
                }
            }
            Ok(())
        }
        FieldKind::Boolean => value
            .as_bool()
            .map(|_| ())
            .ok_or_else(|| format!("expected boolean, got {}", json_type_name(value))),
        FieldKind::OneOf(allowed) => {
            let text = value
                .as_str()
                .ok_or_else(|| format!("expected string, got {}", json_type_name(value)))?;
            if allowed.contains(&text) {
                Ok(())
            } else {
                Err(format!("must be one of [{}], got '{}'", allowed.join(", "), text))
            }
        }
        FieldKind::TextList { min_items } => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("expected array, got {}", json_type_name(value)))?;
            if items.len() < *min_items {
                return Err(format!(
                    "must contain at least {} items (got {})",
                    min_items,
                    items.len()
                ));
            }
            for (idx, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(s) if !s.trim().is_empty() => {}
                    Some(_) => return Err(format!("item {} must not be empty", idx)),
                    None => {
                        return Err(format!(
                            "item {} expected string, got {}",
                            idx,
                            json_type_name(item)
                        ))
                    }
                }
            }
            Ok(())
        }
        FieldKind::Records => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("expected array, got {}", json_type_name(value)))?;
            match items.iter().position(|item| !item.is_object()) {
                Some(idx) => Err(format!("item {} expected object", idx)),
                None => Ok(()),
            }
        }
        FieldKind::Object => value
            .as_object()
            .map(|_| ())
            .ok_or_else(|| format!("expected object, got {}", json_type_name(value))),
    }
}

fn kind_schema(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Text { min_len } => {
            let mut schema = json!({"type": "string"});
            if *min_len > 0 {
                schema["minLength"] = json!(min_len);
            }
            schema
        }
        FieldKind::Number { min, max } => {
            let mut schema = json!({"type": "number"});
            if let Some(min) = min {
                schema["minimum"] = json!(min);
            }
            if let Some(max) = max {
                schema["maximum"] = json!(max);
            }
            schema
        }
        FieldKind::Integer { min, max } => {
            let mut schema = json!({"type": "integer"});
            if let Some(min) = min {
                schema["minimum"] = json!(min);
            }
            if let Some(max) = max {
                schema["maximum"] = json!(max);
            }
            schema
        }
        FieldKind::Boolean => json!({"type": "boolean"}),
        FieldKind::OneOf(allowed) => json!({"type": "string", "enum": allowed}),
        FieldKind::TextList { min_items } => {
            json!({"type": "array", "items": {"type": "string"}, "minItems": min_items})
        }
        FieldKind::Records => json!({"type": "array", "items": {"type": "object"}}),
        FieldKind::Object => json!({"type": "object"}),
    }
}

/// Get a human-readable type name for a JSON value.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Named operation with an input and an output shape.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationContract {
    pub name: &'static str,
    pub input: Shape,
    pub output: Shape,
}

impl OperationContract {
    /// Create a contract.
    pub fn new(name: &'static str, input: Shape, output: Shape) -> Self {
        Self {
            name,
            input,
            output,
        }
    }

    /// Validate a caller-supplied value against the input shape.
    pub fn validate_input(&self, value: &Value) -> Result<(), ContractViolation> {
        self.input.validate(self.name, ContractStage::Input, value)
    }

    /// Validate a produced value against the output shape.
    pub fn validate_output(&self, value: &Value) -> Result<(), ContractViolation> {
        self.output.validate(self.name, ContractStage::Output, value)
    }
}

/// Embed input fields into a `{{field}}` template.
///
/// String values are inserted verbatim, other values as compact JSON. Inserted
/// values are never re-scanned for placeholders.
pub fn render_template(
    operation: &str,
    template: &str,
    input: &Value,
) -> Result<String, ContractViolation> {
    let violation = |field: &str, reason: &str| ContractViolation {
        operation: operation.to_string(),
        stage: ContractStage::Input,
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| violation("$", "unterminated template placeholder"))?;
        let key = after[..end].trim();

        match input.get(key) {
            Some(Value::String(s)) => rendered.push_str(s),
            Some(Value::Null) | None => {
                return Err(violation(key, "no value for template placeholder"))
            }
            Some(other) => rendered.push_str(&other.to_string()),
        }

        rest = &after[end + 2..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

/// Extract JSON from a completion string, handling markdown code blocks.
///
/// Attempts extraction in this order:
/// 1. Raw JSON (fast path)
/// 2. ```json ... ``` code blocks
/// 3. ``` ... ``` code blocks
pub(crate) fn extract_json_from_completion(completion: &str) -> Result<&str, String> {
    let trimmed = completion.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    if completion.contains("```json") {
        return completion
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ```json block but content was empty or malformed".to_string());
    }

    if completion.contains("```") {
        return completion
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ``` block but content was empty or malformed".to_string());
    }

    Err(format!(
        "No JSON found in response. First 100 chars: '{}'",
        completion.chars().take(100).collect::<String>()
    ))
}
