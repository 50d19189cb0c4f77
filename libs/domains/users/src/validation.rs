//! Casting and required-field rules for user input.
//!
//! Create treats falsy values (`null`, `false`, `0`, `""`) as absent, so a
//! falsy `isAdmin` falls back to `false` and a falsy `username` is reported
//! as missing. Patch assigns every field that is present and re-checks the
//! merged document, so an explicit `null` fails the required rule.

use serde_json::{Map, Value, json};
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

use crate::models::{NewUser, UserDocument, UserInput};

pub const USERNAME: &str = "username";
pub const IS_ADMIN: &str = "isAdmin";

const KIND_REQUIRED: &str = "required";
const KIND_STRING: &str = "string";
const KIND_BOOLEAN: &str = "Boolean";

/// Validates create input and builds the record to insert.
pub fn new_user(input: &UserInput) -> Result<NewUser, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let username = match input.username.as_ref().filter(|v| is_truthy(v)) {
        Some(value) => cast_username(value).map_err(|e| errors.add(USERNAME, e)).ok(),
        None => {
            errors.add(USERNAME, required(USERNAME));
            None
        }
    };

    let is_admin = match input.is_admin.as_ref().filter(|v| is_truthy(v)) {
        Some(value) => cast_boolean(IS_ADMIN, value)
            .map_err(|e| errors.add(IS_ADMIN, e))
            .unwrap_or_default(),
        None => false,
    };

    match username {
        Some(username) if errors.is_empty() => Ok(NewUser { username, is_admin }),
        _ => Err(errors),
    }
}

/// Merges patch input onto an existing document.
///
/// Fields absent from the input keep their stored value. The returned
/// document still carries the old revision.
pub fn merge(existing: &UserDocument, input: &UserInput) -> Result<UserDocument, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut merged = existing.clone();

    if let Some(value) = &input.username {
        if value.is_null() || value.as_str() == Some("") {
            errors.add(USERNAME, required(USERNAME));
        } else {
            match cast_username(value) {
                Ok(username) => merged.username = username,
                Err(e) => errors.add(USERNAME, e),
            }
        }
    }

    if let Some(value) = &input.is_admin {
        if value.is_null() {
            errors.add(IS_ADMIN, required(IS_ADMIN));
        } else {
            match cast_boolean(IS_ADMIN, value) {
                Ok(is_admin) => merged.is_admin = is_admin,
                Err(e) => errors.add(IS_ADMIN, e),
            }
        }
    }

    if errors.is_empty() { Ok(merged) } else { Err(errors) }
}

/// Renders validation errors as a JSON object keyed by field.
///
/// ```json
/// { "username": { "path": "username", "kind": "required", "message": "Path `username` is required." } }
/// ```
pub fn error_body(errors: &ValidationErrors) -> Value {
    let mut body = Map::new();

    for (field, field_errors) in errors.field_errors() {
        let Some(error) = field_errors.first() else {
            continue;
        };

        let mut entry = Map::new();
        entry.insert("path".to_string(), json!(field.to_string()));
        entry.insert("kind".to_string(), json!(error.code));
        entry.insert("message".to_string(), json!(message_of(error)));
        if let Some(value) = error.params.get("value") {
            entry.insert("value".to_string(), value.clone());
        }

        body.insert(field.to_string(), Value::Object(entry));
    }

    Value::Object(body)
}

/// One-line summary, fields sorted by name.
pub fn summary(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, field_errors)| {
            field_errors
                .first()
                .map(|error| format!("{}: {}", field, message_of(error)))
        })
        .collect();
    parts.sort();
    parts.join(", ")
}

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn cast_username(value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(cast_error(USERNAME, KIND_STRING, value)),
    }
}

fn cast_boolean(path: &'static str, value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_f64() == Some(1.0) => Ok(true),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(false),
        Value::String(s) => match s.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(cast_error(path, KIND_BOOLEAN, value)),
        },
        _ => Err(cast_error(path, KIND_BOOLEAN, value)),
    }
}

fn required(path: &'static str) -> ValidationError {
    ValidationError::new(KIND_REQUIRED).with_message(Cow::Owned(format!(
        "Path `{}` is required.",
        path
    )))
}

fn cast_error(path: &'static str, kind: &'static str, value: &Value) -> ValidationError {
    let shown = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let mut error = ValidationError::new(kind).with_message(Cow::Owned(format!(
        "Cast to {} failed for value \"{}\" (type {}) at path \"{}\"",
        kind,
        shown,
        type_name(value),
        path
    )));
    error.add_param(Cow::Borrowed("value"), value);
    error
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}
