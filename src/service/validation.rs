//! Request validation for user payloads.

use crate::error::AppError;
use crate::model::{Role, Status, UserDraft};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug)]
enum Kind {
    Text,
    Number,
}

#[derive(Clone, Copy, Debug)]
enum Format {
    Email,
}

/// Constraints for one payload field.
#[derive(Debug)]
struct FieldRule {
    field: &'static str,
    kind: Kind,
    min_length: Option<usize>,
    max_length: Option<usize>,
    format: Option<Format>,
    /// Compared case-insensitively.
    allowed: Option<&'static [&'static str]>,
    minimum: Option<f64>,
}

impl FieldRule {
    const fn text(field: &'static str) -> Self {
        FieldRule {
            field,
            kind: Kind::Text,
            min_length: None,
            max_length: None,
            format: None,
            allowed: None,
            minimum: None,
        }
    }

    const fn number(field: &'static str) -> Self {
        FieldRule {
            kind: Kind::Number,
            ..FieldRule::text(field)
        }
    }
}

/// Checked in order; the first failing field is reported.
const USER_RULES: &[FieldRule] = &[
    FieldRule {
        min_length: Some(2),
        max_length: Some(30),
        ..FieldRule::text("name")
    },
    FieldRule {
        allowed: Some(&["admin", "user", "viewer"]),
        ..FieldRule::text("role")
    },
    FieldRule {
        allowed: Some(&["active", "inactive"]),
        ..FieldRule::text("status")
    },
    FieldRule {
        format: Some(Format::Email),
        ..FieldRule::text("email")
    },
    FieldRule {
        minimum: Some(0.0),
        ..FieldRule::number("salary")
    },
];

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create/update body and return the typed draft. Every field is required;
    /// `id` and unknown keys are ignored.
    pub fn validate_user(body: &Map<String, Value>) -> Result<UserDraft, AppError> {
        for rule in USER_RULES {
            match body.get(rule.field) {
                None | Some(Value::Null) => {
                    return Err(AppError::validation(
                        rule.field,
                        format!("{} is required", rule.field),
                    ))
                }
                Some(v) => validate_field(v, rule)?,
            }
        }
        Ok(UserDraft {
            name: text(body, "name")?.to_string(),
            email: text(body, "email")?.to_string(),
            role: text(body, "role")?
                .parse::<Role>()
                .map_err(|_| AppError::validation("role", "role is invalid"))?,
            status: text(body, "status")?
                .parse::<Status>()
                .map_err(|_| AppError::validation("status", "status is invalid"))?,
            salary: number(body.get("salary"))
                .ok_or_else(|| AppError::validation("salary", "salary must be a number"))?,
        })
    }
}

fn text<'a>(body: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, AppError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::validation(field, format!("{} must be a string", field)))
}

/// Numbers, and strings holding a finite number, are accepted.
fn number(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn validate_field(v: &Value, rule: &FieldRule) -> Result<(), AppError> {
    let col = rule.field;
    match rule.kind {
        Kind::Text => {
            let s = v
                .as_str()
                .ok_or_else(|| AppError::validation(col, format!("{} must be a string", col)))?;
            let len = s.chars().count();
            if let Some(min) = rule.min_length {
                if len < min {
                    return Err(AppError::validation(
                        col,
                        format!("{} must be at least {} characters", col, min),
                    ));
                }
            }
            if let Some(max) = rule.max_length {
                if len > max {
                    return Err(AppError::validation(
                        col,
                        format!("{} must be at most {} characters", col, max),
                    ));
                }
            }
            if let Some(format) = rule.format {
                validate_format(col, s, format)?;
            }
            if let Some(allowed) = rule.allowed {
                if !allowed.iter().any(|a| a.eq_ignore_ascii_case(s)) {
                    return Err(AppError::validation(
                        col,
                        format!("{} must be one of: {}", col, allowed.join(", ")),
                    ));
                }
            }
        }
        Kind::Number => {
            let n = number(Some(v))
                .ok_or_else(|| AppError::validation(col, format!("{} must be a number", col)))?;
            if let Some(min) = rule.minimum {
                if n < min {
                    return Err(AppError::validation(
                        col,
                        format!("{} must be greater than or equal to {}", col, min),
                    ));
                }
            }
        }
    }
    Ok(())
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid email pattern"));

fn validate_format(col: &'static str, s: &str, format: Format) -> Result<(), AppError> {
    match format {
        Format::Email => {
            if !EMAIL_RE.is_match(s) {
                return Err(AppError::validation(col, format!("{} must be a valid email", col)));
            }
        }
    }
    Ok(())
}
