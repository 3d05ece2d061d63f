use serde_json::{Map, Value};
use thiserror::Error;

/// Fields a relation body (`POST /scientists/:id/devices`) must carry.
pub const RELATION_FIELDS: &[&str] = &["id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON number without a fractional part that fits in 32 bits.
    Integer,
    String,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Integer => as_i32(value).is_some(),
            FieldKind::String => value.is_string(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::String => "string",
        }
    }
}

/// Type and constraint of one named request field.
///
/// The constraint only runs on values that already passed the type check.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub constraint: fn(&Value) -> bool,
    pub describe: &'static str,
}

fn positive(value: &Value) -> bool {
    as_i32(value).map_or(false, |n| n > 0)
}

fn non_negative(value: &Value) -> bool {
    as_i32(value).map_or(false, |n| n >= 0)
}

fn non_empty(value: &Value) -> bool {
    value.as_str().map_or(false, |s| !s.is_empty())
}

pub static FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        name: "id",
        kind: FieldKind::Integer,
        constraint: positive,
        describe: "must be greater than 0",
    },
    FieldRule {
        name: "name",
        kind: FieldKind::String,
        constraint: non_empty,
        describe: "must not be empty",
    },
    FieldRule {
        name: "madness",
        kind: FieldKind::Integer,
        constraint: non_negative,
        describe: "must not be negative",
    },
    FieldRule {
        name: "tries",
        kind: FieldKind::Integer,
        constraint: non_negative,
        describe: "must not be negative",
    },
    FieldRule {
        name: "power",
        kind: FieldKind::Integer,
        constraint: non_negative,
        describe: "must not be negative",
    },
];

pub fn field_rule(name: &str) -> Option<&'static FieldRule> {
    FIELD_RULES.iter().find(|rule| rule.name == name)
}

fn as_i32(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("field '{field}' must be of type {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    #[error("field '{field}' {reason}")]
    ConstraintFailed { field: String, reason: &'static str },
}

/// Parse a raw request body. An empty or unparseable body is a validation
/// failure, not a server error.
pub fn parse_payload(body: &[u8]) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|e| ValidationError::MalformedJson(e.to_string()))
}

/// Check `payload` against the `required` field names.
///
/// Every required key must be present. Keys that are not required are
/// dropped before the type and constraint checks, so an extra field never
/// rejects a request even when its value is malformed. Field names without a
/// rule pass unchecked. On success the filtered copy is returned; the
/// caller's payload is left untouched.
pub fn check(payload: &Value, required: &[&str]) -> Result<Map<String, Value>, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(missing) = required.iter().find(|key| !object.contains_key(**key)) {
        return Err(ValidationError::MissingField(missing.to_string()));
    }

    let filtered: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| required.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in &filtered {
        if let Some(rule) = field_rule(key) {
            if !rule.kind.matches(value) {
                return Err(ValidationError::WrongType {
                    field: key.clone(),
                    expected: rule.kind.label(),
                });
            }
        }
    }

    for (key, value) in &filtered {
        if let Some(rule) = field_rule(key) {
            if !(rule.constraint)(value) {
                return Err(ValidationError::ConstraintFailed {
                    field: key.clone(),
                    reason: rule.describe,
                });
            }
        }
    }

    Ok(filtered)
}

pub fn validate(payload: &Value, required: &[&str]) -> bool {
    check(payload, required).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCIENTIST: &[&str] = &["name", "madness", "tries"];

    #[test]
    fn test_accepts_complete_payload() {
        let payload = json!({"name": "James Watt", "madness": 50, "tries": 1});
        assert!(validate(&payload, SCIENTIST));
        assert!(validate(&json!({"name": "Bomb", "power": 0}), &["name", "power"]));
        assert!(validate(&json!({"id": 1}), RELATION_FIELDS));
    }

    #[test]
    fn test_missing_keys() {
        assert!(!validate(&json!({}), &["name"]));
        assert_eq!(
            check(&json!({"name": "James Watt", "madness": 50}), SCIENTIST),
            Err(ValidationError::MissingField("tries".to_string()))
        );
        // Key order in the payload does not matter
        assert!(validate(&json!({"tries": 0, "madness": 0, "name": "A"}), SCIENTIST));
        // Nothing required, nothing to fail
        assert!(validate(&json!({"anything": [1, 2]}), &[]));
    }

    #[test]
    fn test_excess_fields_are_dropped_before_checks() {
        let payload = json!({"name": "Amy", "madness": 1, "tries": 2, "weight": "heavy", "id": -4});
        let filtered = check(&payload, SCIENTIST).unwrap();
        assert_eq!(filtered.len(), 3);
        assert!(!filtered.contains_key("weight"));
        assert!(!filtered.contains_key("id"));

        // The caller's payload is not modified
        assert_eq!(payload.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_type_mismatches() {
        assert_eq!(
            check(&json!({"name": 5, "madness": 1, "tries": 1}), SCIENTIST),
            Err(ValidationError::WrongType {
                field: "name".to_string(),
                expected: "string"
            })
        );
        assert!(!validate(&json!({"name": "A", "madness": 1, "tries": "not integer"}), SCIENTIST));
        assert!(!validate(&json!({"id": 5.7}), RELATION_FIELDS));
        assert!(!validate(&json!({"id": 5.0}), RELATION_FIELDS));
        assert!(!validate(&json!({"id": null}), RELATION_FIELDS));
        assert!(!validate(&json!({"id": 1_099_511_627_776u64}), RELATION_FIELDS));
    }

    #[test]
    fn test_constraints() {
        assert!(!validate(&json!({"name": "", "madness": 1, "tries": 1}), SCIENTIST));
        assert!(!validate(&json!({"name": "A", "madness": -1, "tries": 1}), SCIENTIST));
        assert!(!validate(&json!({"name": "A", "madness": 1, "tries": -1}), SCIENTIST));
        assert!(!validate(&json!({"name": "Bomb", "power": -100}), &["name", "power"]));
        assert_eq!(
            check(&json!({"id": 0}), RELATION_FIELDS),
            Err(ValidationError::ConstraintFailed {
                field: "id".to_string(),
                reason: "must be greater than 0"
            })
        );
        assert!(validate(&json!({"name": "A", "madness": 0, "tries": 0}), SCIENTIST));
    }

    #[test]
    fn test_unknown_required_field_is_not_type_checked() {
        assert!(validate(&json!({"colour": [1, 2, 3]}), &["colour"]));
    }

    #[test]
    fn test_non_object_payloads() {
        assert_eq!(check(&json!([1, 2]), &["id"]), Err(ValidationError::NotAnObject));
        assert!(!validate(&json!("name"), &[]));
    }

    #[test]
    fn test_parse_payload() {
        assert!(parse_payload(br#"{"id": 3}"#).is_ok());
        assert!(matches!(parse_payload(b""), Err(ValidationError::MalformedJson(_))));
        assert!(matches!(parse_payload(b"{name:"), Err(ValidationError::MalformedJson(_))));
    }
}
