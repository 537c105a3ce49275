//! Conversion of text typed into a grid cell into the JSON value that is
//! sent to the server, and back for display.

use super::field::{FieldDescriptor, FieldKind};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("{field}: '{raw}' is not an integer")]
    NotAnInteger { field: String, raw: String },
    #[error("{field}: '{raw}' is not a number")]
    NotANumber { field: String, raw: String },
    #[error("{field}: value is required")]
    Required { field: String },
}

impl CommitError {
    /// Column whose input was rejected.
    pub fn field(&self) -> &str {
        match self {
            Self::NotAnInteger { field, .. }
            | Self::NotANumber { field, .. }
            | Self::Required { field } => field,
        }
    }
}

/// Value committed by a foreign-key input. Numeric references become JSON
/// integers, the others keep the raw text. Blank input clears the reference.
pub fn commit_foreign_key_value(
    field: &str,
    raw: &str,
    numeric: bool,
) -> Result<Value, CommitError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if !numeric {
        return Ok(Value::String(raw.to_string()));
    }
    trimmed
        .parse::<i64>()
        .map(Value::from)
        .map_err(|_| CommitError::NotAnInteger {
            field: field.to_string(),
            raw: raw.to_string(),
        })
}

/// Value committed by any data cell, according to its descriptor.
pub fn commit_value(field: &FieldDescriptor, raw: &str) -> Result<Value, CommitError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        if field.required {
            return Err(CommitError::Required {
                field: field.name.to_string(),
            });
        }
        return Ok(Value::Null);
    }

    match field.kind {
        FieldKind::Text => Ok(Value::String(raw.to_string())),
        FieldKind::Number { integer: true } => {
            trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| CommitError::NotAnInteger {
                    field: field.name.to_string(),
                    raw: raw.to_string(),
                })
        }
        FieldKind::Number { integer: false } => trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CommitError::NotANumber {
                field: field.name.to_string(),
                raw: raw.to_string(),
            }),
        FieldKind::ForeignKey => {
            let numeric = field.foreign_key.map(|fk| fk.numeric).unwrap_or(false);
            commit_foreign_key_value(field.name, raw, numeric)
        }
        FieldKind::Control => Ok(Value::Null),
    }
}

/// Text shown in display mode and prefilled into edit inputs.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_foreign_key_commits_integer() {
        let v = commit_foreign_key_value("fg_city_id", " 42 ", true).unwrap();
        assert_eq!(v, json!(42));
        assert!(v.is_i64());
    }

    #[test]
    fn test_text_foreign_key_commits_raw_string() {
        let v = commit_foreign_key_value("fg_country_name", "42", false).unwrap();
        assert_eq!(v, Value::String("42".into()));
    }

    #[test]
    fn test_foreign_key_blank_and_invalid() {
        assert_eq!(commit_foreign_key_value("f", "  ", true), Ok(Value::Null));
        assert!(matches!(
            commit_foreign_key_value("f", "12abc", true),
            Err(CommitError::NotAnInteger { .. })
        ));
    }

    #[test]
    fn test_commit_value_by_kind() {
        let area = FieldDescriptor::real("area_m2", "Area", 100);
        assert_eq!(commit_value(&area, "12.5").unwrap(), json!(12.5));
        assert!(commit_value(&area, "NaN").is_err());

        let population = FieldDescriptor::integer("population", "Population", 100);
        assert_eq!(commit_value(&population, "1000").unwrap(), json!(1000));
        let err = commit_value(&population, "1e3").unwrap_err();
        assert_eq!(err.field(), "population");

        let id = FieldDescriptor::integer("city_id", "Id", 70).as_key();
        assert_eq!(
            commit_value(&id, ""),
            Err(CommitError::Required {
                field: "city_id".into()
            })
        );

        let fk = FieldDescriptor::foreign_key("fg_city_id", "City", 100, "cities", "city_id", true);
        assert_eq!(commit_value(&fk, "7").unwrap(), json!(7));
    }

    #[test]
    fn test_blank_required_column_is_commit_error() {
        let climate = FieldDescriptor::text("climate", "Climate", 110).required();
        assert_eq!(
            commit_value(&climate, "   "),
            Err(CommitError::Required {
                field: "climate".into()
            })
        );

        let area = FieldDescriptor::real("area_m2", "Area", 110).required();
        assert!(matches!(
            commit_value(&area, ""),
            Err(CommitError::Required { .. })
        ));

        let centre = FieldDescriptor::foreign_key(
            "fg_centre_city_id",
            "Centre city",
            110,
            "cities",
            "city_id",
            true,
        );
        assert_eq!(commit_value(&centre, ""), Ok(Value::Null));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(None), "");
        assert_eq!(display_value(Some(&Value::Null)), "");
        assert_eq!(display_value(Some(&json!("Asia"))), "Asia");
        assert_eq!(display_value(Some(&json!(7))), "7");
    }
}
