// Validation layer: raw request body -> normalized, typed request or a list
// of field-level errors. No I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

pub mod schemas;

pub use schemas::{LoginRequest, RefreshRequest, RegisterRequest};

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
    pub code: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// JSON type a request field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Bool => value.is_boolean(),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Bool => "a boolean",
        }
    }
}

/// A request body schema: its field types and the cleanup applied before
/// the rules run (trimming, case folding)
pub trait Schema: Sized {
    const FIELDS: &'static [(&'static str, FieldKind)];

    fn normalize(self) -> Self {
        self
    }
}

/// Flatten validator output into `FieldError`s
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let path = field.to_string();
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", path));
                FieldError::new(path.clone(), message, e.code.to_string())
            })
        })
        .collect()
}

fn sorted(mut errors: Vec<FieldError>) -> Vec<FieldError> {
    errors.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.code.cmp(&b.code)));
    errors
}

/// Drop null and wrong-typed fields so they fall back to their defaults.
/// A wrong type is reported at the field's path; null counts as absent.
fn strip_mismatched<T: Schema>(object: &mut Map<String, Value>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (name, kind) in T::FIELDS {
        let Some(value) = object.get(*name) else {
            continue;
        };
        if value.is_null() {
            object.remove(*name);
        } else if !kind.matches(value) {
            errors.push(FieldError::new(
                *name,
                format!("{} must be {}", name, kind.expected()),
                "invalid_type",
            ));
            object.remove(*name);
        }
    }

    errors
}

/// Parse, normalize and validate a request body.
/// An empty body is treated as `{}` so optional-only schemas accept it.
pub fn parse<T>(body: &[u8]) -> Result<T, Vec<FieldError>>
where
    T: DeserializeOwned + Validate + Schema,
{
    let raw = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };

    let value: Value = serde_json::from_slice(raw).map_err(|e| {
        vec![FieldError::new("body", format!("Malformed JSON body: {}", e), "invalid_json")]
    })?;

    let Value::Object(mut object) = value else {
        return Err(vec![FieldError::new(
            "body",
            "Request body must be a JSON object",
            "invalid_json",
        )]);
    };

    let type_errors = strip_mismatched::<T>(&mut object);

    let typed: T = serde_json::from_value(Value::Object(object))
        .map_err(|e| vec![FieldError::new("body", e.to_string(), "invalid_type")])?;
    let typed = typed.normalize();

    let mut errors = match typed.validate() {
        Ok(()) => Vec::new(),
        // A field with the wrong type only reports that
        Err(e) => field_errors(&e)
            .into_iter()
            .filter(|err| !type_errors.iter().any(|t| t.path == err.path))
            .collect(),
    };
    errors.extend(type_errors);

    if errors.is_empty() {
        Ok(typed)
    } else {
        Err(sorted(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_missing_email_reports_email_path() {
        let errors = parse::<RegisterRequest>(
            br#"{"fullname":"A B","password":"Str0ng!pwd","terms":true}"#,
        )
        .unwrap_err();
        assert_eq!(errors, vec![FieldError::new("email", "Email is required", "required")]);
    }

    #[test]
    fn test_register_malformed_email() {
        let errors = parse::<RegisterRequest>(
            br#"{"fullname":"A B","email":"nope","password":"Str0ng!pwd","terms":true}"#,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "email");
        assert_eq!(errors[0].code, "email");
    }

    #[test]
    fn test_register_collects_every_field() {
        let errors = parse::<RegisterRequest>(br#"{}"#).unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["email", "fullname", "password", "terms"]);
    }

    #[test]
    fn test_register_valid_body() {
        let request = parse::<RegisterRequest>(
            br#"{"fullname":"A B","email":"a@b.com","password":"Str0ng!pwd","terms":true}"#,
        )
        .unwrap();
        assert_eq!(request.email, "a@b.com");
        assert!(request.terms);
    }

    #[test]
    fn test_login_remember_defaults_false() {
        let request = parse::<LoginRequest>(br#"{"email":"a@b.com","password":"Str0ng!pwd"}"#).unwrap();
        assert!(!request.remember);
    }

    #[test]
    fn test_refresh_accepts_empty_body() {
        let request = parse::<RefreshRequest>(b"").unwrap();
        assert!(!request.remember);
        let request = parse::<RefreshRequest>(br#"{"remember":true}"#).unwrap();
        assert!(request.remember);
    }

    #[test]
    fn test_malformed_json_is_body_error() {
        let errors = parse::<LoginRequest>(b"{not json").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "body");
        assert_eq!(errors[0].code, "invalid_json");

        let errors = parse::<LoginRequest>(b"[1,2]").unwrap_err();
        assert_eq!(errors[0].code, "invalid_json");
    }

    #[test]
    fn test_wrong_type_is_reported_at_field() {
        let errors = parse::<LoginRequest>(br#"{"email":"a@b.com","password":"Str0ng!pwd","remember":"yes"}"#)
            .unwrap_err();
        assert_eq!(errors, vec![FieldError::new("remember", "remember must be a boolean", "invalid_type")]);
    }

    #[test]
    fn test_null_email_is_required() {
        let errors = parse::<RegisterRequest>(
            br#"{"fullname":"A B","email":null,"password":"Str0ng!pwd","terms":true}"#,
        )
        .unwrap_err();
        assert_eq!(errors, vec![FieldError::new("email", "Email is required", "required")]);
    }

    #[test]
    fn test_numeric_email_keeps_other_field_errors() {
        let errors = parse::<RegisterRequest>(br#"{"fullname":"A B","email":123,"password":"weak","terms":true}"#)
            .unwrap_err();
        let found: Vec<(&str, &str)> = errors.iter().map(|e| (e.path.as_str(), e.code.as_str())).collect();
        assert_eq!(found, vec![("email", "invalid_type"), ("password", "length")]);
    }

    #[test]
    fn test_every_mistyped_field_is_listed() {
        let errors = parse::<RegisterRequest>(br#"{"fullname":7,"email":[],"password":{},"terms":"yes"}"#)
            .unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["email", "fullname", "password", "terms"]);
        assert!(errors.iter().all(|e| e.code == "invalid_type"));
    }
}
