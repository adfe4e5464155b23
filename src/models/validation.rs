use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use validator::ValidationErrors;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Field name -> messages, the shape a form view redisplays next to its inputs.
/// Errors that belong to the form as a whole live under [`FormErrors::NON_FIELD`].
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(Self::NON_FIELD, message);
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", error.code));
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

/// Letters, digits and `@ . + - _`, the usual account-name alphabet.
pub fn is_valid_username(username: &str) -> bool {
    static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[\w.@+-]+$").expect("username pattern is a valid regex")
    });
    re.is_match(username)
}
