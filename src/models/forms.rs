use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use super::validation::{is_valid_username, FormErrors, REQUIRED_MESSAGE};

/// Registration submission. Every field defaults to empty so a missing input
/// is reported as a field error instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 150, message = "Enter a username of 1 to 150 characters."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password1: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password2: String,
    #[validate(length(min = 1, max = 20, message = "Enter a phone number of at most 20 characters."))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub dob: String,
    #[validate(length(min = 1, max = 255, message = "Enter a hospital name of at most 255 characters."))]
    pub hospital_name: String,
}

/// The registration fields after cleaning; the password is still plain text.
#[derive(Debug, Clone)]
pub struct CleanedRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub dob: NaiveDate,
    pub hospital_name: String,
}

impl RegisterForm {
    /// Field-level checks that need no database access.
    pub fn clean(&self) -> Result<CleanedRegistration, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let username = self.username.trim();
        if !username.is_empty() && !is_valid_username(username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if !self.password2.is_empty() && self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        let dob = match NaiveDate::parse_from_str(self.dob.trim(), "%Y-%m-%d") {
            Ok(dob) => Some(dob),
            Err(_) => {
                if !self.dob.trim().is_empty() {
                    errors.add("dob", "Enter a valid date.");
                }
                None
            }
        };

        errors.into_result()?;

        Ok(CleanedRegistration {
            username: username.to_string(),
            email: self.email.trim().to_string(),
            password: self.password1.clone(),
            phone_number: self.phone_number.trim().to_string(),
            // Unparsed dates were either reported above or are blank, which
            // `validate()` already rejected.
            dob: dob.unwrap_or_default(),
            hospital_name: self.hospital_name.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.username.is_empty() {
            errors.add("username", REQUIRED_MESSAGE);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED_MESSAGE);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtpForm {
    pub otp: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordForm {
    pub password: String,
}
