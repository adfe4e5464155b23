use std::sync::Arc;

use crate::auth::{
    hash_password_blocking, validate_password_strength, verify_password_blocking, AuthError, PasswordPolicy,
};
use crate::models::{FormErrors, NewAccount, RegisterForm, User};
use crate::services::UserRepository;

pub const INVALID_LOGIN_MESSAGE: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Registration and credential checks over a [`UserRepository`].
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    policy: PasswordPolicy,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            policy: PasswordPolicy::default(),
        }
    }

    /// Create the account and its profile. Validation problems come back as
    /// form errors in the inner result; storage failures as `AuthError`.
    #[tracing::instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegisterForm) -> Result<Result<User, FormErrors>, AuthError> {
        let cleaned = match form.clean() {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(Err(errors)),
        };

        let mut errors = FormErrors::new();
        if let Err(e) = validate_password_strength(&cleaned.password, &self.policy) {
            errors.add("password2", e.to_string());
        }
        if self.users.find_by_username(&cleaned.username).await?.is_some() {
            errors.add("username", AuthError::UsernameTaken.to_string());
        }
        if self.users.find_by_email(&cleaned.email).await?.is_some() {
            errors.add("email", AuthError::EmailTaken.to_string());
        }
        if let Err(errors) = errors.into_result() {
            return Ok(Err(errors));
        }

        let account = NewAccount {
            password_hash: hash_password_blocking(&cleaned.password).await?,
            username: cleaned.username,
            email: cleaned.email,
            phone_number: cleaned.phone_number,
            dob: cleaned.dob,
            hospital_name: cleaned.hospital_name,
        };

        // A concurrent registration can still win the race for the name.
        match self.users.create_account(account).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account registered");
                Ok(Ok(user))
            }
            Err(e @ AuthError::UsernameTaken) => Ok(Err(single_error("username", e))),
            Err(e @ AuthError::EmailTaken) => Ok(Err(single_error("email", e))),
            Err(e) => Err(e),
        }
    }

    /// The active user owning these credentials, if any.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, AuthError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };

        if !user.is_active || !verify_password_blocking(password, &user.password_hash).await? {
            tracing::info!(user_id = %user.id, "rejected login attempt");
            return Ok(None);
        }

        self.users.record_login(user.id).await?;
        Ok(Some(user))
    }
}

fn single_error(field: &str, error: AuthError) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add(field, error.to_string());
    errors
}
