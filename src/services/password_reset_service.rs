use std::sync::Arc;

use crate::auth::{
    generate_otp, hash_password_blocking, otp_matches, validate_password_strength, AuthError, PasswordPolicy,
    ResetStage, Session,
};
use crate::models::{FormErrors, User, REQUIRED_MESSAGE};
use crate::services::mailer::{Mailer, OutboundEmail};
use crate::services::UserRepository;

pub const EMAIL_NOT_FOUND_MESSAGE: &str = "Email not found!";
pub const INVALID_OTP_MESSAGE: &str = "Invalid OTP!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpRequestOutcome {
    Sent,
    /// Reported to the caller as is, which tells existing and unknown
    /// addresses apart.
    EmailNotFound,
}

#[derive(Debug, Clone)]
pub enum ResetOutcome {
    /// The session never got past OTP verification.
    NotVerified,
    Invalid(FormErrors),
    /// The session email no longer belongs to an account.
    UnknownAccount,
    Reset(User),
}

/// The three-step OTP password reset, with all state held in the caller's session.
#[derive(Clone)]
pub struct PasswordResetService {
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    from_email: String,
    policy: PasswordPolicy,
}

impl PasswordResetService {
    pub fn new(users: Arc<dyn UserRepository>, mailer: Arc<dyn Mailer>, from_email: impl Into<String>) -> Self {
        Self {
            users,
            mailer,
            from_email: from_email.into(),
            policy: PasswordPolicy::default(),
        }
    }

    /// Step 1. For a known address: store a fresh code and the address in the
    /// session, then mail the code. Unknown addresses leave the session untouched.
    #[tracing::instrument(skip(self, session))]
    pub async fn request_otp(&self, session: &Session, email: &str) -> Result<OtpRequestOutcome, AuthError> {
        if self.users.find_by_email(email).await?.is_none() {
            return Ok(OtpRequestOutcome::EmailNotFound);
        }

        let otp = generate_otp();
        session.update(|data| {
            data.otp = Some(otp.clone());
            data.email = Some(email.to_string());
            data.otp_verified = false;
        });

        self.mailer
            .send(&OutboundEmail::password_reset(&self.from_email, email, &otp))
            .await?;

        tracing::info!("password reset code issued");
        Ok(OtpRequestOutcome::Sent)
    }

    /// Step 2. Exact match against the session code. The code is never
    /// consumed, and every submission re-decides the verified flag, so a
    /// mismatch after a match drops the session back to awaiting the code.
    pub fn verify_otp(&self, session: &Session, submitted: &str) -> bool {
        if session.data().otp.is_none() {
            return false;
        }

        session.update(|data| {
            let matched = otp_matches(data.otp.as_deref(), submitted) && data.email.is_some();
            data.otp_verified = matched;
            matched
        })
    }

    /// Step 3. Set the new password for the session's address and log that account in.
    #[tracing::instrument(skip(self, session, new_password))]
    pub async fn reset_password(&self, session: &Session, new_password: &str) -> Result<ResetOutcome, AuthError> {
        let data = session.data();
        if data.reset_stage() != ResetStage::AwaitingNewPassword {
            return Ok(ResetOutcome::NotVerified);
        }

        let mut errors = FormErrors::new();
        if new_password.is_empty() {
            errors.add("password", REQUIRED_MESSAGE);
        } else if let Err(e) = validate_password_strength(new_password, &self.policy) {
            errors.add("password", e.to_string());
        }
        if let Err(errors) = errors.into_result() {
            return Ok(ResetOutcome::Invalid(errors));
        }

        let email = data.email.unwrap_or_default();
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Ok(ResetOutcome::UnknownAccount);
        };

        let password_hash = hash_password_blocking(new_password).await?;
        self.users.update_password(user.id, &password_hash).await?;
        self.users.record_login(user.id).await?;

        session.login(user.id);
        session.update(|data| data.otp_verified = false);

        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(ResetOutcome::Reset(user))
    }
}
