// Business logic services

pub mod auth_service;
pub mod mailer;
pub mod password_reset_service;
pub mod risk_assessment;
pub mod user_repository;

pub use auth_service::AuthService;
pub use mailer::{LogMailer, Mailer, OutboundEmail, OutboxMailer, SmtpMailer};
pub use password_reset_service::{OtpRequestOutcome, PasswordResetService, ResetOutcome};
pub use risk_assessment::{assess, RiskAssessment, RiskTier};
pub use user_repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
