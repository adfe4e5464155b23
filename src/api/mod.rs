// HTTP handlers and routing

pub mod auth;
pub mod error;
pub mod health;
pub mod password_reset;
pub mod patients;
pub mod routes;
pub mod views;

pub use error::ApiError;
pub use routes::create_routes;
