pub mod api;
pub mod auth;
pub mod config;
pub mod inference;
pub mod models;
pub mod services;
pub mod state;

pub use state::AppState;
