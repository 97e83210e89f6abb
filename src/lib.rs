pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod provider;
pub mod services;

pub use config::*;
pub use errors::*;
pub use models::*;
