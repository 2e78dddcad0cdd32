//! Administrative client for the employee-management backend.

pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod model;
pub mod models;
pub mod routes;
pub mod utils;
pub mod view;

pub use config::Config;
pub use console::{AdminConsole, Outcome, Screen};
pub use error::{ApiError, ApiResult};
pub use http::ApiClient;
