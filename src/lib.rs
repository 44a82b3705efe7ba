//! Client-side data layer of the Semillero research-group portal: a paced,
//! retrying HTTP client for the portal's REST API and typed services for
//! authentication, projects, assignments, submissions, events and resources.

pub mod config;
pub mod models;
pub mod portal;
pub mod services;
pub mod utils;

pub use config::{ApiConfig, Config};
pub use models::envelope::ResponseEnvelope;
pub use models::error::AppError;
pub use portal::Portal;
