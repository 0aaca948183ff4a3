pub mod config;
pub mod response;
pub mod service;

pub use config::{ConfigError, ServiceConfig};
pub use response::ErrorResponse;
pub use service::ProfileService;
