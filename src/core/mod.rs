//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod logging;
pub mod retry;
pub mod validation;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_request_configuration};
pub use retry::RetryPolicy;
pub use validation::{classify, is_valid_url, sanitize_url, Platform, ValidationError};
