// Declare modules within this crate
pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod models; // Domain models
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{not_found, validation_error, HttpStatusCode, PanelbookError};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};
