/// Error types for rule file loading
pub mod error;

/// Inhibition rules and the suppression registry
pub mod inhibit;

/// Rule file configuration
pub mod config;

// Re-export commonly used types
pub use error::ConfigError;
pub use inhibit::{InhibitionRule, InhibitorRegistry, Tags};
