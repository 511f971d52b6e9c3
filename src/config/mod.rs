/// Rule file loading
#[allow(clippy::module_inception)]
pub mod config;

pub use config::{Config, RuleConfig};
