/// Inhibition rules and the registry that answers suppression queries
pub mod registry;
pub mod rule;

pub use registry::InhibitorRegistry;
pub use rule::{InhibitionRule, Tags};
