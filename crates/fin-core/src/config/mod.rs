mod dirs;
mod settings;
mod validation;

pub use dirs::Directories;
pub use settings::{AppConfig, Config, KeymapConfig, PollConfig, WindowConfig};
pub use validation::warn_unknown_fields;
