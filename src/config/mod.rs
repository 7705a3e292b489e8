//! Configuration file loading and resolution into [`RunSettings`].
mod apply;
mod loader;
mod settings;
pub mod types;


pub use apply::apply_config;
pub use loader::{DEFAULT_CONFIG_FILES, load_config, load_config_file};
pub use settings::RunSettings;
pub use types::ConfigFile;
