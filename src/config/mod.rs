mod loader;
mod profile;

pub use loader::{load_config, ClientSection, HttpSnapConfig, LoadedConfig, CONFIG_FILE_NAME};
pub use profile::{resolve_settings, ResolvedSettings};
