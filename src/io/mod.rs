pub mod config_io;
pub mod outline_io;

pub use config_io::{ConfigError, ConfigManager, ConfigStore, MemoryConfig};
pub use outline_io::{OutlineError, load_outline, save_outline};
