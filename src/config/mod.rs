//! Configuration for cql-tui.
//!
//! Settings come from three layers, lowest priority first: built-in defaults,
//! a discovered YAML file, and command-line flags (applied in `main`).

mod file;
mod keys;
mod types;
mod validation;

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};
pub use keys::{KeyParseError, KeySet, KeySpec, Keymap};
pub use types::{AppConfig, ConnectionConfig, KeyBindings, TuiConfig, DEFAULT_ADDRESS};
pub use validation::{ConfigError, Validatable};
