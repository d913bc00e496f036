//! cfgbind runtime library.
//!
//! Typed configuration entries bound to a persisted key-value store. Types
//! marked with [`generate_config`] get a generated `register` function at
//! build time (see the `cfgbind-build` crate) that binds every
//! [`entry`]-marked constant to a [`ConfigStore`] in one batch.
//!
//! # Example
//!
//! ```ignore
//! use cfgbind::{ConfigFile, entry, generate_config};
//!
//! #[generate_config]
//! pub struct General;
//!
//! impl General {
//!     #[entry("General", "Test", "An integer config")]
//!     pub const TEST: i32 = 0;
//! }
//!
//! cfgbind::include_config!("general");
//!
//! let mut file = ConfigFile::open("settings.toml")?;
//! let config = General::register(&mut file)?;
//! assert_eq!(config.test.value(), 0);
//! ```

mod definition;
mod entry;
mod errors;
mod file;
mod format;
mod store;

pub use cfgbind_macros::{entry, generate_config};
pub use definition::ConfigDefinition;
pub use entry::{ConfigEntry, ConfigValue};
pub use errors::ConfigError;
pub use file::ConfigFile;
pub use store::ConfigStore;

/// Include the bindings generated for a `#[generate_config]` type.
///
/// The name is the artifact file name without extension: the module path below
/// the crate root plus the type name, snake-cased and joined with dots
/// (`crate::settings::AudioSettings` becomes `"settings.audio_settings"`).
/// Invoke it in the module that declares the type.
#[macro_export]
macro_rules! include_config {
    ($name:literal) => {
        include!(concat!(env!("OUT_DIR"), "/cfgbind/", $name, ".rs"));
    };
}
