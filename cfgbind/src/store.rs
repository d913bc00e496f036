use crate::entry::{ConfigEntry, ConfigValue};
use crate::errors::ConfigError;

/// A key-value store that configuration entries are bound to.
///
/// Generated `register` functions only use this trait, so any store (a file,
/// an in-memory table, a test double) can back the handles.
pub trait ConfigStore {
    /// Bind `(section, key)` to a typed entry.
    ///
    /// If a persisted value exists and converts to `T` it becomes the current
    /// value; otherwise `default` does. Binding the same definition twice with
    /// the same type returns the existing entry.
    fn bind<T: ConfigValue>(
        &mut self,
        section: &str,
        key: &str,
        default: T,
        description: &str,
    ) -> Result<ConfigEntry<T>, ConfigError>;

    /// Whether every bind or set persists the store immediately.
    fn save_on_config_set(&self) -> bool;

    fn set_save_on_config_set(&mut self, enabled: bool);

    /// Persist all bound entries.
    fn save(&mut self) -> Result<(), ConfigError>;

    /// Drop persisted values that no bound entry claims. Returns how many were dropped.
    fn clear_orphans(&mut self) -> usize;
}
