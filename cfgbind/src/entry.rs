use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::definition::ConfigDefinition;
use crate::errors::ConfigError;

/// Types that can be stored in a configuration entry.
///
/// Anything serde can round-trip through a TOML value qualifies. Note that
/// `&'static str` does not; use `String` or `Cow<'static, str>` for text.
pub trait ConfigValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> ConfigValue for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

pub(crate) fn to_toml<T: ConfigValue>(definition: &ConfigDefinition, value: &T) -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(value).map_err(|err| ConfigError::conversion(definition, err))
}

pub(crate) fn from_toml<T: ConfigValue>(definition: &ConfigDefinition, value: toml::Value) -> Result<T, ConfigError> {
    value.try_into().map_err(|err| ConfigError::conversion(definition, err))
}

/// Live, typed handle to one bound configuration value.
///
/// Handles are cheap to clone; every clone and the store that issued it see
/// the same value.
pub struct ConfigEntry<T> {
    state: Arc<EntryState<T>>,
}

pub(crate) struct EntryState<T> {
    definition: ConfigDefinition,
    description: String,
    default: T,
    value: RwLock<T>,
}

impl<T: ConfigValue> ConfigEntry<T> {
    pub(crate) fn new(definition: ConfigDefinition, description: impl Into<String>, default: T, value: T) -> Self {
        Self {
            state: Arc::new(EntryState {
                definition,
                description: description.into(),
                default,
                value: RwLock::new(value),
            }),
        }
    }

    /// Recover a typed handle from a stored entry, if `T` is its value type.
    pub(crate) fn from_stored(stored: &Arc<dyn StoredEntry>) -> Option<Self> {
        Arc::clone(stored)
            .into_any()
            .downcast::<EntryState<T>>()
            .ok()
            .map(|state| Self { state })
    }

    pub(crate) fn stored(&self) -> Arc<dyn StoredEntry> {
        self.state.clone()
    }

    /// Current value.
    pub fn value(&self) -> T {
        self.state.value.read().clone()
    }

    /// Replace the value in memory.
    ///
    /// The store is not notified; use [`ConfigFile::set`](crate::ConfigFile::set)
    /// to change a value and persist it in one step.
    pub fn set(&self, value: T) {
        *self.state.value.write() = value;
    }

    /// Restore the default value in memory.
    pub fn reset_to_default(&self) {
        self.set(self.state.default.clone());
    }

    pub fn default_value(&self) -> &T {
        &self.state.default
    }

    pub fn definition(&self) -> &ConfigDefinition {
        &self.state.definition
    }

    pub fn description(&self) -> &str {
        &self.state.description
    }

    /// Whether two handles point at the same bound entry.
    pub fn same_entry(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl<T> Clone for ConfigEntry<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ConfigEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigEntry")
            .field("definition", &self.state.definition)
            .field("value", &*self.state.value.read())
            .field("default", &self.state.default)
            .finish()
    }
}

/// Type-erased view of an entry, as held by a store.
pub(crate) trait StoredEntry: Send + Sync {
    fn definition(&self) -> &ConfigDefinition;
    fn description(&self) -> &str;
    fn type_name(&self) -> &'static str;
    fn value_toml(&self) -> Result<toml::Value, ConfigError>;
    fn default_toml(&self) -> Result<toml::Value, ConfigError>;
    /// Replace the current value with a persisted one.
    fn load_toml(&self, value: toml::Value) -> Result<(), ConfigError>;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: ConfigValue> StoredEntry for EntryState<T> {
    fn definition(&self) -> &ConfigDefinition {
        &self.definition
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn value_toml(&self) -> Result<toml::Value, ConfigError> {
        to_toml(&self.definition, &*self.value.read())
    }

    fn default_toml(&self) -> Result<toml::Value, ConfigError> {
        to_toml(&self.definition, &self.default)
    }

    fn load_toml(&self, value: toml::Value) -> Result<(), ConfigError> {
        let value = from_toml::<T>(&self.definition, value)?;
        *self.value.write() = value;
        Ok(())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
