use std::path::PathBuf;

use thiserror::Error;

use crate::definition::ConfigDefinition;

/// Top-level error type returned by configuration stores.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Section or key cannot be persisted.
    #[error("invalid config definition [{section}] {key:?}: {reason}")]
    InvalidDefinition {
        section: String,
        key: String,
        reason: &'static str,
    },

    /// The definition is already bound with a different value type.
    #[error("config entry {definition} is bound as {found}, not {expected}")]
    TypeMismatch {
        definition: ConfigDefinition,
        expected: &'static str,
        found: &'static str,
    },

    /// The entry handle was issued by another store.
    #[error("config entry {definition} is not bound to this store")]
    NotBound { definition: ConfigDefinition },

    /// A value could not be converted to or from its persisted form.
    #[error("cannot convert value of {definition}: {message}")]
    Conversion { definition: ConfigDefinition, message: String },

    /// The config file is not valid TOML.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Reading or writing the config file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn conversion(definition: &ConfigDefinition, message: impl ToString) -> Self {
        Self::Conversion {
            definition: definition.clone(),
            message: message.to_string(),
        }
    }
}
