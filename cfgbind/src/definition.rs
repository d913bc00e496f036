use std::fmt;

use serde::Serialize;

use crate::errors::ConfigError;

/// Identity of a configuration entry: a key inside a section.
///
/// Ordered by section, then key, which is also the order entries are saved in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConfigDefinition {
    pub section: String,
    pub key: String,
}

impl ConfigDefinition {
    /// Validate and build a definition.
    ///
    /// Both parts must be non-empty, single-line and free of surrounding
    /// whitespace, since they are persisted as TOML table and key names.
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Result<Self, ConfigError> {
        let section = section.into();
        let key = key.into();

        let reason = [&section, &key].into_iter().find_map(|part| invalid_reason(part));
        if let Some(reason) = reason {
            return Err(ConfigError::InvalidDefinition { section, key, reason });
        }

        Ok(Self { section, key })
    }
}

fn invalid_reason(part: &str) -> Option<&'static str> {
    if part.is_empty() {
        Some("section and key cannot be empty")
    } else if part.contains(['\n', '\r']) {
        Some("section and key must be single-line")
    } else if part.trim() != part {
        Some("section and key cannot start or end with whitespace")
    } else {
        None
    }
}

impl fmt::Display for ConfigDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.section, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_ordering() {
        let mut definitions = vec![
            ConfigDefinition::new("Video", "Fov").unwrap(),
            ConfigDefinition::new("Audio", "Volume").unwrap(),
            ConfigDefinition::new("Audio", "Muted").unwrap(),
        ];
        definitions.sort();

        let rendered: Vec<String> = definitions.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["[Audio] Muted", "[Audio] Volume", "[Video] Fov"]);
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(matches!(
            ConfigDefinition::new("", "Key"),
            Err(ConfigError::InvalidDefinition { .. })
        ));
        assert!(ConfigDefinition::new("General", "two\nlines").is_err());
        assert!(ConfigDefinition::new("General", " padded").is_err());
        assert!(ConfigDefinition::new("General", "Spaced Key").is_ok());
        assert!(ConfigDefinition::new("General", "dotted.key").is_ok());
    }
}
