use std::any::type_name;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::definition::ConfigDefinition;
use crate::entry::{ConfigEntry, ConfigValue, StoredEntry, from_toml, to_toml};
use crate::errors::ConfigError;
use crate::format::{self, Annotation, RenderedEntry};
use crate::store::ConfigStore;

/// A configuration store persisted as a commented TOML file.
///
/// Values read from disk that no entry has been bound to yet are kept as
/// orphans; they are adopted by a later [`bind`](ConfigStore::bind) and written
/// back unchanged on save until [`clear_orphans`](ConfigStore::clear_orphans)
/// drops them.
pub struct ConfigFile {
    path: PathBuf,
    entries: BTreeMap<ConfigDefinition, Arc<dyn StoredEntry>>,
    orphans: BTreeMap<ConfigDefinition, toml::Value>,
    save_on_config_set: bool,
}

impl ConfigFile {
    /// Open the store at `path`, reading existing values if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut file = Self {
            path: path.into(),
            entries: BTreeMap::new(),
            orphans: BTreeMap::new(),
            save_on_config_set: true,
        };
        if file.path.exists() {
            file.reload()?;
        }
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file.
    ///
    /// Bound entries take the persisted value when it converts to their type;
    /// everything else becomes an orphan. Entries missing from the file keep
    /// their current value.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let content = fs::read_to_string(&self.path).map_err(|err| ConfigError::io(&self.path, err))?;
        let values = format::parse(&content, &self.path)?;

        self.orphans.clear();
        for (definition, value) in values {
            match self.entries.get(&definition) {
                Some(entry) => {
                    if let Err(err) = entry.load_toml(value) {
                        log::warn!("cfgbind: keeping current value of {definition}: {err}");
                    }
                }
                None => {
                    self.orphans.insert(definition, value);
                }
            }
        }

        log::debug!(
            "cfgbind: loaded {} ({} bound, {} orphaned)",
            self.path.display(),
            self.entries.len(),
            self.orphans.len()
        );
        Ok(())
    }

    /// Change a bound value, saving if [`save_on_config_set`](ConfigStore::save_on_config_set) is on.
    pub fn set<T: ConfigValue>(&mut self, entry: &ConfigEntry<T>, value: T) -> Result<(), ConfigError> {
        let bound = self
            .entries
            .get(entry.definition())
            .and_then(ConfigEntry::<T>::from_stored)
            .is_some_and(|stored| stored.same_entry(entry));
        if !bound {
            return Err(ConfigError::NotBound {
                definition: entry.definition().clone(),
            });
        }

        entry.set(value);
        if self.save_on_config_set {
            self.save()?;
        }
        Ok(())
    }

    /// Look up a bound entry by definition.
    pub fn entry<T: ConfigValue>(&self, section: &str, key: &str) -> Option<ConfigEntry<T>> {
        let definition = ConfigDefinition::new(section, key).ok()?;
        self.entries.get(&definition).and_then(ConfigEntry::<T>::from_stored)
    }

    pub fn contains(&self, section: &str, key: &str) -> bool {
        ConfigDefinition::new(section, key).is_ok_and(|definition| self.entries.contains_key(&definition))
    }

    /// Definitions of all bound entries, sorted.
    pub fn definitions(&self) -> impl Iterator<Item = &ConfigDefinition> {
        self.entries.keys()
    }

    /// Persisted values that no entry is bound to, sorted.
    pub fn orphaned_entries(&self) -> impl Iterator<Item = (&ConfigDefinition, &toml::Value)> {
        self.orphans.iter()
    }

    /// Number of bound entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The content [`save`](ConfigStore::save) would write.
    pub fn render(&self) -> Result<String, ConfigError> {
        let mut rendered = Vec::with_capacity(self.entries.len() + self.orphans.len());
        for (definition, entry) in &self.entries {
            rendered.push(RenderedEntry {
                definition,
                value: entry.value_toml()?,
                annotation: Some(Annotation {
                    description: entry.description(),
                    type_name: entry.type_name(),
                    default: entry.default_toml()?,
                }),
            });
        }
        for (definition, value) in &self.orphans {
            rendered.push(RenderedEntry {
                definition,
                value: value.clone(),
                annotation: None,
            });
        }
        rendered.sort_by(|a, b| a.definition.cmp(b.definition));

        Ok(format::render(&rendered))
    }
}

impl ConfigStore for ConfigFile {
    fn bind<T: ConfigValue>(
        &mut self,
        section: &str,
        key: &str,
        default: T,
        description: &str,
    ) -> Result<ConfigEntry<T>, ConfigError> {
        let definition = ConfigDefinition::new(section, key)?;

        if let Some(existing) = self.entries.get(&definition) {
            return ConfigEntry::<T>::from_stored(existing).ok_or_else(|| ConfigError::TypeMismatch {
                definition,
                expected: type_name::<T>(),
                found: existing.type_name(),
            });
        }

        // Unsupported default types fail here rather than on the first save.
        to_toml(&definition, &default)?;

        let value = match self.orphans.remove(&definition) {
            Some(persisted) => match from_toml::<T>(&definition, persisted) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("cfgbind: using default for {definition}: {err}");
                    default.clone()
                }
            },
            None => default.clone(),
        };

        let entry = ConfigEntry::new(definition.clone(), description, default, value);
        self.entries.insert(definition, entry.stored());

        if self.save_on_config_set {
            self.save()?;
        }
        Ok(entry)
    }

    fn save_on_config_set(&self) -> bool {
        self.save_on_config_set
    }

    fn set_save_on_config_set(&mut self, enabled: bool) {
        self.save_on_config_set = enabled;
    }

    fn save(&mut self) -> Result<(), ConfigError> {
        let content = self.render()?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| ConfigError::io(parent, err))?;
        }
        fs::write(&self.path, content).map_err(|err| ConfigError::io(&self.path, err))?;

        log::debug!("cfgbind: saved {} entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    fn clear_orphans(&mut self) -> usize {
        let cleared = self.orphans.len();
        for definition in self.orphans.keys() {
            log::debug!("cfgbind: dropping orphaned entry {definition}");
        }
        self.orphans.clear();
        cleared
    }
}

impl std::fmt::Debug for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFile")
            .field("path", &self.path)
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .field("orphans", &self.orphans)
            .field("save_on_config_set", &self.save_on_config_set)
            .finish()
    }
}
