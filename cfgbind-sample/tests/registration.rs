//! Generated `register` functions against real and recording stores.

use std::fs;

use cfgbind::{ConfigEntry, ConfigError, ConfigFile, ConfigStore, ConfigValue};
use cfgbind_sample::General;
use cfgbind_sample::audio::Audio;
use cfgbind_sample::display::{Resolution, Screen, Theme, WindowMode};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    SetSaveOnConfigSet(bool),
    Bind { key: String, saving: bool },
    ClearOrphans,
    Save,
}

/// Records every call the generated code makes before forwarding it.
struct RecordingStore {
    inner: ConfigFile,
    events: Vec<Event>,
    reject_key: Option<&'static str>,
}

impl RecordingStore {
    fn new(inner: ConfigFile) -> Self {
        Self {
            inner,
            events: Vec::new(),
            reject_key: None,
        }
    }
}

impl ConfigStore for RecordingStore {
    fn bind<T: ConfigValue>(
        &mut self,
        section: &str,
        key: &str,
        default: T,
        description: &str,
    ) -> Result<ConfigEntry<T>, ConfigError> {
        self.events.push(Event::Bind {
            key: key.to_string(),
            saving: self.inner.save_on_config_set(),
        });
        if self.reject_key == Some(key) {
            return Err(ConfigError::InvalidDefinition {
                section: section.to_string(),
                key: key.to_string(),
                reason: "rejected by test store",
            });
        }
        self.inner.bind(section, key, default, description)
    }

    fn save_on_config_set(&self) -> bool {
        self.inner.save_on_config_set()
    }

    fn set_save_on_config_set(&mut self, enabled: bool) {
        self.events.push(Event::SetSaveOnConfigSet(enabled));
        self.inner.set_save_on_config_set(enabled);
    }

    fn save(&mut self) -> Result<(), ConfigError> {
        self.events.push(Event::Save);
        self.inner.save()
    }

    fn clear_orphans(&mut self) -> usize {
        self.events.push(Event::ClearOrphans);
        self.inner.clear_orphans()
    }
}

#[test]
fn register_persists_defaults_with_descriptions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("general.toml");

    let mut file = ConfigFile::open(&path).unwrap();
    let config = General::register(&mut file).unwrap();

    assert_eq!(config.test.value(), General::TEST);
    assert_eq!(config.greeting.value(), General::GREETING);
    assert_eq!(config.test.description(), "An integer config");

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[General]"));
    assert!(content.contains("## An integer config\n# Setting type: i32\n# Default value: 0\nTest = 0\n"));
    assert!(content.contains("## Shown on startup.\n## Leave empty to skip the greeting.\n"));
    assert!(!content.contains("Revision"));
    assert!(file.save_on_config_set());
}

#[test]
fn register_batches_binds_into_a_single_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = RecordingStore::new(ConfigFile::open(dir.path().join("general.toml")).unwrap());

    General::register(&mut store).unwrap();

    assert_eq!(
        store.events,
        vec![
            Event::SetSaveOnConfigSet(false),
            Event::Bind {
                key: "Test".to_string(),
                saving: false
            },
            Event::Bind {
                key: "Greeting".to_string(),
                saving: false
            },
            Event::ClearOrphans,
            Event::Save,
            Event::SetSaveOnConfigSet(true),
        ]
    );
}

#[test]
fn register_adopts_persisted_values_and_drops_stale_ones() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("general.toml");
    fs::write(
        &path,
        "[General]\nTest = 12\nGreeting = \"Welcome back\"\n\n[Test]\n\"Test 2\" = 1321\n",
    )
    .unwrap();

    let mut file = ConfigFile::open(&path).unwrap();
    let config = General::register(&mut file).unwrap();

    assert_eq!(config.test.value(), 12);
    assert_eq!(config.greeting.value(), "Welcome back");
    assert_eq!(*config.test.default_value(), 0);
    assert_eq!(file.orphaned_entries().count(), 0);

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("Test 2"));
    assert!(content.contains("Test = 12"));
}

#[test]
fn failed_registration_still_restores_saving() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("general.toml");
    let mut store = RecordingStore::new(ConfigFile::open(&path).unwrap());
    store.reject_key = Some("Greeting");

    let err = General::register(&mut store).err().unwrap();
    assert!(matches!(err, ConfigError::InvalidDefinition { .. }));

    assert_eq!(store.events.last(), Some(&Event::SetSaveOnConfigSet(true)));
    assert!(!store.events.contains(&Event::Save));
    assert!(!store.events.contains(&Event::ClearOrphans));
    assert!(!path.exists());
}

#[test]
fn renamed_markers_and_self_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = ConfigFile::open(dir.path().join("audio.toml")).unwrap();

    let config = Audio::register(&mut file).unwrap();
    assert_eq!(config.volume.value(), 1.0);
    assert_eq!(config.channels.value(), 2);

    file.set(&config.channels, 6).unwrap();
    let reopened = {
        let mut file = ConfigFile::open(dir.path().join("audio.toml")).unwrap();
        Audio::register(&mut file).unwrap()
    };
    assert_eq!(reopened.channels.value(), 6);
    assert_eq!(*reopened.channels.default_value(), 2);
}

#[test]
fn structured_values_round_trip_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("screen.toml");

    let mut file = ConfigFile::open(&path).unwrap();
    let config = Screen::register(&mut file).unwrap();
    assert_eq!(config.mode.value(), WindowMode::Windowed);

    file.set(&config.mode, WindowMode::Fullscreen).unwrap();
    file.set(
        &config.resolution,
        Resolution {
            width: 2560,
            height: 1440,
        },
    )
    .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("Mode = \"Fullscreen\""));

    let mut reopened = ConfigFile::open(&path).unwrap();
    let config = Screen::register(&mut reopened).unwrap();
    assert_eq!(config.mode.value(), WindowMode::Fullscreen);
    assert_eq!(config.resolution.value().width, 2560);
    assert_eq!(config.resolution.default_value().width, 1280);
}

#[test]
fn self_typed_entries_hold_the_unit_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("theme.toml");

    let mut file = ConfigFile::open(&path).unwrap();
    let config = Theme::register(&mut file).unwrap();
    let current: ConfigEntry<Theme> = config.current.clone();
    assert_eq!(current.value(), Theme::Dark);

    file.set(&current, Theme::Light).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("Current = \"Light\""));

    let mut reopened = ConfigFile::open(&path).unwrap();
    let config = Theme::register(&mut reopened).unwrap();
    assert_eq!(config.current.value(), Theme::Light);
    assert_eq!(*config.current.default_value(), Theme::Dark);
}
