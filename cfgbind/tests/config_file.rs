//! Persistence of bound entries across separate opens of the same file.

use std::borrow::Cow;
use std::fs;

use cfgbind::{ConfigError, ConfigFile, ConfigStore};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WindowSize {
    width: u32,
    height: u32,
}

#[test]
fn values_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    {
        let mut file = ConfigFile::open(&path).unwrap();
        let volume = file.bind("Audio", "Volume", 1.0f64, "Master volume").unwrap();
        let title = file
            .bind("Window", "Title", Cow::Borrowed("cfgbind"), "Window title")
            .unwrap();
        let size = file
            .bind("Window", "Size", WindowSize { width: 800, height: 600 }, "Initial size")
            .unwrap();

        file.set(&volume, 0.75).unwrap();
        file.set(&title, Cow::Owned("renamed".to_string())).unwrap();
        file.set(&size, WindowSize { width: 1024, height: 768 }).unwrap();
    }

    let mut file = ConfigFile::open(&path).unwrap();
    assert_eq!(file.orphaned_entries().count(), 3);

    let volume = file.bind("Audio", "Volume", 1.0f64, "Master volume").unwrap();
    let title = file
        .bind("Window", "Title", Cow::Borrowed("cfgbind"), "Window title")
        .unwrap();
    let size = file
        .bind("Window", "Size", WindowSize { width: 800, height: 600 }, "Initial size")
        .unwrap();

    assert_eq!(volume.value(), 0.75);
    assert_eq!(title.value(), "renamed");
    assert_eq!(size.value(), WindowSize { width: 1024, height: 768 });
    assert_eq!(*size.default_value(), WindowSize { width: 800, height: 600 });
    assert_eq!(file.orphaned_entries().count(), 0);
}

#[test]
fn saved_file_is_commented_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut file = ConfigFile::open(&path).unwrap();
    file.set_save_on_config_set(false);
    file.bind("Video", "Fov", 90u16, "Field of view").unwrap();
    file.bind("General", "Test", 0i32, "An integer config").unwrap();
    file.save().unwrap();

    let expected = "\
## Settings file was created by cfgbind

[General]

## An integer config
# Setting type: i32
# Default value: 0
Test = 0

[Video]

## Field of view
# Setting type: u16
# Default value: 90
Fov = 90
";
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn orphans_are_kept_until_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "[General]\nTest = 5\n\n[Test]\n\"Test 2\" = 1321\n").unwrap();

    let mut file = ConfigFile::open(&path).unwrap();
    let test = file.bind("General", "Test", 0i32, "An integer config").unwrap();
    assert_eq!(test.value(), 5);

    // Binding saved immediately, and the unclaimed value was written back.
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"Test 2\" = 1321"));

    assert_eq!(file.clear_orphans(), 1);
    file.save().unwrap();

    let reopened = ConfigFile::open(&path).unwrap();
    let remaining: Vec<String> = reopened
        .orphaned_entries()
        .map(|(definition, _)| definition.to_string())
        .collect();
    assert_eq!(remaining, vec!["[General] Test"]);
}

#[test]
fn reload_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut file = ConfigFile::open(&path).unwrap();
    file.bind("General", "Test", 0i32, "").unwrap();

    fs::write(&path, "[General\n").unwrap();
    let err = file.reload().unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));

    let err = ConfigFile::open(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
