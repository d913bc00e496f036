use std::path::PathBuf;

use anyhow::{Context, Result};
use cfgbind::ConfigFile;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, themed_table};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect A Config File",
    commands: &[
        "cfgbind inspect settings.toml                 # Show persisted sections and keys",
        "cfgbind inspect settings.toml --output json   # Dump values as JSON",
    ],
}];

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Config file to read
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct FileListing {
    pub path: PathBuf,
    pub entries: Vec<PersistedEntry>,
}

#[derive(Debug, Serialize)]
pub struct PersistedEntry {
    pub section: String,
    pub key: String,
    pub value: toml::Value,
}

/// Every persisted value shows up as an orphan until something binds it,
/// which is exactly the raw view of the file.
pub fn collect(path: PathBuf) -> Result<FileListing> {
    if !path.exists() {
        anyhow::bail!("{} does not exist", path.display());
    }
    let file = ConfigFile::open(&path).with_context(|| format!("Failed to read {}", path.display()))?;

    let entries = file
        .orphaned_entries()
        .map(|(definition, value)| PersistedEntry {
            section: definition.section.clone(),
            key: definition.key.clone(),
            value: value.clone(),
        })
        .collect();

    Ok(FileListing { path, entries })
}

impl TableDisplay for FileListing {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Section", "Key", "Value"]);
        for entry in &self.entries {
            table.add_row(vec![
                Cell::new(&entry.section),
                Cell::new(&entry.key),
                Cell::new(entry.value.to_string()),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("{} entries={}", self.path.display(), self.entries.len())
    }
}

pub fn handle_inspect(args: InspectArgs, output: &OutputManager) -> Result<()> {
    let listing = collect(args.file)?;

    output.heading("Persisted entries");
    output.key_value("File", &listing.path.display().to_string());
    if listing.entries.is_empty() {
        output.info("The file contains no entries");
        return Ok(());
    }

    output.display(&listing)?;
    Ok(())
}
