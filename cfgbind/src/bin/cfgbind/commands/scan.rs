use std::path::PathBuf;

use anyhow::{Context, Result};
use cfgbind_build::{MarkerSet, artifact_file_name, extract_declarations, scan_directory};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, themed_table};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "List Marked Types",
        commands: &[
            "cfgbind scan                          # Scan ./src",
            "cfgbind scan --src crates/app/src     # Scan another directory",
            "cfgbind scan --output json            # Machine-readable listing",
        ],
    },
    ExampleGroup {
        title: "Renamed Dependencies",
        commands: &["cfgbind scan --marker-crate settings   # Also accept settings::generate_config"],
    },
];

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Source directory to scan (repeatable)
    #[arg(long = "src", default_value = "src")]
    pub src: Vec<PathBuf>,

    /// Root of generated module paths
    #[arg(long, default_value = "crate")]
    pub crate_name: String,

    /// Extra crate name the markers may be imported from (repeatable)
    #[arg(long = "marker-crate")]
    pub marker_crates: Vec<String>,
}

impl ScanArgs {
    pub fn markers(&self) -> MarkerSet {
        self.marker_crates
            .iter()
            .fold(MarkerSet::new(), |markers, name| markers.with_crate(name))
    }
}

#[derive(Debug, Serialize)]
pub struct ScanListing {
    pub files_scanned: usize,
    pub units: Vec<UnitListing>,
}

#[derive(Debug, Serialize)]
pub struct UnitListing {
    pub qualified_name: String,
    pub source_path: PathBuf,
    pub file_name: String,
    pub entries: Vec<EntryListing>,
}

#[derive(Debug, Serialize)]
pub struct EntryListing {
    pub handle: String,
    pub section: String,
    pub key: String,
    pub value_type: String,
    pub default: String,
    pub description: String,
}

pub fn collect(args: &ScanArgs) -> Result<ScanListing> {
    let markers = args.markers();
    let mut listing = ScanListing {
        files_scanned: 0,
        units: Vec::new(),
    };

    for path in &args.src {
        let outcome = scan_directory(path, &args.crate_name, &markers, &[])
            .with_context(|| format!("Failed to scan {}", path.display()))?;
        listing.files_scanned += outcome.files.len();

        for unit in &outcome.units {
            let entries = extract_declarations(unit, &markers)
                .iter()
                .map(|declaration| EntryListing {
                    handle: declaration.handle_ident().to_string(),
                    section: declaration.section.clone(),
                    key: declaration.key.clone(),
                    value_type: declaration.type_source(),
                    default: declaration.default_source(),
                    description: declaration.description.clone(),
                })
                .collect();

            listing.units.push(UnitListing {
                qualified_name: unit.qualified_name(),
                source_path: unit.source_path.clone(),
                file_name: artifact_file_name(unit, &args.crate_name),
                entries,
            });
        }
    }

    Ok(listing)
}

impl TableDisplay for ScanListing {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Unit", "Section", "Key", "Type", "Default", "Description"]);
        for unit in &self.units {
            if unit.entries.is_empty() {
                table.add_row(vec![Cell::new(&unit.qualified_name), Cell::new("(no entries)")]);
            }
            for entry in &unit.entries {
                table.add_row(vec![
                    Cell::new(&unit.qualified_name),
                    Cell::new(&entry.section),
                    Cell::new(&entry.key),
                    Cell::new(&entry.value_type),
                    Cell::new(&entry.default),
                    Cell::new(&entry.description),
                ]);
            }
        }
        table
    }

    fn to_compact(&self) -> String {
        let entries: usize = self.units.iter().map(|unit| unit.entries.len()).sum();
        format!("units={} entries={} files={}", self.units.len(), entries, self.files_scanned)
    }
}

pub fn handle_scan(args: ScanArgs, output: &OutputManager) -> Result<()> {
    let listing = collect(&args)?;

    output.heading("Configuration types");
    if listing.units.is_empty() {
        output.info(&format!("No #[generate_config] types found in {} files", listing.files_scanned));
        return Ok(());
    }

    output.display(&listing)?;
    output.success(&format!(
        "Found {} types in {} files",
        listing.units.len(),
        listing.files_scanned
    ));
    Ok(())
}
