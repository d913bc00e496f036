use std::path::PathBuf;

use anyhow::Result;
use cfgbind_build::{GenerationReport, UnitStatus, generate_config};
use clap::Args;
use comfy_table::{Cell, Color as TableColor, Table};

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, themed_table};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Generate Bindings",
        commands: &[
            "cfgbind generate --out src/generated            # Generate from ./src",
            "cfgbind generate --src app/src --out app/gen    # Custom directories",
        ],
    },
    ExampleGroup {
        title: "Cache Control",
        commands: &["cfgbind generate --out src/generated --no-cache   # Regenerate everything"],
    },
];

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Source directory to scan (repeatable)
    #[arg(long = "src", default_value = "src")]
    pub src: Vec<PathBuf>,

    /// Directory generated files are written to
    #[arg(long = "out")]
    pub out: PathBuf,

    /// Root of generated module paths
    #[arg(long, default_value = "crate")]
    pub crate_name: String,

    /// Path of the runtime crate in generated code
    #[arg(long, default_value = cfgbind_build::DEFAULT_RUNTIME_PATH)]
    pub runtime_path: String,

    /// Extra crate name the markers may be imported from (repeatable)
    #[arg(long = "marker-crate")]
    pub marker_crates: Vec<String>,

    /// Ignore and do not write the cache manifest
    #[arg(long)]
    pub no_cache: bool,
}

pub fn run(args: GenerateArgs) -> Result<GenerationReport> {
    let mut generator = generate_config()
        .output_dir(args.out)
        .crate_name(args.crate_name)
        .runtime_path(args.runtime_path)
        .cache(!args.no_cache)
        .emit_rerun_if_changed(false);
    for path in args.src {
        generator = generator.scan_path(path);
    }
    for name in &args.marker_crates {
        generator = generator.marker_crate(name);
    }
    generator.run()
}

impl TableDisplay for GenerationReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Unit", "File", "Entries", "Status"]);
        for unit in &self.units {
            let status = match unit.status {
                UnitStatus::Cached => Cell::new("cached"),
                UnitStatus::Regenerated if options.no_color => Cell::new("regenerated"),
                UnitStatus::Regenerated => Cell::new("regenerated").fg(TableColor::Green),
            };
            table.add_row(vec![
                Cell::new(&unit.qualified_name),
                Cell::new(&unit.file_name),
                Cell::new(unit.entry_count),
                status,
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "units={} regenerated={} removed={} hits={} misses={}",
            self.units.len(),
            self.regenerated(),
            self.removed.len(),
            self.cache.hits,
            self.cache.misses
        )
    }
}

pub fn handle_generate(args: GenerateArgs, output: &OutputManager) -> Result<()> {
    let report = run(args)?;

    output.heading("Generated bindings");
    output.key_value("Output", &report.output_dir.display().to_string());
    output.display(&report)?;

    for removed in &report.removed {
        output.detail(ICONS.removed, &format!("removed {removed}"));
    }

    if report.units.is_empty() {
        output.warning("No #[generate_config] types found");
    } else {
        output.success(&format!(
            "{} types, {} regenerated ({} cache hits)",
            report.units.len(),
            report.regenerated(),
            report.cache.hits
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_run_writes_and_reuses_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("lib.rs"),
            "#[cfgbind::generate_config]\npub struct General;\n\nimpl General {\n    #[cfgbind::entry(\"General\", \"Test\", \"An integer config\")]\n    pub const TEST: i32 = 0;\n}\n",
        )
        .unwrap();

        let args = || GenerateArgs {
            src: vec![src.clone()],
            out: dir.path().join("generated"),
            crate_name: "crate".to_string(),
            runtime_path: cfgbind_build::DEFAULT_RUNTIME_PATH.to_string(),
            marker_crates: Vec::new(),
            no_cache: false,
        };

        let first = run(args()).unwrap();
        assert_eq!(first.regenerated(), 1);
        assert!(dir.path().join("generated/general.rs").exists());

        let second = run(args()).unwrap();
        assert_eq!(second.regenerated(), 0);
        assert_eq!(second.to_compact(), "units=1 regenerated=0 removed=0 hits=1 misses=0");
    }
}
