//! Orchestration of one generation pass.

use anyhow::{Context, Result};
use heck::ToSnakeCase;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::{ArtifactCache, CacheStats, Fingerprint, GeneratedArtifact};
use crate::extractor::extract_declarations;
use crate::markers::MarkerSet;
use crate::scanner::{GenerationUnit, scan_directory};
use crate::synthesizer::{DEFAULT_RUNTIME_PATH, GENERATED_MARKER, Synthesizer};

/// Name of the cache manifest inside the output directory.
pub const MANIFEST_FILE: &str = "cfgbind-manifest.json";

/// Whether a unit's artifact was reused or synthesized in this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Cached,
    Regenerated,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub qualified_name: String,
    pub file_name: String,
    pub entry_count: usize,
    pub status: UnitStatus,
}

/// Summary of one [`ConfigGenerator::run`].
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    pub units: Vec<UnitReport>,
    /// Files deleted because their unit no longer exists
    pub removed: Vec<String>,
    pub cache: CacheStats,
}

impl GenerationReport {
    pub fn regenerated(&self) -> usize {
        self.units.iter().filter(|unit| unit.status == UnitStatus::Regenerated).count()
    }
}

/// Builder for configuring and running the binding generator.
pub struct ConfigGenerator {
    scan_paths: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    crate_name: String,
    runtime_path: String,
    markers: MarkerSet,
    use_cache: bool,
    emit_rerun_if_changed: bool,
}

impl ConfigGenerator {
    /// Create a new generator with default settings.
    pub fn new() -> Self {
        Self {
            scan_paths: Vec::new(),
            output_dir: None,
            crate_name: "crate".to_string(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            markers: MarkerSet::new(),
            use_cache: true,
            emit_rerun_if_changed: env::var_os("OUT_DIR").is_some(),
        }
    }

    /// Add a path to scan for `#[generate_config]` types.
    ///
    /// Can be called multiple times to scan multiple directories.
    pub fn scan_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scan_paths.push(path.into());
        self
    }

    /// Set the directory generated files are written to.
    ///
    /// Default: `$OUT_DIR/cfgbind` inside a build script, `src/generated` otherwise.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the crate name used as the root of module paths.
    ///
    /// Default: `crate`
    pub fn crate_name(mut self, name: impl Into<String>) -> Self {
        self.crate_name = name.into();
        self
    }

    /// Set the path of the runtime crate in generated code.
    ///
    /// Default: `::cfgbind`
    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    /// Also accept the markers from a crate with another name (a renamed dependency).
    pub fn marker_crate(mut self, name: impl AsRef<str>) -> Self {
        self.markers = self.markers.with_crate(name);
        self
    }

    /// Enable or disable the artifact cache manifest.
    ///
    /// Default: enabled
    pub fn cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Print `cargo:rerun-if-changed` for every scanned file.
    ///
    /// Default: enabled when `OUT_DIR` is set
    pub fn emit_rerun_if_changed(mut self, enabled: bool) -> Self {
        self.emit_rerun_if_changed = enabled;
        self
    }

    /// Run the generator.
    ///
    /// Scans all configured paths, synthesizes (or reuses) one artifact per
    /// `#[generate_config]` type and writes it to the output directory. A unit
    /// that fails to generate is logged and skipped; only I/O failures on the
    /// output directory abort the run.
    pub fn run(self) -> Result<GenerationReport> {
        // Default to scanning "src/" if no paths specified
        let scan_paths = if self.scan_paths.is_empty() {
            vec![PathBuf::from("src/")]
        } else {
            self.scan_paths.clone()
        };

        let output_dir = self.resolve_output_dir();
        fs::create_dir_all(&output_dir).with_context(|| format!("Failed to create directory {}", output_dir.display()))?;

        let manifest_path = output_dir.join(MANIFEST_FILE);
        let mut cache = if self.use_cache {
            ArtifactCache::load(&manifest_path)
        } else {
            ArtifactCache::new()
        };
        let mut previous_files = cache.file_names();
        previous_files.extend(generated_files(&output_dir)?);

        let synthesizer = Synthesizer::new(&self.runtime_path)?;
        let context = Fingerprint::context(&self.markers, &self.runtime_path);

        let mut units = Vec::new();
        let mut scanned_files = Vec::new();
        for path in &scan_paths {
            let outcome = scan_directory(path, &self.crate_name, &self.markers, std::slice::from_ref(&output_dir))
                .with_context(|| format!("Failed to scan {}", path.display()))?;
            scanned_files.extend(outcome.files);
            units.extend(outcome.units);
        }

        // Deduplicate by qualified name (in case the same file is scanned twice)
        let mut seen = HashSet::new();
        units.retain(|unit| {
            let fresh = seen.insert(unit.qualified_name());
            if !fresh {
                log::debug!("cfgbind-build: {} found more than once, keeping the first", unit.qualified_name());
            }
            fresh
        });

        // Distinct names can snake-case to one file (`HTTPConfig`, `HttpConfig`)
        let mut file_owners: HashMap<String, String> = HashMap::new();
        units.retain(|unit| match file_owners.entry(artifact_file_name(unit, &self.crate_name)) {
            Entry::Vacant(slot) => {
                slot.insert(unit.qualified_name());
                true
            }
            Entry::Occupied(owner) => {
                log::warn!(
                    "cfgbind-build: {} would be written to {}, which already belongs to {}, skipping",
                    unit.qualified_name(),
                    owner.key(),
                    owner.get()
                );
                false
            }
        });

        let mut reports = Vec::with_capacity(units.len());
        let mut written_files = BTreeSet::new();

        for unit in &units {
            let fingerprint = Fingerprint::unit(&context, unit);
            let cached = cache.lookup(&fingerprint).cloned();

            let (artifact, status) = match cached {
                Some(artifact) => {
                    log::debug!("cfgbind-build: {} unchanged ({fingerprint})", artifact.qualified_name);
                    (artifact, UnitStatus::Cached)
                }
                None => match self.build_artifact(&synthesizer, unit, fingerprint) {
                    Ok(artifact) => {
                        cache.insert(artifact.clone());
                        (artifact, UnitStatus::Regenerated)
                    }
                    Err(err) => {
                        log::warn!("cfgbind-build: failed to generate {}: {err:#}", unit.qualified_name());
                        continue;
                    }
                },
            };

            write_if_changed(&output_dir.join(&artifact.file_name), &artifact.source)?;
            written_files.insert(artifact.file_name.clone());

            reports.push(UnitReport {
                qualified_name: artifact.qualified_name,
                file_name: artifact.file_name,
                entry_count: artifact.entry_count,
                status,
            });
        }

        let mut removed = Vec::new();
        for stale in previous_files.difference(&written_files) {
            let path = output_dir.join(stale);
            if path.exists() {
                fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
                log::info!("cfgbind-build: removed stale {}", path.display());
            }
            removed.push(stale.clone());
        }

        cache.evict_unused();
        if self.use_cache {
            cache.save(&manifest_path)?;
        }

        if self.emit_rerun_if_changed {
            for path in scan_paths.iter().chain(&scanned_files) {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }

        Ok(GenerationReport {
            output_dir,
            units: reports,
            removed,
            cache: cache.stats(),
        })
    }

    fn resolve_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        match env::var_os("OUT_DIR") {
            Some(out_dir) => PathBuf::from(out_dir).join("cfgbind"),
            None => PathBuf::from("src/generated"),
        }
    }

    fn build_artifact(
        &self,
        synthesizer: &Synthesizer,
        unit: &GenerationUnit,
        fingerprint: Fingerprint,
    ) -> Result<GeneratedArtifact> {
        let declarations = extract_declarations(unit, &self.markers);
        let source = synthesizer.render(unit, &declarations)?;

        log::info!(
            "cfgbind-build: generated {} with {} entries",
            unit.qualified_name(),
            declarations.len()
        );

        Ok(GeneratedArtifact {
            qualified_name: unit.qualified_name(),
            file_name: artifact_file_name(unit, &self.crate_name),
            fingerprint,
            entry_count: declarations.len(),
            source,
        })
    }
}

impl Default for ConfigGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// `crate::settings::General` -> `settings.general.rs`
pub fn artifact_file_name(unit: &GenerationUnit, crate_name: &str) -> String {
    let module = unit.module_path.strip_prefix(crate_name).unwrap_or(&unit.module_path);
    let mut parts: Vec<String> = module
        .split("::")
        .filter(|part| !part.is_empty())
        .map(|part| part.to_snake_case())
        .collect();
    parts.push(unit.ident.to_string().to_snake_case());
    format!("{}.rs", parts.join("."))
}

/// Names of the files in `dir` that a previous pass generated.
fn generated_files(dir: &Path) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "rs") {
            continue;
        }
        let is_generated = fs::read_to_string(&path).is_ok_and(|content| content.starts_with(GENERATED_MARKER));
        if let (true, Some(name)) = (is_generated, path.file_name().and_then(|name| name.to_str())) {
            files.insert(name.to_string());
        }
    }
    Ok(files)
}

/// Only write if content has changed (avoids unnecessary recompilation).
fn write_if_changed(path: &Path, content: &str) -> Result<()> {
    let should_write = match fs::read_to_string(path) {
        Ok(existing) => existing != content,
        Err(_) => true,
    };

    if should_write {
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_source;

    #[test]
    fn test_artifact_file_name() {
        let markers = MarkerSet::new();
        let code = "#[cfgbind::generate_config] struct AudioSettings;";

        let nested = scan_source(code, Path::new("src/a.rs"), "crate::plugin::io", &markers).unwrap();
        assert_eq!(artifact_file_name(&nested[0], "crate"), "plugin.io.audio_settings.rs");

        let root = scan_source(code, Path::new("src/lib.rs"), "crate", &markers).unwrap();
        assert_eq!(artifact_file_name(&root[0], "crate"), "audio_settings.rs");
    }

    #[test]
    fn test_generated_files_ignores_hand_written_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("general.rs"), format!("{GENERATED_MARKER} for `crate::General`.\n")).unwrap();
        fs::write(dir.path().join("mod.rs"), "pub mod general;\n").unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{}").unwrap();

        let files: Vec<String> = generated_files(dir.path()).unwrap().into_iter().collect();
        assert_eq!(files, vec!["general.rs".to_string()]);
    }
}
