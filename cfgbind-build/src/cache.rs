//! Fingerprint-keyed cache of generated artifacts.
//!
//! A unit's fingerprint covers its declaration tokens and the generation
//! context, so an edit invalidates exactly the unit that was edited. The cache
//! is persisted as a JSON manifest next to the generated files, which lets
//! consecutive build script runs skip synthesis for untouched units.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::markers::MarkerSet;
use crate::scanner::GenerationUnit;

/// Bumped whenever the manifest layout changes.
const MANIFEST_VERSION: u32 = 1;

/// Hex-encoded blake3 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of everything outside the units that shapes generated code.
    pub fn context(markers: &MarkerSet, runtime_path: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
        hasher.update(b"\0");
        hasher.update(runtime_path.as_bytes());
        hasher.update(b"\0");
        hasher.update(markers.fingerprint_input().as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn unit(context: &Fingerprint, unit: &GenerationUnit) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(context.0.as_bytes());
        hasher.update(b"\0");
        hasher.update(unit.qualified_name().as_bytes());
        hasher.update(b"\0");
        hasher.update(unit.imports().fingerprint_input().as_bytes());
        hasher.update(b"\0");
        hasher.update(unit.declaration_tokens().to_string().as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 16 hex chars are plenty for log lines
        write!(f, "{}", &self.0[..self.0.len().min(16)])
    }
}

/// The synthesized output for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub qualified_name: String,
    /// File name inside the output directory (e.g. `settings.general.rs`)
    pub file_name: String,
    pub fingerprint: Fingerprint,
    pub entry_count: usize,
    pub source: String,
}

/// Hit/miss counters of one generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evicted: usize,
}

#[derive(Serialize, Deserialize)]
struct Manifest {
    version: u32,
    artifacts: Vec<GeneratedArtifact>,
}

/// Artifacts indexed by fingerprint.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    artifacts: HashMap<Fingerprint, GeneratedArtifact>,
    used: HashSet<Fingerprint>,
    stats: CacheStats,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest. A missing, outdated, or corrupt manifest yields an empty cache.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::new(),
        };

        match serde_json::from_str::<Manifest>(&content) {
            Ok(manifest) if manifest.version == MANIFEST_VERSION => {
                let artifacts = manifest
                    .artifacts
                    .into_iter()
                    .map(|artifact| (artifact.fingerprint.clone(), artifact))
                    .collect();
                Self {
                    artifacts,
                    ..Self::default()
                }
            }
            Ok(manifest) => {
                log::debug!(
                    "cfgbind-build: ignoring cache manifest version {} at {}",
                    manifest.version,
                    path.display()
                );
                Self::new()
            }
            Err(err) => {
                log::warn!("cfgbind-build: ignoring corrupt cache manifest {}: {err}", path.display());
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut artifacts: Vec<GeneratedArtifact> = self.artifacts.values().cloned().collect();
        artifacts.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

        let manifest = Manifest {
            version: MANIFEST_VERSION,
            artifacts,
        };
        let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize cache manifest")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Look up an artifact and count the hit or miss.
    pub fn lookup(&mut self, fingerprint: &Fingerprint) -> Option<&GeneratedArtifact> {
        self.used.insert(fingerprint.clone());
        match self.artifacts.get(fingerprint) {
            Some(artifact) => {
                self.stats.hits += 1;
                Some(artifact)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, artifact: GeneratedArtifact) {
        self.used.insert(artifact.fingerprint.clone());
        self.artifacts.insert(artifact.fingerprint.clone(), artifact);
    }

    /// Drop every artifact not looked up or inserted since the cache was loaded.
    pub fn evict_unused(&mut self) -> usize {
        let before = self.artifacts.len();
        let used = &self.used;
        self.artifacts.retain(|fingerprint, _| used.contains(fingerprint));
        let evicted = before - self.artifacts.len();
        self.stats.evicted += evicted;
        evicted
    }

    /// Output file names of every cached artifact.
    pub fn file_names(&self) -> BTreeSet<String> {
        self.artifacts.values().map(|artifact| artifact.file_name.clone()).collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}
