//! Build-time generator for cfgbind configuration bindings.
//!
//! This crate scans your source files for types marked `#[cfgbind::generate_config]`
//! and, for every associated constant marked `#[cfgbind::entry(section, key, description)]`,
//! generates a typed [`ConfigEntry`](https://docs.rs/cfgbind) handle plus a
//! `register` function that binds all handles to a configuration store.
//!
//! # Example
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     cfgbind_build::generate_config()
//!         .scan_path("src/")
//!         .run()
//!         .expect("Failed to generate configuration bindings");
//! }
//! ```
//!
//! Then, next to the marked type:
//!
//! ```ignore
//! #[cfgbind::generate_config]
//! pub struct General;
//!
//! impl General {
//!     #[cfgbind::entry("General", "Test", "An integer config")]
//!     pub const TEST: i32 = 0;
//! }
//!
//! cfgbind::include_config!("general");
//! ```

mod cache;
mod extractor;
mod generator;
pub mod markers;
mod resolve;
mod scanner;
mod synthesizer;

pub use cache::{ArtifactCache, CacheStats, Fingerprint, GeneratedArtifact};
pub use extractor::{ValueDeclaration, extract_declarations};
pub use generator::{ConfigGenerator, GenerationReport, MANIFEST_FILE, UnitReport, UnitStatus, artifact_file_name};
pub use markers::MarkerSet;
pub use resolve::ImportScope;
pub use scanner::{GenerationUnit, ScanOutcome, compute_module_path, scan_directory, scan_source};
pub use synthesizer::{DEFAULT_RUNTIME_PATH, Synthesizer};

/// Create a new generator with default settings.
///
/// # Example
///
/// ```ignore
/// cfgbind_build::generate_config()
///     .scan_path("src/")
///     .output_dir("src/generated")
///     .run()
///     .expect("Failed to generate configuration bindings");
/// ```
pub fn generate_config() -> ConfigGenerator {
    ConfigGenerator::new()
}
