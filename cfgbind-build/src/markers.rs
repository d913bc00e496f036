//! Marker identities recognized by the generator.
//!
//! The markers themselves are attribute macros exported by `cfgbind-macros`
//! (and re-exported by `cfgbind`). The generator never sees their expansion;
//! it only compares resolved attribute paths against the names here.

/// Type-level marker: `#[cfgbind::generate_config]`.
pub const GENERATE_MARKER: &str = "generate_config";

/// Member-level marker: `#[cfgbind::entry(section, key, description)]`.
pub const ENTRY_MARKER: &str = "entry";

/// Crates that export the markers out of the box.
pub const DEFAULT_MARKER_CRATES: &[&str] = &["cfgbind", "cfgbind_macros"];

/// The set of crate names under which the markers may be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    crates: Vec<String>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self {
            crates: DEFAULT_MARKER_CRATES.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Accept the markers under an additional crate name, e.g. when the
    /// dependency is renamed in `Cargo.toml`.
    pub fn with_crate(mut self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref().replace('-', "_");
        if !self.crates.contains(&name) {
            self.crates.push(name);
        }
        self
    }

    pub fn crates(&self) -> &[String] {
        &self.crates
    }

    /// Cheap text check used before parsing a file at all.
    pub fn mentioned_in(&self, source: &str) -> bool {
        self.crates.iter().any(|name| source.contains(name.as_str()))
    }

    pub fn is_generate(&self, resolved: &[String]) -> bool {
        self.matches(resolved, GENERATE_MARKER)
    }

    pub fn is_entry(&self, resolved: &[String]) -> bool {
        self.matches(resolved, ENTRY_MARKER)
    }

    /// Stable text mixed into every cache fingerprint.
    pub fn fingerprint_input(&self) -> String {
        format!("{GENERATE_MARKER}|{ENTRY_MARKER}|{}", self.crates.join(","))
    }

    fn matches(&self, resolved: &[String], marker: &str) -> bool {
        match resolved {
            [krate, name] => name == marker && self.crates.iter().any(|known| known == krate),
            _ => false,
        }
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_only_exact_qualified_names() {
        let markers = MarkerSet::new();
        assert!(markers.is_generate(&path(&["cfgbind", "generate_config"])));
        assert!(markers.is_generate(&path(&["cfgbind_macros", "generate_config"])));
        assert!(!markers.is_generate(&path(&["other", "generate_config"])));
        assert!(!markers.is_generate(&path(&["cfgbind", "markers", "generate_config"])));
        assert!(!markers.is_generate(&path(&["generate_config"])));
        assert!(markers.is_entry(&path(&["cfgbind", "entry"])));
    }

    #[test]
    fn test_with_crate_normalizes_dashes() {
        let markers = MarkerSet::new().with_crate("my-config");
        assert!(markers.is_entry(&path(&["my_config", "entry"])));
        assert!(markers.mentioned_in("use my_config::entry;"));
    }
}
