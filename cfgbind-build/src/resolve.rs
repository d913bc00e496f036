//! Attribute path resolution against the `use` declarations of one module scope.
//!
//! This is the "semantic" half of discovery: a syntactic candidate only becomes a
//! generation root once its attribute path resolves to the marker's qualified name.
//! Resolution is scoped to a single module body, which mirrors Rust itself: an
//! inline `mod` does not inherit the imports of its parent.

use std::collections::HashMap;

use syn::{Item, ItemExternCrate, UseTree};

/// Segments that anchor a path inside the current crate.
const LOCAL_ROOTS: &[&str] = &["crate", "self", "super", "Self"];

/// Limit for chained alias expansion (`use a as b; use b::c as d; ...`).
const MAX_EXPANSION_DEPTH: usize = 8;

/// Imports visible in one module scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScope {
    aliases: HashMap<String, Vec<String>>,
    globs: Vec<Vec<String>>,
}

impl ImportScope {
    /// Collect the imports declared directly in `items`.
    pub fn from_items(items: &[Item]) -> Self {
        let mut scope = Self::default();
        for item in items {
            match item {
                Item::Use(item_use) => scope.collect_tree(&item_use.tree, Vec::new()),
                Item::ExternCrate(extern_crate) => scope.collect_extern_crate(extern_crate),
                _ => {}
            }
        }
        scope
    }

    /// Resolve an attribute path to the fully-qualified paths it may denote.
    ///
    /// An empty result means the path cannot be resolved. A single-segment name
    /// brought in through glob imports yields one candidate per glob.
    pub fn resolve(&self, path: &syn::Path) -> Vec<Vec<String>> {
        let segments: Vec<String> = path.segments.iter().map(|segment| segment.ident.to_string()).collect();
        if segments.is_empty() {
            return Vec::new();
        }

        if path.leading_colon.is_some() {
            return vec![segments];
        }

        if let Some(expanded) = self.expand(&segments, 0) {
            return vec![expanded];
        }

        if LOCAL_ROOTS.contains(&segments[0].as_str()) {
            return Vec::new();
        }

        if segments.len() == 1 {
            return self
                .globs
                .iter()
                .filter_map(|prefix| {
                    let mut candidate = self.expand(prefix, 0).unwrap_or_else(|| prefix.clone());
                    candidate.push(segments[0].clone());
                    (!LOCAL_ROOTS.contains(&candidate[0].as_str())).then_some(candidate)
                })
                .collect();
        }

        // Multi-segment path not rooted in an import: an extern crate path.
        vec![segments]
    }

    /// Deterministic rendering of the scope, for cache fingerprints.
    pub fn fingerprint_input(&self) -> String {
        let mut aliases: Vec<String> = self
            .aliases
            .iter()
            .map(|(alias, target)| format!("{alias}={}", target.join("::")))
            .collect();
        aliases.sort();
        let globs: Vec<String> = self.globs.iter().map(|prefix| format!("{}::*", prefix.join("::"))).collect();
        format!("{};{}", aliases.join(","), globs.join(","))
    }

    fn expand(&self, segments: &[String], depth: usize) -> Option<Vec<String>> {
        let (first, rest) = segments.split_first()?;
        let target = self.aliases.get(first)?;

        let mut expanded = target.clone();
        expanded.extend(rest.iter().cloned());

        if depth < MAX_EXPANSION_DEPTH && expanded[0] != *first {
            if let Some(further) = self.expand(&expanded, depth + 1) {
                return Some(further);
            }
        }

        if LOCAL_ROOTS.contains(&expanded[0].as_str()) {
            return None;
        }
        Some(expanded)
    }

    fn collect_tree(&mut self, tree: &UseTree, prefix: Vec<String>) {
        match tree {
            UseTree::Path(use_path) => {
                let mut next = prefix;
                next.push(use_path.ident.to_string());
                self.collect_tree(&use_path.tree, next);
            }
            UseTree::Name(use_name) => {
                let name = use_name.ident.to_string();
                if name == "self" {
                    if let Some(last) = prefix.last() {
                        self.aliases.insert(last.clone(), prefix.clone());
                    }
                } else {
                    let mut target = prefix;
                    target.push(name.clone());
                    self.aliases.insert(name, target);
                }
            }
            UseTree::Rename(use_rename) => {
                let alias = use_rename.rename.to_string();
                if alias == "_" {
                    return;
                }
                let mut target = prefix;
                if use_rename.ident != "self" {
                    target.push(use_rename.ident.to_string());
                }
                if !target.is_empty() {
                    self.aliases.insert(alias, target);
                }
            }
            UseTree::Glob(_) => {
                if !prefix.is_empty() {
                    self.globs.push(prefix);
                }
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    self.collect_tree(item, prefix.clone());
                }
            }
        }
    }

    fn collect_extern_crate(&mut self, extern_crate: &ItemExternCrate) {
        let name = extern_crate.ident.to_string();
        if name == "self" {
            return;
        }
        if let Some((_, rename)) = &extern_crate.rename {
            self.aliases.insert(rename.to_string(), vec![name.clone()]);
        }
        let macro_use = extern_crate.attrs.iter().any(|attr| attr.path().is_ident("macro_use"));
        if macro_use {
            self.globs.push(vec![name]);
        }
    }
}
