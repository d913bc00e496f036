//! Source scanner for discovering `#[generate_config]` types.
//!
//! Discovery runs in two stages. The syntactic stage looks only at attribute
//! shapes and never resolves anything; the semantic stage resolves the attribute
//! path through the module's imports and keeps exact marker matches only.

use anyhow::{Context, Result};
use proc_macro2::TokenStream;
use quote::ToTokens;
use std::fs;
use std::path::{Path, PathBuf};
use syn::{Attribute, Generics, Ident, Item, ItemImpl, Type};
use walkdir::WalkDir;

use crate::markers::{GENERATE_MARKER, MarkerSet};
use crate::resolve::ImportScope;

/// Attributes that can never be the generate marker.
const BUILTIN_ATTRIBUTES: &[&str] = &[
    "doc",
    "derive",
    "allow",
    "warn",
    "deny",
    "expect",
    "cfg",
    "cfg_attr",
    "repr",
    "non_exhaustive",
    "must_use",
    "deprecated",
    "serde",
];

/// A type declaration carrying the generate marker, with the inherent impl
/// blocks that hold its members.
#[derive(Debug, Clone)]
pub struct GenerationUnit {
    /// The type name (e.g. `General`)
    pub ident: Ident,
    /// The module path where the type is declared (e.g. `crate::settings`)
    pub module_path: String,
    /// File the declaration was read from
    pub source_path: PathBuf,
    /// The marked struct or enum
    pub item: Item,
    /// Inherent impls of the type in the same module, in source order
    pub impls: Vec<ItemImpl>,
    pub(crate) imports: ImportScope,
}

impl GenerationUnit {
    /// Fully-qualified name, e.g. `crate::settings::General`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module_path, self.ident)
    }

    /// Tokens of every declaration that can influence the generated artifact.
    pub fn declaration_tokens(&self) -> TokenStream {
        let mut tokens = self.item.to_token_stream();
        for item_impl in &self.impls {
            item_impl.to_tokens(&mut tokens);
        }
        tokens
    }

    pub fn imports(&self) -> &ImportScope {
        &self.imports
    }
}

/// Everything found below one scan root.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Every Rust file that was considered, for rebuild tracking
    pub files: Vec<PathBuf>,
    pub units: Vec<GenerationUnit>,
}

/// Scan a directory recursively for `#[generate_config]` types.
///
/// Files that cannot be read or parsed are skipped; discovery never fails
/// because of one bad file.
pub fn scan_directory(path: &Path, crate_name: &str, markers: &MarkerSet, exclude: &[PathBuf]) -> Result<ScanOutcome> {
    if !path.exists() {
        anyhow::bail!("scan path {} does not exist", path.display());
    }

    let mut outcome = ScanOutcome::default();

    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().extension().is_some_and(|ext| ext == "rs")
                && !e.path().to_string_lossy().contains("/generated/")
                && !e.path().to_string_lossy().contains("/target/")
                && !exclude.iter().any(|excluded| e.path().starts_with(excluded))
        })
    {
        let file_path = entry.path();
        outcome.files.push(file_path.to_path_buf());

        match scan_file(file_path, path, crate_name, markers) {
            Ok(units) => outcome.units.extend(units),
            Err(err) => log::warn!("cfgbind-build: skipping {}: {err:#}", file_path.display()),
        }
    }

    Ok(outcome)
}

/// Scan a single Rust file.
fn scan_file(file_path: &Path, base_path: &Path, crate_name: &str, markers: &MarkerSet) -> Result<Vec<GenerationUnit>> {
    let content = fs::read_to_string(file_path).with_context(|| format!("Failed to read {}", file_path.display()))?;

    // Quick text check before doing full parsing.
    if !markers.mentioned_in(&content) {
        return Ok(Vec::new());
    }

    let module_path = compute_module_path(file_path, base_path, crate_name);
    scan_source(&content, file_path, &module_path, markers)
}

/// Scan Rust source text that belongs to `module_path`.
pub fn scan_source(source: &str, source_path: &Path, module_path: &str, markers: &MarkerSet) -> Result<Vec<GenerationUnit>> {
    let syntax = syn::parse_file(source).with_context(|| format!("Failed to parse {}", source_path.display()))?;

    let mut units = Vec::new();
    scan_items(&syntax.items, module_path, source_path, markers, &mut units);
    Ok(units)
}

fn scan_items(items: &[Item], module_path: &str, source_path: &Path, markers: &MarkerSet, units: &mut Vec<GenerationUnit>) {
    // Resolved lazily: most modules contain no candidates at all.
    let mut imports: Option<ImportScope> = None;

    for item in items {
        if let Item::Mod(item_mod) = item {
            if let Some((_, content)) = &item_mod.content {
                let nested = format!("{module_path}::{}", item_mod.ident);
                scan_items(content, &nested, source_path, markers, units);
            }
            continue;
        }

        let Some((ident, attrs, generics)) = type_declaration(item) else {
            continue;
        };

        if !is_candidate(attrs) {
            continue;
        }

        let scope = imports.get_or_insert_with(|| ImportScope::from_items(items));
        if !is_confirmed(attrs, scope, markers) {
            log::debug!("cfgbind-build: {module_path}::{ident} has an unresolved marker-like attribute, skipping");
            continue;
        }

        if !generics.params.is_empty() {
            log::warn!("cfgbind-build: {module_path}::{ident} is generic; generic types cannot be bound, skipping");
            continue;
        }

        units.push(GenerationUnit {
            ident: ident.clone(),
            module_path: module_path.to_string(),
            source_path: source_path.to_path_buf(),
            item: item.clone(),
            impls: inherent_impls(items, ident),
            imports: scope.clone(),
        });
    }
}

fn type_declaration(item: &Item) -> Option<(&Ident, &[Attribute], &Generics)> {
    match item {
        Item::Struct(item_struct) => Some((&item_struct.ident, &item_struct.attrs, &item_struct.generics)),
        Item::Enum(item_enum) => Some((&item_enum.ident, &item_enum.attrs, &item_enum.generics)),
        _ => None,
    }
}

/// Syntactic stage: does any attribute look like the generate marker?
///
/// Qualified paths must end in the marker name; a bare name may be an import
/// alias, so any bare attribute that is not a built-in qualifies.
fn is_candidate(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        let path = attr.path();
        match path.segments.len() {
            0 => false,
            1 => !BUILTIN_ATTRIBUTES.iter().any(|builtin| path.is_ident(builtin)),
            _ => path.segments.last().is_some_and(|segment| segment.ident == GENERATE_MARKER),
        }
    })
}

/// Semantic stage: does an attribute resolve to the generate marker exactly?
fn is_confirmed(attrs: &[Attribute], scope: &ImportScope, markers: &MarkerSet) -> bool {
    attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("doc"))
        .any(|attr| scope.resolve(attr.path()).iter().any(|resolved| markers.is_generate(resolved)))
}

/// Collect `impl Ident { ... }` blocks (no trait, no generics) in source order.
fn inherent_impls(items: &[Item], ident: &Ident) -> Vec<ItemImpl> {
    items
        .iter()
        .filter_map(|item| match item {
            Item::Impl(item_impl) if item_impl.trait_.is_none() && item_impl.generics.params.is_empty() => {
                let Type::Path(type_path) = item_impl.self_ty.as_ref() else {
                    return None;
                };
                (type_path.qself.is_none() && type_path.path.is_ident(ident)).then(|| item_impl.clone())
            }
            _ => None,
        })
        .collect()
}

/// Compute the module path from a file path.
/// e.g., "src/settings/audio.rs" -> "crate::settings::audio"
pub fn compute_module_path(file_path: &Path, base_path: &Path, crate_name: &str) -> String {
    let relative = file_path.strip_prefix(base_path).unwrap_or(file_path);

    let without_extension = relative.with_extension("");
    let mut parts: Vec<&str> = without_extension
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();

    // Remove "mod", "lib" or "main" from the end if present
    if let Some(last) = parts.last()
        && (*last == "mod" || *last == "lib" || *last == "main")
    {
        parts.pop();
    }

    if parts.is_empty() {
        crate_name.to_string()
    } else {
        format!("{}::{}", crate_name, parts.join("::"))
    }
}
