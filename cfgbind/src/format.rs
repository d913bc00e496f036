//! Reading and writing the commented TOML layout of config files.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use crate::definition::ConfigDefinition;
use crate::errors::ConfigError;

pub(crate) const FILE_HEADER: &str = "## Settings file was created by cfgbind";

/// Comment block written above a bound entry.
pub(crate) struct Annotation<'a> {
    pub description: &'a str,
    pub type_name: &'static str,
    pub default: toml::Value,
}

pub(crate) struct RenderedEntry<'a> {
    pub definition: &'a ConfigDefinition,
    pub value: toml::Value,
    /// `None` for orphans, which are written back without comments.
    pub annotation: Option<Annotation<'a>>,
}

/// Render entries sorted by definition into file content.
pub(crate) fn render(entries: &[RenderedEntry<'_>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{FILE_HEADER}");

    let mut current_section: Option<&str> = None;
    for entry in entries {
        let section = entry.definition.section.as_str();
        if current_section != Some(section) {
            let _ = writeln!(out, "\n[{}]", format_key(section));
            current_section = Some(section);
        }

        out.push('\n');
        if let Some(annotation) = &entry.annotation {
            for line in annotation.description.lines() {
                let _ = writeln!(out, "## {line}");
            }
            let _ = writeln!(out, "# Setting type: {}", short_type_name(annotation.type_name));
            let default = annotation.default.to_string();
            if !default.contains('\n') {
                let _ = writeln!(out, "# Default value: {default}");
            }
        }
        let _ = writeln!(out, "{} = {}", format_key(&entry.definition.key), entry.value);
    }

    out
}

/// Parse file content into one value per `(section, key)`.
///
/// Top-level values outside a section and keys that cannot form a definition
/// are skipped with a warning.
pub(crate) fn parse(content: &str, path: &Path) -> Result<BTreeMap<ConfigDefinition, toml::Value>, ConfigError> {
    let table: toml::Table = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut values = BTreeMap::new();
    for (section, value) in table {
        let toml::Value::Table(entries) = value else {
            log::warn!("cfgbind: ignoring value `{section}` outside of any section in {}", path.display());
            continue;
        };

        for (key, value) in entries {
            match ConfigDefinition::new(section.clone(), key) {
                Ok(definition) => {
                    values.insert(definition, value);
                }
                Err(err) => log::warn!("cfgbind: skipping entry in {}: {err}", path.display()),
            }
        }
    }

    Ok(values)
}

/// Bare keys are written as-is; anything else is quoted.
pub(crate) fn format_key(key: &str) -> String {
    let bare = !key.is_empty() && key.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if bare {
        key.to_string()
    } else {
        toml::Value::String(key.to_string()).to_string()
    }
}

/// `alloc::borrow::Cow<str>` -> `Cow<str>`
fn short_type_name(full: &str) -> String {
    fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    let mut out = String::with_capacity(full.len());
    let mut path = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            path.push(ch);
        } else {
            out.push_str(last_segment(&path));
            path.clear();
            out.push(ch);
        }
    }
    out.push_str(last_segment(&path));
    out
}
