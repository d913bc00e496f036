//! Metadata extraction for `#[entry]` constants.

use heck::ToSnakeCase;
use proc_macro2::Span;
use quote::{ToTokens, format_ident};
use std::collections::HashSet;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Ident, ImplItem, ImplItemConst, LitStr, Token, Type};

use crate::markers::MarkerSet;
use crate::resolve::ImportScope;
use crate::scanner::GenerationUnit;

/// One configuration-bound constant of a [`GenerationUnit`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDeclaration {
    /// The constant name (e.g. `MAX_PLAYERS`)
    pub ident: Ident,
    /// Declared type; the handle's type parameter, with `Self` spelled as the unit
    pub ty: Type,
    /// Initializer expression, emitted verbatim as the default value
    pub default: Expr,
    pub section: String,
    pub key: String,
    pub description: String,
}

impl ValueDeclaration {
    /// Field name of the binding handle in the generated struct.
    pub fn handle_ident(&self) -> Ident {
        handle_ident_for(&self.ident)
    }

    pub fn type_source(&self) -> String {
        self.ty.to_token_stream().to_string()
    }

    /// Verbatim default expression as source text.
    pub fn default_source(&self) -> String {
        self.default.to_token_stream().to_string()
    }
}

fn handle_ident_for(ident: &Ident) -> Ident {
    let name = ident.to_string().to_snake_case();
    match name.as_str() {
        // Path keywords have no raw form.
        "self" | "super" | "crate" | "Self" => format_ident!("{name}_"),
        _ => match syn::parse_str::<Ident>(&name) {
            Ok(handle) => handle,
            Err(_) if name.starts_with(char::is_alphabetic) => Ident::new_raw(&name, Span::call_site()),
            Err(_) => format_ident!("entry_{}", ident.to_string().to_lowercase()),
        },
    }
}

/// Extract every entry-marked constant of `unit`, in declaration order.
///
/// Members that are not constants, lack the marker, or carry a malformed
/// marker are left out; none of these is an error.
pub fn extract_declarations(unit: &GenerationUnit, markers: &MarkerSet) -> Vec<ValueDeclaration> {
    let mut declarations = Vec::new();
    let mut handles = HashSet::new();

    let constants = unit.impls.iter().flat_map(|item_impl| &item_impl.items).filter_map(|item| match item {
        ImplItem::Const(item_const) => Some(item_const),
        _ => None,
    });

    for item_const in constants {
        let Some(attr) = entry_attribute(&item_const.attrs, unit.imports(), markers) else {
            continue;
        };

        match parse_declaration(item_const, attr) {
            Ok(declaration) => {
                if !handles.insert(declaration.handle_ident()) {
                    log::warn!(
                        "cfgbind-build: {}::{} maps to an already used handle name `{}`, skipping",
                        unit.qualified_name(),
                        item_const.ident,
                        declaration.handle_ident()
                    );
                    continue;
                }
                declarations.push(declaration);
            }
            Err(err) => {
                log::warn!(
                    "cfgbind-build: malformed entry on {}::{}: {err}",
                    unit.qualified_name(),
                    item_const.ident
                );
            }
        }
    }

    declarations
}

fn entry_attribute<'a>(attrs: &'a [Attribute], scope: &ImportScope, markers: &MarkerSet) -> Option<&'a Attribute> {
    attrs
        .iter()
        .find(|attr| scope.resolve(attr.path()).iter().any(|resolved| markers.is_entry(resolved)))
}

fn parse_declaration(item_const: &ImplItemConst, attr: &Attribute) -> syn::Result<ValueDeclaration> {
    let (section, key, description) = parse_entry_args(attr)?;

    Ok(ValueDeclaration {
        ident: item_const.ident.clone(),
        ty: item_const.ty.clone(),
        default: item_const.expr.clone(),
        section,
        key,
        description,
    })
}

/// Read `("section", "key", "description")`. Order is positional.
fn parse_entry_args(attr: &Attribute) -> syn::Result<(String, String, String)> {
    let args = attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
    let args: Vec<LitStr> = args.into_iter().collect();

    match args.as_slice() {
        [section, key, description] => Ok((section.value(), key.value(), description.value())),
        _ => Err(syn::Error::new_spanned(
            attr,
            format!("expected 3 string arguments (section, key, description), found {}", args.len()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_source;
    use std::path::Path;

    fn extract(code: &str) -> Vec<ValueDeclaration> {
        let markers = MarkerSet::new();
        let units = scan_source(code, Path::new("src/lib.rs"), "crate", &markers).unwrap();
        assert_eq!(units.len(), 1, "expected exactly one unit");
        extract_declarations(&units[0], &markers)
    }

    #[test]
    fn test_extracts_metadata_and_verbatim_default() {
        let declarations = extract(
            r#"
            use cfgbind::{entry, generate_config};

            #[generate_config]
            pub struct General;

            impl General {
                #[entry("General", "Test", "An integer config")]
                pub const TEST: i32 = 0;

                #[entry("Test", "Test 2", "Another test")]
                const TEST2: i16 = 1321 * 2;
            }
            "#,
        );

        assert_eq!(declarations.len(), 2);
        let first = &declarations[0];
        assert_eq!(first.ident, "TEST");
        assert_eq!(first.ty.to_token_stream().to_string(), "i32");
        assert_eq!(first.default_source(), "0");
        assert_eq!(first.section, "General");
        assert_eq!(first.key, "Test");
        assert_eq!(first.description, "An integer config");
        assert_eq!(first.handle_ident(), "test");

        assert_eq!(declarations[1].key, "Test 2");
        assert_eq!(declarations[1].default_source(), "1321 * 2");
        assert_eq!(declarations[1].handle_ident(), "test2");
    }

    #[test]
    fn test_ignores_unmarked_and_foreign_members() {
        let declarations = extract(
            r#"
            #[cfgbind::generate_config]
            struct Settings;

            impl Settings {
                pub const PLAIN: u8 = 3;

                #[other::entry("A", "B", "C")]
                pub const FOREIGN: u8 = 4;

                #[cfgbind::entry("A", "Kept", "kept")]
                pub const KEPT: u8 = 5;

                pub fn not_a_constant() {}
            }
            "#,
        );

        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].ident, "KEPT");
    }

    #[test]
    fn test_malformed_entries_are_skipped_without_affecting_siblings() {
        let declarations = extract(
            r#"
            use cfgbind::*;

            #[generate_config]
            struct Settings;

            impl Settings {
                #[entry("A", "TooFew")]
                pub const TOO_FEW: u8 = 1;

                #[entry("A", "NotStrings", 3)]
                pub const NOT_STRINGS: u8 = 2;

                #[entry]
                pub const NO_ARGS: u8 = 3;

                #[entry("A", "Good", "fine")]
                pub const GOOD: u8 = 4;
            }
            "#,
        );

        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].key, "Good");
    }

    #[test]
    fn test_order_follows_declarations_across_impl_blocks() {
        let declarations = extract(
            r#"
            use cfgbind::{entry, generate_config};

            #[generate_config]
            struct Settings;

            impl Settings {
                #[entry("S", "b", "")]
                const B: bool = true;
            }

            impl Settings {
                #[entry("S", "a", "")]
                const A: bool = false;
            }
            "#,
        );

        let keys: Vec<&str> = declarations.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_keyword_handle_names_become_raw() {
        let declarations = extract(
            r#"
            use cfgbind::{entry, generate_config};

            #[generate_config]
            struct Settings;

            impl Settings {
                #[entry("S", "type", "")]
                const TYPE: u8 = 0;
            }
            "#,
        );

        assert_eq!(declarations[0].handle_ident().to_string(), "r#type");
    }

    #[test]
    fn test_path_keyword_handle_names_get_a_suffix() {
        let declarations = extract(
            r#"
            use cfgbind::{entry, generate_config};

            #[generate_config]
            struct Settings;

            impl Settings {
                #[entry("S", "self", "")]
                const SELF: u8 = 0;

                #[entry("S", "crate", "")]
                const CRATE: u8 = 1;

                #[entry("S", "super", "")]
                const SUPER: u8 = 2;

                #[entry("S", "after", "")]
                const AFTER: u8 = 3;
            }
            "#,
        );

        let handles: Vec<String> = declarations.iter().map(|d| d.handle_ident().to_string()).collect();
        assert_eq!(handles, vec!["self_", "crate_", "super_", "after"]);
    }
}
