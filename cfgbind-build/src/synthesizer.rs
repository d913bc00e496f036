//! Rendering of generated binding code.

use anyhow::{Context, Result};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::visit_mut::{self, VisitMut};
use syn::{Ident, Type};

use crate::extractor::ValueDeclaration;
use crate::scanner::GenerationUnit;

/// Path of the runtime crate used in generated code unless configured otherwise.
pub const DEFAULT_RUNTIME_PATH: &str = "::cfgbind";

/// First-line prefix of every generated file.
pub const GENERATED_MARKER: &str = "// @generated by cfgbind-build";

/// Renders one source file per [`GenerationUnit`].
#[derive(Debug, Clone)]
pub struct Synthesizer {
    runtime_path: syn::Path,
}

impl Synthesizer {
    pub fn new(runtime_path: &str) -> Result<Self> {
        let runtime_path =
            syn::parse_str(runtime_path).with_context(|| format!("Invalid runtime path `{runtime_path}`"))?;
        Ok(Self { runtime_path })
    }

    /// Render the complete, formatted artifact text.
    ///
    /// Identical inputs always produce byte-identical output.
    pub fn render(&self, unit: &GenerationUnit, declarations: &[ValueDeclaration]) -> Result<String> {
        let tokens = self.tokens(unit, declarations);
        let syntax_tree: syn::File = syn::parse2(tokens)
            .with_context(|| format!("Failed to parse generated code for {}", unit.qualified_name()))?;

        Ok(format!(
            "{} for `{}`. Do not edit manually.\n\n{}",
            GENERATED_MARKER,
            unit.qualified_name(),
            prettyplease::unparse(&syntax_tree)
        ))
    }

    fn tokens(&self, unit: &GenerationUnit, declarations: &[ValueDeclaration]) -> TokenStream {
        let rt = &self.runtime_path;
        let unit_ident = &unit.ident;
        let config_ident = format_ident!("{}Config", unit_ident);

        let handles: Vec<TokenStream> = declarations
            .iter()
            .map(|declaration| {
                let field = declaration.handle_ident();
                let ty = concrete_type(&declaration.ty, unit_ident);
                let description = format!(" {}", declaration.description);
                let remark = format!(
                    " Uses the default value specified by [`{unit_ident}::{}`].",
                    declaration.ident
                );

                quote! {
                    #[doc = #description]
                    #[doc = ""]
                    #[doc = #remark]
                    pub #field: #rt::ConfigEntry<#ty>,
                }
            })
            .collect();

        let bindings: Vec<TokenStream> = declarations
            .iter()
            .map(|declaration| {
                let field = declaration.handle_ident();
                let ty = concrete_type(&declaration.ty, unit_ident);
                let default = &declaration.default;
                let section = &declaration.section;
                let key = &declaration.key;
                let description = &declaration.description;

                quote! {
                    #field: store.bind::<#ty>(#section, #key, #default, #description)?,
                }
            })
            .collect();

        let struct_doc = format!(" Configuration handles bound by [`{unit_ident}::register`].");

        quote! {
            #[doc = #struct_doc]
            #[derive(Clone)]
            pub struct #config_ident {
                #(#handles)*
            }

            impl #unit_ident {
                /// Binds every `#[entry]` constant of this type to `store`.
                ///
                /// Saving on set is suspended while binding. Orphaned entries are
                /// cleared and the store is saved once; saving on set is switched
                /// back on afterwards, also when binding fails.
                #[allow(clippy::redundant_closure_call)]
                pub fn register<S>(store: &mut S) -> ::core::result::Result<#config_ident, #rt::ConfigError>
                where
                    S: #rt::ConfigStore,
                {
                    store.set_save_on_config_set(false);

                    let bound = (|| -> ::core::result::Result<#config_ident, #rt::ConfigError> {
                        ::core::result::Result::Ok(#config_ident {
                            #(#bindings)*
                        })
                    })();

                    let result = bound.and_then(|config| {
                        store.clear_orphans();
                        store.save().map(|()| config)
                    });

                    store.set_save_on_config_set(true);
                    result
                }
            }
        }
    }
}

/// `ty` with every `Self` replaced by the unit's name. The handle struct is a
/// different type, so `Self` cannot appear in its fields.
fn concrete_type(ty: &Type, unit_ident: &Ident) -> Type {
    let mut ty = ty.clone();
    ReplaceSelf { unit_ident }.visit_type_mut(&mut ty);
    ty
}

struct ReplaceSelf<'a> {
    unit_ident: &'a Ident,
}

impl VisitMut for ReplaceSelf<'_> {
    fn visit_type_path_mut(&mut self, type_path: &mut syn::TypePath) {
        if type_path.qself.is_none()
            && let Some(first) = type_path.path.segments.first_mut()
            && first.ident == "Self"
        {
            first.ident = self.unit_ident.clone();
        }
        visit_mut::visit_type_path_mut(self, type_path);
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self {
            runtime_path: syn::parse_quote!(::cfgbind),
        }
    }
}
