use proc_macro2::{Span, TokenStream};
use syn::punctuated::Punctuated;
use syn::{Error, ImplItem, Item, LitStr, Result, Token};

pub(crate) fn check_generate_config(args: TokenStream, input: TokenStream) -> Result<()> {
    if !args.is_empty() {
        return Err(Error::new_spanned(args, "#[generate_config] takes no arguments"));
    }

    match syn::parse2::<Item>(input)? {
        Item::Struct(_) | Item::Enum(_) => Ok(()),
        other => Err(Error::new_spanned(
            other,
            "#[generate_config] can only be applied to structs and enums",
        )),
    }
}

pub(crate) fn check_entry(args: TokenStream, input: TokenStream) -> Result<()> {
    let parsed = syn::parse::Parser::parse2(Punctuated::<LitStr, Token![,]>::parse_terminated, args.clone())?;
    if parsed.len() != 3 {
        let span = if args.is_empty() {
            Span::call_site()
        } else {
            syn::spanned::Spanned::span(&args)
        };
        return Err(Error::new(
            span,
            format!(
                "#[entry] expects 3 string arguments (section, key, description), found {}",
                parsed.len()
            ),
        ));
    }

    // Section and key become TOML keys; only the description may span lines.
    for lit in parsed.iter().take(2) {
        let value = lit.value();
        if value.is_empty() || value.contains(['\n', '\r']) {
            return Err(Error::new(lit.span(), "#[entry] section and key must be non-empty and single-line"));
        }
        if value.trim() != value {
            return Err(Error::new(
                lit.span(),
                "#[entry] section and key cannot start or end with whitespace",
            ));
        }
    }

    match syn::parse2::<ImplItem>(input)? {
        ImplItem::Const(_) => Ok(()),
        other => Err(Error::new_spanned(other, "#[entry] can only be applied to constants")),
    }
}
