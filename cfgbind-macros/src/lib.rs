use proc_macro::TokenStream;

mod markers;

/// Marks a struct or enum whose `#[entry]` constants get configuration bindings.
///
/// The attribute itself expands to the item unchanged; `cfgbind-build` picks
/// the type up at build time and generates a `<Type>Config` struct of handles
/// plus `<Type>::register`.
///
/// # Example
///
/// ```text
/// #[cfgbind::generate_config]
/// pub struct General;
///
/// impl General {
///     #[cfgbind::entry("General", "Test", "An integer config")]
///     pub const TEST: i32 = 0;
/// }
/// ```
#[proc_macro_attribute]
pub fn generate_config(args: TokenStream, input: TokenStream) -> TokenStream {
    match markers::check_generate_config(args.into(), input.clone().into()) {
        Ok(()) => input,
        Err(err) => {
            let mut output: TokenStream = err.to_compile_error().into();
            output.extend(input);
            output
        }
    }
}

/// Marks a constant as a configuration entry: `#[entry(section, key, description)]`.
///
/// The three string arguments are positional. The constant's initializer is
/// the entry's default value and its type is the entry's value type.
#[proc_macro_attribute]
pub fn entry(args: TokenStream, input: TokenStream) -> TokenStream {
    match markers::check_entry(args.into(), input.clone().into()) {
        Ok(()) => input,
        Err(err) => {
            let mut output: TokenStream = err.to_compile_error().into();
            output.extend(input);
            output
        }
    }
}
