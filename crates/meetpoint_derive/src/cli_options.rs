use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Path, parse_macro_input, spanned::Spanned};

use crate::utils;

pub fn derive_cli_options_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_ident = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "CliOptions can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new(
            input.span(),
            "CliOptions requires named fields",
        ));
    };

    let mut arms = Vec::new();
    let mut hints = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };

        let mut long_name: Option<String> = None;
        let mut parse_with: Option<Path> = None;
        let mut value_hint: Option<String> = None;

        for (key, lit) in utils::str_attr_pairs(&field.attrs, "cli", &["long", "parse_with", "value"])? {
            match key.as_str() {
                "long" => long_name = Some(lit.value()),
                "parse_with" => parse_with = Some(lit.parse()?),
                _ => value_hint = Some(lit.value()),
            }
        }

        // Fields without `long` are handled by the caller (boolean flags and the like).
        let Some(long_name) = long_name else {
            continue;
        };
        let long_name_lit = LitStr::new(&long_name, Span::call_site());
        let hint = value_hint.unwrap_or_else(|| utils::default_value_hint(&field.ty));
        let hint_lit = LitStr::new(&hint, Span::call_site());
        let parse_expr = utils::build_cli_parse_expr(&field.ty, parse_with.as_ref());

        arms.push(quote! {
            #long_name_lit => {
                let raw = value.ok_or_else(|| {
                    crate::Error::invalid_input(format!("Missing value for --{name}"))
                })?;
                self.#field_ident = #parse_expr;
                Ok(true)
            }
        });
        hints.push(quote! { (#long_name_lit, #hint_lit) });
    }

    Ok(quote! {
        impl #struct_ident {
            /// `(long name, value placeholder)` for every value-taking option, in field order.
            pub const CLI_VALUE_OPTIONS: &'static [(&'static str, &'static str)] = &[#(#hints),*];

            fn split_arg(
                raw_name: &str,
                args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
            ) -> (String, Option<String>) {
                if let Some((k, v)) = raw_name.split_once('=') {
                    return (k.to_string(), Some(v.to_string()));
                }

                // A following token that starts with "--" is the next option; a bare
                // leading '-' is still a value so negative coordinates parse.
                let value = match args.peek() {
                    Some(next) if !next.starts_with("--") => args.next(),
                    _ => None,
                };

                (raw_name.to_string(), value)
            }

            fn apply_cli_option(
                &mut self,
                name: &str,
                value: Option<String>,
            ) -> crate::Result<bool> {
                match name {
                    #(#arms,)*
                    _ => Ok(false),
                }
            }
        }
    })
}
