use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

use crate::utils;

pub fn derive_cli_value_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_ident = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "CliValue can only be derived for enums",
        ));
    };

    let mut option_name = utils::to_kebab_case(&enum_ident.to_string());
    for (_, lit) in utils::str_attr_pairs(&input.attrs, "cli_value", &["option"])? {
        option_name = lit.value();
    }

    let mut parse_arms = Vec::new();
    let mut display_arms = Vec::new();
    let mut expected_values = Vec::new();

    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "CliValue only supports enums with unit variants",
            ));
        }

        let variant_ident = &variant.ident;
        let mut canonical = utils::to_kebab_case(&variant_ident.to_string());
        let mut aliases: Vec<String> = Vec::new();

        for (key, lit) in utils::str_attr_pairs(&variant.attrs, "cli", &["name", "alias"])? {
            if key == "name" {
                canonical = lit.value();
            } else {
                aliases.push(lit.value());
            }
        }

        expected_values.push(canonical.clone());
        let canonical_lit = LitStr::new(&canonical, Span::call_site());
        let tokens = std::iter::once(canonical.as_str())
            .chain(aliases.iter().map(String::as_str))
            .map(|v| LitStr::new(v, Span::call_site()));

        parse_arms.push(quote! {
            #(#tokens)|* => Ok(Self::#variant_ident),
        });
        display_arms.push(quote! {
            Self::#variant_ident => #canonical_lit,
        });
    }

    let expected_lit = LitStr::new(&expected_values.join("|"), Span::call_site());
    let option_lit = LitStr::new(&option_name, Span::call_site());

    Ok(quote! {
        impl #enum_ident {
            /// Canonical names joined with `|`, as shown in usage text.
            pub const CLI_CHOICES: &'static str = #expected_lit;

            pub fn parse(raw: &str) -> crate::Result<Self> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid value for --{}: {} (expected {})",
                        #option_lit,
                        raw,
                        Self::CLI_CHOICES
                    ))),
                }
            }
        }

        impl std::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let value = match self {
                    #(#display_arms)*
                };
                f.write_str(value)
            }
        }
    })
}
