use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

use crate::utils;

pub fn derive_kv_display_inner(item: TokenStream) -> TokenStream {
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
            "KvDisplay can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new(input.span(), "KvDisplay requires named fields"));
    };

    let mut keys = Vec::new();
    let mut vals = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let mut key = field_ident.to_string();
        let mut fmt_mode = String::from("display");
        let mut skip = false;

        for (attr_key, lit) in utils::str_attr_pairs(&field.attrs, "kv", &["name", "fmt"])? {
            match attr_key.as_str() {
                "name" => key = lit.value(),
                _ => {
                    fmt_mode = lit.value();
                    skip = fmt_mode == "skip";
                }
            }
        }
        if skip {
            continue;
        }

        let value = match fmt_mode.as_str() {
            "display" => quote! { &self.#field_ident },
            "len" => quote! { &self.#field_ident.len() },
            "path" => quote! { &self.#field_ident.display() },
            "option" => quote! {
                &self.#field_ident
                    .as_ref()
                    .map_or_else(|| String::from("-"), |v| v.to_string())
            },
            other => {
                return Err(syn::Error::new(
                    field.span(),
                    format!("unsupported kv fmt mode: {other}"),
                ));
            }
        };
        keys.push(key);
        vals.push(value);
    }

    let longest = keys.iter().map(String::len).max().unwrap_or(0);
    let format_parts: Vec<String> = keys
        .iter()
        .map(|key| format!("\t{key:<longest$} = {{}}"))
        .collect();
    let format_lit = LitStr::new(&format!("\n{}", format_parts.join("\n")), Span::call_site());

    Ok(quote! {
        impl std::fmt::Display for #struct_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, #format_lit, #(#vals),*)
            }
        }
    })
}
