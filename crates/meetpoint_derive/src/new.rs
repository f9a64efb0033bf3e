use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input, spanned::Spanned};

use crate::utils;

/// `new(..)` takes every required field; `Option<T>` fields start as `None`
/// and underscore-prefixed `PhantomData` fields are filled in. Each
/// non-phantom field also gets a consuming `with_<field>` builder.
pub fn derive_new_inner(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "`New` requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "`New` can only be derived for structs",
            ));
        }
    };

    let mut new_args = Vec::new();
    let mut inits = Vec::new();
    let mut builders = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;

        if ident.to_string().starts_with('_') {
            if !utils::is_phantom_data(ty) {
                return Err(syn::Error::new(
                    field.span(),
                    "underscore-prefixed fields in `#[derive(New)]` must be `PhantomData<_>`",
                ));
            }
            inits.push(quote! { #ident: std::marker::PhantomData });
            continue;
        }

        let method = format_ident!("with_{}", ident);
        if let Some(inner) = utils::inner_of_option(ty) {
            inits.push(quote! { #ident: None });
            builders.push(quote! {
                pub fn #method(mut self, #ident: #inner) -> Self {
                    self.#ident = Some(#ident);
                    self
                }
            });
        } else {
            new_args.push(quote! { #ident: #ty });
            inits.push(quote! { #ident });
            builders.push(quote! {
                pub fn #method(mut self, #ident: #ty) -> Self {
                    self.#ident = #ident;
                    self
                }
            });
        }
    }

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub const fn new(#(#new_args),*) -> Self {
                Self { #(#inits),* }
            }

            #(#builders)*
        }
    })
}
