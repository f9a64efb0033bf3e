use quote::quote;
use syn::{
    AngleBracketedGenericArguments, Attribute, GenericArgument, LitStr, Path, PathArguments, Type,
    TypePath,
};

/// Collects `key = "value"` pairs from every `#[<name>(...)]` attribute.
/// Keys outside `allowed` are rejected with a spanned error.
pub fn str_attr_pairs(
    attrs: &[Attribute],
    name: &str,
    allowed: &[&str],
) -> syn::Result<Vec<(String, LitStr)>> {
    let mut pairs = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident(name) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let Some(key) = allowed.iter().find(|key| meta.path.is_ident(key)) else {
                return Err(meta.error(format!(
                    "unsupported {name} attribute; expected {}",
                    allowed.join("/")
                )));
            };
            let lit: LitStr = meta.value()?.parse()?;
            pairs.push(((*key).to_string(), lit));
            Ok(())
        })?;
    }
    Ok(pairs)
}

fn path_is(path: &syn::Path, module: &str, ident: &str) -> bool {
    match path.segments.len() {
        1 => path.segments[0].ident == ident,
        3 => {
            (path.segments[0].ident == "std" || path.segments[0].ident == "core")
                && path.segments[1].ident == module
                && path.segments[2].ident == ident
        }
        _ => false,
    }
}

pub fn inner_of_option(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { path, .. }) = ty else {
        return None;
    };
    if !path_is(path, "option", "Option") {
        return None;
    }
    if let Some(seg) = path.segments.last()
        && let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
            &seg.arguments
        && let Some(GenericArgument::Type(t)) = args.first()
    {
        return Some(t);
    }
    None
}

pub fn is_phantom_data(ty: &Type) -> bool {
    let Type::Path(TypePath { path, .. }) = ty else {
        return false;
    };
    path_is(path, "marker", "PhantomData")
        && path
            .segments
            .last()
            .is_some_and(|seg| matches!(seg.arguments, PathArguments::AngleBracketed(_)))
}

/// Builds the expression that turns `raw: String` into the field value.
/// `Option<T>` fields parse as `T` and are stored as `Some`.
pub fn build_cli_parse_expr(ty: &Type, parse_with: Option<&Path>) -> proc_macro2::TokenStream {
    let (target, wrap_some) = match inner_of_option(ty) {
        Some(inner) => (inner, true),
        None => (ty, false),
    };
    let parsed = if let Some(parse_with) = parse_with {
        quote! { #parse_with(&raw)? }
    } else {
        quote! {
            raw.parse::<#target>()
                .map_err(|e| crate::Error::invalid_input(format!(
                    "Invalid value for --{name}: {raw} ({e})"
                )))?
        }
    };
    if wrap_some {
        quote! { Some(#parsed) }
    } else {
        parsed
    }
}

/// Placeholder shown in usage output when a field has no explicit `value` hint.
pub fn default_value_hint(ty: &Type) -> String {
    let ty = inner_of_option(ty).unwrap_or(ty);
    if let Type::Path(TypePath { path, .. }) = ty
        && let Some(seg) = path.segments.last()
    {
        let ident = seg.ident.to_string();
        return match ident.as_str() {
            "String" | "PathBuf" => "<path>".to_string(),
            other => format!("<{}>", to_kebab_case(other)),
        };
    }
    "<value>".to_string()
}

pub fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (idx, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if idx != 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::{default_value_hint, inner_of_option, is_phantom_data, str_attr_pairs, to_kebab_case};

    #[test]
    fn inner_of_option_supports_short_std_and_core_paths() {
        let short_ty: syn::Type = parse_quote!(Option<String>);
        let std_ty: syn::Type = parse_quote!(std::option::Option<u8>);
        let core_ty: syn::Type = parse_quote!(core::option::Option<bool>);
        let non_opt: syn::Type = parse_quote!(Vec<String>);

        let short_inner = inner_of_option(&short_ty).expect("expected Option inner type");
        let std_inner = inner_of_option(&std_ty).expect("expected std Option inner type");
        let core_inner = inner_of_option(&core_ty).expect("expected core Option inner type");

        assert_eq!(quote::quote!(#short_inner).to_string(), "String");
        assert_eq!(quote::quote!(#std_inner).to_string(), "u8");
        assert_eq!(quote::quote!(#core_inner).to_string(), "bool");
        assert!(inner_of_option(&non_opt).is_none());
    }

    #[test]
    fn is_phantom_data_requires_generic_argument() {
        let short_ty: syn::Type = parse_quote!(PhantomData<u8>);
        let std_ty: syn::Type = parse_quote!(std::marker::PhantomData<String>);
        let missing_generic: syn::Type = parse_quote!(PhantomData);
        let non_phantom: syn::Type = parse_quote!(Option<u8>);

        assert!(is_phantom_data(&short_ty));
        assert!(is_phantom_data(&std_ty));
        assert!(!is_phantom_data(&missing_generic));
        assert!(!is_phantom_data(&non_phantom));
    }

    #[test]
    fn default_value_hint_unwraps_options_and_kebabs_type_names() {
        let float_ty: syn::Type = parse_quote!(f64);
        let coord_ty: syn::Type = parse_quote!(Option<crate::Coordinate>);
        let mode_ty: syn::Type = parse_quote!(DistanceUnit);
        let path_ty: syn::Type = parse_quote!(String);

        assert_eq!(default_value_hint(&float_ty), "<f64>");
        assert_eq!(default_value_hint(&coord_ty), "<coordinate>");
        assert_eq!(default_value_hint(&mode_ty), "<distance-unit>");
        assert_eq!(default_value_hint(&path_ty), "<path>");
    }

    #[test]
    fn str_attr_pairs_collects_known_keys_and_rejects_others() {
        let field: syn::Field = parse_quote! {
            #[cli(long = "max-iterations", value = "<usize>")]
            pub max_iterations: usize
        };
        let pairs = str_attr_pairs(&field.attrs, "cli", &["long", "value"]).expect("pairs");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "long");
        assert_eq!(pairs[0].1.value(), "max-iterations");

        let bad: syn::Field = parse_quote! {
            #[cli(short = "m")]
            pub max_iterations: usize
        };
        let err = str_attr_pairs(&bad.attrs, "cli", &["long"]).expect_err("unknown key");
        assert!(err.to_string().contains("unsupported cli attribute"));
    }

    #[test]
    fn to_kebab_case_inserts_dashes_before_ascii_uppercase() {
        assert_eq!(to_kebab_case("NelderMead"), "nelder-mead");
        assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
        assert_eq!(to_kebab_case("X"), "x");
    }
}
