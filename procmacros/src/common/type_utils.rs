//! Shared helpers for inspecting `syn::Type` without stringification.

use syn::{GenericArgument, Path, PathArguments, Type};

fn type_path(ty: &Type) -> Option<&Path> {
    if let Type::Path(type_path) = ty {
        Some(&type_path.path)
    } else {
        None
    }
}

fn first_type_argument(path: &Path) -> Option<&Type> {
    let segment = path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| {
        if let GenericArgument::Type(inner) = arg {
            Some(inner)
        } else {
            None
        }
    })
}

/// Last path segment of a type, e.g. `NaiveDateTime` for `chrono::NaiveDateTime`
pub(crate) fn type_ident(ty: &Type) -> Option<String> {
    if let Type::Reference(reference) = ty {
        return type_ident(&reference.elem);
    }
    type_path(ty)?
        .segments
        .last()
        .map(|seg| seg.ident.to_string())
}

pub(crate) fn option_inner_type(ty: &Type) -> Option<&Type> {
    let path = type_path(ty)?;
    if path.segments.last()?.ident != "Option" {
        return None;
    }
    first_type_argument(path)
}

pub(crate) fn unwrap_option(ty: &Type) -> &Type {
    option_inner_type(ty).unwrap_or(ty)
}

/// `T` in `Ref<T>`
pub(crate) fn reference_target(ty: &Type) -> Option<&Type> {
    let path = type_path(ty)?;
    if path.segments.last()?.ident != "Ref" {
        return None;
    }
    first_type_argument(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use syn::parse_quote;

    #[test]
    fn test_option_inner_type() {
        let option_type: Type = parse_quote!(Option<String>);
        let inner = option_inner_type(&option_type).unwrap();
        assert_eq!(quote!(#inner).to_string(), "String");

        let non_option: Type = parse_quote!(String);
        assert!(option_inner_type(&non_option).is_none());
        let same = unwrap_option(&non_option);
        assert_eq!(quote!(#same).to_string(), "String");
    }

    #[test]
    fn test_type_ident() {
        let ty: Type = parse_quote!(chrono::NaiveDateTime);
        assert_eq!(type_ident(&ty).as_deref(), Some("NaiveDateTime"));

        let ty: Type = parse_quote!(&'static str);
        assert_eq!(type_ident(&ty).as_deref(), Some("str"));

        let ty: Type = parse_quote!((i32, i32));
        assert_eq!(type_ident(&ty), None);
    }

    #[test]
    fn test_reference_target() {
        let ty: Type = parse_quote!(tabula::Ref<Person>);
        let target = reference_target(&ty).unwrap();
        assert_eq!(quote!(#target).to_string(), "Person");

        let ty: Type = parse_quote!(Vec<Person>);
        assert!(reference_target(&ty).is_none());
    }
}
