//! Procedural macros for gic.
//!
//! `#[derive(Injectable)]` turns a struct's fields into constructor
//! parameters, in declaration order:
//!
//! - `Arc<X>` fields declare a parameter of type `X` and receive the shared
//!   pointer, so singletons stay pointer-identical
//! - any other field type `T` declares a parameter of type `T` and receives
//!   a value (`T: Clone`)
//!
//! ```rust,ignore
//! #[derive(Injectable)]
//! struct StereoUnit {
//!     disc: Arc<Disc>,
//!     model: String,
//! }
//! ```
//!
//! `#[injectable(crate = "path")]` points the generated code at another
//! path for the runtime crate (default `::gic`).

use darling::ast::{Data, Style};
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DeriveInput, GenericArgument, PathArguments, Type, parse_macro_input};

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_named, struct_tuple, struct_unit))]
struct InjectableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), InjectableField>,
    #[darling(rename = "crate")]
    krate: Option<syn::Path>,
}

#[derive(FromField)]
struct InjectableField {
    ident: Option<syn::Ident>,
    ty: Type,
}

#[proc_macro_derive(Injectable, attributes(injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match InjectableInput::from_derive_input(&input) {
        Ok(parsed) => expand(parsed).into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: InjectableInput) -> TokenStream2 {
    let krate = input
        .krate
        .map(|path| quote!(#path))
        .unwrap_or_else(|| quote!(::gic));
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Some(fields) = input.data.take_struct() else {
        return syn::Error::new(ident.span(), "Injectable can only be derived for structs")
            .to_compile_error();
    };
    let style = fields.style;
    let fields = fields.fields;

    let args = if fields.is_empty() {
        format_ident!("_args")
    } else {
        format_ident!("args")
    };

    let parameters = fields.iter().map(|field| {
        let declared = shared_inner(&field.ty).unwrap_or(&field.ty);
        quote!(#krate::TypeKey::of::<#declared>())
    });

    let takes: Vec<TokenStream2> = fields
        .iter()
        .map(|field| match shared_inner(&field.ty) {
            Some(inner) => quote!(#args.take_shared::<#inner>()?),
            None => {
                let ty = &field.ty;
                quote!(#args.take_owned::<#ty>()?)
            }
        })
        .collect();

    let body = match style {
        Style::Struct => {
            let names = fields.iter().map(|f| &f.ident);
            quote!(Self { #( #names: #takes ),* })
        }
        Style::Tuple => quote!(Self( #( #takes ),* )),
        Style::Unit => quote!(Self),
    };

    quote! {
        impl #impl_generics #krate::Injectable for #ident #ty_generics #where_clause {
            fn parameters() -> ::std::vec::Vec<#krate::TypeKey> {
                ::std::vec![ #( #parameters ),* ]
            }

            fn construct(#args: &mut #krate::Arguments) -> #krate::Result<Self> {
                ::std::result::Result::Ok(#body)
            }
        }
    }
}

/// `X` for a field typed `Arc<X>` (any path ending in `Arc`).
fn shared_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }

    let segment = path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }

    let PathArguments::AngleBracketed(generics) = &segment.arguments else {
        return None;
    };
    match generics.args.first() {
        Some(GenericArgument::Type(inner)) if generics.args.len() == 1 => Some(inner),
        _ => None,
    }
}
