//! Derive macros for matrixcase.
//!
//! - `EnumValues`: implements `matrixcase_core::EnumValues` for a unit-only enum, so its members can feed an
//!   enumeration-derived value provider in declaration order.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Implements `EnumValues` for a unit-only enum.
///
/// This derive generates:
/// - `type_name() -> &'static str`: the enum's identifier
/// - `member_names() -> &'static [&'static str]`: variant identifiers in declaration order
/// - `member_name(&self) -> &'static str`: the identifier of this variant
///
/// # Example
/// ```ignore
/// #[derive(EnumValues)]
/// enum Color {
///     Red,
///     Green,
/// }
///
/// // Color::member_names() == &["Red", "Green"]
/// // Color::Green.to_value() renders as `Color.Green`
/// ```
#[proc_macro_derive(EnumValues)]
pub fn derive_enum_values(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_enum_values(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_enum_values(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = LitStr::new(&name.to_string(), name.span());

    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "EnumValues can only be derived for enums",
            ));
        }
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "EnumValues requires unit variants (no fields)",
            ));
        }
        variants.push(&variant.ident);
    }

    let member_strs: Vec<LitStr> = variants
        .iter()
        .map(|v| LitStr::new(&v.to_string(), v.span()))
        .collect();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::matrixcase_core::EnumValues for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #name_str
            }

            fn member_names() -> &'static [&'static str] {
                &[#(#member_strs),*]
            }

            fn member_name(&self) -> &'static str {
                match *self {
                    #(Self::#variants => #member_strs,)*
                }
            }
        }
    })
}
