//! Implementation of the `#[derive(Searchable)]` and `#[derive(SearchEnum)]`
//! macros.
//!
//! `Searchable` on a struct generates `sift::Record` and `sift::Inspect`; on
//! an enum whose variants are unit or single-field tuples it generates
//! `sift::Inspect` describing a variant set. `SearchEnum` on a fieldless enum
//! generates `sift::SearchEnum` and an `Inspect` impl producing enum leaves.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse_quote, spanned::Spanned, Data, DataEnum, DeriveInput, Error, Fields, FieldsNamed,
    Generics, Result,
};

use super::attrs::parse_search_attrs;

/// Main implementation of the Searchable derive macro.
pub fn searchable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => record_impl(&input, named),
            _ => Err(Error::new(
                input.span(),
                "Searchable can only be derived for structs with named fields",
            )),
        },
        Data::Enum(data) => variant_impl(&input, data),
        Data::Union(_) => Err(Error::new(
            input.span(),
            "Searchable can only be derived for structs and enums",
        )),
    }
}

/// Main implementation of the SearchEnum derive macro.
pub fn search_enum_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let enum_name = &input.ident;
    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(Error::new(
                input.span(),
                "SearchEnum can only be derived for enums",
            ))
        }
    };
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "SearchEnum cannot be derived for generic enums",
        ));
    }

    let mut table = Vec::new();
    let mut name_arms = Vec::new();
    let mut discriminant_arms = Vec::new();

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new(
                variant.span(),
                "SearchEnum variants cannot carry data; derive Searchable instead",
            ));
        }
        let attrs = parse_search_attrs(&variant.attrs)?;
        attrs.rename_only("SearchEnum variants")?;

        let ident = &variant.ident;
        let name = attrs.rename.unwrap_or_else(|| ident.to_string());

        table.push(quote! { (#name, #enum_name::#ident as i64) });
        name_arms.push(quote! { #enum_name::#ident => #name, });
        discriminant_arms.push(quote! { #enum_name::#ident => #enum_name::#ident as i64, });
    }

    if data.variants.is_empty() {
        return Err(Error::new(
            input.span(),
            "SearchEnum cannot be derived for enums without variants",
        ));
    }

    Ok(quote! {
        impl ::sift::SearchEnum for #enum_name {
            const VARIANTS: &'static [(&'static str, i64)] = &[#(#table),*];

            fn variant_name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }

            fn discriminant(&self) -> i64 {
                match self {
                    #(#discriminant_arms)*
                }
            }
        }

        impl ::sift::Inspect for #enum_name {
            fn shape() -> ::sift::Shape {
                ::sift::Shape::Leaf(::sift::LeafKind::Enum(
                    <Self as ::sift::SearchEnum>::VARIANTS,
                ))
            }

            fn node(&self) -> ::sift::Node<'_> {
                ::sift::enum_node(self)
            }
        }
    })
}

fn record_impl(input: &DeriveInput, fields: &FieldsNamed) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let generics = with_inspect_bounds(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut field_arms: Vec<TokenStream> = Vec::new();
    let mut field_shapes: Vec<TokenStream> = Vec::new();

    for field in fields.named.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_search_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        // Raw identifiers keep their prefix out of the wire name.
        let wire_name = attrs.rename.unwrap_or_else(|| {
            let name = field_name.to_string();
            name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
        });
        let label = match &attrs.label {
            Some(label) => quote! { ::core::option::Option::Some(#label) },
            None => quote! { ::core::option::Option::None },
        };
        let ty = &field.ty;

        field_arms.push(quote! {
            #wire_name => ::sift::Inspect::node(&self.#field_name),
        });
        field_shapes.push(quote! {
            ::sift::FieldShape {
                name: #wire_name,
                label: #label,
                shape: <#ty as ::sift::Inspect>::shape(),
            }
        });
    }

    Ok(quote! {
        impl #impl_generics ::sift::Record for #struct_name #ty_generics #where_clause {
            fn field(&self, name: &str) -> ::sift::Node<'_> {
                match name {
                    #(#field_arms)*
                    _ => ::sift::Node::Absent,
                }
            }
        }

        impl #impl_generics ::sift::Inspect for #struct_name #ty_generics #where_clause {
            fn shape() -> ::sift::Shape {
                ::sift::Shape::Record(::sift::RecordShape {
                    type_name: ::core::any::type_name::<Self>(),
                    fields: || ::std::vec![#(#field_shapes),*],
                })
            }

            fn node(&self) -> ::sift::Node<'_> {
                ::sift::Node::Record(self)
            }
        }
    })
}

fn variant_impl(input: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let enum_name = &input.ident;
    let generics = with_inspect_bounds(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    if data.variants.is_empty() {
        return Err(Error::new(
            input.span(),
            "Searchable cannot be derived for enums without variants",
        ));
    }

    let mut variant_shapes: Vec<TokenStream> = Vec::new();
    let mut node_arms: Vec<TokenStream> = Vec::new();

    for variant in &data.variants {
        let attrs = parse_search_attrs(&variant.attrs)?;
        attrs.rename_only("enum variants")?;

        let ident = &variant.ident;
        let name = attrs
            .rename
            .unwrap_or_else(|| to_snake_case(&ident.to_string()));

        match &variant.fields {
            Fields::Unit => {
                variant_shapes.push(quote! {
                    ::sift::VariantShape { name: #name, payload: ::core::option::Option::None }
                });
                node_arms.push(quote! {
                    Self::#ident => ::sift::Node::Variant {
                        name: #name,
                        payload: ::core::option::Option::None,
                    },
                });
            }
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                let ty = &unnamed.unnamed[0].ty;
                variant_shapes.push(quote! {
                    ::sift::VariantShape {
                        name: #name,
                        payload: ::core::option::Option::Some(<#ty as ::sift::Inspect>::shape()),
                    }
                });
                node_arms.push(quote! {
                    Self::#ident(payload) => ::sift::Node::Variant {
                        name: #name,
                        payload: ::core::option::Option::Some(::std::boxed::Box::new(
                            ::sift::Inspect::node(payload),
                        )),
                    },
                });
            }
            _ => {
                return Err(Error::new(
                    variant.span(),
                    "Searchable enum variants must be unit or hold exactly one unnamed field",
                ))
            }
        }
    }

    Ok(quote! {
        impl #impl_generics ::sift::Inspect for #enum_name #ty_generics #where_clause {
            fn shape() -> ::sift::Shape {
                ::sift::Shape::Variant(::sift::VariantSetShape {
                    type_name: ::core::any::type_name::<Self>(),
                    variants: || ::std::vec![#(#variant_shapes),*],
                })
            }

            fn node(&self) -> ::sift::Node<'_> {
                match self {
                    #(#node_arms)*
                }
            }
        }
    })
}

/// Adds `T: sift::Inspect` for every type parameter.
fn with_inspect_bounds(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<_> = generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    let where_clause = generics.make_where_clause();
    for ident in params {
        where_clause
            .predicates
            .push(parse_quote! { #ident: ::sift::Inspect });
    }
    generics
}

/// Convert a CamelCase identifier to snake_case.
fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_was_lower = false;
        } else if c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c);
            prev_was_lower = c != '_';
        }
    }

    result
}
