//! Proc macros for Sift.
//!
//! # Derive Macros
//!
//! - [`Searchable`] - Describe a struct (or a payload-carrying enum) to the
//!   query engine
//! - [`SearchEnum`] - Make a fieldless enum searchable by variant name
//!
//! The generated code refers to the `sift` crate by absolute path; use the
//! re-exports `sift::Searchable` and `sift::SearchEnum` rather than depending
//! on this crate directly.

mod search;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `sift::Inspect` (and `sift::Record` for structs).
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `label = "..."` | Expose the field to queries under this label |
/// | `rename = "..."` | Wire name of the field (default: field name) |
/// | `skip` | Leave the field out entirely |
///
/// Unlabeled fields are still walked: labels on nested structs, list
/// elements, map entries and enum payloads are reachable through them.
/// Every field type must implement `sift::Inspect`.
///
/// # Enums
///
/// On an enum, each variant must be a unit variant or hold a single unnamed
/// field. Variants are named in snake_case unless renamed with
/// `#[search(rename = "...")]`. Labels inside a payload struct are found only
/// while that variant is active.
///
/// # Example
///
/// ```ignore
/// use sift::{PredicateFactory, Searchable};
///
/// #[derive(Searchable)]
/// struct Volume {
///     #[search(label = "Volume Path")]
///     path: String,
/// }
///
/// #[derive(Searchable)]
/// enum Source {
///     Empty,
///     Volume(Box<Volume>),
/// }
///
/// #[derive(Searchable)]
/// struct Task {
///     #[search(label = "Task")]
///     name: String,
///
///     #[search(label = "Priority")]
///     priority: u8,
///
///     source: Source,
///
///     #[search(skip)]
///     internal_id: u64,
/// }
///
/// let predicate = PredicateFactory::<Task>::new()
///     .compile_raw("Priority:>=3+Volume Path:/srv/*")
///     .unwrap();
/// ```
#[proc_macro_derive(Searchable, attributes(search))]
pub fn searchable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    search::searchable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `sift::SearchEnum` and `sift::Inspect` for a fieldless enum.
///
/// Variants are matched by name, case-insensitively; `<` and `>` compare
/// discriminants. Rename a variant's searchable name with
/// `#[search(rename = "...")]`.
///
/// # Example
///
/// ```ignore
/// use sift::SearchEnum;
///
/// #[derive(SearchEnum)]
/// enum Severity {
///     Low = 1,
///     Medium = 2,
///     #[search(rename = "CRITICAL")]
///     High = 3,
/// }
/// ```
#[proc_macro_derive(SearchEnum, attributes(search))]
pub fn search_enum_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    search::search_enum_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
