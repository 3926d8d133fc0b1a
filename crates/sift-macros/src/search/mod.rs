//! Implementation of the `#[derive(Searchable)]` and `#[derive(SearchEnum)]`
//! macros.
//!
//! These derives describe a type to the sift query engine: which fields
//! exist, which of them carry a search label, and how to reach them at
//! runtime.

mod attrs;
mod derive;

pub use derive::{search_enum_derive_impl, searchable_derive_impl};
