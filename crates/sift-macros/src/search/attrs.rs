//! Attribute parsing for the search derive macros.
//!
//! Fields, variants and enum variants all accept the same
//! `#[search(...)]` attribute; each derive rejects the keys it has no use
//! for.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, Result, Token,
};

/// Attributes from `#[search(...)]`.
#[derive(Debug, Clone)]
pub struct SearchAttr {
    /// Search label exposed to queries.
    pub label: Option<String>,
    /// Wire name override (default: field name, or the snake_case variant name).
    pub rename: Option<String>,
    /// Leave the field out of the record entirely.
    pub skip: bool,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for SearchAttr {
    fn default() -> Self {
        SearchAttr {
            label: None,
            rename: None,
            skip: false,
            span: Span::call_site(),
        }
    }
}

impl SearchAttr {
    /// Fails unless only `rename` was given.
    pub fn rename_only(&self, what: &str) -> Result<()> {
        if self.label.is_some() || self.skip {
            return Err(Error::new(
                self.span,
                format!("only `rename = \"...\"` is supported on {what}"),
            ));
        }
        Ok(())
    }
}

impl Parse for SearchAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = SearchAttr {
            span: input.span(),
            ..SearchAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,

                // label = "Image Name" or rename = "image"
                Meta::NameValue(nv) => {
                    let value = string_value(&nv.value)?;
                    if nv.path.is_ident("label") {
                        if value.value().trim().is_empty() {
                            return Err(Error::new(value.span(), "label must not be empty"));
                        }
                        attr.label = Some(value.value());
                    } else if nv.path.is_ident("rename") {
                        attr.rename = Some(value.value());
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: label or rename",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown search attribute. Expected: label = \"...\", rename = \"...\", or skip",
                    ));
                }
            }
        }

        if attr.skip && attr.label.is_some() {
            return Err(Error::new(attr.span, "a skipped field cannot have a label"));
        }

        Ok(attr)
    }
}

fn string_value(expr: &Expr) -> Result<&LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(Error::new(other.span(), "expected a string literal")),
    }
}

/// Extract `#[search(...)]` attributes.
pub fn parse_search_attrs(attrs: &[Attribute]) -> Result<SearchAttr> {
    for attr in attrs {
        if attr.path().is_ident("search") {
            return attr.parse_args::<SearchAttr>();
        }
    }
    Ok(SearchAttr::default())
}
