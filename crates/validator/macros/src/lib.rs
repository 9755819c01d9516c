//! # fieldguard-macros
//!
//! `#[derive(Record)]` for [fieldguard](https://docs.rs/fieldguard). Use it
//! through the `fieldguard` crate (feature `derive`, on by default) rather
//! than depending on this crate directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod record;
mod support;

/// Derive macro for the `Record` and `Inspect` traits.
///
/// Generates the field descriptor table and positional field access for a
/// struct with named fields. Only `pub` fields are part of the record;
/// private fields are ignored unless embedded.
///
/// # Attributes
///
/// ## Container attributes (`#[record(...)]` on the struct)
///
/// - `validatable` - Wires the struct's `Validatable` impl in as the
///   record-level check
///
/// ## Field attributes
///
/// - `#[validate("...")]` - Constraint annotation under the `validate` tag
/// - `#[tag(key = "...", ...)]` - Annotations under arbitrary tags, e.g.
///   `json` for name resolution or an alternative constraint tag
/// - `#[record(embed)]` - Promotes the fields of a nested record into this one
/// - `#[record(skip)]` - Leaves the field out entirely
///
/// # Example
///
/// ```ignore
/// #[derive(Record)]
/// #[record(validatable)]
/// pub struct Signup {
///     #[validate("required, email")]
///     #[tag(json = "emailAddress")]
///     pub email: String,
///
///     #[validate("between(8, 64)")]
///     pub password: String,
///
///     #[record(embed)]
///     pub meta: RequestMeta,
/// }
/// ```
#[proc_macro_derive(Record, attributes(validate, tag, record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive(input)
}
