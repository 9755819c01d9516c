//! Field name resolution
//!
//! A [`NameResolver`] decides the name a field contributes to error paths.
//! The default uses the declared Rust name; resolvers can read another tag
//! (e.g. `json`) and be chained or post-processed.

use std::fmt;
use std::sync::Arc;

use crate::record::FieldDecl;

/// Strategy mapping a field declaration to its external name.
#[derive(Clone)]
pub struct NameResolver(Arc<dyn Fn(&FieldDecl) -> String + Send + Sync>);

impl NameResolver {
    pub fn new(resolve: impl Fn(&FieldDecl) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(resolve))
    }

    /// The field's declared name.
    #[must_use]
    pub fn declared() -> Self {
        Self::new(|field| field.name().to_owned())
    }

    /// First comma-separated part of the annotation under `tag`, or empty.
    pub fn from_tag(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(move |field| {
            field
                .tag(&tag)
                .and_then(|value| value.split(',').next())
                .unwrap_or_default()
                .trim()
                .to_owned()
        })
    }

    /// First non-empty name among `resolvers`, falling back to the declared
    /// name.
    pub fn fallback(resolvers: impl IntoIterator<Item = Self>) -> Self {
        let resolvers: Vec<Self> = resolvers.into_iter().collect();
        Self::new(move |field| {
            resolvers
                .iter()
                .map(|resolver| resolver.resolve(field))
                .find(|name| !name.is_empty())
                .unwrap_or_else(|| field.name().to_owned())
        })
    }

    /// Converts the output of `inner` to `snake_case`.
    #[must_use]
    pub fn snake_case(inner: Self) -> Self {
        Self::new(move |field| to_snake_case(&inner.resolve(field)))
    }

    /// `json` tag name, or the declared name.
    #[must_use]
    pub fn json() -> Self {
        Self::fallback([Self::from_tag("json")])
    }

    /// [`NameResolver::json`] converted to `snake_case`.
    #[must_use]
    pub fn json_snake_case() -> Self {
        Self::snake_case(Self::json())
    }

    #[must_use]
    pub fn resolve(&self, field: &FieldDecl) -> String {
        (self.0)(field)
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::declared()
    }
}

impl fmt::Debug for NameResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NameResolver(..)")
    }
}

/// `UserID` -> `user_id`, `HTTPServer` -> `http_server`.
///
/// An underscore goes before an upper-case letter or digit that starts a
/// word: one followed by a lower-case letter or preceded by one.
#[must_use]
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 && (ch.is_uppercase() || ch.is_numeric()) {
            let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let prev_lower = chars[i - 1].is_lowercase();
            if next_lower || prev_lower {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }

    out
}
