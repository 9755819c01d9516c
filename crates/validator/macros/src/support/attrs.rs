use syn::{
    Attribute, Ident, Lit, LitStr, Meta, Result, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

use crate::support::diag;

/// Parsed attribute arguments container.
#[derive(Debug, Clone)]
pub struct AttrArgs {
    pub items: Vec<AttrItem>,
}

/// A single attribute item.
#[derive(Debug, Clone)]
pub enum AttrItem {
    /// A flag like `embed` or `skip`
    Flag(Ident),
    /// Key-value pair like `json = "name"`
    KeyValue { key: Ident, value: Lit },
}

impl AttrArgs {
    /// Check if a flag is present.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, AttrItem::Flag(f) if f == flag))
    }

    /// Reject any flag outside `allowed`.
    pub fn expect_flags(&self, attr: &str, allowed: &[&str]) -> Result<()> {
        for item in &self.items {
            match item {
                AttrItem::Flag(flag) if allowed.iter().any(|name| flag == name) => {}
                AttrItem::Flag(flag) => {
                    return Err(diag::error_spanned(
                        flag,
                        format!("unknown `#[{attr}]` option `{flag}`"),
                    ));
                }
                AttrItem::KeyValue { key, .. } => {
                    return Err(diag::error_spanned(
                        key,
                        format!("`#[{attr}]` takes flags only"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// All key-value pairs, requiring string values.
    pub fn string_pairs(&self) -> Result<Vec<(String, LitStr)>> {
        self.items
            .iter()
            .map(|item| match item {
                AttrItem::KeyValue {
                    key,
                    value: Lit::Str(value),
                } => Ok((key.to_string(), value.clone())),
                AttrItem::KeyValue { value, .. } => {
                    Err(diag::error_spanned(value, "expected a string literal"))
                }
                AttrItem::Flag(flag) => Err(diag::error_spanned(
                    flag,
                    format!("expected `{flag} = \"...\"`"),
                )),
            })
            .collect()
    }
}

/// Parse attribute like `#[record(...)]` (the whole Attribute, not only args).
pub fn parse_attr(attr: &Attribute, expected: &str) -> Result<Option<AttrArgs>> {
    if !attr.path().is_ident(expected) {
        return Ok(None);
    }

    match &attr.meta {
        Meta::Path(_) => Ok(Some(AttrArgs { items: vec![] })),
        Meta::List(list) => {
            let args = syn::parse2::<AttrArgsParser>(list.tokens.clone())?;
            Ok(Some(args.0))
        }
        Meta::NameValue(nv) => Err(diag::error_spanned(
            nv,
            format!("#[{expected}] must be #[{expected}(...)] (not name-value)"),
        )),
    }
}

/// Parse all attributes of a given type and merge them.
pub fn parse_attrs(attrs: &[Attribute], name: &str) -> Result<AttrArgs> {
    let mut result = AttrArgs { items: vec![] };

    for attr in attrs {
        if let Some(args) = parse_attr(attr, name)? {
            result.items.extend(args.items);
        }
    }

    Ok(result)
}

/// The annotation of `#[validate("...")]`, if present.
///
/// Repeating the attribute is an error.
pub fn parse_annotation(attrs: &[Attribute], name: &str) -> Result<Option<LitStr>> {
    let mut found: Option<LitStr> = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident(name)) {
        let annotation: LitStr = attr.parse_args().map_err(|_| {
            diag::error_spanned(attr, format!("expected #[{name}(\"...\")]"))
        })?;
        if found.is_some() {
            return Err(diag::error_spanned(
                attr,
                format!("duplicate #[{name}] attribute"),
            ));
        }
        found = Some(annotation);
    }

    Ok(found)
}

struct AttrArgsParser(AttrArgs);

impl Parse for AttrArgsParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let items = Punctuated::<AttrItemParser, Token![,]>::parse_terminated(input)?
            .into_iter()
            .map(|x| x.0)
            .collect();
        Ok(Self(AttrArgs { items }))
    }
}

struct AttrItemParser(AttrItem);

impl Parse for AttrItemParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;

        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            let value: Lit = input.parse()?;
            return Ok(Self(AttrItem::KeyValue { key, value }));
        }

        Ok(Self(AttrItem::Flag(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use syn::parse_quote;

    #[test]
    fn parses_flags_and_pairs() {
        let tokens = quote!(json = "displayName", embed);
        let parsed: AttrArgsParser = syn::parse2(tokens).unwrap();

        assert_eq!(parsed.0.items.len(), 2);
        assert!(parsed.0.has_flag("embed"));
        assert!(!parsed.0.has_flag("skip"));
        assert!(parsed.0.expect_flags("record", &["embed"]).is_err());
    }

    #[test]
    fn string_pairs_require_strings() {
        let parsed: AttrArgsParser = syn::parse2(quote!(json = "id", xml = "ID")).unwrap();
        let pairs = parsed.0.string_pairs().unwrap();
        let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["json", "xml"]);

        let parsed: AttrArgsParser = syn::parse2(quote!(json = 3)).unwrap();
        assert!(parsed.0.string_pairs().is_err());
    }

    #[test]
    fn annotation_is_single_string() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[validate("required, min(1)")])];
        let annotation = parse_annotation(&attrs, "validate").unwrap().unwrap();
        assert_eq!(annotation.value(), "required, min(1)");

        let twice: Vec<Attribute> = vec![
            parse_quote!(#[validate("required")]),
            parse_quote!(#[validate("min(1)")]),
        ];
        assert!(parse_annotation(&twice, "validate").is_err());

        let bare: Vec<Attribute> = vec![parse_quote!(#[validate(required)])];
        assert!(parse_annotation(&bare, "validate").is_err());
    }
}
