use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Field, Visibility, parse_macro_input};

use crate::support::{attrs, diag, utils};

/// Tag key written by `#[validate("...")]`.
const VALIDATE_TAG: &str = "validate";

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(ts) => ts.into(),
        Err(e) => diag::to_compile_error(e),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    utils::require_no_generics(input)?;
    let fields = utils::require_named_fields(input)?;

    let struct_name = &input.ident;
    let record_name = struct_name.unraw().to_string();

    let container = attrs::parse_attrs(&input.attrs, "record")?;
    container.expect_flags("record", &["validatable"])?;

    let mut declarations = Vec::new();
    let mut accessors = Vec::new();

    for field in &fields.named {
        let Some(declaration) = field_declaration(field)? else {
            continue;
        };
        let Some(ident) = &field.ident else {
            continue;
        };

        let index = declarations.len();
        accessors.push(quote! {
            #index => ::fieldguard::Inspect::inspect(&self.#ident),
        });
        declarations.push(declaration);
    }

    let validatable = container.has_flag("validatable").then(|| {
        quote! {
            fn validatable(&self) -> ::core::option::Option<&dyn ::fieldguard::Validatable> {
                ::core::option::Option::Some(self)
            }
        }
    });

    Ok(quote! {
        impl ::fieldguard::Record for #struct_name {
            fn describe() -> ::fieldguard::RecordDescriptor {
                ::fieldguard::RecordDescriptor::new(#record_name)
                    #( .with_field(#declarations) )*
            }

            fn field(&self, index: usize) -> ::fieldguard::Value<'_> {
                match index {
                    #( #accessors )*
                    _ => ::fieldguard::Value::Nil,
                }
            }

            #validatable
        }

        impl ::fieldguard::Inspect for #struct_name {
            fn shape() -> ::fieldguard::Shape {
                ::fieldguard::Shape::Record(::fieldguard::RecordType::of::<Self>())
            }

            fn inspect(&self) -> ::fieldguard::Value<'_> {
                ::fieldguard::Value::Record(self)
            }
        }
    })
}

/// `FieldDecl` builder expression for `field`, or `None` when the field is
/// left out of the descriptor.
///
/// Private fields are left out unless embedded: promoted fields of a private
/// embedded record are still visible.
fn field_declaration(field: &Field) -> syn::Result<Option<TokenStream2>> {
    let options = attrs::parse_attrs(&field.attrs, "record")?;
    options.expect_flags("record", &["embed", "skip"])?;

    let public = matches!(field.vis, Visibility::Public(_));
    let embedded = options.has_flag("embed");
    if options.has_flag("skip") || !(public || embedded) {
        return Ok(None);
    }

    let Some(ident) = &field.ident else {
        return Err(diag::error_spanned(field, "expected a named field"));
    };
    let name = ident.unraw().to_string();
    let ty = &field.ty;

    let mut declaration = quote! {
        ::fieldguard::FieldDecl::new(#name, <#ty as ::fieldguard::Inspect>::shape())
    };
    if !public {
        declaration = quote!(#declaration.private());
    }
    if embedded {
        declaration = quote!(#declaration.embedded());
    }

    if let Some(annotation) = attrs::parse_annotation(&field.attrs, VALIDATE_TAG)? {
        declaration = quote!(#declaration.with_tag(#VALIDATE_TAG, #annotation));
    }
    for (key, value) in attrs::parse_attrs(&field.attrs, "tag")?.string_pairs()? {
        declaration = quote!(#declaration.with_tag(#key, #value));
    }

    Ok(Some(declaration))
}
