extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{
    self, parse_quote, punctuated::Punctuated, token::Comma, Data, DeriveInput, Field, Fields,
    Ident, LitStr, Type, TypePath, Variant,
};

/// Turns an enum of svg tags into one attribute struct per tag.
///
/// Every unnamed field of a variant names the type of one attribute. The
/// generated struct `attributes::<Variant>` holds an `Option` of each, and a
/// `from_attributes` constructor that looks every attribute up by name and
/// parses it through `AttributeValue`, which must be in scope at the use site
/// together with `SvgError`.
///
/// Field names are the snake_case of the type name, attribute names its
/// kebab-case. `#[name("...")]` overrides the field name, `#[attr("...")]` the
/// attribute name.
#[proc_macro_attribute]
pub fn svg_tag(_attributes: TokenStream, items: TokenStream) -> TokenStream {
    let mut ast: DeriveInput = match syn::parse(items) {
        Ok(ast) => ast,
        Err(e) => return e.to_compile_error().into(),
    };

    match impl_svg_tag(&mut ast) {
        Err(e) => e.to_compile_error().into(),
        Ok(r) => r,
    }
}

fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, c) in input.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn snake_case(input: &str) -> String {
    split_words(input).join("_")
}

fn kebab_case(input: &str) -> String {
    split_words(input).join("-")
}

///Removes the `#[<attr_name>("...")]` helper attribute from a field and returns its argument.
fn consume_string_attr(field: &mut Field, attr_name: &str) -> syn::Result<Option<LitStr>> {
    let position = match field
        .attrs
        .iter()
        .position(|attr| attr.path.is_ident(attr_name))
    {
        Some(p) => p,
        None => return Ok(None),
    };

    let attr = field.attrs.remove(position);
    attr.parse_args::<LitStr>().map(Some)
}

struct AttributeField {
    field_name: Ident,
    attribute_name: String,
    type_path: TypePath,
}

fn parse_field(field: &mut Field) -> syn::Result<AttributeField> {
    let explicit_name = consume_string_attr(field, "name")?;
    let explicit_attr = consume_string_attr(field, "attr")?;

    let type_path = match &field.ty {
        Type::Path(tp) => tp.clone(),
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "svg_tag fields must be plain type paths",
            ))
        }
    };

    let type_ident = match type_path.path.segments.last() {
        Some(segment) => segment.ident.to_string(),
        None => return Err(syn::Error::new_spanned(&type_path, "empty type path")),
    };

    let field_name = match explicit_name {
        Some(name) => Ident::new(&name.value(), name.span()),
        None => Ident::new(&snake_case(&type_ident), Span::call_site()),
    };
    let attribute_name = explicit_attr
        .map(|lit| lit.value())
        .unwrap_or_else(|| kebab_case(&type_ident));

    Ok(AttributeField {
        field_name,
        attribute_name,
        type_path,
    })
}

///Generates the attribute struct for one variant and the variant that wraps it.
fn parse_variant(
    mod_name: &Ident,
    variant: &Variant,
    tag_def: &DeriveInput,
) -> syn::Result<(Option<proc_macro2::TokenStream>, Variant)> {
    let mut new_variant = variant.clone();

    let mut fields = match variant.fields.clone() {
        Fields::Unnamed(fs) => fs.unnamed,
        Fields::Unit => return Ok((None, new_variant)),
        Fields::Named(fs) => {
            return Err(syn::Error::new_spanned(
                fs,
                "svg_tag variants must use unnamed fields",
            ))
        }
    };

    let mut parsed = Vec::new();
    for field in fields.iter_mut() {
        parsed.push(parse_field(field)?);
    }

    let type_name = format_ident!("{}", variant.ident);
    let field_names: Vec<_> = parsed.iter().map(|f| &f.field_name).collect();
    let type_paths: Vec<_> = parsed.iter().map(|f| &f.type_path).collect();
    let attribute_names: Vec<_> = parsed.iter().map(|f| f.attribute_name.as_str()).collect();

    let tag_attrs = &tag_def.attrs;
    let variant_attrs = &variant.attrs;

    let attribute_type = quote! {
        #(#tag_attrs)*
        #(#variant_attrs)*
        #[derive(Default)]
        pub struct #type_name {
            #(pub #field_names : Option<#type_paths>),*
        }

        impl #type_name {
            pub const ATTRIBUTE_NAMES: &'static [&'static str] = &[#(#attribute_names),*];

            pub fn new() -> Self {
                Self::default()
            }

            pub fn from_attributes<'a, F>(lookup: F, diagnostics: &mut Vec<SvgError>) -> Self
            where
                F: Fn(&str) -> Option<&'a str>,
            {
                let mut result = Self::new();
                #(
                    {
                        let name = #attribute_names;
                        if let Some(raw) = lookup(name) {
                            match <#type_paths as AttributeValue>::parse_attribute(name, raw) {
                                Ok(value) => result.#field_names = Some(value),
                                Err(error) => diagnostics.push(error),
                            }
                        }
                    }
                )*
                result
            }
        }
    };

    new_variant.attrs = Vec::new();
    new_variant.fields = Fields::Unnamed(parse_quote!((#mod_name::#type_name)));

    Ok((Some(attribute_type), new_variant))
}

fn impl_svg_tag(tag: &mut DeriveInput) -> syn::Result<TokenStream> {
    if !tag.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &tag.generics,
            "svg_tag does not support generic tag enums",
        ));
    }

    let data_enum = match &tag.data {
        Data::Enum(data_enum) => data_enum,
        _ => return Err(syn::Error::new(Span::call_site(), "Must be defined with an enum.")),
    };

    let mod_name = Ident::new("attributes", Span::call_site());

    let mut attribute_types = Vec::new();
    let mut new_variants: Punctuated<Variant, Comma> = Punctuated::new();
    for variant in data_enum.variants.iter() {
        let (attribute_type, new_variant) = parse_variant(&mod_name, variant, tag)?;
        attribute_types.extend(attribute_type);
        new_variants.push(new_variant);
    }

    if let Data::Enum(de) = &mut tag.data {
        de.variants = new_variants;
    }

    let result = quote! {
        pub mod #mod_name {
            use super::*;

            #(
                #attribute_types
            )*
        }

        #tag
    };

    Ok(result.into())
}
