// File: rusty-formutils-derive/src/form.rs
// Purpose: Form derive macro and #[form(...)] attribute processing

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type};

/// Options collected from a field's `#[form(...)]` attributes
#[derive(Default)]
struct FieldOptions {
    key: Option<LitStr>,
    validate: Option<LitStr>,
    skip: bool,
}

/// A field that takes part in decoding and validation
struct FormField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    key: String,
    rules: String,
}

/// Parse `#[form(key = "...", validate = "...", skip)]` from a field
fn extract_form_options(attrs: &[syn::Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                let key: LitStr = meta.value()?.parse()?;
                if key.value().trim().is_empty() {
                    return Err(syn::Error::new_spanned(&key, "form key must not be empty"));
                }
                options.key = Some(key);
                Ok(())
            } else if meta.path.is_ident("validate") {
                options.validate = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `key = \"...\"`, `validate = \"...\"` or `skip`"))
            }
        })?;
    }

    Ok(options)
}

fn collect_fields(input: &DeriveInput) -> syn::Result<Vec<FormField<'_>>> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Form only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Form only supports structs",
            ))
        }
    };

    let mut fields = Vec::new();
    for field in named {
        let options = extract_form_options(&field.attrs)?;
        if options.skip {
            continue;
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let name = ident.to_string();
        let name = name.trim_start_matches("r#").to_string();

        fields.push(FormField {
            ident,
            ty: &field.ty,
            key: options.key.map(|key| key.value()).unwrap_or(name),
            rules: options
                .validate
                .map(|rules| rules.value())
                .unwrap_or_default(),
        });
    }

    Ok(fields)
}

pub fn impl_form(input: &DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Form cannot be derived for generic structs",
        ));
    }

    let name = &input.ident;
    let fields = collect_fields(input)?;

    let descriptors = fields.iter().map(|field| {
        let ident = field.ident.to_string();
        let ident = ident.trim_start_matches("r#");
        let key = &field.key;
        let rules = &field.rules;
        let ty = field.ty;
        quote! {
            ::rusty_formutils::RawField::new(
                #ident,
                #key,
                #rules,
                <#ty as ::rusty_formutils::FormValue>::TYPE_NAME,
                <#ty as ::rusty_formutils::FormValue>::ARITY,
            )
        }
    });

    let decode_arms = fields.iter().enumerate().map(|(index, field)| {
        let ident = field.ident;
        let ty = field.ty;
        quote! {
            #index => {
                if let ::std::option::Option::Some(value) =
                    <#ty as ::rusty_formutils::FormValue>::decode(values)
                        .map_err(|_| ::rusty_formutils::DecodeFault::Mismatch)?
                {
                    self.#ident = value;
                }
                ::std::result::Result::Ok(())
            }
        }
    });

    let inspect_arms = fields.iter().enumerate().map(|(index, field)| {
        let ident = field.ident;
        let ty = field.ty;
        quote! {
            #index => ::std::option::Option::Some(
                <#ty as ::rusty_formutils::FormValue>::inspect(&self.#ident)
            ),
        }
    });

    Ok(quote! {
        impl ::rusty_formutils::Form for #name {
            fn fields() -> &'static [::rusty_formutils::RawField] {
                const FIELDS: &[::rusty_formutils::RawField] = &[#(#descriptors),*];
                FIELDS
            }

            fn schema_cell() -> &'static ::rusty_formutils::SchemaCell {
                static CELL: ::rusty_formutils::SchemaCell = ::rusty_formutils::SchemaCell::new();
                &CELL
            }

            #[allow(unused_variables)]
            fn decode_field(
                &mut self,
                index: usize,
                values: &[::std::string::String],
            ) -> ::std::result::Result<(), ::rusty_formutils::DecodeFault> {
                match index {
                    #(#decode_arms)*
                    _ => ::std::result::Result::Err(::rusty_formutils::DecodeFault::UnknownField(index)),
                }
            }

            fn field_value(
                &self,
                index: usize,
            ) -> ::std::option::Option<::rusty_formutils::FieldValue<'_>> {
                match index {
                    #(#inspect_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}
