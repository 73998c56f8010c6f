/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, Field, Fields, LitStr};
use synstructure::decl_derive;

decl_derive!([ServoPreferences, attributes(pref)] => servo_preferences_derive);

/// The externally visible name of a preference field. Gecko-style preference names contain
/// dots and dashes, so they can be given with `#[pref(name = "dom.vibrator.enabled")]`.
/// Fields without the attribute are known by their identifier.
fn preference_name(field: &Field) -> syn::Result<String> {
    let mut name = None;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("pref")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                return Ok(());
            }
            Err(meta.error("expected `name = \"...\"`"))
        })?;
    }
    match name {
        Some(name) => Ok(name),
        None => field
            .ident
            .as_ref()
            .map(ToString::to_string)
            .ok_or_else(|| syn::Error::new_spanned(field, "preference fields must be named")),
    }
}

/// A derive macro that adds string-based getter and setter for each field of this struct
/// (enums and other types are not supported). Each field must be convertible into a
/// `PrefValue` with `into()` and back with `try_into()`. The deriving module must have
/// `PrefValue` and `PrefError` in scope.
fn servo_preferences_derive(input: synstructure::Structure) -> TokenStream {
    let ast = input.ast();

    let Data::Struct(ref data) = ast.data else {
        return syn::Error::new_spanned(&ast.ident, "ServoPreferences only supports structs")
            .to_compile_error();
    };
    let Fields::Named(ref named_fields) = data.fields else {
        return syn::Error::new_spanned(&ast.ident, "ServoPreferences needs named fields")
            .to_compile_error();
    };

    let mut exists_match_cases = quote!();
    let mut get_match_cases = quote!();
    let mut set_match_cases = quote!();
    let mut type_of_match_cases = quote!();
    let mut comparisons = quote!();
    let mut all_names = quote!();

    for field in named_fields.named.iter() {
        let key = match preference_name(field) {
            Ok(key) => key,
            Err(error) => return error.to_compile_error(),
        };
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;

        exists_match_cases.extend(quote!(#key => true,));
        get_match_cases.extend(quote!(#key => Some(self.#ident.clone().into()),));
        set_match_cases.extend(quote! {
            #key => {
                self.#ident = value.try_into().map_err(|_| PrefError::TypeMismatch {
                    name: name.to_owned(),
                    expected: std::any::type_name::<#ty>(),
                })?;
            },
        });
        type_of_match_cases.extend(quote!(#key => Some(std::any::type_name::<#ty>()),));
        comparisons.extend(quote! {
            if self.#ident != other.#ident {
                changes.push((#key, self.#ident.clone().into()));
            }
        });
        all_names.extend(quote!(#key,));
    }

    let structure_name = &ast.ident;
    quote! {
        impl #structure_name {
            pub fn exists(name: &str) -> bool {
                match name {
                    #exists_match_cases
                    _ => false,
                }
            }

            pub fn get_value(&self, name: &str) -> Option<PrefValue> {
                match name {
                    #get_match_cases
                    _ => None,
                }
            }

            pub fn set_value(&mut self, name: &str, value: PrefValue) -> Result<(), PrefError> {
                match name {
                    #set_match_cases
                    _ => return Err(PrefError::UnknownPreference(name.to_owned())),
                }
                Ok(())
            }

            pub fn type_of(name: &str) -> Option<&'static str> {
                match name {
                    #type_of_match_cases
                    _ => None,
                }
            }

            /// The preferences whose value in `self` differs from `other`, with the value
            /// they have in `self`.
            pub fn diff(&self, other: &Self) -> Vec<(&'static str, PrefValue)> {
                let mut changes = vec![];
                #comparisons
                changes
            }

            pub fn all_prefs() -> &'static [&'static str] {
                &[
                    #all_names
                ]
            }
        }
    }
}
