use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use proc_macro::TokenStream;

/// Derives `crate::wire::WriteLe` for a struct by writing each field in
/// declaration order. Every field type must itself implement `WriteLe`.
#[proc_macro_derive(WriteLe)]
pub fn derive_write_le(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let fields: Vec<syn::Member> = match input.data {
        Data::Struct(ref s) => match s.fields {
            Fields::Named(ref nf) => nf
                .named
                .iter()
                .map(|f| f.ident.clone().unwrap().into())
                .collect(),
            Fields::Unnamed(ref uf) => uf
                .unnamed
                .iter()
                .enumerate()
                .map(|(i, _)| syn::Index::from(i).into())
                .collect(),
            Fields::Unit => Vec::new(),
        },
        _ => unreachable!("WriteLe can only be derived for structs"),
    };

    let expanded = quote! {
        impl crate::wire::WriteLe for #name {
            fn write_le(&self, dst: &mut Vec<u8>) {
                #( crate::wire::WriteLe::write_le(&self.#fields, dst); )*
            }
        }
    };

    TokenStream::from(expanded)
}
