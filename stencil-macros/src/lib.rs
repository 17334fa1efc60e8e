mod decode_property;
mod decode_table;
mod from_row_trait;

use decode_table::decode_table;
use from_row_trait::from_row_trait;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Implements `stencil::Entity` for a struct with named fields.
///
/// Struct attributes: `#[stencil(name = "table", schema = "schema")]`, the table name
/// defaults to the snake case struct name.
///
/// Field attributes: `#[stencil(name = "column")]`, `#[stencil(key = "identity")]` (one
/// of `assigned`, `guid`, `identity`, `trigger_identity`, a bare `key` is `assigned`),
/// `#[stencil(ignored)]` and `#[stencil(read_only)]`.
///
/// An `assigned` key is generated on insert only while it is NULL or blank text, declare
/// it as `Option<i64>` or `String` to get that. A plain integer field always holds a
/// value, `0` included, and is inserted as is.
#[proc_macro_derive(Entity, attributes(stencil))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let table = decode_table(parse_macro_input!(input as ItemStruct));
    let name = &table.item.ident;
    let table_name = &table.name;
    let schema_name = &table.schema;
    let (from_row_factory, from_row) = from_row_trait(&table);
    let properties = table.properties.iter().map(|p| {
        let property = &p.name;
        let column = &p.column;
        let key = &p.key;
        let ignored = p.ignored;
        let read_only = p.read_only;
        let prototype = if p.ignored {
            quote!(::stencil::Value::Null)
        } else {
            let ty = &p.ty;
            quote!(<#ty as ::stencil::AsValue>::as_empty_value())
        };
        quote! {
            ::stencil::PropertyDescriptor::new(#property)
                .column(#column)
                .key(#key)
                .ignored(#ignored)
                .read_only(#read_only)
                .value(#prototype)
        }
    });
    let values = table.mapped().map(|p| {
        let property = &p.name;
        let ident = &p.ident;
        quote! {
            (#property, ::stencil::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        }
    });
    let setters = table.mapped().map(|p| {
        let property = &p.name;
        let ident = &p.ident;
        let ty = &p.ty;
        quote! {
            if property.eq_ignore_ascii_case(#property) {
                self.#ident = <#ty as ::stencil::AsValue>::try_from_value(value)?;
                return Ok(());
            }
        }
    });
    quote! {
        #from_row
        impl ::stencil::Entity for #name {
            fn describe() -> ::stencil::EntitySchema {
                ::stencil::EntitySchema::new(#table_name)
                    .schema_name(#schema_name)
                    #(.property(#properties))*
            }

            fn values(&self) -> ::std::boxed::Box<[(&'static str, ::stencil::Value)]> {
                ::std::boxed::Box::new([#(#values),*])
            }

            fn set_value(
                &mut self,
                property: &str,
                value: ::stencil::Value,
            ) -> ::stencil::Result<()> {
                #(#setters)*
                let _ = value;
                Err(::stencil::StencilError::unmapped(#table_name, property))
            }

            fn from_row(row: ::stencil::RowLabeled) -> ::stencil::Result<Self> {
                #from_row_factory::<#name>::from_row(row)
            }
        }
    }
    .into()
}
