use crate::decode_property::{PropertyMetadata, decode_property};
use convert_case::{Case, Casing};
use quote::ToTokens;
use syn::{ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    pub(crate) schema: String,
    pub(crate) properties: Vec<PropertyMetadata>,
}

impl TableMetadata {
    /// Properties backed by a column.
    pub(crate) fn mapped(&self) -> impl Iterator<Item = &PropertyMetadata> + Clone {
        self.properties.iter().filter(|p| !p.ignored)
    }
}

pub fn decode_table(item: ItemStruct) -> TableMetadata {
    let properties: Vec<_> = item.fields.iter().map(decode_property).collect();
    let mut name = item.ident.to_string().to_case(Case::Snake);
    let mut schema = String::new();
    if name.starts_with('_') {
        name.remove(0);
    }
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("stencil") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `stencil`, use it like: `#[stencil(attribute = value, ..)]`");
        };
        let result = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `name`, use it like: `#[stencil(name = \"my_table\")]`");
                };
                name = value.value();
            } else if arg.path.is_ident("schema") {
                let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!(
                        "Error while parsing `schema`, use it like: `#[stencil(schema = \"my_schema\")]`"
                    );
                };
                schema = value.value();
            } else {
                panic!(
                    "Unknown attribute `{}` inside stencil macro",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        });
        if let Err(e) = result {
            panic!("Error while parsing `stencil`: {}", e);
        }
    }
    TableMetadata {
        item,
        name,
        schema,
        properties,
    }
}
