use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Field, Ident, LitStr, Type, ext::IdentExt, parse::ParseBuffer};

pub(crate) struct PropertyMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) column: String,
    pub(crate) key: TokenStream,
    pub(crate) ignored: bool,
    pub(crate) read_only: bool,
}

fn decode_key(value: &str) -> TokenStream {
    match value {
        "assigned" => quote!(::stencil::KeyKind::Assigned),
        "guid" => quote!(::stencil::KeyKind::Guid),
        "identity" => quote!(::stencil::KeyKind::Identity),
        "trigger_identity" => quote!(::stencil::KeyKind::TriggerIdentity),
        _ => panic!(
            "Unknown key kind `{}`, expected one of: assigned, guid, identity, trigger_identity",
            value
        ),
    }
}

pub fn decode_property(field: &Field) -> PropertyMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Entity fields are expected to have a name");
    let mut name = ident.unraw().to_string();
    if name.starts_with('_') {
        name.remove(0);
    }
    let mut metadata = PropertyMetadata {
        ident,
        ty: field.ty.clone(),
        column: name.clone(),
        name,
        key: quote!(::stencil::KeyKind::NotAKey),
        ignored: false,
        read_only: false,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("stencil") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `stencil`, use it like: `#[stencil(attribute = value, ...)]`");
        };
        let result = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `name`, use it like: `#[stencil(name = \"my_column\")]`");
                };
                metadata.column = v.value();
            } else if arg.path.is_ident("key") {
                // Bare `key` is an assigned key
                metadata.key = match arg.value() {
                    Ok(v) => {
                        let Ok(v) = v.parse::<LitStr>() else {
                            panic!("Error while parsing `key`, use it like: `#[stencil(key = \"identity\")]`");
                        };
                        decode_key(&v.value())
                    }
                    Err(..) => decode_key("assigned"),
                };
            } else if arg.path.is_ident("ignored") {
                let Err(..) = arg.value() else {
                    panic!("Error while parsing `ignored`, use it like: `#[stencil(ignored)]`");
                };
                metadata.ignored = true;
            } else if arg.path.is_ident("read_only") {
                let Err(..) = arg.value() else {
                    panic!("Error while parsing `read_only`, use it like: `#[stencil(read_only)]`");
                };
                metadata.read_only = true;
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
    metadata
}
