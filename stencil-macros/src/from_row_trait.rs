use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, Type, spanned::Spanned};

/// Two `from_row` flavors selected at the call site: types implementing `Default` start
/// from it and tolerate missing columns, the others require every mapped column.
pub(crate) fn from_row_trait(table: &TableMetadata) -> (Ident, TokenStream) {
    let item = &table.item;
    let struct_name = &item.ident;
    let trait_name = Ident::new(&format!("{}FromRowTrait", item.ident), item.span());
    let factory_name = Ident::new(&format!("{}FromRowFactory", item.ident), item.span());
    let holders = table.mapped().map(|p| {
        let ident = &p.ident;
        let ty = &p.ty;
        quote!(let mut #ident: Option<#ty> = None;)
    });
    type AssignmentFn = dyn Fn(&Ident, &Type) -> TokenStream;
    let field_assignment = |assign: &AssignmentFn| {
        let branches = table.mapped().map(|p| {
            let name = &p.name;
            let column = &p.column;
            let assign = assign(&p.ident, &p.ty);
            quote! {
                if __n__.eq_ignore_ascii_case(#name) || __n__.eq_ignore_ascii_case(#column) {
                    #assign;
                }
            }
        });
        quote!(#(#branches else)* {})
    };
    let from_holders = table.properties.iter().map(|p| {
        let ident = &p.ident;
        if p.ignored {
            quote!(#ident: Default::default())
        } else {
            let column = &p.column;
            quote!(#ident: #ident.ok_or_else(|| __make_error__(#column))?)
        }
    });
    let assignment_default = field_assignment(
        &|field, ty| quote!(result.#field = <#ty as ::stencil::AsValue>::try_from_value(__v__)?),
    );
    let assignment_holder = field_assignment(
        &|field, ty| quote!(#field = Some(<#ty as ::stencil::AsValue>::try_from_value(__v__)?)),
    );
    (
        factory_name.clone(),
        quote! {
            trait #trait_name {
                fn from_row(row: ::stencil::RowLabeled) -> ::stencil::Result<#struct_name>;
            }
            struct #factory_name<T>(::std::marker::PhantomData<T>);
            impl<T: Default + Into<#struct_name>> #factory_name<T> {
                fn from_row(row: ::stencil::RowLabeled) -> ::stencil::Result<#struct_name> {
                    let mut result: #struct_name = T::default().into();
                    for (__n__, __v__) in ::std::iter::zip(row.labels.iter(), row.values.into_iter()) {
                        #assignment_default
                    }
                    Ok(result)
                }
            }
            impl<T> #trait_name for #factory_name<T> {
                fn from_row(row: ::stencil::RowLabeled) -> ::stencil::Result<#struct_name> {
                    #(#holders)*
                    for (__n__, __v__) in ::std::iter::zip(row.labels.iter(), row.values.into_iter()) {
                        #assignment_holder
                    }
                    let __make_error__ = |name: &str| ::stencil::Error::msg(format!(
                        "Column `{}` does not exist in the row provided",
                        name
                    ));
                    Ok(#struct_name {
                        #(#from_holders,)*
                    })
                }
            }
        },
    )
}
