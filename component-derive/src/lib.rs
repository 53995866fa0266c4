//! A procedural macro for implementing the `circuit::Component` trait.
//!
//! This mirrors the hand-rolled boilerplate a `Component` implementation would otherwise need:
//! generating `ports()` and `sub_components()` from struct fields tagged with one of four
//! attributes, and wiring up `component_name()`/`role()` from the struct name and a tagged
//! `String` field respectively.
//!
//! Tag struct members with:
//!
//! - `#[role]` — exactly one `String` field holding this instance's role within its parent.
//! - `#[port]` — a single named port (field type `Rc<Node>`).
//! - `#[ports]` — a vector of ports (field type `Vec<Rc<Node>>`), keyed `field_0`, `field_1`, ...
//! - `#[subcomponent]` — a single child implementing `Component`.
//! - `#[subcomponents]` — a vector of children implementing `Component`, keyed `field_0`, ...
//!
//! Fields without one of these attributes are left alone (device parameters, caches, etc).

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Field, Fields};

#[proc_macro_derive(
    Component,
    attributes(role, port, ports, subcomponent, subcomponents)
)]
pub fn derive_component(input_token_stream: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input_token_stream as DeriveInput);
    let struct_identifier = &input.ident;

    let Data::Struct(DataStruct { fields, .. }) = &input.data else {
        return quote! {}.into();
    };

    let role_field = get_fields_with_attribute(fields, "role");
    let port_fields = get_fields_with_attribute(fields, "port");
    let ports_fields = get_fields_with_attribute(fields, "ports");
    let sub_fields = get_fields_with_attribute(fields, "subcomponent");
    let subs_fields = get_fields_with_attribute(fields, "subcomponents");

    let role_impl = make_role_impl(&role_field);
    let ports_impl = make_ports_impl(&port_fields, &ports_fields);
    let sub_components_impl = make_sub_components_impl(&sub_fields, &subs_fields);

    quote! {
        #[automatically_derived]
        impl circuit::Component for #struct_identifier {
            fn component_name(&self) -> &'static str {
                stringify!(#struct_identifier)
            }

            #role_impl
            #ports_impl
            #sub_components_impl
        }
    }
    .into()
}

fn get_fields_with_attribute<'a>(fields: &'a Fields, ident: &str) -> Vec<&'a Field> {
    fields
        .iter()
        .filter(|field| field.attrs.iter().any(|attr| attr.path().is_ident(ident)))
        .collect()
}

fn make_role_impl(role_fields: &[&Field]) -> TokenStream2 {
    match role_fields.first() {
        Some(field) => {
            let name = &field.ident;
            quote! {
                fn role(&self) -> &str {
                    &self.#name
                }
            }
        }
        None => quote! {
            fn role(&self) -> &str {
                ""
            }
        },
    }
}

fn make_ports_impl(port_fields: &[&Field], ports_fields: &[&Field]) -> TokenStream2 {
    let port_names = port_fields.iter().map(|f| &f.ident);
    let ports_names = ports_fields.iter().map(|f| &f.ident);
    let ports_names2 = ports_names.clone();

    quote! {
        fn ports(&self) -> circuit::indexmap::IndexMap<String, std::rc::Rc<circuit::Node>> {
            let mut map = circuit::indexmap::IndexMap::new();
            #(
                map.insert(stringify!(#port_names).to_string(), self.#port_names.clone());
            )*
            #(
                for (i, node) in self.#ports_names.iter().enumerate() {
                    map.insert(format!("{}_{}", stringify!(#ports_names2), i), node.clone());
                }
            )*
            map
        }
    }
}

fn make_sub_components_impl(sub_fields: &[&Field], subs_fields: &[&Field]) -> TokenStream2 {
    let sub_names = sub_fields.iter().map(|f| &f.ident);
    let subs_names = subs_fields.iter().map(|f| &f.ident);
    let subs_names2 = subs_names.clone();

    quote! {
        fn sub_components(&self) -> circuit::indexmap::IndexMap<String, &dyn circuit::Component> {
            let mut map = circuit::indexmap::IndexMap::new();
            #(
                map.insert(stringify!(#sub_names).to_string(), &self.#sub_names as &dyn circuit::Component);
            )*
            #(
                for (i, child) in self.#subs_names.iter().enumerate() {
                    map.insert(format!("{}_{}", stringify!(#subs_names2), i), child as &dyn circuit::Component);
                }
            )*
            map
        }
    }
}
