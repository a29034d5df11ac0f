//! Emits the `lather_util` sources as the generated crate's `runtime` modules.

use quote::quote;
use syn::{Attribute, Item};

use super::{Artifact, Category};
use crate::{error::Error, options::Transport};

const ERROR: &str = include_str!("../../../util/src/error.rs");
const CONFIG: &str = include_str!("../../../util/src/config.rs");
const ENVELOPE: &str = include_str!("../../../util/src/envelope.rs");
const DISPATCH: &str = include_str!("../../../util/src/dispatch.rs");
const BLOCKING: &str = include_str!("../../../util/src/blocking.rs");

fn is_test_only(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

fn item_attrs(item: &Item) -> &[Attribute] {
    match item {
        Item::Const(item) => &item.attrs,
        Item::Enum(item) => &item.attrs,
        Item::Fn(item) => &item.attrs,
        Item::Impl(item) => &item.attrs,
        Item::Mod(item) => &item.attrs,
        Item::Static(item) => &item.attrs,
        Item::Struct(item) => &item.attrs,
        Item::Trait(item) => &item.attrs,
        Item::Type(item) => &item.attrs,
        Item::Use(item) => &item.attrs,
        _ => &[],
    }
}

fn runtime_module(name: &str, source: &str) -> Result<Artifact, Error> {
    let file = syn::parse_file(source).map_err(|error| Error::InvalidTokens {
        module: format!("runtime::{}", name),
        message: error.to_string(),
    })?;

    let items = file
        .items
        .into_iter()
        .filter(|item| !is_test_only(item_attrs(item)));

    Ok(Artifact::new(Category::Runtime, name, quote! { #(#items)* }))
}

/// The runtime modules for `transport`; the other transport's module is left out.
pub fn generate(transport: Transport) -> Result<Vec<Artifact>, Error> {
    let transport = match transport {
        Transport::Http => ("dispatch", DISPATCH),
        Transport::Legacy => ("blocking", BLOCKING),
    };

    [("error", ERROR), ("config", CONFIG), ("envelope", ENVELOPE), transport]
        .into_iter()
        .map(|(name, source)| runtime_module(name, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modules_are_stripped() {
        let artifacts = generate(Transport::Http).unwrap();
        let modules = artifacts
            .iter()
            .map(|artifact| artifact.module.as_str())
            .collect::<Vec<_>>();

        assert_eq!(modules, ["error", "config", "envelope", "dispatch"]);

        for artifact in &artifacts {
            let rendered = artifact.tokens.to_string();
            assert!(!rendered.contains("mod tests"), "{}", artifact.module);
            assert!(!rendered.contains("cfg (test)"), "{}", artifact.module);
        }
    }

    #[test]
    fn legacy_transport_uses_blocking_module() {
        let modules = generate(Transport::Legacy)
            .unwrap()
            .into_iter()
            .map(|artifact| artifact.module)
            .collect::<Vec<_>>();

        assert_eq!(modules, ["error", "config", "envelope", "blocking"]);
    }
}
