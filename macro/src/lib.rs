//! `lather!` expands a WSDL service description into client modules inline.

extern crate proc_macro;

use lather_codegen::{GeneratorOptions, Layout, Transport};
use proc_macro::TokenStream;
use std::{error::Error, path::Path};
use syn::{parse_macro_input, LitStr};

/// Relative paths are resolved against the invoking crate's manifest directory.
fn resolve(location: &str) -> String {
    if location.contains("://") || Path::new(location).is_absolute() {
        return location.to_owned();
    }

    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => Path::new(&dir).join(location).display().to_string(),
        Err(_) => location.to_owned(),
    }
}

fn namespace(location: &str) -> String {
    let stem = Path::new(location.split(['?', '#']).next().unwrap_or(location))
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("service");

    let namespace = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();

    match namespace.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => namespace,
        _ => format!("service_{}", namespace),
    }
}

fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

#[proc_macro]
pub fn lather(input: TokenStream) -> TokenStream {
    let location = parse_macro_input!(input as LitStr);
    let resolved = resolve(&location.value());

    let options = GeneratorOptions::new(namespace(&resolved))
        .with_layout(Layout::SingleFile)
        .with_transport(Transport::Http);

    match lather_codegen::inline_from_url(&resolved, &options) {
        Ok(tokens) => tokens.into(),
        Err(error) => syn::Error::new(location.span(), describe(&error))
            .to_compile_error()
            .into(),
    }
}
