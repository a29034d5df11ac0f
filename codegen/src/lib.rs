//! Generates typed SOAP client crates from WSDL service descriptions.
//!
//! A run resolves message parts against the schema, indexes bindings,
//! assigns collision-free names and then emits model shapes, one interface
//! trait per port type, one client per service port and the runtime support
//! those clients dispatch through.

use lather_wsdl::types::Definition;
use proc_macro2::TokenStream;

pub mod binding;
pub mod error;
pub mod generate;
pub mod naming;
pub mod options;
pub mod output;
pub mod resolve;

#[cfg(test)]
mod test_utils;

pub use binding::{HeaderPolicy, ReservedNamePolicy};
pub use error::Error;
pub use options::{GeneratorOptions, Layout, Transport};
pub use output::{GeneratedCrate, GeneratedFile};

pub fn from_url<S: AsRef<str>>(url: S, options: &GeneratorOptions) -> Result<GeneratedCrate, Error> {
    let definition = lather_wsdl::parse(url)?;
    from_definition(&definition, options)
}

pub fn from_definition(
    definition: &Definition,
    options: &GeneratorOptions,
) -> Result<GeneratedCrate, Error> {
    let artifacts = generate::generate(definition, options)?;
    output::assemble(&artifacts, options)
}

/// The generated modules as inline items, for expansion inside another crate.
pub fn inline_from_url<S: AsRef<str>>(url: S, options: &GeneratorOptions) -> Result<TokenStream, Error> {
    let definition = lather_wsdl::parse(url)?;
    let artifacts = generate::generate(&definition, options)?;
    Ok(output::inline_modules(&artifacts))
}
