use std::{io, path::PathBuf};
use thiserror::Error;

use lather_wsdl::error::Error as WsdlError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error reading service description")]
    Wsdl(#[from] WsdlError),

    #[error("Output namespace is empty")]
    EmptyNamespace,

    #[error("Output namespace `{0}` is not a valid crate name")]
    InvalidNamespace(String),

    #[error("Service description defines no services, bindings, port types, messages or types")]
    EmptyDefinition,

    #[error("Generated code for `{module}` does not parse: {message}")]
    InvalidTokens { module: String, message: String },

    #[error("Error writing `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
