//! Runtime support shared by generated SOAP clients.
//!
//! Every module here only refers to its siblings through `super::`, so the
//! generator can emit the same sources into a generated crate's `runtime`
//! module.

pub mod blocking;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;

pub use blocking::BlockingSoapClient;
pub use config::{ClientConfig, RetryPolicy};
pub use dispatch::{CancelToken, SoapClient};
pub use envelope::{Envelope, SoapMessage, SoapResponse};
pub use error::{Fault, SoapError};
