//! Reads WSDL 1.1 service descriptions into [`types::Definition`].

use std::path::Path;
use url::Url;

mod parser;

pub mod error;
pub mod types;

fn location_url(location: &str) -> Result<Url, error::Error> {
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = Path::new(location)
                .canonicalize()
                .map_err(|err| error::Error::PathConversionError(Some(err)))?;

            Url::from_file_path(path).map_err(|()| error::Error::PathConversionError(None))
        }
        Err(err) => Err(err.into()),
    }
}

/// `location` is a `file`, `http` or `https` URL, or a filesystem path.
pub fn parse<S: AsRef<str>>(location: S) -> Result<types::Definition, error::Error> {
    parser::parse(location_url(location.as_ref())?)
}

pub fn parse_str(xml: &str) -> Result<types::Definition, error::Error> {
    parser::parse_str(xml)
}
