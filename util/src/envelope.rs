use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

use super::error::{Fault, SoapError};

pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// A shape that travels as the root element of a SOAP body or header block.
pub trait SoapMessage: Serialize {
    const ELEMENT: &'static str;
    const NAMESPACE: &'static str;
}

/// Outgoing SOAP 1.1 envelope: optional header blocks followed by one body element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    headers: Vec<String>,
    body: String,
}

/// The payload element of a response body, already checked for faults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapResponse {
    element: Option<String>,
    body: String,
}

fn malformed<E: fmt::Display>(error: E) -> SoapError {
    SoapError::MalformedEnvelope(error.to_string())
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn with_namespace(element: &str, namespace: &str, rest: &str) -> String {
    if namespace.is_empty() {
        format!("<{}{}", element, rest)
    } else {
        format!("<{} xmlns=\"{}\"{}", element, escape(namespace), rest)
    }
}

/// Serialises `message` under its root element, declaring its namespace as the default.
pub fn to_fragment<T: SoapMessage>(message: &T) -> Result<String, SoapError> {
    let xml = quick_xml::se::to_string_with_root(T::ELEMENT, message)
        .map_err(|error| SoapError::Serialize(error.to_string()))?;

    let rest = xml
        .strip_prefix('<')
        .and_then(|xml| xml.strip_prefix(T::ELEMENT))
        .ok_or_else(|| SoapError::Serialize(format!("missing root element `{}`", T::ELEMENT)))?;

    Ok(with_namespace(T::ELEMENT, T::NAMESPACE, rest))
}

impl Envelope {
    pub fn new<T: SoapMessage>(body: &T) -> Result<Self, SoapError> {
        Ok(Self {
            headers: Vec::new(),
            body: to_fragment(body)?,
        })
    }

    /// A body consisting of a single empty element.
    pub fn empty(element: &str, namespace: &str) -> Self {
        Self {
            headers: Vec::new(),
            body: with_namespace(element, namespace, "/>"),
        }
    }

    pub fn with_header<T: SoapMessage>(mut self, header: &T) -> Result<Self, SoapError> {
        self.headers.push(to_fragment(header)?);
        Ok(self)
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        xml.push_str(r#"<soap:Envelope xmlns:soap=""#);
        xml.push_str(SOAP_ENVELOPE_NAMESPACE);
        xml.push_str(r#"">"#);

        if !self.headers.is_empty() {
            xml.push_str("<soap:Header>");
            self.headers.iter().for_each(|header| xml.push_str(header));
            xml.push_str("</soap:Header>");
        }

        xml.push_str("<soap:Body>");
        xml.push_str(&self.body);
        xml.push_str("</soap:Body></soap:Envelope>");
        xml
    }
}

impl SoapResponse {
    /// Interprets an HTTP response. A fault wins over the status code; any
    /// other non-2xx status is reported with its body.
    pub fn from_http(status: u16, body: String) -> Result<Self, SoapError> {
        match Self::from_xml(&body) {
            Err(SoapError::Fault(fault)) => Err(SoapError::Fault(fault)),
            _ if !(200..300).contains(&status) => Err(SoapError::Http { status, body }),
            parsed => parsed,
        }
    }

    pub fn from_xml(xml: &str) -> Result<Self, SoapError> {
        let mut reader = Reader::from_str(xml);
        let mut body_start = None;

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(start) => match body_start {
                    None => {
                        if start.local_name().as_ref() == b"Body" {
                            body_start = Some(reader.buffer_position() as usize);
                        }
                    }

                    Some(from) => {
                        let element = local_name(&start);
                        reader.read_to_end(start.name()).map_err(malformed)?;
                        return Self::payload(xml, from, reader.buffer_position() as usize, element);
                    }
                },

                Event::Empty(start) => match body_start {
                    None => {
                        if start.local_name().as_ref() == b"Body" {
                            return Ok(Self::default());
                        }
                    }

                    Some(from) => {
                        let element = local_name(&start);
                        return Self::payload(xml, from, reader.buffer_position() as usize, element);
                    }
                },

                Event::End(end) => {
                    if body_start.is_some() && end.local_name().as_ref() == b"Body" {
                        return Ok(Self::default());
                    }
                }

                Event::Eof => return Err(malformed("missing soap:Body")),

                _ => (),
            }
        }
    }

    fn payload(xml: &str, from: usize, to: usize, element: String) -> Result<Self, SoapError> {
        let slice = xml.get(from..to).ok_or_else(|| malformed("body out of range"))?;
        let body = match slice.find('<') {
            Some(offset) => &slice[offset..],
            None => slice,
        };

        if element == "Fault" {
            return Err(SoapError::Fault(parse_fault(body)?));
        }

        Ok(Self {
            element: Some(element),
            body: body.to_owned(),
        })
    }

    /// Local name of the payload element, `None` for an empty body.
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, SoapError> {
        if self.body.is_empty() {
            return Err(SoapError::Deserialize("empty SOAP body".into()));
        }

        quick_xml::de::from_str(&self.body).map_err(|error| SoapError::Deserialize(error.to_string()))
    }

    /// For one-way calls and outputs without fields.
    pub fn into_unit(self) -> Result<(), SoapError> {
        Ok(())
    }
}

/// Reads SOAP 1.1 (`faultcode`/`faultstring`) and SOAP 1.2 (`Code/Value`, `Reason/Text`) faults.
fn parse_fault(xml: &str) -> Result<Fault, SoapError> {
    let mut reader = Reader::from_str(xml);
    let mut fault = Fault::default();
    let mut current = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => {
                let name = local_name(&start);

                if name.eq_ignore_ascii_case("detail") {
                    let span = reader.read_to_end(start.name()).map_err(malformed)?;
                    let detail = xml
                        .get(span.start as usize..span.end as usize)
                        .unwrap_or_default()
                        .trim();

                    if !detail.is_empty() {
                        fault.detail = Some(detail.to_owned());
                    }
                } else {
                    current = Some(name);
                }
            }

            Event::Text(text) => {
                let value = text.unescape().map_err(malformed)?;
                let value = value.trim();

                match current.as_deref() {
                    _ if value.is_empty() => (),
                    Some("faultcode" | "Value") if fault.code.is_empty() => {
                        fault.code = value.to_owned()
                    }
                    Some("faultstring" | "Text") if fault.string.is_empty() => {
                        fault.string = value.to_owned()
                    }
                    Some("faultactor" | "Role") => fault.actor = Some(value.to_owned()),
                    _ => (),
                }
            }

            Event::End(_) => current = None,
            Event::Eof => break,
            _ => (),
        }
    }

    Ok(fault)
}
