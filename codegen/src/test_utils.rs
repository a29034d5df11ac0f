//! Builders for small service descriptions used across unit tests.

use lather_wsdl::types::{
    BindingMessage, BindingOperation, ComplexType, Definition, Element, Message, MessagePart,
    Operation, OperationMessage, Schema, SchemaItem, SoapHeader, TypeName,
};

pub const TNS: &str = "http://tempuri.org/";

pub fn make_definition(items: Vec<SchemaItem>) -> Definition {
    Definition {
        name: Some("Test".into()),
        target_namespace: TNS.into(),
        schema: Schema { items },
        ..Default::default()
    }
}

/// An element of a built-in XML Schema type.
pub fn make_element(name: &str, xsd_type: &str) -> Element {
    Element::new(name, TNS).with_type(TypeName::xsd(xsd_type))
}

/// A top-level element with an inline complex type holding `children`.
pub fn make_wrapper(name: &str, children: Vec<Element>) -> Element {
    Element::new(name, TNS).with_complex(ComplexType::new(name, TNS).with_elements(children))
}

pub fn make_element_part(name: &str, element: &str) -> MessagePart {
    MessagePart {
        name: name.into(),
        element: Some(element.into()),
        type_name: None,
    }
}

pub fn make_type_part(name: &str, type_name: TypeName) -> MessagePart {
    MessagePart {
        name: name.into(),
        element: None,
        type_name: Some(type_name),
    }
}

/// A document/literal message with one `parameters` part.
pub fn make_message(name: &str, element: &str) -> Message {
    Message {
        name: name.into(),
        parts: vec![make_element_part("parameters", element)],
    }
}

pub fn make_operation(
    name: &str,
    input: &str,
    input_name: Option<&str>,
    output: Option<&str>,
) -> Operation {
    Operation {
        name: name.into(),
        documentation: None,
        input: Some(OperationMessage {
            name: input_name.map(Into::into),
            message: input.into(),
        }),
        output: output.map(|output| OperationMessage {
            name: None,
            message: output.into(),
        }),
    }
}

pub fn make_binding_operation(
    name: &str,
    action: Option<&str>,
    input_name: Option<&str>,
    headers: &[&str],
) -> BindingOperation {
    BindingOperation {
        name: name.into(),
        soap_action: action.map(Into::into),
        style: Some("document".into()),
        input: Some(BindingMessage {
            name: input_name.map(Into::into),
            headers: headers
                .iter()
                .map(|message| SoapHeader {
                    message: (*message).into(),
                    part: None,
                })
                .collect(),
        }),
        output: Some(BindingMessage::default()),
    }
}
