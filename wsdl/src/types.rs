pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const SOAP_ENCODING_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// A qualified reference to a schema type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub namespace: String,
    pub type_name: Option<TypeName>,
    /// Local name of a top-level element this one stands in for (`ref=`).
    pub reference: Option<String>,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub nillable: bool,
    pub complex: Option<Box<ComplexType>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexType {
    pub name: String,
    pub namespace: String,
    pub base: Option<TypeName>,
    pub elements: Vec<Element>,
    pub array_item: Option<TypeName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleType {
    pub name: String,
    pub namespace: String,
    pub base: Option<TypeName>,
    pub enumerations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaItem {
    Element(Element),
    ComplexType(ComplexType),
    SimpleType(SimpleType),
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Schema {
    pub items: Vec<SchemaItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessagePart {
    pub name: String,
    pub element: Option<String>,
    pub type_name: Option<TypeName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationMessage {
    pub name: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub documentation: Option<String>,
    pub input: Option<OperationMessage>,
    pub output: Option<OperationMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortType {
    pub name: String,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoapHeader {
    pub message: String,
    pub part: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct BindingMessage {
    pub name: Option<String>,
    pub headers: Vec<SoapHeader>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindingOperation {
    pub name: String,
    pub soap_action: Option<String>,
    pub style: Option<String>,
    pub input: Option<BindingMessage>,
    pub output: Option<BindingMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub port_type: String,
    pub transport: Option<String>,
    pub operations: Vec<BindingOperation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub name: String,
    pub binding: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub ports: Vec<Port>,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: Option<String>,
    pub target_namespace: String,
    pub services: Vec<Service>,
    pub bindings: Vec<Binding>,
    pub port_types: Vec<PortType>,
    pub messages: Vec<Message>,
    pub schema: Schema,
}

impl TypeName {
    pub fn new<N: Into<String>>(namespace: Option<&str>, name: N) -> Self {
        Self {
            namespace: namespace.map(ToOwned::to_owned),
            name: name.into(),
        }
    }

    pub fn xsd<N: Into<String>>(name: N) -> Self {
        Self::new(Some(XSD_NAMESPACE), name)
    }

    /// True for the built-in XML Schema and SOAP-encoding namespaces.
    pub fn is_xsd(&self) -> bool {
        matches!(
            self.namespace.as_deref(),
            Some(XSD_NAMESPACE | SOAP_ENCODING_NAMESPACE)
        )
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        MaxOccurs::Bounded(1)
    }
}

impl MaxOccurs {
    pub fn parse(value: &str) -> Self {
        if value == "unbounded" {
            MaxOccurs::Unbounded
        } else {
            MaxOccurs::Bounded(value.trim().parse().unwrap_or(1))
        }
    }
}

impl Element {
    pub fn new<N: Into<String>, S: Into<String>>(name: N, namespace: S) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            type_name: None,
            reference: None,
            min_occurs: 1,
            max_occurs: MaxOccurs::default(),
            nillable: false,
            complex: None,
        }
    }

    pub fn with_type(mut self, type_name: TypeName) -> Self {
        self.type_name = Some(type_name);
        self
    }

    pub fn with_occurs(mut self, min_occurs: u32, max_occurs: MaxOccurs) -> Self {
        self.min_occurs = min_occurs;
        self.max_occurs = max_occurs;
        self
    }

    pub fn with_complex(mut self, complex: ComplexType) -> Self {
        self.complex = Some(Box::new(complex));
        self
    }

    pub fn is_optional(&self) -> bool {
        self.min_occurs == 0
    }

    pub fn is_array(&self) -> bool {
        match self.max_occurs {
            MaxOccurs::Unbounded => true,
            MaxOccurs::Bounded(max) => max > 1,
        }
    }

    pub fn is_complex(&self) -> bool {
        self.complex.is_some()
    }
}

impl ComplexType {
    pub fn new<N: Into<String>, S: Into<String>>(name: N, namespace: S) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            base: None,
            elements: Vec::new(),
            array_item: None,
        }
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_item.is_some()
    }
}

impl SimpleType {
    pub fn is_enum(&self) -> bool {
        !self.enumerations.is_empty()
    }
}

impl Schema {
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.items.iter().find_map(|item| match item {
            SchemaItem::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.items.iter().find_map(|item| match item {
            SchemaItem::ComplexType(ty) if ty.name == name => Some(ty),
            _ => None,
        })
    }

    pub fn simple_type(&self, name: &str) -> Option<&SimpleType> {
        self.items.iter().find_map(|item| match item {
            SchemaItem::SimpleType(ty) if ty.name == name => Some(ty),
            _ => None,
        })
    }

    pub fn simple_types(&self) -> impl Iterator<Item = &SimpleType> {
        self.items.iter().filter_map(|item| match item {
            SchemaItem::SimpleType(ty) => Some(ty),
            _ => None,
        })
    }

    /// Every complex type in document order: named types first, then the
    /// anonymous types nested inside top-level elements and other types.
    pub fn complex_types(&self) -> Vec<&ComplexType> {
        let mut named = Vec::new();
        let mut anonymous = Vec::new();

        for item in &self.items {
            match item {
                SchemaItem::ComplexType(ty) => {
                    named.push(ty);
                    collect_nested(ty, &mut anonymous);
                }

                SchemaItem::Element(element) => {
                    if let Some(ty) = &element.complex {
                        anonymous.push(ty.as_ref());
                        collect_nested(ty, &mut anonymous);
                    }
                }

                SchemaItem::SimpleType(_) => (),
            }
        }

        named.extend(anonymous);
        named
    }
}

fn collect_nested<'a>(ty: &'a ComplexType, out: &mut Vec<&'a ComplexType>) {
    for element in &ty.elements {
        if let Some(inner) = &element.complex {
            out.push(inner.as_ref());
            collect_nested(inner, out);
        }
    }
}

impl Message {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Definition {
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.name == name)
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|binding| binding.name == name)
    }

    pub fn port_type(&self, name: &str) -> Option<&PortType> {
        self.port_types
            .iter()
            .find(|port_type| port_type.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
            && self.bindings.is_empty()
            && self.port_types.is_empty()
            && self.messages.is_empty()
            && self.schema.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurs_drive_array_and_optional() {
        let element = Element::new("items", "urn:test").with_occurs(0, MaxOccurs::Unbounded);
        assert!(element.is_optional());
        assert!(element.is_array());

        let single = Element::new("item", "urn:test");
        assert!(!single.is_optional());
        assert!(!single.is_array());

        let bounded = Element::new("pair", "urn:test").with_occurs(1, MaxOccurs::Bounded(2));
        assert!(bounded.is_array());
    }

    #[test]
    fn max_occurs_parses_unbounded_and_numbers() {
        assert_eq!(MaxOccurs::parse("unbounded"), MaxOccurs::Unbounded);
        assert_eq!(MaxOccurs::parse("5"), MaxOccurs::Bounded(5));
        assert_eq!(MaxOccurs::parse("junk"), MaxOccurs::Bounded(1));
    }

    #[test]
    fn simple_type_is_enum_only_with_values() {
        let mut ty = SimpleType {
            name: "Colour".into(),
            namespace: "urn:test".into(),
            base: Some(TypeName::xsd("string")),
            enumerations: Vec::new(),
        };
        assert!(!ty.is_enum());

        ty.enumerations.push("Red".into());
        assert!(ty.is_enum());
    }

    #[test]
    fn complex_types_lists_named_before_anonymous() {
        let nested = ComplexType::new("OuterInner", "urn:test");
        let outer = ComplexType::new("Outer", "urn:test")
            .with_elements(vec![Element::new("inner", "urn:test").with_complex(nested)]);
        let wrapper = ComplexType::new("Wrapper", "urn:test");

        let schema = Schema {
            items: vec![
                SchemaItem::Element(Element::new("Wrapper", "urn:test").with_complex(wrapper)),
                SchemaItem::ComplexType(outer),
            ],
        };

        let names = schema
            .complex_types()
            .into_iter()
            .map(|ty| ty.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Outer", "Wrapper", "OuterInner"]);
    }

    #[test]
    fn xsd_type_names_are_detected() {
        assert!(TypeName::xsd("int").is_xsd());
        assert!(TypeName::new(Some(SOAP_ENCODING_NAMESPACE), "string").is_xsd());
        assert!(!TypeName::new(Some("urn:test"), "int").is_xsd());
        assert!(!TypeName::new(None, "int").is_xsd());
    }
}
