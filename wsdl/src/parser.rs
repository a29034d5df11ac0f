use quick_xml::{
    events::{BytesStart, BytesText, Event},
    Reader,
};
use std::{
    collections::HashSet,
    io::{BufRead, BufReader, Cursor},
};
use tracing::{debug, trace};
use url::Url;

use super::{
    error,
    types::{
        Binding, BindingMessage, BindingOperation, ComplexType, Definition, Element, MaxOccurs,
        Message, MessagePart, Operation, OperationMessage, Port, PortType, Schema, SchemaItem,
        Service, SimpleType, SoapHeader, TypeName,
    },
};

fn get_attributes<const N: usize>(
    start: &BytesStart<'_>,
    names: [&'static str; N],
) -> Result<[Option<String>; N], error::Error> {
    const INIT: Option<String> = None;
    let mut result = [INIT; N];

    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref());
        let (prefix, key) = split_namespaced_name(&key);

        if prefix == Some("xmlns") {
            continue;
        }

        for (index, name) in names.iter().enumerate() {
            if key == *name {
                result[index] = Some(attribute.unescape_value()?.into_owned());
                break;
            }
        }
    }

    Ok(result)
}

fn split_namespaced_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, prefixed_name),
    }
}

fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Scoped `xmlns` declarations plus the stack of enclosing target namespaces.
#[derive(Clone, Default)]
struct CurrentNamespaces {
    target: Vec<String>,
    scopes: Vec<Vec<(Option<String>, String)>>,
}

struct Parser {
    root: Option<Url>,
    visited: HashSet<Url>,

    definition: Definition,
    seen_definitions: bool,
    current_namespaces: CurrentNamespaces,
}

#[derive(Debug)]
enum ParseState {
    Definitions,

    Types,
    Schema,
    Element(Element),
    ComplexType(ComplexType),
    Content {
        base: Option<TypeName>,
        elements: Vec<Element>,
        array_item: Option<TypeName>,
    },
    Derivation {
        base: Option<TypeName>,
        extension: bool,
        elements: Vec<Element>,
        array_item: Option<TypeName>,
    },
    Group {
        elements: Vec<Element>,
        choice: bool,
    },
    SimpleType(SimpleType),
    Restriction {
        base: Option<TypeName>,
        enumerations: Vec<String>,
    },

    Message(Message),
    Part(MessagePart),

    PortType(PortType),
    Operation(Operation),
    Documentation(Option<String>),
    Input(OperationMessage),
    Output(OperationMessage),

    Binding(Binding),
    BindingOperation(BindingOperation),
    BindingInput(BindingMessage),
    BindingOutput(BindingMessage),

    Service(Service),
    Port(Port),

    Other(String),
}

impl CurrentNamespaces {
    fn push_target_namespace(&mut self, namespace: String) {
        self.target.push(namespace);
    }

    fn pop_target_namespace(&mut self) {
        self.target.pop();
    }

    fn target(&self) -> String {
        self.target.last().cloned().unwrap_or_default()
    }

    fn push_scope(&mut self, declarations: Vec<(Option<String>, String)>) {
        self.scopes.push(declarations);
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(declared, _)| declared.as_deref() == prefix)
            .map(|(_, namespace)| namespace.as_str())
    }

    fn resolve(&self, prefixed_name: &str) -> TypeName {
        let (prefix, name) = split_namespaced_name(prefixed_name);
        let namespace = self
            .lookup(prefix)
            .map(ToOwned::to_owned)
            .or_else(|| prefix.is_none().then(|| self.target()));

        TypeName {
            namespace,
            name: name.to_owned(),
        }
    }
}

impl Parser {
    fn new(root: Option<Url>) -> Self {
        Self {
            root,
            visited: HashSet::new(),

            definition: Default::default(),
            seen_definitions: false,
            current_namespaces: Default::default(),
        }
    }

    fn push_target_namespace(&mut self, namespace: String) {
        self.current_namespaces.push_target_namespace(namespace);
    }

    fn pop_target_namespace(&mut self) {
        self.current_namespaces.pop_target_namespace();
    }

    fn target(&self) -> String {
        self.current_namespaces.target()
    }

    fn resolve_namespace(&self, prefixed_name: &str) -> TypeName {
        self.current_namespaces.resolve(prefixed_name)
    }

    fn parse(mut self) -> Result<Definition, error::Error> {
        if let Some(root) = self.root.clone() {
            self.parse_url(root)?;
        }

        self.finish()
    }

    fn finish(mut self) -> Result<Definition, error::Error> {
        if !self.seen_definitions && self.definition.schema.items.is_empty() {
            return Err(error::Error::MissingDefinitions);
        }

        name_anonymous_types(&mut self.definition.schema);
        Ok(self.definition)
    }

    fn parse_url(&mut self, url: Url) -> Result<(), error::Error> {
        if !self.visited.insert(url.clone()) {
            return Ok(());
        }

        debug!(%url, "reading service description");

        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| error::Error::PathConversionError(None))?;
                let reader = Reader::from_file(path).map_err(error::Error::FileOpenError)?;
                self.parse_xml(Some(&url), reader)
            }

            "http" | "https" => {
                let body = reqwest::blocking::get(url.clone())?.error_for_status()?.bytes()?;
                self.parse_xml(Some(&url), Reader::from_reader(BufReader::new(Cursor::new(body))))
            }

            other => Err(error::Error::UnsupportedScheme(other.into())),
        }
    }

    fn import(&mut self, base: Option<&Url>, location: Option<String>) -> Result<(), error::Error> {
        let location = match location {
            Some(location) => location,
            None => return Ok(()),
        };

        let url = match base {
            Some(base) => base.join(&location)?,
            None => match Url::parse(&location) {
                Ok(url) => url,
                Err(_) => {
                    debug!(%location, "skipping relative import without a base location");
                    return Ok(());
                }
            },
        };

        self.parse_url(url)
    }

    fn parse_xml<B: BufRead>(
        &mut self,
        url: Option<&Url>,
        mut reader: Reader<B>,
    ) -> Result<(), error::Error> {
        reader.config_mut().trim_text(true);

        let mut stack = Vec::new();
        let mut buffer = Vec::new();

        loop {
            match reader.read_event_into(&mut buffer)? {
                Event::Start(start) => self.handle_start(&mut stack, &start, url)?,
                Event::End(..) => self.handle_end(&mut stack)?,

                Event::Empty(start) => {
                    self.handle_start(&mut stack, &start, url)?;
                    self.handle_end(&mut stack)?;
                }

                Event::Text(text) => self.handle_text(&mut stack, &text)?,

                Event::Eof => break,

                _ => (),
            }

            buffer.clear();
        }

        Ok(())
    }

    fn handle_start(
        &mut self,
        stack: &mut Vec<ParseState>,
        start: &BytesStart<'_>,
        url: Option<&Url>,
    ) -> Result<(), error::Error> {
        let qualified = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let local_name = split_namespaced_name(&qualified).1;

        let mut declarations = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref());
            let value = attribute.unescape_value()?.into_owned();

            match split_namespaced_name(&key) {
                (None, "xmlns") => declarations.push((None, value)),
                (Some("xmlns"), prefix) => declarations.push((Some(prefix.to_owned()), value)),
                _ => (),
            }
        }
        self.current_namespaces.push_scope(declarations);

        let mut state = stack.pop();
        let mut new_state = ParseState::Other(local_name.to_owned());

        match state {
            None => match local_name {
                "definitions" => {
                    let [name, namespace] = get_attributes(start, ["name", "targetNamespace"])?;
                    let namespace = namespace.unwrap_or_default();

                    if !self.seen_definitions {
                        self.seen_definitions = true;
                        self.definition.name = name;
                        self.definition.target_namespace = namespace.clone();
                    }

                    self.push_target_namespace(namespace);
                    new_state = ParseState::Definitions;
                }

                "schema" => {
                    let [namespace] = get_attributes(start, ["targetNamespace"])?;
                    self.push_target_namespace(namespace.unwrap_or_default());
                    new_state = ParseState::Schema;
                }

                _ => trace!(element = local_name, "ignoring unknown document root"),
            },

            Some(ParseState::Definitions) => match local_name {
                "import" => {
                    let [location] = get_attributes(start, ["location"])?;
                    self.import(url, location)?;
                }

                "types" => new_state = ParseState::Types,

                "message" => {
                    let [name] = get_attributes(start, ["name"])?;

                    new_state = ParseState::Message(Message {
                        name: name.unwrap_or_default(),
                        parts: Vec::new(),
                    });
                }

                "portType" => {
                    let [name] = get_attributes(start, ["name"])?;

                    new_state = ParseState::PortType(PortType {
                        name: name.unwrap_or_default(),
                        operations: Vec::new(),
                    });
                }

                "binding" => {
                    let [name, ty] = get_attributes(start, ["name", "type"])?;

                    new_state = ParseState::Binding(Binding {
                        name: name.unwrap_or_default(),
                        port_type: ty.as_deref().map(local_name_of).unwrap_or_default(),
                        transport: None,
                        operations: Vec::new(),
                    });
                }

                "service" => {
                    let [name] = get_attributes(start, ["name"])?;

                    new_state = ParseState::Service(Service {
                        name: name.unwrap_or_default(),
                        ports: Vec::new(),
                    });
                }

                _ => trace!(element = local_name, "ignoring element inside definitions"),
            },

            Some(ParseState::Types) => match local_name {
                "schema" => {
                    let [namespace] = get_attributes(start, ["targetNamespace"])?;
                    self.push_target_namespace(namespace.unwrap_or_default());
                    new_state = ParseState::Schema;
                }

                _ => trace!(element = local_name, "ignoring element inside types"),
            },

            Some(ParseState::Schema) => match local_name {
                "element" => new_state = ParseState::Element(self.element(start)?),

                "complexType" => {
                    let [name] = get_attributes(start, ["name"])?;
                    new_state = ParseState::ComplexType(ComplexType::new(
                        name.unwrap_or_default(),
                        self.target(),
                    ));
                }

                "simpleType" => {
                    let [name] = get_attributes(start, ["name"])?;
                    new_state = ParseState::SimpleType(SimpleType {
                        name: name.unwrap_or_default(),
                        namespace: self.target(),
                        base: None,
                        enumerations: Vec::new(),
                    });
                }

                "include" | "import" => {
                    let [location] = get_attributes(start, ["schemaLocation"])?;
                    self.import(url, location)?;
                }

                _ => trace!(element = local_name, "ignoring element inside schema"),
            },

            Some(ParseState::Element(_)) => match local_name {
                "complexType" => {
                    new_state = ParseState::ComplexType(ComplexType::new("", self.target()))
                }

                "simpleType" => {
                    new_state = ParseState::SimpleType(SimpleType {
                        name: String::new(),
                        namespace: self.target(),
                        base: None,
                        enumerations: Vec::new(),
                    })
                }

                _ => trace!(element = local_name, "ignoring element inside element"),
            },

            Some(ParseState::ComplexType(_)) => match local_name {
                "sequence" | "all" | "choice" => {
                    new_state = ParseState::Group {
                        elements: Vec::new(),
                        choice: local_name == "choice",
                    }
                }

                "complexContent" | "simpleContent" => {
                    new_state = ParseState::Content {
                        base: None,
                        elements: Vec::new(),
                        array_item: None,
                    }
                }

                _ => trace!(element = local_name, "ignoring element inside complex type"),
            },

            Some(ParseState::Content { .. }) => match local_name {
                "extension" | "restriction" => {
                    let [base] = get_attributes(start, ["base"])?;

                    new_state = ParseState::Derivation {
                        base: base.map(|base| self.resolve_namespace(&base)),
                        extension: local_name == "extension",
                        elements: Vec::new(),
                        array_item: None,
                    };
                }

                _ => trace!(element = local_name, "ignoring element inside content"),
            },

            Some(ParseState::Derivation {
                ref mut array_item, ..
            }) => match local_name {
                "sequence" | "all" | "choice" => {
                    new_state = ParseState::Group {
                        elements: Vec::new(),
                        choice: local_name == "choice",
                    }
                }

                "attribute" => {
                    let [array_type] = get_attributes(start, ["arrayType"])?;

                    if let Some(array_type) = array_type {
                        let item = array_type.trim_end_matches("[]");
                        *array_item = Some(self.resolve_namespace(item));
                    }
                }

                _ => trace!(element = local_name, "ignoring element inside derivation"),
            },

            Some(ParseState::Group { .. }) => match local_name {
                "element" => new_state = ParseState::Element(self.element(start)?),

                "sequence" | "all" | "choice" => {
                    new_state = ParseState::Group {
                        elements: Vec::new(),
                        choice: local_name == "choice",
                    }
                }

                _ => trace!(element = local_name, "ignoring element inside model group"),
            },

            Some(ParseState::SimpleType(_)) => match local_name {
                "restriction" => {
                    let [base] = get_attributes(start, ["base"])?;

                    new_state = ParseState::Restriction {
                        base: base.map(|base| self.resolve_namespace(&base)),
                        enumerations: Vec::new(),
                    };
                }

                _ => trace!(element = local_name, "ignoring element inside simple type"),
            },

            Some(ParseState::Restriction {
                ref mut enumerations,
                ..
            }) => {
                if local_name == "enumeration" {
                    let [value] = get_attributes(start, ["value"])?;
                    enumerations.extend(value);
                }
            }

            Some(ParseState::Message(_)) => match local_name {
                "part" => {
                    let [name, element, ty] = get_attributes(start, ["name", "element", "type"])?;

                    new_state = ParseState::Part(MessagePart {
                        name: name.unwrap_or_default(),
                        element: element.as_deref().map(local_name_of),
                        type_name: ty.map(|ty| self.resolve_namespace(&ty)),
                    });
                }

                _ => trace!(element = local_name, "ignoring element inside message"),
            },

            Some(ParseState::PortType(_)) => match local_name {
                "operation" => {
                    let [name] = get_attributes(start, ["name"])?;

                    new_state = ParseState::Operation(Operation {
                        name: name.unwrap_or_default(),
                        documentation: None,
                        input: None,
                        output: None,
                    })
                }

                _ => trace!(element = local_name, "ignoring element inside port type"),
            },

            Some(ParseState::Operation(_)) => match local_name {
                "documentation" => new_state = ParseState::Documentation(None),

                "input" | "output" => {
                    let [name, message] = get_attributes(start, ["name", "message"])?;

                    let message = OperationMessage {
                        name,
                        message: message.as_deref().map(local_name_of).unwrap_or_default(),
                    };

                    if local_name == "input" {
                        new_state = ParseState::Input(message)
                    } else {
                        new_state = ParseState::Output(message)
                    }
                }

                _ => trace!(element = local_name, "ignoring element inside operation"),
            },

            Some(ParseState::Binding(ref mut binding)) => match local_name {
                "binding" => {
                    let [transport] = get_attributes(start, ["transport"])?;
                    binding.transport = transport;
                }

                "operation" => {
                    let [name] = get_attributes(start, ["name"])?;

                    new_state = ParseState::BindingOperation(BindingOperation {
                        name: name.unwrap_or_default(),
                        soap_action: None,
                        style: None,
                        input: None,
                        output: None,
                    })
                }

                _ => trace!(element = local_name, "ignoring element inside binding"),
            },

            Some(ParseState::BindingOperation(ref mut operation)) => match local_name {
                "operation" => {
                    let [action, style] = get_attributes(start, ["soapAction", "style"])?;
                    operation.soap_action = action;
                    operation.style = style;
                }

                "input" | "output" => {
                    let [name] = get_attributes(start, ["name"])?;

                    let message = BindingMessage {
                        name,
                        headers: Vec::new(),
                    };

                    if local_name == "input" {
                        new_state = ParseState::BindingInput(message)
                    } else {
                        new_state = ParseState::BindingOutput(message)
                    }
                }

                _ => trace!(element = local_name, "ignoring element inside binding operation"),
            },

            Some(ParseState::BindingInput(ref mut message) | ParseState::BindingOutput(ref mut message)) => {
                if local_name == "header" {
                    let [header, part] = get_attributes(start, ["message", "part"])?;

                    if let Some(header) = header {
                        message.headers.push(SoapHeader {
                            message: local_name_of(&header),
                            part,
                        });
                    }
                }
            }

            Some(ParseState::Service(_)) => match local_name {
                "port" => {
                    let [name, binding] = get_attributes(start, ["name", "binding"])?;

                    new_state = ParseState::Port(Port {
                        name: name.unwrap_or_default(),
                        binding: binding.as_deref().map(local_name_of).unwrap_or_default(),
                        location: None,
                    });
                }

                _ => trace!(element = local_name, "ignoring element inside service"),
            },

            Some(ParseState::Port(ref mut port)) => {
                if local_name == "address" {
                    let [location] = get_attributes(start, ["location"])?;

                    // The first address wins when a port carries several extensions.
                    if port.location.is_none() {
                        port.location = location;
                    }
                }
            }

            Some(
                ParseState::Part(_)
                | ParseState::Documentation(_)
                | ParseState::Input(_)
                | ParseState::Output(_)
                | ParseState::Other(_),
            ) => trace!(element = local_name, "ignoring nested element"),
        }

        stack.extend(state);
        stack.push(new_state);

        Ok(())
    }

    fn element(&self, start: &BytesStart<'_>) -> Result<Element, error::Error> {
        let [name, ty, reference, min_occurs, max_occurs, nillable] = get_attributes(
            start,
            ["name", "type", "ref", "minOccurs", "maxOccurs", "nillable"],
        )?;

        let reference = reference.as_deref().map(local_name_of);
        let name = name.or_else(|| reference.clone()).unwrap_or_default();

        Ok(Element {
            name,
            namespace: self.target(),
            type_name: ty.map(|ty| self.resolve_namespace(&ty)),
            reference,
            min_occurs: min_occurs
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(1),
            max_occurs: max_occurs
                .map(|value| MaxOccurs::parse(&value))
                .unwrap_or_default(),
            nillable: nillable.as_deref() == Some("true"),
            complex: None,
        })
    }

    fn handle_end(&mut self, stack: &mut Vec<ParseState>) -> Result<(), error::Error> {
        self.current_namespaces.pop_scope();

        let finished_state = stack.pop();
        let mut next_state = stack.pop();

        match finished_state {
            Some(ParseState::Definitions | ParseState::Schema) => self.pop_target_namespace(),

            Some(ParseState::Element(element)) => match next_state {
                Some(ParseState::Group {
                    ref mut elements,
                    choice,
                }) => {
                    let mut element = element;
                    if choice {
                        element.min_occurs = 0;
                    }
                    elements.push(element);
                }

                _ => self
                    .definition
                    .schema
                    .items
                    .push(SchemaItem::Element(element)),
            },

            Some(ParseState::ComplexType(ty)) => match next_state {
                Some(ParseState::Element(ref mut element)) => element.complex = Some(Box::new(ty)),

                _ => self
                    .definition
                    .schema
                    .items
                    .push(SchemaItem::ComplexType(ty)),
            },

            Some(ParseState::Content {
                base,
                elements,
                array_item,
            }) => {
                if let Some(ParseState::ComplexType(ref mut ty)) = next_state {
                    ty.base = base;
                    ty.elements.extend(elements);
                    ty.array_item = array_item;
                }
            }

            Some(ParseState::Derivation {
                base,
                extension,
                elements,
                array_item,
            }) => {
                if let Some(ParseState::Content {
                    base: ref mut content_base,
                    elements: ref mut content_elements,
                    array_item: ref mut content_array,
                }) = next_state
                {
                    if extension {
                        *content_base = base;
                    } else if base.as_ref().is_some_and(TypeName::is_xsd) {
                        // Restricting a built-in keeps its value space (simpleContent).
                        *content_base = base.filter(|base| base.name != "Array");
                    }

                    content_elements.extend(elements);
                    *content_array = array_item;
                }
            }

            Some(ParseState::Group {
                elements: group, ..
            }) => match next_state {
                Some(ParseState::ComplexType(ref mut ty)) => ty.elements.extend(group),
                Some(
                    ParseState::Derivation {
                        ref mut elements, ..
                    }
                    | ParseState::Group {
                        ref mut elements, ..
                    },
                ) => elements.extend(group),
                _ => (),
            },

            Some(ParseState::SimpleType(ty)) => match next_state {
                Some(ParseState::Element(ref mut element)) => {
                    if ty.is_enum() {
                        let name = format!("{}{}", enclosing_type_name(stack), upper_first(&element.name));
                        element.type_name = Some(TypeName::new(Some(&ty.namespace), name.clone()));
                        self.definition
                            .schema
                            .items
                            .push(SchemaItem::SimpleType(SimpleType { name, ..ty }));
                    } else {
                        element.type_name = ty.base;
                    }
                }

                _ => self
                    .definition
                    .schema
                    .items
                    .push(SchemaItem::SimpleType(ty)),
            },

            Some(ParseState::Restriction { base, enumerations }) => {
                if let Some(ParseState::SimpleType(ref mut ty)) = next_state {
                    ty.base = base;
                    ty.enumerations = enumerations;
                }
            }

            Some(ParseState::Message(message)) => self.definition.messages.push(message),

            Some(ParseState::Part(part)) => {
                if let Some(ParseState::Message(ref mut message)) = next_state {
                    message.parts.push(part)
                }
            }

            Some(ParseState::PortType(port_type)) => self.definition.port_types.push(port_type),

            Some(ParseState::Operation(operation)) => {
                if let Some(ParseState::PortType(ref mut port_type)) = next_state {
                    port_type.operations.push(operation)
                }
            }

            Some(ParseState::Documentation(text)) => {
                if let Some(ParseState::Operation(ref mut operation)) = next_state {
                    operation.documentation = text
                }
            }

            Some(ParseState::Input(message)) => {
                if let Some(ParseState::Operation(ref mut operation)) = next_state {
                    operation.input.get_or_insert(message);
                }
            }

            Some(ParseState::Output(message)) => {
                if let Some(ParseState::Operation(ref mut operation)) = next_state {
                    operation.output.get_or_insert(message);
                }
            }

            Some(ParseState::Binding(binding)) => self.definition.bindings.push(binding),

            Some(ParseState::BindingOperation(operation)) => {
                if let Some(ParseState::Binding(ref mut binding)) = next_state {
                    binding.operations.push(operation)
                }
            }

            Some(ParseState::BindingInput(message)) => {
                if let Some(ParseState::BindingOperation(ref mut operation)) = next_state {
                    operation.input = Some(message)
                }
            }

            Some(ParseState::BindingOutput(message)) => {
                if let Some(ParseState::BindingOperation(ref mut operation)) = next_state {
                    operation.output = Some(message)
                }
            }

            Some(ParseState::Service(service)) => self.definition.services.push(service),

            Some(ParseState::Port(port)) => {
                if let Some(ParseState::Service(ref mut service)) = next_state {
                    service.ports.push(port)
                }
            }

            _ => (),
        }

        stack.extend(next_state);
        Ok(())
    }

    fn handle_text(
        &mut self,
        stack: &mut [ParseState],
        text: &BytesText<'_>,
    ) -> Result<(), error::Error> {
        if let Some(ParseState::Documentation(ref mut docs)) = stack.last_mut() {
            let text = text.unescape()?;
            let text = text.trim();

            if !text.is_empty() {
                *docs = Some(match docs.take() {
                    Some(existing) => format!("{} {}", existing, text),
                    None => text.to_owned(),
                });
            }
        }

        Ok(())
    }
}

/// The name an anonymous type nested at this depth receives, matching
/// [`name_nested_types`].
fn enclosing_type_name(stack: &[ParseState]) -> String {
    let mut path = String::new();

    for state in stack {
        match state {
            ParseState::ComplexType(ty) if !ty.name.is_empty() => path = ty.name.clone(),
            ParseState::Element(element) => path.push_str(&upper_first(&element.name)),
            _ => (),
        }
    }

    path
}

fn local_name_of(prefixed_name: &str) -> String {
    split_namespaced_name(prefixed_name).1.to_owned()
}

/// Gives anonymous complex types a stable name and flags `ArrayOf` wrappers.
fn name_anonymous_types(schema: &mut Schema) {
    for item in &mut schema.items {
        match item {
            SchemaItem::Element(element) => {
                if let Some(ty) = element.complex.as_mut() {
                    if ty.name.is_empty() {
                        ty.name = element.name.clone();
                    }
                    name_nested_types(ty);
                }
            }

            SchemaItem::ComplexType(ty) => name_nested_types(ty),

            SchemaItem::SimpleType(_) => (),
        }
    }
}

fn name_nested_types(ty: &mut ComplexType) {
    if ty.array_item.is_none()
        && ty.name.starts_with("ArrayOf")
        && ty.base.is_none()
        && ty.elements.len() == 1
        && ty.elements[0].is_array()
    {
        ty.array_item = ty.elements[0].type_name.clone();
    }

    let parent = ty.name.clone();
    for element in &mut ty.elements {
        if let Some(inner) = element.complex.as_mut() {
            if inner.name.is_empty() {
                inner.name = format!("{}{}", parent, upper_first(&element.name));
            }
            name_nested_types(inner);
        }
    }
}

pub fn parse(url: Url) -> Result<Definition, error::Error> {
    Parser::new(Some(url)).parse()
}

pub fn parse_str(xml: &str) -> Result<Definition, error::Error> {
    let mut parser = Parser::new(None);
    parser.parse_xml(None, Reader::from_str(xml))?;
    parser.finish()
}
