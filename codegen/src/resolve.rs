//! Maps message parts and schema elements onto field descriptors.
//!
//! Resolution never fails: references that cannot be followed degrade to
//! [`TypeRef::Opaque`], and complex types without any content produce no
//! field at all.

use lather_wsdl::types::{ComplexType, Definition, Element, Message, MessagePart, TypeName};
use proc_macro2::TokenStream;
use quote::quote;
use tracing::debug;

const MAX_BASE_DEPTH: usize = 32;

/// The built-in XML Schema types a field can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Boolean,
    Float,
    Double,
    Decimal,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Temporal,
    Binary,
    Uri,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(Primitive),
    /// A schema type emitted into the model, by its schema name.
    Named { name: String, is_enum: bool },
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub base: TypeRef,
    pub is_array: bool,
    pub is_optional: bool,
    pub is_enum: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Name on the wire, kept for serialisation metadata.
    pub name: String,
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMessage {
    pub root_element: Option<String>,
    pub namespace: String,
    pub fields: Vec<ResolvedField>,
}

pub struct SchemaResolver<'a> {
    definition: &'a Definition,
}

impl Primitive {
    pub fn from_xsd(name: &str) -> Option<Self> {
        let primitive = match name {
            "string" | "normalizedString" | "token" | "language" | "Name" | "NCName" | "ID"
            | "IDREF" | "IDREFS" | "NMTOKEN" | "NMTOKENS" | "QName" | "NOTATION" | "ENTITY"
            | "ENTITIES" | "guid" | "char" => Primitive::String,
            "boolean" => Primitive::Boolean,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "decimal" => Primitive::Decimal,
            "byte" => Primitive::I8,
            "short" => Primitive::I16,
            "int" => Primitive::I32,
            "long" | "integer" | "negativeInteger" | "nonPositiveInteger" => Primitive::I64,
            "unsignedByte" => Primitive::U8,
            "unsignedShort" => Primitive::U16,
            "unsignedInt" => Primitive::U32,
            "unsignedLong" | "positiveInteger" | "nonNegativeInteger" => Primitive::U64,
            "dateTime" | "date" | "time" | "duration" | "gYear" | "gYearMonth" | "gMonth"
            | "gMonthDay" | "gDay" => Primitive::Temporal,
            "base64Binary" | "hexBinary" => Primitive::Binary,
            "anyURI" => Primitive::Uri,
            _ => return None,
        };

        Some(primitive)
    }

    pub fn rust_type(&self) -> TokenStream {
        match self {
            Primitive::String | Primitive::Temporal | Primitive::Binary | Primitive::Uri => {
                quote! { String }
            }
            Primitive::Boolean => quote! { bool },
            Primitive::Float => quote! { f32 },
            Primitive::Double | Primitive::Decimal => quote! { f64 },
            Primitive::I8 => quote! { i8 },
            Primitive::I16 => quote! { i16 },
            Primitive::I32 => quote! { i32 },
            Primitive::I64 => quote! { i64 },
            Primitive::U8 => quote! { u8 },
            Primitive::U16 => quote! { u16 },
            Primitive::U32 => quote! { u32 },
            Primitive::U64 => quote! { u64 },
        }
    }
}

impl FieldType {
    pub fn new(base: TypeRef) -> Self {
        let is_enum = matches!(base, TypeRef::Named { is_enum: true, .. });

        Self {
            base,
            is_array: false,
            is_optional: false,
            is_enum,
        }
    }

    fn with_occurs(mut self, element: &Element) -> Self {
        self.is_array = element.is_array();
        self.is_optional = element.is_optional();
        self
    }
}

impl ResolvedField {
    fn new<S: Into<String>>(name: S, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl<'a> SchemaResolver<'a> {
    pub fn new(definition: &'a Definition) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &'a Definition {
        self.definition
    }

    /// User types are matched by local name first, then the primitive table.
    pub fn resolve_type(&self, name: &TypeName) -> TypeRef {
        self.resolve_type_at(name, 0)
    }

    fn resolve_type_at(&self, name: &TypeName, depth: usize) -> TypeRef {
        let schema = &self.definition.schema;

        if !name.is_xsd() && depth < MAX_BASE_DEPTH {
            if let Some(simple) = schema.simple_type(&name.name) {
                return if simple.is_enum() {
                    TypeRef::Named {
                        name: simple.name.clone(),
                        is_enum: true,
                    }
                } else {
                    simple
                        .base
                        .as_ref()
                        .map(|base| self.resolve_type_at(base, depth + 1))
                        .unwrap_or(TypeRef::Primitive(Primitive::String))
                };
            }

            if let Some(complex) = schema.complex_type(&name.name) {
                return TypeRef::Named {
                    name: complex.name.clone(),
                    is_enum: false,
                };
            }
        }

        match Primitive::from_xsd(&name.name) {
            Some(primitive) => TypeRef::Primitive(primitive),
            None => {
                debug!(r#type = %name.name, "unresolved type, using opaque fallback");
                TypeRef::Opaque
            }
        }
    }

    /// The complex type an element is defined by, inline or by reference.
    pub fn complex_type_of<'c>(&'c self, element: &'c Element) -> Option<&'c ComplexType> {
        match &element.complex {
            Some(complex) => Some(&**complex),
            None => element
                .type_name
                .as_ref()
                .filter(|name| !name.is_xsd())
                .and_then(|name| self.definition.schema.complex_type(&name.name)),
        }
    }

    fn base_type(&self, complex: &ComplexType) -> Option<&'a ComplexType> {
        complex
            .base
            .as_ref()
            .filter(|base| !base.is_xsd())
            .and_then(|base| self.definition.schema.complex_type(&base.name))
    }

    /// The primitive a simple-content type extends, if any.
    pub fn text_base(&self, complex: &ComplexType) -> Option<Primitive> {
        let mut current = complex;

        for _ in 0..MAX_BASE_DEPTH {
            let base = current.base.as_ref()?;

            match self.resolve_type(base) {
                TypeRef::Primitive(primitive) => return Some(primitive),
                TypeRef::Named { is_enum: true, .. } => return Some(Primitive::String),
                _ => current = self.base_type(current)?,
            }
        }

        None
    }

    /// Child elements including those inherited from complex base types, base first.
    pub fn all_children<'c>(&'c self, complex: &'c ComplexType) -> Vec<&'c Element> {
        let mut chain = vec![complex];

        while let Some(base) = chain.last().and_then(|last| self.base_type(last)) {
            if chain.len() >= MAX_BASE_DEPTH || chain.iter().any(|seen| std::ptr::eq(*seen, base)) {
                break;
            }
            chain.push(base);
        }

        chain
            .into_iter()
            .rev()
            .flat_map(|ty| ty.elements.iter())
            .collect()
    }

    /// An array wrapper is as empty as the complex type it holds.
    pub fn is_empty_complex(&self, complex: &ComplexType) -> bool {
        self.is_empty_complex_at(complex, 0)
    }

    fn is_empty_complex_at(&self, complex: &ComplexType, depth: usize) -> bool {
        match &complex.array_item {
            Some(item) => {
                depth < MAX_BASE_DEPTH
                    && !item.is_xsd()
                    && self
                        .definition
                        .schema
                        .complex_type(&item.name)
                        .is_some_and(|item| self.is_empty_complex_at(item, depth + 1))
            }
            None => self.all_children(complex).is_empty() && self.text_base(complex).is_none(),
        }
    }

    fn referenced<'c>(&'c self, element: &'c Element) -> &'c Element {
        element
            .reference
            .as_deref()
            .and_then(|name| self.definition.schema.element(name))
            .unwrap_or(element)
    }

    /// `None` when the element contributes no field (empty complex type).
    pub fn resolve_element(&self, element: &Element) -> Option<FieldType> {
        let target = self.referenced(element);

        let base = if let Some(complex) = &target.complex {
            if self.is_empty_complex(complex) {
                return None;
            }

            TypeRef::Named {
                name: complex.name.clone(),
                is_enum: false,
            }
        } else if let Some(name) = &target.type_name {
            if let Some(complex) = self.complex_type_of(target) {
                if self.is_empty_complex(complex) {
                    return None;
                }
            }

            self.resolve_type(name)
        } else {
            TypeRef::Opaque
        };

        Some(FieldType::new(base).with_occurs(element))
    }

    fn resolve_children(&self, complex: &ComplexType) -> Vec<ResolvedField> {
        let mut fields = Vec::new();

        if let Some(primitive) = self.text_base(complex) {
            fields.push(ResolvedField::new(
                "$text",
                FieldType::new(TypeRef::Primitive(primitive)),
            ));
        }

        fields.extend(self.all_children(complex).into_iter().filter_map(|child| {
            self.resolve_element(child)
                .map(|ty| ResolvedField::new(child.name.clone(), ty))
        }));

        fields
    }

    /// Fields of a part, flattening a complex element one level.
    pub fn resolve_part(&self, part: &MessagePart) -> Vec<ResolvedField> {
        if let Some(element_name) = &part.element {
            let element = match self.definition.schema.element(element_name) {
                Some(element) => self.referenced(element),
                None => {
                    debug!(part = %part.name, element = %element_name, "unresolved element, using opaque fallback");
                    return vec![ResolvedField::new(
                        part.name.clone(),
                        FieldType::new(TypeRef::Opaque),
                    )];
                }
            };

            return match self.complex_type_of(element) {
                Some(complex) if complex.is_array() => self
                    .resolve_element(element)
                    .map(|ty| vec![ResolvedField::new(element.name.clone(), ty)])
                    .unwrap_or_default(),
                Some(complex) => self.resolve_children(complex),
                None => self
                    .resolve_element(element)
                    .map(|ty| vec![ResolvedField::new(element.name.clone(), ty)])
                    .unwrap_or_default(),
            };
        }

        if let Some(type_name) = &part.type_name {
            if let Some(complex) = (!type_name.is_xsd())
                .then(|| self.definition.schema.complex_type(&type_name.name))
                .flatten()
            {
                if self.is_empty_complex(complex) {
                    return Vec::new();
                }
            }

            return vec![ResolvedField::new(
                part.name.clone(),
                FieldType::new(self.resolve_type(type_name)),
            )];
        }

        vec![ResolvedField::new(
            part.name.clone(),
            FieldType::new(TypeRef::Opaque),
        )]
    }

    pub fn resolve_message(&self, message: &Message) -> ResolvedMessage {
        let element = message
            .parts
            .iter()
            .find_map(|part| part.element.as_deref())
            .and_then(|name| self.definition.schema.element(name));

        ResolvedMessage {
            root_element: element.map(|element| element.name.clone()),
            namespace: element
                .map(|element| element.namespace.clone())
                .filter(|namespace| !namespace.is_empty())
                .unwrap_or_else(|| self.definition.target_namespace.clone()),
            fields: message
                .parts
                .iter()
                .flat_map(|part| self.resolve_part(part))
                .collect(),
        }
    }

    /// Own children only; inherited ones live in the embedded base shape.
    pub fn complex_fields(&self, complex: &ComplexType) -> Vec<ResolvedField> {
        complex
            .elements
            .iter()
            .filter_map(|child| {
                self.resolve_element(child)
                    .map(|ty| ResolvedField::new(child.name.clone(), ty))
            })
            .collect()
    }

    /// A complex base type embedded into a derived shape.
    pub fn embedded_base(&self, complex: &ComplexType) -> Option<&'a ComplexType> {
        self.base_type(complex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use lather_wsdl::types::{MaxOccurs, SchemaItem, SimpleType};

    #[test]
    fn primitive_table() {
        assert_eq!(Primitive::from_xsd("int"), Some(Primitive::I32));
        assert_eq!(Primitive::from_xsd("dateTime"), Some(Primitive::Temporal));
        assert_eq!(Primitive::from_xsd("base64Binary"), Some(Primitive::Binary));
        assert_eq!(Primitive::from_xsd("anyURI"), Some(Primitive::Uri));
        assert_eq!(Primitive::from_xsd("decimal"), Some(Primitive::Decimal));
        assert_eq!(Primitive::from_xsd("anyType"), None);
    }

    #[test]
    fn flattens_children_with_occurs() {
        let definition = make_definition(vec![SchemaItem::Element(make_wrapper(
            "Search",
            vec![
                make_element("query", "string"),
                make_element("tags", "string").with_occurs(1, MaxOccurs::Unbounded),
                make_element("limit", "int").with_occurs(0, MaxOccurs::Bounded(1)),
            ],
        ))]);
        let resolver = SchemaResolver::new(&definition);

        let fields = resolver.resolve_part(&make_element_part("parameters", "Search"));

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "query");
        assert_eq!(fields[0].ty.base, TypeRef::Primitive(Primitive::String));
        assert!(fields[1].ty.is_array);
        assert!(!fields[1].ty.is_optional);
        assert!(fields[2].ty.is_optional);
        assert!(!fields[2].ty.is_array);
    }

    #[test]
    fn empty_complex_types_yield_no_fields() {
        let definition = make_definition(vec![
            SchemaItem::Element(make_wrapper("Ping", vec![])),
            SchemaItem::ComplexType(ComplexType::new("Nothing", TNS)),
            SchemaItem::Element(make_wrapper(
                "Holder",
                vec![make_element("nothing", "Nothing").with_type(TypeName::new(Some(TNS), "Nothing"))],
            )),
        ]);
        let resolver = SchemaResolver::new(&definition);

        assert!(resolver.resolve_part(&make_element_part("parameters", "Ping")).is_empty());
        assert!(resolver.resolve_part(&make_element_part("parameters", "Holder")).is_empty());
        assert!(resolver
            .resolve_part(&make_type_part("value", TypeName::new(Some(TNS), "Nothing")))
            .is_empty());
    }

    #[test]
    fn arrays_of_empty_types_are_empty() {
        let mut nothing = ComplexType::new("ArrayOfNothing", TNS);
        nothing.array_item = Some(TypeName::new(Some(TNS), "Nothing"));
        let mut ints = ComplexType::new("ArrayOfInt", TNS);
        ints.array_item = Some(TypeName::xsd("int"));

        let definition = make_definition(vec![
            SchemaItem::ComplexType(ComplexType::new("Nothing", TNS)),
            SchemaItem::ComplexType(nothing),
            SchemaItem::ComplexType(ints),
            SchemaItem::Element(make_wrapper(
                "Holder",
                vec![make_element("items", "ArrayOfNothing")
                    .with_type(TypeName::new(Some(TNS), "ArrayOfNothing"))],
            )),
        ]);
        let resolver = SchemaResolver::new(&definition);
        let schema = &definition.schema;

        assert!(resolver.is_empty_complex(schema.complex_type("ArrayOfNothing").unwrap()));
        assert!(!resolver.is_empty_complex(schema.complex_type("ArrayOfInt").unwrap()));
        assert!(resolver.resolve_part(&make_element_part("parameters", "Holder")).is_empty());
    }

    #[test]
    fn inherited_children_come_first() {
        let base = ComplexType::new("Base", TNS).with_elements(vec![make_element("id", "int")]);
        let mut derived =
            ComplexType::new("Derived", TNS).with_elements(vec![make_element("label", "string")]);
        derived.base = Some(TypeName::new(Some(TNS), "Base"));

        let definition = make_definition(vec![
            SchemaItem::ComplexType(base),
            SchemaItem::ComplexType(derived),
            SchemaItem::Element(
                Element::new("Item", TNS).with_type(TypeName::new(Some(TNS), "Derived")),
            ),
        ]);
        let resolver = SchemaResolver::new(&definition);

        let names = resolver
            .resolve_part(&make_element_part("parameters", "Item"))
            .into_iter()
            .map(|field| field.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["id", "label"]);

        let derived = definition.schema.complex_type("Derived").unwrap();
        assert_eq!(resolver.complex_fields(derived).len(), 1);
        assert_eq!(resolver.embedded_base(derived).map(|base| base.name.as_str()), Some("Base"));
    }

    #[test]
    fn enums_and_named_types_keep_their_names() {
        let mode = SimpleType {
            name: "Mode".into(),
            namespace: TNS.into(),
            base: Some(TypeName::xsd("string")),
            enumerations: vec!["Fast".into()],
        };
        let code = SimpleType {
            name: "Code".into(),
            namespace: TNS.into(),
            base: Some(TypeName::xsd("int")),
            enumerations: vec![],
        };
        let address = ComplexType::new("Address", TNS)
            .with_elements(vec![make_element("street", "string")]);

        let definition = make_definition(vec![
            SchemaItem::SimpleType(mode),
            SchemaItem::SimpleType(code),
            SchemaItem::ComplexType(address),
        ]);
        let resolver = SchemaResolver::new(&definition);

        let mode = FieldType::new(resolver.resolve_type(&TypeName::new(Some(TNS), "Mode")));
        assert!(mode.is_enum);
        assert_eq!(
            mode.base,
            TypeRef::Named {
                name: "Mode".into(),
                is_enum: true
            }
        );

        assert_eq!(
            resolver.resolve_type(&TypeName::new(Some(TNS), "Code")),
            TypeRef::Primitive(Primitive::I32)
        );
        assert_eq!(
            resolver.resolve_type(&TypeName::new(Some(TNS), "Address")),
            TypeRef::Named {
                name: "Address".into(),
                is_enum: false
            }
        );
    }

    #[test]
    fn missing_references_degrade_to_opaque() {
        let definition = make_definition(vec![]);
        let resolver = SchemaResolver::new(&definition);

        let fields = resolver.resolve_part(&make_element_part("parameters", "Missing"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].ty.base, TypeRef::Opaque);

        let fields = resolver.resolve_part(&MessagePart {
            name: "blob".into(),
            element: None,
            type_name: None,
        });
        assert_eq!(fields[0].name, "blob");
        assert_eq!(fields[0].ty.base, TypeRef::Opaque);

        assert_eq!(
            resolver.resolve_type(&TypeName::new(Some("urn:other"), "Unknown")),
            TypeRef::Opaque
        );
    }

    #[test]
    fn element_refs_resolve_through_top_level_elements() {
        let definition = make_definition(vec![
            SchemaItem::Element(make_element("Token", "string")),
            SchemaItem::Element(make_wrapper(
                "Login",
                vec![Element {
                    reference: Some("Token".into()),
                    ..Element::new("Token", TNS).with_occurs(0, MaxOccurs::Bounded(1))
                }],
            )),
        ]);
        let resolver = SchemaResolver::new(&definition);

        let fields = resolver.resolve_part(&make_element_part("parameters", "Login"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].ty.base, TypeRef::Primitive(Primitive::String));
        assert!(fields[0].ty.is_optional);
    }

    #[test]
    fn message_root_and_namespace() {
        let mut definition = make_definition(vec![SchemaItem::Element(make_wrapper(
            "Add",
            vec![make_element("a", "int")],
        ))]);
        definition.messages.push(make_message("AddSoapIn", "Add"));
        let resolver = SchemaResolver::new(&definition);

        let message = resolver.resolve_message(definition.message("AddSoapIn").unwrap());
        assert_eq!(message.root_element.as_deref(), Some("Add"));
        assert_eq!(message.namespace, TNS);
        assert_eq!(message.fields.len(), 1);
    }
}
