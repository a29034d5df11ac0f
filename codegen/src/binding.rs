//! SOAP action lookup and header classification per binding.

use lather_wsdl::types::{Binding, BindingOperation, Definition, Operation, SoapHeader};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};
use tracing::debug;

use super::{
    naming::to_pascal_case,
    resolve::{ResolvedField, SchemaResolver},
};

/// Decides whether a header block is the well-known authentication header
/// shared by every operation that sends it.
pub trait HeaderPolicy: fmt::Debug {
    fn is_shared_auth(&self, header: &HeaderCandidate<'_>) -> bool;
}

/// A resolved header message offered to a [`HeaderPolicy`].
#[derive(Debug)]
pub struct HeaderCandidate<'a> {
    pub message: &'a str,
    pub element: Option<&'a str>,
    pub fields: &'a [ResolvedField],
}

/// Matches marker names case-insensitively against the header message, its
/// root element and every resolved field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNamePolicy {
    markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderParam {
    SharedAuth,
    Dedicated { message: String, type_name: String },
}

/// Shape of a header block emitted into `model::headers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderShape {
    pub message: String,
    pub type_name: String,
    pub root_element: String,
    pub namespace: String,
    pub fields: Vec<ResolvedField>,
}

#[derive(Debug, Default)]
pub struct BoundOperations {
    by_name: BTreeMap<String, Option<String>>,
    by_input: BTreeMap<(String, String), Option<String>>,
    headers_by_name: BTreeMap<String, Vec<HeaderParam>>,
    headers_by_input: BTreeMap<(String, String), Vec<HeaderParam>>,
}

#[derive(Debug, Default)]
pub struct BindingIndex {
    bindings: BTreeMap<String, BoundOperations>,
    first_binding: BTreeMap<String, String>,
    shared_auth: Option<HeaderShape>,
    dedicated: Vec<HeaderShape>,
}

impl Default for ReservedNamePolicy {
    fn default() -> Self {
        Self::new(["AuthHeader"])
    }
}

impl ReservedNamePolicy {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|marker| marker.into().to_lowercase())
                .filter(|marker| !marker.is_empty())
                .collect(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.markers.iter().any(|marker| name.contains(marker))
    }
}

impl HeaderPolicy for ReservedNamePolicy {
    fn is_shared_auth(&self, header: &HeaderCandidate<'_>) -> bool {
        self.matches(header.message)
            || header.element.is_some_and(|element| self.matches(element))
            || header.fields.iter().any(|field| self.matches(&field.name))
    }
}

impl BoundOperations {
    fn action(&self, operation: &Operation) -> Option<&str> {
        operation
            .input
            .as_ref()
            .and_then(|input| input.name.clone())
            .and_then(|input| self.by_input.get(&(operation.name.clone(), input)))
            .or_else(|| self.by_name.get(&operation.name))
            .and_then(|action| action.as_deref())
    }

    fn headers(&self, operation: &Operation) -> &[HeaderParam] {
        operation
            .input
            .as_ref()
            .and_then(|input| input.name.clone())
            .and_then(|input| self.headers_by_input.get(&(operation.name.clone(), input)))
            .or_else(|| self.headers_by_name.get(&operation.name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl BindingIndex {
    pub fn build(
        definition: &Definition,
        resolver: &SchemaResolver<'_>,
        policy: &dyn HeaderPolicy,
    ) -> Self {
        let mut index = Self::default();
        let mut type_names = BTreeSet::new();

        for binding in &definition.bindings {
            if index.bindings.contains_key(&binding.name) {
                debug!(binding = %binding.name, "duplicate binding ignored");
                continue;
            }

            index
                .first_binding
                .entry(binding.port_type.clone())
                .or_insert_with(|| binding.name.clone());

            let bound = index.bind(binding, definition, resolver, policy, &mut type_names);
            index.bindings.insert(binding.name.clone(), bound);
        }

        index
    }

    fn bind(
        &mut self,
        binding: &Binding,
        definition: &Definition,
        resolver: &SchemaResolver<'_>,
        policy: &dyn HeaderPolicy,
        type_names: &mut BTreeSet<String>,
    ) -> BoundOperations {
        let mut bound = BoundOperations::default();

        for operation in &binding.operations {
            let headers = self.classify(operation, definition, resolver, policy, type_names);

            bound
                .by_name
                .entry(operation.name.clone())
                .or_insert_with(|| operation.soap_action.clone());
            bound
                .headers_by_name
                .entry(operation.name.clone())
                .or_insert_with(|| headers.clone());

            if let Some(input) = operation.input.as_ref().and_then(|input| input.name.clone()) {
                let key = (operation.name.clone(), input);
                bound
                    .by_input
                    .entry(key.clone())
                    .or_insert_with(|| operation.soap_action.clone());
                bound.headers_by_input.entry(key).or_insert(headers);
            }
        }

        bound
    }

    fn classify(
        &mut self,
        operation: &BindingOperation,
        definition: &Definition,
        resolver: &SchemaResolver<'_>,
        policy: &dyn HeaderPolicy,
        type_names: &mut BTreeSet<String>,
    ) -> Vec<HeaderParam> {
        let headers = match &operation.input {
            Some(input) => &input.headers,
            None => return Vec::new(),
        };

        let mut params = Vec::new();

        for header in headers {
            let shape = match header_shape(header, definition, resolver) {
                Some(shape) => shape,
                None => {
                    debug!(operation = %operation.name, message = %header.message, "unresolved header message skipped");
                    continue;
                }
            };

            let candidate = HeaderCandidate {
                message: &shape.message,
                element: Some(shape.root_element.as_str()),
                fields: &shape.fields,
            };

            let param = if policy.is_shared_auth(&candidate) {
                if self.shared_auth.is_none() {
                    let mut shape = shape;
                    shape.type_name = unique_name(&to_pascal_case(&shape.root_element), type_names);
                    self.shared_auth = Some(shape);
                }

                HeaderParam::SharedAuth
            } else {
                let type_name = match self
                    .dedicated
                    .iter()
                    .find(|existing| existing.message == shape.message)
                {
                    Some(existing) => existing.type_name.clone(),
                    None => {
                        let mut shape = shape;
                        shape.type_name = unique_name(&to_pascal_case(&shape.message), type_names);
                        let type_name = shape.type_name.clone();
                        self.dedicated.push(shape);
                        type_name
                    }
                };

                HeaderParam::Dedicated {
                    message: header.message.clone(),
                    type_name,
                }
            };

            if !params.contains(&param) {
                params.push(param);
            }
        }

        params
    }

    pub fn bound(&self, binding: &str) -> Option<&BoundOperations> {
        self.bindings.get(binding)
    }

    /// The action for `operation` as bound by `binding`: the (name, input
    /// name) key wins over the bare operation name.
    pub fn soap_action(&self, binding: &str, operation: &Operation) -> Option<&str> {
        self.bound(binding)?.action(operation)
    }

    /// Header requirement of the first binding implementing `port_type`.
    pub fn headers_for_port_type(&self, port_type: &str, operation: &Operation) -> &[HeaderParam] {
        self.first_binding
            .get(port_type)
            .and_then(|binding| self.bound(binding))
            .map(|bound| bound.headers(operation))
            .unwrap_or_default()
    }

    pub fn shared_auth(&self) -> Option<&HeaderShape> {
        self.shared_auth.as_ref()
    }

    pub fn dedicated(&self) -> &[HeaderShape] {
        &self.dedicated
    }
}

fn header_shape(
    header: &SoapHeader,
    definition: &Definition,
    resolver: &SchemaResolver<'_>,
) -> Option<HeaderShape> {
    let message = definition.message(&header.message)?;

    let parts = message
        .parts
        .iter()
        .filter(|part| header.part.as_ref().map_or(true, |name| &part.name == name))
        .collect::<Vec<_>>();
    let first = parts.first()?;

    let element = first
        .element
        .as_deref()
        .and_then(|name| definition.schema.element(name));

    Some(HeaderShape {
        message: message.name.clone(),
        type_name: String::new(),
        root_element: first
            .element
            .clone()
            .unwrap_or_else(|| first.name.clone()),
        namespace: element
            .map(|element| element.namespace.clone())
            .filter(|namespace| !namespace.is_empty())
            .unwrap_or_else(|| definition.target_namespace.clone()),
        fields: parts
            .into_iter()
            .flat_map(|part| resolver.resolve_part(part))
            .collect(),
    })
}

fn unique_name(base: &str, used: &mut BTreeSet<String>) -> String {
    let mut name = base.to_owned();
    let mut index = 2;

    while !used.insert(name.clone()) {
        name = format!("{}{}", base, index);
        index += 1;
    }

    name
}
