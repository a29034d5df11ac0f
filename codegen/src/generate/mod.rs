//! Artifact generators and the orchestrator that runs them in order.
//!
//! Every generator reads the same [`GenerationContext`], so the names the
//! model stage emits are exactly the names the interface and client stages
//! refer to.

use lather_wsdl::types::{Definition, Operation, PortType};
use proc_macro2::{Ident, TokenStream};
use regex::Regex;
use std::{collections::BTreeSet, sync::OnceLock};
use tracing::{debug, info};

use super::{
    binding::{BindingIndex, HeaderParam},
    error::Error,
    naming::{field_ident, to_pascal_case, type_ident, NameTable, OperationNames},
    options::GeneratorOptions,
    resolve::{ResolvedMessage, SchemaResolver},
};

mod client;
mod interface;
mod model;
mod runtime;

/// Modules of the `model` category that are not port types.
const RESERVED_MODULES: [&str; 2] = ["types", "headers"];

pub trait Codegen {
    fn codegen(&self, context: &GenerationContext<'_>) -> TokenStream;
}

fn codegen_all<'i, T: Codegen + 'i>(
    all: impl IntoIterator<Item = &'i T>,
    context: &GenerationContext<'_>,
) -> Vec<TokenStream> {
    all.into_iter().map(|item| item.codegen(context)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Model,
    Interface,
    Client,
    Runtime,
}

/// One generated module, `{category}::{module}`.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub category: Category,
    pub module: String,
    pub tokens: TokenStream,
}

/// An eligible operation with everything the generators need to emit it.
#[derive(Debug)]
pub struct OperationPlan<'a> {
    pub operation: &'a Operation,
    pub names: OperationNames,
    pub input: ResolvedMessage,
    /// `None` for one-way operations.
    pub output: Option<ResolvedMessage>,
    pub headers: Vec<HeaderParam>,
}

#[derive(Debug)]
pub struct PortTypePlan<'a> {
    pub port_type: &'a PortType,
    pub module: Ident,
    pub operations: Vec<OperationPlan<'a>>,
}

/// Everything derived from one immutable definition for one run.
pub struct GenerationContext<'a> {
    pub definition: &'a Definition,
    pub options: &'a GeneratorOptions,
    pub resolver: SchemaResolver<'a>,
    pub bindings: BindingIndex,
    pub port_types: Vec<PortTypePlan<'a>>,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Model,
        Category::Interface,
        Category::Client,
        Category::Runtime,
    ];

    pub fn dir(&self) -> &'static str {
        match self {
            Category::Model => "model",
            Category::Interface => "interface",
            Category::Client => "client",
            Category::Runtime => "runtime",
        }
    }
}

impl Artifact {
    pub fn new<S: Into<String>>(category: Category, module: S, tokens: TokenStream) -> Self {
        Self {
            category,
            module: module.into(),
            tokens,
        }
    }

    pub fn path(&self) -> String {
        format!("{}::{}", self.category.dir(), self.module)
    }
}

impl OperationPlan<'_> {
    pub fn has_request(&self) -> bool {
        !self.input.fields.is_empty()
    }

    pub fn has_response(&self) -> bool {
        self.output
            .as_ref()
            .is_some_and(|output| !output.fields.is_empty())
    }

    /// Root element of the request body.
    pub fn request_element(&self) -> &str {
        self.input
            .root_element
            .as_deref()
            .unwrap_or(&self.operation.name)
    }
}

impl PortTypePlan<'_> {
    pub fn trait_ident(&self) -> Ident {
        type_ident(&to_pascal_case(&self.port_type.name))
    }
}

/// A snake_case identifier not yet in `used`.
pub fn unique_ident(name: &str, used: &mut BTreeSet<String>) -> Ident {
    let base = field_ident(name).to_string();
    let mut candidate = base.clone();
    let mut index = 2;

    while !used.insert(candidate.clone()) {
        candidate = format!("{}{}", base, index);
        index += 1;
    }

    field_ident(&candidate)
}

impl<'a> GenerationContext<'a> {
    pub fn new(definition: &'a Definition, options: &'a GeneratorOptions) -> Self {
        let resolver = SchemaResolver::new(definition);
        let bindings = BindingIndex::build(definition, &resolver, options.header_policy.as_ref());
        let names = NameTable::build(definition);

        let mut context = Self {
            definition,
            options,
            resolver,
            bindings,
            port_types: Vec::new(),
        };

        context.port_types = context.plan_port_types(&names);
        context
    }

    fn plan_port_types(&self, names: &NameTable) -> Vec<PortTypePlan<'a>> {
        let mut used = RESERVED_MODULES.map(String::from).into_iter().collect();
        let mut seen = BTreeSet::new();
        let mut plans = Vec::new();

        for port_type in &self.definition.port_types {
            if !seen.insert(port_type.name.as_str()) {
                continue;
            }

            let operations = port_type
                .operations
                .iter()
                .enumerate()
                .filter_map(|(index, operation)| {
                    let names = names.names(&port_type.name, index)?;
                    self.plan_operation(port_type, operation, names)
                })
                .collect();

            plans.push(PortTypePlan {
                port_type,
                module: unique_ident(&port_type.name, &mut used),
                operations,
            });
        }

        plans
    }

    fn plan_operation(
        &self,
        port_type: &PortType,
        operation: &'a Operation,
        names: &OperationNames,
    ) -> Option<OperationPlan<'a>> {
        let input = self.definition.message(&operation.input.as_ref()?.message)?;

        let output = match &operation.output {
            Some(output) => Some(
                self.resolver
                    .resolve_message(self.definition.message(&output.message)?),
            ),
            None => None,
        };

        Some(OperationPlan {
            operation,
            names: names.clone(),
            input: self.resolver.resolve_message(input),
            output,
            headers: self
                .bindings
                .headers_for_port_type(&port_type.name, operation)
                .to_vec(),
        })
    }

    pub fn port_type(&self, name: &str) -> Option<&PortTypePlan<'a>> {
        self.port_types
            .iter()
            .find(|plan| plan.port_type.name == name)
    }
}

fn namespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid regex"))
}

/// Rejects runs that cannot produce a usable crate before any work is done.
pub fn validate(definition: &Definition, options: &GeneratorOptions) -> Result<(), Error> {
    if options.namespace.is_empty() {
        return Err(Error::EmptyNamespace);
    }

    if !namespace_pattern().is_match(&options.namespace) {
        return Err(Error::InvalidNamespace(options.namespace.clone()));
    }

    if definition.is_empty() {
        return Err(Error::EmptyDefinition);
    }

    Ok(())
}

/// Runs every generator in order: model, interfaces, clients, runtime.
pub fn generate(definition: &Definition, options: &GeneratorOptions) -> Result<Vec<Artifact>, Error> {
    validate(definition, options)?;

    let context = GenerationContext::new(definition, options);
    let mut artifacts = model::generate(&context);
    artifacts.extend(interface::generate(&context));
    artifacts.extend(client::generate(&context));
    artifacts.extend(runtime::generate(options.transport)?);

    for artifact in &artifacts {
        debug!(module = %artifact.path(), "generated module");
    }

    info!(
        namespace = %options.namespace,
        modules = artifacts.len(),
        "generation finished"
    );

    Ok(artifacts)
}
