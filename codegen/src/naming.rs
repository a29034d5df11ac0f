//! Identifier helpers and the per-port-type operation name table.
//!
//! Operation names repeat freely in service descriptions. [`NameTable`]
//! assigns each eligible operation a stem that is unique within its port
//! type; the method, request and response names all derive from it.

use lather_wsdl::types::{Definition, Operation, PortType};
use proc_macro2::Ident;
use quote::format_ident;
use regex::Regex;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::OnceLock,
};
use tracing::debug;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Trailing transport markers dropped from a `With…` suffix, longest first.
const TRANSPORT_MARKERS: &[&str] = &[
    "Soap12In",
    "Soap12Out",
    "SoapIn",
    "SoapOut",
    "HttpGetIn",
    "HttpGetOut",
    "HttpPostIn",
    "HttpPostOut",
    "In",
    "Out",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationNames {
    pub stem: String,
    pub method: String,
    pub request: String,
    pub response: String,
}

/// Names per port type, indexed like the port type's operations; `None`
/// marks an operation that is skipped.
#[derive(Debug, Default)]
pub struct NameTable {
    port_types: BTreeMap<String, Vec<Option<OperationNames>>>,
}

#[derive(Default)]
struct Assignment {
    occurrences: BTreeMap<String, usize>,
    methods: BTreeSet<String>,
    types: BTreeSet<String>,
    names: Vec<Option<OperationNames>>,
}

fn with_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"With[A-Z0-9]").expect("valid regex"))
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"V\d+").expect("valid regex"))
}

pub fn to_pascal_case(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn to_snake_case(name: &str) -> String {
    let chars = name.chars().collect::<Vec<_>>();
    let mut result = String::new();

    for (index, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }

        if ch.is_uppercase() {
            let previous = index.checked_sub(1).map(|previous| chars[previous]);
            let next = chars.get(index + 1);

            let boundary = match previous {
                Some(previous) if previous.is_lowercase() || previous.is_ascii_digit() => true,
                Some(previous) if previous.is_uppercase() => next.is_some_and(|next| next.is_lowercase()),
                _ => false,
            };

            if boundary && !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }

            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }

    result.trim_end_matches('_').to_owned()
}

fn sanitize(name: &str, fallback: &str, digit_prefix: &str) -> String {
    let mut name = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect::<String>();

    if name.is_empty() || name.chars().all(|c| c == '_') {
        name = fallback.to_owned();
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, digit_prefix);
    }

    if KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }

    name
}

/// A snake_case identifier for a field, parameter, method or module.
pub fn field_ident(name: &str) -> Ident {
    format_ident!("{}", sanitize(&to_snake_case(name), "value", "_"))
}

/// An identifier for an already PascalCase type name.
pub fn type_ident(name: &str) -> Ident {
    format_ident!("{}", sanitize(name, "Type", "T"))
}

/// The model type name of a schema type.
pub fn schema_type_ident(name: &str) -> Ident {
    type_ident(&to_pascal_case(name))
}

pub fn variant_ident(value: &str) -> Ident {
    format_ident!("{}", sanitize(&to_pascal_case(value), "Empty", "V"))
}

/// An operation is generated when its input is declared and resolves, and
/// its output, if declared, resolves too. No output means a one-way call.
pub fn is_eligible(definition: &Definition, operation: &Operation) -> bool {
    let input = operation
        .input
        .as_ref()
        .is_some_and(|input| definition.message(&input.message).is_some());

    let output = operation
        .output
        .as_ref()
        .map_or(true, |output| definition.message(&output.message).is_some());

    input && output
}

/// The `With…` suffix of a message name, without its transport marker.
pub fn with_marker(message: &str) -> Option<String> {
    let start = with_pattern().find(message)?.start();
    let mut marker = &message[start..];

    if let Some(stripped) = TRANSPORT_MARKERS
        .iter()
        .find_map(|transport| marker.strip_suffix(*transport))
    {
        marker = stripped;
    }

    (marker.len() > "With".len()).then(|| marker.to_owned())
}

/// Removes version tokens the marker shares with the operation name.
fn strip_shared_version(marker: &str, operation: &str) -> Option<String> {
    let shared = version_pattern()
        .find_iter(marker)
        .map(|token| token.as_str())
        .filter(|token| operation.contains(*token))
        .collect::<Vec<_>>();

    if shared.is_empty() {
        return None;
    }

    let stripped = shared
        .iter()
        .fold(marker.to_owned(), |marker, token| marker.replacen(*token, "", 1));

    Some(stripped).filter(|stripped| stripped.len() > "With".len())
}

fn suffix_candidates(operation: &Operation) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(marker) = operation
        .input
        .as_ref()
        .and_then(|input| with_marker(&input.message))
    {
        if operation.name.contains(&marker) {
            candidates.push(String::new());
        } else if let Some(stripped) = strip_shared_version(&marker, &operation.name) {
            candidates.push(stripped);
        } else {
            candidates.push(marker);
        }
    }

    let own_name = operation
        .input
        .as_ref()
        .and_then(|input| input.name.as_deref())
        .or_else(|| operation.output.as_ref().and_then(|output| output.name.as_deref()));

    if let Some(name) = own_name {
        let name = to_pascal_case(name);
        if !name.is_empty() {
            candidates.push(format!("_{}", name));
        }
    }

    candidates
}

impl OperationNames {
    fn new(stem: String) -> Self {
        Self {
            method: to_snake_case(&stem),
            request: format!("{}Request", stem),
            response: format!("{}Response", stem),
            stem,
        }
    }
}

impl Assignment {
    fn accept(&mut self, stem: String) -> Option<OperationNames> {
        let names = OperationNames::new(stem);

        let free = !self.methods.contains(&names.method)
            && !self.types.contains(&names.stem)
            && !self.types.contains(&names.request)
            && !self.types.contains(&names.response);

        if !free {
            return None;
        }

        self.methods.insert(names.method.clone());
        self.types.insert(names.stem.clone());
        self.types.insert(names.request.clone());
        self.types.insert(names.response.clone());
        Some(names)
    }

    fn assign(mut self, operation: &Operation, eligible: bool) -> Self {
        if !eligible {
            debug!(operation = %operation.name, "operation skipped: unresolved input or output message");
            self.names.push(None);
            return self;
        }

        let base = match to_pascal_case(&operation.name) {
            base if base.is_empty() => "Operation".to_owned(),
            base => base,
        };

        let occurrence = {
            let count = self.occurrences.entry(base.clone()).or_default();
            *count += 1;
            *count
        };

        let mut candidates = suffix_candidates(operation);
        if occurrence == 1 {
            candidates.insert(0, String::new());
        }

        let mut names = candidates
            .into_iter()
            .find_map(|suffix| self.accept(format!("{}{}", base, suffix)));

        let mut index = occurrence.max(2);
        while names.is_none() {
            names = self.accept(format!("{}{}", base, index));
            index += 1;
        }

        self.names.push(names);
        self
    }
}

impl NameTable {
    pub fn build(definition: &Definition) -> Self {
        let mut table = Self::default();

        for port_type in &definition.port_types {
            if table.port_types.contains_key(&port_type.name) {
                debug!(port_type = %port_type.name, "duplicate port type ignored");
                continue;
            }

            let assignment = port_type
                .operations
                .iter()
                .fold(Assignment::default(), |assignment, operation| {
                    assignment.assign(operation, is_eligible(definition, operation))
                });

            table
                .port_types
                .insert(port_type.name.clone(), assignment.names);
        }

        table
    }

    pub fn names(&self, port_type: &str, index: usize) -> Option<&OperationNames> {
        self.port_types.get(port_type)?.get(index)?.as_ref()
    }

    /// Eligible operations of `port_type` with their assigned names, in declaration order.
    pub fn operations<'d>(
        &'d self,
        port_type: &'d PortType,
    ) -> impl Iterator<Item = (&'d Operation, &'d OperationNames)> + 'd {
        port_type
            .operations
            .iter()
            .enumerate()
            .filter_map(move |(index, operation)| {
                self.names(&port_type.name, index)
                    .map(|names| (operation, names))
            })
    }
}
