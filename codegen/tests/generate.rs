use lather_codegen::{Error, GeneratedCrate, GeneratorOptions, Layout, ReservedNamePolicy, Transport};
use std::collections::BTreeSet;
use syn::{FnArg, Item, Pat, TraitItem};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/calculator.wsdl");

fn generate(options: &GeneratorOptions) -> GeneratedCrate {
    lather_codegen::from_url(FIXTURE, options).unwrap()
}

fn contents<'a>(generated: &'a GeneratedCrate, path: &str) -> &'a str {
    &generated
        .file(path)
        .unwrap_or_else(|| panic!("missing {}", path))
        .contents
}

/// `(method, parameter names)` for every method of the first trait in `source`.
fn trait_methods(source: &str) -> Vec<(String, Vec<String>)> {
    let file = syn::parse_file(source).unwrap();

    let methods = file
        .items
        .into_iter()
        .find_map(|item| match item {
            Item::Trait(item) => Some(item.items),
            _ => None,
        })
        .unwrap();

    methods
        .into_iter()
        .filter_map(|item| match item {
            TraitItem::Fn(method) => Some(method.sig),
            _ => None,
        })
        .map(|sig| {
            let params = sig
                .inputs
                .iter()
                .filter_map(|input| match input {
                    FnArg::Typed(typed) => match &*typed.pat {
                        Pat::Ident(ident) => Some(ident.ident.to_string()),
                        _ => None,
                    },
                    FnArg::Receiver(_) => None,
                })
                .collect();

            (sig.ident.to_string(), params)
        })
        .collect()
}

#[test]
fn generation_is_deterministic() {
    let options = GeneratorOptions::new("calculator");

    assert_eq!(generate(&options), generate(&options));
}

#[test]
fn multi_file_layout_lists_every_module() {
    let generated = generate(&GeneratorOptions::new("calculator"));

    let paths = generated
        .files
        .iter()
        .map(|file| file.path.display().to_string())
        .collect::<Vec<_>>();

    assert_eq!(
        paths,
        [
            "Cargo.toml",
            "src/lib.rs",
            "src/model/mod.rs",
            "src/model/types.rs",
            "src/model/headers.rs",
            "src/model/calculator_soap.rs",
            "src/interface/mod.rs",
            "src/interface/calculator_soap.rs",
            "src/client/mod.rs",
            "src/client/calculator.rs",
            "src/runtime/mod.rs",
            "src/runtime/error.rs",
            "src/runtime/config.rs",
            "src/runtime/envelope.rs",
            "src/runtime/dispatch.rs",
        ]
    );

    for file in &generated.files {
        if file.path.extension().is_some_and(|extension| extension == "rs") {
            syn::parse_file(&file.contents)
                .unwrap_or_else(|error| panic!("{} does not parse: {}", file.path.display(), error));
        }
    }
}

#[test]
fn reused_operation_names_are_disambiguated() {
    let generated = generate(&GeneratorOptions::new("calculator"));
    let methods = trait_methods(contents(&generated, "src/interface/calculator_soap.rs"));

    let names = methods.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    assert_eq!(
        names,
        ["add", "common_operation", "common_operation_with_filter", "describe", "ping"]
    );
    assert_eq!(names.iter().collect::<BTreeSet<_>>().len(), names.len());

    let model = contents(&generated, "src/model/calculator_soap.rs");
    assert!(model.contains("pub struct CommonOperationRequest"));
    assert!(model.contains("pub struct CommonOperationWithFilterRequest"));
    assert!(model.contains("pub struct CommonOperationWithFilterResponse"));
}

#[test]
fn unresolvable_parts_are_skipped_silently() {
    let generated = generate(&GeneratorOptions::new("calculator"));

    let interface = contents(&generated, "src/interface/calculator_soap.rs");
    assert!(!interface.contains("divide"));

    let client = contents(&generated, "src/client/calculator.rs");
    assert!(client.contains("pub struct CalculatorSoapClient"));
    assert!(!client.contains("CalculatorSoap12Client"));
    assert!(generated.file("src/client/archive.rs").is_none());
}

#[test]
fn message_children_are_flattened() {
    let generated = generate(&GeneratorOptions::new("calculator"));
    let model = contents(&generated, "src/model/calculator_soap.rs");

    assert!(model.contains("pub query: Option<String>"));
    assert!(model.contains("pub filter: Vec<String>"));
    assert!(model.contains("pub mode: super::types::Mode"));
    assert!(model.contains("pub shape: super::types::Circle"));
    assert!(!model.contains("pub options"));
    assert!(!model.contains("PingRequest"));
    assert!(!model.contains("PingResponse"));

    let types = contents(&generated, "src/model/types.rs");
    assert!(types.contains("pub enum Mode"));
    assert!(types.contains("pub items: Vec<String>"));
    assert!(types.contains("pub base: super::types::Shape"));
    assert!(!types.contains("pub struct Nothing"));
}

#[test]
fn shared_auth_header_is_one_parameter() {
    let generated = generate(&GeneratorOptions::new("calculator"));
    let methods = trait_methods(contents(&generated, "src/interface/calculator_soap.rs"));

    let params = |name: &str| {
        methods
            .iter()
            .find(|(method, _)| method == name)
            .map(|(_, params)| params.clone())
            .unwrap()
    };

    assert_eq!(params("add"), ["request", "auth_header", "cancel"]);
    assert_eq!(
        params("common_operation_with_filter"),
        ["request", "auth_header", "locale_header", "cancel"]
    );
    assert_eq!(params("ping"), ["cancel"]);

    let headers = contents(&generated, "src/model/headers.rs");
    assert_eq!(headers.matches("pub struct AuthHeader").count(), 1);
    assert!(headers.contains("pub struct LocaleHeader"));
}

#[test]
fn header_policy_is_replaceable() {
    let options = GeneratorOptions::new("calculator").with_header_policy(ReservedNamePolicy::new(["Locale"]));
    let generated = generate(&options);
    let methods = trait_methods(contents(&generated, "src/interface/calculator_soap.rs"));

    let (_, params) = methods
        .iter()
        .find(|(method, _)| method == "common_operation_with_filter")
        .unwrap();

    assert_eq!(params, &["request", "auth_header_message", "locale", "cancel"]);
}

#[test]
fn client_uses_bound_actions_and_endpoint() {
    let generated = generate(&GeneratorOptions::new("calculator"));
    let client = contents(&generated, "src/client/calculator.rs");

    assert!(client.contains("\"http://www.dneonline.com/calculator.asmx\""));
    assert!(client.contains("\"http://tempuri.org/CommonOperation\""));
    assert!(client.contains("\"http://tempuri.org/CommonOperationWithFilter\""));
    assert!(client.contains("Envelope::empty(\"Ping\", \"http://tempuri.org/\")"));
}

#[test]
fn legacy_transport_is_blocking() {
    let options = GeneratorOptions::new("calculator").with_transport(Transport::Legacy);
    let generated = generate(&options);

    assert!(generated.file("src/runtime/blocking.rs").is_some());
    assert!(generated.file("src/runtime/dispatch.rs").is_none());

    let methods = trait_methods(contents(&generated, "src/interface/calculator_soap.rs"));
    assert!(methods.iter().all(|(_, params)| params.last().is_some_and(|last| last == "timeout")));

    assert!(!contents(&generated, "Cargo.toml").contains("tokio"));
}

#[test]
fn single_file_layout_inlines_modules() {
    let options = GeneratorOptions::new("calculator").with_layout(Layout::SingleFile);
    let generated = generate(&options);

    assert_eq!(generated.files.len(), 2);

    let lib = contents(&generated, "src/lib.rs");
    for module in ["pub mod model {", "pub mod interface {", "pub mod client {", "pub mod runtime {"] {
        assert!(lib.contains(module), "{}", module);
    }
    syn::parse_file(lib).unwrap();
}

#[test]
fn written_tree_matches_file_set() {
    let dir = tempfile::tempdir().unwrap();
    let generated = generate(&GeneratorOptions::new("calculator"));

    generated.write_to(dir.path()).unwrap();

    for file in &generated.files {
        let written = std::fs::read_to_string(dir.path().join(&file.path)).unwrap();
        assert_eq!(written, file.contents);
    }
}

#[test]
fn boundary_violations_are_rejected() {
    assert!(matches!(
        lather_codegen::from_url(FIXTURE, &GeneratorOptions::new("")),
        Err(Error::EmptyNamespace)
    ));
    assert!(matches!(
        lather_codegen::from_url(FIXTURE, &GeneratorOptions::new("calculator client")),
        Err(Error::InvalidNamespace(_))
    ));
    assert!(matches!(
        lather_codegen::from_url("tests/fixtures/missing.wsdl", &GeneratorOptions::new("calculator")),
        Err(Error::Wsdl(_))
    ));
}
