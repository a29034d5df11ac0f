//! One client struct per service port, implementing the port type's trait.

use lather_wsdl::types::{Port, Service};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::BTreeSet;
use tracing::debug;

use super::{
    interface::Signature, unique_ident, Artifact, Category, GenerationContext, OperationPlan,
    PortTypePlan,
};
use crate::{
    naming::{to_pascal_case, type_ident},
    options::Transport,
};

fn client_method(
    plan: &OperationPlan<'_>,
    port_type: &PortTypePlan<'_>,
    binding: &str,
    context: &GenerationContext<'_>,
) -> TokenStream {
    let transport = context.options.transport;
    let signature = Signature::new(plan, &port_type.module, &context.bindings);
    let params = signature.params(transport);
    let Signature { method, output, .. } = &signature;

    let action = context
        .bindings
        .soap_action(binding, plan.operation)
        .unwrap_or_default();

    let envelope = if plan.has_request() {
        quote! { runtime::envelope::Envelope::new(&request)? }
    } else {
        let element = plan.request_element();
        let namespace = &plan.input.namespace;
        quote! { runtime::envelope::Envelope::empty(#element, #namespace) }
    };

    let headers = signature
        .headers
        .iter()
        .map(|header| {
            let ident = &header.ident;
            quote! { .with_header(&#ident)? }
        });

    let finish = if plan.has_response() {
        quote! { parse() }
    } else {
        quote! { into_unit() }
    };

    match transport {
        Transport::Http => quote! {
            async fn #method(&self, #params) -> Result<#output, runtime::error::SoapError> {
                let envelope = #envelope #(#headers)*;
                self.inner.dispatch(#action, envelope, cancel).await?.#finish
            }
        },
        Transport::Legacy => quote! {
            fn #method(&self, #params) -> Result<#output, runtime::error::SoapError> {
                let envelope = #envelope #(#headers)*;
                self.inner.call(#action, envelope, timeout)?.#finish
            }
        },
    }
}

fn port_client(
    service: &Service,
    port: &Port,
    used: &mut BTreeSet<String>,
    context: &GenerationContext<'_>,
) -> Option<TokenStream> {
    let plan = match context
        .definition
        .binding(&port.binding)
        .and_then(|binding| context.port_type(&binding.port_type))
    {
        Some(plan) => plan,
        None => {
            debug!(service = %service.name, port = %port.name, binding = %port.binding, "port skipped: unresolved binding or port type");
            return None;
        }
    };

    let ident = {
        let base = format!("{}Client", to_pascal_case(&port.name));
        let mut name = base.clone();
        let mut index = 2;

        while !used.insert(name.clone()) {
            name = format!("{}{}", base, index);
            index += 1;
        }

        type_ident(&name)
    };

    let trait_ident = plan.trait_ident();
    let module = &plan.module;
    let endpoint = port.location.as_deref().unwrap_or_default();
    let doc = format!(" Client for port `{}` of service `{}`.", port.name, service.name);

    let methods = plan
        .operations
        .iter()
        .map(|operation| client_method(operation, plan, &port.binding, context));

    let inner = match context.options.transport {
        Transport::Http => quote! { runtime::dispatch::SoapClient },
        Transport::Legacy => quote! { runtime::blocking::BlockingSoapClient },
    };

    Some(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone)]
        pub struct #ident {
            inner: #inner,
        }

        impl #ident {
            pub const DEFAULT_ENDPOINT: &'static str = #endpoint;

            /// A client for [`Self::DEFAULT_ENDPOINT`] with the default configuration.
            pub fn new() -> Result<Self, runtime::error::SoapError> {
                Self::with_config(runtime::config::ClientConfig::new(Self::DEFAULT_ENDPOINT))
            }

            pub fn with_config(config: runtime::config::ClientConfig) -> Result<Self, runtime::error::SoapError> {
                Ok(Self {
                    inner: #inner::new(config)?,
                })
            }
        }

        impl interface::#module::#trait_ident for #ident {
            #(#methods)*
        }
    })
}

fn service_module(
    service: &Service,
    modules: &mut BTreeSet<String>,
    context: &GenerationContext<'_>,
) -> Option<Artifact> {
    let mut used = BTreeSet::new();
    let clients = service
        .ports
        .iter()
        .filter_map(|port| port_client(service, port, &mut used, context))
        .collect::<Vec<_>>();

    if clients.is_empty() {
        debug!(service = %service.name, "service skipped: no port resolves");
        return None;
    }

    let module = unique_ident(&service.name, modules);

    Some(Artifact::new(
        Category::Client,
        module.to_string(),
        quote! {
            use super::super::{interface, model, runtime};

            #(#clients)*
        },
    ))
}

pub fn generate(context: &GenerationContext<'_>) -> Vec<Artifact> {
    let mut modules = BTreeSet::new();

    context
        .definition
        .services
        .iter()
        .filter_map(|service| service_module(service, &mut modules, context))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{options::GeneratorOptions, test_utils::*};
    use lather_wsdl::types::{Binding, Definition, PortType, SchemaItem};

    fn definition() -> Definition {
        let mut definition = make_definition(vec![
            SchemaItem::Element(make_wrapper("Add", vec![make_element("a", "int")])),
            SchemaItem::Element(make_wrapper("AddResponse", vec![make_element("AddResult", "int")])),
            SchemaItem::Element(make_wrapper("Ping", vec![])),
        ]);

        for (name, element) in [("AddSoapIn", "Add"), ("AddSoapOut", "AddResponse"), ("PingSoapIn", "Ping")] {
            definition.messages.push(make_message(name, element));
        }

        definition.port_types.push(PortType {
            name: "CalculatorSoap".into(),
            operations: vec![
                make_operation("Add", "AddSoapIn", None, Some("AddSoapOut")),
                make_operation("Ping", "PingSoapIn", None, None),
            ],
        });

        definition.bindings.push(Binding {
            name: "CalculatorSoap".into(),
            port_type: "CalculatorSoap".into(),
            transport: None,
            operations: vec![
                make_binding_operation("Add", Some("http://tempuri.org/Add"), None, &[]),
                make_binding_operation("Ping", Some("http://tempuri.org/Ping"), None, &[]),
            ],
        });

        definition.services.push(Service {
            name: "Calculator".into(),
            ports: vec![
                Port {
                    name: "CalculatorSoap".into(),
                    binding: "CalculatorSoap".into(),
                    location: Some("http://localhost/calculator.asmx".into()),
                },
                Port {
                    name: "CalculatorSoap12".into(),
                    binding: "MissingBinding".into(),
                    location: None,
                },
            ],
        });

        definition.services.push(Service {
            name: "Orphan".into(),
            ports: vec![Port {
                name: "OrphanSoap".into(),
                binding: "MissingBinding".into(),
                location: None,
            }],
        });

        definition
    }

    fn render(transport: Transport) -> Vec<Artifact> {
        let definition = definition();
        let options = GeneratorOptions::new("client").with_transport(transport);
        generate(&GenerationContext::new(&definition, &options))
    }

    #[test]
    fn unresolved_ports_and_services_are_skipped() {
        let artifacts = render(Transport::Http);

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].module, "calculator");

        let rendered = artifacts[0].tokens.to_string();
        assert!(rendered.contains("pub struct CalculatorSoapClient"));
        assert!(!rendered.contains("CalculatorSoap12Client"));
    }

    #[test]
    fn http_client_dispatches_with_action() {
        let rendered = render(Transport::Http)[0].tokens.to_string();

        assert!(rendered.contains("pub const DEFAULT_ENDPOINT : & 'static str = \"http://localhost/calculator.asmx\""));
        assert!(rendered.contains("impl interface :: calculator_soap :: CalculatorSoap for CalculatorSoapClient"));
        assert!(rendered.contains("runtime :: envelope :: Envelope :: new (& request) ?"));
        assert!(rendered.contains("dispatch (\"http://tempuri.org/Add\" , envelope , cancel) . await ? . parse ()"));
        assert!(rendered.contains("Envelope :: empty (\"Ping\" , \"http://tempuri.org/\")"));
        assert!(rendered.contains("into_unit ()"));
    }

    #[test]
    fn legacy_client_calls_blocking_transport() {
        let rendered = render(Transport::Legacy)[0].tokens.to_string();

        assert!(rendered.contains("runtime :: blocking :: BlockingSoapClient"));
        assert!(rendered.contains("call (\"http://tempuri.org/Add\" , envelope , timeout) ? . parse ()"));
        assert!(!rendered.contains("async"));
    }
}
