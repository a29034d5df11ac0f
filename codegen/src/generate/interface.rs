//! One trait per port type, one method per eligible operation.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use std::collections::BTreeSet;

use super::{unique_ident, Artifact, Category, GenerationContext, OperationPlan, PortTypePlan};
use crate::{
    binding::{BindingIndex, HeaderParam},
    naming::{field_ident, type_ident},
    options::Transport,
};

/// A header argument of a generated method.
pub struct HeaderArg {
    pub ident: Ident,
    pub ty: TokenStream,
}

/// The parts of a method signature shared by trait and client.
pub struct Signature {
    pub method: Ident,
    pub request: Option<TokenStream>,
    pub headers: Vec<HeaderArg>,
    pub output: TokenStream,
}

impl Signature {
    pub fn new(plan: &OperationPlan<'_>, module: &Ident, bindings: &BindingIndex) -> Self {
        let mut used = ["request", "cancel", "timeout"]
            .map(String::from)
            .into_iter()
            .collect::<BTreeSet<_>>();

        let request = plan.has_request().then(|| {
            let ident = type_ident(&plan.names.request);
            quote! { model::#module::#ident }
        });

        let headers = plan
            .headers
            .iter()
            .filter_map(|header| {
                let type_name = match header {
                    HeaderParam::SharedAuth => &bindings.shared_auth()?.type_name,
                    HeaderParam::Dedicated { type_name, .. } => type_name,
                };

                let ty = type_ident(type_name);
                Some(HeaderArg {
                    ident: unique_ident(type_name, &mut used),
                    ty: quote! { model::headers::#ty },
                })
            })
            .collect();

        let output = if plan.has_response() {
            let ident = type_ident(&plan.names.response);
            quote! { model::#module::#ident }
        } else {
            quote! { () }
        };

        Self {
            method: field_ident(&plan.names.method),
            request,
            headers,
            output,
        }
    }

    /// Parameters after `&self`, ending with the cancellation or timeout argument.
    pub fn params(&self, transport: Transport) -> TokenStream {
        let request = self
            .request
            .as_ref()
            .map(|request| quote! { request: #request, });

        let headers = self.headers.iter().map(|HeaderArg { ident, ty }| quote! { #ident: #ty, });

        let last = match transport {
            Transport::Http => quote! { cancel: &runtime::dispatch::CancelToken },
            Transport::Legacy => quote! { timeout: Option<std::time::Duration> },
        };

        quote! { #request #(#headers)* #last }
    }
}

fn method_doc(plan: &OperationPlan<'_>) -> Option<TokenStream> {
    let doc = plan
        .operation
        .documentation
        .as_deref()
        .map(str::trim)
        .filter(|doc| !doc.is_empty())?;

    let lines = doc.lines().map(|line| format!(" {}", line.trim()));
    Some(quote! { #(#[doc = #lines])* })
}

fn trait_method(plan: &OperationPlan<'_>, module: &Ident, context: &GenerationContext<'_>) -> TokenStream {
    let signature = Signature::new(plan, module, &context.bindings);
    let Signature { method, output, .. } = &signature;
    let params = signature.params(context.options.transport);
    let doc = method_doc(plan);

    match context.options.transport {
        Transport::Http => quote! {
            #doc
            fn #method(&self, #params) -> impl std::future::Future<Output = Result<#output, runtime::error::SoapError>> + Send;
        },
        Transport::Legacy => quote! {
            #doc
            fn #method(&self, #params) -> Result<#output, runtime::error::SoapError>;
        },
    }
}

fn port_type_module(plan: &PortTypePlan<'_>, context: &GenerationContext<'_>) -> Artifact {
    let ident = plan.trait_ident();
    let module = &plan.module;
    let methods = plan
        .operations
        .iter()
        .map(|operation| trait_method(operation, module, context));
    let doc = format!(" Operations of port type `{}`.", plan.port_type.name);

    Artifact::new(
        Category::Interface,
        module.to_string(),
        quote! {
            use super::super::{model, runtime};

            #[doc = #doc]
            pub trait #ident {
                #(#methods)*
            }
        },
    )
}

pub fn generate(context: &GenerationContext<'_>) -> Vec<Artifact> {
    context
        .port_types
        .iter()
        .map(|plan| port_type_module(plan, context))
        .collect()
}
