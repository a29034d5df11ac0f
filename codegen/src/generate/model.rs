//! Serde shapes: `model::types`, `model::headers` and one module per port type.

use lather_wsdl::types::{ComplexType, SimpleType};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::collections::BTreeSet;

use super::{
    codegen_all, unique_ident, Artifact, Category, Codegen, GenerationContext, OperationPlan,
    PortTypePlan,
};
use crate::{
    binding::HeaderShape,
    naming::{schema_type_ident, type_ident, variant_ident},
    resolve::{ResolvedField, TypeRef},
};

/// The Rust type of a field's base, as seen from any `model` module.
pub fn base_tokens(base: &TypeRef) -> TokenStream {
    match base {
        TypeRef::Primitive(primitive) => primitive.rust_type(),
        TypeRef::Named { name, .. } => {
            let ident = schema_type_ident(name);
            quote! { super::types::#ident }
        }
        TypeRef::Opaque => quote! { String },
    }
}

/// Renders one field; `owner` is the enclosing schema type, boxed when it
/// refers to itself.
fn field_tokens(field: &ResolvedField, owner: Option<&str>, used: &mut BTreeSet<String>) -> TokenStream {
    let wire = &field.name;
    let ident = match wire.as_str() {
        "$text" => unique_ident("value", used),
        name => unique_ident(name, used),
    };

    let mut ty = base_tokens(&field.ty.base);
    let recursive = matches!(
        &field.ty.base,
        TypeRef::Named { name, .. } if Some(name.as_str()) == owner
    );

    if field.ty.is_array {
        quote! {
            #[serde(rename = #wire, default)]
            pub #ident: Vec<#ty>,
        }
    } else {
        if recursive {
            ty = quote! { Box<#ty> };
        }

        if field.ty.is_optional {
            quote! {
                #[serde(rename = #wire, default, skip_serializing_if = "Option::is_none")]
                pub #ident: Option<#ty>,
            }
        } else {
            quote! {
                #[serde(rename = #wire)]
                pub #ident: #ty,
            }
        }
    }
}

fn fields_tokens(fields: &[ResolvedField], owner: Option<&str>, used: &mut BTreeSet<String>) -> Vec<TokenStream> {
    fields
        .iter()
        .map(|field| field_tokens(field, owner, used))
        .collect()
}

fn soap_message_impl(ident: &proc_macro2::Ident, element: &str, namespace: &str) -> TokenStream {
    quote! {
        impl super::super::runtime::envelope::SoapMessage for #ident {
            const ELEMENT: &'static str = #element;
            const NAMESPACE: &'static str = #namespace;
        }
    }
}

impl Codegen for SimpleType {
    fn codegen(&self, _: &GenerationContext<'_>) -> TokenStream {
        let ident = schema_type_ident(&self.name);
        let mut values = BTreeSet::new();
        let mut idents = BTreeSet::new();

        let variants = self
            .enumerations
            .iter()
            .filter(|value| values.insert(value.as_str()))
            .map(|value| {
                let base = variant_ident(value).to_string();
                let mut variant = base.clone();
                let mut index = 2;

                while !idents.insert(variant.clone()) {
                    variant = format!("{}{}", base, index);
                    index += 1;
                }

                let variant = format_ident!("{}", variant);
                quote! {
                    #[serde(rename = #value)]
                    #variant,
                }
            })
            .collect::<Vec<_>>();

        quote! {
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
            pub enum #ident {
                #(#variants)*
            }
        }
    }
}

impl Codegen for ComplexType {
    fn codegen(&self, context: &GenerationContext<'_>) -> TokenStream {
        let resolver = &context.resolver;
        let ident = schema_type_ident(&self.name);

        if let Some(item) = &self.array_item {
            let item = base_tokens(&resolver.resolve_type(item));
            let wire = self
                .elements
                .first()
                .map(|child| child.name.as_str())
                .unwrap_or("item");

            return quote! {
                #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
                pub struct #ident {
                    #[serde(rename = #wire, default)]
                    pub items: Vec<#item>,
                }
            };
        }

        let mut used = BTreeSet::new();
        let mut fields = Vec::new();

        match resolver
            .embedded_base(self)
            .filter(|base| !resolver.is_empty_complex(base))
        {
            Some(base) => {
                used.insert("base".to_owned());
                let base = schema_type_ident(&base.name);
                fields.push(quote! {
                    #[serde(flatten)]
                    pub base: super::types::#base,
                });
            }
            None => {
                if let Some(primitive) = resolver.text_base(self) {
                    used.insert("value".to_owned());
                    let ty = primitive.rust_type();
                    fields.push(quote! {
                        #[serde(rename = "$text")]
                        pub value: #ty,
                    });
                }
            }
        }

        fields.extend(fields_tokens(
            &resolver.complex_fields(self),
            Some(&self.name),
            &mut used,
        ));

        quote! {
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct #ident {
                #(#fields)*
            }
        }
    }
}

impl Codegen for HeaderShape {
    fn codegen(&self, _: &GenerationContext<'_>) -> TokenStream {
        let ident = type_ident(&self.type_name);
        let fields = fields_tokens(&self.fields, None, &mut BTreeSet::new());
        let message = soap_message_impl(&ident, &self.root_element, &self.namespace);
        let doc = format!("Header block of message `{}`.", self.message);

        quote! {
            #[doc = #doc]
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct #ident {
                #(#fields)*
            }

            #message
        }
    }
}

fn operation_shapes(plan: &OperationPlan<'_>) -> TokenStream {
    let mut tokens = TokenStream::new();

    if plan.has_request() {
        let ident = type_ident(&plan.names.request);
        let fields = fields_tokens(&plan.input.fields, None, &mut BTreeSet::new());
        let message = soap_message_impl(&ident, plan.request_element(), &plan.input.namespace);

        tokens.extend(quote! {
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct #ident {
                #(#fields)*
            }

            #message
        });
    }

    if let Some(output) = plan.output.as_ref().filter(|_| plan.has_response()) {
        let ident = type_ident(&plan.names.response);
        let fields = fields_tokens(&output.fields, None, &mut BTreeSet::new());

        tokens.extend(quote! {
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct #ident {
                #(#fields)*
            }
        });
    }

    tokens
}

fn types_module(context: &GenerationContext<'_>) -> Option<Artifact> {
    let schema = &context.definition.schema;
    let mut seen = BTreeSet::new();

    let enums = schema
        .simple_types()
        .filter(|ty| ty.is_enum())
        .filter(|ty| seen.insert(schema_type_ident(&ty.name).to_string()))
        .collect::<Vec<_>>();

    let structs = schema
        .complex_types()
        .into_iter()
        .filter(|ty| !context.resolver.is_empty_complex(ty))
        .filter(|ty| seen.insert(schema_type_ident(&ty.name).to_string()))
        .collect::<Vec<_>>();

    if enums.is_empty() && structs.is_empty() {
        return None;
    }

    let enums = codegen_all(enums, context);
    let structs = codegen_all(structs, context);

    Some(Artifact::new(
        Category::Model,
        "types",
        quote! {
            use serde::{Deserialize, Serialize};

            #(#enums)*
            #(#structs)*
        },
    ))
}

fn headers_module(context: &GenerationContext<'_>) -> Option<Artifact> {
    let shapes = context
        .bindings
        .shared_auth()
        .into_iter()
        .chain(context.bindings.dedicated())
        .collect::<Vec<_>>();

    if shapes.is_empty() {
        return None;
    }

    let shapes = codegen_all(shapes, context);

    Some(Artifact::new(
        Category::Model,
        "headers",
        quote! {
            use serde::{Deserialize, Serialize};

            #(#shapes)*
        },
    ))
}

fn port_type_module(plan: &PortTypePlan<'_>) -> Option<Artifact> {
    let shapes = plan
        .operations
        .iter()
        .map(operation_shapes)
        .filter(|tokens| !tokens.is_empty())
        .collect::<Vec<_>>();

    if shapes.is_empty() {
        return None;
    }

    Some(Artifact::new(
        Category::Model,
        plan.module.to_string(),
        quote! {
            use serde::{Deserialize, Serialize};

            #(#shapes)*
        },
    ))
}

pub fn generate(context: &GenerationContext<'_>) -> Vec<Artifact> {
    types_module(context)
        .into_iter()
        .chain(headers_module(context))
        .chain(context.port_types.iter().filter_map(port_type_module))
        .collect()
}
