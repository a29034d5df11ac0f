//! Assembles artifacts into a crate file set and writes it out.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use super::{
    error::Error,
    generate::{Artifact, Category},
    options::{GeneratorOptions, Layout, Transport},
};

const HEADER: &str = "// Generated by lather from a WSDL service description. Do not edit.\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative to the crate root.
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCrate {
    pub files: Vec<GeneratedFile>,
}

impl GeneratedFile {
    fn new<P: Into<PathBuf>>(path: P, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

impl GeneratedCrate {
    pub fn file<P: AsRef<Path>>(&self, path: P) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.path == path.as_ref())
    }

    /// Writes every file below `dir`, replacing existing files.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<(), Error> {
        let dir = dir.as_ref();

        for file in &self.files {
            let path = dir.join(&file.path);

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| Error::Write {
                    path: parent.to_owned(),
                    source,
                })?;
            }

            fs::write(&path, &file.contents).map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;

            info!(path = %path.display(), "wrote file");
        }

        Ok(())
    }
}

/// Lints the generated code routinely trips over.
fn module_attrs() -> TokenStream {
    quote! {
        #[allow(dead_code, unused_imports, non_camel_case_types, non_snake_case, clippy::all)]
    }
}

fn format(module: &str, tokens: TokenStream) -> Result<String, Error> {
    let file = syn::parse2::<syn::File>(tokens).map_err(|error| Error::InvalidTokens {
        module: module.to_owned(),
        message: error.to_string(),
    })?;

    Ok(format!("{}{}", HEADER, prettyplease::unparse(&file)))
}

fn categories(artifacts: &[Artifact]) -> impl Iterator<Item = (Category, Vec<&Artifact>)> {
    Category::ALL.into_iter().filter_map(move |category| {
        let members = artifacts
            .iter()
            .filter(|artifact| artifact.category == category)
            .collect::<Vec<_>>();

        (!members.is_empty()).then_some((category, members))
    })
}

/// Every generated module inline, as one token stream.
pub fn inline_modules(artifacts: &[Artifact]) -> TokenStream {
    let attrs = module_attrs();

    let categories = categories(artifacts).map(|(category, members)| {
        let category = format_ident!("{}", category.dir());
        let members = members.into_iter().map(|artifact| {
            let module = format_ident!("{}", artifact.module);
            let tokens = &artifact.tokens;
            quote! {
                pub mod #module {
                    #tokens
                }
            }
        });

        quote! {
            #attrs
            pub mod #category {
                #(#members)*
            }
        }
    });

    quote! { #(#categories)* }
}

fn multi_file(artifacts: &[Artifact]) -> Result<Vec<GeneratedFile>, Error> {
    let attrs = module_attrs();
    let mut files = Vec::new();
    let mut declarations = Vec::new();

    for (category, members) in categories(artifacts) {
        let dir = Path::new("src").join(category.dir());
        let ident = format_ident!("{}", category.dir());
        declarations.push(quote! {
            #attrs
            pub mod #ident;
        });

        let modules = members
            .iter()
            .map(|artifact| format_ident!("{}", artifact.module));
        files.push(GeneratedFile::new(
            dir.join("mod.rs"),
            format(category.dir(), quote! { #(pub mod #modules;)* })?,
        ));

        for artifact in members {
            files.push(GeneratedFile::new(
                dir.join(format!("{}.rs", artifact.module)),
                format(&artifact.path(), artifact.tokens.clone())?,
            ));
        }
    }

    files.insert(
        0,
        GeneratedFile::new("src/lib.rs", format("lib", quote! { #(#declarations)* })?),
    );

    Ok(files)
}

fn cargo_manifest(options: &GeneratorOptions) -> String {
    let (reqwest, tokio) = match options.transport {
        Transport::Http => (
            r#""0.12""#,
            "tokio = { version = \"1\", features = [\"macros\", \"rt\", \"sync\", \"time\"] }\n",
        ),
        Transport::Legacy => (r#"{ version = "0.12", features = ["blocking"] }"#, ""),
    };

    format!(
        r#"[package]
name = "{name}"
version = "0.1.0"
edition = "2021"

[dependencies]
quick-xml = {{ version = "0.37", features = ["serialize"] }}
reqwest = {reqwest}
serde = {{ version = "1.0", features = ["derive"] }}
thiserror = "2.0"
{tokio}tracing = "0.1"
"#,
        name = options.namespace,
        reqwest = reqwest,
        tokio = tokio,
    )
}

/// Lays artifacts out as a crate according to `options.layout`.
pub fn assemble(artifacts: &[Artifact], options: &GeneratorOptions) -> Result<GeneratedCrate, Error> {
    let mut files = vec![GeneratedFile::new("Cargo.toml", cargo_manifest(options))];

    match options.layout {
        Layout::MultiFile => files.extend(multi_file(artifacts)?),
        Layout::SingleFile => files.push(GeneratedFile::new(
            "src/lib.rs",
            format("lib", inline_modules(artifacts))?,
        )),
    }

    Ok(GeneratedCrate { files })
}
