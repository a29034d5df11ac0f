use std::{
    io::{self, Write},
    path::PathBuf,
    process,
};

use structopt::StructOpt;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lather_codegen::{self as codegen, naming::NameTable, GeneratorOptions, Layout, ReservedNamePolicy, Transport};
use lather_wsdl::{self as wsdl, types::Definition};

#[derive(Debug, Error)]
enum Error {
    #[error("Error reading service description")]
    Wsdl(#[from] wsdl::error::Error),

    #[error("Error generating client")]
    Codegen(#[from] codegen::Error),

    #[error("Error writing summary")]
    Io(#[from] io::Error),
}

#[derive(StructOpt)]
#[structopt(about = "Generates typed SOAP clients from WSDL service descriptions")]
struct Args {
    /// Increases log output, repeat for more
    #[structopt(short, long, parse(from_occurrences), global = true)]
    verbose: u8,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Prints a structural summary of a service description
    Inspect {
        /// Path or URL of the WSDL document
        input: String,
    },

    /// Generates a client crate
    Generate(GenerateArgs),
}

#[derive(StructOpt)]
struct GenerateArgs {
    /// Path or URL of the WSDL document
    #[structopt(short, long)]
    input: String,

    /// Package name of the generated crate
    #[structopt(short, long)]
    namespace: String,

    /// Emits every module inline in src/lib.rs
    #[structopt(long)]
    single_file: bool,

    /// Output directory, defaults to ./<namespace>
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// `http` (async, retries) or `legacy` (blocking)
    #[structopt(long, default_value = "http")]
    transport: Transport,

    /// Header names treated as the shared authentication header
    #[structopt(long = "auth-header-marker")]
    auth_header_markers: Vec<String>,
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn inspect<W: Write>(definition: &Definition, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "Definition {} ({})",
        definition.name.as_deref().unwrap_or("<unnamed>"),
        definition.target_namespace
    )?;

    writeln!(out, "Services:")?;
    for service in &definition.services {
        writeln!(out, "  {}", service.name)?;
        for port in &service.ports {
            writeln!(
                out,
                "    {} -> {} @ {}",
                port.name,
                port.binding,
                port.location.as_deref().unwrap_or("<no address>")
            )?;
        }
    }

    let names = NameTable::build(definition);

    writeln!(out, "Port types:")?;
    for port_type in &definition.port_types {
        let operations = names.operations(port_type).collect::<Vec<_>>();
        writeln!(
            out,
            "  {} ({} of {} operations)",
            port_type.name,
            operations.len(),
            port_type.operations.len()
        )?;

        for (operation, names) in operations {
            writeln!(out, "    {} <- {}", names.method, operation.name)?;
        }
    }

    let schema = &definition.schema;
    let simple = schema.simple_types().collect::<Vec<_>>();
    writeln!(
        out,
        "Bindings: {}, messages: {}, complex types: {}, simple types: {} ({} enums)",
        definition.bindings.len(),
        definition.messages.len(),
        schema.complex_types().len(),
        simple.len(),
        simple.iter().filter(|ty| ty.is_enum()).count()
    )
}

fn generate(args: GenerateArgs) -> Result<(), Error> {
    let mut options = GeneratorOptions::new(args.namespace.as_str()).with_transport(args.transport);

    if args.single_file {
        options = options.with_layout(Layout::SingleFile);
    }

    if !args.auth_header_markers.is_empty() {
        options = options.with_header_policy(ReservedNamePolicy::new(args.auth_header_markers));
    }

    let output = args.output.unwrap_or_else(|| PathBuf::from(&args.namespace));
    let generated = codegen::from_url(&args.input, &options)?;
    generated.write_to(&output)?;

    info!(output = %output.display(), files = generated.files.len(), "client generated");
    Ok(())
}

fn run(command: Command) -> Result<(), Error> {
    match command {
        Command::Inspect { input } => {
            let definition = wsdl::parse(input)?;
            inspect(&definition, &mut io::stdout().lock())?;
            Ok(())
        }

        Command::Generate(args) => generate(args),
    }
}

fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

#[paw::main]
fn main(args: Args) {
    init_tracing(args.verbose);

    if let Err(error) = run(args.command) {
        eprintln!("error: {}", describe(&error));
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions name="Echo" xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:tns="urn:echo" xmlns:s="http://www.w3.org/2001/XMLSchema"
    xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/" targetNamespace="urn:echo">
  <wsdl:types>
    <s:schema targetNamespace="urn:echo">
      <s:element name="Echo">
        <s:complexType>
          <s:sequence>
            <s:element name="text" type="s:string" />
          </s:sequence>
        </s:complexType>
      </s:element>
    </s:schema>
  </wsdl:types>
  <wsdl:message name="EchoIn">
    <wsdl:part name="parameters" element="tns:Echo" />
  </wsdl:message>
  <wsdl:portType name="EchoPort">
    <wsdl:operation name="Echo">
      <wsdl:input message="tns:EchoIn" />
    </wsdl:operation>
    <wsdl:operation name="Missing">
      <wsdl:input message="tns:Nowhere" />
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="EchoBinding" type="tns:EchoPort">
    <wsdl:operation name="Echo">
      <soap:operation soapAction="urn:echo#Echo" />
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="EchoService">
    <wsdl:port name="EchoPort" binding="tns:EchoBinding">
      <soap:address location="http://localhost/echo" />
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#;

    #[test]
    fn arguments_parse() {
        let args = Args::from_iter([
            "lather", "-vv", "generate", "--input", "echo.wsdl", "--namespace", "echo",
            "--transport", "legacy", "--auth-header-marker", "Session", "--single-file",
        ]);

        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Generate(args) => {
                assert_eq!(args.input, "echo.wsdl");
                assert_eq!(args.transport, Transport::Legacy);
                assert_eq!(args.auth_header_markers, ["Session"]);
                assert!(args.single_file);
                assert!(args.output.is_none());
            }
            Command::Inspect { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn inspect_summarises_the_definition() {
        let definition = wsdl::parse_str(SERVICE).unwrap();
        let mut out = Vec::new();

        inspect(&definition, &mut out).unwrap();
        let summary = String::from_utf8(out).unwrap();

        assert!(summary.contains("Definition Echo (urn:echo)"));
        assert!(summary.contains("EchoPort -> EchoBinding @ http://localhost/echo"));
        assert!(summary.contains("EchoPort (1 of 2 operations)"));
        assert!(summary.contains("echo <- Echo"));
    }

    #[test]
    fn generate_writes_the_crate() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("echo.wsdl");
        std::fs::write(&input, SERVICE).unwrap();

        let output = dir.path().join("out");
        generate(GenerateArgs {
            input: input.display().to_string(),
            namespace: "echo".into(),
            single_file: false,
            output: Some(output.clone()),
            transport: Transport::Http,
            auth_header_markers: Vec::new(),
        })
        .unwrap();

        let manifest = std::fs::read_to_string(output.join("Cargo.toml")).unwrap();
        assert!(manifest.contains("name = \"echo\""));
        assert!(output.join("src/client/echo_service.rs").is_file());
    }

    #[test]
    fn errors_describe_their_causes() {
        let error = Error::from(codegen::Error::EmptyNamespace);

        assert_eq!(describe(&error), "Error generating client: Output namespace is empty");
    }
}
