use structopt::StructOpt;

mod calculator {
    lather_macro::lather!("calculator.wsdl");
}

use calculator::{
    client::calculator::CalculatorSoapClient,
    interface::calculator_soap::CalculatorSoap,
    model::calculator_soap::{AddRequest, DivideRequest, MultiplyRequest, SubtractRequest},
    runtime::{dispatch::CancelToken, error::SoapError},
};

pub struct Calculator {
    client: CalculatorSoapClient,
    cancel: CancelToken,
}

impl Calculator {
    pub fn new() -> Result<Self, SoapError> {
        Ok(Self {
            client: CalculatorSoapClient::new()?,
            cancel: CancelToken::new(),
        })
    }

    pub async fn add(&self, int_a: i32, int_b: i32) -> Result<i32, SoapError> {
        let response = self.client.add(AddRequest { int_a, int_b }, &self.cancel).await?;
        Ok(response.add_result)
    }

    pub async fn subtract(&self, int_a: i32, int_b: i32) -> Result<i32, SoapError> {
        let response = self
            .client
            .subtract(SubtractRequest { int_a, int_b }, &self.cancel)
            .await?;
        Ok(response.subtract_result)
    }

    pub async fn multiply(&self, int_a: i32, int_b: i32) -> Result<i32, SoapError> {
        let response = self
            .client
            .multiply(MultiplyRequest { int_a, int_b }, &self.cancel)
            .await?;
        Ok(response.multiply_result)
    }

    pub async fn divide(&self, int_a: i32, int_b: i32) -> Result<i32, SoapError> {
        let response = self
            .client
            .divide(DivideRequest { int_a, int_b }, &self.cancel)
            .await?;
        Ok(response.divide_result)
    }
}

#[derive(StructOpt)]
enum Mode {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(StructOpt)]
struct Args {
    #[structopt(subcommand)]
    mode: Mode,

    a: i32,
    b: i32,
}

#[paw::main]
fn main(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let calculator = Calculator::new()?;

        match args.mode {
            Mode::Add => calculator.add(args.a, args.b).await,
            Mode::Subtract => calculator.subtract(args.a, args.b).await,
            Mode::Multiply => calculator.multiply(args.a, args.b).await,
            Mode::Divide => calculator.divide(args.a, args.b).await,
        }
    })?;

    println!("{}", result);
    Ok(())
}
