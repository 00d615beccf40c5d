use clap::Args;
use recipebox_core::{convert, WeightUnit};

use super::OutputFormat;

#[derive(Args)]
pub struct ConvertCommand {
    /// Amount to convert, e.g. 100 or 2.5
    value: String,

    /// Unit of the amount: grams, ounces, pounds
    #[arg(long, short, default_value = "grams")]
    from: WeightUnit,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ConvertCommand {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let conversion = convert(&self.value, self.from);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&conversion)?),
            OutputFormat::Text if conversion.is_empty() => {
                println!("'{}' is not a number", self.value.trim());
            }
            OutputFormat::Text => print!("{}", conversion),
        }
        Ok(())
    }
}
