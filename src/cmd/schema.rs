//! Schema command - print expected input formats.

use crate::transaction::TransactionInput;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the input format
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(TransactionInput);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => {
                let columns: Vec<&str> = CSV_FIELDS.iter().map(|(name, _, _)| *name).collect();
                println!("{}", columns.join(","));
            }
            SchemaFormat::CsvFields => {
                println!("CSV Input Format");
                println!("================");
                println!();
                for (name, required, description) in CSV_FIELDS {
                    let req = if *required { "required" } else { "optional" };
                    println!("{name:16} ({req:8})  {description}");
                }
                println!();
                println!("FX rate convention: units of the transaction currency per 1 GBP");
            }
        }
        Ok(())
    }
}

const CSV_FIELDS: &[(&str, bool, &str)] = &[
    ("id", false, "Identifier for audit messages (defaults to row number)"),
    ("date", true, "Transaction date (YYYY-MM-DD or YYYY-MM-DDThh:mm:ss)"),
    ("symbol", true, "Security symbol (e.g., VUSA, AAPL)"),
    ("name", false, "Security name for display"),
    ("action", true, "Acquire or Dispose"),
    ("quantity", true, "Number of shares"),
    ("unit_price", true, "Price per share in the transaction currency"),
    ("currency", false, "ISO currency code (defaults to GBP)"),
    ("fx_rate", false, "Units of currency per 1 GBP (defaults to 1)"),
    ("commission_gbp", false, "Commission in GBP (defaults to 0)"),
];
