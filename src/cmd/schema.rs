//! Schema command - print expected input formats

use clap::{Args, ValueEnum};
use fintax::core::{csv_header, CsvField, TransactionInput, TransactionRecord, WealthInput, WealthItem};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,

    /// Which input file to describe
    #[arg(short, long, value_enum, default_value_t = RecordType::Transaction)]
    record: RecordType,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the input format
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum RecordType {
    #[default]
    Transaction,
    Wealth,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => {
                println!("{}", csv_header(self.fields()));
                Ok(())
            }
            SchemaFormat::CsvFields => {
                self.print_csv_fields();
                Ok(())
            }
        }
    }

    fn fields(&self) -> &'static [CsvField] {
        match self.record {
            RecordType::Transaction => TransactionRecord::csv_schema(),
            RecordType::Wealth => WealthItem::csv_schema(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = match self.record {
            RecordType::Transaction => schema_for!(TransactionInput),
            RecordType::Wealth => schema_for!(WealthInput),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_fields(&self) {
        println!("CSV Input Format");
        println!("================");
        println!();
        for field in self.fields() {
            let req = if field.required { "required" } else { "optional" };
            println!("{:12} ({:8})  {}", field.name, req, field.description);
        }
        println!();
        println!("Amounts are plain decimals in rupees, without separators");
    }
}
