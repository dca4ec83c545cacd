pub mod audit;
pub mod compare;
pub mod networth;
pub mod schema;
pub mod tax;

use anyhow::Context;
use fintax::core::{transaction, wealth, TransactionRecord, WealthItem};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

/// Read transactions from a CSV or JSON file (or stdin with "-")
pub fn read_transactions(path: &Path) -> anyhow::Result<Vec<TransactionRecord>> {
    let (format, bytes) = read_input(path)?;
    let records = match format {
        Format::Json => transaction::read_json(bytes.as_slice())?,
        Format::Csv => transaction::read_csv(bytes.as_slice())?,
    };
    log::info!("Read {} transactions from {}", records.len(), path.display());
    Ok(records)
}

/// Read wealth items from a CSV or JSON file (or stdin with "-")
pub fn read_wealth(path: &Path) -> anyhow::Result<Vec<WealthItem>> {
    let (format, bytes) = read_input(path)?;
    let items = match format {
        Format::Json => wealth::read_json(bytes.as_slice())?,
        Format::Csv => wealth::read_csv(bytes.as_slice())?,
    };
    log::info!("Read {} wealth items from {}", items.len(), path.display());
    Ok(items)
}

fn read_input(path: &Path) -> anyhow::Result<(Format, Vec<u8>)> {
    let mut buffer = Vec::new();
    if path.as_os_str() == "-" {
        BufReader::new(io::stdin().lock()).read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
        return Ok((sniff_format(&buffer), buffer));
    }

    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    BufReader::new(file).read_to_end(&mut buffer)?;
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
        _ => Format::Csv,
    };
    Ok((format, buffer))
}

pub fn format_inr(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-\u{20B9}{:.2}", amount.abs())
    } else {
        format!("\u{20B9}{:.2}", amount)
    }
}

// JSON input is always an object, CSV starts with a header row
fn sniff_format(bytes: &[u8]) -> Format {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Format::Json,
        _ => Format::Csv,
    }
}
