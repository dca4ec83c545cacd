//! CSV row reading shared by the record readers

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::str::FromStr;

/// Deserialize every row of a headed, whitespace-trimmed CSV file.
///
/// csv infers a type for each field, so a fractional amount reaches `Decimal`
/// as an `f64`. The `amount_column` text is parsed again as a decimal and
/// stored through `amount` so no digits are lost.
pub(crate) fn read_rows<T, R>(
    reader: R,
    amount_column: &str,
    amount: fn(&mut T) -> &mut Decimal,
) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let column = headers.iter().position(|h| h == amount_column);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut row: T = record.deserialize(Some(&headers))?;
        if let Some(exact) = column.and_then(|i| record.get(i)).and_then(parse_decimal) {
            *amount(&mut row) = exact;
        }
        rows.push(row);
    }
    Ok(rows)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
