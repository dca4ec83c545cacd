use fintax_derive::CsvSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

use super::input;
use super::schema::CsvField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WealthKind {
    Asset,
    Liability,
}

/// Input root for wealth JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WealthInput {
    pub items: Vec<WealthItem>,
}

/// An asset or liability held by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, CsvSchema)]
pub struct WealthItem {
    /// Display name (e.g., "Home loan", "PPF")
    pub name: String,
    /// asset or liability
    #[serde(rename = "type")]
    pub kind: WealthKind,
    /// Current value in rupees
    #[schemars(with = "f64")]
    pub amount: Decimal,
    /// Optional grouping
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
pub struct NetWorth {
    #[schemars(with = "f64")]
    pub assets: Decimal,
    #[schemars(with = "f64")]
    pub liabilities: Decimal,
    #[schemars(with = "f64")]
    pub net: Decimal,
}

pub fn net_worth(items: &[WealthItem]) -> NetWorth {
    let (assets, liabilities) =
        items
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(a, l), item| match item.kind {
                WealthKind::Asset => (a + item.amount, l),
                WealthKind::Liability => (a, l + item.amount),
            });
    NetWorth {
        assets,
        liabilities,
        net: assets - liabilities,
    }
}

fn amount_mut(item: &mut WealthItem) -> &mut Decimal {
    &mut item.amount
}

pub fn read_csv<R: Read>(reader: R) -> anyhow::Result<Vec<WealthItem>> {
    Ok(input::read_rows(reader, "amount", amount_mut)?)
}

pub fn read_json<R: Read>(reader: R) -> anyhow::Result<Vec<WealthItem>> {
    let input: WealthInput = serde_json::from_reader(reader)?;
    Ok(input.items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(kind: WealthKind, amount: Decimal) -> WealthItem {
        WealthItem {
            name: "x".to_string(),
            kind,
            amount,
            category: None,
        }
    }

    #[test]
    fn assets_minus_liabilities() {
        let items = vec![
            item(WealthKind::Asset, dec!(2500000)),
            item(WealthKind::Asset, dec!(150000.50)),
            item(WealthKind::Liability, dec!(1800000)),
        ];
        let worth = net_worth(&items);
        assert_eq!(worth.assets, dec!(2650000.50));
        assert_eq!(worth.liabilities, dec!(1800000));
        assert_eq!(worth.net, dec!(850000.50));
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(net_worth(&[]), NetWorth::default());
    }

    #[test]
    fn net_can_be_negative() {
        let items = vec![
            item(WealthKind::Asset, dec!(100)),
            item(WealthKind::Liability, dec!(400)),
        ];
        assert_eq!(net_worth(&items).net, dec!(-300));
    }

    #[test]
    fn parse_csv_and_json() {
        let csv_data = "name,type,amount,category
House,asset,5000000,property
Home loan,liability,3200000,";
        let items = read_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].kind, WealthKind::Liability);
        assert_eq!(items[1].category, None);

        let json_data = r#"{"items": [{"name": "PPF", "type": "asset", "amount": "120000"}]}"#;
        let items = read_json(json_data.as_bytes()).unwrap();
        assert_eq!(items[0].amount, dec!(120000));
    }

    #[test]
    fn large_fractional_values_are_exact() {
        let csv_data = "name,type,amount\nGold,asset,9876543210987654.32";
        assert_eq!(
            read_csv(csv_data.as_bytes()).unwrap()[0].amount,
            dec!(9876543210987654.32)
        );

        let json_data = r#"{"items": [{"name": "Gold", "type": "asset", "amount": 9876543210987654.32}]}"#;
        assert_eq!(
            read_json(json_data.as_bytes()).unwrap()[0].amount,
            dec!(9876543210987654.32)
        );
    }
}
