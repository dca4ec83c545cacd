//! Compare command - old versus new regime for the same income and claims

use super::format_inr;
use super::tax::{ClaimArgs, DeductionArg};
use clap::Args;
use fintax::core::{compare_regimes, parse_amount, FiscalYear, RegimeComparison, TaxReport};
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CompareCommand {
    /// Gross income in rupees (digit separators allowed, e.g. 16,00,000)
    #[arg(short, long, value_parser = parse_amount)]
    income: Decimal,

    /// Fiscal year (e.g., 2025 or 2025-26)
    #[arg(short, long, default_value = "2025")]
    year: FiscalYear,

    /// Standard deduction applies to salaried income
    #[arg(short, long, value_enum, default_value_t = DeductionArg::Standard)]
    deduction: DeductionArg,

    #[command(flatten)]
    claims: ClaimArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct RegimeRow {
    #[tabled(rename = "Regime")]
    regime: String,
    #[tabled(rename = "Deductions")]
    deduction: String,
    #[tabled(rename = "Taxable")]
    taxable: String,
    #[tabled(rename = "Tax payable")]
    tax: String,
}

impl From<&TaxReport> for RegimeRow {
    fn from(report: &TaxReport) -> Self {
        RegimeRow {
            regime: report.regime.to_string(),
            deduction: format_inr(report.deduction),
            taxable: format_inr(report.taxable_income),
            tax: format_inr(report.tax_payable),
        }
    }
}

impl CompareCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let comparison = compare_regimes(
            self.year,
            self.income,
            self.deduction.into(),
            &self.claims.claims(),
        )?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        } else {
            print_comparison(&comparison, self.year);
        }
        Ok(())
    }
}

fn print_comparison(comparison: &RegimeComparison, year: FiscalYear) {
    println!();
    println!("REGIME COMPARISON (FY {})", year);
    println!();

    let allowed = &comparison.allowed_deductions;
    println!(
        "  Old regime claims: 80C {} | 80D {} | NPS {} | 80TTA {} | 80E {} | HRA {}",
        format_inr(allowed.section_80c),
        format_inr(allowed.section_80d),
        format_inr(allowed.nps),
        format_inr(allowed.section_80tta),
        format_inr(allowed.section_80e),
        format_inr(allowed.hra_exemption)
    );

    let rows = vec![RegimeRow::from(&comparison.old), RegimeRow::from(&comparison.new)];
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    println!();
    println!(
        "RECOMMENDED: {} regime (saves {})",
        comparison.recommended,
        format_inr(comparison.savings)
    );
    println!();
}
