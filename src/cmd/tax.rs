//! Tax command - slab-wise income tax for a single income figure

use super::format_inr;
use clap::{Args, ValueEnum};
use fintax::core::{
    parse_amount, DeductionClaims, DeductionPolicy, FiscalYear, HraClaim, Regime, TaxEngine,
    TaxReport,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct TaxCommand {
    /// Income in rupees (digit separators allowed, e.g. 12,00,000)
    #[arg(short, long, value_parser = parse_amount)]
    income: Decimal,

    /// Fiscal year (e.g., 2025 or 2025-26)
    #[arg(short, long, default_value = "2025")]
    year: FiscalYear,

    /// Tax regime
    #[arg(short, long, value_enum, default_value_t = RegimeArg::New)]
    regime: RegimeArg,

    /// Deduction to subtract from the income before applying slabs
    #[arg(short, long, value_enum, default_value_t = DeductionArg::None)]
    deduction: DeductionArg,

    #[command(flatten)]
    claims: ClaimArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Old regime deduction claims, in rupees
#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Section 80C investments (capped at 1,50,000)
    #[arg(long = "sec-80c", value_parser = parse_amount, default_value = "0")]
    section_80c: Decimal,

    /// Health insurance premium for self and family (80D, capped at 25,000)
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    health_self: Decimal,

    /// Health insurance premium for parents (80D, capped at 50,000)
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    health_parents: Decimal,

    /// Additional NPS contribution (80CCD(1B), capped at 50,000)
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    nps: Decimal,

    /// Savings account interest (80TTA, capped at 10,000)
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    savings_interest: Decimal,

    /// Education loan interest (80E)
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    education_loan_interest: Decimal,

    /// Annual rent paid, enables the HRA exemption
    #[arg(long, value_parser = parse_amount)]
    rent_paid: Option<Decimal>,

    /// Annual basic salary for the HRA exemption
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    basic_salary: Decimal,

    /// Annual HRA received from the employer
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    hra_received: Decimal,

    /// Rented home is in a metro city (50% of basic instead of 40%)
    #[arg(long)]
    metro: bool,
}

impl ClaimArgs {
    pub fn claims(&self) -> DeductionClaims {
        DeductionClaims {
            section_80c: self.section_80c,
            health_insurance_self: self.health_self,
            health_insurance_parents: self.health_parents,
            nps: self.nps,
            savings_interest: self.savings_interest,
            education_loan_interest: self.education_loan_interest,
            hra: self.rent_paid.map(|rent_paid| HraClaim {
                basic_salary: self.basic_salary,
                hra_received: self.hra_received,
                rent_paid,
                metro: self.metro,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum RegimeArg {
    #[default]
    New,
    Old,
}

impl From<RegimeArg> for Regime {
    fn from(arg: RegimeArg) -> Self {
        match arg {
            RegimeArg::New => Regime::New,
            RegimeArg::Old => Regime::Old,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum DeductionArg {
    /// Income is already taxable income
    #[default]
    None,
    /// Subtract the regime's standard deduction
    Standard,
}

impl From<DeductionArg> for DeductionPolicy {
    fn from(arg: DeductionArg) -> Self {
        match arg {
            DeductionArg::None => DeductionPolicy::None,
            DeductionArg::Standard => DeductionPolicy::Standard,
        }
    }
}

#[derive(Debug, Clone, Tabled)]
struct SlabRow {
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Tax")]
    tax: String,
}

impl TaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let engine = TaxEngine::for_year(self.year, self.regime.into())?;
        let report =
            engine.tax_with_claims(self.income, self.deduction.into(), &self.claims.claims())?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &TaxReport) {
    println!();
    println!(
        "INCOME TAX (FY {}, {} regime)",
        report.fiscal_year, report.regime
    );
    println!();
    println!(
        "  Gross: {} | Deduction: {} | Taxable: {}",
        format_inr(report.gross_income),
        format_inr(report.deduction),
        format_inr(report.taxable_income)
    );

    let rows: Vec<SlabRow> = report
        .slabs
        .iter()
        .map(|slab| SlabRow {
            band: match slab.upper {
                Some(upper) => format!("{} - {}", slab.lower, upper),
                None => format!("above {}", slab.lower),
            },
            rate: format!("{:.0}%", slab.rate * dec!(100)),
            income: format!("{:.2}", slab.income),
            tax: format!("{:.2}", slab.tax),
        })
        .collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    println!(
        "  Slab tax: {} | Rebate/relief: {} | Cess: {} | Rounding: {}",
        format_inr(report.slab_tax),
        format_inr(report.relief),
        format_inr(report.cess),
        format_inr(report.rounding)
    );
    println!();
    println!("TAX PAYABLE: {}", format_inr(report.tax_payable));
    println!();
}
