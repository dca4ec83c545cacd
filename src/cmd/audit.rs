//! Audit command - integrity score, risk level and tax estimate for a transaction file

use super::tax::{DeductionArg, RegimeArg};
use super::{format_inr, read_transactions};
use clap::Args;
use fintax::core::{
    filter_fiscal_year, latest_fiscal_year, parse_amount, Analyzer, AuditReport, FiscalYear,
    RiskLevel, TaxEngine,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct AuditCommand {
    /// CSV or JSON file containing transactions ("-" for stdin)
    #[arg(short, long)]
    transactions: PathBuf,

    /// Only audit this fiscal year (e.g., 2025 or 2025-26). Without it every
    /// record is scored and income is estimated for the latest fiscal year.
    #[arg(short, long)]
    year: Option<FiscalYear>,

    /// Regime used for the tax estimate
    #[arg(short, long, value_enum, default_value_t = RegimeArg::New)]
    regime: RegimeArg,

    /// Deduction applied to total income before the tax estimate
    #[arg(short, long, value_enum, default_value_t = DeductionArg::None)]
    deduction: DeductionArg,

    /// Section 80C amount to check against investment outflows
    #[arg(long, value_parser = parse_amount)]
    claimed_80c: Option<Decimal>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl AuditCommand {
    pub fn exec(&self) -> anyhow::Result<ExitCode> {
        let all_records = read_transactions(&self.transactions)?;

        let records = match self.year {
            Some(year) => filter_fiscal_year(&all_records, year),
            None => all_records,
        };

        let regime = self.regime.into();
        let latest = latest_fiscal_year(&records);
        let engine = match self.year {
            Some(year) => TaxEngine::for_year(year, regime)?,
            None => {
                let year = latest.unwrap_or_default();
                TaxEngine::for_year(year, regime).or_else(|err| {
                    log::warn!("{}, estimating with FY {} rules", err, FiscalYear::default());
                    TaxEngine::for_year(FiscalYear::default(), regime)
                })?
            }
        };

        let mut analyzer = Analyzer::new(engine).with_deduction_policy(self.deduction.into());
        // Several years of income must not be taxed as one year's
        if let (None, Some(latest)) = (self.year, latest) {
            log::info!("Estimating tax on income from FY {}", latest);
            analyzer = analyzer.with_estimate_year(latest);
        }
        if let Some(claimed) = self.claimed_80c {
            analyzer = analyzer.with_claimed_80c(claimed);
        }
        let report = analyzer.analyze(&records)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report, self.year);
        }

        // Exit with code 1 when the history is high risk
        if report.risk_level == RiskLevel::High {
            return Ok(ExitCode::from(1));
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_report(report: &AuditReport, year: Option<FiscalYear>) {
    let year_str = year.map_or("All Years".to_string(), |y| format!("FY {}", y));

    println!();
    println!("AUDIT REPORT ({})", year_str);
    println!();
    println!(
        "  Transactions: {} | Verified: {} | Unverified: {} ({})",
        report.total_count,
        report.verified_count,
        report.unverified_count,
        format_inr(report.unverified_amount)
    );
    println!(
        "  Integrity score: {:.1}% | Risk: {}",
        report.integrity_score, report.risk_level
    );
    println!(
        "  High value warnings: {}",
        report.high_value_warning_count
    );
    println!();

    let heads = &report.income_heads;
    println!("INCOME HEADS");
    println!(
        "  Salary: {} | Business: {} | Other: {}",
        format_inr(heads.salary),
        format_inr(heads.business),
        format_inr(heads.other)
    );
    println!(
        "  Estimated tax (FY {}, {} regime): {}",
        report.tax_estimate.fiscal_year,
        report.tax_estimate.regime,
        format_inr(report.tax_estimate.tax_payable)
    );
    println!();

    if let Some(check) = &report.investment_check {
        println!("80C PROOF CHECK");
        println!(
            "  Claimed: {} | Proven: {} | Gap: {}",
            format_inr(check.claimed),
            format_inr(check.proven),
            format_inr(check.gap)
        );
        if check.overclaimed {
            println!("  \u{26A0} Claim is more than 1.5x the investments on record");
        }
        println!();
    }

    if !report.anomalies.is_empty() {
        println!("\u{26A0} {} anomaly(ies):", report.anomalies.len());
        for (i, anomaly) in report.anomalies.iter().enumerate() {
            println!("  {}. [{}] {}", i + 1, anomaly.severity, anomaly.message());
        }
        println!();
    }

    println!("{}", report.recommendation);
    println!();
}
