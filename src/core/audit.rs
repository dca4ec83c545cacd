//! Audit and risk scoring over a user's transaction history

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::Serialize;

use super::fiscal::FiscalYear;
use super::tax::{DeductionPolicy, TaxEngine, TaxReport};
use super::transaction::{RecordError, TransactionRecord};

const HIGH_RISK_RECOMMENDATION: &str =
    "High audit risk: verify unconfirmed transactions and attach proofs for large manual entries before filing.";
const LOW_RISK_RECOMMENDATION: &str =
    "Records look consistent: keep verifying new transactions to maintain your integrity score.";

/// Narration keywords of outflows that count as 80C investments
const INVESTMENT_KEYWORDS: &[&str] = &[
    "ppf",
    "lic",
    "elss",
    "provident",
    "life insurance",
    "sukanya",
    "tuition",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, JsonSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Evaluated in order: High, then Medium, then Low
    pub fn assess(integrity_score: Decimal, high_value_warning_count: usize) -> RiskLevel {
        if integrity_score < dec!(50) || high_value_warning_count > 0 {
            RiskLevel::High
        } else if integrity_score < dec!(80) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::High => HIGH_RISK_RECOMMENDATION,
            RiskLevel::Medium | RiskLevel::Low => LOW_RISK_RECOMMENDATION,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Income grouped by head. `other` catches every income category that is
/// neither salary nor business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
pub struct IncomeHeads {
    #[schemars(with = "f64")]
    pub salary: Decimal,
    #[schemars(with = "f64")]
    pub business: Decimal,
    #[schemars(with = "f64")]
    pub other: Decimal,
}

impl IncomeHeads {
    pub fn total(&self) -> Decimal {
        self.salary + self.business + self.other
    }

    fn add(&mut self, category: &str, amount: Decimal) {
        match category.trim().to_lowercase().as_str() {
            "salary" => self.salary += amount,
            "business" => self.business += amount,
            _ => self.other += amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub enum AnomalyKind {
    /// Cash credited to the account
    CashDeposit,
    /// At or above the statement-of-financial-transactions reporting limit
    HighValueTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[schemars(with = "String")]
    pub date: NaiveDate,
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

impl Anomaly {
    pub fn message(&self) -> String {
        match self.kind {
            AnomalyKind::CashDeposit => {
                format!("Cash deposit of \u{20B9}{} on {}", self.amount, self.date)
            }
            AnomalyKind::HighValueTransaction => format!(
                "High value transaction of \u{20B9}{} on {} may be reported to the tax department",
                self.amount, self.date
            ),
        }
    }
}

/// A claimed 80C figure set against the investments the history shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct InvestmentCheck {
    #[schemars(with = "f64")]
    pub claimed: Decimal,
    /// Matching outflows plus the EPF assumed to be withheld from salary
    #[schemars(with = "f64")]
    pub proven: Decimal,
    #[schemars(with = "f64")]
    pub gap: Decimal,
    /// Claim exceeds the proven amount by more than half
    pub overclaimed: bool,
}

/// Compare `claimed_80c` with investment outflows among `transactions`.
///
/// EPF never reaches the bank account, so 12% of an assumed basic pay of
/// 40% of `gross_salary` is counted as proven.
pub fn verify_investments<'a, I>(
    transactions: I,
    claimed_80c: Decimal,
    gross_salary: Decimal,
) -> InvestmentCheck
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let outflows: Decimal = transactions
        .into_iter()
        .filter(|r| !r.is_income() && is_investment(r))
        .map(|r| r.amount)
        .sum();
    let estimated_epf = gross_salary * dec!(0.40) * dec!(0.12);
    let proven = outflows + estimated_epf;

    InvestmentCheck {
        claimed: claimed_80c,
        proven,
        gap: (claimed_80c - proven).max(Decimal::ZERO),
        overclaimed: claimed_80c > proven * dec!(1.5),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct AuditReport {
    pub total_count: usize,
    pub verified_count: usize,
    /// Percentage of verified records, one decimal place
    #[schemars(with = "f64")]
    pub integrity_score: Decimal,
    pub risk_level: RiskLevel,
    pub unverified_count: usize,
    #[schemars(with = "f64")]
    pub unverified_amount: Decimal,
    pub high_value_warning_count: usize,
    pub income_heads: IncomeHeads,
    pub tax_estimate: TaxReport,
    pub recommendation: &'static str,
    pub anomalies: Vec<Anomaly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_check: Option<InvestmentCheck>,
}

/// Audit scorer with its thresholds and the engine used for the tax estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analyzer {
    engine: TaxEngine,
    deduction_policy: DeductionPolicy,
    /// Unverified records above this count as high value warnings
    high_value_threshold: Decimal,
    /// Records at or above this are reportable anomalies
    reporting_limit: Decimal,
    /// Restricts income heads and the tax estimate to one fiscal year
    estimate_year: Option<FiscalYear>,
    claimed_80c: Option<Decimal>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer {
            engine: TaxEngine::default(),
            deduction_policy: DeductionPolicy::None,
            high_value_threshold: dec!(50000),
            reporting_limit: dec!(200000),
            estimate_year: None,
            claimed_80c: None,
        }
    }
}

impl Analyzer {
    pub fn new(engine: TaxEngine) -> Self {
        Analyzer {
            engine,
            ..Analyzer::default()
        }
    }

    pub fn with_deduction_policy(mut self, policy: DeductionPolicy) -> Self {
        self.deduction_policy = policy;
        self
    }

    /// Count only income dated in `fiscal_year` towards the income heads, the
    /// tax estimate and the investment check. Scores and anomalies still
    /// cover every record.
    pub fn with_estimate_year(mut self, fiscal_year: FiscalYear) -> Self {
        self.estimate_year = Some(fiscal_year);
        self
    }

    /// Check a claimed 80C amount against the investments in the history
    pub fn with_claimed_80c(mut self, claimed: Decimal) -> Self {
        self.claimed_80c = Some(claimed);
        self
    }

    fn in_estimate(&self, record: &TransactionRecord) -> bool {
        self.estimate_year
            .map_or(true, |fy| fy.contains(record.occurred_on))
    }

    pub fn analyze(&self, transactions: &[TransactionRecord]) -> Result<AuditReport, RecordError> {
        for record in transactions {
            record.validate()?;
        }

        let total_count = transactions.len();
        let mut verified_count = 0;
        let mut unverified_amount = Decimal::ZERO;
        let mut high_value_warning_count = 0;
        let mut income_heads = IncomeHeads::default();
        let mut anomalies = Vec::new();

        for record in transactions {
            if record.is_verified() {
                verified_count += 1;
            } else {
                unverified_amount += record.amount;
                if record.amount > self.high_value_threshold {
                    high_value_warning_count += 1;
                }
            }

            if record.is_income() {
                if self.in_estimate(record) {
                    income_heads.add(&record.category, record.amount);
                }
                if is_cash_deposit(record) {
                    anomalies.push(anomaly(record, AnomalyKind::CashDeposit, RiskLevel::High));
                }
            }
            if record.amount >= self.reporting_limit {
                anomalies.push(anomaly(
                    record,
                    AnomalyKind::HighValueTransaction,
                    RiskLevel::Medium,
                ));
            }
        }

        let integrity_score = integrity_score(verified_count, total_count);
        let risk_level = RiskLevel::assess(integrity_score, high_value_warning_count);
        let tax_estimate = self
            .engine
            .tax_on_gross_income(income_heads.total(), self.deduction_policy)?;
        let investment_check = self.claimed_80c.map(|claimed| {
            let scoped = transactions.iter().filter(|r| self.in_estimate(r));
            verify_investments(scoped, claimed, income_heads.salary)
        });

        log::debug!(
            "audited {} records: {} verified, score {}, {} high value warnings, heads {:?}",
            total_count,
            verified_count,
            integrity_score,
            high_value_warning_count,
            income_heads
        );

        Ok(AuditReport {
            total_count,
            verified_count,
            integrity_score,
            risk_level,
            unverified_count: total_count - verified_count,
            unverified_amount,
            high_value_warning_count,
            income_heads,
            tax_estimate,
            recommendation: risk_level.recommendation(),
            anomalies,
            investment_check,
        })
    }
}

fn anomaly(record: &TransactionRecord, kind: AnomalyKind, severity: RiskLevel) -> Anomaly {
    Anomaly {
        kind,
        severity,
        id: record.id.clone(),
        date: record.occurred_on,
        amount: record.amount,
    }
}

/// Audit with the default FY 2025-26 new-regime engine and no deduction
pub fn analyze(transactions: &[TransactionRecord]) -> Result<AuditReport, RecordError> {
    Analyzer::default().analyze(transactions)
}

/// An empty history has nothing unverified, so it scores 100
fn integrity_score(verified: usize, total: usize) -> Decimal {
    if total == 0 {
        return dec!(100);
    }
    (Decimal::from(verified) / Decimal::from(total) * dec!(100)).round_dp(1)
}

fn is_investment(record: &TransactionRecord) -> bool {
    record.description.as_deref().is_some_and(|d| {
        let d = d.to_lowercase();
        INVESTMENT_KEYWORDS.iter().any(|k| d.contains(k))
    })
}

fn is_cash_deposit(record: &TransactionRecord) -> bool {
    record
        .description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains("cash deposit"))
}
