pub mod audit;
pub mod deductions;
pub mod fiscal;
mod input;
pub mod schema;
pub mod tax;
pub mod transaction;
pub mod wealth;

// Flat public surface for domain types and functions.
pub use audit::{
    analyze, verify_investments, Analyzer, Anomaly, AnomalyKind, AuditReport, IncomeHeads,
    InvestmentCheck, RiskLevel,
};
pub use deductions::{AllowedDeductions, DeductionClaims, HraClaim};
pub use fiscal::{FiscalYear, Regime, Slab, TaxRules};
pub use schema::{csv_header, CsvField};
pub use tax::{
    compare_regimes, compute_tax, parse_amount, DeductionPolicy, RegimeComparison, SlabCharge,
    TaxEngine, TaxError, TaxReport,
};
pub use transaction::{
    filter_fiscal_year, latest_fiscal_year, RecordError, TransactionInput, TransactionKind,
    TransactionRecord,
};
pub use wealth::{net_worth, NetWorth, WealthInput, WealthItem, WealthKind};
