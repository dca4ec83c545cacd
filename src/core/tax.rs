use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::deductions::{AllowedDeductions, DeductionClaims};
use super::fiscal::{FiscalYear, Regime, TaxRules};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TaxError {
    #[error("taxable income cannot be negative: {0}")]
    NegativeIncome(Decimal),
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("no tax rules for fiscal year {0}")]
    UnsupportedFiscalYear(FiscalYear),
    #[error("invalid fiscal year: {0:?} (expected e.g. 2025 or 2025-26)")]
    InvalidFiscalYear(String),
    #[error("deduction under {section} cannot be negative: {amount}")]
    NegativeDeduction {
        section: &'static str,
        amount: Decimal,
    },
}

/// Which deduction to take off gross income before the slabs are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeductionPolicy {
    /// Gross income is already the taxable income
    #[default]
    None,
    /// Subtract the regime's flat standard deduction
    Standard,
}

/// Tax charged within one slab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SlabCharge {
    #[schemars(with = "f64")]
    pub lower: Decimal,
    #[schemars(with = "Option<f64>")]
    pub upper: Option<Decimal>,
    #[schemars(with = "f64")]
    pub rate: Decimal,
    /// Income falling inside the slab
    #[schemars(with = "f64")]
    pub income: Decimal,
    #[schemars(with = "f64")]
    pub tax: Decimal,
}

/// Tax computation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TaxReport {
    pub fiscal_year: FiscalYear,
    pub regime: Regime,
    #[schemars(with = "f64")]
    pub gross_income: Decimal,
    #[schemars(with = "f64")]
    pub deduction: Decimal,
    #[schemars(with = "f64")]
    pub taxable_income: Decimal,
    /// Sum of the per-slab charges, before rebate and relief
    #[schemars(with = "f64")]
    pub slab_tax: Decimal,
    /// Amount removed by the rebate or by marginal relief
    #[schemars(with = "f64")]
    pub relief: Decimal,
    /// Cess on the tax after relief, unrounded
    #[schemars(with = "f64")]
    pub cess: Decimal,
    /// Adjustment to whole rupees: tax_payable = slab_tax - relief + cess + rounding
    #[schemars(with = "f64")]
    pub rounding: Decimal,
    #[schemars(with = "f64")]
    pub tax_payable: Decimal,
    pub slabs: Vec<SlabCharge>,
}

/// Progressive slab calculator for one fiscal year and regime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxEngine {
    rules: TaxRules,
}

impl TaxEngine {
    pub fn new(rules: TaxRules) -> Self {
        TaxEngine { rules }
    }

    pub fn for_year(fiscal_year: FiscalYear, regime: Regime) -> Result<Self, TaxError> {
        TaxRules::for_year(fiscal_year, regime).map(TaxEngine::new)
    }

    pub fn rules(&self) -> &TaxRules {
        &self.rules
    }

    /// Tax payable on an income that is already net of deductions
    pub fn tax_on_taxable_income(&self, taxable_income: Decimal) -> Result<TaxReport, TaxError> {
        self.tax_on_gross_income(taxable_income, DeductionPolicy::None)
    }

    /// Tax payable on gross income after applying `policy`
    pub fn tax_on_gross_income(
        &self,
        gross_income: Decimal,
        policy: DeductionPolicy,
    ) -> Result<TaxReport, TaxError> {
        self.compute(gross_income, policy, Decimal::ZERO)
    }

    /// Like [`tax_on_gross_income`](Self::tax_on_gross_income), and under the
    /// old regime also subtracts the allowed Chapter VI-A claims and HRA
    /// exemption. The new regime ignores `claims` beyond validating them.
    pub fn tax_with_claims(
        &self,
        gross_income: Decimal,
        policy: DeductionPolicy,
        claims: &DeductionClaims,
    ) -> Result<TaxReport, TaxError> {
        let allowed = claims.allowed()?;
        let itemized = match self.rules.regime {
            Regime::Old => allowed.total(),
            Regime::New => Decimal::ZERO,
        };
        self.compute(gross_income, policy, itemized)
    }

    fn compute(
        &self,
        gross_income: Decimal,
        policy: DeductionPolicy,
        itemized: Decimal,
    ) -> Result<TaxReport, TaxError> {
        if gross_income < Decimal::ZERO {
            return Err(TaxError::NegativeIncome(gross_income));
        }

        let standard = match policy {
            DeductionPolicy::None => Decimal::ZERO,
            DeductionPolicy::Standard => self.rules.standard_deduction,
        };
        let deduction = (standard + itemized).min(gross_income);
        let taxable_income = gross_income - deduction;

        let slabs: Vec<SlabCharge> = self
            .rules
            .slabs
            .iter()
            .map(|slab| {
                let income = slab.portion(taxable_income);
                SlabCharge {
                    lower: slab.lower,
                    upper: slab.upper,
                    rate: slab.rate,
                    income,
                    tax: income * slab.rate,
                }
            })
            .collect();
        let slab_tax: Decimal = slabs.iter().map(|s| s.tax).sum();

        let after_relief = if taxable_income <= self.rules.rebate_limit {
            Decimal::ZERO
        } else if self.rules.marginal_relief {
            slab_tax.min(taxable_income - self.rules.rebate_limit)
        } else {
            slab_tax
        };
        let relief = slab_tax - after_relief;

        let cess = after_relief * self.rules.cess_rate;
        let tax_payable = (after_relief + cess)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        let rounding = tax_payable - after_relief - cess;

        log::debug!(
            "{} regime {}: taxable {} slab tax {} relief {} payable {}",
            self.rules.regime,
            self.rules.fiscal_year,
            taxable_income,
            slab_tax,
            relief,
            tax_payable
        );

        Ok(TaxReport {
            fiscal_year: self.rules.fiscal_year,
            regime: self.rules.regime,
            gross_income,
            deduction,
            taxable_income,
            slab_tax,
            relief,
            cess,
            rounding,
            tax_payable,
            slabs,
        })
    }
}

/// Old and new regime computed side by side for the same income and claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct RegimeComparison {
    /// Claims the old regime accepts, after limits
    pub allowed_deductions: AllowedDeductions,
    pub old: TaxReport,
    pub new: TaxReport,
    pub recommended: Regime,
    /// Tax saved by the recommended regime over the other one
    #[schemars(with = "f64")]
    pub savings: Decimal,
}

/// Compute both regimes for `fiscal_year` and pick the cheaper one. A tie
/// goes to the new regime, the default when a filer does not opt out.
pub fn compare_regimes(
    fiscal_year: FiscalYear,
    gross_income: Decimal,
    policy: DeductionPolicy,
    claims: &DeductionClaims,
) -> Result<RegimeComparison, TaxError> {
    let allowed_deductions = claims.allowed()?;
    let old = TaxEngine::for_year(fiscal_year, Regime::Old)?
        .tax_with_claims(gross_income, policy, claims)?;
    let new = TaxEngine::for_year(fiscal_year, Regime::New)?
        .tax_with_claims(gross_income, policy, claims)?;

    let recommended = if old.tax_payable < new.tax_payable {
        Regime::Old
    } else {
        Regime::New
    };
    let savings = (old.tax_payable - new.tax_payable).abs();
    log::debug!(
        "FY {}: old {} new {}, {} regime saves {}",
        fiscal_year,
        old.tax_payable,
        new.tax_payable,
        recommended,
        savings
    );

    Ok(RegimeComparison {
        allowed_deductions,
        old,
        new,
        recommended,
        savings,
    })
}

/// Tax payable under the FY 2025-26 new regime
pub fn compute_tax(taxable_income: Decimal) -> Result<Decimal, TaxError> {
    TaxEngine::default()
        .tax_on_taxable_income(taxable_income)
        .map(|report| report.tax_payable)
}

/// Parse a user supplied amount, allowing `_` and `,` as digit separators
pub fn parse_amount(s: &str) -> Result<Decimal, TaxError> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    Decimal::from_str(&cleaned).map_err(|_| TaxError::InvalidAmount(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deductions::HraClaim;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_income_pays_nothing() {
        assert_eq!(compute_tax(dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn rebate_covers_income_up_to_limit() {
        assert_eq!(compute_tax(dec!(1200000)).unwrap(), dec!(0));
        assert_eq!(compute_tax(dec!(1199999.99)).unwrap(), dec!(0));
        assert_eq!(compute_tax(dec!(850000)).unwrap(), dec!(0));
    }

    #[test]
    fn marginal_relief_just_above_limit() {
        // slab tax is 60,000.15 but only 1 rupee was earned above the limit
        assert_eq!(compute_tax(dec!(1200001)).unwrap(), dec!(1));

        let report = TaxEngine::default()
            .tax_on_taxable_income(dec!(1200001))
            .unwrap();
        assert_eq!(report.slab_tax, dec!(60000.15));
        assert_eq!(report.relief, dec!(59999.15));
    }

    #[test]
    fn marginal_relief_bounded_by_excess() {
        for excess in [1, 10, 100, 1000, 10000, 50000, 70000] {
            let income = dec!(1200000) + Decimal::from(excess);
            let tax = compute_tax(income).unwrap();
            let cap = (Decimal::from(excess) * dec!(1.04)).round();
            assert!(tax <= cap, "income {income}: {tax} > {cap}");
        }
    }

    #[test]
    fn relief_stops_binding_once_slab_tax_is_lower() {
        // slab tax 20,000 + 40,000 + 0.15 * 100,000 = 75,000 against an excess of 100,000
        let report = TaxEngine::default()
            .tax_on_taxable_income(dec!(1300000))
            .unwrap();
        assert_eq!(report.relief, dec!(0));
        assert_eq!(report.tax_payable, dec!(78000));
    }

    #[test]
    fn full_bands_to_1_6_million() {
        assert_eq!(compute_tax(dec!(1600000)).unwrap(), dec!(124800));
    }

    #[test]
    fn top_rate_applies_only_to_excess() {
        assert_eq!(compute_tax(dec!(3000000)).unwrap(), dec!(499200));

        let report = TaxEngine::default()
            .tax_on_taxable_income(dec!(3000000))
            .unwrap();
        let top = report.slabs.last().unwrap();
        assert_eq!(top.income, dec!(600000));
        assert_eq!(top.tax, dec!(180000));
        assert_eq!(report.slab_tax, dec!(480000));
        assert_eq!(report.cess, dec!(19200));
    }

    #[test]
    fn cess_is_never_negative_after_rounding() {
        // 1.4 after relief, cess 0.056, and 1.456 rounds down to 1
        let report = TaxEngine::default()
            .tax_on_taxable_income(dec!(1200001.4))
            .unwrap();
        assert_eq!(report.cess, dec!(0.056));
        assert_eq!(report.rounding, dec!(-0.456));
        assert_eq!(report.tax_payable, dec!(1));

        for income in [dec!(1200000.6), dec!(1200002.49), dec!(1612345.67), dec!(2500000.01)] {
            let report = TaxEngine::default().tax_on_taxable_income(income).unwrap();
            assert!(report.cess >= Decimal::ZERO, "cess {} at {income}", report.cess);
            assert_eq!(
                report.slab_tax - report.relief + report.cess + report.rounding,
                report.tax_payable
            );
        }
    }

    #[test]
    fn result_is_whole_rupees() {
        let tax = compute_tax(dec!(1612345.67)).unwrap();
        assert_eq!(tax, tax.trunc());
        // 120,000 + 0.20 * 12,345.67 = 122,469.134, * 1.04 = 127,367.89936
        assert_eq!(tax, dec!(127368));
    }

    #[test]
    fn half_rupee_rounds_to_even() {
        // 6.25 * 1.04 = 6.5 and 18.75 * 1.04 = 19.5
        assert_eq!(compute_tax(dec!(1200006.25)).unwrap(), dec!(6));
        assert_eq!(compute_tax(dec!(1200018.75)).unwrap(), dec!(20));
        // 90,000 * 1.04 = 93,600 exactly
        assert_eq!(compute_tax(dec!(1400000)).unwrap(), dec!(93600));
    }

    #[test]
    fn monotonic_in_income() {
        let mut previous = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        while income <= dec!(3000000) {
            let tax = compute_tax(income).unwrap();
            assert!(tax >= previous, "tax fell at {income}: {tax} < {previous}");
            previous = tax;
            income += dec!(2500);
        }
    }

    #[test]
    fn monotonic_around_rebate_limit() {
        let mut previous = Decimal::ZERO;
        for step in 0..2000 {
            let income = dec!(1199000) + Decimal::from(step * 50);
            let tax = compute_tax(income).unwrap();
            assert!(tax >= previous, "tax fell at {income}");
            previous = tax;
        }
    }

    #[test]
    fn deterministic() {
        let engine = TaxEngine::default();
        let a = engine.tax_on_taxable_income(dec!(2222222)).unwrap();
        let b = engine.tax_on_taxable_income(dec!(2222222)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn negative_income_rejected() {
        assert_eq!(
            compute_tax(dec!(-1)),
            Err(TaxError::NegativeIncome(dec!(-1)))
        );
    }

    #[test]
    fn standard_deduction_path() {
        let engine = TaxEngine::default();
        let report = engine
            .tax_on_gross_income(dec!(1275000), DeductionPolicy::Standard)
            .unwrap();
        assert_eq!(report.deduction, dec!(75000));
        assert_eq!(report.taxable_income, dec!(1200000));
        assert_eq!(report.tax_payable, dec!(0));

        let raw = engine
            .tax_on_gross_income(dec!(1275000), DeductionPolicy::None)
            .unwrap();
        assert_eq!(raw.deduction, dec!(0));
        assert!(raw.tax_payable > Decimal::ZERO);
    }

    #[test]
    fn standard_deduction_floors_at_zero() {
        let report = TaxEngine::default()
            .tax_on_gross_income(dec!(30000), DeductionPolicy::Standard)
            .unwrap();
        assert_eq!(report.deduction, dec!(30000));
        assert_eq!(report.taxable_income, dec!(0));
        assert_eq!(report.tax_payable, dec!(0));
    }

    #[test]
    fn old_regime_has_no_marginal_relief() {
        let engine = TaxEngine::for_year(FiscalYear(2025), Regime::Old).unwrap();
        assert_eq!(
            engine.tax_on_taxable_income(dec!(500000)).unwrap().tax_payable,
            dec!(0)
        );
        // 12,500 + 0.20 * 100,000 = 32,500, * 1.04
        assert_eq!(
            engine.tax_on_taxable_income(dec!(600000)).unwrap().tax_payable,
            dec!(33800)
        );
        // 12,500 + 100,000 + 0.30 * 500,000 = 262,500, * 1.04
        assert_eq!(
            engine.tax_on_taxable_income(dec!(1500000)).unwrap().tax_payable,
            dec!(273000)
        );
    }

    #[test]
    fn new_regime_2024_slabs() {
        let engine = TaxEngine::for_year(FiscalYear(2024), Regime::New).unwrap();
        assert_eq!(
            engine.tax_on_taxable_income(dec!(700000)).unwrap().tax_payable,
            dec!(0)
        );
        // 20,000 + 30,000 + 30,000 + 60,000 + 0.30 * 500,000 = 290,000, * 1.04
        assert_eq!(
            engine.tax_on_taxable_income(dec!(2000000)).unwrap().tax_payable,
            dec!(301600)
        );
    }

    fn generous_claims() -> DeductionClaims {
        DeductionClaims {
            section_80c: dec!(150000),
            health_insurance_self: dec!(25000),
            health_insurance_parents: dec!(50000),
            nps: dec!(50000),
            education_loan_interest: dec!(200000),
            hra: Some(HraClaim {
                basic_salary: dec!(800000),
                hra_received: dec!(400000),
                rent_paid: dec!(480000),
                metro: true,
            }),
            ..DeductionClaims::default()
        }
    }

    #[test]
    fn old_regime_subtracts_claims() {
        let engine = TaxEngine::for_year(FiscalYear(2025), Regime::Old).unwrap();
        let claims = DeductionClaims {
            section_80c: dec!(200000),
            health_insurance_self: dec!(30000),
            health_insurance_parents: dec!(40000),
            nps: dec!(50000),
            savings_interest: dec!(15000),
            education_loan_interest: dec!(20000),
            hra: None,
        };
        let report = engine
            .tax_with_claims(dec!(1500000), DeductionPolicy::Standard, &claims)
            .unwrap();
        // 50,000 standard + 150,000 + 65,000 + 50,000 + 10,000 + 20,000
        assert_eq!(report.deduction, dec!(345000));
        assert_eq!(report.taxable_income, dec!(1155000));
        // 12,500 + 100,000 + 46,500 = 159,000, * 1.04
        assert_eq!(report.tax_payable, dec!(165360));
    }

    #[test]
    fn new_regime_ignores_claims() {
        let engine = TaxEngine::default();
        let with_claims = engine
            .tax_with_claims(dec!(1500000), DeductionPolicy::Standard, &generous_claims())
            .unwrap();
        let without = engine
            .tax_on_gross_income(dec!(1500000), DeductionPolicy::Standard)
            .unwrap();
        assert_eq!(with_claims, without);
    }

    #[test]
    fn claims_never_push_taxable_income_below_zero() {
        let engine = TaxEngine::for_year(FiscalYear(2025), Regime::Old).unwrap();
        let report = engine
            .tax_with_claims(dec!(300000), DeductionPolicy::Standard, &generous_claims())
            .unwrap();
        assert_eq!(report.deduction, dec!(300000));
        assert_eq!(report.taxable_income, dec!(0));
    }

    #[test]
    fn negative_claims_rejected_in_either_regime() {
        let claims = DeductionClaims {
            section_80c: dec!(-5),
            ..DeductionClaims::default()
        };
        assert!(TaxEngine::default()
            .tax_with_claims(dec!(100000), DeductionPolicy::None, &claims)
            .is_err());
    }

    #[test]
    fn comparison_recommends_new_regime_for_few_claims() {
        let claims = DeductionClaims {
            section_80c: dec!(200000),
            health_insurance_self: dec!(30000),
            health_insurance_parents: dec!(40000),
            nps: dec!(50000),
            savings_interest: dec!(15000),
            education_loan_interest: dec!(20000),
            hra: None,
        };
        let comparison =
            compare_regimes(FiscalYear(2025), dec!(1500000), DeductionPolicy::Standard, &claims)
                .unwrap();
        assert_eq!(comparison.old.tax_payable, dec!(165360));
        // 1,425,000 taxable: 20,000 + 40,000 + 33,750 = 93,750, * 1.04
        assert_eq!(comparison.new.tax_payable, dec!(97500));
        assert_eq!(comparison.recommended, Regime::New);
        assert_eq!(comparison.savings, dec!(67860));
        assert_eq!(comparison.allowed_deductions.total(), dec!(295000));
    }

    #[test]
    fn comparison_recommends_old_regime_for_heavy_claims() {
        let comparison = compare_regimes(
            FiscalYear(2025),
            dec!(1600000),
            DeductionPolicy::Standard,
            &generous_claims(),
        )
        .unwrap();
        // old: 1,600,000 - 50,000 - 875,000 = 675,000 taxable
        assert_eq!(comparison.old.taxable_income, dec!(675000));
        assert_eq!(comparison.old.tax_payable, dec!(49400));
        assert_eq!(comparison.new.tax_payable, dec!(113100));
        assert_eq!(comparison.recommended, Regime::Old);
        assert_eq!(comparison.savings, dec!(63700));
    }

    #[test]
    fn comparison_tie_goes_to_new_regime() {
        let comparison = compare_regimes(
            FiscalYear(2025),
            dec!(400000),
            DeductionPolicy::None,
            &DeductionClaims::default(),
        )
        .unwrap();
        assert_eq!(comparison.old.tax_payable, dec!(0));
        assert_eq!(comparison.new.tax_payable, dec!(0));
        assert_eq!(comparison.recommended, Regime::New);
        assert_eq!(comparison.savings, dec!(0));
    }

    #[test]
    fn comparison_rejects_unsupported_year() {
        assert_eq!(
            compare_regimes(
                FiscalYear(2022),
                dec!(1000000),
                DeductionPolicy::None,
                &DeductionClaims::default()
            ),
            Err(TaxError::UnsupportedFiscalYear(FiscalYear(2022)))
        );
    }

    #[test]
    fn parse_amount_accepts_separators() {
        assert_eq!(parse_amount("12,00,000").unwrap(), dec!(1200000));
        assert_eq!(parse_amount("1_600_000.50").unwrap(), dec!(1600000.50));
        assert_eq!(parse_amount(" 42 ").unwrap(), dec!(42));
    }

    #[test]
    fn parse_amount_rejects_text() {
        assert_eq!(
            parse_amount("lots"),
            Err(TaxError::InvalidAmount("lots".to_string()))
        );
        assert!(parse_amount("").is_err());
    }
}
