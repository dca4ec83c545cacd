//! Old regime deductions: Chapter VI-A claims and the HRA exemption
//!
//! The new regime allows only the standard deduction, so these figures are
//! applied by [`TaxEngine::tax_with_claims`](super::tax::TaxEngine::tax_with_claims)
//! for the old regime alone.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::tax::TaxError;

/// Section 80C (PPF, ELSS, LIC, EPF, tuition fees)
pub const SECTION_80C_LIMIT: Decimal = dec!(150000);
/// Section 80D health insurance for self and family
pub const SECTION_80D_SELF_LIMIT: Decimal = dec!(25000);
/// Section 80D health insurance for senior citizen parents
pub const SECTION_80D_PARENTS_LIMIT: Decimal = dec!(50000);
/// Section 80CCD(1B) additional NPS contribution
pub const NPS_LIMIT: Decimal = dec!(50000);
/// Section 80TTA savings account interest
pub const SECTION_80TTA_LIMIT: Decimal = dec!(10000);

/// Amounts the filer claims, before any statutory limit is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeductionClaims {
    #[schemars(with = "f64")]
    pub section_80c: Decimal,
    #[schemars(with = "f64")]
    pub health_insurance_self: Decimal,
    #[schemars(with = "f64")]
    pub health_insurance_parents: Decimal,
    #[schemars(with = "f64")]
    pub nps: Decimal,
    /// Interest earned on savings accounts
    #[schemars(with = "f64")]
    pub savings_interest: Decimal,
    /// Interest paid on an education loan (80E has no upper limit)
    #[schemars(with = "f64")]
    pub education_loan_interest: Decimal,
    pub hra: Option<HraClaim>,
}

/// Inputs to the house rent allowance exemption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct HraClaim {
    #[schemars(with = "f64")]
    pub basic_salary: Decimal,
    #[schemars(with = "f64")]
    pub hra_received: Decimal,
    #[schemars(with = "f64")]
    pub rent_paid: Decimal,
    /// Delhi, Mumbai, Kolkata or Chennai
    pub metro: bool,
}

impl HraClaim {
    /// Least of the HRA received, rent paid over 10% of basic, and 50% of
    /// basic in a metro (40% elsewhere). Never negative.
    pub fn exemption(&self) -> Decimal {
        if self.rent_paid <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let basic_share = if self.metro { dec!(0.50) } else { dec!(0.40) };
        let rent_over_basic = self.rent_paid - self.basic_salary * dec!(0.10);
        self.hra_received
            .min(rent_over_basic)
            .min(self.basic_salary * basic_share)
            .max(Decimal::ZERO)
    }

    fn validate(&self) -> Result<(), TaxError> {
        non_negative("HRA basic salary", self.basic_salary)?;
        non_negative("HRA received", self.hra_received)?;
        non_negative("HRA rent paid", self.rent_paid)
    }
}

/// Claims after the statutory limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
pub struct AllowedDeductions {
    #[schemars(with = "f64")]
    pub section_80c: Decimal,
    /// Self and parents combined
    #[schemars(with = "f64")]
    pub section_80d: Decimal,
    #[schemars(with = "f64")]
    pub nps: Decimal,
    #[schemars(with = "f64")]
    pub section_80tta: Decimal,
    #[schemars(with = "f64")]
    pub section_80e: Decimal,
    #[schemars(with = "f64")]
    pub hra_exemption: Decimal,
}

impl AllowedDeductions {
    pub fn total(&self) -> Decimal {
        self.section_80c
            + self.section_80d
            + self.nps
            + self.section_80tta
            + self.section_80e
            + self.hra_exemption
    }
}

impl DeductionClaims {
    /// Cap each claim at its limit. Negative claims are rejected.
    pub fn allowed(&self) -> Result<AllowedDeductions, TaxError> {
        non_negative("80C", self.section_80c)?;
        non_negative("80D self", self.health_insurance_self)?;
        non_negative("80D parents", self.health_insurance_parents)?;
        non_negative("80CCD(1B)", self.nps)?;
        non_negative("80TTA", self.savings_interest)?;
        non_negative("80E", self.education_loan_interest)?;
        if let Some(hra) = &self.hra {
            hra.validate()?;
        }

        Ok(AllowedDeductions {
            section_80c: self.section_80c.min(SECTION_80C_LIMIT),
            section_80d: self.health_insurance_self.min(SECTION_80D_SELF_LIMIT)
                + self.health_insurance_parents.min(SECTION_80D_PARENTS_LIMIT),
            nps: self.nps.min(NPS_LIMIT),
            section_80tta: self.savings_interest.min(SECTION_80TTA_LIMIT),
            section_80e: self.education_loan_interest,
            hra_exemption: self.hra.map_or(Decimal::ZERO, |hra| hra.exemption()),
        })
    }
}

fn non_negative(section: &'static str, amount: Decimal) -> Result<(), TaxError> {
    if amount < Decimal::ZERO {
        return Err(TaxError::NegativeDeduction { section, amount });
    }
    Ok(())
}
