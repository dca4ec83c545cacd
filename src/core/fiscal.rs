use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::tax::TaxError;

/// Indian financial year (runs 1 April to 31 March)
/// The year value is the starting calendar year (e.g., 2025 = FY 2025-26)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    /// Financial year containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        // January to March belong to the year that started the previous April
        if date.month() >= 4 {
            FiscalYear(date.year())
        } else {
            FiscalYear(date.year() - 1)
        }
    }

    /// 1 April of the starting year
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 4, 1)
    }

    /// 31 March of the following year
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.0
            .checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 3, 31))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        FiscalYear::from_date(date) == *self
    }

    /// Display as "2025-26" format
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.0, (i64::from(self.0) + 1).rem_euclid(100))
    }
}

impl Default for FiscalYear {
    fn default() -> Self {
        FiscalYear(2025)
    }
}

impl std::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl FromStr for FiscalYear {
    type Err = TaxError;

    /// Accepts "2025" or "2025-26"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TaxError::InvalidFiscalYear(s.to_string());
        let s = s.trim();
        match s.split_once('-') {
            None => s.parse::<i32>().map(FiscalYear).map_err(|_| invalid()),
            Some((start, end)) => {
                let start: i32 = start.parse().map_err(|_| invalid())?;
                let end: i32 = end.parse().map_err(|_| invalid())?;
                let next = start.checked_add(1).ok_or_else(invalid)?;
                if end == next % 100 || end == next {
                    Ok(FiscalYear(start))
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

/// Tax regime chosen by the filer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    #[default]
    New,
    Old,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::New => "new",
            Regime::Old => "old",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One income band and its marginal rate. `upper` is `None` for the top band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slab {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl Slab {
    const fn new(lower: Decimal, upper: Option<Decimal>, rate: Decimal) -> Self {
        Slab { lower, upper, rate }
    }

    /// Portion of `income` that falls inside this band
    pub fn portion(&self, income: Decimal) -> Decimal {
        if income <= self.lower {
            return Decimal::ZERO;
        }
        let top = match self.upper {
            Some(upper) => income.min(upper),
            None => income,
        };
        top - self.lower
    }
}

const NEW_REGIME_FY2025: &[Slab] = &[
    Slab::new(dec!(0), Some(dec!(400000)), dec!(0)),
    Slab::new(dec!(400000), Some(dec!(800000)), dec!(0.05)),
    Slab::new(dec!(800000), Some(dec!(1200000)), dec!(0.10)),
    Slab::new(dec!(1200000), Some(dec!(1600000)), dec!(0.15)),
    Slab::new(dec!(1600000), Some(dec!(2000000)), dec!(0.20)),
    Slab::new(dec!(2000000), Some(dec!(2400000)), dec!(0.25)),
    Slab::new(dec!(2400000), None, dec!(0.30)),
];

const NEW_REGIME_FY2024: &[Slab] = &[
    Slab::new(dec!(0), Some(dec!(300000)), dec!(0)),
    Slab::new(dec!(300000), Some(dec!(700000)), dec!(0.05)),
    Slab::new(dec!(700000), Some(dec!(1000000)), dec!(0.10)),
    Slab::new(dec!(1000000), Some(dec!(1200000)), dec!(0.15)),
    Slab::new(dec!(1200000), Some(dec!(1500000)), dec!(0.20)),
    Slab::new(dec!(1500000), None, dec!(0.30)),
];

const OLD_REGIME: &[Slab] = &[
    Slab::new(dec!(0), Some(dec!(250000)), dec!(0)),
    Slab::new(dec!(250000), Some(dec!(500000)), dec!(0.05)),
    Slab::new(dec!(500000), Some(dec!(1000000)), dec!(0.20)),
    Slab::new(dec!(1000000), None, dec!(0.30)),
];

/// Health and education cess, applied on top of the computed tax
const CESS_RATE: Decimal = dec!(0.04);

/// Everything the tax engine needs to know about one fiscal year and regime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRules {
    pub fiscal_year: FiscalYear,
    pub regime: Regime,
    pub slabs: &'static [Slab],
    /// Income at or below this pays no tax (section 87A rebate)
    pub rebate_limit: Decimal,
    /// Caps tax just above the rebate limit at the income exceeding it
    pub marginal_relief: bool,
    pub standard_deduction: Decimal,
    pub cess_rate: Decimal,
}

impl TaxRules {
    pub fn for_year(fiscal_year: FiscalYear, regime: Regime) -> Result<TaxRules, TaxError> {
        let rules = match (regime, fiscal_year.0) {
            (Regime::New, 2025..) => TaxRules {
                fiscal_year,
                regime,
                slabs: NEW_REGIME_FY2025,
                rebate_limit: dec!(1200000),
                marginal_relief: true,
                standard_deduction: dec!(75000),
                cess_rate: CESS_RATE,
            },
            (Regime::New, 2024) => TaxRules {
                fiscal_year,
                regime,
                slabs: NEW_REGIME_FY2024,
                rebate_limit: dec!(700000),
                marginal_relief: true,
                standard_deduction: dec!(75000),
                cess_rate: CESS_RATE,
            },
            (Regime::Old, 2024..) => TaxRules {
                fiscal_year,
                regime,
                slabs: OLD_REGIME,
                rebate_limit: dec!(500000),
                marginal_relief: false,
                standard_deduction: dec!(50000),
                cess_rate: CESS_RATE,
            },
            _ => return Err(TaxError::UnsupportedFiscalYear(fiscal_year)),
        };
        Ok(rules)
    }
}

impl Default for TaxRules {
    fn default() -> Self {
        TaxRules {
            fiscal_year: FiscalYear(2025),
            regime: Regime::New,
            slabs: NEW_REGIME_FY2025,
            rebate_limit: dec!(1200000),
            marginal_relief: true,
            standard_deduction: dec!(75000),
            cess_rate: CESS_RATE,
        }
    }
}
