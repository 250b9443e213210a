use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealEstateMode {
    #[default]
    Keep,
    Sell,
    Rent,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuationBasis {
    /// Today's purchasing power.
    #[default]
    Real,
    /// Future nominal money.
    Nominal,
}

/// Raw form values exactly as the user typed them. Empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalculatorInputs {
    pub current_age: String,
    pub retire_age: String,
    pub life_expectancy: String,

    pub monthly_expense: String,
    pub monthly_saving: String,
    pub post_retirement_fixed_income: String,

    pub cash: String,
    pub investments: String,
    pub real_estate_value: String,

    pub mortgage_balance: String,
    pub mortgage_annual_rate_pct: String,
    pub mortgage_years_remaining: String,

    pub pre_retirement_return_pct: String,
    pub post_retirement_return_pct: String,
    pub inflation_pct: String,
    pub real_estate_appreciation_pct: String,
    pub medical_late_boost_pct: String,

    pub mode: RealEstateMode,
    pub sell_cost_rate_pct: String,
    pub sale_age: String,
    pub rent_net_monthly_income: String,
    pub rent_start_age: String,

    pub valuation_basis: ValuationBasis,
}

/// Ages as parsed, before truncation to whole years. Range checks run on
/// these so `"100.5"` is not read as 100.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnteredAges {
    pub current: f64,
    pub retire: f64,
    pub life_expectancy: f64,
}

/// Numeric view of [`CalculatorInputs`] with every implicit default already
/// substituted. Rates are fractions, ages are whole years.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInputs {
    pub current_age: u32,
    pub retire_age: u32,
    pub life_expectancy: u32,
    pub entered_ages: EnteredAges,

    pub monthly_expense: f64,
    pub monthly_saving: f64,
    pub fixed_income_monthly: f64,

    pub cash: f64,
    pub investments: f64,
    pub real_estate_value: f64,

    pub mortgage_balance: f64,
    pub mortgage_annual_rate: f64,
    pub mortgage_years_remaining: f64,

    pub pre_return: f64,
    pub post_return: f64,
    pub inflation: f64,
    pub real_estate_appreciation: f64,
    pub medical_late_boost: f64,

    pub mode: RealEstateMode,
    pub sell_cost_rate: f64,
    /// Whether the sale age field carried any text at all.
    pub sale_age_supplied: bool,
    pub sale_age: u32,
    pub rent_net_monthly: f64,
    pub rent_start_age: u32,

    pub basis: ValuationBasis,
}

impl ResolvedInputs {
    pub fn years_to_retire(&self) -> u32 {
        self.retire_age.saturating_sub(self.current_age)
    }

    pub fn years_in_retirement(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.retire_age)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub age: u32,
    pub year_index: u32,
    pub remaining_assets: f64,
    pub cumulative_expense: f64,
}

/// Where the headline figures came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub cash: f64,
    pub investments: f64,
    pub savings: f64,
    pub real_estate: f64,
    pub mortgage_obligation: f64,
    pub sale_offset: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorOutputs {
    pub required_funds: f64,
    pub projected_assets: f64,
    /// `projected_assets - required_funds`; negative is a shortfall.
    pub gap: f64,
    pub coverage_ratio: f64,
    pub years_sustained: u32,
    pub net_annual_expense: f64,
    pub years_to_retire: u32,
    pub years_in_retirement: u32,
    pub suggested_monthly_saving: f64,
    pub breakdown: Breakdown,
    pub trajectory: Vec<YearlySnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl CalculatorOutputs {
    /// Zeroed result carrying only the rejection reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Every number in the result, trajectory included, is finite. JSON has
    /// no encoding for infinities or NaN.
    pub fn is_finite(&self) -> bool {
        let b = &self.breakdown;
        [
            self.required_funds,
            self.projected_assets,
            self.gap,
            self.coverage_ratio,
            self.net_annual_expense,
            self.suggested_monthly_saving,
            b.cash,
            b.investments,
            b.savings,
            b.real_estate,
            b.mortgage_obligation,
            b.sale_offset,
        ]
        .iter()
        .chain(
            self.trajectory
                .iter()
                .flat_map(|snap| [&snap.remaining_assets, &snap.cumulative_expense]),
        )
        .all(|value| value.is_finite())
    }
}
