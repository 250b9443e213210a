use super::tvm::{Rates, annuity_pv, discount};
use super::types::ResolvedInputs;

/// Years at the end of the horizon that carry the medical cost boost.
pub const LATE_LIFE_YEARS: u32 = 10;

/// Post-retirement net spending, indexed by year from retirement. Amounts
/// are already expressed in the valuation basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseSchedule {
    annual_expense: f64,
    annual_fixed_income: f64,
    annual_rent: f64,
    rent_start_index: u32,
    late_start_index: u32,
    late_factor: f64,
    horizon: u32,
}

impl ExpenseSchedule {
    pub fn new(inputs: &ResolvedInputs, rates: &Rates) -> Self {
        let years_to_retire = f64::from(inputs.years_to_retire());
        let horizon = inputs.years_in_retirement();
        let to_basis = |monthly: f64| rates.inflate(monthly * 12.0, years_to_retire);

        Self {
            annual_expense: to_basis(inputs.monthly_expense),
            annual_fixed_income: to_basis(inputs.fixed_income_monthly),
            annual_rent: to_basis(inputs.rent_net_monthly),
            rent_start_index: inputs.rent_start_age.saturating_sub(inputs.retire_age),
            late_start_index: horizon - horizon.min(LATE_LIFE_YEARS),
            late_factor: 1.0 + inputs.medical_late_boost,
            horizon,
        }
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    fn unboosted(&self, year_index: u32) -> f64 {
        let mut income = self.annual_fixed_income;
        if year_index >= self.rent_start_index {
            income += self.annual_rent;
        }
        (self.annual_expense - income).max(0.0)
    }

    /// Net spending in the first retirement year, before any medical boost.
    pub fn first_year(&self) -> f64 {
        self.unboosted(0)
    }

    pub fn net_for_year(&self, year_index: u32) -> f64 {
        let net = self.unboosted(year_index);
        if year_index >= self.late_start_index {
            net * self.late_factor
        } else {
            net
        }
    }

    /// Lump sum needed at retirement to fund the whole horizon. The horizon
    /// is cut wherever the yearly amount changes; each piece is an annuity
    /// discounted back from its own start.
    pub fn present_value(&self, rate: f64) -> f64 {
        let mut cuts = vec![0, self.horizon];
        for cut in [self.rent_start_index, self.late_start_index] {
            if cut > 0 && cut < self.horizon {
                cuts.push(cut);
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        cuts.windows(2)
            .map(|w| {
                let (start, end) = (w[0], w[1]);
                let segment = annuity_pv(
                    rate,
                    f64::from(end - start),
                    self.net_for_year(start),
                );
                discount(segment, rate, f64::from(start))
            })
            .sum()
    }
}
