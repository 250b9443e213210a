use super::tvm::{Loan, Rates, compound, discount};
use super::types::{RealEstateMode, ResolvedInputs};

/// What the property does to the headline figures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Disposition {
    /// Added to projected assets at retirement.
    pub asset_contribution: f64,
    /// Present value at retirement of a later sale; reduces required funds.
    pub need_offset: f64,
    /// Month from today after which no mortgage payment is due.
    pub mortgage_end_month: u32,
}

pub fn resolve_disposition(inputs: &ResolvedInputs, rates: &Rates, loan: &Loan) -> Disposition {
    let untouched = Disposition {
        mortgage_end_month: loan.total_months,
        ..Disposition::default()
    };

    match inputs.mode {
        RealEstateMode::Keep => Disposition {
            asset_contribution: equity_at_retirement(inputs, rates, loan),
            ..untouched
        },
        RealEstateMode::Sell if inputs.real_estate_value > 0.0 => sell(inputs, rates, loan),
        RealEstateMode::Sell | RealEstateMode::Rent => untouched,
    }
}

fn equity_at_retirement(inputs: &ResolvedInputs, rates: &Rates, loan: &Loan) -> f64 {
    let years = inputs.years_to_retire();
    let value = compound(
        inputs.real_estate_value,
        rates.real_estate,
        f64::from(years),
    );
    let owed = rates.deflate(loan.remaining_after(years * 12), f64::from(years));
    (value - owed).max(0.0)
}

fn sell(inputs: &ResolvedInputs, rates: &Rates, loan: &Loan) -> Disposition {
    let years_to_sale = inputs.sale_age.saturating_sub(inputs.current_age);
    // Sale age has no upper bound, so the month count can exceed u32.
    let sale_month = years_to_sale.saturating_mul(12);

    let value = compound(
        inputs.real_estate_value,
        rates.real_estate,
        f64::from(years_to_sale),
    );
    let cost = value * inputs.sell_cost_rate;
    let owed = rates.deflate(loan.remaining_after(sale_month), f64::from(years_to_sale));
    let net = (value - cost - owed).max(0.0);

    let mortgage_end_month = loan.total_months.min(sale_month);
    if inputs.sale_age <= inputs.retire_age {
        let years = f64::from(inputs.retire_age - inputs.sale_age);
        Disposition {
            asset_contribution: compound(net, rates.pre, years),
            need_offset: 0.0,
            mortgage_end_month,
        }
    } else {
        let years = f64::from(inputs.sale_age - inputs.retire_age);
        Disposition {
            asset_contribution: 0.0,
            need_offset: discount(net, rates.post, years),
            mortgage_end_month,
        }
    }
}
