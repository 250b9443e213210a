//! Text to number conversion for raw form fields.
//!
//! Every function here is total: malformed, empty or overflowing text maps to
//! zero so a half-filled form still produces a (zeroed) projection.

use super::types::{CalculatorInputs, EnteredAges, RealEstateMode, ResolvedInputs};

fn finite_or_zero(parsed: Result<f64, std::num::ParseFloatError>) -> f64 {
    match parsed {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Non-negative amount. Thousands separators, currency symbols, signs and any
/// other character that is not a digit or `.` are dropped before parsing.
pub fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    finite_or_zero(cleaned.parse::<f64>())
}

/// Like [`parse_amount`] but keeps a leading minus sign.
pub fn parse_signed(text: &str) -> f64 {
    match text.trim_start().strip_prefix('-') {
        Some(rest) => -parse_amount(rest),
        None => parse_amount(text),
    }
}

/// Percentage text to a fraction: `"2.5"` becomes `0.025`.
pub fn parse_rate(text: &str) -> f64 {
    parse_signed(text) / 100.0
}

/// Whole years, fractional part truncated.
pub fn parse_age(text: &str) -> u32 {
    // `as` saturates, so absurdly large ages stay representable.
    parse_amount(text).trunc() as u32
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Normalizes every field and substitutes the implicit defaults: the sale
/// age and the rent start age both fall back to the retirement age.
pub fn resolve(inputs: &CalculatorInputs) -> ResolvedInputs {
    let current_age = parse_age(&inputs.current_age);
    let retire_age = parse_age(&inputs.retire_age);
    let life_expectancy = parse_age(&inputs.life_expectancy);

    let sale_age_supplied = !is_blank(&inputs.sale_age);
    let sale_age = if sale_age_supplied {
        parse_age(&inputs.sale_age)
    } else {
        retire_age
    };

    // Rental income only matters once retired.
    let rent_start_age = match parse_age(&inputs.rent_start_age) {
        0 => retire_age,
        age => age.max(retire_age),
    };

    let rent_net_monthly = if inputs.mode == RealEstateMode::Rent {
        parse_amount(&inputs.rent_net_monthly_income)
    } else {
        0.0
    };

    ResolvedInputs {
        current_age,
        retire_age,
        life_expectancy,
        entered_ages: EnteredAges {
            current: parse_amount(&inputs.current_age),
            retire: parse_amount(&inputs.retire_age),
            life_expectancy: parse_amount(&inputs.life_expectancy),
        },
        monthly_expense: parse_amount(&inputs.monthly_expense),
        monthly_saving: parse_amount(&inputs.monthly_saving),
        fixed_income_monthly: parse_amount(&inputs.post_retirement_fixed_income),
        cash: parse_amount(&inputs.cash),
        investments: parse_amount(&inputs.investments),
        real_estate_value: parse_amount(&inputs.real_estate_value),
        mortgage_balance: parse_amount(&inputs.mortgage_balance),
        mortgage_annual_rate: parse_rate(&inputs.mortgage_annual_rate_pct),
        mortgage_years_remaining: parse_amount(&inputs.mortgage_years_remaining),
        pre_return: parse_rate(&inputs.pre_retirement_return_pct),
        post_return: parse_rate(&inputs.post_retirement_return_pct),
        inflation: parse_rate(&inputs.inflation_pct),
        real_estate_appreciation: parse_rate(&inputs.real_estate_appreciation_pct),
        medical_late_boost: parse_rate(&inputs.medical_late_boost_pct).max(0.0),
        mode: inputs.mode,
        sell_cost_rate: parse_rate(&inputs.sell_cost_rate_pct).clamp(0.0, 1.0),
        sale_age_supplied,
        sale_age,
        rent_net_monthly,
        rent_start_age,
        basis: inputs.valuation_basis,
    }
}
