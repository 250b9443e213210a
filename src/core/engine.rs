use super::disposition::resolve_disposition;
use super::expense::ExpenseSchedule;
use super::normalize::resolve;
use super::trajectory::build_trajectory;
use super::tvm::{Loan, RATE_EPS, Rates, annuity_fv_monthly, annuity_pv, compound};
use super::types::{Breakdown, CalculatorInputs, CalculatorOutputs, ResolvedInputs};
use super::validate::{InputError, validate};

/// Runs one projection. Invalid age combinations, and amounts so large the
/// result would not be finite, come back as a zeroed result with `failure`
/// set; nothing here panics or performs I/O.
pub fn compute(inputs: &CalculatorInputs) -> CalculatorOutputs {
    let resolved = resolve(inputs);
    let outputs = match validate(&resolved) {
        Ok(()) => project(&resolved),
        Err(err) => return CalculatorOutputs::failed(err.to_string()),
    };
    if outputs.is_finite() {
        outputs
    } else {
        CalculatorOutputs::failed(InputError::AmountsTooLarge.to_string())
    }
}

fn project(inputs: &ResolvedInputs) -> CalculatorOutputs {
    let rates = Rates::for_inputs(inputs);
    let schedule = ExpenseSchedule::new(inputs, &rates);
    let years_to_retire = inputs.years_to_retire();
    let years_in_retirement = inputs.years_in_retirement();
    let net_annual_expense = schedule.first_year();

    if net_annual_expense <= 0.0 {
        return fully_covered(inputs, &schedule, &rates);
    }

    let loan = Loan::new(
        inputs.mortgage_balance,
        inputs.mortgage_annual_rate,
        inputs.mortgage_years_remaining,
    );
    let disposition = resolve_disposition(inputs, &rates, &loan);

    let spending_need = schedule.present_value(rates.post);
    let sale_offset = disposition.need_offset.min(spending_need);
    let mortgage_obligation =
        mortgage_after_retirement(inputs, &rates, &loan, disposition.mortgage_end_month);
    let required_funds = spending_need - sale_offset + mortgage_obligation;

    let breakdown = Breakdown {
        cash: inputs.cash,
        investments: compound(inputs.investments, rates.pre, f64::from(years_to_retire)),
        savings: annuity_fv_monthly(
            inputs.monthly_saving,
            rates.pre,
            f64::from(years_to_retire * 12),
        ),
        real_estate: disposition.asset_contribution,
        mortgage_obligation,
        sale_offset,
    };
    let projected_assets =
        breakdown.cash + breakdown.investments + breakdown.savings + breakdown.real_estate;

    let gap = projected_assets - required_funds;
    let coverage_ratio = if required_funds > 0.0 {
        projected_assets / required_funds
    } else {
        0.0
    };

    CalculatorOutputs {
        required_funds,
        projected_assets,
        gap,
        coverage_ratio,
        years_sustained: years_sustained(
            projected_assets,
            net_annual_expense,
            rates.post,
            years_in_retirement,
        ),
        net_annual_expense,
        years_to_retire,
        years_in_retirement,
        suggested_monthly_saving: suggested_monthly_saving(gap, years_to_retire),
        breakdown,
        trajectory: build_trajectory(inputs.retire_age, &schedule, projected_assets, rates.post),
        failure: None,
    }
}

/// Fixed income alone pays for retirement: nothing needs funding and the raw
/// balances are reported as they stand today.
fn fully_covered(
    inputs: &ResolvedInputs,
    schedule: &ExpenseSchedule,
    rates: &Rates,
) -> CalculatorOutputs {
    let breakdown = Breakdown {
        cash: inputs.cash,
        investments: inputs.investments,
        real_estate: inputs.real_estate_value,
        ..Breakdown::default()
    };
    let projected_assets = breakdown.cash + breakdown.investments + breakdown.real_estate;

    CalculatorOutputs {
        required_funds: 0.0,
        projected_assets,
        gap: projected_assets,
        coverage_ratio: 1.0,
        years_sustained: inputs.years_in_retirement(),
        net_annual_expense: 0.0,
        years_to_retire: inputs.years_to_retire(),
        years_in_retirement: inputs.years_in_retirement(),
        suggested_monthly_saving: 0.0,
        breakdown,
        trajectory: build_trajectory(inputs.retire_age, schedule, projected_assets, rates.post),
        failure: None,
    }
}

/// Present value at retirement of the mortgage payments still due after it.
fn mortgage_after_retirement(
    inputs: &ResolvedInputs,
    rates: &Rates,
    loan: &Loan,
    end_month: u32,
) -> f64 {
    if !loan.is_active() {
        return 0.0;
    }
    let years_to_retire = inputs.years_to_retire();
    let months_due = end_month.saturating_sub(years_to_retire * 12);
    let years_due = (f64::from(months_due) / 12.0).min(f64::from(inputs.years_in_retirement()));
    let annual_payment = rates.deflate(loan.monthly_payment(), f64::from(years_to_retire)) * 12.0;
    annuity_pv(rates.post, years_due, annual_payment)
}

/// Whole years the assets can fund `annual_expense`, found by inverting the
/// annuity present value formula.
fn years_sustained(assets: f64, annual_expense: f64, rate: f64, horizon: u32) -> u32 {
    if annual_expense <= 0.0 {
        return horizon;
    }
    if assets <= 0.0 {
        return 0;
    }
    let horizon_years = f64::from(horizon);
    let years = if rate.abs() < RATE_EPS || rate <= -1.0 {
        assets / annual_expense
    } else {
        let term = assets * rate / annual_expense;
        if term >= 1.0 {
            horizon_years
        } else {
            -(1.0 - term).ln() / (1.0 + rate).ln()
        }
    };
    if years.is_finite() {
        years.clamp(0.0, horizon_years).floor() as u32
    } else {
        horizon
    }
}

/// Naive monthly top-up that would close a shortfall, ignoring growth.
fn suggested_monthly_saving(gap: f64, years_to_retire: u32) -> f64 {
    if gap >= 0.0 {
        return 0.0;
    }
    let months = f64::from((years_to_retire * 12).max(1));
    (-gap / months).ceil()
}
