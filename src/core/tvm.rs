//! Time-value-of-money primitives. Plain numbers in, plain numbers out.

use super::types::{ResolvedInputs, ValuationBasis};

pub(crate) const RATE_EPS: f64 = 1e-9;

/// `amount * (1 + rate)^years`. A rate at or below -100% wipes the amount out.
pub fn compound(amount: f64, rate: f64, years: f64) -> f64 {
    if 1.0 + rate <= 0.0 {
        return 0.0;
    }
    amount * (1.0 + rate).powf(years)
}

/// `amount / (1 + rate)^years`, the inverse of [`compound`]. At or below
/// -100% there is no meaningful discount factor and the amount is left as is.
pub fn discount(amount: f64, rate: f64, years: f64) -> f64 {
    if 1.0 + rate <= 0.0 {
        return amount;
    }
    amount * (1.0 + rate).powf(-years)
}

/// Present value of an ordinary annuity paying `payment` at the end of each
/// of `periods` periods. `periods` may be fractional. Rates at or below -100%
/// are treated like a zero rate so the payments are never valued at nothing.
pub fn annuity_pv(rate: f64, periods: f64, payment: f64) -> f64 {
    if periods <= 0.0 || payment <= 0.0 {
        return 0.0;
    }
    if rate.abs() < RATE_EPS || rate <= -1.0 {
        return payment * periods;
    }
    payment * (1.0 - (1.0 + rate).powf(-periods)) / rate
}

/// Future value of `months` end-of-month contributions at `annual_rate / 12`.
pub fn annuity_fv_monthly(monthly: f64, annual_rate: f64, months: f64) -> f64 {
    if months <= 0.0 || monthly <= 0.0 {
        return 0.0;
    }
    let rm = annual_rate / 12.0;
    if rm.abs() < RATE_EPS {
        return monthly * months;
    }
    if rm <= -1.0 {
        return 0.0;
    }
    monthly * ((1.0 + rm).powf(months) - 1.0) / rm
}

/// Fisher conversion of a nominal rate into constant purchasing power.
pub fn real_rate(nominal: f64, inflation: f64) -> f64 {
    if 1.0 + inflation <= 0.0 {
        return nominal;
    }
    (nominal - inflation) / (1.0 + inflation)
}

pub fn effective_rate(nominal: f64, inflation: f64, basis: ValuationBasis) -> f64 {
    match basis {
        ValuationBasis::Real => real_rate(nominal, inflation),
        ValuationBasis::Nominal => nominal,
    }
}

/// Growth rates for one projection, already converted to the valuation basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub pre: f64,
    pub post: f64,
    pub real_estate: f64,
    pub inflation: f64,
    pub basis: ValuationBasis,
}

impl Rates {
    pub fn for_inputs(inputs: &ResolvedInputs) -> Self {
        let basis = inputs.basis;
        Self {
            pre: effective_rate(inputs.pre_return, inputs.inflation, basis),
            post: effective_rate(inputs.post_return, inputs.inflation, basis),
            real_estate: effective_rate(inputs.real_estate_appreciation, inputs.inflation, basis),
            inflation: inputs.inflation,
            basis,
        }
    }

    /// Converts a nominal amount due `years` from today into the basis.
    pub fn deflate(&self, nominal: f64, years: f64) -> f64 {
        match self.basis {
            ValuationBasis::Real => discount(nominal, self.inflation, years),
            ValuationBasis::Nominal => nominal,
        }
    }

    /// Converts an amount in today's money into the basis, `years` from today.
    pub fn inflate(&self, today: f64, years: f64) -> f64 {
        match self.basis {
            ValuationBasis::Real => today,
            ValuationBasis::Nominal => compound(today, self.inflation, years),
        }
    }
}

/// Fixed-rate, fully amortizing loan measured from today.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loan {
    pub balance: f64,
    pub monthly_rate: f64,
    pub total_months: u32,
}

impl Loan {
    pub fn new(balance: f64, annual_rate: f64, years_remaining: f64) -> Self {
        let total_months = (years_remaining * 12.0).round().max(0.0) as u32;
        Self {
            balance: balance.max(0.0),
            monthly_rate: annual_rate / 12.0,
            total_months,
        }
    }

    pub fn is_active(&self) -> bool {
        self.total_months > 0 && self.balance > 0.0
    }

    pub fn monthly_payment(&self) -> f64 {
        if self.total_months == 0 {
            return 0.0;
        }
        let n = f64::from(self.total_months);
        if self.monthly_rate.abs() < RATE_EPS {
            return self.balance / n;
        }
        self.balance * self.monthly_rate / (1.0 - (1.0 + self.monthly_rate).powf(-n))
    }

    /// Outstanding balance after `months` payments, clamped to the term.
    pub fn remaining_after(&self, months: u32) -> f64 {
        if self.total_months == 0 {
            return 0.0;
        }
        let k = f64::from(months.min(self.total_months));
        let payment = self.monthly_payment();
        if self.monthly_rate.abs() < RATE_EPS {
            return (self.balance - payment * k).max(0.0);
        }
        let growth = (1.0 + self.monthly_rate).powf(k);
        (self.balance * growth - payment * (growth - 1.0) / self.monthly_rate).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn annuity_pv_matches_closed_form() {
        // 1000/yr for 10 years at 5%.
        assert_approx(annuity_pv(0.05, 10.0, 1_000.0), 7_721.734_929_184_818);
    }

    #[test]
    fn annuity_pv_degenerate_inputs() {
        assert_eq!(annuity_pv(0.05, 0.0, 1_000.0), 0.0);
        assert_eq!(annuity_pv(0.05, 10.0, 0.0), 0.0);
        assert_eq!(annuity_pv(0.05, 10.0, -5.0), 0.0);
        assert_eq!(annuity_pv(1e-12, 10.0, 100.0), 1_000.0);
    }

    #[test]
    fn annuity_fv_monthly_matches_closed_form() {
        // 100/month for 12 months at 12%/yr -> 1% a month.
        assert_approx(annuity_fv_monthly(100.0, 0.12, 12.0), 1_268.250_301_319_698);
        assert_eq!(annuity_fv_monthly(100.0, 0.0, 12.0), 1_200.0);
        assert_eq!(annuity_fv_monthly(0.0, 0.05, 12.0), 0.0);
        assert_eq!(annuity_fv_monthly(100.0, 0.05, 0.0), 0.0);
    }

    #[test]
    fn real_rate_removes_inflation() {
        assert_approx(real_rate(0.05, 0.02), 0.03 / 1.02);
        assert_approx(real_rate(0.02, 0.02), 0.0);
        assert_eq!(real_rate(0.05, -1.0), 0.05);
        assert_eq!(effective_rate(0.05, 0.02, ValuationBasis::Nominal), 0.05);
        assert_approx(
            effective_rate(0.05, 0.02, ValuationBasis::Real),
            real_rate(0.05, 0.02),
        );
    }

    #[test]
    fn compound_and_discount_are_inverse() {
        assert_approx(discount(compound(1_000.0, 0.04, 12.0), 0.04, 12.0), 1_000.0);
        assert_eq!(compound(1_000.0, -1.0, 3.0), 0.0);
    }

    #[test]
    fn total_loss_rates_leave_payments_undiscounted() {
        assert_eq!(annuity_pv(-1.0, 5.0, 100.0), 500.0);
        assert_eq!(annuity_pv(-1.5, 2.5, 100.0), 250.0);
        assert_eq!(discount(1_000.0, -1.5, 3.0), 1_000.0);
        assert_eq!(discount(1_000.0, -1.0, 3.0), 1_000.0);
    }

    #[test]
    fn rates_follow_valuation_basis() {
        use crate::core::normalize::resolve;
        use crate::core::types::CalculatorInputs;

        let mut raw = CalculatorInputs {
            pre_retirement_return_pct: "6".into(),
            post_retirement_return_pct: "4".into(),
            inflation_pct: "2".into(),
            real_estate_appreciation_pct: "-1".into(),
            ..CalculatorInputs::default()
        };
        let real = Rates::for_inputs(&resolve(&raw));
        assert_approx(real.pre, 0.04 / 1.02);
        assert_approx(real.post, 0.02 / 1.02);
        assert_approx(real.real_estate, -0.03 / 1.02);
        assert_approx(real.deflate(1_020.0, 1.0), 1_000.0);
        assert_eq!(real.inflate(1_000.0, 5.0), 1_000.0);

        raw.valuation_basis = ValuationBasis::Nominal;
        let nominal = Rates::for_inputs(&resolve(&raw));
        assert_approx(nominal.pre, 0.06);
        assert_approx(nominal.real_estate, -0.01);
        assert_eq!(nominal.deflate(1_020.0, 1.0), 1_020.0);
        assert_approx(nominal.inflate(1_000.0, 1.0), 1_020.0);
    }

    #[test]
    fn loan_payment_matches_standard_mortgage() {
        // 300k over 30 years at 6% -> 1798.65 a month.
        let loan = Loan::new(300_000.0, 0.06, 30.0);
        assert_eq!(loan.total_months, 360);
        assert!((loan.monthly_payment() - 1_798.65).abs() < 0.01);
    }

    #[test]
    fn zero_rate_loan_amortizes_linearly() {
        let loan = Loan::new(12_000.0, 0.0, 1.0);
        assert_approx(loan.monthly_payment(), 1_000.0);
        assert_approx(loan.remaining_after(3), 9_000.0);
        assert_approx(loan.remaining_after(12), 0.0);
    }

    #[test]
    fn loan_remaining_is_clamped_to_term() {
        let loan = Loan::new(100_000.0, 0.03, 10.0);
        assert_approx(loan.remaining_after(0), 100_000.0);
        assert!(loan.remaining_after(120) < 1e-6);
        assert_eq!(loan.remaining_after(500), loan.remaining_after(120));
    }

    #[test]
    fn empty_loan_is_inactive() {
        let loan = Loan::new(0.0, 0.03, 10.0);
        assert!(!loan.is_active());
        let loan = Loan::new(100.0, 0.03, 0.0);
        assert!(!loan.is_active());
        assert_eq!(loan.monthly_payment(), 0.0);
        assert_eq!(loan.remaining_after(5), 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_zero_rate_pv_is_payment_times_years(annual in 1u32..1_000_000, years in 1u32..80) {
            let pv = annuity_pv(0.0, f64::from(years), f64::from(annual));
            prop_assert!(pv == f64::from(annual) * f64::from(years));
        }

        #[test]
        fn prop_pv_and_fv_increase_with_payment(
            rate_bp in -500i32..1500,
            periods in 1u32..60,
            payment in 1u32..100_000,
            extra in 1u32..10_000
        ) {
            let rate = f64::from(rate_bp) / 10_000.0;
            let n = f64::from(periods);
            let low = f64::from(payment);
            let high = low + f64::from(extra);
            prop_assert!(annuity_pv(rate, n, high) > annuity_pv(rate, n, low));
            prop_assert!(
                annuity_fv_monthly(high, rate, n * 12.0) > annuity_fv_monthly(low, rate, n * 12.0)
            );
        }

        #[test]
        fn prop_loan_balance_never_increases(
            balance in 1_000u32..2_000_000,
            rate_bp in 0u32..1500,
            years in 1u32..40
        ) {
            let loan = Loan::new(f64::from(balance), f64::from(rate_bp) / 10_000.0, f64::from(years));
            let mut previous = loan.remaining_after(0);
            prop_assert!((previous - f64::from(balance)).abs() < 1e-6);
            for k in 1..=loan.total_months {
                let current = loan.remaining_after(k);
                prop_assert!(current <= previous + 1e-6);
                previous = current;
            }
            prop_assert!(loan.remaining_after(loan.total_months) < 1e-4 * f64::from(balance).max(1.0));
        }
    }
}
