//! Advisory per-field range checks for form feedback. These never block a
//! projection; [`super::compute`] only enforces the age invariants.

use serde::Serialize;

use super::normalize::{parse_amount, parse_signed};
use super::types::CalculatorInputs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

const MONTHLY_MAX: f64 = 10_000_000.0;
const BALANCE_MAX: f64 = 1_000_000_000.0;

#[derive(Default)]
struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldIssue {
            field,
            message: message.into(),
        });
    }

    /// Returns the parsed value when the field is filled in and within
    /// `min..=max`. Blank fields are skipped silently.
    fn range(
        &mut self,
        field: &'static str,
        text: &str,
        min: f64,
        max: f64,
        unit: &str,
    ) -> Option<f64> {
        if text.trim().is_empty() {
            return None;
        }
        let value = parse_signed(text);
        if (min..=max).contains(&value) {
            Some(value)
        } else {
            self.push(field, format!("enter {min}-{max}{unit}"));
            None
        }
    }
}

pub fn check_fields(raw: &CalculatorInputs) -> Vec<FieldIssue> {
    let current_age = parse_amount(&raw.current_age);
    let retire_age = parse_amount(&raw.retire_age);
    let mut issues = Issues::default();

    issues.range("currentAge", &raw.current_age, 1.0, 100.0, " years");
    if let Some(age) = issues.range("retireAge", &raw.retire_age, 1.0, 100.0, " years") {
        if age <= current_age {
            issues.push("retireAge", "retirement age must be greater than current age");
        }
    }
    if let Some(age) = issues.range("lifeExpectancy", &raw.life_expectancy, 1.0, 120.0, " years") {
        if age <= retire_age {
            issues.push(
                "lifeExpectancy",
                "life expectancy must be greater than retirement age",
            );
        }
    }

    for (field, text) in [
        ("monthlyExpense", &raw.monthly_expense),
        ("monthlySaving", &raw.monthly_saving),
        ("postRetirementFixedIncome", &raw.post_retirement_fixed_income),
        ("rentNetMonthlyIncome", &raw.rent_net_monthly_income),
    ] {
        issues.range(field, text, 0.0, MONTHLY_MAX, "");
    }
    for (field, text) in [
        ("cash", &raw.cash),
        ("investments", &raw.investments),
        ("realEstateValue", &raw.real_estate_value),
        ("mortgageBalance", &raw.mortgage_balance),
    ] {
        issues.range(field, text, 0.0, BALANCE_MAX, "");
    }

    issues.range("mortgageAnnualRatePct", &raw.mortgage_annual_rate_pct, 0.0, 100.0, "%");
    issues.range("mortgageYearsRemaining", &raw.mortgage_years_remaining, 0.0, 50.0, " years");
    for (field, text) in [
        ("preRetirementReturnPct", &raw.pre_retirement_return_pct),
        ("postRetirementReturnPct", &raw.post_retirement_return_pct),
        ("realEstateAppreciationPct", &raw.real_estate_appreciation_pct),
    ] {
        issues.range(field, text, -50.0, 100.0, "%");
    }
    issues.range("inflationPct", &raw.inflation_pct, -10.0, 50.0, "%");
    issues.range("medicalLateBoostPct", &raw.medical_late_boost_pct, 0.0, 1000.0, "%");
    issues.range("sellCostRatePct", &raw.sell_cost_rate_pct, 0.0, 100.0, "%");

    if let Some(age) = issues.range("saleAge", &raw.sale_age, 1.0, 120.0, " years") {
        if age < retire_age {
            issues.push("saleAge", "sale age must be at or after retirement age");
        }
    }
    if let Some(age) = issues.range("rentStartAge", &raw.rent_start_age, 1.0, 120.0, " years") {
        if age < current_age {
            issues.push("rentStartAge", "rent start age must be at or after current age");
        }
    }

    issues.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(issues: &[FieldIssue]) -> Vec<&'static str> {
        issues.iter().map(|issue| issue.field).collect()
    }

    #[test]
    fn empty_form_has_no_issues() {
        assert!(check_fields(&CalculatorInputs::default()).is_empty());
    }

    #[test]
    fn flags_out_of_range_values() {
        let inputs = CalculatorInputs {
            current_age: "130".into(),
            monthly_expense: "20,000,000".into(),
            inflation_pct: "-20".into(),
            mortgage_years_remaining: "60".into(),
            ..CalculatorInputs::default()
        };
        let issues = check_fields(&inputs);
        assert_eq!(
            fields(&issues),
            vec![
                "currentAge",
                "monthlyExpense",
                "mortgageYearsRemaining",
                "inflationPct"
            ]
        );
        assert_eq!(issues[0].message, "enter 1-100 years");
        assert_eq!(issues[3].message, "enter -10-50%");
    }

    #[test]
    fn flags_age_ordering_once_per_field() {
        let inputs = CalculatorInputs {
            current_age: "60".into(),
            retire_age: "55".into(),
            life_expectancy: "50".into(),
            ..CalculatorInputs::default()
        };
        let issues = check_fields(&inputs);
        assert_eq!(fields(&issues), vec!["retireAge", "lifeExpectancy"]);
        assert_eq!(
            issues[0].message,
            "retirement age must be greater than current age"
        );
    }

    #[test]
    fn negative_rates_within_range_pass() {
        let inputs = CalculatorInputs {
            real_estate_appreciation_pct: "-3".into(),
            pre_retirement_return_pct: "-49".into(),
            ..CalculatorInputs::default()
        };
        assert!(check_fields(&inputs).is_empty());
    }

    #[test]
    fn sale_and_rent_ages_are_checked_against_plan() {
        let inputs = CalculatorInputs {
            current_age: "40".into(),
            retire_age: "60".into(),
            life_expectancy: "90".into(),
            sale_age: "55".into(),
            rent_start_age: "35".into(),
            ..CalculatorInputs::default()
        };
        let issues = check_fields(&inputs);
        assert_eq!(fields(&issues), vec!["saleAge", "rentStartAge"]);
    }
}
