//! Plain-text rendering of a projection for the terminal.

use std::fmt::Write;

use crate::core::CalculatorOutputs;

/// Rounds to a whole unit and groups thousands: `-1234567.6` becomes
/// `-1,234,568`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn render_text(outputs: &CalculatorOutputs) -> String {
    if let Some(reason) = &outputs.failure {
        return format!("Cannot project this plan: {reason}\n");
    }

    let mut out = String::new();
    let line = |out: &mut String, label: &str, value: String| {
        let _ = writeln!(out, "{label:<28}{value:>18}");
    };

    line(&mut out, "Required funds", format_currency(outputs.required_funds));
    line(&mut out, "Projected assets", format_currency(outputs.projected_assets));
    line(&mut out, "Gap", format_currency(outputs.gap));
    line(
        &mut out,
        "Coverage",
        format!("{:.1}%", outputs.coverage_ratio * 100.0),
    );
    line(
        &mut out,
        "Years sustained",
        format!("{} of {}", outputs.years_sustained, outputs.years_in_retirement),
    );
    line(
        &mut out,
        "First-year net expense",
        format_currency(outputs.net_annual_expense),
    );
    if outputs.suggested_monthly_saving > 0.0 {
        line(
            &mut out,
            "Extra monthly saving needed",
            format_currency(outputs.suggested_monthly_saving),
        );
    }

    let b = &outputs.breakdown;
    out.push_str("\nAssets at retirement\n");
    line(&mut out, "  Cash", format_currency(b.cash));
    line(&mut out, "  Investments", format_currency(b.investments));
    line(&mut out, "  Savings", format_currency(b.savings));
    line(&mut out, "  Real estate", format_currency(b.real_estate));
    if b.mortgage_obligation > 0.0 || b.sale_offset > 0.0 {
        out.push_str("\nAdjustments to required funds\n");
        line(&mut out, "  Mortgage payments", format_currency(b.mortgage_obligation));
        line(&mut out, "  Later sale", format_currency(-b.sale_offset));
    }

    out.push_str("\n  Age   Remaining assets   Cumulative expense\n");
    for snap in &outputs.trajectory {
        let _ = writeln!(
            out,
            "  {:>3}   {:>16}   {:>18}",
            snap.age,
            format_currency(snap.remaining_assets),
            format_currency(snap.cumulative_expense)
        );
    }
    out
}
