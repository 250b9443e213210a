use super::expense::ExpenseSchedule;
use super::tvm::compound;
use super::types::YearlySnapshot;

/// Year-by-year asset path from retirement to the end of the horizon,
/// inclusive, for charting.
///
/// Past spending is compounded forward at `post_rate`, so the cumulative
/// expense is the opportunity cost of what has been drawn rather than the
/// cash actually spent. It is deliberately not reconciled with the present
/// value used for the required-funds figure.
pub fn build_trajectory(
    retire_age: u32,
    schedule: &ExpenseSchedule,
    projected_assets: f64,
    post_rate: f64,
) -> Vec<YearlySnapshot> {
    let yearly_growth = compound(1.0, post_rate, 1.0);
    let mut cumulative_expense = 0.0;

    (0..=schedule.horizon())
        .map(|year_index| {
            cumulative_expense =
                cumulative_expense * yearly_growth + schedule.net_for_year(year_index);
            YearlySnapshot {
                age: retire_age + year_index,
                year_index,
                remaining_assets: compound(projected_assets, post_rate, f64::from(year_index))
                    - cumulative_expense,
                cumulative_expense,
            }
        })
        .collect()
}
