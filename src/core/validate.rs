use thiserror::Error;

use super::types::{RealEstateMode, ResolvedInputs};

/// Reasons a snapshot cannot be projected. The display text is what callers
/// show to the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum InputError {
    #[error("current age must be between 1 and 100")]
    CurrentAgeOutOfRange,
    #[error("retirement age must be between 1 and 100")]
    RetireAgeOutOfRange,
    #[error("life expectancy must be between 1 and 120")]
    LifeExpectancyOutOfRange,
    #[error("sale age must be a positive number")]
    SaleAgeNotPositive,
    #[error("current age must be strictly less than retirement age")]
    RetireNotAfterCurrent,
    #[error("retirement age must be strictly less than life expectancy")]
    LifeNotAfterRetire,
    #[error("sale age must be later than current age")]
    SaleNotAfterCurrent,
    /// Raised after projecting, when the amounts overflow `f64`.
    #[error("amounts are too large to project")]
    AmountsTooLarge,
}

/// Checks run in a fixed order and stop at the first failure.
pub fn validate(inputs: &ResolvedInputs) -> Result<(), InputError> {
    let selling = inputs.mode == RealEstateMode::Sell;

    if !(1.0..=100.0).contains(&inputs.entered_ages.current) {
        return Err(InputError::CurrentAgeOutOfRange);
    }
    if !(1.0..=100.0).contains(&inputs.entered_ages.retire) {
        return Err(InputError::RetireAgeOutOfRange);
    }
    if !(1.0..=120.0).contains(&inputs.entered_ages.life_expectancy) {
        return Err(InputError::LifeExpectancyOutOfRange);
    }
    if selling && inputs.sale_age_supplied && inputs.sale_age == 0 {
        return Err(InputError::SaleAgeNotPositive);
    }
    if inputs.current_age >= inputs.retire_age {
        return Err(InputError::RetireNotAfterCurrent);
    }
    if inputs.retire_age >= inputs.life_expectancy {
        return Err(InputError::LifeNotAfterRetire);
    }
    if selling && inputs.sale_age <= inputs.current_age {
        return Err(InputError::SaleNotAfterCurrent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::resolve;
    use crate::core::types::CalculatorInputs;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn ages(current: u32, retire: u32, life: u32) -> ResolvedInputs {
        resolve(&CalculatorInputs {
            current_age: current.to_string(),
            retire_age: retire.to_string(),
            life_expectancy: life.to_string(),
            ..CalculatorInputs::default()
        })
    }

    #[test]
    fn accepts_ordered_ages() {
        assert_eq!(validate(&ages(30, 60, 90)), Ok(()));
    }

    #[test]
    fn range_checks_come_before_ordering() {
        assert_eq!(
            validate(&ages(0, 60, 90)),
            Err(InputError::CurrentAgeOutOfRange)
        );
        assert_eq!(
            validate(&ages(101, 60, 90)),
            Err(InputError::CurrentAgeOutOfRange)
        );
        assert_eq!(
            validate(&ages(70, 0, 90)),
            Err(InputError::RetireAgeOutOfRange)
        );
        assert_eq!(
            validate(&ages(30, 60, 121)),
            Err(InputError::LifeExpectancyOutOfRange)
        );
    }

    #[test]
    fn fractional_ages_are_range_checked_before_truncation() {
        let resolve_text = |current: &str, retire: &str, life: &str| {
            resolve(&CalculatorInputs {
                current_age: current.into(),
                retire_age: retire.into(),
                life_expectancy: life.into(),
                ..CalculatorInputs::default()
            })
        };
        assert_eq!(
            validate(&resolve_text("100.5", "60", "90")),
            Err(InputError::CurrentAgeOutOfRange)
        );
        assert_eq!(
            validate(&resolve_text("0.5", "60", "90")),
            Err(InputError::CurrentAgeOutOfRange)
        );
        assert_eq!(
            validate(&resolve_text("30", "100.2", "110")),
            Err(InputError::RetireAgeOutOfRange)
        );
        assert_eq!(
            validate(&resolve_text("30", "60", "120.9")),
            Err(InputError::LifeExpectancyOutOfRange)
        );
        // Inside the range the fraction is simply dropped.
        let resolved = resolve_text("44.9", "60", "90");
        assert_eq!(resolved.current_age, 44);
        assert_eq!(validate(&resolved), Ok(()));
    }

    #[test]
    fn rejects_equal_ages() {
        assert_eq!(
            validate(&ages(60, 60, 90)),
            Err(InputError::RetireNotAfterCurrent)
        );
        assert_eq!(
            validate(&ages(30, 90, 90)),
            Err(InputError::LifeNotAfterRetire)
        );
    }

    #[test]
    fn sell_mode_checks_sale_age() {
        let mut inputs = ages(40, 60, 90);
        inputs.mode = RealEstateMode::Sell;
        inputs.sale_age_supplied = true;

        inputs.sale_age = 0;
        assert_eq!(validate(&inputs), Err(InputError::SaleAgeNotPositive));

        inputs.sale_age = 40;
        assert_eq!(validate(&inputs), Err(InputError::SaleNotAfterCurrent));

        inputs.sale_age = 41;
        assert_eq!(validate(&inputs), Ok(()));
    }

    #[test]
    fn sale_age_is_ignored_outside_sell_mode() {
        let mut inputs = ages(40, 60, 90);
        inputs.sale_age_supplied = true;
        inputs.sale_age = 0;
        assert_eq!(validate(&inputs), Ok(()));
    }

    #[test]
    fn error_text_is_human_readable() {
        assert_eq!(
            InputError::LifeNotAfterRetire.to_string(),
            "retirement age must be strictly less than life expectancy"
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_rejects_retire_not_after_current(current in 1u32..=100, back in 0u32..40) {
            let retire = current.saturating_sub(back).max(1);
            prop_assert_eq!(
                validate(&ages(current, retire, 120)),
                Err(InputError::RetireNotAfterCurrent)
            );
        }

        #[test]
        fn prop_rejects_life_not_after_retire(retire in 2u32..=100, back in 0u32..40) {
            let life = retire.saturating_sub(back).max(1);
            prop_assert_eq!(
                validate(&ages(1, retire, life)),
                Err(InputError::LifeNotAfterRetire)
            );
        }
    }
}
