// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure price calculation.
//!
//! `final = ceil_to_increment(cost_usd * (1 + markup_pct/100) * fx_rate)`.
//! The FX cap is applied by the engine before the rate reaches this
//! function; this module only does arithmetic.

use numio_core::NumioError;

/// Markup and rounding rules, taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PricingRules {
    /// Markup percentage; 100 doubles the upstream price.
    pub markup_pct: u32,
    /// Final prices are rounded up to a multiple of this.
    pub increment: i64,
}

/// Computes the final NGN price for an upstream USD cost.
///
/// Fails with [`NumioError::InvalidCost`] on a non-positive cost and
/// [`NumioError::NonPositivePrice`] when the configured rules drive the
/// result to zero or below; callers treat both as "service unavailable".
pub fn calculate_price(
    cost_usd: f64,
    fx_rate: f64,
    rules: &PricingRules,
) -> Result<i64, NumioError> {
    if !cost_usd.is_finite() || cost_usd <= 0.0 {
        return Err(NumioError::InvalidCost { cost_usd });
    }

    let markup_multiplier = 1.0 + f64::from(rules.markup_pct) / 100.0;
    let unrounded = cost_usd * markup_multiplier * fx_rate;

    // Knock float dust off before the ceiling so an exact multiple of the
    // increment does not round up a full step.
    let steps = unrounded / rules.increment as f64;
    let steps = (steps * 1e9).round() / 1e9;
    let rounded = steps.ceil() as i64 * rules.increment;

    if rounded <= 0 {
        return Err(NumioError::NonPositivePrice { computed: rounded });
    }

    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RULES: PricingRules = PricingRules {
        markup_pct: 100,
        increment: 10,
    };

    #[test]
    fn observed_scenario_prices_exactly() {
        // $0.50 cost, 100% markup, fx capped at 1600 => 1600 NGN.
        assert_eq!(calculate_price(0.50, 1600.0, &RULES).unwrap(), 1600);
    }

    #[test]
    fn rounds_up_to_increment() {
        // 0.13 * 2 * 1550.75 = 403.195 -> 410.
        assert_eq!(calculate_price(0.13, 1550.75, &RULES).unwrap(), 410);
    }

    #[test]
    fn exact_multiple_does_not_round_up_a_step() {
        // 0.25 * 2 * 1600 = 800 exactly.
        assert_eq!(calculate_price(0.25, 1600.0, &RULES).unwrap(), 800);
    }

    #[test]
    fn non_positive_cost_is_invalid() {
        assert!(matches!(
            calculate_price(0.0, 1600.0, &RULES),
            Err(NumioError::InvalidCost { .. })
        ));
        assert!(matches!(
            calculate_price(-1.0, 1600.0, &RULES),
            Err(NumioError::InvalidCost { .. })
        ));
        assert!(matches!(
            calculate_price(f64::NAN, 1600.0, &RULES),
            Err(NumioError::InvalidCost { .. })
        ));
    }

    #[test]
    fn zero_fx_rate_yields_non_positive_price() {
        assert!(matches!(
            calculate_price(0.50, 0.0, &RULES),
            Err(NumioError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn zero_markup_still_prices() {
        let rules = PricingRules {
            markup_pct: 0,
            increment: 10,
        };
        assert_eq!(calculate_price(1.0, 1000.0, &rules).unwrap(), 1000);
    }

    proptest! {
        #[test]
        fn price_is_a_positive_multiple_of_the_increment(
            cost in 0.01f64..100.0,
            fx in 1.0f64..5000.0,
        ) {
            let price = calculate_price(cost, fx, &RULES).unwrap();
            prop_assert!(price > 0);
            prop_assert_eq!(price % RULES.increment, 0);
        }

        #[test]
        fn price_is_monotone_in_cost(
            cost_lo in 0.01f64..50.0,
            bump in 0.0f64..50.0,
            fx in 1.0f64..5000.0,
        ) {
            let lo = calculate_price(cost_lo, fx, &RULES).unwrap();
            let hi = calculate_price(cost_lo + bump, fx, &RULES).unwrap();
            prop_assert!(hi >= lo);
        }

        #[test]
        fn price_is_monotone_in_fx(
            cost in 0.01f64..100.0,
            fx_lo in 1.0f64..2500.0,
            bump in 0.0f64..2500.0,
        ) {
            let lo = calculate_price(cost, fx_lo, &RULES).unwrap();
            let hi = calculate_price(cost, fx_lo + bump, &RULES).unwrap();
            prop_assert!(hi >= lo);
        }

        #[test]
        fn price_covers_the_marked_up_cost(
            cost in 0.01f64..100.0,
            fx in 1.0f64..5000.0,
        ) {
            let price = calculate_price(cost, fx, &RULES).unwrap();
            // Rounding is strictly upward (modulo float dust).
            prop_assert!(price as f64 >= cost * 2.0 * fx - 1e-3);
        }
    }
}
