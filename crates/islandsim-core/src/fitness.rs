//! Fitness: a [0, 1] condition score derived from age and weight.

use crate::SpeciesParams;

/// Sigmoid that decays from 1 toward 0 as `x` passes `midpoint`.
fn decay(x: f64, midpoint: f64, slope: f64) -> f64 {
    1.0 / (1.0 + (slope * (x - midpoint)).exp())
}

/// Sigmoid that grows from 0 toward 1 as `x` passes `midpoint`.
fn growth(x: f64, midpoint: f64, slope: f64) -> f64 {
    1.0 / (1.0 + (-slope * (x - midpoint)).exp())
}

/// Fitness of an animal: zero at non-positive weight, otherwise the product
/// of an age factor (declining with age) and a weight factor (rising with
/// weight).
pub fn compute(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    decay(age as f64, params.age_midpoint, params.age_slope)
        * growth(weight, params.weight_midpoint, params.weight_slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn curve(age_slope: f64, age_midpoint: f64, weight_slope: f64, weight_midpoint: f64) -> SpeciesParams {
        let mut params = SpeciesParams::herbivore();
        params.age_slope = age_slope;
        params.age_midpoint = age_midpoint;
        params.weight_slope = weight_slope;
        params.weight_midpoint = weight_midpoint;
        params
    }

    #[test]
    fn test_matches_closed_form() {
        let params = curve(4.0, 13.0, 4.0, 2.0);
        let age = 15u32;
        let weight: f64 = 10.0;

        let expected = (1.0 / (1.0 + (4.0 * (age as f64 - 13.0)).exp()))
            * (1.0 / (1.0 + (-4.0 * (weight - 2.0)).exp()));
        let actual = compute(age, weight, &params);

        assert!((actual - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_at_non_positive_weight() {
        let params = SpeciesParams::herbivore();
        assert_eq!(compute(5, 0.0, &params), 0.0);
        assert_eq!(compute(5, -1.0, &params), 0.0);
    }

    #[test]
    fn test_increasing_in_weight_below_midpoint() {
        let params = SpeciesParams::herbivore();
        let mut last = 0.0;
        for weight in [1.0, 3.0, 5.0, 7.0, 9.0] {
            let fitness = compute(5, weight, &params);
            assert!(fitness > last, "fitness must rise with weight below the midpoint");
            last = fitness;
        }
    }

    proptest! {
        #[test]
        fn prop_fitness_in_unit_interval(age in 0u32..300, weight in -10.0f64..1000.0) {
            let fitness = compute(age, weight, &SpeciesParams::carnivore());
            prop_assert!((0.0..=1.0).contains(&fitness));
        }
    }
}
