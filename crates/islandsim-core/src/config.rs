//! Species and landscape parameter sets.
//!
//! Parameters are owned by the simulation context and passed into the world
//! explicitly; there is no process-global state. Updates go through typed
//! keys and are validated before anything is committed.

use crate::{Error, LandKind, Result, Species};
use serde::{Deserialize, Serialize};

/// Typed key naming one updatable field of [`SpeciesParams`]. The species
/// identity is not a key, so an update can never change what a species is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciesParam {
    BirthWeightMean,
    BirthWeightSigma,
    FeedingEfficiency,
    WeightDecayRate,
    AgeMidpoint,
    AgeSlope,
    WeightMidpoint,
    WeightSlope,
    MigrationPropensity,
    BirthRate,
    BirthThresholdScale,
    BirthCostScale,
    DeathRate,
    Appetite,
    FitnessGapCap,
}

/// Numeric parameter set for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean of the Gaussian birth-weight draw.
    pub birth_weight_mean: f64,
    /// Standard deviation of the birth-weight draw.
    pub birth_weight_sigma: f64,
    /// Weight gained per unit of food eaten.
    pub feeding_efficiency: f64,
    /// Fraction of body weight lost each year. Must lie in [0, 1].
    pub weight_decay_rate: f64,
    /// Age at which the age factor of the fitness curve crosses 1/2.
    pub age_midpoint: f64,
    /// Steepness of the age factor.
    pub age_slope: f64,
    /// Weight at which the weight factor of the fitness curve crosses 1/2.
    pub weight_midpoint: f64,
    /// Steepness of the weight factor.
    pub weight_slope: f64,
    /// Scales fitness into a per-year migration probability.
    pub migration_propensity: f64,
    /// Scales fitness and cell crowding into a birth probability.
    pub birth_rate: f64,
    /// Minimum-weight threshold scale for giving birth.
    pub birth_threshold_scale: f64,
    /// Weight cost of a birth, as a multiple of the newborn's weight.
    pub birth_cost_scale: f64,
    /// Scales (1 - fitness) into a per-year death probability.
    pub death_rate: f64,
    /// Maximum food (or prey-weight) intake per year.
    pub appetite: f64,
    /// Fitness advantage beyond which a kill is certain. Hunting species
    /// only; must be strictly positive when present.
    pub fitness_gap_cap: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            birth_weight_mean: 8.0,
            birth_weight_sigma: 1.5,
            feeding_efficiency: 0.9,
            weight_decay_rate: 0.05,
            age_midpoint: 40.0,
            age_slope: 0.6,
            weight_midpoint: 10.0,
            weight_slope: 0.1,
            migration_propensity: 0.25,
            birth_rate: 0.2,
            birth_threshold_scale: 3.5,
            birth_cost_scale: 1.2,
            death_rate: 0.4,
            appetite: 10.0,
            fitness_gap_cap: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            birth_weight_mean: 6.0,
            birth_weight_sigma: 1.0,
            feeding_efficiency: 0.75,
            weight_decay_rate: 0.125,
            age_midpoint: 40.0,
            age_slope: 0.3,
            weight_midpoint: 4.0,
            weight_slope: 0.4,
            migration_propensity: 0.4,
            birth_rate: 0.8,
            birth_threshold_scale: 3.5,
            birth_cost_scale: 1.1,
            death_rate: 0.8,
            appetite: 50.0,
            fitness_gap_cap: Some(10.0),
        }
    }

    pub fn defaults_for(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    fn check(param: SpeciesParam, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::Validation(format!("{param:?} must be finite")));
        }
        match param {
            SpeciesParam::WeightDecayRate if !(0.0..=1.0).contains(&value) => Err(
                Error::Validation("WeightDecayRate must lie in [0, 1]".into()),
            ),
            SpeciesParam::FitnessGapCap if value <= 0.0 => Err(Error::Validation(
                "FitnessGapCap must be strictly positive".into(),
            )),
            _ if value < 0.0 => Err(Error::Validation(format!(
                "{param:?} cannot be negative"
            ))),
            _ => Ok(()),
        }
    }

    /// Apply one field update after validating it.
    pub fn set(&mut self, param: SpeciesParam, value: f64) -> Result<()> {
        Self::check(param, value)?;
        match param {
            SpeciesParam::BirthWeightMean => self.birth_weight_mean = value,
            SpeciesParam::BirthWeightSigma => self.birth_weight_sigma = value,
            SpeciesParam::FeedingEfficiency => self.feeding_efficiency = value,
            SpeciesParam::WeightDecayRate => self.weight_decay_rate = value,
            SpeciesParam::AgeMidpoint => self.age_midpoint = value,
            SpeciesParam::AgeSlope => self.age_slope = value,
            SpeciesParam::WeightMidpoint => self.weight_midpoint = value,
            SpeciesParam::WeightSlope => self.weight_slope = value,
            SpeciesParam::MigrationPropensity => self.migration_propensity = value,
            SpeciesParam::BirthRate => self.birth_rate = value,
            SpeciesParam::BirthThresholdScale => self.birth_threshold_scale = value,
            SpeciesParam::BirthCostScale => self.birth_cost_scale = value,
            SpeciesParam::DeathRate => self.death_rate = value,
            SpeciesParam::Appetite => self.appetite = value,
            SpeciesParam::FitnessGapCap => self.fitness_gap_cap = Some(value),
        }
        Ok(())
    }

    /// Return a copy with every update applied, or an error and no change.
    /// Either the whole batch commits or none of it does.
    pub fn with_updates(&self, updates: &[(SpeciesParam, f64)]) -> Result<Self> {
        let mut next = self.clone();
        for &(param, value) in updates {
            next.set(param, value)?;
        }
        next.validate()?;
        Ok(next)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            (SpeciesParam::BirthWeightMean, self.birth_weight_mean),
            (SpeciesParam::BirthWeightSigma, self.birth_weight_sigma),
            (SpeciesParam::FeedingEfficiency, self.feeding_efficiency),
            (SpeciesParam::WeightDecayRate, self.weight_decay_rate),
            (SpeciesParam::AgeMidpoint, self.age_midpoint),
            (SpeciesParam::AgeSlope, self.age_slope),
            (SpeciesParam::WeightMidpoint, self.weight_midpoint),
            (SpeciesParam::WeightSlope, self.weight_slope),
            (SpeciesParam::MigrationPropensity, self.migration_propensity),
            (SpeciesParam::BirthRate, self.birth_rate),
            (SpeciesParam::BirthThresholdScale, self.birth_threshold_scale),
            (SpeciesParam::BirthCostScale, self.birth_cost_scale),
            (SpeciesParam::DeathRate, self.death_rate),
            (SpeciesParam::Appetite, self.appetite),
        ];
        for (param, value) in fields {
            Self::check(param, value)?;
        }
        if let Some(cap) = self.fitness_gap_cap {
            Self::check(SpeciesParam::FitnessGapCap, cap)?;
        }
        Ok(())
    }
}

/// Annual fodder capacity per fodder-bearing landscape kind. Desert and
/// water never carry fodder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FodderParams {
    pub lowland_max: f64,
    pub highland_max: f64,
}

impl Default for FodderParams {
    fn default() -> Self {
        Self {
            lowland_max: 800.0,
            highland_max: 300.0,
        }
    }
}

impl FodderParams {
    /// Yearly fodder budget for `kind`, if that kind carries fodder at all.
    pub fn capacity(&self, kind: LandKind) -> Option<f64> {
        match kind {
            LandKind::Lowland => Some(self.lowland_max),
            LandKind::Highland => Some(self.highland_max),
            LandKind::Water | LandKind::Desert => None,
        }
    }

    /// Update the capacity of a fodder-bearing kind.
    pub fn set_capacity(&mut self, kind: LandKind, f_max: f64) -> Result<()> {
        if !f_max.is_finite() || f_max < 0.0 {
            return Err(Error::Validation(
                "fodder capacity cannot be negative".into(),
            ));
        }
        match kind {
            LandKind::Lowland => self.lowland_max = f_max,
            LandKind::Highland => self.highland_max = f_max,
            LandKind::Water | LandKind::Desert => {
                return Err(Error::Validation(format!("{kind} carries no fodder")));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for value in [self.lowland_max, self.highland_max] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Validation(
                    "fodder capacity cannot be negative".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Full parameter context for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub fodder: FodderParams,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            fodder: FodderParams::default(),
        }
    }
}

impl SimParams {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.herbivore.validate()?;
        self.carnivore.validate()?;
        self.fodder.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SimParams::default().validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let herb = SpeciesParams::herbivore();
        assert_eq!(herb.birth_weight_mean, 8.0);
        assert_eq!(herb.appetite, 10.0);
        assert_eq!(herb.fitness_gap_cap, None);

        let carn = SpeciesParams::carnivore();
        assert_eq!(carn.appetite, 50.0);
        assert_eq!(carn.fitness_gap_cap, Some(10.0));
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        let mut params = SpeciesParams::carnivore();
        assert!(params.set(SpeciesParam::WeightDecayRate, 2.0).is_err());
        assert!(params.set(SpeciesParam::FitnessGapCap, 0.0).is_err());
        assert!(params.set(SpeciesParam::BirthWeightMean, -3.0).is_err());
        assert!(params.set(SpeciesParam::Appetite, f64::NAN).is_err());
        // Nothing above may have been applied.
        assert_eq!(params, SpeciesParams::carnivore());
    }

    #[test]
    fn test_set_applies_valid_values() {
        let mut params = SpeciesParams::herbivore();
        params.set(SpeciesParam::BirthWeightMean, 4.0).unwrap();
        params.set(SpeciesParam::Appetite, 13.0).unwrap();
        assert_eq!(params.birth_weight_mean, 4.0);
        assert_eq!(params.appetite, 13.0);
    }

    #[test]
    fn test_with_updates_is_atomic() {
        let params = SpeciesParams::herbivore();
        let result = params.with_updates(&[
            (SpeciesParam::Appetite, 13.0),
            (SpeciesParam::WeightDecayRate, 5.0),
        ]);
        assert!(result.is_err());
        // The valid leading update must not have leaked into the original.
        assert_eq!(params.appetite, 10.0);
    }

    #[test]
    fn test_with_updates_applies_batch() {
        let params = SpeciesParams::herbivore();
        let next = params
            .with_updates(&[
                (SpeciesParam::BirthRate, 0.5),
                (SpeciesParam::MigrationPropensity, 1.0),
            ])
            .unwrap();
        assert_eq!(next.birth_rate, 0.5);
        assert_eq!(next.migration_propensity, 1.0);
        assert_eq!(params.birth_rate, 0.2);
    }

    #[test]
    fn test_fodder_capacity_per_kind() {
        let fodder = FodderParams::default();
        assert_eq!(fodder.capacity(LandKind::Lowland), Some(800.0));
        assert_eq!(fodder.capacity(LandKind::Highland), Some(300.0));
        assert_eq!(fodder.capacity(LandKind::Desert), None);
        assert_eq!(fodder.capacity(LandKind::Water), None);
    }

    #[test]
    fn test_fodder_updates() {
        let mut fodder = FodderParams::default();
        fodder.set_capacity(LandKind::Lowland, 500.0).unwrap();
        assert_eq!(fodder.lowland_max, 500.0);

        assert!(fodder.set_capacity(LandKind::Highland, -1.0).is_err());
        assert!(fodder.set_capacity(LandKind::Desert, 100.0).is_err());
        assert!(fodder.set_capacity(LandKind::Water, 100.0).is_err());
    }
}
