//! Animal state and per-year behavior rules.
//!
//! Hunting lives here too even though only carnivores use it today; any
//! future hunting species gets it from its parameter set rather than from
//! new code.

use islandsim_core::{fitness, Coord, Direction, Error, Result, Species, SpeciesParams};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One animal on the island. Owned by exactly one cell at a time; the
/// position always matches the owning cell's coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    position: Coord,
    fitness: f64,
    migrated: bool,
    given_birth: bool,
    birth_year: Option<u32>,
    dead: bool,
}

impl Animal {
    /// Create an animal. Age must be non-negative and weight strictly
    /// positive.
    pub fn new(
        species: Species,
        age: i32,
        weight: f64,
        position: Coord,
        params: &SpeciesParams,
    ) -> Result<Self> {
        if age < 0 {
            return Err(Error::Validation("age cannot be negative".into()));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::Validation(
                "weight must be strictly positive".into(),
            ));
        }
        let mut animal = Self {
            species,
            age: age as u32,
            weight,
            position,
            fitness: 0.0,
            migrated: false,
            given_birth: false,
            birth_year: None,
            dead: false,
        };
        animal.update_fitness(params);
        Ok(animal)
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn has_migrated(&self) -> bool {
        self.migrated
    }

    pub fn has_given_birth(&self) -> bool {
        self.given_birth
    }

    fn update_fitness(&mut self, params: &SpeciesParams) {
        self.fitness = fitness::compute(self.age, self.weight, params);
    }

    /// Annual age increase.
    pub fn age_increase(&mut self, params: &SpeciesParams) {
        self.age += 1;
        self.update_fitness(params);
    }

    /// Annual weight decay, floored at zero.
    pub fn apply_weight_decay(&mut self, params: &SpeciesParams) {
        self.weight -= params.weight_decay_rate * self.weight;
        if self.weight < 0.0 {
            self.weight = 0.0;
        }
        self.update_fitness(params);
    }

    /// Gain weight from `food` units eaten.
    pub fn eat(&mut self, food: f64, params: &SpeciesParams) {
        self.weight += params.feeding_efficiency * food;
        self.update_fitness(params);
    }

    /// Mark the animal dead outside the yearly draw. Used for hunted prey.
    pub fn mark_dead(&mut self) {
        self.dead = true;
    }

    /// Yearly death check: certain at zero weight, otherwise a single draw
    /// against `death_rate * (1 - fitness)`. Once dead, stays dead.
    pub fn evaluate_death<R: Rng>(&mut self, params: &SpeciesParams, rng: &mut R) {
        if self.dead {
            return;
        }
        let prob = params.death_rate * (1.0 - self.fitness);
        let draw: f64 = rng.gen();
        if draw < prob || self.weight <= 0.0 {
            self.dead = true;
        }
    }

    /// Clear the per-year transient flags at the start of a cycle.
    pub fn reset_year_flags(&mut self) {
        self.migrated = false;
        self.given_birth = false;
    }

    /// One migration chance per year: the first call draws against
    /// `migration_propensity * fitness`; later calls in the same year return
    /// false.
    pub fn attempt_migration<R: Rng>(&mut self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.migrated {
            return false;
        }
        self.migrated = true;
        rng.gen::<f64>() < params.migration_propensity * self.fitness
    }

    /// Pick a cardinal neighbor uniformly at random. The move is only a
    /// candidate; the island decides whether it is legal.
    pub fn choose_migration_target<R: Rng>(&self, rng: &mut R) -> (Coord, Coord) {
        let direction = Direction::all()[rng.gen_range(0..4)];
        let (drow, dcol) = direction.to_delta();
        (self.position, self.position.offset(drow, dcol))
    }

    /// Used by the island when relocating a migrant.
    pub fn set_position(&mut self, position: Coord) {
        self.position = position;
    }

    /// Attempt to give birth. All gates must pass: the crowding-scaled
    /// probability draw, the minimum-weight threshold, the once-per-year cap,
    /// and the weight cost of carrying the newborn.
    pub fn attempt_birth<R: Rng>(
        &mut self,
        same_species_in_cell: usize,
        year: u32,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        let crowding = same_species_in_cell.saturating_sub(1) as f64;
        let birth_prob = (params.birth_rate * self.fitness * crowding).min(1.0);
        let draw: f64 = rng.gen();

        let threshold =
            params.birth_threshold_scale * (params.birth_weight_mean + params.birth_weight_sigma);
        let birth_weight = draw_birth_weight(params, rng);
        let cost = params.birth_cost_scale * birth_weight;

        let allowed = draw < birth_prob
            && self.weight >= threshold
            && self.birth_year != Some(year)
            && self.weight >= cost
            && birth_weight > 0.0;

        if !allowed {
            self.given_birth = false;
            return None;
        }

        self.weight -= cost;
        self.update_fitness(params);
        self.given_birth = true;
        self.birth_year = Some(year);

        Some(Animal {
            species: self.species,
            age: 0,
            weight: birth_weight,
            position: self.position,
            fitness: fitness::compute(0, birth_weight, params),
            migrated: false,
            given_birth: false,
            birth_year: None,
            dead: false,
        })
    }

    /// Hunt a list of prey, weakest first. A kill needs a positive fitness
    /// advantage; an advantage at or beyond the species cap kills outright,
    /// a smaller one kills with probability `gap / cap`. Weight gain is
    /// capped at the appetite target; prey weight beyond the cap is wasted,
    /// and the hunt stops once the appetite is reached.
    pub fn hunt<R: Rng>(&mut self, prey: &mut [Animal], params: &SpeciesParams, rng: &mut R) {
        let Some(cap) = params.fitness_gap_cap else {
            return;
        };

        let mut order: Vec<usize> = (0..prey.len()).collect();
        order.sort_by(|&a, &b| prey[a].fitness.total_cmp(&prey[b].fitness));

        let mut eaten_total = 0.0;
        for index in order {
            let target = &mut prey[index];
            if target.dead {
                continue;
            }
            let gap = self.fitness - target.fitness;
            if gap <= 0.0 {
                continue;
            }
            if gap < cap {
                let draw: f64 = rng.gen();
                if draw >= gap / cap {
                    continue;
                }
            }

            // The intake counter includes wasted prey weight; the gain does not.
            let gain = capped_intake(target.weight, eaten_total, params.appetite);
            eaten_total += target.weight;
            target.mark_dead();
            self.eat(gain, params);

            if eaten_total >= params.appetite {
                break;
            }
        }
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}, {})",
            self.species, self.age, self.weight, self.position
        )
    }
}

/// Portion of `prey_weight` a hunter actually banks, given what it has
/// already eaten and its appetite target.
fn capped_intake(prey_weight: f64, eaten_total: f64, appetite: f64) -> f64 {
    if prey_weight + eaten_total > appetite {
        appetite - eaten_total
    } else {
        prey_weight
    }
}

/// Gaussian birth-weight draw via the Box-Muller transform (keeps the
/// randomness stack to `rand` itself).
fn draw_birth_weight<R: Rng>(params: &SpeciesParams, rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::EPSILON);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    params.birth_weight_mean + params.birth_weight_sigma * z
}
