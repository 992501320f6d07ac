//! One grid cell: its landscape kind, fodder budget, and resident animals.
//!
//! The cell only applies the local sub-phases of a year; sequencing across
//! cells and everything involving a second cell (migration) belongs to the
//! island.

use crate::animal::Animal;
use islandsim_core::{Coord, LandKind, SimParams, Species};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A migration request recorded during the collection pass. `index` points
/// into the source cell's species list and stays valid until the relocation
/// pass mutates that list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationCandidate {
    pub species: Species,
    pub index: usize,
    pub from: Coord,
    pub to: Coord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    kind: LandKind,
    coord: Coord,
    fodder: Option<f64>,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
    resident_count: usize,
}

impl Cell {
    pub fn new(kind: LandKind, coord: Coord, params: &SimParams) -> Self {
        Self {
            kind,
            coord,
            fodder: params.fodder.capacity(kind),
            herbivores: Vec::new(),
            carnivores: Vec::new(),
            resident_count: 0,
        }
    }

    pub fn kind(&self) -> LandKind {
        self.kind
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn is_passable(&self) -> bool {
        self.kind.is_passable()
    }

    /// Fodder still available this year, if the landscape carries any.
    pub fn fodder(&self) -> Option<f64> {
        self.fodder
    }

    /// Running total maintained by add/compact/relocate. The island's census
    /// never trusts it and recounts from the lists instead.
    pub fn resident_count(&self) -> usize {
        self.resident_count
    }

    pub fn residents_of(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    pub fn population_of(&self, species: Species) -> usize {
        self.residents_of(species).len()
    }

    pub fn add_animal(&mut self, animal: Animal) {
        match animal.species() {
            Species::Herbivore => self.herbivores.push(animal),
            Species::Carnivore => self.carnivores.push(animal),
        }
        self.resident_count += 1;
    }

    fn residents_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    /// Regrow the fodder budget and clear every resident's per-year flags.
    pub fn reset_for_new_year(&mut self, params: &SimParams) {
        self.fodder = params.fodder.capacity(self.kind);
        for animal in self.herbivores.iter_mut().chain(self.carnivores.iter_mut()) {
            animal.reset_year_flags();
        }
    }

    /// Grazers feed fittest-first; predator hunting order is arbitrary, so
    /// they are shuffled instead.
    pub fn order_residents_for_feeding<R: Rng>(&mut self, rng: &mut R) {
        self.herbivores
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        self.carnivores.shuffle(rng);
    }

    /// Grazers eat from the shared fodder budget in list order until the
    /// budget runs dry.
    pub fn feed_grazers(&mut self, params: &SimParams) {
        let appetite = params.herbivore.appetite;
        let Some(fodder) = self.fodder.as_mut() else {
            return;
        };
        for herbivore in &mut self.herbivores {
            if *fodder <= 0.0 {
                break;
            }
            let meal = appetite.min(*fodder);
            herbivore.eat(meal, &params.herbivore);
            *fodder -= meal;
        }
    }

    /// Every predator, in its shuffled order, hunts against the full grazer
    /// list.
    pub fn feed_predators<R: Rng>(&mut self, params: &SimParams, rng: &mut R) {
        for carnivore in &mut self.carnivores {
            carnivore.hunt(&mut self.herbivores, &params.carnivore, rng);
        }
    }

    /// Drop hunted grazers before reproduction counts residents. Predators
    /// are untouched here.
    pub fn compact_grazers(&mut self) {
        let before = self.herbivores.len();
        self.herbivores.retain(|animal| !animal.is_dead());
        self.resident_count -= before - self.herbivores.len();
    }

    /// Each species procreates independently against a snapshot of its
    /// resident count. Newborns are appended after the pass and are never
    /// themselves visited in the same year.
    pub fn run_procreation<R: Rng>(&mut self, year: u32, params: &SimParams, rng: &mut R) {
        let mut born = 0;
        for species in [Species::Herbivore, Species::Carnivore] {
            let species_params = params.species(species);
            let residents = self.residents_mut(species);
            let count = residents.len();
            let mut newborns = Vec::new();
            for parent in residents.iter_mut() {
                if let Some(baby) = parent.attempt_birth(count, year, species_params, rng) {
                    newborns.push(baby);
                }
            }
            born += newborns.len();
            residents.append(&mut newborns);
        }
        self.resident_count += born;
    }

    /// Ask every resident for a migration decision and record a candidate
    /// move for each that wants to leave. Legality is the island's call.
    pub fn collect_migration_candidates<R: Rng>(
        &mut self,
        params: &SimParams,
        rng: &mut R,
    ) -> Vec<MigrationCandidate> {
        let mut candidates = Vec::new();
        for species in [Species::Herbivore, Species::Carnivore] {
            let species_params = params.species(species);
            for (index, animal) in self.residents_mut(species).iter_mut().enumerate() {
                if animal.attempt_migration(species_params, rng) {
                    let (from, to) = animal.choose_migration_target(rng);
                    candidates.push(MigrationCandidate {
                        species,
                        index,
                        from,
                        to,
                    });
                }
            }
        }
        candidates
    }

    /// Remove the residents at `indices` (ascending) from `species`' list,
    /// preserving the order of those that stay.
    pub fn take_residents(&mut self, species: Species, indices: &[usize]) -> Vec<Animal> {
        let residents = self.residents_mut(species);
        let mut taken = Vec::with_capacity(indices.len());
        // Walk backwards so the earlier indices stay valid.
        for &index in indices.iter().rev() {
            taken.push(residents.remove(index));
        }
        taken.reverse();
        self.resident_count -= taken.len();
        taken
    }

    /// Keep only residents whose position still names this cell. Guards
    /// against any animal left behind inconsistently by relocation.
    pub fn reconcile_after_migration(&mut self) {
        let coord = self.coord;
        let before = self.herbivores.len() + self.carnivores.len();
        self.herbivores.retain(|animal| animal.position() == coord);
        self.carnivores.retain(|animal| animal.position() == coord);
        let after = self.herbivores.len() + self.carnivores.len();
        self.resident_count -= before - after;
    }

    pub fn age_all(&mut self, params: &SimParams) {
        for animal in &mut self.herbivores {
            animal.age_increase(&params.herbivore);
        }
        for animal in &mut self.carnivores {
            animal.age_increase(&params.carnivore);
        }
    }

    pub fn apply_weight_decay_all(&mut self, params: &SimParams) {
        for animal in &mut self.herbivores {
            animal.apply_weight_decay(&params.herbivore);
        }
        for animal in &mut self.carnivores {
            animal.apply_weight_decay(&params.carnivore);
        }
    }

    pub fn evaluate_deaths_all<R: Rng>(&mut self, params: &SimParams, rng: &mut R) {
        for animal in &mut self.herbivores {
            animal.evaluate_death(&params.herbivore, rng);
        }
        for animal in &mut self.carnivores {
            animal.evaluate_death(&params.carnivore, rng);
        }
    }

    /// Remove every dead resident of any species.
    pub fn compact_all(&mut self) {
        let before = self.herbivores.len() + self.carnivores.len();
        self.herbivores.retain(|animal| !animal.is_dead());
        self.carnivores.retain(|animal| !animal.is_dead());
        let after = self.herbivores.len() + self.carnivores.len();
        self.resident_count -= before - after;
    }
}
