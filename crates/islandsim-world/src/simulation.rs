//! Simulation driver: seeded RNG, year counter, and the control surface
//! exposed to scenario scripts.

use crate::island::{Census, Island};
use crate::report::{PopulationLog, YearSummary};
use islandsim_core::{
    Error, LandKind, PopulationEntry, Result, SimParams, Species, SpeciesParam,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::{info, instrument};

pub struct Simulation {
    island: Island,
    params: SimParams,
    rng: ChaCha8Rng,
    year: u32,
    count_log: Option<PopulationLog>,
}

impl Simulation {
    /// Build a simulation from a layout string, an initial population, and a
    /// random seed. One seed, one stream: all stochastic draws for the whole
    /// run come from it in a fixed order.
    pub fn new(layout: &str, initial_pop: &[PopulationEntry], seed: u64) -> Result<Self> {
        Self::with_params(layout, initial_pop, seed, SimParams::default())
    }

    pub fn with_params(
        layout: &str,
        initial_pop: &[PopulationEntry],
        seed: u64,
        params: SimParams,
    ) -> Result<Self> {
        params.validate()?;
        let island = Island::new(layout, initial_pop, &params)?;
        Ok(Self {
            island,
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
            year: 0,
            count_log: None,
        })
    }

    /// Route per-year species totals into a CSV file at `path`.
    pub fn enable_count_log(&mut self, path: impl Into<PathBuf>) {
        self.count_log = Some(PopulationLog::new(path));
    }

    /// Run `years` annual cycles. Totals are recorded before each cycle, so
    /// the starting state is the first row of the log.
    #[instrument(skip(self), fields(start_year = self.year))]
    pub fn simulate(&mut self, years: u32) -> Result<()> {
        for _ in 0..years {
            let census = self.island.census();
            info!(
                year = self.year,
                herbivores = census.herbivores,
                carnivores = census.carnivores,
                "advancing year"
            );
            if let Some(log) = self.count_log.as_mut() {
                log.record(self.year, census);
            }
            self.island.advance_year(self.year, &self.params, &mut self.rng);
            self.year += 1;
        }
        if let Some(log) = &self.count_log {
            log.write()?;
        }
        Ok(())
    }

    /// Update species parameters. Either every field in the batch applies or
    /// none of them do.
    pub fn set_species_params(
        &mut self,
        species: Species,
        updates: &[(SpeciesParam, f64)],
    ) -> Result<()> {
        let next = self.params.species(species).with_updates(updates)?;
        *self.params.species_mut(species) = next;
        Ok(())
    }

    /// Same as [`Simulation::set_species_params`], keyed by species name.
    pub fn set_species_params_by_name(
        &mut self,
        name: &str,
        updates: &[(SpeciesParam, f64)],
    ) -> Result<()> {
        self.set_species_params(Species::from_name(name)?, updates)
    }

    /// Update the yearly fodder capacity of the landscape kind with layout
    /// code `code`.
    pub fn set_fodder_capacity(&mut self, code: char, f_max: f64) -> Result<()> {
        let kind = LandKind::from_code(code)
            .ok_or_else(|| Error::NotFound(format!("no landscape with code `{code}`")))?;
        self.params.fodder.set_capacity(kind, f_max)
    }

    /// Add animals between years.
    pub fn add_population(&mut self, entries: &[PopulationEntry]) -> Result<()> {
        self.island.add_population(entries, &self.params)
    }

    /// Years simulated so far.
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn num_animals(&self) -> usize {
        self.island.census().total()
    }

    /// Live animal count per species.
    pub fn num_animals_per_species(&self) -> Census {
        self.island.census()
    }

    pub fn census(&self) -> Census {
        self.island.census()
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    /// Read-only snapshot for visualization and logging collaborators.
    pub fn summary(&self) -> YearSummary {
        YearSummary {
            year: self.year,
            counts: self.island.census(),
            herbivore_density: self.island.density_map(Species::Herbivore),
            carnivore_density: self.island.density_map(Species::Carnivore),
            herbivore_stats: self.island.statistics(Species::Herbivore),
            carnivore_stats: self.island.statistics(Species::Carnivore),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use islandsim_core::AnimalSpec;
    use islandsim_core::Coord;

    const MONO_MAP: &str = "WWW\nWLW\nWWW";

    fn herd(loc: Coord, count: usize, species: Species) -> Vec<PopulationEntry> {
        vec![PopulationEntry {
            loc,
            pop: (0..count)
                .map(|_| AnimalSpec {
                    species,
                    age: 5,
                    weight: 20.0,
                })
                .collect(),
        }]
    }

    fn trajectory(seed: u64, years: u32) -> Vec<(usize, usize)> {
        let mut pop = herd(Coord::new(2, 2), 50, Species::Herbivore);
        pop[0].pop.extend(
            (0..5).map(|_| AnimalSpec {
                species: Species::Carnivore,
                age: 5,
                weight: 20.0,
            }),
        );
        let mut sim = Simulation::new(MONO_MAP, &pop, seed).unwrap();
        let mut points = Vec::new();
        for _ in 0..years {
            sim.simulate(1).unwrap();
            let census = sim.census();
            points.push((census.herbivores, census.carnivores));
        }
        points
    }

    #[test]
    fn test_same_seed_reproduces_trajectory() {
        let first = trajectory(100, 20);
        let second = trajectory(100, 20);
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seed_diverges() {
        let first = trajectory(100, 20);
        let second = trajectory(101, 20);
        assert_ne!(first, second);
    }

    #[test]
    fn test_grazer_population_persists_alone() {
        let pop = herd(Coord::new(2, 2), 50, Species::Herbivore);
        let mut sim = Simulation::new(MONO_MAP, &pop, 123456).unwrap();
        sim.simulate(20).unwrap();
        assert_eq!(sim.year(), 20);
        assert!(sim.census().herbivores > 0);
    }

    #[test]
    fn test_atomic_species_update_through_driver() {
        let mut sim = Simulation::new(MONO_MAP, &[], 1).unwrap();
        let result = sim.set_species_params(
            Species::Herbivore,
            &[
                (SpeciesParam::Appetite, 25.0),
                (SpeciesParam::WeightDecayRate, 9.0),
            ],
        );
        assert!(result.is_err());
        assert_eq!(sim.params().herbivore.appetite, 10.0);

        sim.set_species_params(Species::Herbivore, &[(SpeciesParam::Appetite, 25.0)])
            .unwrap();
        assert_eq!(sim.params().herbivore.appetite, 25.0);
    }

    #[test]
    fn test_species_lookup_by_name() {
        let mut sim = Simulation::new(MONO_MAP, &[], 1).unwrap();
        assert!(matches!(
            sim.set_species_params_by_name("Mammoth", &[]),
            Err(Error::NotFound(_))
        ));
        sim.set_species_params_by_name("Carnivore", &[(SpeciesParam::DeathRate, 0.5)])
            .unwrap();
        assert_eq!(sim.params().carnivore.death_rate, 0.5);
    }

    #[test]
    fn test_fodder_capacity_updates() {
        let mut sim = Simulation::new(MONO_MAP, &[], 1).unwrap();
        assert!(matches!(
            sim.set_fodder_capacity('Z', 100.0),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            sim.set_fodder_capacity('L', -5.0),
            Err(Error::Validation(_))
        ));
        sim.set_fodder_capacity('L', 400.0).unwrap();
        assert_eq!(sim.params().fodder.lowland_max, 400.0);
    }

    #[test]
    fn test_add_population_between_years() {
        let pop = herd(Coord::new(2, 2), 10, Species::Herbivore);
        let mut sim = Simulation::new(MONO_MAP, &pop, 42).unwrap();
        sim.simulate(2).unwrap();

        let before = sim.num_animals();
        sim.add_population(&herd(Coord::new(2, 2), 5, Species::Carnivore))
            .unwrap();
        assert_eq!(sim.num_animals(), before + 5);
        assert_eq!(sim.num_animals_per_species().carnivores, 5);
    }

    #[test]
    fn test_count_log_rows_per_year() {
        let path = std::env::temp_dir().join("islandsim_driver_log_test.csv");
        let pop = herd(Coord::new(2, 2), 10, Species::Herbivore);
        let mut sim = Simulation::new(MONO_MAP, &pop, 42).unwrap();
        sim.enable_count_log(&path);
        sim.simulate(3).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "year,herbivores,carnivores");
        assert_eq!(lines[1], "0,10,0");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_summary_shape() {
        let mut pop = herd(Coord::new(2, 2), 10, Species::Herbivore);
        pop.extend(herd(Coord::new(2, 2), 4, Species::Carnivore));
        let sim = Simulation::new(MONO_MAP, &pop, 42).unwrap();

        let summary = sim.summary();
        assert_eq!(summary.year, 0);
        assert_eq!(summary.counts.herbivores, 10);
        assert_eq!(summary.counts.carnivores, 4);
        assert_eq!(summary.herbivore_density.len(), 3);
        assert_eq!(summary.herbivore_density[0].len(), 3);
        assert_eq!(summary.herbivore_density[1][1], 10);
        assert_eq!(summary.carnivore_stats.fitness.len(), 4);
        assert_eq!(summary.herbivore_stats.weight.len(), 10);
    }

    #[test]
    fn test_summary_round_trips_as_json() {
        let pop = herd(Coord::new(2, 2), 3, Species::Herbivore);
        let sim = Simulation::new(MONO_MAP, &pop, 7).unwrap();
        let json = serde_json::to_string(&sim.summary()).unwrap();
        let back: YearSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.counts, sim.summary().counts);
        assert_eq!(back.herbivore_density, sim.summary().herbivore_density);
    }
}
