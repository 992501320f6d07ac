//! The island: grid construction, migration legality, and the annual cycle.

use crate::animal::Animal;
use crate::cell::{Cell, MigrationCandidate};
use crate::report::SpeciesStats;
use islandsim_core::{
    Coord, Direction, Error, LandKind, PopulationEntry, Result, SimParams, Species,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-species and combined animal totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl Census {
    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }

    pub fn of(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }
}

/// The full island grid, row-major and 1-indexed, built once from a textual
/// layout and never restructured afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Island {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
}

impl Island {
    /// Build the island from a textual layout and place the initial
    /// population. Every row must have the same length, every code must be a
    /// known landscape, and every border cell must be water.
    pub fn new(layout: &str, initial_pop: &[PopulationEntry], params: &SimParams) -> Result<Self> {
        let kinds = parse_layout(layout)?;
        let rows = kinds.len() as i32;
        let cols = kinds[0].len() as i32;

        let mut cells = Vec::with_capacity((rows * cols) as usize);
        for (r, row) in kinds.iter().enumerate() {
            for (c, &kind) in row.iter().enumerate() {
                let coord = Coord::new(r as i32 + 1, c as i32 + 1);
                cells.push(Cell::new(kind, coord, params));
            }
        }

        let mut island = Self { rows, cols, cells };
        island.add_population(initial_pop, params)?;
        Ok(island)
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    fn index_of(&self, coord: Coord) -> Option<usize> {
        if coord.row < 1 || coord.row > self.rows || coord.col < 1 || coord.col > self.cols {
            return None;
        }
        Some(((coord.row - 1) * self.cols + (coord.col - 1)) as usize)
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index_of(coord).map(|index| &self.cells[index])
    }

    /// Place additional animals. The whole batch is validated before any
    /// animal is placed, so a bad entry leaves the island unchanged.
    pub fn add_population(
        &mut self,
        entries: &[PopulationEntry],
        params: &SimParams,
    ) -> Result<()> {
        let mut placements: Vec<(usize, Animal)> = Vec::new();
        for entry in entries {
            let index = self.index_of(entry.loc).ok_or_else(|| {
                Error::Validation(format!("location {} is outside the island", entry.loc))
            })?;
            if !self.cells[index].is_passable() {
                return Err(Error::Validation(format!(
                    "location {} is not habitable",
                    entry.loc
                )));
            }
            for spec in &entry.pop {
                let animal = Animal::new(
                    spec.species,
                    spec.age,
                    spec.weight,
                    entry.loc,
                    params.species(spec.species),
                )?;
                placements.push((index, animal));
            }
        }
        for (index, animal) in placements {
            self.cells[index].add_animal(animal);
        }
        Ok(())
    }

    /// Passable cardinal neighbors of `coord`.
    pub fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        Direction::all()
            .iter()
            .filter_map(|direction| {
                let (drow, dcol) = direction.to_delta();
                let next = coord.offset(drow, dcol);
                match self.cell(next) {
                    Some(cell) if cell.is_passable() => Some(next),
                    _ => None,
                }
            })
            .collect()
    }

    /// Move the legal migration candidates out of their source cell and into
    /// their chosen neighbor. Illegal candidates stay where they are; their
    /// migration chance for the year is already spent.
    fn relocate_candidates(&mut self, source: Coord, candidates: Vec<MigrationCandidate>) {
        let Some(source_index) = self.index_of(source) else {
            return;
        };

        // Group the legal moves per species so each list is emptied in one
        // ascending-index pass.
        let mut moves: [Vec<(usize, usize)>; 2] = [Vec::new(), Vec::new()];
        for candidate in candidates {
            let legal = self.neighbors(candidate.from).contains(&candidate.to);
            if !legal {
                debug!(from = %candidate.from, to = %candidate.to, "illegal migration target, staying");
                continue;
            }
            // The legality check guarantees the destination exists.
            let Some(dest_index) = self.index_of(candidate.to) else {
                continue;
            };
            let slot = match candidate.species {
                Species::Herbivore => 0,
                Species::Carnivore => 1,
            };
            moves[slot].push((candidate.index, dest_index));
        }

        for (slot, species) in [(0, Species::Herbivore), (1, Species::Carnivore)] {
            if moves[slot].is_empty() {
                continue;
            }
            let indices: Vec<usize> = moves[slot].iter().map(|(index, _)| *index).collect();
            let taken = self.cells[source_index].take_residents(species, &indices);
            for (mut animal, &(_, dest_index)) in taken.into_iter().zip(moves[slot].iter()) {
                animal.set_position(self.cells[dest_index].coord());
                self.cells[dest_index].add_animal(animal);
            }
        }
    }

    /// Run one annual cycle over every passable cell, in three ordered
    /// phases. Predators hunt before dead grazers leave the reproduction
    /// counts; migration runs after reproduction so newborns stay put in
    /// their birth year; aging and mortality come last.
    pub fn advance_year<R: Rng>(&mut self, year: u32, params: &SimParams, rng: &mut R) {
        // Phase 1: feeding and procreation, local to each cell.
        for index in 0..self.cells.len() {
            if !self.cells[index].is_passable() {
                continue;
            }
            let cell = &mut self.cells[index];
            cell.reset_for_new_year(params);
            cell.order_residents_for_feeding(rng);
            cell.feed_grazers(params);
            cell.feed_predators(params, rng);
            cell.compact_grazers();
            cell.run_procreation(year, params, rng);
        }

        // Phase 2: migration. Candidates are collected per cell, relocated,
        // and the source reconciled before the next cell is visited.
        for index in 0..self.cells.len() {
            if !self.cells[index].is_passable() {
                continue;
            }
            let source = self.cells[index].coord();
            let candidates = self.cells[index].collect_migration_candidates(params, rng);
            self.relocate_candidates(source, candidates);
            self.cells[index].reconcile_after_migration();
        }

        // Phase 3: aging, weight decay, and mortality.
        for index in 0..self.cells.len() {
            if !self.cells[index].is_passable() {
                continue;
            }
            let cell = &mut self.cells[index];
            cell.age_all(params);
            cell.apply_weight_decay_all(params);
            cell.evaluate_deaths_all(params, rng);
            cell.compact_all();
        }
    }

    /// Count live residents across all passable cells. Always a fresh scan,
    /// never the incrementally tracked cell counters.
    pub fn census(&self) -> Census {
        let mut census = Census {
            herbivores: 0,
            carnivores: 0,
        };
        for cell in &self.cells {
            if !cell.is_passable() {
                continue;
            }
            census.herbivores += cell.population_of(Species::Herbivore);
            census.carnivores += cell.population_of(Species::Carnivore);
        }
        census
    }

    /// Per-cell population of `species` over the full map shape.
    pub fn density_map(&self, species: Species) -> Vec<Vec<usize>> {
        let mut map = vec![vec![0; self.cols as usize]; self.rows as usize];
        for cell in &self.cells {
            let coord = cell.coord();
            map[(coord.row - 1) as usize][(coord.col - 1) as usize] = cell.population_of(species);
        }
        map
    }

    /// Flat per-individual fitness/age/weight lists for `species`.
    pub fn statistics(&self, species: Species) -> SpeciesStats {
        let mut stats = SpeciesStats::default();
        for cell in &self.cells {
            for animal in cell.residents_of(species) {
                stats.fitness.push(animal.fitness());
                stats.age.push(animal.age());
                stats.weight.push(animal.weight());
            }
        }
        stats
    }
}

fn parse_layout(layout: &str) -> Result<Vec<Vec<LandKind>>> {
    let lines: Vec<&str> = layout.lines().collect();
    if lines.is_empty() {
        return Err(Error::Construction("island layout is empty".into()));
    }

    let mut kinds = Vec::with_capacity(lines.len());
    for line in &lines {
        let row: Vec<LandKind> = line
            .chars()
            .map(|code| {
                LandKind::from_code(code).ok_or_else(|| {
                    Error::Construction(format!("unrecognized landscape code `{code}`"))
                })
            })
            .collect::<Result<_>>()?;
        kinds.push(row);
    }

    let width = kinds[0].len();
    if kinds.iter().any(|row| row.len() != width) {
        return Err(Error::Construction(
            "island layout rows differ in length".into(),
        ));
    }

    let height = kinds.len();
    for (r, row) in kinds.iter().enumerate() {
        for (c, &kind) in row.iter().enumerate() {
            let on_border = r == 0 || r == height - 1 || c == 0 || c == width - 1;
            if on_border && kind != LandKind::Water {
                return Err(Error::Construction(format!(
                    "border cell at ({}, {}) must be water",
                    r + 1,
                    c + 1
                )));
            }
        }
    }
    Ok(kinds)
}
