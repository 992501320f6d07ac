//! Core type definitions for the simulator.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid coordinate, 1-indexed from the upper-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, drow: i32, dcol: i32) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cardinal direction for migration moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }
}

/// Species tag. Mechanics are shared across species; only the numeric
/// parameter set differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(Error::NotFound(format!("no species named `{other}`"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Landscape kind of one grid cell. `Water` blocks both residency and
/// migration and walls the island border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandKind {
    Water,
    Lowland,
    Highland,
    Desert,
}

impl LandKind {
    /// Map a one-letter layout code to a landscape kind.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(LandKind::Water),
            'L' => Some(LandKind::Lowland),
            'H' => Some(LandKind::Highland),
            'D' => Some(LandKind::Desert),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            LandKind::Water => 'W',
            LandKind::Lowland => 'L',
            LandKind::Highland => 'H',
            LandKind::Desert => 'D',
        }
    }

    pub fn is_passable(&self) -> bool {
        !matches!(self, LandKind::Water)
    }
}

impl fmt::Display for LandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LandKind::Water => "water",
            LandKind::Lowland => "lowland",
            LandKind::Highland => "highland",
            LandKind::Desert => "desert",
        };
        f.write_str(name)
    }
}

/// One animal to create, as given by a population spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSpec {
    pub species: Species,
    pub age: i32,
    pub weight: f64,
}

/// A batch of animals to place at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub loc: Coord,
    pub pop: Vec<AnimalSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_offset() {
        let pos = Coord::new(2, 3);
        assert_eq!(pos.offset(-1, 0), Coord::new(1, 3));
        assert_eq!(pos.offset(0, 1), Coord::new(2, 4));
        assert_eq!(pos.to_string(), "(2, 3)");
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::North.to_delta(), (-1, 0));
        assert_eq!(Direction::East.to_delta(), (0, 1));
        assert_eq!(Direction::South.to_delta(), (1, 0));
        assert_eq!(Direction::West.to_delta(), (0, -1));
    }

    #[test]
    fn test_land_codes() {
        for kind in [
            LandKind::Water,
            LandKind::Lowland,
            LandKind::Highland,
            LandKind::Desert,
        ] {
            assert_eq!(LandKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(LandKind::from_code('S'), None);
        assert!(LandKind::Desert.is_passable());
        assert!(!LandKind::Water.is_passable());
    }

    #[test]
    fn test_species_lookup() {
        assert_eq!(Species::from_name("Herbivore").unwrap(), Species::Herbivore);
        assert_eq!(Species::from_name("Carnivore").unwrap(), Species::Carnivore);
        assert!(matches!(
            Species::from_name("cow"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_population_entry_from_json() {
        let json = r#"{
            "loc": {"row": 2, "col": 2},
            "pop": [
                {"species": "Herbivore", "age": 5, "weight": 20.0},
                {"species": "Carnivore", "age": 3, "weight": 14.0}
            ]
        }"#;
        let entry: PopulationEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.loc, Coord::new(2, 2));
        assert_eq!(entry.pop.len(), 2);
        assert_eq!(entry.pop[0].species, Species::Herbivore);
        assert_eq!(entry.pop[1].age, 3);
    }
}
