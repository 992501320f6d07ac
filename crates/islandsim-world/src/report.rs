//! Per-year summaries and the tabular count log.
//!
//! Everything here is read-only output for visualization and logging
//! collaborators; nothing flows back into the simulation.

use crate::island::Census;
use islandsim_core::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Flat per-individual statistics for one species.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    pub fitness: Vec<f64>,
    pub age: Vec<u32>,
    pub weight: Vec<f64>,
}

/// Snapshot of one year's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub counts: Census,
    pub herbivore_density: Vec<Vec<usize>>,
    pub carnivore_density: Vec<Vec<usize>>,
    pub herbivore_stats: SpeciesStats,
    pub carnivore_stats: SpeciesStats,
}

/// Accumulates per-year species totals and writes them out as CSV, keyed by
/// year index.
#[derive(Debug, Clone)]
pub struct PopulationLog {
    path: PathBuf,
    rows: Vec<(u32, Census)>,
}

impl PopulationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rows: Vec::new(),
        }
    }

    pub fn record(&mut self, year: u32, counts: Census) {
        self.rows.push((year, counts));
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all recorded rows, replacing any previous file contents.
    pub fn write(&self) -> Result<()> {
        let mut file = File::create(&self.path)?;
        writeln!(file, "year,herbivores,carnivores")?;
        for (year, counts) in &self.rows {
            writeln!(file, "{},{},{}", year, counts.herbivores, counts.carnivores)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_writes_csv() {
        let path = std::env::temp_dir().join("islandsim_count_log_test.csv");
        let mut log = PopulationLog::new(&path);
        log.record(
            0,
            Census {
                herbivores: 50,
                carnivores: 0,
            },
        );
        log.record(
            1,
            Census {
                herbivores: 61,
                carnivores: 2,
            },
        );
        log.write().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "year,herbivores,carnivores");
        assert_eq!(lines[1], "0,50,0");
        assert_eq!(lines[2], "1,61,2");
        std::fs::remove_file(&path).ok();
    }
}
