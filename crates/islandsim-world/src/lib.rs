//! Island ecosystem simulation engine.
//!
//! Two species share a gridded island: grazers feed on per-cell fodder,
//! predators feed on grazers, and every year runs feeding, reproduction,
//! migration, aging, and mortality across all cells in a fixed phase order.

pub mod animal;
pub mod cell;
pub mod island;
pub mod report;
pub mod simulation;

pub use animal::Animal;
pub use cell::Cell;
pub use island::{Census, Island};
pub use report::{PopulationLog, SpeciesStats, YearSummary};
pub use simulation::Simulation;
