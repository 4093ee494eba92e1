//! Ecosystem automaton.
//!
//! A bounded 2D grid where plants grow, herbivores graze and carnivores hunt,
//! advanced one tick at a time.

pub mod grid;
pub mod organism;
pub mod marks;
pub mod growth;
pub mod foraging;
pub mod simulation;

pub use grid::Grid;
pub use organism::Organism;
pub use marks::TickMarks;
pub use foraging::ForageStats;
pub use simulation::{Simulation, TickCounters};
