//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Moore-neighborhood offsets as `(dx, dy)`, in the fixed scan order.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Whether the position lies inside a `width` x `height` grid (no wrapping)
    pub fn in_bounds(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }

    /// Chebyshev distance to another position
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The closed set of species living on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Plant,
    Herbivore,
    Carnivore,
}

impl Species {
    pub fn all() -> [Species; 3] {
        [Species::Plant, Species::Herbivore, Species::Carnivore]
    }

    /// The species this one feeds on, if it is a consumer
    pub fn prey(&self) -> Option<Species> {
        match self {
            Species::Plant => None,
            Species::Herbivore => Some(Species::Plant),
            Species::Carnivore => Some(Species::Herbivore),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Plant => "plant",
            Species::Herbivore => "herbivore",
            Species::Carnivore => "carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-species population counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub plants: usize,
    pub herbivores: usize,
    pub carnivores: usize,
}

impl PopulationCounts {
    pub fn new(plants: usize, herbivores: usize, carnivores: usize) -> Self {
        Self {
            plants,
            herbivores,
            carnivores,
        }
    }

    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Plant => self.plants,
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    pub fn record(&mut self, species: Species) {
        match species {
            Species::Plant => self.plants += 1,
            Species::Herbivore => self.herbivores += 1,
            Species::Carnivore => self.carnivores += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.plants + self.herbivores + self.carnivores
    }

    /// `(plants, herbivores, carnivores)`
    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.plants, self.herbivores, self.carnivores)
    }
}

/// Population counts observed at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub tick: u64,
    #[serde(flatten)]
    pub counts: PopulationCounts,
}

impl PopulationSnapshot {
    pub fn new(tick: u64, counts: PopulationCounts) -> Self {
        Self { tick, counts }
    }

    /// Render as a `tick,plants,herbivores,carnivores` row
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{}",
            self.tick, self.counts.plants, self.counts.herbivores, self.counts.carnivores
        )
    }
}
