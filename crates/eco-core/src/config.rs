//! Configuration types for the simulation.

use crate::{Error, Result, Species, NEIGHBOR_OFFSETS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Plant parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Plants placed at initialization
    pub initial_count: usize,
    /// Energy of a freshly grown plant
    pub new_born_energy: i32,
    /// Lower bound (inclusive) on empty neighbors for spontaneous growth
    pub min_empty_neighbors: u8,
    /// Upper bound (inclusive) on empty neighbors for spontaneous growth
    pub max_empty_neighbors: u8,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            initial_count: 5000,
            new_born_energy: 15,
            min_empty_neighbors: 3,
            max_empty_neighbors: 8,
        }
    }
}

/// Parameters for a consumer species (herbivore or carnivore)
///
/// Every field is required when a section is present in a config file; an
/// absent section takes the species default from [`WorldConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalConfig {
    /// Animals placed at initialization
    pub initial_count: usize,
    /// Starting energy of an initially placed animal
    pub new_born_energy: i32,
    /// Energy lost every tick
    pub maintenance_cost: i32,
    /// Post-feeding energy strictly above this splits the animal in two
    pub birth_threshold: i32,
}

impl AnimalConfig {
    pub fn herbivore() -> Self {
        Self {
            initial_count: 500,
            new_born_energy: 50,
            maintenance_cost: 10,
            birth_threshold: 50,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            initial_count: 50,
            new_born_energy: 200,
            maintenance_cost: 50,
            birth_threshold: 200,
        }
    }

    fn validate(&self, species: Species) -> Result<()> {
        if self.new_born_energy <= 0 {
            return Err(Error::InvalidConfig(format!(
                "{species} new_born_energy must be positive, got {}",
                self.new_born_energy
            )));
        }
        if self.maintenance_cost < 0 {
            return Err(Error::InvalidConfig(format!(
                "{species} maintenance_cost must not be negative, got {}",
                self.maintenance_cost
            )));
        }
        if self.birth_threshold < 1 {
            return Err(Error::InvalidConfig(format!(
                "{species} birth_threshold must be at least 1, got {}",
                self.birth_threshold
            )));
        }
        Ok(())
    }
}

/// Per-species constants resolved from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesConstants {
    pub new_born_energy: i32,
    pub maintenance_cost: i32,
    /// `None` for species that never split
    pub birth_threshold: Option<i32>,
}

/// World configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Random seed for reproducibility
    pub seed: u64,
    pub plant: PlantConfig,
    pub herbivore: AnimalConfig,
    pub carnivore: AnimalConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            seed: 0,
            plant: PlantConfig::default(),
            herbivore: AnimalConfig::herbivore(),
            carnivore: AnimalConfig::carnivore(),
        }
    }
}

impl WorldConfig {
    /// An empty world of the given size with default species constants
    pub fn empty(width: i32, height: i32) -> Self {
        let mut config = Self {
            width,
            height,
            ..Default::default()
        };
        config.plant.initial_count = 0;
        config.herbivore.initial_count = 0;
        config.carnivore.initial_count = 0;
        config
    }

    /// Number of cells in the grid
    pub fn capacity(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn initial_count(&self, species: Species) -> usize {
        match species {
            Species::Plant => self.plant.initial_count,
            Species::Herbivore => self.herbivore.initial_count,
            Species::Carnivore => self.carnivore.initial_count,
        }
    }

    /// Lookup table of per-species constants
    pub fn constants(&self, species: Species) -> SpeciesConstants {
        match species {
            Species::Plant => SpeciesConstants {
                new_born_energy: self.plant.new_born_energy,
                maintenance_cost: 0,
                birth_threshold: None,
            },
            Species::Herbivore => animal_constants(&self.herbivore),
            Species::Carnivore => animal_constants(&self.carnivore),
        }
    }

    /// Check the configuration, failing fast on the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        if self.width.checked_mul(self.height).is_none() {
            return Err(Error::InvalidConfig(format!(
                "grid of {}x{} cells exceeds {} cells",
                self.width,
                self.height,
                i32::MAX
            )));
        }

        let requested: usize = Species::all().iter().map(|&s| self.initial_count(s)).sum();
        if requested > self.capacity() {
            return Err(Error::InvalidConfig(format!(
                "{} initial organisms do not fit in {} cells",
                requested,
                self.capacity()
            )));
        }

        if self.plant.new_born_energy <= 0 {
            return Err(Error::InvalidConfig(format!(
                "plant new_born_energy must be positive, got {}",
                self.plant.new_born_energy
            )));
        }

        let max_neighbors = NEIGHBOR_OFFSETS.len() as u8;
        if self.plant.min_empty_neighbors > max_neighbors
            || self.plant.max_empty_neighbors > max_neighbors
        {
            return Err(Error::InvalidConfig(format!(
                "plant neighbor thresholds must be within [0, {}], got [{}, {}]",
                max_neighbors, self.plant.min_empty_neighbors, self.plant.max_empty_neighbors
            )));
        }
        if self.plant.min_empty_neighbors > self.plant.max_empty_neighbors {
            return Err(Error::InvalidConfig(format!(
                "min_empty_neighbors ({}) exceeds max_empty_neighbors ({})",
                self.plant.min_empty_neighbors, self.plant.max_empty_neighbors
            )));
        }

        self.herbivore.validate(Species::Herbivore)?;
        self.carnivore.validate(Species::Carnivore)?;

        if self.carnivore.maintenance_cost <= self.herbivore.maintenance_cost
            || self.carnivore.new_born_energy <= self.herbivore.new_born_energy
            || self.carnivore.birth_threshold <= self.herbivore.birth_threshold
        {
            warn!(
                herbivore = ?self.herbivore,
                carnivore = ?self.carnivore,
                "Carnivore constants are not larger than herbivore constants"
            );
        }

        Ok(())
    }
}

fn animal_constants(config: &AnimalConfig) -> SpeciesConstants {
    SpeciesConstants {
        new_born_energy: config.new_born_energy,
        maintenance_cost: config.maintenance_cost,
        birth_threshold: Some(config.birth_threshold),
    }
}

/// Driver configuration for a complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of ticks to run the simulation
    pub num_ticks: u64,
    /// Emit population metrics every this many ticks (0 disables)
    pub log_interval: u64,
    /// Stop early once no herbivores or carnivores remain
    pub stop_on_extinction: bool,
    pub world: WorldConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_ticks: 10_000,
            log_interval: 100,
            stop_on_extinction: false,
            world: WorldConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load a JSON configuration file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(contents)?;
        config.world.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
