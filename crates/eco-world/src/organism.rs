//! Organism state and energy lifecycle.

use eco_core::{Species, SpeciesConstants};
use serde::{Deserialize, Serialize};

/// A single grid-resident organism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organism {
    pub species: Species,
    pub energy: i32,
    pub maintenance_cost: i32,
}

impl Organism {
    pub fn new(species: Species, energy: i32, maintenance_cost: i32) -> Self {
        Self {
            species,
            energy,
            maintenance_cost,
        }
    }

    /// A freshly placed organism carrying its species' newborn energy
    pub fn newborn(species: Species, constants: &SpeciesConstants) -> Self {
        Self::new(species, constants.new_born_energy, constants.maintenance_cost)
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    /// Energy saturates at `i32::MAX` instead of overflowing
    pub fn add_energy(&mut self, amount: i32) {
        self.energy = self.energy.saturating_add(amount);
    }

    /// Pay the per-tick maintenance cost. Returns whether the organism survived.
    pub fn decay(&mut self) -> bool {
        self.energy = self.energy.saturating_sub(self.maintenance_cost);
        self.is_alive()
    }

    /// Halve the energy (floor) and return an offspring holding the same half.
    ///
    /// An odd remainder belongs to neither organism.
    pub fn split(&mut self) -> Organism {
        self.energy /= 2;
        Organism::new(self.species, self.energy, self.maintenance_cost)
    }
}
