//! Spontaneous plant growth.

use crate::grid::Grid;
use crate::organism::Organism;
use eco_core::{PlantConfig, Position, Species, SpeciesConstants};

/// Grow plants on every empty cell whose empty-neighbor count lies within the
/// configured bounds. Eligibility is decided for the whole grid before any
/// plant is placed, so the outcome does not depend on scan order.
///
/// Returns the number of plants grown.
pub fn grow_plants(grid: &mut Grid, plant: &PlantConfig, constants: &SpeciesConstants) -> usize {
    let min = plant.min_empty_neighbors as usize;
    let max = plant.max_empty_neighbors as usize;

    let candidates: Vec<Position> = grid
        .positions()
        .filter(|&pos| grid.is_empty_at(pos))
        .filter(|&pos| (min..=max).contains(&grid.empty_neighbor_count(pos)))
        .collect();

    for &pos in &candidates {
        grid.put(pos, Organism::newborn(Species::Plant, constants));
    }

    candidates.len()
}
