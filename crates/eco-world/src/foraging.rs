//! Consumer rule shared by herbivores and carnivores: decay, feed, split, move.

use crate::grid::Grid;
use crate::marks::TickMarks;
use crate::organism::Organism;
use eco_core::{Position, Species, SpeciesConstants, NEIGHBOR_OFFSETS};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What a consumer phase did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForageStats {
    /// Organisms that paid maintenance this phase
    pub acted: u64,
    pub starved: u64,
    pub meals: u64,
    pub births: u64,
    pub moves: u64,
}

impl ForageStats {
    pub fn absorb(&mut self, other: &ForageStats) {
        self.acted += other.acted;
        self.starved += other.starved;
        self.meals += other.meals;
        self.births += other.births;
        self.moves += other.moves;
    }
}

/// Run one row-major pass of the consumer rule for `species`.
///
/// Each organism of `species` that has not acted this tick pays its
/// maintenance cost, dies if out of energy, and otherwise eats the first prey
/// found by a randomly rotated neighbor scan (splitting in two when its energy
/// then exceeds the birth threshold), or moves to the first empty neighbor
/// found by a second, independently rotated scan.
pub fn update_consumers<R: Rng + ?Sized>(
    grid: &mut Grid,
    marks: &mut TickMarks,
    species: Species,
    constants: &SpeciesConstants,
    rng: &mut R,
) -> ForageStats {
    let mut stats = ForageStats::default();
    let Some(prey) = species.prey() else {
        return stats;
    };

    for index in 0..grid.len() {
        let pos = grid.index_to_pos(index);
        let is_candidate = grid.get(pos).map_or(false, |o| o.species == species);
        if !is_candidate || marks.is_marked(index) {
            continue;
        }

        let Some(mut organism) = grid.take(pos) else {
            continue;
        };
        stats.acted += 1;

        if !organism.decay() {
            trace!(%species, x = pos.x, y = pos.y, energy = organism.energy, "Organism starved");
            stats.starved += 1;
            continue;
        }

        let start = rng.gen_range(0..NEIGHBOR_OFFSETS.len());
        let target = grid.find_neighbor(pos, start, |slot| {
            slot.map_or(false, |o| o.species == prey)
        });

        if let Some(target) = target {
            let Some(eaten) = grid.take(target) else {
                unreachable!("prey at {target} vanished during the search");
            };
            organism.add_energy(eaten.energy);
            stats.meals += 1;

            if let Some(threshold) = constants.birth_threshold {
                if organism.energy > threshold {
                    let offspring = organism.split();
                    trace!(
                        %species,
                        x = pos.x,
                        y = pos.y,
                        energy = offspring.energy,
                        "Organism split"
                    );
                    grid.put(pos, offspring);
                    stats.births += 1;
                }
            }

            settle(grid, marks, target, organism);
            continue;
        }

        let start = rng.gen_range(0..NEIGHBOR_OFFSETS.len());
        match grid.find_neighbor(pos, start, |slot| slot.is_none()) {
            Some(destination) => {
                stats.moves += 1;
                settle(grid, marks, destination, organism);
            }
            None => settle(grid, marks, pos, organism),
        }
    }

    stats
}

/// Put an organism that has acted this tick into its final cell for the tick.
fn settle(grid: &mut Grid, marks: &mut TickMarks, pos: Position, organism: Organism) {
    if let Some(index) = grid.index_of(pos) {
        marks.mark(index);
    }
    grid.put(pos, organism);
}
