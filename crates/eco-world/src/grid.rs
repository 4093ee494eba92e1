//! Bounded 2D lattice of organism slots.

use crate::organism::Organism;
use eco_core::{Error, PopulationCounts, Position, Result, Species, SpeciesConstants, NEIGHBOR_OFFSETS};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random draws allowed per cell of capacity before placement gives up
const PLACEMENT_ATTEMPTS_PER_CELL: usize = 64;

/// A 2D grid with hard edges; each cell holds at most one organism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<Organism>>,
}

impl Grid {
    /// Panics if the cell count does not fit in memory addressing;
    /// [`eco_core::WorldConfig::validate`] rejects such sizes up front.
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) as usize)
            .checked_mul(height.max(0) as usize)
            .unwrap_or_else(|| panic!("a {width}x{height} grid has too many cells"));
        Self {
            width,
            height,
            cells: vec![None; size],
        }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    /// Get the occupant at a position, if any
    pub fn get(&self, pos: Position) -> Option<&Organism> {
        self.index_of(pos).and_then(|index| self.cells[index].as_ref())
    }

    /// Whether `pos` is inside the grid and unoccupied
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.index_of(pos)
            .map_or(false, |index| self.cells[index].is_none())
    }

    /// Place an organism on a specific empty cell
    pub fn insert(&mut self, pos: Position, organism: Organism) -> Result<()> {
        let index = self.index_of(pos).ok_or(Error::OutOfBounds(pos))?;
        let slot = &mut self.cells[index];
        if slot.is_some() {
            return Err(Error::Occupied(pos));
        }
        *slot = Some(organism);
        Ok(())
    }

    /// Remove and return the occupant of a cell
    pub fn take(&mut self, pos: Position) -> Option<Organism> {
        self.index_of(pos).and_then(|index| self.cells[index].take())
    }

    /// Place an organism on a cell the caller knows to be empty.
    ///
    /// Panics if the cell is occupied or out of bounds: two organisms claiming
    /// one slot means a rule phase is broken.
    pub(crate) fn put(&mut self, pos: Position, organism: Organism) {
        let index = self
            .index_of(pos)
            .unwrap_or_else(|| panic!("cell {pos} is outside the {}x{} grid", self.width, self.height));
        let slot = &mut self.cells[index];
        assert!(
            slot.is_none(),
            "cell {pos} already holds {:?} while placing {:?}",
            slot,
            organism
        );
        *slot = Some(organism);
    }

    /// In-bounds Moore neighbors, in the fixed offset order
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| pos.add(dx, dy))
            .filter(move |&neighbor| self.in_bounds(neighbor))
    }

    /// Count of in-bounds neighbors that are currently empty
    pub fn empty_neighbor_count(&self, pos: Position) -> usize {
        self.neighbors(pos)
            .filter(|&neighbor| self.is_empty_at(neighbor))
            .count()
    }

    /// Scan the 8 offsets cyclically from `start` and return the first
    /// in-bounds neighbor whose slot satisfies `accept`.
    pub fn find_neighbor<F>(&self, pos: Position, start: usize, accept: F) -> Option<Position>
    where
        F: Fn(Option<&Organism>) -> bool,
    {
        let n = NEIGHBOR_OFFSETS.len();
        (start..start + n)
            .map(|k| {
                let (dx, dy) = NEIGHBOR_OFFSETS[k % n];
                pos.add(dx, dy)
            })
            .find(|&neighbor| self.in_bounds(neighbor) && accept(self.get(neighbor)))
    }

    /// Scatter `count` newborn organisms of `species` over distinct empty cells.
    pub fn place_random<R: Rng + ?Sized>(
        &mut self,
        species: Species,
        count: usize,
        constants: &SpeciesConstants,
        rng: &mut R,
    ) -> Result<()> {
        let free = self.cells.iter().filter(|slot| slot.is_none()).count();
        if count > free {
            return Err(Error::CapacityExhausted(format!(
                "cannot place {count} {species} organisms, only {free} cells are empty"
            )));
        }

        let max_attempts = PLACEMENT_ATTEMPTS_PER_CELL * self.cells.len();
        let mut remaining = count;
        let mut attempts = 0;

        while remaining > 0 {
            if attempts >= max_attempts {
                return Err(Error::CapacityExhausted(format!(
                    "gave up placing {species} organisms after {attempts} draws, {remaining} left"
                )));
            }
            attempts += 1;

            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            let pos = Position::new(x, y);

            if self.is_empty_at(pos) {
                self.put(pos, Organism::newborn(species, constants));
                remaining -= 1;
            }
        }

        debug!(%species, count, attempts, "Placed organisms");
        Ok(())
    }

    /// Count occupants per species
    pub fn count_by_species(&self) -> PopulationCounts {
        let mut counts = PopulationCounts::default();
        for organism in self.cells.iter().flatten() {
            counts.record(organism.species);
        }
        counts
    }

    pub(crate) fn index_of(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Get position from a row-major index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Iterator over all positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all occupied cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Organism)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, slot)| slot.as_ref().map(|organism| (self.index_to_pos(i), organism)))
    }
}
