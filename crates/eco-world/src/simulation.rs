//! Tick scheduler for the ecosystem.

use crate::foraging::{update_consumers, ForageStats};
use crate::grid::Grid;
use crate::growth::grow_plants;
use crate::marks::TickMarks;
use eco_core::{Error, PopulationCounts, PopulationSnapshot, Result, Species, WorldConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use tracing::{debug, info, instrument};

/// Cumulative activity since the simulation was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickCounters {
    pub plants_grown: u64,
    pub herbivores: ForageStats,
    pub carnivores: ForageStats,
}

pub struct Simulation {
    grid: Grid,
    marks: TickMarks,
    config: WorldConfig,
    rng: ChaCha8Rng,
    tick: u64,
    counters: TickCounters,
    metrics_interval: u64,
}

impl Simulation {
    /// Build a world and scatter the initial populations at random
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut grid = Grid::new(config.width, config.height);

        for species in Species::all() {
            grid.place_random(
                species,
                config.initial_count(species),
                &config.constants(species),
                &mut rng,
            )?;
        }

        info!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            plants = config.plant.initial_count,
            herbivores = config.herbivore.initial_count,
            carnivores = config.carnivore.initial_count,
            "World created"
        );

        Ok(Self::assemble(config, grid, rng))
    }

    /// Start from an explicit layout; the configured initial counts are ignored
    pub fn from_grid(config: WorldConfig, grid: Grid) -> Result<Self> {
        if grid.width != config.width || grid.height != config.height {
            return Err(Error::InvalidConfig(format!(
                "grid is {}x{} but the configuration asks for {}x{}",
                grid.width, grid.height, config.width, config.height
            )));
        }

        let mut check = config.clone();
        check.plant.initial_count = 0;
        check.herbivore.initial_count = 0;
        check.carnivore.initial_count = 0;
        check.validate()?;

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self::assemble(config, grid, rng))
    }

    fn assemble(config: WorldConfig, grid: Grid, rng: ChaCha8Rng) -> Self {
        Self {
            marks: TickMarks::new(grid.len()),
            grid,
            config,
            rng,
            tick: 0,
            counters: TickCounters::default(),
            metrics_interval: 100,
        }
    }

    /// Emit population metrics every `interval` ticks during `run` (0 disables)
    pub fn set_metrics_interval(&mut self, interval: u64) {
        self.metrics_interval = interval;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of ticks completed
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn counters(&self) -> &TickCounters {
        &self.counters
    }

    pub fn population_counts(&self) -> PopulationCounts {
        self.grid.count_by_species()
    }

    /// No consumers are left; plants alone never change again once settled
    pub fn is_extinct(&self) -> bool {
        let counts = self.population_counts();
        counts.herbivores == 0 && counts.carnivores == 0
    }

    /// Advance the world by exactly one tick: growth, herbivores, carnivores.
    pub fn step(&mut self) {
        self.marks.clear();

        let plant_constants = self.config.constants(Species::Plant);
        let grown = grow_plants(&mut self.grid, &self.config.plant, &plant_constants);

        let herbivores = update_consumers(
            &mut self.grid,
            &mut self.marks,
            Species::Herbivore,
            &self.config.constants(Species::Herbivore),
            &mut self.rng,
        );

        let carnivores = update_consumers(
            &mut self.grid,
            &mut self.marks,
            Species::Carnivore,
            &self.config.constants(Species::Carnivore),
            &mut self.rng,
        );

        self.counters.plants_grown += grown as u64;
        self.counters.herbivores.absorb(&herbivores);
        self.counters.carnivores.absorb(&carnivores);

        debug!(
            tick = self.tick,
            plants_grown = grown,
            herbivore_meals = herbivores.meals,
            herbivore_births = herbivores.births,
            herbivores_starved = herbivores.starved,
            carnivore_meals = carnivores.meals,
            carnivore_births = carnivores.births,
            carnivores_starved = carnivores.starved,
            "Tick complete"
        );

        self.tick += 1;
    }

    /// Run `num_ticks` ticks, recording the populations at the start of each
    pub fn run(&mut self, num_ticks: u64) -> Vec<PopulationSnapshot> {
        let mut history = Vec::new();
        self.run_with(num_ticks, false, |snapshot| {
            history.push(*snapshot);
            ControlFlow::Continue(())
        });
        history
    }

    /// Run up to `num_ticks` ticks, handing each pre-tick snapshot to
    /// `observer`; a `Break` from the observer ends the run before that tick.
    /// Returns the number of ticks executed.
    #[instrument(skip(self, observer), fields(start_tick = self.tick))]
    pub fn run_with<F>(&mut self, num_ticks: u64, stop_on_extinction: bool, mut observer: F) -> u64
    where
        F: FnMut(&PopulationSnapshot) -> ControlFlow<()>,
    {
        info!("Starting simulation for {} ticks", num_ticks);

        let mut executed = 0;
        while executed < num_ticks {
            let snapshot = PopulationSnapshot::new(self.tick, self.population_counts());
            if observer(&snapshot).is_break() {
                info!(tick = self.tick, "Observer requested stop");
                break;
            }

            if stop_on_extinction && snapshot.counts.herbivores == 0 && snapshot.counts.carnivores == 0 {
                info!(tick = self.tick, "No consumers left, stopping early");
                break;
            }

            if self.metrics_interval > 0 && self.tick % self.metrics_interval == 0 {
                self.emit_population_metrics(&snapshot);
            }

            self.step();
            executed += 1;
        }

        self.emit_run_summary(executed);
        executed
    }

    fn emit_population_metrics(&self, snapshot: &PopulationSnapshot) {
        info!(
            event = "population_metrics",
            tick = snapshot.tick,
            plants = snapshot.counts.plants,
            herbivores = snapshot.counts.herbivores,
            carnivores = snapshot.counts.carnivores,
            herbivore_births = self.counters.herbivores.births,
            carnivore_births = self.counters.carnivores.births,
            "Population metrics snapshot"
        );
    }

    fn emit_run_summary(&self, executed: u64) {
        let counts = self.population_counts();
        info!(
            event = "run_summary",
            ticks_executed = executed,
            final_tick = self.tick,
            plants = counts.plants,
            herbivores = counts.herbivores,
            carnivores = counts.carnivores,
            plants_grown = self.counters.plants_grown,
            herbivore_meals = self.counters.herbivores.meals,
            herbivore_births = self.counters.herbivores.births,
            herbivores_starved = self.counters.herbivores.starved,
            carnivore_meals = self.counters.carnivores.meals,
            carnivore_births = self.counters.carnivores.births,
            carnivores_starved = self.counters.carnivores.starved,
            "Simulation complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organism::Organism;
    use eco_core::Position;

    fn small_config(seed: u64) -> WorldConfig {
        let mut config = WorldConfig::empty(30, 30);
        config.seed = seed;
        config.plant.initial_count = 300;
        config.herbivore.initial_count = 60;
        config.carnivore.initial_count = 8;
        config
    }

    fn herbivore(energy: i32) -> Organism {
        Organism::new(Species::Herbivore, energy, 10)
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new(small_config(42)).unwrap();
        assert_eq!(sim.population_counts().as_tuple(), (300, 60, 8));
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn test_creation_rejects_invalid_config() {
        let mut config = small_config(1);
        config.width = 0;
        assert!(matches!(Simulation::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_from_grid_checks_dimensions() {
        let config = WorldConfig::empty(4, 4);
        assert!(Simulation::from_grid(config.clone(), Grid::new(4, 3)).is_err());
        assert!(Simulation::from_grid(config, Grid::new(4, 4)).is_ok());
    }

    #[test]
    fn test_population_counts_do_not_mutate() {
        let sim = Simulation::new(small_config(7)).unwrap();
        let before = sim.grid().clone();
        let first = sim.population_counts();
        let second = sim.population_counts();
        assert_eq!(first, second);
        assert_eq!(sim.grid(), &before);
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut a = Simulation::new(small_config(99)).unwrap();
        let mut b = Simulation::new(small_config(99)).unwrap();

        assert_eq!(a.run(60), b.run(60));
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.counters(), b.counters());
    }

    #[test]
    fn test_history_records_pre_tick_counts() {
        let mut sim = Simulation::new(small_config(5)).unwrap();
        let initial = sim.population_counts();

        let history = sim.run(3);

        assert_eq!(history.len(), 3);
        assert_eq!(history[0], PopulationSnapshot::new(0, initial));
        assert_eq!(history.iter().map(|s| s.tick).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(sim.tick(), 3);
    }

    #[test]
    fn test_lone_plant_persists() {
        let mut config = WorldConfig::empty(3, 3);
        config.plant.min_empty_neighbors = 3;
        config.plant.max_empty_neighbors = 8;
        let center = Position::new(1, 1);
        let mut grid = Grid::new(3, 3);
        grid.insert(center, Organism::newborn(Species::Plant, &config.constants(Species::Plant)))
            .unwrap();
        let mut sim = Simulation::from_grid(config, grid).unwrap();

        sim.step();
        // Edges see 4 empty neighbors and grow; corners see only 2
        assert_eq!(sim.population_counts().as_tuple(), (5, 0, 0));

        for _ in 0..50 {
            sim.step();
        }
        assert_eq!(sim.population_counts().as_tuple(), (5, 0, 0));
        assert_eq!(sim.grid().get(center), Some(&Organism::new(Species::Plant, 15, 0)));
    }

    #[test]
    fn test_starving_herbivore_dies_before_predation() {
        let config = WorldConfig::empty(2, 1);
        let mut grid = Grid::new(2, 1);
        grid.insert(Position::new(0, 0), herbivore(10)).unwrap();
        grid.insert(Position::new(1, 0), Organism::new(Species::Plant, 15, 0)).unwrap();
        let mut sim = Simulation::from_grid(config, grid).unwrap();

        sim.step();

        assert!(sim.grid().is_empty_at(Position::new(0, 0)));
        assert_eq!(sim.grid().get(Position::new(1, 0)), Some(&Organism::new(Species::Plant, 15, 0)));
        assert_eq!(sim.population_counts().as_tuple(), (1, 0, 0));
        assert_eq!(sim.counters().herbivores.starved, 1);
        assert_eq!(sim.counters().herbivores.meals, 0);
    }

    #[test]
    fn test_feeding_herbivore_splits() {
        let mut config = WorldConfig::empty(2, 1);
        config.plant.new_born_energy = 16;
        config.herbivore.birth_threshold = 10;
        let mut grid = Grid::new(2, 1);
        grid.insert(Position::new(0, 0), herbivore(11)).unwrap();
        grid.insert(
            Position::new(1, 0),
            Organism::newborn(Species::Plant, &config.constants(Species::Plant)),
        )
        .unwrap();
        let mut sim = Simulation::from_grid(config, grid).unwrap();

        sim.step();

        // 11 - 10 + 16 = 17 > 10: both halves get 17 / 2 = 8
        assert_eq!(sim.grid().get(Position::new(1, 0)), Some(&herbivore(8)));
        assert_eq!(sim.grid().get(Position::new(0, 0)), Some(&herbivore(8)));
        assert_eq!(sim.counters().herbivores.births, 1);
    }

    #[test]
    fn test_huge_plant_energy_does_not_overflow() {
        let mut config = WorldConfig::empty(2, 1);
        config.plant.new_born_energy = i32::MAX;
        config.herbivore.birth_threshold = i32::MAX;
        let mut grid = Grid::new(2, 1);
        grid.insert(Position::new(0, 0), herbivore(50)).unwrap();
        grid.insert(
            Position::new(1, 0),
            Organism::newborn(Species::Plant, &config.constants(Species::Plant)),
        )
        .unwrap();
        let mut sim = Simulation::from_grid(config, grid).unwrap();

        sim.step();

        // Energy saturates at the threshold, which is not exceeded, so no split
        assert_eq!(sim.grid().get(Position::new(1, 0)), Some(&herbivore(i32::MAX)));
        assert!(sim.grid().is_empty_at(Position::new(0, 0)));
        assert_eq!(sim.counters().herbivores.births, 0);
    }

    #[test]
    fn test_dead_herbivore_is_not_carnivore_prey() {
        let config = WorldConfig::empty(2, 1);
        let mut grid = Grid::new(2, 1);
        grid.insert(Position::new(0, 0), herbivore(10)).unwrap();
        grid.insert(Position::new(1, 0), Organism::new(Species::Carnivore, 200, 50)).unwrap();
        let mut sim = Simulation::from_grid(config, grid).unwrap();

        sim.step();

        // The carnivore finds no prey and moves into the freed cell
        assert_eq!(sim.counters().carnivores.meals, 0);
        assert_eq!(sim.counters().carnivores.moves, 1);
        assert_eq!(
            sim.grid().get(Position::new(0, 0)),
            Some(&Organism::new(Species::Carnivore, 150, 50))
        );
    }

    #[test]
    fn test_same_tick_food_chain() {
        let config = WorldConfig::empty(3, 1);
        let mut grid = Grid::new(3, 1);
        grid.insert(Position::new(0, 0), Organism::new(Species::Plant, 15, 0)).unwrap();
        grid.insert(Position::new(1, 0), herbivore(50)).unwrap();
        grid.insert(Position::new(2, 0), Organism::new(Species::Carnivore, 200, 50)).unwrap();
        let mut sim = Simulation::from_grid(config, grid).unwrap();

        sim.step();

        // Herbivore: 50 - 10 + 15 = 55 > 50, splits 27 / 27, offspring at (1, 0).
        // Carnivore: 200 - 50 + 27 = 177, eats the offspring born this tick.
        assert_eq!(sim.grid().get(Position::new(0, 0)), Some(&herbivore(27)));
        assert_eq!(
            sim.grid().get(Position::new(1, 0)),
            Some(&Organism::new(Species::Carnivore, 177, 50))
        );
        assert!(sim.grid().is_empty_at(Position::new(2, 0)));
    }

    #[test]
    fn test_each_consumer_decays_once_per_tick() {
        for seed in 0..16 {
            let mut config = WorldConfig::empty(8, 1);
            config.seed = seed;
            // A one-row strip never has 8 empty neighbors
            config.plant.min_empty_neighbors = 8;
            config.plant.max_empty_neighbors = 8;
            let mut grid = Grid::new(8, 1);
            for x in [1, 2, 3] {
                grid.insert(Position::new(x, 0), herbivore(100)).unwrap();
            }
            grid.insert(Position::new(6, 0), Organism::new(Species::Carnivore, 400, 50)).unwrap();
            let mut sim = Simulation::from_grid(config, grid).unwrap();

            for tick in 1..=3i32 {
                sim.step();
                let herbivore_energy: i32 = sim
                    .grid()
                    .iter()
                    .filter(|(_, o)| o.species == Species::Herbivore)
                    .map(|(_, o)| o.energy)
                    .sum();
                let carnivore_energy: i32 = sim
                    .grid()
                    .iter()
                    .filter(|(_, o)| o.species == Species::Carnivore)
                    .map(|(_, o)| o.energy)
                    .sum();
                // Once the carnivore has eaten, herbivore energy no longer
                // follows a fixed schedule
                if sim.counters().carnivores.meals > 0 {
                    break;
                }
                assert_eq!(herbivore_energy, 3 * (100 - 10 * tick), "seed {seed}");
                assert_eq!(carnivore_energy, 400 - 50 * tick, "seed {seed}");
                assert_eq!(sim.counters().herbivores.acted, 3 * tick as u64, "seed {seed}");
                assert_eq!(sim.counters().carnivores.acted, tick as u64, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_run_stops_on_extinction() {
        // A one-row strip with these bounds never grows plants
        let mut config = WorldConfig::empty(5, 1);
        config.plant.min_empty_neighbors = 8;
        config.plant.max_empty_neighbors = 8;
        config.herbivore.initial_count = 1;
        config.herbivore.new_born_energy = 20;
        let mut sim = Simulation::new(config).unwrap();

        let mut seen = Vec::new();
        let executed = sim.run_with(100, true, |snapshot| {
            seen.push(*snapshot);
            ControlFlow::Continue(())
        });

        // 20 -> 10 -> 0: starved during the second tick
        assert_eq!(executed, 2);
        assert!(sim.is_extinct());
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last().map(|s| s.counts.herbivores), Some(0));
    }

    #[test]
    fn test_observer_can_stop_run() {
        let mut sim = Simulation::new(small_config(11)).unwrap();
        let mut seen = 0;

        let executed = sim.run_with(1_000, false, |_| {
            seen += 1;
            if seen > 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(executed, 3);
        assert_eq!(sim.tick(), 3);
        assert_eq!(seen, 4);
    }

    #[test]
    fn test_run_does_not_reserve_requested_ticks() {
        let mut sim = Simulation::new(small_config(12)).unwrap();
        let history = sim.run(2);
        assert_eq!(history.len(), 2);
        assert!(history.capacity() < 1_000);
    }
}
