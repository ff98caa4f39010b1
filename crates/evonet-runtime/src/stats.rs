// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Population statistics: generation counter, alive/dead counts and
//! fitness extrema. Extrema carry the generated source alongside the
//! fitness so the best program survives the network that produced it.

/// Snapshot of one extremal network at selection time.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkStat {
    pub fitness: f64,
    /// Generated forward-pass source at the time of measurement.
    pub code: String,
}

/// One extremum tracked at two horizons.
#[derive(Debug, Clone, Default)]
pub struct Extrema {
    /// Best/worst ever observed, promoted only on strict improvement.
    pub all: Option<NetworkStat>,
    /// Best/worst of the generation measured by the latest selection.
    pub generation: Option<NetworkStat>,
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    generation: u64,
    alive: usize,
    dead: usize,
    best: Extrema,
    worst: Extrema,
}

impl Statistics {
    pub fn new(alive: usize) -> Self {
        Self {
            alive,
            ..Self::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alive(&self) -> usize {
        self.alive
    }

    pub fn dead(&self) -> usize {
        self.dead
    }

    pub fn best(&self) -> &Extrema {
        &self.best
    }

    pub fn worst(&self) -> &Extrema {
        &self.worst
    }

    pub(crate) fn restore_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub(crate) fn set_counts(&mut self, alive: usize, dead: usize) {
        self.alive = alive;
        self.dead = dead;
    }

    /// Record one generation's extrema and advance the counter.
    /// Generation zero seeds the all-time slots; afterwards the best is
    /// promoted only on strictly higher fitness and the worst only on
    /// strictly lower.
    pub(crate) fn record_generation(&mut self, best: NetworkStat, worst: NetworkStat) {
        match &self.best.all {
            Some(all) if best.fitness <= all.fitness => {}
            _ => self.best.all = Some(best.clone()),
        }
        match &self.worst.all {
            Some(all) if worst.fitness >= all.fitness => {}
            _ => self.worst.all = Some(worst.clone()),
        }
        self.best.generation = Some(best);
        self.worst.generation = Some(worst);
        self.generation += 1;
    }

    /// Clear all counters and extrema.
    pub fn reset(&mut self) {
        *self = Self::new(self.alive + self.dead);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(fitness: f64) -> NetworkStat {
        NetworkStat {
            fitness,
            code: String::new(),
        }
    }

    #[test]
    fn first_generation_seeds_both_horizons() {
        let mut stats = Statistics::new(4);
        stats.record_generation(stat(2.0), stat(-1.0));
        assert_eq!(stats.generation(), 1);
        assert_eq!(stats.best().all.as_ref().unwrap().fitness, 2.0);
        assert_eq!(stats.worst().all.as_ref().unwrap().fitness, -1.0);
    }

    #[test]
    fn all_time_promotes_only_on_strict_improvement() {
        let mut stats = Statistics::new(4);
        stats.record_generation(stat(2.0), stat(-1.0));
        stats.record_generation(stat(2.0), stat(-1.0));
        stats.record_generation(stat(1.5), stat(0.0));
        assert_eq!(stats.best().all.as_ref().unwrap().fitness, 2.0);
        assert_eq!(stats.worst().all.as_ref().unwrap().fitness, -1.0);
        assert_eq!(stats.best().generation.as_ref().unwrap().fitness, 1.5);

        stats.record_generation(stat(3.0), stat(-2.0));
        assert_eq!(stats.best().all.as_ref().unwrap().fitness, 3.0);
        assert_eq!(stats.worst().all.as_ref().unwrap().fitness, -2.0);
        assert_eq!(stats.generation(), 4);
    }

    #[test]
    fn reset_keeps_population_size() {
        let mut stats = Statistics::new(6);
        stats.set_counts(4, 2);
        stats.record_generation(stat(1.0), stat(0.0));
        stats.reset();
        assert_eq!(stats.generation(), 0);
        assert_eq!(stats.alive(), 6);
        assert_eq!(stats.dead(), 0);
        assert!(stats.best().all.is_none());
    }
}
