// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Evolve a XOR gate.
//!
//! Usage: `xor_demo [generations]` (default 50). Requires a system C
//! compiler; artifacts land under `./evonet-artifacts`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use evonet::{CcBridge, EvonetConfig, Group, Population};

const CASES: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

fn main() -> Result<()> {
    evonet::logging::init("evonet=info,xor_demo=info")?;

    let generations: usize = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(50);

    let mut config = EvonetConfig::new(2, 1, None)?;
    config.population.size = 40;
    let bridge = Arc::new(CcBridge::new("./evonet-artifacts")?);
    let mut population = Population::new(config, bridge);

    let case = Arc::new(AtomicUsize::new(0));
    let sending = case.clone();
    population.set_sender(Arc::new(move |_: Group| {
        CASES[sending.load(Ordering::SeqCst)].0.to_vec()
    }));
    let scoring = case.clone();
    population.set_trainer(Arc::new(move |_: Group, outputs: &[f64]| {
        let expected = CASES[scoring.load(Ordering::SeqCst)].1;
        1.0 - (outputs[0] - expected).abs()
    }));

    population.start()?;
    for _ in 0..generations {
        for index in 0..CASES.len() {
            case.store(index, Ordering::SeqCst);
            population.train(1, None)?;
        }
        population.evolve()?;

        let stats = population.statistics();
        let best = stats.best().generation.as_ref().map(|s| s.fitness);
        info!(
            generation = stats.generation(),
            best = best.unwrap_or(0.0),
            "generation complete"
        );
    }

    if let Some(best) = &population.statistics().best().all {
        info!(fitness = best.fitness, "best program found");
        println!("{}", best.code);
    }
    population.stop()?;
    Ok(())
}
