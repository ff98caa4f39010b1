// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

/*!
Population coordinator: owns the networks, drives training rounds and
selection, and enforces the lifecycle state machine.

Legal transitions: `OFF -> ON` (start), `ON -> TRAINING` (train),
`ON | TRAINING -> PAUSED` (pause), `PAUSED -> ON` (resume), any non-OFF
state `-> OFF` (stop). Everything else is a lifecycle error with no
partial mutation.

Pause works through a one-shot channel: the training loop installs the
sender when it observes `PAUSED` and blocks on the receiver; `resume`
(or `stop`) takes the sender out of its slot and fires it exactly once.
Workers of the round already in flight always run to completion.
*/

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use crossbeam::channel;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use evonet_codegen::CompilerBridge;
use evonet_config::EvonetConfig;
use evonet_genome::storage::build_scope;
use evonet_genome::{
    decode_records, encode_records, random, Activation, ObjectKind, Record, Registry,
    TopologyScope,
};

use crate::callbacks::{Callbacks, Group, Receiver, Sender, Trainer};
use crate::network::{Network, Status};
use crate::stats::{NetworkStat, Statistics};
use crate::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Off,
    On,
    Training,
    Paused,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "OFF",
            Self::On => "ON",
            Self::Training => "TRAINING",
            Self::Paused => "PAUSED",
        })
    }
}

/// Cloneable cross-thread handle for pause/resume/stop.
#[derive(Clone)]
pub struct Controller {
    status: Arc<Mutex<LifecycleState>>,
    gate: Arc<Mutex<Option<channel::Sender<()>>>>,
}

impl Controller {
    pub fn state(&self) -> LifecycleState {
        *self.status.lock()
    }

    fn set(&self, next: LifecycleState) {
        *self.status.lock() = next;
    }

    /// Suspend training after the in-flight round completes.
    pub fn pause(&self) -> RuntimeResult<()> {
        let mut status = self.status.lock();
        match *status {
            LifecycleState::On | LifecycleState::Training => {
                *status = LifecycleState::Paused;
                Ok(())
            }
            actual => Err(RuntimeError::Lifecycle {
                operation: "pause",
                expected: "ON or TRAINING",
                actual,
            }),
        }
    }

    /// Release a paused population back to ON.
    pub fn resume(&self) -> RuntimeResult<()> {
        {
            let mut status = self.status.lock();
            if *status != LifecycleState::Paused {
                return Err(RuntimeError::Lifecycle {
                    operation: "resume",
                    expected: "PAUSED",
                    actual: *status,
                });
            }
            *status = LifecycleState::On;
        }
        self.release_gate();
        Ok(())
    }

    /// Abort training and drive the lifecycle to OFF. A loop blocked on
    /// the pause gate is woken so it can observe the stop.
    pub fn stop(&self) -> RuntimeResult<()> {
        {
            let mut status = self.status.lock();
            if *status == LifecycleState::Off {
                return Err(RuntimeError::Lifecycle {
                    operation: "stop",
                    expected: "ON, TRAINING or PAUSED",
                    actual: *status,
                });
            }
            *status = LifecycleState::Off;
        }
        self.release_gate();
        Ok(())
    }

    fn release_gate(&self) {
        if let Some(release) = self.gate.lock().take() {
            let _ = release.send(());
        }
    }

    /// Block while paused. Installs the gate, then re-checks the state
    /// so a racing resume/stop that missed the sender cannot strand us.
    fn block_while_paused(&self) {
        loop {
            if self.state() != LifecycleState::Paused {
                return;
            }
            let (release, released) = channel::bounded::<()>(1);
            *self.gate.lock() = Some(release);
            if self.state() != LifecycleState::Paused {
                self.gate.lock().take();
                return;
            }
            let _ = released.recv();
        }
    }
}

pub struct Population {
    config: Arc<EvonetConfig>,
    status: Arc<Mutex<LifecycleState>>,
    gate: Arc<Mutex<Option<channel::Sender<()>>>>,
    registry: Arc<Mutex<Registry>>,
    bridge: Arc<dyn CompilerBridge>,
    networks: Vec<Network>,
    activation: Activation,
    callbacks: Callbacks,
    statistics: Statistics,
}

impl Population {
    pub fn new(config: EvonetConfig, bridge: Arc<dyn CompilerBridge>) -> Self {
        Self {
            config: Arc::new(config),
            status: Arc::new(Mutex::new(LifecycleState::Off)),
            gate: Arc::new(Mutex::new(None)),
            registry: Arc::new(Mutex::new(Registry::new())),
            bridge,
            networks: Vec::new(),
            activation: Activation::Sigmoid,
            callbacks: Callbacks::default(),
            statistics: Statistics::default(),
        }
    }

    pub fn controller(&self) -> Controller {
        Controller {
            status: Arc::clone(&self.status),
            gate: Arc::clone(&self.gate),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.status.lock()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn set_trainer(&mut self, trainer: Trainer) {
        self.callbacks.trainer = trainer;
    }

    pub fn set_sender(&mut self, sender: Sender) {
        self.callbacks.sender = sender;
    }

    pub fn set_receiver(&mut self, receiver: Receiver) {
        self.callbacks.receiver = receiver;
    }

    /// Swap the activation function before the population starts.
    pub fn activator(&mut self, name: &str, consts: &[f64]) -> RuntimeResult<()> {
        self.require("activator", "OFF", &[LifecycleState::Off])?;
        self.activation = Activation::from_alias(name, consts)?;
        Ok(())
    }

    /// Clear statistics without touching the networks.
    pub fn reset(&mut self) {
        self.statistics.reset();
    }

    fn require(
        &self,
        operation: &'static str,
        expected: &'static str,
        allowed: &[LifecycleState],
    ) -> RuntimeResult<()> {
        let actual = self.state();
        if allowed.contains(&actual) {
            Ok(())
        } else {
            Err(RuntimeError::Lifecycle {
                operation,
                expected,
                actual,
            })
        }
    }

    /// Build the initial generation: `population.size` networks, each
    /// initialized, mutated once and swept, all alive.
    pub fn start(&mut self) -> RuntimeResult<()> {
        self.require("start", "OFF", &[LifecycleState::Off])?;

        let size = self.config.population.size;
        let group_size = self.config.population.group;
        self.registry.lock().erase_kind(ObjectKind::Network);

        let mut networks = Vec::with_capacity(size);
        for index in 0..size {
            let id = self.registry.lock().add(ObjectKind::Network);
            let scope = TopologyScope::new(Arc::clone(&self.config));
            let mut network = Network::new(id, index, group_size, scope, self.activation.clone());
            network.initialize()?;
            network.mutate()?;
            network.sweep();
            networks.push(network);
        }

        self.networks = networks;
        self.statistics = Statistics::new(size);
        *self.status.lock() = LifecycleState::On;
        info!(size, "population started");
        Ok(())
    }

    /// Tear everything down: artifacts removed, networks dropped, state
    /// driven to OFF.
    pub fn stop(&mut self) -> RuntimeResult<()> {
        self.controller().stop()?;
        for network in &mut self.networks {
            network.release(&*self.bridge);
            self.registry.lock().erase(ObjectKind::Network, network.id());
        }
        self.networks.clear();
        info!("population stopped");
        Ok(())
    }

    pub fn restart(&mut self) -> RuntimeResult<()> {
        self.stop()?;
        self.start()
    }

    pub fn pause(&self) -> RuntimeResult<()> {
        self.controller().pause()
    }

    pub fn resume(&self) -> RuntimeResult<()> {
        self.controller().resume()
    }

    /// Run `iterations` training rounds. Each round sleeps for the
    /// optional interval, honors pause/stop, then evaluates every alive
    /// network on its own scoped thread and joins before the next round.
    /// One network's failure is logged and never aborts the round.
    pub fn train(&mut self, iterations: usize, interval: Option<Duration>) -> RuntimeResult<()> {
        if iterations == 0 {
            return Err(RuntimeError::InvalidArgument(
                "training requires at least one iteration".to_string(),
            ));
        }
        if interval == Some(Duration::ZERO) {
            return Err(RuntimeError::InvalidArgument(
                "training interval must be positive".to_string(),
            ));
        }
        self.require("train", "ON", &[LifecycleState::On])?;

        let controller = self.controller();
        controller.set(LifecycleState::Training);
        let bridge = Arc::clone(&self.bridge);
        let callbacks = self.callbacks.clone();

        'rounds: for round in 0..iterations {
            if let Some(pause) = interval {
                std::thread::sleep(pause);
            }
            loop {
                match controller.state() {
                    LifecycleState::Off => break 'rounds,
                    LifecycleState::Paused => controller.block_while_paused(),
                    LifecycleState::On => controller.set(LifecycleState::Training),
                    LifecycleState::Training => break,
                }
            }

            std::thread::scope(|workers| {
                let mut handles = Vec::new();
                for network in &mut self.networks {
                    if network.status() != Status::Alive {
                        continue;
                    }
                    let bridge = &*bridge;
                    let callbacks = &callbacks;
                    handles.push(workers.spawn(move || {
                        let inputs = (callbacks.sender)(network.group());
                        let id = network.id();
                        network
                            .input(&inputs, bridge, callbacks)
                            .map_err(|err| (id, err))
                    }));
                }
                for handle in handles {
                    match handle.join() {
                        Ok(Ok(())) => {}
                        Ok(Err((id, err))) => {
                            warn!(network = id, error = %err, "evaluation failed this round")
                        }
                        Err(_) => warn!("evaluation worker panicked"),
                    }
                }
            });
            debug!(round, "training round complete");
        }

        if controller.state() == LifecycleState::Training {
            controller.set(LifecycleState::On);
        }
        Ok(())
    }

    /// Mark the addressed networks dead. The whole batch is validated
    /// first; any invalid coordinate rejects the call with nothing
    /// changed. Returns how many networks actually transitioned.
    pub fn kill(&mut self, groups: &[Group]) -> RuntimeResult<usize> {
        self.require(
            "kill",
            "ON, TRAINING, or PAUSED",
            &[
                LifecycleState::On,
                LifecycleState::Training,
                LifecycleState::Paused,
            ],
        )?;

        let group_size = self.config.population.group;
        let mut flats = Vec::with_capacity(groups.len());
        for group in groups {
            if group.index >= group_size {
                return Err(RuntimeError::KillRejected(format!(
                    "coordinate {group} exceeds group size {group_size}"
                )));
            }
            let flat = group.group * group_size + group.index;
            if flat >= self.networks.len() {
                return Err(RuntimeError::KillRejected(format!(
                    "coordinate {group} addresses no network"
                )));
            }
            flats.push(flat);
        }

        let mut transitioned = 0;
        for flat in flats {
            let network = &mut self.networks[flat];
            if network.status() == Status::Alive {
                network.set_status(Status::Dead);
                transitioned += 1;
            }
        }
        self.statistics.set_counts(
            self.statistics.alive() - transitioned,
            self.statistics.dead() + transitioned,
        );
        debug!(transitioned, "kill applied");
        Ok(transitioned)
    }

    /// Run one selection step: measure fitness, record extrema, pick
    /// parents by fitness-proportional roulette and build the next
    /// generation concurrently.
    pub fn evolve(&mut self) -> RuntimeResult<()> {
        self.require("evolve", "ON", &[LifecycleState::On])?;
        let size = self.networks.len();
        if size == 0 {
            return Err(RuntimeError::InvalidArgument(
                "population holds no networks".to_string(),
            ));
        }

        let mut fitness = Vec::with_capacity(size);
        let mut best = 0usize;
        let mut worst = 0usize;
        for (i, network) in self.networks.iter().enumerate() {
            let value = network.fitness();
            if i > 0 {
                if value > fitness[best] {
                    best = i;
                }
                if value < fitness[worst] {
                    worst = i;
                }
            }
            fitness.push(value);
        }
        let best_stat = NetworkStat {
            fitness: fitness[best],
            code: self.networks[best].generated_source(),
        };
        let worst_stat = NetworkStat {
            fitness: fitness[worst],
            code: self.networks[worst].generated_source(),
        };

        let weights = selection_weights(
            &fitness,
            self.config.population.equality,
            self.config.network.fitness.inverse,
        );
        let parents: Vec<usize> = (0..size).map(|_| roulette(&weights)).collect();

        let group_size = self.config.population.group;
        let registry = Arc::clone(&self.registry);
        let activation = self.activation.clone();
        let networks = &self.networks;
        let children: Vec<RuntimeResult<Network>> = std::thread::scope(|workers| {
            let handles: Vec<_> = parents
                .iter()
                .enumerate()
                .map(|(index, &parent)| {
                    let registry = &registry;
                    let activation = &activation;
                    workers.spawn(move || -> RuntimeResult<Network> {
                        let scope = networks[parent].scope().deep_clone()?;
                        let id = registry.lock().add(ObjectKind::Network);
                        let mut child =
                            Network::new(id, index, group_size, scope, activation.clone());
                        child.mutate()?;
                        child.sweep();
                        Ok(child)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(RuntimeError::Internal(
                            "next-generation worker panicked".to_string(),
                        ))
                    })
                })
                .collect()
        });

        let mut next = Vec::with_capacity(size);
        for child in children {
            next.push(child?);
        }

        for network in &mut self.networks {
            network.release(&*self.bridge);
            self.registry.lock().erase(ObjectKind::Network, network.id());
        }
        self.networks = next;
        self.statistics.record_generation(best_stat, worst_stat);
        self.statistics.set_counts(size, 0);
        info!(
            generation = self.statistics.generation(),
            best = fitness[best],
            worst = fitness[worst],
            "generation evolved"
        );
        Ok(())
    }

    /// Encode the whole population as a flat word stream: one population
    /// record, all network records, then all layer, neuron and synapse
    /// records across networks in network order.
    pub fn save(&self) -> RuntimeResult<Vec<u64>> {
        let mut records = vec![Record::Population {
            generation: self.statistics.generation(),
        }];
        let mut layers = Vec::new();
        let mut neurons = Vec::new();
        let mut synapses = Vec::new();
        for (index, network) in self.networks.iter().enumerate() {
            records.push(Record::Network {
                index: index as u64,
            });
            let (l, n, s) = network.scope().export_sections(index as u64)?;
            layers.extend(l);
            neurons.extend(n);
            synapses.extend(s);
        }
        records.extend(layers);
        records.extend(neurons);
        records.extend(synapses);
        Ok(encode_records(&records))
    }

    /// Rebuild the population from a word stream produced by [`save`].
    /// Requires OFF; on success the population is ON with every restored
    /// network alive.
    ///
    /// [`save`]: Population::save
    pub fn restore(&mut self, words: &[u64]) -> RuntimeResult<()> {
        self.require("restore", "OFF", &[LifecycleState::Off])?;
        let records = decode_records(words)?;

        let mut iter = records.into_iter();
        let generation = match iter.next() {
            Some(Record::Population { generation }) => generation,
            _ => return Err(malformed("stream does not begin with a population record")),
        };

        let mut order: Vec<u64> = Vec::new();
        let mut sections: AHashMap<u64, (Vec<Record>, Vec<Record>, Vec<Record>)> = AHashMap::new();
        for record in iter {
            match record {
                Record::Population { .. } => {
                    return Err(malformed("duplicate population record"));
                }
                Record::Network { index } => {
                    order.push(index);
                    sections.entry(index).or_default();
                }
                Record::Layer { index, .. } => match sections.get_mut(&index) {
                    Some(section) => section.0.push(record),
                    None => return Err(malformed("layer record for unknown network")),
                },
                Record::Neuron { index, .. } => match sections.get_mut(&index) {
                    Some(section) => section.1.push(record),
                    None => return Err(malformed("neuron record for unknown network")),
                },
                Record::Synapse { index, .. } => match sections.get_mut(&index) {
                    Some(section) => section.2.push(record),
                    None => return Err(malformed("synapse record for unknown network")),
                },
            }
        }

        let group_size = self.config.population.group;
        self.registry.lock().erase_kind(ObjectKind::Network);
        let mut networks = Vec::with_capacity(order.len());
        for (slot, index) in order.iter().enumerate() {
            let (layers, neurons, synapses) = sections
                .remove(index)
                .ok_or_else(|| malformed("duplicate network record"))?;
            let scope = build_scope(Arc::clone(&self.config), &layers, &neurons, &synapses)?;
            let id = self.registry.lock().add(ObjectKind::Network);
            let mut network = Network::new(id, slot, group_size, scope, self.activation.clone());
            network.sweep();
            networks.push(network);
        }

        let size = networks.len();
        self.networks = networks;
        self.statistics = Statistics::new(size);
        self.statistics.restore_generation(generation);
        *self.status.lock() = LifecycleState::On;
        info!(size, generation, "population restored");
        Ok(())
    }
}

fn malformed(detail: &str) -> RuntimeError {
    evonet_genome::GenomeError::MalformedSnapshot(detail.to_string()).into()
}

/// Normalize fitness into selection weights on `[equality, 1.0]`. A
/// degenerate generation (max equals min) weighs everyone equally.
fn selection_weights(fitness: &[f64], equality: f64, inverse: bool) -> Vec<f64> {
    let min = fitness.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = fitness.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    fitness
        .iter()
        .map(|value| {
            if max == min {
                1.0
            } else {
                let mut norm = (value - min) / (max - min);
                if inverse {
                    norm = 1.0 - norm;
                }
                equality + norm * (1.0 - equality)
            }
        })
        .collect()
}

/// One fitness-proportional draw over the weight vector.
fn roulette(weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    let mut mark = random::unit() * total;
    for (index, weight) in weights.iter().enumerate() {
        if mark < *weight {
            return index;
        }
        mark -= weight;
    }
    weights.len() - 1
}
