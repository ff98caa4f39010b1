// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Flat binary record codec for population snapshots.
//!
//! A snapshot is a sequence of fixed-width `u64` words. Each record opens
//! with a discriminant tag and carries its tag-specific payload; floats
//! are stored as their raw bit patterns. Records are flat, not nested:
//! reconstruction walks the stream in order and uses depth/height as
//! addressing keys instead of pointers.

use std::sync::Arc;

use evonet_config::EvonetConfig;

use crate::topology::TopologyScope;
use crate::{GenomeError, GenomeResult};

/// Record discriminant tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum Tag {
    Population = 0,
    Network = 1,
    Layer = 2,
    Neuron = 3,
    Synapse = 4,
}

impl Tag {
    fn from_word(word: u64) -> GenomeResult<Self> {
        match word {
            0 => Ok(Self::Population),
            1 => Ok(Self::Network),
            2 => Ok(Self::Layer),
            3 => Ok(Self::Neuron),
            4 => Ok(Self::Synapse),
            other => Err(GenomeError::UnknownTag(other)),
        }
    }
}

/// One snapshot record. `index` is always the owning network's index.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Population {
        generation: u64,
    },
    Network {
        index: u64,
    },
    Layer {
        index: u64,
        depth: u64,
    },
    Neuron {
        index: u64,
        depth: u64,
        height: u64,
        bias: f64,
    },
    Synapse {
        index: u64,
        source_depth: u64,
        source_height: u64,
        target_depth: u64,
        target_height: u64,
        weight: f64,
    },
}

impl Record {
    pub fn tag(&self) -> Tag {
        match self {
            Self::Population { .. } => Tag::Population,
            Self::Network { .. } => Tag::Network,
            Self::Layer { .. } => Tag::Layer,
            Self::Neuron { .. } => Tag::Neuron,
            Self::Synapse { .. } => Tag::Synapse,
        }
    }
}

/// Serialize records into the flat word stream.
pub fn encode_records(records: &[Record]) -> Vec<u64> {
    let mut words = Vec::new();
    for record in records {
        match record {
            Record::Population { generation } => {
                words.extend([Tag::Population as u64, *generation]);
            }
            Record::Network { index } => {
                words.extend([Tag::Network as u64, *index]);
            }
            Record::Layer { index, depth } => {
                words.extend([Tag::Layer as u64, *index, *depth]);
            }
            Record::Neuron {
                index,
                depth,
                height,
                bias,
            } => {
                words.extend([Tag::Neuron as u64, *index, *depth, *height, bias.to_bits()]);
            }
            Record::Synapse {
                index,
                source_depth,
                source_height,
                target_depth,
                target_height,
                weight,
            } => {
                words.extend([
                    Tag::Synapse as u64,
                    *index,
                    *source_depth,
                    *source_height,
                    *target_depth,
                    *target_height,
                    weight.to_bits(),
                ]);
            }
        }
    }
    words
}

/// Parse a flat word stream back into records.
pub fn decode_records(words: &[u64]) -> GenomeResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut pos = 0;

    let take = |pos: &mut usize, n: usize| -> GenomeResult<&[u64]> {
        if *pos + n > words.len() {
            return Err(GenomeError::TruncatedStream(*pos));
        }
        let slice = &words[*pos..*pos + n];
        *pos += n;
        Ok(slice)
    };

    while pos < words.len() {
        let tag = Tag::from_word(words[pos])?;
        pos += 1;
        let record = match tag {
            Tag::Population => {
                let payload = take(&mut pos, 1)?;
                Record::Population {
                    generation: payload[0],
                }
            }
            Tag::Network => {
                let payload = take(&mut pos, 1)?;
                Record::Network { index: payload[0] }
            }
            Tag::Layer => {
                let payload = take(&mut pos, 2)?;
                Record::Layer {
                    index: payload[0],
                    depth: payload[1],
                }
            }
            Tag::Neuron => {
                let payload = take(&mut pos, 4)?;
                Record::Neuron {
                    index: payload[0],
                    depth: payload[1],
                    height: payload[2],
                    bias: f64::from_bits(payload[3]),
                }
            }
            Tag::Synapse => {
                let payload = take(&mut pos, 6)?;
                Record::Synapse {
                    index: payload[0],
                    source_depth: payload[1],
                    source_height: payload[2],
                    target_depth: payload[3],
                    target_height: payload[4],
                    weight: f64::from_bits(payload[5]),
                }
            }
        };
        records.push(record);
    }
    Ok(records)
}

impl TopologyScope {
    /// Export this scope as `(layers, neurons, synapses)` record sections
    /// for the network at `network_index`, each section in walk order
    /// (depth ascending, height ascending, outgoing insertion order).
    pub fn export_sections(
        &self,
        network_index: u64,
    ) -> GenomeResult<(Vec<Record>, Vec<Record>, Vec<Record>)> {
        let mut layers = Vec::with_capacity(self.layer_count());
        let mut neurons = Vec::new();
        let mut synapses = Vec::new();

        for depth in 0..self.layer_count() {
            layers.push(Record::Layer {
                index: network_index,
                depth: depth as u64,
            });
            for (height, id) in self.neuron_ids(depth).iter().enumerate() {
                neurons.push(Record::Neuron {
                    index: network_index,
                    depth: depth as u64,
                    height: height as u64,
                    bias: self.neuron(*id)?.bias(),
                });
                for synapse_id in self.outgoing(*id).to_vec() {
                    let synapse = self.synapse(synapse_id)?;
                    let (source_depth, source_height) =
                        self.locate(synapse.source()).ok_or_else(|| {
                            GenomeError::UnknownNeuron(synapse.source().0)
                        })?;
                    let (target_depth, target_height) =
                        self.locate(synapse.target()).ok_or_else(|| {
                            GenomeError::UnknownNeuron(synapse.target().0)
                        })?;
                    synapses.push(Record::Synapse {
                        index: network_index,
                        source_depth: source_depth as u64,
                        source_height: source_height as u64,
                        target_depth: target_depth as u64,
                        target_height: target_height as u64,
                        weight: synapse.weight(),
                    });
                }
            }
        }
        Ok((layers, neurons, synapses))
    }
}

/// Rebuild one scope from its record sections, addressing neurons purely
/// by `(depth, height)`.
pub fn build_scope(
    config: Arc<EvonetConfig>,
    layers: &[Record],
    neurons: &[Record],
    synapses: &[Record],
) -> GenomeResult<TopologyScope> {
    let mut scope = TopologyScope::new(config);

    for record in layers {
        match record {
            Record::Layer { depth, .. } => {
                scope.add_layer(*depth as usize)?;
            }
            other => {
                return Err(GenomeError::MalformedSnapshot(format!(
                    "expected layer record, found {:?}",
                    other.tag()
                )))
            }
        }
    }
    for record in neurons {
        match record {
            Record::Neuron {
                depth,
                height,
                bias,
                ..
            } => {
                let id = scope.add_neuron(*depth as usize, *height as usize)?;
                scope.set_bias(id, *bias)?;
            }
            other => {
                return Err(GenomeError::MalformedSnapshot(format!(
                    "expected neuron record, found {:?}",
                    other.tag()
                )))
            }
        }
    }
    for record in synapses {
        match record {
            Record::Synapse {
                source_depth,
                source_height,
                target_depth,
                target_height,
                weight,
                ..
            } => {
                let source = scope.neuron_at(*source_depth as usize, *source_height as usize)?;
                let target = scope.neuron_at(*target_depth as usize, *target_height as usize)?;
                let id = scope.add_synapse(source, target)?;
                scope.set_weight(id, *weight)?;
            }
            other => {
                return Err(GenomeError::MalformedSnapshot(format!(
                    "expected synapse record, found {:?}",
                    other.tag()
                )))
            }
        }
    }
    Ok(scope)
}
