use std::fmt::Debug;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use super::{VertexId, WordGraph};

/// A way of splitting a connected component of a [`WordGraph`] into clusters.
pub trait ClusteringStrategy: dyn_clone::DynClone + Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Partition `component` into disjoint clusters that together cover it.
    fn cluster(&self, graph: &WordGraph, component: &[VertexId]) -> Vec<Vec<VertexId>>;
}

dyn_clone::clone_trait_object!(ClusteringStrategy);

/// Every connected component is one cluster.
#[derive(Clone, Debug, Default)]
pub struct ConnectedComponents;

impl ClusteringStrategy for ConnectedComponents {
    fn name(&self) -> &'static str {
        "components"
    }

    fn description(&self) -> &'static str {
        "each connected component of accepted pairs is one cognate group"
    }

    fn cluster(&self, _graph: &WordGraph, component: &[VertexId]) -> Vec<Vec<VertexId>> {
        vec![component.to_vec()]
    }
}

pub const DEFAULT_MAX_ROUNDS: usize = 100;

/// Community detection by label propagation.
///
/// Every vertex starts in its own community and repeatedly, in a random
/// order, adopts the label most common among its neighbors, breaking ties at
/// random. A vertex whose label is already among the most common keeps it.
/// The run stops once no vertex changes, or after `max_rounds`.
#[derive(Clone, Debug)]
pub struct LabelPropagation {
    pub seed: u64,
    pub max_rounds: usize,
}

impl LabelPropagation {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl ClusteringStrategy for LabelPropagation {
    fn name(&self) -> &'static str {
        "labelprop"
    }

    fn description(&self) -> &'static str {
        "label propagation community detection within each component"
    }

    fn cluster(&self, graph: &WordGraph, component: &[VertexId]) -> Vec<Vec<VertexId>> {
        let mut rng = Pcg64::seed_from_u64(self.seed);
        let mut labels: IndexMap<VertexId, VertexId> = component.iter().map(|&v| (v, v)).collect();
        let mut order = component.to_vec();

        for _ in 0..self.max_rounds {
            order.shuffle(&mut rng);
            let mut changed = false;

            for &vertex in &order {
                let mut counts: IndexMap<VertexId, usize> = IndexMap::new();
                for neighbor in graph.neighbors(vertex) {
                    if let Some(&label) = labels.get(&neighbor) {
                        *counts.entry(label).or_default() += 1;
                    }
                }
                let Some(&best) = counts.values().max() else {
                    continue;
                };

                let current = labels[&vertex];
                if counts.get(&current) == Some(&best) {
                    continue;
                }

                let mut candidates: Vec<VertexId> = counts
                    .iter()
                    .filter(|(_, count)| **count == best)
                    .map(|(&label, _)| label)
                    .collect();
                candidates.sort_unstable();
                if let Some(&label) = candidates.choose(&mut rng) {
                    labels.insert(vertex, label);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        let mut clusters: IndexMap<VertexId, Vec<VertexId>> = IndexMap::new();
        for &vertex in component {
            clusters.entry(labels[&vertex]).or_default().push(vertex);
        }
        clusters.into_values().collect()
    }
}
