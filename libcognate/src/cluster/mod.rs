mod graph;
mod registry;
mod strategy;

pub use graph::{VertexId, WordGraph};
pub use registry::{ClusteringRegistry, UnknownStrategyError};
pub use strategy::{ClusteringStrategy, ConnectedComponents, LabelPropagation};

use tracing::debug;

use crate::structs::CognateGroup;

/// Components up to this size are taken as groups without clustering.
pub const MIN_CLUSTERED_COMPONENT: usize = 3;

/// Split the word graph into cognate groups.
///
/// Each connected component is partitioned by `strategy`, except for
/// components too small to split, which become one group each.
pub fn cluster_cognates(graph: &WordGraph, strategy: &dyn ClusteringStrategy) -> Vec<CognateGroup> {
    let mut groups = vec![];

    for component in graph.weak_components() {
        let clusters = if component.len() < MIN_CLUSTERED_COMPONENT {
            vec![component]
        } else {
            strategy.cluster(graph, &component)
        };

        for cluster in clusters {
            let group: CognateGroup = cluster
                .into_iter()
                .filter_map(|vertex| graph.form(vertex).cloned())
                .collect();
            if !group.is_empty() {
                groups.push(group);
            }
        }
    }

    debug!(
        strategy = strategy.name(),
        vertices = graph.len(),
        groups = groups.len(),
        "clustered word graph"
    );
    groups
}
