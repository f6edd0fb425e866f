use indexmap::IndexMap;
use thiserror::Error;

use super::{ClusteringStrategy, ConnectedComponents, LabelPropagation};

#[derive(Error, Debug, PartialEq)]
#[error("unknown clustering method \"{name}\", available methods: {}", available.join(", "))]
pub struct UnknownStrategyError {
    pub name: String,
    pub available: Vec<String>,
}

/// The clustering strategies selectable by name.
#[derive(Clone, Debug)]
pub struct ClusteringRegistry {
    strategies: IndexMap<String, Box<dyn ClusteringStrategy>>,
}

impl ClusteringRegistry {
    /// A registry holding the built-in strategies; `seed` drives the
    /// randomized ones.
    pub fn new(seed: u64) -> Self {
        let mut registry = Self {
            strategies: IndexMap::new(),
        };
        registry.register(Box::new(LabelPropagation::new(seed)));
        registry.register(Box::new(ConnectedComponents));
        registry
    }

    /// Add a strategy under its own name, replacing any previous one.
    pub fn register(&mut self, strategy: Box<dyn ClusteringStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<Box<dyn ClusteringStrategy>, UnknownStrategyError> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownStrategyError {
                name: name.to_string(),
                available: self.names().iter().map(|n| n.to_string()).collect(),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// (name, description) of every strategy, in registration order.
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.strategies
            .values()
            .map(|s| (s.name(), s.description()))
            .collect()
    }
}

impl Default for ClusteringRegistry {
    fn default() -> Self {
        Self::new(0)
    }
}
