use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;

use super::newick::{self, NewickError};

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub length: Option<f64>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// A rooted guide tree whose leaves are labeled with language names.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Children keep the
/// order they have in the tree text.
#[derive(Clone, Debug)]
pub struct GuideTree {
    nodes: Vec<Node>,
    root: NodeId,
    leaves_by_name: HashMap<String, NodeId>,
}

impl GuideTree {
    pub fn from_newick(text: &str) -> Result<Self, NewickError> {
        let (nodes, root) = newick::parse(text)?;

        let mut leaves_by_name = HashMap::new();
        for (id, node) in nodes.iter().enumerate() {
            if !node.children.is_empty() {
                continue;
            }
            if let Some(name) = &node.name {
                if leaves_by_name.insert(name.clone(), id).is_some() {
                    return Err(NewickError::DuplicateLeaf { name: name.clone() });
                }
            }
        }

        Ok(Self {
            nodes,
            root,
            leaves_by_name,
        })
    }

    /// Read the first tree of a Newick file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = fs::read_to_string(&path).context(format!(
            "failed to read guide tree: {}",
            path.as_ref().to_string_lossy()
        ))?;
        Self::from_newick(&text).context(format!(
            "failed to parse guide tree: {}",
            path.as_ref().to_string_lossy()
        ))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_by_name(&self, name: &str) -> Option<NodeId> {
        self.leaves_by_name.get(name).copied()
    }

    /// The leaves in tree order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.postorder()
            .into_iter()
            .filter(|&id| self.is_leaf(id))
            .collect()
    }

    /// Every node after all of its descendants, children visited left to
    /// right.
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        // (node, whether its children have been pushed)
        let mut stack = vec![(self.root, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
            } else {
                stack.push((id, true));
                for &child in self.nodes[id].children.iter().rev() {
                    stack.push((child, false));
                }
            }
        }
        order
    }
}

impl FromStr for GuideTree {
    type Err = NewickError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_newick(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{assert, check};

    fn name(tree: &GuideTree, id: NodeId) -> &str {
        tree.node(id).name.as_deref().unwrap_or("")
    }

    #[test]
    fn test_postorder() -> anyhow::Result<()> {
        let tree: GuideTree = "((A,B)ab,(C,D,E)cde)root;".parse()?;
        let order: Vec<&str> = tree.postorder().into_iter().map(|id| name(&tree, id)).collect();
        check!(order == vec!["A", "B", "ab", "C", "D", "E", "cde", "root"]);
        check!(tree.postorder().last() == Some(&tree.root()));
        Ok(())
    }

    #[test]
    fn test_leaves() -> anyhow::Result<()> {
        let tree = GuideTree::from_newick("((A,B),C);")?;
        let leaves: Vec<&str> = tree.leaves().into_iter().map(|id| name(&tree, id)).collect();
        check!(leaves == vec!["A", "B", "C"]);

        let c = tree.leaf_by_name("C");
        assert!(let Some(_) = c);
        check!(tree.children(tree.root()).last().copied() == c);
        check!(tree.leaf_by_name("Z") == None);
        check!(tree.len() == 5);
        Ok(())
    }

    #[test]
    fn test_single_leaf_tree() -> anyhow::Result<()> {
        let tree = GuideTree::from_newick("A;")?;
        check!(tree.is_leaf(tree.root()));
        check!(tree.postorder() == vec![tree.root()]);
        Ok(())
    }

    #[test]
    fn test_duplicate_leaf_is_rejected() {
        let result = GuideTree::from_newick("((A,B),A);");
        assert!(let Err(NewickError::DuplicateLeaf { .. }) = result);
    }
}
