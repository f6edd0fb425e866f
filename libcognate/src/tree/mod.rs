mod guide_tree;
mod newick;

pub use guide_tree::{GuideTree, Node, NodeId};
pub use newick::NewickError;
