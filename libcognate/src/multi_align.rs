use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::align::{AlignParams, PairwiseAligner};
use crate::scoring::{GroupedScores, ScoreTable};
use crate::structs::{CognateGroup, Column, MultiAlignment, Symbol};
use crate::tree::{GuideTree, NodeId};

/// The index of a cognate group in the slice handed to the aligner.
pub type GroupId = usize;

/// The merged alignments of every group present below one tree node.
pub type NodeAlignments = IndexMap<GroupId, MultiAlignment>;

/// Progressive multiple alignment of cognate groups along a guide tree.
///
/// Each leaf of the tree starts with the forms of its language, one
/// single-row alignment per form. Every internal node merges, group by group,
/// the alignments of its children from left to right by aligning their
/// columns against each other.
pub struct MultiAligner<'a, A> {
    aligner: &'a A,
    scores: GroupedScores<'a>,
    params: AlignParams,
}

impl<'a, A: PairwiseAligner> MultiAligner<'a, A> {
    pub fn new(aligner: &'a A, table: &'a ScoreTable) -> Self {
        Self {
            aligner,
            scores: GroupedScores::new(table),
            params: AlignParams::default(),
        }
    }

    pub fn with_params(mut self, params: AlignParams) -> Self {
        self.params = params;
        self
    }

    fn seed_leaves(
        &self,
        groups: &[CognateGroup],
        tree: &GuideTree,
    ) -> HashMap<NodeId, IndexMap<GroupId, Vec<MultiAlignment>>> {
        let mut seeds: HashMap<NodeId, IndexMap<GroupId, Vec<MultiAlignment>>> = HashMap::new();
        let mut missing: HashSet<&str> = HashSet::new();

        for (group_id, group) in groups.iter().enumerate() {
            for form in group {
                match tree.leaf_by_name(&form.language) {
                    Some(leaf) => seeds
                        .entry(leaf)
                        .or_default()
                        .entry(group_id)
                        .or_default()
                        .push(MultiAlignment::singleton(form)),
                    None => {
                        if missing.insert(&form.language) {
                            warn!(
                                language = form.language.as_str(),
                                "language is not in the guide tree, its forms are skipped"
                            );
                        }
                    }
                }
            }
        }
        seeds
    }

    /// Combine `entries` left to right into one alignment.
    fn merge(&self, mut entries: Vec<MultiAlignment>) -> Option<MultiAlignment> {
        if entries.is_empty() {
            return None;
        }
        let mut merged = entries.remove(0);

        for next in entries {
            let result =
                self.aligner
                    .align(&merged.columns, &next.columns, &self.scores, &self.params);

            let gap_left: Column = vec![Symbol::gap(); merged.width()];
            let gap_right: Column = vec![Symbol::gap(); next.width()];
            merged.columns = result
                .columns
                .into_iter()
                .map(|(left, right)| {
                    let mut column = left.unwrap_or_else(|| gap_left.clone());
                    column.extend(right.unwrap_or_else(|| gap_right.clone()));
                    column
                })
                .collect();
            merged.languages.extend(next.languages);
            merged.concepts.extend(next.concepts);
        }
        Some(merged)
    }

    /// Walk the tree bottom-up, merging group alignments at every node. With
    /// `keep_children` unset, a child's result is moved into its parent and
    /// only the root's result survives.
    fn traverse(
        &self,
        groups: &[CognateGroup],
        tree: &GuideTree,
        keep_children: bool,
    ) -> HashMap<NodeId, NodeAlignments> {
        let mut seeds = self.seed_leaves(groups, tree);
        let mut results: HashMap<NodeId, NodeAlignments> = HashMap::new();

        for node in tree.postorder() {
            let entries_by_group = if tree.is_leaf(node) {
                seeds.remove(&node).unwrap_or_default()
            } else {
                let mut entries: IndexMap<GroupId, Vec<MultiAlignment>> = IndexMap::new();
                for child in tree.children(node) {
                    let child_result = match keep_children {
                        true => results.get(child).cloned(),
                        false => results.remove(child),
                    };
                    for (group_id, alignment) in child_result.into_iter().flatten() {
                        entries.entry(group_id).or_default().push(alignment);
                    }
                }
                entries
            };

            let aligned: NodeAlignments = entries_by_group
                .into_iter()
                .filter_map(|(group_id, entries)| {
                    self.merge(entries).map(|merged| (group_id, merged))
                })
                .collect();

            debug!(node, groups = aligned.len(), "aligned node");
            results.insert(node, aligned);
        }
        results
    }

    /// Align every group at every node of the tree.
    ///
    /// The result maps each node to the alignments of the groups that have
    /// forms below it. A group missing under a child simply does not take
    /// part in the merge at that node.
    pub fn align_all(
        &self,
        groups: &[CognateGroup],
        tree: &GuideTree,
    ) -> HashMap<NodeId, NodeAlignments> {
        self.traverse(groups, tree, true)
    }

    /// Align every group along the tree and return the alignments at the root.
    pub fn align(&self, groups: &[CognateGroup], tree: &GuideTree) -> NodeAlignments {
        self.traverse(groups, tree, false)
            .remove(&tree.root())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{NeedlemanWunsch, PairwiseAlignment, SubstitutionScores};
    use crate::structs::{Alignment, WordForm};
    use assert2::{check, let_assert};

    fn group(forms: &[(&str, &str, &str)]) -> CognateGroup {
        forms
            .iter()
            .map(|(language, concept, transcription)| {
                WordForm::from_chars(*language, *concept, transcription)
            })
            .collect()
    }

    fn row_string(alignment: &MultiAlignment, row_idx: usize) -> String {
        alignment
            .row(row_idx)
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Pairs items by position and pads the shorter sequence with gaps.
    struct ZipAligner;

    impl PairwiseAligner for ZipAligner {
        fn align<T, S>(
            &self,
            seq_a: &[T],
            seq_b: &[T],
            _scores: &S,
            _params: &AlignParams,
        ) -> PairwiseAlignment<T>
        where
            T: Clone + PartialEq,
            S: SubstitutionScores<T> + ?Sized,
        {
            let len = seq_a.len().max(seq_b.len());
            PairwiseAlignment {
                score: 0.0,
                columns: (0..len)
                    .map(|idx| (seq_a.get(idx).cloned(), seq_b.get(idx).cloned()))
                    .collect(),
            }
        }
    }

    #[test]
    fn test_two_leaves_match_pairwise_alignment() -> anyhow::Result<()> {
        let tree = GuideTree::from_newick("(German,English);")?;
        let groups = vec![group(&[("German", "hand", "hant"), ("English", "hand", "hEnd")])];
        let table = ScoreTable::new();
        let aligner = NeedlemanWunsch::default();

        let result = MultiAligner::new(&aligner, &table).align(&groups, &tree);
        let_assert!(Some(merged) = result.get(&0));

        let direct = aligner.align(
            &Symbol::from_chars("hant"),
            &Symbol::from_chars("hEnd"),
            &table,
            &AlignParams::default(),
        );
        let direct = Alignment::from_optional_columns(direct.columns);

        check!(merged.languages == vec!["German", "English"]);
        check!(merged.concepts == vec!["hand", "hand"]);
        check!(merged.len() == direct.len());
        for (column, (a, b)) in merged.columns.iter().zip(direct.iter()) {
            check!(column == &vec![a.clone(), b.clone()]);
        }
        Ok(())
    }

    #[test]
    fn test_sparse_group_coverage() -> anyhow::Result<()> {
        let tree = GuideTree::from_newick("((A,B),(C,D));")?;
        let groups = vec![
            group(&[("A", "x", "ab"), ("C", "x", "ab")]),
            group(&[("B", "y", "cd")]),
            group(&[("Z", "z", "zz")]),
        ];
        let table = ScoreTable::new();
        let aligner = NeedlemanWunsch::default();
        let all = MultiAligner::new(&aligner, &table).align_all(&groups, &tree);

        let root = &all[&tree.root()];
        check!(root.len() == 2);
        check!(root[&0].languages == vec!["A", "C"]);
        check!(root[&1].languages == vec!["B"]);
        check!(root.get(&2) == None);

        let d = tree.leaf_by_name("D").unwrap();
        check!(all[&d].is_empty());
        Ok(())
    }

    #[test]
    fn test_align_matches_root_of_align_all() -> anyhow::Result<()> {
        let tree = GuideTree::from_newick("((A,B),(C,D));")?;
        let groups = vec![
            group(&[("A", "x", "ab"), ("B", "x", "abc"), ("D", "x", "b")]),
            group(&[("C", "y", "cd"), ("D", "y", "cde")]),
        ];
        let table = ScoreTable::new();
        let aligner = NeedlemanWunsch::default();
        let multi = MultiAligner::new(&aligner, &table);

        let all = multi.align_all(&groups, &tree);
        check!(all.len() == tree.len());
        let a = tree.leaf_by_name("A").unwrap();
        check!(all[&a][&0].languages == vec!["A"]);

        let root = multi.align(&groups, &tree);
        check!(root == all[&tree.root()]);
        check!(root[&0].languages == vec!["A", "B", "D"]);
        check!(root[&1].languages == vec!["C", "D"]);
        Ok(())
    }

    #[test]
    fn test_several_forms_per_language() -> anyhow::Result<()> {
        let tree = GuideTree::from_newick("(A,B);")?;
        let groups = vec![group(&[("A", "x", "ab"), ("A", "x", "abc"), ("B", "x", "ab")])];
        let table = ScoreTable::new();

        let result = MultiAligner::new(&ZipAligner, &table).align(&groups, &tree);
        let merged = &result[&0];
        check!(merged.languages == vec!["A", "A", "B"]);
        check!(merged.width() == 3);
        check!(row_string(merged, 0) == "ab-");
        check!(row_string(merged, 1) == "abc");
        check!(row_string(merged, 2) == "ab-");
        Ok(())
    }

    #[test]
    fn test_children_merge_left_to_right() -> anyhow::Result<()> {
        let tree = GuideTree::from_newick("(C,A,B);")?;
        let groups = vec![group(&[("A", "x", "a"), ("B", "x", "bb"), ("C", "x", "ccc")])];
        let table = ScoreTable::new();

        let result = MultiAligner::new(&ZipAligner, &table).align(&groups, &tree);
        let merged = &result[&0];
        check!(merged.languages == vec!["C", "A", "B"]);
        check!(merged.len() == 3);
        check!(row_string(merged, 0) == "ccc");
        check!(row_string(merged, 1) == "a--");
        check!(row_string(merged, 2) == "bb-");
        for column in &merged.columns {
            check!(column.len() == 3);
        }
        Ok(())
    }

    #[test]
    fn test_gap_columns_pad_both_sides() -> anyhow::Result<()> {
        let tree = GuideTree::from_newick("((A,B),C);")?;
        let groups = vec![group(&[("A", "x", "pa"), ("B", "x", "pa"), ("C", "x", "pat")])];
        let mut table = ScoreTable::new();
        for s in ["p", "a", "t"] {
            table.insert(&Symbol::from(s), &Symbol::from(s), 2.0);
        }

        let result = MultiAligner::new(&NeedlemanWunsch::default(), &table).align(&groups, &tree);
        let merged = &result[&0];
        check!(merged.languages == vec!["A", "B", "C"]);
        check!(row_string(merged, 0) == "pa-");
        check!(row_string(merged, 1) == "pa-");
        check!(row_string(merged, 2) == "pat");
        Ok(())
    }
}
