use std::collections::VecDeque;

use indexmap::IndexSet;

use crate::structs::{WordForm, WordPair};

pub type VertexId = usize;

/// An undirected graph whose vertices are word forms and whose edges link
/// forms judged to be related.
#[derive(Clone, Debug, Default)]
pub struct WordGraph {
    forms: IndexSet<WordForm>,
    adjacency: Vec<IndexSet<VertexId>>,
}

impl WordGraph {
    /// Build a graph over `forms` with one edge per pair. Forms that only
    /// appear in `pairs` are added as vertices too. Self-loops are dropped.
    pub fn new<'a>(
        forms: impl IntoIterator<Item = &'a WordForm>,
        pairs: impl IntoIterator<Item = &'a WordPair>,
    ) -> Self {
        let mut graph = Self::default();
        for form in forms {
            graph.add_vertex(form);
        }
        for pair in pairs {
            let first = graph.add_vertex(&pair.first);
            let second = graph.add_vertex(&pair.second);
            if first != second {
                graph.adjacency[first].insert(second);
                graph.adjacency[second].insert(first);
            }
        }
        graph
    }

    fn add_vertex(&mut self, form: &WordForm) -> VertexId {
        if let Some(id) = self.forms.get_index_of(form) {
            return id;
        }
        self.forms.insert(form.clone());
        self.adjacency.push(IndexSet::new());
        self.forms.len() - 1
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(IndexSet::len).sum::<usize>() / 2
    }

    pub fn form(&self, vertex: VertexId) -> Option<&WordForm> {
        self.forms.get_index(vertex)
    }

    pub fn vertex(&self, form: &WordForm) -> Option<VertexId> {
        self.forms.get_index_of(form)
    }

    pub fn neighbors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency[vertex].iter().copied()
    }

    pub fn degree(&self, vertex: VertexId) -> usize {
        self.adjacency[vertex].len()
    }

    /// The connected components, each listed in ascending vertex order and
    /// ordered by their smallest vertex.
    pub fn weak_components(&self) -> Vec<Vec<VertexId>> {
        let mut seen = vec![false; self.len()];
        let mut components = vec![];

        for start in 0..self.len() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);

            while let Some(vertex) = queue.pop_front() {
                for neighbor in self.neighbors(vertex) {
                    if !seen[neighbor] {
                        seen[neighbor] = true;
                        component.push(neighbor);
                        queue.push_back(neighbor);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn form(language: &str, transcription: &str) -> WordForm {
        WordForm::from_chars(language, "c", transcription)
    }

    #[test]
    fn test_components() {
        let forms = vec![form("A", "x"), form("B", "y"), form("C", "z"), form("D", "w")];
        let pairs = vec![
            WordPair::new(forms[0].clone(), forms[2].clone()),
            WordPair::new(forms[2].clone(), forms[2].clone()),
        ];
        let graph = WordGraph::new(&forms, &pairs);

        check!(graph.len() == 4);
        check!(graph.edge_count() == 1);
        check!(graph.weak_components() == vec![vec![0, 2], vec![1], vec![3]]);
    }

    #[test]
    fn test_pair_forms_become_vertices() {
        let pairs = vec![WordPair::new(form("A", "x"), form("B", "y"))];
        let graph = WordGraph::new(std::iter::empty(), &pairs);
        check!(graph.len() == 2);
        check!(graph.vertex(&form("B", "y")) == Some(1));
        check!(graph.degree(0) == 1);
    }
}
