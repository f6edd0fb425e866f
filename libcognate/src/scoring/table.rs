use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::align::SubstitutionScores;
use crate::structs::Symbol;

#[derive(Error, Debug)]
#[error("score table is not symmetric: ({first:?}, {second:?}) = {forward}, reverse = {reverse:?}")]
pub struct ScoreTableFormatError {
    first: Symbol,
    second: Symbol,
    forward: f64,
    reverse: Option<f64>,
}

/// One persisted table entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub first: Symbol,
    pub second: Symbol,
    pub score: f64,
}

/// Log-odds substitution scores between pairs of symbols.
///
/// Both orderings of a pair are stored and every write goes through
/// [`ScoreTable::insert`], which sets them together, so
/// `get(a, b) == get(b, a)` always holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreTable {
    scores: HashMap<Symbol, HashMap<Symbol, f64>>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, a: &Symbol, b: &Symbol) -> Option<f64> {
        self.scores.get(a)?.get(b).copied()
    }

    pub fn get_or(&self, a: &Symbol, b: &Symbol, default: f64) -> f64 {
        self.get(a, b).unwrap_or(default)
    }

    /// Set the score of the unordered pair `{a, b}`.
    pub fn insert(&mut self, a: &Symbol, b: &Symbol, score: f64) {
        self.scores
            .entry(a.clone())
            .or_default()
            .insert(b.clone(), score);
        self.scores
            .entry(b.clone())
            .or_default()
            .insert(a.clone(), score);
    }

    /// The number of stored ordered pairs.
    pub fn len(&self) -> usize {
        self.scores.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every stored ordered pair.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Symbol, f64)> {
        self.scores
            .iter()
            .flat_map(|(a, row)| row.iter().map(move |(b, score)| (a, b, *score)))
    }

    /// All ordered pairs sorted by symbol.
    pub fn entries(&self) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = self
            .iter()
            .map(|(first, second, score)| ScoreEntry {
                first: first.clone(),
                second: second.clone(),
                score,
            })
            .collect();
        entries.sort_by(|a, b| (&a.first, &a.second).cmp(&(&b.first, &b.second)));
        entries
    }

    /// The `n` highest-scoring unordered pairs, best first.
    pub fn most_common(&self, n: usize) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = self
            .entries()
            .into_iter()
            .filter(|e| e.first <= e.second)
            .collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        entries.truncate(n);
        entries
    }

    /// The largest absolute score difference between the two tables, counting
    /// a pair missing from one side as a difference against 0.
    pub fn max_abs_change(&self, other: &ScoreTable) -> f64 {
        let forward = self
            .iter()
            .map(|(a, b, score)| (score - other.get(a, b).unwrap_or(0.0)).abs());
        let backward = other
            .iter()
            .filter(|(a, b, _)| self.get(a, b).is_none())
            .map(|(_, _, score)| score.abs());
        forward.chain(backward).fold(0.0, f64::max)
    }

    pub fn from_entries(entries: Vec<ScoreEntry>) -> Result<Self, ScoreTableFormatError> {
        let mut table = ScoreTable::new();
        for entry in &entries {
            table
                .scores
                .entry(entry.first.clone())
                .or_default()
                .insert(entry.second.clone(), entry.score);
        }

        for (first, second, forward) in table.iter() {
            let reverse = table.get(second, first);
            if reverse != Some(forward) {
                return Err(ScoreTableFormatError {
                    first: first.clone(),
                    second: second.clone(),
                    forward,
                    reverse,
                });
            }
        }
        Ok(table)
    }

    pub fn write_json(&self, writer: impl Write) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(writer, &self.entries())
            .context("failed to serialize score table")
    }

    pub fn read_json(reader: impl Read) -> anyhow::Result<Self> {
        let entries: Vec<ScoreEntry> =
            serde_json::from_reader(reader).context("failed to parse score table")?;
        Ok(Self::from_entries(entries)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = File::open(&path).context(format!(
            "failed to open score table file: {}",
            path.as_ref().to_string_lossy()
        ))?;
        Self::read_json(BufReader::new(file))
    }
}

impl SubstitutionScores<Symbol> for ScoreTable {
    fn score(&self, a: &Symbol, b: &Symbol) -> Option<f64> {
        self.get(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{assert, check};

    fn sym(s: &str) -> Symbol {
        Symbol::from(s)
    }

    #[test]
    fn test_insert_is_symmetric() {
        let mut table = ScoreTable::new();
        table.insert(&sym("p"), &sym("b"), 1.5);
        check!(table.get(&sym("p"), &sym("b")) == Some(1.5));
        check!(table.get(&sym("b"), &sym("p")) == Some(1.5));
        check!(table.get(&sym("p"), &sym("p")) == None);
        check!(table.len() == 2);
    }

    #[test]
    fn test_json_round_trip() -> anyhow::Result<()> {
        let mut table = ScoreTable::new();
        table.insert(&sym("p"), &sym("b"), 1.5);
        table.insert(&sym("a"), &Symbol::gap(), -2.25);

        let mut buffer: Vec<u8> = vec![];
        table.write_json(&mut buffer)?;
        let loaded = ScoreTable::read_json(buffer.as_slice())?;
        check!(loaded == table);
        Ok(())
    }

    #[test]
    fn test_asymmetric_file_is_rejected() {
        let json = r#"[{"first": "a", "second": "b", "score": 1.0}]"#;
        let result = ScoreTable::read_json(json.as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_max_abs_change() {
        let mut old = ScoreTable::new();
        old.insert(&sym("a"), &sym("b"), 1.0);
        old.insert(&sym("a"), &sym("c"), 0.5);

        let mut new = old.clone();
        new.insert(&sym("a"), &sym("b"), 1.25);
        check!(new.max_abs_change(&old) == 0.25);

        new.insert(&sym("x"), &sym("y"), -3.0);
        check!(new.max_abs_change(&old) == 3.0);
        check!(old.max_abs_change(&new) == 3.0);
    }

    #[test]
    fn test_most_common() {
        let mut table = ScoreTable::new();
        table.insert(&sym("a"), &sym("a"), 2.0);
        table.insert(&sym("a"), &sym("b"), 0.5);
        table.insert(&sym("b"), &sym("b"), 3.0);

        let best = table.most_common(2);
        check!(best.len() == 2);
        check!(best[0].first == sym("b"));
        check!(best[1].first == sym("a"));
        check!(best[1].second == sym("a"));
    }
}
