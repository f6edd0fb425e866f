use thiserror::Error;

use crate::align::SubstitutionScores;
use crate::structs::Symbol;

use super::ScoreTable;

#[derive(Error, Debug, PartialEq)]
#[error("no score for ({first:?}, {second:?})")]
pub struct ScoreLookupError {
    pub first: Symbol,
    pub second: Symbol,
}

/// One side of a grouped lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreKey<'a> {
    Single(&'a Symbol),
    Group(&'a [Symbol]),
}

impl<'a> ScoreKey<'a> {
    fn members(&self) -> &'a [Symbol] {
        match *self {
            ScoreKey::Single(symbol) => std::slice::from_ref(symbol),
            ScoreKey::Group(symbols) => symbols,
        }
    }
}

impl<'a> From<&'a Symbol> for ScoreKey<'a> {
    fn from(symbol: &'a Symbol) -> Self {
        ScoreKey::Single(symbol)
    }
}

impl<'a> From<&'a [Symbol]> for ScoreKey<'a> {
    fn from(symbols: &'a [Symbol]) -> Self {
        match symbols {
            [symbol] => ScoreKey::Single(symbol),
            _ => ScoreKey::Group(symbols),
        }
    }
}

/// A view of a [`ScoreTable`] that scores groups of symbols, as found in the
/// columns of a multi-alignment.
///
/// Two groups score as the best pair across them. The lookup is strict: if any
/// cross pair has no score, the whole lookup misses.
#[derive(Clone, Copy, Debug)]
pub struct GroupedScores<'t> {
    table: &'t ScoreTable,
}

impl<'t> GroupedScores<'t> {
    pub fn new(table: &'t ScoreTable) -> Self {
        Self { table }
    }

    pub fn lookup<'a, 'b>(
        &self,
        first: impl Into<ScoreKey<'a>>,
        second: impl Into<ScoreKey<'b>>,
    ) -> Result<f64, ScoreLookupError> {
        let first = first.into();
        let second = second.into();

        let mut best = f64::NEG_INFINITY;
        for a in first.members() {
            for b in second.members() {
                let score = self.table.get(a, b).ok_or_else(|| ScoreLookupError {
                    first: a.clone(),
                    second: b.clone(),
                })?;
                best = best.max(score);
            }
        }
        Ok(best)
    }

    pub fn get<'a, 'b>(
        &self,
        first: impl Into<ScoreKey<'a>>,
        second: impl Into<ScoreKey<'b>>,
        default: f64,
    ) -> f64 {
        self.lookup(first, second).unwrap_or(default)
    }
}

impl SubstitutionScores<Vec<Symbol>> for GroupedScores<'_> {
    fn score(&self, a: &Vec<Symbol>, b: &Vec<Symbol>) -> Option<f64> {
        self.lookup(a.as_slice(), b.as_slice()).ok()
    }
}
