use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::{Symbol, WordForm};

/// A pairwise alignment of two symbol sequences. Either side of a column may
/// be the gap symbol, never both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub columns: Vec<(Symbol, Symbol)>,
}

impl Alignment {
    pub fn new(columns: Vec<(Symbol, Symbol)>) -> Self {
        Self { columns }
    }

    /// Build an alignment from gap-free (`Some`) / gap (`None`) columns.
    pub fn from_optional_columns(columns: Vec<(Option<Symbol>, Option<Symbol>)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(a, b)| (a.unwrap_or_default(), b.unwrap_or_default()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Symbol, Symbol)> {
        self.columns.iter()
    }
}

impl Display for Alignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut top = String::new();
        let mut middle = String::new();
        let mut bottom = String::new();

        for (a, b) in &self.columns {
            let a = a.to_string();
            let b = b.to_string();
            let width = a.chars().count().max(b.chars().count());

            top.push_str(&format!("{a:<width$}"));
            bottom.push_str(&format!("{b:<width$}"));
            let marker = if a == b { '|' } else { ' ' };
            middle.extend(std::iter::repeat(marker).take(width));
        }

        write!(f, "{top}\n{middle}\n{bottom}")
    }
}

/// One column of a multiple alignment: a symbol per participating language.
pub type Column = Vec<Symbol>;

/// A multi-language alignment of one cognate group. `languages[i]` and
/// `concepts[i]` describe row `i`; every column has one symbol per row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiAlignment {
    pub languages: Vec<String>,
    pub concepts: Vec<String>,
    pub columns: Vec<Column>,
}

impl MultiAlignment {
    /// The single-row alignment of one form: every symbol is its own column.
    pub fn singleton(form: &WordForm) -> Self {
        Self {
            languages: vec![form.language.clone()],
            concepts: vec![form.concept.clone()],
            columns: form.symbols.iter().map(|s| vec![s.clone()]).collect(),
        }
    }

    /// The number of rows (aligned forms).
    pub fn width(&self) -> usize {
        self.languages.len()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The aligned symbols of row `row_idx`, gaps included.
    pub fn row(&self, row_idx: usize) -> Vec<Symbol> {
        self.columns
            .iter()
            .map(|column| column[row_idx].clone())
            .collect()
    }

    pub fn rows(&self) -> Vec<Vec<Symbol>> {
        (0..self.width()).map(|idx| self.row(idx)).collect()
    }
}

impl Display for MultiAlignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, row) in self.rows().iter().enumerate() {
            let row_string: Vec<String> = row.iter().map(|s| s.to_string()).collect();
            writeln!(
                f,
                "{}\t{}\t{}",
                self.languages[idx],
                self.concepts[idx],
                row_string.join(" ")
            )?;
        }
        Ok(())
    }
}
