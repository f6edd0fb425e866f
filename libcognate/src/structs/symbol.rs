use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

/// An atomic phonetic unit. The empty symbol is the gap.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Symbol(symbol.into())
    }

    pub fn gap() -> Self {
        Symbol(String::new())
    }

    pub fn is_gap(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a transcription into one symbol per character.
    pub fn from_chars(transcription: &str) -> Vec<Symbol> {
        transcription.chars().map(Symbol::from).collect()
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol(value)
    }
}

impl From<char> for Symbol {
    fn from(value: char) -> Self {
        Symbol(value.to_string())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.is_gap() {
            true => write!(f, "-"),
            false => write!(f, "{}", self.0),
        }
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_gap_symbol() {
        check!(Symbol::gap().is_gap());
        check!(Symbol::gap() == Symbol::from(""));
        check!(!Symbol::from("a").is_gap());
        check!(Symbol::gap().to_string() == "-");
    }

    #[test]
    fn test_from_chars() {
        let symbols = Symbol::from_chars("hund");
        check!(symbols.len() == 4);
        check!(symbols[0] == Symbol::from('h'));
        check!(symbols[3].as_str() == "d");
    }
}
