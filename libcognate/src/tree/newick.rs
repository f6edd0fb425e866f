use thiserror::Error;

use super::{Node, NodeId};

#[derive(Error, Debug, PartialEq)]
pub enum NewickError {
    #[error("tree text is empty")]
    Empty,
    #[error("unexpected end of tree text, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected character '{found}' at position {position}, expected {expected}")]
    UnexpectedChar {
        found: char,
        position: usize,
        expected: &'static str,
    },
    #[error("invalid branch length \"{text}\" at position {position}")]
    InvalidLength { text: String, position: usize },
    #[error("unterminated {what} starting at position {position}")]
    Unterminated { what: &'static str, position: usize },
    #[error("leaf label \"{name}\" appears more than once")]
    DuplicateLeaf { name: String },
}

const DELIMITERS: &[char] = &['(', ')', '[', ']', '\'', ':', ';', ','];

/// A recursive-descent parser for one Newick tree.
struct Parser {
    chars: Vec<char>,
    pos: usize,
    nodes: Vec<Node>,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, ch: char, expected: &'static str) -> Result<(), NewickError> {
        match self.peek() {
            Some(found) if found == ch => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(NewickError::UnexpectedChar {
                found,
                position: self.pos,
                expected,
            }),
            None => Err(NewickError::UnexpectedEnd { expected }),
        }
    }

    /// Skip whitespace and bracketed comments.
    fn skip_ignored(&mut self) -> Result<(), NewickError> {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += 1;
            } else if ch == '[' {
                let start = self.pos;
                match self.chars[start..].iter().position(|&c| c == ']') {
                    Some(offset) => self.pos = start + offset + 1,
                    None => {
                        return Err(NewickError::Unterminated {
                            what: "comment",
                            position: start,
                        })
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn push_node(&mut self, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node {
            name: None,
            length: None,
            children: vec![],
            parent,
        });
        self.nodes.len() - 1
    }

    fn parse_subtree(&mut self, parent: Option<NodeId>) -> Result<NodeId, NewickError> {
        let id = self.push_node(parent);
        self.skip_ignored()?;

        if self.peek() == Some('(') {
            self.pos += 1;
            loop {
                let child = self.parse_subtree(Some(id))?;
                self.nodes[id].children.push(child);
                self.skip_ignored()?;
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some(')') => {
                        self.pos += 1;
                        break;
                    }
                    Some(found) => {
                        return Err(NewickError::UnexpectedChar {
                            found,
                            position: self.pos,
                            expected: "',' or ')'",
                        })
                    }
                    None => {
                        return Err(NewickError::UnexpectedEnd {
                            expected: "',' or ')'",
                        })
                    }
                }
            }
        }

        self.skip_ignored()?;
        self.nodes[id].name = self.parse_label()?;
        self.skip_ignored()?;

        if self.peek() == Some(':') {
            self.pos += 1;
            self.skip_ignored()?;
            self.nodes[id].length = Some(self.parse_length()?);
        }

        Ok(id)
    }

    fn parse_label(&mut self) -> Result<Option<String>, NewickError> {
        if self.peek() == Some('\'') {
            return self.parse_quoted_label().map(Some);
        }

        let start = self.pos;
        while let Some(ch) = self.peek() {
            if DELIMITERS.contains(&ch) {
                break;
            }
            self.pos += 1;
        }
        let label: String = self.chars[start..self.pos].iter().collect();
        let label = label.trim();
        Ok((!label.is_empty()).then(|| label.to_string()))
    }

    /// A single-quoted label; a doubled quote stands for one quote.
    fn parse_quoted_label(&mut self) -> Result<String, NewickError> {
        let start = self.pos;
        self.pos += 1;
        let mut label = String::new();
        loop {
            match self.peek() {
                Some('\'') if self.chars.get(self.pos + 1) == Some(&'\'') => {
                    label.push('\'');
                    self.pos += 2;
                }
                Some('\'') => {
                    self.pos += 1;
                    return Ok(label);
                }
                Some(ch) => {
                    label.push(ch);
                    self.pos += 1;
                }
                None => {
                    return Err(NewickError::Unterminated {
                        what: "quoted label",
                        position: start,
                    })
                }
            }
        }
    }

    fn parse_length(&mut self) -> Result<f64, NewickError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if DELIMITERS.contains(&ch) || ch.is_whitespace() {
                break;
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>().map_err(|_| NewickError::InvalidLength {
            text,
            position: start,
        })
    }
}

/// Parse the first tree of `text` into a node arena and its root.
///
/// Anything after the terminating `;` is ignored.
pub(super) fn parse(text: &str) -> Result<(Vec<Node>, NodeId), NewickError> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
        nodes: vec![],
    };

    parser.skip_ignored()?;
    if parser.peek().is_none() {
        return Err(NewickError::Empty);
    }

    let root = parser.parse_subtree(None)?;
    parser.skip_ignored()?;
    parser.expect(';', "';'")?;

    Ok((parser.nodes, root))
}
