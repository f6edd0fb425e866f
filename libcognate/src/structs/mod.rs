pub mod alignment;
pub use alignment::{Alignment, Column, MultiAlignment};

pub mod symbol;
pub use symbol::Symbol;

pub mod word;
pub use word::{CognateGroup, WordForm, WordPair};
