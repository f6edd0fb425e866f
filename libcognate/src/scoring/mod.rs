mod grouped;
mod online;
mod pmi;
mod table;

pub use grouped::{GroupedScores, ScoreKey, ScoreLookupError};
pub use online::{
    DecayExponent, EvidenceWeighting, InvalidDecayExponentError, OnlineScorer, ScreeningOutcome,
    DEFAULT_ALPHA,
};
pub use pmi::{estimate_pmi, PmiError};
pub use table::{ScoreEntry, ScoreTable, ScoreTableFormatError};
