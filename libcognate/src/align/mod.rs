mod needleman_wunsch;
pub use needleman_wunsch::{NeedlemanWunsch, TraceStep};

/// The gap extension penalty used throughout estimation and multi-alignment.
pub const DEFAULT_GAP_EXTEND: f64 = -1.75;

/// The score assumed for a symbol pair that has no entry in a score table.
pub const DEFAULT_SUBSTITUTION_SCORE: f64 = -1.75;

/// A substitution-score lookup over items of type `T`.
///
/// A miss is reported as `None`; callers decide on the fallback.
pub trait SubstitutionScores<T> {
    fn score(&self, a: &T, b: &T) -> Option<f64>;
}

impl<T, F> SubstitutionScores<T> for F
where
    F: Fn(&T, &T) -> Option<f64>,
{
    fn score(&self, a: &T, b: &T) -> Option<f64> {
        self(a, b)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignMode {
    #[default]
    Global,
    Local,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlignParams {
    /// The penalty for the first position of a gap. `None` means every gap
    /// position costs `gap_extend`.
    pub gap_open: Option<f64>,
    pub gap_extend: f64,
    /// The score used for item pairs the lookup has no entry for.
    pub default_score: f64,
    pub mode: AlignMode,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            gap_open: None,
            gap_extend: DEFAULT_GAP_EXTEND,
            default_score: DEFAULT_SUBSTITUTION_SCORE,
            mode: AlignMode::Global,
        }
    }
}

impl AlignParams {
    pub fn with_mode(&self, mode: AlignMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

/// The result of a pairwise alignment. `None` on either side of a column is a
/// gap.
#[derive(Clone, Debug, PartialEq)]
pub struct PairwiseAlignment<T> {
    pub score: f64,
    pub columns: Vec<(Option<T>, Option<T>)>,
}

/// A dynamic-programming pairwise aligner.
pub trait PairwiseAligner: Sync {
    fn align<T, S>(
        &self,
        seq_a: &[T],
        seq_b: &[T],
        scores: &S,
        params: &AlignParams,
    ) -> PairwiseAlignment<T>
    where
        T: Clone + PartialEq,
        S: SubstitutionScores<T> + ?Sized;
}
