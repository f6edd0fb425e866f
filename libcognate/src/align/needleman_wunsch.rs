use super::{AlignMode, AlignParams, PairwiseAligner, PairwiseAlignment, SubstitutionScores};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceStep {
    /// Both sequences advance: a substitution column.
    Diagonal,
    /// Only the first sequence advances: a gap in the second.
    Up,
    /// Only the second sequence advances: a gap in the first.
    Left,
}

/// The score assumed for an unseen pair of identical items.
pub const DEFAULT_IDENTITY_SCORE: f64 = 1.0;

/// Needleman-Wunsch alignment with affine (Gotoh) gaps and an optional
/// Smith-Waterman local mode.
///
/// Items compare through a [`SubstitutionScores`] lookup. A miss falls back to
/// `identity_score` when the two items are equal and to
/// [`AlignParams::default_score`] otherwise.
#[derive(Clone, Debug)]
pub struct NeedlemanWunsch {
    pub identity_score: f64,
}

impl Default for NeedlemanWunsch {
    fn default() -> Self {
        Self {
            identity_score: DEFAULT_IDENTITY_SCORE,
        }
    }
}

/// Pick the best of the three predecessor states, preferring diagonal, then up,
/// then left when scores tie.
fn best_of(diagonal: f64, up: f64, left: f64) -> (f64, TraceStep) {
    let mut best = (diagonal, TraceStep::Diagonal);
    if up > best.0 {
        best = (up, TraceStep::Up);
    }
    if left > best.0 {
        best = (left, TraceStep::Left);
    }
    best
}

struct DpMatrix {
    cols: usize,
    diagonal: Vec<f64>,
    up: Vec<f64>,
    left: Vec<f64>,
    // `None` marks the start of a local alignment
    diagonal_from: Vec<Option<TraceStep>>,
    up_from: Vec<Option<TraceStep>>,
    left_from: Vec<Option<TraceStep>>,
}

impl DpMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        let size = rows * cols;
        Self {
            cols,
            diagonal: vec![f64::NEG_INFINITY; size],
            up: vec![f64::NEG_INFINITY; size],
            left: vec![f64::NEG_INFINITY; size],
            diagonal_from: vec![None; size],
            up_from: vec![None; size],
            left_from: vec![None; size],
        }
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

impl NeedlemanWunsch {
    pub fn new(identity_score: f64) -> Self {
        Self { identity_score }
    }

    fn substitution<T, S>(&self, a: &T, b: &T, scores: &S, params: &AlignParams) -> f64
    where
        T: PartialEq,
        S: SubstitutionScores<T> + ?Sized,
    {
        match scores.score(a, b) {
            Some(score) => score,
            None if a == b => self.identity_score,
            None => params.default_score,
        }
    }
}

impl PairwiseAligner for NeedlemanWunsch {
    fn align<T, S>(
        &self,
        seq_a: &[T],
        seq_b: &[T],
        scores: &S,
        params: &AlignParams,
    ) -> PairwiseAlignment<T>
    where
        T: Clone + PartialEq,
        S: SubstitutionScores<T> + ?Sized,
    {
        let gap_open = params.gap_open.unwrap_or(params.gap_extend);
        let gap_extend = params.gap_extend;
        let local = params.mode == AlignMode::Local;

        let mut dp = DpMatrix::new(seq_a.len() + 1, seq_b.len() + 1);
        dp.diagonal[0] = 0.0;

        // the best local end point: (score, row, col)
        let mut best_local: Option<(f64, usize, usize)> = None;

        for a_idx in 0..=seq_a.len() {
            for b_idx in 0..=seq_b.len() {
                if a_idx == 0 && b_idx == 0 {
                    continue;
                }
                let cell = dp.idx(a_idx, b_idx);

                if a_idx > 0 && b_idx > 0 {
                    let prev = dp.idx(a_idx - 1, b_idx - 1);
                    let (mut value, step) =
                        best_of(dp.diagonal[prev], dp.up[prev], dp.left[prev]);
                    let mut from = Some(step);
                    if local && value <= 0.0 {
                        value = 0.0;
                        from = None;
                    }
                    let score = value
                        + self.substitution(&seq_a[a_idx - 1], &seq_b[b_idx - 1], scores, params);
                    dp.diagonal[cell] = score;
                    dp.diagonal_from[cell] = from;

                    if local && best_local.map_or(score > 0.0, |(best, _, _)| score > best) {
                        best_local = Some((score, a_idx, b_idx));
                    }
                }

                if a_idx > 0 {
                    let prev = dp.idx(a_idx - 1, b_idx);
                    let (value, step) = best_of(
                        dp.diagonal[prev] + gap_open,
                        dp.up[prev] + gap_extend,
                        dp.left[prev] + gap_open,
                    );
                    dp.up[cell] = value;
                    dp.up_from[cell] = Some(step);
                }

                if b_idx > 0 {
                    let prev = dp.idx(a_idx, b_idx - 1);
                    let (value, step) = best_of(
                        dp.diagonal[prev] + gap_open,
                        dp.up[prev] + gap_open,
                        dp.left[prev] + gap_extend,
                    );
                    dp.left[cell] = value;
                    dp.left_from[cell] = Some(step);
                }
            }
        }

        let (score, mut a_idx, mut b_idx, mut state) = if local {
            match best_local {
                Some((score, a_idx, b_idx)) => (score, a_idx, b_idx, Some(TraceStep::Diagonal)),
                None => {
                    return PairwiseAlignment {
                        score: 0.0,
                        columns: vec![],
                    }
                }
            }
        } else {
            let end = dp.idx(seq_a.len(), seq_b.len());
            let (score, step) = best_of(dp.diagonal[end], dp.up[end], dp.left[end]);
            (score, seq_a.len(), seq_b.len(), Some(step))
        };

        let mut columns = vec![];
        while let Some(step) = state {
            if a_idx == 0 && b_idx == 0 {
                break;
            }
            let cell = dp.idx(a_idx, b_idx);
            match step {
                TraceStep::Diagonal => {
                    columns.push((
                        Some(seq_a[a_idx - 1].clone()),
                        Some(seq_b[b_idx - 1].clone()),
                    ));
                    state = dp.diagonal_from[cell];
                    a_idx -= 1;
                    b_idx -= 1;
                }
                TraceStep::Up => {
                    columns.push((Some(seq_a[a_idx - 1].clone()), None));
                    state = dp.up_from[cell];
                    a_idx -= 1;
                }
                TraceStep::Left => {
                    columns.push((None, Some(seq_b[b_idx - 1].clone())));
                    state = dp.left_from[cell];
                    b_idx -= 1;
                }
            }
        }
        columns.reverse();

        PairwiseAlignment {
            score: if score.is_finite() { score } else { 0.0 },
            columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ApproxEq;
    use assert2::{assert, check};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn identity(a: &char, b: &char) -> Option<f64> {
        Some(if a == b { 1.0 } else { -1.0 })
    }

    fn no_scores(_: &char, _: &char) -> Option<f64> {
        None
    }

    #[test]
    fn test_identical_sequences_cold() {
        let aligner = NeedlemanWunsch::default();
        let result = aligner.align(
            &chars("abc"),
            &chars("abc"),
            &no_scores,
            &AlignParams::default(),
        );
        check!(result.score.approx_eq(3.0));
        check!(result.columns.len() == 3);
        assert!(result.columns.iter().all(|(a, b)| a == b));
    }

    #[test]
    fn test_unseen_mismatch_uses_default() {
        let aligner = NeedlemanWunsch::default();
        let result = aligner.align(&chars("a"), &chars("b"), &no_scores, &AlignParams::default());
        check!(result.score.approx_eq(-1.75));
        check!(result.columns == vec![(Some('a'), Some('b'))]);
    }

    #[test]
    fn test_linear_gap() {
        let aligner = NeedlemanWunsch::default();
        let result = aligner.align(&chars("abc"), &chars("ac"), &identity, &AlignParams::default());
        check!(result.score.approx_eq(0.25));
        check!(
            result.columns
                == vec![
                    (Some('a'), Some('a')),
                    (Some('b'), None),
                    (Some('c'), Some('c')),
                ]
        );
    }

    #[test]
    fn test_affine_gap_stays_contiguous() {
        let aligner = NeedlemanWunsch::default();
        let params = AlignParams {
            gap_open: Some(-3.0),
            gap_extend: -0.5,
            ..AlignParams::default()
        };
        let result = aligner.align(&chars("abbbc"), &chars("ac"), &identity, &params);
        check!(result.score.approx_eq(-2.0));
        check!(
            result.columns
                == vec![
                    (Some('a'), Some('a')),
                    (Some('b'), None),
                    (Some('b'), None),
                    (Some('b'), None),
                    (Some('c'), Some('c')),
                ]
        );
    }

    #[test]
    fn test_empty_sequences() {
        let aligner = NeedlemanWunsch::default();
        let params = AlignParams::default();

        let result = aligner.align(&chars(""), &chars(""), &identity, &params);
        check!(result.score == 0.0);
        check!(result.columns.is_empty());

        let result = aligner.align(&chars("ab"), &chars(""), &identity, &params);
        check!(result.score.approx_eq(-3.5));
        check!(result.columns == vec![(Some('a'), None), (Some('b'), None)]);

        let result = aligner.align(&chars(""), &chars("ab"), &identity, &params);
        check!(result.columns == vec![(None, Some('a')), (None, Some('b'))]);
    }

    #[test]
    fn test_local_alignment() {
        let aligner = NeedlemanWunsch::default();
        let params = AlignParams::default().with_mode(AlignMode::Local);
        let result = aligner.align(&chars("xxabcyy"), &chars("zzabczz"), &identity, &params);
        check!(result.score.approx_eq(3.0));
        check!(
            result.columns
                == vec![
                    (Some('a'), Some('a')),
                    (Some('b'), Some('b')),
                    (Some('c'), Some('c')),
                ]
        );
    }

    #[test]
    fn test_local_alignment_without_positive_segment() {
        let aligner = NeedlemanWunsch::default();
        let params = AlignParams::default().with_mode(AlignMode::Local);
        let result = aligner.align(&chars("ab"), &chars("cd"), &identity, &params);
        check!(result.score == 0.0);
        check!(result.columns.is_empty());
    }
}
