use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::align::{AlignMode, AlignParams, PairwiseAligner};
use crate::structs::{Alignment, Symbol, WordForm, WordPair};

use super::{estimate_pmi, PmiError, ScoreTable};

pub const DEFAULT_ALPHA: f64 = 0.75;

#[derive(Error, Debug, PartialEq)]
#[error("the decay exponent alpha must lie in (0.5, 1], found {alpha}")]
pub struct InvalidDecayExponentError {
    alpha: f64,
}

/// The step-size reduction power α of the online EM update.
///
/// Any 0.5 < α ≤ 1 keeps the accumulated step sizes convergent. The smaller
/// α, the larger each update and the faster old evidence decays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecayExponent(f64);

impl DecayExponent {
    pub fn new(alpha: f64) -> Result<Self, InvalidDecayExponentError> {
        if alpha > 0.5 && alpha <= 1.0 {
            Ok(Self(alpha))
        } else {
            Err(InvalidDecayExponentError { alpha })
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for DecayExponent {
    fn default() -> Self {
        Self(DEFAULT_ALPHA)
    }
}

impl TryFrom<f64> for DecayExponent {
    type Error = InvalidDecayExponentError;

    fn try_from(alpha: f64) -> Result<Self, Self::Error> {
        Self::new(alpha)
    }
}

/// How accepted alignments are weighted when they update the score table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EvidenceWeighting {
    /// Every accepted alignment counts once.
    #[default]
    Uniform,
    /// Every accepted alignment counts by its (non-negative) alignment score.
    AlignmentScore,
}

/// The alignments of the word pairs that survived screening.
#[derive(Clone, Debug, Default)]
pub struct ScreeningOutcome {
    pub alignments: Vec<Alignment>,
    pub scores: Vec<f64>,
    pub discarded: usize,
}

/// Owns a score table and improves it batch by batch with the online EM
/// update rule.
#[derive(Clone, Debug)]
pub struct OnlineScorer {
    table: ScoreTable,
    alpha: DecayExponent,
    margin: f64,
    n_updates: usize,
    params: AlignParams,
    weighting: EvidenceWeighting,
}

impl OnlineScorer {
    pub fn new(alpha: DecayExponent, margin: f64) -> Self {
        Self::with_table(ScoreTable::new(), alpha, margin)
    }

    /// Start from a previously estimated table.
    pub fn with_table(table: ScoreTable, alpha: DecayExponent, margin: f64) -> Self {
        Self {
            table,
            alpha,
            margin,
            n_updates: 0,
            params: AlignParams::default(),
            weighting: EvidenceWeighting::Uniform,
        }
    }

    pub fn with_weighting(mut self, weighting: EvidenceWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_params(mut self, params: AlignParams) -> Self {
        self.params = params;
        self
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    pub fn into_table(self) -> ScoreTable {
        self.table
    }

    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    pub fn params(&self) -> &AlignParams {
        &self.params
    }

    /// The step size η = (updates + 2)^(-α) of the next update.
    pub fn step_size(&self) -> f64 {
        (self.n_updates as f64 + 2.0).powf(-self.alpha.value())
    }

    /// The score of aligning `form` entirely against gaps, plus its length.
    fn gap_baseline(&self, form: &WordForm, form_is_first: bool) -> f64 {
        let gap = Symbol::gap();
        let gap_scores: f64 = form
            .symbols
            .iter()
            .map(|s| match form_is_first {
                true => self.table.get_or(s, &gap, self.params.default_score),
                false => self.table.get_or(&gap, s, self.params.default_score),
            })
            .sum();
        gap_scores + form.len() as f64
    }

    /// The score an alignment of `pair` must reach, after scaling by the
    /// margin multiplier, to be accepted.
    pub fn acceptance_threshold(&self, pair: &WordPair) -> f64 {
        self.gap_baseline(&pair.first, true)
            .max(self.gap_baseline(&pair.second, false))
    }

    /// Align every pair against the current table, drop the pairs whose
    /// alignment is not clearly better than aligning against gaps, and update
    /// the table from the survivors.
    ///
    /// Discarded pairs are removed from `pairs`; the survivors keep their
    /// relative order.
    pub fn align_pairs<A: PairwiseAligner>(
        &mut self,
        aligner: &A,
        pairs: &mut Vec<WordPair>,
        mode: AlignMode,
    ) -> Result<ScreeningOutcome, PmiError> {
        let params = self.params.with_mode(mode);
        let table = &self.table;

        // pairs are independent given the table, so align them against a
        // read-only view of it
        let results: Vec<(f64, Alignment, f64)> = pairs
            .par_iter()
            .map(|pair| {
                let result =
                    aligner.align(&pair.first.symbols, &pair.second.symbols, table, &params);
                (
                    result.score,
                    Alignment::from_optional_columns(result.columns),
                    self.acceptance_threshold(pair),
                )
            })
            .collect();

        let mut outcome = ScreeningOutcome::default();
        let mut keep: Vec<bool> = Vec::with_capacity(results.len());
        for (score, alignment, threshold) in results {
            if self.margin * score < threshold {
                outcome.discarded += 1;
                keep.push(false);
            } else {
                outcome.alignments.push(alignment);
                outcome.scores.push(score);
                keep.push(true);
            }
        }

        let mut keep_iter = keep.into_iter();
        pairs.retain(|_| keep_iter.next().unwrap_or(false));

        debug!(
            accepted = outcome.alignments.len(),
            discarded = outcome.discarded,
            "screened batch"
        );

        match self.weighting {
            EvidenceWeighting::Uniform => self.update(&outcome.alignments, None)?,
            EvidenceWeighting::AlignmentScore => {
                let weights: Vec<f64> = outcome.scores.iter().map(|s| s.max(0.0)).collect();
                self.update(&outcome.alignments, Some(&weights))?
            }
        }

        Ok(outcome)
    }

    /// Blend a fresh PMI estimate from `alignments` into the table.
    ///
    /// Every pair present in the fresh estimate becomes
    /// `η·fresh + (1 - η)·old`, with `old` defaulting to 0. Pairs absent from
    /// the batch keep their score.
    pub fn update(
        &mut self,
        alignments: &[Alignment],
        weights: Option<&[f64]>,
    ) -> Result<(), PmiError> {
        let eta = self.step_size();
        let fresh = estimate_pmi(alignments, weights)?;

        // both orderings are written at once, so read from the table as it
        // was before this update
        let previous = self.table.clone();
        for (a, b, fresh_score) in fresh.iter() {
            let old_score = previous.get_or(a, b, 0.0);
            self.table
                .insert(a, b, eta * fresh_score + (1.0 - eta) * old_score);
        }

        self.n_updates += 1;
        Ok(())
    }
}
