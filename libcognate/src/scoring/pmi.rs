use std::collections::HashMap;

use thiserror::Error;

use crate::structs::{Alignment, Symbol};

use super::ScoreTable;

#[derive(Error, Debug, PartialEq)]
pub enum PmiError {
    #[error("expected {expected} alignment weights, found {found}")]
    WeightCountMismatch { expected: usize, found: usize },
    #[error("alignment weights must be finite and non-negative, found {weight}")]
    InvalidWeight { weight: f64 },
    #[error("non-positive co-occurrence count {count} for ({first:?}, {second:?})")]
    NonPositiveCount {
        first: Symbol,
        second: Symbol,
        count: f64,
    },
}

/// Estimate pointwise mutual information scores from a batch of alignments.
///
/// Every column `(a1, a2)` adds its alignment's weight to the co-occurrence
/// counts of both `(a1, a2)` and `(a2, a1)`, and twice the weight to the
/// marginal counts of `a1` and `a2`. The score of a pair is then
///
/// `ln(count) - ln(marginal(a1)) - ln(marginal(a2)) + 2 ln(Σ marginals) - ln(Σ counts)`
///
/// `weights` defaults to 1.0 for every alignment. Alignments with weight 0
/// contribute nothing.
pub fn estimate_pmi(
    alignments: &[Alignment],
    weights: Option<&[f64]>,
) -> Result<ScoreTable, PmiError> {
    if let Some(weights) = weights {
        if weights.len() != alignments.len() {
            return Err(PmiError::WeightCountMismatch {
                expected: alignments.len(),
                found: weights.len(),
            });
        }
        if let Some(&weight) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
            return Err(PmiError::InvalidWeight { weight });
        }
    }

    let mut pair_counts: HashMap<(&Symbol, &Symbol), f64> = HashMap::new();
    let mut symbol_counts: HashMap<&Symbol, f64> = HashMap::new();

    for (idx, alignment) in alignments.iter().enumerate() {
        let weight = weights.map_or(1.0, |w| w[idx]);
        if weight == 0.0 {
            continue;
        }

        for (a1, a2) in alignment.iter() {
            *pair_counts.entry((a1, a2)).or_default() += weight;
            *pair_counts.entry((a2, a1)).or_default() += weight;
            *symbol_counts.entry(a1).or_default() += 2.0 * weight;
            *symbol_counts.entry(a2).or_default() += 2.0 * weight;
        }
    }

    let symbol_total: f64 = symbol_counts.values().sum();
    let pair_total: f64 = pair_counts.values().sum();
    let log_weight = 2.0 * symbol_total.ln() - pair_total.ln();

    let mut table = ScoreTable::new();
    for (&(a1, a2), &count) in pair_counts.iter() {
        if count <= 0.0 {
            return Err(PmiError::NonPositiveCount {
                first: a1.clone(),
                second: a2.clone(),
                count,
            });
        }

        let score = count.ln() - (symbol_counts[a1].ln() + symbol_counts[a2].ln()) + log_weight;
        table.insert(a1, a2, score);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ApproxEq;
    use assert2::{assert, check};

    fn alignment(pairs: &[(&str, &str)]) -> Alignment {
        Alignment::new(
            pairs
                .iter()
                .map(|(a, b)| (Symbol::from(*a), Symbol::from(*b)))
                .collect(),
        )
    }

    fn sample_alignments() -> Vec<Alignment> {
        vec![
            alignment(&[("h", "h"), ("a", "u"), ("n", "n"), ("d", "t")]),
            alignment(&[("d", "t"), ("a", "a"), ("g", "")]),
            alignment(&[("", "s"), ("a", "a"), ("n", "n")]),
            alignment(&[("k", "h"), ("a", "u")]),
        ]
    }

    #[test]
    fn test_self_alignment_baseline() -> anyhow::Result<()> {
        let table = estimate_pmi(&[alignment(&[("a", "a")])], None)?;
        let score = table.get(&Symbol::from("a"), &Symbol::from("a"));
        check!(score.approx_eq(Some(0.0)));
        check!(table.len() == 1);
        Ok(())
    }

    #[test]
    fn test_scores_are_symmetric() -> anyhow::Result<()> {
        let table = estimate_pmi(&sample_alignments(), None)?;
        for (a, b, score) in table.iter() {
            check!(table.get(b, a) == Some(score));
        }
        Ok(())
    }

    #[test]
    fn test_order_independence() -> anyhow::Result<()> {
        let alignments = sample_alignments();
        let mut reversed = alignments.clone();
        reversed.reverse();
        let mut rotated = alignments.clone();
        rotated.rotate_left(1);

        let table = estimate_pmi(&alignments, None)?;
        for other in [estimate_pmi(&reversed, None)?, estimate_pmi(&rotated, None)?] {
            check!(other.len() == table.len());
            for (a, b, score) in table.iter() {
                check!(other.get(a, b).approx_eq(Some(score)));
            }
        }
        Ok(())
    }

    #[test]
    fn test_known_pmi_value() -> anyhow::Result<()> {
        // counts: (a,a)=2, (a,b)=1, (b,a)=1; marginals: a=6, b=2
        let alignments = vec![alignment(&[("a", "a")]), alignment(&[("a", "b")])];
        let table = estimate_pmi(&alignments, None)?;

        let log_weight = 2.0 * 8.0f64.ln() - 4.0f64.ln();
        let expected = 1.0f64.ln() - 6.0f64.ln() - 2.0f64.ln() + log_weight;
        check!(table
            .get(&Symbol::from("a"), &Symbol::from("b"))
            .approx_eq(Some(expected)));
        Ok(())
    }

    #[test]
    fn test_uniform_weights_match_default() -> anyhow::Result<()> {
        let alignments = sample_alignments();
        let weights = vec![1.0; alignments.len()];
        check!(estimate_pmi(&alignments, Some(&weights))? == estimate_pmi(&alignments, None)?);
        Ok(())
    }

    #[test]
    fn test_zero_weight_alignment_is_ignored() -> anyhow::Result<()> {
        let alignments = sample_alignments();
        let weights = vec![1.0, 1.0, 1.0, 0.0];
        let weighted = estimate_pmi(&alignments, Some(&weights))?;
        let truncated = estimate_pmi(&alignments[..3], None)?;
        check!(weighted == truncated);
        check!(weighted.get(&Symbol::from("k"), &Symbol::from("h")) == None);
        Ok(())
    }

    #[test]
    fn test_invalid_weights() {
        let alignments = sample_alignments();
        let result = estimate_pmi(&alignments, Some(&[1.0]));
        assert!(let Err(PmiError::WeightCountMismatch { expected: 4, found: 1 }) = result);

        let result = estimate_pmi(&alignments, Some(&[1.0, -1.0, 1.0, 1.0]));
        assert!(let Err(PmiError::InvalidWeight { .. }) = result);

        let result = estimate_pmi(&alignments, Some(&[1.0, f64::NAN, 1.0, 1.0]));
        assert!(let Err(PmiError::InvalidWeight { .. }) = result);
    }

    #[test]
    fn test_empty_batch() -> anyhow::Result<()> {
        let table = estimate_pmi(&[], None)?;
        check!(table.is_empty());
        Ok(())
    }
}
