use rayon::prelude::*;

use libcognate::align::{AlignMode, AlignParams, NeedlemanWunsch, PairwiseAligner};
use libcognate::distance::normalized_levenshtein;
use libcognate::scoring::ScoreTable;
use libcognate::structs::WordPair;

use crate::io::Dataset;

/// The largest normalized edit distance of a bootstrap candidate pair.
pub const MAX_CANDIDATE_DISTANCE: f64 = 0.5;

/// Every unordered pair of forms expressing the same concept.
pub fn concept_pairs(dataset: &Dataset) -> Vec<WordPair> {
    let mut pairs = vec![];
    for forms in dataset.forms_by_concept.values() {
        for (idx, first) in forms.iter().enumerate() {
            for second in &forms[idx + 1..] {
                pairs.push(WordPair::new(first.clone(), second.clone()));
            }
        }
    }
    pairs
}

/// Same-concept pairs that are already similar on the surface.
pub fn candidate_pairs(dataset: &Dataset) -> Vec<WordPair> {
    concept_pairs(dataset)
        .into_iter()
        .filter(|pair| {
            normalized_levenshtein(&pair.first.symbols, &pair.second.symbols)
                <= MAX_CANDIDATE_DISTANCE
        })
        .collect()
}

/// Same-concept pairs whose global alignment under `table` scores at least
/// `margin + margin * alignment_length`.
pub fn reselect_pairs(
    dataset: &Dataset,
    aligner: &NeedlemanWunsch,
    table: &ScoreTable,
    params: &AlignParams,
    margin: f64,
) -> Vec<WordPair> {
    let params = params.with_mode(AlignMode::Global);
    concept_pairs(dataset)
        .into_par_iter()
        .filter(|pair| {
            let result = aligner.align(&pair.first.symbols, &pair.second.symbols, table, &params);
            result.score >= margin + margin * result.columns.len() as f64
        })
        .collect()
}
