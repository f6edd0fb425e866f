use derive_builder::Builder;
use indicatif::ProgressBar;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use thiserror::Error;
use tracing::{debug, info};

use libcognate::align::{AlignMode, AlignParams, NeedlemanWunsch};
use libcognate::scoring::{DecayExponent, EvidenceWeighting, OnlineScorer, ScoreTable};
use libcognate::structs::WordPair;

use crate::args::EstimationArgs;
use crate::io::Dataset;
use crate::stats::{CountedValue, Stats};

use super::pairs::{candidate_pairs, reselect_pairs};

#[derive(Error, Debug)]
#[error("the batch size must be positive")]
pub struct EmptyBatchError;

#[derive(Builder, Clone, Debug)]
#[builder(default)]
pub struct EstimationConfig {
    pub seed: u64,
    pub max_iter: usize,
    pub tolerance: f64,
    pub max_batch: usize,
    pub alpha: DecayExponent,
    pub screen_margin: f64,
    pub margin: f64,
    pub weighting: EvidenceWeighting,
    pub mode: AlignMode,
    pub params: AlignParams,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            seed: 1234,
            max_iter: 15,
            tolerance: 0.001,
            max_batch: 256,
            alpha: DecayExponent::default(),
            screen_margin: 0.79,
            margin: 1.0,
            weighting: EvidenceWeighting::Uniform,
            mode: AlignMode::Global,
            params: AlignParams::default(),
        }
    }
}

impl EstimationConfig {
    /// Validate the estimation arguments. This runs before any data is read.
    pub fn from_args(args: &EstimationArgs) -> anyhow::Result<Self> {
        if args.max_batch == 0 {
            return Err(EmptyBatchError.into());
        }

        let config = EstimationConfigBuilder::default()
            .seed(args.seed)
            .max_iter(args.max_iter)
            .tolerance(args.tolerance)
            .max_batch(args.max_batch)
            .alpha(DecayExponent::new(args.alpha)?)
            .screen_margin(args.screen_margin)
            .margin(args.margin)
            .weighting(args.weighting.into())
            .mode(if args.local {
                AlignMode::Local
            } else {
                AlignMode::Global
            })
            .params(AlignParams {
                gap_open: args.gap_open,
                gap_extend: args.gap_extend,
                ..AlignParams::default()
            })
            .build()?;

        Ok(config)
    }
}

/// The outcome of an estimation run: the trained scorer and the word pairs
/// it accepted.
pub struct Estimation {
    pub scorer: OnlineScorer,
    pub pairs: Vec<WordPair>,
}

/// Screen `pairs` batch by batch, updating the scorer after every batch.
/// Discarded pairs are removed. Returns the number of discarded pairs.
fn run_pass(
    scorer: &mut OnlineScorer,
    aligner: &NeedlemanWunsch,
    pairs: &mut Vec<WordPair>,
    config: &EstimationConfig,
) -> anyhow::Result<usize> {
    let bar = ProgressBar::new(pairs.len() as u64);
    let mut kept = Vec::with_capacity(pairs.len());
    let mut discarded = 0;

    for chunk in pairs.chunks(config.max_batch) {
        let mut batch = chunk.to_vec();
        let outcome = scorer.align_pairs(aligner, &mut batch, config.mode)?;
        discarded += outcome.discarded;
        kept.extend(batch);
        bar.inc(chunk.len() as u64);
    }
    bar.finish_and_clear();

    *pairs = kept;
    Ok(discarded)
}

fn log_top_scores(table: &ScoreTable) {
    let top: Vec<String> = table
        .most_common(10)
        .iter()
        .map(|e| format!("{}:{}={:.2}", e.first, e.second, e.score))
        .collect();
    debug!(top = top.join(" "), "highest scoring symbol pairs");
}

/// Estimate PMI scores from the word list by online EM.
///
/// A first pass over surface-similar pairs bootstraps the table, unless a
/// warm-start table is given. The pairs the table then scores above the
/// margin are screened again for up to `max_iter - 1` iterations; the run
/// stops early once no score moves by `tolerance` or more in an iteration.
pub fn estimate(
    dataset: &Dataset,
    config: &EstimationConfig,
    warm_start: Option<ScoreTable>,
    stats: &mut Stats,
) -> anyhow::Result<Estimation> {
    let aligner = NeedlemanWunsch::default();
    let mut rng = Pcg64::seed_from_u64(config.seed);

    let mut scorer = match warm_start {
        Some(table) => {
            info!(entries = table.len(), "starting from a previously estimated table");
            OnlineScorer::with_table(table, config.alpha, config.screen_margin)
        }
        None => OnlineScorer::new(config.alpha, config.screen_margin),
    }
    .with_weighting(config.weighting)
    .with_params(config.params.clone());

    if scorer.table().is_empty() {
        let mut pairs = candidate_pairs(dataset);
        stats.set_count(CountedValue::CandidatePairs, pairs.len());
        info!(pairs = pairs.len(), "bootstrapping scores from similar word pairs");

        pairs.shuffle(&mut rng);
        let discarded = run_pass(&mut scorer, &aligner, &mut pairs, config)?;
        stats.set_count(CountedValue::BootstrapDiscarded, discarded);
        info!(
            accepted = pairs.len(),
            discarded,
            updates = scorer.n_updates(),
            "bootstrap pass done"
        );
        log_top_scores(scorer.table());
    }

    let mut pairs = reselect_pairs(dataset, &aligner, scorer.table(), scorer.params(), config.margin);
    stats.set_count(CountedValue::ReselectedPairs, pairs.len());
    info!(pairs = pairs.len(), "re-selected word pairs");

    for iteration in 1..config.max_iter {
        let previous = scorer.table().clone();
        pairs.shuffle(&mut rng);
        let discarded = run_pass(&mut scorer, &aligner, &mut pairs, config)?;
        let change = scorer.table().max_abs_change(&previous);

        stats.increment_count(CountedValue::Iterations);
        stats.add_count(CountedValue::IterationDiscarded, discarded);
        info!(
            iteration,
            accepted = pairs.len(),
            discarded,
            updates = scorer.n_updates(),
            change,
            "iteration done"
        );
        log_top_scores(scorer.table());

        if change < config.tolerance {
            info!(iteration, "scores converged");
            break;
        }
    }

    stats.set_count(CountedValue::AcceptedPairs, pairs.len());
    stats.set_count(CountedValue::TableUpdates, scorer.n_updates());
    Ok(Estimation { scorer, pairs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{ReaderFormat, WeightingArg};
    use crate::io::{read_dataset, Transcription};
    use assert2::{assert, check};

    const DATA: &str = "\
DOCULECT\tCONCEPT\tASJP\tCOGID
German\thand\thant\t1
Dutch\thand\thant\t1
English\thand\thEnd\t1
Latin\thand\tmanus\t2
German\tfoot\tfus\t3
Dutch\tfoot\tvut\t3
English\tfoot\tfut\t3
Latin\tfoot\tpes\t4
German\tmouse\tmaus\t5
Dutch\tmouse\tmuis\t5
English\tmouse\tmaus\t5
Latin\tmouse\tmus\t5
";

    fn dataset() -> anyhow::Result<Dataset> {
        read_dataset(
            DATA.as_bytes(),
            ReaderFormat::Lingpy,
            b'\t',
            &Transcription::Asjp,
            true,
        )
    }

    fn args() -> EstimationArgs {
        EstimationArgs {
            seed: 1234,
            max_iter: 4,
            tolerance: 0.001,
            max_batch: 2,
            alpha: 0.75,
            screen_margin: 0.79,
            margin: 1.0,
            weighting: WeightingArg::Uniform,
            local: false,
            gap_extend: -1.75,
            gap_open: None,
        }
    }

    #[test]
    fn test_config_validation() -> anyhow::Result<()> {
        let mut bad_alpha = args();
        bad_alpha.alpha = 0.4;
        assert!(EstimationConfig::from_args(&bad_alpha).is_err());

        let mut bad_batch = args();
        bad_batch.max_batch = 0;
        assert!(EstimationConfig::from_args(&bad_batch).is_err());

        let mut gapped = args();
        gapped.gap_open = Some(-4.0);
        gapped.gap_extend = -1.0;
        let config = EstimationConfig::from_args(&gapped)?;
        check!(config.params.gap_open == Some(-4.0));
        check!(config.params.gap_extend == -1.0);
        check!(config.params.default_score == -1.75);

        let mut local = args();
        local.local = true;
        assert!(let Ok(EstimationConfig { mode: AlignMode::Local, .. }) = EstimationConfig::from_args(&local));
        Ok(())
    }

    #[test]
    fn test_estimate() -> anyhow::Result<()> {
        let dataset = dataset()?;
        let config = EstimationConfig::from_args(&args())?;
        let mut stats = Stats::default();
        let estimation = estimate(&dataset, &config, None, &mut stats)?;

        check!(!estimation.scorer.table().is_empty());
        check!(estimation.scorer.n_updates() > 0);
        check!(!estimation.pairs.is_empty());
        check!(stats.counted_value(CountedValue::CandidatePairs) > 0);
        for pair in &estimation.pairs {
            check!(pair.first.concept == pair.second.concept);
        }
        for (a, b, score) in estimation.scorer.table().iter() {
            check!(estimation.scorer.table().get(b, a) == Some(score));
        }
        Ok(())
    }

    #[test]
    fn test_estimate_is_reproducible() -> anyhow::Result<()> {
        let dataset = dataset()?;
        let config = EstimationConfig::from_args(&args())?;
        let first = estimate(&dataset, &config, None, &mut Stats::default())?;
        let second = estimate(&dataset, &config, None, &mut Stats::default())?;

        check!(first.pairs == second.pairs);
        check!(first.scorer.table().max_abs_change(second.scorer.table()) < 1e-9);
        Ok(())
    }

    #[test]
    fn test_warm_start_skips_bootstrap() -> anyhow::Result<()> {
        let dataset = dataset()?;
        let config = EstimationConfig::from_args(&args())?;
        let first = estimate(&dataset, &config, None, &mut Stats::default())?;

        let mut stats = Stats::default();
        let warm = estimate(
            &dataset,
            &config,
            Some(first.scorer.into_table()),
            &mut stats,
        )?;
        check!(stats.counted_value(CountedValue::CandidatePairs) == 0);
        check!(!warm.scorer.table().is_empty());
        Ok(())
    }
}
