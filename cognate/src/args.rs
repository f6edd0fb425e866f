use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use libcognate::align::DEFAULT_GAP_EXTEND;
use libcognate::scoring::{EvidenceWeighting, DEFAULT_ALPHA};

use crate::pipeline::{AlignArgs, ScoreArgs};

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    #[command(about = "Estimate PMI sound correspondence scores from a word list")]
    Score(ScoreArgs),
    #[command(about = "Estimate scores, cluster cognates and align them along a guide tree")]
    Align(AlignArgs),
}

#[derive(Parser, Debug)]
#[command(name = "cognate")]
#[command(
    about = "Estimate PMI sound correspondences by online EM and align cognate sets along a guide tree"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: SubCommands,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// The number of threads that cognate will use
    #[arg(
        short = 't',
        long = "threads",
        default_value_t = 8usize,
        value_name = "n"
    )]
    pub num_threads: usize,

    /// Allow cognate to overwrite files
    #[arg(short = 'q', long = "allow-overwrite", default_value_t = false)]
    pub allow_overwrite: bool,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderFormat {
    /// IELex-style TSV, columns by position
    Ielex,
    /// CLDF-style form table with named columns
    Cldf,
    /// LingPy wordlist with named columns
    Lingpy,
}

impl ReaderFormat {
    /// Whether cognate ids of this format are unique across concepts.
    pub fn cross_semantic_cogids(&self) -> bool {
        match self {
            ReaderFormat::Ielex => false,
            ReaderFormat::Cldf | ReaderFormat::Lingpy => true,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightingArg {
    /// Every accepted alignment counts once
    #[default]
    Uniform,
    /// Accepted alignments count by their non-negative alignment score
    Score,
}

impl From<WeightingArg> for EvidenceWeighting {
    fn from(arg: WeightingArg) -> Self {
        match arg {
            WeightingArg::Uniform => EvidenceWeighting::Uniform,
            WeightingArg::Score => EvidenceWeighting::AlignmentScore,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Word list to read
    #[arg(value_name = "DATA.[tsv:csv]")]
    pub data_path: PathBuf,

    /// Data file format
    #[arg(long = "reader", value_enum, default_value_t = ReaderFormat::Ielex)]
    pub reader: ReaderFormat,

    /// The transcription column/convention (ASJP, IPA, or any column name)
    #[arg(long = "transcription", default_value = "ASJP", value_name = "NAME")]
    pub transcription: String,

    /// Treat cognate ids as unique across concepts [default: false for ielex, true otherwise]
    #[arg(long = "cross-semantic-cogids", value_name = "BOOL")]
    pub cross_semantic_cogids: Option<bool>,
}

#[derive(Args, Debug, Clone)]
pub struct EstimationArgs {
    /// Random seed
    #[arg(long = "seed", default_value_t = 1234u64, value_name = "N")]
    pub seed: u64,

    /// Maximum number of iterations
    #[arg(long = "max-iter", default_value_t = 15usize, value_name = "N")]
    pub max_iter: usize,

    /// Stop early once no score changes by more than this within an iteration
    #[arg(long = "tolerance", default_value_t = 0.001f64, value_name = "F")]
    pub tolerance: f64,

    /// Maximum number of word pairs to align in one updating step
    #[arg(long = "max-batch", default_value_t = 256usize, value_name = "N")]
    pub max_batch: usize,

    /// Step size reduction power alpha, 0.5 < alpha <= 1
    ///
    /// The smaller alpha, the larger the updates and the more quickly old
    /// sufficient statistics decay.
    #[arg(long = "alpha", default_value_t = DEFAULT_ALPHA, value_name = "F")]
    pub alpha: f64,

    /// Margin multiplier applied to alignment scores when screening pairs
    #[arg(long = "screen-margin", default_value_t = 0.79f64, value_name = "F")]
    pub screen_margin: f64,

    /// Re-selection margin: keep pairs scoring at least margin + margin * length
    #[arg(long = "margin", default_value_t = 1.0f64, value_name = "F")]
    pub margin: f64,

    /// How accepted alignments are weighted in the score update
    #[arg(long = "weighting", value_enum, default_value_t = WeightingArg::Uniform)]
    pub weighting: WeightingArg,

    /// Screen word pairs with local instead of global alignments
    #[arg(long = "local", action)]
    pub local: bool,

    /// Score of every gap position after the first
    #[arg(long = "gap-extend", default_value_t = DEFAULT_GAP_EXTEND, value_name = "F", allow_hyphen_values = true)]
    pub gap_extend: f64,

    /// Score of the first position of a gap [default: same as --gap-extend]
    #[arg(long = "gap-open", value_name = "F", allow_hyphen_values = true)]
    pub gap_open: Option<f64>,
}
