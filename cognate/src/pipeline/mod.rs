mod estimate;
pub use estimate::*;

mod pairs;
pub use pairs::*;

use std::io::{stderr, stdout, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use tracing::info;

use libcognate::align::NeedlemanWunsch;
use libcognate::cluster::{cluster_cognates, ClusteringRegistry, WordGraph};
use libcognate::multi_align::MultiAligner;
use libcognate::scoring::ScoreTable;
use libcognate::tree::GuideTree;

use crate::args::{CommonArgs, EstimationArgs, InputArgs};
use crate::io::{load_dataset, write_alignments, write_groups};
use crate::stats::{CountedValue, SerialTimed, Stats};
use crate::util::PathBufExt;

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Arguments that select and interpret the word list
    #[command(flatten)]
    pub input_args: InputArgs,

    /// Where to write the estimated score table (JSON)
    #[arg(short = 'o', long = "output", value_name = "PMI.json")]
    pub pmi_path: PathBuf,

    /// Arguments that control the online EM estimation
    #[command(flatten)]
    pub estimation_args: EstimationArgs,

    /// Arguments that are common across all cognate subcommands
    #[command(flatten)]
    pub common_args: CommonArgs,
}

#[derive(Debug, Args)]
pub struct AlignArgs {
    /// Arguments that select and interpret the word list
    #[command(flatten)]
    pub input_args: InputArgs,

    /// A Newick file whose first tree guides the multiple alignment
    #[arg(short = 'g', long = "guide-tree", value_name = "TREE.nwk")]
    pub guide_tree_path: PathBuf,

    /// Start from a previously estimated score table instead of bootstrapping
    #[arg(short = 'w', long = "warm-start", value_name = "PMI.json")]
    pub warm_start_path: Option<PathBuf>,

    /// The clustering method used to form cognate groups
    #[arg(short = 'm', long = "method", default_value = "labelprop", value_name = "NAME")]
    pub method: String,

    /// Where to place alignment output [default: stdout]
    #[arg(short = 'o', long = "output", value_name = "path")]
    pub alignments_path: Option<PathBuf>,

    /// Where to place the cognate group listing
    #[arg(long = "groups-output", value_name = "path")]
    pub groups_path: Option<PathBuf>,

    /// Where to write the estimated score table (JSON)
    #[arg(long = "pmidict", value_name = "PMI.json")]
    pub pmi_path: Option<PathBuf>,

    /// Arguments that control the online EM estimation
    #[command(flatten)]
    pub estimation_args: EstimationArgs,

    /// Arguments that are common across all cognate subcommands
    #[command(flatten)]
    pub common_args: CommonArgs,
}

fn write_summary(table: &ScoreTable, stats: &Stats) -> anyhow::Result<()> {
    let mut out = stderr().lock();
    writeln!(out, "{}", "highest scoring correspondences:".bold())?;
    for entry in table.most_common(10) {
        writeln!(
            out,
            "  {} {} {}",
            entry.first.to_string().green(),
            entry.second.to_string().green(),
            format!("{:.3}", entry.score).cyan()
        )?;
    }
    writeln!(out)?;
    stats.write(&mut out)
}

/// Estimate a score table and write it to disk.
pub fn score(args: &ScoreArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = EstimationConfig::from_args(&args.estimation_args)?;
    let mut writer = args.pmi_path.open(args.common_args.allow_overwrite)?;

    let mut stats = Stats::default();
    let now = Instant::now();
    let dataset = load_dataset(&args.input_args)?;
    stats.set_count(CountedValue::Forms, dataset.len());
    stats.set_serial_time(SerialTimed::Reading, now.elapsed());

    let now = Instant::now();
    let estimation = estimate(&dataset, &config, None, &mut stats)?;
    stats.set_serial_time(SerialTimed::Estimation, now.elapsed());

    let table = estimation.scorer.into_table();
    table.write_json(&mut writer)?;
    writer.flush().context("failed to write score table")?;
    info!(
        path = %args.pmi_path.to_string_lossy(),
        entries = table.len(),
        "wrote score table"
    );

    stats.set_serial_time(SerialTimed::Total, start.elapsed());
    write_summary(&table, &stats)
}

/// Estimate scores, cluster the accepted pairs into cognate groups and align
/// every group along the guide tree.
pub fn align(args: &AlignArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let allow_overwrite = args.common_args.allow_overwrite;

    let config = EstimationConfig::from_args(&args.estimation_args)?;
    let strategy = ClusteringRegistry::new(config.seed).get(&args.method)?;
    let tree = GuideTree::load(&args.guide_tree_path)?;
    let warm_start = args
        .warm_start_path
        .as_ref()
        .map(ScoreTable::load)
        .transpose()?;

    let mut alignments_writer: Box<dyn Write> = match &args.alignments_path {
        Some(path) => Box::new(path.open(allow_overwrite)?),
        None => Box::new(stdout().lock()),
    };
    let groups_writer = args
        .groups_path
        .as_ref()
        .map(|path| path.open(allow_overwrite))
        .transpose()?;
    let pmi_writer = args
        .pmi_path
        .as_ref()
        .map(|path| path.open(allow_overwrite))
        .transpose()?;

    let mut stats = Stats::default();
    let now = Instant::now();
    let dataset = load_dataset(&args.input_args)?;
    stats.set_count(CountedValue::Forms, dataset.len());
    stats.set_serial_time(SerialTimed::Reading, now.elapsed());

    let now = Instant::now();
    let estimation = estimate(&dataset, &config, warm_start, &mut stats)?;
    stats.set_serial_time(SerialTimed::Estimation, now.elapsed());

    let now = Instant::now();
    let graph = WordGraph::new(dataset.forms(), &estimation.pairs);
    let groups = cluster_cognates(&graph, strategy.as_ref());
    stats.set_count(CountedValue::CognateGroups, groups.len());
    stats.set_serial_time(SerialTimed::Clustering, now.elapsed());
    info!(
        method = strategy.name(),
        groups = groups.len(),
        edges = graph.edge_count(),
        "clustered cognates"
    );

    let now = Instant::now();
    let aligner = NeedlemanWunsch::default();
    let table = estimation.scorer.table();
    let alignments = MultiAligner::new(&aligner, table)
        .with_params(config.params.clone())
        .align(&groups, &tree);
    stats.set_serial_time(SerialTimed::MultiAlignment, now.elapsed());

    let written = write_alignments(&alignments, &mut alignments_writer)?;
    alignments_writer
        .flush()
        .context("failed to write alignments")?;
    stats.set_count(CountedValue::AlignedGroups, written);

    if let Some(writer) = groups_writer {
        write_groups(&groups, writer)?;
    }
    if let Some(mut writer) = pmi_writer {
        table.write_json(&mut writer)?;
        writer.flush().context("failed to write score table")?;
    }

    stats.set_serial_time(SerialTimed::Total, start.elapsed());
    write_summary(table, &stats)
}
