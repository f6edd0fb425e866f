mod args;
mod io;
mod pipeline;
mod stats;
mod util;

use args::{Cli, SubCommands};
use pipeline::{align, score};
use util::{init_logging, set_threads};

use clap::Parser;

#[cfg(test)]
#[ctor::ctor]
fn init_backtrace() {
    color_backtrace::install();
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        SubCommands::Score(args) => {
            init_logging(args.common_args.verbose);
            set_threads(args.common_args.num_threads)?;
            score(&args)?;
        }
        SubCommands::Align(args) => {
            init_logging(args.common_args.verbose);
            set_threads(args.common_args.num_threads)?;
            align(&args)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_align_defaults() {
        let cli = Cli::try_parse_from(["cognate", "align", "data.tsv", "--guide-tree", "tree.nwk"]);
        let_assert!(Ok(Cli { command: SubCommands::Align(args) }) = cli);
        check!(args.method == "labelprop");
        check!(args.alignments_path == None);
        check!(args.estimation_args.seed == 1234);
        check!(args.estimation_args.max_iter == 15);
        check!(args.estimation_args.max_batch == 256);
        check!(args.estimation_args.alpha == 0.75);
        check!(args.estimation_args.screen_margin == 0.79);
        check!(args.input_args.reader == args::ReaderFormat::Ielex);
        check!(args.input_args.cross_semantic_cogids == None);
        check!(args.estimation_args.gap_extend == -1.75);
        check!(args.estimation_args.gap_open == None);
    }

    #[test]
    fn test_negative_gap_scores_parse() {
        let cli = Cli::try_parse_from([
            "cognate", "score", "data.tsv", "-o", "pmi.json", "--gap-open", "-3.5", "--gap-extend", "-1",
        ]);
        let_assert!(Ok(Cli { command: SubCommands::Score(args) }) = cli);
        check!(args.estimation_args.gap_open == Some(-3.5));
        check!(args.estimation_args.gap_extend == -1.0);
    }

    #[test]
    fn test_score_requires_output() {
        check!(Cli::try_parse_from(["cognate", "score", "data.tsv"]).is_err());
        check!(Cli::try_parse_from(["cognate", "score", "data.tsv", "-o", "pmi.json"]).is_ok());
        check!(Cli::try_parse_from(["cognate", "score", "data.tsv", "-o", "x", "--reader", "nope"]).is_err());
    }
}
