use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use wparse::agenda::TipUpdatePolicy;
use wparse::cli::Args;
use wparse::earley::Chart;
use wparse::error::CliError;
use wparse::grammar::Grammar;
use wparse::sentence;
use wparse::tree;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("wparse: {error}");
            ExitCode::from(error.exit_code() as u8)
        }
    }
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), CliError> {
    let grammar = Grammar::load(&args.grammar, &args.start_symbol)?;
    info!(grammar = %args.grammar.display(), start_symbol = %args.start_symbol, "loaded grammar");
    for rule in grammar.unreachable_rules() {
        warn!(rule = %rule, "rule is never reachable from the start symbol");
    }
    let sentences = sentence::load(&args.sentences)?;
    info!(sentences = %args.sentences.display(), count = sentences.len(), "loaded sentences");

    for tokens in &sentences {
        debug!(sentence = ?tokens, "parsing sentence");
        print_parse(&grammar, tokens, args.progress);
    }

    Ok(())
}

fn print_parse(grammar: &Grammar, tokens: &[String], progress: bool) {
    let mut chart = Chart::new(grammar, tokens).with_policy(TipUpdatePolicy::default());
    chart.run(progress);
    match chart.accepted() {
        None => {
            info!(sentence = ?tokens, "rejected");
            println!("NONE");
        }
        Some((item, tip)) => {
            info!(sentence = ?tokens, weight = tip.weight, "accepted");
            println!("{}", tree::format(&chart, &item, &tip));
            println!("{:.6}", tip.weight);
        }
    }
}
