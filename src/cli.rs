use std::path::PathBuf;

use clap::Parser;

/// Weighted Earley recognizer/parser for probabilistic context-free
/// grammars.
#[derive(Debug, Parser)]
#[command(name = "wparse", version, about)]
pub struct Args {
    /// Path to the tab-delimited weighted grammar file.
    pub grammar: PathBuf,

    /// Path to the file of whitespace-tokenized sentences to parse.
    pub sentences: PathBuf,

    /// Grammar symbol every sentence must derive.
    #[arg(short = 's', long = "start-symbol", default_value = "ROOT")]
    pub start_symbol: String,

    /// Show a progress bar over the sentences being parsed.
    #[arg(long)]
    pub progress: bool,

    /// Emit debug-level logging.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only emit warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// The `tracing` level implied by the verbosity flags (spec.md §6.3).
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_positionals_with_defaults() {
        let args = Args::parse_from(["wparse", "g.gr", "s.sen"]);
        assert_eq!(args.grammar, PathBuf::from("g.gr"));
        assert_eq!(args.sentences, PathBuf::from("s.sen"));
        assert_eq!(args.start_symbol, "ROOT");
        assert!(!args.progress);
        assert_eq!(args.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn verbose_and_quiet_are_mutually_exclusive() {
        let result = Args::try_parse_from(["wparse", "g.gr", "s.sen", "-v", "-q"]);
        assert!(result.is_err());
    }

    #[test]
    fn verbose_selects_debug_level() {
        let args = Args::parse_from(["wparse", "g.gr", "s.sen", "--verbose"]);
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn quiet_selects_warn_level() {
        let args = Args::parse_from(["wparse", "g.gr", "s.sen", "--quiet"]);
        assert_eq!(args.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn custom_start_symbol_overrides_default() {
        let args = Args::parse_from(["wparse", "g.gr", "s.sen", "-s", "SIGMA"]);
        assert_eq!(args.start_symbol, "SIGMA");
    }
}
