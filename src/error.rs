use crate::grammar::GrammarError;
use crate::sentence::SentenceError;

/// Top-level CLI error, carrying enough information for `main` to pick an
/// exit code (spec.md §6.3) the way the teacher's generator binaries match
/// their own error enums to `std::process::exit` codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Sentences(#[from] SentenceError),
}

impl CliError {
    /// Process exit code for this error (spec.md §6.3).
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Grammar(GrammarError::Io { .. }) => 2,
            CliError::Grammar(GrammarError::UnknownStartSymbol { .. }) => 4,
            CliError::Grammar(_) => 3,
            CliError::Sentences(SentenceError::Io { .. }) => 2,
        }
    }
}
