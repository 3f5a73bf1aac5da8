use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::symbol::Symbol;

/// An immutable grammar rule `lhs -> rhs` carrying an additive weight
/// `-log2(p)`. Rules are value-equal by all three fields (spec.md §3); the
/// weight is always derived deterministically from the grammar file's
/// probability field and never recomputed, so bitwise `f64` comparison
/// (rather than the usual float tolerance) is safe here and lets `Rule`
/// implement `Eq`/`Hash` for use as (part of) an `Item` key.
#[derive(Debug, Clone)]
pub struct Rule {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub weight: f64,
}

impl Rule {
    pub fn new(lhs: Symbol, rhs: Vec<Symbol>, weight: f64) -> Self {
        Self { lhs, rhs, weight }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs && self.weight.to_bits() == other.weight.to_bits()
    }
}

impl Eq for Rule {}

impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lhs.hash(state);
        self.rhs.hash(state);
        self.weight.to_bits().hash(state);
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {symbol}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("{path}:{line}: expected 3 tab-separated fields (probability, lhs, rhs), found {found}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        found: usize,
    },
    #[error("{path}:{line}: probability {text:?} is not a number")]
    InvalidProbability {
        path: PathBuf,
        line: usize,
        text: String,
    },
    #[error("{path}:{line}: probability {value} is not in (0, 1]")]
    ProbabilityOutOfRange {
        path: PathBuf,
        line: usize,
        value: f64,
    },
    #[error("start symbol {symbol:?} has no expansions")]
    UnknownStartSymbol { symbol: String },
    #[error("could not read grammar file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Maps each nonterminal to the ordered collection of rules that expand it
/// (spec.md §4.1).
#[derive(Debug, Default)]
pub struct Grammar {
    expansions: HashMap<Symbol, Vec<Rc<Rule>>>,
    start_symbol: Symbol,
}

impl Grammar {
    /// Load a `.gr` file: one rule per line, `probability \t lhs \t rhs...`,
    /// `#` introduces an end-of-line comment, blank lines are ignored
    /// (spec.md §6.1).
    pub fn load(path: &Path, start_symbol: &str) -> Result<Self, GrammarError> {
        let text = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut grammar = Grammar {
            expansions: HashMap::new(),
            start_symbol: Symbol::new(start_symbol),
        };
        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = match raw_line.split('#').next() {
                Some(before_comment) => before_comment.trim_end(),
                None => raw_line,
            };
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 {
                return Err(GrammarError::MalformedLine {
                    path: path.to_path_buf(),
                    line: line_number,
                    found: fields.len(),
                });
            }
            let probability: f64 =
                fields[0]
                    .trim()
                    .parse()
                    .map_err(|_| GrammarError::InvalidProbability {
                        path: path.to_path_buf(),
                        line: line_number,
                        text: fields[0].to_string(),
                    })?;
            if !(probability > 0.0 && probability <= 1.0) {
                return Err(GrammarError::ProbabilityOutOfRange {
                    path: path.to_path_buf(),
                    line: line_number,
                    value: probability,
                });
            }
            let lhs = Symbol::new(fields[1].trim());
            let rhs: Vec<Symbol> = fields[2].split_whitespace().map(Symbol::new).collect();
            let weight = -probability.log2();
            let rule = Rc::new(Rule::new(lhs.clone(), rhs, weight));
            grammar.expansions.entry(lhs).or_default().push(rule);
        }
        if !grammar.expansions.contains_key(&grammar.start_symbol) {
            return Err(GrammarError::UnknownStartSymbol {
                symbol: grammar.start_symbol.to_string(),
            });
        }
        Ok(grammar)
    }

    pub fn start_symbol(&self) -> &Symbol {
        &self.start_symbol
    }

    /// Ordered collection of rules with the given lhs. Empty if `lhs` has no
    /// expansions (spec.md §4.1 leaves this undefined for unknown lhs; we
    /// choose the harmless empty-iterator behavior since callers only ever
    /// call this after checking `is_nonterminal`).
    pub fn expansions(&self, lhs: &Symbol) -> &[Rc<Rule>] {
        self.expansions
            .get(lhs)
            .map(|rules| rules.as_slice())
            .unwrap_or(&[])
    }

    /// True iff `symbol` appears as the left-hand side of some rule.
    pub fn is_nonterminal(&self, symbol: &Symbol) -> bool {
        self.expansions.contains_key(symbol)
    }

    /// Rules whose lhs is never reached by expanding the start symbol
    /// (SPEC_FULL.md §6.5: warned about, not rejected).
    pub fn unreachable_rules(&self) -> Vec<Rc<Rule>> {
        let mut reachable: HashSet<Symbol> = HashSet::new();
        let mut queue: VecDeque<Symbol> = VecDeque::new();
        reachable.insert(self.start_symbol.clone());
        queue.push_back(self.start_symbol.clone());
        while let Some(lhs) = queue.pop_front() {
            for rule in self.expansions(&lhs) {
                for symbol in &rule.rhs {
                    if self.is_nonterminal(symbol) && reachable.insert(symbol.clone()) {
                        queue.push_back(symbol.clone());
                    }
                }
            }
        }
        self.expansions
            .iter()
            .filter(|(lhs, _)| !reachable.contains(lhs))
            .flat_map(|(_, rules)| rules.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn grammar_from_text(text: &str, start_symbol: &str) -> Result<Grammar, GrammarError> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        Grammar::load(file.path(), start_symbol)
    }

    #[test]
    fn loads_rules_and_computes_weight() {
        let grammar = grammar_from_text("1.0\tROOT\tS\n1.0\tS\ta\n", "ROOT").unwrap();
        let root = Symbol::new("ROOT");
        let s = Symbol::new("S");
        assert_eq!(grammar.expansions(&root).len(), 1);
        assert_eq!(grammar.expansions(&root)[0].weight, 0.0);
        assert!(grammar.is_nonterminal(&root));
        assert!(grammar.is_nonterminal(&s));
        assert!(!grammar.is_nonterminal(&Symbol::new("a")));
    }

    #[test]
    fn strips_comments_and_skips_blank_lines() {
        let grammar = grammar_from_text(
            "# a comment line\n\n1.0\tROOT\tS # trailing comment\n1.0\tS\ta\n",
            "ROOT",
        )
        .unwrap();
        assert_eq!(grammar.expansions(&Symbol::new("ROOT")).len(), 1);
    }

    #[test]
    fn rejects_zero_probability() {
        let err = grammar_from_text("0.0\tROOT\tS\n1.0\tS\ta\n", "ROOT").unwrap_err();
        assert!(matches!(err, GrammarError::ProbabilityOutOfRange { .. }));
    }

    #[test]
    fn rejects_probability_above_one() {
        let err = grammar_from_text("1.5\tROOT\tS\n", "ROOT").unwrap_err();
        assert!(matches!(err, GrammarError::ProbabilityOutOfRange { .. }));
    }

    #[test]
    fn rejects_malformed_line() {
        let err = grammar_from_text("1.0\tROOT\n", "ROOT").unwrap_err();
        assert!(matches!(err, GrammarError::MalformedLine { .. }));
    }

    #[test]
    fn rejects_non_numeric_probability() {
        let err = grammar_from_text("p\tROOT\tS\n", "ROOT").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidProbability { .. }));
    }

    #[test]
    fn rejects_unknown_start_symbol() {
        let err = grammar_from_text("1.0\tS\ta\n", "ROOT").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownStartSymbol { .. }));
    }

    #[test]
    fn multiple_rules_share_a_lhs_in_push_order() {
        let grammar =
            grammar_from_text("1.0\tROOT\tA\n0.25\tA\tB\n0.75\tA\tC\n1.0\tB\tx\n1.0\tC\tx\n", "ROOT")
                .unwrap();
        let a = Symbol::new("A");
        let rules = grammar.expansions(&a);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].rhs, vec![Symbol::new("B")]);
        assert_eq!(rules[1].rhs, vec![Symbol::new("C")]);
    }

    #[test]
    fn unreachable_rules_finds_nonterminals_never_expanded_from_start() {
        let grammar =
            grammar_from_text("1.0\tROOT\ta\n1.0\tDEAD\tb\n", "ROOT").unwrap();
        let unreachable = grammar.unreachable_rules();
        assert_eq!(unreachable.len(), 1);
        assert_eq!(unreachable[0].lhs, Symbol::new("DEAD"));
    }

    #[test]
    fn unreachable_rules_is_empty_when_everything_is_reachable() {
        let grammar = grammar_from_text("1.0\tROOT\tS\n1.0\tS\ta\n", "ROOT").unwrap();
        assert!(grammar.unreachable_rules().is_empty());
    }
}
