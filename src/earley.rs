use std::rc::Rc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::agenda::{Column, TipUpdatePolicy};
use crate::grammar::Grammar;
use crate::item::{Item, Tip};
use crate::symbol::Symbol;

/// A weighted Earley chart over one sentence: one [`Column`] per token
/// boundary, `columns.len() == tokens.len() + 1` (spec.md §4).
pub struct Chart<'g> {
    grammar: &'g Grammar,
    tokens: Vec<Symbol>,
    columns: Vec<Column>,
    policy: TipUpdatePolicy,
    predict_count: u64,
    scan_count: u64,
    attach_count: u64,
}

impl<'g> Chart<'g> {
    pub fn new(grammar: &'g Grammar, tokens: &[String]) -> Self {
        let tokens: Vec<Symbol> = tokens.iter().map(|t| Symbol::new(t)).collect();
        let columns = (0..=tokens.len()).map(|_| Column::new()).collect();
        Chart {
            grammar,
            tokens,
            columns,
            policy: TipUpdatePolicy::default(),
            predict_count: 0,
            scan_count: 0,
            attach_count: 0,
        }
    }

    pub fn with_policy(mut self, policy: TipUpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run PREDICT/SCAN/ATTACH to a fixed point, column by column
    /// (spec.md §4.3). `progress` shows a column-level progress bar for this
    /// sentence's parse, mirroring the original's
    /// `tqdm.tqdm(enumerate(self.cols), ...)` (SPEC_FULL.md §2, §6.3).
    pub fn run(&mut self, progress: bool) {
        let root = self.grammar.start_symbol().clone();
        for rule in self.grammar.expansions(&root) {
            let item = Item::new(Rc::clone(rule), 0, 0);
            self.columns[0].push(item.clone());
            self.columns[0].update_tip(&item, Tip::predicted(&item), self.policy);
        }

        let bar = progress.then(|| {
            let bar = ProgressBar::new(self.columns.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} columns")
                    .expect("static progress template is valid"),
            );
            bar
        });

        for index in 0..self.columns.len() {
            debug!(column = index, "entering column");
            loop {
                let Some(item) = self.columns[index].pop() else {
                    break;
                };
                if item.is_complete() {
                    self.attach(index, &item);
                } else {
                    match item.next_symbol() {
                        Some(symbol) if self.grammar.is_nonterminal(symbol) => {
                            self.predict(index, &item, symbol.clone())
                        }
                        Some(symbol) => self.scan(index, &item, symbol.clone()),
                        None => unreachable!("next_symbol is None only when is_complete is true"),
                    }
                }
            }
            debug!(column = index, "leaving column");
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        debug!(
            predictions = self.predict_count,
            scans = self.scan_count,
            attaches = self.attach_count,
            "chart construction complete"
        );
    }

    /// For a non-complete item whose next symbol is a nonterminal, add one
    /// item per expansion of that nonterminal, dot at zero, starting at the
    /// current column (spec.md §4.3 PREDICT).
    fn predict(&mut self, index: usize, item: &Item, symbol: Symbol) {
        for rule in self.grammar.expansions(&symbol) {
            let predicted = Item::new(Rc::clone(rule), 0, index);
            self.columns[index].push(predicted.clone());
            let tip = Tip::predicted(&predicted);
            // Move-down is not performed for PREDICT (spec.md §4.3): the
            // installed weight is always the rule's own baseline, which
            // cannot improve on a tip an ATTACH has already produced.
            self.columns[index].update_tip(&predicted, tip, self.policy);
            self.predict_count += 1;
        }
        debug!(column = index, rule = %item.rule, "PREDICT");
    }

    /// For a non-complete item whose next symbol is a terminal, if it
    /// matches the token at `index`, advance the dot into the next column
    /// (spec.md §4.3 SCAN).
    fn scan(&mut self, index: usize, item: &Item, symbol: Symbol) {
        let Some(token) = self.tokens.get(index) else {
            return;
        };
        if *token != symbol {
            return;
        }
        let current_tip = self.columns[index]
            .find_tip(item)
            .expect("scanned item must have a tip")
            .clone();
        let advanced = item.advance();
        let next = index + 1;
        self.columns[next].push(advanced.clone());
        let tip = Tip::scanned(&current_tip);
        // Move-down is not performed for SCAN (spec.md §4.3).
        self.columns[next].update_tip(&advanced, tip, self.policy);
        self.scan_count += 1;
        debug!(from = index, to = next, rule = %item.rule, "SCAN");
    }

    /// For a complete item with start column `start`, find every customer in
    /// column `start` waiting on `item.rule.lhs` and advance it into the
    /// current column (spec.md §4.3 ATTACH).
    fn attach(&mut self, index: usize, item: &Item) {
        let child_weight = self.columns[index]
            .find_tip(item)
            .expect("complete item must have a tip")
            .weight;
        let lhs = item.rule.lhs.clone();
        let mid = item.start;
        // Scan the start column's customer list live, re-checking its
        // length on every step, rather than over a snapshot taken up front.
        // When `mid == index` (a zero-width/nullable completion, spec.md §9),
        // advancing one customer can push another customer still waiting on
        // `item.rule.lhs` into this very column mid-scan (e.g. `B -> A A`
        // with `A` nulling at the same column); a snapshot would never see
        // it and the derivation would be silently dropped.
        let mut i = 0;
        while i < self.columns[mid].len() {
            let customer = self.columns[mid].item_at(i);
            i += 1;
            if customer.is_complete() {
                continue;
            }
            if customer.next_symbol() != Some(&lhs) {
                continue;
            }
            let customer_tip = self.columns[mid]
                .find_tip(&customer)
                .expect("pushed item must have a tip")
                .clone();
            let advanced = customer.advance();
            let candidate = Tip::attached(&customer_tip, item.clone(), child_weight, index);
            let is_new = !self.columns[index].push(advanced.clone());
            let improved = self.columns[index].update_tip(&advanced, candidate, self.policy);
            if !is_new && improved {
                self.columns[index].move_down(&advanced);
            }
            self.attach_count += 1;
        }
        debug!(column = index, rule = %item.rule, start = item.start, "ATTACH");
    }

    /// The minimum-weight item spanning the whole sentence rooted at the
    /// grammar's start symbol, if any (spec.md §4.4).
    pub fn accepted(&self) -> Option<(Item, Tip)> {
        let last = self.columns.len() - 1;
        let root = self.grammar.start_symbol();
        self.columns[last]
            .all()
            .into_iter()
            .filter(|item| item.is_complete() && item.start == 0 && &item.rule.lhs == root)
            .filter_map(|item| {
                let tip = self.columns[last].find_tip(&item)?.clone();
                Some((item, tip))
            })
            .min_by(|(_, a), (_, b)| {
                a.weight
                    .partial_cmp(&b.weight)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn grammar(&self) -> &Grammar {
        self.grammar
    }
}
