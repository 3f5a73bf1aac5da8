use crate::earley::Chart;
use crate::item::{Item, Tip};

/// Render a completed item as a bracketed tree, following backpointers
/// recursively into child items (spec.md §4.4, grounded in the original's
/// `pretty_print_item`).
///
/// `item` and `tip` must describe a complete item: `item.dot ==
/// item.rule.rhs.len() == tip.backpointers.len()`.
pub fn format(chart: &Chart, item: &Item, tip: &Tip) -> String {
    debug_assert_eq!(item.dot, item.rule.rhs.len());
    debug_assert_eq!(item.dot, tip.backpointers.len());

    let mut result = format!("( {}", item.rule.lhs);
    for (index, symbol) in item.rule.rhs.iter().enumerate() {
        if chart.grammar().is_nonterminal(symbol) {
            let (child_item, child_column) = tip.backpointers[index]
                .clone()
                .expect("nonterminal position must carry a backpointer");
            debug_assert_eq!(&child_item.rule.lhs, symbol);
            let child_tip = chart
                .column(child_column)
                .find_tip(&child_item)
                .expect("backpointer must resolve to a tip in its column")
                .clone();
            result.push(' ');
            result.push_str(&format(chart, &child_item, &child_tip));
        } else {
            result.push(' ');
            result.push_str(symbol.as_str());
        }
    }
    result.push(')');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use std::io::Write;

    fn grammar_from_text(text: &str, start_symbol: &str) -> Grammar {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        Grammar::load(file.path(), start_symbol).unwrap()
    }

    #[test]
    fn formats_a_flat_tree_of_terminals() {
        let grammar = grammar_from_text("1.0\tROOT\ta b\n", "ROOT");
        let tokens = vec!["a".to_string(), "b".to_string()];
        let mut chart = Chart::new(&grammar, &tokens);
        chart.run(false);
        let (item, tip) = chart.accepted().unwrap();
        assert_eq!(format(&chart, &item, &tip), "( ROOT a b)");
    }

    #[test]
    fn formats_nested_nonterminals() {
        let grammar = grammar_from_text("1.0\tROOT\tNP\n1.0\tNP\tn\n", "ROOT");
        let tokens = vec!["n".to_string()];
        let mut chart = Chart::new(&grammar, &tokens);
        chart.run(false);
        let (item, tip) = chart.accepted().unwrap();
        assert_eq!(format(&chart, &item, &tip), "( ROOT ( NP n))");
    }

    #[test]
    fn formats_multiple_nested_children_in_rhs_order() {
        let grammar = grammar_from_text(
            "1.0\tROOT\tA B\n1.0\tA\ta\n1.0\tB\tb\n",
            "ROOT",
        );
        let tokens = vec!["a".to_string(), "b".to_string()];
        let mut chart = Chart::new(&grammar, &tokens);
        chart.run(false);
        let (item, tip) = chart.accepted().unwrap();
        assert_eq!(format(&chart, &item, &tip), "( ROOT ( A a) ( B b))");
    }
}
