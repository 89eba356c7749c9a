use std::fmt::Display;

use itertools::Itertools;

use crate::aligner::alignment::IndexPair;

/// Render a token alignment as three lines: source tokens, a match line
/// (`|` for equal tokens, `*` for mismatches) and target tokens. Gaps are
/// shown as `-`. Columns are padded to the widest token, trailing whitespace
/// is trimmed.
pub fn print_alignment<T>(source: &[T], target: &[T], aln: &[IndexPair]) -> String
where
    T: Display + PartialEq,
{
    let columns: Vec<(String, &str, String)> = aln.iter()
        .map(|pair| match (pair.source, pair.target) {
            (Some(s), Some(t)) => {
                let op = if source[s] == target[t] { "|" } else { "*" };
                (source[s].to_string(), op, target[t].to_string())
            },
            (Some(s), None) => (source[s].to_string(), " ", "-".to_string()),
            (None, Some(t)) => ("-".to_string(), " ", target[t].to_string()),
            (None, None) => ("-".to_string(), " ", "-".to_string()),
        })
        .collect();

    let widths: Vec<usize> = columns.iter()
        .map(|(s, _, t)| s.len().max(t.len()))
        .collect();

    let source_line = columns.iter().zip(&widths)
        .map(|((s, _, _), w)| format!("{s:>w$}"))
        .join(" ");
    let op_line = columns.iter().zip(&widths)
        .map(|((_, op, _), w)| format!("{op:>w$}"))
        .join(" ");
    let target_line = columns.iter().zip(&widths)
        .map(|((_, _, t), w)| format!("{t:>w$}"))
        .join(" ");

    format!("{}\n{}\n{}", source_line.trim_end(), op_line.trim_end(), target_line.trim_end())
}
