//! Heuristic table reconstruction from OCR line output.
//!
//! OCR output from a screenshot of a rendered table is column-delimited only
//! by variable whitespace — there is no pixel-level column detection here.
//! The heuristic: a run of 2+ consecutive lines that split into the same
//! number of whitespace-separated tokens (2 or more) is treated as a table
//! block; its first line becomes `Headers:` and the rest `Row N:`,
//! 1-indexed per block. Lines outside any block pass through verbatim, in
//! their original order. If no line ever reaches the two-consecutive
//! condition, the whole text is emitted unframed.
//!
//! This is a best-effort textual heuristic, not a layout engine. It sits
//! behind [`TableReconstructor`] so a stronger layout-aware strategy can
//! replace it without changing any other component's contract.

/// What the reconstructor made of the recognized lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconstruction {
    /// At least one tabular block was found; the text carries
    /// `Headers:`/`Row N:` framing (with any non-tabular lines verbatim).
    Table(String),
    /// Nothing looked tabular; the text is the raw recognized lines.
    Plain(String),
}

/// A replaceable line-to-table strategy.
pub trait TableReconstructor: Send + Sync {
    fn reconstruct(&self, lines: &[String]) -> Reconstruction;
}

/// The default consecutive-equal-column-count heuristic.
pub struct ColumnHeuristic;

impl TableReconstructor for ColumnHeuristic {
    fn reconstruct(&self, lines: &[String]) -> Reconstruction {
        // Collapse runs of whitespace within each line up front; token counts
        // and the rendered cells both come from the same split.
        let tokenized: Vec<Vec<&str>> =
            lines.iter().map(|l| l.split_whitespace().collect()).collect();

        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut found_table = false;
        let mut i = 0;

        while i < tokenized.len() {
            let cols = tokenized[i].len();
            let mut run = 1;
            if cols >= 2 {
                while i + run < tokenized.len() && tokenized[i + run].len() == cols {
                    run += 1;
                }
            }

            if cols >= 2 && run >= 2 {
                found_table = true;
                out.push(format!("Headers: {}", tokenized[i].join(" ")));
                for (n, row) in tokenized[i + 1..i + run].iter().enumerate() {
                    out.push(format!("Row {}: {}", n + 1, row.join(" ")));
                }
                i += run;
            } else {
                if !tokenized[i].is_empty() {
                    out.push(tokenized[i].join(" "));
                }
                i += 1;
            }
        }

        if found_table {
            Reconstruction::Table(out.join("\n"))
        } else {
            Reconstruction::Plain(
                lines
                    .iter()
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    fn reconstruct(v: &[&str]) -> Reconstruction {
        ColumnHeuristic.reconstruct(&lines(v))
    }

    #[test]
    fn three_column_table() {
        let result = reconstruct(&[
            "Team FTE Revenue",
            "TeamA 4.3 575K",
            "TeamB 2.8 195K",
        ]);
        let Reconstruction::Table(text) = result else {
            panic!("expected a table, got {result:?}");
        };
        assert!(text.contains("Headers: Team FTE Revenue"));
        assert!(text.contains("Row 1: TeamA 4.3 575K"));
        assert!(text.contains("Row 2: TeamB 2.8 195K"));
    }

    #[test]
    fn single_line_is_plain() {
        let result = reconstruct(&["Just a caption under a chart"]);
        assert_eq!(
            result,
            Reconstruction::Plain("Just a caption under a chart".into())
        );
    }

    #[test]
    fn varying_column_counts_are_plain() {
        // Token counts 2, 3, 4: no two consecutive lines agree.
        let result = reconstruct(&["a b", "a b c", "a b c d"]);
        assert!(matches!(result, Reconstruction::Plain(_)));
    }

    #[test]
    fn prose_around_a_block_stays_verbatim_in_order() {
        let result = reconstruct(&[
            "Figure 3: revenue by team",
            "Team Revenue",
            "TeamA 575K",
            "TeamB 195K",
            "Source: finance dashboard",
        ]);
        let Reconstruction::Table(text) = result else {
            panic!("expected a table");
        };
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Figure 3: revenue by team",
                "Headers: Team Revenue",
                "Row 1: TeamA 575K",
                "Row 2: TeamB 195K",
                "Source: finance dashboard",
            ]
        );
    }

    #[test]
    fn row_numbering_restarts_per_block() {
        let result = reconstruct(&[
            "Team Revenue",
            "TeamA 575K",
            "standalone note",
            "Region Head-count Sites",
            "EMEA 120 4",
            "APAC 95 3",
        ]);
        let Reconstruction::Table(text) = result else {
            panic!("expected a table");
        };
        assert!(text.contains("Headers: Team Revenue"));
        assert!(text.contains("Row 1: TeamA 575K"));
        assert!(text.contains("Headers: Region Head-count Sites"));
        assert!(text.contains("Row 1: EMEA 120 4"));
        assert!(text.contains("Row 2: APAC 95 3"));
    }

    #[test]
    fn single_column_lines_never_form_a_block() {
        let result = reconstruct(&["alpha", "beta", "gamma"]);
        assert_eq!(result, Reconstruction::Plain("alpha\nbeta\ngamma".into()));
    }

    #[test]
    fn internal_whitespace_collapsed_in_cells() {
        let result = reconstruct(&["Team    Revenue", "TeamA     575K"]);
        let Reconstruction::Table(text) = result else {
            panic!("expected a table");
        };
        assert!(text.contains("Headers: Team Revenue"));
    }

    #[test]
    fn empty_input_is_empty_plain() {
        assert_eq!(reconstruct(&[]), Reconstruction::Plain(String::new()));
    }
}
