//! Operator console
//!
//! Renders the pipeline with per-stage status derived from the saved
//! position, and reads the operator's stage choice. Rendering and parsing
//! are pure so tests cover them without a terminal; only
//! [`prompt_selection`] touches stdin.

use crate::catalog::StageCatalog;
use crate::error::{Result, SequencerError};
use std::io::{self, Write};

/// Render the stage list with done / next / pending markers.
pub fn render(catalog: &StageCatalog, cursor: usize) -> String {
    let mut out = String::from("Provisioning stages:\n");
    for descriptor in catalog.iter() {
        let status = if descriptor.index < cursor {
            "done"
        } else if descriptor.index == cursor {
            "next"
        } else {
            "pending"
        };
        out.push_str(&format!(
            "  {:>2}  [{:<7}] {}\n",
            descriptor.index, status, descriptor.name
        ));
    }
    out
}

/// Interpret one line of operator input as a stage selection.
///
/// Empty input means "the default" (the saved position); anything else
/// must parse as a non-negative integer. Bounds are the controller's
/// concern, not this function's.
pub fn parse_selection(input: &str, default: usize) -> Result<usize> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }
    input
        .parse::<usize>()
        .map_err(|_| SequencerError::UnparseableSelection {
            input: input.to_string(),
        })
}

/// Prompt for a stage selection on stdin.
pub fn prompt_selection(default: usize) -> Result<usize> {
    print!("Stage to run [{}]: ", default);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    parse_selection(&input, default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AdvancePolicy, StageCatalog};
    use bramble_stages::{Outcome, StageAction, StaticStage};
    use std::sync::Arc;

    fn four_stage_catalog() -> StageCatalog {
        let rows: Vec<(&'static str, Arc<dyn StageAction>, AdvancePolicy)> = vec![
            ("alpha", Arc::new(StaticStage::new("alpha", Outcome::Success)), AdvancePolicy::Continue),
            ("beta", Arc::new(StaticStage::new("beta", Outcome::Success)), AdvancePolicy::Continue),
            ("gamma", Arc::new(StaticStage::new("gamma", Outcome::Success)), AdvancePolicy::Continue),
            ("delta", Arc::new(StaticStage::new("delta", Outcome::Success)), AdvancePolicy::Finish),
        ];
        StageCatalog::from_rows(rows)
    }

    /// Count occurrences of a marker in rendered output.
    fn count(rendered: &str, marker: &str) -> usize {
        rendered.matches(marker).count()
    }

    #[test]
    fn test_render_labels_for_every_cursor_position() {
        let catalog = four_stage_catalog();
        let n = catalog.len();

        for cursor in 0..=n {
            let rendered = render(&catalog, cursor);
            assert_eq!(count(&rendered, "[done   ]"), cursor, "cursor={}", cursor);
            assert_eq!(
                count(&rendered, "[next   ]"),
                usize::from(cursor < n),
                "cursor={}",
                cursor
            );
            assert_eq!(
                count(&rendered, "[pending]"),
                n - cursor - usize::from(cursor < n),
                "cursor={}",
                cursor
            );
        }
    }

    #[test]
    fn test_render_fresh_install_marks_stage_zero_next() {
        let catalog = StageCatalog::standard();
        let rendered = render(&catalog, 0);
        assert!(rendered.contains("   0  [next   ] Operating system update"));
        assert_eq!(count(&rendered, "[pending]"), 11);
        assert_eq!(count(&rendered, "[done   ]"), 0);
    }

    #[test]
    fn test_parse_selection_empty_is_default() {
        assert_eq!(parse_selection("", 6).unwrap(), 6);
        assert_eq!(parse_selection("  \n", 6).unwrap(), 6);
    }

    #[test]
    fn test_parse_selection_number() {
        assert_eq!(parse_selection("7\n", 0).unwrap(), 7);
        assert_eq!(parse_selection("  11  ", 0).unwrap(), 11);
    }

    #[test]
    fn test_parse_selection_rejects_garbage() {
        assert!(matches!(
            parse_selection("abc", 0),
            Err(SequencerError::UnparseableSelection { .. })
        ));
        assert!(matches!(
            parse_selection("-1", 0),
            Err(SequencerError::UnparseableSelection { .. })
        ));
        assert!(matches!(
            parse_selection("3.5", 0),
            Err(SequencerError::UnparseableSelection { .. })
        ));
    }
}
