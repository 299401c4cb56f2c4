//! Heuristic splitting of tutor output into numbered steps.
//!
//! A line opens a new step when it starts with `Step <n>:` or `<n>.`.
//! Lines without a marker are appended to the step in progress. The marker
//! grammar is loose: a continuation line such as
//! `2.5 is the result` is read as a marker too.
//!
//! Re-parsing a step's text gives back that same single step, except when
//! the text itself starts with something marker-like: `2.5 + 1 = 3.5`
//! re-parses as `5 + 1 = 3.5`.

use super::SolutionStep;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static STEP_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(step\s*\d+:|\d+\.\s*)").expect("valid step marker regex"));

/// Split raw solution text into ordered steps.
///
/// Every returned step has non-empty text. Ids are unique across calls.
pub fn parse_steps(solution: &str) -> Vec<SolutionStep> {
    let batch = Uuid::new_v4().simple().to_string();
    let mut texts: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in solution.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(marker) = STEP_MARKER.find(line) {
            flush(&mut texts, &mut current);
            current.push_str(line[marker.end()..].trim());
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    flush(&mut texts, &mut current);

    // Only bare markers, e.g. "1." on its own.
    if texts.is_empty() && !solution.trim().is_empty() {
        texts.push(solution.trim().to_string());
    }

    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| SolutionStep::new(format!("step-{}-{}", index, batch), text))
        .collect()
}

fn flush(texts: &mut Vec<String>, current: &mut String) {
    let text = current.trim();
    if !text.is_empty() {
        texts.push(text.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        parse_steps(input).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_step_markers() {
        assert_eq!(
            texts("Step 1: Add 2 to both sides\nStep 2: Divide by 3"),
            vec!["Add 2 to both sides", "Divide by 3"]
        );
    }

    #[test]
    fn test_numbered_markers_and_case() {
        assert_eq!(
            texts("1. Expand\nSTEP 2: Collect terms\n3.Solve"),
            vec!["Expand", "Collect terms", "Solve"]
        );
        assert_eq!(texts("step 7: lower case works"), vec!["lower case works"]);
    }

    #[test]
    fn test_no_markers_is_one_step() {
        assert_eq!(texts("x = 5"), vec!["x = 5"]);
        assert_eq!(
            texts("  We factor.\n\n  Then x = 2  "),
            vec!["We factor.\nThen x = 2"]
        );
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert!(parse_steps("").is_empty());
        assert!(parse_steps("  \n\t \n").is_empty());
    }

    #[test]
    fn test_continuation_lines_and_preamble() {
        let input = "Let's solve it.\nStep 1: Write $\\frac{a}{b}$\nwhere $b \\neq 0$\n\nStep 2: Simplify";
        assert_eq!(
            texts(input),
            vec![
                "Let's solve it.",
                "Write $\\frac{a}{b}$\nwhere $b \\neq 0$",
                "Simplify"
            ]
        );
    }

    #[test]
    fn test_empty_marker_steps_are_dropped_without_gaps() {
        let steps = parse_steps("Step 1:\nStep 2: Divide by 3\n3.");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].text, "Divide by 3");
        assert!(steps[0].id.starts_with("step-0-"));
    }

    #[test]
    fn test_only_bare_markers_falls_back_to_whole_input() {
        assert_eq!(texts(" 1. "), vec!["1."]);
    }

    #[test]
    fn test_decimal_line_reads_as_marker() {
        assert_eq!(
            texts("Step 1: Compute 5 / 2\n2.5 is the result"),
            vec!["Compute 5 / 2", "5 is the result"]
        );
    }

    #[test]
    fn test_n_markers_give_n_steps_in_order() {
        let input: String = (1..=12)
            .map(|n| format!("Step {}: item {}\n", n, n))
            .collect();
        let steps = texts(&input);
        assert_eq!(steps.len(), 12);
        for (i, text) in steps.iter().enumerate() {
            assert_eq!(text, &format!("item {}", i + 1));
        }
    }

    #[test]
    fn test_reparsing_a_step_is_stable() {
        for step in parse_steps("1. Multiply out\n(x+1)(x-1)\n2. Get $x^2 - 1$") {
            let again = parse_steps(&step.text);
            assert_eq!(again.len(), 1);
            assert_eq!(again[0].text, step.text);
        }
    }

    #[test]
    fn test_reparsing_marker_like_step_text_strips_again() {
        let steps = parse_steps("1. 2.5 + 1 = 3.5\n2. Done");
        assert_eq!(steps[0].text, "2.5 + 1 = 3.5");

        let again = parse_steps(&steps[0].text);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].text, "5 + 1 = 3.5");
    }

    #[test]
    fn test_ids_are_unique_across_parses() {
        let a = parse_steps("1. a\n2. b");
        let b = parse_steps("1. a\n2. b");
        assert_ne!(a[0].id, a[1].id);
        assert_ne!(a[0].id, b[0].id);
    }
}
