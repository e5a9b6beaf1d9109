//! Text reports printed by the TopCoder commands.

use std::fmt::Write;

use crate::javaser::decode_args_or_raw;
use crate::store::ProblemData;

/// Characters of `problem_text` shown before truncation.
pub const PROBLEM_TEXT_PREVIEW: usize = 500;

/// Characters of decoded test arguments shown per test case.
pub const ARGS_PREVIEW: usize = 100;

fn banner() -> String {
    "=".repeat(60)
}

fn rule() -> String {
    "-".repeat(20)
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Lookup miss with a few names from the store.
pub fn format_not_found(name: &str, examples: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Problem '{}' not found in the database.", name);
    let _ = writeln!(
        out,
        "\nTip: Problem names are case-insensitive. Try checking the exact spelling."
    );
    let _ = writeln!(out, "\nSome example problem names:");
    for example in examples {
        let _ = writeln!(out, "  - {}", example);
    }
    out
}

/// Problem id and extracted statement.
pub fn format_description(data: &ProblemData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", banner());
    let _ = writeln!(out, "PROBLEM: {}", data.problem.name);
    let _ = writeln!(out, "{}", banner());
    let _ = writeln!(out, "Problem ID: {}", data.problem.problem_id);

    match &data.statement {
        Some(statement) => {
            let _ = writeln!(out, "\nPROBLEM DESCRIPTION:");
            let _ = writeln!(out, "{}", rule());
            let _ = writeln!(out, "{}", statement);
        }
        None => {
            let _ = writeln!(out, "\nNo problem description available for this problem.");
        }
    }

    let _ = writeln!(out, "\n{}", banner());
    out
}

/// Full problem report: details, statement, components, solutions and test
/// cases.
pub fn format_problem(data: &ProblemData) -> String {
    let problem = &data.problem;
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", banner());
    let _ = writeln!(out, "PROBLEM FOUND: {}", problem.name);
    let _ = writeln!(out, "{}", banner());

    let _ = writeln!(out, "\nProblem Details:");
    let _ = writeln!(out, "  ID: {}", problem.problem_id);
    let _ = writeln!(out, "  Name: {}", problem.name);
    let _ = writeln!(out, "  Created: {}", problem.create_date.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "  Modified: {}", problem.modify_date.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "  Status ID: {}", problem.status_id);
    let _ = writeln!(out, "  Problem Type ID: {}", problem.problem_type_id);

    if let Some(text) = problem.problem_text.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "\nProblem Text:");
        let _ = writeln!(out, "  {}", truncate(text, PROBLEM_TEXT_PREVIEW));
    }

    if let Some(statement) = &data.statement {
        let _ = writeln!(out, "\nPROBLEM DESCRIPTION:");
        let _ = writeln!(out, "{}", rule());
        let _ = writeln!(out, "{}", statement);
    }

    let _ = writeln!(out, "\nComponents ({}):", data.components.len());
    for (i, component) in data.components.iter().enumerate() {
        let _ = writeln!(out, "  {}. Component ID: {}", i + 1, component.component_id);
        let _ = writeln!(
            out,
            "     Class Name: {}",
            component.class_name.as_deref().unwrap_or("-")
        );
        let _ = writeln!(
            out,
            "     Method Name: {}",
            component.method_name.as_deref().unwrap_or("-")
        );
        let _ = writeln!(out, "     Points: {}", component.points);
        let _ = writeln!(out, "     Difficulty ID: {}", component.difficulty_id);
    }

    let _ = writeln!(out, "\nSolutions ({}):", data.solutions.len());
    for (i, solution) in data.solutions.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. Solution ID: {}",
            i + 1,
            solution.solution_id.as_deref().unwrap_or("-")
        );
        let _ = writeln!(out, "     Coder ID: {}", solution.coder_id);
        let _ = writeln!(
            out,
            "     Language: {} ({})",
            solution.language().display_name(),
            solution.language_id
        );
        let _ = writeln!(
            out,
            "     Modified: {}",
            solution.modify_date.as_deref().unwrap_or("-")
        );
        let _ = writeln!(
            out,
            "     Primary: {}",
            solution.primary_solution.as_deref().unwrap_or("-")
        );
        if let Some(code) = solution.solution_text.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "     Code:");
            for line in code.lines() {
                let _ = writeln!(out, "       {}", line);
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Test Cases ({}):", data.test_cases.len());
    for (i, test) in data.test_cases.iter().enumerate() {
        let marker = if test.is_example() { " (example)" } else { "" };
        let _ = writeln!(out, "  {}. Test Case ID: {}{}", i + 1, test.test_case_id, marker);
        let args = decode_args_or_raw(&test.args);
        let _ = writeln!(out, "     Args: {}", truncate(&args, ARGS_PREVIEW));
        if let Some(expected) = &test.expected_result {
            let _ = writeln!(out, "     Expected: {}", truncate(expected, ARGS_PREVIEW));
        }
    }

    out
}

/// Statement followed by the LLM's formal explanation.
pub fn format_short_description(data: &ProblemData, statement: &str, explanation: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", banner());
    let _ = writeln!(out, "PROBLEM: {}", data.problem.name);
    let _ = writeln!(out, "{}", banner());
    let _ = writeln!(out, "\nOriginal Description:");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "{}", statement);
    let _ = writeln!(out, "\n{}", banner());
    let _ = writeln!(out, "FORMAL EXPLANATION:");
    let _ = writeln!(out, "{}", banner());
    let _ = writeln!(out, "{}", explanation);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ComponentRecord, ProblemRecord, SolutionRecord, TestCaseRecord};

    fn data(statement: Option<&str>, problem_text: Option<String>) -> ProblemData {
        ProblemData {
            problem: ProblemRecord {
                problem_id: 42,
                name: "Widgets".to_string(),
                problem_text,
                status_id: 1,
                problem_type_id: 2,
                proposed_difficulty_id: 0,
                proposed_division_id: 0,
                accept_submissions: 1,
                create_date: Some("2004-01-01".to_string()),
                modify_date: None,
            },
            statement: statement.map(str::to_string),
            components: vec![ComponentRecord {
                component_id: 7,
                problem_id: 42,
                round_id: 0,
                class_name: Some("Widgets".to_string()),
                method_name: Some("count".to_string()),
                component_text: None,
                default_solution: None,
                points: 250.0,
                difficulty_id: 1,
                division_id: 1,
                status_id: 0,
                component_type_id: 1,
                result_type_id: 1,
                modify_date: None,
            }],
            solutions: vec![SolutionRecord {
                solution_id: Some("3".to_string()),
                component_id: Some("7".to_string()),
                solution_text: Some("class Widgets {\n}".to_string()),
                language_id: 1,
                coder_id: 99,
                primary_solution: Some("1".to_string()),
                package: None,
                has_check_answer: None,
                modify_date: None,
            }],
            test_cases: vec![TestCaseRecord {
                test_case_id: 5,
                component_id: 7,
                args: "not-base64".to_string(),
                expected_result: Some("3".to_string()),
                example_flag: Some("1".to_string()),
                system_flag: 0,
                test_number: None,
                status: None,
                modify_date: None,
            }],
            sample_cases: Vec::new(),
        }
    }

    #[test]
    fn test_format_not_found_lists_examples() {
        let out = format_not_found("nope", &["A".to_string(), "B".to_string()]);
        assert!(out.starts_with("Problem 'nope' not found in the database.\n"));
        assert!(out.ends_with("Some example problem names:\n  - A\n  - B\n"));
    }

    #[test]
    fn test_format_description() {
        let out = format_description(&data(Some("Count widgets."), None));
        assert!(out.contains("PROBLEM: Widgets"));
        assert!(out.contains("Problem ID: 42"));
        assert!(out.contains("PROBLEM DESCRIPTION:\n--------------------\nCount widgets."));

        let out = format_description(&data(None, None));
        assert!(out.contains("No problem description available for this problem."));
    }

    #[test]
    fn test_format_problem_truncates_text() {
        let out = format_problem(&data(Some("S"), Some("x".repeat(600))));
        let expected = format!("  {}...\n", "x".repeat(PROBLEM_TEXT_PREVIEW));
        assert!(out.contains(&expected));

        let out = format_problem(&data(Some("S"), Some("short".to_string())));
        assert!(out.contains("Problem Text:\n  short\n"));
    }

    #[test]
    fn test_format_problem_sections() {
        let out = format_problem(&data(Some("S"), None));
        assert!(!out.contains("Problem Text:"));
        assert!(out.contains("Components (1):\n  1. Component ID: 7"));
        assert!(out.contains("Points: 250"));
        assert!(out.contains("Language: Java (1)"));
        assert!(out.contains("       class Widgets {\n       }\n"));
        assert!(out.contains("Test Cases (1):\n  1. Test Case ID: 5 (example)"));
        assert!(out.contains("Args: not-base64"));
        assert!(out.contains("Expected: 3"));
    }

    #[test]
    fn test_format_short_description() {
        let out = format_short_description(&data(None, None), "Count.", "Formal.");
        assert!(out.contains("Original Description:\n--------------------\nCount."));
        assert!(out.trim_end().ends_with("Formal."));
    }
}
