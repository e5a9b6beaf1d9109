//! Prompts for Polygon contest problems.

use super::Prompt;

/// Requirements appended to every validator generation prompt.
const VALIDATOR_REQUIREMENTS: &str = r#"
Requirements:
1. Use #include "testlib.h" at the top
2. Use registerValidation(argc, argv) in main function
3. Validate all input constraints mentioned in the problem
4. Use appropriate testlib functions like inf.readInt(), inf.readSpace(), inf.readEoln(), etc.
5. Ensure the validator checks all bounds and format requirements
6. End with inf.readEof() to ensure no extra input
7. Use ensuref() for constraint validation with descriptive error messages
8. Don't forget to #include the standard libraries used
9. Don't forget to use constants like 1'000'000 instead of 1000000
10. For IOI type problems use `validator.group()` to get `std::string` denoting a group of the current validated test. The group names are always a number with no leading zeros, i.e. "1", "2", ..., "10"
11. If the problem has test cases `setTestCase` has to be called
"#;

const CODE_ONLY: &str =
    "Generate only the C++ code without any explanations or markdown formatting.";

/// Builds the prompt asking for a three-sentence formal description of a
/// problem in `language`.
pub fn build_description_prompt(problem_name: &str, statement: &str, language: &str) -> Prompt {
    Prompt::user(format!(
        r#"You are an expert in competitive programming. Given the following problem statement, write a short formal description of the problem in exactly three sentences in {lang}.

Problem Name: {name}

Problem Statement:
{statement}

Requirements:
1. Write exactly THREE sentences in {lang}
2. The description should be formal and concise
3. Include the most important details about what needs to be solved
4. Include key constraints at the end (e.g., array size limits, value ranges, time/memory limits if mentioned)
5. Do not include example inputs/outputs
6. Focus on the core problem, not implementation details
7. Use mathematical or technical terminology where appropriate

Generate only the three-sentence description in {lang} without any additional text, explanations, or formatting."#,
        lang = language,
        name = problem_name,
        statement = statement,
    ))
}

fn problem_header(intro: &str, problem_name: &str, statement: &str) -> Vec<String> {
    vec![
        intro.to_string(),
        format!("\nProblem Name: {}", problem_name),
        format!("\nProblem Statement:\n{}", statement),
    ]
}

fn push_test_input(parts: &mut Vec<String>, test_input: Option<&str>) {
    if let Some(input) = test_input {
        parts.push("\nExample Test Case:".to_string());
        parts.push(format!("Input:\n{}", input));
    }
}

/// Builds the prompt asking for a testlib validator.
///
/// `test_input` is the first test of the problem when one could be fetched.
pub fn build_validator_prompt(
    problem_name: &str,
    statement: &str,
    test_input: Option<&str>,
) -> Prompt {
    let mut parts = problem_header(
        "You are an expert competitive programming judge. Generate a C++ validator using testlib.h for the following problem.\n\
         Detect the type of problem ICPC or IOI, according to the problem statement whether there subtasks and scoring mentioned.",
        problem_name,
        statement,
    );
    push_test_input(&mut parts, test_input);
    parts.push(VALIDATOR_REQUIREMENTS.trim_end().to_string());
    parts.push(String::new());
    parts.push(CODE_ONLY.to_string());

    Prompt::user(parts.join("\n"))
}

/// Builds the prompt asking to repair a validator that Polygon rejected.
pub fn build_validator_fix_prompt(
    problem_name: &str,
    statement: &str,
    test_input: Option<&str>,
    validator_code: &str,
    error: &str,
) -> Prompt {
    let mut parts = problem_header(
        "You are an expert competitive programming judge. Fix a C++ validator for the following problem.",
        problem_name,
        statement,
    );
    push_test_input(&mut parts, test_input);
    parts.push(format!("Validator code:\n{}", validator_code));
    parts.push(format!("Error: \n{}", error));
    parts.push(CODE_ONLY.to_string());

    Prompt::user(parts.join("\n"))
}
