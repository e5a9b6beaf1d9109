//! Prompts for explaining TopCoder problems and converting them into ICPC
//! packages.
//!
//! The conversion runs in stages: format documentation first, then a test
//! conversion script, converted solutions, a LaTeX statement and finally the
//! split of that statement into olymp.sty sections. Later stages receive the
//! documentation produced by the first one.

use super::Prompt;

/// System context for the formal explanation.
pub const EXPLANATION_SYSTEM: &str =
    "You are a competitive programming expert who explains problems clearly and formally.";

pub const DOCUMENTATION_SYSTEM: &str = "You are a competitive programming expert who specializes in converting problems between different contest formats.";

pub const TEST_SCRIPT_SYSTEM: &str = "You are a competitive programming expert who specializes in converting test cases between different contest formats.";

pub const SOLUTION_SYSTEM: &str = "You are a competitive programming expert who specializes in converting solutions between different contest formats.";

pub const LATEX_SYSTEM: &str = "You are a competitive programming expert who specializes in LaTeX formatting and problem statement conversion.";

pub const SPLIT_SYSTEM: &str = "You are a competitive programming expert who specializes in LaTeX formatting and problem statement organization.";

/// olymp.sty sections requested from the split stage, in file order.
pub const LATEX_SECTIONS: &[&str] = &["name", "legend", "input-format", "output-format", "notes"];

/// Guidance on TopCoder inputs that are split across string arrays.
const CONCATENATION_NOTE: &str = "Sometimes in topcoder they split the input into an array that needs to be concatenated in order to get the real input data. We should avoid this in ICPC,
    if Topcoder gives an array of strings that need to be concatenated, the ICPC problem has to include the concatenation in the input. If this concatenated string is a list of numbers,
    then ICPC problem has to include numbers and not strings.";

pub fn build_explanation_prompt(problem_name: &str, description: &str) -> Prompt {
    Prompt::with_system(
        EXPLANATION_SYSTEM,
        format!(
            r#"
You are a competitive programming expert. Please analyze the following TopCoder problem and provide a formal explanation that includes:

1. A clear problem statement summary
2. All input constraints and limitations
3. Output format requirements
4. Key algorithmic insights or approaches
5. Time/space complexity considerations if relevant

Problem Name: {}

Problem Description:
{}

Please provide a structured, formal explanation that would help a competitive programmer understand exactly what needs to be solved and what the constraints are.
"#,
            problem_name, description
        ),
    )
}

/// Asks for documentation of the ICPC input/output format and of how to
/// convert tests and solutions into it.
pub fn build_icpc_documentation_prompt(
    description: &str,
    problem_name: &str,
    tests: &[String],
) -> Prompt {
    let tests_text = tests
        .iter()
        .enumerate()
        .map(|(i, t)| format!("Test Case {}:\n{}", i, t))
        .collect::<Vec<_>>()
        .join("\n");

    Prompt::with_system(
        DOCUMENTATION_SYSTEM,
        format!(
            r#"
You are a competitive programming expert. I need to convert a TopCoder problem to ICPC format.

Given the following TopCoder problem XML description, please write detailed documentation explaining:

1. How the input format should look like in an ICPC-style competition
2. How the output format should look like in an ICPC-style competition
3. How to convert test cases from TopCoder format to ICPC format (don't take examples from xml, take them from examples)
4. How to modify solutions that work with TopCoder format to work with ICPC format
5. Any important considerations for the conversion process
6. How the variables from the original statement should be called in a new ICPC format, include how old naming corresponds to the new naming in the documentation
   - Usually in ICPC format they use single-letter named variables, they don't use words like 'array', they use mathematical notations.
7. {note}

The documentation should be practical and actionable, helping someone to:
- Rewrite the problem statement from TopCoder format to ICPC format
- Write a script to convert test cases
- Include several examples in the documentation for conversion
- Adapt existing solutions to the new format

Problem Name: {name}

TopCoder Problem XML:
{description}

TopCoder formatted testcase examples for tests and solutions conversion:
{tests}

Please provide comprehensive documentation in Markdown format.
"#,
            note = CONCATENATION_NOTE,
            name = problem_name,
            description = description,
            tests = tests_text,
        ),
    )
}

/// Asks for a Python script converting one TopCoder test file into ICPC
/// input. A non-empty `error` from the previous attempt is sent as a second
/// user turn.
pub fn build_conversion_script_prompt(
    documentation: &str,
    tests: &[String],
    problem_name: &str,
    error: &str,
) -> Prompt {
    let examples: String = tests
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, t)| format!("\nExample Test Case {}:\n{}\n", i + 1, t))
        .collect();

    let mut prompt = Prompt::with_system(
        TEST_SCRIPT_SYSTEM,
        format!(
            r#"
I need you to generate a Python script that converts test cases from TopCoder format according to the documentation.

Problem Name: {}

ICPC Format Documentation:
{}

Example TopCoder Test Cases:
{}

Please generate a complete Python script that:
1. Reads a TopCoder test case file
2. Parses it, you can always use python's eval(text) and it will correctly get a python list of arguments
3. Converts them to ICPC input format according to the documentation
4. Writes the converted input to a provided file
5. Exits with non-zero exit code is something failed

The script should:
- Take input file path and output file path as command line arguments
- Parse the TopCoder test case format from the input file
- Convert according to the ICPC format specification
- Handle any necessary data transformations (string parsing, format changes, etc.)
- Include error handling for malformed input
- Add comments explaining the conversion logic

Please provide a complete, runnable Python script with proper imports and error handling. Please don't include anything else in the reply, just the source code.
"#,
            problem_name, documentation, examples
        ),
    );

    if !error.is_empty() {
        prompt.push_user(format!(
            "There is an error happened, please fix:\n{}",
            error
        ));
    }
    prompt
}

/// Asks for a solution with a stdin/stdout `main` around the original
/// TopCoder method.
pub fn build_solution_conversion_prompt(
    solution_code: &str,
    language: &str,
    documentation: &str,
    problem_name: &str,
) -> Prompt {
    Prompt::with_system(
        SOLUTION_SYSTEM,
        format!(
            r#"
You are a competitive programming expert. I need to convert a TopCoder solution to ICPC format.

The TopCoder solution is a class method that takes parameters and returns a result.
I need you to add a main function that:
1. Reads input from stdin according to the ICPC format
2. Calls the original solution method with the parsed input
3. Prints the result to stdout according to the ICPC format

Language: {}
Problem Name: {}

ICPC Format Documentation:
{}

TopCoder Solution Code:
{}

Please provide the complete converted solution with:
- The original solution code (keep it as is)
- A main function that reads from stdin, calls the solution, and writes to stdout
- Proper input/output formatting according to ICPC documentation
- No additional explanations, just the code

Make sure the solution is ready to compile and run for ICPC-style testing.
"#,
            language, problem_name, documentation, solution_code
        ),
    )
}

/// Asks for the full olymp.sty LaTeX statement.
pub fn build_latex_prompt(description: &str, documentation: &str, problem_name: &str) -> Prompt {
    Prompt::with_system(
        LATEX_SYSTEM,
        format!(
            r#"
You are a competitive programming expert. I need to convert a TopCoder problem to olymp.sty LaTeX format.

Given the TopCoder problem XML description and ICPC format documentation, please rewrite the problem statement in olymp.sty LaTeX format.

Important requirements:
- Use olymp.sty LaTeX formatting
- Use proper LaTeX formatting for mathematical expressions, code, etc.
- All LaTeX formulas have to be inside '$'
- Usually in ICPC format they use single-letter named variables, they don't use words like 'array', they use mathematical notations.
- The naming must be consistent throughout the problem statement
- The input, output formats and the notes section usually don't use itemize. Just write text as `The first line of the input consists of two integers`, or `In the first example ...`.
- The constraints have to be integrated into the input format, don't make extra constraints section
- Don't include examples in the statement
- use U+0060 backtick and ' for single-quotes
- use double (U+0060 backtick) and '' for double-quotes
- include anything inside quotes into \texttt command, don't include quotes themselves: for instance `\texttt{{hello}}'
- Don't forget to write example explanations in the notes section
- {note}

Problem Name: {name}

ICPC Format Documentation:
{documentation}

TopCoder Problem XML:
{description}

Please provide the complete LaTeX problem statement. Don't divide it into sections yet, just provide the full statement.
"#,
            note = CONCATENATION_NOTE,
            name = problem_name,
            documentation = documentation,
            description = description,
        ),
    )
}

/// Asks to divide a LaTeX statement into [`LATEX_SECTIONS`] using
/// `=== NAME ===` markers.
pub fn build_section_split_prompt(latex: &str) -> Prompt {
    Prompt::with_system(
        SPLIT_SYSTEM,
        format!(
            r#"
I have a LaTeX problem statement that needs to be divided into exactly 5 sections for the olymp.sty format.

Please divide the following LaTeX content into these sections:
1. name - The problem title
2. legend - The problem story/description
3. input-format - Input format specification (include constraints here)
4. output-format - Output format specification
5. notes - Additional notes, sample case explanations

Important:
- Don't modify the LaTeX content, just divide it appropriately
- Constraints should be part of the input-format section
- Keep all LaTeX formatting intact
- Don't include examples

Please provide the output in the following format:

=== NAME ===
[content for name section]

=== LEGEND ===
[content for legend section]

=== INPUT-FORMAT ===
[content for input-format section including constraints]

=== OUTPUT-FORMAT ===
[content for output-format section]

=== NOTES ===
[content for notes section]

Here is the LaTeX content to divide:

{}
"#,
            latex
        ),
    )
}
