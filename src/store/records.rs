//! Row types of the TopCoder archive store.
//!
//! Archive dumps are inconsistent about column affinity: the same column can
//! hold INTEGER in one file and TEXT in another. Every column is therefore read
//! as text and parsed leniently; unparsable numbers become zero.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Reads a column as text regardless of its storage class.
fn text(row: &SqliteRow, column: &str) -> Option<String> {
    row.try_get_unchecked::<Option<String>, _>(column)
        .ok()
        .flatten()
}

fn int(row: &SqliteRow, column: &str) -> i64 {
    text(row, column).map(|v| parse_int(&v)).unwrap_or(0)
}

fn float(row: &SqliteRow, column: &str) -> f64 {
    text(row, column)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parses an integer column; `"3.0"` style values are truncated.
pub(crate) fn parse_int(value: &str) -> i64 {
    let value = value.trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|f| f as i64))
        .unwrap_or(0)
}

/// One row of `problems`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemRecord {
    pub problem_id: i64,
    pub name: String,
    pub problem_text: Option<String>,
    pub status_id: i64,
    pub problem_type_id: i64,
    pub proposed_difficulty_id: i64,
    pub proposed_division_id: i64,
    pub accept_submissions: i64,
    pub create_date: Option<String>,
    pub modify_date: Option<String>,
}

impl ProblemRecord {
    pub(crate) fn from_row(row: &SqliteRow) -> Self {
        Self {
            problem_id: int(row, "problem_id"),
            name: text(row, "name").unwrap_or_default(),
            problem_text: text(row, "problem_text"),
            status_id: int(row, "status_id"),
            problem_type_id: int(row, "problem_type_id"),
            proposed_difficulty_id: int(row, "proposed_difficulty_id"),
            proposed_division_id: int(row, "proposed_division_id"),
            accept_submissions: int(row, "accept_submissions"),
            create_date: text(row, "create_date"),
            modify_date: text(row, "modify_date"),
        }
    }
}

/// One row of `round_component`. Carries the statement XML.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRecord {
    pub component_id: i64,
    pub problem_id: i64,
    pub round_id: i64,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub component_text: Option<String>,
    pub default_solution: Option<String>,
    pub points: f64,
    pub difficulty_id: i64,
    pub division_id: i64,
    pub status_id: i64,
    pub component_type_id: i64,
    pub result_type_id: i64,
    pub modify_date: Option<String>,
}

impl ComponentRecord {
    pub(crate) fn from_row(row: &SqliteRow) -> Self {
        Self {
            component_id: int(row, "component_id"),
            problem_id: int(row, "problem_id"),
            round_id: int(row, "round_id"),
            class_name: text(row, "class_name"),
            method_name: text(row, "method_name"),
            component_text: text(row, "component_text"),
            default_solution: text(row, "default_solution"),
            points: float(row, "points"),
            difficulty_id: int(row, "difficulty_id"),
            division_id: int(row, "division_id"),
            status_id: int(row, "status_id"),
            component_type_id: int(row, "component_type_id"),
            result_type_id: int(row, "result_type_id"),
            modify_date: text(row, "modify_date"),
        }
    }
}

/// Languages the archive records solutions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolutionLanguage {
    Java,
    Cpp,
    CSharp,
    VisualBasic,
    Python,
    Python3,
    Unknown(i64),
}

impl SolutionLanguage {
    pub fn from_id(id: i64) -> Self {
        match id {
            1 => Self::Java,
            3 => Self::Cpp,
            4 => Self::CSharp,
            5 => Self::VisualBasic,
            6 => Self::Python,
            7 => Self::Python3,
            other => Self::Unknown(other),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Java => "Java",
            Self::Cpp => "C++",
            Self::CSharp => "C#",
            Self::VisualBasic => "VB",
            Self::Python => "Python",
            Self::Python3 => "Python 3",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Source file extension, dot included.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Java => ".java",
            Self::Cpp => ".cpp",
            Self::CSharp => ".cs",
            Self::VisualBasic => ".vb",
            Self::Python | Self::Python3 => ".py",
            Self::Unknown(_) => ".txt",
        }
    }
}

/// One row of `solutions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionRecord {
    pub solution_id: Option<String>,
    pub component_id: Option<String>,
    pub solution_text: Option<String>,
    pub language_id: i64,
    pub coder_id: i64,
    pub primary_solution: Option<String>,
    pub package: Option<String>,
    pub has_check_answer: Option<String>,
    pub modify_date: Option<String>,
}

impl SolutionRecord {
    pub(crate) fn from_row(row: &SqliteRow) -> Self {
        Self {
            solution_id: text(row, "solution_id"),
            component_id: text(row, "component_id"),
            solution_text: text(row, "solution_text"),
            language_id: int(row, "language_id"),
            coder_id: int(row, "coder_id"),
            primary_solution: text(row, "primary_solution"),
            package: text(row, "package"),
            has_check_answer: text(row, "has_check_answer"),
            modify_date: text(row, "modify_date"),
        }
    }

    pub fn language(&self) -> SolutionLanguage {
        SolutionLanguage::from_id(self.language_id)
    }
}

/// One row of `system_test_cases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCaseRecord {
    pub test_case_id: i64,
    pub component_id: i64,
    /// Base64 of a Java-serialized argument array.
    pub args: String,
    pub expected_result: Option<String>,
    pub example_flag: Option<String>,
    pub system_flag: i64,
    pub test_number: Option<String>,
    pub status: Option<String>,
    pub modify_date: Option<String>,
}

impl TestCaseRecord {
    pub(crate) fn from_row(row: &SqliteRow) -> Self {
        Self {
            test_case_id: int(row, "test_case_id"),
            component_id: int(row, "component_id"),
            args: text(row, "args").unwrap_or_default(),
            expected_result: text(row, "expected_result"),
            example_flag: text(row, "example_flag"),
            system_flag: int(row, "system_flag"),
            test_number: text(row, "test_number"),
            status: text(row, "status"),
            modify_date: text(row, "modify_date"),
        }
    }

    pub fn is_example(&self) -> bool {
        self.example_flag.as_deref().map(str::trim) == Some("1")
    }
}

/// An example test case as annotated in the statement XML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleCase {
    pub case_id: String,
    pub annotation: String,
}

/// Everything known about one problem, assembled by a single lookup.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemData {
    pub problem: ProblemRecord,
    /// Flattened statement text; absent when no component yields one.
    pub statement: Option<String>,
    pub components: Vec<ComponentRecord>,
    pub solutions: Vec<SolutionRecord>,
    pub test_cases: Vec<TestCaseRecord>,
    pub sample_cases: Vec<SampleCase>,
}
