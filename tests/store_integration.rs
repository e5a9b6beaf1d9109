//! End-to-end tests over a real archive file.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use problem_forge::error::LlmError;
use problem_forge::llm::{GenerationRequest, GenerationResponse, LlmProvider};
use problem_forge::store::{SampleCase, TopcoderStore};
use problem_forge::topcoder::{format_problem, Converter, ScriptError, ScriptRunner};

const SCHEMA_SQL: &str = r#"
CREATE TABLE problems (problem_id INTEGER, name TEXT, problem_text TEXT, status_id INTEGER,
    problem_type_id INTEGER, proposed_difficulty_id INTEGER, proposed_division_id INTEGER,
    accept_submissions INTEGER, create_date TEXT, modify_date TEXT);
CREATE TABLE round_component (component_id INTEGER, problem_id INTEGER, round_id INTEGER,
    class_name TEXT, method_name TEXT, component_text TEXT, default_solution TEXT,
    points REAL, difficulty_id INTEGER, division_id INTEGER, status_id INTEGER,
    component_type_id INTEGER, result_type_id INTEGER, modify_date TEXT);
CREATE TABLE solutions (solution_id INTEGER, component_id INTEGER, solution_text TEXT,
    language_id INTEGER, coder_id INTEGER, primary_solution TEXT, modify_date TEXT,
    package TEXT, has_check_answer TEXT);
CREATE TABLE system_test_cases (test_case_id INTEGER, component_id INTEGER, args TEXT,
    expected_result TEXT, example_flag TEXT, system_flag INTEGER, test_number TEXT,
    status TEXT, modify_date TEXT);
"#;

const WIDGETS_XML: &str = r#"<problem xmlns="http://topcoder.com" code_style="java"><intro>Count the widgets.</intro><test-cases><test-case example="1" id="7"><input>[1, 2]</input><annotation>first case</annotation></test-case><test-case id="8"><input>hidden-input</input></test-case></test-cases><notes>At most 50 widgets.</notes></problem>"#;

/// Serialized `String` holding `text`.
fn serialized(text: &str) -> String {
    let mut bytes = vec![0xAC, 0xED, 0x00, 0x05, 0x74];
    bytes.extend_from_slice(&(text.len() as u16).to_be_bytes());
    bytes.extend_from_slice(text.as_bytes());
    STANDARD.encode(bytes)
}

async fn create_archive(path: &Path) {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();

    sqlx::raw_sql(SCHEMA_SQL).execute(&pool).await.unwrap();
    sqlx::query(
        "INSERT INTO problems (problem_id, name, problem_text, status_id, create_date) VALUES (1, 'Widgets', 'legacy text', 75, '2003-05-01'), (2, 'CatRescue', NULL, 75, NULL), (3, 'Lonely', NULL, 0, NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO round_component (component_id, problem_id, class_name, method_name, component_text, points) VALUES (10, 1, 'Widgets', 'count', ?1, 250.0), (20, 2, 'CatRescue', 'rescue', '<problem><intro>Save cats.</intro></problem>', 500.0)",
    )
    .bind(WIDGETS_XML)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO solutions (solution_id, component_id, solution_text, language_id) VALUES (100, 10, 'class Widgets {}', 1), (101, 10, 'struct Widgets {};', 3)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO system_test_cases (test_case_id, component_id, args, expected_result, example_flag) VALUES (8, 10, ?1, '9', '0'), (7, 10, ?2, '3', '1')",
    )
    .bind(serialized("big"))
    .bind(serialized("small"))
    .execute(&pool)
    .await
    .unwrap();

    pool.close().await;
}

async fn open_archive() -> (tempfile::TempDir, TopcoderStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topcoder.db");
    create_archive(&path).await;
    let store = TopcoderStore::open(&path).await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn test_widgets_lookup() {
    let (_dir, store) = open_archive().await;

    let data = store.problem_data("widgets").await.unwrap().unwrap();
    assert_eq!(data.problem.problem_id, 1);
    assert_eq!(data.problem.problem_text.as_deref(), Some("legacy text"));
    assert_eq!(data.components.len(), 1);
    assert_eq!(data.components[0].points, 250.0);
    assert_eq!(data.solutions.len(), 2);
    assert_eq!(data.test_cases.len(), 2);
    assert_eq!(
        data.sample_cases,
        vec![SampleCase {
            case_id: "7".to_string(),
            annotation: "first case".to_string(),
        }]
    );

    let statement = data.statement.as_deref().unwrap();
    assert!(statement.starts_with("Count the widgets."));
    assert!(statement.contains("[1, 2]"));
    assert!(!statement.contains("hidden-input"));
    assert!(statement.contains("Constraints:"));

    let report = format_problem(&data);
    assert!(report.contains("PROBLEM FOUND: Widgets"));
    assert!(report.contains("Args: \"small\""));

    store.close().await;
}

#[tokio::test]
async fn test_lookup_edge_cases() {
    let (_dir, store) = open_archive().await;

    let lower = store.problem_data("catrescue").await.unwrap().unwrap();
    let exact = store.problem_data("CatRescue").await.unwrap().unwrap();
    assert_eq!(lower.problem, exact.problem);
    assert_eq!(lower.statement.as_deref(), Some("Save cats."));
    assert!(lower.sample_cases.is_empty());

    let lonely = store.problem_data("Lonely").await.unwrap().unwrap();
    assert!(lonely.statement.is_none());
    assert!(lonely.sample_cases.is_empty());

    assert!(store.problem_data("Gadgets").await.unwrap().is_none());
    assert_eq!(
        store.example_problem_names(2).await.unwrap(),
        vec!["Widgets".to_string(), "CatRescue".to_string()]
    );

    store.close().await;
}

/// Replays canned replies.
struct Replies(Mutex<VecDeque<&'static str>>);

#[async_trait]
impl LlmProvider for Replies {
    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let content = self
            .0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyResponse)?;
        Ok(GenerationResponse::from_text(content))
    }
}

/// Copies each original test unchanged.
struct CopyRunner;

#[async_trait]
impl ScriptRunner for CopyRunner {
    async fn run(&self, _script: &Path, input: &Path, output: &Path) -> Result<(), ScriptError> {
        std::fs::copy(input, output).unwrap();
        Ok(())
    }
}

#[tokio::test]
async fn test_widgets_conversion() {
    let (dir, store) = open_archive().await;
    let data = store.problem_data("Widgets").await.unwrap().unwrap();
    store.close().await;

    let llm = Arc::new(Replies(Mutex::new(VecDeque::from([
        "# Format",
        "```python\nprint('convert')\n```",
        "class Widgets { main }",
        "```cpp\nint main() {}\n```",
        "\\begin{problem}{Widgets}",
        "=== NAME ===\nWidgets\n=== LEGEND ===\nCount.\n=== INPUT-FORMAT ===\n$n$\n=== OUTPUT-FORMAT ===\nOne number.\n=== NOTES ===\nFirst case.",
    ]))));
    let output_dir = dir.path().join("packages");

    let summary = Converter::new(llm, Arc::new(CopyRunner), &output_dir)
        .convert(&data)
        .await
        .unwrap();

    let pkg: PathBuf = output_dir.join("widgets");
    assert_eq!(summary.package_dir, pkg);
    assert!(summary.tests_converted);
    assert_eq!(summary.solutions_written, 2);

    let read = |p: &str| std::fs::read_to_string(pkg.join(p)).unwrap();
    assert_eq!(read("original_tests/001.sample"), "\"small\"");
    assert_eq!(read("original_tests/002.in"), "\"big\"");
    assert_eq!(read("tests/001.sample"), "\"small\"");
    assert_eq!(read("convert_tests.py"), "print('convert')");
    assert_eq!(read("solutions/s01.java"), "class Widgets { main }");
    assert_eq!(read("solutions/s02.cpp"), "int main() {}");
    assert_eq!(read("statements/latex/output-format.tex"), "One number.");
}
