//! SQLite accessor for the TopCoder archive.
//!
//! The archive is read-only input: problems are looked up by name and joined
//! with their components, solutions and system test cases into a single
//! [`ProblemData`] snapshot.

use std::collections::HashSet;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use super::records::{
    ComponentRecord, ProblemData, ProblemRecord, SampleCase, SolutionRecord, TestCaseRecord,
};
use crate::statement::{extract_sample_cases, extract_statement};

/// Number of names shown when a lookup misses.
pub const EXAMPLE_NAME_LIMIT: u32 = 10;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file does not exist.
    #[error("Database file '{0}' not found")]
    MissingFile(String),

    /// Opening the store failed.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),
}

/// Read-only handle on an archive database.
#[derive(Clone)]
pub struct TopcoderStore {
    pool: SqlitePool,
}

impl TopcoderStore {
    /// Opens an existing archive file read-only over a single connection.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::MissingFile(path.display().to_string()));
        }

        let opts = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Archive store opened");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Closes the underlying connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Finds a problem by name, ignoring case.
    pub async fn find_problem_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ProblemRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM problems WHERE name = ?1 COLLATE NOCASE")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(ProblemRecord::from_row))
    }

    /// First `limit` problem names in storage order, for "did you mean" hints.
    pub async fn example_problem_names(&self, limit: u32) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT name FROM problems LIMIT ?1")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .filter_map(|r| r.try_get_unchecked::<Option<String>, _>("name").ok().flatten())
            .collect())
    }

    pub async fn components_for_problem(
        &self,
        problem_id: i64,
    ) -> Result<Vec<ComponentRecord>, StoreError> {
        // Ids are bound as text so TEXT-affinity dumps match as well.
        let rows = sqlx::query("SELECT * FROM round_component WHERE problem_id = ?1")
            .bind(problem_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(ComponentRecord::from_row).collect())
    }

    pub async fn solutions_for_component(
        &self,
        component_id: i64,
    ) -> Result<Vec<SolutionRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM solutions WHERE component_id = ?1")
            .bind(component_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(SolutionRecord::from_row).collect())
    }

    pub async fn test_cases_for_component(
        &self,
        component_id: i64,
    ) -> Result<Vec<TestCaseRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM system_test_cases WHERE component_id = ?1")
            .bind(component_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(TestCaseRecord::from_row).collect())
    }

    /// Assembles the full snapshot for `name`, or `None` when it is unknown.
    ///
    /// The statement comes from the first component whose XML produces a
    /// non-empty statement; sample cases come from the last component parsed.
    /// Solutions and test cases are concatenated in component order, visiting
    /// each component id once.
    pub async fn problem_data(&self, name: &str) -> Result<Option<ProblemData>, StoreError> {
        let Some(problem) = self.find_problem_by_name(name).await? else {
            return Ok(None);
        };

        let components = self.components_for_problem(problem.problem_id).await?;

        let mut statement = None;
        let mut sample_cases: Vec<SampleCase> = Vec::new();
        for component in &components {
            let Some(xml) = component.component_text.as_deref() else {
                continue;
            };
            if xml.is_empty() {
                continue;
            }
            statement = extract_statement(xml);
            sample_cases = extract_sample_cases(xml);
            if statement.is_some() {
                break;
            }
        }

        let mut solutions = Vec::new();
        let mut test_cases = Vec::new();
        let mut visited = HashSet::new();
        for component in &components {
            if !visited.insert(component.component_id) {
                continue;
            }
            solutions.extend(self.solutions_for_component(component.component_id).await?);
            test_cases.extend(self.test_cases_for_component(component.component_id).await?);
        }

        tracing::debug!(
            problem = %problem.name,
            components = components.len(),
            solutions = solutions.len(),
            test_cases = test_cases.len(),
            has_statement = statement.is_some(),
            "Problem data assembled"
        );

        Ok(Some(ProblemData {
            problem,
            statement,
            components,
            solutions,
            test_cases,
            sample_cases,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA_SQL: &str = r#"
CREATE TABLE problems (problem_id INTEGER, name TEXT, problem_text TEXT, status_id INTEGER,
    problem_type_id INTEGER, create_date TEXT, modify_date TEXT);
CREATE TABLE round_component (component_id TEXT, problem_id TEXT, class_name TEXT,
    method_name TEXT, component_text TEXT, points TEXT);
CREATE TABLE solutions (solution_id TEXT, component_id TEXT, solution_text TEXT, language_id TEXT);
CREATE TABLE system_test_cases (test_case_id TEXT, component_id TEXT, args TEXT, example_flag TEXT);
"#;

    async fn memory_store() -> TopcoderStore {
        let opts = SqliteConnectOptions::new().filename(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .unwrap();
        sqlx::raw_sql(SCHEMA_SQL).execute(&pool).await.unwrap();
        TopcoderStore::from_pool(pool)
    }

    async fn exec(store: &TopcoderStore, sql: &str) {
        sqlx::query(sql).execute(&store.pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TopcoderStore::open(dir.path().join("nope.db"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::MissingFile(_)));
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let store = memory_store().await;
        exec(&store, "INSERT INTO problems (problem_id, name) VALUES (1, 'CatRescue')").await;

        let lower = store.problem_data("catrescue").await.unwrap().unwrap();
        let exact = store.problem_data("CatRescue").await.unwrap().unwrap();
        assert_eq!(lower.problem, exact.problem);
        assert_eq!(lower.problem.problem_id, 1);
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let store = memory_store().await;
        assert!(store.problem_data("Missing").await.unwrap().is_none());
        assert!(store.find_problem_by_name("Missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_problem_without_components() {
        let store = memory_store().await;
        exec(&store, "INSERT INTO problems (problem_id, name) VALUES (5, 'Lonely')").await;

        let data = store.problem_data("lonely").await.unwrap().unwrap();
        assert!(data.statement.is_none());
        assert!(data.sample_cases.is_empty());
        assert!(data.components.is_empty());
        assert!(data.solutions.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_components_visited_once() {
        let store = memory_store().await;
        exec(&store, "INSERT INTO problems (problem_id, name) VALUES (2, 'Twice')").await;
        exec(
            &store,
            "INSERT INTO round_component (component_id, problem_id, component_text) VALUES ('10', '2', NULL), ('10', '2', NULL), ('11', '2', '')",
        )
        .await;
        exec(
            &store,
            "INSERT INTO solutions (solution_id, component_id, solution_text, language_id) VALUES ('s1', '10', 'code', '3'), ('s2', '11', 'more', '1')",
        )
        .await;
        exec(
            &store,
            "INSERT INTO system_test_cases (test_case_id, component_id, args, example_flag) VALUES ('100', '10', 'AAAA', '1')",
        )
        .await;

        let data = store.problem_data("TWICE").await.unwrap().unwrap();
        assert_eq!(data.components.len(), 3);
        assert_eq!(data.solutions.len(), 2);
        assert_eq!(data.solutions[0].solution_id.as_deref(), Some("s1"));
        assert_eq!(data.solutions[1].language().display_name(), "Java");
        assert_eq!(data.test_cases.len(), 1);
        assert!(data.test_cases[0].is_example());
        assert!(data.statement.is_none());
    }

    #[tokio::test]
    async fn test_statement_from_first_usable_component() {
        let store = memory_store().await;
        exec(&store, "INSERT INTO problems (problem_id, name) VALUES (3, 'Pick')").await;
        exec(
            &store,
            "INSERT INTO round_component (component_id, problem_id, component_text) VALUES \
             ('20', '3', '<problem><broken>'), \
             ('21', '3', '<problem><intro>Count the sheep.</intro><test-cases><test-case example=\"1\" id=\"4\"><annotation>one</annotation></test-case></test-cases></problem>')",
        )
        .await;

        let data = store.problem_data("pick").await.unwrap().unwrap();
        let statement = data.statement.unwrap();
        assert!(statement.starts_with("Count the sheep."));
        assert_eq!(
            data.sample_cases,
            vec![SampleCase {
                case_id: "4".to_string(),
                annotation: "one".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_example_problem_names_limit() {
        let store = memory_store().await;
        for i in 0..15 {
            exec(
                &store,
                &format!("INSERT INTO problems (problem_id, name) VALUES ({i}, 'P{i}')"),
            )
            .await;
        }
        let names = store.example_problem_names(EXAMPLE_NAME_LIMIT).await.unwrap();
        assert_eq!(names.len(), 10);
    }
}
