//! In-memory Polygon used by workflow tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use super::client::PolygonApi;
use super::types::{PolygonProblem, Statement};
use crate::error::PolygonError;

fn failed(method: &str, comment: &str) -> PolygonError {
    PolygonError::Failed {
        method: method.to_string(),
        comment: comment.to_string(),
    }
}

/// Serves canned contest data and records every mutating call.
#[derive(Default)]
pub struct FakePolygon {
    pub contests: HashMap<i64, BTreeMap<String, PolygonProblem>>,
    pub statements: HashMap<i64, BTreeMap<String, Statement>>,
    pub validators: HashMap<i64, String>,
    /// Problems whose validator lookup fails.
    pub validator_errors: Vec<i64>,
    /// `(problem, testset) -> input of test 1`.
    pub test_inputs: HashMap<(i64, String), String>,
    /// Errors returned by successive `setValidator` calls.
    set_validator_failures: Mutex<VecDeque<String>>,
    saved_files: Mutex<Vec<(i64, String, String)>>,
    calls: Mutex<Vec<String>>,
}

pub fn problem(id: i64, name: &str) -> PolygonProblem {
    PolygonProblem {
        id,
        name: name.to_string(),
        owner: "jury".to_string(),
        deleted: false,
        favourite: false,
        access_type: Some("OWNER".to_string()),
        revision: Some(1),
        latest_package: None,
        modified: Some(false),
    }
}

impl FakePolygon {
    pub fn with_contest(mut self, contest_id: i64, problems: Vec<PolygonProblem>) -> Self {
        let map = problems
            .into_iter()
            .enumerate()
            .map(|(i, p)| (((b'A' + i as u8) as char).to_string(), p))
            .collect();
        self.contests.insert(contest_id, map);
        self
    }

    pub fn with_statement(mut self, problem_id: i64, lang: &str, legend: &str) -> Self {
        self.statements.entry(problem_id).or_default().insert(
            lang.to_string(),
            Statement {
                legend: Some(legend.to_string()),
                ..Default::default()
            },
        );
        self
    }

    pub fn fail_set_validator(&self, comment: &str) {
        self.set_validator_failures
            .lock()
            .unwrap()
            .push_back(comment.to_string());
    }

    pub fn saved_files(&self) -> Vec<(i64, String, String)> {
        self.saved_files.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PolygonApi for FakePolygon {
    async fn contest_problems(
        &self,
        contest_id: i64,
    ) -> Result<BTreeMap<String, PolygonProblem>, PolygonError> {
        self.contests
            .get(&contest_id)
            .cloned()
            .ok_or_else(|| failed("contest.problems", "contestId: Contest not found"))
    }

    async fn problem_statements(
        &self,
        problem_id: i64,
    ) -> Result<BTreeMap<String, Statement>, PolygonError> {
        Ok(self.statements.get(&problem_id).cloned().unwrap_or_default())
    }

    async fn problem_validator(&self, problem_id: i64) -> Result<String, PolygonError> {
        if self.validator_errors.contains(&problem_id) {
            return Err(failed("problem.validator", "access denied"));
        }
        Ok(self.validators.get(&problem_id).cloned().unwrap_or_default())
    }

    async fn problem_test_input(
        &self,
        problem_id: i64,
        testset: &str,
        test_index: u32,
    ) -> Result<String, PolygonError> {
        if test_index != 1 {
            return Err(failed("problem.testInput", "testIndex: no such test"));
        }
        self.test_inputs
            .get(&(problem_id, testset.to_string()))
            .cloned()
            .ok_or_else(|| failed("problem.testInput", "testset: no such testset"))
    }

    async fn update_working_copy(&self, problem_id: i64) -> Result<(), PolygonError> {
        self.record(format!("updateWorkingCopy {}", problem_id));
        Ok(())
    }

    async fn save_source_file(
        &self,
        problem_id: i64,
        name: &str,
        content: &str,
    ) -> Result<(), PolygonError> {
        self.record(format!("saveFile {} {}", problem_id, name));
        self.saved_files
            .lock()
            .unwrap()
            .push((problem_id, name.to_string(), content.to_string()));
        Ok(())
    }

    async fn set_validator(&self, problem_id: i64, name: &str) -> Result<(), PolygonError> {
        self.record(format!("setValidator {} {}", problem_id, name));
        match self.set_validator_failures.lock().unwrap().pop_front() {
            Some(comment) => Err(failed("problem.setValidator", &comment)),
            None => Ok(()),
        }
    }

    async fn commit_changes(
        &self,
        problem_id: i64,
        minor_changes: bool,
        message: &str,
    ) -> Result<(), PolygonError> {
        self.record(format!(
            "commitChanges {} {} {}",
            problem_id, minor_changes, message
        ));
        Ok(())
    }
}
