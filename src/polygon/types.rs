//! Polygon API data types.

use serde::{Deserialize, Serialize};

/// A problem as listed by `contest.problems`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonProblem {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub favourite: bool,
    #[serde(default)]
    pub access_type: Option<String>,
    #[serde(default)]
    pub revision: Option<i64>,
    /// Revision of the latest built package, absent when none was built.
    #[serde(default)]
    pub latest_package: Option<i64>,
    #[serde(default)]
    pub modified: Option<bool>,
}

/// One language version of a problem statement. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub legend: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub scoring: Option<String>,
    #[serde(default)]
    pub interaction: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tutorial: Option<String>,
}

/// Response envelope shared by every API method.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub result: Option<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_problem_deserialization() {
        let json = r#"{"id": 42, "owner": "jury", "name": "a-plus-b", "deleted": false,
            "favourite": true, "accessType": "OWNER", "revision": 7, "modified": false}"#;
        let problem: PolygonProblem = serde_json::from_str(json).unwrap();
        assert_eq!(problem.id, 42);
        assert_eq!(problem.access_type.as_deref(), Some("OWNER"));
        assert_eq!(problem.latest_package, None);
    }

    #[test]
    fn test_statement_sections_are_optional() {
        let json = r#"{"english": {"encoding": "UTF-8", "name": "A+B", "legend": "Add."},
            "russian": {"legend": null}}"#;
        let statements: BTreeMap<String, Statement> = serde_json::from_str(json).unwrap();
        assert_eq!(statements["english"].legend.as_deref(), Some("Add."));
        assert!(statements["english"].input.is_none());
        assert_eq!(statements["russian"], Statement::default());
    }

    #[test]
    fn test_failed_envelope() {
        let json = r#"{"status": "FAILED", "comment": "problemId: Problem not found"}"#;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, "FAILED");
        assert!(envelope.result.is_none());
        assert_eq!(envelope.comment.as_deref(), Some("problemId: Problem not found"));
    }
}
