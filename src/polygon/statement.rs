//! Statement text assembly for Polygon problems.

use std::collections::BTreeMap;

use super::client::PolygonApi;
use super::types::{PolygonProblem, Statement};
use crate::error::PolygonError;

/// Languages tried before falling back to whatever is available.
const PREFERRED_LANGUAGES: &[&str] = &["english", "en"];

impl Statement {
    /// Joins the present, non-empty sections as labelled paragraphs.
    pub fn collect_text(&self) -> String {
        let sections = [
            ("Legend", &self.legend),
            ("Input", &self.input),
            ("Scoring", &self.scoring),
            ("Output", &self.output),
            ("Notes", &self.notes),
        ];

        sections
            .iter()
            .filter_map(|(label, text)| match text.as_deref() {
                Some(t) if !t.is_empty() => Some(format!("{}: {}", label, t)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Picks the English statement, or the first language available.
pub fn select_statement(
    statements: &BTreeMap<String, Statement>,
) -> Option<(&str, &Statement)> {
    PREFERRED_LANGUAGES
        .iter()
        .find_map(|lang| statements.get_key_value(*lang))
        .or_else(|| statements.iter().next())
        .map(|(lang, statement)| (lang.as_str(), statement))
}

/// Fetches the statements of `problem` and returns the collected text of the
/// preferred language.
pub async fn fetch_statement_text(
    api: &dyn PolygonApi,
    problem: &PolygonProblem,
) -> Result<String, PolygonError> {
    let statements = api.problem_statements(problem.id).await?;
    let (lang, statement) =
        select_statement(&statements).ok_or(PolygonError::NoStatements(problem.id))?;

    if !PREFERRED_LANGUAGES.contains(&lang) {
        tracing::warn!(problem = %problem.name, language = lang, "Using non-English statement");
    }

    Ok(statement.collect_text())
}
