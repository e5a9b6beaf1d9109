//! Pure helpers for laying out an ICPC package.

use std::collections::{BTreeMap, HashMap};

use crate::store::{SampleCase, TestCaseRecord};

/// Extension of example tests in `original_tests/`.
pub const SAMPLE_EXTENSION: &str = ".sample";

/// Extension of the remaining tests.
pub const TEST_EXTENSION: &str = ".in";

/// Package directory name: lowercase, spaces replaced by underscores.
pub fn problem_dir_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Appends the non-empty sample annotations to the statement.
///
/// Examples keep their position among all sample cases, so a skipped
/// annotation leaves a gap in the numbering.
pub fn annotated_description(statement: &str, samples: &[SampleCase]) -> String {
    let mut out = format!("{}\nExplanations:", statement);
    for (i, sample) in samples.iter().enumerate() {
        if !sample.annotation.is_empty() {
            out.push_str(&format!("\n  Example #{}: {}", i + 1, sample.annotation));
        }
    }
    out
}

/// A test case in package order with its file extension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedTest<'a> {
    pub case: &'a TestCaseRecord,
    pub extension: &'static str,
}

impl OrderedTest<'_> {
    pub fn is_sample(&self) -> bool {
        self.extension == SAMPLE_EXTENSION
    }
}

/// Orders test cases for the package.
///
/// When every sample case carries an integer id, the matching test cases come
/// first in sample order and the rest follow in store order. Otherwise store
/// order is kept and the store's example flag decides the extension.
pub fn order_test_cases<'a>(
    tests: &'a [TestCaseRecord],
    samples: &[SampleCase],
) -> Vec<OrderedTest<'a>> {
    let Some(positions) = sample_positions(samples) else {
        return tests
            .iter()
            .map(|case| OrderedTest {
                case,
                extension: if case.is_example() {
                    SAMPLE_EXTENSION
                } else {
                    TEST_EXTENSION
                },
            })
            .collect();
    };

    let mut samples_first: Vec<&TestCaseRecord> = tests
        .iter()
        .filter(|t| positions.contains_key(&t.test_case_id))
        .collect();
    samples_first.sort_by_key(|t| positions[&t.test_case_id]);

    let sample_tests = samples_first.into_iter().map(|case| OrderedTest {
        case,
        extension: SAMPLE_EXTENSION,
    });
    let other_tests = tests
        .iter()
        .filter(|t| !positions.contains_key(&t.test_case_id))
        .map(|case| OrderedTest {
            case,
            extension: TEST_EXTENSION,
        });

    sample_tests.chain(other_tests).collect()
}

/// Maps sample ids to their position; `None` unless every id is an integer.
fn sample_positions(samples: &[SampleCase]) -> Option<HashMap<i64, usize>> {
    if samples.is_empty() {
        return None;
    }
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| s.case_id.trim().parse::<i64>().ok().map(|id| (id, i)))
        .collect()
}

/// Splits a reply made of `=== NAME ===` marked sections.
///
/// Section names are lowercased, text before the first marker is dropped and
/// a ```` ```latex ```` wrapper around a section body is removed.
pub fn split_sections(reply: &str) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in reply.lines() {
        let marker = line
            .trim_end()
            .strip_prefix("=== ")
            .and_then(|rest| rest.strip_suffix(" ==="));

        match marker {
            Some(name) => {
                if let Some(section) = current.take() {
                    sections.insert(section, strip_latex_wrapper(&body.join("\n")));
                }
                current = Some(name.to_lowercase());
                body.clear();
            }
            None => body.push(line),
        }
    }
    if let Some(section) = current {
        sections.insert(section, strip_latex_wrapper(&body.join("\n")));
    }

    sections
}

fn strip_latex_wrapper(content: &str) -> String {
    let mut content = content.trim();
    if let Some(rest) = content.strip_prefix("```latex") {
        content = rest.trim_start_matches('\n');
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest.trim_end_matches('\n');
    }
    content.to_string()
}
