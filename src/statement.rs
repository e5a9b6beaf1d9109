//! Flattening of TopCoder statement XML.
//!
//! Component statements are XML documents (usually in the
//! `http://topcoder.com` namespace) mixing narrative markup with the test
//! cases of the problem. [`extract_statement`] turns one into plain text with
//! section markers; [`extract_sample_cases`] pulls out the example-flagged
//! cases and their annotations.

use roxmltree::{Document, Node};

use crate::store::SampleCase;

const TEST_CASES: &str = "test-cases";
const TEST_CASE: &str = "test-case";
const ANNOTATION: &str = "annotation";

fn is_element(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn is_example(node: &Node<'_, '_>) -> bool {
    node.attribute("example") == Some("1")
}

fn is_escaped(node: &Node<'_, '_>) -> bool {
    node.attribute("escaped") == Some("1")
}

fn unescape(text: String) -> String {
    html_escape::decode_html_entities(&text).into_owned()
}

/// All descendant text of `node`, in document order.
fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn render(node: Node<'_, '_>) -> String {
    let mut out = String::new();
    for child in node.children() {
        if child.is_text() {
            out.push_str(child.text().unwrap_or_default());
        } else if child.is_element() {
            if is_element(&child, TEST_CASE) && !is_example(&child) {
                continue;
            }
            out.push_str(&render(child));
        }
    }

    match node.tag_name().name() {
        TEST_CASE => format!("\n Test case: \n{}", out),
        "notes" => format!("\n Constraints: \n{}", out),
        "output" => format!("\n\n Output: \n{}\n\n", out),
        _ => out,
    }
}

/// Flattens a statement document into narrative text.
///
/// Non-example test cases are left out. Returns `None` for malformed XML or
/// when nothing but whitespace remains.
pub fn extract_statement(xml: &str) -> Option<String> {
    let doc = match Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "Statement XML parsing failed");
            return None;
        }
    };

    let root = doc.root_element();
    let mut text = render(root);
    if is_escaped(&root) {
        text = unescape(text);
    }

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Collects the example test cases listed under the first `test-cases`
/// element, in document order.
pub fn extract_sample_cases(xml: &str) -> Vec<SampleCase> {
    let doc = match Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "Sample case extraction failed");
            return Vec::new();
        }
    };

    let Some(container) = doc.descendants().find(|n| is_element(n, TEST_CASES)) else {
        return Vec::new();
    };

    container
        .children()
        .filter(|n| is_element(n, TEST_CASE) && is_example(n))
        .map(|case| {
            let annotation = case
                .children()
                .find(|n| is_element(n, ANNOTATION))
                .map(|a| {
                    let text = inner_text(a);
                    if is_escaped(&a) {
                        unescape(text)
                    } else {
                        text
                    }
                })
                .unwrap_or_default();

            SampleCase {
                case_id: case.attribute("id").unwrap_or_default().to_string(),
                annotation,
            }
        })
        .collect()
}
