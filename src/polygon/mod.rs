//! Polygon problem-preparation API.
//!
//! [`PolygonClient`] signs and sends API calls; the tools depend only on the
//! [`PolygonApi`] trait so that their workflows can run against an in-memory
//! fake in tests.

pub mod client;
pub mod statement;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{sign, PolygonApi, PolygonClient};
pub use statement::{fetch_statement_text, select_statement};
pub use types::{PolygonProblem, Statement};
