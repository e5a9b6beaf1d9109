//! Read access to a TopCoder archive stored in SQLite.
//!
//! [`TopcoderStore`] resolves a problem name into a [`ProblemData`] snapshot:
//! the problem row, its components, every solution and system test case of
//! those components, and the statement text and sample cases extracted from
//! the component XML.

pub mod database;
pub mod records;

pub use database::{StoreError, TopcoderStore, EXAMPLE_NAME_LIMIT};
pub use records::{
    ComponentRecord, ProblemData, ProblemRecord, SampleCase, SolutionLanguage, SolutionRecord,
    TestCaseRecord,
};
