//! The conformance suite: case catalog, runner and report.

pub mod case;
pub mod error;
pub mod report;
pub mod runner;

pub use case::{Case, CaseFilter, CaseKind};
pub use error::ConformanceError;
pub use report::{CaseOutcome, Report, Verdict};
pub use runner::Runner;
