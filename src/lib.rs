//! Pulse conformance checker
//!
//! Drives the books and roles collections of a REST service through their
//! create/read/update/delete contract and reports every deviation.

pub mod modules;
pub mod suite;
pub mod utils;

use anyhow::Context;
use pulse_kernel::settings::Settings;

pub use suite::{CaseFilter, Report, Runner};

/// Run every registered resource's cases selected by `filter` against
/// `settings.target`.
pub async fn run_suite(settings: &Settings, filter: &CaseFilter) -> anyhow::Result<Report> {
    let registry = modules::default_registry();
    let runner = Runner::from_settings(settings)
        .with_context(|| format!("failed to prepare client for {}", settings.target.base_url))?;
    Ok(runner.run(&registry, filter).await)
}
