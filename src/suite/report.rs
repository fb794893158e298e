//! Per-case outcomes and run totals.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed {
        message: String,
        /// Network failure rather than a contract violation
        transport: bool,
    },
}

/// Result of running a single case
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub name: String,
    pub verdict: Verdict,
    pub elapsed: Duration,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}

/// Outcomes of a run, in execution order
#[derive(Debug, Clone, Default)]
pub struct Report {
    outcomes: Vec<CaseOutcome>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: CaseOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.passed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }

    /// Outcome for a case by its full name
    pub fn outcome(&self, name: &str) -> Option<&CaseOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    /// True when every case passed. An empty run counts as success.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn elapsed(&self) -> Duration {
        self.outcomes.iter().map(|outcome| outcome.elapsed).sum()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            let millis = outcome.elapsed.as_millis();
            match &outcome.verdict {
                Verdict::Passed => writeln!(f, "PASS {} ({millis} ms)", outcome.name)?,
                Verdict::Failed { message, transport } => {
                    let tag = if *transport { "ERROR" } else { "FAIL" };
                    writeln!(f, "{tag} {} ({millis} ms): {message}", outcome.name)?;
                }
            }
        }
        write!(
            f,
            "{} passed, {} failed, {} total",
            self.passed(),
            self.total() - self.passed(),
            self.total()
        )
    }
}
