use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use eyre::Report;

/// Terminal load failure, shared between every caller coalesced onto the
/// same in-flight load.
#[derive(Clone)]
pub struct LoadError {
    report: Arc<Report>,
}

impl LoadError {
    pub fn report(&self) -> &Report {
        &self.report
    }
}

impl From<Report> for LoadError {
    fn from(report: Report) -> LoadError {
        LoadError {
            report: Arc::new(report),
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.report, f)
    }
}

impl Debug for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.report, f)
    }
}
