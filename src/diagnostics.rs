//! # Diagnostics
//!
//! Skipped parts, skipped variables and import progress are not errors. They are reported as
//! leveled records that the host can show to the user. Every record is also forwarded to the
//! [`log`] facade under the `ensight` target.

use log::Level;

/// one leveled message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Collects the diagnostic records of an import run
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report<S: Into<String>>(&mut self, level: Level, message: S) {
        let message = message.into();
        log::log!(target: "ensight", level, "{}", message);
        self.records.push(Diagnostic { level, message });
    }

    pub fn info<S: Into<String>>(&mut self, message: S) {
        self.report(Level::Info, message)
    }

    pub fn warn<S: Into<String>>(&mut self, message: S) {
        self.report(Level::Warn, message)
    }

    pub fn debug<S: Into<String>>(&mut self, message: S) {
        self.report(Level::Debug, message)
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// records of exactly `level`
    pub fn with_level(&self, level: Level) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.records
            .iter()
            .filter(move |record| record.level == level)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.with_level(Level::Warn)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }
}
