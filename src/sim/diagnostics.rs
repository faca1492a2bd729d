//! Structured diagnostics emitted while validating step inputs.

use std::fmt;

use serde::Serialize;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// Which declared bound a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    Minimum,
    Maximum,
}

/// One non-fatal finding about a written input value.
///
/// Emitted when a requested value lands outside its declared bounds
/// and is truncated to the nearest one. Tests and callers can assert
/// on these records instead of scraping log text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Finding severity; bound violations are warnings.
    pub severity: Severity,
    /// Variable the value was written to.
    pub variable: String,
    /// Value the caller requested.
    pub requested: f64,
    /// Which bound was violated.
    pub bound: BoundKind,
    /// The declared bound value.
    pub limit: f64,
    /// Value actually applied after truncation.
    pub applied: f64,
}

impl Diagnostic {
    /// Finding for a value truncated down to its declared maximum.
    pub fn above_maximum(variable: impl Into<String>, requested: f64, limit: f64) -> Self {
        Self {
            severity: Severity::Warning,
            variable: variable.into(),
            requested,
            bound: BoundKind::Maximum,
            limit,
            applied: limit,
        }
    }

    /// Finding for a value truncated up to its declared minimum.
    pub fn below_minimum(variable: impl Into<String>, requested: f64, limit: f64) -> Self {
        Self {
            severity: Severity::Warning,
            variable: variable.into(),
            requested,
            bound: BoundKind::Minimum,
            limit,
            applied: limit,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        let relation = match self.bound {
            BoundKind::Minimum => "below minimum",
            BoundKind::Maximum => "above maximum",
        };
        write!(
            f,
            "{tag}: value {} for {} is {relation} of {}, using {}",
            self.requested, self.variable, self.limit, self.applied
        )
    }
}
