//! Top-level error type for bench construction and stepping.

use thiserror::Error;

use crate::config::ConfigError;
use crate::data::DataError;
use crate::emulator::EmulatorError;

/// Errors surfaced by [`TestBench`](crate::sim::bench::TestBench) operations.
///
/// Step-level failures leave the bench untouched: the clock does not
/// move and no partial results are committed, so the caller can correct
/// the request and retry the same interval.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The emulator reports an interface version the bench cannot drive.
    #[error("unsupported emulator interface {found:?}, bench requires {required:?}")]
    UnsupportedInterface {
        found: String,
        required: &'static str,
    },

    /// The bench configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Boundary data or KPI specification could not be loaded.
    #[error(transparent)]
    Data(#[from] DataError),

    /// A written input value is NaN or infinite.
    #[error("input {variable:?} is not a finite number")]
    NonFiniteInput { variable: String },

    /// A written input name is not declared by the emulator.
    #[error("unknown input variable {variable:?}")]
    UnknownInput { variable: String },

    /// A runtime parameter update was rejected.
    #[error("invalid {name}: {value} ({constraint})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// The emulator failed to simulate the step window.
    #[error(transparent)]
    Emulator(#[from] EmulatorError),

    /// The emulator returned a result the bench cannot merge.
    #[error("malformed emulator output: {reason}")]
    MalformedOutput { reason: String },
}
