//! Error taxonomy: Fatal / User / Transient / Silent.
//!
//! Silent cases (inactive-parameter writes, disabled-visibility reads) are
//! not represented here at all — they are simply not constructed as
//! errors, matching "skipped with no diagnostic".

use thiserror::Error;

/// Unrecoverable conditions: abort with a diagnostic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FatalError {
    #[error("shared-memory root directory missing: {0}")]
    ShmRootMissing(String),
    #[error("mmap failed for {path}: {reason}")]
    MmapFailed { path: String, reason: String },
    #[error("{what} capacity overflow: {used}/{capacity}")]
    CapacityOverflow {
        what: &'static str,
        used: usize,
        capacity: usize,
    },
}

/// Conditions caused by user/operator input: reported, not fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserError {
    #[error("argument type mismatch for '{arg}': expected {expected}, got {got}")]
    ArgTypeMismatch {
        arg: String,
        expected: String,
        got: String,
    },
    #[error("{kind} value {value} above max {max}")]
    AboveMax { kind: String, value: f64, max: f64 },
    #[error("{kind} value {value} below min {min}")]
    BelowMin { kind: String, value: f64, min: f64 },
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown parameter path: {0}")]
    UnknownPath(String),
    #[error("required file missing: {0}")]
    MissingFile(String),
    #[error("required stream missing: {0}")]
    MissingStream(String),
    #[error("not initialized")]
    NotInitialized,
    #[error("command '{cmd}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        cmd: String,
        expected: usize,
        got: usize,
    },
}

/// Conditions that may resolve themselves: operation returns "not ready",
/// caller may retry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransientError {
    #[error("fifo read would block")]
    FifoWouldBlock,
    #[error("stream not yet created: {0}")]
    StreamNotReady(String),
    #[error("referenced fps not yet present: {0}")]
    FpsNotPresent(String),
}

/// Top-level error taxonomy returned by fallible FPS operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FpsOpError {
    #[error(transparent)]
    Fatal(#[from] FatalError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Transient(#[from] TransientError),
    #[error(transparent)]
    Value(#[from] crate::value::ValueCellError),
}
