//! Maps OS-level I/O failures onto the `fps_core` error taxonomy.

use fps_core::{FatalError, FpsOpError, TransientError};
use std::io;

/// Wrap a filesystem error that should abort the calling process.
pub fn fatal_io(what: &'static str, path: &str, err: &io::Error) -> FpsOpError {
    FatalError::MmapFailed {
        path: path.to_string(),
        reason: format!("{what}: {err}"),
    }
    .into()
}

/// Wrap a filesystem error that the caller may retry (e.g. a FIFO with no
/// reader yet, or a stream not created by its producer).
pub fn transient_io(name: &str, err: &io::Error) -> FpsOpError {
    if err.kind() == io::ErrorKind::WouldBlock {
        TransientError::FifoWouldBlock.into()
    } else {
        TransientError::StreamNotReady(format!("{name}: {err}")).into()
    }
}
