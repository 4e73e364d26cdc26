//! Non-blocking reader for the command FIFO: skips blank lines and
//! `#`-prefixed comments, and bounds every line to `CMD_LINE_MAX`.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use fps_core::limits::CMD_LINE_MAX;
use fps_core::FpsOpError;

use crate::error::fatal_io;

/// Create the named pipe at `path` if it does not already exist.
pub fn ensure_fifo(path: &Path) -> Result<(), FpsOpError> {
    if path.exists() {
        return Ok(());
    }
    let c_path = std::ffi::CString::new(path.as_os_str().to_string_lossy().as_bytes())
        .map_err(|e| fatal_io("fifo path contains NUL", &path.display().to_string(), &std::io::Error::other(e)))?;
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() != ErrorKind::AlreadyExists {
            return Err(fatal_io("mkfifo", &path.display().to_string(), &err));
        }
    }
    Ok(())
}

/// Reads command lines from a FIFO opened in non-blocking mode.
pub struct FifoReader {
    path: PathBuf,
    reader: BufReader<File>,
}

impl FifoReader {
    pub fn open(path: &Path) -> Result<Self, FpsOpError> {
        ensure_fifo(path)?;
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| fatal_io("open fifo", &path.display().to_string(), &e))?;
        Ok(Self { path: path.to_path_buf(), reader: BufReader::new(file) })
    }

    /// Return the next meaningful command line, or `None` if nothing is
    /// currently pending. Never blocks.
    pub fn try_read_line(&mut self) -> Result<Option<String>, FpsOpError> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    let mut owned = trimmed.to_string();
                    owned.truncate(CMD_LINE_MAX);
                    return Ok(Some(owned));
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(e) => return Err(fatal_io("read fifo", &self.path.display().to_string(), &e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions as StdOpenOptions;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn skips_comments_and_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cmd.fifo");
        ensure_fifo(&path).unwrap();

        // Open a writer first so the reader's open() doesn't see ENXIO,
        // then open the reader non-blocking.
        let mut writer = StdOpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .unwrap();
        writeln!(writer, "# a comment").unwrap();
        writeln!(writer).unwrap();
        writeln!(writer, "setval myfps.delay 5").unwrap();
        writer.flush().unwrap();

        let mut reader = FifoReader::open(&path).unwrap();
        let line = reader.try_read_line().unwrap();
        assert_eq!(line.as_deref(), Some("setval myfps.delay 5"));
    }

    #[test]
    fn empty_fifo_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cmd.fifo");
        ensure_fifo(&path).unwrap();
        let _keepalive = StdOpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .unwrap();
        let mut reader = FifoReader::open(&path).unwrap();
        assert_eq!(reader.try_read_line().unwrap(), None);
    }
}
