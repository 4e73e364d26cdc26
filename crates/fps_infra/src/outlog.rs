//! Output log writer: one append-only, timestamped log file per process,
//! plus a `fpslog.<role>` convenience symlink. Matches the on-disk
//! behavior an operator tailing `fpslog.conf` or `fpslog.run` expects:
//! GMT timestamps to nanosecond resolution, a `LOGFILECLOSE` sentinel
//! that closes and deletes the file on clean exit.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use fps_core::FpsOpError;

use crate::error::fatal_io;

/// Render the current GMT time as `YYYYMMDDTHHMMSS.NNNNNNNNN`.
fn gmt_timestring() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() as i64;
    let nanos = now.subsec_nanos();

    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    unsafe {
        libc::gmtime_r(&secs, &mut tm);
    }

    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}.{:09}",
        1900 + tm.tm_year,
        1 + tm.tm_mon,
        tm.tm_mday,
        tm.tm_hour,
        tm.tm_min,
        tm.tm_sec,
        nanos,
    )
}

fn log_filename(shm_dir: &Path, fps_timestamp: i64, pid: i32, process_type: &str) -> PathBuf {
    shm_dir.join(format!("fpslog.{fps_timestamp}.{pid:07}.{process_type}"))
}

fn link_filename(shm_dir: &Path, process_type: &str) -> PathBuf {
    shm_dir.join(format!("fpslog.{process_type}"))
}

/// One process's output log, opened once and appended to for its lifetime.
pub struct OutLog {
    file: File,
    log_path: PathBuf,
    closed: bool,
}

impl OutLog {
    /// Open (creating if needed) the log file for this process and
    /// (re)point the `fpslog.<process_type>` symlink at it.
    pub fn open(shm_dir: &Path, fps_timestamp: i64, pid: i32, process_type: &str) -> Result<Self, FpsOpError> {
        let log_path = log_filename(shm_dir, fps_timestamp, pid, process_type);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| fatal_io("open outlog", &log_path.display().to_string(), &e))?;

        let link_path = link_filename(shm_dir, process_type);
        if link_path.exists() || link_path.symlink_metadata().is_ok() {
            let _ = std::fs::remove_file(&link_path);
        }
        if let Err(e) = symlink(&log_path, &link_path) {
            return Err(fatal_io("symlink outlog", &link_path.display().to_string(), &e));
        }

        Ok(Self { file, log_path, closed: false })
    }

    /// Append one log entry: `<timestring> <keyword padded to 12> <message>`.
    /// `keyw == "LOGFILECLOSE"` closes and removes the log file after
    /// writing the entry, matching a clean process exit.
    pub fn log(&mut self, keyw: &str, msgstring: &str) -> Result<(), FpsOpError> {
        if self.closed {
            return Ok(());
        }
        let timestring = gmt_timestring();
        writeln!(self.file, "{timestring} {keyw:<12} {msgstring}")
            .map_err(|e| fatal_io("write outlog", &self.log_path.display().to_string(), &e))?;
        self.file
            .flush()
            .map_err(|e| fatal_io("flush outlog", &self.log_path.display().to_string(), &e))?;

        if keyw == "LOGFILECLOSE" {
            self.closed = true;
            let _ = std::fs::remove_file(&self.log_path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_writes_keyword_and_message() {
        let dir = tempdir().unwrap();
        let mut log = OutLog::open(dir.path(), 1_700_000_000, 4242, "conf").unwrap();
        log.log("STARTUP", "hello").unwrap();

        let contents = std::fs::read_to_string(&log.log_path).unwrap();
        assert!(contents.contains("STARTUP"));
        assert!(contents.contains("hello"));

        let link = link_filename(dir.path(), "conf");
        assert!(link.symlink_metadata().is_ok());
    }

    #[test]
    fn logfileclose_removes_file() {
        let dir = tempdir().unwrap();
        let mut log = OutLog::open(dir.path(), 1_700_000_000, 4242, "run").unwrap();
        let path = log.log_path.clone();
        log.log("LOGFILECLOSE", "bye").unwrap();
        assert!(!path.exists());

        // Further writes after close are no-ops, not errors.
        log.log("IGNORED", "after close").unwrap();
    }
}
