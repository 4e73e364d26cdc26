//! Default [`SessionManager`]: spawns the conf/run worker as a child
//! process running this same binary in the appropriate role.

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::symlink;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use fps_core::error::{FatalError, TransientError};
use fps_core::{FpsOpError, SessionManager};

use crate::error::fatal_io;

/// Spawns `<exe> conf <name>` / `<exe> run <name>` child processes and
/// signals them via `SIGTERM` on stop.
pub struct ProcessSessionManager {
    exe_path: PathBuf,
}

impl ProcessSessionManager {
    pub fn new(exe_path: PathBuf) -> Self {
        Self { exe_path }
    }

    /// Use the currently running executable as the conf/run worker.
    pub fn current_exe() -> Result<Self, FpsOpError> {
        let exe_path = std::env::current_exe()
            .map_err(|e| FpsOpError::from(FatalError::MmapFailed {
                path: "<current_exe>".to_string(),
                reason: e.to_string(),
            }))?;
        Ok(Self::new(exe_path))
    }

    fn spawn(&self, role: &str, fps_name: &str) -> Result<i32, FpsOpError> {
        let child = Command::new(&self.exe_path)
            .arg(role)
            .arg(fps_name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| FpsOpError::from(TransientError::FpsNotPresent(format!("{fps_name}: spawn {role} failed: {e}"))))?;
        Ok(child.id() as i32)
    }

    fn kill(&self, pid: i32) -> Result<(), FpsOpError> {
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::NotFound {
                return Err(FpsOpError::from(TransientError::FpsNotPresent(format!(
                    "kill({pid}): {err}"
                ))));
            }
        }
        Ok(())
    }
}

impl SessionManager for ProcessSessionManager {
    fn start_conf(&self, fps_name: &str) -> Result<i32, FpsOpError> {
        self.spawn("conf", fps_name)
    }

    fn start_run(&self, fps_name: &str) -> Result<i32, FpsOpError> {
        self.spawn("run", fps_name)
    }

    fn stop_conf(&self, pid: i32) -> Result<(), FpsOpError> {
        self.kill(pid)
    }

    fn stop_run(&self, pid: i32) -> Result<(), FpsOpError> {
        self.kill(pid)
    }

    fn now_us(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }

    fn sleep_us(&self, us: u64) {
        std::thread::sleep(std::time::Duration::from_micros(us));
    }

    fn append_to_file(&self, path: &str, text: &str) -> Result<(), FpsOpError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| fatal_io("open fwrval target", path, &e))?;
        writeln!(file, "{text}").map_err(|e| fatal_io("write fwrval target", path, &e))?;
        Ok(())
    }

    fn ensure_symlink(&self, target: &str, link_path: &str) -> Result<(), FpsOpError> {
        if std::fs::symlink_metadata(link_path).is_ok() {
            let _ = std::fs::remove_file(link_path);
        }
        symlink(target, link_path).map_err(|e| fatal_io("symlink", link_path, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_us_is_monotonic_enough_for_polling() {
        let sessions = ProcessSessionManager::new(PathBuf::from("/bin/true"));
        let first = sessions.now_us();
        sessions.sleep_us(1);
        let second = sessions.now_us();
        assert!(second >= first);
    }

    #[test]
    fn append_to_file_creates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fwrval.out");
        let sessions = ProcessSessionManager::new(PathBuf::from("/bin/true"));
        sessions.append_to_file(path.to_str().unwrap(), "first").unwrap();
        sessions.append_to_file(path.to_str().unwrap(), "second").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn ensure_symlink_replaces_an_existing_link() {
        let dir = tempfile::tempdir().unwrap();
        let target_a = dir.path().join("a");
        let target_b = dir.path().join("b");
        std::fs::write(&target_a, "a").unwrap();
        std::fs::write(&target_b, "b").unwrap();
        let link = dir.path().join("link");

        let sessions = ProcessSessionManager::new(PathBuf::from("/bin/true"));
        sessions.ensure_symlink(target_a.to_str().unwrap(), link.to_str().unwrap()).unwrap();
        sessions.ensure_symlink(target_b.to_str().unwrap(), link.to_str().unwrap()).unwrap();

        assert_eq!(std::fs::read_link(&link).unwrap(), target_b);
    }
}
