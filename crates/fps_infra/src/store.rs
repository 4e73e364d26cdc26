//! `StoreIo`: create/connect/disconnect/destroy of an FPS's backing file,
//! plus the per-parameter plain-text persistence files under
//! `<fps_directory>/fpsconf/<path>/<tag>.txt`.
//!
//! The shared-memory file itself (`<root>/<name>.fps.shm`) holds the
//! serialized [`Fps`] and is mapped read-only for zero-copy connects;
//! writers go through a normal truncate-and-rewrite, matching how the
//! rest of this stack treats durability (see [`crate::error`]).

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fps_core::{Fps, FpsOpError};
use memmap2::Mmap;

use crate::error::fatal_io;

const SHM_SUFFIX: &str = ".fps.shm";

/// Path of the shared-memory-backed file for `name` under `root`.
pub fn shm_path(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{name}{SHM_SUFFIX}"))
}

/// Create a fresh FPS and persist it under `root`.
pub fn create(root: &Path, name: &str, fps_directory: &str) -> Result<Fps, FpsOpError> {
    let fps = Fps::create(name, fps_directory).map_err(|e| {
        fatal_io("create fps", &shm_path(root, name).display().to_string(), &std::io::Error::other(e))
    })?;
    persist(root, &fps)?;
    Ok(fps)
}

/// Connect to an existing FPS by mapping its backing file and
/// deserializing the header+parameter array out of the mapped bytes.
pub fn connect(root: &Path, name: &str) -> Result<Fps, FpsOpError> {
    let path = shm_path(root, name);
    let file = File::open(&path).map_err(|e| fatal_io("open fps file", &path.display().to_string(), &e))?;
    // SAFETY: the mapped file is exclusively managed by this module's
    // create/persist pair; no other process truncates it concurrently.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| fatal_io("mmap fps file", &path.display().to_string(), &e))?;
    serde_json::from_slice(&mmap[..]).map_err(|e| {
        fatal_io("deserialize fps", &path.display().to_string(), &std::io::Error::other(e))
    })
}

/// Overwrite the backing file with the current in-memory state.
/// Writers always go through this, never a direct mmap store, so a
/// truncated write can never race a reader's mapping mid-update.
pub fn persist(root: &Path, fps: &Fps) -> Result<(), FpsOpError> {
    let path = shm_path(root, fps.header.name());
    let bytes = serde_json::to_vec(fps).map_err(|e| {
        fatal_io("serialize fps", &path.display().to_string(), &std::io::Error::other(e))
    })?;
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|e| fatal_io("open fps file for write", &path.display().to_string(), &e))?;
    file.write_all(&bytes).map_err(|e| fatal_io("write fps file", &path.display().to_string(), &e))?;
    file.sync_all().map_err(|e| fatal_io("fsync fps file", &path.display().to_string(), &e))?;
    Ok(())
}

/// Drop an FPS's backing file. A missing file is not an error: `fpsrm`
/// against an already-removed FPS is idempotent.
pub fn destroy(root: &Path, name: &str) -> Result<(), FpsOpError> {
    let path = shm_path(root, name);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(fatal_io("remove fps file", &path.display().to_string(), &e)),
    }
}

/// Directory holding one parameter's persisted plain-text value:
/// `<fps_directory>/fpsconf/<dotted_path_with_slashes>/`.
fn param_dir(fps_directory: &str, keyword_full: &str) -> PathBuf {
    Path::new(fps_directory)
        .join("fpsconf")
        .join(keyword_full.replace('.', "/"))
}

/// Write one parameter's current value as plain text, per the per-kind
/// formatting in [`fps_core::ValueCell::format_persisted`].
pub fn save_param_text(
    fps_directory: &str,
    keyword_full: &str,
    tag: &str,
    body: &str,
) -> Result<(), FpsOpError> {
    let dir = param_dir(fps_directory, keyword_full);
    fs::create_dir_all(&dir).map_err(|e| fatal_io("create param dir", &dir.display().to_string(), &e))?;
    let path = dir.join(format!("{tag}.txt"));
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|e| fatal_io("open param file", &path.display().to_string(), &e))?;
    writeln!(file, "{body}").map_err(|e| fatal_io("write param file", &path.display().to_string(), &e))?;
    Ok(())
}

/// Read a previously persisted parameter's raw text body, if present.
pub fn load_param_text(fps_directory: &str, keyword_full: &str, tag: &str) -> Option<String> {
    let path = param_dir(fps_directory, keyword_full).join(format!("{tag}.txt"));
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fps_core::param::KeywordPath;
    use fps_core::ValueKind;
    use tempfile::tempdir;

    #[test]
    fn create_then_connect_roundtrips() {
        let dir = tempdir().unwrap();
        let mut fps = create(dir.path(), "myfps", dir.path().to_str().unwrap()).unwrap();
        fps.add_entry(KeywordPath::parse("delay").unwrap(), ValueKind::Int64, "delay")
            .unwrap();
        persist(dir.path(), &fps).unwrap();

        let reconnected = connect(dir.path(), "myfps").unwrap();
        assert_eq!(reconnected.header.name(), "myfps");
        assert_eq!(reconnected.active_parameters().count(), 1);
    }

    #[test]
    fn destroy_is_idempotent() {
        let dir = tempdir().unwrap();
        create(dir.path(), "tossme", dir.path().to_str().unwrap()).unwrap();
        destroy(dir.path(), "tossme").unwrap();
        destroy(dir.path(), "tossme").unwrap();
        assert!(!shm_path(dir.path(), "tossme").exists());
    }

    #[test]
    fn param_text_roundtrips() {
        let dir = tempdir().unwrap();
        let fpsdir = dir.path().to_str().unwrap();
        save_param_text(fpsdir, "conf.delay", "delay", "  42").unwrap();
        assert_eq!(load_param_text(fpsdir, "conf.delay", "delay"), Some("42".to_string()));
    }
}
