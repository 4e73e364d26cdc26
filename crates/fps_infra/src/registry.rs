//! [`FpsDirectory`] backed by a directory scan: holds every connected FPS
//! in memory, keyed by name, and persists mutations back to their
//! backing files.

use std::collections::HashMap;
use std::path::PathBuf;

use fps_core::{Fps, FpsDirectory, FpsOpError};

use crate::scan::{self, ScanResult};
use crate::store;

pub struct FpsRegistry {
    root: PathBuf,
    fpss: HashMap<String, Fps>,
}

impl FpsRegistry {
    /// Scan `root` and load every FPS found there.
    pub fn load(root: PathBuf) -> Result<Self, FpsOpError> {
        let ScanResult { fpss, .. } = scan::scan_directory(&root)?;
        let fpss = fpss.into_iter().map(|fps| (fps.header.name().to_string(), fps)).collect();
        Ok(Self { root, fpss })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fpss.keys().map(String::as_str)
    }

    /// Persist every held FPS back to its backing file.
    pub fn persist_all(&self) -> Result<(), FpsOpError> {
        for fps in self.fpss.values() {
            store::persist(&self.root, fps)?;
        }
        Ok(())
    }
}

impl FpsDirectory for FpsRegistry {
    fn get_fps_mut(&mut self, fps_name: &str) -> Option<&mut Fps> {
        self.fpss.get_mut(fps_name)
    }

    fn get_fps(&self, fps_name: &str) -> Option<&Fps> {
        self.fpss.get(fps_name)
    }

    fn remove_fps(&mut self, fps_name: &str) -> bool {
        let Some(_) = self.fpss.remove(fps_name) else {
            return false;
        };
        let _ = store::destroy(&self.root, fps_name);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fps_core::param::KeywordPath;
    use fps_core::ValueKind;
    use tempfile::tempdir;

    #[test]
    fn load_then_remove_persists_removal() {
        let dir = tempdir().unwrap();
        let mut fps = store::create(dir.path(), "myfps", dir.path().to_str().unwrap()).unwrap();
        fps.add_entry(KeywordPath::parse("delay").unwrap(), ValueKind::Int64, "delay")
            .unwrap();
        store::persist(dir.path(), &fps).unwrap();

        let mut registry = FpsRegistry::load(dir.path().to_path_buf()).unwrap();
        assert!(registry.get_fps("myfps").is_some());
        assert!(registry.remove_fps("myfps"));
        assert!(!store::shm_path(dir.path(), "myfps").exists());
    }
}
