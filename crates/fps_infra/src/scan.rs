//! Directory scan: discover every `*.fps.shm` file under a shared-memory
//! root and intern its active parameters into one shared [`KeywordTree`],
//! so `fps_ctl` can resolve `<fps_name>.<path>` across all live FPS
//! instances without reconnecting to each one per lookup.

use std::fs;
use std::path::Path;

use fps_core::{FatalError, Fps, FpsOpError, KeywordTree};

use crate::error::fatal_io;
use crate::store;

/// Every FPS found under `root`, plus the tree indexing their parameters.
pub struct ScanResult {
    pub fpss: Vec<Fps>,
    pub tree: KeywordTree,
}

/// Scan `root` for `*.fps.shm` files, connect to each, and build a
/// [`KeywordTree`] over `<fps_name>.<dotted_path>` for every active
/// parameter found.
pub fn scan_directory(root: &Path) -> Result<ScanResult, FpsOpError> {
    let mut fpss = Vec::new();
    let mut tree = KeywordTree::new();

    let entries = fs::read_dir(root).map_err(|e| fatal_io("read shm directory", &root.display().to_string(), &e))?;
    for entry in entries {
        let entry = entry.map_err(|e| fatal_io("read dir entry", &root.display().to_string(), &e))?;
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        let Some(fps_name) = file_name.strip_suffix(".fps.shm") else {
            continue;
        };

        let fps = store::connect(root, fps_name)?;
        let fps_index = fpss.len();

        for (param_index, param) in fps.active_parameters() {
            let mut full_segments = vec![fps_name.to_string()];
            full_segments.extend(param.keyword_path().segments().iter().cloned());
            tree.intern(&full_segments, fps_index, param_index).map_err(|_| {
                FpsOpError::from(FatalError::CapacityOverflow {
                    what: "keyword tree node arena",
                    used: tree.nodes().len(),
                    capacity: fps_core::limits::NB_KEYWNODE_MAX,
                })
            })?;
        }

        fpss.push(fps);
    }

    Ok(ScanResult { fpss, tree })
}
