//! Validator: single pass over all `ACTIVE` parameters.
//!
//! File/FITS/executable/stream checks are expressed as injected trait
//! objects so this crate stays free of filesystem and image-library
//! dependencies;
//! `fps_infra` supplies default implementations.

use crate::flags::ParamFlags;
use crate::fps::Fps;
use crate::param::{ParamInfo, StreamDataType};
use crate::value::ValueKind;

/// Checks whether a path exists on disk.
pub trait FileChecker {
    fn exists(&self, path: &str) -> bool;
    fn is_executable(&self, path: &str) -> bool;
}

/// Sniffs whether a file is a valid FITS file (external collaborator).
pub trait FitsSniffer {
    fn looks_like_fits(&self, path: &str) -> bool;
}

/// Loads a named stream and reports its shape (external collaborator).
pub trait StreamLoader {
    fn load(&self, name: &str) -> Option<StreamHandle>;
}

/// Minimal resolved-stream metadata recorded on a `StreamName` parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamHandle {
    pub stream_id: i64,
    pub source: String,
    pub datatype: StreamDataType,
    pub shape: [usize; 3],
}

/// Probes whether a named FPS can be connected to (used for `FpsName`
/// reachability checks; probe-and-disconnect).
pub trait FpsReachability {
    fn can_connect(&self, fps_name: &str) -> bool;
}

/// Bundles the external collaborators the Validator needs.
pub struct ValidatorContext<'a> {
    pub files: &'a dyn FileChecker,
    pub fits: &'a dyn FitsSniffer,
    pub streams: &'a dyn StreamLoader,
    pub fps_reach: &'a dyn FpsReachability,
}

/// Run one Validator pass over `fps`.
///
/// Clears the message log, resets `conferrcnt`, appends one message per
/// failure (bounded), recomputes `WRITESTATUS`, sets `STATUS.CHECKOK` iff
/// zero errors, and clears `SIGNAL.CHECKED`.
pub fn validate(fps: &mut Fps, ctx: &ValidatorContext<'_>) {
    fps.header.clear_messages();
    let run_state = fps.header.run_state();

    let mut failures: Vec<(usize, String)> = Vec::new();

    for (idx, param) in fps.active_parameters_mut() {
        // 1. CHECKINIT
        if param.flags.contains(ParamFlags::CHECKINIT) && param.update_counter == 0 {
            failures.push((idx, "Not initialized".to_string()));
        }

        // 2. Numeric range checks.
        if param.kind.is_numeric() {
            if let Some(current) = param.value.current_f64() {
                if param.flags.contains(ParamFlags::MINLIMIT) {
                    if let crate::value::ValueCell::Numeric(slots) = &param.value {
                        if current < slots.min {
                            failures.push((
                                idx,
                                format!(
                                    "{} value {current} below min {}",
                                    param.kind, slots.min
                                ),
                            ));
                        }
                    }
                }
                if param.flags.contains(ParamFlags::MAXLIMIT) {
                    if let crate::value::ValueCell::Numeric(slots) = &param.value {
                        if current > slots.max {
                            failures.push((
                                idx,
                                format!(
                                    "{} value {current} above max {}",
                                    param.kind, slots.max
                                ),
                            ));
                        }
                    }
                }
            }
        }

        let path = param.value.current_text().map(str::to_string);

        match param.kind {
            // 3. Filename existence.
            ValueKind::Filename if param.flags.contains(ParamFlags::FILE_RUN_REQUIRED) => {
                if let Some(path) = &path {
                    if !ctx.files.exists(path) {
                        failures.push((idx, format!("file does not exist: {path}")));
                    }
                }
            }
            // 4. FitsFilename passes the FITS sniff.
            ValueKind::FitsFilename if param.flags.contains(ParamFlags::FILE_RUN_REQUIRED) => {
                if let Some(path) = &path {
                    if !ctx.files.exists(path) || !ctx.fits.looks_like_fits(path) {
                        failures.push((idx, format!("not a valid FITS file: {path}")));
                    }
                }
            }
            // 5. ExecFilename stat-accessible with execute bit.
            ValueKind::ExecFilename if param.flags.contains(ParamFlags::FILE_RUN_REQUIRED) => {
                if let Some(path) = &path {
                    if !ctx.files.exists(path) || !ctx.files.is_executable(path) {
                        failures.push((idx, format!("not executable: {path}")));
                    }
                }
            }
            // 6. FpsName reachability (probe-and-disconnect).
            ValueKind::FpsName if param.flags.contains(ParamFlags::FPS_RUN_REQUIRED) => {
                if let Some(name) = &path {
                    if !ctx.fps_reach.can_connect(name) {
                        failures.push((idx, format!("referenced fps not reachable: {name}")));
                    }
                }
            }
            // 7. StreamName: always attempt load; error only if required.
            ValueKind::StreamName => {
                if let Some(name) = &path {
                    match ctx.streams.load(name) {
                        Some(handle) => {
                            param.info = ParamInfo::Stream {
                                stream_id: Some(handle.stream_id),
                                source: handle.source,
                                datatype: handle.datatype,
                                shape: handle.shape,
                            };
                        }
                        None if param.flags.contains(ParamFlags::STREAM_RUN_REQUIRED) => {
                            failures.push((idx, format!("stream not found: {name}")));
                        }
                        None => {}
                    }
                }
            }
            _ => {}
        }

        // Recompute effective writability (WRITESTATUS) for this pass.
        let writable = param.flags.is_writable_in_state(run_state);
        param.flags.set(ParamFlags::WRITESTATUS, writable);
    }

    for (idx, text) in failures {
        if let Some(param) = fps.get_mut(idx) {
            param.flags.insert(ParamFlags::ERROR);
        }
        fps.header.push_message(Some(idx), 1, text);
    }

    if fps.header.conferrcnt == 0 {
        fps.header.status.insert(crate::fps::FpsStatus::CHECKOK);
    } else {
        fps.header.status.remove(crate::fps::FpsStatus::CHECKOK);
    }
    fps.header.signal.remove(crate::fps::FpsSignal::CHECKED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::KeywordPath;

    struct AllowAll;
    impl FileChecker for AllowAll {
        fn exists(&self, _path: &str) -> bool {
            true
        }
        fn is_executable(&self, _path: &str) -> bool {
            true
        }
    }
    impl FitsSniffer for AllowAll {
        fn looks_like_fits(&self, _path: &str) -> bool {
            true
        }
    }
    impl StreamLoader for AllowAll {
        fn load(&self, _name: &str) -> Option<StreamHandle> {
            None
        }
    }
    impl FpsReachability for AllowAll {
        fn can_connect(&self, _fps_name: &str) -> bool {
            true
        }
    }

    fn ctx() -> ValidatorContext<'static> {
        static ALLOW: AllowAll = AllowAll;
        ValidatorContext {
            files: &ALLOW,
            fits: &ALLOW,
            streams: &ALLOW,
            fps_reach: &ALLOW,
        }
    }

    #[test]
    fn range_enforcement() {
        let mut fps = Fps::create("myfps", "/tmp/myfps").unwrap();
        let idx = fps
            .add_entry(KeywordPath::parse("p").unwrap(), ValueKind::Int64, "p")
            .unwrap();
        let param = fps.get_mut(idx).unwrap();
        param.flags.insert(ParamFlags::MINLIMIT | ParamFlags::MAXLIMIT);
        if let crate::value::ValueCell::Numeric(slots) = &mut param.value {
            slots.min = 0.0;
            slots.max = 10.0;
            slots.current = 15.0;
        }

        validate(&mut fps, &ctx());

        assert_eq!(fps.header.conferrcnt, 1);
        assert_eq!(fps.header.messages[0].text, "int64 value 15 above max 10");
        assert!(fps.get(idx).unwrap().flags.contains(ParamFlags::ERROR));
        assert!(!fps.header.status.contains(crate::fps::FpsStatus::CHECKOK));
    }

    #[test]
    fn validator_is_idempotent() {
        let mut fps = Fps::create("myfps", "/tmp/myfps").unwrap();
        fps.add_entry(KeywordPath::parse("p").unwrap(), ValueKind::Int64, "p")
            .unwrap();

        validate(&mut fps, &ctx());
        let first = (fps.header.messages.clone(), fps.header.conferrcnt);
        validate(&mut fps, &ctx());
        let second = (fps.header.messages.clone(), fps.header.conferrcnt);
        assert_eq!(first, second);
    }
}
