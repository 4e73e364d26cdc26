//! Conf/run loop drivers. The actual per-iteration work
//! (recomputing derived values in conf, driving hardware/algorithms in
//! run) is supplied by the caller as a closure, so this module only
//! owns the loop shape: wait for a signal, do the work, validate,
//! sleep, repeat while the controlling status bit is set.

use fps_core::fps::{Fps, FpsSignal, FpsStatus};
use fps_core::validate::{validate, ValidatorContext};
use fps_core::FpsOpError;

/// Run one conf iteration: if `SIGNAL.UPDATE` is set, invoke `conf_fn`,
/// validate the result, and clear the signal. A no-op if no update was
/// requested this tick.
pub fn conf_iteration(
    fps: &mut Fps,
    ctx: &ValidatorContext<'_>,
    conf_fn: &mut dyn FnMut(&mut Fps) -> Result<(), FpsOpError>,
) -> Result<(), FpsOpError> {
    if fps.header.signal.contains(FpsSignal::UPDATE) {
        conf_fn(fps)?;
        validate(fps, ctx);
        fps.header.signal.remove(FpsSignal::UPDATE);
    }
    Ok(())
}

/// Drive the conf loop until `STATUS.CMDCONF` clears (set by `confstop`).
pub fn conf_loop(
    fps: &mut Fps,
    ctx: &ValidatorContext<'_>,
    conf_fn: &mut dyn FnMut(&mut Fps) -> Result<(), FpsOpError>,
    sleep: &dyn Fn(u64),
    poll_us: u64,
) -> Result<(), FpsOpError> {
    while fps.header.status.contains(FpsStatus::CMDCONF) {
        conf_iteration(fps, ctx, conf_fn)?;
        sleep(poll_us);
    }
    Ok(())
}

/// Drive the run loop until `STATUS.CMDRUN` clears (set by `runstop`).
pub fn run_loop(
    fps: &mut Fps,
    run_fn: &mut dyn FnMut(&mut Fps) -> Result<(), FpsOpError>,
    sleep: &dyn Fn(u64),
    poll_us: u64,
) -> Result<(), FpsOpError> {
    while fps.header.status.contains(FpsStatus::RUN) && fps.header.status.contains(FpsStatus::CMDRUN) {
        run_fn(fps)?;
        sleep(poll_us);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fps_core::param::KeywordPath;
    use fps_core::validate::{FileChecker, FitsSniffer, FpsReachability, StreamHandle, StreamLoader};
    use fps_core::ValueKind;

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
        ValidatorContext { files: &ALLOW, fits: &ALLOW, streams: &ALLOW, fps_reach: &ALLOW }
    }

    #[test]
    fn conf_loop_stops_when_cmdconf_clears() {
        let mut fps = Fps::create("myfps", "/tmp/myfps").unwrap();
        fps.add_entry(KeywordPath::parse("delay").unwrap(), ValueKind::Int64, "delay")
            .unwrap();
        fps.header.status.insert(FpsStatus::CMDCONF);
        fps.header.signal.insert(FpsSignal::UPDATE);

        let mut iterations = 0;
        conf_loop(
            &mut fps,
            &ctx(),
            &mut |fps| {
                iterations += 1;
                if iterations >= 3 {
                    fps.header.status.remove(FpsStatus::CMDCONF);
                } else {
                    fps.header.signal.insert(FpsSignal::UPDATE);
                }
                Ok(())
            },
            &|_| {},
            0,
        )
        .unwrap();

        assert_eq!(iterations, 3);
        assert!(!fps.header.status.contains(FpsStatus::CMDCONF));
    }

    #[test]
    fn run_loop_requires_both_run_and_cmdrun() {
        let mut fps = Fps::create("myfps", "/tmp/myfps").unwrap();
        fps.header.status.insert(FpsStatus::CMDRUN);
        // RUN not set: loop body never runs.
        let mut calls = 0;
        run_loop(&mut fps, &mut |_| { calls += 1; Ok(()) }, &|_| {}, 0).unwrap();
        assert_eq!(calls, 0);
    }
}
