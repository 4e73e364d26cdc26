//! CommandInterpreter: parses and dispatches a single FIFO
//! command line against a directory of live FPS instances.

use crate::error::{FpsOpError, UserError};
use crate::fps::{Fps, FpsSignal, FpsStatus};

/// Outcome status for one dispatched command (`CMDOK`/`CMDFAIL`/`CMDNOTFOUND`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    Fail,
    NotFound,
}

/// Result of one [`CommandInterpreter::dispatch`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub status: CommandStatus,
    pub output: Option<String>,
    /// Set by `setval`/`fwrval` when the written parameter has
    /// `SAVEONCHANGE`: the caller should persist that FPS immediately
    /// rather than waiting for its next periodic persist.
    pub save_now: bool,
    /// Set by `queueprio`: the caller's `Scheduler` applies this right
    /// after dispatch, since the interpreter has no access to it.
    pub queue_priority_update: Option<(usize, u32)>,
}

impl CommandOutcome {
    fn ok(output: impl Into<String>) -> Self {
        Self { status: CommandStatus::Ok, output: Some(output.into()), save_now: false, queue_priority_update: None }
    }
    fn ok_silent() -> Self {
        Self { status: CommandStatus::Ok, output: None, save_now: false, queue_priority_update: None }
    }
    fn fail(output: impl Into<String>) -> Self {
        Self { status: CommandStatus::Fail, output: Some(output.into()), save_now: false, queue_priority_update: None }
    }
    fn not_found(output: impl Into<String>) -> Self {
        Self { status: CommandStatus::NotFound, output: Some(output.into()), save_now: false, queue_priority_update: None }
    }
}

/// Directory of live FPS instances, keyed by name, plus path resolution
/// through the shared [`crate::keytree::KeywordTree`]. Implemented by
/// `fps_infra`; kept as a trait here so this crate stays process-free.
pub trait FpsDirectory {
    fn get_fps_mut(&mut self, fps_name: &str) -> Option<&mut Fps>;
    fn get_fps(&self, fps_name: &str) -> Option<&Fps>;
    fn remove_fps(&mut self, fps_name: &str) -> bool;
    /// Split a fully-qualified `<fps_name>.<param_path>` string.
    fn split_path<'a>(&self, full: &'a str) -> Option<(&'a str, &'a str)> {
        full.split_once('.')
    }
}

/// Starts/stops the conf and run worker processes for one FPS, plus the
/// handful of filesystem side effects the interpreter itself needs
/// (`fwrval`'s file append, `logsymlink`'s symlink refresh) — kept on this
/// trait rather than a separate one since they're all process/filesystem
/// collaborators `fps_core` can't touch directly.
pub trait SessionManager {
    fn start_conf(&self, fps_name: &str) -> Result<i32, FpsOpError>;
    fn start_run(&self, fps_name: &str) -> Result<i32, FpsOpError>;
    fn stop_conf(&self, pid: i32) -> Result<(), FpsOpError>;
    fn stop_run(&self, pid: i32) -> Result<(), FpsOpError>;
    /// Monotonic microsecond clock, used by `confwupdate`/`runwait` polling.
    fn now_us(&self) -> u64;
    fn sleep_us(&self, us: u64);
    /// Append one line of text to `path`, creating it if necessary.
    fn append_to_file(&self, path: &str, text: &str) -> Result<(), FpsOpError>;
    /// Create or refresh `link_path` as a symlink pointing at `target`.
    fn ensure_symlink(&self, target: &str, link_path: &str) -> Result<(), FpsOpError>;
}

/// Parses and dispatches one command line at a time.
pub struct CommandInterpreter;

impl CommandInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch one already-tokenized command line. Unknown commands return
    /// `CommandStatus::NotFound`; wrong arity or a missing target returns
    /// `CommandStatus::Fail`.
    pub fn dispatch(
        &self,
        cmdstring: &str,
        dir: &mut dyn FpsDirectory,
        sessions: &dyn SessionManager,
    ) -> CommandOutcome {
        let tokens: Vec<&str> = cmdstring.split_whitespace().collect();
        let Some((&cmd, args)) = tokens.split_first() else {
            return CommandOutcome::fail("empty command");
        };

        let result = match cmd {
            "exit" => arity(cmd, args, 0).map(|_| CommandOutcome::ok_silent()),
            "cntinc" => arity(cmd, args, 1).and_then(|_| self.cntinc(args[0], dir)),
            "logsymlink" => arity(cmd, args, 2).and_then(|_| self.logsymlink(args[0], args[1], sessions)),
            "queueprio" => arity(cmd, args, 2).and_then(|_| self.queueprio(args)),
            "setval" => arity(cmd, args, 2).and_then(|_| self.setval(args[0], args[1], dir)),
            "getval" => arity(cmd, args, 1).and_then(|_| self.getval(args[0], dir)),
            "fwrval" => arity(cmd, args, 2).and_then(|_| self.fwrval(args[0], args[1], dir, sessions)),
            "confstart" => arity(cmd, args, 1).and_then(|_| self.confstart(args[0], dir, sessions)),
            "confstop" => arity(cmd, args, 1).and_then(|_| self.confstop(args[0], dir, sessions)),
            "confupdate" => arity(cmd, args, 1).and_then(|_| self.confupdate(args[0], dir)),
            "confwupdate" => arity(cmd, args, 1).and_then(|_| self.confwupdate(args[0], dir, sessions)),
            "runstart" => arity(cmd, args, 1).and_then(|_| self.runstart(args[0], dir, sessions)),
            "runstop" => arity(cmd, args, 1).and_then(|_| self.runstop(args[0], dir, sessions)),
            "runwait" => arity(cmd, args, 1).and_then(|_| self.runwait(args[0], dir, sessions)),
            "fpsrm" => arity(cmd, args, 1).and_then(|_| self.fpsrm(args[0], dir)),
            other => return CommandOutcome::not_found(format!("unknown command: {other}")),
        };

        match result {
            Ok(outcome) => outcome,
            Err(err) => CommandOutcome::fail(err.to_string()),
        }
    }

    fn cntinc(&self, fps_name: &str, dir: &mut dyn FpsDirectory) -> Result<CommandOutcome, FpsOpError> {
        let fps = dir
            .get_fps_mut(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        fps.header.signal.insert(FpsSignal::UPDATE);
        Ok(CommandOutcome::ok_silent())
    }

    fn queueprio(&self, args: &[&str]) -> Result<CommandOutcome, FpsOpError> {
        let queue_id = args[0]
            .parse::<usize>()
            .map_err(|_| UserError::ArgTypeMismatch {
                arg: args[0].to_string(),
                expected: "queue index".to_string(),
                got: "non-integer".to_string(),
            })?;
        let priority = args[1]
            .parse::<u32>()
            .map_err(|_| UserError::ArgTypeMismatch {
                arg: args[1].to_string(),
                expected: "priority".to_string(),
                got: "non-integer".to_string(),
            })?;
        // The Scheduler itself lives outside this crate; report the
        // requested change on the outcome and let the caller apply it.
        Ok(CommandOutcome { queue_priority_update: Some((queue_id, priority)), ..CommandOutcome::ok_silent() })
    }

    /// Write the value and mark `SIGNAL.UPDATE`; if the parameter carries
    /// `SAVEONCHANGE`, the returned outcome asks the caller to persist the
    /// FPS immediately instead of waiting for the next periodic persist.
    fn setval(
        &self,
        full_path: &str,
        raw_value: &str,
        dir: &mut dyn FpsDirectory,
    ) -> Result<CommandOutcome, FpsOpError> {
        let (fps_name, param_path) = dir
            .split_path(full_path)
            .ok_or_else(|| UserError::UnknownPath(full_path.to_string()))?;
        let fps = dir
            .get_fps_mut(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        let (_, param) = fps
            .find_by_path_mut(param_path)
            .ok_or_else(|| UserError::UnknownPath(full_path.to_string()))?;

        if param.kind.is_numeric() {
            let v: f64 = raw_value.parse().map_err(|_| UserError::ArgTypeMismatch {
                arg: raw_value.to_string(),
                expected: "numeric".to_string(),
                got: "non-numeric".to_string(),
            })?;
            param.write_numeric(v)?;
        } else {
            param.write_text(raw_value)?;
        }
        let save_now = param.flags.contains(crate::flags::ParamFlags::SAVEONCHANGE);

        fps.header.signal.insert(FpsSignal::UPDATE);
        Ok(CommandOutcome { save_now, ..CommandOutcome::ok_silent() })
    }

    /// Format the parameter's current value and append it to `file_path`;
    /// unlike `setval`, the FPS itself is not modified.
    fn fwrval(
        &self,
        full_path: &str,
        file_path: &str,
        dir: &mut dyn FpsDirectory,
        sessions: &dyn SessionManager,
    ) -> Result<CommandOutcome, FpsOpError> {
        let (fps_name, param_path) = dir
            .split_path(full_path)
            .ok_or_else(|| UserError::UnknownPath(full_path.to_string()))?;
        let fps = dir
            .get_fps(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        let (_, param) = fps
            .find_by_path(param_path)
            .ok_or_else(|| UserError::UnknownPath(full_path.to_string()))?;
        let text = param.value.format_persisted();
        sessions.append_to_file(file_path, &text)?;
        Ok(CommandOutcome::ok_silent())
    }

    fn logsymlink(&self, target: &str, link_path: &str, sessions: &dyn SessionManager) -> Result<CommandOutcome, FpsOpError> {
        sessions.ensure_symlink(target, link_path)?;
        Ok(CommandOutcome::ok_silent())
    }

    fn getval(&self, full_path: &str, dir: &mut dyn FpsDirectory) -> Result<CommandOutcome, FpsOpError> {
        let (fps_name, param_path) = dir
            .split_path(full_path)
            .ok_or_else(|| UserError::UnknownPath(full_path.to_string()))?;
        let fps = dir
            .get_fps(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        let (_, param) = fps
            .find_by_path(param_path)
            .ok_or_else(|| UserError::UnknownPath(full_path.to_string()))?;
        let text = param
            .value
            .current_f64()
            .map(|v| v.to_string())
            .or_else(|| param.value.current_text().map(str::to_string))
            .unwrap_or_default();
        Ok(CommandOutcome::ok(text))
    }

    fn confstart(
        &self,
        fps_name: &str,
        dir: &mut dyn FpsDirectory,
        sessions: &dyn SessionManager,
    ) -> Result<CommandOutcome, FpsOpError> {
        let pid = sessions.start_conf(fps_name)?;
        let fps = dir
            .get_fps_mut(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        fps.header.conf_pid = Some(pid);
        fps.header.status.insert(FpsStatus::CONF | FpsStatus::CMDCONF);
        Ok(CommandOutcome::ok_silent())
    }

    fn confstop(
        &self,
        fps_name: &str,
        dir: &mut dyn FpsDirectory,
        sessions: &dyn SessionManager,
    ) -> Result<CommandOutcome, FpsOpError> {
        let fps = dir
            .get_fps_mut(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        if let Some(pid) = fps.header.conf_pid.take() {
            sessions.stop_conf(pid)?;
        }
        fps.header.status.remove(FpsStatus::CONF | FpsStatus::CMDCONF);
        Ok(CommandOutcome::ok_silent())
    }

    fn confupdate(&self, fps_name: &str, dir: &mut dyn FpsDirectory) -> Result<CommandOutcome, FpsOpError> {
        let fps = dir
            .get_fps_mut(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        fps.header.signal.insert(FpsSignal::UPDATE);
        Ok(CommandOutcome::ok_silent())
    }

    /// Request an update and poll until `CHECKED` clears and `conferrcnt`
    /// reads zero, or the bounded timeout elapses.
    fn confwupdate(
        &self,
        fps_name: &str,
        dir: &mut dyn FpsDirectory,
        sessions: &dyn SessionManager,
    ) -> Result<CommandOutcome, FpsOpError> {
        {
            let fps = dir
                .get_fps_mut(fps_name)
                .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
            fps.header.signal.insert(FpsSignal::UPDATE);
        }

        let deadline = sessions.now_us() + crate::limits::CONFWUPDATE_TIMEOUT_US;
        loop {
            let ready = match dir.get_fps(fps_name) {
                Some(fps) => !fps.header.signal.contains(FpsSignal::CHECKED) && fps.header.conferrcnt == 0,
                None => false,
            };
            if ready {
                return Ok(CommandOutcome::ok_silent());
            }
            if sessions.now_us() >= deadline {
                return Err(crate::error::TransientError::StreamNotReady(fps_name.to_string()).into());
            }
            sessions.sleep_us(crate::limits::CONFWUPDATE_POLL_US);
        }
    }

    fn runstart(
        &self,
        fps_name: &str,
        dir: &mut dyn FpsDirectory,
        sessions: &dyn SessionManager,
    ) -> Result<CommandOutcome, FpsOpError> {
        let pid = sessions.start_run(fps_name)?;
        let fps = dir
            .get_fps_mut(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        fps.header.run_pid = Some(pid);
        fps.header.status.insert(FpsStatus::RUN | FpsStatus::CMDRUN);
        Ok(CommandOutcome::ok_silent())
    }

    fn runstop(
        &self,
        fps_name: &str,
        dir: &mut dyn FpsDirectory,
        sessions: &dyn SessionManager,
    ) -> Result<CommandOutcome, FpsOpError> {
        let fps = dir
            .get_fps_mut(fps_name)
            .ok_or_else(|| UserError::UnknownPath(fps_name.to_string()))?;
        fps.header.status.remove(FpsStatus::CMDRUN);
        let pid = fps.header.run_pid;
        if let Some(pid) = pid {
            sessions.stop_run(pid)?;
        }
        let fps = dir.get_fps_mut(fps_name).expect("checked above");
        fps.header.run_pid = None;
        fps.header.status.remove(FpsStatus::RUN);
        Ok(CommandOutcome::ok_silent())
    }

    /// Poll until `CMDRUN` clears (`runstop` clears it; the run loop exits
    /// in response) or the bounded timeout elapses.
    fn runwait(
        &self,
        fps_name: &str,
        dir: &mut dyn FpsDirectory,
        sessions: &dyn SessionManager,
    ) -> Result<CommandOutcome, FpsOpError> {
        let deadline = sessions.now_us() + crate::limits::RUNWAIT_TIMEOUT_US;
        loop {
            let cmdrun = dir
                .get_fps(fps_name)
                .map(|fps| fps.header.status.contains(FpsStatus::CMDRUN))
                .unwrap_or(false);
            if !cmdrun {
                return Ok(CommandOutcome::ok_silent());
            }
            if sessions.now_us() >= deadline {
                return Err(crate::error::TransientError::FpsNotPresent(fps_name.to_string()).into());
            }
            sessions.sleep_us(crate::limits::RUNWAIT_POLL_US);
        }
    }

    fn fpsrm(&self, fps_name: &str, dir: &mut dyn FpsDirectory) -> Result<CommandOutcome, FpsOpError> {
        if dir.remove_fps(fps_name) {
            Ok(CommandOutcome::ok_silent())
        } else {
            Err(UserError::UnknownPath(fps_name.to_string()).into())
        }
    }
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn arity(cmd: &str, args: &[&str], expected: usize) -> Result<(), FpsOpError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(UserError::ArityMismatch {
            cmd: cmd.to_string(),
            expected,
            got: args.len(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::KeywordPath;
    use crate::value::ValueKind;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    struct TestDirectory {
        fpss: HashMap<String, Fps>,
    }

    impl FpsDirectory for TestDirectory {
        fn get_fps_mut(&mut self, fps_name: &str) -> Option<&mut Fps> {
            self.fpss.get_mut(fps_name)
        }
        fn get_fps(&self, fps_name: &str) -> Option<&Fps> {
            self.fpss.get(fps_name)
        }
        fn remove_fps(&mut self, fps_name: &str) -> bool {
            self.fpss.remove(fps_name).is_some()
        }
    }

    #[derive(Default)]
    struct FakeSessions {
        clock: Cell<u64>,
        appended: RefCell<Vec<(String, String)>>,
        symlinked: RefCell<Vec<(String, String)>>,
    }

    impl SessionManager for FakeSessions {
        fn start_conf(&self, _fps_name: &str) -> Result<i32, FpsOpError> {
            Ok(100)
        }
        fn start_run(&self, _fps_name: &str) -> Result<i32, FpsOpError> {
            Ok(200)
        }
        fn stop_conf(&self, _pid: i32) -> Result<(), FpsOpError> {
            Ok(())
        }
        fn stop_run(&self, _pid: i32) -> Result<(), FpsOpError> {
            Ok(())
        }
        fn now_us(&self) -> u64 {
            self.clock.get()
        }
        fn sleep_us(&self, us: u64) {
            self.clock.set(self.clock.get() + us);
        }
        fn append_to_file(&self, path: &str, text: &str) -> Result<(), FpsOpError> {
            self.appended.borrow_mut().push((path.to_string(), text.to_string()));
            Ok(())
        }
        fn ensure_symlink(&self, target: &str, link_path: &str) -> Result<(), FpsOpError> {
            self.symlinked.borrow_mut().push((target.to_string(), link_path.to_string()));
            Ok(())
        }
    }

    fn setup() -> TestDirectory {
        let mut fps = Fps::create("myfps", "/tmp/myfps").unwrap();
        fps.add_entry(KeywordPath::parse("delay").unwrap(), ValueKind::Int64, "delay")
            .unwrap();
        let mut fpss = HashMap::new();
        fpss.insert("myfps".to_string(), fps);
        TestDirectory { fpss }
    }

    /// An end-to-end FIFO command sequence: set a value, read it back.
    #[test]
    fn setval_then_getval_roundtrip() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let sessions = FakeSessions { clock: Cell::new(0), ..Default::default() };

        let set = interp.dispatch("setval myfps.delay 42", &mut dir, &sessions);
        assert_eq!(set.status, CommandStatus::Ok);

        let get = interp.dispatch("getval myfps.delay", &mut dir, &sessions);
        assert_eq!(get.status, CommandStatus::Ok);
        assert_eq!(get.output.as_deref(), Some("42"));
    }

    #[test]
    fn unknown_command_is_not_found() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let sessions = FakeSessions { clock: Cell::new(0), ..Default::default() };
        let outcome = interp.dispatch("bogus myfps", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::NotFound);
    }

    #[test]
    fn wrong_arity_fails() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let sessions = FakeSessions { clock: Cell::new(0), ..Default::default() };
        let outcome = interp.dispatch("setval myfps.delay", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::Fail);
    }

    #[test]
    fn confstart_sets_pid_and_status() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let sessions = FakeSessions { clock: Cell::new(0), ..Default::default() };
        let outcome = interp.dispatch("confstart myfps", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::Ok);
        let fps = dir.get_fps("myfps").unwrap();
        assert_eq!(fps.header.conf_pid, Some(100));
        assert!(fps.header.status.contains(FpsStatus::CONF));
    }

    #[test]
    fn runwait_times_out_as_transient() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        dir.fpss.get_mut("myfps").unwrap().header.status.insert(FpsStatus::CMDRUN);
        let sessions = FakeSessions { clock: Cell::new(0), ..Default::default() };
        let outcome = interp.dispatch("runwait myfps", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::Fail);
    }

    #[test]
    fn setval_marks_update_signal() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let sessions = FakeSessions::default();
        interp.dispatch("setval myfps.delay 7", &mut dir, &sessions);
        let fps = dir.get_fps("myfps").unwrap();
        assert!(fps.header.signal.contains(FpsSignal::UPDATE));
    }

    #[test]
    fn setval_requests_immediate_persist_on_saveonchange() {
        use crate::flags::ParamFlags;
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let (_, param) = dir.fpss.get_mut("myfps").unwrap().find_by_path_mut("delay").unwrap();
        param.flags.insert(ParamFlags::SAVEONCHANGE);
        let sessions = FakeSessions::default();
        let outcome = interp.dispatch("setval myfps.delay 7", &mut dir, &sessions);
        assert!(outcome.save_now);
    }

    #[test]
    fn setval_without_saveonchange_does_not_request_persist() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let sessions = FakeSessions::default();
        let outcome = interp.dispatch("setval myfps.delay 7", &mut dir, &sessions);
        assert!(!outcome.save_now);
    }

    #[test]
    fn fwrval_appends_formatted_value_and_leaves_fps_untouched() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        interp.dispatch("setval myfps.delay 42", &mut dir, &FakeSessions::default());

        let sessions = FakeSessions::default();
        let outcome = interp.dispatch("fwrval myfps.delay /tmp/out.log", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::Ok);

        let appended = sessions.appended.borrow();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].0, "/tmp/out.log");
        assert_eq!(appended[0].1, format!("{:18}", 42.0_f64));

        let (_, param) = dir.get_fps("myfps").unwrap().find_by_path("delay").unwrap();
        assert_eq!(param.value.current_f64(), Some(42.0));
    }

    #[test]
    fn logsymlink_refreshes_the_link() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let sessions = FakeSessions::default();
        let outcome = interp.dispatch("logsymlink /data/myfps.fps /tmp/myfps.link", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(
            sessions.symlinked.borrow().as_slice(),
            &[("/data/myfps.fps".to_string(), "/tmp/myfps.link".to_string())]
        );
    }

    #[test]
    fn queueprio_reports_requested_change() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        let sessions = FakeSessions::default();
        let outcome = interp.dispatch("queueprio 2 15", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.queue_priority_update, Some((2, 15)));
    }

    #[test]
    fn confwupdate_succeeds_once_checked_clears_with_no_errors() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        // CHECKED starts unset and conferrcnt starts 0, so the request
        // resolves on the very first poll.
        let sessions = FakeSessions::default();
        let outcome = interp.dispatch("confwupdate myfps", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::Ok);
    }

    #[test]
    fn confwupdate_waits_out_outstanding_errors() {
        let interp = CommandInterpreter::new();
        let mut dir = setup();
        dir.fpss.get_mut("myfps").unwrap().header.conferrcnt = 1;
        let sessions = FakeSessions::default();
        let outcome = interp.dispatch("confwupdate myfps", &mut dir, &sessions);
        assert_eq!(outcome.status, CommandStatus::Fail);
    }
}
