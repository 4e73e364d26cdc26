//! FIFO binder-state directives: the handful of control lines that never
//! enqueue a task but instead mutate the state applied to *subsequent*
//! submissions — which queue they land in, their priority, and whether
//! they wait on the target FPS's run/conf gates.

use crate::schedule::{Scheduler, TaskFlags};

/// One parsed non-task FIFO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    SetQueueIndex(usize),
    SetQueuePriority(u32),
    WaitOnRunOn,
    WaitOnRunOff,
    WaitOnConfOn,
    WaitOnConfOff,
    TaskCntZero,
}

/// Parse one FIFO line as a directive, if it is one. Lines that don't
/// match any of the five directive shapes are ordinary task lines.
pub fn parse_directive(line: &str) -> Option<Directive> {
    let mut tokens = line.split_whitespace();
    match tokens.next()? {
        "setqindex" => tokens.next()?.parse().ok().map(Directive::SetQueueIndex),
        "setqprio" => tokens.next()?.parse().ok().map(Directive::SetQueuePriority),
        "waitonrunON" => Some(Directive::WaitOnRunOn),
        "waitonrunOFF" => Some(Directive::WaitOnRunOff),
        "waitonconfON" => Some(Directive::WaitOnConfOn),
        "waitonconfOFF" => Some(Directive::WaitOnConfOff),
        "taskcntzero" => Some(Directive::TaskCntZero),
        _ => None,
    }
}

/// Binder state carried across FIFO lines: the queue and gate flags the
/// next submitted task will get.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderState {
    pub queue_id: usize,
    pub flags: TaskFlags,
}

impl Default for BinderState {
    fn default() -> Self {
        Self { queue_id: 0, flags: TaskFlags::default() }
    }
}

impl BinderState {
    pub fn apply(&mut self, directive: Directive, scheduler: &mut Scheduler) {
        match directive {
            Directive::SetQueueIndex(id) => self.queue_id = id,
            Directive::SetQueuePriority(prio) => scheduler.set_queue_priority(self.queue_id, prio),
            Directive::WaitOnRunOn => self.flags.wait_on_run = true,
            Directive::WaitOnRunOff => self.flags.wait_on_run = false,
            Directive::WaitOnConfOn => self.flags.wait_on_conf = true,
            Directive::WaitOnConfOff => self.flags.wait_on_conf = false,
            Directive::TaskCntZero => scheduler.reset_submission_counter(),
        }
    }
}

/// Best-effort extraction of the target FPS name from a task's
/// `cmdstring`, used only to resolve which FPS's gates apply to a task.
/// Covers every command in the fixed set: `setval`/`getval`/`fwrval`
/// address `<fps>.<path>` in their first argument, every other command
/// addresses `<fps>` directly.
pub fn extract_fps_name(cmdstring: &str) -> Option<&str> {
    let mut tokens = cmdstring.split_whitespace();
    let cmd = tokens.next()?;
    let arg0 = tokens.next()?;
    match cmd {
        "setval" | "getval" | "fwrval" => arg0.split_once('.').map(|(fps, _)| fps),
        "exit" | "logsymlink" | "queueprio" => None,
        _ => Some(arg0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_five_directive_shapes() {
        assert_eq!(parse_directive("setqindex 3"), Some(Directive::SetQueueIndex(3)));
        assert_eq!(parse_directive("setqprio 7"), Some(Directive::SetQueuePriority(7)));
        assert_eq!(parse_directive("waitonrunON"), Some(Directive::WaitOnRunOn));
        assert_eq!(parse_directive("waitonrunOFF"), Some(Directive::WaitOnRunOff));
        assert_eq!(parse_directive("waitonconfON"), Some(Directive::WaitOnConfOn));
        assert_eq!(parse_directive("waitonconfOFF"), Some(Directive::WaitOnConfOff));
        assert_eq!(parse_directive("taskcntzero"), Some(Directive::TaskCntZero));
    }

    #[test]
    fn ordinary_task_line_is_not_a_directive() {
        assert_eq!(parse_directive("setval myfps.delay 7"), None);
    }

    #[test]
    fn directive_does_not_itself_become_a_task() {
        let mut sched = Scheduler::new();
        let mut binder = BinderState::default();
        binder.apply(Directive::SetQueueIndex(1), &mut sched);
        binder.apply(Directive::SetQueuePriority(10), &mut sched);
        sched.submit("setval myfps.delay 7", binder.queue_id, 0, binder.flags, None);
        assert_eq!(sched.tasks().len(), 1);
        assert_eq!(sched.tasks()[0].queue_id, 1);
    }

    #[test]
    fn extracts_fps_name_from_dotted_and_bare_forms() {
        assert_eq!(extract_fps_name("setval myfps.delay 7"), Some("myfps"));
        assert_eq!(extract_fps_name("getval myfps.delay"), Some("myfps"));
        assert_eq!(extract_fps_name("confstart myfps"), Some("myfps"));
        assert_eq!(extract_fps_name("exit"), None);
    }
}
