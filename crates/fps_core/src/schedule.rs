//! TaskQueue / Scheduler.

use crate::limits::NB_QUEUES_MAX;

/// Gate flags on a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskFlags {
    pub wait_on_run: bool,
    pub wait_on_conf: bool,
}

/// A queued command with priority, gates, and lifecycle timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub cmdstring: String,
    pub queue_id: usize,
    pub input_index: u64,
    pub flags: TaskFlags,
    pub fps_index_resolved: Option<usize>,
    pub creation_time: u64,
    pub activation_time: Option<u64>,
    pub completion_time: Option<u64>,
    pub running: bool,
    pub active: bool,
    pub status: TaskStatus,
}

/// Status bits set by [`crate::interp`] on dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStatus {
    pub ok: bool,
    pub fail: bool,
    pub not_found: bool,
}

impl Task {
    pub fn new(cmdstring: impl Into<String>, queue_id: usize, input_index: u64, creation_time: u64) -> Self {
        Self {
            cmdstring: cmdstring.into(),
            queue_id,
            input_index,
            flags: TaskFlags::default(),
            fps_index_resolved: None,
            creation_time,
            activation_time: None,
            completion_time: None,
            running: false,
            active: true,
            status: TaskStatus::default(),
        }
    }
}

/// One priority queue. Priority 0 means paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queue {
    pub priority: u32,
}

impl Queue {
    pub const PAUSED: u32 = 0;

    pub fn is_paused(self) -> bool {
        self.priority == Self::PAUSED
    }
}

impl Default for Queue {
    fn default() -> Self {
        // Queue 0 is the main queue, conventionally priority 10.
        Queue { priority: 10 }
    }
}

/// Snapshot of an FPS's gate-relevant status, read by the scheduler to
/// decide whether a running task's `WAITONRUN`/`WAITONCONF` gates clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsGateStatus {
    pub cmdrun_set: bool,
    pub checked_signal_set: bool,
}

/// What the interpreter returns after dispatching one task's `cmdstring`.
pub struct DispatchOutcome {
    pub status: TaskStatus,
    /// Set by a dispatched `queueprio <queue> <priority>` command: applied
    /// to the scheduler's own queue table right after dispatch, since the
    /// interpreter has no access to `Scheduler` itself.
    pub queue_priority_update: Option<(usize, u32)>,
}

/// Multi-queue FIFO scheduler driving task dispatch.
pub struct Scheduler {
    queues: [Queue; NB_QUEUES_MAX],
    tasks: Vec<Task>,
    next_input_index: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        let mut queues = [Queue { priority: 0 }; NB_QUEUES_MAX];
        queues[0] = Queue::default();
        Self {
            queues,
            tasks: Vec::new(),
            next_input_index: 0,
        }
    }

    pub fn queue(&self, id: usize) -> Queue {
        self.queues[id]
    }

    pub fn set_queue_priority(&mut self, id: usize, priority: u32) {
        self.queues[id].priority = priority;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn reset_submission_counter(&mut self) {
        self.next_input_index = 0;
    }

    /// Submit a new task (from the FIFO or the console): each submission
    /// increments the monotonic `input_index`. `fps_index_resolved` is the
    /// caller's best-effort resolution of the task's target FPS (see
    /// `directive::extract_fps_name`), used later to gate on that FPS's
    /// `WAITONRUN`/`WAITONCONF` status.
    pub fn submit(
        &mut self,
        cmdstring: impl Into<String>,
        queue_id: usize,
        now: u64,
        flags: TaskFlags,
        fps_index_resolved: Option<usize>,
    ) -> u64 {
        let input_index = self.next_input_index;
        self.next_input_index += 1;
        let mut task = Task::new(cmdstring, queue_id, input_index, now);
        task.flags = flags;
        task.fps_index_resolved = fps_index_resolved;
        self.tasks.push(task);
        input_index
    }

    /// Find the candidate task for `queue_id`: the active, not-running
    /// task with the smallest `input_index`.
    fn candidate(&self, queue_id: usize) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.active && !t.running && t.queue_id == queue_id)
            .min_by_key(|(_, t)| t.input_index)
            .map(|(i, _)| i)
    }

    /// Find the single running task in `queue_id`, if any.
    fn running_in_queue(&self, queue_id: usize) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.active && t.running && t.queue_id == queue_id)
    }

    /// Run one scheduling tick. `gate_status` maps
    /// an FPS index to its current gate-relevant status; `dispatch`
    /// hands a candidate's `cmdstring` to the CommandInterpreter.
    pub fn tick(
        &mut self,
        now: u64,
        gate_status: impl Fn(usize) -> FpsGateStatus,
        mut dispatch: impl FnMut(&str) -> DispatchOutcome,
    ) {
        // Step 3: check already-running tasks for gate clearance first.
        for queue_id in 0..NB_QUEUES_MAX {
            if let Some(idx) = self.running_in_queue(queue_id) {
                let task = &self.tasks[idx];
                let gates_clear = match task.fps_index_resolved {
                    Some(fps_idx) => {
                        let status = gate_status(fps_idx);
                        let run_clear = !task.flags.wait_on_run || !status.cmdrun_set;
                        let conf_clear = !task.flags.wait_on_conf || !status.checked_signal_set;
                        run_clear && conf_clear
                    }
                    None => true,
                };
                if gates_clear {
                    let task = &mut self.tasks[idx];
                    task.running = false;
                    task.active = false;
                    task.completion_time = Some(now);
                }
            }
        }

        // Step 4: across queues, find the highest-priority candidate,
        // ties broken by lowest queue id.
        let mut best: Option<(usize, usize)> = None; // (queue_id, task_idx)
        for queue_id in 0..NB_QUEUES_MAX {
            if self.running_in_queue(queue_id).is_some() {
                continue; // this queue is busy this tick
            }
            if let Some(task_idx) = self.candidate(queue_id) {
                let priority = self.queues[queue_id].priority;
                let better = match best {
                    None => true,
                    Some((best_q, _)) => {
                        let best_priority = self.queues[best_q].priority;
                        priority > best_priority
                            || (priority == best_priority && queue_id < best_q)
                    }
                };
                if better && priority > 0 {
                    best = Some((queue_id, task_idx));
                }
            }
        }

        // Step 5: dispatch at most one new task this tick.
        if let Some((_, task_idx)) = best {
            let cmdstring = self.tasks[task_idx].cmdstring.clone();
            let outcome = dispatch(&cmdstring);
            let queue_priority_update = outcome.queue_priority_update;
            let task = &mut self.tasks[task_idx];
            task.status = outcome.status;
            task.activation_time = Some(now);
            task.running = true;
            if let Some((queue_id, priority)) = queue_priority_update {
                self.set_queue_priority(queue_id, priority);
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
