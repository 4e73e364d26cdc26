//! Pure domain logic for the function-parameter store: value model, flag
//! bitsets, the FPS container, keyword-path tree, argument coercion,
//! validation, task scheduling, and command dispatch. No filesystem,
//! shared-memory, or process I/O lives here — `fps_infra` supplies those
//! through the trait seams defined in [`validate`], [`interp`], and
//! [`schedule`].

#![forbid(unsafe_code)]

pub mod argbind;
pub mod directive;
pub mod error;
pub mod flags;
pub mod fps;
pub mod interp;
pub mod keytree;
pub mod limits;
pub mod param;
pub mod schedule;
pub mod validate;
pub mod value;

pub use directive::{BinderState, Directive};
pub use error::{FatalError, FpsOpError, TransientError, UserError};
pub use flags::{FpsRunState, ParamFlags};
pub use fps::{Fps, FpsBuildError, FpsHeader, FpsSignal, FpsStatus};
pub use interp::{CommandInterpreter, CommandOutcome, CommandStatus, FpsDirectory, SessionManager};
pub use keytree::{KeywordNode, KeywordTree, KeywordTreeOverflow};
pub use param::{KeywordPath, Parameter, ParamInfo};
pub use schedule::{Scheduler, Task, TaskFlags};
pub use value::{ValueCell, ValueKind};
