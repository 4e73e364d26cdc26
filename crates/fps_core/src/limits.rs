//! Compile-time bounds shared by every FPS-aware crate.
//!
//! These mirror the fixed-capacity arrays of the original shared-memory
//! layout: every string and array field in [`crate::fps`] and
//! [`crate::param`] is bounded by one of these constants so the on-disk
//! layout never needs to reallocate.

/// Maximum number of segments in a parameter's keyword path (`MAXNBLEVELS`).
pub const KW_LEVELS_MAX: usize = 20;

/// Maximum length in bytes of the dotted `keywordfull` string.
pub const KW_FULL_MAX: usize = 200;

/// Maximum length in bytes of an FPS name.
pub const FPS_NAME_MAX: usize = 100;

/// Default/maximum number of parameter slots per FPS.
pub const NB_PARAM_MAX: usize = 100;

/// Maximum length in bytes of a parameter description.
pub const DESCR_MAX: usize = 200;

/// Maximum length in bytes of any inline string value slot.
pub const PARAM_STR_MAX: usize = 200;

/// Maximum length in bytes of one FIFO/console command line.
pub const CMD_LINE_MAX: usize = 1024;

/// Maximum length in bytes of one FPS message-log entry.
pub const LOG_MSG_MAX: usize = 256;

/// Number of task queues.
pub const NB_QUEUES_MAX: usize = 10;

/// Bounded capacity of the FPS header's message log.
pub const MSG_LOG_MAX: usize = 16;

/// KeywordTree arena capacity; exceeding this is a programming error, not
/// a user error.
pub const NB_KEYWNODE_MAX: usize = 10_000;

/// Default conf-loop check period in microseconds.
pub const DEFAULT_CONFWAITUS: u64 = 1_000;

/// `confwupdate` timeout bound, in microseconds (<= 1s).
pub const CONFWUPDATE_TIMEOUT_US: u64 = 1_000_000;

/// `runwait` timeout bound, in microseconds (<= 10^3 s).
pub const RUNWAIT_TIMEOUT_US: u64 = 1_000_000_000;

/// `confwupdate` poll step, in microseconds.
pub const CONFWUPDATE_POLL_US: u64 = 100;

/// `runwait` poll step, in microseconds (10ms).
pub const RUNWAIT_POLL_US: u64 = 10_000;

/// Control-loop keyboard poll timeout, in milliseconds.
pub const KEYBOARD_POLL_MS: u64 = 100;
