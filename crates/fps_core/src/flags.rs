//! Parameter flag bitset.
//!
//! The source's 40+ ad hoc flag bits are grouped here into a single
//! opaque `ParamFlags` newtype over `u64` with named, stable-position
//! constants, plus helper predicates (`is_writable_in_state`) instead of
//! scattering bit tests across call sites.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// The three process-relative states a parameter's effective writability
/// depends on (derived from the FPS header's `STATUS` bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsRunState {
    Idle,
    Conf,
    Run,
}

/// Bitset of parameter flags. Stable bit positions; names are the contract.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ParamFlags(u64);

macro_rules! flag_bits {
    ($($name:ident = $bit:expr),+ $(,)?) => {
        impl ParamFlags {
            $(pub const $name: ParamFlags = ParamFlags(1u64 << $bit);)+
        }
    };
}

flag_bits! {
    // Presence
    ACTIVE = 0,
    USED = 1,
    VISIBLE = 2,

    // Writability
    WRITE = 3,
    WRITECONF = 4,
    WRITERUN = 5,
    WRITESTATUS = 6,

    // Persistence / logging
    LOG = 7,
    SAVEONCHANGE = 8,
    SAVEONCLOSE = 9,

    // Validation
    CHECKINIT = 10,
    MINLIMIT = 11,
    MAXLIMIT = 12,
    FEEDBACK = 13,
    ERROR = 14,
    IMPORTED = 15,

    // State
    ONOFF = 16,
    CHECKSTREAM = 17,

    // Stream-loader directives
    FORCE_LOCALMEM = 18,
    FORCE_SHAREMEM = 19,
    FORCE_CONFFITS = 20,
    FORCE_CONFNAME = 21,
    SKIPSEARCH_LOCALMEM = 22,
    SKIPSEARCH_SHAREMEM = 23,
    SKIPSEARCH_CONFFITS = 24,
    SKIPSEARCH_CONFNAME = 25,
    UPDATE_SHAREMEM = 26,
    UPDATE_CONFFITS = 27,
    MEMLOADREPORT = 28,
    ENFORCE_DATATYPE = 29,
    ENFORCE_1D = 30,
    ENFORCE_2D = 31,
    ENFORCE_3D = 32,
    ENFORCE_XSIZE = 33,
    ENFORCE_YSIZE = 34,
    ENFORCE_ZSIZE = 35,

    // Required-at-state
    FILE_CONF_REQUIRED = 36,
    FILE_RUN_REQUIRED = 37,
    FPS_RUN_REQUIRED = 38,
    STREAM_CONF_REQUIRED = 39,
    STREAM_RUN_REQUIRED = 40,
}

impl ParamFlags {
    pub const NONE: ParamFlags = ParamFlags(0);

    pub fn empty() -> Self {
        Self::NONE
    }

    pub fn contains(self, other: ParamFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn insert(&mut self, other: ParamFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ParamFlags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: ParamFlags, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn from_bits(bits: u64) -> Self {
        ParamFlags(bits)
    }

    /// Effective writability: CONF -> WRITECONF, RUN -> WRITERUN, else WRITE.
    pub fn is_writable_in_state(self, state: FpsRunState) -> bool {
        match state {
            FpsRunState::Conf => self.contains(ParamFlags::WRITECONF),
            FpsRunState::Run => self.contains(ParamFlags::WRITERUN),
            FpsRunState::Idle => self.contains(ParamFlags::WRITE),
        }
    }
}

impl BitOr for ParamFlags {
    type Output = ParamFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        ParamFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParamFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ParamFlags {
    type Output = ParamFlags;
    fn bitand(self, rhs: Self) -> Self::Output {
        ParamFlags(self.0 & rhs.0)
    }
}

impl fmt::Debug for ParamFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParamFlags({:#x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writability_follows_state() {
        let mut flags = ParamFlags::empty();
        flags.insert(ParamFlags::WRITECONF);
        assert!(flags.is_writable_in_state(FpsRunState::Conf));
        assert!(!flags.is_writable_in_state(FpsRunState::Run));
        assert!(!flags.is_writable_in_state(FpsRunState::Idle));
    }

    #[test]
    fn insert_remove_roundtrip() {
        let mut flags = ParamFlags::empty();
        flags.insert(ParamFlags::ACTIVE | ParamFlags::ERROR);
        assert!(flags.contains(ParamFlags::ACTIVE));
        assert!(flags.contains(ParamFlags::ERROR));
        flags.remove(ParamFlags::ERROR);
        assert!(!flags.contains(ParamFlags::ERROR));
        assert!(flags.contains(ParamFlags::ACTIVE));
    }
}
