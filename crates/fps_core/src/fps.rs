//! `Fps`: a named, fixed-capacity parameter collection plus its metadata
//! header. This module models the *data*, independent of how
//! it is backed by shared memory — `fps_infra::store` owns the mmap and
//! (de)serializes through this type.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::limits::{FPS_NAME_MAX, MSG_LOG_MAX, NB_PARAM_MAX};
use crate::param::{KeywordPath, Parameter};

/// `STATUS` bitset on the FPS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct FpsStatus(u32);

impl FpsStatus {
    pub const CONF: FpsStatus = FpsStatus(1 << 0);
    pub const RUN: FpsStatus = FpsStatus(1 << 1);
    pub const CMDCONF: FpsStatus = FpsStatus(1 << 2);
    pub const CMDRUN: FpsStatus = FpsStatus(1 << 3);
    pub const CHECKOK: FpsStatus = FpsStatus(1 << 4);

    pub fn empty() -> Self {
        FpsStatus(0)
    }

    pub fn contains(self, other: FpsStatus) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: FpsStatus) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: FpsStatus) {
        self.0 &= !other.0;
    }
}

impl BitOr for FpsStatus {
    type Output = FpsStatus;
    fn bitor(self, rhs: Self) -> Self::Output {
        FpsStatus(self.0 | rhs.0)
    }
}
impl BitOrAssign for FpsStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
impl BitAnd for FpsStatus {
    type Output = FpsStatus;
    fn bitand(self, rhs: Self) -> Self::Output {
        FpsStatus(self.0 & rhs.0)
    }
}

/// `SIGNAL` bitset on the FPS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct FpsSignal(u32);

impl FpsSignal {
    pub const UPDATE: FpsSignal = FpsSignal(1 << 0);
    pub const CONFRUN: FpsSignal = FpsSignal(1 << 1);
    pub const CHECKED: FpsSignal = FpsSignal(1 << 2);

    pub fn empty() -> Self {
        FpsSignal(0)
    }

    pub fn contains(self, other: FpsSignal) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: FpsSignal) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: FpsSignal) {
        self.0 &= !other.0;
    }
}

/// One entry in the FPS header's bounded message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpsMessage {
    pub param_index: Option<usize>,
    pub code: u32,
    pub text: String,
}

/// FPS metadata header, held at offset 0 of the shared-memory file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FpsHeader {
    name: String,
    pub nb_param_max: usize,
    pub fps_directory: String,
    pub source_file: String,
    pub source_line: u32,
    pub signal: FpsSignal,
    pub status: FpsStatus,
    pub conf_pid: Option<i32>,
    pub run_pid: Option<i32>,
    pub confwaitus: u64,
    pub messages: Vec<FpsMessage>,
    pub conferrcnt: u32,
}

impl FpsHeader {
    pub fn new(name: impl Into<String>, fps_directory: impl Into<String>) -> Result<Self, FpsBuildError> {
        let name = name.into();
        if name.len() > FPS_NAME_MAX {
            return Err(FpsBuildError::NameTooLong(name.len()));
        }
        Ok(Self {
            name,
            nb_param_max: NB_PARAM_MAX,
            fps_directory: fps_directory.into(),
            source_file: String::new(),
            source_line: 0,
            signal: FpsSignal::empty(),
            status: FpsStatus::empty(),
            conf_pid: None,
            run_pid: None,
            confwaitus: crate::limits::DEFAULT_CONFWAITUS,
            messages: Vec::new(),
            conferrcnt: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clear the message log (done at the start of every Validator pass).
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.conferrcnt = 0;
    }

    /// Append one message, dropping the newest on overflow.
    pub fn push_message(&mut self, param_index: Option<usize>, code: u32, text: impl Into<String>) {
        if self.messages.len() >= MSG_LOG_MAX {
            return;
        }
        let mut text = text.into();
        text.truncate(crate::limits::LOG_MSG_MAX);
        self.messages.push(FpsMessage { param_index, code, text });
        self.conferrcnt += 1;
    }

    /// The effective run-state used for writability checks.
    pub fn run_state(&self) -> crate::flags::FpsRunState {
        if self.status.contains(FpsStatus::CONF) {
            crate::flags::FpsRunState::Conf
        } else if self.status.contains(FpsStatus::RUN) {
            crate::flags::FpsRunState::Run
        } else {
            crate::flags::FpsRunState::Idle
        }
    }
}

/// Errors constructing or mutating an [`Fps`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FpsBuildError {
    #[error("fps name length {0} exceeds FPS_NAME_MAX ({FPS_NAME_MAX})")]
    NameTooLong(usize),
    #[error("no free parameter slot (NB_PARAM_MAX = {0} reached)")]
    NoFreeSlot(usize),
    #[error("parameter not found: {0}")]
    ParamNotFound(String),
    #[error(transparent)]
    Parameter(#[from] crate::param::ParameterError),
}

/// Named, fixed-capacity array of [`Parameter`] slots plus the header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fps {
    pub header: FpsHeader,
    parameters: Vec<Option<Parameter>>,
}

impl Fps {
    /// Create a fresh FPS: zeroed flags, all slots empty.
    pub fn create(name: impl Into<String>, fps_directory: impl Into<String>) -> Result<Self, FpsBuildError> {
        let header = FpsHeader::new(name, fps_directory)?;
        let capacity = header.nb_param_max;
        Ok(Self {
            header,
            parameters: (0..capacity).map(|_| None).collect(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.parameters.len()
    }

    /// Active (live) parameters, in slot order.
    pub fn active_parameters(&self) -> impl Iterator<Item = (usize, &Parameter)> {
        self.parameters
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
            .filter(|(_, p)| p.is_active())
    }

    pub fn active_parameters_mut(&mut self) -> impl Iterator<Item = (usize, &mut Parameter)> {
        self.parameters
            .iter_mut()
            .enumerate()
            .filter_map(|(i, p)| p.as_mut().map(|p| (i, p)))
            .filter(|(_, p)| p.is_active())
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index).and_then(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Parameter> {
        self.parameters.get_mut(index).and_then(|p| p.as_mut())
    }

    /// Find an active parameter by its dotted `keywordfull`.
    pub fn find_by_path(&self, full: &str) -> Option<(usize, &Parameter)> {
        self.active_parameters().find(|(_, p)| p.keyword_path().full() == full)
    }

    pub fn find_by_path_mut(&mut self, full: &str) -> Option<(usize, &mut Parameter)> {
        self.active_parameters_mut().find(|(_, p)| p.keyword_path().full() == full)
    }

    /// Add-entry: allocate the first free slot for `keywordfull` and
    /// activate it. Idempotent — a second call with the same path is a
    /// no-op returning the existing index.
    pub fn add_entry(
        &mut self,
        keyword_path: KeywordPath,
        kind: crate::value::ValueKind,
        description: impl Into<String>,
    ) -> Result<usize, FpsBuildError> {
        if let Some((idx, _)) = self.find_by_path(keyword_path.full()) {
            return Ok(idx);
        }
        let slot = self
            .parameters
            .iter()
            .position(|p| p.as_ref().map(|p| !p.is_active()).unwrap_or(true));
        let Some(idx) = slot else {
            return Err(FpsBuildError::NoFreeSlot(self.parameters.len()));
        };
        let mut param = Parameter::new(keyword_path, kind, description)?;
        param.flags.insert(crate::flags::ParamFlags::ACTIVE);
        self.parameters[idx] = Some(param);
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn add_entry_is_idempotent() {
        let mut fps = Fps::create("myfps", "/tmp/myfps").unwrap();
        let kp = KeywordPath::parse("conf.delay").unwrap();
        let idx1 = fps.add_entry(kp.clone(), ValueKind::Int64, "delay").unwrap();
        let idx2 = fps.add_entry(kp, ValueKind::Int64, "delay").unwrap();
        assert_eq!(idx1, idx2);
        assert_eq!(fps.active_parameters().count(), 1);
    }

    #[test]
    fn no_free_slot_is_fatal_kind_error() {
        let mut fps = Fps::create("tiny", "/tmp/tiny").unwrap();
        fps.header.nb_param_max = 1;
        fps.parameters = vec![None];
        fps.add_entry(KeywordPath::parse("a.b").unwrap(), ValueKind::Int64, "x")
            .unwrap();
        let err = fps
            .add_entry(KeywordPath::parse("a.c").unwrap(), ValueKind::Int64, "y")
            .unwrap_err();
        assert_eq!(err, FpsBuildError::NoFreeSlot(1));
    }
}
