//! `Parameter`: a [`ValueCell`] plus flags, keyword path, description,
//! update counter and per-kind metadata.

use serde::{Deserialize, Serialize};

use crate::flags::ParamFlags;
use crate::limits::{DESCR_MAX, KW_FULL_MAX, KW_LEVELS_MAX};
use crate::value::{ValueCell, ValueKind};

/// Ordered sequence of keyword segments naming a parameter within its FPS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPath {
    segments: Vec<String>,
    full: String,
}

/// Error constructing a [`KeywordPath`] that violates its length invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeywordPathError {
    #[error("keyword path must have at least one segment")]
    Empty,
    #[error("keyword path has {0} segments, exceeds KW_LEVELS_MAX ({KW_LEVELS_MAX})")]
    TooManyLevels(usize),
    #[error("keywordfull '{0}' exceeds KW_FULL_MAX ({KW_FULL_MAX})")]
    FullTooLong(String),
}

impl KeywordPath {
    pub fn new(segments: Vec<String>) -> Result<Self, KeywordPathError> {
        if segments.is_empty() {
            return Err(KeywordPathError::Empty);
        }
        if segments.len() > KW_LEVELS_MAX {
            return Err(KeywordPathError::TooManyLevels(segments.len()));
        }
        let full = segments.join(".");
        if full.len() > KW_FULL_MAX {
            return Err(KeywordPathError::FullTooLong(full));
        }
        Ok(Self { segments, full })
    }

    /// Parse a dotted path like `"conf.delay"` into a [`KeywordPath`].
    pub fn parse(full: &str) -> Result<Self, KeywordPathError> {
        Self::new(full.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The `.`-joined dotted string (invariant 1: `keywordfull == join(segments, ".")`).
    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        false // invariant: a constructed KeywordPath always has >=1 segment
    }
}

/// Per-kind metadata attached to a [`Parameter`] beyond its scalar value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ParamInfo {
    #[default]
    None,
    Stream {
        stream_id: Option<i64>,
        source: String,
        datatype: StreamDataType,
        shape: [usize; 3],
    },
    FpsLink {
        max: u32,
        active: u32,
        used: u32,
    },
}

/// Element type of a resolved stream, for `StreamName` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StreamDataType {
    #[default]
    Unknown,
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Complex64,
    Complex128,
}

/// A single parameter slot within an [`crate::fps::Fps`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    keyword_path: KeywordPath,
    pub kind: ValueKind,
    pub flags: ParamFlags,
    pub value: ValueCell,
    description: String,
    pub update_counter: u64,
    pub info: ParamInfo,
}

/// Error raised constructing or mutating a [`Parameter`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error(transparent)]
    KeywordPath(#[from] KeywordPathError),
    #[error("description length {0} exceeds DESCR_MAX ({DESCR_MAX})")]
    DescriptionTooLong(usize),
    #[error("parameter kind cannot change after activation")]
    KindIsImmutable,
}

impl Parameter {
    /// Construct an inactive parameter (caller must set `ACTIVE` to make
    /// it live — a parameter slot is live iff its flags have `ACTIVE` set).
    pub fn new(
        keyword_path: KeywordPath,
        kind: ValueKind,
        description: impl Into<String>,
    ) -> Result<Self, ParameterError> {
        let description = description.into();
        if description.len() > DESCR_MAX {
            return Err(ParameterError::DescriptionTooLong(description.len()));
        }
        Ok(Self {
            keyword_path,
            value: ValueCell::default_for_kind(kind),
            kind,
            flags: ParamFlags::empty(),
            description,
            update_counter: 0,
            info: ParamInfo::default(),
        })
    }

    pub fn keyword_path(&self) -> &KeywordPath {
        &self.keyword_path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(ParamFlags::ACTIVE)
    }

    /// Write the current-value slot and bump `update_counter`
    /// (invariant 2 and 3: monotonic counter, `getval` observes `v`
    /// with a strictly-greater counter immediately after `setval`).
    pub fn write_numeric(&mut self, v: f64) -> Result<(), crate::value::ValueCellError> {
        self.value.set_current_f64(v)?;
        self.update_counter += 1;
        Ok(())
    }

    pub fn write_text(&mut self, v: impl Into<String>) -> Result<(), crate::value::ValueCellError> {
        self.value.set_current_text(v)?;
        self.update_counter += 1;
        Ok(())
    }

    pub fn write_onoff(&mut self, v: bool) -> Result<(), crate::value::ValueCellError> {
        self.value.set_onoff(v)?;
        self.update_counter += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywordfull_is_dot_join() {
        let kp = KeywordPath::new(vec!["conf".into(), "delay".into()]).unwrap();
        assert_eq!(kp.full(), "conf.delay");
    }

    #[test]
    fn rejects_empty_path() {
        assert_eq!(KeywordPath::new(vec![]).unwrap_err(), KeywordPathError::Empty);
    }

    #[test]
    fn write_numeric_bumps_counter() {
        let kp = KeywordPath::parse("a.b").unwrap();
        let mut p = Parameter::new(kp, ValueKind::Int64, "test").unwrap();
        assert_eq!(p.update_counter, 0);
        p.write_numeric(42.0).unwrap();
        assert_eq!(p.update_counter, 1);
        assert_eq!(p.value.current_f64(), Some(42.0));
    }
}
