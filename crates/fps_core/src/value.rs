//! Tagged-union parameter value.
//!
//! Encoded as a sum type with one variant per [`ValueKind`]; each variant
//! carries its own slot structure (numeric = 4-slot current/min/max/feedback,
//! string = 2-slot value/companion) rather than a single raw memory block
//! reinterpreted through multiple aliases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Undef,
    Int64,
    Float64,
    Float32,
    Pid,
    Timespec,
    Filename,
    FitsFilename,
    ExecFilename,
    Dirname,
    StreamName,
    String,
    OnOff,
    FpsName,
}

impl ValueKind {
    /// Whether this kind has range (min/max) semantics.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int64 | ValueKind::Float64 | ValueKind::Float32)
    }

    /// Whether this kind is a filesystem path of some form.
    pub fn is_path_like(self) -> bool {
        matches!(
            self,
            ValueKind::Filename
                | ValueKind::FitsFilename
                | ValueKind::ExecFilename
                | ValueKind::Dirname
        )
    }
}

impl fmt::Display for ValueKind {
    /// Lowercase kind name, used in user-facing messages (range errors,
    /// persistence comments) instead of the `Debug` variant spelling.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Undef => "undef",
            ValueKind::Int64 => "int64",
            ValueKind::Float64 => "float64",
            ValueKind::Float32 => "float32",
            ValueKind::Pid => "pid",
            ValueKind::Timespec => "timespec",
            ValueKind::Filename => "filename",
            ValueKind::FitsFilename => "fitsfilename",
            ValueKind::ExecFilename => "execfilename",
            ValueKind::Dirname => "dirname",
            ValueKind::StreamName => "streamname",
            ValueKind::String => "string",
            ValueKind::OnOff => "onoff",
            ValueKind::FpsName => "fpsname",
        };
        write!(f, "{name}")
    }
}

/// A timespec value: seconds + nanoseconds, persisted as `%15ld %09ld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timespec {
    pub sec: i64,
    pub nsec: i64,
}

/// Four-slot numeric value: current/min/max/feedback. Range slots are
/// ignored for non-numeric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericSlots {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub feedback: f64,
}

/// Two-slot string value: value + companion. For `OnOff` the companion
/// pair is the off/on state labels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StringSlots {
    pub value: String,
    pub companion: String,
}

impl StringSlots {
    pub fn truncated(value: impl Into<String>, companion: impl Into<String>) -> Self {
        let mut value = value.into();
        let mut companion = companion.into();
        value.truncate(crate::limits::PARAM_STR_MAX);
        companion.truncate(crate::limits::PARAM_STR_MAX);
        Self { value, companion }
    }
}

/// The value payload, one variant per storage shape needed by [`ValueKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueCell {
    Undef,
    Numeric(NumericSlots),
    Text(StringSlots),
    OnOff { state: bool, off_label: String, on_label: String },
    Pid(i32),
    Timespec(Timespec),
}

impl Default for ValueCell {
    fn default() -> Self {
        ValueCell::Undef
    }
}

impl ValueCell {
    /// Construct the default (zeroed) cell for a given kind.
    pub fn default_for_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Undef => ValueCell::Undef,
            ValueKind::Int64 | ValueKind::Float64 | ValueKind::Float32 => {
                ValueCell::Numeric(NumericSlots::default())
            }
            ValueKind::Pid => ValueCell::Pid(0),
            ValueKind::Timespec => ValueCell::Timespec(Timespec::default()),
            ValueKind::OnOff => ValueCell::OnOff {
                state: false,
                off_label: "OFF".to_string(),
                on_label: "ON".to_string(),
            },
            ValueKind::Filename
            | ValueKind::FitsFilename
            | ValueKind::ExecFilename
            | ValueKind::Dirname
            | ValueKind::StreamName
            | ValueKind::String
            | ValueKind::FpsName => ValueCell::Text(StringSlots::default()),
        }
    }

    /// Current numeric value, if this is a numeric cell.
    pub fn current_f64(&self) -> Option<f64> {
        match self {
            ValueCell::Numeric(slots) => Some(slots.current),
            _ => None,
        }
    }

    pub fn set_current_f64(&mut self, v: f64) -> Result<(), ValueCellError> {
        match self {
            ValueCell::Numeric(slots) => {
                slots.current = v;
                Ok(())
            }
            _ => Err(ValueCellError::WrongShape),
        }
    }

    pub fn current_text(&self) -> Option<&str> {
        match self {
            ValueCell::Text(slots) => Some(&slots.value),
            _ => None,
        }
    }

    pub fn set_current_text(&mut self, v: impl Into<String>) -> Result<(), ValueCellError> {
        match self {
            ValueCell::Text(slots) => {
                let mut v = v.into();
                v.truncate(crate::limits::PARAM_STR_MAX);
                slots.value = v;
                Ok(())
            }
            _ => Err(ValueCellError::WrongShape),
        }
    }

    pub fn onoff_state(&self) -> Option<bool> {
        match self {
            ValueCell::OnOff { state, .. } => Some(*state),
            _ => None,
        }
    }

    pub fn set_onoff(&mut self, v: bool) -> Result<(), ValueCellError> {
        match self {
            ValueCell::OnOff { state, .. } => {
                *state = v;
                Ok(())
            }
            _ => Err(ValueCellError::WrongShape),
        }
    }

    /// Format the current value for the per-parameter persistence file
    /// body (before the trailing comment), with kind-appropriate widths.
    pub fn format_persisted(&self) -> String {
        match self {
            ValueCell::Undef => String::new(),
            ValueCell::Numeric(slots) => format!("{:18}", slots.current),
            ValueCell::Text(slots) => slots.value.clone(),
            ValueCell::OnOff { state, off_label, on_label } => {
                let bit = if *state { 1 } else { 0 };
                let label = if *state { on_label } else { off_label };
                format!("{bit}  {label}")
            }
            ValueCell::Pid(pid) => format!("{pid:18}"),
            ValueCell::Timespec(ts) => format!("{:15} {:09}", ts.sec, ts.nsec),
        }
    }
}

/// Error raised when a setter is used against the wrong [`ValueCell`] shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValueCellError {
    #[error("value cell shape does not match requested accessor")]
    WrongShape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_for_kind_numeric() {
        let cell = ValueCell::default_for_kind(ValueKind::Int64);
        assert_eq!(cell.current_f64(), Some(0.0));
    }

    #[test]
    fn onoff_formats_with_label() {
        let mut cell = ValueCell::default_for_kind(ValueKind::OnOff);
        cell.set_onoff(true).unwrap();
        assert_eq!(cell.format_persisted(), "1  ON");
    }

    #[test]
    fn text_is_bounds_enforced_on_write() {
        let mut cell = ValueCell::default_for_kind(ValueKind::String);
        let long = "x".repeat(crate::limits::PARAM_STR_MAX + 50);
        cell.set_current_text(long).unwrap();
        assert_eq!(cell.current_text().unwrap().len(), crate::limits::PARAM_STR_MAX);
    }
}
