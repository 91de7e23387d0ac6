use std::fmt;

use super::{BlanketOverwrite, Relabel, SelectiveRemap};
use crate::pointcloud::error::RelabelError;

/// What the user asked for: a selective remap when an old label is given,
/// otherwise a blanket overwrite of the whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelabelRequest {
    Remap { old_label: i64, new_label: i64 },
    Overwrite { new_label: i64 },
}

impl RelabelRequest {
    /// Parses user-entered label text. Both fields are parsed before anything
    /// is returned, so a bad `new` is reported even when `old` is fine.
    pub fn parse(old: Option<&str>, new: &str) -> Result<Self, RelabelError> {
        let old_label = old.map(|text| parse_label("old", text)).transpose()?;
        let new_label = parse_label("new", new)?;

        Ok(match old_label {
            Some(old_label) => RelabelRequest::Remap {
                old_label,
                new_label,
            },
            None => RelabelRequest::Overwrite { new_label },
        })
    }

    pub fn new_label(&self) -> i64 {
        match self {
            RelabelRequest::Remap { new_label, .. } | RelabelRequest::Overwrite { new_label } => {
                *new_label
            }
        }
    }

    pub fn build(&self) -> Box<dyn Relabel> {
        match *self {
            RelabelRequest::Remap {
                old_label,
                new_label,
            } => Box::new(SelectiveRemap {
                old_label,
                new_label,
            }),
            RelabelRequest::Overwrite { new_label } => Box::new(BlanketOverwrite { new_label }),
        }
    }
}

impl fmt::Display for RelabelRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelabelRequest::Remap {
                old_label,
                new_label,
            } => write!(f, "{} -> {}", old_label, new_label),
            RelabelRequest::Overwrite { new_label } => write!(f, "* -> {}", new_label),
        }
    }
}

/// Parses one label field. Surrounding whitespace is ignored.
pub fn parse_label(field: &'static str, text: &str) -> Result<i64, RelabelError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| RelabelError::InvalidInput {
            field,
            text: text.to_string(),
        })
}
