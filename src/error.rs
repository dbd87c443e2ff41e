use std::{fmt::Display, io, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Input,
    Output,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Side::Input => "input",
            Side::Output => "output",
        })
    }
}

/// First fatal error of a conversion. Every variant aborts the run, output written so far is kept.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to open {side} file {path:?}: {source}")]
    Open {
        side: Side,
        path: PathBuf,
        source: io::Error,
    },
    #[error("Failed to read field '{field}' of record {record}: input ends after {available} of {expected} bytes")]
    TruncatedRecord {
        record: u64,
        field: &'static str,
        available: usize,
        expected: usize,
    },
    #[error("Failed to read field '{field}' of record {record}: {source}")]
    Read {
        record: u64,
        field: &'static str,
        source: io::Error,
    },
    #[error("Failed to write field '{field}' of record {record}: {source}")]
    Write {
        record: u64,
        field: &'static str,
        source: io::Error,
    },
    #[error("Failed to close {side} file: {source}")]
    Close { side: Side, source: io::Error },
}

impl ConvertError {
    /// Non-zero process status for this kind of failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::Open { .. } => 2,
            ConvertError::TruncatedRecord { .. } => 3,
            ConvertError::Read { .. } => 4,
            ConvertError::Write { .. } => 5,
            ConvertError::Close { .. } => 6,
        }
    }

    /// Index of the record the error refers to, if any
    pub fn record(&self) -> Option<u64> {
        match self {
            ConvertError::TruncatedRecord { record, .. }
            | ConvertError::Read { record, .. }
            | ConvertError::Write { record, .. } => Some(*record),
            ConvertError::Open { .. } | ConvertError::Close { .. } => None,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConvertError::TruncatedRecord { field, .. }
            | ConvertError::Read { field, .. }
            | ConvertError::Write { field, .. } => Some(*field),
            ConvertError::Open { .. } | ConvertError::Close { .. } => None,
        }
    }
}
