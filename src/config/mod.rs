use serde::{Deserialize, Serialize};

mod batch_capacity;

pub use batch_capacity::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub batch_capacity: BatchCapacity,
}

impl ConverterConfig {
    pub fn with_batch_capacity(batch_capacity: BatchCapacity) -> Self {
        Self { batch_capacity }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct InvalidConfig {
    reason: String,
}

impl InvalidConfig {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
