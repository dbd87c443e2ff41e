use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::InvalidConfig;

pub const DEFAULT_BATCH_CAPACITY: usize = 256;
pub const MAX_BATCH_CAPACITY: usize = 1 << 20;

/// Number of records processed per batch. Bounds the memory used by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BatchCapacity(usize);

impl Default for BatchCapacity {
    fn default() -> Self {
        Self(DEFAULT_BATCH_CAPACITY)
    }
}

impl TryFrom<usize> for BatchCapacity {
    type Error = InvalidConfig;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(InvalidConfig::new("Batch capacity mustn't be 0"))
        } else if value > MAX_BATCH_CAPACITY {
            Err(InvalidConfig::new(format!(
                "Batch capacity is too big: Allowed({MAX_BATCH_CAPACITY}) < Given({value})"
            )))
        } else {
            Ok(BatchCapacity(value))
        }
    }
}

impl From<BatchCapacity> for usize {
    fn from(value: BatchCapacity) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for BatchCapacity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = usize::deserialize(deserializer)?;
        raw.try_into()
            .map_err(<D::Error as serde::de::Error>::custom)
    }
}

impl Deref for BatchCapacity {
    type Target = usize;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
