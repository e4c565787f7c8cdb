use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest store number; stores are numbered `1..=MAX_STORES`.
pub const MAX_STORES: u8 = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreIdError {
    #[error("Store number {0} is out of range (1-20)")]
    OutOfRange(i64),

    #[error("Invalid store number '{0}'")]
    Invalid(String),
}

/// A retail store number in `1..=20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct StoreId(u8);

impl StoreId {
    pub fn new(n: u8) -> Result<Self, StoreIdError> {
        Self::try_from(i64::from(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for StoreId {
    type Error = StoreIdError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        if (1..=i64::from(MAX_STORES)).contains(&n) {
            Ok(StoreId(n as u8))
        } else {
            Err(StoreIdError::OutOfRange(n))
        }
    }
}

impl From<StoreId> for u8 {
    fn from(id: StoreId) -> u8 {
        id.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoreId {
    type Err = StoreIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s
            .trim()
            .parse()
            .map_err(|_| StoreIdError::Invalid(s.to_string()))?;
        Self::try_from(n)
    }
}
