//! Fade step strings
//!
//! A step is written `fadeTime:value[,value...]:holdTime` (milliseconds) and a
//! chase is a `|`-separated list of steps. A hold time of `-1` keeps the last
//! value forever and ends the chase there.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::action::{Action, Repeat};
use super::channel::{clamp_value, MIN_VALUE};
use crate::{error::ControlError, Result};

/// One step of a chase: target values for a group of channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    pub fade_ms: u64,
    /// `None` holds forever
    pub hold_ms: Option<u64>,
    pub values: Vec<i32>,
}

impl ValueSet {
    pub fn new(fade_ms: u64, hold_ms: Option<u64>, values: Vec<i32>) -> Self {
        Self {
            fade_ms,
            hold_ms,
            values: values.into_iter().map(clamp_value).collect(),
        }
    }

    /// Parse a single `fadeTime:values:holdTime` step
    pub fn parse(step: &str) -> Result<Self> {
        let parts: Vec<&str> = step.trim().split(':').collect();
        let [fade, values, hold] = parts.as_slice() else {
            return Err(ControlError::InvalidValueSet(format!(
                "expected fadeTime:values:holdTime, got '{}'",
                step
            )));
        };

        let fade_ms = fade.trim().parse::<u64>().map_err(|_| {
            ControlError::InvalidValueSet(format!("invalid fade time '{}' in '{}'", fade, step))
        })?;

        let hold_ms = match hold.trim().parse::<i64>() {
            Ok(-1) => None,
            Ok(ms) if ms >= 0 => Some(ms as u64),
            _ => {
                return Err(ControlError::InvalidValueSet(format!(
                    "invalid hold time '{}' in '{}'",
                    hold, step
                )))
            }
        };

        let values = values
            .split(',')
            .map(|v| {
                v.trim().parse::<i32>().map_err(|_| {
                    ControlError::InvalidValueSet(format!("invalid value '{}' in '{}'", v, step))
                })
            })
            .collect::<Result<Vec<i32>>>()?;

        Ok(Self::new(fade_ms, hold_ms, values))
    }

    /// Parse a `|`-separated list of steps
    pub fn parse_steps(text: &str) -> Result<Vec<Self>> {
        text.split('|').map(Self::parse).collect()
    }

    /// Value for the `index`-th channel, cycling through the listed values
    ///
    /// An empty set yields `MIN_VALUE`.
    pub fn value_for(&self, index: usize) -> i32 {
        if self.values.is_empty() {
            return MIN_VALUE;
        }
        self.values[index % self.values.len()]
    }

    /// Whether this step holds forever
    pub fn is_final(&self) -> bool {
        self.hold_ms.is_none()
    }

    /// The fade action this step installs on the `index`-th channel
    pub fn to_fade(&self, index: usize, repeat: Repeat) -> Action {
        Action::Fade {
            duration_ms: self.fade_ms,
            target: self.value_for(index),
            hold_ms: self.hold_ms.unwrap_or(0),
            repeat: if self.is_final() { Repeat::Once } else { repeat },
        }
    }
}

impl FromStr for ValueSet {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        let hold = self.hold_ms.map_or(-1, |ms| ms as i64);
        write!(f, "{}:{}:{}", self.fade_ms, values.join(","), hold)
    }
}
