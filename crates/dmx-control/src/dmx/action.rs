//! Channel actions
//!
//! An [`Action`] maps the time elapsed since it started to a channel value.
//! Actions carry a [`Repeat`] budget: once a pass finishes the owning
//! channel either drops the action or re-arms it for another pass.

use serde::{Deserialize, Serialize};

use crate::{error::ControlError, Result};

/// How many additional passes an action runs after the first one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Repeat {
    /// Runs until cleared
    Infinite,
    /// Runs exactly once
    #[default]
    Once,
    /// Runs `n` more times after the current pass
    Times(u32),
}

impl Repeat {
    /// Build from the numeric convention: -1 infinite, 0 once, N repeats
    pub fn from_count(count: i32) -> Self {
        match count {
            c if c < 0 => Repeat::Infinite,
            0 => Repeat::Once,
            c => Repeat::Times(c as u32),
        }
    }

    /// Numeric form: -1 infinite, 0 once, N repeats
    pub fn count(&self) -> i32 {
        match self {
            Repeat::Infinite => -1,
            Repeat::Once => 0,
            Repeat::Times(n) => i32::try_from(*n).unwrap_or(i32::MAX),
        }
    }

    /// Whether another pass is owed after the current one
    pub fn has_budget(&self) -> bool {
        !matches!(self, Repeat::Once | Repeat::Times(0))
    }

    /// Budget left after consuming one pass
    pub fn decrement(self) -> Self {
        match self {
            Repeat::Infinite => Repeat::Infinite,
            Repeat::Once | Repeat::Times(0) | Repeat::Times(1) => Repeat::Once,
            Repeat::Times(n) => Repeat::Times(n - 1),
        }
    }
}

/// A time-parameterized value generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Linear fade from the value at start to `target`, then hold
    Fade {
        duration_ms: u64,
        target: i32,
        hold_ms: u64,
        repeat: Repeat,
    },
    /// Keep the value at start for `duration_ms`
    Hold { duration_ms: u64, repeat: Repeat },
    /// Marker restoring the value saved when the channel was suspended
    Resume,
}

fn non_negative(name: &str, ms: i64) -> Result<u64> {
    u64::try_from(ms).map_err(|_| {
        ControlError::InvalidAction(format!("{} must not be negative (got {}ms)", name, ms))
    })
}

impl Action {
    /// Fade to `target` over `duration_ms`
    ///
    /// `repeat` follows the numeric convention of [`Repeat::from_count`].
    pub fn fade(duration_ms: i64, target: i32, repeat: i32) -> Result<Self> {
        Self::fade_with_hold(duration_ms, target, 0, repeat)
    }

    /// Fade to `target` over `duration_ms`, then keep it for `hold_ms`
    pub fn fade_with_hold(
        duration_ms: i64,
        target: i32,
        hold_ms: i64,
        repeat: i32,
    ) -> Result<Self> {
        Ok(Action::Fade {
            duration_ms: non_negative("fade duration", duration_ms)?,
            target,
            hold_ms: non_negative("hold time", hold_ms)?,
            repeat: Repeat::from_count(repeat),
        })
    }

    /// Keep the current value for `duration_ms`
    pub fn hold(duration_ms: i64, repeat: i32) -> Result<Self> {
        Ok(Action::Hold {
            duration_ms: non_negative("hold time", duration_ms)?,
            repeat: Repeat::from_count(repeat),
        })
    }

    pub fn resume() -> Self {
        Action::Resume
    }

    /// Length of one pass in milliseconds
    pub fn duration_ms(&self) -> u64 {
        match self {
            Action::Fade {
                duration_ms,
                hold_ms,
                ..
            } => duration_ms.saturating_add(*hold_ms),
            Action::Hold { duration_ms, .. } => *duration_ms,
            Action::Resume => 0,
        }
    }

    pub fn repeat(&self) -> Repeat {
        match self {
            Action::Fade { repeat, .. } | Action::Hold { repeat, .. } => *repeat,
            Action::Resume => Repeat::Once,
        }
    }

    /// Numeric repeat count: -1 infinite, 0 once, N repeats
    pub fn repeat_count(&self) -> i32 {
        self.repeat().count()
    }

    pub(crate) fn set_repeat(&mut self, new_repeat: Repeat) {
        match self {
            Action::Fade { repeat, .. } | Action::Hold { repeat, .. } => *repeat = new_repeat,
            Action::Resume => {}
        }
    }

    /// Value at `elapsed_ms` after the action started from `start_value`
    pub fn evaluate(&self, start_value: i32, elapsed_ms: u64) -> i32 {
        match self {
            Action::Fade {
                duration_ms,
                target,
                ..
            } => {
                if elapsed_ms >= *duration_ms {
                    return *target;
                }
                // duration_ms > elapsed_ms here, so the divisor is non-zero
                let delta = i128::from(*target) - i128::from(start_value);
                let step = delta * i128::from(elapsed_ms) / i128::from(*duration_ms);
                (i128::from(start_value) + step) as i32
            }
            Action::Hold { .. } | Action::Resume => start_value,
        }
    }

    /// Whether the current pass is over
    pub fn pass_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms()
    }

    /// Whether the action is done for good: pass over and no repeats left
    pub fn is_complete(&self, elapsed_ms: u64) -> bool {
        self.pass_finished(elapsed_ms) && !self.repeat().has_budget()
    }
}
