//! Bounded channel value with a single current action

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::action::Action;
use super::base_channel::BaseChannel;

/// Lowest channel value
pub const MIN_VALUE: i32 = 0;
/// Highest channel value
pub const MAX_VALUE: i32 = 255;

/// An action bound to the instant and value it started from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAction {
    pub action: Action,
    /// Start timestamp, bound on first evaluation
    pub started_at: Option<u64>,
    pub start_value: i32,
}

impl ActiveAction {
    /// Unbound action, starting on its first evaluation
    pub fn new(action: Action) -> Self {
        Self {
            action,
            started_at: None,
            start_value: MIN_VALUE,
        }
    }

    /// Action already bound to `started_at`
    pub fn bound(action: Action, started_at: u64, start_value: i32) -> Self {
        Self {
            action,
            started_at: Some(started_at),
            start_value,
        }
    }
}

/// Outcome of evaluating the current action once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Stored (clamped) value after evaluation
    pub value: i32,
    /// The current pass reached its end
    pub pass_finished: bool,
}

/// Values and actions saved by [`Channel::suspend_action`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Suspension {
    pub value: i32,
    pub actions: Vec<Action>,
}

/// A DMX channel with a clamped value and one current action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    address: BaseChannel,
    value: i32,
    current: Option<ActiveAction>,
    suspended: Option<Suspension>,
}

impl Channel {
    /// Create a channel holding `initial_value` (clamped)
    pub fn new(address: BaseChannel, initial_value: i32) -> Self {
        Self {
            address,
            value: clamp_value(initial_value),
            current: None,
            suspended: None,
        }
    }

    pub fn address(&self) -> BaseChannel {
        self.address
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Store `value` clamped to `[MIN_VALUE, MAX_VALUE]`
    ///
    /// Direct writes are accepted while suspended.
    pub fn set_value(&mut self, value: i32) {
        self.value = clamp_value(value);
    }

    /// Replace the current action
    pub fn set_channel_action(&mut self, action: Action) {
        self.current = Some(ActiveAction::new(action));
    }

    /// Drop the current action and any suspended ones, keeping the value
    ///
    /// A suspended channel stays suspended with its saved value, but a later
    /// [`resume_action`](Self::resume_action) has nothing to bring back.
    pub fn clear_action(&mut self) {
        self.current = None;
        if let Some(suspension) = self.suspended.as_mut() {
            suspension.actions.clear();
        }
    }

    pub fn has_running_actions(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_action(&self) -> Option<&Action> {
        self.current.as_ref().map(|active| &active.action)
    }

    /// Save the value and stop the current action until resumed
    pub fn suspend_action(&mut self) {
        self.suspend_with(Vec::new());
    }

    /// Resume after [`suspend_action`](Self::suspend_action)
    ///
    /// Restores the saved value only if an action was running when the
    /// channel was suspended; otherwise just clears the flag. The parked
    /// action restarts from its beginning, bound on the next
    /// [`resolve`](Self::resolve).
    ///
    /// A `Channel` holds a single action, so the parked one replaces any
    /// action set while suspended. [`DmxChannel`](super::DmxChannel) queues
    /// that action behind the parked ones instead.
    pub fn resume_action(&mut self) {
        if let Some(actions) = self.take_resumed(false) {
            if let Some(replaced) = self.current.take() {
                trace!(
                    "Channel {} resumed over {:?}",
                    self.address,
                    replaced.action
                );
            }
            self.current = actions.into_iter().next().map(ActiveAction::new);
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.is_some()
    }

    /// Value saved at suspend time
    pub fn suspended_value(&self) -> Option<i32> {
        self.suspended.as_ref().map(|s| s.value)
    }

    pub(crate) fn suspend_with(&mut self, queued: Vec<Action>) {
        if self.suspended.is_some() {
            return;
        }
        let mut actions: Vec<Action> = self.current.take().map(|a| a.action).into_iter().collect();
        actions.extend(queued);
        trace!(
            "Channel {} suspended at {} with {} action(s)",
            self.address,
            self.value,
            actions.len()
        );
        self.suspended = Some(Suspension {
            value: self.value,
            actions,
        });
    }

    /// Leave the suspended state, returning the actions to reinstall
    ///
    /// With `restore_value` the saved value always comes back; without it the
    /// value is only restored when actions were suspended. Returns `None` when
    /// nothing needs reinstalling.
    pub(crate) fn take_resumed(&mut self, restore_value: bool) -> Option<Vec<Action>> {
        let suspension = self.suspended.take()?;
        if restore_value || !suspension.actions.is_empty() {
            self.value = suspension.value;
        }
        trace!("Channel {} resumed at {}", self.address, self.value);
        if suspension.actions.is_empty() {
            None
        } else {
            Some(suspension.actions)
        }
    }

    pub(crate) fn take_current(&mut self) -> Option<ActiveAction> {
        self.current.take()
    }

    pub(crate) fn install(&mut self, active: ActiveAction) {
        self.current = Some(active);
    }

    /// Evaluate the current action at `now_ms` and store the result
    ///
    /// Binds the start time and start value on the first evaluation. Returns
    /// `None` when no action is installed.
    pub fn resolve(&mut self, now_ms: u64) -> Option<Resolution> {
        let value = self.value;
        let active = self.current.as_mut()?;
        let started_at = match active.started_at {
            Some(started_at) => started_at,
            None => {
                active.started_at = Some(now_ms);
                active.start_value = value;
                now_ms
            }
        };
        let elapsed = now_ms.saturating_sub(started_at);
        let candidate = active.action.evaluate(active.start_value, elapsed);
        let pass_finished = active.action.pass_finished(elapsed);

        self.set_value(candidate);
        Some(Resolution {
            value: self.value,
            pass_finished,
        })
    }
}

pub(crate) fn clamp_value(value: i32) -> i32 {
    value.clamp(MIN_VALUE, MAX_VALUE)
}
