//! Queued, listener-aware DMX channel
//!
//! [`DmxChannel`] resolves a FIFO of [`Action`]s into a value stream. The
//! owner polls [`DmxChannel::get_new_value`] at a fixed cadence; each call
//! evaluates the head action, stores the value and fans it out to listeners.
//!
//! Passes that finish with a repeat budget left go back to the tail of the
//! queue, so two infinite fades alternate:
//!
//! ```rust
//! use dmx_control::dmx::{Action, DmxChannel};
//!
//! let mut channel = DmxChannel::new(0, 1, 0);
//! channel.add_channel_action(Action::fade(1000, 243, -1).unwrap());
//! channel.add_channel_action(Action::fade(1000, 127, -1).unwrap());
//!
//! assert_eq!(channel.get_new_value(0), 0);
//! assert_eq!(channel.get_new_value(1000), 243);
//! assert_eq!(channel.get_new_value(2000), 127);
//! assert_eq!(channel.get_new_value(3000), 243);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, trace};

use super::action::Action;
use super::base_channel::BaseChannel;
use super::channel::{ActiveAction, Channel, Resolution};

/// Kind of notification a listener subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListenerType {
    /// Every resolved value
    Value,
    /// Running state changes, reported as 1 (running) or 0 (idle)
    Action,
}

/// Listener callback, called with the listener key and the new value
pub type ListenerCallback = Box<dyn FnMut(&str, i32) + Send>;

struct Listener {
    callback: ListenerCallback,
    listener_type: ListenerType,
}

/// A channel resolving a queue of actions over time
pub struct DmxChannel {
    channel: Channel,
    queue: VecDeque<Action>,
    listeners: BTreeMap<String, Listener>,
    last_running: bool,
}

impl DmxChannel {
    /// Create a channel at `universe:channel` holding `initial_value`
    pub fn new(universe: i32, channel: i32, initial_value: i32) -> Self {
        Self::with_address(BaseChannel::new(universe, channel), initial_value)
    }

    pub fn with_address(address: BaseChannel, initial_value: i32) -> Self {
        Self {
            channel: Channel::new(address, initial_value),
            queue: VecDeque::new(),
            listeners: BTreeMap::new(),
            last_running: false,
        }
    }

    pub fn address(&self) -> BaseChannel {
        self.channel.address()
    }

    pub fn value(&self) -> i32 {
        self.channel.value()
    }

    /// Store a value directly (clamped), independent of running actions
    pub fn set_value(&mut self, value: i32) {
        self.channel.set_value(value);
    }

    /// Append `action` behind the current and queued actions
    pub fn add_channel_action(&mut self, action: Action) {
        trace!("Channel {}: queued {:?}", self.address(), action);
        self.queue.push_back(action);
    }

    /// Flush current and queued actions and run `action` alone
    pub fn set_channel_action(&mut self, action: Action) {
        trace!("Channel {}: set {:?}", self.address(), action);
        self.queue.clear();
        self.channel.set_channel_action(action);
    }

    /// Drop the current, queued and suspended actions; the value is kept
    pub fn clear_action(&mut self) {
        self.queue.clear();
        self.channel.clear_action();
    }

    /// True while an action is current or waiting in the queue
    pub fn has_running_actions(&self) -> bool {
        self.channel.has_running_actions() || !self.queue.is_empty()
    }

    /// Number of actions waiting behind the current one
    pub fn queued_actions(&self) -> usize {
        self.queue.len()
    }

    pub fn current_action(&self) -> Option<&Action> {
        self.channel.current_action()
    }

    /// Save the value and park all actions until resumed
    pub fn suspend_action(&mut self) {
        let queued: Vec<Action> = self.queue.drain(..).collect();
        self.channel.suspend_with(queued);
    }

    /// Leave the suspended state
    ///
    /// Parked actions are reinstalled ahead of anything queued meanwhile and
    /// the saved value is restored. They restart from their beginning rather
    /// than from the point they were suspended at. Without parked actions
    /// only the flag is cleared.
    pub fn resume_action(&mut self) {
        if let Some(restored) = self.channel.take_resumed(false) {
            self.reinstall(restored);
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.channel.is_suspended()
    }

    /// Register `callback` under `key`, replacing any listener with that key
    pub fn add_listener<F>(
        &mut self,
        key: impl Into<String>,
        callback: F,
        listener_type: ListenerType,
    ) where
        F: FnMut(&str, i32) + Send + 'static,
    {
        self.listeners.insert(
            key.into(),
            Listener {
                callback: Box::new(callback),
                listener_type,
            },
        );
    }

    /// Remove the listener registered under `key`, returning whether it existed
    pub fn remove_listener(&mut self, key: &str) -> bool {
        self.listeners.remove(key).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Resolve the action queue at `now_ms` and return the stored value
    pub fn get_new_value(&mut self, now_ms: u64) -> i32 {
        if !self.channel.has_running_actions() {
            if let Some(next) = self.queue.pop_front() {
                debug!("Channel {}: starting {:?}", self.address(), next);
                self.channel.install(ActiveAction::new(next));
            }
        }

        let resolution = if matches!(self.channel.current_action(), Some(Action::Resume)) {
            self.complete_resume();
            Some(Resolution {
                value: self.channel.value(),
                pass_finished: true,
            })
        } else {
            self.channel.resolve(now_ms)
        };

        if let Some(resolution) = resolution {
            trace!(
                "Channel {}: value {} at {}",
                self.address(),
                resolution.value,
                now_ms
            );
            self.notify(ListenerType::Value, resolution.value);
            if resolution.pass_finished {
                self.finish_pass(now_ms);
            }
        }

        self.notify_running_state();
        self.channel.value()
    }

    fn complete_resume(&mut self) {
        self.channel.take_current();
        if !self.channel.is_suspended() {
            debug!("Channel {}: resume without suspension", self.address());
            return;
        }
        let restored = self.channel.take_resumed(true).unwrap_or_default();
        debug!(
            "Channel {}: resumed at {} with {} parked action(s)",
            self.address(),
            self.channel.value(),
            restored.len()
        );
        self.reinstall(restored);
    }

    /// Put `restored` ahead of the running action and the queue
    fn reinstall(&mut self, restored: Vec<Action>) {
        let running = self.channel.take_current().map(|active| active.action);
        let pending = std::mem::take(&mut self.queue);
        self.queue = restored.into_iter().chain(running).chain(pending).collect();
    }

    /// Retire or re-arm the current action and start the next one at `now_ms`
    fn finish_pass(&mut self, now_ms: u64) {
        if let Some(finished) = self.channel.take_current() {
            let mut action = finished.action;
            let repeat = action.repeat();
            if repeat.has_budget() {
                action.set_repeat(repeat.decrement());
                self.queue.push_back(action);
            } else {
                debug!("Channel {}: completed {:?}", self.address(), action);
            }
        }

        if let Some(next) = self.queue.pop_front() {
            let start_value = self.channel.value();
            self.channel
                .install(ActiveAction::bound(next, now_ms, start_value));
        }
    }

    fn notify_running_state(&mut self) {
        let running = self.has_running_actions();
        if running != self.last_running {
            self.last_running = running;
            self.notify(ListenerType::Action, i32::from(running));
        }
    }

    fn notify(&mut self, listener_type: ListenerType, value: i32) {
        let address = self.channel.address();
        for (key, listener) in self
            .listeners
            .iter_mut()
            .filter(|(_, listener)| listener.listener_type == listener_type)
        {
            let callback = &mut listener.callback;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(key.as_str(), value)));
            if outcome.is_err() {
                error!("Listener '{}' on channel {} panicked", key, address);
            }
        }
    }
}

impl fmt::Debug for DmxChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmxChannel")
            .field("channel", &self.channel)
            .field("queue", &self.queue)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
