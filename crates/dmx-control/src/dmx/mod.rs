//! DMX channel engine
//!
//! This module models a DMX512 universe as a set of independently animated
//! channels.
//!
//! - [`BaseChannel`] - `(universe, channel)` addressing and parsing
//! - [`Channel`] - clamped value plus one current action with suspend/resume
//! - [`DmxChannel`] - FIFO action queue, listeners, time-driven resolution
//! - [`Action`] - fade, hold and resume actions with a repeat budget
//! - [`ValueSet`] - `fadeTime:values:holdTime` chase steps
//! - [`Universe`] - channel set rendered into a 512-byte frame
//!
//! ## Example Usage
//!
//! ```rust
//! use dmx_control::dmx::{Action, DmxChannel, ListenerType};
//!
//! let mut channel = DmxChannel::new(0, 1, 0);
//! channel.add_listener("dimmer", |key: &str, value: i32| {
//!     println!("{} -> {}", key, value);
//! }, ListenerType::Value);
//!
//! channel.add_channel_action(Action::fade(1000, 243, 0).unwrap());
//! assert_eq!(channel.get_new_value(0), 0);
//! assert!(channel.has_running_actions());
//! assert_eq!(channel.get_new_value(1000), 243);
//! assert!(!channel.has_running_actions());
//! ```

pub mod action;
pub mod base_channel;
pub mod channel;
pub mod dmx_channel;
pub mod universe;
pub mod value_set;

pub use action::{Action, Repeat};
pub use base_channel::{
    BaseChannel, MAX_CHANNEL_ID, MAX_UNIVERSE_ID, MIN_CHANNEL_ID, MIN_UNIVERSE_ID,
};
pub use channel::{ActiveAction, Channel, Resolution, MAX_VALUE, MIN_VALUE};
pub use dmx_channel::{DmxChannel, ListenerCallback, ListenerType};
pub use universe::{Universe, UNIVERSE_SIZE};
pub use value_set::ValueSet;
