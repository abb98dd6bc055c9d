//! DMX Control - Channel Animation Engine
//!
//! This crate resolves time-based lighting actions into DMX512 channel values:
//! - **Addressing**: `universe:channel` parsing, ranges and lists
//! - **Channels**: clamped values, fade/hold actions, suspend/resume
//! - **Queues**: FIFO action queues with repeat budgets and listeners
//! - **Chases**: `fadeTime:values:holdTime` step strings
//! - **Universe**: 512-byte frame rendering
//! - **Engine**: single-owner command queue for cross-thread control
//!
//! ## Quick Start
//!
//! ```rust
//! use dmx_control::{Action, BaseChannel, Engine, Universe};
//!
//! # fn main() -> dmx_control::Result<()> {
//! let (mut engine, handle) = Engine::new(Universe::new(0));
//! let channels = BaseChannel::from_str_list("1/3", 0)?;
//!
//! handle.set_action(channels, Action::fade(1000, 255, 0)?)?;
//!
//! let frame = engine.tick(0);
//! assert_eq!(frame[0], 0);
//! let frame = engine.tick(1000);
//! assert_eq!(&frame[..3], &[255, 255, 255]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`dmx`] - Channels, actions, value sets and universes
//! - [`engine`] - Command-queue owner of a universe
//! - [`config`] - TOML configuration
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Engine and logging configuration
pub mod config;
/// DMX channels and actions
pub mod dmx;
/// Single-owner engine
pub mod engine;
/// Error types
pub mod error;

// Re-exports
pub use config::{EngineConfig, LogConfig};
pub use dmx::{
    Action, BaseChannel, Channel, DmxChannel, ListenerType, Repeat, Universe, ValueSet,
};
pub use engine::{ChannelCommand, Engine, EngineHandle};
pub use error::{ControlError, Result};
