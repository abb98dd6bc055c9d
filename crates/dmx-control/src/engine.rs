//! Single-owner engine
//!
//! The [`Engine`] owns a [`Universe`] and is polled from one thread. Other
//! threads mutate channels through an [`EngineHandle`], which queues
//! [`ChannelCommand`]s that the engine applies at the start of the next tick.

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};

use crate::dmx::{Action, BaseChannel, Repeat, Universe, ValueSet, UNIVERSE_SIZE};
use crate::{error::ControlError, Result};

/// A mutation routed to the engine thread
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelCommand {
    SetValue {
        channels: Vec<BaseChannel>,
        value: i32,
    },
    SetAction {
        channels: Vec<BaseChannel>,
        action: Action,
    },
    AddAction {
        channels: Vec<BaseChannel>,
        action: Action,
    },
    Suspend {
        channels: Vec<BaseChannel>,
    },
    Resume {
        channels: Vec<BaseChannel>,
    },
    Clear {
        channels: Vec<BaseChannel>,
    },
    Chase {
        channels: Vec<BaseChannel>,
        steps: Vec<ValueSet>,
        repeat: Repeat,
    },
}

/// Cloneable sender side of an [`Engine`]
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: Sender<ChannelCommand>,
}

impl EngineHandle {
    /// Queue a command; fails once the engine is dropped
    pub fn send(&self, command: ChannelCommand) -> Result<()> {
        self.sender
            .send(command)
            .map_err(|_| ControlError::EngineClosed)
    }

    pub fn set_value(&self, channels: Vec<BaseChannel>, value: i32) -> Result<()> {
        self.send(ChannelCommand::SetValue { channels, value })
    }

    pub fn set_action(&self, channels: Vec<BaseChannel>, action: Action) -> Result<()> {
        self.send(ChannelCommand::SetAction { channels, action })
    }

    pub fn add_action(&self, channels: Vec<BaseChannel>, action: Action) -> Result<()> {
        self.send(ChannelCommand::AddAction { channels, action })
    }

    pub fn suspend(&self, channels: Vec<BaseChannel>) -> Result<()> {
        self.send(ChannelCommand::Suspend { channels })
    }

    pub fn resume(&self, channels: Vec<BaseChannel>) -> Result<()> {
        self.send(ChannelCommand::Resume { channels })
    }

    pub fn clear(&self, channels: Vec<BaseChannel>) -> Result<()> {
        self.send(ChannelCommand::Clear { channels })
    }

    /// Run `steps` in order on `channels`, repeating the whole chase
    pub fn chase(
        &self,
        channels: Vec<BaseChannel>,
        steps: Vec<ValueSet>,
        repeat: Repeat,
    ) -> Result<()> {
        self.send(ChannelCommand::Chase {
            channels,
            steps,
            repeat,
        })
    }
}

/// Owner of a universe, fed by [`EngineHandle`]s
pub struct Engine {
    universe: Universe,
    sender: Sender<ChannelCommand>,
    receiver: Receiver<ChannelCommand>,
}

impl Engine {
    /// Wrap `universe`, returning the engine and a first handle
    pub fn new(universe: Universe) -> (Self, EngineHandle) {
        let (sender, receiver) = unbounded();
        info!("DMX engine started for universe {}", universe.id());
        let handle = EngineHandle {
            sender: sender.clone(),
        };
        (
            Self {
                universe,
                sender,
                receiver,
            },
            handle,
        )
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn universe_mut(&mut self) -> &mut Universe {
        &mut self.universe
    }

    /// Apply every queued command in arrival order, returning how many ran
    ///
    /// Commands addressing another universe are logged and skipped.
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.receiver.try_recv() {
            match self.apply(command) {
                Ok(()) => applied += 1,
                Err(e) => warn!("Universe {}: dropped command: {}", self.universe.id(), e),
            }
        }
        applied
    }

    /// Apply pending commands, then render the frame at `now_ms`
    pub fn tick(&mut self, now_ms: u64) -> [u8; UNIVERSE_SIZE] {
        self.drain_commands();
        self.universe.calculate_buffer(now_ms)
    }

    fn apply(&mut self, command: ChannelCommand) -> Result<()> {
        match command {
            ChannelCommand::SetValue { channels, value } => self
                .universe
                .apply(&channels, |_, channel| channel.set_value(value)),
            ChannelCommand::SetAction { channels, action } => {
                self.universe.apply(&channels, |_, channel| {
                    channel.set_channel_action(action.clone())
                })
            }
            ChannelCommand::AddAction { channels, action } => {
                self.universe.apply(&channels, |_, channel| {
                    channel.add_channel_action(action.clone())
                })
            }
            ChannelCommand::Suspend { channels } => self
                .universe
                .apply(&channels, |_, channel| channel.suspend_action()),
            ChannelCommand::Resume { channels } => self
                .universe
                .apply(&channels, |_, channel| channel.resume_action()),
            ChannelCommand::Clear { channels } => self
                .universe
                .apply(&channels, |_, channel| channel.clear_action()),
            ChannelCommand::Chase {
                channels,
                steps,
                repeat,
            } => self.universe.apply_steps(&channels, &steps, repeat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_apply_in_order() {
        let (mut engine, handle) = Engine::new(Universe::new(0));
        let channels = vec![BaseChannel::new(0, 1)];

        handle.set_value(channels.clone(), 10).unwrap();
        handle.set_value(channels.clone(), 20).unwrap();

        let frame = engine.tick(0);
        assert_eq!(frame[0], 20);
    }

    #[test]
    fn test_handle_from_other_thread() {
        let (mut engine, handle) = Engine::new(Universe::new(0));
        let worker = std::thread::spawn(move || {
            handle
                .set_action(
                    vec![BaseChannel::new(0, 2)],
                    Action::fade(0, 128, 0).unwrap(),
                )
                .unwrap();
        });
        worker.join().unwrap();

        assert_eq!(engine.tick(0)[1], 128);
    }

    #[test]
    fn test_foreign_universe_command_is_skipped() {
        let (mut engine, handle) = Engine::new(Universe::new(0));
        handle.set_value(vec![BaseChannel::new(1, 1)], 50).unwrap();
        handle.set_value(vec![BaseChannel::new(0, 1)], 60).unwrap();

        assert_eq!(engine.drain_commands(), 1);
        assert_eq!(engine.universe().channel(1).unwrap().value(), 60);
    }

    #[test]
    fn test_chase_via_handle() {
        let (mut engine, handle) = Engine::new(Universe::new(0));
        let steps = vec![
            ValueSet::new(0, Some(100), vec![10, 20]),
            ValueSet::new(0, Some(100), vec![30, 40]),
        ];
        handle
            .chase(
                vec![BaseChannel::new(0, 1), BaseChannel::new(0, 2)],
                steps,
                Repeat::Once,
            )
            .unwrap();

        assert_eq!(&engine.tick(0)[..2], &[10, 20]);
        assert!(engine.universe().has_running_actions());
    }

    #[test]
    fn test_send_after_drop_fails() {
        let (engine, handle) = Engine::new(Universe::new(0));
        drop(engine);
        assert!(matches!(
            handle.clear(vec![BaseChannel::new(0, 1)]),
            Err(ControlError::EngineClosed)
        ));
    }

    #[test]
    fn test_suspend_resume_via_handle() {
        let (mut engine, handle) = Engine::new(Universe::new(0));
        let channels = vec![BaseChannel::new(0, 1)];
        handle.set_value(channels.clone(), 127).unwrap();
        handle.suspend(channels.clone()).unwrap();
        handle
            .add_action(channels.clone(), Action::fade(0, 243, 0).unwrap())
            .unwrap();
        handle.add_action(channels.clone(), Action::resume()).unwrap();

        assert_eq!(engine.tick(0)[0], 243);
        assert_eq!(engine.tick(10)[0], 127);
        assert!(!engine.universe().has_running_actions());
    }
}
