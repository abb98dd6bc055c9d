//! A universe of DMX channels rendered into a 512-byte frame

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::action::Repeat;
use super::base_channel::{BaseChannel, MAX_CHANNEL_ID, MAX_UNIVERSE_ID, MIN_CHANNEL_ID};
use super::channel::MIN_VALUE;
use super::dmx_channel::DmxChannel;
use super::value_set::ValueSet;
use crate::{error::ControlError, Result};

/// Number of channels in one DMX512 frame
pub const UNIVERSE_SIZE: usize = MAX_CHANNEL_ID as usize;

/// The channels of one universe
#[derive(Debug)]
pub struct Universe {
    id: u16,
    channels: BTreeMap<u16, DmxChannel>,
}

impl Universe {
    /// Create an empty universe, clamping `id` into the valid range
    pub fn new(id: i32) -> Self {
        Self {
            id: id.clamp(0, i32::from(MAX_UNIVERSE_ID)) as u16,
            channels: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// Get or create the channel at `address`
    pub fn register_channel(&mut self, address: BaseChannel) -> Result<&mut DmxChannel> {
        if address.universe_id() != self.id {
            return Err(ControlError::InvalidAddress(format!(
                "channel {} does not belong to universe {}",
                address, self.id
            )));
        }
        Ok(self.channel_mut(address.channel_id()))
    }

    pub fn channel(&self, channel_id: u16) -> Option<&DmxChannel> {
        self.channels.get(&channel_id)
    }

    /// Get or create channel `channel_id` (clamped to 1-512)
    pub fn channel_mut(&mut self, channel_id: u16) -> &mut DmxChannel {
        let channel_id = channel_id.clamp(MIN_CHANNEL_ID, MAX_CHANNEL_ID);
        let universe = self.id;
        self.channels.entry(channel_id).or_insert_with(|| {
            debug!("Universe {}: registering channel {}", universe, channel_id);
            DmxChannel::with_address(
                BaseChannel::new(i32::from(universe), i32::from(channel_id)),
                MIN_VALUE,
            )
        })
    }

    pub fn channels(&self) -> impl Iterator<Item = &DmxChannel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Whether any channel still has actions to run
    pub fn has_running_actions(&self) -> bool {
        self.channels.values().any(DmxChannel::has_running_actions)
    }

    /// Run `f` on every addressed channel, registering missing ones
    ///
    /// Fails before touching anything if an address names another universe.
    pub fn apply<F>(&mut self, addresses: &[BaseChannel], mut f: F) -> Result<()>
    where
        F: FnMut(usize, &mut DmxChannel),
    {
        if let Some(foreign) = addresses.iter().find(|a| a.universe_id() != self.id) {
            return Err(ControlError::InvalidAddress(format!(
                "channel {} does not belong to universe {}",
                foreign, self.id
            )));
        }
        for (index, address) in addresses.iter().enumerate() {
            f(index, self.channel_mut(address.channel_id()));
        }
        Ok(())
    }

    /// Install a chase on `addresses`
    ///
    /// The first step replaces whatever ran before, the rest are queued. Each
    /// channel takes its value from the step by position. A hold-forever step
    /// ends the chase.
    pub fn apply_steps(
        &mut self,
        addresses: &[BaseChannel],
        steps: &[ValueSet],
        repeat: Repeat,
    ) -> Result<()> {
        let end = steps
            .iter()
            .position(ValueSet::is_final)
            .map_or(steps.len(), |last| last + 1);
        if end < steps.len() {
            warn!(
                "Universe {}: dropping {} step(s) after a hold-forever step",
                self.id,
                steps.len() - end
            );
        }
        let steps = &steps[..end];

        self.apply(addresses, |index, channel| {
            for (n, step) in steps.iter().enumerate() {
                let action = step.to_fade(index, repeat);
                if n == 0 {
                    channel.set_channel_action(action);
                } else {
                    channel.add_channel_action(action);
                }
            }
        })
    }

    /// Poll every channel at `now_ms` and render the frame
    pub fn calculate_buffer(&mut self, now_ms: u64) -> [u8; UNIVERSE_SIZE] {
        let mut buffer = [0u8; UNIVERSE_SIZE];
        for (&channel_id, channel) in self.channels.iter_mut() {
            let value = channel.get_new_value(now_ms);
            // channel ids are 1-indexed, the frame is 0-indexed
            let index = usize::from(channel_id).saturating_sub(1);
            if let Some(slot) = buffer.get_mut(index) {
                *slot = value.clamp(0, 255) as u8;
            }
        }
        buffer
    }
}
