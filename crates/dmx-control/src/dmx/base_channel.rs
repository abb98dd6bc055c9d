//! DMX channel addressing
//!
//! A [`BaseChannel`] is the `(universe, channel)` identity of a single DMX512
//! slot. Addresses are written as `universe:channel`; lists of them are
//! comma-separated and a `/width` suffix expands to consecutive channels:
//!
//! ```rust
//! use dmx_control::dmx::BaseChannel;
//!
//! let channels = BaseChannel::from_str_list("2:100/2,105", 0).unwrap();
//! assert_eq!(
//!     channels,
//!     vec![
//!         BaseChannel::new(2, 100),
//!         BaseChannel::new(2, 101),
//!         BaseChannel::new(0, 105),
//!     ]
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::{error::ControlError, Result};

/// Lowest universe id
pub const MIN_UNIVERSE_ID: u16 = 0;
/// Highest universe id (15-bit Art-Net port address space)
pub const MAX_UNIVERSE_ID: u16 = 32767;
/// First channel of a universe (DMX channels are 1-indexed)
pub const MIN_CHANNEL_ID: u16 = 1;
/// Last channel of a universe
pub const MAX_CHANNEL_ID: u16 = 512;

/// Identity of a DMX channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseChannel {
    universe: u16,
    channel: u16,
}

impl BaseChannel {
    /// Create a channel address, clamping both ids into their valid ranges
    pub fn new(universe: i32, channel: i32) -> Self {
        Self::from_raw(i64::from(universe), i64::from(channel))
    }

    fn from_raw(universe: i64, channel: i64) -> Self {
        Self {
            universe: universe.clamp(i64::from(MIN_UNIVERSE_ID), i64::from(MAX_UNIVERSE_ID))
                as u16,
            channel: channel.clamp(i64::from(MIN_CHANNEL_ID), i64::from(MAX_CHANNEL_ID)) as u16,
        }
    }

    /// Universe this channel belongs to
    pub fn universe_id(&self) -> u16 {
        self.universe
    }

    /// Channel id within the universe (1-512)
    pub fn channel_id(&self) -> u16 {
        self.channel
    }

    /// Compare two addresses, returning -1, 0 or 1
    pub fn compare_to(&self, other: &BaseChannel) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// Parse a comma-separated list of channel addresses
    ///
    /// Supported fragments:
    /// - `universe:channel` - explicit universe
    /// - `channel` - uses `default_universe`
    /// - `channel/width` or `universe:channel/width` - `width` consecutive channels
    ///
    /// A malformed fragment fails the whole list; nothing is skipped.
    pub fn from_str_list(text: &str, default_universe: i32) -> Result<Vec<BaseChannel>> {
        let mut channels = Vec::new();

        for fragment in text.split(',') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                return Err(ControlError::InvalidAddress(format!(
                    "empty fragment in '{}'",
                    text
                )));
            }

            let (address, width) = match fragment.split_once('/') {
                Some((address, width)) => (address, parse_number(width, fragment)?),
                None => (fragment, 1),
            };
            if width < 1 {
                return Err(ControlError::InvalidAddress(format!(
                    "width must be positive in '{}'",
                    fragment
                )));
            }

            let first = parse_address(address, fragment, default_universe)?;
            let width = width.min(i64::from(MAX_CHANNEL_ID));
            let last = i64::from(first.channel) + width - 1;
            if last > i64::from(MAX_CHANNEL_ID) {
                warn!(
                    "Channel range '{}' exceeds channel {}, truncating",
                    fragment, MAX_CHANNEL_ID
                );
            }
            let last = last.min(i64::from(MAX_CHANNEL_ID));

            channels.extend(
                (i64::from(first.channel)..=last)
                    .map(|channel| Self::from_raw(i64::from(first.universe), channel)),
            );
        }

        Ok(channels)
    }
}

fn parse_number(part: &str, fragment: &str) -> Result<i64> {
    part.trim().parse::<i64>().map_err(|_| {
        ControlError::InvalidAddress(format!("'{}' is not a number in '{}'", part, fragment))
    })
}

fn parse_address(address: &str, fragment: &str, default_universe: i32) -> Result<BaseChannel> {
    let parts: Vec<&str> = address.split(':').collect();
    match parts.as_slice() {
        [channel] => Ok(BaseChannel::from_raw(
            i64::from(default_universe),
            parse_number(channel, fragment)?,
        )),
        [universe, channel] => Ok(BaseChannel::from_raw(
            parse_number(universe, fragment)?,
            parse_number(channel, fragment)?,
        )),
        _ => Err(ControlError::InvalidAddress(format!(
            "too many ':' in '{}'",
            fragment
        ))),
    }
}

impl Ord for BaseChannel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.universe
            .cmp(&other.universe)
            .then(self.channel.cmp(&other.channel))
    }
}

impl PartialOrd for BaseChannel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.universe, self.channel)
    }
}

/// Parses exactly one address; ranges and lists are rejected
impl FromStr for BaseChannel {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains(',') || s.contains('/') {
            return Err(ControlError::InvalidAddress(format!(
                "expected a single address, got '{}'",
                s
            )));
        }
        parse_address(s, s, i32::from(MIN_UNIVERSE_ID))
    }
}

impl TryFrom<String> for BaseChannel {
    type Error = ControlError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BaseChannel> for String {
    fn from(channel: BaseChannel) -> Self {
        channel.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamping_at_both_bounds() {
        let low = BaseChannel::new(-1, 0);
        assert_eq!(low.universe_id(), MIN_UNIVERSE_ID);
        assert_eq!(low.channel_id(), MIN_CHANNEL_ID);

        let high = BaseChannel::new(40000, 513);
        assert_eq!(high.universe_id(), MAX_UNIVERSE_ID);
        assert_eq!(high.channel_id(), MAX_CHANNEL_ID);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(BaseChannel::new(5, 100).to_string(), "5:100");
    }

    #[test]
    fn test_from_str_list_single_channels() {
        assert_eq!(
            BaseChannel::from_str_list("2:100", 0).unwrap(),
            vec![BaseChannel::new(2, 100)]
        );
        assert_eq!(
            BaseChannel::from_str_list("100", 2).unwrap(),
            vec![BaseChannel::new(2, 100)]
        );
    }

    #[test]
    fn test_from_str_list_width_and_lists() {
        assert_eq!(
            BaseChannel::from_str_list("100/2", 2).unwrap(),
            vec![BaseChannel::new(2, 100), BaseChannel::new(2, 101)]
        );
        assert_eq!(
            BaseChannel::from_str_list("100,102", 2).unwrap(),
            vec![BaseChannel::new(2, 100), BaseChannel::new(2, 102)]
        );
        assert_eq!(
            BaseChannel::from_str_list("3:10/2, 1", 2).unwrap(),
            vec![
                BaseChannel::new(3, 10),
                BaseChannel::new(3, 11),
                BaseChannel::new(2, 1)
            ]
        );
    }

    #[test]
    fn test_from_str_list_keeps_input_order() {
        let channels = BaseChannel::from_str_list("7,3", 0).unwrap();
        assert_eq!(channels, vec![BaseChannel::new(0, 7), BaseChannel::new(0, 3)]);
    }

    #[test]
    fn test_from_str_list_truncates_range_at_last_channel() {
        let channels = BaseChannel::from_str_list("511/4", 0).unwrap();
        assert_eq!(
            channels,
            vec![BaseChannel::new(0, 511), BaseChannel::new(0, 512)]
        );
    }

    #[test]
    fn test_from_str_list_huge_width_stops_at_last_channel() {
        let channels = BaseChannel::from_str_list("2/9223372036854775807", 0).unwrap();
        assert_eq!(channels.len(), 511);
        assert_eq!(channels.first(), Some(&BaseChannel::new(0, 2)));
        assert_eq!(channels.last(), Some(&BaseChannel::new(0, 512)));
    }

    #[test]
    fn test_from_str_list_clamps_parsed_ids() {
        assert_eq!(
            BaseChannel::from_str_list("0:600", 0).unwrap(),
            vec![BaseChannel::new(0, 512)]
        );
    }

    #[test]
    fn test_from_str_list_rejects_malformed_fragments() {
        for text in ["", "abc", "1:2:3", "5/0", "5/x", "1,,2", "1:", ":4"] {
            let result = BaseChannel::from_str_list(text, 0);
            assert!(
                matches!(result, Err(ControlError::InvalidAddress(_))),
                "expected error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_from_str_single_address() {
        let channel: BaseChannel = "4:20".parse().unwrap();
        assert_eq!(channel, BaseChannel::new(4, 20));
        assert!("4:20/2".parse::<BaseChannel>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let channel = BaseChannel::new(1, 42);
        let json = serde_json::to_string(&channel).unwrap();
        assert_eq!(json, "\"1:42\"");
        let back: BaseChannel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, channel);
    }

    #[test]
    fn test_compare_to() {
        let a = BaseChannel::new(0, 512);
        let b = BaseChannel::new(1, 1);
        assert_eq!(a.compare_to(&b), -1);
        assert_eq!(b.compare_to(&a), 1);
        assert_eq!(a.compare_to(&a), 0);
    }

    proptest! {
        #[test]
        fn prop_channel_id_always_in_range(universe in any::<i32>(), channel in any::<i32>()) {
            let c = BaseChannel::new(universe, channel);
            prop_assert!((MIN_CHANNEL_ID..=MAX_CHANNEL_ID).contains(&c.channel_id()));
            prop_assert!(c.universe_id() <= MAX_UNIVERSE_ID);
        }

        #[test]
        fn prop_order_matches_tuple_order(
            u1 in 0i32..100, c1 in 1i32..=512,
            u2 in 0i32..100, c2 in 1i32..=512,
        ) {
            let a = BaseChannel::new(u1, c1);
            let b = BaseChannel::new(u2, c2);
            prop_assert_eq!(a.cmp(&b), (u1, c1).cmp(&(u2, c2)));
            prop_assert_eq!(a.compare_to(&b), -b.compare_to(&a));
        }

        #[test]
        fn prop_width_never_runs_past_last_channel(
            channel in 1i64..=512,
            width in 1i64..=i64::MAX,
        ) {
            let text = format!("7:{}/{}", channel, width);
            let channels = BaseChannel::from_str_list(&text, 0).unwrap();
            prop_assert_eq!(channels.len() as i64, width.min(513 - channel));
            prop_assert!(channels.iter().all(|c| c.universe_id() == 7));
        }
    }
}
