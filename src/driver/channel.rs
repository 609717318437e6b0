//! Channel identifiers and per-channel state

use super::error::{ChannelError, ChannelResult};
use crate::internal::constants::MAX_CHANNELS;

/// Validated ZAP channel index
///
/// Only constructible through [`ChannelId::new`] (or
/// [`ZapEngine::channel`](super::engine::ZapEngine::channel)), which checks
/// the index against the negotiated channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(u8);

impl ChannelId {
    /// Channel 0 always exists and hosts the global registers
    pub const ZERO: ChannelId = ChannelId(0);

    /// Validate `index` against `channel_count`
    pub fn new(index: usize, channel_count: usize) -> ChannelResult<Self> {
        if index < channel_count && index < MAX_CHANNELS {
            Ok(ChannelId(index as u8))
        } else {
            Err(ChannelError::InvalidChannel)
        }
    }

    /// Zero-based channel index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Single-bit mask for this channel, used by per-channel bitsets
    #[must_use]
    pub const fn bit(self) -> u8 {
        1 << self.0
    }
}

impl core::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// FPGA to host
    Rx,
    /// Host to FPGA
    Tx,
}

/// Observable state of one channel
///
/// Mutated only by the engine and the interrupt dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState {
    /// Receive direction enabled
    pub rx_enabled: bool,
    /// Transmit direction enabled
    pub tx_enabled: bool,
    /// An RX buffer is the target of an active block transfer
    pub rx_in_flight: bool,
    /// A TX buffer is the source of an active block transfer
    pub tx_in_flight: bool,
    /// RX transfers completed since `start_rx`
    pub rx_completed_count: u64,
    /// TX transfers completed since `start_tx`
    pub tx_completed_count: u64,
    /// RX out-of-band headers enabled
    pub rx_out_of_band_enabled: bool,
    /// TX out-of-band headers enabled
    pub tx_out_of_band_enabled: bool,
    /// Largest RX transfer in bytes
    pub rx_payload_max: u32,
    /// RX out-of-band header size in bytes
    pub rx_header_size: u32,
    /// TX out-of-band header size in bytes
    pub tx_header_size: u32,
    /// RX error causes observed
    pub rx_errors: u64,
    /// RX transfers that reported or needed an overflow flag
    pub rx_overflows: u64,
    /// RX-ready events acked with no free buffer
    pub rx_backpressure: u64,
    /// TX-ready events with an empty ready queue
    pub tx_starved: u64,
    /// Buffers recycled after a capacity violation
    pub dropped: u64,
    /// Tombstoned buffers abandoned by the owner
    pub leaked: u64,
    /// Watchdog timeouts
    pub timeouts: u64,
}

impl ChannelState {
    /// Whether a buffer of `direction` is in flight
    #[must_use]
    pub const fn in_flight(&self, direction: Direction) -> bool {
        match direction {
            Direction::Rx => self.rx_in_flight,
            Direction::Tx => self.tx_in_flight,
        }
    }

    /// Whether `direction` is enabled
    #[must_use]
    pub const fn enabled(&self, direction: Direction) -> bool {
        match direction {
            Direction::Rx => self.rx_enabled,
            Direction::Tx => self.tx_enabled,
        }
    }
}
