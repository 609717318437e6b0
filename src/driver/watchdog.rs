//! In-flight watchdog for [`ZapEngine`].
//!
//! The owner calls [`tick_watchdog`](ZapEngine::tick_watchdog) from a
//! periodic timer. Each call ages every running in-flight transfer by one
//! tick; a transfer older than the limit stops its direction. The buffer
//! stays tombstoned until the completion shows up or the owner abandons it.

use super::channel::{ChannelId, Direction};
use super::engine::ZapEngine;
use super::error::{ChannelError, ChannelResult};
use crate::hal::bus::RegisterBus;
use crate::hal::transfer::BlockTransfer;
use crate::internal::logging;

/// Channels that timed out during one watchdog tick, as bitsets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogReport {
    /// Bit `n` set: RX of channel `n` timed out
    pub rx_timed_out: u8,
    /// Bit `n` set: TX of channel `n` timed out
    pub tx_timed_out: u8,
}

impl WatchdogReport {
    /// Whether nothing timed out
    pub const fn is_clear(&self) -> bool {
        self.rx_timed_out == 0 && self.tx_timed_out == 0
    }

    /// Whether `direction` of `channel` timed out
    pub const fn timed_out(&self, channel: ChannelId, direction: Direction) -> bool {
        let bits = match direction {
            Direction::Rx => self.rx_timed_out,
            Direction::Tx => self.tx_timed_out,
        };
        bits & channel.bit() != 0
    }

    /// [`ChannelError::Timeout`] if anything timed out
    pub const fn into_result(self) -> ChannelResult<()> {
        if self.is_clear() { Ok(()) } else { Err(ChannelError::Timeout) }
    }
}

impl<B: RegisterBus, T: BlockTransfer> ZapEngine<B, T> {
    /// Age in-flight transfers and stop directions older than `limit` ticks
    pub fn tick_watchdog(&mut self, limit: u32) -> WatchdogReport {
        let mut report = WatchdogReport::default();
        let count = self.channels.len();

        for index in 0..count {
            let Ok(channel) = ChannelId::new(index, count) else {
                break;
            };
            let entry = &mut self.channels[index];
            if entry.state.rx_enabled && entry.state.rx_in_flight {
                entry.rx_age = entry.rx_age.saturating_add(1);
                if entry.rx_age > limit {
                    entry.state.timeouts += 1;
                    report.rx_timed_out |= channel.bit();
                }
            }
            if entry.state.tx_enabled && entry.state.tx_in_flight {
                entry.tx_age = entry.tx_age.saturating_add(1);
                if entry.tx_age > limit {
                    entry.state.timeouts += 1;
                    report.tx_timed_out |= channel.bit();
                }
            }
        }

        for index in 0..count {
            let Ok(channel) = ChannelId::new(index, count) else {
                break;
            };
            if report.timed_out(channel, Direction::Rx) {
                logging::log_warn!("zap: ch{} rx transfer timed out", index);
                // Still in flight by construction: the stop leaves a tombstone.
                let _ = self.stop_rx(channel);
            }
            if report.timed_out(channel, Direction::Tx) {
                logging::log_warn!("zap: ch{} tx transfer timed out", index);
                let _ = self.stop_tx(channel);
            }
        }

        report
    }
}
