//! Diagnostics for [`ZapEngine`].

use core::fmt;

use super::capability::read_high_water;
use super::channel::{ChannelId, ChannelState, Direction};
use super::engine::ZapEngine;
use super::error::ChannelResult;
use super::fields::HighWaterMark;
use crate::hal::bus::RegisterBus;
use crate::hal::transfer::BlockTransfer;

/// Point-in-time view of one channel
///
/// `Display` renders a one-line dump suitable for a log or a debug console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZapStatus {
    /// Channel described
    pub channel: ChannelId,
    /// Flags and counters
    pub state: ChannelState,
    /// Free RX buffers
    pub rx_free: usize,
    /// Filled RX buffers waiting for the consumer
    pub rx_ready: usize,
    /// Free TX buffers
    pub tx_free: usize,
    /// Queued TX buffers
    pub tx_ready: usize,
    /// This channel owns the shared RX block-transfer channel
    pub rx_active: bool,
    /// This channel owns the shared TX block-transfer channel
    pub tx_active: bool,
    /// Last [`refresh_high_water`](ZapEngine::refresh_high_water) reading,
    /// zero until the first refresh
    pub high_water: HighWaterMark,
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

impl fmt::Display for ZapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.state;
        write!(
            f,
            "{}: rx {} oob {} max {} hdr {} busy {} done {} free {} ready {} err {} ovf {} bp {}",
            self.channel,
            on_off(s.rx_enabled),
            on_off(s.rx_out_of_band_enabled),
            s.rx_payload_max,
            s.rx_header_size,
            u8::from(s.rx_in_flight),
            s.rx_completed_count,
            self.rx_free,
            self.rx_ready,
            s.rx_errors,
            s.rx_overflows,
            s.rx_backpressure,
        )?;
        write!(
            f,
            " | tx {} oob {} hdr {} busy {} done {} free {} ready {} starved {}",
            on_off(s.tx_enabled),
            on_off(s.tx_out_of_band_enabled),
            s.tx_header_size,
            u8::from(s.tx_in_flight),
            s.tx_completed_count,
            self.tx_free,
            self.tx_ready,
            s.tx_starved,
        )?;
        if s.dropped != 0 || s.leaked != 0 || s.timeouts != 0 {
            write!(f, " | dropped {} leaked {} timeouts {}", s.dropped, s.leaked, s.timeouts)?;
        }
        Ok(())
    }
}

impl<B: RegisterBus, T: BlockTransfer> ZapEngine<B, T> {
    /// Snapshot of `channel`
    pub fn status(&self, channel: ChannelId) -> ChannelResult<ZapStatus> {
        let entry = &self.channels[self.index(channel)?];
        Ok(ZapStatus {
            channel,
            state: entry.state,
            rx_free: entry.pool(Direction::Rx).free_count(),
            rx_ready: entry.pool(Direction::Rx).ready_count(),
            tx_free: entry.pool(Direction::Tx).free_count(),
            tx_ready: entry.pool(Direction::Tx).ready_count(),
            rx_active: self.rx_active == Some(channel),
            tx_active: self.tx_active == Some(channel),
            high_water: entry.high_water,
        })
    }

    /// Re-read the FIFO high-water mark through `channel`'s register block
    ///
    /// The reading is kept with the channel and shows up in its
    /// [`status`](Self::status); the capability record keeps the value seen
    /// at init. A diagnostic snapshot, not used for flow control.
    pub fn refresh_high_water(&mut self, channel: ChannelId) -> ChannelResult<HighWaterMark> {
        let index = self.index(channel)?;
        let mark = read_high_water(&mut self.regs, channel);
        self.channels[index].high_water = mark;
        Ok(mark)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;
    use crate::internal::register::zap;
    use crate::testing::{MockDelay, engine};

    #[test]
    fn fresh_channel_dump() {
        let engine = engine(1);
        let status = engine.status(ChannelId::ZERO).unwrap();
        assert_eq!(
            format!("{status}"),
            "ch0: rx off oob off max 0 hdr 0 busy 0 done 0 free 2 ready 0 err 0 ovf 0 bp 0 \
             | tx off oob off hdr 0 busy 0 done 0 free 2 ready 0 starved 0"
        );
    }

    #[test]
    fn dump_follows_transfers() {
        let mut engine = engine(2);
        let ch = engine.channel(1).unwrap();
        engine.start_rx(ch, &mut MockDelay::new()).unwrap();
        engine.bus_mut().poke(zap::CHANNEL_STRIDE + zap::SIZE_OFFSET, 1);
        engine.program_rx_transfer(ch).unwrap();

        let status = engine.status(ch).unwrap();
        assert!(status.rx_active);
        assert!(!status.tx_active);
        assert_eq!(status.rx_free, 1);

        let line = format!("{status}");
        assert!(line.starts_with("ch1: rx on oob off max 4096 hdr 0 busy 1 done 0 free 1"));
        assert!(!line.contains("leaked"));
    }

    #[test]
    fn dump_shows_losses_when_present() {
        let mut engine = engine(1);
        let ch = ChannelId::ZERO;
        engine.start_rx(ch, &mut MockDelay::new()).unwrap();
        engine.bus_mut().poke(zap::SIZE_OFFSET, 1);
        engine.program_rx_transfer(ch).unwrap();
        let _ = engine.stop_rx(ch);
        engine.abandon_in_flight(ch, Direction::Rx).unwrap();

        let line = format!("{}", engine.status(ch).unwrap());

        assert!(line.ends_with(" | dropped 0 leaked 1 timeouts 0"));
    }

    #[test]
    fn refresh_high_water_reads_channel_block() {
        let mut engine = engine(2);
        let ch = engine.channel(1).unwrap();
        engine.bus_mut().poke(zap::CHANNEL_STRIDE + zap::HIGH_WATER_MARK_OFFSET, 3 << 16 | 10);

        let caps = *engine.capabilities();

        let mark = engine.refresh_high_water(ch).unwrap();

        assert_eq!(mark, HighWaterMark { rx: 40, tx: 12 });
        assert_eq!(engine.status(ch).unwrap().high_water, mark);
        assert_eq!(*engine.capabilities(), caps);
    }

    #[test]
    fn high_water_readings_stay_per_channel() {
        let mut engine = engine(2);
        let ch0 = ChannelId::ZERO;
        let ch1 = engine.channel(1).unwrap();
        engine.bus_mut().poke(zap::HIGH_WATER_MARK_OFFSET, 1 << 16 | 2);
        engine.bus_mut().poke(zap::CHANNEL_STRIDE + zap::HIGH_WATER_MARK_OFFSET, 3 << 16 | 10);

        engine.refresh_high_water(ch1).unwrap();
        assert_eq!(engine.status(ch0).unwrap().high_water, HighWaterMark::default());

        engine.refresh_high_water(ch0).unwrap();
        assert_eq!(engine.status(ch0).unwrap().high_water, HighWaterMark { rx: 8, tx: 4 });
        assert_eq!(engine.status(ch1).unwrap().high_water, HighWaterMark { rx: 40, tx: 12 });
    }

    #[test]
    fn status_rejects_unknown_channel() {
        let engine = engine(1);
        let far = ChannelId::new(3, crate::internal::constants::MAX_CHANNELS).unwrap();
        assert!(engine.status(far).is_err());
    }
}
