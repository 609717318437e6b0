//! Firmware version decoding and capability negotiation
//!
//! Firmware up to and including 2.3c predates the CSR channel-count field and
//! left it undefined, so such firmware is always driven as a single channel.

use core::cmp::Ordering;

use super::channel::ChannelId;
use super::fields::{FifoSize, HighWaterMark};
use super::regs::{Register, ZapRegs};
use crate::hal::bus::RegisterBus;
use crate::internal::constants::{MAX_CHANNELS, SINGLE_CHANNEL};
use crate::internal::logging;
use crate::internal::register::zap::{csr, version};

// =============================================================================
// Firmware Version
// =============================================================================

/// Decoded `FIRMWARE_VERSION` register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareVersion {
    /// Board identifier
    pub board: u8,
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Release letter (ASCII)
    pub release: u8,
}

/// Newest firmware that only supports one channel
pub const LAST_SINGLE_CHANNEL_VERSION: FirmwareVersion = FirmwareVersion::new(2, 3, b'c');

impl FirmwareVersion {
    /// Version with board id 0
    #[must_use]
    pub const fn new(major: u8, minor: u8, release: u8) -> Self {
        Self { board: 0, major, minor, release }
    }

    /// Decode a raw register value
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            board: (raw >> version::BOARD_SHIFT) as u8,
            major: (raw >> version::MAJOR_SHIFT) as u8,
            minor: (raw >> version::MINOR_SHIFT) as u8,
            release: (raw >> version::RELEASE_SHIFT) as u8,
        }
    }

    /// Encode back into the register layout
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        (self.board as u32) << version::BOARD_SHIFT
            | (self.major as u32) << version::MAJOR_SHIFT
            | (self.minor as u32) << version::MINOR_SHIFT
            | (self.release as u32) << version::RELEASE_SHIFT
    }

    /// Whether this firmware lacks the channel-count field
    #[must_use]
    pub fn is_single_channel(&self) -> bool {
        compare_version(self, &LAST_SINGLE_CHANNEL_VERSION) != Ordering::Greater
    }
}

impl core::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}{}", self.major, self.minor, self.release as char)
    }
}

/// Order firmware versions by (major, minor, release)
///
/// The release letter compares case-insensitively and the board id is
/// ignored.
pub fn compare_version(a: &FirmwareVersion, b: &FirmwareVersion) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.release.to_ascii_lowercase().cmp(&b.release.to_ascii_lowercase()))
}

// =============================================================================
// Capabilities
// =============================================================================

/// What the attached firmware supports, derived once at init
///
/// Depths and high-water marks are in bytes. Nothing here changes after
/// init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Firmware version
    pub firmware: FirmwareVersion,
    /// Channels the engine manages
    pub channel_count: usize,
    /// RX data FIFO depth
    pub rx_fifo_depth: u32,
    /// RX out-of-band FIFO depth
    pub rx_oob_fifo_depth: u32,
    /// TX data FIFO depth
    pub tx_fifo_depth: u32,
    /// TX out-of-band FIFO depth
    pub tx_oob_fifo_depth: u32,
    /// RX FIFO high-water mark read through channel 0 at init
    pub rx_high_water: u32,
    /// TX FIFO high-water mark read through channel 0 at init
    pub tx_high_water: u32,
}

/// Read the version, channel count, FIFO depths and high-water marks
pub fn negotiate<B: RegisterBus>(regs: &mut ZapRegs<B>) -> Capabilities {
    let firmware = FirmwareVersion::from_raw(regs.read(ChannelId::ZERO, Register::FirmwareVersion));

    let channel_count = if firmware.is_single_channel() {
        logging::log_info!(
            "zap: firmware {}.{} predates channel count, using 1 channel",
            firmware.major,
            firmware.minor
        );
        SINGLE_CHANNEL
    } else {
        let reported = ((regs.read(ChannelId::ZERO, Register::Csr) & csr::CHANNEL_COUNT_MASK)
            >> csr::CHANNEL_COUNT_SHIFT) as usize;
        if reported == 0 {
            logging::log_warn!("zap: firmware reports zero channels, using 1");
            SINGLE_CHANNEL
        } else if reported > MAX_CHANNELS {
            logging::log_warn!("zap: firmware reports {} channels, clamping", reported);
            MAX_CHANNELS
        } else {
            reported
        }
    };

    let rx_fifo = FifoSize::from_raw(regs.read(ChannelId::ZERO, Register::RxFifoSize));
    let tx_fifo = FifoSize::from_raw(regs.read(ChannelId::ZERO, Register::TxFifoSize));
    let high_water = HighWaterMark::from_raw(regs.read(ChannelId::ZERO, Register::HighWaterMark));

    let caps = Capabilities {
        firmware,
        channel_count,
        rx_fifo_depth: rx_fifo.data,
        rx_oob_fifo_depth: rx_fifo.oob,
        tx_fifo_depth: tx_fifo.data,
        tx_oob_fifo_depth: tx_fifo.oob,
        rx_high_water: high_water.rx,
        tx_high_water: high_water.tx,
    };

    logging::log_info!(
        "zap: firmware {}.{} board {} channels {} rx fifo {} tx fifo {}",
        caps.firmware.major,
        caps.firmware.minor,
        caps.firmware.board,
        caps.channel_count,
        caps.rx_fifo_depth,
        caps.tx_fifo_depth
    );

    caps
}

/// Re-read the high-water mark of `channel`
pub fn read_high_water<B: RegisterBus>(regs: &mut ZapRegs<B>, channel: ChannelId) -> HighWaterMark {
    HighWaterMark::from_raw(regs.read(channel, Register::HighWaterMark))
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;
    use crate::testing::MockBus;

    fn bus_with(version: FirmwareVersion, csr: u32) -> ZapRegs<MockBus> {
        let mut bus = MockBus::new();
        bus.poke(Register::FirmwareVersion.offset(), version.to_raw());
        bus.poke(Register::Csr.offset(), csr);
        ZapRegs::new(bus)
    }

    #[test]
    fn version_raw_round_trip() {
        let v = FirmwareVersion { board: 7, major: 2, minor: 4, release: b'a' };
        assert_eq!(v.to_raw(), 0x0702_0461);
        assert_eq!(FirmwareVersion::from_raw(v.to_raw()), v);
    }

    #[test]
    fn compare_is_case_insensitive_on_release() {
        let lower = FirmwareVersion::new(2, 3, b'c');
        let upper = FirmwareVersion::new(2, 3, b'C');
        assert_eq!(compare_version(&lower, &upper), Ordering::Equal);
    }

    #[test]
    fn compare_is_lexicographic() {
        let ordered = [
            FirmwareVersion::new(1, 9, b'z'),
            FirmwareVersion::new(2, 3, b'b'),
            FirmwareVersion::new(2, 3, b'C'),
            FirmwareVersion::new(2, 3, b'd'),
            FirmwareVersion::new(2, 4, b'a'),
            FirmwareVersion::new(3, 0, b'a'),
        ];
        for (i, a) in ordered.iter().enumerate() {
            for (j, b) in ordered.iter().enumerate() {
                assert_eq!(compare_version(a, b), i.cmp(&j), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn compare_ignores_board() {
        let a = FirmwareVersion { board: 1, ..FirmwareVersion::new(2, 4, b'a') };
        let b = FirmwareVersion { board: 9, ..FirmwareVersion::new(2, 4, b'a') };
        assert_eq!(compare_version(&a, &b), Ordering::Equal);
    }

    #[test]
    fn old_firmware_forces_single_channel() {
        let mut regs = bus_with(FirmwareVersion::new(2, 3, b'b'), 4 << 16);
        assert_eq!(negotiate(&mut regs).channel_count, 1);
    }

    #[test]
    fn boundary_version_is_single_channel() {
        let mut regs = bus_with(FirmwareVersion::new(2, 3, b'C'), 4 << 16);
        assert_eq!(negotiate(&mut regs).channel_count, 1);
    }

    #[test]
    fn new_firmware_reads_channel_count() {
        let mut regs = bus_with(FirmwareVersion::new(2, 4, b'a'), 4 << 16);
        assert_eq!(negotiate(&mut regs).channel_count, 4);
    }

    #[test]
    fn channel_count_clamped_and_floored() {
        let mut regs = bus_with(FirmwareVersion::new(3, 0, b'a'), 40 << 16);
        assert_eq!(negotiate(&mut regs).channel_count, MAX_CHANNELS);
        let mut regs = bus_with(FirmwareVersion::new(3, 0, b'a'), 0);
        assert_eq!(negotiate(&mut regs).channel_count, 1);
    }

    #[test]
    fn fifo_and_high_water_in_bytes() {
        let mut regs = bus_with(FirmwareVersion::new(2, 4, b'a'), 1 << 16);
        regs.bus_mut().poke(Register::RxFifoSize.offset(), 0x0010_0400);
        regs.bus_mut().poke(Register::TxFifoSize.offset(), 0x0008_0200);
        regs.bus_mut().poke(Register::HighWaterMark.offset(), 0x0003_0005);
        let caps = negotiate(&mut regs);
        assert_eq!(caps.rx_fifo_depth, 4096);
        assert_eq!(caps.rx_oob_fifo_depth, 64);
        assert_eq!(caps.tx_fifo_depth, 2048);
        assert_eq!(caps.tx_oob_fifo_depth, 32);
        assert_eq!(caps.rx_high_water, 20);
        assert_eq!(caps.tx_high_water, 12);
    }

    #[test]
    fn display_shows_release_letter() {
        assert_eq!(format!("{}", FirmwareVersion::new(2, 3, b'c')), "2.3c");
    }
}
