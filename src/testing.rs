//! Test doubles for host-side unit tests
//!
//! Only compiled for `cfg(test)`. Provides a register file that behaves like
//! the ZAP interrupt register, a block-transfer recorder that can play the
//! role of the DMA controller, and a delay that only counts.

extern crate std;

use std::collections::HashMap;
use std::vec::Vec;

use crate::driver::capability::FirmwareVersion;
use crate::driver::channel::Direction;
use crate::driver::config::{TransferConfig, ZapConfig};
use crate::driver::engine::ZapEngine;
use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::{BlockTransfer, RegisterBus};
use crate::internal::register::zap::{self, icr};

// =============================================================================
// Mock Register Bus
// =============================================================================

/// Register file with a write log
///
/// Plain registers store what was written. The ICR is modelled as one
/// register shared by every channel block: writing a low cause bit disarms
/// that cause, writing an enable bit arms it, and the pending bits and
/// channel bytes only change through [`MockBus::raise`].
///
/// # Example
///
/// ```ignore
/// let mut bus = MockBus::zap(FirmwareVersion::new(2, 4, b'a'), 2);
/// bus.arm(icr::SET_RX_RDY);
/// bus.raise(icr::RX_RDY, 1, 0);
/// ```
#[derive(Debug, Default)]
pub struct MockBus {
    registers: HashMap<usize, u32>,
    write_log: Vec<(usize, u32)>,
}

impl MockBus {
    /// Create an empty register file (every register reads 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Register file reporting `version` and, for newer firmware, `channels`
    pub fn zap(version: FirmwareVersion, channels: u32) -> Self {
        let mut bus = Self::new();
        bus.poke(zap::FIRMWARE_VERSION_OFFSET, version.to_raw());
        bus.poke(zap::CSR_OFFSET, channels << zap::csr::CHANNEL_COUNT_SHIFT);
        bus
    }

    /// Set a register without logging
    pub fn poke(&mut self, offset: usize, value: u32) {
        self.registers.insert(offset, value);
    }

    /// Current value of a register
    pub fn peek(&self, offset: usize) -> u32 {
        self.registers.get(&offset).copied().unwrap_or(0)
    }

    /// Current value of the shared ICR
    pub fn icr(&self) -> u32 {
        self.peek(zap::ICR_OFFSET)
    }

    /// Arm causes as if `set_bits` had been written
    pub fn arm(&mut self, set_bits: u32) {
        let value = self.icr() | (set_bits & (icr::CAUSE_MASK << icr::MASK_SHIFT));
        self.poke(zap::ICR_OFFSET, value);
    }

    /// Replace the pending causes and channel bytes, keeping the enables
    pub fn raise(&mut self, pending: u32, rx_channel: u8, tx_channel: u8) {
        let enables = self.icr() & (icr::CAUSE_MASK << icr::MASK_SHIFT);
        let value = enables
            | (pending & icr::CAUSE_MASK)
            | u32::from(rx_channel) << icr::RX_CHANNEL_SHIFT
            | u32::from(tx_channel) << icr::TX_CHANNEL_SHIFT;
        self.poke(zap::ICR_OFFSET, value);
    }

    /// Every write in order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.write_log.clone()
    }

    /// Values written to `offset`, in order
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.write_log.iter().filter(|(o, _)| *o == offset).map(|(_, v)| *v).collect()
    }

    /// Clear the write log
    pub fn clear_writes(&mut self) {
        self.write_log.clear();
    }
}

impl RegisterBus for MockBus {
    fn read_word(&mut self, offset: usize) -> u32 {
        if offset % zap::CHANNEL_STRIDE == zap::ICR_OFFSET {
            return self.icr();
        }
        self.peek(offset)
    }

    fn write_word(&mut self, offset: usize, value: u32) {
        self.write_log.push((offset, value));
        if offset % zap::CHANNEL_STRIDE == zap::ICR_OFFSET {
            let disarm = (value & icr::CAUSE_MASK) << icr::MASK_SHIFT;
            let current = self.icr() & !disarm;
            self.poke(zap::ICR_OFFSET, current);
            self.arm(value);
        } else {
            self.poke(offset, value);
        }
    }
}

// =============================================================================
// Mock Block Transfer
// =============================================================================

/// Records programmed transfers and plays the DMA controller on demand
#[derive(Debug, Default)]
pub struct MockTransfer {
    /// Configuration received from `init`
    pub configured: Option<TransferConfig>,
    /// Make `configure` fail
    pub fail_configure: bool,
    /// RX transfers started: (destination, length)
    pub rx_starts: Vec<(usize, usize)>,
    /// TX transfers started: (source, length)
    pub tx_starts: Vec<(usize, usize)>,
    /// Ranges flushed before TX
    pub flushes: Vec<(usize, usize)>,
    /// Ranges invalidated after RX
    pub invalidations: Vec<(usize, usize)>,
    /// Value returned by `abort`
    pub abortable: bool,
    /// Directions `abort` was called for
    pub aborts: Vec<Direction>,
}

impl MockTransfer {
    /// Create a recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `pattern(i)` into the most recent RX destination, like the
    /// DMA controller would
    pub fn fill_last_rx(&self, pattern: impl Fn(usize) -> u8) {
        let Some(&(addr, len)) = self.rx_starts.last() else {
            return;
        };
        let dest = addr as *mut u8;
        for i in 0..len {
            // SAFETY: the engine keeps the destination buffer parked in its
            // in-flight slot until complete_rx is called.
            unsafe { dest.add(i).write(pattern(i)) };
        }
    }

    /// Bytes at the most recent TX source
    pub fn last_tx_bytes(&self) -> Vec<u8> {
        let Some(&(addr, len)) = self.tx_starts.last() else {
            return Vec::new();
        };
        // SAFETY: the engine keeps the source buffer parked in its in-flight
        // slot until complete_tx is called.
        unsafe { core::slice::from_raw_parts(addr as *const u8, len) }.to_vec()
    }
}

impl BlockTransfer for MockTransfer {
    fn configure(&mut self, config: &TransferConfig) -> ConfigResult<()> {
        if self.fail_configure {
            return Err(ConfigError::DmaChannelUnavailable);
        }
        self.configured = Some(*config);
        Ok(())
    }

    fn start_rx(&mut self, dest: *mut u8, len: usize) {
        self.rx_starts.push((dest as usize, len));
    }

    fn start_tx(&mut self, src: *const u8, len: usize) {
        self.tx_starts.push((src as usize, len));
    }

    fn flush(&mut self, addr: *const u8, len: usize) {
        self.flushes.push((addr as usize, len));
    }

    fn invalidate(&mut self, addr: *const u8, len: usize) {
        self.invalidations.push((addr as usize, len));
    }

    fn abort(&mut self, direction: Direction) -> bool {
        self.aborts.push(direction);
        self.abortable
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Delay that only accumulates the requested time
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: u64,
    calls: usize,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Total nanoseconds requested
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }

    /// Number of delay calls
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }
}

// =============================================================================
// Engine Fixtures
// =============================================================================

/// Engine type used throughout the unit tests
pub type MockEngine = ZapEngine<MockBus, MockTransfer>;

/// Initialized engine on firmware `version` reporting `channels`
pub fn engine_with(version: FirmwareVersion, channels: u32, config: ZapConfig) -> MockEngine {
    let mut engine = ZapEngine::new(MockBus::zap(version, channels), MockTransfer::new());
    engine.init(config).unwrap();
    engine.bus_mut().clear_writes();
    engine
}

/// Initialized multi-channel engine with two RX and two TX buffers per channel
pub fn engine(channels: u32) -> MockEngine {
    engine_with(FirmwareVersion::new(2, 4, b'a'), channels, ZapConfig::new().with_buffers(2, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icr_clear_disarms_and_set_arms() {
        let mut bus = MockBus::new();
        bus.write_word(zap::ICR_OFFSET, icr::SET_RX_RDY | icr::SET_GLBL);
        assert_eq!(bus.icr(), icr::SET_RX_RDY | icr::SET_GLBL);
        bus.write_word(0x204, icr::CLR_RX_RDY);
        assert_eq!(bus.icr(), icr::SET_GLBL);
        assert_eq!(bus.writes_to(0x204), [icr::CLR_RX_RDY]);
    }

    #[test]
    fn raise_keeps_enables() {
        let mut bus = MockBus::new();
        bus.arm(icr::SET_TX_RDY);
        bus.raise(icr::TX_RDY, 2, 3);
        let raw = bus.read_word(zap::ICR_OFFSET);
        assert_eq!(raw & icr::SET_TX_RDY, icr::SET_TX_RDY);
        assert_eq!(raw & icr::CAUSE_MASK, icr::TX_RDY);
        assert_eq!((raw >> icr::RX_CHANNEL_SHIFT) & 0xFF, 2);
        assert_eq!((raw >> icr::TX_CHANNEL_SHIFT) & 0xFF, 3);
    }

    #[test]
    fn plain_registers_store_writes() {
        let mut bus = MockBus::new();
        bus.write_word(zap::MAX_RX_SIZE_OFFSET, 42);
        assert_eq!(bus.read_word(zap::MAX_RX_SIZE_OFFSET), 42);
        assert_eq!(bus.writes(), [(zap::MAX_RX_SIZE_OFFSET, 42)]);
        bus.clear_writes();
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn delay_accumulates() {
        use embedded_hal::delay::DelayNs;
        let mut delay = MockDelay::new();
        delay.delay_ns(1_000);
        delay.delay_us(2);
        assert_eq!(delay.total_ns(), 3_000);
        assert!(delay.calls() >= 2);
    }
}
