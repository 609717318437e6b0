//! Typed view of the ZAP register window

use super::channel::ChannelId;
use crate::hal::bus::RegisterBus;
use crate::internal::register::{channel_offset, zap};

/// ZAP registers, by role
///
/// `Size` is `RX_SIZE` when read and `TX_SIZE` when written. The FIFO,
/// high-water and version registers are global and only meaningful on
/// [`ChannelId::ZERO`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Control/status
    Csr,
    /// Interrupt control
    Icr,
    /// RX_SIZE (read) / TX_SIZE (write)
    Size,
    /// Maximum RX transfer size
    MaxRxSize,
    /// RX FIFO depth
    RxFifoSize,
    /// TX FIFO depth
    TxFifoSize,
    /// FIFO high-water marks
    HighWaterMark,
    /// Firmware version
    FirmwareVersion,
}

impl Register {
    /// Byte offset within a channel block
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Register::Csr => zap::CSR_OFFSET,
            Register::Icr => zap::ICR_OFFSET,
            Register::Size => zap::SIZE_OFFSET,
            Register::MaxRxSize => zap::MAX_RX_SIZE_OFFSET,
            Register::RxFifoSize => zap::RX_FIFO_SIZE_OFFSET,
            Register::TxFifoSize => zap::TX_FIFO_SIZE_OFFSET,
            Register::HighWaterMark => zap::HIGH_WATER_MARK_OFFSET,
            Register::FirmwareVersion => zap::FIRMWARE_VERSION_OFFSET,
        }
    }

    /// Byte offset of this register in `channel`'s block
    #[must_use]
    pub const fn address(self, channel: ChannelId) -> usize {
        channel_offset(channel.index(), self.offset())
    }
}

/// Channel-addressed access on top of a [`RegisterBus`]
#[derive(Debug)]
pub struct ZapRegs<B: RegisterBus> {
    bus: B,
}

impl<B: RegisterBus> ZapRegs<B> {
    /// Wrap a register bus
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Read `register` of `channel`
    #[inline]
    pub fn read(&mut self, channel: ChannelId, register: Register) -> u32 {
        self.bus.read_word(register.address(channel))
    }

    /// Write `value` to `register` of `channel`
    #[inline]
    pub fn write(&mut self, channel: ChannelId, register: Register, value: u32) {
        self.bus.write_word(register.address(channel), value);
    }

    /// Read-modify-write: replace the bits selected by `mask` with `value`
    pub fn write_masked(&mut self, channel: ChannelId, register: Register, value: u32, mask: u32) {
        let current = self.read(channel, register);
        self.write(channel, register, (current & !mask) | (value & mask));
    }

    /// Underlying bus
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Underlying bus, mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
