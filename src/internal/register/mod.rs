//! Memory-mapped register primitives for the ZAP coprocessor
//!
//! The ZAP register window is a flat array of 32-bit words. Each channel owns a
//! block of [`zap::CHANNEL_STRIDE`] bytes; the global FIFO, high-water and
//! firmware-version registers live in channel 0's block.
//! All register access is volatile to ensure proper hardware interaction.

pub mod zap;

/// Physical base of the ZAP register window on the reference SoC
pub const ZAP_REGISTER_BASE: usize = 0x0540_0000;

/// Size in bytes of the ZAP register window
pub const ZAP_REGISTER_WINDOW: usize = 0x1000;

/// Physical base of the FPGA data window the block-transfer engine reads and writes
pub const ZAP_DATA_WINDOW_BASE: u32 = 0x0800_0000;

/// Size in bytes of the FPGA data window
pub const ZAP_DATA_WINDOW_SIZE: u32 = 0x0100_0000;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

/// Byte address of `offset` inside the block belonging to `channel`
#[inline(always)]
pub const fn channel_offset(channel: usize, offset: usize) -> usize {
    channel * zap::CHANNEL_STRIDE + offset
}
