//! ZAP register offsets and bit fields.
//!
//! Offsets are relative to the start of a channel's register block. Size
//! fields count 32-bit words, not bytes.

#![allow(dead_code)]

// =============================================================================
// Register Offsets
// =============================================================================

/// Control/status register (enables, out-of-band flags, channel count)
pub const CSR_OFFSET: usize = 0x000;
/// Interrupt control register
pub const ICR_OFFSET: usize = 0x004;
/// RX_SIZE on read, TX_SIZE on write
pub const SIZE_OFFSET: usize = 0x008;
/// Maximum RX transfer size
pub const MAX_RX_SIZE_OFFSET: usize = 0x00C;
/// RX FIFO depth (global)
pub const RX_FIFO_SIZE_OFFSET: usize = 0x100;
/// TX FIFO depth (global)
pub const TX_FIFO_SIZE_OFFSET: usize = 0x104;
/// FIFO high-water marks (global)
pub const HIGH_WATER_MARK_OFFSET: usize = 0x108;
/// Packed firmware version (global)
pub const FIRMWARE_VERSION_OFFSET: usize = 0x10C;

/// Distance between consecutive channel register blocks
pub const CHANNEL_STRIDE: usize = 0x200;

// =============================================================================
// CSR
// =============================================================================

/// CSR bit field constants
pub mod csr {
    /// Receive enable
    pub const RXEN: u32 = 1 << 0;
    /// Transmit enable
    pub const TXEN: u32 = 1 << 1;
    /// Receive out-of-band header enable
    pub const RX_OOB: u32 = 1 << 2;
    /// Transmit out-of-band header enable
    pub const TX_OOB: u32 = 1 << 3;
    /// Channel count field shift (firmware newer than 2.3c)
    pub const CHANNEL_COUNT_SHIFT: u32 = 16;
    /// Channel count field mask
    pub const CHANNEL_COUNT_MASK: u32 = 0xFFFF << 16;
}

// =============================================================================
// ICR
// =============================================================================

/// ICR bit field constants
///
/// The low six bits report (and, when written, clear) a cause. The same bits
/// shifted by [`icr::MASK_SHIFT`] are the per-cause enables; writing one arms
/// that cause.
pub mod icr {
    /// Global interrupt enable
    pub const GLBL: u32 = 1 << 0;
    /// Transmit error
    pub const TX_ERR: u32 = 1 << 1;
    /// Transmit block ready for data
    pub const TX_RDY: u32 = 1 << 2;
    /// Transmit size register ready
    pub const TX_SIZE_RDY: u32 = 1 << 3;
    /// Receive error
    pub const RX_ERR: u32 = 1 << 4;
    /// Receive block ready for drain
    pub const RX_RDY: u32 = 1 << 5;

    /// All cause bits
    pub const CAUSE_MASK: u32 = 0x3F;
    /// Shift from a cause bit to its enable bit
    pub const MASK_SHIFT: u32 = 16;

    /// Arm the global interrupt
    pub const SET_GLBL: u32 = GLBL << MASK_SHIFT;
    /// Arm transmit error
    pub const SET_TX_ERR: u32 = TX_ERR << MASK_SHIFT;
    /// Arm transmit ready
    pub const SET_TX_RDY: u32 = TX_RDY << MASK_SHIFT;
    /// Arm transmit size ready
    pub const SET_TX_SIZE_RDY: u32 = TX_SIZE_RDY << MASK_SHIFT;
    /// Arm receive error
    pub const SET_RX_ERR: u32 = RX_ERR << MASK_SHIFT;
    /// Arm receive ready
    pub const SET_RX_RDY: u32 = RX_RDY << MASK_SHIFT;

    /// Acknowledge (disarm) the global interrupt
    pub const CLR_GLBL: u32 = GLBL;
    /// Acknowledge transmit error
    pub const CLR_TX_ERR: u32 = TX_ERR;
    /// Acknowledge transmit ready
    pub const CLR_TX_RDY: u32 = TX_RDY;
    /// Acknowledge transmit size ready
    pub const CLR_TX_SIZE_RDY: u32 = TX_SIZE_RDY;
    /// Acknowledge receive error
    pub const CLR_RX_ERR: u32 = RX_ERR;
    /// Acknowledge receive ready
    pub const CLR_RX_RDY: u32 = RX_RDY;

    /// Channel index carried by TX causes
    pub const TX_CHANNEL_SHIFT: u32 = 8;
    /// Channel index carried by RX causes
    pub const RX_CHANNEL_SHIFT: u32 = 24;
    /// Width mask of a channel index byte
    pub const CHANNEL_MASK: u32 = 0xFF;
}

// =============================================================================
// Size Registers
// =============================================================================

/// RX_SIZE / TX_SIZE / MAX_RX_SIZE field constants
pub mod size {
    /// Payload word count (low half)
    pub const PAYLOAD_MASK: u32 = 0x0000_FFFF;
    /// Out-of-band word count shift
    pub const OOB_SHIFT: u32 = 16;
    /// Out-of-band word count mask for TX_SIZE and MAX_RX_SIZE
    pub const OOB_MASK: u32 = 0xFFFF << 16;
    /// Out-of-band word count mask for RX_SIZE (14 bits)
    pub const RX_OOB_MASK: u32 = 0x3FFF << 16;
    /// RX_SIZE: payload exceeded MAX_RX_SIZE
    pub const RX_DATA_OVERFLOW: u32 = 1 << 30;
    /// RX_SIZE: out-of-band header exceeded MAX_RX_SIZE
    pub const RX_OOB_OVERFLOW: u32 = 1 << 31;
}

// =============================================================================
// Global Registers
// =============================================================================

/// FIFO size and high-water field constants
pub mod fifo {
    /// Data words (FIFO size) or RX words (high-water)
    pub const LOW_MASK: u32 = 0x0000_FFFF;
    /// Out-of-band words (FIFO size) or TX words (high-water)
    pub const HIGH_SHIFT: u32 = 16;
}

/// Firmware version field constants
pub mod version {
    /// Board identifier byte
    pub const BOARD_SHIFT: u32 = 24;
    /// Major version byte
    pub const MAJOR_SHIFT: u32 = 16;
    /// Minor version byte
    pub const MINOR_SHIFT: u32 = 8;
    /// Release letter byte (ASCII)
    pub const RELEASE_SHIFT: u32 = 0;
}
