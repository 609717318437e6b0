//! Interrupt cause decoding for the ZAP ICR.
//!
//! This module provides [`InterruptCause`] for parsing the interrupt
//! control register read from channel 0.

use crate::internal::register::zap::icr;

// =============================================================================
// Interrupt Cause
// =============================================================================

/// Causes parsed from a raw ICR value.
///
/// A cause counts as active only when its pending bit and its enable bit are
/// both set. The channel bytes say which ZAP channel the RX and TX causes
/// belong to; they are raw hardware values and may be out of range.
///
/// # Example
///
/// ```ignore
/// let cause = InterruptCause::from_raw(icr);
/// if cause.rx_ready {
///     // drain channel cause.rx_channel
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptCause {
    /// Global interrupt
    pub global: bool,
    /// Transmit error
    pub tx_error: bool,
    /// Transmit block ready for data
    pub tx_ready: bool,
    /// Transmit size register ready
    pub tx_size_ready: bool,
    /// Receive error
    pub rx_error: bool,
    /// Receive block ready to drain
    pub rx_ready: bool,
    /// Channel index for TX causes
    pub tx_channel: u8,
    /// Channel index for RX causes
    pub rx_channel: u8,
}

impl InterruptCause {
    /// Create from a raw ICR value
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        let active = raw & (raw >> icr::MASK_SHIFT) & icr::CAUSE_MASK;
        Self {
            global: (active & icr::GLBL) != 0,
            tx_error: (active & icr::TX_ERR) != 0,
            tx_ready: (active & icr::TX_RDY) != 0,
            tx_size_ready: (active & icr::TX_SIZE_RDY) != 0,
            rx_error: (active & icr::RX_ERR) != 0,
            rx_ready: (active & icr::RX_RDY) != 0,
            tx_channel: ((raw >> icr::TX_CHANNEL_SHIFT) & icr::CHANNEL_MASK) as u8,
            rx_channel: ((raw >> icr::RX_CHANNEL_SHIFT) & icr::CHANNEL_MASK) as u8,
        }
    }

    /// Check if any channel cause is active
    #[inline]
    pub fn any(&self) -> bool {
        self.tx_error || self.tx_ready || self.tx_size_ready || self.rx_error || self.rx_ready
    }

    /// Check if an error cause is active
    #[inline]
    pub fn has_error(&self) -> bool {
        self.rx_error || self.tx_error
    }
}
