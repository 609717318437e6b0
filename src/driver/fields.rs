//! Packing and unpacking of the ZAP size and status registers
//!
//! All size fields count 32-bit words. `MAX_RX_SIZE` stores `count - 1`;
//! `RX_SIZE` and `TX_SIZE` store the count itself.

use crate::internal::constants::WORD_SIZE;
use crate::internal::register::zap::{fifo, size};

// =============================================================================
// MAX_RX_SIZE
// =============================================================================

/// Encoder for the `MAX_RX_SIZE` register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxRxSize;

impl MaxRxSize {
    /// Pack word counts in `[1, 65536]` into the register value
    ///
    /// An OOB count of zero encodes as `0xFFFF`. The hardware ignores the OOB
    /// field while `RX_OOB` is clear.
    #[must_use]
    pub const fn pack(payload_words: u32, oob_words: u32) -> u32 {
        let payload = payload_words.wrapping_sub(1) & size::PAYLOAD_MASK;
        let oob = (oob_words.wrapping_sub(1) << size::OOB_SHIFT) & size::OOB_MASK;
        oob | payload
    }

    /// Recover `(payload_words, oob_words)` from a register value
    #[must_use]
    pub const fn unpack(raw: u32) -> (u32, u32) {
        let payload = (raw & size::PAYLOAD_MASK) + 1;
        let oob = ((raw & size::OOB_MASK) >> size::OOB_SHIFT) + 1;
        (payload, oob)
    }
}

// =============================================================================
// RX_SIZE
// =============================================================================

/// Decoded `RX_SIZE` register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxSize {
    /// Payload words waiting in the FIFO
    pub payload_words: u32,
    /// Out-of-band words waiting in the FIFO
    pub oob_words: u32,
    /// Payload was truncated to `MAX_RX_SIZE`
    pub data_overflow: bool,
    /// Out-of-band header was truncated to `MAX_RX_SIZE`
    pub oob_overflow: bool,
}

impl RxSize {
    /// Decode a raw register value
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            payload_words: raw & size::PAYLOAD_MASK,
            oob_words: (raw & size::RX_OOB_MASK) >> size::OOB_SHIFT,
            data_overflow: raw & size::RX_DATA_OVERFLOW != 0,
            oob_overflow: raw & size::RX_OOB_OVERFLOW != 0,
        }
    }

    /// Payload length in bytes
    #[must_use]
    pub const fn payload_bytes(&self) -> u32 {
        self.payload_words * WORD_SIZE
    }

    /// Out-of-band length in bytes
    #[must_use]
    pub const fn oob_bytes(&self) -> u32 {
        self.oob_words * WORD_SIZE
    }

    /// Bytes the block transfer must drain from the data window
    #[must_use]
    pub const fn total_bytes(&self) -> u32 {
        self.payload_bytes() + self.oob_bytes()
    }
}

// =============================================================================
// TX_SIZE
// =============================================================================

/// Encoder for the `TX_SIZE` register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSize;

impl TxSize {
    /// Largest word count either field can carry
    pub const MAX_WORDS: u32 = size::PAYLOAD_MASK;

    /// Whether both counts fit their 16-bit fields without truncation
    #[must_use]
    pub const fn fits(payload_words: u32, oob_words: u32) -> bool {
        payload_words <= Self::MAX_WORDS && oob_words <= Self::MAX_WORDS
    }

    /// Pack word counts (not biased) into the register value
    ///
    /// Counts above [`Self::MAX_WORDS`] are truncated; check [`Self::fits`]
    /// first.
    #[must_use]
    pub const fn pack(payload_words: u32, oob_words: u32) -> u32 {
        ((oob_words << size::OOB_SHIFT) & size::OOB_MASK) | (payload_words & size::PAYLOAD_MASK)
    }
}

// =============================================================================
// Global Registers
// =============================================================================

/// Decoded `HIGH_WATER_MARK` register, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HighWaterMark {
    /// Peak RX FIFO occupancy
    pub rx: u32,
    /// Peak TX FIFO occupancy
    pub tx: u32,
}

impl HighWaterMark {
    /// Decode a raw register value
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            rx: (raw & fifo::LOW_MASK) * WORD_SIZE,
            tx: (raw >> fifo::HIGH_SHIFT) * WORD_SIZE,
        }
    }
}

/// Decoded `RX_FIFO_SIZE` / `TX_FIFO_SIZE` register, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoSize {
    /// Data FIFO depth
    pub data: u32,
    /// Out-of-band FIFO depth
    pub oob: u32,
}

impl FifoSize {
    /// Decode a raw register value
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            data: (raw & fifo::LOW_MASK) * WORD_SIZE,
            oob: (raw >> fifo::HIGH_SHIFT) * WORD_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_rx_size_round_trips_domain_edges() {
        for (payload, oob) in [(1, 1), (65536, 65536), (1020, 4), (1, 65536), (256, 2)] {
            assert_eq!(MaxRxSize::unpack(MaxRxSize::pack(payload, oob)), (payload, oob));
        }
    }

    #[test]
    fn max_rx_size_uses_count_minus_one() {
        assert_eq!(MaxRxSize::pack(1020, 4), (3 << 16) | 1019);
        assert_eq!(MaxRxSize::pack(65536, 1), 0x0000_FFFF);
    }

    #[test]
    fn max_rx_size_without_oob_saturates_field() {
        assert_eq!(MaxRxSize::pack(1024, 0), 0xFFFF_0000 | 1023);
    }

    #[test]
    fn rx_size_decodes_words_to_bytes() {
        let rx = RxSize::from_raw((4 << 16) | 100);
        assert_eq!(rx.payload_bytes(), 400);
        assert_eq!(rx.oob_bytes(), 16);
        assert_eq!(rx.total_bytes(), 416);
        assert!(!rx.data_overflow);
        assert!(!rx.oob_overflow);
    }

    #[test]
    fn rx_size_overflow_bits() {
        let rx = RxSize::from_raw(size::RX_DATA_OVERFLOW | 8);
        assert!(rx.data_overflow);
        assert!(!rx.oob_overflow);
        assert_eq!(rx.oob_words, 0);

        let rx = RxSize::from_raw(size::RX_OOB_OVERFLOW | (0x3FFF << 16));
        assert!(rx.oob_overflow);
        assert_eq!(rx.oob_words, 0x3FFF);
    }

    #[test]
    fn tx_size_packs_unbiased_counts() {
        assert_eq!(TxSize::pack(100, 4), 0x0004_0064);
        assert_eq!(TxSize::pack(0x1_0000, 0), 0);
    }

    #[test]
    fn tx_size_fits_sixteen_bit_fields_only() {
        assert!(TxSize::fits(0, 0));
        assert!(TxSize::fits(0xFFFF, 0xFFFF));
        assert!(!TxSize::fits(0x1_0000, 0));
        assert!(!TxSize::fits(0, 0x1_0000));
        assert_eq!(TxSize::pack(0xFFFF, 0xFFFF), 0xFFFF_FFFF);
        assert_eq!(TxSize::pack(0xFFFF, 0), 0x0000_FFFF);
    }

    #[test]
    fn rx_size_decodes_field_maxima_with_both_overflows() {
        let raw = size::RX_DATA_OVERFLOW | size::RX_OOB_OVERFLOW | (0x3FFF << 16) | 0xFFFF;
        let rx = RxSize::from_raw(raw);
        assert_eq!(rx.payload_words, 0xFFFF);
        assert_eq!(rx.oob_words, 0x3FFF);
        assert!(rx.data_overflow);
        assert!(rx.oob_overflow);
        assert_eq!(rx.total_bytes(), (0xFFFF + 0x3FFF) * WORD_SIZE);
    }

    #[test]
    fn max_rx_size_round_trips_field_boundaries() {
        for payload in [1, 2, 0xFFFF, 0x1_0000] {
            for oob in [1, 2, 0x3FFF, 0x4000, 0xFFFF, 0x1_0000] {
                assert_eq!(MaxRxSize::unpack(MaxRxSize::pack(payload, oob)), (payload, oob));
            }
        }
    }

    /// Counts written through `TX_SIZE` decode identically through the
    /// `RX_SIZE` layout whenever they fit the narrower RX OOB field.
    #[test]
    fn size_fields_agree_across_random_counts() {
        let mut seed: u32 = 0x9E37_79B9;
        for _ in 0..5000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let payload = seed & 0xFFFF;
            let oob = (seed >> 16) & 0x3FFF;

            let rx = RxSize::from_raw(TxSize::pack(payload, oob));
            assert_eq!((rx.payload_words, rx.oob_words), (payload, oob));
            assert!(!rx.data_overflow && !rx.oob_overflow);

            let biased = (payload.max(1), oob.max(1));
            assert_eq!(MaxRxSize::unpack(MaxRxSize::pack(biased.0, biased.1)), biased);
        }
    }

    #[test]
    fn global_registers_scale_to_bytes() {
        assert_eq!(HighWaterMark::from_raw(0x0010_0020), HighWaterMark { rx: 128, tx: 64 });
        assert_eq!(FifoSize::from_raw(0x0040_0800), FifoSize { data: 8192, oob: 256 });
    }
}
