//! Engine, channel and block-transfer configuration
//!
//! All configuration types are plain `Copy` structs with public fields, a
//! `const fn new()` carrying the defaults, and `with_*` builder methods.

use super::error::{ConfigError, ConfigResult};
use super::fields::TxSize;
use crate::internal::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_RX_BUFFERS, DEFAULT_RX_PAYLOAD_MAX, DEFAULT_TX_BUFFERS,
    MAX_BUFFER_IDS, MAX_CHANNELS, MAX_FIELD_WORDS, WORD_SIZE,
};
use crate::internal::register::ZAP_DATA_WINDOW_BASE;

// =============================================================================
// Block-Transfer Configuration
// =============================================================================

/// Burst length used by the block-transfer channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BurstLen {
    /// Single-beat transfers
    Single = 1,
    /// 4 beat burst
    Burst4 = 4,
    /// 8 beat burst (default)
    #[default]
    Burst8 = 8,
    /// 16 beat burst
    Burst16 = 16,
}

impl BurstLen {
    /// Number of elements per burst
    #[must_use]
    pub const fn beats(self) -> u32 {
        self as u32
    }
}

/// Width of each element moved by the block-transfer channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ElementSize {
    /// 8-bit elements
    Byte,
    /// 16-bit elements
    HalfWord,
    /// 32-bit elements (default, matches the data window width)
    #[default]
    Word,
}

impl ElementSize {
    /// Element width in bytes
    #[must_use]
    pub const fn bytes(self) -> u32 {
        match self {
            ElementSize::Byte => 1,
            ElementSize::HalfWord => 2,
            ElementSize::Word => 4,
        }
    }
}

/// Configuration handed to [`BlockTransfer::configure`](crate::hal::BlockTransfer::configure)
///
/// The data window is the constant-address endpoint of both channels: the
/// RX source and the TX destination. Memory-side addresses post-increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferConfig {
    /// Burst length
    pub burst: BurstLen,
    /// Element width
    pub element: ElementSize,
    /// Request high arbitration priority from the DMA controller
    pub high_priority: bool,
    /// Physical address of the FPGA data window
    pub data_window: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferConfig {
    /// Create the default transfer configuration (32-bit, burst 8, high priority)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            burst: BurstLen::Burst8,
            element: ElementSize::Word,
            high_priority: true,
            data_window: ZAP_DATA_WINDOW_BASE,
        }
    }

    /// Set the burst length
    #[must_use]
    pub const fn with_burst(mut self, burst: BurstLen) -> Self {
        self.burst = burst;
        self
    }

    /// Set the element width
    #[must_use]
    pub const fn with_element(mut self, element: ElementSize) -> Self {
        self.element = element;
        self
    }

    /// Set arbitration priority
    #[must_use]
    pub const fn with_high_priority(mut self, high_priority: bool) -> Self {
        self.high_priority = high_priority;
        self
    }

    /// Set the data window address
    #[must_use]
    pub const fn with_data_window(mut self, data_window: u32) -> Self {
        self.data_window = data_window;
        self
    }
}

// =============================================================================
// Channel Configuration
// =============================================================================

/// Per-channel transfer sizes and out-of-band settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Largest RX transfer in bytes, out-of-band header included
    pub rx_payload_max: u32,
    /// RX out-of-band header size in bytes
    pub rx_header_size: u32,
    /// TX out-of-band header size in bytes
    pub tx_header_size: u32,
    /// Receive out-of-band headers
    pub rx_oob_enabled: bool,
    /// Transmit out-of-band headers
    pub tx_oob_enabled: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelConfig {
    /// Create the default channel configuration (no out-of-band data)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx_payload_max: DEFAULT_RX_PAYLOAD_MAX,
            rx_header_size: 0,
            tx_header_size: 0,
            rx_oob_enabled: false,
            tx_oob_enabled: false,
        }
    }

    /// Set the largest RX transfer in bytes
    #[must_use]
    pub const fn with_rx_payload_max(mut self, bytes: u32) -> Self {
        self.rx_payload_max = bytes;
        self
    }

    /// Enable RX out-of-band headers of `bytes` (zero disables)
    #[must_use]
    pub const fn with_rx_header(mut self, bytes: u32) -> Self {
        self.rx_header_size = bytes;
        self.rx_oob_enabled = bytes > 0;
        self
    }

    /// Enable TX out-of-band headers of `bytes` (zero disables)
    #[must_use]
    pub const fn with_tx_header(mut self, bytes: u32) -> Self {
        self.tx_header_size = bytes;
        self.tx_oob_enabled = bytes > 0;
        self
    }

    /// RX out-of-band words programmed into `MAX_RX_SIZE`
    #[must_use]
    pub const fn rx_oob_words(&self) -> u32 {
        if self.rx_oob_enabled { self.rx_header_size / WORD_SIZE } else { 0 }
    }

    /// RX payload words programmed into `MAX_RX_SIZE`
    ///
    /// The header shares the `rx_payload_max` budget.
    #[must_use]
    pub const fn rx_payload_words(&self) -> u32 {
        (self.rx_payload_max / WORD_SIZE).saturating_sub(self.rx_oob_words())
    }

    /// Check the configuration against the buffer size it will run with
    pub fn validate(&self, buffer_size: usize) -> ConfigResult<()> {
        let sizes = [self.rx_payload_max, self.rx_header_size, self.tx_header_size];
        if sizes.iter().any(|size| size % WORD_SIZE != 0) {
            return Err(ConfigError::InvalidConfig);
        }
        if self.rx_oob_enabled && self.rx_header_size >= self.rx_payload_max {
            return Err(ConfigError::InvalidConfig);
        }
        let payload_words = self.rx_payload_words();
        let oob_words = self.rx_oob_words();
        if payload_words == 0 || payload_words > MAX_FIELD_WORDS || oob_words > MAX_FIELD_WORDS {
            return Err(ConfigError::InvalidConfig);
        }
        if self.rx_payload_max as usize > buffer_size
            || self.tx_header_size as usize >= buffer_size
        {
            return Err(ConfigError::InvalidBufferSize);
        }
        Ok(())
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Top-level engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZapConfig {
    /// Receive buffers per channel
    pub rx_buffers: usize,
    /// Transmit buffers per channel
    pub tx_buffers: usize,
    /// Capacity of every buffer in bytes
    pub buffer_size: usize,
    /// Settings applied to every channel at init
    pub channel: ChannelConfig,
    /// Block-transfer settings
    pub transfer: TransferConfig,
}

impl Default for ZapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ZapConfig {
    /// Create the default configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx_buffers: DEFAULT_RX_BUFFERS,
            tx_buffers: DEFAULT_TX_BUFFERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            channel: ChannelConfig::new(),
            transfer: TransferConfig::new(),
        }
    }

    /// Set the per-channel buffer counts
    #[must_use]
    pub const fn with_buffers(mut self, rx: usize, tx: usize) -> Self {
        self.rx_buffers = rx;
        self.tx_buffers = tx;
        self
    }

    /// Set the buffer capacity in bytes
    #[must_use]
    pub const fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }

    /// Set the default channel configuration
    #[must_use]
    pub const fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    /// Set the block-transfer configuration
    #[must_use]
    pub const fn with_transfer(mut self, transfer: TransferConfig) -> Self {
        self.transfer = transfer;
        self
    }

    /// Validate buffer geometry and the default channel configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rx_buffers == 0 || self.tx_buffers == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        let per_channel = self.rx_buffers.saturating_add(self.tx_buffers);
        if per_channel.saturating_mul(MAX_CHANNELS) > MAX_BUFFER_IDS {
            return Err(ConfigError::InvalidConfig);
        }
        // A full TX buffer must still be describable by TX_SIZE
        let max_size = (TxSize::MAX_WORDS * WORD_SIZE) as usize;
        if self.buffer_size == 0
            || self.buffer_size % WORD_SIZE as usize != 0
            || self.buffer_size > max_size
        {
            return Err(ConfigError::InvalidBufferSize);
        }
        self.channel.validate(self.buffer_size)
    }
}

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// `init` has not run
    #[default]
    Uninitialized,
    /// Capabilities negotiated and buffers allocated
    Initialized,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ZapConfig::new(), ZapConfig::default());
        assert!(ZapConfig::new().validate().is_ok());
        assert_eq!(TransferConfig::new().burst.beats(), 8);
        assert_eq!(TransferConfig::new().element.bytes(), 4);
        assert_eq!(TransferConfig::new().data_window, 0x0800_0000);
    }

    #[test]
    fn header_builder_enables_oob() {
        let cfg = ChannelConfig::new().with_rx_header(16).with_tx_header(8);
        assert!(cfg.rx_oob_enabled);
        assert!(cfg.tx_oob_enabled);
        let cfg = cfg.with_rx_header(0);
        assert!(!cfg.rx_oob_enabled);
    }

    #[test]
    fn header_shares_payload_budget() {
        let cfg = ChannelConfig::new().with_rx_payload_max(4096).with_rx_header(16);
        assert_eq!(cfg.rx_oob_words(), 4);
        assert_eq!(cfg.rx_payload_words(), 1020);
    }

    #[test]
    fn disabled_oob_ignores_header_size() {
        let mut cfg = ChannelConfig::new().with_rx_header(16);
        cfg.rx_oob_enabled = false;
        assert_eq!(cfg.rx_oob_words(), 0);
        assert_eq!(cfg.rx_payload_words(), 1024);
    }

    #[test]
    fn unaligned_sizes_rejected() {
        let cfg = ChannelConfig::new().with_rx_payload_max(1001);
        assert_eq!(cfg.validate(4096), Err(ConfigError::InvalidConfig));
        let cfg = ChannelConfig::new().with_rx_header(6);
        assert_eq!(cfg.validate(4096), Err(ConfigError::InvalidConfig));
    }

    #[test]
    fn header_must_be_smaller_than_payload_max() {
        let cfg = ChannelConfig::new().with_rx_payload_max(64).with_rx_header(64);
        assert_eq!(cfg.validate(4096), Err(ConfigError::InvalidConfig));
    }

    #[test]
    fn payload_must_fit_buffer() {
        let cfg = ChannelConfig::new().with_rx_payload_max(8192);
        assert_eq!(cfg.validate(4096), Err(ConfigError::InvalidBufferSize));
        assert!(cfg.validate(8192).is_ok());
    }

    #[test]
    fn payload_must_fit_sixteen_bit_field() {
        let cfg = ChannelConfig::new().with_rx_payload_max((MAX_FIELD_WORDS + 1) * 4);
        assert_eq!(cfg.validate(usize::MAX), Err(ConfigError::InvalidConfig));
        let cfg = ChannelConfig::new().with_rx_payload_max(MAX_FIELD_WORDS * 4);
        assert!(cfg.validate(usize::MAX).is_ok());
    }

    #[test]
    fn engine_config_rejects_empty_pools() {
        assert_eq!(
            ZapConfig::new().with_buffers(0, 4).validate(),
            Err(ConfigError::InvalidConfig)
        );
        assert_eq!(
            ZapConfig::new().with_buffer_size(4095).validate(),
            Err(ConfigError::InvalidBufferSize)
        );
    }

    #[test]
    fn engine_config_caps_buffer_size_at_tx_size_field() {
        let largest = ZapConfig::new()
            .with_buffer_size(0x3_FFFC)
            .with_channel(ChannelConfig::new().with_rx_payload_max(0x3_FFFC));
        assert_eq!(largest.validate(), Ok(()));
        assert_eq!(
            ZapConfig::new().with_buffer_size(0x4_0000).validate(),
            Err(ConfigError::InvalidBufferSize)
        );
        assert_eq!(
            ZapConfig::new().with_buffer_size(0x8_0000).validate(),
            Err(ConfigError::InvalidBufferSize)
        );
    }

    #[test]
    fn engine_config_keeps_buffer_ids_unique() {
        // 8 channels of 8192 buffers use the whole 16-bit id space
        let full = ZapConfig::new()
            .with_buffers(4096, 4096)
            .with_buffer_size(4)
            .with_channel(ChannelConfig::new().with_rx_payload_max(4));
        assert_eq!(full.validate(), Ok(()));
        assert_eq!(
            ZapConfig::new().with_buffers(4096, 4097).validate(),
            Err(ConfigError::InvalidConfig)
        );
    }

    #[test]
    fn transfer_builder() {
        let cfg = TransferConfig::new()
            .with_burst(BurstLen::Burst16)
            .with_element(ElementSize::HalfWord)
            .with_high_priority(false)
            .with_data_window(0x1000_0000);
        assert_eq!(cfg.burst, BurstLen::Burst16);
        assert_eq!(cfg.element, ElementSize::HalfWord);
        assert!(!cfg.high_priority);
        assert_eq!(cfg.data_window, 0x1000_0000);
    }

    #[test]
    fn state_defaults_to_uninitialized() {
        assert_eq!(State::default(), State::Uninitialized);
    }
}
