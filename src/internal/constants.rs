//! Internal constants for the ZAP transport
//!
//! Driver-wide sizes and timing values. Register layouts live in
//! [`super::register::zap`].

// =============================================================================
// Channels
// =============================================================================

/// Largest channel count the driver will manage
pub const MAX_CHANNELS: usize = 8;

/// Channel count assumed by firmware that predates the CSR channel field
pub const SINGLE_CHANNEL: usize = 1;

// =============================================================================
// Buffers
// =============================================================================

/// Default number of receive buffers per channel
pub const DEFAULT_RX_BUFFERS: usize = 8;

/// Default number of transmit buffers per channel
pub const DEFAULT_TX_BUFFERS: usize = 8;

/// Default buffer size in bytes (payload plus out-of-band header)
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default largest receive payload, in bytes
pub const DEFAULT_RX_PAYLOAD_MAX: u32 = 4096;

/// Hardware transfers move whole 32-bit words
pub const WORD_SIZE: u32 = 4;

/// Buffer ids are 16 bits wide and unique across every channel
pub const MAX_BUFFER_IDS: usize = 0x1_0000;

/// Largest word count a 16-bit size field can describe (count - 1 encoding)
pub const MAX_FIELD_WORDS: u32 = 0x1_0000;

// =============================================================================
// Timing
// =============================================================================

/// Time an enable bit is held low before being raised again
pub const ENABLE_PULSE_NS: u32 = 1_000;

/// Default number of watchdog ticks a transfer may stay in flight
pub const DEFAULT_WATCHDOG_TICKS: u32 = 100;
