//! Error types for the ZAP transport
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Initialization and configuration failures
//! - [`PoolError`]: Buffer pool invariant violations
//! - [`ChannelError`]: Per-channel runtime failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most engine methods. Conditions that occur in steady state on the
//! interrupt path (overflow, buffer exhaustion, bogus channel indices) are
//! reported through flags, outcome enums and counters instead.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Engine already initialized
    AlreadyInitialized,
    /// Engine used before `init`
    NotInitialized,
    /// Register window base is null or misaligned
    RegisterMapFailed,
    /// Platform could not provide the block-transfer channels
    DmaChannelUnavailable,
    /// Invalid configuration parameter
    InvalidConfig,
    /// Buffer size cannot hold the configured transfer
    InvalidBufferSize,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::NotInitialized => "not initialized",
            ConfigError::RegisterMapFailed => "register window mapping failed",
            ConfigError::DmaChannelUnavailable => "block-transfer channel unavailable",
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::InvalidBufferSize => "invalid buffer size",
        }
    }
}

// =============================================================================
// Pool Errors
// =============================================================================

/// Buffer pool errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// `payload_len + oob_len` exceeds the buffer capacity
    CapacityExceeded,
}

impl core::fmt::Display for PoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PoolError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PoolError::CapacityExceeded => "buffer capacity exceeded",
        }
    }
}

// =============================================================================
// Channel Errors
// =============================================================================

/// Per-channel runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// Channel index outside the negotiated channel count
    InvalidChannel,
    /// Direction is not enabled on this channel
    NotEnabled,
    /// A buffer is still owned by the block-transfer engine
    StillInFlight,
    /// An in-flight transfer did not complete in time
    Timeout,
    /// Length is not a whole number of words, overflows a size field, or
    /// carries a header the direction does not send
    InvalidLength,
    /// Operation requires the channel to be stopped
    Busy,
    /// Buffer does not belong to this channel and direction
    InvalidBuffer,
}

impl core::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ChannelError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChannelError::InvalidChannel => "invalid channel",
            ChannelError::NotEnabled => "channel not enabled",
            ChannelError::StillInFlight => "buffer still in flight",
            ChannelError::Timeout => "transfer timed out",
            ChannelError::InvalidLength => "invalid transfer length",
            ChannelError::Busy => "channel busy",
            ChannelError::InvalidBuffer => "buffer belongs to another pool",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match engine.stop_rx(ch) {
///     Err(Error::Channel(ChannelError::StillInFlight)) => { /* wait for completion */ }
///     Err(Error::Config(ConfigError::NotInitialized)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Buffer pool error
    Pool(PoolError),
    /// Channel error
    Channel(ChannelError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Pool(e) => write!(f, "pool: {}", e.as_str()),
            Error::Channel(e) => write!(f, "channel: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<PoolError> for Error {
    fn from(e: PoolError) -> Self {
        Error::Pool(e)
    }
}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Error::Channel(e)
    }
}

/// Result type alias for engine operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for buffer pool operations
pub type PoolResult<T> = core::result::Result<T, PoolError>;

/// Result type alias for channel operations
pub type ChannelResult<T> = core::result::Result<T, ChannelError>;

// =============================================================================
// Unit Tests
// =============================================================================
