//! Core driver components for the ZAP transport.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`regs`] / [`fields`] - Typed register access and field packing
//! - [`capability`] - Firmware version and capability negotiation
//! - [`channel`] - Channel identifiers and per-channel state
//! - [`interrupt`] - ICR cause decoding
//! - [`engine`] - The [`ZapEngine`] itself, with interrupt dispatch,
//!   consumer API, watchdog and diagnostics in sibling files
//!
//! # Example
//!
//! ```ignore
//! use zap_dma::driver::{ChannelConfig, ZapConfig};
//!
//! let config = ZapConfig::new()
//!     .with_buffers(16, 8)
//!     .with_channel(ChannelConfig::new().with_rx_header(16));
//! ```

// Submodules
pub mod capability;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fields;
pub mod interrupt;
pub mod regs;
pub mod status;
pub mod watchdog;

mod consumer;

// Re-exports for convenience
pub use capability::{Capabilities, FirmwareVersion, LAST_SINGLE_CHANNEL_VERSION, compare_version};
pub use channel::{ChannelId, ChannelState, Direction};
pub use config::{BurstLen, ChannelConfig, ElementSize, State, TransferConfig, ZapConfig};
pub use dispatch::{DispatchReport, TxSizeOutcome};
pub use engine::{RxOutcome, TxOutcome, ZapEngine};
pub use error::{
    ChannelError, ChannelResult, ConfigError, ConfigResult, Error, PoolError, PoolResult, Result,
};
pub use fields::{FifoSize, HighWaterMark, MaxRxSize, RxSize, TxSize};
pub use interrupt::InterruptCause;
pub use regs::{Register, ZapRegs};
pub use status::ZapStatus;
pub use watchdog::WatchdogReport;
