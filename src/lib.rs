//! ZAP Streaming DMA Transport
//!
//! A `no_std` Rust implementation of the host side of the ZAP streaming
//! transport: the register and interrupt protocol that moves data between a
//! host CPU and an FPGA-resident coprocessor through a fixed data window.
//!
//! The coprocessor exposes up to eight independently flow-controlled
//! channels. Each channel has an RX and a TX direction backed by a pool of
//! fixed-size buffers; the platform's system DMA controller moves the data
//! through the window, one RX and one TX block at a time.
//!
//! # Architecture
//!
//! 1. **Engine** ([`driver::engine`]): channel start/stop, transfer
//!    programming and completion, interrupt dispatch, consumer API
//! 2. **Buffer pools** ([`pool`]): per-channel free lists and in-order ready
//!    queues of owned [`Buffer`]s
//! 3. **HAL** ([`hal`]): the [`RegisterBus`] and [`BlockTransfer`] traits
//!    the platform implements
//!
//! ## Buffer Ownership
//!
//! A [`Buffer`] is owned by exactly one of: a free list, the in-flight slot
//! of the block-transfer engine, a ready queue, or the application. It moves
//! by value between them, so the borrow checker rules out double ownership.
//! Stopping a channel while its buffer is in flight leaves that buffer parked
//! as a tombstone until the completion arrives.
//!
//! # Features
//!
//! - `defmt`: Derive `defmt::Format` on public types and log through `defmt`
//! - `log`: Log through the `log` facade
//! - `critical-section`: Enable the ISR-safe [`sync::SharedZap`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use zap_dma::{ChannelConfig, MmioBus, ZapConfig, ZapEngine};
//!
//! let bus = unsafe { MmioBus::map(zap_dma::constants::ZAP_REGISTER_BASE)? };
//! let mut zap = ZapEngine::new(bus, platform_dma);
//!
//! let caps = zap.init(
//!     ZapConfig::new().with_channel(ChannelConfig::new().with_rx_header(16)),
//! )?;
//!
//! for index in 0..caps.channel_count {
//!     let ch = zap.channel(index)?;
//!     zap.start_rx(ch, &mut delay)?;
//!     zap.start_tx(ch, &mut delay)?;
//! }
//!
//! // Consumer
//! if let Some(buf) = zap.read_rx(ch)? {
//!     handle(buf.oob(), buf.payload());
//!     zap.release_rx(ch, buf)?;
//! }
//!
//! // Producer
//! if let Some(mut buf) = zap.acquire_tx(ch)? {
//!     buf.as_mut_slice()[..4].copy_from_slice(&[1, 2, 3, 4]);
//!     zap.submit_tx(ch, buf, 4, 0)?;
//! }
//! ```
//!
//! # Memory Requirements
//!
//! With the default configuration (8 RX and 8 TX buffers of 4096 bytes per
//! channel) each channel holds 64 KiB of heap, allocated once in `init`.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; the same table is mirrored in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

extern crate alloc;

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod pool;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::capability::{
    Capabilities, FirmwareVersion, LAST_SINGLE_CHANNEL_VERSION, compare_version,
};
pub use driver::channel::{ChannelId, ChannelState, Direction};
pub use driver::config::{BurstLen, ChannelConfig, ElementSize, State, TransferConfig, ZapConfig};
pub use driver::dispatch::{DispatchReport, TxSizeOutcome};
pub use driver::engine::{RxOutcome, TxOutcome, ZapEngine};
pub use driver::error::{
    ChannelError, ChannelResult, ConfigError, ConfigResult, Error, PoolError, PoolResult, Result,
};
pub use driver::interrupt::InterruptCause;
pub use driver::status::ZapStatus;
pub use driver::watchdog::WatchdogReport;
pub use hal::{BlockTransfer, MmioBus, RegisterBus};
pub use pool::{Buffer, BufferFlags, BufferPool};

#[cfg(feature = "critical-section")]
pub use sync::SharedZap;

/// Low-level register layout for advanced use.
///
/// Most users should prefer the engine API. Writing these registers directly
/// bypasses the engine's bookkeeping of enables and armed interrupts.
pub mod unsafe_registers {
    pub use crate::driver::regs::{Register, ZapRegs};
    pub use crate::internal::register::zap::{
        CHANNEL_STRIDE, CSR_OFFSET, FIRMWARE_VERSION_OFFSET, HIGH_WATER_MARK_OFFSET, ICR_OFFSET,
        MAX_RX_SIZE_OFFSET, RX_FIFO_SIZE_OFFSET, SIZE_OFFSET, TX_FIFO_SIZE_OFFSET, csr, icr, size,
    };
}

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types.
pub mod constants {
    pub use crate::internal::constants::{
        // Buffers
        DEFAULT_BUFFER_SIZE,
        DEFAULT_RX_BUFFERS,
        DEFAULT_RX_PAYLOAD_MAX,
        DEFAULT_TX_BUFFERS,
        // Timing
        DEFAULT_WATCHDOG_TICKS,
        ENABLE_PULSE_NS,
        // Channels
        MAX_CHANNELS,
    };
    pub use crate::internal::register::{
        ZAP_DATA_WINDOW_BASE, ZAP_DATA_WINDOW_SIZE, ZAP_REGISTER_BASE, ZAP_REGISTER_WINDOW,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe ZAP engine.
///
/// # Examples
///
/// ```ignore
/// zap_dma::zap_static!(ZAP, MmioBus, SdmaTransfer, unsafe { MmioBus::new(BASE) }, SdmaTransfer::new());
///
/// ZAP.with(|zap| zap.init(ZapConfig::new())).unwrap();
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! zap_static {
    ($name:ident, $bus:ty, $transfer:ty, $bus_init:expr, $transfer_init:expr) => {
        static $name: $crate::sync::SharedZap<$bus, $transfer> =
            $crate::sync::SharedZap::new($bus_init, $transfer_init);
    };
}
