//! Synchronization support
//!
//! [`SharedZap`] puts a [`ZapEngine`](crate::driver::ZapEngine) behind a
//! `critical_section::Mutex` so the ZAP interrupt handler, the DMA
//! completion handlers and consumer code can share one engine.
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use zap_dma::sync::SharedZap;
//!
//! static ZAP: SharedZap<MmioBus, SdmaTransfer> = SharedZap::new(bus, dma);
//!
//! fn main() {
//!     ZAP.with(|zap| zap.init(ZapConfig::new())).unwrap();
//! }
//!
//! #[interrupt]
//! fn FPGA_IRQ() {
//!     ZAP.on_interrupt();
//! }
//! ```

pub mod shared;

pub use shared::SharedZap;
