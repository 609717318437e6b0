//! Hardware Abstraction Layer
//!
//! The two seams between the engine and the platform:
//!
//! - [`bus`]: 32-bit access to the ZAP register window
//! - [`transfer`]: the system DMA controller that moves data through the
//!   FPGA data window
//!
//! # Delay Integration
//!
//! The enable-line pulse uses `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod bus;
pub mod transfer;

pub use bus::{MmioBus, RegisterBus};
pub use transfer::BlockTransfer;
