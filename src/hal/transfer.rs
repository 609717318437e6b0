//! Block-transfer abstraction
//!
//! The ZAP data window is fed by the platform's system DMA controller: one
//! hardware channel copies from the window into memory (RX), another copies
//! from memory into the window (TX). Both are shared by every ZAP channel, so
//! the engine programs at most one RX and one TX transfer at a time.
//!
//! Completion is asynchronous. The platform's completion interrupt must call
//! [`ZapEngine::complete_rx`](crate::driver::engine::ZapEngine::complete_rx) or
//! [`ZapEngine::complete_tx`](crate::driver::engine::ZapEngine::complete_tx).

use crate::driver::channel::Direction;
use crate::driver::config::TransferConfig;
use crate::driver::error::ConfigResult;

/// Platform block-transfer mechanism driving the data window
///
/// Buffers handed to [`start_rx`](Self::start_rx) and
/// [`start_tx`](Self::start_tx) are heap storage parked in the engine's
/// in-flight slot. The engine neither reads, writes, moves nor frees that
/// storage until the matching completion has been reported, so the
/// implementation may keep the raw pointer for the duration of the transfer.
pub trait BlockTransfer {
    /// Claim and configure the RX and TX hardware channels
    ///
    /// Called once from `init`. Return
    /// [`ConfigError::DmaChannelUnavailable`](crate::ConfigError::DmaChannelUnavailable)
    /// if the channels cannot be obtained.
    fn configure(&mut self, config: &TransferConfig) -> ConfigResult<()>;

    /// Start copying `len` bytes from the data window to `dest`
    fn start_rx(&mut self, dest: *mut u8, len: usize);

    /// Start copying `len` bytes from `src` into the data window
    fn start_tx(&mut self, src: *const u8, len: usize);

    /// Write back dirty cache lines covering `[addr, addr + len)` before TX
    fn flush(&mut self, addr: *const u8, len: usize) {
        let _ = (addr, len);
    }

    /// Discard cache lines covering `[addr, addr + len)` after RX
    fn invalidate(&mut self, addr: *const u8, len: usize) {
        let _ = (addr, len);
    }

    /// Stop the running transfer of `direction`
    ///
    /// Return `true` only if the hardware channel is halted and its
    /// completion will never be reported. The default cannot abort, so the
    /// engine keeps the shared channel reserved until the completion arrives.
    fn abort(&mut self, direction: Direction) -> bool {
        let _ = direction;
        false
    }
}

impl<T: BlockTransfer + ?Sized> BlockTransfer for &mut T {
    fn configure(&mut self, config: &TransferConfig) -> ConfigResult<()> {
        (**self).configure(config)
    }

    fn start_rx(&mut self, dest: *mut u8, len: usize) {
        (**self).start_rx(dest, len);
    }

    fn start_tx(&mut self, src: *const u8, len: usize) {
        (**self).start_tx(src, len);
    }

    fn flush(&mut self, addr: *const u8, len: usize) {
        (**self).flush(addr, len);
    }

    fn invalidate(&mut self, addr: *const u8, len: usize) {
        (**self).invalidate(addr, len);
    }

    fn abort(&mut self, direction: Direction) -> bool {
        (**self).abort(direction)
    }
}
