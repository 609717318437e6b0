//! ISR-safe engine wrapper using critical sections.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::driver::channel::ChannelId;
use crate::driver::dispatch::DispatchReport;
use crate::driver::engine::ZapEngine;
use crate::driver::error::ChannelResult;
use crate::hal::bus::RegisterBus;
use crate::hal::transfer::BlockTransfer;
use crate::pool::Buffer;

/// ISR-safe [`ZapEngine`] wrapper.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the closure. This is what makes the consumer's
/// re-arm in [`release_rx`](ZapEngine::release_rx) atomic with respect to the
/// interrupt handler.
///
/// # Example
///
/// ```ignore
/// static ZAP: SharedZap<MmioBus, SdmaTransfer> =
///     SharedZap::new(unsafe { MmioBus::new(ZAP_REGISTER_BASE) }, SdmaTransfer::new());
///
/// #[interrupt]
/// fn FPGA_IRQ() {
///     ZAP.on_interrupt();
/// }
///
/// #[interrupt]
/// fn SDMA_RX_DONE() {
///     ZAP.on_rx_complete();
/// }
///
/// fn consumer(ch: ChannelId) {
///     if let Ok(Some(buf)) = ZAP.read_rx(ch) {
///         process(buf.payload());
///         ZAP.release_rx(ch, buf).ok();
///     }
/// }
/// ```
pub struct SharedZap<B: RegisterBus, T: BlockTransfer> {
    inner: Mutex<RefCell<ZapEngine<B, T>>>,
}

impl<B: RegisterBus, T: BlockTransfer> SharedZap<B, T> {
    /// Create a new shared engine (const, suitable for static initialization).
    pub const fn new(bus: B, transfer: T) -> Self {
        Self::from_engine(ZapEngine::new(bus, transfer))
    }

    /// Wrap an existing engine.
    pub const fn from_engine(engine: ZapEngine<B, T>) -> Self {
        Self { inner: Mutex::new(RefCell::new(engine)) }
    }

    /// Execute a closure with exclusive access to the engine.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside another `with` closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ZapEngine<B, T>) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut ZapEngine<B, T>) -> R,
    {
        critical_section::with(|cs| {
            self.inner.borrow(cs).try_borrow_mut().ok().map(|mut engine| f(&mut engine))
        })
    }

    /// Run the interrupt dispatcher.
    ///
    /// Returns `None` when the engine is borrowed by the interrupted context,
    /// which cannot happen while that context holds the critical section.
    pub fn on_interrupt(&self) -> Option<DispatchReport> {
        self.try_with(ZapEngine::handle_interrupt)
    }

    /// Report an RX block-transfer completion.
    pub fn on_rx_complete(&self) -> Option<ChannelId> {
        self.try_with(ZapEngine::complete_rx).flatten()
    }

    /// Report a TX block-transfer completion.
    pub fn on_tx_complete(&self) -> Option<ChannelId> {
        self.try_with(ZapEngine::complete_tx).flatten()
    }

    /// Take the oldest received buffer of `channel`.
    pub fn read_rx(&self, channel: ChannelId) -> ChannelResult<Option<Buffer>> {
        self.with(|engine| engine.read_rx(channel))
    }

    /// Return a received buffer and re-arm RX-ready.
    pub fn release_rx(&self, channel: ChannelId, buffer: Buffer) -> ChannelResult<()> {
        self.with(|engine| engine.release_rx(channel, buffer))
    }
}
