//! ZAP transfer engine
//!
//! [`ZapEngine`] owns the register bus, the block-transfer mechanism, the
//! negotiated capabilities and one [`Channel`] record per ZAP channel. All
//! methods take `&mut self`; sharing the engine between interrupt and task
//! context is done by wrapping it (see `sync::SharedZap`).
//!
//! The platform has one RX and one TX block-transfer channel for all ZAP
//! channels together. `rx_active` / `tx_active` record which ZAP channel
//! currently owns each of them, and completions are routed there.
//!
//! Other `impl ZapEngine` blocks live next to this file: `dispatch.rs`
//! (interrupt handling), `consumer.rs` (buffer exchange with the
//! application), `watchdog.rs` and `status.rs`.

use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use super::capability::{Capabilities, negotiate};
use super::channel::{ChannelId, ChannelState, Direction};
use super::config::{ChannelConfig, State, ZapConfig};
use super::error::{ChannelError, ChannelResult, ConfigError, Result};
use super::fields::{HighWaterMark, MaxRxSize, RxSize};
use super::regs::{Register, ZapRegs};
use crate::hal::bus::RegisterBus;
use crate::hal::transfer::BlockTransfer;
use crate::internal::constants::{ENABLE_PULSE_NS, WORD_SIZE};
use crate::internal::logging;
use crate::internal::register::zap::{csr, icr};
use crate::pool::{Buffer, BufferFlags, BufferPool};

// =============================================================================
// Outcomes
// =============================================================================

/// Result of handling an RX-ready event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// A block transfer was started into a free buffer
    Started {
        /// Payload bytes expected
        payload_len: u32,
        /// Out-of-band bytes expected
        oob_len: u32,
        /// Overflow flags recorded for the buffer
        flags: BufferFlags,
    },
    /// No free buffer: acked, the consumer's next release re-arms
    NoBuffer,
    /// The RX block-transfer channel is in use: acked and re-armed when it frees up
    Busy,
    /// The channel's RX direction is stopped: acked
    Disabled,
}

/// Result of handling a TX-ready event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome {
    /// A block transfer was started from the oldest ready buffer
    Started {
        /// Payload bytes sent
        payload_len: u32,
        /// Out-of-band bytes sent
        oob_len: u32,
    },
    /// Ready queue empty: the event stays pending
    NoBuffer,
    /// The TX block-transfer channel is in use: acked and re-armed when it frees up
    Busy,
    /// The channel's TX direction is stopped: acked
    Disabled,
}

// =============================================================================
// Channel Record
// =============================================================================

/// Lengths recorded when an RX transfer is programmed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct RxMeta {
    pub(super) payload_len: u32,
    pub(super) oob_len: u32,
    pub(super) flags: BufferFlags,
}

impl RxMeta {
    /// Fit the lengths reported by `RX_SIZE` into a buffer of `capacity` bytes
    ///
    /// Whatever does not fit is cut off and flagged as overflow.
    pub(super) fn fit(size: RxSize, capacity: usize) -> Self {
        let mut flags = BufferFlags::EMPTY;
        if size.oob_overflow {
            flags.insert(BufferFlags::OVERFLOW_OOB);
        }
        if size.data_overflow {
            flags.insert(BufferFlags::OVERFLOW_DATA);
        }

        let capacity = u32::try_from(capacity).unwrap_or(u32::MAX) & !(WORD_SIZE - 1);
        let oob_len = size.oob_bytes().min(capacity);
        if oob_len < size.oob_bytes() {
            flags.insert(BufferFlags::OVERFLOW_OOB);
        }
        let payload_len = size.payload_bytes().min(capacity - oob_len);
        if payload_len < size.payload_bytes() {
            flags.insert(BufferFlags::OVERFLOW_DATA);
        }

        Self { payload_len, oob_len, flags }
    }

    pub(super) const fn len(&self) -> usize {
        (self.payload_len + self.oob_len) as usize
    }
}

/// Everything the engine keeps per ZAP channel
#[derive(Debug)]
pub(super) struct Channel {
    pub(super) state: ChannelState,
    pub(super) config: ChannelConfig,
    pub(super) rx: BufferPool,
    pub(super) tx: BufferPool,
    /// RX buffer owned by the block-transfer engine
    pub(super) rx_slot: Option<Buffer>,
    /// TX buffer owned by the block-transfer engine
    pub(super) tx_slot: Option<Buffer>,
    pub(super) rx_meta: RxMeta,
    /// Watchdog ticks since the RX transfer started
    pub(super) rx_age: u32,
    /// Watchdog ticks since the TX transfer started
    pub(super) tx_age: u32,
    /// RX-ready was acked while the shared RX channel was busy
    pub(super) rx_rearm: bool,
    /// TX-ready was acked while the shared TX channel was busy
    pub(super) tx_rearm: bool,
    /// Last high-water mark read through this channel's register block
    pub(super) high_water: HighWaterMark,
}

impl Channel {
    fn new(index: usize, config: &ZapConfig) -> Self {
        let per_channel = config.rx_buffers + config.tx_buffers;
        let rx_first = (index * per_channel) as u16;
        let tx_first = rx_first.wrapping_add(config.rx_buffers as u16);
        Self {
            state: ChannelState::default(),
            config: config.channel,
            rx: BufferPool::with_buffers(config.rx_buffers, config.buffer_size, rx_first),
            tx: BufferPool::with_buffers(config.tx_buffers, config.buffer_size, tx_first),
            rx_slot: None,
            tx_slot: None,
            rx_meta: RxMeta::default(),
            rx_age: 0,
            tx_age: 0,
            rx_rearm: false,
            tx_rearm: false,
            high_water: HighWaterMark::default(),
        }
    }

    pub(super) fn pool(&self, direction: Direction) -> &BufferPool {
        match direction {
            Direction::Rx => &self.rx,
            Direction::Tx => &self.tx,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Streaming transfer engine for one ZAP coprocessor
///
/// # Example
///
/// ```ignore
/// let bus = unsafe { MmioBus::map(ZAP_REGISTER_BASE)? };
/// let mut zap = ZapEngine::new(bus, platform_dma);
/// let caps = zap.init(ZapConfig::new())?;
///
/// let ch = zap.channel(0)?;
/// zap.start_rx(ch, &mut delay)?;
/// zap.start_tx(ch, &mut delay)?;
///
/// // interrupt handler
/// zap.handle_interrupt();
/// // DMA completion handlers
/// zap.complete_rx();
/// zap.complete_tx();
/// ```
#[derive(Debug)]
pub struct ZapEngine<B: RegisterBus, T: BlockTransfer> {
    pub(super) regs: ZapRegs<B>,
    pub(super) transfer: T,
    pub(super) config: ZapConfig,
    pub(super) state: State,
    pub(super) caps: Capabilities,
    pub(super) channels: Vec<Channel>,
    pub(super) rx_active: Option<ChannelId>,
    pub(super) tx_active: Option<ChannelId>,
    /// An abandoned RX transfer still owes the shared channel a completion
    pub(super) rx_orphaned: bool,
    /// An abandoned TX transfer still owes the shared channel a completion
    pub(super) tx_orphaned: bool,
    pub(super) spurious: u64,
}

impl<B: RegisterBus, T: BlockTransfer> ZapEngine<B, T> {
    /// Create an uninitialized engine (const, suitable for static initialization)
    pub const fn new(bus: B, transfer: T) -> Self {
        Self {
            regs: ZapRegs::new(bus),
            transfer,
            config: ZapConfig::new(),
            state: State::Uninitialized,
            caps: Capabilities {
                firmware: super::capability::FirmwareVersion::new(0, 0, 0),
                channel_count: 0,
                rx_fifo_depth: 0,
                rx_oob_fifo_depth: 0,
                tx_fifo_depth: 0,
                tx_oob_fifo_depth: 0,
                rx_high_water: 0,
                tx_high_water: 0,
            },
            channels: Vec::new(),
            rx_active: None,
            tx_active: None,
            rx_orphaned: false,
            tx_orphaned: false,
            spurious: 0,
        }
    }

    /// Configure the block-transfer mechanism, negotiate capabilities and
    /// allocate every channel's buffers
    ///
    /// Every channel starts stopped with `config.channel` applied.
    pub fn init(&mut self, config: ZapConfig) -> Result<Capabilities> {
        if self.state != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        config.validate()?;
        self.transfer.configure(&config.transfer)?;

        let caps = negotiate(&mut self.regs);
        self.channels = (0..caps.channel_count).map(|i| Channel::new(i, &config)).collect();
        self.config = config;
        self.caps = caps;
        self.state = State::Initialized;

        logging::log_info!(
            "zap: {} channels, {} rx / {} tx buffers of {} bytes each",
            caps.channel_count,
            config.rx_buffers,
            config.tx_buffers,
            config.buffer_size
        );
        Ok(caps)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// Capabilities negotiated by `init`
    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Configuration passed to `init`
    pub fn config(&self) -> &ZapConfig {
        &self.config
    }

    /// Number of channels managed
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Validate a channel index
    pub fn channel(&self, index: usize) -> ChannelResult<ChannelId> {
        ChannelId::new(index, self.channels.len())
    }

    /// Observable state of `channel`
    pub fn channel_state(&self, channel: ChannelId) -> ChannelResult<&ChannelState> {
        Ok(&self.channels[self.index(channel)?].state)
    }

    /// Current configuration of `channel`
    pub fn channel_config(&self, channel: ChannelId) -> ChannelResult<ChannelConfig> {
        Ok(self.channels[self.index(channel)?].config)
    }

    /// ZAP channel owning the shared RX block-transfer channel
    pub fn rx_active(&self) -> Option<ChannelId> {
        self.rx_active
    }

    /// ZAP channel owning the shared TX block-transfer channel
    pub fn tx_active(&self) -> Option<ChannelId> {
        self.tx_active
    }

    /// Whether the shared `direction` channel is held by an abandoned
    /// transfer whose completion has not arrived yet
    pub fn orphaned(&self, direction: Direction) -> bool {
        match direction {
            Direction::Rx => self.rx_orphaned,
            Direction::Tx => self.tx_orphaned,
        }
    }

    /// Interrupt causes that named a channel outside the negotiated count
    pub fn spurious_count(&self) -> u64 {
        self.spurious
    }

    /// Register bus
    pub fn bus(&self) -> &B {
        self.regs.bus()
    }

    /// Register bus, mutably
    pub fn bus_mut(&mut self) -> &mut B {
        self.regs.bus_mut()
    }

    /// Block-transfer mechanism
    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    /// Block-transfer mechanism, mutably
    pub fn transfer_mut(&mut self) -> &mut T {
        &mut self.transfer
    }

    pub(super) fn index(&self, channel: ChannelId) -> ChannelResult<usize> {
        let index = channel.index();
        if index < self.channels.len() { Ok(index) } else { Err(ChannelError::InvalidChannel) }
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.state == State::Initialized {
            Ok(())
        } else {
            Err(ConfigError::NotInitialized.into())
        }
    }

    // =========================================================================
    // Channel Configuration
    // =========================================================================

    /// Replace the configuration of a stopped channel
    ///
    /// Returns [`ChannelError::Busy`] while either direction is enabled or a
    /// buffer is still in flight.
    pub fn configure_channel(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<()> {
        self.ensure_initialized()?;
        let index = self.index(channel)?;
        config.validate(self.config.buffer_size)?;
        let entry = &mut self.channels[index];
        let state = &entry.state;
        if state.rx_enabled || state.tx_enabled || state.rx_in_flight || state.tx_in_flight {
            return Err(ChannelError::Busy.into());
        }
        entry.config = config;
        Ok(())
    }

    // =========================================================================
    // Start / Stop
    // =========================================================================

    /// Enable reception on `channel`
    ///
    /// Programs `MAX_RX_SIZE` from the channel configuration, pulses RXEN,
    /// applies the RX out-of-band setting and arms RX-ready.
    pub fn start_rx<D: DelayNs>(&mut self, channel: ChannelId, delay: &mut D) -> Result<()> {
        self.ensure_initialized()?;
        let index = self.index(channel)?;
        let entry = &mut self.channels[index];
        if entry.state.rx_in_flight {
            return Err(ChannelError::StillInFlight.into());
        }

        let config = entry.config;
        let state = &mut entry.state;
        state.rx_completed_count = 0;
        state.rx_out_of_band_enabled = config.rx_oob_enabled;
        state.rx_payload_max = config.rx_payload_max;
        state.rx_header_size = config.rx_header_size;
        state.rx_enabled = true;
        entry.rx_age = 0;
        entry.rx_rearm = false;

        let max = MaxRxSize::pack(config.rx_payload_words(), config.rx_oob_words());
        self.regs.write(channel, Register::MaxRxSize, max);
        self.pulse_enable(channel, csr::RXEN, delay);
        let oob = if config.rx_oob_enabled { csr::RX_OOB } else { 0 };
        self.regs.write_masked(channel, Register::Csr, oob, csr::RX_OOB);
        self.regs.write(channel, Register::Icr, icr::SET_GLBL | icr::SET_RX_RDY);

        logging::log_debug!("zap: ch{} rx started, max {:#x}", channel.index(), max);
        Ok(())
    }

    /// Enable transmission on `channel`
    ///
    /// Pulses TXEN, applies the TX out-of-band setting and arms TX-ready.
    pub fn start_tx<D: DelayNs>(&mut self, channel: ChannelId, delay: &mut D) -> Result<()> {
        self.ensure_initialized()?;
        let index = self.index(channel)?;
        let entry = &mut self.channels[index];
        if entry.state.tx_in_flight {
            return Err(ChannelError::StillInFlight.into());
        }

        let config = entry.config;
        let state = &mut entry.state;
        state.tx_completed_count = 0;
        state.tx_out_of_band_enabled = config.tx_oob_enabled;
        state.tx_header_size = config.tx_header_size;
        entry.tx_age = 0;
        entry.tx_rearm = false;

        self.pulse_enable(channel, csr::TXEN, delay);
        let oob = if config.tx_oob_enabled { csr::TX_OOB } else { 0 };
        self.regs.write_masked(channel, Register::Csr, oob, csr::TX_OOB);
        self.regs.write(channel, Register::Icr, icr::SET_GLBL | icr::SET_TX_RDY);
        self.channels[index].state.tx_enabled = true;

        logging::log_debug!("zap: ch{} tx started", channel.index());
        Ok(())
    }

    /// Disable reception on `channel`
    ///
    /// The channel is stopped in every case. If a buffer is still in flight
    /// it stays parked as a tombstone until its completion arrives, and
    /// [`ChannelError::StillInFlight`] is returned.
    pub fn stop_rx(&mut self, channel: ChannelId) -> Result<()> {
        self.ensure_initialized()?;
        let index = self.index(channel)?;
        if !self.channels[index].state.rx_enabled {
            return Err(ChannelError::NotEnabled.into());
        }

        self.regs.write_masked(channel, Register::Csr, 0, csr::RXEN);
        self.regs.write(channel, Register::Icr, icr::CLR_RX_ERR | icr::CLR_RX_RDY);

        let entry = &mut self.channels[index];
        entry.state.rx_enabled = false;
        entry.rx_rearm = false;
        if entry.state.rx_in_flight {
            logging::log_warn!("zap: ch{} rx stopped with a transfer in flight", channel.index());
            return Err(ChannelError::StillInFlight.into());
        }
        Ok(())
    }

    /// Disable transmission on `channel`
    ///
    /// Same tombstone policy as [`stop_rx`](Self::stop_rx).
    pub fn stop_tx(&mut self, channel: ChannelId) -> Result<()> {
        self.ensure_initialized()?;
        let index = self.index(channel)?;
        if !self.channels[index].state.tx_enabled {
            return Err(ChannelError::NotEnabled.into());
        }

        self.regs.write_masked(channel, Register::Csr, 0, csr::TXEN);
        self.regs.write(
            channel,
            Register::Icr,
            icr::CLR_TX_ERR | icr::CLR_TX_RDY | icr::CLR_TX_SIZE_RDY,
        );

        let entry = &mut self.channels[index];
        entry.state.tx_enabled = false;
        entry.tx_rearm = false;
        if entry.state.tx_in_flight {
            logging::log_warn!("zap: ch{} tx stopped with a transfer in flight", channel.index());
            return Err(ChannelError::StillInFlight.into());
        }
        Ok(())
    }

    /// Hold `bit` low for [`ENABLE_PULSE_NS`] before raising it
    ///
    /// Toggling an enable bit without the gap glitches the enable line.
    fn pulse_enable<D: DelayNs>(&mut self, channel: ChannelId, bit: u32, delay: &mut D) {
        self.regs.write_masked(channel, Register::Csr, 0, bit);
        delay.delay_ns(ENABLE_PULSE_NS);
        self.regs.write_masked(channel, Register::Csr, bit, bit);
    }

    // =========================================================================
    // Receive Path
    // =========================================================================

    /// Drain the RX block the hardware reported ready on `channel`
    ///
    /// Backpressure is an outcome, not an error: without a free buffer the
    /// event is acked and `rx_in_flight` is left alone.
    pub fn program_rx_transfer(&mut self, channel: ChannelId) -> ChannelResult<RxOutcome> {
        let index = self.index(channel)?;
        let shared_busy = self.rx_active.is_some() || self.rx_orphaned;
        let entry = &mut self.channels[index];

        if !entry.state.rx_enabled {
            self.regs.write(channel, Register::Icr, icr::CLR_RX_RDY);
            return Ok(RxOutcome::Disabled);
        }
        if entry.state.rx_in_flight || shared_busy {
            self.regs.write(channel, Register::Icr, icr::CLR_RX_RDY);
            entry.rx_rearm = true;
            return Ok(RxOutcome::Busy);
        }
        let Some(mut buffer) = entry.rx.try_acquire_free() else {
            self.regs.write(channel, Register::Icr, icr::CLR_RX_RDY);
            entry.state.rx_backpressure += 1;
            return Ok(RxOutcome::NoBuffer);
        };

        self.regs.write(channel, Register::Icr, icr::CLR_RX_RDY);
        let size = RxSize::from_raw(self.regs.read(channel, Register::Size));
        let meta = RxMeta::fit(size, buffer.capacity());
        if !meta.flags.is_empty() {
            entry.state.rx_overflows += 1;
            if meta.len() < size.total_bytes() as usize {
                logging::log_warn!(
                    "zap: ch{} rx of {} bytes cut to {}",
                    channel.index(),
                    size.total_bytes(),
                    meta.len()
                );
            }
        }

        let dest = buffer.as_mut_ptr();
        entry.rx_meta = meta;
        entry.rx_slot = Some(buffer);
        entry.rx_age = 0;
        entry.state.rx_in_flight = true;
        self.rx_active = Some(channel);
        self.transfer.start_rx(dest, meta.len());

        Ok(RxOutcome::Started {
            payload_len: meta.payload_len,
            oob_len: meta.oob_len,
            flags: meta.flags,
        })
    }

    /// RX block-transfer completion
    ///
    /// Call from the platform's RX DMA completion handler. Moves the buffer
    /// to the ready queue of the owning channel and re-arms RX-ready, or
    /// recycles it if the channel was stopped meanwhile. Returns the channel
    /// that owned the transfer, or `None` when no RX transfer was active or
    /// the completion belonged to an abandoned transfer.
    pub fn complete_rx(&mut self) -> Option<ChannelId> {
        if self.rx_orphaned {
            self.rx_orphaned = false;
            logging::log_debug!("zap: late rx completion of an abandoned transfer");
            self.rearm_deferred(Direction::Rx);
            return None;
        }
        let channel = self.rx_active.take()?;
        let entry = &mut self.channels[channel.index()];
        entry.state.rx_in_flight = false;
        entry.rx_age = 0;

        if let Some(buffer) = entry.rx_slot.take() {
            let meta = entry.rx_meta;
            self.transfer.invalidate(buffer.as_ptr(), meta.len());

            if entry.state.rx_enabled {
                let queued =
                    entry.rx.enqueue_ready(buffer, meta.payload_len, meta.oob_len, meta.flags);
                if queued.is_err() {
                    debug_assert!(false, "rx metadata exceeds buffer capacity");
                    logging::log_error!(
                        "zap: ch{} rx buffer over capacity, dropped",
                        channel.index()
                    );
                    entry.state.dropped += 1;
                } else {
                    entry.state.rx_completed_count += 1;
                }
                self.regs.write(channel, Register::Icr, icr::SET_RX_RDY);
            } else {
                entry.rx.release(buffer);
                logging::log_debug!("zap: ch{} rx tombstone recycled", channel.index());
            }
        }

        self.rearm_deferred(Direction::Rx);
        Some(channel)
    }

    // =========================================================================
    // Transmit Path
    // =========================================================================

    /// Send the oldest ready TX buffer of `channel`
    ///
    /// With an empty ready queue nothing is written, so the hardware keeps
    /// TX-ready pending and raises it again.
    pub fn program_tx_transfer(&mut self, channel: ChannelId) -> ChannelResult<TxOutcome> {
        let index = self.index(channel)?;
        let shared_busy = self.tx_active.is_some() || self.tx_orphaned;
        let entry = &mut self.channels[index];

        if !entry.state.tx_enabled {
            self.regs.write(channel, Register::Icr, icr::CLR_TX_RDY);
            return Ok(TxOutcome::Disabled);
        }
        if entry.state.tx_in_flight || shared_busy {
            self.regs.write(channel, Register::Icr, icr::CLR_TX_RDY);
            entry.tx_rearm = true;
            return Ok(TxOutcome::Busy);
        }
        let Some(buffer) = entry.tx.dequeue_ready_try() else {
            entry.state.tx_starved += 1;
            return Ok(TxOutcome::NoBuffer);
        };

        self.regs.write(channel, Register::Icr, icr::CLR_TX_RDY);
        let (payload_len, oob_len) = (buffer.payload_len(), buffer.oob_len());
        let src = buffer.as_ptr();
        let len = buffer.len();
        self.transfer.flush(src, len);

        entry.tx_slot = Some(buffer);
        entry.tx_age = 0;
        entry.state.tx_in_flight = true;
        self.tx_active = Some(channel);
        self.transfer.start_tx(src, len);

        Ok(TxOutcome::Started { payload_len, oob_len })
    }

    /// TX block-transfer completion
    ///
    /// Call from the platform's TX DMA completion handler. Returns the buffer
    /// to the free list of the owning channel and re-arms TX-ready if the
    /// channel is still running. A completion owed by an abandoned transfer
    /// is consumed and `None` returned.
    pub fn complete_tx(&mut self) -> Option<ChannelId> {
        if self.tx_orphaned {
            self.tx_orphaned = false;
            logging::log_debug!("zap: late tx completion of an abandoned transfer");
            self.rearm_deferred(Direction::Tx);
            return None;
        }
        let channel = self.tx_active.take()?;
        let entry = &mut self.channels[channel.index()];
        entry.state.tx_in_flight = false;
        entry.tx_age = 0;

        if let Some(buffer) = entry.tx_slot.take() {
            entry.tx.release(buffer);
        }
        if entry.state.tx_enabled {
            entry.state.tx_completed_count += 1;
            self.regs.write(channel, Register::Icr, icr::SET_TX_RDY);
        } else {
            logging::log_debug!("zap: ch{} tx tombstone recycled", channel.index());
        }

        self.rearm_deferred(Direction::Tx);
        Some(channel)
    }

    /// Re-arm channels whose ready event was acked while the shared
    /// block-transfer channel was busy
    fn rearm_deferred(&mut self, direction: Direction) {
        let count = self.channels.len();
        for index in 0..count {
            let Ok(channel) = ChannelId::new(index, count) else {
                break;
            };
            let entry = &mut self.channels[index];
            let (pending, set) = match direction {
                Direction::Rx => (&mut entry.rx_rearm, icr::SET_RX_RDY),
                Direction::Tx => (&mut entry.tx_rearm, icr::SET_TX_RDY),
            };
            if *pending && entry.state.enabled(direction) && !entry.state.in_flight(direction) {
                *pending = false;
                self.regs.write(channel, Register::Icr, set);
            }
        }
    }

    // =========================================================================
    // Abandon
    // =========================================================================

    /// Give up on a tombstoned transfer whose completion never arrived
    ///
    /// Only allowed on a stopped direction. The buffer's storage is leaked
    /// rather than freed, so a late hardware write cannot hit reused memory;
    /// the pool shrinks by one and `leaked` is incremented.
    ///
    /// The shared block-transfer channel is released only if
    /// [`BlockTransfer::abort`] halts the transfer. Otherwise it stays
    /// [`orphaned`](Self::orphaned): other channels get
    /// [`RxOutcome::Busy`] / [`TxOutcome::Busy`] and the next completion in
    /// that direction is swallowed instead of being credited to them.
    /// Returns whether a buffer was abandoned.
    pub fn abandon_in_flight(&mut self, channel: ChannelId, direction: Direction) -> Result<bool> {
        self.ensure_initialized()?;
        let index = self.index(channel)?;
        let entry = &mut self.channels[index];
        if entry.state.enabled(direction) {
            return Err(ChannelError::Busy.into());
        }

        let (slot, pool, active) = match direction {
            Direction::Rx => (entry.rx_slot.take(), &mut entry.rx, &mut self.rx_active),
            Direction::Tx => (entry.tx_slot.take(), &mut entry.tx, &mut self.tx_active),
        };
        let Some(buffer) = slot else {
            return Ok(false);
        };
        pool.forfeit(buffer);
        let held_shared = *active == Some(channel);
        if held_shared {
            *active = None;
        }
        match direction {
            Direction::Rx => entry.state.rx_in_flight = false,
            Direction::Tx => entry.state.tx_in_flight = false,
        }
        entry.state.leaked += 1;
        logging::log_warn!("zap: ch{} abandoned an in-flight buffer", channel.index());

        if held_shared && !self.transfer.abort(direction) {
            match direction {
                Direction::Rx => self.rx_orphaned = true,
                Direction::Tx => self.tx_orphaned = true,
            }
            logging::log_warn!("zap: shared channel held until the late completion arrives");
            return Ok(true);
        }
        self.rearm_deferred(direction);
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
