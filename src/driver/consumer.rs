//! Buffer exchange between the engine and the application.
//!
//! Receive side: [`read_rx`](ZapEngine::read_rx) takes the oldest filled
//! buffer, [`release_rx`](ZapEngine::release_rx) hands it back and re-arms
//! RX-ready. Transmit side: [`acquire_tx`](ZapEngine::acquire_tx) takes an
//! empty buffer, [`submit_tx`](ZapEngine::submit_tx) queues it and tells the
//! hardware a TX size is available.
//!
//! Every method takes `&mut self`, so when the engine is shared with the
//! interrupt handler these run inside the same critical section.

use super::channel::{ChannelId, Direction};
use super::engine::ZapEngine;
use super::error::{ChannelError, ChannelResult, Result};
use super::fields::TxSize;
use super::regs::Register;
use crate::hal::bus::RegisterBus;
use crate::hal::transfer::BlockTransfer;
use crate::internal::constants::WORD_SIZE;
use crate::internal::logging;
use crate::internal::register::zap::icr;
use crate::pool::{Buffer, BufferFlags};

impl<B: RegisterBus, T: BlockTransfer> ZapEngine<B, T> {
    /// Take the oldest received buffer of `channel`
    pub fn read_rx(&mut self, channel: ChannelId) -> ChannelResult<Option<Buffer>> {
        let index = self.index(channel)?;
        Ok(self.channels[index].rx.dequeue_ready_try())
    }

    /// Return a received buffer to `channel`'s free list
    ///
    /// Re-arms RX-ready unless a transfer is already running on the channel,
    /// so a block held back for lack of buffers is picked up again. A buffer
    /// that did not come from this channel's RX pool is sent back to the pool
    /// that allocated it and [`ChannelError::InvalidBuffer`] is returned.
    pub fn release_rx(&mut self, channel: ChannelId, buffer: Buffer) -> ChannelResult<()> {
        let index = self.index(channel)?;
        if !self.channels[index].rx.owns(&buffer) {
            self.recycle_misplaced(buffer);
            return Err(ChannelError::InvalidBuffer);
        }
        self.channels[index].rx.release(buffer);
        self.rearm_rx_ready(index);
        Ok(())
    }

    /// Number of received buffers waiting on `channel`
    pub fn rx_ready_count(&self, channel: ChannelId) -> ChannelResult<usize> {
        Ok(self.channels[self.index(channel)?].rx.ready_count())
    }

    /// Take an empty TX buffer of `channel`
    pub fn acquire_tx(&mut self, channel: ChannelId) -> ChannelResult<Option<Buffer>> {
        let index = self.index(channel)?;
        Ok(self.channels[index].tx.try_acquire_free())
    }

    /// Queue a filled TX buffer on `channel`
    ///
    /// The first `oob_len` bytes of the buffer are the out-of-band header,
    /// the next `payload_len` bytes the payload. Both lengths must be whole
    /// words that fit the `TX_SIZE` fields, and `oob_len` must be zero unless
    /// the channel sends out-of-band headers. On error the buffer goes back
    /// to the free list it came from.
    pub fn submit_tx(
        &mut self,
        channel: ChannelId,
        buffer: Buffer,
        payload_len: u32,
        oob_len: u32,
    ) -> Result<()> {
        let index = self.index(channel)?;
        if !self.channels[index].tx.owns(&buffer) {
            self.recycle_misplaced(buffer);
            return Err(ChannelError::InvalidBuffer.into());
        }

        let entry = &mut self.channels[index];
        let whole_words = payload_len % WORD_SIZE == 0 && oob_len % WORD_SIZE == 0;
        let fits = TxSize::fits(payload_len / WORD_SIZE, oob_len / WORD_SIZE);
        let oob_allowed = oob_len == 0 || entry.config.tx_oob_enabled;
        if !(whole_words && fits && oob_allowed) {
            entry.tx.release(buffer);
            return Err(ChannelError::InvalidLength.into());
        }
        entry.tx.enqueue_ready(buffer, payload_len, oob_len, BufferFlags::EMPTY)?;
        self.regs.write(channel, Register::Icr, icr::SET_TX_SIZE_RDY);
        Ok(())
    }

    /// Number of empty TX buffers available on `channel`
    pub fn tx_free_count(&self, channel: ChannelId) -> ChannelResult<usize> {
        Ok(self.channels[self.index(channel)?].tx.free_count())
    }

    fn rearm_rx_ready(&mut self, index: usize) {
        let state = &self.channels[index].state;
        if !state.rx_enabled || state.rx_in_flight {
            return;
        }
        if let Ok(channel) = ChannelId::new(index, self.channels.len()) {
            self.regs.write(channel, Register::Icr, icr::SET_RX_RDY);
        }
    }

    /// Send a buffer handed to the wrong channel or direction back to the
    /// pool that allocated it
    fn recycle_misplaced(&mut self, buffer: Buffer) {
        let home = self.channels.iter().enumerate().find_map(|(index, entry)| {
            if entry.rx.owns(&buffer) {
                Some((index, Direction::Rx))
            } else if entry.tx.owns(&buffer) {
                Some((index, Direction::Tx))
            } else {
                None
            }
        });
        match home {
            Some((index, Direction::Rx)) => {
                self.channels[index].rx.release(buffer);
                self.rearm_rx_ready(index);
            }
            Some((index, Direction::Tx)) => self.channels[index].tx.release(buffer),
            None => {
                logging::log_warn!("zap: dropping buffer {} of another engine", buffer.id());
            }
        }
    }
}
