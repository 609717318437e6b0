//! Interrupt dispatch for [`ZapEngine`].
//!
//! One handler serves every channel. It reads the ICR of channel 0 and
//! handles the active causes in a fixed order: RX error, RX ready, TX ready,
//! TX size ready.

use super::channel::ChannelId;
use super::config::State;
use super::engine::{RxOutcome, TxOutcome, ZapEngine};
use super::fields::TxSize;
use super::interrupt::InterruptCause;
use super::regs::Register;
use crate::hal::bus::RegisterBus;
use crate::hal::transfer::BlockTransfer;
use crate::internal::constants::WORD_SIZE;
use crate::internal::logging;
use crate::internal::register::zap::icr;

/// Result of a TX-size-ready event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxSizeOutcome {
    /// `TX_SIZE` was written for the head of the ready queue
    Written {
        /// Payload words announced
        payload_words: u32,
        /// Out-of-band words announced
        oob_words: u32,
    },
    /// Ready queue empty: acked without writing `TX_SIZE`
    Acked,
}

/// What one call to [`ZapEngine::handle_interrupt`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchReport {
    /// Decoded causes
    pub cause: InterruptCause,
    /// Channel whose RX error was counted
    pub rx_error: Option<ChannelId>,
    /// RX-ready handling
    pub rx: Option<(ChannelId, RxOutcome)>,
    /// TX-ready handling
    pub tx: Option<(ChannelId, TxOutcome)>,
    /// TX-size-ready handling
    pub tx_size: Option<(ChannelId, TxSizeOutcome)>,
    /// Causes dropped because they named an unknown channel
    pub spurious: u8,
}

impl DispatchReport {
    /// Whether any cause was handled or dropped
    pub fn handled(&self) -> bool {
        self.rx_error.is_some()
            || self.rx.is_some()
            || self.tx.is_some()
            || self.tx_size.is_some()
            || self.spurious > 0
    }
}

impl<B: RegisterBus, T: BlockTransfer> ZapEngine<B, T> {
    /// Interrupt handler
    ///
    /// Never fails: exhaustion shows up as an outcome, unknown channel
    /// indices are acked on channel 0 and counted.
    pub fn handle_interrupt(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();
        if self.state != State::Initialized {
            return report;
        }

        let cause = InterruptCause::from_raw(self.regs.read(ChannelId::ZERO, Register::Icr));
        report.cause = cause;
        let count = self.channels.len();
        let rx_channel = ChannelId::new(usize::from(cause.rx_channel), count);
        let tx_channel = ChannelId::new(usize::from(cause.tx_channel), count);

        if cause.rx_error {
            match rx_channel {
                Ok(channel) => {
                    self.channels[channel.index()].state.rx_errors += 1;
                    self.regs.write(channel, Register::Icr, icr::CLR_RX_ERR);
                    logging::log_warn!("zap: ch{} rx error", channel.index());
                    report.rx_error = Some(channel);
                }
                Err(_) => self.drop_spurious(&mut report, cause.rx_channel, icr::CLR_RX_ERR),
            }
        }

        if cause.rx_ready {
            match rx_channel {
                Ok(channel) => {
                    if let Ok(outcome) = self.program_rx_transfer(channel) {
                        report.rx = Some((channel, outcome));
                    }
                }
                Err(_) => self.drop_spurious(&mut report, cause.rx_channel, icr::CLR_RX_RDY),
            }
        }

        if cause.tx_ready {
            match tx_channel {
                Ok(channel) => {
                    if let Ok(outcome) = self.program_tx_transfer(channel) {
                        report.tx = Some((channel, outcome));
                    }
                }
                Err(_) => self.drop_spurious(&mut report, cause.tx_channel, icr::CLR_TX_RDY),
            }
        }

        if cause.tx_size_ready {
            match tx_channel {
                Ok(channel) => {
                    report.tx_size = Some((channel, self.announce_tx_size(channel)));
                }
                Err(_) => {
                    self.drop_spurious(&mut report, cause.tx_channel, icr::CLR_TX_SIZE_RDY);
                }
            }
        }

        report
    }

    /// Tell the hardware how big the next TX block is
    fn announce_tx_size(&mut self, channel: ChannelId) -> TxSizeOutcome {
        match self.channels[channel.index()].tx.peek_ready() {
            Some((payload_len, oob_len)) => {
                let payload_words = payload_len / WORD_SIZE;
                let oob_words = oob_len / WORD_SIZE;
                self.regs.write(channel, Register::Size, TxSize::pack(payload_words, oob_words));
                TxSizeOutcome::Written { payload_words, oob_words }
            }
            None => {
                self.regs.write(channel, Register::Icr, icr::CLR_TX_SIZE_RDY);
                TxSizeOutcome::Acked
            }
        }
    }

    fn drop_spurious(&mut self, report: &mut DispatchReport, raw_channel: u8, ack: u32) {
        self.regs.write(ChannelId::ZERO, Register::Icr, ack);
        self.spurious += 1;
        report.spurious += 1;
        logging::log_warn!("zap: interrupt for unknown channel {}", raw_channel);
    }
}
