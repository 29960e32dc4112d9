// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! CEC adapter.
//!
//! The controller clocks the CEC line from a 40 kHz tick derived from the
//! variant's CEC input clock, so every bit-timing window is programmed in
//! units of 25 µs.
//!
//! The interrupt handler only touches registers: it captures the received
//! frame or the transmit result and sets the deferred call. Each direction
//! has its own slot, so a frame received while a transmit completion is
//! pending does not lose the completion. Client callbacks run from
//! [`DeferredCallClient::handle_deferred_call`].

use core::cell::Cell;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::deferred_call::{DeferredCall, DeferredCallClient};
use kernel::hil::cec::{
    Cec, CecClient, CecMessage, TransmitStatus, CEC_LOG_ADDR_UNREGISTERED, CEC_MAX_MSG_SIZE,
};
use kernel::hil::time::Time;
use kernel::utilities::cells::OptionalCell;
use kernel::ErrorCode;

use super::registers::{
    Reg, RegisterIo, CEC_CNTRL_1, CEC_CNTRL_2, CEC_CNTRL_3, CEC_CNTRL_4, CEC_CNTRL_5,
    CEC_DATA_WORDS,
};
use super::Hdmi;

/// Rate of the CEC bit-timing tick.
const CEC_CLOCK_HZ: u32 = 40_000;
const CEC_TICK_US: u32 = 1_000_000 / CEC_CLOCK_HZ;

/// Retries the controller makes before it reports a NACK.
const CEC_TX_ATTEMPTS: u8 = 2;

const fn ticks(us: u32) -> u32 {
    us / CEC_TICK_US
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CecPhase {
    Disabled,
    Idle,
    Transmitting,
}

/// Result of [`Hdmi::handle_interrupt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqReturn {
    /// The interrupt was raised by another source.
    None,
    /// An event is waiting in the deferred call.
    WakeThread,
}

pub struct CecState<'a> {
    client: OptionalCell<&'a dyn CecClient>,
    phase: Cell<CecPhase>,
    /// Frame captured by the interrupt handler.
    rx: OptionalCell<CecMessage>,
    /// Transmit result captured by the interrupt handler, `true` on ACK.
    tx: OptionalCell<bool>,
    deferred_call: DeferredCall,
}

impl<'a> CecState<'a> {
    pub const fn new() -> CecState<'a> {
        CecState {
            client: OptionalCell::empty(),
            phase: Cell::new(CecPhase::Disabled),
            rx: OptionalCell::empty(),
            tx: OptionalCell::empty(),
            deferred_call: DeferredCall::new(),
        }
    }

    pub fn phase(&self) -> CecPhase {
        self.phase.get()
    }

    pub fn physical_address_changed(&self, address: Option<u16>) {
        self.client
            .map(|client| client.physical_address_changed(address));
    }
}

impl<IO: RegisterIo, T: Time> Hdmi<'_, IO, T> {
    /// Mask the CEC interrupts, drop the logical address and program the
    /// 40 kHz divider.
    pub(super) fn cec_init(&self) {
        self.regs.write(Reg::CecCpuMaskSet, u32::MAX);

        let divider = self.variant.cec_input_clock / CEC_CLOCK_HZ - 1;
        let cntrl1 = self.regs.read(Reg::CecCntrl1);
        self.regs.write(
            Reg::CecCntrl1,
            (CEC_CNTRL_1::ADDR.val(u32::from(CEC_LOG_ADDR_UNREGISTERED))
                + CEC_CNTRL_1::DIV_CLK_CNT.val(divider))
            .modify(cntrl1),
        );
        self.cec.phase.set(CecPhase::Disabled);
    }

    pub fn cec_phase(&self) -> CecPhase {
        self.cec.phase()
    }

    /// Hard interrupt handler for the CEC interrupt line.
    pub fn handle_interrupt(&self) -> IrqReturn {
        let mask = self.variant.cec_irq_mask;
        if self.regs.read(Reg::CecCpuStatus) & mask == 0 {
            return IrqReturn::None;
        }

        let rx = self
            .regs
            .read_fields::<CEC_CNTRL_5::Register>(Reg::CecCntrl5)
            .is_set(CEC_CNTRL_5::RX_CEC_INT);
        if rx {
            let msg = self.cec_capture_rx();
            if self.cec.rx.replace(msg).is_some() {
                debug!("vc4-hdmi: CEC rx frame dropped, deferred call not serviced");
            }
        } else {
            let ok = self.cec_capture_tx();
            if self.cec.tx.replace(ok).is_some() {
                debug!("vc4-hdmi: CEC tx status dropped, deferred call not serviced");
            }
        }

        self.regs.write(Reg::CecCpuClear, mask);
        self.cec.deferred_call.set();
        IrqReturn::WakeThread
    }

    fn cec_capture_rx(&self) -> CecMessage {
        let cntrl1 = self.regs.read_fields::<CEC_CNTRL_1::Register>(Reg::CecCntrl1);
        let len = 1 + cntrl1.read(CEC_CNTRL_1::REC_WRD_CNT) as usize;

        let mut bytes = [0u8; CEC_MAX_MSG_SIZE];
        let words = len.div_ceil(4).min(usize::from(CEC_DATA_WORDS));
        for (i, chunk) in bytes.chunks_exact_mut(4).take(words).enumerate() {
            chunk.copy_from_slice(&self.regs.read(Reg::CecRxData(i as u8)).to_le_bytes());
        }
        let msg = bytes
            .get(..len)
            .and_then(|frame| CecMessage::from_bytes(frame).ok())
            .unwrap_or_else(|| {
                debug!("vc4-hdmi: CEC frame of {} bytes dropped", len);
                CecMessage::empty()
            });

        let cntrl1 = self.regs.read(Reg::CecCntrl1);
        self.regs
            .write(Reg::CecCntrl1, CEC_CNTRL_1::CLEAR_RECEIVE_OFF::SET.modify(cntrl1));
        self.regs
            .write(Reg::CecCntrl1, CEC_CNTRL_1::CLEAR_RECEIVE_OFF::CLEAR.modify(cntrl1));
        msg
    }

    fn cec_capture_tx(&self) -> bool {
        let cntrl1 = self.regs.read(Reg::CecCntrl1);
        let ok = CEC_CNTRL_1::TX_STATUS_GOOD.is_set(cntrl1);
        self.regs
            .write(Reg::CecCntrl1, CEC_CNTRL_1::START_XMIT_BEGIN::CLEAR.modify(cntrl1));
        ok
    }

    /// Run the pending deferred call, if any. Called from the board's main
    /// loop.
    pub fn service_deferred_call(&self) -> bool {
        self.cec.deferred_call.service(self)
    }
}

impl<IO: RegisterIo, T: Time> DeferredCallClient for Hdmi<'_, IO, T> {
    fn handle_deferred_call(&self) {
        if let Some(ok) = self.cec.tx.take() {
            if self.cec.phase.get() == CecPhase::Transmitting {
                self.cec.phase.set(CecPhase::Idle);
            }
            let status = if ok {
                TransmitStatus::Ok
            } else {
                TransmitStatus::Nack {
                    attempts: CEC_TX_ATTEMPTS,
                }
            };
            if CONFIG.debug_cec {
                debug!("vc4-hdmi: CEC tx done {:?}", status);
            }
            self.cec.client.map(|client| client.transmit_done(status));
        }

        if let Some(msg) = self.cec.rx.take() {
            if CONFIG.debug_cec {
                debug!("vc4-hdmi: CEC rx {:02x?}", msg.as_bytes());
            }
            if !msg.as_bytes().is_empty() {
                self.cec.client.map(|client| client.received_message(&msg));
            }
        }
    }
}

impl<'a, IO: RegisterIo, T: Time> Cec<'a> for Hdmi<'a, IO, T> {
    fn set_client(&self, client: &'a dyn CecClient) {
        self.cec.client.set(client);
    }

    fn enable(&self) -> Result<(), ErrorCode> {
        let cntrl5 = (CEC_CNTRL_5::TX_SW_RESET::CLEAR
            + CEC_CNTRL_5::RX_SW_RESET::CLEAR
            + CEC_CNTRL_5::CNT_TO_4700_US.val(ticks(4700))
            + CEC_CNTRL_5::CNT_TO_4500_US.val(ticks(4500)))
        .modify(self.regs.read(Reg::CecCntrl5));
        let resets = (CEC_CNTRL_5::TX_SW_RESET::SET + CEC_CNTRL_5::RX_SW_RESET::SET).value;
        self.regs.write(Reg::CecCntrl5, cntrl5 | resets);
        self.regs.write(Reg::CecCntrl5, cntrl5);

        self.regs.write_fields(
            Reg::CecCntrl2,
            CEC_CNTRL_2::CNT_TO_1500_US.val(ticks(1500))
                + CEC_CNTRL_2::CNT_TO_1300_US.val(ticks(1300))
                + CEC_CNTRL_2::CNT_TO_800_US.val(ticks(800))
                + CEC_CNTRL_2::CNT_TO_600_US.val(ticks(600))
                + CEC_CNTRL_2::CNT_TO_400_US.val(ticks(400)),
        );
        self.regs.write_fields(
            Reg::CecCntrl3,
            CEC_CNTRL_3::CNT_TO_2750_US.val(ticks(2750))
                + CEC_CNTRL_3::CNT_TO_2400_US.val(ticks(2400))
                + CEC_CNTRL_3::CNT_TO_2050_US.val(ticks(2050))
                + CEC_CNTRL_3::CNT_TO_1700_US.val(ticks(1700)),
        );
        self.regs.write_fields(
            Reg::CecCntrl4,
            CEC_CNTRL_4::CNT_TO_4300_US.val(ticks(4300))
                + CEC_CNTRL_4::CNT_TO_3900_US.val(ticks(3900))
                + CEC_CNTRL_4::CNT_TO_3600_US.val(ticks(3600))
                + CEC_CNTRL_4::CNT_TO_3500_US.val(ticks(3500)),
        );

        self.regs
            .write(Reg::CecCpuMaskClear, self.variant.cec_irq_mask);
        self.cec.phase.set(CecPhase::Idle);
        Ok(())
    }

    fn disable(&self) -> Result<(), ErrorCode> {
        self.regs.write(Reg::CecCpuMaskSet, self.variant.cec_irq_mask);
        self.regs.modify(
            Reg::CecCntrl5,
            CEC_CNTRL_5::TX_SW_RESET::SET + CEC_CNTRL_5::RX_SW_RESET::SET,
        );
        self.cec.phase.set(CecPhase::Disabled);
        Ok(())
    }

    fn set_logical_address(&self, address: u8) -> Result<(), ErrorCode> {
        self.regs.modify(
            Reg::CecCntrl1,
            CEC_CNTRL_1::ADDR.val(u32::from(address & 0xf)),
        );
        Ok(())
    }

    fn transmit(&self, msg: &[u8]) -> Result<(), ErrorCode> {
        if msg.len() > CEC_MAX_MSG_SIZE {
            debug!("vc4-hdmi: CEC frame of {} bytes is too long", msg.len());
            return Err(ErrorCode::SIZE);
        }
        if msg.is_empty() {
            return Err(ErrorCode::INVAL);
        }
        match self.cec.phase.get() {
            CecPhase::Disabled => return Err(ErrorCode::OFF),
            CecPhase::Transmitting => return Err(ErrorCode::BUSY),
            CecPhase::Idle => {}
        }

        for (i, chunk) in msg.chunks(4).enumerate() {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            self.regs
                .write(Reg::CecTxData(i as u8), u32::from_le_bytes(word));
        }

        let cntrl1 = CEC_CNTRL_1::START_XMIT_BEGIN::CLEAR.modify(self.regs.read(Reg::CecCntrl1));
        self.regs.write(Reg::CecCntrl1, cntrl1);
        self.regs.write(
            Reg::CecCntrl1,
            (CEC_CNTRL_1::MESSAGE_LENGTH.val(msg.len() as u32 - 1)
                + CEC_CNTRL_1::START_XMIT_BEGIN::SET)
                .modify(cntrl1),
        );
        self.cec.phase.set(CecPhase::Transmitting);

        if CONFIG.debug_cec {
            debug!("vc4-hdmi: CEC tx {:02x?}", msg);
        }
        Ok(())
    }
}
