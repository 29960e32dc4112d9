// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Packet RAM engine.
//!
//! Each infoframe type owns one slot of the packet RAM. A slot is only
//! rewritten while it is stopped: clear its bit in `RAM_PACKET_CONFIG`, wait
//! for the same bit of `RAM_PACKET_STATUS` to drop, store the frame, then set
//! the bit again and wait for the status to follow.

use kernel::debug;
use kernel::hil::time::Time;
use kernel::ErrorCode;

use super::infoframe::{Infoframe, InfoframeType, PACKET_STRIDE};
use super::registers::{HdmiRegisters, Reg, RegisterIo, RAM_PACKET_CONFIG};
use super::wait::{self, Warning, WarningLog, PACKET_START_TIMEOUT_MS, PACKET_STOP_TIMEOUT_MS};

pub struct PacketRam<'r, IO: RegisterIo, T: Time + ?Sized> {
    regs: &'r HdmiRegisters<IO>,
    time: &'r T,
    warnings: &'r WarningLog,
}

impl<'r, IO: RegisterIo, T: Time + ?Sized> PacketRam<'r, IO, T> {
    pub fn new(regs: &'r HdmiRegisters<IO>, time: &'r T, warnings: &'r WarningLog) -> Self {
        PacketRam {
            regs,
            time,
            warnings,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.regs
            .read_fields::<RAM_PACKET_CONFIG::Register>(Reg::RamPacketConfig)
            .is_set(RAM_PACKET_CONFIG::ENABLE)
    }

    /// Power the RAM with every slot stopped.
    pub fn enable(&self) {
        self.regs
            .write_fields(Reg::RamPacketConfig, RAM_PACKET_CONFIG::ENABLE::SET);
    }

    /// Power the RAM down, keeping the slot bits.
    pub fn power_down(&self) {
        self.regs
            .modify(Reg::RamPacketConfig, RAM_PACKET_CONFIG::ENABLE::CLEAR);
    }

    /// Power the RAM down and stop every slot.
    pub fn clear(&self) {
        self.regs.write(Reg::RamPacketConfig, 0);
    }

    /// Whether the slot of `kind` is transmitting.
    pub fn is_sending(&self, kind: InfoframeType) -> bool {
        self.regs.read(Reg::RamPacketStatus) & slot_bit(kind) != 0
    }

    /// Stop transmitting `kind`. Returns `BUSY` if the hardware did not
    /// confirm in time; the timeout is also recorded as a warning.
    pub fn stop(&self, kind: InfoframeType) -> Result<(), ErrorCode> {
        let bit = slot_bit(kind);
        let config = self.regs.read(Reg::RamPacketConfig);
        self.regs.write(Reg::RamPacketConfig, config & !bit);

        wait::wait_for(self.time, PACKET_STOP_TIMEOUT_MS, || !self.is_sending(kind)).inspect_err(
            |_| self.warnings.record(Warning::PacketStopTimeout(kind.code())),
        )
    }

    /// Store `frame` in its slot and start transmitting it.
    ///
    /// If the slot does not stop, the RAM is left untouched. Both timeouts
    /// are recorded as warnings and returned as `BUSY`.
    pub fn write(&self, frame: &Infoframe) -> Result<(), ErrorCode> {
        let kind = frame.kind();
        if !self.is_enabled() {
            debug!("vc4-hdmi: packet RAM is off, {:?} infoframe is lost", kind);
        }

        let packed = frame.pack()?;
        self.stop(kind)?;

        let base = kind.slot() as usize * PACKET_STRIDE;
        for (i, word) in packed.ram_words().enumerate() {
            self.regs.write_offset(Reg::RamPacketStart, base + 4 * i, word);
        }

        let bit = slot_bit(kind);
        let config = self.regs.read(Reg::RamPacketConfig);
        self.regs.write(Reg::RamPacketConfig, config | bit);

        wait::wait_for(self.time, PACKET_START_TIMEOUT_MS, || self.is_sending(kind)).inspect_err(
            |_| self.warnings.record(Warning::PacketStartTimeout(kind.code())),
        )
    }
}

fn slot_bit(kind: InfoframeType) -> u32 {
    1 << kind.slot()
}
