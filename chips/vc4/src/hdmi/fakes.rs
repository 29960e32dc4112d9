// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Host-side stand-ins for the hardware and the board collaborators.
//!
//! `FakeRegisters` is a register file that acknowledges the handshakes the
//! driver polls for. Each acknowledgement can be switched off to provoke the
//! matching timeout.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use kernel::hil::audio::{Eld, ELD_MAX_BYTES};
use kernel::hil::cec::{CecClient, CecMessage, TransmitStatus};
use kernel::hil::clock::Clock;
use kernel::hil::display::{
    ConnectorProbe, DisplayMode, ModeFlags, PictureAspect, SinkInfo,
};
use kernel::hil::power::{PowerDomain, ResetLine};
use kernel::hil::time::{Freq1MHz, Time};
use kernel::ErrorCode;

use super::registers::{Block, Reg, RegisterIo, RegisterMap};
use super::variant::Variant;
use super::Hdmi;

/// Ticks (microseconds) that pass on every read of the fake clock.
const TICKS_PER_READ: u64 = 50;

pub(crate) struct FakeTime {
    now: Cell<u64>,
}

impl FakeTime {
    pub(crate) fn new() -> FakeTime {
        FakeTime { now: Cell::new(0) }
    }
}

impl Time for FakeTime {
    type Frequency = Freq1MHz;

    fn now(&self) -> u64 {
        let now = self.now.get() + TICKS_PER_READ;
        self.now.set(now);
        now
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RegWrite {
    pub block: Block,
    pub offset: usize,
    pub value: u32,
}

pub(crate) struct FakeRegisters {
    map: RegisterMap,
    values: RefCell<HashMap<(Block, usize), u32>>,
    log: RefCell<Vec<RegWrite>>,
    missing: RefCell<Vec<Block>>,
    packet_ack: Cell<bool>,
    scheduler_ack: Cell<bool>,
    recenter_ack: Cell<bool>,
}

const SCHEDULER_MODE_HDMI: u32 = 1 << 0;
const SCHEDULER_HDMI_ACTIVE: u32 = 1 << 1;
const FIFO_RECENTER: u32 = 1 << 6;
const FIFO_RECENTER_DONE: u32 = 1 << 14;

impl FakeRegisters {
    pub(crate) fn new(map: RegisterMap) -> FakeRegisters {
        FakeRegisters {
            map,
            values: RefCell::new(HashMap::new()),
            log: RefCell::new(Vec::new()),
            missing: RefCell::new(Vec::new()),
            packet_ack: Cell::new(true),
            scheduler_ack: Cell::new(true),
            recenter_ack: Cell::new(true),
        }
    }

    fn loc(&self, reg: Reg) -> (Block, usize) {
        let loc = self
            .map
            .locate(reg)
            .unwrap_or_else(|| panic!("{:?} is not mapped on {:?}", reg, self.map));
        (loc.block, loc.offset)
    }

    fn is(&self, reg: Reg, block: Block, offset: usize) -> bool {
        self.map
            .locate(reg)
            .is_some_and(|l| l.block == block && l.offset == offset)
    }

    pub(crate) fn get(&self, reg: Reg) -> u32 {
        let (block, offset) = self.loc(reg);
        self.get_at(block, offset)
    }

    pub(crate) fn get_at(&self, block: Block, offset: usize) -> u32 {
        self.values
            .borrow()
            .get(&(block, offset))
            .copied()
            .unwrap_or(0)
    }

    /// Preload a register as the hardware would, without logging a write.
    pub(crate) fn set(&self, reg: Reg, value: u32) {
        let key = self.loc(reg);
        self.values.borrow_mut().insert(key, value);
    }

    /// Every value written to `reg`, oldest first.
    pub(crate) fn writes_to(&self, reg: Reg) -> Vec<u32> {
        let (block, offset) = self.loc(reg);
        self.log
            .borrow()
            .iter()
            .filter(|w| w.block == block && w.offset == offset)
            .map(|w| w.value)
            .collect()
    }

    pub(crate) fn write_log(&self) -> Vec<RegWrite> {
        self.log.borrow().clone()
    }

    pub(crate) fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    pub(crate) fn remove_block(&self, block: Block) {
        self.missing.borrow_mut().push(block);
    }

    pub(crate) fn set_packet_ack(&self, ack: bool) {
        self.packet_ack.set(ack);
    }

    pub(crate) fn set_scheduler_ack(&self, ack: bool) {
        self.scheduler_ack.set(ack);
    }

    pub(crate) fn set_recenter_ack(&self, ack: bool) {
        self.recenter_ack.set(ack);
    }

    fn update(&self, reg: Reg, f: impl FnOnce(u32) -> u32) {
        let key = self.loc(reg);
        let mut values = self.values.borrow_mut();
        let old = values.get(&key).copied().unwrap_or(0);
        values.insert(key, f(old));
    }

    /// Side effects of a write, as the hardware would apply them.
    fn model(&self, block: Block, offset: usize, value: u32) {
        if self.is(Reg::RamPacketConfig, block, offset) && self.packet_ack.get() {
            self.update(Reg::RamPacketStatus, |_| value & 0xffff);
        } else if self.is(Reg::SchedulerControl, block, offset) && self.scheduler_ack.get() {
            let active = if value & SCHEDULER_MODE_HDMI != 0 {
                SCHEDULER_HDMI_ACTIVE
            } else {
                0
            };
            self.update(Reg::SchedulerControl, |_| {
                (value & !SCHEDULER_HDMI_ACTIVE) | active
            });
        } else if self.is(Reg::FifoCtl, block, offset) && self.recenter_ack.get() {
            let done = if value & FIFO_RECENTER != 0 {
                FIFO_RECENTER_DONE
            } else {
                0
            };
            self.update(Reg::FifoCtl, |_| (value & !FIFO_RECENTER_DONE) | done);
        } else if self.is(Reg::CecCpuMaskSet, block, offset) {
            self.update(Reg::CecCpuMaskStatus, |m| m | value);
        } else if self.is(Reg::CecCpuMaskClear, block, offset) {
            self.update(Reg::CecCpuMaskStatus, |m| m & !value);
        } else if self.is(Reg::CecCpuClear, block, offset) {
            self.update(Reg::CecCpuStatus, |s| s & !value);
        } else if self.is(Reg::CecCpuSet, block, offset) {
            self.update(Reg::CecCpuStatus, |s| s | value);
        }
    }
}

impl RegisterIo for FakeRegisters {
    fn has_block(&self, block: Block) -> bool {
        !self.missing.borrow().contains(&block)
    }

    fn read(&self, block: Block, offset: usize) -> u32 {
        self.get_at(block, offset)
    }

    fn write(&self, block: Block, offset: usize, value: u32) {
        self.values.borrow_mut().insert((block, offset), value);
        self.log.borrow_mut().push(RegWrite {
            block,
            offset,
            value,
        });
        self.model(block, offset, value);
    }
}

pub(crate) struct FakeClock {
    rate: Cell<u32>,
    enabled: Cell<usize>,
    rates: RefCell<Vec<u32>>,
    fail_set_rate: Cell<Option<ErrorCode>>,
    fail_enable: Cell<Option<ErrorCode>>,
}

impl FakeClock {
    pub(crate) fn new(rate: u32) -> FakeClock {
        FakeClock {
            rate: Cell::new(rate),
            enabled: Cell::new(0),
            rates: RefCell::new(Vec::new()),
            fail_set_rate: Cell::new(None),
            fail_enable: Cell::new(None),
        }
    }

    pub(crate) fn enable_count(&self) -> usize {
        self.enabled.get()
    }

    pub(crate) fn requested_rates(&self) -> Vec<u32> {
        self.rates.borrow().clone()
    }

    pub(crate) fn fail_set_rate(&self, err: Option<ErrorCode>) {
        self.fail_set_rate.set(err);
    }

    pub(crate) fn fail_enable(&self, err: Option<ErrorCode>) {
        self.fail_enable.set(err);
    }
}

impl Clock for FakeClock {
    fn set_rate(&self, hz: u32) -> Result<(), ErrorCode> {
        self.rates.borrow_mut().push(hz);
        if let Some(err) = self.fail_set_rate.get() {
            return Err(err);
        }
        self.rate.set(hz);
        Ok(())
    }

    fn rate(&self) -> u32 {
        self.rate.get()
    }

    fn prepare_enable(&self) -> Result<(), ErrorCode> {
        if let Some(err) = self.fail_enable.get() {
            return Err(err);
        }
        self.enabled.set(self.enabled.get() + 1);
        Ok(())
    }

    fn disable_unprepare(&self) {
        assert!(self.enabled.get() > 0, "clock disabled more often than enabled");
        self.enabled.set(self.enabled.get() - 1);
    }
}

pub(crate) struct FakePower {
    refs: Cell<isize>,
    fail_get: Cell<Option<ErrorCode>>,
    fail_put: Cell<Option<ErrorCode>>,
}

impl FakePower {
    pub(crate) fn new() -> FakePower {
        FakePower {
            refs: Cell::new(0),
            fail_get: Cell::new(None),
            fail_put: Cell::new(None),
        }
    }

    pub(crate) fn refs(&self) -> isize {
        self.refs.get()
    }

    pub(crate) fn fail_get(&self, err: Option<ErrorCode>) {
        self.fail_get.set(err);
    }

    pub(crate) fn fail_put(&self, err: Option<ErrorCode>) {
        self.fail_put.set(err);
    }
}

impl PowerDomain for FakePower {
    fn get(&self) -> Result<(), ErrorCode> {
        if let Some(err) = self.fail_get.get() {
            return Err(err);
        }
        self.refs.set(self.refs.get() + 1);
        Ok(())
    }

    /// The reference is dropped even when an error is reported.
    fn put(&self) -> Result<(), ErrorCode> {
        self.refs.set(self.refs.get() - 1);
        match self.fail_put.get() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub(crate) struct FakeReset {
    pulses: Cell<usize>,
}

impl FakeReset {
    pub(crate) fn new() -> FakeReset {
        FakeReset {
            pulses: Cell::new(0),
        }
    }

    pub(crate) fn pulses(&self) -> usize {
        self.pulses.get()
    }
}

impl ResetLine for FakeReset {
    fn reset(&self) -> Result<(), ErrorCode> {
        self.pulses.set(self.pulses.get() + 1);
        Ok(())
    }
}

pub(crate) struct FakeProbe {
    pub gpio: Cell<Option<bool>>,
    pub ddc: Cell<bool>,
    pub sink: Cell<Option<SinkInfo>>,
    reads: Cell<usize>,
}

impl FakeProbe {
    pub(crate) fn new() -> FakeProbe {
        FakeProbe {
            gpio: Cell::new(None),
            ddc: Cell::new(false),
            sink: Cell::new(None),
            reads: Cell::new(0),
        }
    }

    pub(crate) fn sink_reads(&self) -> usize {
        self.reads.get()
    }
}

impl ConnectorProbe for FakeProbe {
    fn hotplug_gpio(&self) -> Option<bool> {
        self.gpio.get()
    }

    fn ddc_probe(&self) -> bool {
        self.ddc.get()
    }

    fn read_sink_info(&self) -> Option<SinkInfo> {
        self.reads.set(self.reads.get() + 1);
        self.sink.get()
    }
}

#[derive(Default)]
pub(crate) struct RecordingCecClient {
    pub received: RefCell<Vec<CecMessage>>,
    pub transmitted: RefCell<Vec<TransmitStatus>>,
    pub addresses: RefCell<Vec<Option<u16>>>,
}

impl CecClient for RecordingCecClient {
    fn received_message(&self, msg: &CecMessage) {
        self.received.borrow_mut().push(*msg);
    }

    fn transmit_done(&self, status: TransmitStatus) {
        self.transmitted.borrow_mut().push(status);
    }

    fn physical_address_changed(&self, address: Option<u16>) {
        self.addresses.borrow_mut().push(address);
    }
}

/// An ELD with the given speaker allocation and short audio descriptors.
pub(crate) fn eld(speakers: u8, sads: &[[u8; 3]]) -> Eld {
    let mut bytes = [0u8; ELD_MAX_BYTES];
    bytes[4] = 4;
    bytes[5] = (sads.len() as u8) << 4;
    bytes[7] = speakers;
    bytes[20..24].copy_from_slice(b"TV01");
    for (i, sad) in sads.iter().enumerate() {
        bytes[24 + 3 * i..27 + 3 * i].copy_from_slice(sad);
    }
    Eld::from_bytes(&bytes)
}

/// An HDMI sink with 8 channel LPCM up to 192 kHz and the given speakers.
pub(crate) fn hdmi_sink(speakers: u8) -> SinkInfo {
    SinkInfo {
        hdmi_monitor: true,
        rgb_quant_range_selectable: false,
        hdmi2: false,
        eld: eld(speakers, &[[0x0f, 0x7f, 0x07]]),
        cec_physical_address: Some(0x1000),
    }
}

/// CTA-861 VIC 16.
pub(crate) fn mode_1080p60() -> DisplayMode {
    DisplayMode {
        clock: 148_500,
        hdisplay: 1920,
        hsync_start: 2008,
        hsync_end: 2052,
        htotal: 2200,
        vdisplay: 1080,
        vsync_start: 1084,
        vsync_end: 1089,
        vtotal: 1125,
        flags: ModeFlags::PHSYNC | ModeFlags::PVSYNC,
        vic: 16,
        picture_aspect: PictureAspect::Aspect16x9,
    }
}

/// CTA-861 VIC 6, with vertical values per field.
pub(crate) fn mode_480i() -> DisplayMode {
    DisplayMode {
        clock: 13_500,
        hdisplay: 720,
        hsync_start: 739,
        hsync_end: 801,
        htotal: 858,
        vdisplay: 240,
        vsync_start: 244,
        vsync_end: 247,
        vtotal: 262,
        flags: ModeFlags::INTERLACE | ModeFlags::DBLCLK | ModeFlags::NHSYNC | ModeFlags::NVSYNC,
        vic: 6,
        picture_aspect: PictureAspect::Aspect4x3,
    }
}

/// One HDMI instance with every collaborator faked.
pub(crate) struct Rig {
    pub variant: &'static Variant,
    pub regs: FakeRegisters,
    pub time: FakeTime,
    pub pixel: FakeClock,
    pub hsm: FakeClock,
    pub power: FakePower,
    pub reset: FakeReset,
    pub probe: FakeProbe,
}

impl Rig {
    pub(crate) fn new(variant: &'static Variant) -> Rig {
        Rig {
            variant,
            regs: FakeRegisters::new(variant.registers),
            time: FakeTime::new(),
            pixel: FakeClock::new(0),
            hsm: FakeClock::new(0),
            power: FakePower::new(),
            reset: FakeReset::new(),
            probe: FakeProbe::new(),
        }
    }

    pub(crate) fn hdmi(&self) -> Hdmi<'_, &FakeRegisters, FakeTime> {
        let reset: Option<&dyn ResetLine> = if self.variant.needs_reset_line() {
            Some(&self.reset)
        } else {
            None
        };
        Hdmi::new(
            self.variant,
            &self.regs,
            &self.time,
            &self.pixel,
            &self.hsm,
            &self.power,
            reset,
            &self.probe,
        )
    }

    /// A bound device whose sink is `sink`.
    pub(crate) fn connected(&self, sink: SinkInfo) -> Hdmi<'_, &FakeRegisters, FakeTime> {
        self.probe.gpio.set(Some(true));
        self.probe.sink.set(Some(sink));
        let hdmi = self.hdmi();
        assert_eq!(hdmi.bind(), Ok(()));
        hdmi.detect();
        hdmi
    }
}
