// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register map of the VideoCore HDMI transmitter.
//!
//! The BCM2835 places every HDMI register in two windows (`Hdmi` and `Hd`).
//! The BCM2711 splits the same logical registers over nine windows and moves
//! many of them to new offsets, and its second HDMI instance differs again in
//! the `Hd` window. Drivers therefore name registers logically ([`Reg`]) and
//! resolve them through the [`RegisterMap`] of the bound variant.
//!
//! Bitfield layouts that differ between generations have a `VC4_` or `VC5_`
//! prefix; unprefixed layouts are shared.


use kernel::debug;
use kernel::debug_verbose;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, FieldValue, LocalRegisterCopy, ReadWrite, RegisterLongName,
};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

use kernel::config::CONFIG;

/// A memory window of the HDMI transmitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Block {
    Hdmi = 0,
    Hd = 1,
    Cec = 2,
    Csc = 3,
    Dvp = 4,
    Phy = 5,
    Ram = 6,
    Rm = 7,
    Intr2 = 8,
}

impl Block {
    pub const COUNT: usize = 9;

    /// Name of the window in the device tree `reg-names` property.
    pub const fn name(self) -> &'static str {
        match self {
            Block::Hdmi => "hdmi",
            Block::Hd => "hd",
            Block::Cec => "cec",
            Block::Csc => "csc",
            Block::Dvp => "dvp",
            Block::Phy => "phy",
            Block::Ram => "packet",
            Block::Rm => "rm",
            Block::Intr2 => "intr2",
        }
    }
}

/// Logical HDMI registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    MCtl,
    MaiCtl,
    MaiThr,
    MaiFmt,
    MaiData,
    MaiSmp,
    VidCtl,
    DvpCtl,
    CscCtl,
    /// Colour matrix coefficients, two per register: 12_11, 14_13, 22_21,
    /// 24_23, 32_31 and 34_33.
    CscCoeff(u8),
    SwResetControl,
    Hotplug,
    FifoCtl,
    MaiChannelMap,
    MaiConfig,
    AudioPacketConfig,
    RamPacketConfig,
    RamPacketStatus,
    CrpCfg,
    Cts0,
    Cts1,
    SchedulerControl,
    Horza,
    Horzb,
    Verta0,
    Vertb0,
    Verta1,
    Vertb1,
    CecCntrl1,
    CecCntrl2,
    CecCntrl3,
    CecCntrl4,
    CecCntrl5,
    CecTxData(u8),
    CecRxData(u8),
    CecCpuStatus,
    CecCpuSet,
    CecCpuClear,
    CecCpuMaskStatus,
    CecCpuMaskSet,
    CecCpuMaskClear,
    TxPhyResetCtl,
    TxPhyPowerdownCtl,
    TxPhyCtl0,
    TxPhyCtl3,
    TxPhyClkDiv,
    TxPhyPllCtl0,
    TxPhyPllCfg,
    TxPhyTmdsClkWordSel,
    TxPhyChannelSwap,
    ClockStop,
    VecInterfaceXbar,
    RmControl,
    RmOffset,
    RmFormat,
    /// First byte of packet RAM.
    RamPacketStart,
}

/// Number of `CecTxData`/`CecRxData` registers.
pub const CEC_DATA_WORDS: u8 = 4;
/// Number of `CscCoeff` registers.
pub const CSC_COEFF_REGS: u8 = 6;

/// Where a logical register lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterLocation {
    pub block: Block,
    pub offset: usize,
}

const fn at(block: Block, offset: usize) -> Option<RegisterLocation> {
    Some(RegisterLocation { block, offset })
}

/// Register layout of one hardware variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterMap {
    Bcm2835,
    Bcm2711Hdmi0,
    Bcm2711Hdmi1,
}

impl RegisterMap {
    /// Windows the board must supply for this layout.
    pub const fn required_blocks(self) -> &'static [Block] {
        match self {
            RegisterMap::Bcm2835 => &[Block::Hdmi, Block::Hd],
            RegisterMap::Bcm2711Hdmi0 | RegisterMap::Bcm2711Hdmi1 => &[
                Block::Hdmi,
                Block::Hd,
                Block::Cec,
                Block::Csc,
                Block::Dvp,
                Block::Phy,
                Block::Ram,
                Block::Rm,
                Block::Intr2,
            ],
        }
    }

    /// Resolve `reg`, or `None` when this layout does not have it.
    pub const fn locate(self, reg: Reg) -> Option<RegisterLocation> {
        match self {
            RegisterMap::Bcm2835 => bcm2835_locate(reg),
            RegisterMap::Bcm2711Hdmi0 => bcm2711_locate(reg, false),
            RegisterMap::Bcm2711Hdmi1 => bcm2711_locate(reg, true),
        }
    }
}

const fn bcm2835_locate(reg: Reg) -> Option<RegisterLocation> {
    use Block::{Hd, Hdmi};
    match reg {
        Reg::MCtl => at(Hd, 0x0c),
        Reg::MaiCtl => at(Hd, 0x14),
        Reg::MaiThr => at(Hd, 0x18),
        Reg::MaiFmt => at(Hd, 0x1c),
        Reg::MaiData => at(Hd, 0x20),
        Reg::MaiSmp => at(Hd, 0x2c),
        Reg::VidCtl => at(Hd, 0x38),
        Reg::CscCtl => at(Hd, 0x40),
        Reg::CscCoeff(i) if i < CSC_COEFF_REGS => at(Hd, 0x44 + 4 * i as usize),

        Reg::SwResetControl => at(Hdmi, 0x04),
        Reg::Hotplug => at(Hdmi, 0x0c),
        Reg::FifoCtl => at(Hdmi, 0x5c),
        Reg::MaiChannelMap => at(Hdmi, 0x90),
        Reg::MaiConfig => at(Hdmi, 0x94),
        Reg::AudioPacketConfig => at(Hdmi, 0x9c),
        Reg::RamPacketConfig => at(Hdmi, 0xa0),
        Reg::RamPacketStatus => at(Hdmi, 0xa4),
        Reg::CrpCfg => at(Hdmi, 0xa8),
        Reg::Cts0 => at(Hdmi, 0xac),
        Reg::Cts1 => at(Hdmi, 0xb0),
        Reg::SchedulerControl => at(Hdmi, 0xc0),
        Reg::Horza => at(Hdmi, 0xc4),
        Reg::Horzb => at(Hdmi, 0xc8),
        Reg::Verta0 => at(Hdmi, 0xcc),
        Reg::Vertb0 => at(Hdmi, 0xd0),
        Reg::Verta1 => at(Hdmi, 0xd4),
        Reg::Vertb1 => at(Hdmi, 0xd8),
        Reg::CecCntrl1 => at(Hdmi, 0xe8),
        Reg::CecCntrl2 => at(Hdmi, 0xec),
        Reg::CecCntrl3 => at(Hdmi, 0xf0),
        Reg::CecCntrl4 => at(Hdmi, 0xf4),
        Reg::CecCntrl5 => at(Hdmi, 0xf8),
        Reg::CecTxData(i) if i < CEC_DATA_WORDS => at(Hdmi, 0xfc + 4 * i as usize),
        Reg::CecRxData(i) if i < CEC_DATA_WORDS => at(Hdmi, 0x10c + 4 * i as usize),
        Reg::TxPhyResetCtl => at(Hdmi, 0x2c0),
        Reg::TxPhyCtl0 => at(Hdmi, 0x2c4),
        Reg::CecCpuStatus => at(Hdmi, 0x340),
        Reg::CecCpuSet => at(Hdmi, 0x344),
        Reg::CecCpuClear => at(Hdmi, 0x348),
        Reg::CecCpuMaskStatus => at(Hdmi, 0x34c),
        Reg::CecCpuMaskSet => at(Hdmi, 0x350),
        Reg::CecCpuMaskClear => at(Hdmi, 0x354),
        Reg::RamPacketStart => at(Hdmi, 0x400),
        _ => None,
    }
}

const fn bcm2711_locate(reg: Reg, hdmi1: bool) -> Option<RegisterLocation> {
    use Block::{Cec, Csc, Dvp, Hd, Hdmi, Intr2, Phy, Ram, Rm};
    match reg {
        Reg::DvpCtl => at(Hd, 0x00),
        Reg::MaiCtl => at(Hd, if hdmi1 { 0x30 } else { 0x10 }),
        Reg::MaiThr => at(Hd, if hdmi1 { 0x34 } else { 0x14 }),
        Reg::MaiFmt => at(Hd, if hdmi1 { 0x38 } else { 0x18 }),
        Reg::MaiData => at(Hd, if hdmi1 { 0x3c } else { 0x1c }),
        Reg::MaiSmp => at(Hd, if hdmi1 { 0x40 } else { 0x20 }),
        Reg::VidCtl => at(Hd, if hdmi1 { 0x48 } else { 0x44 }),

        Reg::FifoCtl => at(Hdmi, 0x074),
        Reg::MaiChannelMap => at(Hdmi, 0x09c),
        Reg::MaiConfig => at(Hdmi, 0x0a0),
        Reg::AudioPacketConfig => at(Hdmi, 0x0b8),
        Reg::RamPacketConfig => at(Hdmi, 0x0bc),
        Reg::RamPacketStatus => at(Hdmi, 0x0c4),
        Reg::CrpCfg => at(Hdmi, 0x0c8),
        Reg::Cts0 => at(Hdmi, 0x0cc),
        Reg::Cts1 => at(Hdmi, 0x0d0),
        Reg::SchedulerControl => at(Hdmi, 0x0e0),
        Reg::Horza => at(Hdmi, 0x0e4),
        Reg::Horzb => at(Hdmi, 0x0e8),
        Reg::Verta0 => at(Hdmi, 0x0ec),
        Reg::Vertb0 => at(Hdmi, 0x0f0),
        Reg::Verta1 => at(Hdmi, 0x0f4),
        Reg::Vertb1 => at(Hdmi, 0x0f8),
        Reg::Hotplug => at(Hdmi, 0x1a8),

        Reg::ClockStop => at(Dvp, 0xbc),
        Reg::VecInterfaceXbar => at(Dvp, 0xf0),

        Reg::TxPhyResetCtl => at(Phy, 0x00),
        Reg::TxPhyPowerdownCtl => at(Phy, 0x04),
        Reg::TxPhyCtl0 => at(Phy, 0x08),
        Reg::TxPhyCtl3 => at(Phy, 0x14),
        Reg::TxPhyClkDiv => at(Phy, 0x18),
        Reg::TxPhyPllCtl0 => at(Phy, 0x1c),
        Reg::TxPhyPllCfg => at(Phy, 0x34),
        Reg::TxPhyTmdsClkWordSel => at(Phy, 0x44),
        Reg::TxPhyChannelSwap => at(Phy, 0x4c),

        Reg::RmControl => at(Rm, 0x00),
        Reg::RmOffset => at(Rm, 0x18),
        Reg::RmFormat => at(Rm, 0x1c),

        Reg::RamPacketStart => at(Ram, 0x00),

        Reg::CecCntrl1 => at(Cec, 0x10),
        Reg::CecCntrl2 => at(Cec, 0x14),
        Reg::CecCntrl3 => at(Cec, 0x18),
        Reg::CecCntrl4 => at(Cec, 0x1c),
        Reg::CecCntrl5 => at(Cec, 0x20),
        Reg::CecTxData(i) if i < CEC_DATA_WORDS => at(Cec, 0x28 + 4 * i as usize),
        Reg::CecRxData(i) if i < CEC_DATA_WORDS => at(Cec, 0x38 + 4 * i as usize),

        Reg::CscCtl => at(Csc, 0x00),
        Reg::CscCoeff(i) if i < CSC_COEFF_REGS => at(Csc, 0x04 + 4 * i as usize),

        Reg::CecCpuStatus => at(Intr2, 0x00),
        Reg::CecCpuSet => at(Intr2, 0x04),
        Reg::CecCpuClear => at(Intr2, 0x08),
        Reg::CecCpuMaskStatus => at(Intr2, 0x0c),
        Reg::CecCpuMaskSet => at(Intr2, 0x10),
        Reg::CecCpuMaskClear => at(Intr2, 0x14),
        _ => None,
    }
}

/// Raw 32-bit access to the memory windows of one HDMI instance.
///
/// Offsets are byte offsets inside `block` and always word aligned.
pub trait RegisterIo {
    /// Whether the board supplied the window `block`.
    fn has_block(&self, block: Block) -> bool;
    fn read(&self, block: Block, offset: usize) -> u32;
    fn write(&self, block: Block, offset: usize, value: u32);
}

impl<IO: RegisterIo + ?Sized> RegisterIo for &IO {
    fn has_block(&self, block: Block) -> bool {
        (**self).has_block(block)
    }

    fn read(&self, block: Block, offset: usize) -> u32 {
        (**self).read(block, offset)
    }

    fn write(&self, block: Block, offset: usize, value: u32) {
        (**self).write(block, offset, value)
    }
}

type Window = StaticRef<[ReadWrite<u32>]>;

/// Memory-mapped windows of an HDMI instance.
pub struct MmioRegions {
    windows: [Option<Window>; Block::COUNT],
}

impl MmioRegions {
    pub const fn new() -> MmioRegions {
        MmioRegions {
            windows: [None; Block::COUNT],
        }
    }

    /// Add the window `block` at physical address `base`, `len` bytes long.
    ///
    /// # Safety
    ///
    /// `base..base + len` must be the device's MMIO window and must not be
    /// accessed through any other path.
    pub unsafe fn with_window(mut self, block: Block, base: usize, len: usize) -> MmioRegions {
        let words = core::ptr::slice_from_raw_parts(base as *const ReadWrite<u32>, len / 4);
        self.windows[block as usize] = Some(StaticRef::new(words));
        self
    }

    fn register(&self, block: Block, offset: usize) -> Option<&'static ReadWrite<u32>> {
        self.windows[block as usize]?.get().get(offset / 4)
    }
}

impl RegisterIo for MmioRegions {
    fn has_block(&self, block: Block) -> bool {
        self.windows[block as usize].is_some()
    }

    fn read(&self, block: Block, offset: usize) -> u32 {
        self.register(block, offset).map_or(0, |r| r.get())
    }

    fn write(&self, block: Block, offset: usize, value: u32) {
        if let Some(r) = self.register(block, offset) {
            r.set(value);
        }
    }
}

/// Logical register access for one bound variant.
pub struct HdmiRegisters<IO: RegisterIo> {
    io: IO,
    map: RegisterMap,
}

impl<IO: RegisterIo> HdmiRegisters<IO> {
    pub const fn new(io: IO, map: RegisterMap) -> Self {
        HdmiRegisters { io, map }
    }

    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Check that every window this variant needs was supplied.
    pub fn validate(&self) -> Result<(), ErrorCode> {
        for block in self.map.required_blocks() {
            if !self.io.has_block(*block) {
                debug!("vc4-hdmi: missing register window \"{}\"", block.name());
                return Err(ErrorCode::NODEVICE);
            }
        }
        Ok(())
    }

    pub fn has(&self, reg: Reg) -> bool {
        self.map.locate(reg).is_some()
    }

    pub fn locate(&self, reg: Reg) -> Option<RegisterLocation> {
        self.map.locate(reg)
    }

    /// Read `reg`. Registers the variant lacks read as 0.
    pub fn read(&self, reg: Reg) -> u32 {
        match self.map.locate(reg) {
            Some(loc) => self.io.read(loc.block, loc.offset),
            None => {
                debug!("vc4-hdmi: read of unmapped register {:?}", reg);
                0
            }
        }
    }

    /// Write `reg`. Writes to registers the variant lacks are dropped.
    pub fn write(&self, reg: Reg, value: u32) {
        match self.map.locate(reg) {
            Some(loc) => {
                if CONFIG.trace_hdmi_registers {
                    debug_verbose!("vc4-hdmi: {:?} <= {:#010x}", reg, value);
                }
                self.io.write(loc.block, loc.offset, value)
            }
            None => debug!("vc4-hdmi: write of unmapped register {:?}", reg),
        }
    }

    /// Write a byte offset relative to `base`, for register arrays such as
    /// packet RAM.
    pub fn write_offset(&self, base: Reg, offset: usize, value: u32) {
        match self.map.locate(base) {
            Some(loc) => {
                if CONFIG.trace_hdmi_registers {
                    debug_verbose!("vc4-hdmi: {:?}+{:#x} <= {:#010x}", base, offset, value);
                }
                self.io.write(loc.block, loc.offset + offset, value)
            }
            None => debug!("vc4-hdmi: write of unmapped register {:?}", base),
        }
    }

    pub fn read_fields<R: RegisterLongName>(&self, reg: Reg) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.read(reg))
    }

    /// Write `fields`, clearing every other bit.
    pub fn write_fields<R: RegisterLongName>(&self, reg: Reg, fields: FieldValue<u32, R>) {
        self.write(reg, fields.value);
    }

    /// Read-modify-write of the bits covered by `fields`.
    pub fn modify<R: RegisterLongName>(&self, reg: Reg, fields: FieldValue<u32, R>) {
        let value = self.read(reg);
        self.write(reg, fields.modify(value));
    }
}

register_bitfields![u32,
    pub M_CTL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        SW_RST OFFSET(2) NUMBITS(1) []
    ],
    pub SW_RESET_CONTROL [
        HDMI OFFSET(0) NUMBITS(1) [],
        FORMAT_DETECT OFFSET(1) NUMBITS(1) []
    ],
    pub HOTPLUG [
        CONNECTED OFFSET(0) NUMBITS(1) []
    ],
    /// Video output control, HD window.
    pub VID_CTL [
        HSYNC_LOW OFFSET(27) NUMBITS(1) [],
        VSYNC_LOW OFFSET(28) NUMBITS(1) [],
        FRAME_COUNTER_RESET OFFSET(29) NUMBITS(1) [],
        UNDERFLOW_ENABLE OFFSET(30) NUMBITS(1) [],
        ENABLE OFFSET(31) NUMBITS(1) []
    ],
    pub SCHEDULER_CONTROL [
        MODE_HDMI OFFSET(0) NUMBITS(1) [],
        HDMI_ACTIVE OFFSET(1) NUMBITS(1) [],
        VERT_ALWAYS_KEEPOUT OFFSET(3) NUMBITS(1) [],
        IGNORE_VSYNC_PREDICTS OFFSET(5) NUMBITS(1) [],
        MANUAL_FORMAT OFFSET(15) NUMBITS(1) []
    ],
    /// Packet RAM slot enables. `RAM_PACKET_STATUS` mirrors the slot bits
    /// once the hardware has picked them up.
    pub RAM_PACKET_CONFIG [
        SLOTS OFFSET(0) NUMBITS(16) [],
        ENABLE OFFSET(16) NUMBITS(1) []
    ],
    pub FIFO_CTL [
        MASTER_SLAVE_N OFFSET(0) NUMBITS(1) [],
        RECENTER OFFSET(6) NUMBITS(1) [],
        RECENTER_DONE OFFSET(14) NUMBITS(1) []
    ],
    pub VC4_CSC_CTL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        RGB2YCC OFFSET(1) NUMBITS(1) [],
        MODE OFFSET(2) NUMBITS(2) [
            Custom = 3
        ],
        ORDER OFFSET(5) NUMBITS(3) [
            BGR = 5
        ]
    ],
    pub VC4_HORZA [
        HAP OFFSET(0) NUMBITS(13) [],
        HPOS OFFSET(13) NUMBITS(1) [],
        VPOS OFFSET(14) NUMBITS(1) []
    ],
    pub VC4_HORZB [
        HFP OFFSET(0) NUMBITS(10) [],
        HSP OFFSET(10) NUMBITS(10) [],
        HBP OFFSET(20) NUMBITS(10) []
    ],
    pub VC4_VERTA [
        VAL OFFSET(0) NUMBITS(13) [],
        VFP OFFSET(13) NUMBITS(7) [],
        VSP OFFSET(20) NUMBITS(5) []
    ],
    pub VC4_VERTB [
        VBP OFFSET(0) NUMBITS(9) [],
        VSPO OFFSET(9) NUMBITS(13) []
    ],
    pub VC5_HORZA [
        HAP OFFSET(0) NUMBITS(14) [],
        HPOS OFFSET(14) NUMBITS(1) [],
        VPOS OFFSET(15) NUMBITS(1) [],
        HFP OFFSET(16) NUMBITS(13) []
    ],
    pub VC5_HORZB [
        HSP OFFSET(0) NUMBITS(11) [],
        HBP OFFSET(16) NUMBITS(11) []
    ],
    pub VC5_VERTA [
        VAL OFFSET(0) NUMBITS(13) [],
        VFP OFFSET(16) NUMBITS(7) [],
        VSP OFFSET(24) NUMBITS(5) []
    ],
    pub VC5_VERTB [
        VBP OFFSET(0) NUMBITS(9) [],
        VSPO OFFSET(16) NUMBITS(14) []
    ],
    pub MAI_CTL [
        RESET OFFSET(0) NUMBITS(1) [],
        ERRORF OFFSET(1) NUMBITS(1) [],
        ERRORE OFFSET(2) NUMBITS(1) [],
        ENABLE OFFSET(3) NUMBITS(1) [],
        CHNUM OFFSET(4) NUMBITS(4) [],
        PAREN OFFSET(8) NUMBITS(1) [],
        FLUSH OFFSET(9) NUMBITS(1) [],
        EMPTY OFFSET(10) NUMBITS(1) [],
        FULL OFFSET(11) NUMBITS(1) [],
        WHOLSMP OFFSET(12) NUMBITS(1) [],
        CHALIGN OFFSET(13) NUMBITS(1) [],
        BUSY OFFSET(14) NUMBITS(1) [],
        DLATE OFFSET(15) NUMBITS(1) []
    ],
    pub MAI_THR [
        DREQLOW OFFSET(0) NUMBITS(6) [],
        DREQHIGH OFFSET(8) NUMBITS(6) [],
        PANICLOW OFFSET(16) NUMBITS(6) [],
        PANICHIGH OFFSET(24) NUMBITS(6) []
    ],
    pub MAI_FMT [
        SAMPLE_RATE OFFSET(8) NUMBITS(8) [],
        AUDIO_FORMAT OFFSET(16) NUMBITS(8) [
            PCM = 2,
            HBR = 200
        ]
    ],
    /// MAI sample clock divider `N / (M + 1)` from the HSM clock.
    pub MAI_SMP [
        M OFFSET(0) NUMBITS(8) [],
        N OFFSET(8) NUMBITS(24) []
    ],
    pub MAI_CONFIG [
        CHANNEL_MASK OFFSET(0) NUMBITS(16) [],
        BIT_REVERSE OFFSET(26) NUMBITS(1) [],
        FORMAT_REVERSE OFFSET(27) NUMBITS(1) []
    ],
    pub AUDIO_PACKET_CONFIG [
        CEA_MASK OFFSET(0) NUMBITS(8) [],
        B_FRAME_IDENTIFIER OFFSET(10) NUMBITS(4) [],
        ZERO_DATA_ON_INACTIVE_CHANNELS OFFSET(24) NUMBITS(1) [],
        ZERO_DATA_ON_SAMPLE_FLAT OFFSET(29) NUMBITS(1) []
    ],
    pub CRP_CFG [
        N OFFSET(0) NUMBITS(20) [],
        EXTERNAL_CTS_EN OFFSET(24) NUMBITS(1) []
    ],
    pub CEC_CNTRL_1 [
        START_XMIT_BEGIN OFFSET(0) NUMBITS(1) [],
        CLEAR_RECEIVE_OFF OFFSET(1) NUMBITS(1) [],
        MESSAGE_LENGTH OFFSET(2) NUMBITS(4) [],
        ADDR OFFSET(6) NUMBITS(4) [],
        DIV_CLK_CNT OFFSET(10) NUMBITS(12) [],
        TX_CONTINUE OFFSET(22) NUMBITS(1) [],
        RX_CONTINUE OFFSET(23) NUMBITS(1) [],
        REC_WRD_CNT OFFSET(24) NUMBITS(4) [],
        RX_STATUS_GOOD OFFSET(28) NUMBITS(1) [],
        RX_EOM OFFSET(29) NUMBITS(1) [],
        TX_STATUS_GOOD OFFSET(30) NUMBITS(1) [],
        TX_EOM OFFSET(31) NUMBITS(1) []
    ],
    pub CEC_CNTRL_2 [
        CNT_TO_400_US OFFSET(0) NUMBITS(5) [],
        CNT_TO_600_US OFFSET(5) NUMBITS(6) [],
        CNT_TO_800_US OFFSET(11) NUMBITS(6) [],
        CNT_TO_1300_US OFFSET(17) NUMBITS(7) [],
        CNT_TO_1500_US OFFSET(24) NUMBITS(7) []
    ],
    pub CEC_CNTRL_3 [
        CNT_TO_1700_US OFFSET(0) NUMBITS(8) [],
        CNT_TO_2050_US OFFSET(8) NUMBITS(8) [],
        CNT_TO_2400_US OFFSET(16) NUMBITS(8) [],
        CNT_TO_2750_US OFFSET(24) NUMBITS(8) []
    ],
    pub CEC_CNTRL_4 [
        CNT_TO_3500_US OFFSET(0) NUMBITS(8) [],
        CNT_TO_3600_US OFFSET(8) NUMBITS(8) [],
        CNT_TO_3900_US OFFSET(16) NUMBITS(8) [],
        CNT_TO_4300_US OFFSET(24) NUMBITS(8) []
    ],
    pub CEC_CNTRL_5 [
        CNT_TO_4500_US OFFSET(8) NUMBITS(8) [],
        CNT_TO_4700_US OFFSET(16) NUMBITS(8) [],
        RX_CEC_INT OFFSET(24) NUMBITS(1) [],
        RX_SW_RESET OFFSET(26) NUMBITS(1) [],
        TX_SW_RESET OFFSET(27) NUMBITS(1) []
    ],
    pub VC4_TX_PHY_CTL_0 [
        RNG_PWRDN OFFSET(25) NUMBITS(1) []
    ],
    pub VC5_TX_PHY_RESET_CTL [
        TX_0_RESET OFFSET(0) NUMBITS(1) [],
        TX_1_RESET OFFSET(1) NUMBITS(1) [],
        TX_2_RESET OFFSET(2) NUMBITS(1) [],
        TX_CK_RESET OFFSET(3) NUMBITS(1) [],
        PLL_RESETB OFFSET(4) NUMBITS(1) [],
        PLLDIV_RESETB OFFSET(5) NUMBITS(1) []
    ],
    pub VC5_TX_PHY_POWERDOWN_CTL [
        RNDGEN_PWRDN OFFSET(10) NUMBITS(1) []
    ],
    pub VC5_TX_PHY_CTL_3 [
        RZ OFFSET(0) NUMBITS(4) [],
        RP OFFSET(4) NUMBITS(3) [],
        CZ OFFSET(8) NUMBITS(2) [],
        CRESET OFFSET(12) NUMBITS(2) [],
        ICP OFFSET(16) NUMBITS(6) []
    ],
    pub VC5_TX_PHY_CLK_DIV [
        VCO OFFSET(8) NUMBITS(8) []
    ],
    pub VC5_TX_PHY_PLL_CTL_0 [
        VCO_SEL OFFSET(24) NUMBITS(2) []
    ],
    pub VC5_TX_PHY_PLL_CFG [
        PDIV OFFSET(10) NUMBITS(3) []
    ],
    pub VC5_TX_PHY_CHANNEL_SWAP [
        TX0_OUT_SEL OFFSET(0) NUMBITS(2) [],
        TX1_OUT_SEL OFFSET(4) NUMBITS(2) [],
        TX2_OUT_SEL OFFSET(8) NUMBITS(2) [],
        TXCK_OUT_SEL OFFSET(12) NUMBITS(2) []
    ],
    pub VC5_RM_CONTROL [
        FREE_RUN OFFSET(4) NUMBITS(1) [],
        EN_LOAD_INTEGRATOR OFFSET(17) NUMBITS(1) [],
        EN_FREEZE_COUNTERS OFFSET(19) NUMBITS(1) []
    ],
    pub VC5_RM_OFFSET [
        OFFSET OFFSET(0) NUMBITS(31) [],
        ONLY OFFSET(31) NUMBITS(1) []
    ],
    pub VC5_RM_FORMAT [
        SHIFT OFFSET(24) NUMBITS(2) []
    ]
];
