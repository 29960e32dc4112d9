// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! TMDS PHY programming.
//!
//! The legacy PHY only needs its lanes taken out of reset. The BCM2711 PHY
//! has a PLL fed by a rate manager (RM) that has to be programmed for the
//! TMDS bit rate before the lanes are released.

use super::registers::{
    HdmiRegisters, Reg, RegisterIo, VC4_TX_PHY_CTL_0, VC5_RM_CONTROL, VC5_RM_FORMAT,
    VC5_RM_OFFSET, VC5_TX_PHY_CHANNEL_SWAP, VC5_TX_PHY_CLK_DIV, VC5_TX_PHY_CTL_3,
    VC5_TX_PHY_PLL_CFG, VC5_TX_PHY_PLL_CTL_0, VC5_TX_PHY_POWERDOWN_CTL,
    VC5_TX_PHY_RESET_CTL,
};
use super::variant::{Generation, Variant};

/// Holds all four legacy TX lanes in reset.
const VC4_TX_PHY_RESET_ALL: u32 = 0xf << 16;

const VC5_VCO_MIN_HZ: u64 = 3_000_000_000;
const VC5_VCO_HIGH_BAND_HZ: u64 = 4_500_000_000;
const VC5_ICP_LOW_VCO_HZ: u64 = 3_700_000_000;
const VC5_RM_REFERENCE_HZ: u64 = 54_000_000;
const VC5_WORD_SEL_MIN_PIXEL_HZ: u64 = 297_000_000;

/// PLL operating point for a TMDS character rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VcoSettings {
    pub vco_hz: u64,
    /// Ratio between the VCO and the TMDS bit clock.
    pub divider: u32,
}

impl VcoSettings {
    /// Smallest divider that puts the VCO at or above 3 GHz.
    pub fn for_pixel_rate(pixel_rate: u64) -> VcoSettings {
        let bit_clock = pixel_rate * 10;
        let mut divider = 1;
        while bit_clock * u64::from(divider) < VC5_VCO_MIN_HZ && divider < 255 {
            divider += 1;
        }
        VcoSettings {
            vco_hz: bit_clock * u64::from(divider),
            divider,
        }
    }

    /// Rate manager offset: the VCO as a multiple of the 54 MHz reference,
    /// with 21 fractional bits.
    pub fn rm_offset(&self) -> u32 {
        (((self.vco_hz * 2) << 22) / VC5_RM_REFERENCE_HZ >> 2) as u32 & 0x7fff_ffff
    }

    fn charge_pump_current(&self) -> u32 {
        if self.vco_hz < VC5_ICP_LOW_VCO_HZ {
            0x1c
        } else {
            0x18
        }
    }

    fn high_band(&self) -> bool {
        self.vco_hz > VC5_VCO_HIGH_BAND_HZ
    }
}

/// Bring the PHY out of reset for a link running at `pixel_rate` Hz.
pub fn init<IO: RegisterIo>(regs: &HdmiRegisters<IO>, variant: &Variant, pixel_rate: u64) {
    match variant.generation {
        Generation::Vc4 => {
            regs.write(Reg::TxPhyResetCtl, VC4_TX_PHY_RESET_ALL);
            regs.write(Reg::TxPhyResetCtl, 0);
        }
        Generation::Vc5 => vc5_init(regs, variant, pixel_rate),
    }
}

/// Put the PHY back in reset. The BCM2711 PHY has no power-down sequence.
pub fn disable<IO: RegisterIo>(regs: &HdmiRegisters<IO>, variant: &Variant) {
    if variant.has_phy_disable() {
        regs.write(Reg::TxPhyResetCtl, VC4_TX_PHY_RESET_ALL);
    }
}

/// Enable the random number generator the PHY dithers audio with.
pub fn rng_enable<IO: RegisterIo>(regs: &HdmiRegisters<IO>, variant: &Variant) {
    match variant.generation {
        Generation::Vc4 => regs.modify(Reg::TxPhyCtl0, VC4_TX_PHY_CTL_0::RNG_PWRDN::CLEAR),
        Generation::Vc5 => regs.modify(
            Reg::TxPhyPowerdownCtl,
            VC5_TX_PHY_POWERDOWN_CTL::RNDGEN_PWRDN::CLEAR,
        ),
    }
}

pub fn rng_disable<IO: RegisterIo>(regs: &HdmiRegisters<IO>, variant: &Variant) {
    match variant.generation {
        Generation::Vc4 => regs.modify(Reg::TxPhyCtl0, VC4_TX_PHY_CTL_0::RNG_PWRDN::SET),
        Generation::Vc5 => regs.modify(
            Reg::TxPhyPowerdownCtl,
            VC5_TX_PHY_POWERDOWN_CTL::RNDGEN_PWRDN::SET,
        ),
    }
}

fn vc5_reset<IO: RegisterIo>(regs: &HdmiRegisters<IO>) {
    regs.write_fields(
        Reg::TxPhyResetCtl,
        VC5_TX_PHY_RESET_CTL::TX_0_RESET::SET
            + VC5_TX_PHY_RESET_CTL::TX_1_RESET::SET
            + VC5_TX_PHY_RESET_CTL::TX_2_RESET::SET
            + VC5_TX_PHY_RESET_CTL::TX_CK_RESET::SET,
    );
    regs.write_fields(
        Reg::TxPhyPowerdownCtl,
        VC5_TX_PHY_POWERDOWN_CTL::RNDGEN_PWRDN::SET,
    );
}

fn vc5_init<IO: RegisterIo>(regs: &HdmiRegisters<IO>, variant: &Variant, pixel_rate: u64) {
    let vco = VcoSettings::for_pixel_rate(pixel_rate);

    vc5_reset(regs);

    regs.modify(
        Reg::TxPhyResetCtl,
        VC5_TX_PHY_RESET_CTL::TX_0_RESET::CLEAR
            + VC5_TX_PHY_RESET_CTL::TX_1_RESET::CLEAR
            + VC5_TX_PHY_RESET_CTL::TX_2_RESET::CLEAR
            + VC5_TX_PHY_RESET_CTL::TX_CK_RESET::CLEAR,
    );

    regs.modify(
        Reg::RmControl,
        VC5_RM_CONTROL::EN_FREEZE_COUNTERS::SET
            + VC5_RM_CONTROL::EN_LOAD_INTEGRATOR::SET
            + VC5_RM_CONTROL::FREE_RUN::SET,
    );
    regs.write_fields(
        Reg::RmOffset,
        VC5_RM_OFFSET::ONLY::SET + VC5_RM_OFFSET::OFFSET.val(vco.rm_offset()),
    );
    regs.modify(Reg::TxPhyClkDiv, VC5_TX_PHY_CLK_DIV::VCO.val(vco.divider));
    regs.modify(Reg::RmFormat, VC5_RM_FORMAT::SHIFT.val(2));
    regs.modify(Reg::TxPhyPllCfg, VC5_TX_PHY_PLL_CFG::PDIV.val(1));
    regs.modify(
        Reg::TxPhyPllCtl0,
        VC5_TX_PHY_PLL_CTL_0::VCO_SEL.val(vco.high_band() as u32),
    );
    regs.write(
        Reg::TxPhyTmdsClkWordSel,
        (pixel_rate >= VC5_WORD_SEL_MIN_PIXEL_HZ) as u32,
    );
    regs.write_fields(
        Reg::TxPhyCtl3,
        VC5_TX_PHY_CTL_3::ICP.val(vco.charge_pump_current())
            + VC5_TX_PHY_CTL_3::CRESET.val(1)
            + VC5_TX_PHY_CTL_3::CZ.val(1)
            + VC5_TX_PHY_CTL_3::RP.val(4)
            + VC5_TX_PHY_CTL_3::RZ.val(6),
    );

    let lanes = variant.phy_lane_mapping;
    regs.write_fields(
        Reg::TxPhyChannelSwap,
        VC5_TX_PHY_CHANNEL_SWAP::TX0_OUT_SEL.val(lanes[0] as u32)
            + VC5_TX_PHY_CHANNEL_SWAP::TX1_OUT_SEL.val(lanes[1] as u32)
            + VC5_TX_PHY_CHANNEL_SWAP::TX2_OUT_SEL.val(lanes[2] as u32)
            + VC5_TX_PHY_CHANNEL_SWAP::TXCK_OUT_SEL.val(lanes[3] as u32),
    );

    regs.modify(
        Reg::TxPhyResetCtl,
        VC5_TX_PHY_RESET_CTL::PLL_RESETB::SET + VC5_TX_PHY_RESET_CTL::PLLDIV_RESETB::SET,
    );
    regs.modify(Reg::RmControl, VC5_RM_CONTROL::EN_FREEZE_COUNTERS::CLEAR);
}
