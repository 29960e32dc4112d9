// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Per-instance hardware descriptors.
//!
//! A [`Variant`] is chosen once, when the device is constructed, and never
//! changes afterwards. Behaviour that differs between the two HDMI
//! generations is selected by matching on [`Generation`], so each hook is a
//! plain function of the descriptor rather than a runtime-installed pointer.

use kernel::hil::clock::Clock;

use super::registers::{Block, RegisterMap};

/// HDMI block generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generation {
    /// BCM2835/6/7 (Raspberry Pi 0-3).
    Vc4,
    /// BCM2711 (Raspberry Pi 4).
    Vc5,
}

/// TMDS lane of the PHY.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhyLane {
    Tx0 = 0,
    Tx1 = 1,
    Tx2 = 2,
    Clock = 3,
}

/// Fixed HSM clock rate of the legacy generation. It is also the CEC input
/// clock there.
pub const VC4_HSM_CLOCK_HZ: u32 = 163_682_864;

/// HSM rate the current generation runs audio from, and its minimum.
pub const VC5_HSM_MIN_CLOCK_HZ: u32 = 108_000_000;

#[derive(Debug)]
pub struct Variant {
    pub name: &'static str,
    /// Device tree compatible string.
    pub compatible: &'static str,
    pub generation: Generation,
    pub registers: RegisterMap,
    /// Highest pixel clock the encoder can generate, in Hz.
    pub max_pixel_clock: u32,
    /// Rate of the clock feeding the CEC divider, in Hz.
    pub cec_input_clock: u32,
    /// Bits of the CEC CPU interrupt registers owned by this instance.
    pub cec_irq_mask: u32,
    /// Source lane for each PHY output, in output order TX0, TX1, TX2, CK.
    pub phy_lane_mapping: [PhyLane; 4],
    pub audio_available: bool,
}

pub static BCM2835_HDMI: Variant = Variant {
    name: "HDMI",
    compatible: "brcm,bcm2835-hdmi",
    generation: Generation::Vc4,
    registers: RegisterMap::Bcm2835,
    max_pixel_clock: 162_000_000,
    cec_input_clock: VC4_HSM_CLOCK_HZ,
    cec_irq_mask: 1 << 6,
    phy_lane_mapping: [PhyLane::Tx0, PhyLane::Tx1, PhyLane::Tx2, PhyLane::Clock],
    audio_available: true,
};

pub static BCM2711_HDMI0: Variant = Variant {
    name: "HDMI0",
    compatible: "brcm,bcm2711-hdmi0",
    generation: Generation::Vc5,
    registers: RegisterMap::Bcm2711Hdmi0,
    max_pixel_clock: 297_000_000,
    cec_input_clock: 27_000_000,
    cec_irq_mask: (1 << 0) | (1 << 1),
    phy_lane_mapping: [PhyLane::Tx0, PhyLane::Tx1, PhyLane::Tx2, PhyLane::Clock],
    audio_available: true,
};

pub static BCM2711_HDMI1: Variant = Variant {
    name: "HDMI1",
    compatible: "brcm,bcm2711-hdmi1",
    generation: Generation::Vc5,
    registers: RegisterMap::Bcm2711Hdmi1,
    max_pixel_clock: 297_000_000,
    cec_input_clock: 27_000_000,
    cec_irq_mask: (1 << 6) | (1 << 7),
    phy_lane_mapping: [PhyLane::Tx1, PhyLane::Tx0, PhyLane::Clock, PhyLane::Tx2],
    audio_available: true,
};

static VARIANTS: [&Variant; 3] = [&BCM2835_HDMI, &BCM2711_HDMI0, &BCM2711_HDMI1];

impl Variant {
    /// Find the descriptor for a device tree compatible string.
    pub fn from_compatible(compatible: &str) -> Option<&'static Variant> {
        VARIANTS
            .iter()
            .copied()
            .find(|v| v.compatible == compatible)
    }

    pub fn required_blocks(&self) -> &'static [Block] {
        self.registers.required_blocks()
    }

    /// The current generation resets the controller through the SoC reset
    /// controller instead of a register.
    pub fn needs_reset_line(&self) -> bool {
        self.generation == Generation::Vc5
    }

    /// Whether the PHY has a power-down sequence for `disable`.
    pub fn has_phy_disable(&self) -> bool {
        self.generation == Generation::Vc4
    }

    /// HSM clock rate to request for a link running at `pixel_rate` Hz.
    pub fn calc_hsm_clock(&self, pixel_rate: u64) -> u32 {
        match self.generation {
            Generation::Vc4 => VC4_HSM_CLOCK_HZ,
            // The HSM must run at least 1% faster than the pixel clock.
            Generation::Vc5 => {
                let hsm = pixel_rate / 100 * 101;
                hsm.clamp(VC5_HSM_MIN_CLOCK_HZ as u64, u32::MAX as u64) as u32
            }
        }
    }

    /// HSM rate the MAI sample clock divider is computed from.
    pub fn audio_hsm_clock(&self, hsm: &dyn Clock) -> u32 {
        match self.generation {
            Generation::Vc4 => hsm.rate(),
            Generation::Vc5 => VC5_HSM_MIN_CLOCK_HZ,
        }
    }

    /// Bits per entry of `MAI_CHANNEL_MAP`.
    pub const fn channel_map_bits(&self) -> u32 {
        match self.generation {
            Generation::Vc4 => 3,
            Generation::Vc5 => 4,
        }
    }

    /// Encode `MAI_CHANNEL_MAP` for the active channels in `channel_mask`.
    /// Channel `i` is routed to slot `i`.
    pub fn channel_map(&self, channel_mask: u32) -> u32 {
        let bits = self.channel_map_bits();
        (0..8)
            .filter(|i| channel_mask & (1 << i) != 0)
            .fold(0, |map, i| map | (i << (bits * i)))
    }
}
