// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Video timing encoder.
//!
//! [`HdmiTimings::encode`] turns a [`DisplayMode`] into the values of the
//! `HORZ*`/`VERT*` registers without touching the hardware. Horizontal values
//! are multiplied by the pixel repetition factor; vertical values are per
//! field. The even field of an interlaced mode has one back porch line less.

use kernel::hil::display::DisplayMode;
use kernel::utilities::registers::LocalRegisterCopy;

use super::registers::{
    HdmiRegisters, Reg, RegisterIo, VC4_HORZA, VC4_HORZB, VC4_VERTA, VC4_VERTB, VC5_HORZA,
    VC5_HORZB, VC5_VERTA, VC5_VERTB, VID_CTL,
};
use super::variant::Generation;

/// Routing of the pixel valve outputs into the HDMI block, BCM2711 only.
const VC5_VEC_INTERFACE_XBAR: u32 = 0x0035_4021;

/// Register values for one mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HdmiTimings {
    pub horza: u32,
    pub horzb: u32,
    /// Same value for both fields.
    pub verta: u32,
    /// Odd field.
    pub vertb: u32,
    pub vertb_even: u32,
    /// `VID_CTL` sync polarity bits (low when the mode's sync is negative).
    pub vid_ctl: u32,
}

/// Timing values read back out of [`HdmiTimings`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodedTimings {
    pub hactive: u32,
    pub hfront_porch: u32,
    pub hsync: u32,
    pub hback_porch: u32,
    pub hsync_positive: bool,
    pub vsync_positive: bool,
    pub vactive: u32,
    pub vfront_porch: u32,
    pub vsync: u32,
    pub vback_porch: u32,
    pub vback_porch_even: u32,
}

impl HdmiTimings {
    pub fn encode(generation: Generation, mode: &DisplayMode) -> HdmiTimings {
        let rep = mode.pixel_repeat();
        let hactive = u32::from(mode.hdisplay) * rep;
        let hfp = u32::from(mode.hsync_start.saturating_sub(mode.hdisplay)) * rep;
        let hsp = u32::from(mode.hsync_end.saturating_sub(mode.hsync_start)) * rep;
        let hbp = u32::from(mode.htotal.saturating_sub(mode.hsync_end)) * rep;

        let vsp = u32::from(mode.vsync_end.saturating_sub(mode.vsync_start));
        let vfp = u32::from(mode.vsync_start.saturating_sub(mode.vdisplay));
        let vbp = u32::from(mode.vtotal.saturating_sub(mode.vsync_end));
        let vbp_even = vbp.saturating_sub(u32::from(mode.is_interlaced()));

        let hpos = mode.hsync_positive();
        let vpos = mode.vsync_positive();

        let mut vid_ctl = VID_CTL::ENABLE.val(0);
        if !hpos {
            vid_ctl += VID_CTL::HSYNC_LOW::SET;
        }
        if !vpos {
            vid_ctl += VID_CTL::VSYNC_LOW::SET;
        }

        match generation {
            Generation::Vc4 => HdmiTimings {
                horza: (VC4_HORZA::HAP.val(hactive)
                    + VC4_HORZA::HPOS.val(hpos as u32)
                    + VC4_HORZA::VPOS.val(vpos as u32))
                .value,
                horzb: (VC4_HORZB::HBP.val(hbp)
                    + VC4_HORZB::HSP.val(hsp)
                    + VC4_HORZB::HFP.val(hfp))
                .value,
                verta: (VC4_VERTA::VSP.val(vsp)
                    + VC4_VERTA::VFP.val(vfp)
                    + VC4_VERTA::VAL.val(u32::from(mode.vdisplay)))
                .value,
                vertb: (VC4_VERTB::VSPO.val(0) + VC4_VERTB::VBP.val(vbp)).value,
                vertb_even: (VC4_VERTB::VSPO.val(0) + VC4_VERTB::VBP.val(vbp_even)).value,
                vid_ctl: vid_ctl.value,
            },
            Generation::Vc5 => HdmiTimings {
                horza: (VC5_HORZA::HAP.val(hactive)
                    + VC5_HORZA::HFP.val(hfp)
                    + VC5_HORZA::HPOS.val(hpos as u32)
                    + VC5_HORZA::VPOS.val(vpos as u32))
                .value,
                horzb: (VC5_HORZB::HBP.val(hbp) + VC5_HORZB::HSP.val(hsp)).value,
                verta: (VC5_VERTA::VSP.val(vsp)
                    + VC5_VERTA::VFP.val(vfp)
                    + VC5_VERTA::VAL.val(u32::from(mode.vdisplay)))
                .value,
                vertb: (VC5_VERTB::VSPO.val(0) + VC5_VERTB::VBP.val(vbp)).value,
                vertb_even: (VC5_VERTB::VSPO.val(0) + VC5_VERTB::VBP.val(vbp_even)).value,
                vid_ctl: vid_ctl.value,
            },
        }
    }

    pub fn decode(&self, generation: Generation) -> DecodedTimings {
        match generation {
            Generation::Vc4 => {
                let horza: LocalRegisterCopy<u32, VC4_HORZA::Register> =
                    LocalRegisterCopy::new(self.horza);
                let horzb: LocalRegisterCopy<u32, VC4_HORZB::Register> =
                    LocalRegisterCopy::new(self.horzb);
                let verta: LocalRegisterCopy<u32, VC4_VERTA::Register> =
                    LocalRegisterCopy::new(self.verta);
                let vertb: LocalRegisterCopy<u32, VC4_VERTB::Register> =
                    LocalRegisterCopy::new(self.vertb);
                let vertb_even: LocalRegisterCopy<u32, VC4_VERTB::Register> =
                    LocalRegisterCopy::new(self.vertb_even);
                DecodedTimings {
                    hactive: horza.read(VC4_HORZA::HAP),
                    hfront_porch: horzb.read(VC4_HORZB::HFP),
                    hsync: horzb.read(VC4_HORZB::HSP),
                    hback_porch: horzb.read(VC4_HORZB::HBP),
                    hsync_positive: horza.is_set(VC4_HORZA::HPOS),
                    vsync_positive: horza.is_set(VC4_HORZA::VPOS),
                    vactive: verta.read(VC4_VERTA::VAL),
                    vfront_porch: verta.read(VC4_VERTA::VFP),
                    vsync: verta.read(VC4_VERTA::VSP),
                    vback_porch: vertb.read(VC4_VERTB::VBP),
                    vback_porch_even: vertb_even.read(VC4_VERTB::VBP),
                }
            }
            Generation::Vc5 => {
                let horza: LocalRegisterCopy<u32, VC5_HORZA::Register> =
                    LocalRegisterCopy::new(self.horza);
                let horzb: LocalRegisterCopy<u32, VC5_HORZB::Register> =
                    LocalRegisterCopy::new(self.horzb);
                let verta: LocalRegisterCopy<u32, VC5_VERTA::Register> =
                    LocalRegisterCopy::new(self.verta);
                let vertb: LocalRegisterCopy<u32, VC5_VERTB::Register> =
                    LocalRegisterCopy::new(self.vertb);
                let vertb_even: LocalRegisterCopy<u32, VC5_VERTB::Register> =
                    LocalRegisterCopy::new(self.vertb_even);
                DecodedTimings {
                    hactive: horza.read(VC5_HORZA::HAP),
                    hfront_porch: horza.read(VC5_HORZA::HFP),
                    hsync: horzb.read(VC5_HORZB::HSP),
                    hback_porch: horzb.read(VC5_HORZB::HBP),
                    hsync_positive: horza.is_set(VC5_HORZA::HPOS),
                    vsync_positive: horza.is_set(VC5_HORZA::VPOS),
                    vactive: verta.read(VC5_VERTA::VAL),
                    vfront_porch: verta.read(VC5_VERTA::VFP),
                    vsync: verta.read(VC5_VERTA::VSP),
                    vback_porch: vertb.read(VC5_VERTB::VBP),
                    vback_porch_even: vertb_even.read(VC5_VERTB::VBP),
                }
            }
        }
    }

    /// Program the timing registers. `VID_CTL` is overwritten, so this runs
    /// while video output is disabled.
    pub fn write<IO: RegisterIo>(&self, regs: &HdmiRegisters<IO>, generation: Generation) {
        if generation == Generation::Vc5 {
            regs.write(Reg::VecInterfaceXbar, VC5_VEC_INTERFACE_XBAR);
        }
        regs.write(Reg::Horza, self.horza);
        regs.write(Reg::Horzb, self.horzb);
        regs.write(Reg::Verta0, self.verta);
        regs.write(Reg::Verta1, self.verta);
        regs.write(Reg::Vertb0, self.vertb_even);
        regs.write(Reg::Vertb1, self.vertb);
        regs.write(Reg::VidCtl, self.vid_ctl);
        if generation == Generation::Vc5 {
            regs.write(Reg::ClockStop, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdmi::fakes::{mode_1080p60, mode_480i, FakeRegisters};
    use crate::hdmi::registers::RegisterMap;
    use kernel::hil::display::ModeFlags;

    fn expected(mode: &DisplayMode) -> DecodedTimings {
        let rep = mode.pixel_repeat();
        DecodedTimings {
            hactive: u32::from(mode.hdisplay) * rep,
            hfront_porch: u32::from(mode.hsync_start - mode.hdisplay) * rep,
            hsync: u32::from(mode.hsync_end - mode.hsync_start) * rep,
            hback_porch: u32::from(mode.htotal - mode.hsync_end) * rep,
            hsync_positive: mode.hsync_positive(),
            vsync_positive: mode.vsync_positive(),
            vactive: u32::from(mode.vdisplay),
            vfront_porch: u32::from(mode.vsync_start - mode.vdisplay),
            vsync: u32::from(mode.vsync_end - mode.vsync_start),
            vback_porch: u32::from(mode.vtotal - mode.vsync_end),
            vback_porch_even: u32::from(mode.vtotal - mode.vsync_end)
                - u32::from(mode.is_interlaced()),
        }
    }

    #[test]
    fn both_generations_round_trip() {
        let mut negative = mode_1080p60();
        negative.flags = ModeFlags::NHSYNC | ModeFlags::NVSYNC;
        let vga = DisplayMode {
            clock: 25_175,
            hdisplay: 640,
            hsync_start: 656,
            hsync_end: 752,
            htotal: 800,
            vdisplay: 480,
            vsync_start: 490,
            vsync_end: 492,
            vtotal: 525,
            flags: ModeFlags::NHSYNC | ModeFlags::NVSYNC,
            vic: 1,
            ..DisplayMode::default()
        };
        for mode in [mode_1080p60(), negative, mode_480i(), vga] {
            for generation in [Generation::Vc4, Generation::Vc5] {
                let decoded = HdmiTimings::encode(generation, &mode).decode(generation);
                assert_eq!(decoded, expected(&mode), "{:?} {:?}", generation, mode);
            }
        }
    }

    #[test]
    fn full_hd_fields() {
        let t = HdmiTimings::encode(Generation::Vc4, &mode_1080p60());
        let d = t.decode(Generation::Vc4);
        assert_eq!(d.hactive, 1920);
        assert_eq!(d.hfront_porch, 88);
        assert_eq!(d.hsync, 44);
        assert_eq!(d.hback_porch, 148);
        assert_eq!(d.vactive, 1080);
        assert_eq!(t.vid_ctl, 0, "positive sync must leave the LOW bits clear");
        assert_eq!(t.vertb, t.vertb_even);
    }

    #[test]
    fn pixel_repetition_doubles_horizontal_values() {
        let mode = mode_480i();
        assert!(mode.is_double_clocked());
        let d = HdmiTimings::encode(Generation::Vc5, &mode).decode(Generation::Vc5);
        assert_eq!(d.hactive, 1440);
        assert_eq!(d.vback_porch, d.vback_porch_even + 1);
        let t = HdmiTimings::encode(Generation::Vc5, &mode);
        assert_ne!(t.vid_ctl, 0, "480i uses negative sync");
    }

    #[test]
    fn current_generation_writes_crossbar_and_clock_stop() {
        let fake = FakeRegisters::new(RegisterMap::Bcm2711Hdmi0);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2711Hdmi0);
        HdmiTimings::encode(Generation::Vc5, &mode_1080p60()).write(&regs, Generation::Vc5);
        assert_eq!(
            fake.writes_to(Reg::VecInterfaceXbar),
            vec![VC5_VEC_INTERFACE_XBAR]
        );
        let log = fake.write_log();
        assert_eq!(
            log.last().map(|w| (w.block, w.offset, w.value)),
            regs.locate(Reg::ClockStop).map(|l| (l.block, l.offset, 0))
        );

        let legacy = FakeRegisters::new(RegisterMap::Bcm2835);
        let regs = HdmiRegisters::new(&legacy, RegisterMap::Bcm2835);
        HdmiTimings::encode(Generation::Vc4, &mode_1080p60()).write(&regs, Generation::Vc4);
        assert_eq!(legacy.write_log().len(), 7);
    }
}
