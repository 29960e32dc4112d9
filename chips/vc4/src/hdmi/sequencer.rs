// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Power, clock and PHY bring-up order.
//!
//! `power_on` takes the power domain, the pixel clock and the HSM clock in
//! that order, then resets the controller and initialises the PHY. Every
//! resource that was taken is remembered, so `power_off` releases exactly
//! those, whether or not `power_on` got to the end.

use core::cell::Cell;

use kernel::debug;
use kernel::hil::clock::Clock;
use kernel::hil::display::DisplayMode;
use kernel::hil::power::{PowerDomain, ResetLine};
use kernel::ErrorCode;

use super::phy;
use super::registers::{HdmiRegisters, Reg, RegisterIo, SW_RESET_CONTROL};
use super::variant::{Generation, Variant};
use super::wait::{Warning, WarningLog};

/// Resources taken by a successful or partial `power_on`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Held {
    pub power: bool,
    pub pixel_clock: bool,
    pub hsm_clock: bool,
}

/// Rates the link runs at once powered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkClocks {
    /// Pixel clock in Hz, doubled for double clocked modes.
    pub pixel_rate: u64,
    pub hsm_rate: u32,
}

pub struct Sequencer<'a> {
    pixel_clock: &'a dyn Clock,
    hsm_clock: &'a dyn Clock,
    power: &'a dyn PowerDomain,
    reset: Option<&'a dyn ResetLine>,
    held: Cell<Held>,
}

impl<'a> Sequencer<'a> {
    pub fn new(
        pixel_clock: &'a dyn Clock,
        hsm_clock: &'a dyn Clock,
        power: &'a dyn PowerDomain,
        reset: Option<&'a dyn ResetLine>,
    ) -> Sequencer<'a> {
        Sequencer {
            pixel_clock,
            hsm_clock,
            power,
            reset,
            held: Cell::new(Held::default()),
        }
    }

    pub fn held(&self) -> Held {
        self.held.get()
    }

    pub fn has_reset_line(&self) -> bool {
        self.reset.is_some()
    }

    pub fn hsm_clock(&self) -> &'a dyn Clock {
        self.hsm_clock
    }

    fn hold(&self, f: impl FnOnce(&mut Held)) {
        let mut held = self.held.get();
        f(&mut held);
        self.held.set(held);
    }

    /// Take every resource the link needs for `mode` and bring the
    /// controller and PHY out of reset.
    ///
    /// On failure everything taken so far is released again before the
    /// error is returned.
    pub fn power_on<IO: RegisterIo>(
        &self,
        regs: &HdmiRegisters<IO>,
        variant: &Variant,
        mode: &DisplayMode,
        warnings: &WarningLog,
    ) -> Result<LinkClocks, ErrorCode> {
        let clocks = self.acquire(variant, mode).inspect_err(|_| {
            let _ = self.power_off(warnings);
        })?;

        if let Err(err) = self.reset_controller(regs, variant) {
            debug!("vc4-hdmi: controller reset failed: {:?}", err);
            let _ = self.power_off(warnings);
            return Err(err);
        }
        phy::init(regs, variant, clocks.pixel_rate);

        Ok(clocks)
    }

    fn acquire(&self, variant: &Variant, mode: &DisplayMode) -> Result<LinkClocks, ErrorCode> {
        self.power.get().inspect_err(|err| {
            debug!("vc4-hdmi: failed to retain power domain: {:?}", err);
        })?;
        self.hold(|h| h.power = true);

        let pixel_rate = mode.pixel_rate_hz();
        let pixel_hz = u32::try_from(pixel_rate).map_err(|_| ErrorCode::INVAL)?;
        self.pixel_clock.set_rate(pixel_hz).inspect_err(|err| {
            debug!("vc4-hdmi: failed to set pixel clock rate: {:?}", err);
        })?;
        self.pixel_clock.prepare_enable().inspect_err(|err| {
            debug!("vc4-hdmi: failed to turn on pixel clock: {:?}", err);
        })?;
        self.hold(|h| h.pixel_clock = true);

        let hsm_rate = variant.calc_hsm_clock(pixel_rate);
        self.hsm_clock.set_rate(hsm_rate).inspect_err(|err| {
            debug!("vc4-hdmi: failed to set HSM clock rate: {:?}", err);
        })?;
        self.hsm_clock.prepare_enable().inspect_err(|err| {
            debug!("vc4-hdmi: failed to turn on HSM clock: {:?}", err);
        })?;
        self.hold(|h| h.hsm_clock = true);

        Ok(LinkClocks {
            pixel_rate,
            hsm_rate,
        })
    }

    fn reset_controller<IO: RegisterIo>(
        &self,
        regs: &HdmiRegisters<IO>,
        variant: &Variant,
    ) -> Result<(), ErrorCode> {
        match variant.generation {
            Generation::Vc4 => {
                regs.write_fields(
                    Reg::SwResetControl,
                    SW_RESET_CONTROL::HDMI::SET + SW_RESET_CONTROL::FORMAT_DETECT::SET,
                );
                regs.write(Reg::SwResetControl, 0);
            }
            Generation::Vc5 => {
                self.reset.ok_or(ErrorCode::NODEVICE)?.reset()?;
                regs.write(Reg::DvpCtl, 0);
            }
        }
        Ok(())
    }

    /// Release whatever `power_on` took, in reverse order.
    ///
    /// A power domain that refuses the release is recorded as a warning and
    /// its error returned; the clocks are off either way.
    pub fn power_off(&self, warnings: &WarningLog) -> Result<(), ErrorCode> {
        let held = self.held.replace(Held::default());
        if held.hsm_clock {
            self.hsm_clock.disable_unprepare();
        }
        if held.pixel_clock {
            self.pixel_clock.disable_unprepare();
        }
        if held.power {
            self.power.put().inspect_err(|err| {
                warnings.record(Warning::PowerReleaseFailed(*err));
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdmi::fakes::{mode_1080p60, mode_480i, FakeClock, FakePower, FakeRegisters, FakeReset};
    use crate::hdmi::registers::RegisterMap;
    use crate::hdmi::variant::{BCM2711_HDMI0, BCM2835_HDMI, VC4_HSM_CLOCK_HZ};

    struct Parts {
        pixel: FakeClock,
        hsm: FakeClock,
        power: FakePower,
        reset: FakeReset,
    }

    impl Parts {
        fn new() -> Parts {
            Parts {
                pixel: FakeClock::new(0),
                hsm: FakeClock::new(0),
                power: FakePower::new(),
                reset: FakeReset::new(),
            }
        }

        fn sequencer(&self, with_reset: bool) -> Sequencer<'_> {
            let reset: Option<&dyn ResetLine> = if with_reset { Some(&self.reset) } else { None };
            Sequencer::new(&self.pixel, &self.hsm, &self.power, reset)
        }
    }

    #[test]
    fn legacy_power_on_order() {
        let parts = Parts::new();
        let seq = parts.sequencer(false);
        let fake = FakeRegisters::new(RegisterMap::Bcm2835);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2835);
        let warnings = WarningLog::new();

        let clocks = seq
            .power_on(&regs, &BCM2835_HDMI, &mode_1080p60(), &warnings)
            .unwrap();
        assert_eq!(clocks.pixel_rate, 148_500_000);
        assert_eq!(clocks.hsm_rate, VC4_HSM_CLOCK_HZ);
        assert_eq!(parts.pixel.requested_rates(), vec![148_500_000]);
        assert_eq!(parts.power.refs(), 1);
        assert_eq!(parts.pixel.enable_count(), 1);
        assert_eq!(parts.hsm.enable_count(), 1);
        assert_eq!(fake.writes_to(Reg::SwResetControl), vec![0b11, 0]);
        assert_eq!(fake.writes_to(Reg::TxPhyResetCtl), vec![0xf << 16, 0]);

        assert_eq!(seq.power_off(&warnings), Ok(()));
        assert_eq!(parts.power.refs(), 0);
        assert_eq!(parts.pixel.enable_count(), 0);
        assert_eq!(parts.hsm.enable_count(), 0);
        assert_eq!(seq.held(), Held::default());
    }

    #[test]
    fn double_clocked_modes_double_the_pixel_rate() {
        let parts = Parts::new();
        let seq = parts.sequencer(true);
        let fake = FakeRegisters::new(RegisterMap::Bcm2711Hdmi0);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2711Hdmi0);
        let warnings = WarningLog::new();

        let clocks = seq
            .power_on(&regs, &BCM2711_HDMI0, &mode_480i(), &warnings)
            .unwrap();
        assert_eq!(clocks.pixel_rate, 27_000_000);
        assert_eq!(parts.hsm.requested_rates(), vec![108_000_000]);
        assert_eq!(parts.reset.pulses(), 1);
        assert_eq!(fake.writes_to(Reg::DvpCtl), vec![0]);
    }

    #[test]
    fn hsm_failure_unwinds_pixel_clock_and_power() {
        let parts = Parts::new();
        parts.hsm.fail_enable(Some(ErrorCode::FAIL));
        let seq = parts.sequencer(false);
        let fake = FakeRegisters::new(RegisterMap::Bcm2835);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2835);
        let warnings = WarningLog::new();

        assert_eq!(
            seq.power_on(&regs, &BCM2835_HDMI, &mode_1080p60(), &warnings),
            Err(ErrorCode::FAIL)
        );
        assert_eq!(parts.pixel.enable_count(), 0);
        assert_eq!(parts.hsm.enable_count(), 0);
        assert_eq!(parts.power.refs(), 0);
        assert!(fake.write_log().is_empty(), "no register touched");
        // Releasing again is harmless.
        assert_eq!(seq.power_off(&warnings), Ok(()));
        assert_eq!(parts.power.refs(), 0);
    }

    #[test]
    fn pixel_rate_failure_releases_power() {
        let parts = Parts::new();
        parts.pixel.fail_set_rate(Some(ErrorCode::INVAL));
        let seq = parts.sequencer(false);
        let fake = FakeRegisters::new(RegisterMap::Bcm2835);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2835);
        let warnings = WarningLog::new();

        assert_eq!(
            seq.power_on(&regs, &BCM2835_HDMI, &mode_1080p60(), &warnings),
            Err(ErrorCode::INVAL)
        );
        assert_eq!(parts.power.refs(), 0);
        assert!(parts.hsm.requested_rates().is_empty());
    }

    #[test]
    fn power_failure_takes_nothing() {
        let parts = Parts::new();
        parts.power.fail_get(Some(ErrorCode::OFF));
        let seq = parts.sequencer(false);
        let fake = FakeRegisters::new(RegisterMap::Bcm2835);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2835);
        let warnings = WarningLog::new();

        assert_eq!(
            seq.power_on(&regs, &BCM2835_HDMI, &mode_1080p60(), &warnings),
            Err(ErrorCode::OFF)
        );
        assert_eq!(parts.power.refs(), 0);
        assert!(parts.pixel.requested_rates().is_empty());
    }

    #[test]
    fn missing_reset_line_aborts_current_generation() {
        let parts = Parts::new();
        let seq = parts.sequencer(false);
        let fake = FakeRegisters::new(RegisterMap::Bcm2711Hdmi0);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2711Hdmi0);
        let warnings = WarningLog::new();

        assert_eq!(
            seq.power_on(&regs, &BCM2711_HDMI0, &mode_1080p60(), &warnings),
            Err(ErrorCode::NODEVICE)
        );
        assert_eq!(seq.held(), Held::default());
        assert_eq!(parts.hsm.enable_count(), 0);
    }

    #[test]
    fn refused_power_release_is_a_warning() {
        let parts = Parts::new();
        let seq = parts.sequencer(false);
        let fake = FakeRegisters::new(RegisterMap::Bcm2835);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2835);
        let warnings = WarningLog::new();

        seq.power_on(&regs, &BCM2835_HDMI, &mode_1080p60(), &warnings)
            .unwrap();
        parts.power.fail_put(Some(ErrorCode::BUSY));
        assert_eq!(seq.power_off(&warnings), Err(ErrorCode::BUSY));
        assert_eq!(
            warnings.last(),
            Some(Warning::PowerReleaseFailed(ErrorCode::BUSY))
        );
        assert_eq!(parts.hsm.enable_count(), 0);
        assert_eq!(parts.pixel.enable_count(), 0);
    }
}
