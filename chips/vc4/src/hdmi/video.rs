// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Video output enable and disable.

use kernel::hil::display::{DisplayMode, Encoder, ModeStatus, QuantizationRange};
use kernel::hil::time::Time;
use kernel::ErrorCode;

use super::csc;
use super::infoframe::{AudioInfoframe, AviInfoframe, Infoframe, SpdInfoframe, SPD_SDI_PC};
use super::phy;
use super::registers::{
    Reg, RegisterIo, FIFO_CTL, RAM_PACKET_CONFIG, SCHEDULER_CONTROL, VID_CTL,
};
use super::timing::HdmiTimings;
use super::wait::{self, Warning, RECENTER_TIMEOUT_MS, SCHEDULER_TIMEOUT_MS};
use super::Hdmi;

/// Bits of `FIFO_CTL` that may be written back.
const FIFO_VALID_WRITE_MASK: u32 = 0xefff;

const SPD_VENDOR: &str = "Broadcom";
const SPD_PRODUCT: &str = "Videocore";

/// Signalling used on the link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Video only, no data islands.
    Dvi,
    /// Video with infoframes and audio.
    Hdmi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoState {
    Disabled,
    Enabling,
    Active(OutputMode),
    Disabling,
}

impl<IO: RegisterIo, T: Time> Hdmi<'_, IO, T> {
    fn scheduler_active(&self) -> bool {
        self.regs
            .read_fields::<SCHEDULER_CONTROL::Register>(Reg::SchedulerControl)
            .is_set(SCHEDULER_CONTROL::HDMI_ACTIVE)
    }

    /// Switch the scheduler between HDMI and DVI and wait for it to follow.
    fn set_scheduler_mode(&self, output: OutputMode) {
        let hdmi = output == OutputMode::Hdmi;
        if hdmi {
            self.regs
                .modify(Reg::SchedulerControl, SCHEDULER_CONTROL::MODE_HDMI::SET);
        } else {
            self.regs
                .modify(Reg::RamPacketConfig, RAM_PACKET_CONFIG::ENABLE::CLEAR);
            self.regs
                .modify(Reg::SchedulerControl, SCHEDULER_CONTROL::MODE_HDMI::CLEAR);
        }

        if wait::wait_for(self.time, SCHEDULER_TIMEOUT_MS, || {
            self.scheduler_active() == hdmi
        })
        .is_err()
        {
            self.warnings.record(Warning::SchedulerTimeout { hdmi });
        }
    }

    /// Pulse the FIFO recenter bit twice and wait for the FIFO to settle.
    fn recenter_fifo(&self) {
        let drift = self.regs.read(Reg::FifoCtl) & FIFO_VALID_WRITE_MASK;
        let idle = FIFO_CTL::RECENTER::CLEAR.modify(drift);
        let recenter = FIFO_CTL::RECENTER::SET.modify(drift);

        self.regs.write(Reg::FifoCtl, idle);
        self.regs.write(Reg::FifoCtl, recenter);
        wait::delay_us(self.time, 1000);
        self.regs.write(Reg::FifoCtl, idle);
        self.regs.write(Reg::FifoCtl, recenter);

        if wait::wait_for(self.time, RECENTER_TIMEOUT_MS, || {
            self.regs
                .read_fields::<FIFO_CTL::Register>(Reg::FifoCtl)
                .is_set(FIFO_CTL::RECENTER_DONE)
        })
        .is_err()
        {
            self.warnings.record(Warning::RecenterTimeout);
        }
    }

    fn write_avi_infoframe(&self, mode: &DisplayMode) {
        let avi = AviInfoframe::from_mode(
            mode,
            &self.sink.get(),
            self.limited_rgb_range.get(),
            self.margins.get(),
        );
        // Timeouts are already in the warning log.
        let _ = self.packet_ram().write(&Infoframe::Avi(avi));
    }

    fn write_spd_infoframe(&self) {
        let spd = SpdInfoframe::new(SPD_VENDOR, SPD_PRODUCT, SPD_SDI_PC);
        let _ = self.packet_ram().write(&Infoframe::Spd(spd));
    }

    /// Send the audio infoframe for the prepared stream.
    pub(super) fn write_audio_infoframe(&self) -> Result<(), ErrorCode> {
        let frame = AudioInfoframe {
            channels: self.audio.channels(),
            // No allocation fits the sink: send CA 0 (front left and right)
            // rather than a value outside the CEA table.
            channel_allocation: self.audio.channel_allocation().unwrap_or(0),
        };
        self.packet_ram().write(&Infoframe::Audio(frame))
    }

    fn write_infoframes(&self, mode: &DisplayMode) {
        self.write_avi_infoframe(mode);
        self.write_spd_infoframe();
        if self.audio.is_streaming() {
            let _ = self.write_audio_infoframe();
        }
    }

    /// Whether the link currently carries HDMI data islands.
    pub fn is_hdmi_active(&self) -> bool {
        self.state.get() == VideoState::Active(OutputMode::Hdmi)
    }
}

impl<IO: RegisterIo, T: Time> Encoder for Hdmi<'_, IO, T> {
    fn mode_valid(&self, mode: &DisplayMode) -> ModeStatus {
        if u64::from(mode.clock) * 1000 > u64::from(self.variant.max_pixel_clock) {
            ModeStatus::ClockHigh
        } else {
            ModeStatus::Ok
        }
    }

    fn enable(&self, mode: &DisplayMode) -> Result<(), ErrorCode> {
        if self.state.get() != VideoState::Disabled {
            return Err(ErrorCode::ALREADY);
        }
        self.state.set(VideoState::Enabling);

        if let Err(err) = self
            .sequencer
            .power_on(&self.regs, self.variant, mode, &self.warnings)
        {
            self.state.set(VideoState::Disabled);
            return Err(err);
        }

        let generation = self.variant.generation;
        self.regs.write(Reg::VidCtl, 0);
        self.regs.modify(
            Reg::SchedulerControl,
            SCHEDULER_CONTROL::MANUAL_FORMAT::SET + SCHEDULER_CONTROL::IGNORE_VSYNC_PREDICTS::SET,
        );
        HdmiTimings::encode(generation, mode).write(&self.regs, generation);

        let sink = self.sink.get();
        let limited =
            sink.hdmi_monitor && mode.default_rgb_quant_range() == QuantizationRange::Limited;
        csc::setup(&self.regs, generation, limited);
        self.limited_rgb_range.set(limited);

        self.regs
            .write_fields(Reg::FifoCtl, FIFO_CTL::MASTER_SLAVE_N::SET);
        self.regs.modify(
            Reg::VidCtl,
            VID_CTL::ENABLE::SET + VID_CTL::UNDERFLOW_ENABLE::SET + VID_CTL::FRAME_COUNTER_RESET::SET,
        );
        self.mode.set(Some(*mode));

        let output = if sink.hdmi_monitor {
            OutputMode::Hdmi
        } else {
            OutputMode::Dvi
        };
        self.set_scheduler_mode(output);

        if output == OutputMode::Hdmi {
            self.regs.modify(
                Reg::SchedulerControl,
                SCHEDULER_CONTROL::VERT_ALWAYS_KEEPOUT::SET,
            );
            self.packet_ram().enable();
            self.write_infoframes(mode);
            self.recenter_fifo();
        }

        self.state.set(VideoState::Active(output));
        Ok(())
    }

    fn disable(&self) -> Result<(), ErrorCode> {
        if self.state.get() == VideoState::Disabled {
            return Ok(());
        }
        self.state.set(VideoState::Disabling);

        self.packet_ram().clear();
        phy::disable(&self.regs, self.variant);
        self.regs.modify(Reg::VidCtl, VID_CTL::ENABLE::CLEAR);
        let released = self.sequencer.power_off(&self.warnings);

        self.mode.set(None);
        self.state.set(VideoState::Disabled);
        released
    }
}

#[cfg(test)]
mod tests {
    use kernel::hil::display::SinkInfo;

    use super::*;
    use crate::hdmi::fakes::{hdmi_sink, mode_1080p60, Rig};
    use crate::hdmi::infoframe::{InfoframeType, PACKET_STRIDE};
    use crate::hdmi::registers::Block;
    use crate::hdmi::variant::{BCM2711_HDMI0, BCM2835_HDMI};

    const VID_CTL_RUNNING: u32 = (1 << 31) | (1 << 30) | (1 << 29);

    fn dvi_sink() -> SinkInfo {
        SinkInfo {
            hdmi_monitor: false,
            ..hdmi_sink(0)
        }
    }

    #[test]
    fn hdmi_enable_runs_the_full_sequence() {
        let rig = Rig::new(&BCM2711_HDMI0);
        let hdmi = rig.connected(hdmi_sink(0x0b));

        assert_eq!(hdmi.enable(&mode_1080p60()), Ok(()));
        assert_eq!(hdmi.video_state(), VideoState::Active(OutputMode::Hdmi));
        assert!(hdmi.limited_rgb_range());
        assert_eq!(hdmi.warnings().count(), 0);

        assert_eq!(rig.regs.get(Reg::VidCtl) & VID_CTL_RUNNING, VID_CTL_RUNNING);
        // MODE_HDMI, HDMI_ACTIVE, VERT_ALWAYS_KEEPOUT, IGNORE_VSYNC, MANUAL_FORMAT
        assert_eq!(
            rig.regs.get(Reg::SchedulerControl),
            (1 << 15) | (1 << 5) | (1 << 3) | (1 << 1) | 1
        );
        // RAM on, AVI and SPD slots sending.
        assert_eq!(rig.regs.get(Reg::RamPacketConfig), (1 << 16) | (1 << 2) | (1 << 3));
        assert_eq!(rig.regs.writes_to(Reg::FifoCtl), vec![1, 1, 0x41, 1, 0x41]);
        assert_eq!(rig.regs.get(Reg::CscCtl), 0x07);

        let avi = InfoframeType::Avi.slot() as usize * PACKET_STRIDE;
        assert_eq!(rig.regs.get_at(Block::Ram, avi), 0x000d_0282);

        assert_eq!(rig.power.refs(), 1);
        assert_eq!(rig.pixel.enable_count(), 1);
        assert_eq!(rig.hsm.enable_count(), 1);
        assert_eq!(hdmi.current_mode(), Some(mode_1080p60()));
    }

    #[test]
    fn dvi_sink_gets_no_data_islands() {
        let rig = Rig::new(&BCM2835_HDMI);
        let hdmi = rig.connected(dvi_sink());

        assert_eq!(hdmi.enable(&mode_1080p60()), Ok(()));
        assert_eq!(hdmi.video_state(), VideoState::Active(OutputMode::Dvi));
        assert!(!hdmi.limited_rgb_range());
        assert_eq!(rig.regs.get(Reg::SchedulerControl) & 0b11, 0);
        assert_eq!(rig.regs.get(Reg::RamPacketConfig), 0);
        assert!(rig.regs.writes_to(Reg::RamPacketStart).is_empty());
        // Full range: the legacy converter is bypassed.
        assert_eq!(rig.regs.get(Reg::CscCtl), 5 << 5);
    }

    #[test]
    fn disable_releases_everything() {
        let rig = Rig::new(&BCM2835_HDMI);
        let hdmi = rig.connected(hdmi_sink(0x01));
        hdmi.enable(&mode_1080p60()).unwrap();

        assert_eq!(hdmi.disable(), Ok(()));
        assert_eq!(hdmi.video_state(), VideoState::Disabled);
        assert_eq!(rig.regs.get(Reg::RamPacketConfig), 0);
        assert_eq!(rig.regs.get(Reg::VidCtl) & (1 << 31), 0);
        assert_eq!(rig.regs.get(Reg::TxPhyResetCtl), 0xf << 16);
        assert_eq!(rig.power.refs(), 0);
        assert_eq!(rig.pixel.enable_count(), 0);
        assert_eq!(rig.hsm.enable_count(), 0);
        assert_eq!(hdmi.current_mode(), None);

        // A second disable does nothing.
        rig.regs.clear_log();
        assert_eq!(hdmi.disable(), Ok(()));
        assert!(rig.regs.write_log().is_empty());
    }

    #[test]
    fn timeouts_are_warnings() {
        let rig = Rig::new(&BCM2711_HDMI0);
        let hdmi = rig.connected(hdmi_sink(0x01));
        rig.regs.set_scheduler_ack(false);
        rig.regs.set_recenter_ack(false);

        assert_eq!(hdmi.enable(&mode_1080p60()), Ok(()));
        assert_eq!(hdmi.video_state(), VideoState::Active(OutputMode::Hdmi));
        assert_eq!(hdmi.warnings().count(), 2);
        assert_eq!(hdmi.warnings().last(), Some(Warning::RecenterTimeout));
    }

    #[test]
    fn clock_failure_leaves_output_disabled() {
        let rig = Rig::new(&BCM2711_HDMI0);
        let hdmi = rig.connected(hdmi_sink(0x01));
        rig.hsm.fail_set_rate(Some(ErrorCode::INVAL));
        rig.regs.clear_log();

        assert_eq!(hdmi.enable(&mode_1080p60()), Err(ErrorCode::INVAL));
        assert_eq!(hdmi.video_state(), VideoState::Disabled);
        assert!(rig.regs.write_log().is_empty());
        assert_eq!(rig.power.refs(), 0);
        assert_eq!(rig.pixel.enable_count(), 0);
        assert_eq!(hdmi.disable(), Ok(()));
    }

    #[test]
    fn enable_twice_is_rejected() {
        let rig = Rig::new(&BCM2835_HDMI);
        let hdmi = rig.connected(hdmi_sink(0x01));
        hdmi.enable(&mode_1080p60()).unwrap();
        assert_eq!(hdmi.enable(&mode_1080p60()), Err(ErrorCode::ALREADY));
        assert_eq!(rig.power.refs(), 1);
    }

    #[test]
    fn pixel_clock_limit_follows_variant() {
        let mut mode = mode_1080p60();
        mode.clock = 297_000;
        let legacy = Rig::new(&BCM2835_HDMI);
        assert_eq!(legacy.hdmi().mode_valid(&mode), ModeStatus::ClockHigh);
        assert_eq!(legacy.hdmi().mode_valid(&mode_1080p60()), ModeStatus::Ok);
        let current = Rig::new(&BCM2711_HDMI0);
        assert_eq!(current.hdmi().mode_valid(&mode), ModeStatus::Ok);
        mode.clock = 297_001;
        assert_eq!(current.hdmi().mode_valid(&mode), ModeStatus::ClockHigh);
    }
}
