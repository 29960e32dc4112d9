// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! HDMI transmitter of the BCM2835 and BCM2711.
//!
//! One [`Hdmi`] drives one transmitter instance. It implements the display
//! [`Encoder`](kernel::hil::display::Encoder), the audio
//! [`DigitalAudioInterface`](kernel::hil::audio::DigitalAudioInterface) and
//! [`AudioControls`](kernel::hil::audio::AudioControls), and the
//! [`Cec`](kernel::hil::cec::Cec) adapter of the connector.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let regions = unsafe {
//!     MmioRegions::new()
//!         .with_window(Block::Hdmi, 0x7e90_2000, 0x600)
//!         .with_window(Block::Hd, 0x7e80_8000, 0x100)
//! };
//! let hdmi = Hdmi::new(&BCM2835_HDMI, regions, &timer, &pixel, &hsm, &power, None, &hpd);
//! hdmi.bind()?;
//! hdmi.set_client(cec_client);
//! ```
//!
//! The board routes the HDMI CEC interrupt to [`Hdmi::handle_interrupt`] and
//! services the device's deferred call from its main loop.

use core::cell::Cell;

use kernel::debug;
use kernel::hil::clock::Clock;
use kernel::hil::display::{ConnectorProbe, ConnectorStatus, DisplayMode, SinkInfo, TvMargins};
use kernel::hil::power::{PowerDomain, ResetLine};
use kernel::hil::time::Time;
use kernel::ErrorCode;

pub mod audio;
pub mod cec;
pub mod csc;
pub mod infoframe;
pub mod packet;
pub mod phy;
pub mod registers;
pub mod sequencer;
pub mod speaker;
pub mod timing;
pub mod variant;
pub mod video;
pub mod wait;

#[cfg(test)]
pub(crate) mod fakes;

pub use self::cec::IrqReturn;
pub use self::registers::{Block, MmioRegions, RegisterIo};
pub use self::variant::{Variant, BCM2711_HDMI0, BCM2711_HDMI1, BCM2835_HDMI};
pub use self::video::{OutputMode, VideoState};

use self::audio::AudioState;
use self::cec::CecState;
use self::packet::PacketRam;
use self::registers::{HdmiRegisters, Reg, HOTPLUG, M_CTL};
use self::sequencer::Sequencer;
use self::wait::WarningLog;

pub struct Hdmi<'a, IO: RegisterIo, T: Time> {
    variant: &'static Variant,
    regs: HdmiRegisters<IO>,
    time: &'a T,
    sequencer: Sequencer<'a>,
    probe: &'a dyn ConnectorProbe,

    state: Cell<VideoState>,
    mode: Cell<Option<DisplayMode>>,
    connector: Cell<ConnectorStatus>,
    sink: Cell<SinkInfo>,
    limited_rgb_range: Cell<bool>,
    margins: Cell<TvMargins>,
    warnings: WarningLog,

    audio: AudioState,
    cec: CecState<'a>,
}

impl<'a, IO: RegisterIo, T: Time> Hdmi<'a, IO, T> {
    pub fn new(
        variant: &'static Variant,
        io: IO,
        time: &'a T,
        pixel_clock: &'a dyn Clock,
        hsm_clock: &'a dyn Clock,
        power: &'a dyn PowerDomain,
        reset: Option<&'a dyn ResetLine>,
        probe: &'a dyn ConnectorProbe,
    ) -> Hdmi<'a, IO, T> {
        Hdmi {
            variant,
            regs: HdmiRegisters::new(io, variant.registers),
            time,
            sequencer: Sequencer::new(pixel_clock, hsm_clock, power, reset),
            probe,
            state: Cell::new(VideoState::Disabled),
            mode: Cell::new(None),
            connector: Cell::new(ConnectorStatus::Disconnected),
            sink: Cell::new(SinkInfo::default()),
            limited_rgb_range: Cell::new(false),
            margins: Cell::new(TvMargins::default()),
            warnings: WarningLog::new(),
            audio: AudioState::new(),
            cec: CecState::new(),
        }
    }

    /// Check the supplied resources and bring the controller into a known
    /// state: core enabled, CEC interrupts masked, CEC clock divider set.
    pub fn bind(&self) -> Result<(), ErrorCode> {
        self.regs.validate()?;
        if self.variant.needs_reset_line() && !self.sequencer.has_reset_line() {
            debug!("vc4-hdmi: {} needs a reset line", self.variant.name);
            return Err(ErrorCode::NODEVICE);
        }

        // The BCM2711 has no M_CTL and comes out of its reset line enabled.
        if self.regs.has(Reg::MCtl)
            && !self
                .regs
                .read_fields::<M_CTL::Register>(Reg::MCtl)
                .is_set(M_CTL::ENABLE)
        {
            self.regs.write_fields(Reg::MCtl, M_CTL::SW_RST::SET);
            wait::delay_us(self.time, 1);
            self.regs.write(Reg::MCtl, 0);
            self.regs.write_fields(Reg::MCtl, M_CTL::ENABLE::SET);
        }

        self.cec_init();
        Ok(())
    }

    pub fn variant(&self) -> &'static Variant {
        self.variant
    }

    pub fn registers(&self) -> &HdmiRegisters<IO> {
        &self.regs
    }

    pub fn warnings(&self) -> &WarningLog {
        &self.warnings
    }

    pub fn video_state(&self) -> VideoState {
        self.state.get()
    }

    /// Mode of the running output, if any.
    pub fn current_mode(&self) -> Option<DisplayMode> {
        self.mode.get()
    }

    pub fn connector_status(&self) -> ConnectorStatus {
        self.connector.get()
    }

    pub fn sink_info(&self) -> SinkInfo {
        self.sink.get()
    }

    /// Whether the running output squashes RGB to limited range.
    pub fn limited_rgb_range(&self) -> bool {
        self.limited_rgb_range.get()
    }

    /// Underscan margins, sent as AVI bar info on the next enable.
    pub fn set_tv_margins(&self, margins: TvMargins) {
        self.margins.set(margins);
    }

    pub fn tv_margins(&self) -> TvMargins {
        self.margins.get()
    }

    /// Poll the connector.
    ///
    /// The sink is read once per connection. Unplugging forgets it, so the
    /// ELD reads as empty until the next connection.
    pub fn detect(&self) -> ConnectorStatus {
        let mut connected = match self.probe.hotplug_gpio() {
            Some(asserted) => asserted,
            None => self.probe.ddc_probe(),
        };
        if self.regs.has(Reg::Hotplug)
            && self
                .regs
                .read_fields::<HOTPLUG::Register>(Reg::Hotplug)
                .is_set(HOTPLUG::CONNECTED)
        {
            connected = true;
        }

        let status = if connected {
            ConnectorStatus::Connected
        } else {
            ConnectorStatus::Disconnected
        };
        let previous = self.connector.replace(status);

        match status {
            ConnectorStatus::Connected if previous != ConnectorStatus::Connected => {
                if let Some(sink) = self.probe.read_sink_info() {
                    self.sink.set(sink);
                    self.cec.physical_address_changed(sink.cec_physical_address);
                }
            }
            ConnectorStatus::Connected => {}
            ConnectorStatus::Disconnected => {
                self.sink.set(SinkInfo::default());
                if previous != ConnectorStatus::Disconnected {
                    self.cec.physical_address_changed(None);
                }
            }
        }
        status
    }

    /// Offset of `MAI_DATA` in the `Hd` window, for the audio DMA target.
    pub fn audio_dma_offset(&self) -> Result<usize, ErrorCode> {
        if !self.variant.audio_available {
            return Err(ErrorCode::NODEVICE);
        }
        match self.regs.locate(Reg::MaiData) {
            Some(loc) if loc.block == Block::Hd => Ok(loc.offset),
            _ => {
                debug!("vc4-hdmi: MAI_DATA is not in the HD window");
                Err(ErrorCode::INVAL)
            }
        }
    }

    fn packet_ram(&self) -> PacketRam<'_, IO, T> {
        PacketRam::new(&self.regs, self.time, &self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use kernel::hil::cec::Cec;

    use super::fakes::{hdmi_sink, RecordingCecClient, Rig};
    use super::*;

    #[test]
    fn bind_enables_the_legacy_core() {
        let rig = Rig::new(&BCM2835_HDMI);
        let hdmi = rig.hdmi();
        assert_eq!(hdmi.bind(), Ok(()));
        assert_eq!(rig.regs.writes_to(Reg::MCtl), vec![1 << 2, 0, 1]);

        // Already enabled: left alone.
        rig.regs.clear_log();
        assert_eq!(hdmi.bind(), Ok(()));
        assert!(rig.regs.writes_to(Reg::MCtl).is_empty());
    }

    #[test]
    fn bind_checks_windows_and_reset_line() {
        let rig = Rig::new(&BCM2711_HDMI1);
        rig.regs.remove_block(Block::Intr2);
        assert_eq!(rig.hdmi().bind(), Err(ErrorCode::NODEVICE));

        let rig = Rig::new(&BCM2711_HDMI1);
        let hdmi = Hdmi::new(
            &BCM2711_HDMI1,
            &rig.regs,
            &rig.time,
            &rig.pixel,
            &rig.hsm,
            &rig.power,
            None,
            &rig.probe,
        );
        assert_eq!(hdmi.bind(), Err(ErrorCode::NODEVICE));
        assert_eq!(rig.hdmi().bind(), Ok(()));
    }

    #[test]
    fn detect_reads_the_sink_once_per_connection() {
        let rig = Rig::new(&BCM2711_HDMI0);
        let client = RecordingCecClient::default();
        let hdmi = rig.hdmi();
        hdmi.set_client(&client);
        hdmi.bind().unwrap();

        assert_eq!(hdmi.detect(), ConnectorStatus::Disconnected);
        assert!(client.addresses.borrow().is_empty());

        rig.probe.gpio.set(Some(true));
        rig.probe.sink.set(Some(hdmi_sink(0x0b)));
        assert_eq!(hdmi.detect(), ConnectorStatus::Connected);
        assert_eq!(hdmi.detect(), ConnectorStatus::Connected);
        assert_eq!(rig.probe.sink_reads(), 1);
        assert!(hdmi.sink_info().hdmi_monitor);
        assert_eq!(hdmi.sink_info().eld.speaker_allocation(), 0x0b);

        rig.probe.gpio.set(Some(false));
        assert_eq!(hdmi.detect(), ConnectorStatus::Disconnected);
        assert_eq!(hdmi.sink_info(), SinkInfo::default());
        assert_eq!(*client.addresses.borrow(), vec![Some(0x1000), None]);
    }

    #[test]
    fn hotplug_register_overrides_probes() {
        let rig = Rig::new(&BCM2835_HDMI);
        let hdmi = rig.hdmi();
        rig.probe.ddc.set(false);
        assert_eq!(hdmi.detect(), ConnectorStatus::Disconnected);
        rig.regs.set(Reg::Hotplug, 1);
        assert_eq!(hdmi.detect(), ConnectorStatus::Connected);

        // Without a GPIO the DDC probe decides.
        let rig = Rig::new(&BCM2835_HDMI);
        rig.probe.ddc.set(true);
        assert_eq!(rig.hdmi().detect(), ConnectorStatus::Connected);
    }

    #[test]
    fn audio_dma_targets_the_hd_window() {
        let rig = Rig::new(&BCM2711_HDMI1);
        assert_eq!(rig.hdmi().audio_dma_offset(), Ok(0x3c));
        let rig = Rig::new(&BCM2835_HDMI);
        assert_eq!(rig.hdmi().audio_dma_offset(), Ok(0x20));
    }
}
