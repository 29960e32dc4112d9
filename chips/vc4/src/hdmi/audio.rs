// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Audio path through the MAI (multichannel audio interface).
//!
//! A single PCM stream at a time is fed into `MAI_DATA` by DMA. Before
//! samples flow, `prepare` programs the MAI sample clock divider, the sample
//! format and channel routing, and the N/CTS values the sink uses to recover
//! the audio clock. `trigger` starts and stops the MAI and keeps the audio
//! infoframe in step.
//!
//! Audio is only offered while the video output runs in HDMI mode: the DVI
//! scheduler has no data islands to carry samples in.

use core::cell::Cell;

use kernel::debug;
use kernel::hil::audio::{
    AudioControls, ChannelPosition, DigitalAudioInterface, Eld, PcmConstraints, PcmParams,
    RateSet, StreamId, TriggerCommand, IEC958_AES0_CON_NOT_COPYRIGHT, IEC958_AES0_NONAUDIO,
    IEC958_AES1_CON_ORIGINAL, IEC958_AES1_CON_PCM_CODER, IEC958_AES3_CON_FS_48000,
    IEC958_STATUS_BYTES, MAX_CHANNELS, TLV_TYPE_CHMAP_FIXED, TLV_TYPE_CONTAINER,
};
use kernel::hil::time::Time;
use kernel::utilities::cells::OptionalCell;
use kernel::utilities::math;
use kernel::ErrorCode;

use super::infoframe::InfoframeType;
use super::phy;
use super::registers::{
    Reg, RegisterIo, AUDIO_PACKET_CONFIG, CRP_CFG, MAI_CONFIG, MAI_CTL, MAI_FMT, MAI_SMP, MAI_THR,
};
use super::speaker::{self, ChannelMapTable};
use super::video::{OutputMode, VideoState};
use super::Hdmi;

const PLAYBACK_CHANNELS_MIN: u8 = 2;
const PLAYBACK_CHANNELS_MAX: u8 = MAX_CHANNELS as u8;
const PLAYBACK_RATES: [u32; 7] = [32000, 44100, 48000, 88200, 96000, 176400, 192000];

/// Largest values of the `MAI_SMP` divider fields.
const MAI_SMP_N_MAX: u64 = (1 << 24) - 1;
const MAI_SMP_M_MAX: u64 = 1 << 8;

/// DREQ and panic thresholds of the MAI FIFO.
const MAI_FIFO_THRESHOLD: u32 = 0x10;

/// IEC958 preamble marking the start of a block.
const B_FRAME_PREAMBLE: u32 = 8;

const IEC958_DEFAULT_STATUS: [u8; IEC958_STATUS_BYTES] = [
    IEC958_AES0_CON_NOT_COPYRIGHT,
    IEC958_AES1_CON_ORIGINAL | IEC958_AES1_CON_PCM_CODER,
    0,
    IEC958_AES3_CON_FS_48000,
];

/// `MAI_FMT` sample rate code, 0 ("not indicated") for unlisted rates.
pub fn mai_sample_rate_code(rate: u32) -> u32 {
    match rate {
        8000 => 1,
        11025 => 2,
        12000 => 3,
        16000 => 4,
        22050 => 5,
        24000 => 6,
        32000 => 7,
        44100 => 8,
        48000 => 9,
        64000 => 10,
        88200 => 11,
        96000 => 12,
        128000 => 13,
        176400 => 14,
        192000 => 15,
        _ => 0,
    }
}

/// N and CTS of the audio clock regeneration packet for a mode clocked at
/// `pixel_clock` Hz.
pub fn n_cts(pixel_clock: u64, rate: u32) -> (u32, u32) {
    let n = 128 * rate / 1000;
    let cts = pixel_clock * u64::from(n) / (128 * u64::from(rate));
    (n, cts as u32)
}

/// Per-device audio state.
pub struct AudioState {
    stream: Cell<Option<StreamId>>,
    channels: Cell<u8>,
    rate: Cell<u32>,
    iec958: Cell<[u8; IEC958_STATUS_BYTES]>,
    streaming: Cell<bool>,
    chmap_table: OptionalCell<ChannelMapTable>,
    /// CEA channel allocation of the prepared stream. `None` when no entry
    /// fits the sink's speakers.
    channel_allocation: Cell<Option<u8>>,
}

impl AudioState {
    pub fn new() -> AudioState {
        AudioState {
            stream: Cell::new(None),
            channels: Cell::new(PLAYBACK_CHANNELS_MIN),
            rate: Cell::new(48000),
            iec958: Cell::new(IEC958_DEFAULT_STATUS),
            streaming: Cell::new(false),
            chmap_table: OptionalCell::empty(),
            channel_allocation: Cell::new(Some(0)),
        }
    }

    pub fn channels(&self) -> u8 {
        self.channels.get()
    }

    pub fn rate(&self) -> u32 {
        self.rate.get()
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.get()
    }

    pub fn channel_allocation(&self) -> Option<u8> {
        self.channel_allocation.get()
    }

    pub fn active_stream(&self) -> Option<StreamId> {
        self.stream.get()
    }

    fn is_active(&self, stream: StreamId) -> bool {
        self.stream.get() == Some(stream)
    }
}

impl Default for AudioState {
    fn default() -> Self {
        Self::new()
    }
}

impl<IO: RegisterIo, T: Time> Hdmi<'_, IO, T> {
    /// Whether the link can carry audio right now.
    fn audio_can_stream(&self) -> bool {
        self.state.get() == VideoState::Active(OutputMode::Hdmi) && self.packet_ram().is_enabled()
    }

    /// Stop the MAI and the audio infoframe and release the stream.
    fn audio_reset(&self) {
        self.audio.streaming.set(false);
        if let Err(err) = self.packet_ram().stop(InfoframeType::Audio) {
            debug!("vc4-hdmi: failed to stop audio infoframe: {:?}", err);
        }

        self.regs.write_fields(Reg::MaiCtl, MAI_CTL::RESET::SET);
        self.regs.write_fields(Reg::MaiCtl, MAI_CTL::ERRORF::SET);
        self.regs.write_fields(Reg::MaiCtl, MAI_CTL::FLUSH::SET);
        self.audio.stream.set(None);
    }

    /// Program the clock regeneration packet for the current mode.
    ///
    /// CTS counts the mode clock, not the link rate, so pixel repetition
    /// does not scale it.
    fn set_n_cts(&self, rate: u32) -> Result<(), ErrorCode> {
        let mode = self.mode.get().ok_or(ErrorCode::NODEVICE)?;
        let (n, cts) = n_cts(u64::from(mode.clock) * 1000, rate);

        self.regs.write_fields(
            Reg::CrpCfg,
            CRP_CFG::EXTERNAL_CTS_EN::SET + CRP_CFG::N.val(n),
        );
        self.regs.write(Reg::Cts0, cts);
        self.regs.write(Reg::Cts1, cts);
        Ok(())
    }

    fn set_mai_clock(&self, rate: u32) {
        let hsm = self.variant.audio_hsm_clock(self.sequencer.hsm_clock());
        let (n, m) = math::best_rational_approximation(
            u64::from(hsm),
            u64::from(rate),
            MAI_SMP_N_MAX,
            MAI_SMP_M_MAX,
        );
        self.regs.write_fields(
            Reg::MaiSmp,
            MAI_SMP::N.val(n as u32) + MAI_SMP::M.val(m.saturating_sub(1) as u32),
        );
    }
}

impl<IO: RegisterIo, T: Time> DigitalAudioInterface for Hdmi<'_, IO, T> {
    fn startup(&self, stream: StreamId) -> Result<PcmConstraints, ErrorCode> {
        if self.audio.stream.get().is_some_and(|active| active != stream) {
            return Err(ErrorCode::BUSY);
        }
        if !self.audio_can_stream() {
            return Err(ErrorCode::NODEVICE);
        }

        let eld = self.sink.get().eld;
        self.audio
            .chmap_table
            .set(ChannelMapTable::for_eld_allocation(eld.speaker_allocation()));
        self.audio.stream.set(Some(stream));

        Ok(eld.pcm_constraints(PcmConstraints {
            channels_min: PLAYBACK_CHANNELS_MIN,
            channels_max: PLAYBACK_CHANNELS_MAX,
            rates: RateSet::from_rates(&PLAYBACK_RATES),
        }))
    }

    fn prepare(&self, stream: StreamId, params: &PcmParams) -> Result<(), ErrorCode> {
        if !self.audio.is_active(stream) {
            return Err(ErrorCode::INVAL);
        }
        if params.channels == 0 || params.channels > PLAYBACK_CHANNELS_MAX {
            return Err(ErrorCode::INVAL);
        }
        if !self.audio_can_stream() {
            return Err(ErrorCode::NODEVICE);
        }

        let channels = params.channels;
        let rate = params.rate;
        self.audio.channels.set(channels);
        self.audio.rate.set(rate);

        self.regs.write_fields(
            Reg::MaiCtl,
            MAI_CTL::RESET::SET
                + MAI_CTL::FLUSH::SET
                + MAI_CTL::DLATE::SET
                + MAI_CTL::ERRORE::SET
                + MAI_CTL::ERRORF::SET,
        );

        self.set_mai_clock(rate);

        let hbr = self.audio.iec958.get()[0] & IEC958_AES0_NONAUDIO != 0
            && channels == PLAYBACK_CHANNELS_MAX;
        let format = if hbr {
            MAI_FMT::AUDIO_FORMAT::HBR
        } else {
            MAI_FMT::AUDIO_FORMAT::PCM
        };
        self.regs.write_fields(
            Reg::MaiFmt,
            MAI_FMT::SAMPLE_RATE.val(mai_sample_rate_code(rate)) + format,
        );

        let channel_mask = (1u32 << channels) - 1;
        self.regs.write_fields(
            Reg::MaiThr,
            MAI_THR::PANICHIGH.val(MAI_FIFO_THRESHOLD)
                + MAI_THR::PANICLOW.val(MAI_FIFO_THRESHOLD)
                + MAI_THR::DREQHIGH.val(MAI_FIFO_THRESHOLD)
                + MAI_THR::DREQLOW.val(MAI_FIFO_THRESHOLD),
        );
        self.regs.write_fields(
            Reg::MaiConfig,
            MAI_CONFIG::BIT_REVERSE::SET
                + MAI_CONFIG::FORMAT_REVERSE::SET
                + MAI_CONFIG::CHANNEL_MASK.val(channel_mask),
        );
        self.regs
            .write(Reg::MaiChannelMap, self.variant.channel_map(channel_mask));
        self.regs.write_fields(
            Reg::AudioPacketConfig,
            AUDIO_PACKET_CONFIG::ZERO_DATA_ON_SAMPLE_FLAT::SET
                + AUDIO_PACKET_CONFIG::ZERO_DATA_ON_INACTIVE_CHANNELS::SET
                + AUDIO_PACKET_CONFIG::B_FRAME_IDENTIFIER.val(B_FRAME_PREAMBLE)
                + AUDIO_PACKET_CONFIG::CEA_MASK.val(channel_mask),
        );
        self.set_n_cts(rate)?;

        let speakers = self.sink.get().eld.speaker_allocation();
        match speaker::channel_allocation(speakers, channels) {
            Some(allocation) => self.audio.channel_allocation.set(Some(allocation.ca_id)),
            None => {
                debug!(
                    "vc4-hdmi: no speaker layout for {} channels on {:#x}",
                    channels, speakers
                );
                self.audio.channel_allocation.set(None);
            }
        }
        Ok(())
    }

    fn trigger(&self, stream: StreamId, cmd: TriggerCommand) -> Result<(), ErrorCode> {
        if !self.audio.is_active(stream) {
            return Err(ErrorCode::INVAL);
        }

        match cmd {
            TriggerCommand::Start | TriggerCommand::Resume | TriggerCommand::PauseRelease => {
                // A stuck slot is already in the warning log.
                let _ = self.write_audio_infoframe();
                self.audio.streaming.set(true);
                phy::rng_enable(&self.regs, self.variant);
                self.regs.write_fields(
                    Reg::MaiCtl,
                    MAI_CTL::CHNUM.val(u32::from(self.audio.channels()))
                        + MAI_CTL::WHOLSMP::SET
                        + MAI_CTL::CHALIGN::SET
                        + MAI_CTL::ENABLE::SET,
                );
            }
            TriggerCommand::Stop | TriggerCommand::Suspend | TriggerCommand::PausePush => {
                self.regs.write_fields(
                    Reg::MaiCtl,
                    MAI_CTL::DLATE::SET + MAI_CTL::ERRORE::SET + MAI_CTL::ERRORF::SET,
                );
                phy::rng_disable(&self.regs, self.variant);
                self.audio.streaming.set(false);
            }
        }
        Ok(())
    }

    fn shutdown(&self, stream: StreamId) {
        if !self.audio.is_active(stream) {
            return;
        }
        self.audio_reset();
    }
}

impl<IO: RegisterIo, T: Time> AudioControls for Hdmi<'_, IO, T> {
    fn eld(&self) -> Eld {
        self.sink.get().eld
    }

    fn iec958_status(&self) -> [u8; IEC958_STATUS_BYTES] {
        self.audio.iec958.get()
    }

    fn set_iec958_status(&self, status: [u8; IEC958_STATUS_BYTES]) {
        self.audio.iec958.set(status);
    }

    fn channel_map_count(&self) -> usize {
        MAX_CHANNELS
    }

    fn channel_map(&self) -> Result<[ChannelPosition; MAX_CHANNELS], ErrorCode> {
        let allocation = self.audio.channel_allocation();
        self.audio.chmap_table.map_or(Err(ErrorCode::INVAL), |table| {
            Ok(allocation
                .and_then(|ca| table.map_for(ca))
                .map_or([ChannelPosition::Unknown; MAX_CHANNELS], |map| {
                    map.positions
                }))
        })
    }

    fn channel_map_tlv(&self, buf: &mut [u32]) -> Result<usize, ErrorCode> {
        let table = self
            .audio
            .chmap_table
            .map_or(Err(ErrorCode::INVAL), Ok)?;
        if buf.len() < 2 {
            return Err(ErrorCode::NOMEM);
        }

        let mut pos = 2;
        for map in table.maps() {
            let channels = usize::from(map.channels);
            let entry = buf
                .get_mut(pos..pos + 2 + channels)
                .ok_or(ErrorCode::NOMEM)?;
            entry[0] = TLV_TYPE_CHMAP_FIXED;
            entry[1] = (channels * 4) as u32;
            for (word, position) in entry[2..].iter_mut().zip(&map.positions) {
                *word = *position as u32;
            }
            pos += 2 + channels;
        }

        buf[0] = TLV_TYPE_CONTAINER;
        buf[1] = ((pos - 2) * 4) as u32;
        Ok(pos)
    }
}
