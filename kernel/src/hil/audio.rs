// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces for digital audio outputs such as an HDMI audio path.
//!
//! The audio stack negotiates a PCM format with the application and then
//! drives a [`DigitalAudioInterface`] through `startup`, `prepare`,
//! `trigger` and `shutdown`, in that order. A small set of controls
//! ([`AudioControls`]) exposes the sink's ELD, the IEC958 channel status and
//! the channel map in use.

use crate::ErrorCode;

/// Size of an ELD buffer.
pub const ELD_MAX_BYTES: usize = 128;

/// Number of IEC958 channel-status bytes carried by the controls.
pub const IEC958_STATUS_BYTES: usize = 4;

/// Largest number of channels an HDMI audio stream can carry.
pub const MAX_CHANNELS: usize = 8;

/// IEC958 byte 0: the stream carries non-PCM data.
pub const IEC958_AES0_NONAUDIO: u8 = 1 << 1;
/// IEC958 byte 0 (consumer): copying permitted.
pub const IEC958_AES0_CON_NOT_COPYRIGHT: u8 = 1 << 2;
/// IEC958 byte 1 (consumer): original/commercially pre-recorded data.
pub const IEC958_AES1_CON_ORIGINAL: u8 = 1 << 7;
/// IEC958 byte 1 (consumer): category "PCM encoder/decoder".
pub const IEC958_AES1_CON_PCM_CODER: u8 = 0x02;
/// IEC958 byte 3 (consumer): 48 kHz sampling frequency.
pub const IEC958_AES3_CON_FS_48000: u8 = 0x02;

const ELD_MNL_OFFSET: usize = 4;
const ELD_SAD_COUNT_OFFSET: usize = 5;
const ELD_SPEAKER_OFFSET: usize = 7;
const ELD_BASELINE_OFFSET: usize = 20;
const SAD_FORMAT_LPCM: u8 = 1;

/// EDID-Like Data: the sink's audio capabilities, in the layout defined by
/// the HDA specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eld([u8; ELD_MAX_BYTES]);

impl Eld {
    /// An all-zero ELD, as reported when no sink is connected.
    pub const fn empty() -> Eld {
        Eld([0; ELD_MAX_BYTES])
    }

    /// Build an ELD from raw bytes. Input beyond [`ELD_MAX_BYTES`] is ignored,
    /// shorter input is zero padded.
    pub fn from_bytes(bytes: &[u8]) -> Eld {
        let mut eld = [0; ELD_MAX_BYTES];
        let len = bytes.len().min(ELD_MAX_BYTES);
        eld[..len].copy_from_slice(&bytes[..len]);
        Eld(eld)
    }

    pub fn as_bytes(&self) -> &[u8; ELD_MAX_BYTES] {
        &self.0
    }

    /// CEA speaker allocation bits (byte 7, bits 6:0).
    pub fn speaker_allocation(&self) -> u8 {
        self.0[ELD_SPEAKER_OFFSET] & 0x7f
    }

    fn monitor_name_len(&self) -> usize {
        (self.0[ELD_MNL_OFFSET] & 0x1f) as usize
    }

    pub fn sad_count(&self) -> usize {
        (self.0[ELD_SAD_COUNT_OFFSET] >> 4) as usize
    }

    /// The `index`th CEA short audio descriptor, if present and inside the
    /// buffer.
    pub fn short_audio_descriptor(&self, index: usize) -> Option<[u8; 3]> {
        if index >= self.sad_count() {
            return None;
        }
        let start = ELD_BASELINE_OFFSET + self.monitor_name_len() + 3 * index;
        self.0
            .get(start..start + 3)
            .map(|sad| [sad[0], sad[1], sad[2]])
    }

    /// PCM constraints implied by the LPCM descriptors of this ELD, clamped to
    /// what the output itself supports.
    pub fn pcm_constraints(&self, output: PcmConstraints) -> PcmConstraints {
        let mut rates = RateSet::empty();
        let mut channels_max = 0;
        for sad in (0..self.sad_count()).filter_map(|i| self.short_audio_descriptor(i)) {
            if (sad[0] >> 3) & 0xf != SAD_FORMAT_LPCM {
                continue;
            }
            channels_max = channels_max.max((sad[0] & 0x7) + 1);
            rates = rates.union(RateSet::from_sad(sad[1]));
        }
        PcmConstraints {
            channels_min: output.channels_min,
            channels_max: channels_max.clamp(output.channels_min, output.channels_max),
            rates: rates.intersection(output.rates),
        }
    }
}

/// A set of sample rates, using the bit order of a CEA short audio
/// descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateSet(u8);

impl RateSet {
    const RATES: [u32; 7] = [32000, 44100, 48000, 88200, 96000, 176400, 192000];

    pub const fn empty() -> RateSet {
        RateSet(0)
    }

    /// Rates listed in byte 1 of a short audio descriptor.
    pub const fn from_sad(byte: u8) -> RateSet {
        RateSet(byte & 0x7f)
    }

    pub fn from_rates(rates: &[u32]) -> RateSet {
        let mut bits = 0;
        for rate in rates {
            if let Some(i) = Self::RATES.iter().position(|r| r == rate) {
                bits |= 1 << i;
            }
        }
        RateSet(bits)
    }

    pub const fn union(self, other: RateSet) -> RateSet {
        RateSet(self.0 | other.0)
    }

    pub const fn intersection(self, other: RateSet) -> RateSet {
        RateSet(self.0 & other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, rate: u32) -> bool {
        Self::RATES
            .iter()
            .position(|r| *r == rate)
            .is_some_and(|i| self.0 & (1 << i) != 0)
    }
}

/// Stream parameters an output accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcmConstraints {
    pub channels_min: u8,
    pub channels_max: u8,
    pub rates: RateSet,
}

/// Identity of an open audio stream, chosen by the audio stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamId(pub u32);

/// Negotiated format of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcmParams {
    pub rate: u32,
    pub channels: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerCommand {
    Start,
    Stop,
    PausePush,
    PauseRelease,
    Suspend,
    Resume,
}

/// Speaker position of one channel, numbered as in the ALSA channel-map API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelPosition {
    #[default]
    Unknown = 0,
    /// Silent channel.
    NA = 1,
    Mono = 2,
    FL = 3,
    FR = 4,
    RL = 5,
    RR = 6,
    FC = 7,
    LFE = 8,
    SL = 9,
    SR = 10,
    RC = 11,
    FLC = 12,
    FRC = 13,
    RLC = 14,
    RRC = 15,
}

/// Highest value a [`ChannelPosition`] control may report.
pub const CHANNEL_POSITION_LAST: u8 = 36;

/// TLV type of a container of TLVs.
pub const TLV_TYPE_CONTAINER: u32 = 0;
/// TLV type of a fixed (non-reorderable) channel map.
pub const TLV_TYPE_CHMAP_FIXED: u32 = 0x101;

/// Stream control of a digital audio output.
pub trait DigitalAudioInterface {
    /// Claim the output for `stream`. Returns the constraints the stream's
    /// format must satisfy.
    fn startup(&self, stream: StreamId) -> Result<PcmConstraints, ErrorCode>;

    /// Program the output for the negotiated format.
    fn prepare(&self, stream: StreamId, params: &PcmParams) -> Result<(), ErrorCode>;

    /// Start or stop sample transfer.
    fn trigger(&self, stream: StreamId, cmd: TriggerCommand) -> Result<(), ErrorCode>;

    /// Release the output. Closing a stream that does not own the output is
    /// a no-op.
    fn shutdown(&self, stream: StreamId);
}

/// Controls exposed alongside an HDMI audio output.
pub trait AudioControls {
    /// Current ELD of the connected sink.
    fn eld(&self) -> Eld;

    fn iec958_status(&self) -> [u8; IEC958_STATUS_BYTES];

    fn set_iec958_status(&self, status: [u8; IEC958_STATUS_BYTES]);

    /// Bits of the channel status that software may change.
    fn iec958_mask(&self) -> [u8; IEC958_STATUS_BYTES] {
        [0xff; IEC958_STATUS_BYTES]
    }

    /// Number of entries reported by [`AudioControls::channel_map`].
    fn channel_map_count(&self) -> usize;

    /// Speaker position of each channel of the running stream.
    fn channel_map(&self) -> Result<[ChannelPosition; MAX_CHANNELS], ErrorCode>;

    /// Write the channel maps the output can use as a TLV container into
    /// `buf`. Returns the number of words written.
    fn channel_map_tlv(&self, buf: &mut [u32]) -> Result<usize, ErrorCode>;
}
