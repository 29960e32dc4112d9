// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! CEA-861 speaker allocation.
//!
//! The sink reports which speakers it has in the ELD. An audio stream with a
//! given channel count is placed on those speakers using the first entry of
//! [`CHANNEL_ALLOCATIONS`] that needs no speaker the sink lacks. The table is
//! ordered so that the most common layout for a channel count comes first.

use kernel::hil::audio::ChannelPosition::{FC, FL, FLC, FR, FRC, LFE, NA, RC, RL, RLC, RR, RRC};
use kernel::hil::audio::{ChannelPosition, MAX_CHANNELS};

use self::SpeakerMask as S;

/// A set of speakers, one bit per position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpeakerMask(u16);

impl SpeakerMask {
    pub const FL: SpeakerMask = SpeakerMask(1 << 0);
    pub const FC: SpeakerMask = SpeakerMask(1 << 1);
    pub const FR: SpeakerMask = SpeakerMask(1 << 2);
    pub const FLC: SpeakerMask = SpeakerMask(1 << 3);
    pub const FRC: SpeakerMask = SpeakerMask(1 << 4);
    pub const RL: SpeakerMask = SpeakerMask(1 << 5);
    pub const RC: SpeakerMask = SpeakerMask(1 << 6);
    pub const RR: SpeakerMask = SpeakerMask(1 << 7);
    pub const RLC: SpeakerMask = SpeakerMask(1 << 8);
    pub const RRC: SpeakerMask = SpeakerMask(1 << 9);
    pub const LFE: SpeakerMask = SpeakerMask(1 << 10);

    pub const fn empty() -> SpeakerMask {
        SpeakerMask(0)
    }

    pub const fn union(self, other: SpeakerMask) -> SpeakerMask {
        SpeakerMask(self.0 | other.0)
    }

    pub const fn contains(self, other: SpeakerMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Speakers described by the ELD speaker allocation byte.
    pub fn from_eld_allocation(allocation: u8) -> SpeakerMask {
        ELD_SPEAKER_BITS
            .iter()
            .enumerate()
            .filter(|(bit, _)| allocation & (1 << bit) != 0)
            .fold(SpeakerMask::empty(), |mask, (_, speakers)| {
                mask.union(*speakers)
            })
    }
}

/// Speakers behind each bit of the ELD speaker allocation byte.
const ELD_SPEAKER_BITS: [SpeakerMask; 7] = [
    SpeakerMask::FL.union(SpeakerMask::FR),
    SpeakerMask::LFE,
    SpeakerMask::FC,
    SpeakerMask::RL.union(SpeakerMask::RR),
    SpeakerMask::RC,
    SpeakerMask::FLC.union(SpeakerMask::FRC),
    SpeakerMask::RLC.union(SpeakerMask::RRC),
];

/// One CEA channel allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelAllocation {
    /// Value of the CA field of the audio infoframe.
    pub ca_id: u8,
    pub channels: u8,
    pub speakers: SpeakerMask,
}

/// Build a mask at compile time from a list of speakers.
const fn mask(speakers: &[SpeakerMask]) -> SpeakerMask {
    let mut m = SpeakerMask::empty();
    let mut i = 0;
    while i < speakers.len() {
        m = m.union(speakers[i]);
        i += 1;
    }
    m
}

const fn ca(ca_id: u8, channels: u8, speakers: &[SpeakerMask]) -> ChannelAllocation {
    ChannelAllocation {
        ca_id,
        channels,
        speakers: mask(speakers),
    }
}

/// Allocations in lookup order.
pub static CHANNEL_ALLOCATIONS: [ChannelAllocation; 32] = [
    ca(0x00, 2, &[S::FL, S::FR]),
    // 2.1
    ca(0x01, 4, &[S::FL, S::FR, S::LFE]),
    // Dolby Surround
    ca(0x02, 4, &[S::FL, S::FR, S::FC]),
    // surround51
    ca(0x0b, 6, &[S::FL, S::FR, S::LFE, S::FC, S::RL, S::RR]),
    // surround40
    ca(0x08, 6, &[S::FL, S::FR, S::RL, S::RR]),
    // surround41
    ca(0x09, 6, &[S::FL, S::FR, S::LFE, S::RL, S::RR]),
    // surround50
    ca(0x0a, 6, &[S::FL, S::FR, S::FC, S::RL, S::RR]),
    // 6.1
    ca(0x0f, 8, &[S::FL, S::FR, S::LFE, S::FC, S::RL, S::RR, S::RC]),
    // surround71
    ca(0x13, 8, &[S::FL, S::FR, S::LFE, S::FC, S::RL, S::RR, S::RLC, S::RRC]),
    ca(0x03, 8, &[S::FL, S::FR, S::LFE, S::FC]),
    ca(0x04, 8, &[S::FL, S::FR, S::RC]),
    ca(0x05, 8, &[S::FL, S::FR, S::LFE, S::RC]),
    ca(0x06, 8, &[S::FL, S::FR, S::FC, S::RC]),
    ca(0x07, 8, &[S::FL, S::FR, S::LFE, S::FC, S::RC]),
    ca(0x0c, 8, &[S::FL, S::FR, S::RC, S::RL, S::RR]),
    ca(0x0d, 8, &[S::FL, S::FR, S::LFE, S::RL, S::RR, S::RC]),
    ca(0x0e, 8, &[S::FL, S::FR, S::FC, S::RL, S::RR, S::RC]),
    ca(0x10, 8, &[S::FL, S::FR, S::RL, S::RR, S::RLC, S::RRC]),
    ca(0x11, 8, &[S::FL, S::FR, S::LFE, S::RL, S::RR, S::RLC, S::RRC]),
    ca(0x12, 8, &[S::FL, S::FR, S::FC, S::RL, S::RR, S::RLC, S::RRC]),
    ca(0x14, 8, &[S::FL, S::FR, S::FLC, S::FRC]),
    ca(0x15, 8, &[S::FL, S::FR, S::LFE, S::FLC, S::FRC]),
    ca(0x16, 8, &[S::FL, S::FR, S::FC, S::FLC, S::FRC]),
    ca(0x17, 8, &[S::FL, S::FR, S::LFE, S::FC, S::FLC, S::FRC]),
    ca(0x18, 8, &[S::FL, S::FR, S::RC, S::FLC, S::FRC]),
    ca(0x19, 8, &[S::FL, S::FR, S::LFE, S::RC, S::FLC, S::FRC]),
    ca(0x1a, 8, &[S::FL, S::FR, S::RC, S::FC, S::FLC, S::FRC]),
    ca(0x1b, 8, &[S::FL, S::FR, S::LFE, S::RC, S::FC, S::FLC, S::FRC]),
    ca(0x1c, 8, &[S::FL, S::FR, S::RL, S::RR, S::FLC, S::FRC]),
    ca(0x1d, 8, &[S::FL, S::FR, S::LFE, S::RL, S::RR, S::FLC, S::FRC]),
    ca(0x1e, 8, &[S::FL, S::FR, S::FC, S::RL, S::RR, S::FLC, S::FRC]),
    ca(0x1f, 8, &[S::FL, S::FR, S::LFE, S::FC, S::RL, S::RR, S::FLC, S::FRC]),
];

/// Pick the allocation for `channels` channels on the speakers described by
/// the ELD speaker allocation byte `eld_allocation`.
///
/// An allocation byte of zero means no sink is connected; the stereo entry
/// is returned whatever the channel count.
pub fn channel_allocation(eld_allocation: u8, channels: u8) -> Option<&'static ChannelAllocation> {
    if eld_allocation == 0 {
        return CHANNEL_ALLOCATIONS.iter().find(|ca| ca.ca_id == 0);
    }
    let speakers = SpeakerMask::from_eld_allocation(eld_allocation);
    CHANNEL_ALLOCATIONS
        .iter()
        .filter(|ca| ca.channels == channels)
        .find(|ca| speakers.contains(ca.speakers))
}

/// A fixed channel map: the speaker each channel of the stream is sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelMap {
    pub channels: u8,
    pub positions: [ChannelPosition; MAX_CHANNELS],
}

const U: ChannelPosition = ChannelPosition::Unknown;

const fn map(channels: u8, positions: [ChannelPosition; MAX_CHANNELS]) -> ChannelMap {
    ChannelMap {
        channels,
        positions,
    }
}

static STEREO_MAPS: [ChannelMap; 1] = [map(2, [FL, FR, U, U, U, U, U, U])];

/// Maps for every CA value 0x00 to 0x1f, indexed by CA.
static EIGHT_CHANNEL_MAPS: [ChannelMap; 32] = [
    map(2, [FL, FR, U, U, U, U, U, U]),
    map(4, [FL, FR, LFE, NA, U, U, U, U]),
    map(4, [FL, FR, NA, FC, U, U, U, U]),
    map(4, [FL, FR, LFE, FC, U, U, U, U]),
    map(6, [FL, FR, NA, NA, RC, NA, U, U]),
    map(6, [FL, FR, LFE, NA, RC, NA, U, U]),
    map(6, [FL, FR, NA, FC, RC, NA, U, U]),
    map(6, [FL, FR, LFE, FC, RC, NA, U, U]),
    map(6, [FL, FR, NA, NA, RL, RR, U, U]),
    map(6, [FL, FR, LFE, NA, RL, RR, U, U]),
    map(6, [FL, FR, NA, FC, RL, RR, U, U]),
    map(6, [FL, FR, LFE, FC, RL, RR, U, U]),
    map(8, [FL, FR, NA, NA, RL, RR, RC, NA]),
    map(8, [FL, FR, LFE, NA, RL, RR, RC, NA]),
    map(8, [FL, FR, NA, FC, RL, RR, RC, NA]),
    map(8, [FL, FR, LFE, FC, RL, RR, RC, NA]),
    map(8, [FL, FR, NA, NA, RL, RR, RLC, RRC]),
    map(8, [FL, FR, LFE, NA, RL, RR, RLC, RRC]),
    map(8, [FL, FR, NA, FC, RL, RR, RLC, RRC]),
    map(8, [FL, FR, LFE, FC, RL, RR, RLC, RRC]),
    map(8, [FL, FR, NA, NA, NA, NA, FLC, FRC]),
    map(8, [FL, FR, LFE, NA, NA, NA, FLC, FRC]),
    map(8, [FL, FR, NA, FC, NA, NA, FLC, FRC]),
    map(8, [FL, FR, LFE, FC, NA, NA, FLC, FRC]),
    map(8, [FL, FR, NA, NA, NA, NA, FLC, FRC]),
    map(8, [FL, FR, LFE, NA, NA, NA, FLC, FRC]),
    map(8, [FL, FR, NA, FC, NA, NA, FLC, FRC]),
    map(8, [FL, FR, LFE, FC, NA, NA, FLC, FRC]),
    map(8, [FL, FR, NA, NA, NA, NA, FLC, FRC]),
    map(8, [FL, FR, LFE, NA, NA, NA, FLC, FRC]),
    map(8, [FL, FR, NA, FC, NA, NA, FLC, FRC]),
    map(8, [FL, FR, LFE, FC, NA, NA, FLC, FRC]),
];

/// Set of channel maps offered to the audio stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelMapTable {
    Stereo,
    EightChannel,
}

impl ChannelMapTable {
    /// Stereo unless the sink has speakers beyond front left and right.
    pub fn for_eld_allocation(eld_allocation: u8) -> ChannelMapTable {
        let front = SpeakerMask::FL.union(SpeakerMask::FR);
        if SpeakerMask::from_eld_allocation(eld_allocation).bits() & !front.bits() != 0 {
            ChannelMapTable::EightChannel
        } else {
            ChannelMapTable::Stereo
        }
    }

    pub fn maps(self) -> &'static [ChannelMap] {
        match self {
            ChannelMapTable::Stereo => &STEREO_MAPS,
            ChannelMapTable::EightChannel => &EIGHT_CHANNEL_MAPS,
        }
    }

    /// Map used for allocation `ca_id`, if this table has one.
    pub fn map_for(self, ca_id: u8) -> Option<&'static ChannelMap> {
        self.maps().get(ca_id as usize)
    }
}
