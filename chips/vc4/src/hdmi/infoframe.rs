// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! CTA-861 infoframes.
//!
//! Building and packing an infoframe touches no hardware. A packed frame is
//! a four byte header (type, version, length, checksum) followed by the
//! payload, and the checksum makes all bytes sum to zero. [`Packed::ram_words`]
//! gives the words the packet RAM expects.

use kernel::hil::display::{DisplayMode, PictureAspect, QuantizationRange, SinkInfo, TvMargins};
use kernel::ErrorCode;

/// Bytes between two packet RAM slots.
pub const PACKET_STRIDE: usize = 0x24;

const HEADER_SIZE: usize = 4;

/// Bytes taken from the frame per pair of RAM words.
const RAM_CHUNK: usize = 7;

/// Room for a full stride rounded up to whole chunks.
const PACK_BUFFER: usize = PACKET_STRIDE.div_ceil(RAM_CHUNK) * RAM_CHUNK;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfoframeType {
    Avi = 0x82,
    Spd = 0x83,
    Audio = 0x84,
}

impl InfoframeType {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Packet RAM slot of this frame type.
    pub const fn slot(self) -> u8 {
        self as u8 - 0x80
    }

    const fn version(self) -> u8 {
        match self {
            InfoframeType::Avi => 2,
            InfoframeType::Spd | InfoframeType::Audio => 1,
        }
    }

    const fn payload_len(self) -> usize {
        match self {
            InfoframeType::Avi => 13,
            InfoframeType::Spd => 25,
            InfoframeType::Audio => 10,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum YccQuantizationRange {
    #[default]
    Limited = 0,
    Full = 1,
}

/// Auxiliary video information.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AviInfoframe {
    /// Always RGB (0) for this encoder.
    pub colorspace: u8,
    pub scan_mode: u8,
    pub picture_aspect: PictureAspect,
    /// Active format description, 8 is "same as picture".
    pub active_aspect: u8,
    pub quantization_range: QuantizationRange,
    pub ycc_quantization_range: YccQuantizationRange,
    pub vic: u8,
    /// Number of times each pixel is repeated, minus one.
    pub pixel_repeat: u8,
    pub top_bar: u16,
    pub bottom_bar: u16,
    pub left_bar: u16,
    pub right_bar: u16,
}

const ACTIVE_ASPECT_PICTURE: u8 = 8;

impl AviInfoframe {
    /// AVI content for `mode` sent to `sink`. `limited` is the RGB range the
    /// output actually uses; `margins` become the bar info.
    pub fn from_mode(
        mode: &DisplayMode,
        sink: &SinkInfo,
        limited: bool,
        margins: TvMargins,
    ) -> AviInfoframe {
        let range = if limited {
            QuantizationRange::Limited
        } else {
            QuantizationRange::Full
        };
        // The Q field is only sent when the sink reads it or when it matches
        // what the sink assumes anyway.
        let quantization_range =
            if sink.rgb_quant_range_selectable || range == mode.default_rgb_quant_range() {
                range
            } else {
                QuantizationRange::Default
            };
        let ycc_quantization_range = if sink.hdmi2 && range == QuantizationRange::Full {
            YccQuantizationRange::Full
        } else {
            YccQuantizationRange::Limited
        };
        // The AVI picture aspect field only has room for 4:3 and 16:9.
        let picture_aspect = match mode.picture_aspect {
            PictureAspect::Aspect4x3 | PictureAspect::Aspect16x9 => mode.picture_aspect,
            _ => PictureAspect::None,
        };

        AviInfoframe {
            colorspace: 0,
            scan_mode: 0,
            picture_aspect,
            active_aspect: ACTIVE_ASPECT_PICTURE,
            quantization_range,
            ycc_quantization_range,
            vic: mode.vic,
            pixel_repeat: mode.is_double_clocked() as u8,
            top_bar: margins.top,
            bottom_bar: margins.bottom,
            left_bar: margins.left,
            right_bar: margins.right,
        }
    }

    fn payload(&self, out: &mut [u8]) {
        let mut pb1 = (self.colorspace & 0x3) << 5 | (self.scan_mode & 0x3);
        if self.active_aspect & 0xf != 0 {
            pb1 |= 1 << 4;
        }
        if self.top_bar != 0 || self.bottom_bar != 0 {
            pb1 |= 1 << 3;
        }
        if self.left_bar != 0 || self.right_bar != 0 {
            pb1 |= 1 << 2;
        }
        out[0] = pb1;
        out[1] = ((self.picture_aspect as u8) & 0x3) << 4 | (self.active_aspect & 0xf);
        out[2] = (self.quantization_range as u8 & 0x3) << 2;
        out[3] = self.vic & 0x7f;
        out[4] = (self.ycc_quantization_range as u8) << 6 | (self.pixel_repeat & 0xf);
        out[5..7].copy_from_slice(&self.top_bar.to_le_bytes());
        out[7..9].copy_from_slice(&self.bottom_bar.to_le_bytes());
        out[9..11].copy_from_slice(&self.left_bar.to_le_bytes());
        out[11..13].copy_from_slice(&self.right_bar.to_le_bytes());
    }
}

/// Source product description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpdInfoframe {
    pub vendor: [u8; 8],
    pub product: [u8; 16],
    /// Source device information, 0x09 is "PC general".
    pub sdi: u8,
}

pub const SPD_SDI_PC: u8 = 0x09;

impl SpdInfoframe {
    /// Names longer than their field are cut short.
    pub fn new(vendor: &str, product: &str, sdi: u8) -> SpdInfoframe {
        fn copy<const N: usize>(s: &str) -> [u8; N] {
            let mut out = [0; N];
            let len = s.len().min(N);
            out[..len].copy_from_slice(&s.as_bytes()[..len]);
            out
        }
        SpdInfoframe {
            vendor: copy(vendor),
            product: copy(product),
            sdi,
        }
    }

    fn payload(&self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.vendor);
        out[8..24].copy_from_slice(&self.product);
        out[24] = self.sdi;
    }
}

/// Audio description. Coding type, sample rate and sample size are left to
/// the stream headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AudioInfoframe {
    pub channels: u8,
    /// CEA channel allocation (CA) value.
    pub channel_allocation: u8,
}

impl AudioInfoframe {
    fn payload(&self, out: &mut [u8]) {
        // Coding type, frequency and size all 0: refer to stream header.
        out[0] = if self.channels >= 2 {
            (self.channels - 1) & 0x7
        } else {
            0
        };
        out[3] = self.channel_allocation;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Infoframe {
    Avi(AviInfoframe),
    Spd(SpdInfoframe),
    Audio(AudioInfoframe),
}

impl Infoframe {
    pub fn kind(&self) -> InfoframeType {
        match self {
            Infoframe::Avi(_) => InfoframeType::Avi,
            Infoframe::Spd(_) => InfoframeType::Spd,
            Infoframe::Audio(_) => InfoframeType::Audio,
        }
    }

    /// Serialize the frame with its checksum. Fails with `SIZE` if it would
    /// not fit a packet RAM slot.
    pub fn pack(&self) -> Result<Packed, ErrorCode> {
        let kind = self.kind();
        let len = HEADER_SIZE + kind.payload_len();
        if len > PACKET_STRIDE {
            return Err(ErrorCode::SIZE);
        }

        let mut bytes = [0; PACK_BUFFER];
        bytes[0] = kind.code();
        bytes[1] = kind.version();
        bytes[2] = kind.payload_len() as u8;
        let payload = &mut bytes[HEADER_SIZE..len];
        match self {
            Infoframe::Avi(avi) => avi.payload(payload),
            Infoframe::Spd(spd) => spd.payload(payload),
            Infoframe::Audio(audio) => audio.payload(payload),
        }
        let sum = bytes[..len].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        bytes[3] = 0u8.wrapping_sub(sum);

        Ok(Packed { bytes, len })
    }
}

/// A serialized infoframe, zero padded to whole RAM chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packed {
    bytes: [u8; PACK_BUFFER],
    len: usize,
}

impl Packed {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Words to store in the packet RAM slot, in order.
    ///
    /// The RAM takes seven frame bytes per pair of words: three in the low
    /// bytes of the first word and four in the second.
    pub fn ram_words(&self) -> impl Iterator<Item = u32> + '_ {
        let chunks = self.len.div_ceil(RAM_CHUNK);
        self.bytes[..chunks * RAM_CHUNK]
            .chunks_exact(RAM_CHUNK)
            .flat_map(|c| {
                [
                    u32::from_le_bytes([c[0], c[1], c[2], 0]),
                    u32::from_le_bytes([c[3], c[4], c[5], c[6]]),
                ]
            })
    }
}
