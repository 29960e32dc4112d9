// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces for display encoders and connectors.
//!
//! The display pipeline negotiates a mode with the sink (EDID parsing, mode
//! lists) and hands the chosen timings to an [`Encoder`] as a
//! [`DisplayMode`]. Connector state (sink capabilities, TV margins) reaches
//! the encoder through [`ConnectorProbe`] and [`TvMargins`].

use core::ops::BitOr;

use crate::hil::audio::Eld;
use crate::ErrorCode;

/// Flags qualifying a [`DisplayMode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeFlags(u32);

impl ModeFlags {
    pub const PHSYNC: ModeFlags = ModeFlags(1 << 0);
    pub const NHSYNC: ModeFlags = ModeFlags(1 << 1);
    pub const PVSYNC: ModeFlags = ModeFlags(1 << 2);
    pub const NVSYNC: ModeFlags = ModeFlags(1 << 3);
    pub const INTERLACE: ModeFlags = ModeFlags(1 << 4);
    pub const DBLSCAN: ModeFlags = ModeFlags(1 << 5);
    /// Every pixel is sent twice on the link.
    pub const DBLCLK: ModeFlags = ModeFlags(1 << 12);

    pub const fn empty() -> ModeFlags {
        ModeFlags(0)
    }

    pub const fn union(self, other: ModeFlags) -> ModeFlags {
        ModeFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: ModeFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ModeFlags {
    type Output = ModeFlags;
    fn bitor(self, rhs: ModeFlags) -> ModeFlags {
        self.union(rhs)
    }
}

/// Picture aspect ratio as signalled in the AVI infoframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PictureAspect {
    #[default]
    None = 0,
    Aspect4x3 = 1,
    Aspect16x9 = 2,
    Aspect64x27 = 3,
    Aspect256x135 = 4,
}

/// RGB quantization range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuantizationRange {
    #[default]
    Default = 0,
    Limited = 1,
    Full = 2,
}

/// Display timings as negotiated by the display pipeline.
///
/// Horizontal values are in pixels, vertical values in lines of one field
/// as it is scanned out (already halved for interlaced modes). `clock` is the
/// pixel clock in kHz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayMode {
    pub clock: u32,
    pub hdisplay: u16,
    pub hsync_start: u16,
    pub hsync_end: u16,
    pub htotal: u16,
    pub vdisplay: u16,
    pub vsync_start: u16,
    pub vsync_end: u16,
    pub vtotal: u16,
    pub flags: ModeFlags,
    /// CTA-861 Video Identification Code, 0 for modes outside the CTA list.
    pub vic: u8,
    pub picture_aspect: PictureAspect,
}

impl DisplayMode {
    pub fn hsync_positive(&self) -> bool {
        self.flags.contains(ModeFlags::PHSYNC)
    }

    pub fn vsync_positive(&self) -> bool {
        self.flags.contains(ModeFlags::PVSYNC)
    }

    pub fn is_interlaced(&self) -> bool {
        self.flags.contains(ModeFlags::INTERLACE)
    }

    pub fn is_double_clocked(&self) -> bool {
        self.flags.contains(ModeFlags::DBLCLK)
    }

    /// Number of times each pixel is sent on the link.
    pub fn pixel_repeat(&self) -> u32 {
        if self.is_double_clocked() {
            2
        } else {
            1
        }
    }

    /// Link pixel rate in Hz, including pixel repetition.
    pub fn pixel_rate_hz(&self) -> u64 {
        u64::from(self.clock) * 1000 * u64::from(self.pixel_repeat())
    }

    /// RGB range a sink expects for this mode when none is signalled: CTA
    /// modes other than VIC 1 use limited range, IT modes full range.
    pub fn default_rgb_quant_range(&self) -> QuantizationRange {
        if self.vic > 1 {
            QuantizationRange::Limited
        } else {
            QuantizationRange::Full
        }
    }
}

/// Result of checking a mode against encoder limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeStatus {
    Ok,
    /// The pixel clock exceeds what the encoder can generate.
    ClockHigh,
}

/// Underscan margins requested for the connector, in pixels/lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TvMargins {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorStatus {
    Connected,
    Disconnected,
}

/// Sink capabilities derived from the EDID by the display pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkInfo {
    /// The sink accepts HDMI (not just DVI) signalling.
    pub hdmi_monitor: bool,
    /// The sink honours the RGB quantization range signalled in the AVI
    /// infoframe.
    pub rgb_quant_range_selectable: bool,
    /// The sink follows HDMI 2.0 (CTA-861-F) and accepts a non-zero YQ field.
    pub hdmi2: bool,
    pub eld: Eld,
    /// CEC physical address from the vendor-specific data block.
    pub cec_physical_address: Option<u16>,
}

impl Default for SinkInfo {
    fn default() -> Self {
        SinkInfo {
            hdmi_monitor: false,
            rgb_quant_range_selectable: false,
            hdmi2: false,
            eld: Eld::empty(),
            cec_physical_address: None,
        }
    }
}

/// Board-level sources of connector state.
pub trait ConnectorProbe {
    /// Level of the hot-plug-detect GPIO corrected for its polarity, or `None`
    /// when the board has no such GPIO.
    fn hotplug_gpio(&self) -> Option<bool>;

    /// Whether a sink answers on the DDC bus.
    fn ddc_probe(&self) -> bool;

    /// Read and interpret the sink's EDID. `None` when it cannot be read.
    fn read_sink_info(&self) -> Option<SinkInfo>;
}

/// A display encoder.
pub trait Encoder {
    /// Check whether `mode` can be generated at all.
    fn mode_valid(&self, mode: &DisplayMode) -> ModeStatus;

    /// Start scanning out `mode`. On error the encoder is left disabled.
    fn enable(&self, mode: &DisplayMode) -> Result<(), ErrorCode>;

    /// Stop scanning out. Safe to call even if `enable` failed part way.
    fn disable(&self) -> Result<(), ErrorCode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_rate_doubles_for_double_clocked_modes() {
        let mut mode = DisplayMode {
            clock: 13_500,
            flags: ModeFlags::INTERLACE | ModeFlags::DBLCLK,
            ..DisplayMode::default()
        };
        assert_eq!(mode.pixel_repeat(), 2);
        assert_eq!(mode.pixel_rate_hz(), 27_000_000);
        mode.flags = ModeFlags::PHSYNC;
        assert_eq!(mode.pixel_rate_hz(), 13_500_000);
        assert!(mode.hsync_positive());
        assert!(!mode.vsync_positive());
    }

    #[test]
    fn cta_modes_default_to_limited_range() {
        let mut mode = DisplayMode {
            vic: 16,
            ..DisplayMode::default()
        };
        assert_eq!(mode.default_rgb_quant_range(), QuantizationRange::Limited);
        mode.vic = 1;
        assert_eq!(mode.default_rgb_quant_range(), QuantizationRange::Full);
        mode.vic = 0;
        assert_eq!(mode.default_rgb_quant_range(), QuantizationRange::Full);
    }
}
