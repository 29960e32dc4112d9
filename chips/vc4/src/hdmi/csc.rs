// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Colour space converter setup.
//!
//! Limited range output squashes 0-255 to 16-235 with a gain of 220/256 and
//! an offset of 16 on every component. The legacy converter takes
//! coefficients with 11 fractional bits and offsets with 4, and its input is
//! in BGR order. The BCM2711 converter takes signed 2.13 coefficients and 9.6
//! offsets and is always enabled, using a unity matrix for full range.

use super::registers::{HdmiRegisters, Reg, RegisterIo, CSC_COEFF_REGS, VC4_CSC_CTL};
use super::variant::Generation;

/// BCM2711 `CSC_CTL`: custom matrix, RGB to YCbCr path enabled.
const VC5_CSC_CTL_CUSTOM: u32 = 0x07;

/// Limited range gain, in 1/256.
const LIMITED_GAIN: u32 = 220;
const LIMITED_OFFSET: u32 = 16;

/// Rows of `[c1, c2, c3, offset]`, already in register format.
type Matrix = [[u32; 4]; 3];

#[derive(Clone, Copy)]
struct FixedPoint {
    coeff_frac_bits: u32,
    offset_frac_bits: u32,
}

const VC4_FORMAT: FixedPoint = FixedPoint {
    coeff_frac_bits: 11,
    offset_frac_bits: 4,
};

const VC5_FORMAT: FixedPoint = FixedPoint {
    coeff_frac_bits: 13,
    offset_frac_bits: 6,
};

impl FixedPoint {
    const fn gain(self, gain_256ths: u32) -> u32 {
        gain_256ths << (self.coeff_frac_bits - 8)
    }

    const fn offset(self, value: u32) -> u32 {
        value << self.offset_frac_bits
    }

    /// `gain` on the diagonal, or on the anti-diagonal when the input is
    /// BGR ordered.
    const fn scale(self, gain_256ths: u32, offset: u32, bgr: bool) -> Matrix {
        let g = self.gain(gain_256ths);
        let o = self.offset(offset);
        if bgr {
            [[0, 0, g, o], [0, g, 0, o], [g, 0, 0, o]]
        } else {
            [[g, 0, 0, o], [0, g, 0, o], [0, 0, g, o]]
        }
    }
}

/// Pack a matrix into the six `CSC_xx_yy` registers, two coefficients per
/// register with the higher numbered one in the upper half.
fn pack(matrix: &Matrix) -> [u32; CSC_COEFF_REGS as usize] {
    let mut regs = [0; CSC_COEFF_REGS as usize];
    for (row, coeffs) in matrix.iter().enumerate() {
        regs[2 * row] = (coeffs[1] << 16) | (coeffs[0] & 0xffff);
        regs[2 * row + 1] = (coeffs[3] << 16) | (coeffs[2] & 0xffff);
    }
    regs
}

fn write_matrix<IO: RegisterIo>(regs: &HdmiRegisters<IO>, matrix: &Matrix) {
    for (i, value) in pack(matrix).iter().enumerate() {
        regs.write(Reg::CscCoeff(i as u8), *value);
    }
}

/// Program the converter for limited (`limited == true`) or full range RGB.
pub fn setup<IO: RegisterIo>(regs: &HdmiRegisters<IO>, generation: Generation, limited: bool) {
    match generation {
        Generation::Vc4 => {
            // BGR ordering applies even with the converter bypassed.
            let mut ctl = VC4_CSC_CTL::ORDER::BGR;
            if limited {
                ctl += VC4_CSC_CTL::ENABLE::SET
                    + VC4_CSC_CTL::RGB2YCC::SET
                    + VC4_CSC_CTL::MODE::Custom;
                write_matrix(
                    regs,
                    &VC4_FORMAT.scale(LIMITED_GAIN, LIMITED_OFFSET, true),
                );
            }
            regs.write_fields(Reg::CscCtl, ctl);
        }
        Generation::Vc5 => {
            let matrix = if limited {
                VC5_FORMAT.scale(LIMITED_GAIN, LIMITED_OFFSET, false)
            } else {
                VC5_FORMAT.scale(256, 0, false)
            };
            write_matrix(regs, &matrix);
            regs.write(Reg::CscCtl, VC5_CSC_CTL_CUSTOM);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdmi::fakes::FakeRegisters;
    use crate::hdmi::registers::RegisterMap;

    fn coefficients(fake: &FakeRegisters) -> Vec<u32> {
        (0..CSC_COEFF_REGS)
            .map(|i| fake.get(Reg::CscCoeff(i)))
            .collect()
    }

    #[test]
    fn fixed_point_constants() {
        assert_eq!(VC5_FORMAT.gain(LIMITED_GAIN), 0x1b80);
        assert_eq!(VC5_FORMAT.offset(LIMITED_OFFSET), 0x400);
        assert_eq!(VC5_FORMAT.gain(256), 0x2000);
        assert_eq!(VC4_FORMAT.gain(LIMITED_GAIN), 0x6e0);
        assert_eq!(VC4_FORMAT.offset(LIMITED_OFFSET), 0x100);
    }

    #[test]
    fn legacy_limited_range() {
        let fake = FakeRegisters::new(RegisterMap::Bcm2835);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2835);
        setup(&regs, Generation::Vc4, true);
        assert_eq!(
            coefficients(&fake),
            vec![
                0,
                (0x100 << 16) | 0x6e0,
                0x6e0 << 16,
                0x100 << 16,
                0x6e0,
                0x100 << 16
            ]
        );
        // ENABLE | RGB2YCC | MODE(custom) | ORDER(BGR)
        assert_eq!(fake.get(Reg::CscCtl), (5 << 5) | (3 << 2) | 0b11);
    }

    #[test]
    fn legacy_full_range_only_sets_order() {
        let fake = FakeRegisters::new(RegisterMap::Bcm2835);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2835);
        setup(&regs, Generation::Vc4, false);
        assert_eq!(fake.get(Reg::CscCtl), 5 << 5);
        assert!(fake.writes_to(Reg::CscCoeff(0)).is_empty());
    }

    #[test]
    fn current_generation_matrices() {
        let fake = FakeRegisters::new(RegisterMap::Bcm2711Hdmi0);
        let regs = HdmiRegisters::new(&fake, RegisterMap::Bcm2711Hdmi0);
        setup(&regs, Generation::Vc5, true);
        assert_eq!(
            coefficients(&fake),
            vec![
                0x1b80,
                0x0400 << 16,
                0x1b80 << 16,
                0x0400 << 16,
                0,
                (0x0400 << 16) | 0x1b80
            ]
        );
        assert_eq!(fake.get(Reg::CscCtl), 0x07);

        setup(&regs, Generation::Vc5, false);
        assert_eq!(
            coefficients(&fake),
            vec![0x2000, 0, 0x2000 << 16, 0, 0, 0x2000]
        );
    }
}
