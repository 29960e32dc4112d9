// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Hardware agnostic interfaces for time and timers.
//!
//! Drivers that must wait for hardware with a bounded timeout take a
//! [`Time`] source and convert their timeouts with [`ConvertTicks`].

/// Trait to represent clock frequency in Hz
///
/// This trait is used as an associated type for `Time` so clients can portably
/// convert native cycles to real-time values.
pub trait Frequency {
    /// Returns frequency in Hz.
    fn frequency() -> u32;
}

/// 1MHz `Frequency`
#[derive(Debug)]
pub struct Freq1MHz;
impl Frequency for Freq1MHz {
    fn frequency() -> u32 {
        1_000_000
    }
}

/// 32KHz `Frequency`
#[derive(Debug)]
pub struct Freq32KHz;
impl Frequency for Freq32KHz {
    fn frequency() -> u32 {
        32768
    }
}

/// 1KHz `Frequency`
#[derive(Debug)]
pub struct Freq1KHz;
impl Frequency for Freq1KHz {
    fn frequency() -> u32 {
        1000
    }
}

/// An object that tracks monotonic time.
///
/// The counter is 64 bits wide so that it does not wrap during the lifetime
/// of the system; deadlines can be compared directly.
pub trait Time {
    type Frequency: Frequency;

    /// Returns the current time in hardware clock units.
    fn now(&self) -> u64;
}

/// Conversion between wall-clock durations and ticks of a [`Time`] source.
///
/// Conversions to ticks round up, so a wait of `us` microseconds never
/// expires early.
pub trait ConvertTicks {
    fn ticks_from_us(&self, us: u32) -> u64;
    fn ticks_from_ms(&self, ms: u32) -> u64;
    fn ticks_to_us(&self, ticks: u64) -> u64;
}

impl<T: Time + ?Sized> ConvertTicks for T {
    fn ticks_from_us(&self, us: u32) -> u64 {
        let freq = u64::from(T::Frequency::frequency());
        (u64::from(us) * freq).div_ceil(1_000_000)
    }

    fn ticks_from_ms(&self, ms: u32) -> u64 {
        let freq = u64::from(T::Frequency::frequency());
        (u64::from(ms) * freq).div_ceil(1000)
    }

    fn ticks_to_us(&self, ticks: u64) -> u64 {
        let freq = u64::from(T::Frequency::frequency());
        ticks.saturating_mul(1_000_000) / freq
    }
}
