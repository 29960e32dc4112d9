// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interface for peripheral clocks supplied by the SoC clock tree.
//!
//! The clock tree itself is owned by the chip; peripheral drivers only set a
//! rate and gate the clock. `prepare_enable` and `disable_unprepare` must be
//! balanced by the caller.

use crate::ErrorCode;

pub trait Clock {
    /// Request a new rate in Hz. The clock may round the rate; read it back
    /// with [`Clock::rate`].
    fn set_rate(&self, hz: u32) -> Result<(), ErrorCode>;

    /// Current rate in Hz.
    fn rate(&self) -> u32;

    /// Ungate the clock.
    fn prepare_enable(&self) -> Result<(), ErrorCode>;

    /// Gate the clock again.
    fn disable_unprepare(&self);
}
