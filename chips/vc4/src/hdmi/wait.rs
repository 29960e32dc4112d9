// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Bounded busy waits and the warning log.
//!
//! The HDMI block acknowledges most requests through a status bit that the
//! driver has to poll. Every poll is bounded. On expiry the caller records a
//! [`Warning`]; video and audio sequences carry on, a packet slot that does
//! not stop is left unwritten.

use core::cell::Cell;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::time::{ConvertTicks, Time};
use kernel::ErrorCode;

/// Time between two polls of a status bit.
pub const POLL_INTERVAL_US: u32 = 100;

pub const PACKET_STOP_TIMEOUT_MS: u32 = 100;
pub const PACKET_START_TIMEOUT_MS: u32 = 100;
pub const SCHEDULER_TIMEOUT_MS: u32 = 1000;
pub const RECENTER_TIMEOUT_MS: u32 = 1;

/// Spin for at least `us` microseconds.
pub fn delay_us<T: Time + ?Sized>(time: &T, us: u32) {
    let end = time.now().saturating_add(time.ticks_from_us(us));
    while time.now() < end {
        core::hint::spin_loop();
    }
}

/// Poll `done` until it returns true or `timeout_ms` passes.
///
/// The condition is checked once more after the deadline, so a bit that
/// flips during the last delay is not reported as a timeout. Returns `BUSY`
/// on timeout.
pub fn wait_for<T: Time + ?Sized, F: FnMut() -> bool>(
    time: &T,
    timeout_ms: u32,
    mut done: F,
) -> Result<(), ErrorCode> {
    let deadline = time.now().saturating_add(time.ticks_from_ms(timeout_ms));
    while time.now() < deadline {
        if done() {
            return Ok(());
        }
        delay_us(time, POLL_INTERVAL_US);
    }
    if done() {
        Ok(())
    } else {
        Err(ErrorCode::BUSY)
    }
}

/// A non-fatal fault seen while driving the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Warning {
    /// A packet slot did not report disabled. Carries the infoframe type.
    PacketStopTimeout(u8),
    /// A packet slot did not report enabled. Carries the infoframe type.
    PacketStartTimeout(u8),
    /// The scheduler did not enter (`hdmi: true`) or leave HDMI mode.
    SchedulerTimeout { hdmi: bool },
    RecenterTimeout,
    /// The power domain refused to drop our reference.
    PowerReleaseFailed(ErrorCode),
}

/// Count and most recent of the warnings a device raised.
pub struct WarningLog {
    count: Cell<usize>,
    last: Cell<Option<Warning>>,
}

impl WarningLog {
    pub const fn new() -> WarningLog {
        WarningLog {
            count: Cell::new(0),
            last: Cell::new(None),
        }
    }

    pub fn record(&self, warning: Warning) {
        if CONFIG.log_hdmi_warnings {
            debug!("vc4-hdmi: {:?}", warning);
        }
        self.count.set(self.count.get() + 1);
        self.last.set(Some(warning));
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }

    pub fn last(&self) -> Option<Warning> {
        self.last.get()
    }
}
