// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Data structure for storing compile-time configuration options in the kernel.
//!
//! Configuration is a typed `const` object rather than scattered `#[cfg]`
//! attributes. Every code path is type-checked by the compiler, including the
//! ones a given configuration disables, and the compiler folds the constants
//! so a disabled branch costs nothing in the resulting binary.

/// Data structure holding compile-time configuration options.
///
/// To change the configuration, enable the matching cargo feature of the
/// kernel crate from the board crate.
pub struct Config {
    /// Whether HDMI drivers should log every register write.
    ///
    /// If enabled, each write prints the block, offset and value through
    /// `debug_verbose!`. This is slow and only meant for bring-up.
    pub trace_hdmi_registers: bool,

    /// Whether bounded-wait timeouts in HDMI drivers are logged.
    ///
    /// Timeouts are always recorded in the device's warning log; this only
    /// controls whether they are also printed.
    pub log_hdmi_warnings: bool,

    /// Whether CEC drivers should log received frames and transmit results.
    pub debug_cec: bool,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined. This is the only location in the kernel crate where we permit
/// `#[cfg(x)]` to be used to configure code based on Cargo features.
pub const CONFIG: Config = Config {
    trace_hdmi_registers: cfg!(feature = "trace_hdmi_registers"),
    log_hdmi_warnings: !cfg!(feature = "no_hdmi_warnings"),
    debug_cec: cfg!(feature = "debug_cec"),
};
