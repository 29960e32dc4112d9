// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Core kernel support for display peripheral drivers.
//!
//! The kernel crate holds the code that chips and boards share: the error
//! type, the debug output path, compile-time configuration, deferred calls,
//! and the Hardware Interface Layer (HIL) definitions that a display, audio or
//! CEC driver implements.
//!
//! Most `unsafe` code is in this kernel crate.

#![cfg_attr(not(test), no_std)]

pub mod config;
#[macro_use]
pub mod debug;
pub mod deferred_call;
pub mod errorcode;
pub mod hil;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
