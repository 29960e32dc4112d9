// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Peripheral implementations for the Broadcom VideoCore display blocks
//! found in the BCM2835 and BCM2711.

#![cfg_attr(not(test), no_std)]

pub mod hdmi;
