// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces for power domains and reset lines.

use crate::ErrorCode;

/// A reference-counted power domain.
///
/// Every successful `get` must be matched by a `put`.
pub trait PowerDomain {
    /// Take a reference on the domain, powering it up if needed.
    fn get(&self) -> Result<(), ErrorCode>;

    /// Drop a reference on the domain.
    fn put(&self) -> Result<(), ErrorCode>;
}

/// A peripheral reset line controlled by the SoC reset controller.
pub trait ResetLine {
    /// Assert and release the reset.
    fn reset(&self) -> Result<(), ErrorCode>;
}
