// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Standard error enum for invoking operations

use core::fmt;

/// Standard errors in Tock.
///
/// Operations that can fail return `Result<T, ErrorCode>`. The variant names
/// the reason, so that a caller can tell a transient condition (`BUSY`) from
/// a structural one (`NODEVICE`, `NOSUPPORT`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 1,
    /// Underlying system is busy; retry
    BUSY = 2,
    /// The state requested is already set
    ALREADY = 3,
    /// The component is powered down
    OFF = 4,
    /// Reservation required before use
    RESERVE = 5,
    /// An invalid parameter was passed
    INVAL = 6,
    /// Parameter passed was too large
    SIZE = 7,
    /// Operation canceled by a call
    CANCEL = 8,
    /// Memory required not available
    NOMEM = 9,
    /// Operation is not supported
    NOSUPPORT = 10,
    /// Device is not available
    NODEVICE = 11,
    /// Device is not physically installed
    UNINSTALLED = 12,
    /// Packet transmission not acknowledged
    NOACK = 13,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl From<ErrorCode> for Result<(), ErrorCode> {
    fn from(ec: ErrorCode) -> Self {
        Err(ec)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::FAIL => "FAIL",
            ErrorCode::BUSY => "BUSY",
            ErrorCode::ALREADY => "ALREADY",
            ErrorCode::OFF => "OFF",
            ErrorCode::RESERVE => "RESERVE",
            ErrorCode::INVAL => "INVAL",
            ErrorCode::SIZE => "SIZE",
            ErrorCode::CANCEL => "CANCEL",
            ErrorCode::NOMEM => "NOMEM",
            ErrorCode::NOSUPPORT => "NOSUPPORT",
            ErrorCode::NODEVICE => "NODEVICE",
            ErrorCode::UNINSTALLED => "UNINSTALLED",
            ErrorCode::NOACK => "NOACK",
        };
        f.write_str(name)
    }
}

/// Convert a `Result<(), ErrorCode>` to a status code, where 0 is success.
pub fn into_statuscode(r: Result<(), ErrorCode>) -> usize {
    match r {
        Ok(()) => 0,
        Err(e) => e as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuscode_zero_is_success() {
        assert_eq!(into_statuscode(Ok(())), 0);
        assert_eq!(into_statuscode(Err(ErrorCode::BUSY)), 2);
        assert_eq!(usize::from(ErrorCode::NODEVICE), 11);
    }

    #[test]
    fn error_converts_into_result() {
        let r: Result<(), ErrorCode> = ErrorCode::SIZE.into();
        assert_eq!(r, Err(ErrorCode::SIZE));
    }
}
