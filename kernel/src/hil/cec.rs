// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interface for HDMI Consumer Electronics Control (CEC) adapters.
//!
//! The CEC protocol layer above an adapter owns logical-address allocation
//! and message policy. The adapter only moves single frames on the wire and
//! reports back through [`CecClient`]. Callbacks are issued from deferred
//! (non-interrupt) context.

use crate::ErrorCode;

/// Longest CEC frame, header block included.
pub const CEC_MAX_MSG_SIZE: usize = 16;

/// Logical address used while no address is claimed.
pub const CEC_LOG_ADDR_UNREGISTERED: u8 = 0xf;

/// A single CEC frame of 1 to [`CEC_MAX_MSG_SIZE`] bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CecMessage {
    len: usize,
    msg: [u8; CEC_MAX_MSG_SIZE],
}

impl CecMessage {
    pub const fn empty() -> CecMessage {
        CecMessage {
            len: 0,
            msg: [0; CEC_MAX_MSG_SIZE],
        }
    }

    /// Copy `bytes` into a frame. Fails with `SIZE` if the frame would not
    /// fit.
    pub fn from_bytes(bytes: &[u8]) -> Result<CecMessage, ErrorCode> {
        if bytes.len() > CEC_MAX_MSG_SIZE {
            return Err(ErrorCode::SIZE);
        }
        let mut msg = [0; CEC_MAX_MSG_SIZE];
        msg[..bytes.len()].copy_from_slice(bytes);
        Ok(CecMessage {
            len: bytes.len(),
            msg,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.msg[..self.len]
    }

    /// Initiator logical address (high nibble of the header block).
    pub fn initiator(&self) -> Option<u8> {
        self.as_bytes().first().map(|h| h >> 4)
    }

    /// Destination logical address (low nibble of the header block).
    pub fn destination(&self) -> Option<u8> {
        self.as_bytes().first().map(|h| h & 0xf)
    }
}

/// Outcome of a transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransmitStatus {
    /// The frame was acknowledged.
    Ok,
    /// The frame was not acknowledged after `attempts` tries.
    Nack { attempts: u8 },
}

pub trait CecClient {
    /// A frame was received.
    fn received_message(&self, msg: &CecMessage);

    /// The frame passed to the last [`Cec::transmit`] left the adapter.
    fn transmit_done(&self, status: TransmitStatus);

    /// The sink's physical address changed. `None` invalidates it, for
    /// example on unplug.
    fn physical_address_changed(&self, _address: Option<u16>) {}
}

pub trait Cec<'a> {
    fn set_client(&self, client: &'a dyn CecClient);

    /// Configure bit timing and start listening on the bus.
    fn enable(&self) -> Result<(), ErrorCode>;

    /// Stop the adapter and mask its interrupts.
    fn disable(&self) -> Result<(), ErrorCode>;

    /// Set the logical address the adapter acknowledges. Only the low four
    /// bits are used.
    fn set_logical_address(&self, address: u8) -> Result<(), ErrorCode>;

    /// Start transmitting `msg`. Completion is reported through
    /// [`CecClient::transmit_done`].
    fn transmit(&self, msg: &[u8]) -> Result<(), ErrorCode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_frames_are_rejected() {
        assert_eq!(CecMessage::from_bytes(&[0; 17]), Err(ErrorCode::SIZE));
        let full = CecMessage::from_bytes(&[0x4f; 16]).unwrap();
        assert_eq!(full.len(), 16);
    }

    #[test]
    fn header_nibbles() {
        let msg = CecMessage::from_bytes(&[0x40, 0x04]).unwrap();
        assert_eq!(msg.initiator(), Some(4));
        assert_eq!(msg.destination(), Some(0));
        assert_eq!(msg.as_bytes(), &[0x40, 0x04]);
        assert_eq!(CecMessage::empty().initiator(), None);
    }
}
