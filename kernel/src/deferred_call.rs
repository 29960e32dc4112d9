// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Hardware-independent kernel interface for deferred calls.
//!
//! A deferred call lets an interrupt handler hand work to a later, non-interrupt
//! context, Tock's version of a threaded interrupt handler. The interrupt
//! handler does only the register accesses it must and calls
//! [`DeferredCall::set()`]. The board's main loop later calls
//! [`DeferredCall::service()`], which clears the pending flag and runs
//! [`DeferredCallClient::handle_deferred_call()`] on the client.
//!
//! Each [`DeferredCall`] carries a single pending flag. Setting it again before
//! it is serviced does not queue a second call.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! use kernel::deferred_call::{DeferredCall, DeferredCallClient};
//!
//! struct SomeDriver {
//!     deferred_call: DeferredCall,
//! }
//!
//! impl SomeDriver {
//!     fn handle_interrupt(&self) {
//!         // capture hardware state ...
//!         self.deferred_call.set();
//!     }
//! }
//!
//! impl DeferredCallClient for SomeDriver {
//!     fn handle_deferred_call(&self) {
//!         // deliver results to upper layers
//!     }
//! }
//!
//! // board main loop
//! driver.deferred_call.service(driver);
//! ```

use core::cell::Cell;

/// This trait should be implemented by clients which need to receive
/// [`DeferredCall`]s.
pub trait DeferredCallClient {
    /// Software interrupt function that is called when the deferred call is
    /// serviced.
    fn handle_deferred_call(&self);
}

pub struct DeferredCall {
    pending: Cell<bool>,
}

impl DeferredCall {
    pub const fn new() -> Self {
        DeferredCall {
            pending: Cell::new(false),
        }
    }

    /// Schedule a deferred callback.
    pub fn set(&self) {
        self.pending.set(true);
    }

    /// Check if a deferred callback has been set and not yet serviced.
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Run the client's deferred handler if a call is pending. Returns whether
    /// the client was called.
    pub fn service<C: DeferredCallClient + ?Sized>(&self, client: &C) -> bool {
        if self.pending.replace(false) {
            client.handle_deferred_call();
            true
        } else {
            false
        }
    }
}
