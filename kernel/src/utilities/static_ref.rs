// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Wrapper type for safe pointers to static memory.

use core::ops::Deref;

/// A pointer to statically allocated mutable data such as memory mapped I/O
/// registers.
///
/// This is a simple wrapper around a raw pointer that encapsulates an unsafe
/// dereference in a safe manner. `T` may be unsized, so a register window
/// whose length is only known from the board description can be expressed
/// as `StaticRef<[ReadWrite<u32>]>`.
#[derive(Debug)]
pub struct StaticRef<T: ?Sized> {
    ptr: *const T,
}

impl<T: ?Sized> StaticRef<T> {
    /// Create a new `StaticRef` from a raw pointer
    ///
    /// ## Safety
    ///
    /// Callers must pass in a reference to statically allocated memory which
    /// does not overlap with other values.
    pub const unsafe fn new(ptr: *const T) -> StaticRef<T> {
        StaticRef { ptr }
    }
}

impl<T: ?Sized + 'static> StaticRef<T> {
    /// The pointee, for as long as the program runs. Unlike going through
    /// `Deref`, the reference does not borrow the `StaticRef`.
    pub fn get(self) -> &'static T {
        // SAFETY: `new` requires the pointee to be static and unaliased.
        unsafe { &*self.ptr }
    }
}

impl<T: ?Sized> Clone for StaticRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for StaticRef<T> {}

impl<T: ?Sized + 'static> Deref for StaticRef<T> {
    type Target = T;
    fn deref(&self) -> &'static T {
        self.get()
    }
}
