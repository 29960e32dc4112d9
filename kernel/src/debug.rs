// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Support for in-kernel debugging.
//!
//! For printing, this module exposes the [`debug!`] and [`debug_verbose!`]
//! macros. They format their arguments with `core::fmt` and hand the bytes to
//! the writer the board installed with [`set_debug_writer`]. Until a writer is
//! installed, output is discarded, which is what host unit tests rely on.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! debug!("Yes the code gets here with value {}", i);
//! debug_verbose!("got here"); // includes file and line number
//! ```
//!
//! Board setup
//! -----------
//!
//! ```rust,ignore
//! let uart_writer = static_init!(UartWriter, UartWriter::new(&uart0));
//! unsafe { kernel::debug::set_debug_writer(uart_writer) };
//! ```

use core::fmt::{Arguments, Result, Write};
use core::ptr::addr_of_mut;

/// Byte sink that backs the debug output.
pub trait IoWrite {
    /// Write as much of `buf` as possible, returning the number of bytes
    /// consumed.
    fn write(&mut self, buf: &[u8]) -> usize;
}

// Written once by the board during setup, read afterwards from the single
// kernel thread.
static mut DEBUG_WRITER: Option<&'static mut dyn IoWrite> = None;

/// Install the writer that receives all debug output.
///
/// # Safety
///
/// Must be called during board setup, before any other code prints, and not
/// concurrently with any use of the debug macros.
pub unsafe fn set_debug_writer(writer: &'static mut dyn IoWrite) {
    *addr_of_mut!(DEBUG_WRITER) = Some(writer);
}

struct DebugWriterWrapper<'a> {
    inner: &'a mut dyn IoWrite,
}

impl Write for DebugWriterWrapper<'_> {
    fn write_str(&mut self, s: &str) -> Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let written = self.inner.write(bytes);
            if written == 0 {
                // The sink is full; drop the rest rather than spin.
                break;
            }
            bytes = &bytes[written.min(bytes.len())..];
        }
        Ok(())
    }
}

fn with_debug_writer<F: FnOnce(&mut DebugWriterWrapper)>(f: F) {
    // SAFETY: the writer is only replaced during board setup, and the kernel
    // is single-threaded afterwards.
    let writer = unsafe { &mut *addr_of_mut!(DEBUG_WRITER) };
    if let Some(inner) = writer.as_deref_mut() {
        f(&mut DebugWriterWrapper { inner });
    }
}

pub fn debug_print(args: Arguments) {
    with_debug_writer(|writer| {
        let _ = writer.write_fmt(args);
    });
}

pub fn debug_println(args: Arguments) {
    with_debug_writer(|writer| {
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    });
}

pub fn debug_verbose_println(args: Arguments, file_line: &(&'static str, u32)) {
    let (file, line) = *file_line;
    with_debug_writer(|writer| {
        let _ = write!(writer, "TOCK_DEBUG: {}:{}: ", file, line);
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    });
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_println(format_args!($msg));
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($fmt, $($arg)+));
    });
}

/// In-kernel `println()` debugging that includes the file and line number.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        // Allow an empty debug_verbose!() to print the location when hit
        debug_verbose!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_verbose_println(format_args!($msg), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_verbose_println(format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}
