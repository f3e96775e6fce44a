/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::io;

use thiserror::Error;

use crate::opcode::DecodeError;

pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Fatal conditions which end an emulation run.
///
/// None of them is recoverable at the instruction level: the failing instruction has not taken
/// effect and the host decides whether to stop, log or treat it as a breakpoint.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// The byte at `address` is not a valid instruction, or one of its register fields is
    /// undefined, or its data bytes run past the end of memory.
    #[error("invalid instruction ${opcode:02x} @ address ${address:04x}: {source}")]
    Decode {
        opcode: u8,
        address: u16,
        #[source]
        source: DecodeError,
    },

    /// The instruction at `pc` touched an address outside of the loaded memory.
    #[error("memory access out of bounds @ ${address:04x} (instruction @ ${pc:04x})")]
    MemoryOutOfBounds { address: u16, pc: u16 },

    /// An interrupt asked for a `RST` vector outside of 0 to 7.
    #[error("invalid interrupt vector {0}, expected 0 to 7")]
    InvalidInterruptVector(u8),

    #[error("program of {size} bytes does not fit in the 64KiB address space")]
    ProgramTooLarge { size: usize },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
