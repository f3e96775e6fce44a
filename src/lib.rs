/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Intel 8080 emulator
//!
//! This crate interprets raw Intel 8080 machine code. A program image is loaded at address 0
//! and executed one instruction at a time until it halts, leaves its image or fails.
//!
//! The main struct is [`Proc8080`](proc_state/struct.Proc8080.html) which emulates the state
//! of a 8080 processor (memory, flags and registers). [`Machine`](driver/struct.Machine.html)
//! wraps it with program loading and the run loop:
//!
//! ```
//! use intel_8080_emu::driver::{Machine, MachineConfig, StopReason};
//!
//! // MVI A,$14; MVI B,$09; ADD B; HLT
//! let program = [0x3e, 0x14, 0x06, 0x09, 0x80, 0x76];
//! let mut machine = Machine::from_program(&program, MachineConfig::default()).unwrap();
//! assert_eq!(machine.run().unwrap(), StopReason::Halted);
//! assert_eq!(machine.cpu().registers().a, 0x1d);
//! ```
//!
//! The decoding step, [`read_opcode`](opcode/fn.read_opcode.html), is also usable on its own.
//! Here is a disassembler built on it:
//!
//! ```no_run
//! use std::fs::File;
//! use std::io;
//! use intel_8080_emu::opcode::OpCodes;
//!
//! fn main() -> io::Result<()> {
//!     let input = File::open("program.bin")?;
//!     let mut count = 0;
//!     for op_code_result in OpCodes::new(io::BufReader::new(input)) {
//!         match op_code_result {
//!             Ok(op_code) => {
//!                 println!("0x{:04x} - {}", count, op_code);
//!                 count += op_code.size();
//!             }
//!             Err(e) => {
//!                 println!("0x{:04x} - ??? ({})", count, e);
//!                 count += 1;
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod driver;
mod error;
pub mod opcode;
pub mod proc_state;

pub use error::{EmulatorError, Result};
