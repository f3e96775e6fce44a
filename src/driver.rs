/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Runs a program image on a [`Proc8080`](../proc_state/struct.Proc8080.html).
//!
//! A [`Machine`](struct.Machine.html) owns the processor, loads the program at address 0 and
//! decides when a run is over. Interrupts are delivered between two instructions through an
//! [`InterruptSource`](trait.InterruptSource.html).

use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::error::{EmulatorError, Result};
use crate::opcode::OpCode;
use crate::proc_state::{DataBus, NoPorts, Proc8080};

/// Size of the 8080 address space.
pub const ADDRESS_SPACE: usize = 0x10000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Zero-filled memory appended after the program image. The total is capped at
    /// [`ADDRESS_SPACE`](constant.ADDRESS_SPACE.html).
    pub working_ram: usize,
    /// Number of instructions after which `run` gives up.
    pub max_steps: Option<u64>,
    /// End the run as soon as the program counter leaves the program image.
    pub stop_at_program_end: bool,
}

impl Default for MachineConfig {
    fn default() -> MachineConfig {
        MachineConfig {
            working_ram: 0x2000,
            max_steps: None,
            stop_at_program_end: true,
        }
    }
}

/// Why a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The program counter went past the last byte of the program.
    ProgramEnd,
    /// A `HLT` was executed and no interrupt woke the processor up.
    Halted,
    /// `max_steps` instructions were executed.
    StepLimit,
    /// The host stopped stepping.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            StopReason::ProgramEnd => "end of program",
            StopReason::Halted => "halted",
            StopReason::StepLimit => "step limit reached",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Hook polled by the driver before each instruction.
pub trait InterruptSource {
    /// Returns the `RST` vector (0 to 7) to raise, if any. `steps` is the number of instructions
    /// executed so far. Any other vector makes the run fail with `InvalidInterruptVector`.
    fn poll(&mut self, steps: u64) -> Option<u8>;
}

/// Never raises anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterrupts;

impl InterruptSource for NoInterrupts {
    fn poll(&mut self, _steps: u64) -> Option<u8> {
        None
    }
}

impl<F: FnMut(u64) -> Option<u8>> InterruptSource for F {
    fn poll(&mut self, steps: u64) -> Option<u8> {
        self(steps)
    }
}

pub struct Machine<Bus: DataBus = NoPorts> {
    cpu: Proc8080<Bus>,
    config: MachineConfig,
    program_len: usize,
    steps: u64,
}

impl Machine<NoPorts> {
    pub fn from_program(program: &[u8], config: MachineConfig) -> Result<Machine<NoPorts>> {
        Machine::with_bus(program, config, NoPorts)
    }

    /// Reads the whole file as the program image.
    pub fn from_file<P: AsRef<Path>>(path: P, config: MachineConfig) -> Result<Machine<NoPorts>> {
        let path = path.as_ref();
        let program = fs::read(path)?;
        debug!("read {} bytes from {}", program.len(), path.display());
        Machine::from_program(&program, config)
    }
}

impl<Bus: DataBus> Machine<Bus> {
    /// Loads `program` at address 0 of a zero-filled memory of `program.len() + working_ram`
    /// bytes, capped at 64KiB.
    pub fn with_bus(program: &[u8], config: MachineConfig, bus: Bus) -> Result<Machine<Bus>> {
        if program.len() > ADDRESS_SPACE {
            return Err(EmulatorError::ProgramTooLarge {
                size: program.len(),
            });
        }
        let memory_size = program
            .len()
            .saturating_add(config.working_ram)
            .min(ADDRESS_SPACE);
        let mut memory = vec![0u8; memory_size];
        memory[..program.len()].copy_from_slice(program);
        debug!(
            "loaded {} bytes of program, {} bytes of memory",
            program.len(),
            memory_size
        );

        Ok(Machine {
            cpu: Proc8080::new(memory.into_boxed_slice(), bus),
            config,
            program_len: program.len(),
            steps: 0,
        })
    }

    pub fn cpu(&self) -> &Proc8080<Bus> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Proc8080<Bus> {
        &mut self.cpu
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn program_len(&self) -> usize {
        self.program_len
    }

    /// The reason the next `step` should not happen, if any.
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.config.max_steps.map_or(false, |max| self.steps >= max) {
            Some(StopReason::StepLimit)
        } else if self.cpu.is_stopped() {
            Some(StopReason::Halted)
        } else if self.config.stop_at_program_end
            && self.cpu.registers().pc as usize >= self.program_len
        {
            Some(StopReason::ProgramEnd)
        } else {
            None
        }
    }

    /// Executes one instruction and returns it, or `None` if the processor is halted.
    pub fn step(&mut self) -> Result<Option<OpCode>> {
        let op = self.cpu.emulate()?;
        if op.is_some() {
            self.steps += 1;
        }
        Ok(op)
    }

    /// Raises `RST vector`, see [`Proc8080::interrupt`](../proc_state/struct.Proc8080.html#method.interrupt).
    pub fn interrupt(&mut self, vector: u8) -> Result<()> {
        debug!("interrupt RST {} after {} steps", vector, self.steps);
        self.cpu.interrupt(vector)
    }

    /// Runs until a stop condition is met or an instruction fails.
    pub fn run(&mut self) -> Result<StopReason> {
        self.run_with(&mut NoInterrupts)
    }

    /// Same as `run`, polling `interrupts` before every instruction.
    pub fn run_with<I: InterruptSource>(&mut self, interrupts: &mut I) -> Result<StopReason> {
        loop {
            if let Some(vector) = interrupts.poll(self.steps) {
                self.interrupt(vector)?;
            }
            if let Some(reason) = self.stop_reason() {
                debug!("stopped ({}) after {} steps", reason, self.steps);
                return Ok(reason);
            }
            if let Err(error) = self.step() {
                warn!("run aborted after {} steps: {}", self.steps, error);
                return Err(error);
            }
        }
    }
}
