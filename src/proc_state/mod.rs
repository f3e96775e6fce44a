/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod alu;
mod flags;
mod operand;
mod registers;
mod stack;

use std::fmt;

use log::trace;

use crate::error::{EmulatorError, Result};
use crate::opcode::OpCode::*;
use crate::opcode::{self, AluOp, OpCode, Reg16};
pub use self::flags::Flags;
pub use self::operand::Operand;
pub use self::registers::Registers;

/// Interface used by `Proc8080` for `IN` and `OUT` instructions.
///
/// The 8080 communicates with external devices via the instructions `IN` (the CPU reads from the
/// data bus on a given port) and `OUT` (the CPU writes to a given port). No device is emulated by
/// this crate: the trait is the place where a host plugs its own hardware.
pub trait DataBus {
    /// Called by `Proc8080` when it applies a `IN` instruction
    fn read_port(&self, port: u8) -> u8;

    /// Called by `Proc8080` when it applies a `OUT` instruction
    fn write_port(&mut self, port: u8, value: u8);
}

/// A data bus with nothing attached: every port reads as 0 and writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPorts;

impl DataBus for NoPorts {
    fn read_port(&self, _port: u8) -> u8 {
        0
    }

    fn write_port(&mut self, _port: u8, _value: u8) {}
}

/// Structure containing the processor state (flags, registers and memory) and logic.
pub struct Proc8080<Bus: DataBus> {
    flags: Flags,
    registers: Registers,
    memory: Box<[u8]>,
    interrupt_enabled: bool,
    stopped: bool,
    /// Address of the instruction being executed, for error reports.
    instruction_address: u16,
    data_bus: Bus,
}

impl<Bus: DataBus> Proc8080<Bus> {
    /// Builds a new `Proc8080` with the given memory `mem` and `DataBus`.
    ///
    /// The memory is indexed from address 0 and can be shorter than the 64KiB address space;
    /// any access past its end is an error. Registers and flags start at zero, so the program
    /// starts at address 0 and a program using the stack is expected to set `SP` first.
    pub fn new(mem: Box<[u8]>, data_bus: Bus) -> Proc8080<Bus> {
        Proc8080 {
            flags: Default::default(),
            registers: Default::default(),
            memory: mem,
            interrupt_enabled: false,
            stopped: false,
            instruction_address: 0,
            data_bus,
        }
    }

    /// Borrows the processor flags immutably.
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Borrows the processor flags mutably.
    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    /// Borrows the processor registers immutably.
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Borrows the processor registers mutably.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    /// Borrows the memory immutably.
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Borrows the memory mutably, to load data or patch a running program.
    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Borrows the `DataBus` given to `new`.
    pub fn data_bus(&self) -> &Bus {
        &self.data_bus
    }

    /// `true` after `EI`, until `DI` or an accepted interrupt.
    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    /// `true` after a `HLT`, until the next interrupt.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Decodes the instruction at the program counter without executing it.
    pub fn next_opcode(&self) -> Result<OpCode> {
        let pc = self.registers.pc;
        let bytes = self
            .memory
            .get(pc as usize..)
            .filter(|bytes| !bytes.is_empty())
            .ok_or(EmulatorError::MemoryOutOfBounds { address: pc, pc })?;
        opcode::read_opcode(bytes).map_err(|source| EmulatorError::Decode {
            opcode: bytes[0],
            address: pc,
            source,
        })
    }

    /// Reads the next opcode in memory and changes state accordingly.
    ///
    /// This methods runs one `step` of the processor simulation. The program counter is moved
    /// past the instruction before it is applied, so jumps, calls and returns simply overwrite
    /// it. Returns the executed opcode, or `None` if the processor is stopped.
    ///
    /// On error the processor is left as it was before the instruction.
    pub fn emulate(&mut self) -> Result<Option<OpCode>> {
        if self.stopped {
            return Ok(None);
        }
        let address = self.registers.pc;
        let op = self.next_opcode()?;
        trace!("{:04x} - {}", address, op);

        self.instruction_address = address;
        self.registers.pc = address.wrapping_add(op.size());
        if let Err(error) = self.apply_op(op) {
            self.registers.pc = address;
            return Err(error);
        }
        Ok(Some(op))
    }

    /// Make the processor run a `RST` instruction.
    ///
    /// There are 8 possible `RST` instruction for the 8080 (`RST 0` to `7`). The specific
    /// instruction is chosen via `rst_value`. The restart only happens if interrupts are enabled,
    /// and disables them. The return address pushed is the current program counter.
    ///
    /// An interrupt restarts a processor which was in stopped state after running a HLT opcode.
    ///
    /// # Errors
    /// `InvalidInterruptVector` if `rst_value` is greater than 7, or `MemoryOutOfBounds` if the
    /// return address cannot be pushed. The processor is left untouched in both cases.
    pub fn interrupt(&mut self, rst_value: u8) -> Result<()> {
        if rst_value > 7 {
            return Err(EmulatorError::InvalidInterruptVector(rst_value));
        }
        if self.interrupt_enabled {
            self.instruction_address = self.registers.pc;
            self.restart(rst_value)?;
            self.interrupt_enabled = false;
        }
        self.stopped = false;
        Ok(())
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8> {
        self.memory
            .get(addr as usize)
            .copied()
            .ok_or_else(|| self.out_of_bounds(addr))
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        let error = self.out_of_bounds(addr);
        let cell = self.memory.get_mut(addr as usize).ok_or(error)?;
        *cell = value;
        Ok(())
    }

    /// Reads a little-endian word.
    pub fn read_word(&self, addr: u16) -> Result<u16> {
        let low = self.read_byte(addr)?;
        let high = self.read_byte(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Writes a little-endian word. Nothing is written unless both bytes are in memory.
    pub fn write_word(&mut self, addr: u16, value: u16) -> Result<()> {
        let high_addr = addr.wrapping_add(1);
        if high_addr as usize >= self.memory.len() {
            return Err(self.out_of_bounds(high_addr));
        }
        let [low, high] = value.to_le_bytes();
        self.write_byte(addr, low)?;
        self.write_byte(high_addr, high)
    }

    fn out_of_bounds(&self, address: u16) -> EmulatorError {
        EmulatorError::MemoryOutOfBounds {
            address,
            pc: self.instruction_address,
        }
    }

    fn apply_op(&mut self, op: OpCode) -> Result<()> {
        match op {
            Nop => (),

            // Data transfer
            Mov(dst, src) => {
                let value = src.read(self)?;
                dst.write(self, value)?;
            }
            Mvi(reg, value) => reg.write(self, value)?,
            Lxi(reg, value) => reg.write(self, value)?,
            Lda(addr) => self.registers.a = self.read_byte(addr)?,
            Sta(addr) => self.write_byte(addr, self.registers.a)?,
            Lhld(addr) => {
                let value = self.read_word(addr)?;
                self.registers.set_reg_16_val(Reg16::H, value);
            }
            Shld(addr) => self.write_word(addr, self.registers.hl())?,
            Ldax(reg) => {
                let addr = reg.read(self)?;
                self.registers.a = self.read_byte(addr)?;
            }
            Stax(reg) => {
                let addr = reg.read(self)?;
                self.write_byte(addr, self.registers.a)?;
            }
            Xchg => self.xchg(),

            // Arithmetic and logical
            Alu(alu_op, reg) => {
                let value = reg.read(self)?;
                self.apply_alu(alu_op, value);
            }
            AluImmediate(alu_op, value) => self.apply_alu(alu_op, value),
            Inr(reg) => {
                let value = reg.read(self)?;
                let result = alu::increment(&mut self.flags, value);
                reg.write(self, result)?;
            }
            Dcr(reg) => {
                let value = reg.read(self)?;
                let result = alu::decrement(&mut self.flags, value);
                reg.write(self, result)?;
            }
            Inx(reg) => {
                let value = self.registers.reg_16_val(reg);
                self.registers.set_reg_16_val(reg, value.wrapping_add(1));
            }
            Dcx(reg) => {
                let value = self.registers.reg_16_val(reg);
                self.registers.set_reg_16_val(reg, value.wrapping_sub(1));
            }
            Dad(reg) => {
                let value = self.registers.reg_16_val(reg);
                let result = alu::add_16(&mut self.flags, self.registers.hl(), value);
                self.registers.set_reg_16_val(Reg16::H, result);
            }
            Daa => self.registers.a = alu::decimal_adjust(&mut self.flags, self.registers.a),
            Rlc => self.registers.a = alu::rotate_left(&mut self.flags, self.registers.a),
            Rrc => self.registers.a = alu::rotate_right(&mut self.flags, self.registers.a),
            Ral => {
                self.registers.a = alu::rotate_left_through_carry(&mut self.flags, self.registers.a)
            }
            Rar => {
                self.registers.a = alu::rotate_right_through_carry(&mut self.flags, self.registers.a)
            }
            Cma => self.registers.a = !self.registers.a,
            Cmc => self.flags.cy = !self.flags.cy,
            Stc => self.flags.cy = true,

            // Branch
            Jmp(addr) => self.registers.pc = addr,
            JumpIf(cond, addr) => {
                if self.flags.condition(cond) {
                    self.registers.pc = addr
                }
            }
            Call(addr) => self.apply_call(addr)?,
            CallIf(cond, addr) => {
                if self.flags.condition(cond) {
                    self.apply_call(addr)?
                }
            }
            Ret => self.apply_return()?,
            ReturnIf(cond) => {
                if self.flags.condition(cond) {
                    self.apply_return()?
                }
            }
            Rst(value) => self.restart(value)?,
            Pchl => self.registers.pc = self.registers.hl(),

            // Stack, I/O, and Machine Control
            Push(reg) => self.push_reg(reg)?,
            PushPsw => self.push_processor_status_word()?,
            Pop(reg) => self.pop_register(reg)?,
            PopPsw => self.pop_processor_status_word()?,
            Xthl => self.xthl()?,
            Sphl => self.registers.sp = self.registers.hl(),
            In(port) => self.registers.a = self.data_bus.read_port(port),
            Out(port) => self.data_bus.write_port(port, self.registers.a),
            Ei => self.interrupt_enabled = true,
            Di => self.interrupt_enabled = false,
            Hlt => self.stopped = true,
        }
        Ok(())
    }

    fn apply_alu(&mut self, op: AluOp, value: u8) {
        let a = self.registers.a;
        let carry = self.flags.cy;
        let flags = &mut self.flags;
        match op {
            AluOp::Add => self.registers.a = alu::add(flags, a, value, false),
            AluOp::Adc => self.registers.a = alu::add(flags, a, value, carry),
            AluOp::Sub => self.registers.a = alu::sub(flags, a, value, false),
            AluOp::Sbb => self.registers.a = alu::sub(flags, a, value, carry),
            AluOp::Ana => self.registers.a = alu::and(flags, a, value),
            AluOp::Xra => self.registers.a = alu::xor(flags, a, value),
            AluOp::Ora => self.registers.a = alu::or(flags, a, value),
            AluOp::Cmp => alu::compare(flags, a, value),
        }
    }

    fn xchg(&mut self) {
        let d = self.registers.reg_16_val(Reg16::D);
        let h = self.registers.reg_16_val(Reg16::H);

        self.registers.set_reg_16_val(Reg16::D, h);
        self.registers.set_reg_16_val(Reg16::H, d);
    }

    fn memory_at(&self, addr: u16) -> Option<u8> {
        self.memory.get(addr as usize).copied()
    }
}

impl<Bus: DataBus> fmt::Debug for Proc8080<Bus> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Proc8080")
            .field("flags", &self.flags)
            .field("registers", &self.registers)
            .field("interrupt_enabled", &self.interrupt_enabled)
            .field("stopped", &self.stopped)
            .finish()
    }
}

/// Human readable dump of the registers, flags and the memory pointed by `HL` and `SP`.
impl<Bus: DataBus> fmt::Display for Proc8080<Bus> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let regs = &self.registers;
        let flags = &self.flags;
        let byte = |addr: u16| match self.memory_at(addr) {
            Some(value) => format!("${:02x}", value),
            None => "--".to_string(),
        };

        writeln!(f, "Registers:")?;
        writeln!(f, "    A: ${:02x}    SP: ${:04x}    PC: ${:04x}", regs.a, regs.sp, regs.pc)?;
        writeln!(f, "    B: ${:02x}    C: ${:02x}", regs.b, regs.c)?;
        writeln!(f, "    D: ${:02x}    E: ${:02x}", regs.d, regs.e)?;
        writeln!(f, "    H: ${:02x}    L: ${:02x}", regs.h, regs.l)?;
        writeln!(f, "Flags:")?;
        writeln!(
            f,
            "    Z:{} S:{} P:{} CY:{} AC:{}    interrupts: {}",
            flags.z as u8,
            flags.s as u8,
            flags.p as u8,
            flags.cy as u8,
            flags.ac as u8,
            if self.interrupt_enabled { "enabled" } else { "disabled" }
        )?;
        writeln!(f, "Memory:")?;
        writeln!(f, "    (HL): {}", byte(regs.hl()))?;
        write!(
            f,
            "    (SP): {}    (SP+1): {}",
            byte(regs.sp),
            byte(regs.sp.wrapping_add(1))
        )
    }
}
