/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use super::{DataBus, Proc8080};
use crate::error::Result;
use crate::opcode::{Reg16, Register};

/// A location of the processor which an instruction can read or write: an 8-bit register
/// (memory through `HL` included) or a 16-bit register pair.
pub trait Operand: Copy {
    type Value;

    fn read<Bus: DataBus>(self, cpu: &Proc8080<Bus>) -> Result<Self::Value>;

    fn write<Bus: DataBus>(self, cpu: &mut Proc8080<Bus>, value: Self::Value) -> Result<()>;
}

impl Operand for Register {
    type Value = u8;

    fn read<Bus: DataBus>(self, cpu: &Proc8080<Bus>) -> Result<u8> {
        let registers = &cpu.registers;
        Ok(match self {
            Register::A => registers.a,
            Register::B => registers.b,
            Register::C => registers.c,
            Register::D => registers.d,
            Register::E => registers.e,
            Register::H => registers.h,
            Register::L => registers.l,
            Register::M => return cpu.read_byte(registers.hl()),
        })
    }

    fn write<Bus: DataBus>(self, cpu: &mut Proc8080<Bus>, value: u8) -> Result<()> {
        let registers = &mut cpu.registers;
        match self {
            Register::A => registers.a = value,
            Register::B => registers.b = value,
            Register::C => registers.c = value,
            Register::D => registers.d = value,
            Register::E => registers.e = value,
            Register::H => registers.h = value,
            Register::L => registers.l = value,
            Register::M => {
                let addr = registers.hl();
                return cpu.write_byte(addr, value);
            }
        }
        Ok(())
    }
}

impl Operand for Reg16 {
    type Value = u16;

    fn read<Bus: DataBus>(self, cpu: &Proc8080<Bus>) -> Result<u16> {
        Ok(cpu.registers.reg_16_val(self))
    }

    fn write<Bus: DataBus>(self, cpu: &mut Proc8080<Bus>, value: u16) -> Result<()> {
        cpu.registers.set_reg_16_val(self, value);
        Ok(())
    }
}
