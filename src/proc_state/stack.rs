/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use super::{DataBus, Flags, Proc8080};
use crate::error::Result;
use crate::opcode::Reg16;

/// Stack discipline and control transfer.
///
/// A pushed word occupies `sp-1` (high byte) and `sp-2` (low byte); the stack grows downward.
impl<Bus: DataBus> Proc8080<Bus> {
    pub(super) fn push_stack(&mut self, value: u16) -> Result<()> {
        let new_stack_pointer = self.registers.sp.wrapping_sub(2);
        self.write_word(new_stack_pointer, value)?;
        self.registers.sp = new_stack_pointer;
        Ok(())
    }

    pub(super) fn pop_stack(&mut self) -> Result<u16> {
        let sp = self.registers.sp;
        let value = self.read_word(sp)?;
        self.registers.sp = sp.wrapping_add(2);
        Ok(value)
    }

    /// The program counter already points after the `CALL`, which is the return address.
    pub(super) fn apply_call(&mut self, addr: u16) -> Result<()> {
        let pc = self.registers.pc;
        self.push_stack(pc)?;
        self.registers.pc = addr;
        Ok(())
    }

    pub(super) fn apply_return(&mut self) -> Result<()> {
        self.registers.pc = self.pop_stack()?;
        Ok(())
    }

    pub(super) fn restart(&mut self, vector: u8) -> Result<()> {
        self.apply_call(((vector as u16) << 3) & 0x0038)
    }

    pub(super) fn push_reg(&mut self, reg: Reg16) -> Result<()> {
        let value = self.registers.reg_16_val(reg);
        self.push_stack(value)
    }

    pub(super) fn pop_register(&mut self, reg: Reg16) -> Result<()> {
        let value = self.pop_stack()?;
        self.registers.set_reg_16_val(reg, value);
        Ok(())
    }

    /// Accumulator in the high byte, packed flags in the low byte.
    pub(super) fn push_processor_status_word(&mut self) -> Result<()> {
        let psw = self.flags.to_processor_status_word();
        self.push_stack(u16::from_be_bytes([self.registers.a, psw]))
    }

    pub(super) fn pop_processor_status_word(&mut self) -> Result<()> {
        let [a, psw] = self.pop_stack()?.to_be_bytes();
        self.registers.a = a;
        self.flags = Flags::from_processor_status_word(psw);
        Ok(())
    }

    pub(super) fn xthl(&mut self) -> Result<()> {
        let addr = self.registers.sp;
        let h_value = self.registers.hl();
        let mem_value = self.read_word(addr)?;
        self.write_word(addr, h_value)?;
        self.registers.set_reg_16_val(Reg16::H, mem_value);
        Ok(())
    }
}
