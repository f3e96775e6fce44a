/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::opcode::Reg16;

/// Register file of the processor. Everything starts at zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Value of a register pair. The first register of the pair holds the high byte.
    pub fn reg_16_val(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::B => u16::from_be_bytes([self.b, self.c]),
            Reg16::D => u16::from_be_bytes([self.d, self.e]),
            Reg16::H => u16::from_be_bytes([self.h, self.l]),
            Reg16::SP => self.sp,
        }
    }

    pub fn set_reg_16_val(&mut self, reg: Reg16, value: u16) {
        let [high, low] = value.to_be_bytes();
        match reg {
            Reg16::B => {
                self.b = high;
                self.c = low;
            }
            Reg16::D => {
                self.d = high;
                self.e = low;
            }
            Reg16::H => {
                self.h = high;
                self.l = low;
            }
            Reg16::SP => self.sp = value,
        }
    }

    /// Address targeted by the memory-indirect pseudo register `M`.
    pub fn hl(&self) -> u16 {
        self.reg_16_val(Reg16::H)
    }
}
