/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::opcode::Condition;

const CARRY_BIT: u8 = 1;
const PADDING_BITS: u8 = 1 << 1;
const PARITY_BIT: u8 = 1 << 2;
const AUX_CARRY_BIT: u8 = 1 << 4;
const ZERO_BIT: u8 = 1 << 6;
const SIGN_BIT: u8 = 1 << 7;

#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct Flags {
    pub z: bool,
    pub s: bool,
    pub p: bool,
    pub cy: bool,
    pub ac: bool,
}

impl Flags {
    /// Unpacks the flag byte pushed by `PUSH PSW`. Padding bits are ignored.
    pub fn from_processor_status_word(psw: u8) -> Flags {
        Flags {
            z: (psw & ZERO_BIT) != 0,
            s: (psw & SIGN_BIT) != 0,
            p: (psw & PARITY_BIT) != 0,
            cy: (psw & CARRY_BIT) != 0,
            ac: (psw & AUX_CARRY_BIT) != 0,
        }
    }

    /// Packs the flags in the 8080 layout: `S Z 0 AC 0 P 1 CY`.
    pub fn to_processor_status_word(&self) -> u8 {
        let mut psw = PADDING_BITS;
        if self.cy {
            psw |= CARRY_BIT;
        }
        if self.p {
            psw |= PARITY_BIT;
        }
        if self.ac {
            psw |= AUX_CARRY_BIT;
        }
        if self.z {
            psw |= ZERO_BIT;
        }
        if self.s {
            psw |= SIGN_BIT;
        }
        psw
    }

    /// Sets zero, sign and parity from a result byte.
    pub fn set_zsp(&mut self, result: u8) {
        self.z = result == 0;
        self.s = (result & 0x80) != 0;
        self.p = Flags::parity(result);
    }

    pub fn condition(&self, condition: Condition) -> bool {
        match condition {
            Condition::NotZero => !self.z,
            Condition::Zero => self.z,
            Condition::NoCarry => !self.cy,
            Condition::Carry => self.cy,
            Condition::ParityOdd => !self.p,
            Condition::ParityEven => self.p,
            Condition::Plus => !self.s,
            Condition::Minus => self.s,
        }
    }

    /// Even parity: `true` when `value` has an even number of bits set.
    pub fn parity(mut value: u8) -> bool {
        value ^= value >> 4;
        value ^= value >> 2;
        value ^= value >> 1;
        (value & 1) == 0
    }
}
