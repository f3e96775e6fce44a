/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Arithmetic and logic operations. Each function takes its operands by value, updates the flags
//! it is documented to affect and returns the result.

use super::Flags;

/// `a + value (+ 1 if carry_in)`.
///
/// The carry flag reports an overflow of `a + value` alone: the incoming carry does not take
/// part in it.
pub fn add(flags: &mut Flags, a: u8, value: u8, carry_in: bool) -> u8 {
    let carry = carry_in as u8;
    let result = a.wrapping_add(value).wrapping_add(carry);
    flags.set_zsp(result);
    flags.cy = (a as u16) + (value as u16) > 0xff;
    flags.ac = (a & 0x0f) + (value & 0x0f) + carry > 0x0f;
    result
}

/// `a - value (- 1 if borrow_in)`.
///
/// The carry flag is set when `a < value` (unsigned), regardless of the incoming borrow.
pub fn sub(flags: &mut Flags, a: u8, value: u8, borrow_in: bool) -> u8 {
    let borrow = borrow_in as u8;
    let result = a.wrapping_sub(value).wrapping_sub(borrow);
    flags.set_zsp(result);
    flags.cy = a < value;
    // carry out of bit 3 of a + !value + 1
    flags.ac = (a & 0x0f) >= (value & 0x0f) + borrow;
    result
}

/// Same flags as [`sub`], result discarded.
pub fn compare(flags: &mut Flags, a: u8, value: u8) {
    sub(flags, a, value, false);
}

/// Clears the carry, keeps the auxiliary carry.
pub fn and(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let result = a & value;
    flags.set_zsp(result);
    flags.cy = false;
    result
}

pub fn xor(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let result = a ^ value;
    flags.set_zsp(result);
    flags.cy = false;
    flags.ac = false;
    result
}

pub fn or(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let result = a | value;
    flags.set_zsp(result);
    flags.cy = false;
    flags.ac = false;
    result
}

/// `INR`: zero, sign and parity only.
pub fn increment(flags: &mut Flags, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    flags.set_zsp(result);
    result
}

/// `DCR`: zero, sign and parity only.
pub fn decrement(flags: &mut Flags, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    flags.set_zsp(result);
    result
}

/// `DAD`: only the carry is affected.
pub fn add_16(flags: &mut Flags, hl: u16, value: u16) -> u16 {
    let result = (hl as u32) + (value as u32);
    flags.cy = result > 0xffff;
    result as u16
}

pub fn rotate_left(flags: &mut Flags, a: u8) -> u8 {
    flags.cy = (a & 0x80) != 0;
    a.rotate_left(1)
}

pub fn rotate_right(flags: &mut Flags, a: u8) -> u8 {
    flags.cy = (a & 0x01) != 0;
    a.rotate_right(1)
}

pub fn rotate_left_through_carry(flags: &mut Flags, a: u8) -> u8 {
    let carry = flags.cy as u8;
    flags.cy = (a & 0x80) != 0;
    (a << 1) | carry
}

pub fn rotate_right_through_carry(flags: &mut Flags, a: u8) -> u8 {
    let carry = (flags.cy as u8) << 7;
    flags.cy = (a & 0x01) != 0;
    (a >> 1) | carry
}

/// Decimal adjust.
///
/// The low correction (`+6`) leaves the flags alone. When the high correction (`+$60`) applies,
/// zero, sign, parity and carry are recomputed from that addition.
pub fn decimal_adjust(flags: &mut Flags, a: u8) -> u8 {
    let mut a = a;
    if a & 0x0f > 9 || flags.ac {
        a = a.wrapping_add(0x06);
    }
    if a >> 4 > 9 || flags.cy {
        let result = a.wrapping_add(0x60);
        flags.set_zsp(result);
        flags.cy = (a as u16) + 0x60 > 0xff;
        a = result;
    }
    a
}
