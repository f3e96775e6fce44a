/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Property-based tests for processor invariants.

use intel_8080_emu::opcode::Reg16;
use intel_8080_emu::proc_state::{Flags, NoPorts, Proc8080};
use proptest::prelude::*;

/// A processor with the whole address space and `program` at address 0.
fn cpu_with_program(program: &[u8]) -> Proc8080<NoPorts> {
    let mut memory = vec![0x00; 0x10000];
    memory[..program.len()].copy_from_slice(program);
    Proc8080::new(memory.into_boxed_slice(), NoPorts)
}

fn parity_even(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

proptest! {
    #[test]
    fn add_then_subtract_with_held_carry_restores_accumulator(a: u8, b: u8, carry: bool) {
        // ADC B; SBB B
        let mut cpu = cpu_with_program(&[0x88, 0x98]);
        cpu.registers_mut().a = a;
        cpu.registers_mut().b = b;

        cpu.flags_mut().cy = carry;
        cpu.emulate().unwrap();
        cpu.flags_mut().cy = carry;
        cpu.emulate().unwrap();

        prop_assert_eq!(cpu.registers().a, a);
    }

    #[test]
    fn add_then_subtract_restores_accumulator(a: u8, b: u8, carry: bool) {
        // ADD B; SUB B
        let mut cpu = cpu_with_program(&[0x80, 0x90]);
        cpu.registers_mut().a = a;
        cpu.registers_mut().b = b;
        cpu.flags_mut().cy = carry;

        cpu.emulate().unwrap();
        cpu.emulate().unwrap();

        prop_assert_eq!(cpu.registers().a, a);
    }

    #[test]
    fn logical_operations_set_parity(a: u8, b: u8, op in prop::sample::select(vec![0xa0u8, 0xa8, 0xb0])) {
        // ANA B, XRA B or ORA B
        let mut cpu = cpu_with_program(&[op]);
        cpu.registers_mut().a = a;
        cpu.registers_mut().b = b;
        cpu.flags_mut().cy = true;

        cpu.emulate().unwrap();

        let result = cpu.registers().a;
        let expected = match op {
            0xa0 => a & b,
            0xa8 => a ^ b,
            _ => a | b,
        };
        prop_assert_eq!(result, expected);
        prop_assert_eq!(cpu.flags().p, parity_even(result));
        prop_assert_eq!(cpu.flags().z, result == 0);
        prop_assert_eq!(cpu.flags().s, result & 0x80 != 0);
        prop_assert!(!cpu.flags().cy);
    }

    #[test]
    fn push_then_pop_restores_register_pair(
        value: u16,
        sp in 0x0100u16..=0xffff,
        pair in prop::sample::select(vec![(Reg16::B, 0xc5u8, 0xc1u8), (Reg16::D, 0xd5, 0xd1), (Reg16::H, 0xe5, 0xe1)]),
    ) {
        let (reg, push, pop) = pair;
        let mut cpu = cpu_with_program(&[push, pop]);
        cpu.registers_mut().sp = sp;
        cpu.registers_mut().set_reg_16_val(reg, value);

        cpu.emulate().unwrap();
        prop_assert_eq!(cpu.registers().sp, sp.wrapping_sub(2));
        cpu.registers_mut().set_reg_16_val(reg, 0x0000);
        cpu.emulate().unwrap();

        prop_assert_eq!(cpu.registers().reg_16_val(reg), value);
        prop_assert_eq!(cpu.registers().sp, sp);
    }

    #[test]
    fn push_then_pop_restores_processor_status_word(a: u8, psw: u8, sp in 0x0100u16..=0xffff) {
        // PUSH PSW; POP PSW
        let mut cpu = cpu_with_program(&[0xf5, 0xf1]);
        cpu.registers_mut().sp = sp;
        cpu.registers_mut().a = a;
        *cpu.flags_mut() = Flags::from_processor_status_word(psw);
        let flags = *cpu.flags();

        cpu.emulate().unwrap();
        cpu.registers_mut().a = !a;
        *cpu.flags_mut() = Default::default();
        cpu.emulate().unwrap();

        prop_assert_eq!(cpu.registers().a, a);
        prop_assert_eq!(*cpu.flags(), flags);
    }

    #[test]
    fn call_then_return_comes_back_after_call(target in 0x0010u16..0xff00, sp in 0x0100u16..=0xffff) {
        let stack = sp.wrapping_sub(2)..sp;
        prop_assume!(!stack.contains(&target));

        let [low, high] = target.to_le_bytes();
        let mut cpu = cpu_with_program(&[0xcd, low, high]);
        cpu.memory_mut()[target as usize] = 0xc9;
        cpu.registers_mut().sp = sp;

        cpu.emulate().unwrap();
        prop_assert_eq!(cpu.registers().pc, target);
        cpu.emulate().unwrap();

        prop_assert_eq!(cpu.registers().pc, 0x0003);
        prop_assert_eq!(cpu.registers().sp, sp);
    }

    #[test]
    fn increment_then_decrement_pair(value: u16) {
        // INX H; DCX H
        let mut cpu = cpu_with_program(&[0x23, 0x2b]);
        cpu.registers_mut().set_reg_16_val(Reg16::H, value);

        cpu.emulate().unwrap();
        prop_assert_eq!(cpu.registers().hl(), value.wrapping_add(1));
        cpu.emulate().unwrap();

        prop_assert_eq!(cpu.registers().hl(), value);
    }

    #[test]
    fn memory_operand_behaves_like_register(a: u8, value: u8, carry: bool, hl in 0x0100u16..=0xffff) {
        // ADC B against ADC M
        let mut with_register = cpu_with_program(&[0x88]);
        with_register.registers_mut().a = a;
        with_register.registers_mut().b = value;
        with_register.flags_mut().cy = carry;

        let mut with_memory = cpu_with_program(&[0x8e]);
        with_memory.registers_mut().a = a;
        with_memory.registers_mut().set_reg_16_val(Reg16::H, hl);
        with_memory.memory_mut()[hl as usize] = value;
        with_memory.flags_mut().cy = carry;

        with_register.emulate().unwrap();
        with_memory.emulate().unwrap();

        prop_assert_eq!(with_register.registers().a, with_memory.registers().a);
        prop_assert_eq!(*with_register.flags(), *with_memory.flags());
    }
}
