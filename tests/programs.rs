/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use intel_8080_emu::driver::{Machine, MachineConfig, StopReason};
use intel_8080_emu::opcode::{DecodeError, OpCode, Reg16};
use intel_8080_emu::proc_state::DataBus;
use intel_8080_emu::EmulatorError;

fn load(program: &[u8]) -> Machine {
    Machine::from_program(program, MachineConfig::default()).unwrap()
}

#[test]
fn multiply_by_repeated_addition() {
    // MVI A,0; MVI B,5; MVI C,3; loop: ADD B; DCR C; JNZ loop; HLT
    let mut machine = load(&[
        0x3e, 0x00, 0x06, 0x05, 0x0e, 0x03, 0x80, 0x0d, 0xc2, 0x06, 0x00, 0x76,
    ]);

    assert_eq!(machine.run().unwrap(), StopReason::Halted);
    assert_eq!(machine.cpu().registers().a, 0x0f);
    assert_eq!(machine.cpu().registers().c, 0x00);
    assert!(machine.cpu().flags().z);
    assert_eq!(machine.cpu().registers().pc, 0x000c);
    assert_eq!(machine.steps(), 13);
}

#[test]
fn subroutine_call_and_return() {
    // LXI SP,$0100; CALL $0008; HLT; NOP; MVI A,$42; RET
    let mut machine = load(&[
        0x31, 0x00, 0x01, 0xcd, 0x08, 0x00, 0x76, 0x00, 0x3e, 0x42, 0xc9,
    ]);

    assert_eq!(machine.run().unwrap(), StopReason::Halted);
    let cpu = machine.cpu();
    assert_eq!(cpu.registers().a, 0x42);
    assert_eq!(cpu.registers().sp, 0x0100);
    assert_eq!(cpu.registers().pc, 0x0007);
    assert_eq!(cpu.memory()[0x00fe], 0x06);
    assert_eq!(cpu.memory()[0x00ff], 0x00);
}

#[test]
fn binary_coded_decimal_addition() {
    // MVI A,$38; ADI $45; DAA; HLT
    let mut machine = load(&[0x3e, 0x38, 0xc6, 0x45, 0x27, 0x76]);
    machine.run().unwrap();
    assert_eq!(machine.cpu().registers().a, 0x83);
    assert!(!machine.cpu().flags().cy);

    // MVI A,$99; ADI $01; DAA; HLT
    let mut machine = load(&[0x3e, 0x99, 0xc6, 0x01, 0x27, 0x76]);
    machine.run().unwrap();
    assert_eq!(machine.cpu().registers().a, 0x00);
    assert!(machine.cpu().flags().cy);
    assert!(machine.cpu().flags().z);
}

#[test]
fn copy_block_with_register_pairs() {
    // LXI H,$0018; LXI D,$0030; MVI C,3;
    // loop: MOV A,M; STAX D; INX H; INX D; DCR C; JNZ loop; HLT
    let mut program: Vec<u8> = vec![
        0x21, 0x18, 0x00, 0x11, 0x30, 0x00, 0x0e, 0x03, 0x7e, 0x12, 0x23, 0x13, 0x0d, 0xc2, 0x08,
        0x00, 0x76,
    ];
    program.resize(0x18, 0x00);
    program.extend_from_slice(&[0xde, 0xad, 0x42]);

    let mut machine = load(&program);
    assert_eq!(machine.run().unwrap(), StopReason::Halted);
    assert_eq!(&machine.cpu().memory()[0x30..0x33], &[0xde, 0xad, 0x42]);
    assert_eq!(machine.cpu().registers().reg_16_val(Reg16::H), 0x001b);
    assert_eq!(machine.cpu().registers().reg_16_val(Reg16::D), 0x0033);
}

#[test]
fn running_past_the_program_ends_the_run() {
    // MVI A,1; INR A
    let mut machine = load(&[0x3e, 0x01, 0x3c]);

    assert_eq!(machine.run().unwrap(), StopReason::ProgramEnd);
    assert_eq!(machine.cpu().registers().a, 0x02);
    assert_eq!(machine.cpu().registers().pc, 0x0003);
    assert_eq!(machine.steps(), 2);
}

#[test]
fn running_off_the_end_of_memory() {
    let config = MachineConfig {
        working_ram: 4,
        stop_at_program_end: false,
        ..Default::default()
    };
    let mut machine = Machine::from_program(&[0x3c], config).unwrap();

    match machine.run() {
        Err(EmulatorError::MemoryOutOfBounds { address: 0x0005, pc: 0x0005 }) => {}
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(machine.steps(), 5);
    assert_eq!(machine.cpu().registers().a, 0x01);
}

#[test]
fn unknown_opcode_stops_the_run() {
    let mut machine = load(&[0x00, 0xed]);

    match machine.run() {
        Err(EmulatorError::Decode { opcode, address, source }) => {
            assert_eq!(opcode, 0xed);
            assert_eq!(address, 0x0001);
            assert_eq!(source, DecodeError::UnknownOpcode(0xed));
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(machine.cpu().registers().pc, 0x0001);
    assert_eq!(machine.steps(), 1);
}

#[test]
fn error_message_reports_byte_and_address() {
    let mut machine = load(&[0x00, 0x00, 0x08]);
    let error = machine.run().unwrap_err();
    let message = error.to_string();
    assert!(message.contains("$08"), "{}", message);
    assert!(message.contains("$0002"), "{}", message);
}

#[test]
fn truncated_instruction_at_end_of_memory() {
    let config = MachineConfig {
        working_ram: 0,
        ..Default::default()
    };
    let mut machine = Machine::from_program(&[0x00, 0xc3, 0x00], config).unwrap();

    match machine.run() {
        Err(EmulatorError::Decode { opcode: 0xc3, address: 0x0001, source }) => {
            assert_eq!(source, DecodeError::UnexpectedEndOfInput)
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn infinite_loop_hits_step_limit() {
    let config = MachineConfig {
        max_steps: Some(10),
        ..Default::default()
    };
    let mut machine = Machine::from_program(&[0xc3, 0x00, 0x00], config).unwrap();

    assert_eq!(machine.run().unwrap(), StopReason::StepLimit);
    assert_eq!(machine.steps(), 10);
    assert_eq!(machine.cpu().registers().pc, 0x0000);
}

#[test]
fn interrupt_restarts_to_vector() {
    // LXI SP,$0200; EI; self: JMP self; NOP; rst1: MVI A,$77; HLT
    let mut machine = load(&[
        0x31, 0x00, 0x02, 0xfb, 0xc3, 0x04, 0x00, 0x00, 0x3e, 0x77, 0x76,
    ]);
    let mut interrupts = |steps: u64| if steps == 5 { Some(1) } else { None };

    assert_eq!(machine.run_with(&mut interrupts).unwrap(), StopReason::Halted);
    let cpu = machine.cpu();
    assert_eq!(cpu.registers().a, 0x77);
    assert!(!cpu.interrupt_enabled());
    assert_eq!(cpu.registers().sp, 0x01fe);
    assert_eq!(cpu.memory()[0x01fe], 0x04);
    assert_eq!(cpu.memory()[0x01ff], 0x00);
    assert_eq!(machine.steps(), 7);
}

#[test]
fn stack_outside_memory() {
    let config = MachineConfig {
        working_ram: 0,
        ..Default::default()
    };
    let mut machine = Machine::from_program(&[0xc5], config).unwrap();

    match machine.run() {
        Err(EmulatorError::MemoryOutOfBounds { address, pc }) => {
            assert_eq!(address, 0xffff);
            assert_eq!(pc, 0x0000);
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(machine.cpu().registers().sp, 0x0000);
}

struct RecordingBus {
    input: u8,
    written: Vec<(u8, u8)>,
}

impl DataBus for RecordingBus {
    fn read_port(&self, port: u8) -> u8 {
        self.input.wrapping_add(port)
    }

    fn write_port(&mut self, port: u8, value: u8) {
        self.written.push((port, value));
    }
}

#[test]
fn ports_go_through_the_data_bus() {
    let bus = RecordingBus {
        input: 0x4a,
        written: Vec::new(),
    };
    // IN $10; OUT $20; HLT
    let mut machine =
        Machine::with_bus(&[0xdb, 0x10, 0xd3, 0x20, 0x76], MachineConfig::default(), bus).unwrap();

    assert_eq!(machine.run().unwrap(), StopReason::Halted);
    assert_eq!(machine.cpu().registers().a, 0x5a);
    assert_eq!(machine.cpu().data_bus().written, vec![(0x20, 0x5a)]);
}

/// A host can service system calls by inspecting the next instruction before stepping.
#[test]
fn host_intercepts_print_string_call() {
    // LXI D,$0009; MVI C,9; CALL $0005; HLT; "OK$"
    let mut machine = load(&[
        0x11, 0x09, 0x00, 0x0e, 0x09, 0xcd, 0x05, 0x00, 0x76, b'O', b'K', b'$',
    ]);
    let mut output = String::new();

    while machine.stop_reason().is_none() {
        let cpu = machine.cpu();
        if cpu.next_opcode().unwrap() == OpCode::Call(0x0005) && cpu.registers().c == 9 {
            let start = cpu.registers().reg_16_val(Reg16::D) as usize;
            output.extend(
                cpu.memory()[start..]
                    .iter()
                    .take_while(|&&byte| byte != b'$')
                    .map(|&byte| char::from(byte)),
            );
            machine.cpu_mut().registers_mut().pc += 3;
        } else {
            machine.step().unwrap();
        }
    }

    assert_eq!(output, "OK");
    assert_eq!(machine.stop_reason(), Some(StopReason::Halted));
    assert_eq!(machine.steps(), 3);
}

#[test]
fn program_loaded_from_file() {
    let path = std::env::temp_dir().join(format!("i8080-load-{}.bin", std::process::id()));
    std::fs::write(&path, [0x3e_u8, 0x2a, 0x76]).unwrap();

    let mut machine = Machine::from_file(&path, MachineConfig::default()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(machine.program_len(), 3);
    assert_eq!(machine.run().unwrap(), StopReason::Halted);
    assert_eq!(machine.cpu().registers().a, 0x2a);
}

#[test]
fn missing_program_file() {
    match Machine::from_file("/nonexistent/program.bin", MachineConfig::default()) {
        Err(EmulatorError::Io(_)) => {}
        other => panic!("unexpected result {:?}", other.map(|m| m.steps())),
    }
}

#[test]
fn interrupt_source_with_invalid_vector() {
    // EI; NOP; NOP
    let mut machine = load(&[0xfb, 0x00, 0x00]);
    machine.cpu_mut().registers_mut().sp = 0x0100;
    let mut source = |steps: u64| if steps == 1 { Some(8) } else { None };

    match machine.run_with(&mut source) {
        Err(EmulatorError::InvalidInterruptVector(8)) => {}
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(machine.steps(), 1);
    assert_eq!(machine.cpu().registers().pc, 0x0001);
    assert_eq!(machine.cpu().registers().sp, 0x0100);
    assert!(machine.cpu().interrupt_enabled());
}
