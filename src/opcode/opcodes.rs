/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt::{self, Display, Formatter};

use super::DecodeError;
use self::OpCode::*;

/// 8-bit operand selected by a 3-bit register code.
///
/// `M` is the memory-indirect pseudo register: the byte stored at the address held by the `HL`
/// pair.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Register {
    B,
    C,
    D,
    E,
    H,
    L,
    M,
    A,
}

impl Register {
    /// Resolves the 3-bit register code used in the opcode encoding (`000` = B .. `111` = A).
    pub fn from_code(code: u8) -> Result<Register, DecodeError> {
        match code {
            0 => Ok(Register::B),
            1 => Ok(Register::C),
            2 => Ok(Register::D),
            3 => Ok(Register::E),
            4 => Ok(Register::H),
            5 => Ok(Register::L),
            6 => Ok(Register::M),
            7 => Ok(Register::A),
            _ => Err(DecodeError::InvalidRegister(code)),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// 16-bit operand selected by a 2-bit register pair code.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Reg16 {
    B,
    D,
    H,
    SP,
}

impl Reg16 {
    /// Resolves the 2-bit register pair code (`00` = BC, `01` = DE, `10` = HL, `11` = SP).
    pub fn from_code(code: u8) -> Result<Reg16, DecodeError> {
        match code {
            0 => Ok(Reg16::B),
            1 => Ok(Reg16::D),
            2 => Ok(Reg16::H),
            3 => Ok(Reg16::SP),
            _ => Err(DecodeError::InvalidRegisterPair(code)),
        }
    }
}

impl Display for Reg16 {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Condition tested by conditional jumps, calls and returns. It is never stored, only evaluated
/// against the flags when the instruction executes.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Condition {
    /// Condition encoded in bits 5-3 of the opcode.
    pub fn from_code(code: u8) -> Condition {
        match code & 0x07 {
            0 => Condition::NotZero,
            1 => Condition::Zero,
            2 => Condition::NoCarry,
            3 => Condition::Carry,
            4 => Condition::ParityOdd,
            5 => Condition::ParityEven,
            6 => Condition::Plus,
            _ => Condition::Minus,
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let suffix = match *self {
            Condition::NotZero => "NZ",
            Condition::Zero => "Z",
            Condition::NoCarry => "NC",
            Condition::Carry => "C",
            Condition::ParityOdd => "PO",
            Condition::ParityEven => "PE",
            Condition::Plus => "P",
            Condition::Minus => "M",
        };
        f.write_str(suffix)
    }
}

/// Accumulator operation selected by bits 5-3 of the `10xxxxxx` and `11xxx110` opcodes.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    pub fn from_code(code: u8) -> AluOp {
        match code & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbb,
            4 => AluOp::Ana,
            5 => AluOp::Xra,
            6 => AluOp::Ora,
            _ => AluOp::Cmp,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Adc => "ADC",
            AluOp::Sub => "SUB",
            AluOp::Sbb => "SBB",
            AluOp::Ana => "ANA",
            AluOp::Xra => "XRA",
            AluOp::Ora => "ORA",
            AluOp::Cmp => "CMP",
        }
    }

    fn immediate_mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADI",
            AluOp::Adc => "ACI",
            AluOp::Sub => "SUI",
            AluOp::Sbb => "SBI",
            AluOp::Ana => "ANI",
            AluOp::Xra => "XRI",
            AluOp::Ora => "ORI",
            AluOp::Cmp => "CPI",
        }
    }
}

/// A decoded instruction, with the data bytes which follow the opcode in memory.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpCode {
    Nop,

    // Data transfer
    Mov(Register, Register),
    Mvi(Register, u8),
    Lxi(Reg16, u16),
    Lda(u16),
    Sta(u16),
    Lhld(u16),
    Shld(u16),
    Ldax(Reg16),
    Stax(Reg16),
    Xchg,

    // Arithmetic and logical
    Alu(AluOp, Register),
    AluImmediate(AluOp, u8),
    Inr(Register),
    Dcr(Register),
    Inx(Reg16),
    Dcx(Reg16),
    Dad(Reg16),
    Daa,
    Rlc,
    Rrc,
    Ral,
    Rar,
    Cma,
    Cmc,
    Stc,

    // Branch
    Jmp(u16),
    JumpIf(Condition, u16),
    Call(u16),
    CallIf(Condition, u16),
    Ret,
    ReturnIf(Condition),
    Rst(u8),
    Pchl,

    // Stack, I/O, and Machine Control
    Push(Reg16),
    PushPsw,
    Pop(Reg16),
    PopPsw,
    Xthl,
    Sphl,
    In(u8),
    Out(u8),
    Ei,
    Di,
    Hlt,
}

impl OpCode {
    /// Encoded length of the instruction in bytes, opcode included.
    pub fn size(&self) -> u16 {
        match *self {
            Lxi(_, _)
            | Lda(_)
            | Sta(_)
            | Lhld(_)
            | Shld(_)
            | Jmp(_)
            | JumpIf(_, _)
            | Call(_)
            | CallIf(_, _) => 3,
            Mvi(_, _) | AluImmediate(_, _) | In(_) | Out(_) => 2,
            _ => 1,
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Nop => write!(f, "NOP"),

            Mov(dst, src) => write!(f, "MOV {},{}", dst, src),
            Mvi(reg, v) => write!(f, "MVI {},${:02x}", reg, v),
            Lxi(reg, v) => write!(f, "LXI {},${:04x}", reg, v),
            Lda(adr) => write!(f, "LDA ${:04x}", adr),
            Sta(adr) => write!(f, "STA ${:04x}", adr),
            Lhld(adr) => write!(f, "LHLD ${:04x}", adr),
            Shld(adr) => write!(f, "SHLD ${:04x}", adr),
            Ldax(reg) => write!(f, "LDAX {}", reg),
            Stax(reg) => write!(f, "STAX {}", reg),
            Xchg => write!(f, "XCHG"),

            Alu(op, reg) => write!(f, "{} {}", op.mnemonic(), reg),
            AluImmediate(op, v) => write!(f, "{} ${:02x}", op.immediate_mnemonic(), v),
            Inr(reg) => write!(f, "INR {}", reg),
            Dcr(reg) => write!(f, "DCR {}", reg),
            Inx(reg) => write!(f, "INX {}", reg),
            Dcx(reg) => write!(f, "DCX {}", reg),
            Dad(reg) => write!(f, "DAD {}", reg),
            Daa => write!(f, "DAA"),
            Rlc => write!(f, "RLC"),
            Rrc => write!(f, "RRC"),
            Ral => write!(f, "RAL"),
            Rar => write!(f, "RAR"),
            Cma => write!(f, "CMA"),
            Cmc => write!(f, "CMC"),
            Stc => write!(f, "STC"),

            Jmp(adr) => write!(f, "JMP ${:04x}", adr),
            JumpIf(cond, adr) => write!(f, "J{} ${:04x}", cond, adr),
            Call(adr) => write!(f, "CALL ${:04x}", adr),
            CallIf(cond, adr) => write!(f, "C{} ${:04x}", cond, adr),
            Ret => write!(f, "RET"),
            ReturnIf(cond) => write!(f, "R{}", cond),
            Rst(v) => write!(f, "RST {}", v),
            Pchl => write!(f, "PCHL"),

            Push(reg) => write!(f, "PUSH {}", reg),
            PushPsw => write!(f, "PUSH PSW"),
            Pop(reg) => write!(f, "POP {}", reg),
            PopPsw => write!(f, "POP PSW"),
            Xthl => write!(f, "XTHL"),
            Sphl => write!(f, "SPHL"),
            In(port) => write!(f, "IN ${:02x}", port),
            Out(port) => write!(f, "OUT ${:02x}", port),
            Ei => write!(f, "EI"),
            Di => write!(f, "DI"),
            Hlt => write!(f, "HLT"),
        }
    }
}
