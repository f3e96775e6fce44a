/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod opcodes;
pub use self::opcodes::AluOp;
pub use self::opcodes::Condition;
pub use self::opcodes::OpCode;
pub use self::opcodes::Reg16;
pub use self::opcodes::Register;

use std::io::{self, BufRead};

use log::warn;
use thiserror::Error;

use self::opcodes::OpCode::*;

/// Reasons why a byte sequence cannot be decoded into an [`OpCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode ${0:02x}")]
    UnknownOpcode(u8),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("invalid register code {0}")]
    InvalidRegister(u8),
    #[error("invalid register pair code {0}")]
    InvalidRegisterPair(u8),
}

/// Read a slice of bytes and returns an opcode, possibly with its data.
///
/// Decoding follows the bit fields of the 8080 encoding: `ddd` (bits 5-3) selects a destination
/// register, an ALU operation or a condition, `sss` (bits 2-0) a source register and `rp`
/// (bits 5-4) a register pair. The twelve undocumented opcodes (`$08`, `$10`, `$18`, `$20`, `$28`,
/// `$30`, `$38`, `$cb`, `$d9`, `$dd`, `$ed` and `$fd`) are rejected with
/// [`DecodeError::UnknownOpcode`].
///
/// The parsing fails with [`DecodeError::UnexpectedEndOfInput`] if the slice is too short for the
/// data bytes of the instruction.
pub fn read_opcode(bytes: &[u8]) -> Result<OpCode, DecodeError> {
    let opcode = *bytes.first().ok_or(DecodeError::UnexpectedEndOfInput)?;
    let ddd = (opcode >> 3) & 0x07;
    let sss = opcode & 0x07;
    let rp = (opcode >> 4) & 0x03;

    let op = match opcode {
        0x00 => Nop,
        0x02 => Stax(Reg16::B),
        0x12 => Stax(Reg16::D),
        0x0a => Ldax(Reg16::B),
        0x1a => Ldax(Reg16::D),
        0x22 => Shld(expect_data_u16(bytes)?),
        0x2a => Lhld(expect_data_u16(bytes)?),
        0x32 => Sta(expect_data_u16(bytes)?),
        0x3a => Lda(expect_data_u16(bytes)?),
        0x07 => Rlc,
        0x0f => Rrc,
        0x17 => Ral,
        0x1f => Rar,
        0x27 => Daa,
        0x2f => Cma,
        0x37 => Stc,
        0x3f => Cmc,
        0x76 => Hlt,

        0xc3 => Jmp(expect_data_u16(bytes)?),
        0xc9 => Ret,
        0xcd => Call(expect_data_u16(bytes)?),
        0xd3 => Out(expect_data_byte(bytes)?),
        0xdb => In(expect_data_byte(bytes)?),
        0xe3 => Xthl,
        0xe9 => Pchl,
        0xeb => Xchg,
        0xf1 => PopPsw,
        0xf3 => Di,
        0xf5 => PushPsw,
        0xf9 => Sphl,
        0xfb => Ei,

        op if op & 0xcf == 0x01 => Lxi(Reg16::from_code(rp)?, expect_data_u16(bytes)?),
        op if op & 0xcf == 0x03 => Inx(Reg16::from_code(rp)?),
        op if op & 0xcf == 0x09 => Dad(Reg16::from_code(rp)?),
        op if op & 0xcf == 0x0b => Dcx(Reg16::from_code(rp)?),
        op if op & 0xc7 == 0x04 => Inr(Register::from_code(ddd)?),
        op if op & 0xc7 == 0x05 => Dcr(Register::from_code(ddd)?),
        op if op & 0xc7 == 0x06 => Mvi(Register::from_code(ddd)?, expect_data_byte(bytes)?),

        0x40..=0x7f => Mov(Register::from_code(ddd)?, Register::from_code(sss)?),
        0x80..=0xbf => Alu(AluOp::from_code(ddd), Register::from_code(sss)?),

        op if op & 0xc7 == 0xc0 => ReturnIf(Condition::from_code(ddd)),
        op if op & 0xc7 == 0xc2 => JumpIf(Condition::from_code(ddd), expect_data_u16(bytes)?),
        op if op & 0xc7 == 0xc4 => CallIf(Condition::from_code(ddd), expect_data_u16(bytes)?),
        op if op & 0xc7 == 0xc6 => AluImmediate(AluOp::from_code(ddd), expect_data_byte(bytes)?),
        op if op & 0xc7 == 0xc7 => Rst(ddd),
        // PSW (rp = 3) is matched above
        op if op & 0xcf == 0xc1 => Pop(Reg16::from_code(rp)?),
        op if op & 0xcf == 0xc5 => Push(Reg16::from_code(rp)?),

        op => return Err(DecodeError::UnknownOpcode(op)),
    };
    Ok(op)
}

fn expect_data_u16(bytes: &[u8]) -> Result<u16, DecodeError> {
    expect_2_data_bytes(bytes).map(|(low, high)| u16::from_le_bytes([low, high]))
}

fn expect_2_data_bytes(bytes: &[u8]) -> Result<(u8, u8), DecodeError> {
    bytes
        .get(1)
        .and_then(|a| bytes.get(2).map(|b| (*a, *b)))
        .ok_or(DecodeError::UnexpectedEndOfInput)
}

fn expect_data_byte(bytes: &[u8]) -> Result<u8, DecodeError> {
    bytes.get(1).copied().ok_or(DecodeError::UnexpectedEndOfInput)
}

const MAX_INSTRUCTION_SIZE: usize = 3;

/// Iterator over the instructions of a program, used to build disassemblers.
///
/// An undecodable byte yields an error and the iterator resumes on the following byte. The
/// iteration ends with the input, or on the first I/O error.
pub struct OpCodes<U: BufRead> {
    reader: U,
    /// Bytes taken from `reader` but not decoded yet, at most one instruction long.
    lookahead: Vec<u8>,
    failed: bool,
}

impl<U: BufRead> OpCodes<U> {
    pub fn new(reader: U) -> OpCodes<U> {
        OpCodes {
            reader,
            lookahead: Vec::with_capacity(MAX_INSTRUCTION_SIZE),
            failed: false,
        }
    }

    /// Tops `lookahead` up to a full instruction, across as many `fill_buf` calls as needed.
    fn fill_lookahead(&mut self) -> io::Result<()> {
        while self.lookahead.len() < MAX_INSTRUCTION_SIZE {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if buf.is_empty() {
                break;
            }
            let count = buf.len().min(MAX_INSTRUCTION_SIZE - self.lookahead.len());
            self.lookahead.extend_from_slice(&buf[..count]);
            self.reader.consume(count);
        }
        Ok(())
    }
}

impl<U: BufRead> Iterator for OpCodes<U> {
    type Item = Result<OpCode, DecodeError>;

    fn next(&mut self) -> Option<Result<OpCode, DecodeError>> {
        if self.failed {
            return None;
        }
        if let Err(e) = self.fill_lookahead() {
            warn!("disassembly stopped: {}", e);
            self.failed = true;
            return None;
        }
        if self.lookahead.is_empty() {
            return None;
        }

        let opcode = read_opcode(&self.lookahead);
        let size = match opcode {
            Ok(ref op) => op.size() as usize,
            Err(_) => 1,
        };
        self.lookahead.drain(..size);
        Some(opcode)
    }
}
