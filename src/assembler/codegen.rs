//! Encodes a parsed program into POM8 machine words.
//!
//! Every operand was range checked by the parser, so encoding cannot
//! fail. Each format packs 24 bits of fields; the top byte of the
//! 32-bit word is reserved and always zero.
use super::ast::*;
use super::symbols::SymbolTable;

/// Width of an emitted instruction word.
pub const WORD_BITS: usize = 32;

const OPCODE_SHIFT: u32 = 18;
const RD_SHIFT: u32 = 14;
const RS_SHIFT: u32 = 10;
const RT_SHIFT: u32 = 6;

const REG_MASK: u32 = 0xF;
const ADDRESS_MASK: u32 = 0xFFFF;
const IMMEDIATE_MASK: i64 = 0x3FF;

/// Emits one binary string per instruction, in program order.
pub fn generate(program: &Program, symbols: &SymbolTable) -> Vec<String> {
    program
        .iter()
        .map(|ins| format!("{:0width$b}", encode(ins, symbols), width = WORD_BITS))
        .collect()
}

/// Assembles the given instruction to a binary machine word.
pub fn encode(ins: &Instruction, symbols: &SymbolTable) -> u32 {
    match ins.format {
        Format::Register  => encode_register(ins),
        Format::Branch    => encode_branch(ins, symbols),
        Format::Immediate => encode_immediate(ins),
    }
}

fn encode_register(ins: &Instruction) -> u32 {
    let mut regs = [0u32; 3];
    for (slot, op) in regs.iter_mut().zip(ins.operands.iter()) {
        if let Operand::Register(index) = op {
            *slot = *index;
        }
    }

    // IJMP has no destination; its address pair sits in Rs:Rt.
    let [rd, rs, rt] = if ins.mnemonic == Mnemonic::IJMP {
        [0, regs[0], regs[1]]
    } else {
        regs
    };

    fields(0, rd, rs) | ((rt & REG_MASK) << RT_SHIFT) | ins.mnemonic.code()
}

fn encode_branch(ins: &Instruction, symbols: &SymbolTable) -> u32 {
    let address = match ins.operands.first() {
        Some(Operand::Label(name)) => symbols.address(name).unwrap_or(0) as u32,
        Some(Operand::Immediate { value, .. }) => *value as u32,
        _ => 0,
    };

    (ins.mnemonic.code() << OPCODE_SHIFT) | (address & ADDRESS_MASK)
}

fn encode_immediate(ins: &Instruction) -> u32 {
    let mut regs = [0u32; 2];
    let mut immediate: u32 = 0;
    for (idx, op) in ins.operands.iter().enumerate() {
        match op {
            Operand::Register(index) if idx < regs.len() => regs[idx] = *index,
            // Negative decimals land as 10-bit two's complement.
            Operand::Immediate { value, .. } => immediate = (*value & IMMEDIATE_MASK) as u32,
            _ => {}
        }
    }

    let (rd, rs) = if ins.mnemonic.is_store() {
        (0, regs[0])
    } else {
        (regs[0], regs[1])
    };

    fields(ins.mnemonic.code(), rd, rs) | immediate
}

fn fields(opcode: u32, rd: u32, rs: u32) -> u32 {
    (opcode << OPCODE_SHIFT) | ((rd & REG_MASK) << RD_SHIFT) | ((rs & REG_MASK) << RS_SHIFT)
}
