//! This AST describes a parsed POM8 program.
//!
//! Execution begins with the first instruction in the file.
//! Comments are prefixed with semicolons (;) and are single-line only.
//! Instructions are delimited by newlines, and every instruction is
//! one of three formats:
//!
//! ```nasm
//! ; REGISTER: 000000 | Rd(4) | Rs(4) | Rt(4) | funct(6)
//! ADD r0, r6, r15   ; r0 <= r6 + r15
//! MOV r1, r2        ; r1 <= r2
//! IJMP r3, r4       ; indirect jump through r3, r4
//! SETC              ; set the carry flag
//!
//! ; BRANCH:   opcode(6) | 00 | address(16)
//! JMP start         ; labels resolve to instruction addresses
//! BRZ 0x010         ; or give the address directly
//! HLT
//!
//! ; IMMEDIATE: opcode(6) | Rd(4) | Rs(4) | immediate(10)
//! LDI r15, 0b11111111
//! ADDI r0, r0, -1   ; negative decimals are two's complement
//! STA r0, 0x000
//! PUSH r2
//! ```
//!
//! Mnemonics, register names and labels are case-insensitive.
use std::fmt;
use std::str::FromStr;

use super::symbols::SymbolTable;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Format {
    Register,
    Branch,
    Immediate,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Format::Register  => write!(f, "REGISTER"),
            Format::Branch    => write!(f, "BRANCH"),
            Format::Immediate => write!(f, "IMMEDIATE"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Mnemonic {
    // Register format
    ADD,
    SUB,
    AND,
    OR,
    NOT,
    XOR,
    LSL,
    LSR,
    ADDC,
    SUBC,
    SETC,
    CLRC,
    SETV,
    CLRV,
    MOV,
    IJMP,
    INC,
    // Branch format
    NOP,
    CALL,
    RET,
    JMP,
    BRZ,
    BRN,
    BRP,
    BRC,
    BRV,
    HLT,
    // Immediate format
    ADDI,
    SUBI,
    ANDI,
    ORI,
    XORI,
    LDI,
    LDA,
    LDO,
    STA,
    PUSH,
    POP,
}

impl Mnemonic {
    pub fn format(&self) -> Format {
        use Mnemonic::*;
        match self {
            ADD | SUB | AND | OR | NOT | XOR | LSL | LSR | ADDC |
            SUBC | SETC | CLRC | SETV | CLRV | MOV | IJMP | INC => Format::Register,

            NOP | CALL | RET | JMP | BRZ | BRN | BRP | BRC | BRV |
            HLT                                                 => Format::Branch,

            ADDI | SUBI | ANDI | ORI | XORI | LDI | LDA | LDO |
            STA | PUSH | POP                                    => Format::Immediate,
        }
    }

    /// The 6-bit field that identifies the operation: the function code
    /// for register format instructions, the opcode for the rest.
    pub fn code(&self) -> u32 {
        use Mnemonic::*;
        match self {
            ADD  => 0b000000,
            SUB  => 0b000001,
            AND  => 0b000010,
            OR   => 0b000011,
            NOT  => 0b000100,
            XOR  => 0b000101,
            LSL  => 0b000110,
            LSR  => 0b000111,
            ADDC => 0b001000,
            SUBC => 0b001001,
            SETC => 0b001010,
            CLRC => 0b001011,
            SETV => 0b001100,
            CLRV => 0b001101,
            MOV  => 0b001110,
            IJMP => 0b001111,
            INC  => 0b010000,

            NOP  => 0b000001,
            CALL => 0b000010,
            RET  => 0b000011,
            JMP  => 0b000100,
            BRZ  => 0b000101,
            BRN  => 0b000110,
            BRP  => 0b000111,
            BRC  => 0b001000,
            BRV  => 0b001001,
            HLT  => 0b001010,

            ADDI => 0b001011,
            SUBI => 0b001100,
            ANDI => 0b001101,
            ORI  => 0b001110,
            XORI => 0b001111,
            LDI  => 0b010000,
            LDA  => 0b010001,
            LDO  => 0b010010,
            STA  => 0b010011,
            PUSH => 0b010100,
            POP  => 0b010101,
        }
    }

    /// Instructions written with no operands at all.
    pub fn is_nullary(&self) -> bool {
        use Mnemonic::*;
        matches!(self, NOP | HLT | RET | SETC | CLRC | SETV | CLRV)
    }

    /// Register format instructions that take two registers instead of three.
    pub fn is_two_register(&self) -> bool {
        use Mnemonic::*;
        matches!(self, LSL | LSR | MOV | IJMP)
    }

    /// Stack operations take a single register and no immediate.
    pub fn is_stack(&self) -> bool {
        matches!(self, Mnemonic::PUSH | Mnemonic::POP)
    }

    /// Stores and pushes read their register, so it goes in the source slot.
    pub fn is_store(&self) -> bool {
        matches!(self, Mnemonic::STA | Mnemonic::PUSH)
    }
}

impl FromStr for Mnemonic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Mnemonic::*;
        match s.to_ascii_uppercase().as_str() {
            "ADD"  => Ok(ADD),
            "SUB"  => Ok(SUB),
            "AND"  => Ok(AND),
            "OR"   => Ok(OR),
            "NOT"  => Ok(NOT),
            "XOR"  => Ok(XOR),
            "LSL"  => Ok(LSL),
            "LSR"  => Ok(LSR),
            "ADDC" => Ok(ADDC),
            "SUBC" => Ok(SUBC),
            "SETC" => Ok(SETC),
            "CLRC" => Ok(CLRC),
            "SETV" => Ok(SETV),
            "CLRV" => Ok(CLRV),
            "MOV"  => Ok(MOV),
            "IJMP" => Ok(IJMP),
            "INC"  => Ok(INC),
            "NOP"  => Ok(NOP),
            "CALL" => Ok(CALL),
            "RET"  => Ok(RET),
            "JMP"  => Ok(JMP),
            "BRZ"  => Ok(BRZ),
            "BRN"  => Ok(BRN),
            "BRP"  => Ok(BRP),
            "BRC"  => Ok(BRC),
            "BRV"  => Ok(BRV),
            "HLT"  => Ok(HLT),
            "ADDI" => Ok(ADDI),
            "SUBI" => Ok(SUBI),
            "ANDI" => Ok(ANDI),
            "ORI"  => Ok(ORI),
            "XORI" => Ok(XORI),
            "LDI"  => Ok(LDI),
            "LDA"  => Ok(LDA),
            "LDO"  => Ok(LDO),
            "STA"  => Ok(STA),
            "PUSH" => Ok(PUSH),
            "POP"  => Ok(POP),
            _      => Err(()),
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The radix an immediate was written in. Each radix has its own legal range.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Radix {
    Decimal,
    Hexadecimal,
    Binary,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    Register(u32),
    Immediate { value: i64, radix: Radix },
    Label(String),
}

impl Operand {
    /// Checks the operand fits the field it will be encoded into.
    /// Labels are valid once they are bound in `symbols`.
    pub fn validate(&self, symbols: &SymbolTable) -> bool {
        match self {
            Operand::Register(index) => *index <= 15,
            Operand::Immediate { value, radix } => match radix {
                Radix::Hexadecimal => (0..=0x3FF).contains(value),
                Radix::Decimal     => (-128..=255).contains(value),
                Radix::Binary      => (0..=255).contains(value),
            },
            Operand::Label(name) => symbols.contains(name),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Register(index) => write!(f, "r{}", index),
            Operand::Immediate { value, radix: Radix::Decimal } => write!(f, "{}", value),
            Operand::Immediate { value, radix: Radix::Hexadecimal } => write!(f, "0x{:03X}", value),
            Operand::Immediate { value, radix: Radix::Binary } => write!(f, "0b{:b}", value),
            Operand::Label(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub operands: Vec<Operand>,
    pub format: Format,
    /// Source line, for diagnostics and listings.
    pub line: usize,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        for (idx, op) in self.operands.iter().enumerate() {
            let sep = if idx == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, op)?;
        }
        Ok(())
    }
}

/// The root of the AST. Instruction `n` lives at address `n`.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
