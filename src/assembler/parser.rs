//! The Parser module takes a token stream from the lexer and converts
//! it into an AST.
//!
//! Parsing is a single forward pass. The only lookahead is used to tell
//! `LDI r0, 5` apart from `ADDI r0, r1, 5` before any operand is read.
use std::collections::VecDeque;

use super::ast::*;
use super::error::AsmError;
use super::lexer::{Token, TokenKind};
use super::symbols::SymbolTable;

/// The kind of token accepted in one operand position.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Slot {
    Register,
    Numeric,
    /// A branch target: a label or a hexadecimal address.
    Target,
}

impl Slot {
    fn accepts(&self, kind: TokenKind) -> bool {
        match self {
            Slot::Register => kind == TokenKind::Register,
            Slot::Numeric  => kind.is_numeric(),
            Slot::Target   => kind == TokenKind::Mnemonic || kind == TokenKind::Hexadecimal,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Slot::Register => "REGISTER",
            Slot::Numeric  => "DECIMAL/HEXADECIMAL/BINARY",
            Slot::Target   => "MNEMONIC/HEXADECIMAL",
        }
    }
}

pub struct Parser<'a> {
    tokens:  VecDeque<Token>,
    symbols: &'a SymbolTable,
    /// Line of the last consumed token, for errors at end of input.
    line:    usize,
}

impl<'a> Parser<'a> {
    pub fn new<T: Into<VecDeque<Token>>>(tokens: T, symbols: &'a SymbolTable) -> Self {
        Parser { tokens: tokens.into(), symbols, line: 1 }
    }

    /// Run the parser, consuming itself and returning the program.
    /// The first error stops the parse.
    pub fn run(mut self) -> Result<Program, AsmError> {
        let mut instructions: Vec<Instruction> = Vec::with_capacity(self.tokens.len() / 3);

        while self.current().is_some() {
            let ins = self.instruction()?;
            debug!("Line {}: parsed {} instruction `{}`", ins.line, ins.format, ins);
            instructions.push(ins);
        }

        Ok(Program { instructions })
    }

    fn instruction(&mut self) -> Result<Instruction, AsmError> {
        let tok = self.expect("MNEMONIC")?;
        if tok.kind() != TokenKind::Mnemonic {
            return Err(AsmError::Syntax {
                line: tok.line(),
                expected: "MNEMONIC".to_owned(),
                found: tok.to_string(),
            });
        }

        let mnemonic: Mnemonic = tok.text().parse().map_err(|_| AsmError::UnknownOpcode {
            line: tok.line(),
            mnemonic: tok.text().to_ascii_uppercase(),
        })?;

        let slots = self.expected_slots(mnemonic);
        let mut operands: Vec<Operand> = Vec::with_capacity(slots.len());
        for slot in slots {
            operands.push(self.operand(slot)?);
        }
        self.end_of_line()?;

        Ok(Instruction { mnemonic, operands, format: mnemonic.format(), line: tok.line() })
    }

    /// Works out the operand layout of `mnemonic`. Called with the
    /// cursor on the first operand.
    fn expected_slots(&self, mnemonic: Mnemonic) -> Vec<Slot> {
        use Slot::*;
        if mnemonic.is_nullary() {
            return vec![];
        }

        match mnemonic.format() {
            Format::Branch => vec![Target],
            Format::Immediate if mnemonic.is_stack() => vec![Register],
            Format::Immediate => match self.peek(1) {
                Some(tok) if tok.kind().is_numeric() => vec![Register, Numeric],
                _ => vec![Register, Register, Numeric],
            },
            Format::Register if mnemonic.is_two_register() => vec![Register, Register],
            Format::Register => vec![Register, Register, Register],
        }
    }

    fn operand(&mut self, slot: Slot) -> Result<Operand, AsmError> {
        let tok = self.expect(slot.describe())?;
        if !slot.accepts(tok.kind()) {
            return Err(AsmError::Syntax {
                line: tok.line(),
                expected: slot.describe().to_owned(),
                found: tok.to_string(),
            });
        }

        let op = build_operand(&tok)?;
        if !op.validate(self.symbols) {
            return Err(match op {
                Operand::Label(label) => AsmError::UnknownLabel { line: tok.line(), label },
                _ => out_of_range(&tok),
            });
        }

        trace!("Line {}: created {:?}", tok.line(), op);
        Ok(op)
    }

    fn end_of_line(&mut self) -> Result<(), AsmError> {
        match self.advance() {
            // The final NEWLINE is implied at end of input.
            None => Ok(()),
            Some(tok) if tok.kind() == TokenKind::Newline => Ok(()),
            Some(tok) => Err(AsmError::Syntax {
                line: tok.line(),
                expected: "end of line".to_owned(),
                found: tok.to_string(),
            }),
        }
    }

    /// Consumes the next token, treating end of input as a syntax error.
    fn expect(&mut self, expected: &str) -> Result<Token, AsmError> {
        match self.advance() {
            Some(tok) => Ok(tok),
            None => Err(AsmError::Syntax {
                line: self.line,
                expected: expected.to_owned(),
                found: "end of input".to_owned(),
            }),
        }
    }

    /// Returns the token under the cursor without consuming it.
    #[inline]
    fn current(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Looks `k` tokens past the cursor without consuming anything.
    #[inline]
    fn peek(&self, k: usize) -> Option<&Token> {
        self.tokens.get(k)
    }

    /// Pops a token off the input stream and returns it.
    /// Returns None if no tokens are left.
    #[inline]
    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.pop_front();
        if let Some(t) = &tok {
            self.line = t.line();
        }
        tok
    }
}

/// Builds the operand for a token already checked against its slot.
fn build_operand(tok: &Token) -> Result<Operand, AsmError> {
    let text = tok.text();
    match tok.kind() {
        TokenKind::Register => text[1..]
            .parse::<u32>()
            .map(Operand::Register)
            .map_err(|_| out_of_range(tok)),
        TokenKind::Hexadecimal => i64::from_str_radix(&text[2..], 16)
            .map(|value| Operand::Immediate { value, radix: Radix::Hexadecimal })
            .map_err(|_| out_of_range(tok)),
        TokenKind::Binary => i64::from_str_radix(&text[2..], 2)
            .map(|value| Operand::Immediate { value, radix: Radix::Binary })
            .map_err(|_| out_of_range(tok)),
        TokenKind::Decimal => text
            .parse::<i64>()
            .map(|value| Operand::Immediate { value, radix: Radix::Decimal })
            .map_err(|_| out_of_range(tok)),
        TokenKind::Mnemonic => Ok(Operand::Label(text.to_owned())),
        TokenKind::Label | TokenKind::Comment | TokenKind::Newline => Err(AsmError::Syntax {
            line: tok.line(),
            expected: "an operand".to_owned(),
            found: tok.to_string(),
        }),
    }
}

fn out_of_range(tok: &Token) -> AsmError {
    AsmError::OperandRange {
        line: tok.line(),
        text: tok.text().to_owned(),
        kind: tok.kind().name().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::lexer;

    fn toks(items: &[(&str, usize)]) -> Vec<Token> {
        items
            .iter()
            .map(|(text, line)| Token::new(*text, *line).unwrap())
            .collect()
    }

    fn parse(asm: &str) -> Result<Program, AsmError> {
        let lexed = lexer::tokenise(asm)?;
        Parser::new(lexed.tokens, &lexed.symbols).run()
    }

    fn reg(i: u32) -> Operand {
        Operand::Register(i)
    }

    #[test]
    fn test_cursor() {
        let symbols = SymbolTable::new();
        let mut parser = Parser::new(toks(&[("LDI", 1), ("r0", 1), ("5", 1)]), &symbols);
        assert_eq!(parser.current().map(|t| t.text()), Some("LDI"));
        assert_eq!(parser.peek(2).map(|t| t.text()), Some("5"));
        assert_eq!(parser.peek(3), None);
        assert_eq!(parser.advance().map(|t| t.text().to_owned()), Some("LDI".to_owned()));
        assert_eq!(parser.current().map(|t| t.text()), Some("r0"));
    }

    #[test]
    fn test_parser() {
        let mut symbols = SymbolTable::new();
        symbols.define("start", 2, 3).unwrap();
        let tokens = toks(&[
            ("LDI", 1), ("r15", 1), ("0b11111111", 1), ("\n", 1),
            ("STA", 2), ("r0", 2), ("0x000", 2), ("\n", 2),
            ("ADD", 3), ("r0", 3), ("r6", 3), ("r15", 3), ("\n", 3),
            ("JMP", 4), ("start", 4), ("\n", 4),
        ]);
        let program = Parser::new(tokens, &symbols).run().unwrap();

        assert_eq!(program.instructions, vec![
            Instruction {
                mnemonic: Mnemonic::LDI,
                operands: vec![reg(15), Operand::Immediate { value: 255, radix: Radix::Binary }],
                format: Format::Immediate,
                line: 1,
            },
            Instruction {
                mnemonic: Mnemonic::STA,
                operands: vec![reg(0), Operand::Immediate { value: 0, radix: Radix::Hexadecimal }],
                format: Format::Immediate,
                line: 2,
            },
            Instruction {
                mnemonic: Mnemonic::ADD,
                operands: vec![reg(0), reg(6), reg(15)],
                format: Format::Register,
                line: 3,
            },
            Instruction {
                mnemonic: Mnemonic::JMP,
                operands: vec![Operand::Label("start".to_owned())],
                format: Format::Branch,
                line: 4,
            },
        ]);
    }

    #[test]
    fn test_operand_shapes() {
        let program = parse("
            hlt
            SETC
            LDI r1, -5
            ADDI r1, r2, 0x3FF
            PUSH r3
            POP r4
            MOV r5, r6
            IJMP r7, r8
            NOT r1, r2, r3
            BRZ 0x010
        ").unwrap();

        let shapes: Vec<(Mnemonic, usize)> = program
            .iter()
            .map(|ins| (ins.mnemonic, ins.operands.len()))
            .collect();
        assert_eq!(shapes, vec![
            (Mnemonic::HLT, 0),
            (Mnemonic::SETC, 0),
            (Mnemonic::LDI, 2),
            (Mnemonic::ADDI, 3),
            (Mnemonic::PUSH, 1),
            (Mnemonic::POP, 1),
            (Mnemonic::MOV, 2),
            (Mnemonic::IJMP, 2),
            (Mnemonic::NOT, 3),
            (Mnemonic::BRZ, 1),
        ]);
        assert_eq!(program.instructions[2].operands[1], Operand::Immediate { value: -5, radix: Radix::Decimal });
        assert_eq!(program.instructions[9].operands[0], Operand::Immediate { value: 0x10, radix: Radix::Hexadecimal });
    }

    #[test]
    fn test_forward_reference() {
        let program = parse("JMP end\nNOP\nend: HLT\n").unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.instructions[0].operands, vec![Operand::Label("end".to_owned())]);
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(
            parse("NOP\nJMP nowhere\n").unwrap_err(),
            AsmError::UnknownLabel { line: 2, label: "nowhere".to_owned() }
        );
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            parse("NOP\nmove r1, r2\n").unwrap_err(),
            AsmError::UnknownOpcode { line: 2, mnemonic: "MOVE".to_owned() }
        );
    }

    #[test]
    fn test_range_errors() {
        let cases = vec![
            ("ADD r16, r0, r0", "r16", "REGISTER"),
            ("ADDI r1, r1, 256", "256", "DECIMAL"),
            ("ADDI r1, r1, -129", "-129", "DECIMAL"),
            ("LDI r1, 0x400", "0x400", "HEXADECIMAL"),
            ("LDI r1, 0b111111111", "0b111111111", "BINARY"),
            ("LDI r1, 99999999999999999999999", "99999999999999999999999", "DECIMAL"),
        ];
        for (asm, text, kind) in cases {
            assert_eq!(
                parse(asm).unwrap_err(),
                AsmError::OperandRange { line: 1, text: text.to_owned(), kind: kind.to_owned() },
                "{}", asm
            );
        }

        assert!(parse("ADDI r1, r1, 255\nADDI r1, r1, -128\nLDI r1, 0x3FF\n").is_ok());
    }

    #[test]
    fn test_syntax_errors() {
        // Operand of the wrong kind.
        assert_eq!(
            parse("MOV r1, 5").unwrap_err(),
            AsmError::Syntax { line: 1, expected: "REGISTER".to_owned(), found: "DECIMAL '5'".to_owned() }
        );
        // Branches take labels or hexadecimal addresses only.
        assert_eq!(
            parse("NOP\nJMP 16").unwrap_err(),
            AsmError::Syntax {
                line: 2,
                expected: "MNEMONIC/HEXADECIMAL".to_owned(),
                found: "DECIMAL '16'".to_owned(),
            }
        );
        // Lines must start with a mnemonic.
        assert_eq!(
            parse("r1 ADD").unwrap_err(),
            AsmError::Syntax { line: 1, expected: "MNEMONIC".to_owned(), found: "REGISTER 'r1'".to_owned() }
        );
        // Too few operands.
        assert_eq!(
            parse("ADD r1, r2\nNOP").unwrap_err(),
            AsmError::Syntax { line: 1, expected: "REGISTER".to_owned(), found: "NEWLINE".to_owned() }
        );
        // Too many operands.
        assert_eq!(
            parse("HLT r1").unwrap_err(),
            AsmError::Syntax { line: 1, expected: "end of line".to_owned(), found: "REGISTER 'r1'".to_owned() }
        );
    }

    #[test]
    fn test_end_of_input() {
        let symbols = SymbolTable::new();
        let tokens = toks(&[("NOP", 1), ("\n", 1), ("SUBI", 2), ("r1", 2)]);
        assert_eq!(
            Parser::new(tokens, &symbols).run().unwrap_err(),
            AsmError::Syntax {
                line: 2,
                expected: "REGISTER".to_owned(),
                found: "end of input".to_owned(),
            }
        );
    }
}
