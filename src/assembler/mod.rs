//! The Assembler module is in charge of taking a
//! POM8 source file and producing its machine words.
//!
//! It does this in three forward-only stages: a regex
//! driven lexer that also collects labels, a recursive
//! descent parser with a single token of lookahead, and
//! a code generator that packs each instruction's fields.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symbols;

use self::ast::Program;
use self::error::AsmError;
use self::symbols::SymbolTable;

/// The result of one complete assembly.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub program: Program,
    pub symbols: SymbolTable,
    /// One binary word per instruction, in address order.
    pub words: Vec<String>,
}

/// Runs the whole pipeline over `source`. Each call builds its own
/// symbol table, so assemblies are independent of each other.
pub fn assemble(source: &str) -> Result<Assembly, AsmError> {
    let lexed = lexer::tokenise(source)?;
    let program = parser::Parser::new(lexed.tokens, &lexed.symbols).run()?;
    let words = codegen::generate(&program, &lexed.symbols);
    info!("Assembled {} instruction(s).", program.len());

    Ok(Assembly { program, symbols: lexed.symbols, words })
}
