//! This lexer tokenises POM8 assembly.
//!
//! Labels never reach the token stream: they are bound in the symbol
//! table as soon as they are seen, against the address of the
//! instruction on the same line (or the next one, for a label that
//! stands alone).
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::AsmError;
use super::symbols::SymbolTable;

static REGISTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^r[0-9]+$").unwrap());
static HEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^0x[0-9a-f]+$").unwrap());
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());
static BINARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^0b[01]+$").unwrap());
static LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9]*:$").unwrap());
static MNEMONIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9]*$").unwrap());

// A comment swallows the rest of the line; anything else is bounded by
// commas and whitespace.
static ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r";.*|[^,\s;]+").unwrap());

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TokenKind {
    Register,
    Mnemonic,
    Hexadecimal,
    Decimal,
    Binary,
    Label,
    Comment,
    Newline,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Register    => "REGISTER",
            Mnemonic    => "MNEMONIC",
            Hexadecimal => "HEXADECIMAL",
            Decimal     => "DECIMAL",
            Binary      => "BINARY",
            Label       => "LABEL",
            Comment     => "COMMENT",
            Newline     => "NEWLINE",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TokenKind::Hexadecimal | TokenKind::Decimal | TokenKind::Binary)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified piece of source text. The kind is fixed at construction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    text: String,
    line: usize,
    kind: TokenKind,
}

impl Token {
    /// Classifies `text`, failing if it matches no token kind.
    pub fn new<S: Into<String>>(text: S, line: usize) -> Result<Token, AsmError> {
        let text = text.into();
        match classify(&text) {
            Some(kind) => Ok(Token { text, line, kind }),
            None => Err(AsmError::Lex { line, text }),
        }
    }

    pub fn newline(line: usize) -> Token {
        Token { text: "\n".to_owned(), line, kind: TokenKind::Newline }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "{}", self.kind),
            _ => write!(f, "{} '{}'", self.kind, self.text),
        }
    }
}

/// Checked in order; the first match wins.
fn classify(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    if text == "\n" {
        Some(Newline)
    } else if text.starts_with(';') {
        Some(Comment)
    } else if REGISTER_RE.is_match(text) {
        Some(Register)
    } else if HEX_RE.is_match(text) {
        Some(Hexadecimal)
    } else if DECIMAL_RE.is_match(text) {
        Some(Decimal)
    } else if BINARY_RE.is_match(text) {
        Some(Binary)
    } else if LABEL_RE.is_match(text) {
        Some(Label)
    } else if MNEMONIC_RE.is_match(text) {
        Some(Mnemonic)
    } else {
        None
    }
}

/// The output of the lexer: a flat token stream where every
/// instruction ends in a NEWLINE, and the labels it defined.
#[derive(Clone, Debug)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub symbols: SymbolTable,
}

/// POM8 supports a single instruction per line, optionally preceded
/// by a label and followed by a comment:
/// `[LABEL:] MNEMONIC [OPERAND[, OPERAND]...] [; COMMENT]`
///
/// Blank lines, comment-only lines and label-only lines do not take
/// an address.
pub fn tokenise(source: &str) -> Result<Lexed, AsmError> {
    let mut tokens: Vec<Token> = Vec::with_capacity(256);
    let mut symbols = SymbolTable::new();
    let mut address: usize = 0;

    for (index, line) in source.lines().enumerate() {
        let line_num = index + 1;
        let mut toks = tokenise_line(line, line_num, address, &mut symbols)?;
        if toks.is_empty() {
            continue;
        }
        tokens.append(&mut toks);
        tokens.push(Token::newline(line_num));
        address += 1;
    }

    debug!("Tokenised {} instruction(s), {} label(s).", address, symbols.len());
    Ok(Lexed { tokens, symbols })
}

fn tokenise_line(
    line: &str,
    line_num: usize,
    address: usize,
    symbols: &mut SymbolTable,
) -> Result<Vec<Token>, AsmError> {
    let mut out: Vec<Token> = Vec::with_capacity(4);

    for item in ITEM_RE.find_iter(line) {
        let token = Token::new(item.as_str(), line_num)?;
        match token.kind() {
            TokenKind::Comment => break,
            TokenKind::Label => {
                let label = &token.text()[..token.text().len() - 1];
                symbols.define(label, address, line_num)?;
                info!("Line {}: label ({}) created for address {:#x}", line_num, label, address);
            }
            _ => {
                trace!("Line {}: {}", line_num, token);
                out.push(token);
            }
        }
    }

    Ok(out)
}
