//! Token types for the unit expression lexer

/// Token types for the unit expression lexer
#[derive(Debug, PartialEq, Clone, Eq)]
pub enum TokenType {
    // Literals
    Number,      // 12, 2.54, 1e-3 (unsigned)
    Superscript, // ² ³ ... value holds the ASCII digits
    Annotation,  // {text}, value holds the text

    // Identifiers
    Identifier,

    // Functions
    Log, // log, log2, ln; value holds the base ("e" for ln)

    // Operators
    Plus,      // +
    Minus,     // -
    Asterisk,  // *
    MiddleDot, // ·
    Solidus,   // /
    Caret,     // ^
    Colon,     // :

    // Delimiters
    OpenParen,  // (
    CloseParen, // )

    // End of input
    Eof,
}

/// A token in a unit expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    /// Character offset of the first character.
    pub position: usize,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>, position: usize) -> Self {
        Self {
            token_type,
            value: value.into(),
            position,
        }
    }

    pub fn eof(position: usize) -> Self {
        Self::new(TokenType::Eof, String::new(), position)
    }

    pub fn is_sign(&self) -> bool {
        matches!(self.token_type, TokenType::Plus | TokenType::Minus)
    }

    /// True for unsigned integer literals.
    pub fn is_integer(&self) -> bool {
        self.token_type == TokenType::Number && self.value.bytes().all(|b| b.is_ascii_digit())
    }
}
