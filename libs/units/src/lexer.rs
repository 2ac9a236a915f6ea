//! Unit expression lexer - tokenizes input strings
//!
//! Positions are character offsets, so errors point at the right place in
//! expressions containing `·`, superscripts or non-ASCII symbols.

use crate::error::{Error, Result};
use crate::token::{Token, TokenType};

/// The unit expression lexer
pub struct Lexer {
    position: usize,
    chars: Vec<char>,
    current_char: Option<char>,
}

/// Maps a superscript digit to its ASCII counterpart.
pub(crate) fn superscript_digit(c: char) -> Option<char> {
    match c {
        '⁰' => Some('0'),
        '¹' => Some('1'),
        '²' => Some('2'),
        '³' => Some('3'),
        '⁴' => Some('4'),
        '⁵' => Some('5'),
        '⁶' => Some('6'),
        '⁷' => Some('7'),
        '⁸' => Some('8'),
        '⁹' => Some('9'),
        _ => None,
    }
}

/// Characters the grammar reserves for itself.
fn is_reserved(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '*' | '+' | '-' | '.' | '/' | ':' | '^' | '·' | '{' | '}'
    ) || superscript_digit(c).is_some()
}

fn is_identifier_start(c: char) -> bool {
    !c.is_control() && !c.is_whitespace() && !c.is_ascii_digit() && !is_reserved(c)
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// `log`, `log2`, `ln` (either case) name a logarithm; returns its base.
fn log_base(identifier: &str) -> Option<&str> {
    if identifier == "ln" || identifier == "LN" {
        return Some("e");
    }
    let digits = identifier
        .strip_prefix("log")
        .or_else(|| identifier.strip_prefix("LOG"))?;
    digits.bytes().all(|b| b.is_ascii_digit()).then_some(digits)
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            position: 0,
            chars,
            current_char,
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.chars.get(self.position).copied();
    }

    /// Peek `offset` characters ahead without advancing
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char, Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn slice(&self, start: usize) -> String {
        self.chars[start..self.position].iter().collect()
    }

    fn read_digits(&mut self) {
        while matches!(self.current_char, Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Read `digit* ("." digit+)? (("e"|"E") sign? digit+)?`
    fn read_number(&mut self) -> String {
        let start = self.position;
        self.read_digits();

        if self.current_char == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit())
        {
            self.advance(); // Skip '.'
            self.read_digits();
        }

        // Only take the exponent marker when digits follow, so `2em` stays `2` `em`.
        if matches!(self.current_char, Some('e' | 'E')) {
            let digits_at = match self.peek_at(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if matches!(self.peek_at(digits_at), Some(c) if c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    self.advance();
                }
                self.read_digits();
            }
        }

        self.slice(start)
    }

    fn read_superscript(&mut self) -> String {
        let mut digits = String::new();
        while let Some(d) = self.current_char.and_then(superscript_digit) {
            digits.push(d);
            self.advance();
        }
        digits
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while matches!(self.current_char, Some(c) if is_identifier_part(c)) {
            self.advance();
        }
        self.slice(start)
    }

    fn read_annotation(&mut self) -> Result<String> {
        let start = self.position;
        self.advance(); // Skip '{'
        let mut text = String::new();
        while let Some(c) = self.current_char {
            self.advance();
            if c == '}' {
                return Ok(text);
            }
            text.push(c);
        }
        Err(Error::malformed(start, "unterminated annotation"))
    }

    /// Whether the next non-whitespace character is `(`.
    fn followed_by_paren(&self) -> bool {
        self.chars[self.position..]
            .iter()
            .find(|c| !c.is_whitespace())
            .is_some_and(|&c| c == '(')
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let start = self.position;

        let Some(c) = self.current_char else {
            return Ok(Token::eof(start));
        };

        let single = |token_type| Ok(Token::new(token_type, c.to_string(), start));
        let token_type = match c {
            '+' => Some(TokenType::Plus),
            '-' => Some(TokenType::Minus),
            '*' => Some(TokenType::Asterisk),
            '·' => Some(TokenType::MiddleDot),
            '/' => Some(TokenType::Solidus),
            '^' => Some(TokenType::Caret),
            ':' => Some(TokenType::Colon),
            '(' => Some(TokenType::OpenParen),
            ')' => Some(TokenType::CloseParen),
            _ => None,
        };
        if let Some(token_type) = token_type {
            self.advance();
            return single(token_type);
        }

        if c.is_ascii_digit()
            || (c == '.' && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()))
        {
            let number = self.read_number();
            return Ok(Token::new(TokenType::Number, number, start));
        }

        if superscript_digit(c).is_some() {
            let digits = self.read_superscript();
            return Ok(Token::new(TokenType::Superscript, digits, start));
        }

        if c == '{' {
            let text = self.read_annotation()?;
            return Ok(Token::new(TokenType::Annotation, text, start));
        }

        if is_identifier_start(c) {
            let identifier = self.read_identifier();
            if let Some(base) = log_base(&identifier) {
                if self.followed_by_paren() {
                    return Ok(Token::new(TokenType::Log, base, start));
                }
            }
            return Ok(Token::new(TokenType::Identifier, identifier, start));
        }

        Err(Error::malformed(start, format!("unexpected character '{c}'")))
    }

    /// Tokenize the whole input; the last token is always [`TokenType::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}
