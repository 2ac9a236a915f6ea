//! Unit expression parser - converts text into a [`Unit`]
//!
//! Recursive descent over the token stream, one function per precedence
//! level (lowest to highest):
//! 1. compound (`h:min:s`)
//! 2. additive (leading `number sign` or trailing `sign number` offset)
//! 3. multiplicative (`*`, `·`, `/`, left-associative)
//! 4. exponent (`^n`, `^(n/d)`, superscripts, `log(...)`, `ln(...)`, `10^x`)
//! 5. atomic (number, identifier, parenthesized expression, `{annotation}`)
//!
//! Units are built directly while parsing; there is no intermediate AST.

use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::symbols::SymbolTable;
use crate::token::{Token, TokenType};
use crate::unit::Unit;
use mensura_convert::Converter;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use std::f64::consts::E;

const MAX_RECURSION_DEPTH: usize = 200;

/// Largest decimal exponent accepted in a number literal.
const MAX_DECIMAL_EXPONENT: u64 = 400;

/// Parser for unit expressions
pub struct Parser<'a, S: SymbolTable + ?Sized> {
    symbols: &'a S,
    tokens: Vec<Token>,
    current: usize,
    recursion_depth: usize,
}

impl<'a, S: SymbolTable + ?Sized> Parser<'a, S> {
    /// Tokenize `input`; identifiers are resolved against `symbols`.
    pub fn new(input: &str, symbols: &'a S) -> Result<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            symbols,
            tokens,
            current: 0,
            recursion_depth: 0,
        })
    }

    /// Parse the entire expression (top-level entry point)
    ///
    /// Empty input is the dimensionless unit.
    pub fn parse(&mut self) -> Result<Unit> {
        if self.current_token_is(TokenType::Eof) {
            return Ok(Unit::one());
        }

        let unit = self.parse_compound_expression()?;

        // Ensure we've consumed all input
        if !self.current_token_is(TokenType::Eof) {
            return Err(self.unexpected("expected end of input"));
        }

        Ok(unit)
    }

    /// Token `offset` positions ahead; the trailing Eof repeats forever.
    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.current + offset).min(last)]
    }

    fn current_token(&self) -> &Token {
        self.peek(0)
    }

    fn current_token_is(&self, token_type: TokenType) -> bool {
        self.current_token().token_type == token_type
    }

    /// Consume the current token and return it
    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        token
    }

    /// Expect a specific token type and advance
    fn expect(&mut self, token_type: TokenType) -> Result<Token> {
        if self.current_token_is(token_type.clone()) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("expected {token_type:?}")))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.current_token();
        let found = match token.token_type {
            TokenType::Eof => "end of input".to_string(),
            TokenType::Annotation => format!("'{{{}}}'", token.value),
            _ => format!("'{}'", token.value),
        };
        Error::malformed(token.position, format!("{expected}, found {found}"))
    }

    /// Check recursion depth and increment
    fn check_recursion_depth(&mut self) -> Result<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(Error::malformed(
                self.current_token().position,
                format!("expression too deeply nested (max depth: {MAX_RECURSION_DEPTH})"),
            ));
        }
        Ok(())
    }

    /// Decrement recursion depth
    fn decrement_recursion_depth(&mut self) {
        self.recursion_depth -= 1;
    }

    /// compound := additive (":" additive)*
    ///
    /// Every component must share the leading component's system unit; the
    /// leading component is the result.
    fn parse_compound_expression(&mut self) -> Result<Unit> {
        let start = self.current_token().position;
        let first = self.parse_additive_expression()?;
        if !self.current_token_is(TokenType::Colon) {
            return Ok(first);
        }
        let system = first.system_unit().map_err(exponent_error(start))?;

        while self.current_token_is(TokenType::Colon) {
            self.advance();
            let position = self.current_token().position;
            let next = self.parse_additive_expression()?;
            if next.system_unit().map_err(exponent_error(position))? != system {
                return Err(Error::malformed(
                    position,
                    "compound unit components must be compatible",
                ));
            }
        }

        Ok(first)
    }

    fn parse_additive_expression(&mut self) -> Result<Unit> {
        self.check_recursion_depth()?;
        let result = self.parse_additive_inner();
        self.decrement_recursion_depth();
        result
    }

    /// additive := (number sign)? multiplicative (sign number)?
    fn parse_additive_inner(&mut self) -> Result<Unit> {
        let leading = if self.at_leading_offset() {
            let offset = self.parse_signed_number()?;
            let negate = self.advance().token_type == TokenType::Minus;
            Some((offset, negate))
        } else {
            None
        };

        let mut unit = self.parse_multiplicative_expression()?;

        // `a - u` negates `u` before offsetting it by `a`.
        if let Some((offset, negate)) = leading {
            if negate {
                unit = unit.transform(&Converter::rational(-1, 1)?);
            }
            unit = unit.shift(offset);
        }

        if self.current_token().is_sign() {
            let negative = self.advance().token_type == TokenType::Minus;
            let offset = self.parse_signed_number()?;
            unit = unit.shift(if negative { -offset } else { offset });
        }

        Ok(unit)
    }

    /// `[sign] number sign` opens an additive expression with an offset.
    fn at_leading_offset(&self) -> bool {
        let skip = usize::from(self.current_token().is_sign());
        self.peek(skip).token_type == TokenType::Number && self.peek(skip + 1).is_sign()
    }

    /// multiplicative := exponent (("*" | "·" | "/") exponent)*
    fn parse_multiplicative_expression(&mut self) -> Result<Unit> {
        let mut unit = self.parse_exponent_expression()?;

        loop {
            match self.current_token().token_type {
                TokenType::Asterisk | TokenType::MiddleDot => {
                    let op = self.advance();
                    let rhs = self.parse_exponent_expression()?;
                    unit = unit.multiply(&rhs).map_err(exponent_error(op.position))?;
                }
                TokenType::Solidus => {
                    let op = self.advance();
                    let rhs = self.parse_exponent_expression()?;
                    unit = unit.divide(&rhs).map_err(exponent_error(op.position))?;
                }
                _ => return Ok(unit),
            }
        }
    }

    fn parse_exponent_expression(&mut self) -> Result<Unit> {
        if self.current_token_is(TokenType::Log) {
            return self.parse_logarithm();
        }

        if let Some(base) = self.exponential_base() {
            self.advance(); // base
            self.advance(); // '^'
            let operand = self.parse_atomic_expression()?;
            return Ok(operand.transform(&Converter::exp(base)?));
        }

        let unit = self.parse_atomic_expression()?;
        self.parse_exponent(unit)
    }

    /// `10^m` or `e^(...)`: an integer or `e`, a caret, then a unit operand.
    ///
    /// A number after the caret, or a parenthesized rational such as
    /// `10^(1/2)`, keeps the ordinary power reading.
    fn exponential_base(&self) -> Option<f64> {
        let token = self.current_token();
        let base = if token.is_integer() {
            token.value.parse::<f64>().ok()?
        } else if token.token_type == TokenType::Identifier && token.value == "e" {
            E
        } else {
            return None;
        };

        if self.peek(1).token_type != TokenType::Caret {
            return None;
        }

        match self.peek(2).token_type {
            TokenType::Identifier | TokenType::Annotation => Some(base),
            TokenType::OpenParen if !self.is_rational_exponent(2) => Some(base),
            _ => None,
        }
    }

    /// Whether the tokens at `offset` read `( sign? integer (/ sign? integer)? )`.
    fn is_rational_exponent(&self, mut offset: usize) -> bool {
        offset += 1; // '('
        if self.peek(offset).is_sign() {
            offset += 1;
        }
        if !self.peek(offset).is_integer() {
            return false;
        }
        offset += 1;

        if self.peek(offset).token_type == TokenType::Solidus {
            offset += 1;
            if self.peek(offset).is_sign() {
                offset += 1;
            }
            if !self.peek(offset).is_integer() {
                return false;
            }
            offset += 1;
        }

        self.peek(offset).token_type == TokenType::CloseParen
    }

    /// ("log" integer? | "ln") "(" additive ")"
    fn parse_logarithm(&mut self) -> Result<Unit> {
        let token = self.advance();
        let base = match token.value.as_str() {
            "e" => E,
            "" => 10.0,
            digits => digits
                .parse::<f64>()
                .map_err(|_| Error::malformed(token.position, "invalid logarithm base"))?,
        };

        self.expect(TokenType::OpenParen)?;
        let operand = self.parse_additive_expression()?;
        self.expect(TokenType::CloseParen)?;

        Ok(operand.transform(&Converter::log(base)?))
    }

    /// exponent := "^" sign? integer | "^(" sign? integer ("/" sign? integer)? ")" | superscript+
    fn parse_exponent(&mut self, unit: Unit) -> Result<Unit> {
        match self.current_token().token_type {
            TokenType::Caret => {
                let caret = self.advance();
                if !self.current_token_is(TokenType::OpenParen) {
                    let n = self.parse_integer()?;
                    return unit.pow(n).map_err(exponent_error(caret.position));
                }

                self.advance();
                let numerator = self.parse_integer()?;
                let denominator = if self.current_token_is(TokenType::Solidus) {
                    self.advance();
                    self.parse_integer()?
                } else {
                    1
                };
                self.expect(TokenType::CloseParen)?;

                rational_power(&unit, numerator, denominator, caret.position)
            }
            TokenType::Superscript => {
                let token = self.advance();
                let n = token
                    .value
                    .parse::<i32>()
                    .map_err(|_| Error::malformed(token.position, "exponent out of range"))?;
                unit.pow(n).map_err(exponent_error(token.position))
            }
            _ => Ok(unit),
        }
    }

    fn parse_integer(&mut self) -> Result<i32> {
        let negative = match self.current_token().token_type {
            TokenType::Minus => {
                self.advance();
                true
            }
            TokenType::Plus => {
                self.advance();
                false
            }
            _ => false,
        };

        if !self.current_token().is_integer() {
            return Err(self.unexpected("expected an integer exponent"));
        }
        let token = self.advance();
        let value = token
            .value
            .parse::<i32>()
            .map_err(|_| Error::malformed(token.position, "exponent out of range"))?;

        Ok(if negative { -value } else { value })
    }

    fn parse_signed_number(&mut self) -> Result<BigRational> {
        let negative = match self.current_token().token_type {
            TokenType::Minus => {
                self.advance();
                true
            }
            TokenType::Plus => {
                self.advance();
                false
            }
            _ => false,
        };

        if !self.current_token_is(TokenType::Number) {
            return Err(self.unexpected("expected a number"));
        }
        let value = parse_decimal(&self.advance())?;

        Ok(if negative { -value } else { value })
    }

    /// atomic := sign? number | identifier | "(" additive ")" | "{" text "}"
    ///
    /// Any atomic expression may carry a trailing annotation.
    fn parse_atomic_expression(&mut self) -> Result<Unit> {
        let token = self.current_token().clone();

        let unit = match token.token_type {
            TokenType::Number | TokenType::Plus | TokenType::Minus => {
                let value = self.parse_signed_number()?;
                Unit::one().transform(&Converter::scale(value)?)
            }
            TokenType::Identifier => {
                self.advance();
                self.symbols
                    .lookup_symbol(&token.value)
                    .ok_or(Error::UnknownUnit {
                        symbol: token.value,
                        pos: token.position,
                    })?
            }
            TokenType::OpenParen => {
                self.advance();
                let unit = self.parse_additive_expression()?;
                self.expect(TokenType::CloseParen)?;
                unit
            }
            TokenType::Annotation => {
                self.advance();
                return Unit::one().annotate(token.value);
            }
            _ => return Err(self.unexpected("expected a unit, a number or '('")),
        };

        if self.current_token_is(TokenType::Annotation) {
            let annotation = self.advance();
            return unit.annotate(annotation.value);
        }

        Ok(unit)
    }
}

/// `unit^(numerator/denominator)`, defined only when the root leaves
/// integer powers.
fn rational_power(unit: &Unit, numerator: i32, denominator: i32, position: usize) -> Result<Unit> {
    if denominator == 0 {
        return Err(Error::malformed(position, "zero exponent denominator"));
    }

    let gcd = numerator.gcd(&denominator);
    let (mut numerator, mut denominator) = (numerator / gcd, denominator / gcd);
    if denominator < 0 {
        numerator = -numerator;
        denominator = -denominator;
    }

    let unit = unit.pow(numerator).map_err(exponent_error(position))?;
    unit.root(denominator).ok_or_else(|| {
        Error::malformed(
            position,
            format!("cannot take root {denominator} of a unit with these powers"),
        )
    })
}

/// Reports a power that leaves `i32` as a malformed expression at `position`.
fn exponent_error(position: usize) -> impl Fn(Error) -> Error {
    move |err| match err {
        Error::ExponentOverflow => Error::malformed(position, "exponent out of range"),
        other => other,
    }
}

/// Exact value of a number literal such as `2.54` or `1e-3`.
fn parse_decimal(token: &Token) -> Result<BigRational> {
    let out_of_range = || Error::malformed(token.position, "number out of range");

    let text = token.value.as_str();
    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(index) => (&text[..index], &text[index + 1..]),
        None => (text, "0"),
    };
    let exponent: i64 = exponent.parse().map_err(|_| out_of_range())?;

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits: BigInt = format!("{whole}{fraction}")
        .parse()
        .map_err(|_| Error::malformed(token.position, "invalid number"))?;

    let scale = i64::try_from(fraction.len())
        .ok()
        .and_then(|len| exponent.checked_sub(len))
        .ok_or_else(out_of_range)?;
    if scale.unsigned_abs() > MAX_DECIMAL_EXPONENT {
        return Err(out_of_range());
    }

    let power = num_traits::pow(BigInt::from(10u8), scale.unsigned_abs() as usize);
    Ok(if scale >= 0 {
        BigRational::from_integer(digits * power)
    } else {
        BigRational::new(digits, power)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(text: &str) -> BigRational {
        parse_decimal(&Token::new(TokenType::Number, text, 0)).unwrap()
    }

    fn ratio(a: i64, b: i64) -> BigRational {
        BigRational::new(a.into(), b.into())
    }

    #[test]
    fn decimal_literals_are_exact() {
        assert_eq!(number("2.54"), ratio(127, 50));
        assert_eq!(number(".5"), ratio(1, 2));
        assert_eq!(number("1e-3"), ratio(1, 1000));
        assert_eq!(number("1.5E+2"), ratio(150, 1));
        assert_eq!(number("0.1"), ratio(1, 10));
    }

    #[test]
    fn huge_exponents_are_rejected() {
        let token = Token::new(TokenType::Number, "1e100000", 3);
        assert!(matches!(
            parse_decimal(&token),
            Err(Error::MalformedExpression { pos: 3, .. })
        ));
    }

    #[test]
    fn rational_power_reduces_first() {
        let m = Unit::base("m");
        let area = m.pow(2).unwrap();
        assert_eq!(rational_power(&area, 2, 4, 0).unwrap(), m);
        assert_eq!(rational_power(&area, 1, -2, 0).unwrap(), m.reciprocal().unwrap());
        assert!(rational_power(&m, 1, 0, 0).is_err());
        assert!(rational_power(&m, 1, 2, 0).is_err());
    }

    #[test]
    fn rational_power_overflow_reports_the_caret() {
        let m = Unit::base("m");
        assert_eq!(
            rational_power(&m, i32::MAX, 1, 7),
            Ok(m.pow(i32::MAX).unwrap())
        );
        let area = m.pow(2).unwrap();
        assert!(matches!(
            rational_power(&area, i32::MAX, 1, 7),
            Err(Error::MalformedExpression { pos: 7, .. })
        ));
    }
}
