//! Unit tests for the unit expression lexer

use mensura_units::lexer::Lexer;
use mensura_units::token::{Token, TokenType};
use mensura_units::Error;

/// Helper function to tokenize input, panicking on lexer errors
fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize().unwrap()
}

fn types(input: &str) -> Vec<TokenType> {
    tokenize(input).into_iter().map(|t| t.token_type).collect()
}

#[test]
fn test_numbers() {
    let tokens = tokenize("42");
    assert_eq!(tokens.len(), 2); // Number + EOF
    assert_eq!(tokens[0].token_type, TokenType::Number);
    assert_eq!(tokens[0].value, "42");

    assert_eq!(tokenize("2.54")[0].value, "2.54");
    assert_eq!(tokenize(".5")[0].value, ".5");
    assert_eq!(tokenize("1e-3")[0].value, "1e-3");
    assert_eq!(tokenize("6.02E+23")[0].value, "6.02E+23");

    // Signs are separate tokens
    assert_eq!(
        types("-42"),
        vec![TokenType::Minus, TokenType::Number, TokenType::Eof]
    );
}

#[test]
fn test_exponent_marker_needs_digits() {
    let tokens = tokenize("2em");
    assert_eq!(tokens[0].value, "2");
    assert_eq!(tokens[1].token_type, TokenType::Identifier);
    assert_eq!(tokens[1].value, "em");

    let tokens = tokenize("3e+");
    assert_eq!(tokens[0].value, "3");
    assert_eq!(tokens[1].value, "e");
    assert_eq!(tokens[2].token_type, TokenType::Plus);
}

#[test]
fn test_operators() {
    assert_eq!(
        types("kg*m·s/A^2:K"),
        vec![
            TokenType::Identifier,
            TokenType::Asterisk,
            TokenType::Identifier,
            TokenType::MiddleDot,
            TokenType::Identifier,
            TokenType::Solidus,
            TokenType::Identifier,
            TokenType::Caret,
            TokenType::Number,
            TokenType::Colon,
            TokenType::Identifier,
            TokenType::Eof,
        ]
    );
}

#[test]
fn test_identifiers() {
    let tokens = tokenize("µm ℃ °C % mol2");
    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, vec!["µm", "℃", "°C", "%", "mol2", ""]);
    assert!(tokens[..5]
        .iter()
        .all(|t| t.token_type == TokenType::Identifier));
}

#[test]
fn test_superscripts() {
    let tokens = tokenize("m²s⁻");
    assert_eq!(tokens[0].value, "m");
    assert_eq!(tokens[1].token_type, TokenType::Superscript);
    assert_eq!(tokens[1].value, "2");
    // U+207B is not reserved, so it is part of an identifier
    assert_eq!(tokens[2].value, "s⁻");

    let tokens = tokenize("s¹⁰");
    assert_eq!(tokens[1].value, "10");
}

#[test]
fn test_logarithms() {
    let tokens = tokenize("log(Pa)");
    assert_eq!(tokens[0].token_type, TokenType::Log);
    assert_eq!(tokens[0].value, "");

    let tokens = tokenize("ln (W)");
    assert_eq!(tokens[0].token_type, TokenType::Log);
    assert_eq!(tokens[0].value, "e");

    let tokens = tokenize("LOG2(W)");
    assert_eq!(tokens[0].token_type, TokenType::Log);
    assert_eq!(tokens[0].value, "2");

    // Without a parenthesis these are ordinary identifiers
    let tokens = tokenize("log ln");
    assert_eq!(tokens[0].token_type, TokenType::Identifier);
    assert_eq!(tokens[1].token_type, TokenType::Identifier);
}

#[test]
fn test_annotations() {
    let tokens = tokenize("m{beat}/min");
    assert_eq!(tokens[1].token_type, TokenType::Annotation);
    assert_eq!(tokens[1].value, "beat");
    assert_eq!(tokens[2].token_type, TokenType::Solidus);

    assert!(matches!(
        Lexer::new("m{open").tokenize(),
        Err(Error::MalformedExpression { pos: 1, .. })
    ));
}

#[test]
fn test_positions_count_characters() {
    let tokens = tokenize("µm · s");
    assert_eq!(tokens[0].position, 0);
    assert_eq!(tokens[1].position, 3);
    assert_eq!(tokens[2].position, 5);
    assert_eq!(tokens[3].position, 6);
}

#[test]
fn test_unexpected_character() {
    assert!(matches!(
        Lexer::new("m.s").tokenize(),
        Err(Error::MalformedExpression { pos: 1, .. })
    ));
    assert!(matches!(
        Lexer::new("kg}").tokenize(),
        Err(Error::MalformedExpression { pos: 2, .. })
    ));
}
