// Lambda body parser
// Hand-written lexer feeding a Pratt parser

use crate::ast::{AstNode, BinaryOp, UnaryOp};
use thiserror::Error;

/// Parser errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParserError {
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unclosed string literal")]
    UnclosedString,

    #[error("Invalid escape sequence: {0}")]
    InvalidEscape(String),

    #[error("Expected {expected}, found {found}")]
    Expected { expected: String, found: String },

    #[error("Expression nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Words that introduce statements, declarations or operators outside the
/// expression subset. They may still appear as property names after `.`.
pub const RESERVED_WORDS: &[&str] = &[
    "function", "return", "var", "let", "const", "new", "this", "if", "else", "for", "while",
    "do", "class", "delete", "typeof", "void", "in", "instanceof", "yield", "switch", "case",
    "break", "continue", "throw", "try", "catch", "finally", "with",
];

/// Default nesting limit used by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

pub fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

pub fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// True if `name` lexes as a single identifier token.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => {}
        _ => return false,
    }
    chars.all(is_identifier_part)
        && !RESERVED_WORDS.contains(&name)
        && !matches!(name, "true" | "false" | "null" | "undefined")
}

/// Token types for the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    String(String),
    Number(f64),
    True,
    False,
    Null,
    Undefined,

    // Names
    Identifier(String),
    Reserved(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Bang,
    Dot,
    Question,
    Colon,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,

    // Lexed only so they can be rejected with a precise message
    Assign,
    Arrow,
    Semicolon,
    LeftBrace,
    RightBrace,

    // Special
    Eof,
}

/// Lexer for tokenizing lambda bodies
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, quote_char: char) -> Result<String, ParserError> {
        let mut result = String::new();
        self.advance(); // skip opening quote

        loop {
            match self.current() {
                None => return Err(ParserError::UnclosedString),
                Some(ch) if ch == quote_char => {
                    self.advance(); // skip closing quote
                    return Ok(result);
                }
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        None => return Err(ParserError::UnclosedString),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some('b') => result.push('\u{0008}'),
                        Some('f') => result.push('\u{000C}'),
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some('u') => {
                            // Unicode escape sequence \uXXXX
                            self.advance();
                            let mut hex = String::new();
                            for _ in 0..4 {
                                match self.current() {
                                    Some(h) if h.is_ascii_hexdigit() => {
                                        hex.push(h);
                                        self.advance();
                                    }
                                    _ => {
                                        return Err(ParserError::InvalidEscape(format!(
                                            "\\u{}",
                                            hex
                                        )))
                                    }
                                }
                            }
                            let ch = u32::from_str_radix(&hex, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| ParserError::InvalidEscape(format!("\\u{}", hex)))?;
                            result.push(ch);
                            continue; // Don't advance again
                        }
                        Some(ch) => return Err(ParserError::InvalidEscape(format!("\\{}", ch))),
                    }
                    self.advance();
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> Result<f64, ParserError> {
        let start = self.position;

        // Integer part
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // Fractional part
        if self.current() == Some('.') {
            self.advance();
            if !self.current().is_some_and(|c| c.is_ascii_digit()) {
                return Err(ParserError::InvalidNumber(
                    "Expected digit after decimal point".to_string(),
                ));
            }
            while self.current().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if matches!(self.current(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.current(), Some('+') | Some('-')) {
                self.advance();
            }
            if !self.current().is_some_and(|c| c.is_ascii_digit()) {
                return Err(ParserError::InvalidNumber(
                    "Expected digit in exponent".to_string(),
                ));
            }
            while self.current().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.current().is_some_and(is_identifier_start) {
            let num_str: String = self.input[start..=self.position].iter().collect();
            return Err(ParserError::InvalidNumber(num_str));
        }

        let num_str: String = self.input[start..self.position].iter().collect();
        num_str
            .parse()
            .map_err(|_| ParserError::InvalidNumber(num_str))
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;

        while let Some(ch) = self.current() {
            if is_identifier_part(ch) {
                self.advance();
            } else {
                break;
            }
        }

        self.input[start..self.position].iter().collect()
    }

    /// Consume `len` characters and return `token`.
    fn symbol(&mut self, len: usize, token: Token) -> Result<Token, ParserError> {
        self.advance_by(len);
        Ok(token)
    }

    pub fn next_token(&mut self) -> Result<Token, ParserError> {
        self.skip_whitespace();

        let ch = match self.current() {
            None => return Ok(Token::Eof),
            Some(ch) => ch,
        };
        let next = self.peek(1);
        let after = self.peek(2);

        match ch {
            // String literals
            '"' | '\'' => Ok(Token::String(self.read_string(ch)?)),

            // Numbers
            c if c.is_ascii_digit() => Ok(Token::Number(self.read_number()?)),

            // Three- and two-character operators
            '=' if next == Some('=') && after == Some('=') => self.symbol(3, Token::Equal),
            '!' if next == Some('=') && after == Some('=') => self.symbol(3, Token::NotEqual),
            '=' if next == Some('=') => self.symbol(2, Token::Equal),
            '=' if next == Some('>') => self.symbol(2, Token::Arrow),
            '!' if next == Some('=') => self.symbol(2, Token::NotEqual),
            '<' if next == Some('=') => self.symbol(2, Token::LessThanOrEqual),
            '>' if next == Some('=') => self.symbol(2, Token::GreaterThanOrEqual),
            '&' if next == Some('&') => self.symbol(2, Token::And),
            '|' if next == Some('|') => self.symbol(2, Token::Or),

            // Single-character operators and delimiters
            '=' => self.symbol(1, Token::Assign),
            '!' => self.symbol(1, Token::Bang),
            '<' => self.symbol(1, Token::LessThan),
            '>' => self.symbol(1, Token::GreaterThan),
            '+' => self.symbol(1, Token::Plus),
            '-' => self.symbol(1, Token::Minus),
            '*' => self.symbol(1, Token::Star),
            '/' => self.symbol(1, Token::Slash),
            '%' => self.symbol(1, Token::Percent),
            '.' => self.symbol(1, Token::Dot),
            '?' => self.symbol(1, Token::Question),
            ':' => self.symbol(1, Token::Colon),
            '(' => self.symbol(1, Token::LeftParen),
            ')' => self.symbol(1, Token::RightParen),
            '[' => self.symbol(1, Token::LeftBracket),
            ']' => self.symbol(1, Token::RightBracket),
            '{' => self.symbol(1, Token::LeftBrace),
            '}' => self.symbol(1, Token::RightBrace),
            ',' => self.symbol(1, Token::Comma),
            ';' => self.symbol(1, Token::Semicolon),

            // Identifiers and keywords
            c if is_identifier_start(c) => {
                let ident = self.read_identifier();
                Ok(match ident.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    "undefined" => Token::Undefined,
                    word if RESERVED_WORDS.contains(&word) => Token::Reserved(ident),
                    _ => Token::Identifier(ident),
                })
            }

            other => Err(ParserError::UnexpectedToken(other.to_string())),
        }
    }
}

/// Tokens that can never appear in a lambda body, with the reason.
fn forbidden(token: &Token) -> Option<ParserError> {
    let reason = match token {
        Token::Assign => "assignment is not permitted in a lambda body".to_string(),
        Token::Arrow => "nested lambdas are not permitted".to_string(),
        Token::Semicolon => "statement sequences are not permitted".to_string(),
        Token::LeftBrace | Token::RightBrace => {
            "statement blocks are not permitted".to_string()
        }
        Token::Reserved(word) => format!("`{}` is not permitted in a lambda body", word),
        _ => return None,
    };
    Some(ParserError::InvalidSyntax(reason))
}

/// Parser for lambda bodies using Pratt parsing
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParserError> {
        Self::with_max_depth(input, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(input: &str, max_depth: usize) -> Result<Self, ParserError> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            depth: 0,
            max_depth,
        })
    }

    fn advance(&mut self) -> Result<(), ParserError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParserError> {
        if self.current_token == expected {
            self.advance()
        } else if self.current_token == Token::Eof {
            Err(ParserError::UnexpectedEnd)
        } else if let Some(err) = forbidden(&self.current_token) {
            Err(err)
        } else {
            Err(ParserError::Expected {
                expected: format!("{:?}", expected),
                found: format!("{:?}", self.current_token),
            })
        }
    }

    /// Get the binding power (precedence) for the current token
    fn binding_power(&self, token: &Token) -> Option<(u8, u8)> {
        // Returns (left_bp, right_bp); higher numbers bind tighter.
        // left_bp < right_bp makes an operator left associative.
        match token {
            Token::Question => Some((10, 10)), // Right associative
            Token::Or => Some((20, 21)),
            Token::And => Some((30, 31)),
            Token::Equal | Token::NotEqual => Some((40, 41)),
            Token::LessThan
            | Token::LessThanOrEqual
            | Token::GreaterThan
            | Token::GreaterThanOrEqual => Some((45, 46)),
            Token::Plus | Token::Minus => Some((50, 51)),
            Token::Star | Token::Slash | Token::Percent => Some((60, 61)),
            Token::Dot | Token::LeftBracket => Some((80, 81)),
            _ => None,
        }
    }

    /// Parse a primary expression (literals, identifiers, grouping, prefix operators)
    fn parse_primary(&mut self) -> Result<AstNode, ParserError> {
        if let Some(err) = forbidden(&self.current_token) {
            return Err(err);
        }

        match &self.current_token {
            Token::String(s) => {
                let value = s.clone();
                self.advance()?;
                Ok(AstNode::String(value))
            }
            Token::Number(n) => {
                let value = *n;
                self.advance()?;
                Ok(AstNode::Number(value))
            }
            Token::True => {
                self.advance()?;
                Ok(AstNode::Boolean(true))
            }
            Token::False => {
                self.advance()?;
                Ok(AstNode::Boolean(false))
            }
            Token::Null => {
                self.advance()?;
                Ok(AstNode::Null)
            }
            Token::Undefined => {
                self.advance()?;
                Ok(AstNode::Undefined)
            }
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(AstNode::Identifier(name))
            }
            Token::LeftParen => {
                self.advance()?; // skip '('
                let inner = self.parse_expression(0)?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            Token::LeftBracket => {
                self.advance()?; // skip '['

                let mut elements = Vec::new();

                if self.current_token != Token::RightBracket {
                    loop {
                        elements.push(self.parse_expression(0)?);

                        if self.current_token != Token::Comma {
                            break;
                        }
                        self.advance()?;
                    }
                }

                self.expect(Token::RightBracket)?;
                Ok(AstNode::Array(elements))
            }
            Token::Minus | Token::Bang => {
                let op = if self.current_token == Token::Minus {
                    UnaryOp::Negate
                } else {
                    UnaryOp::Not
                };
                self.advance()?;
                let operand = self.parse_expression(70)?; // Binds tighter than any binary operator
                Ok(AstNode::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            Token::Eof => Err(ParserError::UnexpectedEnd),
            _ => Err(ParserError::UnexpectedToken(format!(
                "{:?}",
                self.current_token
            ))),
        }
    }

    /// Name following a `.`; any word is accepted, reserved or not.
    fn parse_property_name(&mut self) -> Result<String, ParserError> {
        let name = match &self.current_token {
            Token::Identifier(name) | Token::Reserved(name) => name.clone(),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
            Token::Undefined => "undefined".to_string(),
            Token::Eof => return Err(ParserError::UnexpectedEnd),
            other => {
                return Err(ParserError::Expected {
                    expected: "property name".to_string(),
                    found: format!("{:?}", other),
                })
            }
        };
        self.advance()?;
        Ok(name)
    }

    /// Parse an expression with Pratt parsing
    fn parse_expression(&mut self, min_bp: u8) -> Result<AstNode, ParserError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParserError::TooDeep(self.max_depth));
        }
        let result = self.parse_expression_inner(min_bp);
        self.depth -= 1;
        result
    }

    fn parse_expression_inner(&mut self, min_bp: u8) -> Result<AstNode, ParserError> {
        let mut lhs = self.parse_primary()?;

        loop {
            // Check for end of expression
            if matches!(
                self.current_token,
                Token::Eof | Token::RightParen | Token::RightBracket | Token::Comma | Token::Colon
            ) {
                break;
            }

            if let Some(err) = forbidden(&self.current_token) {
                return Err(err);
            }
            if self.current_token == Token::LeftParen {
                return Err(ParserError::InvalidSyntax(
                    "function calls are not permitted".to_string(),
                ));
            }

            // Get binding power for current operator
            let (left_bp, right_bp) = match self.binding_power(&self.current_token) {
                Some(bp) => bp,
                None => break,
            };

            if left_bp < min_bp {
                break;
            }

            match &self.current_token {
                Token::Dot => {
                    self.advance()?;
                    let property = self.parse_property_name()?;
                    lhs = AstNode::Member {
                        object: Box::new(lhs),
                        property,
                    };
                }
                Token::LeftBracket => {
                    self.advance()?;
                    let index = self.parse_expression(0)?;
                    self.expect(Token::RightBracket)?;
                    lhs = AstNode::Index {
                        object: Box::new(lhs),
                        index: Box::new(index),
                    };
                }
                Token::Question => {
                    self.advance()?;
                    let then_branch = self.parse_expression(0)?;
                    self.expect(Token::Colon)?;
                    let else_branch = self.parse_expression(right_bp)?;

                    lhs = AstNode::Conditional {
                        condition: Box::new(lhs),
                        then_branch: Box::new(then_branch),
                        else_branch: Box::new(else_branch),
                    };
                }
                _ => {
                    // Binary operators
                    let op = match &self.current_token {
                        Token::Plus => BinaryOp::Add,
                        Token::Minus => BinaryOp::Subtract,
                        Token::Star => BinaryOp::Multiply,
                        Token::Slash => BinaryOp::Divide,
                        Token::Percent => BinaryOp::Modulo,
                        Token::Equal => BinaryOp::Equal,
                        Token::NotEqual => BinaryOp::NotEqual,
                        Token::LessThan => BinaryOp::LessThan,
                        Token::LessThanOrEqual => BinaryOp::LessThanOrEqual,
                        Token::GreaterThan => BinaryOp::GreaterThan,
                        Token::GreaterThanOrEqual => BinaryOp::GreaterThanOrEqual,
                        Token::And => BinaryOp::And,
                        Token::Or => BinaryOp::Or,
                        _ => {
                            return Err(ParserError::UnexpectedToken(format!(
                                "{:?}",
                                self.current_token
                            )))
                        }
                    };

                    self.advance()?;
                    let rhs = self.parse_expression(right_bp)?;

                    lhs = AstNode::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    };
                }
            }
        }

        Ok(lhs)
    }

    pub fn parse(&mut self) -> Result<AstNode, ParserError> {
        let ast = self.parse_expression(0)?;

        if self.current_token != Token::Eof {
            if let Some(err) = forbidden(&self.current_token) {
                return Err(err);
            }
            return Err(ParserError::Expected {
                expected: "end of expression".to_string(),
                found: format!("{:?}", self.current_token),
            });
        }

        if ast.depth() > self.max_depth {
            return Err(ParserError::TooDeep(self.max_depth));
        }

        Ok(ast)
    }
}

/// Parse a lambda body into an AST with the default nesting limit
pub fn parse(expression: &str) -> Result<AstNode, ParserError> {
    Parser::new(expression)?.parse()
}

/// Parse a lambda body into an AST, rejecting trees deeper than `max_depth`
pub fn parse_with_max_depth(expression: &str, max_depth: usize) -> Result<AstNode, ParserError> {
    Parser::with_max_depth(expression, max_depth)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                return out;
            }
            out.push(token);
        }
    }

    // Lexer tests
    #[test]
    fn test_lexer_numbers() {
        assert_eq!(
            tokens("42 1.25 2.5e10 1E-5"),
            vec![
                Token::Number(42.0),
                Token::Number(1.25),
                Token::Number(2.5e10),
                Token::Number(1e-5),
            ]
        );
    }

    #[test]
    fn test_lexer_minus_is_an_operator() {
        assert_eq!(
            tokens("x-1"),
            vec![
                Token::Identifier("x".to_string()),
                Token::Minus,
                Token::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_lexer_strings() {
        assert_eq!(
            tokens(r#""hello" 'world'"#),
            vec![
                Token::String("hello".to_string()),
                Token::String("world".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_string_escapes() {
        assert_eq!(
            tokens(r#""a\nb\t\"c\" A" 'it\'s'"#),
            vec![
                Token::String("a\nb\t\"c\" A".to_string()),
                Token::String("it's".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_keywords() {
        assert_eq!(
            tokens("true false null undefined return"),
            vec![
                Token::True,
                Token::False,
                Token::Null,
                Token::Undefined,
                Token::Reserved("return".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_identifiers() {
        assert_eq!(
            tokens("x _tmp $el item2"),
            vec![
                Token::Identifier("x".to_string()),
                Token::Identifier("_tmp".to_string()),
                Token::Identifier("$el".to_string()),
                Token::Identifier("item2".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_operators() {
        assert_eq!(
            tokens("+ - * / % == === != !== < <= > >= && || ! = =>"),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Percent,
                Token::Equal,
                Token::Equal,
                Token::NotEqual,
                Token::NotEqual,
                Token::LessThan,
                Token::LessThanOrEqual,
                Token::GreaterThan,
                Token::GreaterThanOrEqual,
                Token::And,
                Token::Or,
                Token::Bang,
                Token::Assign,
                Token::Arrow,
            ]
        );
    }

    #[test]
    fn test_lexer_rejects_unknown_characters() {
        let mut lexer = Lexer::new("#");
        assert!(matches!(lexer.next_token(), Err(ParserError::UnexpectedToken(_))));

        let mut lexer = Lexer::new("a & b");
        lexer.next_token().unwrap();
        assert!(matches!(lexer.next_token(), Err(ParserError::UnexpectedToken(_))));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("x"));
        assert!(is_identifier("$item_1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier("return"));
        assert!(!is_identifier("true"));
    }

    // Parser tests
    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("42").unwrap(), AstNode::Number(42.0));
        assert_eq!(parse("'hi'").unwrap(), AstNode::String("hi".to_string()));
        assert_eq!(parse("false").unwrap(), AstNode::Boolean(false));
        assert_eq!(parse("null").unwrap(), AstNode::Null);
        assert_eq!(parse("undefined").unwrap(), AstNode::Undefined);
    }

    #[test]
    fn test_parse_member_chain() {
        let ast = parse("x.a.b").unwrap();
        assert_eq!(
            ast,
            AstNode::member(AstNode::member(AstNode::identifier("x"), "a"), "b")
        );
    }

    #[test]
    fn test_parse_reserved_word_as_property() {
        let ast = parse("x.default.class").unwrap();
        assert_eq!(
            ast,
            AstNode::member(AstNode::member(AstNode::identifier("x"), "default"), "class")
        );
    }

    #[test]
    fn test_parse_index() {
        let ast = parse("x.items[0]").unwrap();
        match ast {
            AstNode::Index { object, index } => {
                assert_eq!(*object, AstNode::member(AstNode::identifier("x"), "items"));
                assert_eq!(*index, AstNode::Number(0.0));
            }
            _ => panic!("Expected Index node"),
        }
    }

    #[test]
    fn test_parse_precedence() {
        // 1 + 2 * 3 should parse as 1 + (2 * 3)
        let ast = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            ast,
            AstNode::binary(
                BinaryOp::Add,
                AstNode::Number(1.0),
                AstNode::binary(BinaryOp::Multiply, AstNode::Number(2.0), AstNode::Number(3.0)),
            )
        );
    }

    #[test]
    fn test_parse_left_associativity() {
        // 10 - 4 - 3 should parse as (10 - 4) - 3
        let ast = parse("10 - 4 - 3").unwrap();
        assert_eq!(
            ast,
            AstNode::binary(
                BinaryOp::Subtract,
                AstNode::binary(BinaryOp::Subtract, AstNode::Number(10.0), AstNode::Number(4.0)),
                AstNode::Number(3.0),
            )
        );
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse("(1 + 2) * 3").unwrap();
        assert_eq!(
            ast,
            AstNode::binary(
                BinaryOp::Multiply,
                AstNode::binary(BinaryOp::Add, AstNode::Number(1.0), AstNode::Number(2.0)),
                AstNode::Number(3.0),
            )
        );
    }

    #[test]
    fn test_parse_comparison_binds_looser_than_modulo() {
        // x.value % 2 == 0 should parse as (x.value % 2) == 0
        let ast = parse("x.value % 2 == 0").unwrap();
        match ast {
            AstNode::Binary {
                op: BinaryOp::Equal,
                lhs,
                rhs,
            } => {
                assert!(matches!(*lhs, AstNode::Binary { op: BinaryOp::Modulo, .. }));
                assert_eq!(*rhs, AstNode::Number(0.0));
            }
            _ => panic!("Expected equality at the root"),
        }
    }

    #[test]
    fn test_parse_logical_precedence() {
        // a || b && c should parse as a || (b && c)
        let ast = parse("a || b && c").unwrap();
        match ast {
            AstNode::Binary {
                op: BinaryOp::Or,
                rhs,
                ..
            } => assert!(matches!(*rhs, AstNode::Binary { op: BinaryOp::And, .. })),
            _ => panic!("Expected || at the root"),
        }
    }

    #[test]
    fn test_parse_unary() {
        let ast = parse("-x.value").unwrap();
        assert_eq!(
            ast,
            AstNode::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(AstNode::member(AstNode::identifier("x"), "value")),
            }
        );

        let ast = parse("!x.done == true").unwrap();
        assert!(matches!(ast, AstNode::Binary { op: BinaryOp::Equal, .. }));
    }

    #[test]
    fn test_parse_array() {
        let ast = parse("[x.a, x.b]").unwrap();
        match ast {
            AstNode::Array(elements) => assert_eq!(elements.len(), 2),
            _ => panic!("Expected Array node"),
        }
        assert_eq!(parse("[]").unwrap(), AstNode::Array(vec![]));
    }

    #[test]
    fn test_parse_conditional() {
        let ast = parse("x > 0 ? 1 : x < 0 ? -1 : 0").unwrap();
        match ast {
            AstNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                assert!(matches!(*condition, AstNode::Binary { .. }));
                assert_eq!(*then_branch, AstNode::Number(1.0));
                assert!(matches!(*else_branch, AstNode::Conditional { .. }));
            }
            _ => panic!("Expected Conditional node"),
        }
    }

    #[test]
    fn test_parse_rejects_statements() {
        for body in [
            "x.value = 1",
            "x.value += 1",
            "x.a; x.b",
            "{ return x }",
            "function() { }",
            "return x",
            "y => y",
            "x.value in x",
            "new x",
        ] {
            assert!(
                matches!(parse(body), Err(ParserError::InvalidSyntax(_))),
                "{body} should be rejected as invalid syntax"
            );
        }
    }

    #[test]
    fn test_parse_rejects_calls() {
        assert!(matches!(
            parse("x.name.toUpperCase()"),
            Err(ParserError::InvalidSyntax(_))
        ));
    }

    #[test]
    fn test_parse_unbalanced() {
        assert_eq!(parse("(x.value + 1"), Err(ParserError::UnexpectedEnd));
        assert!(parse("x.value + 1)").is_err());
        assert!(parse("x.items[0").is_err());
        assert_eq!(parse("x.value +"), Err(ParserError::UnexpectedEnd));
        assert!(parse("x..value").is_err());
        assert!(parse("x y").is_err());
    }

    #[test]
    fn test_parse_depth_limit() {
        let nested = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parse_with_max_depth(&nested, 64).is_ok());
        assert_eq!(parse_with_max_depth(&nested, 5), Err(ParserError::TooDeep(5)));

        let chain = format!("x{}", ".a".repeat(20));
        assert_eq!(parse_with_max_depth(&chain, 8), Err(ParserError::TooDeep(8)));
    }
}
