//! Tokens and a tokenizer for the C-like source language.

use logos::{Filter, Lexer, Logos};

use std::fmt;

use crate::ast::DataType;

/// Enumeration of all tokens of the source language.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Erroneous token that could not be interpreted as any of the other variants.
    #[error]
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    #[token("/*", block_comment)]
    Error,

    /// One of the type keywords.
    #[token("int", |_| DataType::Int)]
    #[token("float", |_| DataType::Float)]
    #[token("double", |_| DataType::Double)]
    #[token("char", |_| DataType::Char)]
    #[token("void", |_| DataType::Void)]
    Type(DataType),

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("while")]
    While,

    #[token("do")]
    Do,

    #[token("for")]
    For,

    #[token("return")]
    Return,

    /// The built-in print routine. Not an ordinary identifier, calls of it are lowered directly.
    #[token("printf")]
    Printf,

    #[regex("[A-Za-z_][A-Za-z0-9_]*", Lexer::slice)]
    Identifier(&'a str),

    /// Unsigned numeric literal, kept as written.
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", Lexer::slice)]
    Number(&'a str),

    /// Character literal including its quotes.
    #[regex(r"'([^'\\\n]|\\.)'", Lexer::slice)]
    Character(&'a str),

    /// String literal without its quotes. Escape sequences are kept as written.
    #[regex(r#""([^"\\\n]|\\.)*""#, string_callback)]
    Str(&'a str),

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("=")]
    Assign,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("==")]
    Equal,

    #[token("!=")]
    NotEqual,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("&&")]
    And,

    #[token("||")]
    Or,

    #[token("!")]
    Not,

    #[token("~")]
    Tilde,

    #[token("++")]
    Increment,

    #[token("--")]
    Decrement,
}

/// Skips a block comment. An unterminated comment swallows the rest of the input as an error.
fn block_comment<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Filter<()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Filter::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            Filter::Emit(())
        }
    }
}

fn string_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    let slice = lex.slice();
    &slice[1..slice.len() - 1]
}

impl<'a> Token<'a> {
    /// Operator text as understood by [Operator::classify](crate::ast::Operator::classify).
    pub fn operator_symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Equal => "==",
            Token::NotEqual => "!=",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LessEqual => "<=",
            Token::GreaterEqual => ">=",
            Token::And => "&&",
            Token::Or => "||",
            Token::Not => "!",
            Token::Tilde => "~",
            Token::Increment => "++",
            Token::Decrement => "--",
            _ => return None,
        };

        Some(symbol)
    }
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(symbol) = self.operator_symbol() {
            return write!(f, "{}", symbol);
        }

        match self {
            Token::Error => write!(f, "<error>"),
            Token::Type(data_type) => write!(f, "{}", data_type),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::Do => write!(f, "do"),
            Token::For => write!(f, "for"),
            Token::Return => write!(f, "return"),
            Token::Printf => write!(f, "printf"),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Number(text) | Token::Character(text) => write!(f, "{}", text),
            Token::Str(text) => write!(f, "\"{}\"", text),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Assign => write!(f, "="),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Token::lexer(source).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            tokens("int interval; whilex while"),
            vec![
                Token::Type(DataType::Int),
                Token::Identifier("interval"),
                Token::Semicolon,
                Token::Identifier("whilex"),
                Token::While,
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            tokens(r#"10 0.5 1e3 'a' "x = %d\n""#),
            vec![
                Token::Number("10"),
                Token::Number("0.5"),
                Token::Number("1e3"),
                Token::Character("'a'"),
                Token::Str("x = %d\\n"),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokens("a /* b ** c */ <= // d\n c++"),
            vec![
                Token::Identifier("a"),
                Token::LessEqual,
                Token::Identifier("c"),
                Token::Increment,
            ]
        );
    }

    #[test]
    fn block_comments() {
        assert_eq!(
            tokens("/** doc */ x /* a * b */ / /**/ y"),
            vec![Token::Identifier("x"), Token::Slash, Token::Identifier("y")]
        );

        let spanned = Token::lexer("x; /* open").spanned().collect::<Vec<_>>();
        assert_eq!(spanned.last(), Some(&(Token::Error, 3..10)));
    }

    #[test]
    fn spans() {
        let spanned = Token::lexer("x = 1;").spanned().collect::<Vec<_>>();

        assert_eq!(spanned[1], (Token::Assign, 2..3));
        assert_eq!(spanned[3], (Token::Semicolon, 5..6));
    }
}
