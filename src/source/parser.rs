//! Recursive-descent parser producing [Node] trees.
//!
//! Binary expressions are parsed by precedence climbing. Every other construct has its own
//! method that consumes exactly the tokens of that construct.

use logos::{Logos, SpannedIter};

use std::fmt;

use crate::ast::{DataType, Node};
use crate::parsing::{BufferedStream, Error, ErrorExt, Parser, SeekStream};

use super::token::Token;

/// What the parser was working on when an error occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Context {
    Unit,
    FunctionDefinition,
    Declaration,
    Block,
    Statement,
    If,
    While,
    DoWhile,
    For,
    Return,
    Print,
    Expression,
    Operand,
    Arguments,
    Identifier,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Context::Unit => "unit",
            Context::FunctionDefinition => "function definition",
            Context::Declaration => "declaration",
            Context::Block => "block",
            Context::Statement => "statement",
            Context::If => "if statement",
            Context::While => "while loop",
            Context::DoWhile => "do-while loop",
            Context::For => "for loop",
            Context::Return => "return statement",
            Context::Print => "printf call",
            Context::Expression => "expression",
            Context::Operand => "operand",
            Context::Arguments => "argument list",
            Context::Identifier => "identifier",
        };

        write!(f, "{}", name)
    }
}

pub type ParseError = Error<Context>;

type Result<T> = std::result::Result<T, ParseError>;

/// Binding power and operator text of the binary operators. Higher binds tighter.
fn binary_operator(token: &Token) -> Option<(u8, &'static str)> {
    let precedence = match token {
        Token::Or => 1,
        Token::And => 2,
        Token::Equal | Token::NotEqual => 3,
        Token::Less | Token::Greater | Token::LessEqual | Token::GreaterEqual => 4,
        Token::Plus | Token::Minus => 5,
        Token::Star | Token::Slash | Token::Percent => 6,
        _ => return None,
    };

    token.operator_symbol().map(|symbol| (precedence, symbol))
}

fn is_float_literal(text: &str) -> bool {
    text.contains(|c| c == '.' || c == 'e' || c == 'E')
}

pub struct SourceParser<'a> {
    stream: BufferedStream<SpannedIter<'a, Token<'a>>>,
}

impl<'a> Parser<Token<'a>> for SourceParser<'a> {
    type Stream = BufferedStream<SpannedIter<'a, Token<'a>>>;

    fn stream_mut(&mut self) -> &mut Self::Stream {
        &mut self.stream
    }
}

/// Parses a whole unit into a [Block](crate::ast::NodeKind::Block) of its top-level items.
pub fn parse(source: &str) -> Result<Node> {
    SourceParser::new(source).parse_unit()
}

impl<'a> SourceParser<'a> {
    pub fn new(source: &'a str) -> SourceParser<'a> {
        SourceParser {
            stream: Token::lexer(source).spanned().into(),
        }
    }

    /// Consumes the next token and reports it as unexpected.
    fn unexpected<T>(&mut self, ctx: Context) -> Result<T> {
        match self.stream.next() {
            Some((_, span)) => Err(Error::new(span, ctx)),
            None => Err(Error::eos(ctx)),
        }
    }

    fn expect(&mut self, token: Token<'a>, ctx: Context) -> Result<()> {
        self.assert_token(token).context(ctx)
    }

    fn take_identifier(&mut self) -> Result<&'a str> {
        match self.stream.next() {
            Some((Token::Identifier(name), _)) => Ok(name),
            Some((_, span)) => Err(Error::new(span, Context::Identifier)),
            None => Err(Error::eos(Context::Identifier)),
        }
    }

    pub fn parse_unit(&mut self) -> Result<Node> {
        let mut items = Vec::new();

        while self.peek().is_some() {
            items.extend(self.parse_item(true).context(Context::Unit)?);
        }

        Ok(Node::block(items))
    }

    /// Parses a function definition (when allowed), a declaration or a statement.
    ///
    /// A declaration expands into one [Decl](crate::ast::NodeKind::Decl) per declared name,
    /// each followed by an assignment if the name has an initializer.
    fn parse_item(&mut self, allow_function: bool) -> Result<Vec<Node>> {
        let data_type = match self.peek() {
            Some(Token::Type(data_type)) => Some(*data_type),
            _ => None,
        };

        let data_type = match data_type {
            Some(data_type) => data_type,
            None => return Ok(vec![self.parse_statement()?]),
        };

        self.stream.next();

        let name = self.take_identifier().context(Context::Declaration)?;

        if allow_function && self.eat(Token::LeftParen) {
            let function = self
                .parse_function_rest(name, data_type)
                .context(Context::FunctionDefinition)?;

            return Ok(vec![function]);
        }

        self.parse_declaration_rest(data_type, name)
            .context(Context::Declaration)
    }

    fn parse_function_rest(&mut self, name: &str, return_type: DataType) -> Result<Node> {
        self.eat(Token::Type(DataType::Void));
        self.expect(Token::RightParen, Context::Arguments)?;

        let body = self.parse_block()?;

        Ok(Node::func_def(name, return_type, body))
    }

    fn parse_declaration_rest(&mut self, data_type: DataType, first: &'a str) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut name = first;

        loop {
            nodes.push(Node::decl(name, data_type));

            if self.eat(Token::Assign) {
                let value = self.parse_expression()?;
                nodes.push(Node::assign(name, value));
            }

            if !self.eat(Token::Comma) {
                break;
            }

            name = self.take_identifier()?;
        }

        self.assert_token::<Context>(Token::Semicolon)?;

        Ok(nodes)
    }

    fn parse_block(&mut self) -> Result<Node> {
        self.expect(Token::LeftBrace, Context::Block)?;

        let mut items = Vec::new();

        while !self.eat(Token::RightBrace) {
            if self.peek().is_none() {
                return Err(Error::eos(Context::Block));
            }

            items.extend(self.parse_item(false).context(Context::Block)?);
        }

        Ok(Node::block(items))
    }

    pub fn parse_statement(&mut self) -> Result<Node> {
        let next = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(Error::eos(Context::Statement)),
        };

        match next {
            Token::LeftBrace => self.parse_block(),
            Token::If => self.parse_if().context(Context::If),
            Token::While => self.parse_while().context(Context::While),
            Token::Do => self.parse_do_while().context(Context::DoWhile),
            Token::For => self.parse_for().context(Context::For),
            Token::Return => self.parse_return().context(Context::Return),
            Token::Printf => self.parse_print().context(Context::Print),
            Token::Semicolon => {
                self.stream.next();
                Ok(Node::block(Vec::new()))
            }
            _ => {
                let statement = self.parse_simple()?;
                self.expect(Token::Semicolon, Context::Statement)?;
                Ok(statement)
            }
        }
    }

    fn parse_condition(&mut self) -> Result<Node> {
        self.expect(Token::LeftParen, Context::Expression)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RightParen, Context::Expression)?;

        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<Node> {
        self.stream.next();

        let condition = self.parse_condition()?;
        let then = self.parse_statement()?;

        if self.eat(Token::Else) {
            let otherwise = self.parse_statement()?;
            return Ok(Node::if_else(condition, then, otherwise));
        }

        Ok(Node::if_then(condition, then))
    }

    fn parse_while(&mut self) -> Result<Node> {
        self.stream.next();

        let condition = self.parse_condition()?;
        let body = self.parse_statement()?;

        Ok(Node::while_loop(condition, body))
    }

    fn parse_do_while(&mut self) -> Result<Node> {
        self.stream.next();

        let body = self.parse_statement()?;

        self.expect(Token::While, Context::DoWhile)?;
        let condition = self.parse_condition()?;
        self.expect(Token::Semicolon, Context::DoWhile)?;

        Ok(Node::do_while(body, condition))
    }

    fn parse_for(&mut self) -> Result<Node> {
        self.stream.next();

        self.expect(Token::LeftParen, Context::For)?;
        let init = self.parse_simple()?;
        self.expect(Token::Semicolon, Context::For)?;
        let condition = self.parse_expression()?;
        self.expect(Token::Semicolon, Context::For)?;
        let increment = self.parse_simple()?;
        self.expect(Token::RightParen, Context::For)?;

        let body = self.parse_statement()?;

        Ok(Node::for_loop(init, condition, increment, body))
    }

    fn parse_return(&mut self) -> Result<Node> {
        self.stream.next();

        if self.eat(Token::Semicolon) {
            return Ok(Node::ret(None));
        }

        let value = self.parse_expression()?;
        self.expect(Token::Semicolon, Context::Return)?;

        Ok(Node::ret(Some(value)))
    }

    fn parse_print(&mut self) -> Result<Node> {
        self.stream.next();

        self.expect(Token::LeftParen, Context::Arguments)?;
        let arguments = self.parse_arguments()?;
        self.expect(Token::Semicolon, Context::Print)?;

        Ok(Node::print(arguments))
    }

    /// Parses a comma separated expression list up to and including the closing parenthesis.
    fn parse_arguments(&mut self) -> Result<Vec<Node>> {
        let mut arguments = Vec::new();

        if self.eat(Token::RightParen) {
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_expression().context(Context::Arguments)?);

            if !self.eat(Token::Comma) {
                break;
            }
        }

        self.expect(Token::RightParen, Context::Arguments)?;

        Ok(arguments)
    }

    /// Assignment, postfix increment or decrement, or a bare expression.
    fn parse_simple(&mut self) -> Result<Node> {
        let updates = matches!(
            self.peek_nth(1),
            Some(Token::Assign) | Some(Token::Increment) | Some(Token::Decrement)
        );

        let name = match self.peek() {
            Some(Token::Identifier(name)) if updates => Some(*name),
            _ => None,
        };

        let name = match name {
            Some(name) => name,
            None => return self.parse_expression(),
        };

        self.stream.next();

        match self.stream.next() {
            Some((Token::Assign, _)) => {
                let value = self.parse_expression()?;
                Ok(Node::assign(name, value))
            }
            Some((Token::Increment, _)) => Ok(Node::assign(
                name,
                Node::binary("+", Node::id(name), Node::int(1)),
            )),
            _ => Ok(Node::assign(
                name,
                Node::binary("-", Node::id(name), Node::int(1)),
            )),
        }
    }

    pub fn parse_expression(&mut self) -> Result<Node> {
        self.parse_binary(1).context(Context::Expression)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Node> {
        let mut left = self.parse_unary()?;

        loop {
            let (precedence, symbol) = match self.peek().and_then(binary_operator) {
                Some(operator) if operator.0 >= min_precedence => operator,
                _ => break,
            };

            self.stream.next();

            let right = self.parse_binary(precedence + 1)?;
            left = Node::binary(symbol, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node> {
        let symbol = match self.peek() {
            Some(Token::Minus) => Some("-"),
            Some(Token::Not) => Some("!"),
            Some(Token::Tilde) => Some("~"),
            _ => None,
        };

        let symbol = match symbol {
            Some(symbol) => symbol,
            None => return self.parse_primary(),
        };

        self.stream.next();

        let operand = self.parse_unary()?;

        Ok(Node::unary(symbol, operand))
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let (token, span) = match self.stream.next() {
            Some(next) => next,
            None => return Err(Error::eos(Context::Operand)),
        };

        match token {
            Token::Number(text) if is_float_literal(text) => Ok(Node::num(text, DataType::Float)),
            Token::Number(text) => Ok(Node::num(text, DataType::Int)),
            Token::Character(text) => Ok(Node::char_lit(text)),
            Token::Str(text) => Ok(Node::string(text)),
            Token::Identifier(name) if self.eat(Token::LeftParen) => {
                let arguments = self.parse_arguments()?;
                Ok(Node::call(name, arguments))
            }
            Token::Identifier(name) => Ok(Node::id(name)),
            Token::LeftParen => {
                let inner = self.parse_binary(1)?;
                self.expect(Token::RightParen, Context::Operand)?;
                Ok(inner)
            }
            _ => {
                self.stream.seek(-1);
                self.unexpected(Context::Operand)
            }
        }
    }
}
