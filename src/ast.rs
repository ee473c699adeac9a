//! Types for representing the abstract syntax tree handed to the code generator.
//!
//! Trees are built either by [the bundled front end](crate::source) or by hand with the
//! builder functions on [Node]. The code generator only ever reads them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

/// The kind of an AST node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Variable declaration. Payload is the name, the declared type is set.
    Decl,

    /// Assignment of the single child to the variable named by the payload.
    Assign,

    /// Call of the built-in print routine. Every child is an argument.
    Print,

    /// `if (cond) then`.
    If,

    /// `if (cond) then else otherwise`.
    IfElse,

    /// `while (cond) body`.
    While,

    /// `for (init; cond; incr) body`.
    For,

    /// `do body while (cond)`.
    DoWhile,

    /// Sequence of statements.
    Block,

    /// Unary or binary expression. Payload is the operator symbol.
    Expr,

    /// Identifier reference.
    Id,

    /// Numeric literal. The declared type selects integer or floating-point decoding.
    Num,

    /// Quoted character literal, quotes included.
    Char,

    /// String literal, quotes stripped.
    String,

    /// Argument list of a [Call](NodeKind::Call).
    ArgList,

    /// Call of a user-defined function named by the payload.
    Call,

    /// Function definition wrapping a single body child.
    FuncDef,

    /// `return` with an optional value child.
    Return,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NodeKind::Decl => "declaration",
            NodeKind::Assign => "assignment",
            NodeKind::Print => "print",
            NodeKind::If => "if",
            NodeKind::IfElse => "if-else",
            NodeKind::While => "while",
            NodeKind::For => "for",
            NodeKind::DoWhile => "do-while",
            NodeKind::Block => "block",
            NodeKind::Expr => "expression",
            NodeKind::Id => "identifier",
            NodeKind::Num => "number",
            NodeKind::Char => "character",
            NodeKind::String => "string",
            NodeKind::ArgList => "argument list",
            NodeKind::Call => "call",
            NodeKind::FuncDef => "function definition",
            NodeKind::Return => "return",
        };

        write!(f, "{}", name)
    }
}

/// The number of children a node kind accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::Between(min, max) => count >= min && count <= max,
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::Between(min, max) => write!(f, "{} to {}", min, max),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

impl NodeKind {
    /// Returns the child count this kind of node must have.
    pub fn arity(&self) -> Arity {
        match self {
            NodeKind::Decl
            | NodeKind::Id
            | NodeKind::Num
            | NodeKind::Char
            | NodeKind::String => Arity::Exactly(0),
            NodeKind::Assign | NodeKind::FuncDef => Arity::Exactly(1),
            NodeKind::If | NodeKind::While | NodeKind::DoWhile => Arity::Exactly(2),
            NodeKind::IfElse => Arity::Exactly(3),
            NodeKind::For => Arity::Exactly(4),
            NodeKind::Expr => Arity::Between(1, 2),
            NodeKind::Call | NodeKind::Return => Arity::Between(0, 1),
            NodeKind::Print | NodeKind::Block | NodeKind::ArgList => Arity::Any,
        }
    }
}

/// Declared type tag of a variable, function or literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Float,
    Double,
    Char,
    Void,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Char => "char",
            DataType::Void => "void",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ();

    fn from_str(s: &str) -> Result<DataType, ()> {
        match s {
            "int" => Ok(DataType::Int),
            "float" => Ok(DataType::Float),
            "double" => Ok(DataType::Double),
            "char" => Ok(DataType::Char),
            "void" => Ok(DataType::Void),
            _ => Err(()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

/// One of the six comparisons.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl Relation {
    /// Returns the logical complement of the comparison.
    pub fn negate(self) -> Relation {
        match self {
            Relation::Equal => Relation::NotEqual,
            Relation::NotEqual => Relation::Equal,
            Relation::Less => Relation::GreaterEqual,
            Relation::Greater => Relation::LessEqual,
            Relation::LessEqual => Relation::Greater,
            Relation::GreaterEqual => Relation::Less,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Equal => "==",
            Relation::NotEqual => "!=",
            Relation::Less => "<",
            Relation::Greater => ">",
            Relation::LessEqual => "<=",
            Relation::GreaterEqual => ">=",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    BitwiseNot,
    Increment,
    Decrement,
}

/// Operator of an [Expr](NodeKind::Expr) node, classified once when the node is built.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Arithmetic(ArithmeticOp),
    Relational(Relation),
    Logical(LogicalOp),
    Unary(UnaryOp),
    Unknown(String),
}

lazy_static! {
    static ref OPERATORS: HashMap<&'static str, Operator> = {
        let mut table = HashMap::new();

        table.insert("+", Operator::Arithmetic(ArithmeticOp::Add));
        table.insert("-", Operator::Arithmetic(ArithmeticOp::Subtract));
        table.insert("*", Operator::Arithmetic(ArithmeticOp::Multiply));
        table.insert("/", Operator::Arithmetic(ArithmeticOp::Divide));
        table.insert("%", Operator::Arithmetic(ArithmeticOp::Modulo));

        table.insert("==", Operator::Relational(Relation::Equal));
        table.insert("!=", Operator::Relational(Relation::NotEqual));
        table.insert("<", Operator::Relational(Relation::Less));
        table.insert(">", Operator::Relational(Relation::Greater));
        table.insert("<=", Operator::Relational(Relation::LessEqual));
        table.insert(">=", Operator::Relational(Relation::GreaterEqual));

        table.insert("&&", Operator::Logical(LogicalOp::And));
        table.insert("||", Operator::Logical(LogicalOp::Or));

        table.insert("!", Operator::Unary(UnaryOp::Not));
        table.insert("~", Operator::Unary(UnaryOp::BitwiseNot));
        table.insert("++", Operator::Unary(UnaryOp::Increment));
        table.insert("--", Operator::Unary(UnaryOp::Decrement));

        table
    };
}

impl Operator {
    pub fn classify(symbol: &str) -> Operator {
        OPERATORS
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Operator::Unknown(symbol.to_string()))
    }
}

/// A node of the syntax tree. Children are owned exclusively by their parent.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,

    /// Literal text, identifier or operator symbol.
    pub value: Option<String>,

    pub data_type: Option<DataType>,

    /// Classification of `value` for [Expr](NodeKind::Expr) nodes, `None` otherwise.
    pub operator: Option<Operator>,

    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, value: Option<String>, data_type: Option<DataType>, children: Vec<Node>) -> Node {
        let operator = match (kind, &value) {
            (NodeKind::Expr, Some(symbol)) => Some(Operator::classify(symbol)),
            _ => None,
        };

        Node {
            kind,
            value,
            data_type,
            operator,
            children,
        }
    }

    fn leaf(kind: NodeKind, value: &str, data_type: Option<DataType>) -> Node {
        Node::new(kind, Some(value.to_string()), data_type, Vec::new())
    }

    pub fn decl(name: &str, data_type: DataType) -> Node {
        Node::leaf(NodeKind::Decl, name, Some(data_type))
    }

    pub fn id(name: &str) -> Node {
        Node::leaf(NodeKind::Id, name, None)
    }

    pub fn num(text: &str, data_type: DataType) -> Node {
        Node::leaf(NodeKind::Num, text, Some(data_type))
    }

    pub fn int(value: i32) -> Node {
        Node::num(&value.to_string(), DataType::Int)
    }

    /// Character literal, `text` including the surrounding quotes.
    pub fn char_lit(text: &str) -> Node {
        Node::leaf(NodeKind::Char, text, Some(DataType::Char))
    }

    pub fn string(text: &str) -> Node {
        Node::leaf(NodeKind::String, text, None)
    }

    pub fn unary(operator: &str, operand: Node) -> Node {
        Node::new(NodeKind::Expr, Some(operator.to_string()), None, vec![operand])
    }

    pub fn binary(operator: &str, left: Node, right: Node) -> Node {
        Node::new(NodeKind::Expr, Some(operator.to_string()), None, vec![left, right])
    }

    pub fn assign(name: &str, value: Node) -> Node {
        Node::new(NodeKind::Assign, Some(name.to_string()), None, vec![value])
    }

    pub fn print(arguments: Vec<Node>) -> Node {
        Node::new(NodeKind::Print, None, None, arguments)
    }

    pub fn if_then(condition: Node, then: Node) -> Node {
        Node::new(NodeKind::If, None, None, vec![condition, then])
    }

    pub fn if_else(condition: Node, then: Node, otherwise: Node) -> Node {
        Node::new(NodeKind::IfElse, None, None, vec![condition, then, otherwise])
    }

    pub fn while_loop(condition: Node, body: Node) -> Node {
        Node::new(NodeKind::While, None, None, vec![condition, body])
    }

    pub fn do_while(body: Node, condition: Node) -> Node {
        Node::new(NodeKind::DoWhile, None, None, vec![body, condition])
    }

    pub fn for_loop(init: Node, condition: Node, increment: Node, body: Node) -> Node {
        Node::new(NodeKind::For, None, None, vec![init, condition, increment, body])
    }

    pub fn block(statements: Vec<Node>) -> Node {
        Node::new(NodeKind::Block, None, None, statements)
    }

    pub fn call(name: &str, arguments: Vec<Node>) -> Node {
        let arguments = Node::new(NodeKind::ArgList, None, None, arguments);
        Node::new(NodeKind::Call, Some(name.to_string()), None, vec![arguments])
    }

    pub fn func_def(name: &str, return_type: DataType, body: Node) -> Node {
        Node::new(NodeKind::FuncDef, Some(name.to_string()), Some(return_type), vec![body])
    }

    pub fn ret(value: Option<Node>) -> Node {
        Node::new(NodeKind::Return, None, None, value.into_iter().collect())
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Checks the child count against [NodeKind::arity].
    pub fn has_valid_arity(&self) -> bool {
        self.kind.arity().accepts(self.children.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_are_classified_on_construction() {
        let sum = Node::binary("+", Node::id("a"), Node::int(1));
        assert_eq!(sum.operator, Some(Operator::Arithmetic(ArithmeticOp::Add)));

        let cmp = Node::binary("<=", Node::id("a"), Node::id("b"));
        assert_eq!(cmp.operator, Some(Operator::Relational(Relation::LessEqual)));

        let and = Node::binary("&&", Node::id("a"), Node::id("b"));
        assert_eq!(and.operator, Some(Operator::Logical(LogicalOp::And)));

        let weird = Node::binary("<<", Node::id("a"), Node::id("b"));
        assert_eq!(weird.operator, Some(Operator::Unknown("<<".to_string())));

        assert_eq!(Node::id("a").operator, None);
    }

    #[test]
    fn arity_table() {
        assert!(Node::if_then(Node::id("c"), Node::block(vec![])).has_valid_arity());
        assert!(Node::ret(None).has_valid_arity());
        assert!(Node::ret(Some(Node::int(0))).has_valid_arity());

        let broken = Node::new(NodeKind::For, None, None, vec![Node::id("i")]);
        assert!(!broken.has_valid_arity());

        let ternary = Node::new(
            NodeKind::Expr,
            Some("?".to_string()),
            None,
            vec![Node::id("a"), Node::id("b"), Node::id("c")],
        );
        assert!(!ternary.has_valid_arity());
    }

    #[test]
    fn relation_negation_is_an_involution() {
        let all = [
            Relation::Equal,
            Relation::NotEqual,
            Relation::Less,
            Relation::Greater,
            Relation::LessEqual,
            Relation::GreaterEqual,
        ];

        for relation in all.iter() {
            assert_eq!(relation.negate().negate(), *relation);
            assert_ne!(relation.negate(), *relation);
        }
    }

    #[test]
    fn data_type_keywords() {
        assert_eq!("int".parse(), Ok(DataType::Int));
        assert_eq!("double".parse(), Ok(DataType::Double));
        assert_eq!("long".parse::<DataType>(), Err(()));
        assert_eq!(DataType::Float.to_string(), "float");
    }
}
