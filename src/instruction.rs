//! Types for representing quadruples and their operands.

use std::fmt;

use crate::ast::{ArithmeticOp, Relation};

/// An operand slot of an [Instruction].
///
/// Text-carrying variants own their text, so cloning an address never shares storage with the
/// original.
#[derive(Clone, Debug, PartialEq)]
pub enum Address {
    /// Slot not used by the instruction.
    Empty,

    /// Named program variable.
    Variable(String),

    /// Generator-introduced temporary, rendered as `t<id>`.
    Temporary(u32),

    ConstInt(i32),

    ConstFloat(f32),

    ConstString(String),

    /// Jump target.
    Label(String),
}

impl Address {
    pub fn variable(name: &str) -> Address {
        Address::Variable(name.to_string())
    }

    pub fn label(name: &str) -> Address {
        Address::Label(name.to_string())
    }

    pub fn string(text: &str) -> Address {
        Address::ConstString(text.to_string())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Address::Empty => true,
            _ => false,
        }
    }
}

impl Default for Address {
    fn default() -> Address {
        Address::Empty
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Address::Empty => write!(f, "_"),
            Address::Variable(name) => write!(f, "{}", name),
            Address::Temporary(id) => write!(f, "t{}", id),
            Address::ConstInt(value) => write!(f, "{}", value),
            Address::ConstFloat(value) => write!(f, "{:.2}", value),
            Address::ConstString(text) => write!(f, "\"{}\"", text),
            Address::Label(name) => write!(f, "{}", name),
        }
    }
}

/// Operations of the intermediate representation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// `result = arg1`
    Assign,

    /// `result = arg1 <op> arg2`
    Arithmetic(ArithmeticOp),

    /// `result = -arg1`
    Negate,

    /// Jump to `result` if `arg1 <relation> arg2` holds.
    Branch(Relation),

    /// Defines the jump target `arg1`.
    Label,

    /// Unconditional jump to `arg1`.
    Goto,

    /// Pushes `arg1` as an argument of the next [Call](OpCode::Call).
    Param,

    /// Calls the routine named by `arg1` with `arg2` pushed arguments.
    Call,

    /// Returns from the current function with the optional value `arg1`.
    Return,
}

impl OpCode {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Assign => "ASSIGN",
            OpCode::Arithmetic(ArithmeticOp::Add) => "ADD",
            OpCode::Arithmetic(ArithmeticOp::Subtract) => "SUB",
            OpCode::Arithmetic(ArithmeticOp::Multiply) => "MUL",
            OpCode::Arithmetic(ArithmeticOp::Divide) => "DIV",
            OpCode::Arithmetic(ArithmeticOp::Modulo) => "MOD",
            OpCode::Negate => "UMINUS",
            OpCode::Branch(Relation::Equal) => "IF_EQ",
            OpCode::Branch(Relation::NotEqual) => "IF_NEQ",
            OpCode::Branch(Relation::Less) => "IF_LT",
            OpCode::Branch(Relation::Greater) => "IF_GT",
            OpCode::Branch(Relation::LessEqual) => "IF_LEQ",
            OpCode::Branch(Relation::GreaterEqual) => "IF_GEQ",
            OpCode::Label => "LABEL",
            OpCode::Goto => "GOTO",
            OpCode::Param => "PARAM",
            OpCode::Call => "CALL",
            OpCode::Return => "RETURN",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

fn arithmetic_symbol(op: ArithmeticOp) -> &'static str {
    match op {
        ArithmeticOp::Add => "+",
        ArithmeticOp::Subtract => "-",
        ArithmeticOp::Multiply => "*",
        ArithmeticOp::Divide => "/",
        ArithmeticOp::Modulo => "%",
    }
}

/// A single quadruple. Slots an opcode does not use hold [Address::Empty].
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub arg1: Address,
    pub arg2: Address,
    pub result: Address,
}

impl Instruction {
    pub fn new(opcode: OpCode, arg1: Address, arg2: Address, result: Address) -> Instruction {
        Instruction {
            opcode,
            arg1,
            arg2,
            result,
        }
    }

    /// Returns the label this instruction may transfer control to, if any.
    pub fn jump_target(&self) -> Option<&str> {
        let target = match self.opcode {
            OpCode::Goto => &self.arg1,
            OpCode::Branch(_) => &self.result,
            _ => return None,
        };

        match target {
            Address::Label(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the name of the label defined by this instruction, if any.
    pub fn defined_label(&self) -> Option<&str> {
        match (self.opcode, &self.arg1) {
            (OpCode::Label, Address::Label(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    /// Formats the operands after a mnemonic column, e.g. `ADD    t0 = a + 1`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.opcode == OpCode::Return && self.arg1.is_empty() {
            return write!(f, "{}", self.opcode);
        }

        write!(f, "{:<7}", self.opcode)?;

        match self.opcode {
            OpCode::Assign => write!(f, "{} = {}", self.result, self.arg1),
            OpCode::Arithmetic(op) => write!(
                f,
                "{} = {} {} {}",
                self.result,
                self.arg1,
                arithmetic_symbol(op),
                self.arg2
            ),
            OpCode::Negate => write!(f, "{} = - {}", self.result, self.arg1),
            OpCode::Branch(relation) => write!(
                f,
                "{} {} {} GOTO {}",
                self.arg1,
                relation.symbol(),
                self.arg2,
                self.result
            ),
            OpCode::Label => write!(f, "{}:", self.arg1),
            OpCode::Goto | OpCode::Param => write!(f, "{}", self.arg1),
            OpCode::Call => write!(f, "{}, {}", self.arg1, self.arg2),
            OpCode::Return => write!(f, "{}", self.arg1),
        }
    }
}
