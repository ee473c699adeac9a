//! Diagnostics raised while lowering a syntax tree.
//!
//! None of these abort a compilation. The generator reports each one on its diagnostics
//! channel, skips the offending construct and carries on with the next statement.

use std::fmt;

use crate::ast::{Arity, NodeKind};

/// What is wrong with the shape of a node.
#[derive(Clone, Debug, PartialEq)]
pub enum Defect {
    /// The node has a child count its kind does not allow.
    ChildCount {
        expected: Arity,
        got: usize,
    },

    /// The node lacks the text payload (name, literal or operator) its kind requires.
    MissingPayload,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CodegenError {
    /// The node does not have the shape its kind requires.
    Structural {
        kind: NodeKind,
        defect: Defect,
    },

    /// The construct is valid input but lowering it is not implemented.
    Unsupported {
        construct: String,
    },

    /// The literal text cannot be decoded into a constant.
    InvalidLiteral {
        kind: NodeKind,
        text: String,
    },

    /// A sub-construct already failed, so this one was skipped.
    Propagated {
        construct: NodeKind,
    },
}

impl CodegenError {
    pub(crate) fn unsupported<S: Into<String>>(construct: S) -> CodegenError {
        CodegenError::Unsupported {
            construct: construct.into(),
        }
    }

    pub(crate) fn missing_payload(kind: NodeKind) -> CodegenError {
        CodegenError::Structural {
            kind,
            defect: Defect::MissingPayload,
        }
    }

    /// Returns `true` for failures caused by an earlier failure rather than by the node itself.
    pub fn is_propagated(&self) -> bool {
        match self {
            CodegenError::Propagated { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodegenError::Structural {
                kind,
                defect: Defect::ChildCount { expected, got },
            } => write!(
                f,
                "malformed {} node: expected {} children, got {}",
                kind, expected, got
            ),
            CodegenError::Structural {
                kind,
                defect: Defect::MissingPayload,
            } => write!(f, "malformed {} node: missing name or value", kind),
            CodegenError::Unsupported { construct } => {
                write!(f, "code generation not implemented for {}", construct)
            }
            CodegenError::InvalidLiteral { kind, text } => {
                write!(f, "invalid {} literal '{}'", kind, text)
            }
            CodegenError::Propagated { construct } => {
                write!(f, "{} skipped because an operand failed", construct)
            }
        }
    }
}

impl std::error::Error for CodegenError {}

/// Non-fatal findings that do not change the generated code.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A name is used without any declaration in the symbol table.
    UndeclaredIdentifier {
        name: String,
        suggestion: Option<String>,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::UndeclaredIdentifier {
                name,
                suggestion: Some(suggestion),
            } => write!(
                f,
                "use of undeclared identifier '{}' (did you mean '{}'?)",
                name, suggestion
            ),
            Warning::UndeclaredIdentifier { name, suggestion: None } => {
                write!(f, "use of undeclared identifier '{}'", name)
            }
        }
    }
}
