//! The ordered instruction sequence produced by the code generator.

use std::fmt;
use std::ops::Index;

use crate::instruction::Instruction;

/// Append-only list of quadruples. The order is the program order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            instructions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    pub(crate) fn clear(&mut self) {
        self.instructions.clear();
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Instruction> {
        self.instructions.iter()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Returns the index of the instruction that defines `label`.
    pub fn label_position(&self, label: &str) -> Option<usize> {
        self.instructions
            .iter()
            .position(|ins| ins.defined_label() == Some(label))
    }
}

impl Index<usize> for Program {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Instruction {
        &self.instructions[index]
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

/// Debug listing, one numbered line per instruction. Not a stable machine format.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.instructions.is_empty() {
            return writeln!(f, "(no code generated)");
        }

        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{:>3}: {}", index, instruction)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Address, OpCode};

    #[test]
    fn listing() {
        let mut program = Program::new();
        assert_eq!(program.to_string(), "(no code generated)\n");

        program.push(Instruction::new(
            OpCode::Assign,
            Address::ConstInt(1),
            Address::Empty,
            Address::variable("x"),
        ));
        program.push(Instruction::new(
            OpCode::Label,
            Address::label("L_IF_FALSE0"),
            Address::Empty,
            Address::Empty,
        ));

        assert_eq!(
            program.to_string(),
            "  0: ASSIGN x = 1\n  1: LABEL  L_IF_FALSE0:\n"
        );
        assert_eq!(program.label_position("L_IF_FALSE0"), Some(1));
        assert_eq!(program.label_position("L_ELSE3"), None);
    }
}
