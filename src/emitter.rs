//! Appending instructions and naming temporaries and labels.

use slog::{o, trace, Discard, Logger};

use crate::instruction::{Address, Instruction, OpCode};
use crate::program::Program;

/// Owns the instruction sequence of one compilation together with the counters used to name
/// fresh temporaries and labels.
///
/// Both counters only grow until [Emitter::reset] is called, so names are unique within a run and
/// identical across runs that start from a reset.
#[derive(Debug)]
pub struct Emitter {
    program: Program,
    next_temporary: u32,
    next_label: u32,
    logger: Logger,
}

impl Emitter {
    pub fn new() -> Emitter {
        Emitter::with_logger(None)
    }

    pub fn with_logger<L>(logger: L) -> Emitter
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()));

        Emitter {
            program: Program::new(),
            next_temporary: 0,
            next_label: 0,
            logger,
        }
    }

    /// Appends a new instruction to the end of the program and returns its index.
    ///
    /// The operands are moved into the instruction; callers clone addresses they still need.
    pub fn emit(&mut self, opcode: OpCode, arg1: Address, arg2: Address, result: Address) -> usize {
        let index = self
            .program
            .push(Instruction::new(opcode, arg1, arg2, result));

        trace!(self.logger, "emit instruction"; "index" => index, "opcode" => %opcode);

        index
    }

    /// Allocates a fresh temporary.
    pub fn new_temporary(&mut self) -> Address {
        let id = self.next_temporary;
        self.next_temporary += 1;

        trace!(self.logger, "new temporary"; "id" => id);

        Address::Temporary(id)
    }

    /// Allocates a fresh label named `base` followed by the label counter.
    pub fn new_label(&mut self, base: &str) -> Address {
        let name = format!("{}{}", base, self.next_label);
        self.next_label += 1;

        trace!(self.logger, "new label"; "name" => %name);

        Address::Label(name)
    }

    /// Clears the program and restarts both counters from zero.
    pub fn reset(&mut self) {
        self.program.clear();
        self.next_temporary = 0;
        self.next_label = 0;
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn into_program(self) -> Program {
        self.program
    }
}

impl Default for Emitter {
    fn default() -> Emitter {
        Emitter::new()
    }
}
