//! Parsing C-like source text into syntax trees ready for code generation.

pub mod parser;
pub mod token;

pub use self::parser::{Context, ParseError};

use slog::Logger;

use crate::ast::Node;
use crate::codegen::{self, Compilation};
use crate::symbol_table::SymbolTable;

/// A parsed compilation unit together with the declarations found in it.
#[derive(Debug, Clone)]
pub struct Unit {
    /// A [Block](crate::ast::NodeKind::Block) of the top-level items in source order.
    pub root: Node,
    pub symbol_table: SymbolTable,
}

impl Unit {
    pub fn parse(input: &str) -> Result<Unit, ParseError> {
        let root = parser::parse(input)?;

        let mut symbol_table = SymbolTable::new();
        symbol_table.declare(&root);

        Ok(Unit { root, symbol_table })
    }

    pub fn compile(&self) -> Compilation {
        self.compile_with_logger(None)
    }

    pub fn compile_with_logger<L>(&self, logger: L) -> Compilation
    where
        L: Into<Option<Logger>>,
    {
        codegen::generate_with_logger(&self.root, &self.symbol_table, logger)
    }
}
