//! A crate for lowering the syntax trees of a small C-like language into three-address code
//! (quadruples).
//!
//! Currently this crate provides the functionality to:
//! - Parse C-like source text into a syntax tree and a flat symbol table.
//! - Lower assignments, arithmetic, `if`/`else`, `while`, `do`-`while`, `for`, `printf` and
//!   `return` into a linear sequence of quadruples with labels and conditional jumps.
//! - Render the generated code and the symbol table as human-readable listings.
//!
//! Constructs that can not be lowered are reported as diagnostics of the [Compilation] and
//! skipped. Code for everything else is still generated.
//!
//! # Unimplemented stuff
//! - Calls of user-defined functions, function parameters and frames
//! - Logical `&&` and `||`
//! - Comparisons used as values outside of conditions
//! - Scoping, every declaration lands in the same table
//!
//! # Example
//! ```
//! use quadgen::source::Unit;
//!
//! // Counts to ten and prints every step.
//! let source = r#"
//!     int i;
//!     i = 0;
//!     while (i < 10) {
//!         printf("%d\n", i);
//!         i = i + 1;
//!     }
//! "#;
//!
//! // Parse the source and collect its declarations.
//! let unit = Unit::parse(source).expect("could not parse the source");
//!
//! // Lower the syntax tree into quadruples.
//! let compilation = unit.compile();
//! assert!(compilation.errors.is_empty());
//!
//! let listing = compilation.program.to_string();
//! assert!(listing.starts_with("  0: ASSIGN i = 0\n  1: LABEL  L_WHILE_BEGIN0:\n"));
//! assert!(listing.contains("IF_GEQ i >= 10 GOTO L_WHILE_END1"));
//! ```
//!
//! Trees can also be built by hand and lowered without the front end:
//!
//! ```
//! use quadgen::ast::{DataType, Node};
//! use quadgen::codegen::generate;
//! use quadgen::symbol_table::SymbolTable;
//!
//! let tree = Node::block(vec![
//!     Node::decl("x", DataType::Int),
//!     Node::assign("x", Node::binary("+", Node::int(1), Node::int(2))),
//! ]);
//!
//! let mut symbols = SymbolTable::new();
//! symbols.declare(&tree);
//!
//! let compilation = generate(&tree, &symbols);
//! assert_eq!(compilation.program.to_string(), "  0: ADD    t0 = 1 + 2\n  1: ASSIGN x = t0\n");
//! ```
//!
//! # Executables
//!
//! ## `quadgen`
//!
//! Available with the `cli` feature. Reads a source file and prints the generated code,
//! optionally followed by the symbol table.
//!
//! ```text
//! $ quadgen count.c --symbols
//!   0: ASSIGN i = 0
//!   1: LABEL  L_WHILE_BEGIN0:
//!   2: IF_GEQ i >= 10 GOTO L_WHILE_END1
//!   3: ADD    t0 = i + 1
//!   4: ASSIGN i = t0
//!   5: GOTO   L_WHILE_BEGIN0
//!   6: LABEL  L_WHILE_END1:
//!
//! i            | int
//! ```
pub mod ast;
pub mod codegen;
pub mod emitter;
pub mod error;
pub mod instruction;
pub mod parsing;
pub mod program;
pub mod source;
pub mod symbol_table;

pub use codegen::{generate, Compilation, Generator};
pub use program::Program;
