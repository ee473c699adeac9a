//! Lowering of syntax trees into quadruples.
//!
//! The [Generator] walks a tree recursively and appends instructions through its [Emitter].
//! Every call to [Generator::lower] returns the address holding the value of the lowered node,
//! [Address::Empty] for statements, or an error for constructs that could not be lowered.
//!
//! Failures never stop the walk. Each one is logged and recorded in the diagnostics of the
//! [Compilation], and lowering continues with the next statement, so a program with errors
//! still yields every instruction that could be produced.
//!
//! # Control flow
//!
//! Conditions are lowered straight into conditional jumps. A comparison such as `a < b` in an
//! `if` becomes a single `IF_GEQ a >= b GOTO L_IF_FALSE0`, jumping over the body when the
//! condition is false. Any other condition value is compared against zero.

use slog::{debug, o, warn, Discard, Logger};

use crate::ast::{ArithmeticOp, DataType, Node, NodeKind, Operator, Relation};
use crate::emitter::Emitter;
use crate::error::{CodegenError, Defect, Warning};
use crate::instruction::{Address, OpCode};
use crate::program::Program;
use crate::symbol_table::SymbolTable;

pub type Result<T> = std::result::Result<T, CodegenError>;

/// Name of the built-in routine [Print](NodeKind::Print) nodes are lowered into calls of.
pub const PRINT_BUILTIN: &str = "printf";

/// The outcome of lowering a whole tree.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub program: Program,

    /// Every failure reported during lowering, in the order they occurred.
    pub errors: Vec<CodegenError>,

    pub warnings: Vec<Warning>,
}

impl Compilation {
    /// Returns `true` if no construct failed to lower.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Code generation context of a single compilation.
///
/// Holds the instruction sequence, the temporary and label counters and the diagnostics.
/// Independent generators share nothing, so separate units can be compiled side by side.
pub struct Generator<'s> {
    emitter: Emitter,
    symbols: &'s SymbolTable,
    errors: Vec<CodegenError>,
    warnings: Vec<Warning>,
    logger: Logger,
}

impl<'s> Generator<'s> {
    pub fn new(symbols: &'s SymbolTable) -> Generator<'s> {
        Generator::with_logger(symbols, None)
    }

    pub fn with_logger<L>(symbols: &'s SymbolTable, logger: L) -> Generator<'s>
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "codegen"));

        Generator {
            emitter: Emitter::with_logger(logger.clone()),
            symbols,
            errors: Vec::new(),
            warnings: Vec::new(),
            logger,
        }
    }

    /// Discards everything generated so far and restarts temporary and label numbering.
    pub fn reset(&mut self) {
        self.emitter.reset();
        self.errors.clear();
        self.warnings.clear();
    }

    pub fn program(&self) -> &Program {
        self.emitter.program()
    }

    pub fn errors(&self) -> &[CodegenError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn finish(self) -> Compilation {
        Compilation {
            program: self.emitter.into_program(),
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Lowers `node` and returns the address that holds its value.
    ///
    /// Statements return [Address::Empty]. Errors have already been recorded when this returns,
    /// callers only decide whether to keep going.
    pub fn lower(&mut self, node: &Node) -> Result<Address> {
        if !node.has_valid_arity() {
            return self.fail(CodegenError::Structural {
                kind: node.kind,
                defect: Defect::ChildCount {
                    expected: node.kind.arity(),
                    got: node.children.len(),
                },
            });
        }

        match node.kind {
            NodeKind::Block => {
                for statement in &node.children {
                    let _ = self.lower(statement);
                }

                Ok(Address::Empty)
            }
            NodeKind::Decl => Ok(Address::Empty),
            NodeKind::Assign => self.lower_assignment(node),
            NodeKind::Num => self.lower_number(node),
            NodeKind::Char => self.lower_character(node),
            NodeKind::String => {
                let text = self.payload(node)?;
                Ok(Address::string(text))
            }
            NodeKind::Id => {
                let name = self.payload(node)?;
                self.check_declared(name);
                Ok(Address::variable(name))
            }
            NodeKind::Expr => self.lower_expression(node),
            NodeKind::If => self.lower_if(node),
            NodeKind::IfElse => self.lower_if_else(node),
            NodeKind::While => self.lower_while(node),
            NodeKind::DoWhile => self.lower_do_while(node),
            NodeKind::For => self.lower_for(node),
            NodeKind::Print => self.lower_print(node),
            NodeKind::FuncDef => {
                debug!(self.logger, "lower function"; "name" => node.value.as_deref().unwrap_or("?"));

                // No prologue or epilogue, the body is emitted in place.
                let _ = self.lower(&node.children[0]);

                Ok(Address::Empty)
            }
            NodeKind::Return => self.lower_return(node),
            NodeKind::Call => {
                let name = self.payload(node)?;
                self.fail(CodegenError::unsupported(format!("call to function '{}'", name)))
            }
            NodeKind::ArgList => {
                self.fail(CodegenError::unsupported("argument list outside of a call"))
            }
        }
    }

    /// Emits a conditional jump to `target`.
    ///
    /// With `jump_if_false` the jump is taken when `condition` does not hold, otherwise when it
    /// does. Comparisons jump on the (possibly inverted) relation directly. Other values jump on
    /// a comparison with zero.
    pub fn emit_branch(&mut self, condition: &Node, target: &Address, jump_if_false: bool) -> Result<()> {
        if let (Some(Operator::Relational(relation)), [left, right]) =
            (&condition.operator, condition.children.as_slice())
        {
            let left = self.lower_value(left);
            let right = self.lower_value(right);

            let (left, right) = match (left, right) {
                (Ok(left), Ok(right)) => (left, right),
                _ => return self.propagate(NodeKind::Expr),
            };

            let relation = if jump_if_false {
                relation.negate()
            } else {
                *relation
            };

            self.emitter
                .emit(OpCode::Branch(relation), left, right, target.clone());

            return Ok(());
        }

        let value = match self.lower_value(condition) {
            Ok(value) => value,
            Err(_) => return self.propagate(condition.kind),
        };

        let relation = if jump_if_false {
            Relation::Equal
        } else {
            Relation::NotEqual
        };

        self.emitter
            .emit(OpCode::Branch(relation), value, Address::ConstInt(0), target.clone());

        Ok(())
    }

    /// Lowers a node whose result is used as an operand. Statements are rejected here so that no
    /// instruction receives an empty operand in place of a value.
    fn lower_value(&mut self, node: &Node) -> Result<Address> {
        match self.lower(node)? {
            Address::Empty => self.fail(CodegenError::unsupported(format!(
                "{} used as a value",
                node.kind
            ))),
            address => Ok(address),
        }
    }

    fn lower_assignment(&mut self, node: &Node) -> Result<Address> {
        let name = self.payload(node)?;
        self.check_declared(name);

        let target = Address::variable(name);

        let value = match self.lower_value(&node.children[0]) {
            Ok(value) => value,
            Err(_) => return self.propagate(NodeKind::Assign),
        };

        self.emitter
            .emit(OpCode::Assign, value, Address::Empty, target.clone());

        Ok(target)
    }

    fn lower_number(&mut self, node: &Node) -> Result<Address> {
        let text = self.payload(node)?;

        let constant = match node.data_type {
            Some(DataType::Int) => text.parse().ok().map(Address::ConstInt),
            _ => text.parse().ok().map(Address::ConstFloat),
        };

        match constant {
            Some(constant) => Ok(constant),
            None => self.fail(CodegenError::InvalidLiteral {
                kind: NodeKind::Num,
                text: text.to_string(),
            }),
        }
    }

    /// Takes the character right after the opening quote. Escape sequences are not decoded.
    fn lower_character(&mut self, node: &Node) -> Result<Address> {
        let text = self.payload(node)?;

        match text.chars().nth(1) {
            Some(ch) => Ok(Address::ConstInt(ch as i32)),
            None => self.fail(CodegenError::InvalidLiteral {
                kind: NodeKind::Char,
                text: text.to_string(),
            }),
        }
    }

    fn lower_expression(&mut self, node: &Node) -> Result<Address> {
        let operator = match node.operator {
            Some(ref operator) => operator,
            None => return self.fail(CodegenError::missing_payload(NodeKind::Expr)),
        };

        match node.children.as_slice() {
            [operand] => {
                let operand = match self.lower_value(operand) {
                    Ok(operand) => operand,
                    Err(_) => return self.propagate(NodeKind::Expr),
                };

                match operator {
                    Operator::Arithmetic(ArithmeticOp::Subtract) => {
                        let result = self.emitter.new_temporary();
                        self.emitter
                            .emit(OpCode::Negate, operand, Address::Empty, result.clone());
                        Ok(result)
                    }
                    _ => self.fail(CodegenError::unsupported(format!(
                        "unary operator '{}'",
                        operator_text(node)
                    ))),
                }
            }
            [left, right] => {
                let left = match self.lower_value(left) {
                    Ok(left) => left,
                    Err(_) => return self.propagate(NodeKind::Expr),
                };

                let right = match self.lower_value(right) {
                    Ok(right) => right,
                    Err(_) => return self.propagate(NodeKind::Expr),
                };

                match operator {
                    Operator::Arithmetic(op) => {
                        let result = self.emitter.new_temporary();
                        self.emitter
                            .emit(OpCode::Arithmetic(*op), left, right, result.clone());
                        Ok(result)
                    }
                    // Comparisons only produce jumps, see `emit_branch`.
                    Operator::Relational(relation) => self.fail(CodegenError::unsupported(format!(
                        "comparison '{}' outside of a condition",
                        relation.symbol()
                    ))),
                    Operator::Logical(_) => self.fail(CodegenError::unsupported(format!(
                        "logical operator '{}'",
                        operator_text(node)
                    ))),
                    Operator::Unary(_) | Operator::Unknown(_) => self.fail(
                        CodegenError::unsupported(format!("binary operator '{}'", operator_text(node))),
                    ),
                }
            }
            _ => self.fail(CodegenError::Structural {
                kind: NodeKind::Expr,
                defect: Defect::ChildCount {
                    expected: NodeKind::Expr.arity(),
                    got: node.children.len(),
                },
            }),
        }
    }

    fn lower_if(&mut self, node: &Node) -> Result<Address> {
        let false_label = self.emitter.new_label("L_IF_FALSE");

        debug!(self.logger, "lower if"; "false" => %false_label);

        let _ = self.emit_branch(&node.children[0], &false_label, true);
        let _ = self.lower(&node.children[1]);
        self.emit_label(false_label);

        Ok(Address::Empty)
    }

    fn lower_if_else(&mut self, node: &Node) -> Result<Address> {
        let else_label = self.emitter.new_label("L_ELSE");
        let end_label = self.emitter.new_label("L_IF_END");

        debug!(self.logger, "lower if-else"; "else" => %else_label, "end" => %end_label);

        let _ = self.emit_branch(&node.children[0], &else_label, true);
        let _ = self.lower(&node.children[1]);
        self.emit_goto(end_label.clone());
        self.emit_label(else_label);
        let _ = self.lower(&node.children[2]);
        self.emit_label(end_label);

        Ok(Address::Empty)
    }

    fn lower_while(&mut self, node: &Node) -> Result<Address> {
        let begin_label = self.emitter.new_label("L_WHILE_BEGIN");
        let end_label = self.emitter.new_label("L_WHILE_END");

        debug!(self.logger, "lower while"; "begin" => %begin_label, "end" => %end_label);

        self.emit_label(begin_label.clone());
        let _ = self.emit_branch(&node.children[0], &end_label, true);
        let _ = self.lower(&node.children[1]);
        self.emit_goto(begin_label);
        self.emit_label(end_label);

        Ok(Address::Empty)
    }

    fn lower_do_while(&mut self, node: &Node) -> Result<Address> {
        let begin_label = self.emitter.new_label("L_DOWHILE_BEGIN");

        debug!(self.logger, "lower do-while"; "begin" => %begin_label);

        self.emit_label(begin_label.clone());
        let _ = self.lower(&node.children[0]);
        let _ = self.emit_branch(&node.children[1], &begin_label, false);

        Ok(Address::Empty)
    }

    /// Children are `init`, `cond`, `incr`, `body`. The increment is emitted after the body.
    fn lower_for(&mut self, node: &Node) -> Result<Address> {
        let cond_label = self.emitter.new_label("L_FOR_COND");
        let end_label = self.emitter.new_label("L_FOR_END");

        debug!(self.logger, "lower for"; "cond" => %cond_label, "end" => %end_label);

        let _ = self.lower(&node.children[0]);
        self.emit_label(cond_label.clone());
        let _ = self.emit_branch(&node.children[1], &end_label, true);
        let _ = self.lower(&node.children[3]);
        let _ = self.lower(&node.children[2]);
        self.emit_goto(cond_label);
        self.emit_label(end_label);

        Ok(Address::Empty)
    }

    /// Arguments are evaluated left to right and pushed right to left.
    fn lower_print(&mut self, node: &Node) -> Result<Address> {
        let mut arguments = Vec::with_capacity(node.children.len());
        let mut failed = false;

        for argument in &node.children {
            match self.lower_value(argument) {
                Ok(address) => arguments.push(address),
                Err(_) => failed = true,
            }
        }

        if failed {
            return self.propagate(NodeKind::Print);
        }

        let count = arguments.len() as i32;

        for argument in arguments.into_iter().rev() {
            self.emitter
                .emit(OpCode::Param, argument, Address::Empty, Address::Empty);
        }

        self.emitter.emit(
            OpCode::Call,
            Address::string(PRINT_BUILTIN),
            Address::ConstInt(count),
            Address::Empty,
        );

        Ok(Address::Empty)
    }

    fn lower_return(&mut self, node: &Node) -> Result<Address> {
        let value = match node.child(0) {
            Some(child) => match self.lower_value(child) {
                Ok(value) => value,
                Err(_) => return self.propagate(NodeKind::Return),
            },
            None => Address::Empty,
        };

        self.emitter
            .emit(OpCode::Return, value, Address::Empty, Address::Empty);

        Ok(Address::Empty)
    }

    fn emit_label(&mut self, label: Address) {
        self.emitter
            .emit(OpCode::Label, label, Address::Empty, Address::Empty);
    }

    fn emit_goto(&mut self, label: Address) {
        self.emitter
            .emit(OpCode::Goto, label, Address::Empty, Address::Empty);
    }

    fn payload<'n>(&mut self, node: &'n Node) -> Result<&'n str> {
        match node.value {
            Some(ref value) => Ok(value),
            None => self.fail(CodegenError::missing_payload(node.kind)),
        }
    }

    /// Names are not resolved to storage, the lookup only validates them.
    fn check_declared(&mut self, name: &str) {
        if self.symbols.lookup(name).is_some() {
            return;
        }

        let warning = Warning::UndeclaredIdentifier {
            name: name.to_string(),
            suggestion: self.symbols.suggest(name).map(str::to_string),
        };

        warn!(self.logger, "{}", warning);

        self.warnings.push(warning);
    }

    fn fail<T>(&mut self, error: CodegenError) -> Result<T> {
        warn!(self.logger, "{}", error);

        self.errors.push(error.clone());

        Err(error)
    }

    fn propagate<T>(&mut self, construct: NodeKind) -> Result<T> {
        self.fail(CodegenError::Propagated { construct })
    }
}

fn operator_text(node: &Node) -> &str {
    node.value.as_deref().unwrap_or("?")
}

/// Lowers the tree rooted at `root` into a fresh program.
pub fn generate(root: &Node, symbols: &SymbolTable) -> Compilation {
    generate_with_logger(root, symbols, None)
}

pub fn generate_with_logger<L>(root: &Node, symbols: &SymbolTable, logger: L) -> Compilation
where
    L: Into<Option<Logger>>,
{
    let mut generator = Generator::with_logger(symbols, logger);

    let _ = generator.lower(root);

    generator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(program: &Program) -> Vec<String> {
        program.iter().map(|ins| ins.to_string()).collect()
    }

    fn compile(root: &Node) -> Compilation {
        let mut symbols = SymbolTable::new();
        symbols.declare(root);
        generate(root, &symbols)
    }

    fn assign_increment(name: &str) -> Node {
        Node::assign(name, Node::binary("+", Node::id(name), Node::int(1)))
    }

    #[test]
    fn arithmetic_assignment() {
        let root = Node::block(vec![
            Node::decl("x", DataType::Int),
            Node::assign("x", Node::binary("+", Node::int(1), Node::int(2))),
        ]);

        let result = compile(&root);

        assert!(result.is_complete());
        assert!(result.warnings.is_empty());
        assert_eq!(lines(&result.program), vec!["ADD    t0 = 1 + 2", "ASSIGN x = t0"]);
    }

    #[test]
    fn if_jumps_over_body_when_false() {
        let root = Node::if_then(
            Node::binary("<", Node::id("a"), Node::id("b")),
            Node::block(vec![Node::assign("x", Node::int(1))]),
        );

        let result = compile(&root);

        assert_eq!(
            lines(&result.program),
            vec![
                "IF_GEQ a >= b GOTO L_IF_FALSE0",
                "ASSIGN x = 1",
                "LABEL  L_IF_FALSE0:",
            ]
        );

        let program = &result.program;
        let label = program.label_position("L_IF_FALSE0").unwrap();
        let jumps = program
            .iter()
            .enumerate()
            .filter(|(_, ins)| ins.jump_target() == Some("L_IF_FALSE0"))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        assert_eq!(jumps, vec![0]);
        assert!(jumps[0] < label);
    }

    #[test]
    fn while_loop() {
        let root = Node::while_loop(
            Node::binary("<", Node::id("i"), Node::int(10)),
            Node::block(vec![assign_increment("i")]),
        );

        let result = compile(&root);

        assert_eq!(
            lines(&result.program),
            vec![
                "LABEL  L_WHILE_BEGIN0:",
                "IF_GEQ i >= 10 GOTO L_WHILE_END1",
                "ADD    t0 = i + 1",
                "ASSIGN i = t0",
                "GOTO   L_WHILE_BEGIN0",
                "LABEL  L_WHILE_END1:",
            ]
        );

        let gotos = result
            .program
            .iter()
            .filter(|ins| ins.opcode == OpCode::Goto)
            .count();
        assert_eq!(gotos, 1);
    }

    #[test]
    fn branch_polarity() {
        let table = [
            ("==", Relation::NotEqual, Relation::Equal),
            ("!=", Relation::Equal, Relation::NotEqual),
            ("<", Relation::GreaterEqual, Relation::Less),
            (">", Relation::LessEqual, Relation::Greater),
            ("<=", Relation::Greater, Relation::LessEqual),
            (">=", Relation::Less, Relation::GreaterEqual),
        ];

        for (symbol, if_false, if_true) in table.iter() {
            let condition = Node::binary(symbol, Node::id("a"), Node::id("b"));

            let symbols = SymbolTable::new();
            let mut generator = Generator::new(&symbols);
            let target = Address::label("T");

            generator.emit_branch(&condition, &target, true).unwrap();
            generator.emit_branch(&condition, &target, false).unwrap();

            let program = generator.program();
            assert_eq!(program.len(), 2);
            assert_eq!(program[0].opcode, OpCode::Branch(*if_false), "{} inverted", symbol);
            assert_eq!(program[1].opcode, OpCode::Branch(*if_true), "{} as is", symbol);
            assert_eq!(program[0].result, target);
        }
    }

    #[test]
    fn bare_condition_compares_against_zero() {
        let root = Node::block(vec![
            Node::if_then(Node::id("x"), Node::block(vec![])),
            Node::do_while(Node::block(vec![]), Node::id("x")),
        ]);

        let result = compile(&root);

        assert_eq!(
            lines(&result.program),
            vec![
                "IF_EQ  x == 0 GOTO L_IF_FALSE0",
                "LABEL  L_IF_FALSE0:",
                "LABEL  L_DOWHILE_BEGIN1:",
                "IF_NEQ x != 0 GOTO L_DOWHILE_BEGIN1",
            ]
        );
    }

    #[test]
    fn if_else() {
        let root = Node::if_else(
            Node::binary(">", Node::id("y"), Node::int(100)),
            Node::assign("x", Node::int(1)),
            Node::assign("x", Node::int(0)),
        );

        let result = compile(&root);

        assert_eq!(
            lines(&result.program),
            vec![
                "IF_LEQ y <= 100 GOTO L_ELSE0",
                "ASSIGN x = 1",
                "GOTO   L_IF_END1",
                "LABEL  L_ELSE0:",
                "ASSIGN x = 0",
                "LABEL  L_IF_END1:",
            ]
        );
    }

    #[test]
    fn do_while_loops_back_while_true() {
        let root = Node::do_while(
            Node::block(vec![assign_increment("n")]),
            Node::binary("<", Node::id("n"), Node::int(5)),
        );

        let result = compile(&root);

        assert_eq!(
            lines(&result.program),
            vec![
                "LABEL  L_DOWHILE_BEGIN0:",
                "ADD    t0 = n + 1",
                "ASSIGN n = t0",
                "IF_LT  n < 5 GOTO L_DOWHILE_BEGIN0",
            ]
        );
    }

    #[test]
    fn for_loop_emits_increment_after_body() {
        let root = Node::for_loop(
            Node::assign("i", Node::int(0)),
            Node::binary("<", Node::id("i"), Node::id("n")),
            assign_increment("i"),
            Node::block(vec![Node::assign(
                "s",
                Node::binary("*", Node::id("s"), Node::id("i")),
            )]),
        );

        let result = compile(&root);

        assert_eq!(
            lines(&result.program),
            vec![
                "ASSIGN i = 0",
                "LABEL  L_FOR_COND0:",
                "IF_GEQ i >= n GOTO L_FOR_END1",
                "MUL    t0 = s * i",
                "ASSIGN s = t0",
                "ADD    t1 = i + 1",
                "ASSIGN i = t1",
                "GOTO   L_FOR_COND0",
                "LABEL  L_FOR_END1:",
            ]
        );
    }

    #[test]
    fn print_pushes_arguments_in_reverse() {
        let root = Node::print(vec![
            Node::string("%d %d\\n"),
            Node::id("a"),
            Node::binary("-", Node::id("b"), Node::int(1)),
        ]);

        let result = compile(&root);

        assert_eq!(
            lines(&result.program),
            vec![
                "SUB    t0 = b - 1",
                "PARAM  t0",
                "PARAM  a",
                "PARAM  \"%d %d\\n\"",
                "CALL   \"printf\", 3",
            ]
        );
    }

    #[test]
    fn literals() {
        let symbols = SymbolTable::new();
        let mut generator = Generator::new(&symbols);

        assert_eq!(generator.lower(&Node::int(42)), Ok(Address::ConstInt(42)));
        assert_eq!(
            generator.lower(&Node::num("2.5", DataType::Float)),
            Ok(Address::ConstFloat(2.5))
        );
        assert_eq!(generator.lower(&Node::char_lit("'A'")), Ok(Address::ConstInt(65)));
        assert_eq!(
            generator.lower(&Node::string("hello")),
            Ok(Address::string("hello"))
        );

        assert!(generator.program().is_empty());
        assert!(generator.errors().is_empty());

        let error = generator.lower(&Node::num("4x", DataType::Int)).unwrap_err();
        assert_eq!(
            error,
            CodegenError::InvalidLiteral {
                kind: NodeKind::Num,
                text: "4x".to_string(),
            }
        );
        assert_eq!(generator.errors(), &[error]);
    }

    #[test]
    fn unary_minus() {
        let root = Node::assign("y", Node::unary("-", Node::id("x")));
        let result = compile(&root);

        assert_eq!(lines(&result.program), vec!["UMINUS t0 = - x", "ASSIGN y = t0"]);
    }

    #[test]
    fn unsupported_unary_operator() {
        let root = Node::assign("y", Node::unary("!", Node::id("x")));
        let result = compile(&root);

        assert!(result.program.is_empty());
        assert_eq!(
            result.errors,
            vec![
                CodegenError::unsupported("unary operator '!'"),
                CodegenError::Propagated { construct: NodeKind::Assign },
            ]
        );
    }

    #[test]
    fn comparison_as_value_is_rejected() {
        let root = Node::assign(
            "flag",
            Node::binary("<", Node::id("a"), Node::binary("+", Node::id("b"), Node::int(1))),
        );

        let result = compile(&root);

        assert_eq!(lines(&result.program), vec!["ADD    t0 = b + 1"]);
        assert_eq!(
            result.errors[0],
            CodegenError::unsupported("comparison '<' outside of a condition")
        );
    }

    #[test]
    fn failing_condition_is_best_effort() {
        let root = Node::while_loop(
            Node::binary("&&", Node::id("a"), Node::id("b")),
            Node::block(vec![Node::assign("x", Node::int(1))]),
        );

        let result = compile(&root);

        assert_eq!(
            lines(&result.program),
            vec![
                "LABEL  L_WHILE_BEGIN0:",
                "ASSIGN x = 1",
                "GOTO   L_WHILE_BEGIN0",
                "LABEL  L_WHILE_END1:",
            ]
        );
        assert_eq!(
            result.errors,
            vec![
                CodegenError::unsupported("logical operator '&&'"),
                CodegenError::Propagated { construct: NodeKind::Expr },
            ]
        );
    }

    #[test]
    fn block_continues_after_failure() {
        let broken = Node::new(NodeKind::For, None, None, vec![Node::id("i")]);

        let root = Node::block(vec![
            Node::assign("a", Node::binary("<<", Node::id("a"), Node::int(1))),
            broken,
            Node::assign("b", Node::int(2)),
        ]);

        let result = compile(&root);

        assert_eq!(lines(&result.program), vec!["ASSIGN b = 2"]);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors[0], CodegenError::unsupported("binary operator '<<'"));
        assert!(result.errors[1].is_propagated());
        assert_eq!(
            result.errors[2],
            CodegenError::Structural {
                kind: NodeKind::For,
                defect: Defect::ChildCount {
                    expected: crate::ast::Arity::Exactly(4),
                    got: 1,
                },
            }
        );
    }

    #[test]
    fn statement_as_value_is_rejected() {
        let root = Node::assign("x", Node::block(vec![]));
        let result = compile(&root);

        assert!(result.program.is_empty());
        assert_eq!(result.errors[0], CodegenError::unsupported("block used as a value"));
    }

    #[test]
    fn functions_and_returns() {
        let body = Node::block(vec![
            Node::decl("r", DataType::Int),
            Node::assign("r", Node::int(0)),
            Node::ret(Some(Node::id("r"))),
        ]);
        let root = Node::block(vec![
            Node::func_def("main", DataType::Int, body),
            Node::func_def("nothing", DataType::Void, Node::block(vec![Node::ret(None)])),
        ]);

        let result = compile(&root);

        assert!(result.is_complete());
        assert_eq!(
            lines(&result.program),
            vec!["ASSIGN r = 0", "RETURN r", "RETURN"]
        );
    }

    #[test]
    fn calls_are_not_lowered() {
        let root = Node::assign("y", Node::call("fatorial", vec![Node::id("x")]));
        let result = compile(&root);

        assert!(result.program.is_empty());
        assert_eq!(
            result.errors[0],
            CodegenError::unsupported("call to function 'fatorial'")
        );
    }

    #[test]
    fn undeclared_names_are_warned_about() {
        let root = Node::block(vec![
            Node::decl("contador", DataType::Int),
            Node::assign("contador", Node::id("contadr")),
        ]);

        let result = compile(&root);

        assert!(result.is_complete());
        assert_eq!(lines(&result.program), vec!["ASSIGN contador = contadr"]);
        assert_eq!(
            result.warnings,
            vec![Warning::UndeclaredIdentifier {
                name: "contadr".to_string(),
                suggestion: Some("contador".to_string()),
            }]
        );
    }

    fn count_nodes(node: &Node) -> usize {
        1 + node.children.iter().map(count_nodes).sum::<usize>()
    }

    #[test]
    fn code_size_is_linear_in_tree_size() {
        let wide = |count: usize| {
            let mut statements = vec![Node::decl("x", DataType::Int)];
            statements.extend((0..count).map(|_| assign_increment("x")));
            Node::block(statements)
        };

        let deep = (0..200).fold(assign_increment("x"), |body, i| {
            Node::if_then(Node::binary("<", Node::id("x"), Node::int(i)), body)
        });
        let deep = Node::block(vec![Node::decl("x", DataType::Int), deep]);

        for root in &[wide(1_000), deep] {
            let result = compile(root);

            assert!(result.is_complete());
            assert!(result.program.len() <= 3 * count_nodes(root));
        }

        assert_eq!(compile(&wide(2_000)).program.len(), 2 * compile(&wide(1_000)).program.len());
    }

    #[test]
    fn numbering_restarts_after_reset() {
        let root = Node::block(vec![
            Node::while_loop(
                Node::binary("<", Node::id("i"), Node::int(3)),
                assign_increment("i"),
            ),
            Node::if_then(Node::id("i"), assign_increment("j")),
        ]);

        let symbols = SymbolTable::new();
        let mut generator = Generator::new(&symbols);

        let _ = generator.lower(&root);
        let first = generator.program().clone();

        generator.reset();
        assert!(generator.program().is_empty());
        assert!(generator.warnings().is_empty());

        let _ = generator.lower(&root);

        assert_eq!(generator.program(), &first);
        assert_eq!(first.label_position("L_IF_FALSE2"), Some(9));
    }
}
