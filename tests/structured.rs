use quadgen::{
    ast::DataType,
    instruction::OpCode,
    source::Unit,
    Compilation,
};

use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

fn logger() -> Logger {
    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

fn compile_program() -> (Unit, Compilation) {
    let source_code = include_str!("structured.c");

    let unit = Unit::parse(source_code).expect("could not parse the source code");
    let compilation = unit.compile_with_logger(logger());

    (unit, compilation)
}

#[test]
fn test_structured_listing() {
    let (_, compilation) = compile_program();

    assert!(compilation.errors.is_empty(), "{:?}", compilation.errors);
    assert!(compilation.warnings.is_empty(), "{:?}", compilation.warnings);

    assert_eq!(compilation.program.to_string(), include_str!("structured.quads"));
}

#[test]
fn test_structured_symbols() {
    let (unit, _) = compile_program();
    let table = &unit.symbol_table;

    assert_eq!(table.len(), 6);
    assert_eq!(table.lookup("main").unwrap().data_type(), DataType::Int);
    assert_eq!(table.lookup("mean").unwrap().data_type(), DataType::Float);
    assert_eq!(table.lookup("even_temp").unwrap().data_type(), DataType::Int);
    assert!(table.lookup("odd").is_none());
}

#[test]
fn test_structured_labels() {
    let (_, compilation) = compile_program();
    let program = &compilation.program;

    for instruction in program {
        if let Some(target) = instruction.jump_target() {
            assert!(
                program.label_position(target).is_some(),
                "jump to undefined label {}",
                target
            );
        }
    }

    let labels = program
        .iter()
        .filter_map(|ins| ins.defined_label())
        .collect::<Vec<_>>();

    assert_eq!(
        labels,
        vec![
            "L_WHILE_BEGIN0",
            "L_ELSE2",
            "L_IF_END3",
            "L_WHILE_END1",
            "L_ELSE4",
            "L_IF_END5"
        ]
    );

    let calls = program
        .iter()
        .filter(|ins| ins.opcode == OpCode::Call)
        .count();

    assert_eq!(calls, 6);
}

#[test]
fn test_structured_is_deterministic() {
    let (_, first) = compile_program();
    let (_, second) = compile_program();

    assert_eq!(first.program, second.program);
}
