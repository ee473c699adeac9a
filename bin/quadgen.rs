use std::process::exit;

use clap::{App, Arg, ArgMatches};
use slog::{o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use quadgen::source::{ParseError, Unit};

enum Error {
    IO(std::io::Error),
    Parse(String),
    Codegen(usize),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("quadgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates three-address code from C-like source files")
        .arg(
            Arg::with_name("source")
                .help("File containing the source code")
                .value_name("SOURCE")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("symbols")
                .help("Prints the symbol table after the generated code")
                .long("symbols")
                .short("s"),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Enables verbose logging")
                .long("verbose")
                .short("v"),
        )
        .get_matches()
}

fn main() {
    let args = parse_arguments();

    let logger = if args.is_present("verbose") {
        let decorator = TermDecorator::new().build();
        let drain = FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain, o!())
    } else {
        Logger::root(Discard, o!())
    };

    // clap guarantees the presence of required arguments.
    let file_path = args.value_of("source").unwrap_or_default();

    let status = match run(file_path, args.is_present("symbols"), logger) {
        Ok(()) => 0,
        Err(Error::IO(io)) => {
            eprintln!("{}: IO error: {}", file_path, io);
            1
        }
        Err(Error::Parse(message)) => {
            eprintln!("{}:{}", file_path, message);
            1
        }
        Err(Error::Codegen(count)) => {
            eprintln!("{}: code generation failed with {} error(s)", file_path, count);
            2
        }
    };

    exit(status);
}

fn describe(error: &ParseError, source: &str) -> String {
    format!("{}: error: {}", error.location(source), error)
}

fn run(file_path: &str, print_symbols: bool, logger: Logger) -> Result<(), Error> {
    let source = std::fs::read_to_string(file_path)?;

    let unit = Unit::parse(&source).map_err(|err| Error::Parse(describe(&err, &source)))?;

    let compilation = unit.compile_with_logger(logger);

    print!("{}", compilation.program);

    if print_symbols {
        println!();
        print!("{}", unit.symbol_table);
    }

    for warning in &compilation.warnings {
        eprintln!("{}: warning: {}", file_path, warning);
    }

    for error in &compilation.errors {
        eprintln!("{}: error: {}", file_path, error);
    }

    if !compilation.errors.is_empty() {
        return Err(Error::Codegen(compilation.errors.len()));
    }

    Ok(())
}
