use std::env;
use std::path::PathBuf;
use std::process;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use heapdb::catalog::Catalog;
use heapdb::executor;
use heapdb::sql::parser;

fn main() {
    let mut args = env::args().skip(1);
    let dir = match (args.next(), args.next()) {
        (Some(dir), None) => PathBuf::from(dir),
        _ => {
            eprintln!("usage: heapdb <dbenvpath>");
            process::exit(2);
        }
    };

    if let Err(e) = run(dir) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&dir)?;
    let mut catalog = Catalog::new(&dir)?;
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("heapdb> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
                    break;
                }
                let _ = rl.add_history_entry(line);
                run_line(&mut catalog, line);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Parse and execute every statement on the line. Errors end the statement,
/// not the session.
fn run_line(catalog: &mut Catalog, line: &str) {
    let statements = match parser::parse(line) {
        Ok(statements) => statements,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };
    for statement in &statements {
        match executor::execute(catalog, statement) {
            Ok(result) => println!("{}", result),
            Err(e) => println!("{}", e),
        }
    }
}
