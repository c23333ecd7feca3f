use std::{env, fs, io, process};
use std::io::Read;

use tracing_subscriber::EnvFilter;

use kiwi::bytecode::{parse_assembly, ProgramBuffer};
use kiwi::machine::Machine;
use kiwi::symboltable::{EntryKind, SymbolTable};

type DriverResult = Result<(), Box<dyn std::error::Error>>;

const SAMPLE_LISTING: &str = "
    NoOp
    Move(r0, 10)
    Move(r1, 1)
    Subtract(r0, r1)      # r0 := 9
    Push(r0)
    Move(r2, 3)
    Multiply(r0, r2)      # r0 := 27
    Pop(r3)               # r3 := 9
    Exchange(r0, r3)
    Not(r1)               # r1 := 0
";

/**
  Usage: `kiwi [LISTING]`. With no argument the driver runs a built-in sample program and the
  symbol table demo. Otherwise `LISTING` names a file of assembly text, or `-` for standard input,
  which is assembled and run. Any error is printed to stderr and the exit status is 1.
*/
fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    )
    .with_writer(io::stderr)
    .init();

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED (set RUST_LOG=kiwi=trace to see it)");

  let result = match env::args().nth(1) {
    None       => demo(),
    Some(path) => read_listing(&path).and_then(|text| run_listing(&text)),
  };

  if let Err(e) = result {
    eprintln!("kiwi: {}", e);
    process::exit(1);
  }
}

fn read_listing(path: &str) -> Result<String, Box<dyn std::error::Error>> {
  if path == "-" {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text)
  } else {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e).into())
  }
}

fn run_listing(text: &str) -> DriverResult {
  let program = parse_assembly(text)?;
  println!("# Program\n{}", program);

  let mut machine = Machine::new();
  execute(&mut machine, &program)?;
  println!("# Machine State\n{}", machine);
  Ok(())
}

/// Runs `program`, naming the failing instruction in any fault.
fn execute(machine: &mut Machine, program: &ProgramBuffer) -> DriverResult {
  machine.exec(program).map_err(|e| {
    match program.get(e.ip()) {
      Some(instruction) => format!("{} (executing `{}`)", e, instruction).into(),
      None              => e.into(),
    }
  })
}

fn demo() -> DriverResult {
  run_listing(SAMPLE_LISTING)?;

  let a = 40;
  let b = 41;
  let mut table = SymbolTable::new();
  table.insert("a", EntryKind::Number, &a);
  table.enter_scope();
  table.insert("b", EntryKind::Number, &b);
  table.enter_scope();

  println!("# Symbol Table");
  report(&table);
  table.leave_scope()?;
  report(&table);
  table.leave_scope()?;
  report(&table);

  Ok(())
}

fn report(table: &SymbolTable<&i32>) {
  for name in ["a", "b"].iter() {
    match table.lookup(name) {
      Some(binding) => println!("depth {}: {}={}", table.depth(), name, binding.value()),
      None          => println!("depth {}: {} not found", table.depth(), name),
    }
  }
}
