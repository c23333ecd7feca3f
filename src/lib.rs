/*!
  The execution core of the Kiwi scripting language: a register-plus-stack virtual machine that
  runs a fixed, low-level instruction set, and the lexically scoped symbol table the front end
  uses for name resolution.

  ```
  use kiwi::bytecode::{Instruction, ProgramBuffer, Register};
  use kiwi::machine::Machine;

  let r0 = Register::new(0).unwrap();
  let r1 = Register::new(1).unwrap();

  let mut program = ProgramBuffer::new();
  program.push(Instruction::Move(r0, 10));
  program.push(Instruction::Move(r1, 1));
  program.push(Instruction::Subtract(r0, r1));

  let mut machine = Machine::new();
  machine.exec(&program).unwrap();
  assert_eq!(machine.register(r0), 9);
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod config;
pub mod error;
pub mod machine;
pub mod symboltable;

pub use bytecode::{Instruction, Opcode, ProgramBuffer, Register, Value};
pub use error::{AssemblyError, MachineError, SymbolTableError};
pub use machine::Machine;
pub use symboltable::{Binding, EntryKind, SymbolTable};
