/*!
  The instruction set of the virtual machine.

  An instruction is an opcode together with exactly the operands that opcode takes. Register
  operands are indices into the machine's register file and are range checked when the
  `Register` is built. The single immediate operand in the instruction set, the literal of
  `Move`, is a plain `Value`. Keeping the two operand kinds as distinct types stops an immediate
  from being read as a register index or the other way around.

  Instructions are collected into a `ProgramBuffer`, which the machine executes front to back.
  For debugging and for writing tests, a buffer can also be written as an assembly listing,
  one instruction per line:

  ```text
  NoOp
  Move(r0, 10)       # r0 := 10
  Move(r1, 1)
  Subtract(r0, r1)   # r0 := r0 - r1
  ```
*/

mod assembly;
mod instruction;
mod program;

pub use assembly::parse_assembly;
pub use instruction::{Instruction, Opcode, Register};
pub use program::ProgramBuffer;

/// The machine integer held by registers and stack slots.
pub type Value = i32;
