/*!
  A `ProgramBuffer` is the unit a compiler emits into and the machine executes: an ordered,
  growable sequence of instructions in which insertion order is execution order.
*/

use std::fmt::{Display, Formatter};
use std::iter::FromIterator;
use std::slice::Iter;

use crate::config::{PROGRAM_BUFFER_GROWTH_STEP, PROGRAM_BUFFER_INITIAL_CAPACITY};
use super::Instruction;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgramBuffer {
  instructions: Vec<Instruction>
}

impl ProgramBuffer {

  pub fn new() -> ProgramBuffer {
    ProgramBuffer {
      instructions: Vec::with_capacity(PROGRAM_BUFFER_INITIAL_CAPACITY)
    }
  }

  /// Appends an instruction, growing storage by `PROGRAM_BUFFER_GROWTH_STEP` slots when full.
  pub fn push(&mut self, instruction: Instruction) {
    if self.instructions.len() == self.instructions.capacity() {
      self.instructions.reserve_exact(PROGRAM_BUFFER_GROWTH_STEP);
    }
    self.instructions.push(instruction);
  }

  /// Iterates over the instructions in insertion order. Each call starts from the beginning.
  pub fn iter(&self) -> Iter<'_, Instruction> {
    self.instructions.iter()
  }

  pub fn get(&self, index: usize) -> Option<&Instruction> {
    self.instructions.get(index)
  }

  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.instructions.capacity()
  }

}

impl Default for ProgramBuffer {
  fn default() -> Self {
    ProgramBuffer::new()
  }
}

impl<'a> IntoIterator for &'a ProgramBuffer {
  type Item     = &'a Instruction;
  type IntoIter = Iter<'a, Instruction>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl Extend<Instruction> for ProgramBuffer {
  fn extend<T: IntoIterator<Item = Instruction>>(&mut self, iter: T) {
    for instruction in iter {
      self.push(instruction);
    }
  }
}

impl FromIterator<Instruction> for ProgramBuffer {
  fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
    let mut buffer = ProgramBuffer::new();
    buffer.extend(iter);
    buffer
  }
}

/// Prints the buffer as an assembly listing, one instruction per line, which
/// `assembly::parse_assembly` reads back.
impl Display for ProgramBuffer {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    for (ip, instruction) in self.instructions.iter().enumerate() {
      let text = instruction.to_string();
      writeln!(f, "{:<24}# {:>4}  [{:02}]", text, ip, instruction.opcode().code())?;
    }
    Ok(())
  }
}
