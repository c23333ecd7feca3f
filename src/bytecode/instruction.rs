use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::config::REGISTER_COUNT;
use super::Value;

/**
  Opcodes of the virtual machine.

  The opcode is the fieldless tag of an `Instruction`. It exists separately from `Instruction`
  so that opcodes can be named in diagnostics, parsed from and printed to assembly text, and
  numbered. The numeric code of an opcode is its position in the list below.

  `Var`, `Load`, `Store`, `Concat`, `Compare`, and `Jump` are reserved for variables, strings,
  and control flow. They can be assembled and stored, but executing one is an error.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[repr(u8)]
pub enum Opcode {
  NoOp,       // noop
  Move,       // move( register, literal )
  Exchange,   // exchange( register, register )
  Var,        // reserved
  Load,       // reserved
  Store,      // reserved
  Push,       // push( register )
  Pop,        // pop( register )
  Add,        // add( register, register )
  Subtract,   // subtract( register, register )
  Multiply,   // multiply( register, register )
  Divide,     // divide( register, register )
  Negate,     // negate( register )
  Concat,     // reserved
  And,        // and( register, register )
  Or,         // or( register, register )
  Not,        // not( register )
  Compare,    // reserved
  Jump,       // reserved
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The number of operands an instruction with this opcode carries.
  pub fn arity(&self) -> usize {
    match self {
      | Opcode::Move
      | Opcode::Exchange
      | Opcode::Add
      | Opcode::Subtract
      | Opcode::Multiply
      | Opcode::Divide
      | Opcode::And
      | Opcode::Or       => 2,

      | Opcode::Push
      | Opcode::Pop
      | Opcode::Negate
      | Opcode::Not      => 1,

      | Opcode::NoOp
      | Opcode::Var
      | Opcode::Load
      | Opcode::Store
      | Opcode::Concat
      | Opcode::Compare
      | Opcode::Jump     => 0,
    }
  }

  /// True for opcodes that have a name but no execution behavior yet.
  pub fn is_reserved(&self) -> bool {
    matches!(
      self,
      Opcode::Var | Opcode::Load | Opcode::Store | Opcode::Concat | Opcode::Compare | Opcode::Jump
    )
  }
}

/// A register operand: an index into the register file, checked on construction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Register(u8);

impl Register {
  /// Returns `None` if `index` does not name one of the `REGISTER_COUNT` registers.
  pub fn new(index: usize) -> Option<Register> {
    match index < REGISTER_COUNT {
      true  => Some(Register(index as u8)),
      false => None
    }
  }

  /// Converts the register to an index into the register file.
  pub fn idx(&self) -> usize {
    self.0 as usize
  }
}

impl Display for Register {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "r{}", self.0)
  }
}

/**
  A single machine instruction. There is one variant per opcode, and each variant carries exactly
  the operands its opcode needs, so an instruction with the wrong number or kind of operands
  cannot be built.

  In every two-operand variant the first operand is the destination register. The second is a
  source register, except for `Move`, whose second operand is an immediate literal.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  NoOp,
  /// `dest := literal`
  Move(Register, Value),
  /// Swaps `dest` and `src`.
  Exchange(Register, Register),
  Var,
  Load,
  Store,
  Push(Register),
  Pop(Register),
  Add(Register, Register),
  Subtract(Register, Register),
  Multiply(Register, Register),
  Divide(Register, Register),
  Negate(Register),
  Concat,
  And(Register, Register),
  Or(Register, Register),
  Not(Register),
  Compare,
  Jump,
}

impl Instruction {
  pub fn opcode(&self) -> Opcode {
    match self {
      Instruction::NoOp           => Opcode::NoOp,
      Instruction::Move(..)       => Opcode::Move,
      Instruction::Exchange(..)   => Opcode::Exchange,
      Instruction::Var            => Opcode::Var,
      Instruction::Load           => Opcode::Load,
      Instruction::Store          => Opcode::Store,
      Instruction::Push(_)        => Opcode::Push,
      Instruction::Pop(_)         => Opcode::Pop,
      Instruction::Add(..)        => Opcode::Add,
      Instruction::Subtract(..)   => Opcode::Subtract,
      Instruction::Multiply(..)   => Opcode::Multiply,
      Instruction::Divide(..)     => Opcode::Divide,
      Instruction::Negate(_)      => Opcode::Negate,
      Instruction::Concat         => Opcode::Concat,
      Instruction::And(..)        => Opcode::And,
      Instruction::Or(..)         => Opcode::Or,
      Instruction::Not(_)         => Opcode::Not,
      Instruction::Compare        => Opcode::Compare,
      Instruction::Jump           => Opcode::Jump,
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let opcode = self.opcode();
    match self {

      Instruction::Move(dest, literal) => {
        write!(f, "{}({}, {})", opcode, dest, literal)
      }

      | Instruction::Exchange(dest, src)
      | Instruction::Add(dest, src)
      | Instruction::Subtract(dest, src)
      | Instruction::Multiply(dest, src)
      | Instruction::Divide(dest, src)
      | Instruction::And(dest, src)
      | Instruction::Or(dest, src) => {
        write!(f, "{}({}, {})", opcode, dest, src)
      }

      | Instruction::Push(dest)
      | Instruction::Pop(dest)
      | Instruction::Negate(dest)
      | Instruction::Not(dest) => {
        write!(f, "{}({})", opcode, dest)
      }

      _ => {
        write!(f, "{}", opcode)
      }

    }
  }
}
