//! Error types. Every variant is terminal for the run that produced it.

use thiserror::Error;

use crate::bytecode::Opcode;

/// Fatal conditions raised while a `Machine` executes a program.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum MachineError {
  #[error("stack overflow at ip {ip}: all {capacity} stack slots are in use")]
  StackOverflow { ip: usize, capacity: usize },

  #[error("stack underflow at ip {ip}: pop from an empty stack")]
  StackUnderflow { ip: usize },

  #[error("division by zero at ip {ip}")]
  DivisionByZero { ip: usize },

  #[error("unimplemented opcode {opcode} at ip {ip}")]
  Unimplemented { ip: usize, opcode: Opcode },
}

impl MachineError {
  /// The instruction pointer of the instruction that failed.
  pub fn ip(&self) -> usize {
    match self {
      | MachineError::StackOverflow { ip, .. }
      | MachineError::StackUnderflow { ip }
      | MachineError::DivisionByZero { ip }
      | MachineError::Unimplemented { ip, .. } => *ip,
    }
  }
}

/// Misuse of the scope protocol of a `SymbolTable`.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum SymbolTableError {
  #[error("unbalanced scopes: cannot leave the root scope")]
  LeaveRootScope,
}

/// Problems found while assembling a listing. Line numbers count from 1.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum AssemblyError {
  #[error("error on line {line}: cannot parse `{text}`")]
  Syntax { line: usize, text: String },

  #[error("error on line {line}: {name} is not an operation")]
  UnknownOperation { line: usize, name: String },

  #[error("error on line {line}: {opcode} expects operands {expected}")]
  WrongOperands { line: usize, opcode: Opcode, expected: &'static str },

  #[error("error on line {line}: register r{index} does not exist")]
  RegisterOutOfRange { line: usize, index: usize },
}
