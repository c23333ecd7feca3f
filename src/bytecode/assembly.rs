/*!
  The human readable textual form of a program is called assembly. This module reads an assembly
  listing into a `ProgramBuffer`. The listing is the same text that `ProgramBuffer`'s `Display`
  produces, so a printed buffer can be read back.

  Each non-blank line holds one instruction: an opcode name as printed by `Opcode`'s `Display`,
  optionally followed by a parenthesized operand list. Registers are written `r<index>` and
  literals as decimal integers. A `#` starts a comment that runs to the end of the line.
*/

use std::str::FromStr;

use nom::{
  branch::alt,
  character::complete::{
    alpha1,
    char as one_char,
    digit1,
    space0
  },
  combinator::{all_consuming, map, map_res, opt, recognize},
  error::ErrorKind,
  multi::separated_list,
  sequence::{delimited, pair, preceded, tuple},
  IResult
};

use crate::error::AssemblyError;
use super::{Instruction, Opcode, ProgramBuffer, Register, Value};

type ParseResult<'a, O> = IResult<&'a str, O, (&'a str, ErrorKind)>;

/// An operand as written, before it is checked against its opcode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Operand {
  Register(usize),
  Literal(Value)
}

// region Parsers

fn register_p(input: &str) -> ParseResult<usize> {
  map_res(preceded(one_char('r'), digit1), usize::from_str)(input)
}

fn literal_p(input: &str) -> ParseResult<Value> {
  map_res(recognize(pair(opt(one_char('-')), digit1)), Value::from_str)(input)
}

fn operand_p(input: &str) -> ParseResult<Operand> {
  alt((
    map(register_p, Operand::Register),
    map(literal_p, Operand::Literal)
  ))(input)
}

fn operand_list_p(input: &str) -> ParseResult<Vec<Operand>> {
  delimited(
    pair(space0, one_char('(')),
    separated_list(
      tuple((space0, one_char(','), space0)),
      preceded(space0, operand_p)
    ),
    pair(space0, one_char(')'))
  )(input)
}

/// A whole line of code, with any comment already removed.
fn line_p(input: &str) -> ParseResult<(&str, Option<Vec<Operand>>)> {
  all_consuming(
    delimited(
      space0,
      pair(alpha1, opt(operand_list_p)),
      space0
    )
  )(input)
}

// endregion

/// Describes the operands `opcode` takes, for diagnostics.
fn expected_operands(opcode: Opcode) -> &'static str {
  match opcode {
    Opcode::Move => "(register, literal)",
    _            => match opcode.arity() {
      0 => "()",
      1 => "(register)",
      _ => "(register, register)"
    }
  }
}

/**
  Checks the written operands against the opcode and builds the instruction. The operand kinds
  must match exactly: `Move` takes a register then a literal, and every other two-operand
  opcode takes two registers.
*/
fn build_instruction(line: usize, opcode: Opcode, operands: &[Operand])
  -> Result<Instruction, AssemblyError>
{
  let reg = |index: usize| {
    Register::new(index).ok_or(AssemblyError::RegisterOutOfRange { line, index })
  };
  let wrong_operands = || {
    AssemblyError::WrongOperands { line, opcode, expected: expected_operands(opcode) }
  };

  let instruction = match operands {

    [] => match opcode {
      Opcode::NoOp    => Instruction::NoOp,
      Opcode::Var     => Instruction::Var,
      Opcode::Load    => Instruction::Load,
      Opcode::Store   => Instruction::Store,
      Opcode::Concat  => Instruction::Concat,
      Opcode::Compare => Instruction::Compare,
      Opcode::Jump    => Instruction::Jump,
      _               => return Err(wrong_operands())
    },

    [Operand::Register(dest)] => {
      let dest = reg(*dest)?;
      match opcode {
        Opcode::Push   => Instruction::Push(dest),
        Opcode::Pop    => Instruction::Pop(dest),
        Opcode::Negate => Instruction::Negate(dest),
        Opcode::Not    => Instruction::Not(dest),
        _              => return Err(wrong_operands())
      }
    }

    [Operand::Register(dest), Operand::Literal(literal)] => match opcode {
      Opcode::Move => Instruction::Move(reg(*dest)?, *literal),
      _            => return Err(wrong_operands())
    },

    [Operand::Register(dest), Operand::Register(src)] => {
      let (dest, src) = (reg(*dest)?, reg(*src)?);
      match opcode {
        Opcode::Exchange => Instruction::Exchange(dest, src),
        Opcode::Add      => Instruction::Add(dest, src),
        Opcode::Subtract => Instruction::Subtract(dest, src),
        Opcode::Multiply => Instruction::Multiply(dest, src),
        Opcode::Divide   => Instruction::Divide(dest, src),
        Opcode::And      => Instruction::And(dest, src),
        Opcode::Or       => Instruction::Or(dest, src),
        _                => return Err(wrong_operands())
      }
    }

    _ => return Err(wrong_operands())

  }; // end match on operand shape

  Ok(instruction)
}

/// Assembles a listing into a program buffer, stopping at the first bad line.
pub fn parse_assembly(text: &str) -> Result<ProgramBuffer, AssemblyError> {
  let mut buffer = ProgramBuffer::new();

  for (idx, raw_line) in text.lines().enumerate() {
    let line = idx + 1;
    let code = match raw_line.find('#') {
      Some(start) => &raw_line[..start],
      None        => raw_line
    };
    if code.trim().is_empty() {
      continue;
    }

    let (name, operands) = match line_p(code) {
      Ok((_rest, parsed)) => parsed,
      Err(_e)             => {
        return Err(AssemblyError::Syntax { line, text: code.trim().to_string() });
      }
    };

    let opcode = Opcode::from_str(name).map_err(|_| {
      AssemblyError::UnknownOperation { line, name: name.to_string() }
    })?;

    buffer.push(build_instruction(line, opcode, &operands.unwrap_or_default())?);
  }

  Ok(buffer)
}
