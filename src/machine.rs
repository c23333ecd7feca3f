//! The register-plus-stack virtual machine that executes a `ProgramBuffer`.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};
use tracing::debug;
#[cfg(feature = "trace_computation")]
use tracing::trace;

use crate::bytecode::{Instruction, ProgramBuffer, Register, Value};
use crate::config::{REGISTER_COUNT, STACK_CAPACITY};
use crate::error::MachineError;

pub struct Machine {

  // Memory Stores
  registers : [Value; REGISTER_COUNT],
  stack     : [Value; STACK_CAPACITY],

  // Cursors //
  depth : usize, // Number of values on the stack; the stack pointer is `depth - 1`.
  ip    : usize, // Instruction pointer, an index into the executing program.

}

impl Machine {

  // region Display methods

  fn make_register_table(
      name      : char,
      values    : &[Value],
      highlight : Option<usize>
    ) -> Table
  {

    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, value) in values.iter().enumerate() {
      match Some(i) == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{}] =", name, i), format!("{}", value)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{}] =", name, i), format!("{}", value)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

  // region Low-level utility methods

  /// A machine with every register zeroed, an empty stack, and `ip` at the start.
  pub fn new() -> Machine {
    Machine {
      registers : [0; REGISTER_COUNT],
      stack     : [0; STACK_CAPACITY],
      depth     : 0,
      ip        : 0,
    }
  }

  /// Returns the machine to the state `Machine::new` produces.
  pub fn reset(&mut self) {
    *self = Machine::new();
  }

  pub fn register(&self, register: Register) -> Value {
    self.registers[register.idx()]
  }

  pub fn registers(&self) -> &[Value] {
    &self.registers
  }

  /// The live portion of the stack, bottom first.
  pub fn stack(&self) -> &[Value] {
    &self.stack[..self.depth]
  }

  /// Index of the top of the stack, or -1 when the stack is empty.
  pub fn stack_pointer(&self) -> isize {
    self.depth as isize - 1
  }

  pub fn instruction_pointer(&self) -> usize {
    self.ip
  }

  fn set(&mut self, register: Register, value: Value) {
    self.registers[register.idx()] = value;
  }

  /// Records a fatal condition and hands it back for the caller to return. Reporting it is
  /// left to whoever receives the error.
  fn fault(&self, error: MachineError) -> MachineError {
    debug!(%error, depth = self.depth, "machine fault");
    error
  }

  // endregion

  // region Execution

  /**
    Executes `program` from its first instruction to its last. The instruction pointer always
    advances by exactly one, so execution ends when it reaches `program.len()`.

    Registers and stack are not cleared beforehand; values left by a previous run are visible.
    The first fatal condition stops execution and is returned. The machine is left as it was
    just before the failing instruction, with `ip` pointing at it.
  */
  pub fn exec(&mut self, program: &ProgramBuffer) -> Result<(), MachineError> {
    debug!(instructions = program.len(), "exec start");

    self.ip = 0;
    while let Some(instruction) = program.get(self.ip) {
      self.step(instruction)?;

      #[cfg(feature = "trace_computation")]
      trace!("{:>4}  {}\n{}", self.ip, instruction, self);

      self.ip += 1;
    }

    debug!(ip = self.ip, depth = self.depth, "exec finished");
    Ok(())
  }

  /// Executes a single instruction at the current `ip`, without moving `ip`.
  fn step(&mut self, instruction: &Instruction) -> Result<(), MachineError> {
    let ip = self.ip;

    match *instruction {

      Instruction::NoOp => {}

      Instruction::Move(dest, literal) => {
        // The second operand is an immediate, not a register.
        self.set(dest, literal);
      }

      Instruction::Exchange(dest, src) => {
        self.registers.swap(dest.idx(), src.idx());
      }

      Instruction::Push(dest) => {
        if self.depth == STACK_CAPACITY {
          return Err(self.fault(MachineError::StackOverflow { ip, capacity: STACK_CAPACITY }));
        }
        self.stack[self.depth] = self.register(dest);
        self.depth += 1;
      }

      Instruction::Pop(dest) => {
        if self.depth == 0 {
          return Err(self.fault(MachineError::StackUnderflow { ip }));
        }
        self.depth -= 1;
        self.set(dest, self.stack[self.depth]);
      }

      Instruction::Add(dest, src) => {
        self.set(dest, self.register(dest).wrapping_add(self.register(src)));
      }

      Instruction::Subtract(dest, src) => {
        self.set(dest, self.register(dest).wrapping_sub(self.register(src)));
      }

      Instruction::Multiply(dest, src) => {
        self.set(dest, self.register(dest).wrapping_mul(self.register(src)));
      }

      Instruction::Divide(dest, src) => {
        let divisor = self.register(src);
        if divisor == 0 {
          return Err(self.fault(MachineError::DivisionByZero { ip }));
        }
        // Truncates toward zero. `Value::MIN / -1` wraps to `Value::MIN`.
        self.set(dest, self.register(dest).wrapping_div(divisor));
      }

      Instruction::Negate(dest) => {
        self.set(dest, self.register(dest).wrapping_neg());
      }

      Instruction::And(dest, src) => {
        let result = self.register(dest) != 0 && self.register(src) != 0;
        self.set(dest, result as Value);
      }

      Instruction::Or(dest, src) => {
        let result = self.register(dest) != 0 || self.register(src) != 0;
        self.set(dest, result as Value);
      }

      Instruction::Not(dest) => {
        let result = self.register(dest) == 0;
        self.set(dest, result as Value);
      }

      | Instruction::Var
      | Instruction::Load
      | Instruction::Store
      | Instruction::Concat
      | Instruction::Compare
      | Instruction::Jump => {
        return Err(self.fault(MachineError::Unimplemented { ip, opcode: instruction.opcode() }));
      }

    } // end match on instruction

    Ok(())
  }

  // endregion

}

impl Default for Machine {
  fn default() -> Self {
    Machine::new()
  }
}


lazy_static! {
  // Fully boxed: the register and stack tables are nested inside the combined table.
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders('│')
      .separator(
        TableFormat::LinePosition::Top,
        TableFormat::LineSeparator::new('─', '┬', '┌', '┐')
      )
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', '├', '┤')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', '└', '┘')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let top = match self.depth {
      0     => None,
      depth => Some(depth - 1)
    };
    let r_table = Machine::make_register_table('R', self.registers(), None);
    let s_table = Machine::make_register_table('S', self.stack(), top);

    let mut combined_table = table!([r_table, s_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Stack"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "ip: {}\tsp: {}\n{}", self.ip, self.stack_pointer(), combined_table)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::{parse_assembly, Opcode};

  fn r(index: usize) -> Register {
    Register::new(index).unwrap()
  }

  fn run(instructions: Vec<Instruction>) -> (Machine, Result<(), MachineError>) {
    let program: ProgramBuffer = instructions.into_iter().collect();
    let mut machine = Machine::new();
    let result = machine.exec(&program);
    (machine, result)
  }

  #[test]
  fn fresh_machine(){
    let machine = Machine::new();
    assert!(machine.registers().iter().all(|v| *v == 0));
    assert_eq!(machine.registers().len(), REGISTER_COUNT);
    assert!(machine.stack().is_empty());
    assert_eq!(machine.stack_pointer(), -1);
    assert_eq!(machine.instruction_pointer(), 0);
  }

  #[test]
  fn empty_program(){
    let (machine, result) = run(vec![]);
    assert_eq!(result, Ok(()));
    assert_eq!(machine.instruction_pointer(), 0);
  }

  #[test]
  fn move_then_add(){
    let samples = [(0, 0), (3, 4), (-17, 5), (i32::MAX, 1), (i32::MIN, -1), (123_456, -654_321)];
    for (x, y) in samples.iter().copied() {
      let (machine, result) = run(vec![
        Instruction::Move(r(0), x),
        Instruction::Move(r(1), y),
        Instruction::Add(r(0), r(1)),
      ]);
      assert_eq!(result, Ok(()));
      assert_eq!(machine.register(r(0)), x.wrapping_add(y));
      assert_eq!(machine.register(r(1)), y);
      assert_eq!(machine.instruction_pointer(), 3);
    }
  }

  #[test]
  fn move_literal_is_not_a_register(){
    // `Move(r0, 1)` stores 1 even though r1 holds something else.
    let (machine, _) = run(vec![
      Instruction::Move(r(1), 99),
      Instruction::Move(r(0), 1),
    ]);
    assert_eq!(machine.register(r(0)), 1);
  }

  #[test]
  fn sample_program(){
    let program = parse_assembly("NoOp\nMove(r0, 10)\nMove(r1, 1)\nSubtract(r0, r1)").unwrap();
    let mut machine = Machine::new();
    assert_eq!(machine.exec(&program), Ok(()));
    assert_eq!(machine.register(r(0)), 9);
    assert_eq!(machine.register(r(1)), 1);
  }

  #[test]
  fn exchange_touches_only_its_operands(){
    let mut instructions: Vec<Instruction> =
      (0..REGISTER_COUNT).map(|i| Instruction::Move(r(i), (i as i32 + 1) * 10)).collect();
    instructions.push(Instruction::Exchange(r(2), r(7)));
    let (machine, _) = run(instructions);

    for i in 0..REGISTER_COUNT {
      let expected = match i {
        2 => 80,
        7 => 30,
        _ => (i as i32 + 1) * 10
      };
      assert_eq!(machine.register(r(i)), expected);
    }
  }

  #[test]
  fn exchange_with_itself(){
    let (machine, _) = run(vec![Instruction::Move(r(3), 5), Instruction::Exchange(r(3), r(3))]);
    assert_eq!(machine.register(r(3)), 5);
  }

  #[test]
  fn push_pop_round_trip(){
    let (machine, result) = run(vec![
      Instruction::Move(r(0), 1),
      Instruction::Move(r(1), 2),
      Instruction::Push(r(0)),
      Instruction::Push(r(1)),
      Instruction::Move(r(0), 3),
      Instruction::Push(r(0)),
      Instruction::Pop(r(2)),   // 3
      Instruction::Pop(r(3)),   // 2
      Instruction::Push(r(2)),
      Instruction::Pop(r(4)),   // 3
      Instruction::Pop(r(5)),   // 1
    ]);
    assert_eq!(result, Ok(()));
    assert_eq!(machine.register(r(2)), 3);
    assert_eq!(machine.register(r(3)), 2);
    assert_eq!(machine.register(r(4)), 3);
    assert_eq!(machine.register(r(5)), 1);
    assert_eq!(machine.stack_pointer(), -1);
  }

  #[test]
  fn stack_survives_between_runs(){
    let mut machine = Machine::new();
    let first: ProgramBuffer =
      vec![Instruction::Move(r(0), 42), Instruction::Push(r(0))].into_iter().collect();
    let second: ProgramBuffer = vec![Instruction::Pop(r(1))].into_iter().collect();

    assert_eq!(machine.exec(&first), Ok(()));
    assert_eq!(machine.stack(), &[42]);
    assert_eq!(machine.exec(&second), Ok(()));
    assert_eq!(machine.register(r(1)), 42);

    machine.reset();
    assert_eq!(machine.register(r(1)), 0);
    assert_eq!(machine.stack_pointer(), -1);
  }

  #[test]
  fn stack_overflow(){
    let mut instructions = vec![Instruction::Push(r(0)); STACK_CAPACITY];
    let (machine, result) = run(instructions.clone());
    assert_eq!(result, Ok(()));
    assert_eq!(machine.stack_pointer(), STACK_CAPACITY as isize - 1);

    instructions.push(Instruction::Push(r(0)));
    let (machine, result) = run(instructions);
    assert_eq!(
      result,
      Err(MachineError::StackOverflow { ip: STACK_CAPACITY, capacity: STACK_CAPACITY })
    );
    assert_eq!(machine.stack_pointer(), STACK_CAPACITY as isize - 1);
    assert_eq!(machine.instruction_pointer(), STACK_CAPACITY);
  }

  #[test]
  fn stack_underflow(){
    let (machine, result) = run(vec![
      Instruction::Push(r(0)),
      Instruction::Pop(r(0)),
      Instruction::Pop(r(0)),
      Instruction::Move(r(1), 7),
    ]);
    assert_eq!(result, Err(MachineError::StackUnderflow { ip: 2 }));
    assert_eq!(machine.stack_pointer(), -1);
    // Nothing after the fault runs.
    assert_eq!(machine.register(r(1)), 0);
  }

  #[test]
  fn arithmetic(){
    let (machine, result) = run(vec![
      Instruction::Move(r(0), 7),
      Instruction::Move(r(1), -3),
      Instruction::Move(r(2), 7),
      Instruction::Move(r(3), 7),
      Instruction::Move(r(4), 7),
      Instruction::Subtract(r(0), r(1)),  // 10
      Instruction::Multiply(r(2), r(1)),  // -21
      Instruction::Divide(r(3), r(1)),    // -2
      Instruction::Negate(r(4)),          // -7
    ]);
    assert_eq!(result, Ok(()));
    assert_eq!(machine.register(r(0)), 10);
    assert_eq!(machine.register(r(2)), -21);
    assert_eq!(machine.register(r(3)), -2);
    assert_eq!(machine.register(r(4)), -7);
  }

  #[test]
  fn arithmetic_wraps(){
    let (machine, result) = run(vec![
      Instruction::Move(r(0), i32::MIN),
      Instruction::Move(r(1), -1),
      Instruction::Divide(r(0), r(1)),
      Instruction::Move(r(2), i32::MIN),
      Instruction::Negate(r(2)),
      Instruction::Move(r(3), i32::MAX),
      Instruction::Multiply(r(3), r(3)),
    ]);
    assert_eq!(result, Ok(()));
    assert_eq!(machine.register(r(0)), i32::MIN);
    assert_eq!(machine.register(r(2)), i32::MIN);
    assert_eq!(machine.register(r(3)), 1);
  }

  #[test]
  fn double_negation(){
    for x in [0, 1, -1, 2_000_000_000, i32::MIN, i32::MAX].iter().copied() {
      let (machine, _) = run(vec![
        Instruction::Move(r(0), x),
        Instruction::Negate(r(0)),
        Instruction::Negate(r(0)),
      ]);
      assert_eq!(machine.register(r(0)), x);
    }
  }

  #[test]
  fn division_by_zero(){
    let (machine, result) = run(vec![
      Instruction::Move(r(0), 10),
      Instruction::Divide(r(0), r(1)),
    ]);
    assert_eq!(result, Err(MachineError::DivisionByZero { ip: 1 }));
    assert_eq!(machine.register(r(0)), 10);
  }

  #[test]
  fn logic_is_zero_or_one(){
    let values = [0, 1, -1, 2, 42, i32::MIN];
    for a in values.iter().copied() {
      for b in values.iter().copied() {
        let (machine, _) = run(vec![
          Instruction::Move(r(0), a),
          Instruction::Move(r(1), b),
          Instruction::Move(r(2), a),
          Instruction::Move(r(3), a),
          Instruction::And(r(0), r(1)),
          Instruction::Or(r(2), r(1)),
          Instruction::Not(r(3)),
        ]);
        assert_eq!(machine.register(r(0)), ((a != 0) && (b != 0)) as i32);
        assert_eq!(machine.register(r(2)), ((a != 0) || (b != 0)) as i32);
        assert_eq!(machine.register(r(3)), (a == 0) as i32);
      }
    }
  }

  #[test]
  fn reserved_opcodes_are_fatal(){
    let reserved = [
      Instruction::Var,
      Instruction::Load,
      Instruction::Store,
      Instruction::Concat,
      Instruction::Compare,
      Instruction::Jump,
    ];
    for instruction in reserved.iter().copied() {
      let (machine, result) = run(vec![Instruction::NoOp, instruction, Instruction::Move(r(0), 1)]);
      let opcode = instruction.opcode();
      assert!(opcode.is_reserved());
      assert_eq!(result, Err(MachineError::Unimplemented { ip: 1, opcode }));
      assert_eq!(machine.register(r(0)), 0);
    }
    assert_eq!(
      MachineError::Unimplemented { ip: 4, opcode: Opcode::Jump }.to_string(),
      "unimplemented opcode Jump at ip 4"
    );
  }

  #[test]
  fn display_table(){
    let (machine, _) = run(vec![Instruction::Move(r(0), 31), Instruction::Push(r(0))]);
    let text = format!("{}", machine);
    assert!(text.starts_with("ip: 2\tsp: 0\n"));
    assert!(text.contains("* --> S[0] ="));
    assert!(text.contains("R[15] ="));
    assert!(text.contains('┌'));
    assert!(text.contains('┘'));
  }
}
