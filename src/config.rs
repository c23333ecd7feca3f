//! Compile-time sizes of the machine and its program buffers.

// ============================================================================
// Machine
// ============================================================================
/// Number of registers in the register file. `Register` operands are checked against this.
pub const REGISTER_COUNT: usize = 16;
/// Number of values the machine stack can hold.
pub const STACK_CAPACITY: usize = 256;

// ============================================================================
// Program Buffer
// ============================================================================
pub const PROGRAM_BUFFER_INITIAL_CAPACITY: usize = 5;
/// Capacity added each time a full buffer receives another instruction.
pub const PROGRAM_BUFFER_GROWTH_STEP: usize = 5;
