//! ALU implementation

/// Performs an atomic ALU operation with 32-bit wraparound
pub fn alu(op: AluOp, op1: u32, op2: u32) -> u32 {
    match op {
        AluOp::ADD => op1.wrapping_add(op2),
        AluOp::SUB => op1.wrapping_sub(op2),
        AluOp::XOR => op1 ^ op2,
        AluOp::OR => op1 | op2,
        AluOp::AND => op1 & op2,
        // Defined fallback for unmatched function fields
        AluOp::NOP => 0,
    }
}

/// Selects the R-type ALU operation from the (funct7, funct3) pair
pub fn select_r(funct7: u32, funct3: u32) -> AluOp {
    match (funct7, funct3) {
        (0b0000000, 0b000) => AluOp::ADD,
        (0b0100000, 0b000) => AluOp::SUB,
        (0b0000000, 0b100) => AluOp::XOR,
        (0b0000000, 0b110) => AluOp::OR,
        (0b0000000, 0b111) => AluOp::AND,
        _ => AluOp::NOP,
    }
}

/// Selects the I-type ALU operation from funct3
pub fn select_i(funct3: u32) -> AluOp {
    match funct3 {
        0b000 => AluOp::ADD,
        0b100 => AluOp::XOR,
        0b110 => AluOp::OR,
        0b111 => AluOp::AND,
        _ => AluOp::NOP,
    }
}

/// Set of ALU operations needed for the rv32i subset
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum AluOp {
    #[default]
    ADD,
    SUB,
    XOR,
    OR,
    AND,
    /// Unmatched (funct7, funct3) pairs; always yields 0
    NOP,
}
