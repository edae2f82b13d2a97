//! Instruction representation

use crate::alu::AluOp;

pub mod decode_helper;

#[cfg(test)]
pub mod test_util;

/// Operation kind for the supported rv32i subset
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum OpKind {
    Add,
    Sub,
    Xor,
    Or,
    And,
    Addi,
    Xori,
    Ori,
    Andi,
    Lw,
    Sw,
    Beq,
    Bne,
    Jal,
    /// End-of-program sentinel: any unrecognized opcode
    #[default]
    Halt,
}

/// Decoded instruction descriptor
#[derive(Clone, Copy, Debug, Default)]
pub struct Instruction {
    /// Raw representation
    pub raw: u32,
    /// Operation kind
    pub op: OpKind,
    /// Source register 1
    pub rs1: u32,
    /// Source register 2
    pub rs2: u32,
    /// Destination register
    pub rd: u32,
    /// Sign-extended immediate
    pub imm: i32,
    /// Control signals
    pub controls: Controls,
}

impl Instruction {
    pub fn decode(raw: u32) -> Self {
        decode_helper::decode(raw)
    }

    /// Whether this instruction reads rs1
    pub fn uses_rs1(&self) -> bool {
        !matches!(self.op, OpKind::Jal | OpKind::Halt)
    }

    /// Whether this instruction reads rs2
    pub fn uses_rs2(&self) -> bool {
        use OpKind::*;
        matches!(self.op, Add | Sub | Xor | Or | And | Sw | Beq | Bne)
    }
}

/// Control signals derived during decode
#[derive(Clone, Copy, Debug, Default)]
pub struct Controls {
    /// Second ALU operand comes from the immediate
    pub is_i_type: bool,
    /// Reads data memory (load)
    pub rd_mem: bool,
    /// Writes data memory (store)
    pub wrt_mem: bool,
    /// Writes the register file
    pub wrt_rf: bool,
    /// Branch or jump
    pub branch: bool,
    /// Selected ALU operation
    pub alu_op: AluOp,
}
