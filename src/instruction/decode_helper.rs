//! Decoding helper functions: positional field extraction per the rv32i
//! encoding, immediate assembly, and sign extension.

use super::Controls;
use super::Instruction;
use super::OpKind;
use crate::alu;
use crate::alu::AluOp;

/// Computes the two's-complement value of a raw magnitude whose sign
/// bit sits at the given index
pub fn sign_extend(val: u32, sign_bit: u32) -> i32 {
    if val & (1 << sign_bit) != 0 {
        (i64::from(val) - (1i64 << (sign_bit + 1))) as i32
    } else {
        val as i32
    }
}

/// Decodes a raw 32-bit instruction word.
/// Any unrecognized opcode decodes to the HALT sentinel.
pub fn decode(raw: u32) -> Instruction {
    match get_opcode(raw) {
        0b0110011 => decode_r(raw),
        0b0010011 => decode_i(raw),
        0b0000011 => decode_load(raw),
        0b0100011 => decode_store(raw),
        0b1100011 => decode_branch(raw),
        0b1101111 => decode_jal(raw),
        _ => Instruction { raw, op: OpKind::Halt, ..Default::default() },
    }
}

fn decode_r(raw: u32) -> Instruction {
    let funct7 = get_funct7(raw);
    let funct3 = get_funct3(raw);
    let alu_op = alu::select_r(funct7, funct3);
    let op = match alu_op {
        AluOp::ADD => OpKind::Add,
        AluOp::SUB => OpKind::Sub,
        AluOp::XOR => OpKind::Xor,
        AluOp::OR => OpKind::Or,
        AluOp::AND => OpKind::And,
        AluOp::NOP => OpKind::Add, // result is still 0 via the ALU fallback
    };
    Instruction {
        raw,
        op,
        rs1: get_rs1(raw),
        rs2: get_rs2(raw),
        rd: get_rd(raw),
        imm: 0,
        controls: Controls { wrt_rf: true, alu_op, ..Default::default() },
    }
}

fn decode_i(raw: u32) -> Instruction {
    let funct3 = get_funct3(raw);
    let alu_op = alu::select_i(funct3);
    let op = match alu_op {
        AluOp::XOR => OpKind::Xori,
        AluOp::OR => OpKind::Ori,
        AluOp::AND => OpKind::Andi,
        _ => OpKind::Addi,
    };
    Instruction {
        raw,
        op,
        rs1: get_rs1(raw),
        rs2: 0,
        rd: get_rd(raw),
        imm: sign_extend(raw >> 20, 11),
        controls: Controls {
            is_i_type: true,
            wrt_rf: true,
            alu_op,
            ..Default::default()
        },
    }
}

fn decode_load(raw: u32) -> Instruction {
    Instruction {
        raw,
        op: OpKind::Lw,
        rs1: get_rs1(raw),
        rs2: 0,
        rd: get_rd(raw),
        imm: sign_extend(raw >> 20, 11),
        controls: Controls {
            is_i_type: true,
            rd_mem: true,
            wrt_rf: true,
            alu_op: AluOp::ADD,
            ..Default::default()
        },
    }
}

fn decode_store(raw: u32) -> Instruction {
    // S-immediate: {bits[31:25] : bits[11:7]}
    let imm = ((raw >> 25) << 5) | get_rd(raw);
    Instruction {
        raw,
        op: OpKind::Sw,
        rs1: get_rs1(raw),
        rs2: get_rs2(raw),
        rd: 0,
        imm: sign_extend(imm, 11),
        controls: Controls {
            wrt_mem: true,
            alu_op: AluOp::ADD,
            ..Default::default()
        },
    }
}

fn decode_branch(raw: u32) -> Instruction {
    // B-immediate: {bit 31, bit 7, bits[30:25], bits[11:8]}, bit 0 zero
    let imm = (((raw >> 31) & 1) << 12)
        | (((raw >> 7) & 1) << 11)
        | (((raw >> 25) & 0x3f) << 5)
        | (((raw >> 8) & 0xf) << 1);
    let op = match get_funct3(raw) {
        0b000 => OpKind::Beq,
        _ => OpKind::Bne,
    };
    Instruction {
        raw,
        op,
        rs1: get_rs1(raw),
        rs2: get_rs2(raw),
        rd: 0,
        imm: sign_extend(imm, 12),
        controls: Controls { branch: true, ..Default::default() },
    }
}

fn decode_jal(raw: u32) -> Instruction {
    // J-immediate: {bit 31, bits[19:12], bit 20, bits[30:21]}, bit 0 zero
    let imm = (((raw >> 31) & 1) << 20)
        | (((raw >> 12) & 0xff) << 12)
        | (((raw >> 20) & 1) << 11)
        | (((raw >> 21) & 0x3ff) << 1);
    Instruction {
        raw,
        op: OpKind::Jal,
        rs1: 0,
        rs2: 0,
        rd: get_rd(raw),
        imm: sign_extend(imm, 20),
        controls: Controls { branch: true, wrt_rf: true, ..Default::default() },
    }
}

/// Extracts opcode from a raw instruction
fn get_opcode(raw: u32) -> u32 {
    raw & 0x7f
}

/// Extracts funct3 from a raw instruction, normalized to bits [2:0]
fn get_funct3(raw: u32) -> u32 {
    (raw >> 12) & 0x7
}

/// Extracts the rs1 field from a raw instruction
fn get_rs1(raw: u32) -> u32 {
    (raw >> 15) & 0x1f
}

/// Extracts the rs2 field from a raw instruction
fn get_rs2(raw: u32) -> u32 {
    (raw >> 20) & 0x1f
}

/// Extracts the rd field from a raw instruction
fn get_rd(raw: u32) -> u32 {
    (raw >> 7) & 0x1f
}

/// Extracts the funct7 field from a raw instruction
fn get_funct7(raw: u32) -> u32 {
    (raw >> 25) & 0x7f
}
