//! Instruction word encoders for building test programs

/// HALT sentinel word: opcode 0b1111111 is not a recognized opcode
pub const HALT: u32 = 0xffff_ffff;

pub fn encode_r(funct7: u32, funct3: u32, rd: u32, rs1: u32, rs2: u32) -> u32 {
    (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | 0b0110011
}

pub fn encode_i(opcode: u32, funct3: u32, rd: u32, rs1: u32, imm: i32) -> u32 {
    ((imm as u32 & 0xfff) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

pub fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
    encode_i(0b0010011, 0b000, rd, rs1, imm)
}

pub fn add(rd: u32, rs1: u32, rs2: u32) -> u32 {
    encode_r(0b0000000, 0b000, rd, rs1, rs2)
}

pub fn sub(rd: u32, rs1: u32, rs2: u32) -> u32 {
    encode_r(0b0100000, 0b000, rd, rs1, rs2)
}

pub fn lw(rd: u32, rs1: u32, imm: i32) -> u32 {
    encode_i(0b0000011, 0b010, rd, rs1, imm)
}

pub fn sw(rs1: u32, rs2: u32, imm: i32) -> u32 {
    encode_s(0b010, rs1, rs2, imm)
}

pub fn encode_s(funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
    let imm = imm as u32 & 0xfff;
    ((imm >> 5) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | ((imm & 0x1f) << 7)
        | 0b0100011
}

pub fn beq(rs1: u32, rs2: u32, imm: i32) -> u32 {
    encode_b(0b000, rs1, rs2, imm)
}

pub fn bne(rs1: u32, rs2: u32, imm: i32) -> u32 {
    encode_b(0b001, rs1, rs2, imm)
}

pub fn encode_b(funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
    let imm = imm as u32 & 0x1fff;
    (((imm >> 12) & 1) << 31)
        | (((imm >> 5) & 0x3f) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | (((imm >> 1) & 0xf) << 8)
        | (((imm >> 11) & 1) << 7)
        | 0b1100011
}

pub fn jal(rd: u32, imm: i32) -> u32 {
    let imm = imm as u32 & 0x1f_ffff;
    (((imm >> 20) & 1) << 31)
        | (((imm >> 1) & 0x3ff) << 21)
        | (((imm >> 11) & 1) << 20)
        | (((imm >> 12) & 0xff) << 12)
        | (rd << 7)
        | 0b1101111
}

/// Flattens instruction words into a big-endian byte image
pub fn program_image(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    bytes
}
