//! Pipeline latches and hazard predicates.
//!
//! One latch per stage, fixed shape, each with a `nop` bubble flag. The
//! engine holds one committed `PipelineState` and computes a complete next
//! state from it every cycle; no latch is mutated mid-cycle.

use crate::alu::AluOp;
use crate::instruction::Instruction;
use crate::instruction::OpKind;

/// Pipeline state: the five stage latches
#[derive(Clone, Copy, Default)]
pub struct PipelineState {
    pub if_stage: IfLatch,
    pub id: IdLatch,
    pub ex: ExLatch,
    pub mem: MemLatch,
    pub wb: WbLatch,
}

impl PipelineState {
    /// Load-use hazard: the instruction in ID sources the destination of
    /// a load currently in EX. The loaded value only becomes available at
    /// the end of MEM, so the consumer must wait one cycle and pick it up
    /// through the MEM/WB forward.
    pub fn load_use_hazard(&self) -> bool {
        if self.id.nop || self.ex.nop || !self.ex.rd_mem || self.ex.wrt_reg_addr == 0 {
            return false;
        }
        let inst = Instruction::decode(self.id.raw_inst);
        (inst.uses_rs1() && inst.rs1 == self.ex.wrt_reg_addr)
            || (inst.uses_rs2() && inst.rs2 == self.ex.wrt_reg_addr)
    }

    /// Operand 1 can be forwarded from the EX/MEM latch
    /// See P&H p. 300
    pub fn ex_forward_op1(&self) -> bool {
        !self.mem.nop
            && self.mem.wrt_enable
            && self.mem.wrt_reg_addr != 0
            && self.mem.wrt_reg_addr == self.ex.rs1
    }

    /// Operand 2 can be forwarded from the EX/MEM latch
    /// See P&H p. 300
    pub fn ex_forward_op2(&self) -> bool {
        !self.mem.nop
            && self.mem.wrt_enable
            && self.mem.wrt_reg_addr != 0
            && self.mem.wrt_reg_addr == self.ex.rs2
    }

    /// Operand 1 can be forwarded from the MEM/WB latch
    /// Precondition: ex_forward_op1 is false
    /// See P&H p. 301
    pub fn mem_forward_op1(&self) -> bool {
        !self.wb.nop
            && self.wb.wrt_enable
            && self.wb.wrt_reg_addr != 0
            && self.wb.wrt_reg_addr == self.ex.rs1
    }

    /// Operand 2 can be forwarded from the MEM/WB latch
    /// Precondition: ex_forward_op2 is false
    /// See P&H p. 301
    pub fn mem_forward_op2(&self) -> bool {
        !self.wb.nop
            && self.wb.wrt_enable
            && self.wb.wrt_reg_addr != 0
            && self.wb.wrt_reg_addr == self.ex.rs2
    }

    /// The pipeline has fully drained
    pub fn all_nop(&self) -> bool {
        self.if_stage.nop && self.id.nop && self.ex.nop && self.mem.nop && self.wb.nop
    }
}

/// IF latch: the PC to fetch this cycle
#[derive(Clone, Copy)]
pub struct IfLatch {
    pub nop: bool,
    pub pc: u32,
}

impl Default for IfLatch {
    fn default() -> Self {
        // Fetch is active at reset; everything downstream starts empty
        Self { nop: false, pc: 0 }
    }
}

/// ID latch: the fetched raw instruction
#[derive(Clone, Copy)]
pub struct IdLatch {
    pub nop: bool,
    pub pc: u32,
    pub raw_inst: u32,
}

impl Default for IdLatch {
    fn default() -> Self {
        Self { nop: true, pc: 0, raw_inst: 0 }
    }
}

/// EX latch: decoded operation, operand values, and the source register
/// indices that produced them (consulted by the forwarding predicates)
#[derive(Clone, Copy)]
pub struct ExLatch {
    pub nop: bool,
    pub pc: u32,
    pub op: OpKind,
    pub alu_op: AluOp,
    pub read_data1: u32,
    pub read_data2: u32,
    pub imm: i32,
    pub rs1: u32,
    pub rs2: u32,
    pub wrt_reg_addr: u32,
    pub is_i_type: bool,
    pub rd_mem: bool,
    pub wrt_mem: bool,
    pub wrt_enable: bool,
}

impl Default for ExLatch {
    fn default() -> Self {
        Self {
            nop: true,
            pc: 0,
            op: OpKind::Halt,
            alu_op: AluOp::ADD,
            read_data1: 0,
            read_data2: 0,
            imm: 0,
            rs1: 0,
            rs2: 0,
            wrt_reg_addr: 0,
            is_i_type: false,
            rd_mem: false,
            wrt_mem: false,
            wrt_enable: false,
        }
    }
}

/// MEM latch: the ALU result (or effective address) and the store data
#[derive(Clone, Copy)]
pub struct MemLatch {
    pub nop: bool,
    pub alu_result: u32,
    pub store_data: u32,
    pub wrt_reg_addr: u32,
    pub rd_mem: bool,
    pub wrt_mem: bool,
    pub wrt_enable: bool,
}

impl Default for MemLatch {
    fn default() -> Self {
        Self {
            nop: true,
            alu_result: 0,
            store_data: 0,
            wrt_reg_addr: 0,
            rd_mem: false,
            wrt_mem: false,
            wrt_enable: false,
        }
    }
}

/// WB latch: the value to commit to the register file
#[derive(Clone, Copy)]
pub struct WbLatch {
    pub nop: bool,
    pub wrt_data: u32,
    pub wrt_reg_addr: u32,
    pub wrt_enable: bool,
}

impl Default for WbLatch {
    fn default() -> Self {
        Self { nop: true, wrt_data: 0, wrt_reg_addr: 0, wrt_enable: false }
    }
}
