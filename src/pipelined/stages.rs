//! The five stage transition functions.
//!
//! Every function reads only the committed `current` latches and writes its
//! output latch into `next`; the engine commits `next` atomically at the end
//! of the cycle.

use super::pipeline::ExLatch;
use super::pipeline::IdLatch;
use super::pipeline::IfLatch;
use super::pipeline::MemLatch;
use super::pipeline::PipelineState;
use super::pipeline::WbLatch;
use crate::alu::alu;
use crate::cpu::CoreHistory;
use crate::cpu::RegisterFile;
use crate::error::SimulatorResult;
use crate::instruction::Instruction;
use crate::instruction::OpKind;
use crate::memory::DataMemory;
use crate::memory::InstructionMemory;

/// IF stage: fetch the word at the current PC.
/// A word decoding to HALT stops further fetching but still flows once
/// into ID so in-flight work ahead of it completes.
pub fn instruction_fetch(
    current: &PipelineState,
    next: &mut PipelineState,
    imem: &InstructionMemory,
) -> SimulatorResult<()> {
    if current.if_stage.nop {
        next.if_stage = current.if_stage;
        next.id = IdLatch::default();
        return Ok(());
    }

    let pc = current.if_stage.pc;
    let raw = imem.fetch_instruction(pc)?;
    let halt = Instruction::decode(raw).op == OpKind::Halt;

    next.if_stage = IfLatch { nop: halt, pc: if halt { pc } else { pc.wrapping_add(4) } };
    next.id = IdLatch { nop: false, pc, raw_inst: raw };
    Ok(())
}

/// ID stage: decode the latched word and read source registers.
/// The HALT sentinel is counted once, then converted to a bubble.
pub fn instruction_decode(
    current: &PipelineState,
    next: &mut PipelineState,
    rf: &RegisterFile,
    history: &mut CoreHistory,
) {
    if current.id.nop {
        next.ex = ExLatch::default();
        return;
    }

    let inst = Instruction::decode(current.id.raw_inst);
    history.inst_count += 1;

    if inst.op == OpKind::Halt {
        next.ex = ExLatch::default();
        return;
    }

    next.ex = ExLatch {
        nop: false,
        pc: current.id.pc,
        op: inst.op,
        alu_op: inst.controls.alu_op,
        read_data1: rf.read(inst.rs1),
        read_data2: rf.read(inst.rs2),
        imm: inst.imm,
        rs1: inst.rs1,
        rs2: inst.rs2,
        wrt_reg_addr: inst.rd,
        is_i_type: inst.controls.is_i_type,
        rd_mem: inst.controls.rd_mem,
        wrt_mem: inst.controls.wrt_mem,
        wrt_enable: inst.controls.wrt_rf,
    };
}

/// EX stage: ALU computation over forwarded operands, and branch/jump
/// resolution. Returns the redirect target when control flow is taken.
pub fn execute(current: &PipelineState, next: &mut PipelineState) -> Option<u32> {
    if current.ex.nop {
        next.mem = MemLatch::default();
        return None;
    }
    let ex = &current.ex;

    // Forward priority: EX/MEM result, then MEM/WB result, then the
    // register value read in ID
    let op1 = if current.ex_forward_op1() {
        current.mem.alu_result
    } else if current.mem_forward_op1() {
        current.wb.wrt_data
    } else {
        ex.read_data1
    };
    let op2 = if current.ex_forward_op2() {
        current.mem.alu_result
    } else if current.mem_forward_op2() {
        current.wb.wrt_data
    } else {
        ex.read_data2
    };

    let mut redirect = None;
    let alu_result = match ex.op {
        OpKind::Beq => {
            if op1 == op2 {
                redirect = Some(ex.pc.wrapping_add(ex.imm as u32));
            }
            0
        }
        OpKind::Bne => {
            if op1 != op2 {
                redirect = Some(ex.pc.wrapping_add(ex.imm as u32));
            }
            0
        }
        OpKind::Jal => {
            redirect = Some(ex.pc.wrapping_add(ex.imm as u32));
            // Link value
            ex.pc.wrapping_add(4)
        }
        _ => {
            let alu_b = if ex.is_i_type || ex.wrt_mem { ex.imm as u32 } else { op2 };
            alu(ex.alu_op, op1, alu_b)
        }
    };

    next.mem = MemLatch {
        nop: false,
        alu_result,
        store_data: op2,
        wrt_reg_addr: ex.wrt_reg_addr,
        rd_mem: ex.rd_mem,
        wrt_mem: ex.wrt_mem,
        wrt_enable: ex.wrt_enable,
    };
    redirect
}

/// MEM stage: load/store at the address computed in EX.
/// Load results become forwardable from the end of this stage.
pub fn memory_access(
    current: &PipelineState,
    next: &mut PipelineState,
    dmem: &mut DataMemory,
) -> SimulatorResult<()> {
    if current.mem.nop {
        next.wb = WbLatch::default();
        return Ok(());
    }
    let mem = &current.mem;

    let wrt_data = if mem.rd_mem {
        dmem.load_word(mem.alu_result)?
    } else if mem.wrt_mem {
        dmem.store_word(mem.alu_result, mem.store_data)?;
        0
    } else {
        mem.alu_result
    };

    next.wb = WbLatch {
        nop: false,
        wrt_data,
        wrt_reg_addr: mem.wrt_reg_addr,
        wrt_enable: mem.wrt_enable,
    };
    Ok(())
}

/// WB stage: commit the result to the register file.
/// Runs before ID within a cycle, so a reader three instructions behind
/// the producer sees the fresh value.
pub fn write_back(current: &PipelineState, rf: &mut RegisterFile) {
    if current.wb.nop || !current.wb.wrt_enable {
        return;
    }
    rf.write(current.wb.wrt_reg_addr, current.wb.wrt_data);
}
