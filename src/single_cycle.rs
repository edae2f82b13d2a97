//! Single cycle implementation: one instruction fully retires per cycle.
//! This core is the correctness oracle for the pipelined core.

use crate::alu::alu;
use crate::cpu::CoreHistory;
use crate::cpu::CorePolicy;
use crate::cpu::RegisterFile;
use crate::cpu::MAX_CYCLES;
use crate::error::ExecutionError;
use crate::error::SimulatorResult;
use crate::instruction::Instruction;
use crate::instruction::OpKind;
use crate::memory::DataMemory;
use crate::memory::InstructionMemory;

/// Single cycle core
pub struct SingleCycleCore<'a> {
    imem: &'a InstructionMemory,
    pub dmem: DataMemory,
    pub rf: RegisterFile,
    pub history: CoreHistory,
    pub halted: bool,
    pub pc: u32,
    policy: CorePolicy,
}

impl<'a> SingleCycleCore<'a> {
    pub fn new(imem: &'a InstructionMemory, dmem: DataMemory, policy: CorePolicy) -> Self {
        Self {
            imem,
            dmem,
            rf: RegisterFile::new(),
            history: CoreHistory::default(),
            halted: false,
            pc: 0,
            policy,
        }
    }

    /// Runs to the HALT sentinel
    pub fn run(&mut self) -> SimulatorResult<()> {
        while !self.halted {
            if self.history.cycle_count >= MAX_CYCLES {
                return Err(ExecutionError::ExecutionLimitReached(MAX_CYCLES).into());
            }
            self.step()?;
        }
        Ok(())
    }

    /// Executes one full fetch/decode/execute/writeback cycle
    pub fn step(&mut self) -> SimulatorResult<()> {
        self.history.cycle_count += 1;
        self.history.inst_count += 1;

        let pc = self.pc;
        let raw = self.imem.fetch_instruction(pc)?;
        let inst = Instruction::decode(raw);

        if self.policy.verbose {
            eprintln!("[VERBOSE] PC: {:#010x}; {:?}", pc, inst.op);
        }

        let mut next_pc = pc.wrapping_add(4);
        match inst.op {
            OpKind::Halt => {
                self.halted = true;
                next_pc = pc;
            }
            OpKind::Lw => {
                let addr = self.rf.read(inst.rs1).wrapping_add(inst.imm as u32);
                let value = self.dmem.load_word(addr)?;
                self.rf.write(inst.rd, value);
            }
            OpKind::Sw => {
                let addr = self.rf.read(inst.rs1).wrapping_add(inst.imm as u32);
                self.dmem.store_word(addr, self.rf.read(inst.rs2))?;
            }
            OpKind::Beq => {
                if self.rf.read(inst.rs1) == self.rf.read(inst.rs2) {
                    next_pc = pc.wrapping_add(inst.imm as u32);
                }
            }
            OpKind::Bne => {
                if self.rf.read(inst.rs1) != self.rf.read(inst.rs2) {
                    next_pc = pc.wrapping_add(inst.imm as u32);
                }
            }
            OpKind::Jal => {
                self.rf.write(inst.rd, pc.wrapping_add(4));
                next_pc = pc.wrapping_add(inst.imm as u32);
            }
            _ => {
                // Register-register and register-immediate ALU operations
                let op1 = self.rf.read(inst.rs1);
                let op2 = if inst.controls.is_i_type {
                    inst.imm as u32
                } else {
                    self.rf.read(inst.rs2)
                };
                self.rf.write(inst.rd, alu(inst.controls.alu_op, op1, op2));
            }
        }

        if self.policy.verbose && next_pc != pc.wrapping_add(4) {
            eprintln!("[VERBOSE] Branching from {:#010x} to {:#010x}", pc, next_pc);
        }

        self.pc = next_pc;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::test_util::*;

    fn run_program(words: &[u32], dmem_bytes: Vec<u8>) -> SingleCycleCore<'static> {
        let imem = Box::leak(Box::new(InstructionMemory::from_bytes(program_image(words))));
        let mut core =
            SingleCycleCore::new(imem, DataMemory::from_bytes(dmem_bytes), CorePolicy::default());
        core.run().unwrap();
        core
    }

    #[test]
    fn add_program_retires_in_four_cycles() {
        let core = run_program(&[addi(1, 0, 5), addi(2, 0, 3), add(3, 1, 2), HALT], vec![]);
        assert_eq!(core.rf.read(3), 8);
        assert_eq!(core.history.cycle_count, 4);
        assert_eq!(core.history.inst_count, 4);
        assert!((core.history.cpi() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn store_then_load_reads_back_stored_value() {
        let core = run_program(
            &[
                addi(1, 0, 0x123),
                addi(2, 0, 64),
                sw(2, 1, 4),
                lw(3, 2, 4),
                HALT,
            ],
            vec![],
        );
        assert_eq!(core.rf.read(3), 0x123);
        assert_eq!(core.dmem.load_word(68).unwrap(), 0x123);
    }

    #[test]
    fn taken_branch_skips_not_taken_path() {
        // beq x1, x1, +8 skips the addi poisoning x5
        let core = run_program(
            &[addi(1, 0, 7), beq(1, 1, 8), addi(5, 0, 99), HALT],
            vec![],
        );
        assert_eq!(core.rf.read(5), 0);
        assert_eq!(core.history.cycle_count, 3);
    }

    #[test]
    fn not_taken_branch_falls_through() {
        let core = run_program(
            &[addi(1, 0, 7), bne(1, 1, 8), addi(5, 0, 99), HALT],
            vec![],
        );
        assert_eq!(core.rf.read(5), 99);
    }

    #[test]
    fn jal_links_and_jumps() {
        // jal x1, +12 over two poison instructions
        let core = run_program(
            &[jal(1, 12), addi(5, 0, 1), addi(6, 0, 1), addi(7, 0, 1), HALT],
            vec![],
        );
        assert_eq!(core.rf.read(1), 4);
        assert_eq!(core.rf.read(5), 0);
        assert_eq!(core.rf.read(6), 0);
        assert_eq!(core.rf.read(7), 1);
    }

    #[test]
    fn backward_branch_loops() {
        // x1 counts down from 3; bne loops back to the sub
        let core = run_program(
            &[
                addi(1, 0, 3),
                addi(2, 0, 1),
                sub(1, 1, 2),
                bne(1, 0, -4),
                HALT,
            ],
            vec![],
        );
        assert_eq!(core.rf.read(1), 0);
        // 2 setup + 3 iterations of (sub, bne) + halt
        assert_eq!(core.history.cycle_count, 9);
    }

    #[test]
    fn negative_immediates() {
        let core = run_program(&[addi(1, 0, -5), addi(2, 1, 3), HALT], vec![]);
        assert_eq!(core.rf.read(1) as i32, -5);
        assert_eq!(core.rf.read(2) as i32, -2);
    }
}
