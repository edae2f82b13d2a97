//! A simulator wrapper: runs both cores over the same program image and
//! writes every output file into the IO directory.

use std::path::Path;

use crate::cpu::CoreHistory;
use crate::cpu::CorePolicy;
use crate::cpu::MAX_CYCLES;
use crate::error::ExecutionError;
use crate::error::SimulatorResult;
use crate::memory::DataMemory;
use crate::memory::InstructionMemory;
use crate::output;
use crate::output::RegisterDump;
use crate::output::StateTrace;
use crate::pipelined::FiveStageCore;
use crate::single_cycle::SingleCycleCore;

/// Statistics of a completed dual-core run
#[derive(Clone, Copy)]
pub struct RunStats {
    pub single: CoreHistory,
    pub five: CoreHistory,
}

/// Runs the single-cycle and five-stage cores over the images in the
/// given directory and writes all result files there
pub fn run(io_dir: &Path, policy: CorePolicy) -> SimulatorResult<RunStats> {
    let imem = InstructionMemory::load(io_dir)?;

    // Single-cycle core
    let mut ss = SingleCycleCore::new(&imem, DataMemory::load(io_dir)?, policy);
    let mut ss_dump = RegisterDump::create(&io_dir.join("SS_RFResult.txt"))?;
    let mut ss_trace = StateTrace::create(&io_dir.join("StateResult_SS.txt"))?;
    while !ss.halted {
        if ss.history.cycle_count >= MAX_CYCLES {
            return Err(ExecutionError::ExecutionLimitReached(MAX_CYCLES).into());
        }
        ss.step()?;
        let cycle = ss.history.cycle_count - 1;
        ss_dump.write_cycle(cycle, &ss.rf.snapshot())?;
        ss_trace.write_cycle(cycle, ss.pc, ss.halted)?;
    }
    ss.dmem.dump(&io_dir.join("SS_DMEMResult.txt"))?;

    // Five-stage core
    let mut fs = FiveStageCore::new(&imem, DataMemory::load(io_dir)?, policy);
    let mut fs_dump = RegisterDump::create(&io_dir.join("FS_RFResult.txt"))?;
    while !fs.halted {
        if fs.history.cycle_count >= MAX_CYCLES {
            return Err(ExecutionError::ExecutionLimitReached(MAX_CYCLES).into());
        }
        fs.step()?;
        fs_dump.write_cycle(fs.history.cycle_count - 1, &fs.rf.snapshot())?;
    }
    fs.dmem.dump(&io_dir.join("FS_DMEMResult.txt"))?;

    // Metrics: per core and combined
    output::write_single_metrics(io_dir, &ss.history)?;
    output::write_five_metrics(io_dir, &fs.history)?;
    output::write_performance_metrics(io_dir, &ss.history, &fs.history)?;

    Ok(RunStats { single: ss.history, five: fs.history })
}
