//! Output writers: per-cycle register dumps, the single-cycle state trace,
//! and the performance metrics files.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::cpu::CoreHistory;
use crate::error::SimulatorResult;

/// Per-cycle register file dump.
/// Cycle 0 truncates the file; later cycles append.
pub struct RegisterDump {
    file: File,
}

impl RegisterDump {
    pub fn create(path: &Path) -> SimulatorResult<Self> {
        Ok(Self { file: File::create(path)? })
    }

    pub fn write_cycle(&mut self, cycle: i32, regs: &[u32; 32]) -> SimulatorResult<()> {
        writeln!(self.file, "{}", "-".repeat(70))?;
        writeln!(self.file, "State of RF after executing cycle: {}", cycle)?;
        for value in regs {
            writeln!(self.file, "{}", *value as i32)?;
        }
        Ok(())
    }
}

/// Per-cycle stage-visible state trace (single-cycle core)
pub struct StateTrace {
    file: File,
}

impl StateTrace {
    pub fn create(path: &Path) -> SimulatorResult<Self> {
        Ok(Self { file: File::create(path)? })
    }

    pub fn write_cycle(&mut self, cycle: i32, next_pc: u32, nop: bool) -> SimulatorResult<()> {
        writeln!(self.file, "State after executing cycle: {}", cycle)?;
        writeln!(self.file, "IF.PC: {}", next_pc)?;
        writeln!(self.file, "IF.nop: {}", nop)?;
        writeln!(self.file)?;
        Ok(())
    }
}

/// Formats a float to the given precision, stripping trailing zeros
/// and a trailing decimal point
pub fn format_float(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value);
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn metrics_block(title: &str, history: &CoreHistory) -> String {
    [
        title.to_string(),
        format!("Number of Cycles taken:  {}", history.cycle_count),
        format!("Total Number of Instructions: {}", history.inst_count),
        format!("Cycles per instruction:  {}", format_float(history.cpi(), 16)),
        format!("Instructions per cycle:  {}", format_float(history.ipc(), 16)),
    ]
    .join("\n")
}

/// Writes the single-cycle core metrics file
pub fn write_single_metrics(io_dir: &Path, ss: &CoreHistory) -> SimulatorResult<()> {
    let block = metrics_block("Single Stage Core Performance Metrics: ", ss);
    let mut file = File::create(io_dir.join("SingleMetrics.txt"))?;
    file.write_all(block.as_bytes())?;
    Ok(())
}

/// Writes the five-stage core metrics file
pub fn write_five_metrics(io_dir: &Path, fs: &CoreHistory) -> SimulatorResult<()> {
    let block = metrics_block("Five Stage Core Performance Metrics:", fs);
    let mut file = File::create(io_dir.join("FiveMetrics.txt"))?;
    file.write_all(block.as_bytes())?;
    Ok(())
}

/// Writes the combined metrics file: both cores, blank line between
pub fn write_performance_metrics(
    io_dir: &Path,
    ss: &CoreHistory,
    fs: &CoreHistory,
) -> SimulatorResult<()> {
    let content = format!(
        "{}\n\n{}",
        metrics_block("Single Stage Core Performance Metrics: ", ss),
        metrics_block("Five Stage Core Performance Metrics:", fs),
    );
    let mut file = File::create(io_dir.join("PerformanceMetrics_Result.txt"))?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
