pub mod alu;
pub mod cpu;
pub mod instruction;
pub mod memory;
pub mod output;
pub mod run_wrapper;

pub mod pipelined;
pub mod single_cycle;

pub mod error;
