//! Register file and per-core bookkeeping

/// Execution limit safeguard for runaway programs
pub const MAX_CYCLES: i32 = 1_000_000;

/// Register file simulation: 32 general purpose registers
#[derive(Clone, Copy)]
pub struct RegisterFile {
    gpr: [Register; 32],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self { gpr: [Register::new(0); 32] }
    }

    /// Reads the register at the given index
    pub fn read(&self, idx: u32) -> u32 {
        self.gpr[idx as usize].read()
    }

    /// Writes to the register at the given index.
    /// Writes to x0 are discarded.
    pub fn write(&mut self, idx: u32, value: u32) {
        if idx != 0 {
            self.gpr[idx as usize].write(value);
        }
    }

    /// Returns a snapshot of all register values
    pub fn snapshot(&self) -> [u32; 32] {
        let mut values = [0u32; 32];
        for (value, register) in values.iter_mut().zip(self.gpr.iter()) {
            *value = register.read();
        }
        values
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Register simulation
#[derive(Clone, Copy)]
pub struct Register {
    /// Current data in the register
    data: u32,
}

impl Register {
    pub fn new(data: u32) -> Self {
        Self { data }
    }

    /// Reads the register
    pub fn read(&self) -> u32 {
        self.data
    }

    /// Writes to register
    pub fn write(&mut self, value: u32) {
        self.data = value;
    }
}

/// Core policy
#[derive(Clone, Copy, Default)]
pub struct CorePolicy {
    pub verbose: bool,
}

/// History of execution
#[derive(Clone, Copy, Default)]
pub struct CoreHistory {
    pub cycle_count: i32,
    pub inst_count: i32,
    pub stall_count: i32,
    pub flush_count: i32,
}

impl CoreHistory {
    /// Cycles per instruction
    pub fn cpi(&self) -> f64 {
        self.cycle_count as f64 / self.inst_count as f64
    }

    /// Instructions per cycle
    pub fn ipc(&self) -> f64 {
        self.inst_count as f64 / self.cycle_count as f64
    }
}
