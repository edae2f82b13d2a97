//! Byte-addressable instruction and data memories backed by hex image files

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::error::ImageError;
use crate::error::MemoryError;
use crate::error::SimulatorResult;

/// Data memory size in bytes
pub const MEM_SIZE: usize = 1000;

/// Instruction image file name
pub const IMEM_FILE: &str = "imem.txt";
/// Data image file name
pub const DMEM_FILE: &str = "dmem.txt";

/// Instruction memory: read-only program image
pub struct InstructionMemory {
    bytes: Vec<u8>,
}

impl InstructionMemory {
    /// Loads the instruction image from the IO directory
    pub fn load(io_dir: &Path) -> SimulatorResult<Self> {
        Ok(Self { bytes: read_hex_image(&io_dir.join(IMEM_FILE))? })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Fetches the 32-bit word at the given PC,
    /// concatenating 4 consecutive bytes big-endian
    pub fn fetch_instruction(&self, pc: u32) -> SimulatorResult<u32> {
        read_word(&self.bytes, pc)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Data memory: byte-addressable store, mutated by SW and dumped at exit
pub struct DataMemory {
    bytes: Vec<u8>,
}

impl DataMemory {
    /// Loads the data image from the IO directory,
    /// zero-padded to `MEM_SIZE` bytes
    pub fn load(io_dir: &Path) -> SimulatorResult<Self> {
        let mut bytes = read_hex_image(&io_dir.join(DMEM_FILE))?;
        bytes.resize(bytes.len().max(MEM_SIZE), 0);
        Ok(Self { bytes })
    }

    pub fn from_bytes(mut bytes: Vec<u8>) -> Self {
        bytes.resize(bytes.len().max(MEM_SIZE), 0);
        Self { bytes }
    }

    /// Reads the 32-bit word at the given address (big-endian)
    pub fn load_word(&self, addr: u32) -> SimulatorResult<u32> {
        read_word(&self.bytes, addr)
    }

    /// Writes the 32-bit word at the given address (big-endian)
    pub fn store_word(&mut self, addr: u32, value: u32) -> SimulatorResult<()> {
        let addr = addr as usize;
        if addr + 4 > self.bytes.len() {
            return Err(MemoryError::AddressOutOfBounds(addr as u32).into());
        }
        self.bytes[addr..addr + 4].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Dumps the memory contents, one hex byte per line
    pub fn dump(&self, path: &Path) -> SimulatorResult<()> {
        let mut file = File::create(path)?;
        for byte in &self.bytes {
            writeln!(file, "{:02x}", byte)?;
        }
        Ok(())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn read_word(bytes: &[u8], addr: u32) -> SimulatorResult<u32> {
    let addr = addr as usize;
    if addr + 4 > bytes.len() {
        return Err(MemoryError::AddressOutOfBounds(addr as u32).into());
    }
    Ok(u32::from_be_bytes([
        bytes[addr],
        bytes[addr + 1],
        bytes[addr + 2],
        bytes[addr + 3],
    ]))
}

/// Reads a memory image: one two-digit hex byte per line
fn read_hex_image(path: &Path) -> SimulatorResult<Vec<u8>> {
    let content = fs::read_to_string(path)
        .map_err(|e| ImageError::FileReadError(PathBuf::from(path), e))?;

    let mut bytes = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let byte = u8::from_str_radix(line, 16).map_err(|_| {
            ImageError::ParseError(
                PathBuf::from(path),
                line.to_string(),
                line_num + 1,
            )
        })?;
        bytes.push(byte);
    }
    Ok(bytes)
}
