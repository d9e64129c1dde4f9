use common::mem::{BLANK_WORD, Word};

use crate::interrupt::Latches;
use crate::memory::Memory;

// The register file is shared by whichever process is current; the PCB keeps
// a copy while a process is off the CPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    pub ir: Word,    // Instruction register
    pub ic: usize,   // Instruction counter (virtual)
    pub r: Word,     // General register
    pub c: bool,     // Compare flag
    pub latches: Latches,
    pub ra: usize,   // Real address of the pending PD
    pub io_va: i64,  // Virtual address the pending GD lands at
}

impl CpuState {
    pub fn new() -> Self {
        CpuState {
            ir: BLANK_WORD,
            ic: 0,
            r: BLANK_WORD,
            c: false,
            latches: Latches::default(),
            ra: 0,
            io_va: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}

// This is separate from the scheduler so a context switch can borrow the CPU
// while the scheduler hands out PCBs.
pub struct EmulatorState {
    cycles: u64,
    pub(crate) mem: Memory,
    pub(crate) cpu: CpuState,
}

impl EmulatorState {
    pub fn new() -> Self {
        EmulatorState {
            cycles: 0,
            mem: Memory::new(),
            cpu: CpuState::new(),
        }
    }

    pub fn inc_cycles(&mut self) {
        self.cycles += 1;
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn cpu(&self) -> &CpuState {
        &self.cpu
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }
}

impl Default for EmulatorState {
    fn default() -> Self {
        Self::new()
    }
}
