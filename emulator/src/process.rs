use common::constants::PAGE_SIZE;
use common::mem::{BLANK_WORD, Word};

use crate::emulator_state::CpuState;
use crate::paging::PageTable;

use std::collections::VecDeque;
use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Ready,
    Running,
    Blocked, // Only while a context is being saved
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub ic: Option<usize>, // None until first dispatch
    pub r: Word,
    pub c: bool,
    pub sp: usize,   // No stack on this machine; always 0
    pub status: u16, // Likewise
    pub state: RunState,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            ic: None,
            r: BLANK_WORD,
            c: false,
            sp: 0,
            status: 0,
            state: RunState::Ready,
        }
    }
}

pub struct Pcb {
    pub pid: u32,
    pub ttl: u32,
    pub tll: u32,
    pub ttc: u32,
    pub llc: u32,
    pub page_table: PageTable,
    pub ptr: usize, // Base address of the page table's frame
    pub data: VecDeque<String>,
    pub terminated: bool,
    pub context: Context,
}

impl Pcb {
    pub fn new(pid: u32, ttl: u32, tll: u32, ptr: usize, data: VecDeque<String>) -> Self {
        Pcb {
            pid,
            ttl,
            tll,
            ttc: 0,
            llc: 0,
            page_table: PageTable::new(),
            ptr,
            data,
            terminated: false,
            context: Context::default(),
        }
    }

    pub fn pt_frame(&self) -> usize {
        self.ptr / PAGE_SIZE
    }

    // Every frame this process holds, its page table's included.
    pub fn frames(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.pt_frame()).chain(self.page_table.valid_frames())
    }

    pub fn save_context(&mut self, cpu: &CpuState) {
        self.context.state = RunState::Blocked;
        self.context.ic = Some(cpu.ic);
        self.context.r = cpu.r;
        self.context.c = cpu.c;
        self.context.sp = 0;
        self.context.status = 0;
    }

    pub fn restore_context(&mut self, cpu: &mut CpuState) {
        self.context.state = RunState::Running;
        cpu.ic = self.context.ic.unwrap_or(0);
        cpu.r = self.context.r;
        cpu.c = self.context.c;
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum TermCode {
    Normal = 0,
    OutOfData,
    LineLimit,
    TimeLimit,
    OpCodeError,
    OperandError,
    InvalidPage,
}

impl TermCode {
    pub fn message(self) -> &'static str {
        match self {
            TermCode::Normal => "Normal termination",
            TermCode::OutOfData => "Out of data",
            TermCode::LineLimit => "Line limit exceeded",
            TermCode::TimeLimit => "Time limit exceeded",
            TermCode::OpCodeError => "Invalid operation code",
            TermCode::OperandError => "Invalid operand",
            TermCode::InvalidPage => "Invalid page access",
        }
    }
}

impl fmt::Display for TermCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    pub pid: u32,
    pub code: TermCode,
    pub ttc: u32,
    pub llc: u32,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n\nProcess {} terminated: {}\nTTC: {}, LLC: {}",
            self.pid, self.code, self.ttc, self.llc
        )
    }
}
