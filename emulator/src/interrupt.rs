use common::constants::NUM_INTERRUPTS;

use derive_more::IsVariant;
use num_derive::{FromPrimitive, ToPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramInterrupt {
    OpCodeError,
    OperandError,
    PageFault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    Read,
    Write,
    Terminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum InterruptKind {
    Timer,
    Program(ProgramInterrupt),
    Syscall(Syscall),
}

// Higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
pub enum Priority {
    Syscall = 0,
    Program = 1,
    PageFault = 2,
    Timer = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    TimeLimit,
    OpCodeError,
    OperandError,
    PageFault,
    Read,
    Write,
    Terminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    pub kind: InterruptKind,
    pub prio: Priority,
    pub handler: Handler,
}

impl Vector {
    pub const fn new(kind: InterruptKind, prio: Priority, handler: Handler) -> Self {
        Vector { kind, prio, handler }
    }
}

////////////////////////////////////////////////////////////////////////////////

// One slot per category. Each holds at most one pending subtype.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Latches {
    pub timer: bool,
    pub program: Option<ProgramInterrupt>,
    pub syscall: Option<Syscall>,
}

impl Latches {
    pub fn any(&self) -> bool {
        self.timer || self.program.is_some() || self.syscall.is_some()
    }

    // Clears the whole category `kind` belongs to.
    pub fn clear(&mut self, kind: InterruptKind) {
        match kind {
            InterruptKind::Timer => self.timer = false,
            InterruptKind::Program(_) => self.program = None,
            InterruptKind::Syscall(_) => self.syscall = None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

pub struct InterruptTable {
    vectors: Vec<Vector>,
}

impl InterruptTable {
    const STANDARD: [Vector; 7] = [
        Vector::new(InterruptKind::Timer, Priority::Timer, Handler::TimeLimit),
        Vector::new(
            InterruptKind::Program(ProgramInterrupt::OpCodeError),
            Priority::Program,
            Handler::OpCodeError,
        ),
        Vector::new(
            InterruptKind::Program(ProgramInterrupt::OperandError),
            Priority::Program,
            Handler::OperandError,
        ),
        Vector::new(
            InterruptKind::Program(ProgramInterrupt::PageFault),
            Priority::PageFault,
            Handler::PageFault,
        ),
        Vector::new(InterruptKind::Syscall(Syscall::Read), Priority::Syscall, Handler::Read),
        Vector::new(InterruptKind::Syscall(Syscall::Write), Priority::Syscall, Handler::Write),
        Vector::new(
            InterruptKind::Syscall(Syscall::Terminate),
            Priority::Syscall,
            Handler::Terminate,
        ),
    ];

    pub fn new() -> Self {
        Self::from_vectors(Self::STANDARD.to_vec())
    }

    pub fn from_vectors(vectors: Vec<Vector>) -> Self {
        assert!(vectors.len() <= NUM_INTERRUPTS, "Too many interrupt vectors");
        InterruptTable { vectors }
    }

    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }

    // Picks the single vector to service this cycle. The timer is checked
    // first, then the latched program interrupt, then the latched syscall; a
    // later candidate only displaces the current one with strictly higher
    // priority, so ties go to whichever was found first.
    pub fn arbitrate(&self, latches: &Latches) -> Option<Vector> {
        let mut best = None;
        if latches.timer {
            best = self.vectors.iter().find(|v| v.kind == InterruptKind::Timer);
        }
        if let Some(pi) = latches.program {
            best = self.pick(best, InterruptKind::Program(pi));
        }
        if let Some(si) = latches.syscall {
            best = self.pick(best, InterruptKind::Syscall(si));
        }
        best.copied()
    }

    fn pick<'a>(&'a self, mut best: Option<&'a Vector>, kind: InterruptKind) -> Option<&'a Vector> {
        for vector in self.vectors.iter().filter(|v| v.kind == kind) {
            if best.is_none_or(|b| vector.prio > b.prio) {
                best = Some(vector);
            }
        }
        best
    }
}

impl Default for InterruptTable {
    fn default() -> Self {
        Self::new()
    }
}
