use common::asm::Ins;
use common::constants::*;
use common::decoder::decode;
use common::job::Job;
use common::mem::{Word, is_blank, str_to_word, to_word, word_to_string};

use crate::emulator_state::{CpuState, EmulatorState};
use crate::interrupt::{Handler, InterruptTable, ProgramInterrupt, Syscall};
use crate::io::{Printer, StdoutPrinter};
use crate::memory::Memory;
use crate::paging::translate;
use crate::process::{Pcb, RunState, TermCode, Termination};
use crate::scheduler::Scheduler;

use std::sync::Arc;

use delegate::delegate;
use derive_more::IsVariant;
use log::{debug, error, info, trace, warn};
use num_traits::ToPrimitive;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Out of frames admitting job {pid}: needs {needed}, {free} free")]
    OutOfFrames { pid: u32, needed: usize, free: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    Idle,         // Nothing left to run
    CycleCeiling, // MAX_CYCLES reached
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum ExecRet {
    Ok,
    Preempted,
    Terminated,
    Halt(HaltReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub cycles: u64,
    pub halt: HaltReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadOutcome {
    Done,
    OutOfData,
    Faulted,
}


pub struct Emulator {
    state: EmulatorState,
    ivt: InterruptTable,
    sched: Scheduler,
    printer: Arc<dyn Printer>,
    terminations: Vec<Termination>,
    running: bool,
}

impl Emulator {
    pub fn new() -> Emulator {
        Self::with_printer(Arc::new(StdoutPrinter))
    }

    pub fn with_printer(printer: Arc<dyn Printer>) -> Emulator {
        Emulator {
            state: EmulatorState::new(),
            ivt: InterruptTable::new(),
            sched: Scheduler::new(),
            printer,
            terminations: vec![],
            running: false,
        }
    }

    delegate! {
        to self.state {
            pub fn cpu(&self) -> &CpuState;
            pub fn memory(&self) -> &Memory;
            pub fn cycles(&self) -> u64;
        }

        to self.sched {
            pub fn current_pid(&self) -> Option<u32>;
            pub fn ready_pids(&self) -> Vec<u32>;
        }
    }

    pub fn processes(&self) -> impl Iterator<Item = &Pcb> {
        self.sched.processes()
    }

    pub fn terminations(&self) -> &[Termination] {
        &self.terminations
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // Gives the job a page table frame and enough frames for its program,
    // then queues it. Cards are packed INS_PER_PAGE to a page.
    pub fn admit(&mut self, job: Job) -> Result<u32, EngineError> {
        let pid = job.pid;
        let pages = job.program.len().div_ceil(INS_PER_PAGE).min(FRAME_COUNT);
        let needed = pages + 1;

        let Some(pt_frame) = self.state.mem.allocate_frame() else {
            return Err(self.out_of_frames(pid, needed));
        };
        self.state.mem.lock_frame(pt_frame);
        let mut pcb = Pcb::new(pid, job.ttl, job.tll, pt_frame * PAGE_SIZE, job.data);
        debug!("Job {pid}: page table in frame {pt_frame}");

        for (page, cards) in job.program.chunks(INS_PER_PAGE).take(FRAME_COUNT).enumerate() {
            let Some(frame) = self.state.mem.allocate_frame() else {
                self.reclaim(&mut pcb);
                return Err(self.out_of_frames(pid, needed));
            };
            self.state.mem.clear_frame(frame);
            pcb.page_table.map(page, frame);
            for (offset, card) in cards.iter().enumerate() {
                self.state.mem.write_word(frame * PAGE_SIZE + offset, str_to_word(card));
            }
            debug!("Job {pid}: page {page} in frame {frame}");
        }

        info!("Admitted job {pid} (TTL {}, TLL {}, {pages} pages)", pcb.ttl, pcb.tll);
        self.sched.admit(pcb);
        self.running = true;
        Ok(pid)
    }

    fn out_of_frames(&self, pid: u32, needed: usize) -> EngineError {
        EngineError::OutOfFrames {
            pid,
            needed,
            free: self.state.mem.free_frames(),
        }
    }

    // Run until nothing is left to run or the cycle ceiling is hit.
    pub fn run(&mut self) -> RunReport {
        loop {
            if let ExecRet::Halt(halt) = self.run_ins() {
                return RunReport {
                    cycles: self.state.cycles(),
                    halt,
                };
            }
        }
    }

    // Run a single instruction cycle, dispatching a process first if the CPU
    // is empty.
    pub fn run_ins(&mut self) -> ExecRet {
        if !self.running {
            return ExecRet::Halt(HaltReason::Idle);
        }
        if self.state.cycles() >= MAX_CYCLES {
            warn!("System halted: maximum of {MAX_CYCLES} cycles reached");
            return ExecRet::Halt(HaltReason::CycleCeiling);
        }
        if self.sched.current().is_none() && !self.sched.dispatch(&mut self.state.cpu) {
            debug!("No more processes to execute");
            self.running = false;
            return ExecRet::Halt(HaltReason::Idle);
        }
        self.cycle()
    }

    // Releases everything still resident without reporting on it.
    pub fn shutdown(&mut self) {
        for mut pcb in self.sched.drain() {
            debug!("Shutdown: discarding process {}", pcb.pid);
            self.reclaim(&mut pcb);
        }
        self.state.cpu.reset();
        self.running = false;
    }


    ///////////////////////////////////////////////////////////////////////////
    // Instruction cycle
    ///////////////////////////////////////////////////////////////////////////

    fn cycle(&mut self) -> ExecRet {
        let Some(pcb) = self.sched.current() else {
            panic!("Instruction cycle with no current process");
        };
        let pid = pcb.pid;
        if pcb.ttc >= pcb.ttl {
            debug!("Process {pid} has no time left");
            self.terminate(TermCode::TimeLimit);
            return ExecRet::Terminated;
        }
        let done = self.terminations.len();

        // A failed fetch leaves a program interrupt latched and skips straight
        // to servicing it.
        if let Some(word) = self.fetch() {
            let ic = self.state.cpu.ic;
            self.state.cpu.ir = word;
            self.state.cpu.ic += 1;

            match decode(&word) {
                Ok(ins) => {
                    debug!("PID {pid} IC {ic}: {ins}");
                    self.exec(ins);
                }
                Err(e) => {
                    debug!("PID {pid} IC {ic}: {e}");
                    let pi = if e.is_bad_operand() {
                        ProgramInterrupt::OperandError
                    } else {
                        ProgramInterrupt::OpCodeError
                    };
                    self.latch_program(pi);
                }
            }
            self.tick();
        }

        if self.state.cpu.latches.any() {
            self.handle_interrupts();
            if self.terminations.len() != done {
                return ExecRet::Terminated;
            }
        }

        // The timer only fires when nothing else ended the process on its
        // last cycle.
        if self.sched.current().is_some_and(|pcb| pcb.ttc >= pcb.ttl) {
            trace!("Process {pid}: TTC reached TTL");
            self.state.cpu.latches.timer = true;
            self.handle_interrupts();
            return ExecRet::Terminated;
        }

        if self.state.cycles() % TIME_SLICE == 0 && self.sched.preempt(&mut self.state.cpu) {
            debug!("Time slice expired, process {pid} -> {:?}", self.sched.current_pid());
            return ExecRet::Preempted;
        }
        ExecRet::Ok
    }

    fn fetch(&mut self) -> Option<Word> {
        let ic = self.state.cpu.ic;
        let ra = self.address_map(ic as i64)?;
        let word = self.state.mem.read_word(ra);
        if is_blank(&word) {
            debug!("Empty instruction at IC {ic} (RA {ra})");
            self.latch_program(ProgramInterrupt::OpCodeError);
            return None;
        }
        Some(word)
    }

    fn tick(&mut self) {
        let Some(pcb) = self.sched.current_mut() else {
            panic!("Tick with no current process");
        };
        pcb.ttc += 1;
        self.state.inc_cycles();
    }

    fn exec(&mut self, ins: Ins) {
        match ins {
            Ins::Read(addr) => {
                // The read lands wherever GD says; translation happens word by
                // word as the card is copied in.
                self.state.cpu.io_va = addr;
                self.latch_syscall(Syscall::Read);
            }
            Ins::Write(addr) => {
                if let Some(ra) = self.address_map(addr) {
                    self.state.cpu.ra = ra;
                    self.latch_syscall(Syscall::Write);
                }
            }
            Ins::Halt => self.latch_syscall(Syscall::Terminate),
            Ins::Load(addr) => {
                if let Some(ra) = self.address_map(addr) {
                    self.state.cpu.r = self.state.mem.read_word(ra);
                }
            }
            Ins::Store(addr) => {
                if let Some(ra) = self.address_map(addr) {
                    self.state.mem.write_word(ra, self.state.cpu.r);
                }
            }
            Ins::Compare(addr) => {
                if let Some(ra) = self.address_map(addr) {
                    self.state.cpu.c = self.state.cpu.r == self.state.mem.read_word(ra);
                }
            }
            Ins::BranchTrue(addr) => {
                if self.address_map(addr).is_some() && self.state.cpu.c {
                    self.state.cpu.ic = addr as usize;
                }
            }
        }
    }

    // Latches the fault on failure; the caller just stops.
    fn address_map(&mut self, va: i64) -> Option<usize> {
        let Some(pcb) = self.sched.current() else {
            panic!("Address translation with no current process");
        };
        let res = translate(&pcb.page_table, va);
        match res {
            Ok(ra) => {
                trace!("VA {va} -> RA {ra}");
                Some(ra)
            }
            Err(pi) => {
                debug!("Translating VA {va}: {pi:?}");
                self.latch_program(pi);
                None
            }
        }
    }

    fn latch_program(&mut self, pi: ProgramInterrupt) {
        trace!("Latching {pi:?}");
        self.state.cpu.latches.program = Some(pi);
    }

    fn latch_syscall(&mut self, si: Syscall) {
        trace!("Latching {si:?}");
        self.state.cpu.latches.syscall = Some(si);
    }


    ///////////////////////////////////////////////////////////////////////////
    // Interrupts
    ///////////////////////////////////////////////////////////////////////////

    // Services pending latches one at a time, highest priority first, until
    // none are left or the process is gone.
    fn handle_interrupts(&mut self) {
        let done = self.terminations.len();
        while self.state.cpu.latches.any() {
            let Some(vector) = self.ivt.arbitrate(&self.state.cpu.latches) else {
                break;
            };
            debug!(
                "Interrupt {:?} (priority {}) -> {:?}",
                vector.kind,
                vector.prio.to_u8().unwrap_or_default(),
                vector.handler
            );

            self.save_context();
            self.service(vector.handler);
            self.state.cpu.latches.clear(vector.kind);
            self.restore_context();

            if self.terminations.len() != done {
                break;
            }
        }
    }

    fn save_context(&mut self) {
        if let Some(pcb) = self.sched.current_mut() {
            pcb.save_context(&self.state.cpu);
        }
    }

    fn restore_context(&mut self) {
        if let Some(pcb) = self.sched.current_mut() {
            pcb.restore_context(&mut self.state.cpu);
        }
    }

    fn service(&mut self, handler: Handler) {
        match handler {
            Handler::TimeLimit => self.terminate(TermCode::TimeLimit),
            Handler::OpCodeError => self.terminate(TermCode::OpCodeError),
            Handler::OperandError => self.terminate(TermCode::OperandError),
            Handler::PageFault => self.terminate(TermCode::InvalidPage),
            Handler::Read => self.service_read(),
            Handler::Write => self.service_write(),
            Handler::Terminate => self.terminate(TermCode::Normal),
        }
    }

    // GD consumes one card and ends the job.
    fn service_read(&mut self) {
        match self.read_card() {
            ReadOutcome::Done => self.terminate(TermCode::Normal),
            ReadOutcome::OutOfData => self.terminate(TermCode::OutOfData),
            ReadOutcome::Faulted => (),
        }
    }

    fn read_card(&mut self) -> ReadOutcome {
        let Some(pcb) = self.sched.current_mut() else {
            panic!("Read with no current process");
        };
        let Some(card) = pcb.data.pop_front() else {
            debug!("Process {}: no more data cards", pcb.pid);
            return ReadOutcome::OutOfData;
        };
        debug!("Process {} reading {card:?}", pcb.pid);

        for (idx, chunk) in card.as_bytes().chunks(WORD_SIZE).enumerate() {
            let va = self.state.cpu.io_va + idx as i64;
            let Some(ra) = self.address_map(va) else {
                return ReadOutcome::Faulted;
            };
            self.state.mem.write_word(ra, to_word(chunk));
        }
        ReadOutcome::Done
    }

    fn service_write(&mut self) {
        let Some(pcb) = self.sched.current_mut() else {
            panic!("Write with no current process");
        };
        pcb.llc += 1;
        if pcb.llc > pcb.tll {
            debug!("Process {}: line limit exceeded ({}/{})", pcb.pid, pcb.llc, pcb.tll);
            self.terminate(TermCode::LineLimit);
            return;
        }

        let line = word_to_string(&self.state.mem.read_word(self.state.cpu.ra));
        self.print(&line);
    }

    fn print(&self, line: &str) {
        if let Err(e) = self.printer.print(line) {
            error!("Printer: {e}");
        }
    }


    ///////////////////////////////////////////////////////////////////////////
    // Termination
    ///////////////////////////////////////////////////////////////////////////

    fn terminate(&mut self, code: TermCode) {
        let Some(mut pcb) = self.sched.take_current() else {
            return;
        };

        let record = Termination {
            pid: pcb.pid,
            code,
            ttc: pcb.ttc,
            llc: pcb.llc,
        };
        info!("Process {} terminated: {code} (TTC {}, LLC {})", pcb.pid, pcb.ttc, pcb.llc);
        self.print(&record.to_string());

        self.reclaim(&mut pcb);
        self.state.cpu.reset();
        pcb.data.clear();
        pcb.terminated = true;
        pcb.context.state = RunState::Terminated;
        self.terminations.push(record);

        if let Err(e) = self.printer.flush() {
            error!("Printer: {e}");
        }

        if !self.sched.dispatch(&mut self.state.cpu) {
            debug!("No more processes in ready queue");
            self.running = false;
        }
        drop(pcb);
    }

    // Frees the page table's frame and every mapped frame.
    fn reclaim(&mut self, pcb: &mut Pcb) {
        self.state.mem.release_frame(pcb.pt_frame());
        for frame in pcb.page_table.invalidate_all() {
            self.state.mem.release_frame(frame);
        }
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
