use crate::emulator_state::CpuState;
use crate::process::{Pcb, RunState};

use std::collections::VecDeque;

use log::debug;

// FIFO ready queue plus the slot for the process on the CPU. Owns every live
// PCB.
#[derive(Default)]
pub struct Scheduler {
    ready: VecDeque<Pcb>,
    current: Option<Pcb>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, mut pcb: Pcb) {
        pcb.context.state = RunState::Ready;
        self.ready.push_back(pcb);
    }

    pub fn current(&self) -> Option<&Pcb> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Pcb> {
        self.current.as_mut()
    }

    pub fn current_pid(&self) -> Option<u32> {
        self.current.as_ref().map(|pcb| pcb.pid)
    }

    pub fn take_current(&mut self) -> Option<Pcb> {
        self.current.take()
    }

    pub fn ready_pids(&self) -> Vec<u32> {
        self.ready.iter().map(|pcb| pcb.pid).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.ready.is_empty()
    }

    // Current first, then the ready queue in order.
    pub fn processes(&self) -> impl Iterator<Item = &Pcb> {
        self.current.iter().chain(self.ready.iter())
    }

    // Moves the head of the ready queue onto the (empty) CPU.
    pub fn dispatch(&mut self, cpu: &mut CpuState) -> bool {
        assert!(self.current.is_none(), "Dispatch with a process still current");
        let Some(mut pcb) = self.ready.pop_front() else {
            return false;
        };
        pcb.restore_context(cpu);
        debug!("Dispatched process {} at IC {}", pcb.pid, cpu.ic);
        self.current = Some(pcb);
        true
    }

    // Sends the current process to the back of the queue and dispatches the
    // head. Does nothing if nobody else is waiting.
    pub fn preempt(&mut self, cpu: &mut CpuState) -> bool {
        if self.ready.is_empty() {
            return false;
        }
        let Some(mut pcb) = self.current.take() else {
            return false;
        };
        pcb.save_context(cpu);
        pcb.context.state = RunState::Ready;
        debug!("Preempted process {} at IC {}", pcb.pid, cpu.ic);
        self.ready.push_back(pcb);
        self.dispatch(cpu)
    }

    pub fn drain(&mut self) -> Vec<Pcb> {
        self.current.take().into_iter().chain(self.ready.drain(..)).collect()
    }
}
