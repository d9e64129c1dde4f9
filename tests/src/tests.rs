#![cfg(test)]

mod deck;
mod faults;
mod io;
mod memory;
mod scenarios;
mod scheduling;

use common::job::Job;
use emu_lib::Emulator;
use emu_lib::io::PipePrinter;
use loader::parse_deck;

use std::sync::Arc;

pub fn emulator() -> (Emulator, Arc<PipePrinter>) {
    let pipe = Arc::new(PipePrinter::default());
    (Emulator::with_printer(pipe.clone()), pipe)
}

pub fn job(pid: u32, ttl: u32, tll: u32, program: &[&str]) -> Job {
    Job::new(pid, ttl, tll).with_program(program.iter().copied())
}

pub fn header(pid: u32, ttl: u32, tll: u32) -> String {
    format!("$AMJ{pid:04}{ttl:04}{tll:04}")
}

// Loads every job on the deck, runs to completion, and returns the printer
// output.
pub fn run_deck(deck: &str) -> (Emulator, String) {
    let (mut emu, pipe) = emulator();
    for job in parse_deck(deck).unwrap() {
        emu.admit(job).unwrap();
    }
    emu.run();
    let out = pipe.take();
    (emu, out)
}

pub fn run_jobs(jobs: impl IntoIterator<Item = Job>) -> (Emulator, String) {
    let (mut emu, pipe) = emulator();
    for job in jobs {
        emu.admit(job).unwrap();
    }
    emu.run();
    let out = pipe.take();
    (emu, out)
}

pub fn term_block(pid: u32, msg: &str, ttc: u32, llc: u32) -> String {
    format!("\n\nProcess {pid} terminated: {msg}\nTTC: {ttc}, LLC: {llc}\n")
}
