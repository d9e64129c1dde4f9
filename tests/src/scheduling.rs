use crate::{emulator, job, run_jobs};

use common::constants::TIME_SLICE;
use common::job::Job;
use emu_lib::{ExecRet, HaltReason, TermCode, Termination};

fn spinner(pid: u32, ttl: u32) -> Job {
    job(pid, ttl, 1, &["CR05", "BT00"])
}

fn summary(terms: &[Termination]) -> Vec<(u32, TermCode, u32)> {
    terms.iter().map(|t| (t.pid, t.code, t.ttc)).collect()
}

#[test]
fn round_robin() {
    let (emu, _) = run_jobs([spinner(1, 25), spinner(2, 25)]);
    assert_eq!(
        summary(emu.terminations()),
        vec![(1, TermCode::TimeLimit, 25), (2, TermCode::TimeLimit, 25)]
    );
    assert_eq!(emu.cycles(), 50);
}

#[test]
fn no_process_hogs_the_cpu() {
    let (mut emu, _) = emulator();
    for (pid, ttl) in [(1, 15), (2, 35), (3, 25)] {
        emu.admit(spinner(pid, ttl)).unwrap();
    }

    let mut last = None;
    let mut streak = 0;
    loop {
        let contended = !emu.ready_pids().is_empty();
        let pid = emu.current_pid().or_else(|| emu.ready_pids().first().copied());
        if let ExecRet::Halt(halt) = emu.run_ins() {
            assert_eq!(halt, HaltReason::Idle);
            break;
        }

        streak = if pid == last { streak + 1 } else { 1 };
        last = pid;
        if contended {
            assert!(streak <= TIME_SLICE, "pid {pid:?} ran {streak} cycles in a row");
        }
    }
    assert_eq!(emu.cycles(), 75);
    assert!(emu.terminations().iter().all(|t| t.code == TermCode::TimeLimit));
}

#[test]
fn preempted_process_goes_to_the_back() {
    let (mut emu, _) = emulator();
    for pid in 1..=3 {
        emu.admit(spinner(pid, 100)).unwrap();
    }
    for _ in 0..TIME_SLICE - 1 {
        assert!(emu.run_ins().is_ok());
    }
    assert_eq!(emu.current_pid(), Some(1));
    assert_eq!(emu.ready_pids(), vec![2, 3]);

    assert!(emu.run_ins().is_preempted());
    assert_eq!(emu.current_pid(), Some(2));
    assert_eq!(emu.ready_pids(), vec![3, 1]);
}

#[test]
fn lone_process_keeps_running() {
    let (mut emu, _) = emulator();
    emu.admit(spinner(1, 100)).unwrap();
    for _ in 0..3 * TIME_SLICE {
        assert!(emu.run_ins().is_ok());
    }
    assert_eq!(emu.current_pid(), Some(1));
}

#[test]
fn slices_follow_the_global_clock() {
    // Job 2 inherits the rest of job 1's slice, not a fresh one.
    let jobs = [job(1, 10, 1, &["H"]), spinner(2, 15), spinner(3, 15)];
    let (emu, _) = run_jobs(jobs);
    assert_eq!(
        summary(emu.terminations()),
        vec![
            (1, TermCode::Normal, 1),
            (2, TermCode::TimeLimit, 15),
            (3, TermCode::TimeLimit, 15),
        ]
    );
    assert_eq!(emu.cycles(), 31);
}

#[test]
fn registers_survive_a_switch() {
    // Job 1 leaves "LR10" in R; job 2 only loops while R stays blank.
    // page 0: CR05 BT10 | page 1: LR10 BT10
    let jobs = [
        job(1, 30, 1, &["CR05", "BT10", "LR10", "BT10"]),
        spinner(2, 30),
    ];
    let (emu, _) = run_jobs(jobs);
    assert_eq!(
        summary(emu.terminations()),
        vec![(1, TermCode::TimeLimit, 30), (2, TermCode::TimeLimit, 30)]
    );
    assert_eq!(emu.cycles(), 60);
}

#[test]
fn cycle_ceiling() {
    let (mut emu, pipe) = emulator();
    emu.admit(spinner(1, u32::MAX)).unwrap();
    let report = emu.run();

    assert_eq!(report.halt, HaltReason::CycleCeiling);
    assert_eq!(report.cycles, common::constants::MAX_CYCLES);
    assert!(emu.terminations().is_empty());
    assert!(pipe.is_empty());

    emu.shutdown();
    assert_eq!(emu.memory().free_frames(), common::constants::FRAME_COUNT);
}
