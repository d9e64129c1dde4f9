use crate::{emulator, job};

use common::constants::FRAME_COUNT;
use emu_lib::paging::translate;
use emu_lib::{EngineError, ExecRet};

use std::collections::{BTreeMap, HashSet};

fn held_frames(emu: &emu_lib::Emulator) -> Vec<usize> {
    emu.processes().flat_map(|pcb| pcb.frames()).collect()
}

#[test]
fn frames_are_exclusive() {
    let (mut emu, _) = emulator();
    emu.admit(job(1, 50, 1, &["CR05", "BT00", "H"])).unwrap();
    emu.admit(job(2, 50, 1, &["CR05", "BT00"])).unwrap();
    emu.admit(job(3, 50, 1, &["H"; 5])).unwrap();

    let frames = held_frames(&emu);
    assert_eq!(frames.len(), 3 + 2 + 4);
    assert_eq!(frames.iter().collect::<HashSet<_>>().len(), frames.len());
    assert!(frames.iter().all(|f| emu.memory().is_allocated(*f)));
    assert_eq!(emu.memory().free_frames(), FRAME_COUNT - frames.len());
}

#[test]
fn frames_come_back_zeroed() {
    let (mut emu, _) = emulator();
    emu.admit(job(1, 50, 1, &["LR00", "GD05"]).with_data(["data"])).unwrap();
    emu.admit(job(2, 50, 1, &["CR05", "BT00"])).unwrap();
    let first: Vec<usize> = emu.processes().next().unwrap().frames().collect();

    // LR, then GD ends job 1.
    assert!(emu.run_ins().is_ok());
    assert!(emu.run_ins().is_terminated());
    assert_eq!(emu.current_pid(), Some(2));

    for frame in &first {
        assert!(!emu.memory().is_allocated(*frame));
        assert!(!emu.memory().is_locked(*frame));
        assert!(emu.memory().is_frame_zeroed(*frame));
    }
    assert_eq!(emu.memory().free_frames(), FRAME_COUNT - 2);

    emu.run();
    assert_eq!(emu.memory().free_frames(), FRAME_COUNT);
    assert!((0..FRAME_COUNT).all(|f| emu.memory().is_frame_zeroed(f)));
}

fn mappings(emu: &emu_lib::Emulator) -> BTreeMap<u32, Vec<usize>> {
    emu.processes()
        .map(|pcb| {
            let ras = (0..20).filter_map(|va| translate(&pcb.page_table, va).ok());
            (pcb.pid, ras.collect())
        })
        .collect()
}

#[test]
fn mappings_are_stable() {
    let (mut emu, _) = emulator();
    emu.admit(job(1, 50, 1, &["CR05", "BT00"])).unwrap();
    // page 0: CR05 BT10 | page 1: SR06 BT00
    emu.admit(job(2, 60, 1, &["CR05", "BT10", "SR06", "BT00"])).unwrap();

    let before = mappings(&emu);
    assert_eq!(before[&1].len(), 10);
    assert_eq!(before[&2].len(), 20);
    for _ in 0..35 {
        assert!(!emu.run_ins().is_halt());
    }
    // Both have been switched out and back in by now.
    assert_eq!(emu.current_pid(), Some(2));
    assert_eq!(emu.ready_pids(), vec![1]);
    assert!(emu.terminations().is_empty());
    assert_eq!(mappings(&emu), before);
}

#[test]
fn admission_out_of_frames() {
    let (mut emu, _) = emulator();
    for pid in 1..=3 {
        emu.admit(job(pid, 10, 1, &["H"; 4])).unwrap(); // 3 frames each
    }
    let err = emu.admit(job(4, 10, 1, &["H"; 4])).unwrap_err();
    assert!(matches!(err, EngineError::OutOfFrames { pid: 4, needed: 3, free: 1 }));
    assert_eq!(err.to_string(), "Out of frames admitting job 4: needs 3, 1 free");

    // Whatever was admitted still runs.
    assert_eq!(emu.memory().free_frames(), 1);
    while emu.run_ins() != ExecRet::Halt(emu_lib::HaltReason::Idle) {}
    assert_eq!(emu.terminations().len(), 3);
    assert_eq!(emu.memory().free_frames(), FRAME_COUNT);
}
