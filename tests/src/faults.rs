use crate::{job, run_jobs, term_block};

use emu_lib::TermCode;

fn code_of(program: &[&str]) -> (TermCode, u32) {
    let (emu, _) = run_jobs([job(1, 100, 5, program)]);
    let rec = emu.terminations()[0];
    (rec.code, rec.ttc)
}

#[test]
fn operand_errors() {
    assert_eq!(code_of(&["LRxx"]), (TermCode::OperandError, 1));
    assert_eq!(code_of(&["LR-1"]), (TermCode::OperandError, 1));
    assert_eq!(code_of(&["GD1x"]), (TermCode::OperandError, 1));
    assert_eq!(code_of(&["BT?"]), (TermCode::OperandError, 1));
}

#[test]
fn opcode_errors() {
    assert_eq!(code_of(&["XX10"]), (TermCode::OpCodeError, 1));
    assert_eq!(code_of(&["PD"]), (TermCode::OpCodeError, 1));
    assert_eq!(code_of(&["Q"]), (TermCode::OpCodeError, 1));
    assert_eq!(code_of(&["lr10"]), (TermCode::OpCodeError, 1));
}

#[test]
fn page_faults() {
    assert_eq!(code_of(&["LR50"]), (TermCode::InvalidPage, 1));
    assert_eq!(code_of(&["SR99"]), (TermCode::InvalidPage, 1));
    assert_eq!(code_of(&["CR05", "BT30"]), (TermCode::InvalidPage, 2));
}

#[test]
fn falling_off_the_page() {
    // Two cards per page: the word after the second is empty.
    assert_eq!(code_of(&["CR05", "CR05", "H"]), (TermCode::OpCodeError, 2));
}

#[test]
fn failed_write_prints_nothing() {
    let (emu, out) = run_jobs([job(1, 10, 1, &["PD50"])]);
    assert_eq!(out, term_block(1, "Invalid page access", 1, 0));
    assert_eq!(emu.terminations()[0].llc, 0);
}

#[test]
fn faults_stay_with_their_process() {
    let jobs = [
        job(1, 10, 1, &["LR50"]),
        job(2, 10, 1, &["XX00"]),
        job(3, 10, 1, &["PD00", "H"]),
    ];
    let (emu, out) = run_jobs(jobs);
    let codes: Vec<(u32, TermCode)> = emu.terminations().iter().map(|t| (t.pid, t.code)).collect();
    assert_eq!(
        codes,
        vec![(1, TermCode::InvalidPage), (2, TermCode::OpCodeError), (3, TermCode::Normal)]
    );
    assert!(out.ends_with(&format!("PD00\n{}", term_block(3, "Normal termination", 2, 1))));
}
