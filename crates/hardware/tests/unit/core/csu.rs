//! Central schedule unit: issue, commit, stalls and flush, observed through the
//! whole core.

use pretty_assertions::assert_eq;
use tomasulo_core::SimError;
use tomasulo_core::common::constants::ROB_SIZE;
use tomasulo_core::config::{BranchPrediction, Config};
use tomasulo_core::core::bus::StallCause;
use tomasulo_core::isa::HALT_WORD;

use crate::common::harness::TEST_CYCLE_CAP;
use crate::common::{TestContext, exit_with, inst, programs};

#[test]
fn test_store_load_program() {
    let (words, code) = programs::store_load();
    let mut ctx = TestContext::new(&words);
    assert_eq!(ctx.run(), code);
    assert_eq!(ctx.get_reg(3), 12);
    assert_eq!(ctx.get_reg(4), 12);
    assert_eq!(ctx.read_word(0), 12);
    assert_eq!(ctx.sim.stats().instructions_retired, 7);
}

#[test]
fn test_issue_reaches_rs_and_regfile_one_tick_later() {
    let mut ctx = TestContext::new(&[inst().addi(1, 0, 5).build(), HALT_WORD]);
    ctx.tick();
    let issued = ctx.cpu().csu().outputs().issue.unwrap();
    assert_eq!(issued.pc, 0);
    assert_eq!(ctx.cpu().rs().outputs().free_slots, 32);

    ctx.tick();
    assert_eq!(ctx.cpu().rs().outputs().free_slots, 31);
    let read = ctx.cpu().regfile().outputs().read.unwrap();
    assert_eq!(read.rob, issued.rob);
    assert_eq!(ctx.cpu().regfile().state().producer(1), Some(issued.rob));
}

#[test]
fn test_commits_retire_rob_slots_in_order() {
    let (words, code) = programs::fibonacci();
    let mut ctx = TestContext::new(&words);
    let mut expected_slot = 0u8;
    while ctx.cpu().halt_code().is_none() {
        ctx.tick();
        let out = ctx.cpu().csu().outputs();
        if let Some(c) = out.commit {
            assert_eq!(c.rob.0, expected_slot);
            expected_slot = (expected_slot + 1) % ROB_SIZE as u8;
        }
        if out.flush {
            expected_slot = 0;
        }
        assert!(ctx.sim.cycles() < TEST_CYCLE_CAP, "no halt");
    }
    assert_eq!(ctx.cpu().halt_code(), Some(code));

    let (_, interp) = ctx.reference();
    assert_eq!(ctx.sim.stats().instructions_retired, interp.retired());
}

#[test]
fn test_rob_full_stall_matches_occupancy() {
    let mut words: Vec<u32> = (0..64).map(|_| inst().lw(1, 0, 0x200).build()).collect();
    words.extend(exit_with(1));
    let mut ctx = TestContext::new(&words);

    let mut full_stalls = 0u64;
    while ctx.cpu().halt_code().is_none() {
        let occupancy = ctx.cpu().csu().rob().len();
        ctx.tick();
        let stall = ctx.cpu().csu().outputs().stall;
        if stall == Some(StallCause::RobFull) {
            assert_eq!(occupancy, ROB_SIZE, "stalled below capacity at cycle {}", ctx.sim.cycles());
            full_stalls += 1;
        } else if occupancy == ROB_SIZE {
            assert_eq!(stall, Some(StallCause::Halted), "issued into a full rob at cycle {}", ctx.sim.cycles());
        }
        assert!(ctx.cpu().csu().rob().len() <= ROB_SIZE);
        assert!(ctx.sim.cycles() < TEST_CYCLE_CAP, "no halt");
    }
    assert!(full_stalls > 0);
    assert_eq!(ctx.sim.stats().stalls_rob_full, full_stalls);
    assert_eq!(ctx.sim.stats().inst_load, 64);
}

#[test]
fn test_mispredicted_branch_flushes_everything() {
    // The branch waits on a load, so the wrong-path store can reach memory first.
    let mut words = vec![
        inst().addi(1, 0, 1).build(),     // 0
        inst().lw(2, 0, 0x80).build(),    // 4
        inst().beq(2, 0, 16).build(),     // 8: taken, predicted not taken
        inst().sw(0, 1, 0x40).build(),    // 12: wrong path
        inst().addi(5, 0, 99).build(),    // 16: wrong path
        inst().addi(5, 5, 1).build(),     // 20: wrong path
        inst().addi(6, 0, 7).build(),     // 24
    ];
    words.extend(exit_with(6));
    let mut ctx = TestContext::new(&words);

    while !ctx.cpu().csu().outputs().flush {
        ctx.tick();
        assert!(ctx.sim.cycles() < 1_000, "no flush");
    }
    assert!(ctx.cpu().csu().rob().is_empty());
    assert_eq!(ctx.cpu().csu().speculated_pc(), 24);
    assert_eq!(ctx.cpu().csu().actual_pc(), 24);

    ctx.tick();
    let cpu = ctx.cpu();
    assert_eq!(cpu.rs().state().occupancy(), 0);
    assert!(cpu.lsq().state().is_empty());
    assert!(!cpu.regfile().state().has_producers());
    assert!(cpu.memory().is_idle());
    assert_eq!(cpu.memory().playback().live_count(), 0);
    assert_eq!(cpu.alu().outputs().completion, None);
    assert_eq!(ctx.read_word(0x40), 0);

    assert_eq!(ctx.run(), 7);
    assert_eq!(ctx.get_reg(5), 0);
    assert_eq!(ctx.read_word(0x40), 0);
    assert_eq!(ctx.sim.stats().flushes, 1);
}

#[test]
fn test_wrong_path_garbage_is_not_fatal() {
    let words = [
        inst().addi(1, 0, 1).build(),
        inst().bne(1, 0, 8).build(),
        0xFFFF_FFFF,
        inst().addi(10, 0, 3).build(),
        HALT_WORD,
    ];
    let mut ctx = TestContext::new(&words);
    assert_eq!(ctx.run(), 3);
    assert!(ctx.sim.stats().stalls_fetch > 0);
}

#[test]
fn test_wrong_path_out_of_range_access_is_not_fatal() {
    // The branch waits on a load, so the wrong-path accesses reach memory first.
    let words = [
        inst().addi(3, 0, -4).build(),    // 0
        inst().lw(2, 0, 0x80).build(),    // 4
        inst().addi(2, 2, 0).build(),     // 8
        inst().addi(2, 2, 0).build(),     // 12
        inst().addi(2, 2, 0).build(),     // 16
        inst().addi(2, 2, 0).build(),     // 20
        inst().beq(2, 0, 16).build(),     // 24: taken, predicted not taken
        inst().lw(4, 3, 0).build(),       // 28: wrong path, address 0xFFFF_FFFC
        inst().sw(3, 3, 0).build(),       // 32: wrong path
        inst().addi(10, 0, 1).build(),    // 36: wrong path
        inst().addi(10, 0, 7).build(),    // 40
        HALT_WORD,                        // 44
    ];
    let mut ctx = TestContext::new(&words);

    let mut saw_fault = false;
    while ctx.cpu().halt_code().is_none() {
        ctx.tick();
        saw_fault |= ctx.cpu().memory().outputs().fault.is_some();
        assert!(ctx.sim.cycles() < 1_000, "no halt");
    }
    assert!(saw_fault);
    assert_eq!(ctx.cpu().halt_code(), Some(7));
    assert_eq!(ctx.get_reg(4), 0);
    assert_eq!(ctx.sim.stats().flushes, 1);
    assert_eq!(ctx.reference().0, 7);
}

#[test]
fn test_out_of_range_access_faults_at_commit() {
    let words = [
        inst().addi(3, 0, -4).build(),
        inst().lw(4, 3, 0).build(),
        inst().addi(10, 0, 1).build(),
        HALT_WORD,
    ];
    let mut ctx = TestContext::new(&words);
    assert_eq!(
        ctx.sim.run(),
        Err(SimError::AddressOutOfRange {
            addr: 0xFFFF_FFFC,
            width: 4
        })
    );
    assert_eq!(ctx.get_reg(3), 0xFFFF_FFFC);
    assert_eq!(ctx.sim.stats().instructions_retired, 1);
}

#[test]
fn test_illegal_instruction_on_architectural_path() {
    let mut ctx = TestContext::new(&[inst().addi(1, 0, 1).build(), 0xFFFF_FFFF]);
    assert_eq!(
        ctx.sim.run(),
        Err(SimError::IllegalInstruction {
            pc: 4,
            word: 0xFFFF_FFFF
        })
    );
}

#[test]
fn test_jalr_stalls_fetch_until_resolved() {
    let (words, code) = programs::call_return();
    let mut ctx = TestContext::new(&words);

    let mut stalled_ticks = 0;
    while ctx.cpu().halt_code().is_none() {
        ctx.tick();
        if ctx.cpu().csu().outputs().stall == Some(StallCause::JalrPending) {
            stalled_ticks += 1;
        }
        assert!(ctx.sim.cycles() < 1_000, "no halt");
    }
    assert!(stalled_ticks >= 2);
    assert_eq!(ctx.cpu().halt_code(), Some(code));
    assert_eq!(ctx.get_reg(1), 8);
    assert_eq!(ctx.sim.stats().flushes, 0);
}

#[test]
fn test_halt_truncates_exit_code_and_stops_issue() {
    let words = [
        inst().addi(10, 0, 0x10C).build(),
        HALT_WORD,
        inst().addi(10, 0, 1).build(),
    ];
    let mut ctx = TestContext::new(&words);
    assert_eq!(ctx.run(), 12);
    assert_eq!(ctx.get_reg(10), 0x10C);
    assert_eq!(ctx.cpu().csu().outputs().halt.exit_code(), Some(12));
}

#[test]
fn test_branch_prediction_policies() {
    let (words, code) = programs::sum_loop();
    let flushes = |prediction| {
        let mut config = Config::default();
        config.general.max_cycles = TEST_CYCLE_CAP;
        config.pipeline.branch_prediction = prediction;
        let mut ctx = TestContext::with_config(config, &words);
        assert_eq!(ctx.run(), code);
        ctx.sim.stats().flushes
    };
    assert_eq!(flushes(BranchPrediction::BackwardTaken), 1);
    assert_eq!(flushes(BranchPrediction::Taken), 1);
    assert_eq!(flushes(BranchPrediction::NotTaken), 9);
}

#[test]
fn test_cycle_cap_returns_255() {
    let mut config = Config::default();
    config.general.max_cycles = 500;
    let mut ctx = TestContext::with_config(config, &[inst().jal(0, 0).build()]);
    assert_eq!(ctx.run(), 255);
    assert_eq!(ctx.sim.cycles(), 500);
}
