//! Load/store queue: in-order submission and memory handshake.

use tomasulo_core::common::constants::LSQ_SIZE;
use tomasulo_core::core::bus::{Completion, MemPoll, MemRequest, MemStatus, OperandRead, RobTag};
use tomasulo_core::core::units::lsq::LoadStoreQueue;
use tomasulo_core::core::units::memory::ram::Ram;
use tomasulo_core::core::units::memory::{Direction, encode_kind};
use tomasulo_core::core::units::operand::Operand;
use tomasulo_core::core::units::reservation_station::SlotState;

use crate::common::{clock, idle_bus, inst, issue};

fn read(rob: u8, base: Operand, data: Operand) -> OperandRead {
    OperandRead {
        rob: RobTag(rob),
        rs1: base,
        rs2: data,
    }
}

fn busy(rob: u8) -> MemPoll {
    MemPoll {
        status: MemStatus::Busy,
        rob: RobTag(rob),
        ..MemPoll::default()
    }
}

#[test]
fn test_back_to_back_loads_wait_for_memory() {
    let ram = Ram::new(16);
    let mut lsq = LoadStoreQueue::new();

    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().lw(1, 2, 4).build()));
    clock(&mut lsq, &bus);

    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(0, Operand::Value(0x100), Operand::Value(0)));
    bus.csu.issue = Some(issue(1, 4, inst().lw(3, 2, 8).build()));
    clock(&mut lsq, &bus);
    assert_eq!(lsq.outputs().request, None);
    assert_eq!(lsq.state().len(), 2);

    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(1, Operand::Value(0x100), Operand::Value(0)));
    clock(&mut lsq, &bus);
    assert_eq!(
        lsq.outputs().request,
        Some(MemRequest {
            kind: encode_kind(Direction::Read, 4),
            addr: 0x104,
            data: 0,
            rob: RobTag(0),
            sign_extend: false,
        })
    );
    assert_eq!(lsq.state().len(), 1);

    // Memory has not reported the first request yet.
    clock(&mut lsq, &idle_bus(&ram));
    assert_eq!(lsq.outputs().request, None);

    for _ in 0..2 {
        let mut bus = idle_bus(&ram);
        bus.mem = busy(0);
        clock(&mut lsq, &bus);
        assert_eq!(lsq.outputs().request, None);
    }

    let mut bus = idle_bus(&ram);
    bus.mem = MemPoll {
        status: MemStatus::DataReady,
        rob: RobTag(0),
        data: 7,
        fault: None,
    };
    clock(&mut lsq, &bus);
    assert_eq!(lsq.outputs().request.map(|r| (r.rob, r.addr)), Some((RobTag(1), 0x108)));
    assert!(lsq.state().is_empty());
}

#[test]
fn test_dependent_load_takes_base_from_memory_broadcast() {
    let ram = Ram::new(16);
    let mut lsq = LoadStoreQueue::new();

    // lw x1, 0(x2); lw x3, 4(x1)
    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().lw(1, 2, 0).build()));
    clock(&mut lsq, &bus);

    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(0, Operand::Value(0x100), Operand::Value(0)));
    bus.csu.issue = Some(issue(1, 4, inst().lw(3, 1, 4).build()));
    clock(&mut lsq, &bus);

    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(1, Operand::Waiting(RobTag(0)), Operand::Value(0)));
    clock(&mut lsq, &bus);
    assert_eq!(lsq.outputs().request.map(|r| (r.rob, r.addr)), Some((RobTag(0), 0x100)));
    let head = *lsq.state().head().unwrap();
    assert_eq!(head.operand1, Operand::Waiting(RobTag(0)));

    clock(&mut lsq, &idle_bus(&ram));
    for _ in 0..2 {
        let mut bus = idle_bus(&ram);
        bus.mem = busy(0);
        clock(&mut lsq, &bus);
    }
    assert_eq!(lsq.state().head().unwrap().state, SlotState::AwaitingOperands);

    // The loaded value is captured in the completion tick and submitted next tick.
    let mut bus = idle_bus(&ram);
    bus.mem = MemPoll {
        status: MemStatus::DataReady,
        rob: RobTag(0),
        data: 0x40,
        fault: None,
    };
    clock(&mut lsq, &bus);
    assert_eq!(lsq.outputs().request, None);
    assert_eq!(lsq.state().head().unwrap().operand1, Operand::Value(0x40));
    assert_eq!(lsq.state().head().unwrap().state, SlotState::Ready);

    clock(&mut lsq, &idle_bus(&ram));
    assert_eq!(lsq.outputs().request.map(|r| (r.rob, r.addr)), Some((RobTag(1), 0x44)));
    assert!(lsq.state().is_empty());
}

#[test]
fn test_store_data_truncated_to_width() {
    let ram = Ram::new(16);
    let mut lsq = LoadStoreQueue::new();

    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(2, 0, inst().sb(1, 2, -1).build()));
    clock(&mut lsq, &bus);
    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(2, Operand::Value(0x21), Operand::Value(0x1234_56AB)));
    clock(&mut lsq, &bus);
    clock(&mut lsq, &idle_bus(&ram));

    assert_eq!(
        lsq.outputs().request,
        Some(MemRequest {
            kind: encode_kind(Direction::Write, 1),
            addr: 0x20,
            data: 0xAB,
            rob: RobTag(2),
            sign_extend: false,
        })
    );
}

#[test]
fn test_signed_narrow_load_request() {
    let ram = Ram::new(16);
    let mut lsq = LoadStoreQueue::new();

    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().lh(1, 0, 6).build()));
    clock(&mut lsq, &bus);
    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(0, Operand::Value(0), Operand::Value(0)));
    clock(&mut lsq, &bus);
    clock(&mut lsq, &idle_bus(&ram));

    let req = lsq.outputs().request.unwrap();
    assert_eq!(req.kind, encode_kind(Direction::Read, 2));
    assert!(req.sign_extend);
}

#[test]
fn test_younger_ready_entry_waits_behind_head() {
    let ram = Ram::new(16);
    let mut lsq = LoadStoreQueue::new();

    // sw x5, 0(x0) waits on rob #9 for its data.
    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().sw(0, 5, 0).build()));
    clock(&mut lsq, &bus);
    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(0, Operand::Value(0), Operand::Waiting(RobTag(9))));
    bus.csu.issue = Some(issue(1, 4, inst().lw(1, 0, 8).build()));
    clock(&mut lsq, &bus);
    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(1, Operand::Value(0), Operand::Value(0)));
    clock(&mut lsq, &bus);

    for _ in 0..3 {
        clock(&mut lsq, &idle_bus(&ram));
        assert_eq!(lsq.outputs().request, None);
    }

    let mut bus = idle_bus(&ram);
    bus.alu.completion = Some(Completion {
        rob: RobTag(9),
        value: 0x55,
        next_pc: 0,
    });
    clock(&mut lsq, &bus);
    clock(&mut lsq, &idle_bus(&ram));
    let req = lsq.outputs().request.unwrap();
    assert_eq!((req.rob, req.data), (RobTag(0), 0x55));
}

#[test]
fn test_flush_empties_queue() {
    let ram = Ram::new(16);
    let mut lsq = LoadStoreQueue::new();
    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().lw(1, 0, 0).build()));
    clock(&mut lsq, &bus);
    assert_eq!(lsq.outputs().free_slots, LSQ_SIZE - 1);

    let mut bus = idle_bus(&ram);
    bus.csu.flush = true;
    clock(&mut lsq, &bus);
    assert!(lsq.state().is_empty());
    assert_eq!(lsq.outputs().free_slots, LSQ_SIZE);
    assert_eq!(lsq.outputs().request, None);
}
