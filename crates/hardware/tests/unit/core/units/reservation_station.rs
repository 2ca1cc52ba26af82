//! Reservation station: operand capture, dispatch and capacity.

use tomasulo_core::SimError;
use tomasulo_core::common::constants::RS_SIZE;
use tomasulo_core::core::bus::{
    AluRequest, Completion, MemPoll, MemStatus, OperandForward, OperandRead, RobTag,
};
use tomasulo_core::core::traits::Unit;
use tomasulo_core::core::units::memory::ram::Ram;
use tomasulo_core::core::units::operand::Operand;
use tomasulo_core::core::units::reservation_station::{ReservationStation, SlotState};
use tomasulo_core::isa::Opcode;

use crate::common::{clock, idle_bus, inst, issue};

fn read(rob: u8, rs1: Operand, rs2: Operand) -> OperandRead {
    OperandRead {
        rob: RobTag(rob),
        rs1,
        rs2,
    }
}

#[test]
fn test_waiting_operand_captured_from_broadcast() {
    let ram = Ram::new(16);
    let mut rs = ReservationStation::new();

    // t+1: accept with both operands pending.
    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(3, 0x40, inst().add(5, 1, 2).build()));
    clock(&mut rs, &bus);
    assert_eq!(rs.outputs().free_slots, RS_SIZE - 1);
    assert_eq!(rs.state().slots()[0].operand1, Operand::Pending);

    // t+2: register file answers; rs2 waits on rob #7.
    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(3, Operand::Value(5), Operand::Waiting(RobTag(7))));
    clock(&mut rs, &bus);
    assert_eq!(rs.state().slots()[0].state, SlotState::AwaitingOperands);
    assert_eq!(rs.outputs().request, None);

    // Broadcast from rob #7 completes the slot.
    let mut bus = idle_bus(&ram);
    bus.alu.completion = Some(Completion {
        rob: RobTag(7),
        value: 3,
        next_pc: 0,
    });
    clock(&mut rs, &bus);
    assert_eq!(rs.state().slots()[0].state, SlotState::Ready);
    assert_eq!(rs.outputs().request, None);

    // Dispatch in the following tick.
    clock(&mut rs, &idle_bus(&ram));
    assert_eq!(
        rs.outputs().request,
        Some(AluRequest {
            op: Opcode::Add,
            operand1: 5,
            operand2: 3,
            imm: 0,
            pc: 0x40,
            rob: RobTag(3),
        })
    );
    assert_eq!(rs.outputs().free_slots, RS_SIZE);
}

#[test]
fn test_pending_operand_resolved_from_backfill_and_memory() {
    let ram = Ram::new(16);
    let mut rs = ReservationStation::new();

    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(4, 0, inst().sub(5, 1, 2).build()));
    clock(&mut rs, &bus);

    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(4, Operand::Waiting(RobTag(1)), Operand::Waiting(RobTag(2))));
    bus.csu.forward = Some(OperandForward {
        rob: RobTag(4),
        rs1: Some(10),
        rs2: None,
    });
    bus.mem = MemPoll {
        status: MemStatus::DataReady,
        rob: RobTag(2),
        data: 4,
        fault: None,
    };
    clock(&mut rs, &bus);
    let slot = rs.state().slots()[0];
    assert_eq!(slot.operand1, Operand::Value(10));
    assert_eq!(slot.operand2, Operand::Value(4));
    assert_eq!(slot.state, SlotState::Ready);
}

#[test]
fn test_memory_instructions_are_not_accepted() {
    let ram = Ram::new(16);
    let mut rs = ReservationStation::new();
    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().lw(1, 0, 0).build()));
    clock(&mut rs, &bus);
    assert_eq!(rs.outputs().free_slots, RS_SIZE);
}

#[test]
fn test_one_dispatch_per_tick_lowest_slot_first() {
    let ram = Ram::new(16);
    let mut rs = ReservationStation::new();

    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().addi(1, 0, 1).build()));
    clock(&mut rs, &bus);
    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(0, Operand::Value(0), Operand::Value(0)));
    bus.csu.issue = Some(issue(1, 4, inst().addi(2, 0, 2).build()));
    clock(&mut rs, &bus);
    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(1, Operand::Value(0), Operand::Value(0)));
    clock(&mut rs, &bus);
    // Slot 0 was ready at the start of this tick; slot 1 only became ready in it.
    assert_eq!(rs.outputs().request.map(|r| r.rob), Some(RobTag(0)));

    clock(&mut rs, &idle_bus(&ram));
    assert_eq!(rs.outputs().request.map(|r| r.rob), Some(RobTag(1)));
    clock(&mut rs, &idle_bus(&ram));
    assert_eq!(rs.outputs().request, None);
}

#[test]
fn test_missing_operand_read_is_inconsistent() {
    let ram = Ram::new(16);
    let mut rs = ReservationStation::new();
    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().addi(1, 0, 1).build()));
    clock(&mut rs, &bus);

    let err = rs.work(&idle_bus(&ram)).unwrap_err();
    assert!(matches!(err, SimError::Inconsistent(_)));
}

#[test]
fn test_overflow_and_flush() {
    let ram = Ram::new(16);
    let mut rs = ReservationStation::new();

    // Fill every slot with instructions waiting on rob #99.
    for i in 0..RS_SIZE {
        let mut bus = idle_bus(&ram);
        bus.csu.issue = Some(issue(i as u8, 0, inst().add(1, 2, 3).build()));
        if i > 0 {
            bus.regfile.read = Some(read(
                (i - 1) as u8,
                Operand::Waiting(RobTag(99)),
                Operand::Value(0),
            ));
        }
        clock(&mut rs, &bus);
    }
    assert_eq!(rs.outputs().free_slots, 0);

    let mut bus = idle_bus(&ram);
    bus.regfile.read = Some(read(31, Operand::Waiting(RobTag(99)), Operand::Value(0)));
    bus.csu.issue = Some(issue(40, 0, inst().add(1, 2, 3).build()));
    assert_eq!(
        rs.work(&bus),
        Err(SimError::CapacityExceeded {
            unit: "reservation station"
        })
    );

    let mut rs = ReservationStation::new();
    let mut bus = idle_bus(&ram);
    bus.csu.issue = Some(issue(0, 0, inst().add(1, 2, 3).build()));
    clock(&mut rs, &bus);
    let mut bus = idle_bus(&ram);
    bus.csu.flush = true;
    clock(&mut rs, &bus);
    assert_eq!(rs.outputs().free_slots, RS_SIZE);
    assert_eq!(rs.state().occupancy(), 0);
}
