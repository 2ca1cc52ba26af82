//! Memory unit: busy protocol, request decoding and store rollback.

use tomasulo_core::SimError;
use tomasulo_core::core::bus::{Bus, CommitPacket, MemFault, MemPoll, MemRequest, MemStatus, RobTag};
use tomasulo_core::core::traits::Unit;
use tomasulo_core::core::units::memory::ram::Ram;
use tomasulo_core::core::units::memory::{Direction, Memory, encode_kind};
use tomasulo_core::isa::Opcode;

use crate::common::{clock, idle_bus};

fn store(rob: u8, addr: u32, data: u32, width: u32) -> MemRequest {
    MemRequest {
        kind: encode_kind(Direction::Write, width),
        addr,
        data,
        rob: RobTag(rob),
        sign_extend: false,
    }
}

fn load(rob: u8, addr: u32, width: u32, sign_extend: bool) -> MemRequest {
    MemRequest {
        kind: encode_kind(Direction::Read, width),
        addr,
        data: 0,
        rob: RobTag(rob),
        sign_extend,
    }
}

fn submit(ram: &Ram, req: MemRequest) -> Bus<'_> {
    let mut bus = idle_bus(ram);
    bus.lsq.request = Some(req);
    bus
}

/// Submits `req`, clocks until the access is performed and applies its writes.
fn perform(mem: &mut Memory, ram: &mut Ram, req: MemRequest) -> MemPoll {
    clock(mem, &submit(ram, req));
    clock(mem, &idle_bus(ram));
    clock(mem, &idle_bus(ram));
    ram.apply(mem.take_ram_writes()).unwrap();
    mem.outputs()
}

#[test]
fn test_request_completes_two_ticks_after_acceptance() {
    let mut ram = Ram::new(64);
    let mut mem = Memory::new();

    clock(&mut mem, &submit(&ram, store(1, 0x10, 0xDEAD_BEEF, 4)));
    assert_eq!(
        mem.outputs(),
        MemPoll {
            status: MemStatus::Busy,
            rob: RobTag(1),
            data: 0,
            fault: None,
        }
    );
    assert!(mem.take_ram_writes().is_empty());

    clock(&mut mem, &idle_bus(&ram));
    assert_eq!(mem.outputs().status, MemStatus::Busy);
    assert!(mem.take_ram_writes().is_empty());

    clock(&mut mem, &idle_bus(&ram));
    assert_eq!(mem.outputs().ready(), Some((RobTag(1), 0)));
    ram.apply(mem.take_ram_writes()).unwrap();
    assert_eq!(ram.read(0x10, 4).unwrap(), 0xDEAD_BEEF);
    assert!(mem.is_idle());

    clock(&mut mem, &idle_bus(&ram));
    assert_eq!(mem.outputs(), MemPoll::default());
}

#[test]
fn test_request_while_busy_is_a_fault() {
    let ram = Ram::new(64);
    let mut mem = Memory::new();
    clock(&mut mem, &submit(&ram, load(1, 0, 4, false)));

    let err = mem.work(&submit(&ram, load(2, 4, 4, false))).unwrap_err();
    assert_eq!(err, SimError::MemoryBusy { rob: RobTag(2) });
}

#[test]
fn test_invalid_request_type_is_a_fault() {
    let ram = Ram::new(64);
    let mut mem = Memory::new();
    let mut req = load(1, 0, 4, false);
    req.kind = 0b1101;
    assert_eq!(
        mem.work(&submit(&ram, req)),
        Err(SimError::InvalidRequestType(0b1101))
    );
}

#[test]
fn test_narrow_loads_extend() {
    let mut ram = Ram::new(64);
    ram.load(4, &[0x80, 0xFF, 0x7F, 0x00]);
    let mut mem = Memory::new();

    assert_eq!(perform(&mut mem, &mut ram, load(1, 4, 1, true)).data, 0xFFFF_FF80);
    assert_eq!(perform(&mut mem, &mut ram, load(2, 4, 1, false)).data, 0x80);
    assert_eq!(perform(&mut mem, &mut ram, load(3, 4, 2, true)).data, 0xFFFF_FF80);
    assert_eq!(perform(&mut mem, &mut ram, load(4, 4, 2, false)).data, 0xFF80);
    assert_eq!(perform(&mut mem, &mut ram, load(5, 4, 4, false)).data, 0x007F_FF80);
}

#[test]
fn test_narrow_store_touches_only_its_bytes() {
    let mut ram = Ram::new(64);
    ram.load(8, &[0x11, 0x22, 0x33, 0x44]);
    let mut mem = Memory::new();

    let _ = perform(&mut mem, &mut ram, store(1, 9, 0xAB, 1));
    assert_eq!(ram.read(8, 4).unwrap(), 0x4433_AB11);
    let _ = perform(&mut mem, &mut ram, store(2, 10, 0xBEEF, 2));
    assert_eq!(ram.read(8, 4).unwrap(), 0xBEEF_AB11);
    assert_eq!(mem.playback().live_count(), 2);
}

#[test]
fn test_flush_restores_uncommitted_stores_newest_first() {
    let mut ram = Ram::new(64);
    ram.load(0x20, &[0x44, 0x33, 0x22, 0x11]);
    let mut mem = Memory::new();

    let _ = perform(&mut mem, &mut ram, store(1, 0x20, 0xAABB_CCDD, 4));
    let _ = perform(&mut mem, &mut ram, store(2, 0x21, 0x99, 1));
    assert_eq!(ram.read(0x20, 4).unwrap(), 0xAABB_99DD);

    let mut bus = idle_bus(&ram);
    bus.csu.flush = true;
    clock(&mut mem, &bus);
    ram.apply(mem.take_ram_writes()).unwrap();

    assert_eq!(ram.read(0x20, 4).unwrap(), 0x1122_3344);
    assert_eq!(mem.playback().live_count(), 0);
    assert_eq!(mem.outputs(), MemPoll::default());
}

#[test]
fn test_committed_store_survives_flush() {
    let mut ram = Ram::new(64);
    let mut mem = Memory::new();
    let _ = perform(&mut mem, &mut ram, store(1, 0, 0x0102_0304, 4));
    let _ = perform(&mut mem, &mut ram, store(2, 4, 0x0506_0708, 4));

    let mut bus = idle_bus(&ram);
    bus.csu.commit = Some(CommitPacket {
        rob: RobTag(1),
        op: Opcode::Sw,
        rd: None,
        value: 0,
    });
    clock(&mut mem, &bus);
    assert_eq!(mem.playback().live_count(), 1);

    let mut bus = idle_bus(&ram);
    bus.csu.flush = true;
    clock(&mut mem, &bus);
    ram.apply(mem.take_ram_writes()).unwrap();

    assert_eq!(ram.read(0, 4).unwrap(), 0x0102_0304);
    assert_eq!(ram.read(4, 4).unwrap(), 0);
}

#[test]
fn test_flush_drops_access_in_flight() {
    let mut ram = Ram::new(64);
    let mut mem = Memory::new();
    clock(&mut mem, &submit(&ram, store(1, 0, 0xFFFF_FFFF, 4)));

    let mut bus = idle_bus(&ram);
    bus.csu.flush = true;
    clock(&mut mem, &bus);
    assert!(mem.is_idle());

    clock(&mut mem, &idle_bus(&ram));
    clock(&mut mem, &idle_bus(&ram));
    ram.apply(mem.take_ram_writes()).unwrap();
    assert_eq!(ram.read(0, 4).unwrap(), 0);
    assert_eq!(mem.outputs(), MemPoll::default());
}

#[test]
fn test_load_past_end_of_ram_completes_with_fault() {
    let mut ram = Ram::new(16);
    let mut mem = Memory::new();
    let poll = perform(&mut mem, &mut ram, load(1, 14, 4, false));
    assert_eq!(poll.ready(), Some((RobTag(1), 0)));
    assert_eq!(poll.fault, Some(MemFault { addr: 14, width: 4 }));
    assert!(mem.is_idle());
}

#[test]
fn test_store_past_end_of_ram_writes_nothing() {
    let mut ram = Ram::new(16);
    ram.load(12, &[1, 2, 3, 4]);
    let mut mem = Memory::new();
    let poll = perform(&mut mem, &mut ram, store(1, 0xFFFF_FFFC, 0xDEAD_BEEF, 4));
    assert_eq!(poll.fault, Some(MemFault { addr: 0xFFFF_FFFC, width: 4 }));
    assert_eq!(ram.read(12, 4).unwrap(), 0x0403_0201);
    assert_eq!(mem.playback().live_count(), 0);

    // The port is free again for the next request.
    let poll = perform(&mut mem, &mut ram, load(2, 12, 1, false));
    assert_eq!((poll.data, poll.fault), (1, None));
}
