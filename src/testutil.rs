// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Test doubles for the two borrowed capabilities this crate never constructs itself:
//! [`XInputSource`] and [`crate::ff::FfDevice`].

use crate::ff::FfDevice;
use crate::source::{PhysEvent, SourceStatus, XInputSnapshot, XInputSource};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// An `XInputSource` double driven entirely by test code: `push` queues events, `set_state`
/// controls what `get_state` returns next, `set_overflowed` flips the overflow flag.
pub struct FakeSource {
    events: RefCell<VecDeque<PhysEvent>>,
    overflowed: Cell<bool>,
    locked: Cell<bool>,
    status: Cell<SourceStatus>,
    packet: Cell<u32>,
    snapshot: RefCell<XInputSnapshot>,
}

impl FakeSource {
    pub fn new() -> Self {
        FakeSource {
            events: RefCell::new(VecDeque::new()),
            overflowed: Cell::new(false),
            locked: Cell::new(false),
            status: Cell::new(SourceStatus::Success),
            packet: Cell::new(0),
            snapshot: RefCell::new(XInputSnapshot::default()),
        }
    }

    pub fn push(&self, event: PhysEvent) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn set_overflowed(&self, overflowed: bool) {
        self.overflowed.set(overflowed);
    }

    pub fn set_state(&self, status: SourceStatus, packet: u32, snapshot: XInputSnapshot) {
        self.status.set(status);
        self.packet.set(packet);
        *self.snapshot.borrow_mut() = snapshot;
    }
}

impl XInputSource for FakeSource {
    fn get_state(&self, _controller_id: u32) -> (SourceStatus, u32, XInputSnapshot) {
        (self.status.get(), self.packet.get(), *self.snapshot.borrow())
    }

    fn lock_event_buffer(&self) {
        assert!(!self.locked.get(), "FakeSource event-buffer lock is not reentrant");
        self.locked.set(true);
    }

    fn unlock_event_buffer(&self) {
        assert!(self.locked.get(), "unlock called without a matching lock");
        self.locked.set(false);
    }

    fn buffered_count(&self) -> u32 {
        self.events.borrow().len() as u32
    }

    fn peek(&self, i: u32) -> PhysEvent {
        self.events.borrow()[i as usize]
    }

    fn pop(&self) -> PhysEvent {
        self.events.borrow_mut().pop_front().expect("pop on empty FakeSource")
    }

    fn is_overflowed(&self) -> bool {
        self.overflowed.get()
    }
}

/// An `FfDevice` double that just records the last magnitude it was asked to render.
#[derive(Default)]
pub struct FakeFfDevice {
    last: Cell<(u16, u16)>,
}

impl FakeFfDevice {
    pub fn new() -> Self {
        FakeFfDevice::default()
    }

    pub fn last_magnitude(&self) -> (u16, u16) {
        self.last.get()
    }
}

impl FfDevice for FakeFfDevice {
    fn set_ff_state(&self, strong: u16, weak: u16) {
        self.last.set((strong, weak));
    }
}
