// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The borrowed capability this crate polls for controller state: `XInputSource`.
//!
//! Nothing here talks to real hardware. A platform adapter (or, in tests, [`crate::testutil`])
//! implements the trait; the [`crate::controller::VirtualController`] only ever sees it through
//! this interface.

use crate::types::EPhysElem;

/// `SUCCESS` / `DEVICE_NOT_CONNECTED` / anything else, mirroring the legacy API's own tri-state
/// result for "get controller state".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Success,
    DeviceNotConnected,
    Other(i32),
}

impl SourceStatus {
    pub fn is_success(self) -> bool {
        self == SourceStatus::Success
    }
}

/// One XInput-shaped controller report: button bitmask plus two sticks and two triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XInputSnapshot {
    pub button_bits: u16,
    pub lx: i16,
    pub ly: i16,
    pub rx: i16,
    pub ry: i16,
    pub lt: u8,
    pub rt: u8,
}

impl XInputSnapshot {
    /// True if `button` is set in `button_bits`. `button` is one of the `XINPUT_GAMEPAD_*`-style
    /// bit values, not a dense index.
    pub fn button_bit(&self, bit: u16) -> bool {
        self.button_bits & bit != 0
    }
}

/// A single physical-element change, as handed over by the source's buffered event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysEvent {
    pub elem: EPhysElem,
    pub value: i32,
    pub seq: u64,
    pub timestamp: u64,
}

/// The capability a `VirtualController` needs from its controller source: an immediate-state
/// poll, plus a buffered event queue guarded by its own lock (never held together with the
/// controller's internal mutex -- see the crate's concurrency notes).
pub trait XInputSource {
    /// Polls current state. Returns the source's status, the packet number (changes whenever
    /// the physical state does), and a snapshot (only meaningful when `status` is `Success`).
    fn get_state(&self, controller_id: u32) -> (SourceStatus, u32, XInputSnapshot);

    fn lock_event_buffer(&self);
    fn unlock_event_buffer(&self);

    /// Number of buffered events available. Only meaningful while the event-buffer lock is held.
    fn buffered_count(&self) -> u32;
    /// Reads the `i`th buffered event without consuming it.
    fn peek(&self, i: u32) -> PhysEvent;
    /// Consumes and returns the oldest buffered event.
    fn pop(&self) -> PhysEvent;
    /// True if the source dropped events since the last time this was observed to be `false`.
    fn is_overflowed(&self) -> bool;
}
