// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! End-to-end scenarios driving the public API the way a host embedding this crate would: bind a
//! data format, feed a snapshot through a `VirtualController`, and read the resulting buffer.

use xidi_core::controller::VirtualController;
use xidi_core::error::CoreError;
use xidi_core::format::{self, InstanceSelector, KindMask, ObjectIdentity, ObjectRequest};
use xidi_core::profile::ProfileKind;
use xidi_core::property_api::{self, PropertyKind, PropertyTarget, PropertyValue};
use xidi_core::source::{SourceStatus, XInputSnapshot, XInputSource};
use std::cell::{Cell, RefCell};

/// A minimal `XInputSource` good enough to drive a `VirtualController` from a test thread: no
/// buffered events, just an immediate-state cell a test can update between refreshes.
struct StubSource {
    status: Cell<SourceStatus>,
    packet: Cell<u32>,
    snapshot: RefCell<XInputSnapshot>,
}

impl StubSource {
    fn new() -> Self {
        StubSource {
            status: Cell::new(SourceStatus::Success),
            packet: Cell::new(0),
            snapshot: RefCell::new(XInputSnapshot::default()),
        }
    }

    fn set(&self, status: SourceStatus, packet: u32, snapshot: XInputSnapshot) {
        self.status.set(status);
        self.packet.set(packet);
        *self.snapshot.borrow_mut() = snapshot;
    }
}

impl XInputSource for StubSource {
    fn get_state(&self, _controller_id: u32) -> (SourceStatus, u32, XInputSnapshot) {
        (self.status.get(), self.packet.get(), *self.snapshot.borrow())
    }
    fn lock_event_buffer(&self) {}
    fn unlock_event_buffer(&self) {}
    fn buffered_count(&self) -> u32 {
        0
    }
    fn peek(&self, _i: u32) -> xidi_core::source::PhysEvent {
        unreachable!("scenarios tests never queue buffered events")
    }
    fn pop(&self) -> xidi_core::source::PhysEvent {
        unreachable!("scenarios tests never queue buffered events")
    }
    fn is_overflowed(&self) -> bool {
        false
    }
}

fn axis_req(offset: u32) -> ObjectRequest {
    ObjectRequest { kind_mask: KindMask::AXIS, identity: ObjectIdentity::None, instance: InstanceSelector::Any, byte_offset: offset }
}

fn axis_identity_req(offset: u32, identity: xidi_core::types::AxisIdentity) -> ObjectRequest {
    ObjectRequest { kind_mask: KindMask::AXIS, identity: ObjectIdentity::Axis(identity), instance: InstanceSelector::Any, byte_offset: offset }
}

fn button_req(offset: u32, instance: InstanceSelector) -> ObjectRequest {
    ObjectRequest { kind_mask: KindMask::BUTTON, identity: ObjectIdentity::None, instance, byte_offset: offset }
}

fn pov_req(offset: u32) -> ObjectRequest {
    ObjectRequest { kind_mask: KindMask::POV, identity: ObjectIdentity::None, instance: InstanceSelector::Any, byte_offset: offset }
}

#[test]
fn s1_shared_trigger_axis_reaches_full_scale() {
    let source = StubSource::new();
    let controller = VirtualController::new(&source, 0, ProfileKind::XInputSharedTriggers.build());
    let binding = format::bind(controller.profile(), &[axis_identity_req(0, xidi_core::types::AxisIdentity::Z)], 4).unwrap();
    controller.set_data_format(binding);

    source.set(SourceStatus::Success, 1, XInputSnapshot { lt: 255, rt: 0, ..Default::default() });
    let mut buf = [0u8; 4];
    controller.get_mapped_state(&mut buf).unwrap();
    assert_eq!(i32::from_le_bytes(buf), 32767);

    source.set(SourceStatus::Success, 2, XInputSnapshot { lt: 0, rt: 255, ..Default::default() });
    controller.get_mapped_state(&mut buf).unwrap();
    assert_eq!(i32::from_le_bytes(buf), -32767);
}

#[test]
fn s2_vertical_stick_inverts() {
    let source = StubSource::new();
    let controller = VirtualController::new(&source, 0, ProfileKind::XInputNative.build());
    // Two "any" axis requests bind X (offset 0) then Y (offset 4), in profile axis-index order.
    let binding = format::bind(controller.profile(), &[axis_req(0), axis_req(4)], 8).unwrap();
    controller.set_data_format(binding);

    source.set(SourceStatus::Success, 1, XInputSnapshot { ly: 32767, ..Default::default() });
    let mut buf = [0u8; 8];
    controller.get_mapped_state(&mut buf).unwrap();
    let y = i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    assert_eq!(y, -32767);
}

#[test]
fn s3_dpad_diagonal_and_opposing() {
    let source = StubSource::new();
    let controller = VirtualController::new(&source, 0, ProfileKind::XInputNative.build());
    let binding = format::bind(controller.profile(), &[pov_req(0)], 4).unwrap();
    controller.set_data_format(binding);

    source.set(SourceStatus::Success, 1, XInputSnapshot { button_bits: 0x0001 | 0x0008, ..Default::default() }); // N|E
    let mut buf = [0u8; 4];
    controller.get_mapped_state(&mut buf).unwrap();
    assert_eq!(u32::from_le_bytes(buf), 4500);

    source.set(SourceStatus::Success, 2, XInputSnapshot { button_bits: 0x0001 | 0x0002, ..Default::default() }); // N|S
    controller.get_mapped_state(&mut buf).unwrap();
    assert_eq!(buf, (-1i32 as u32).to_le_bytes());
}

#[test]
fn s4_deadzone_gating_via_property_api() {
    let source = StubSource::new();
    let controller = VirtualController::new(&source, 0, ProfileKind::XInputNative.build());
    let binding = format::bind(controller.profile(), &[axis_req(0)], 4).unwrap();
    controller.set_data_format(binding);

    let target = PropertyTarget::ByVirtualId(xidi_core::types::VId::axis(0));
    property_api::set_property(&controller, PropertyKind::Range, target, PropertyValue::Range(-10000, 10000)).unwrap();
    property_api::set_property(&controller, PropertyKind::Deadzone, target, PropertyValue::Deadzone(2000)).unwrap();
    property_api::set_property(&controller, PropertyKind::Saturation, target, PropertyValue::Saturation(8000)).unwrap();

    // Raw stick value that remaps to 10% of full scale inside [-10000, 10000]: gated to zero.
    source.set(SourceStatus::Success, 1, XInputSnapshot { lx: 3276, ..Default::default() });
    let mut buf = [0u8; 4];
    controller.get_mapped_state(&mut buf).unwrap();
    assert_eq!(i32::from_le_bytes(buf), 0);

    // 80% of full scale: saturates to the configured maximum.
    source.set(SourceStatus::Success, 2, XInputSnapshot { lx: 26214, ..Default::default() });
    controller.get_mapped_state(&mut buf).unwrap();
    assert_eq!(i32::from_le_bytes(buf), 10000);
}

#[test]
fn s5_refresh_transitions() {
    let source = StubSource::new();
    let controller = VirtualController::new(&source, 0, ProfileKind::XInputNative.build());

    source.set(SourceStatus::Success, 7, XInputSnapshot::default());
    controller.refresh_state();

    source.set(SourceStatus::Success, 8, XInputSnapshot { lx: 1234, ..Default::default() });
    assert!(controller.refresh_state(), "packet change with a real value change must report a change");

    source.set(SourceStatus::Success, 8, XInputSnapshot { lx: 1234, ..Default::default() });
    assert!(!controller.refresh_state(), "unchanged packet number must report no-change");

    source.set(SourceStatus::DeviceNotConnected, 8, XInputSnapshot::default());
    assert!(controller.refresh_state(), "SUCCESS -> DEVICE_NOT_CONNECTED with a non-neutral prior state must report a change");
}

#[test]
fn s6_binding_overlap_fails_whole_call() {
    let profile = ProfileKind::XInputNative.build();
    let requests = [axis_req(0), axis_req(2)]; // [0..4) and [2..6) overlap
    assert_eq!(format::bind(&profile, &requests, 8), Err(CoreError::InvalidParam));
}

#[test]
fn s6_variant_instance_zero_button_is_selectable() {
    let profile = ProfileKind::XInputNative.build();
    let requests = [button_req(0, InstanceSelector::Specific(0))];
    let binding = format::bind(&profile, &requests, 4).unwrap();
    assert_eq!(binding.vid_at_offset(0), Some(xidi_core::types::VId::button(0)));
}
